// src/qr.rs - 用 qrcode crate 把 payload 编成模块矩阵

use crate::error::MagnetError;
use clap::ValueEnum;
use qrcode::render::unicode;
use qrcode::{Color, EcLevel, QrCode};
use serde::{Deserialize, Serialize};

/// 允许的纠错级别（固定为 M 或 H）
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, ValueEnum)]
#[serde(rename_all = "UPPERCASE")]
pub enum EcChoice {
    #[default]
    #[value(name = "m", alias = "M")]
    M,
    #[value(name = "h", alias = "H")]
    H,
}

impl From<EcChoice> for EcLevel {
    fn from(ec: EcChoice) -> Self {
        match ec {
            EcChoice::M => EcLevel::M,
            EcChoice::H => EcLevel::H,
        }
    }
}

/// 正方形布尔网格，true = 深色模块；不含静区
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct QrMatrix {
    dimension: usize,
    cells: Vec<bool>,
}

impl QrMatrix {
    /// 每边模块数
    pub fn dimension(&self) -> usize {
        self.dimension
    }

    pub fn is_dark(&self, row: usize, col: usize) -> bool {
        row < self.dimension && col < self.dimension && self.cells[row * self.dimension + col]
    }

    /// 逐个产出深色模块的 (row, col)
    pub fn dark_modules(&self) -> impl Iterator<Item = (usize, usize)> + '_ {
        let n = self.dimension;
        (0..n * n)
            .map(move |i| (i / n, i % n))
            .filter(move |&(row, col)| self.is_dark(row, col))
    }

    #[cfg(test)]
    pub fn from_rows(rows: &[&[bool]]) -> Self {
        let dimension = rows.len();
        assert!(rows.iter().all(|r| r.len() == dimension), "matrix must be square");
        Self {
            dimension,
            cells: rows.iter().flat_map(|r| r.iter().copied()).collect(),
        }
    }
}

impl From<&QrCode> for QrMatrix {
    fn from(code: &QrCode) -> Self {
        Self {
            dimension: code.width(),
            cells: code
                .to_colors()
                .into_iter()
                .map(|c| c == Color::Dark)
                .collect(),
        }
    }
}

/// 编码 payload；容量不足等错误以 `MagnetError::Encoding` 返回
pub fn encode(payload: &str, ec: EcChoice) -> Result<QrMatrix, MagnetError> {
    let code = QrCode::with_error_correction_level(payload.as_bytes(), ec.into())?;
    let matrix = QrMatrix::from(&code);
    log::debug!(
        "二维码: {} 字节 payload → {}×{} 模块 (EC {:?})",
        payload.len(),
        matrix.dimension(),
        matrix.dimension(),
        ec
    );
    Ok(matrix)
}

/// 终端预览用的 UTF-8 块字符二维码
pub fn terminal(payload: &str, ec: EcChoice) -> Result<String, MagnetError> {
    let code = QrCode::with_error_correction_level(payload.as_bytes(), ec.into())?;
    let image = code
        .render::<unicode::Dense1x2>()
        .quiet_zone(true)
        .build();

    // 每行加两个前导空格，与周围输出拉开距离
    let padded = image
        .lines()
        .map(|l| format!("  {l}"))
        .collect::<Vec<_>>()
        .join("\n");

    Ok(padded)
}
