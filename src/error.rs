// src/error.rs - 磁贴生成过程中的错误分类

use qrcode::types::QrError;
use thiserror::Error;

/// 各环节可恢复的错误；都在发生处就地处理，不会冒泡到顶层
#[derive(Debug, Clone, PartialEq, Error)]
pub enum MagnetError {
    /// SSID 为空：不生成二维码，显示占位块
    #[error("网络名称 (SSID) 不能为空")]
    EmptySsid,

    /// 编码器拒绝 payload（通常是内容超出该纠错级别的容量）
    #[error("二维码编码失败: {0}")]
    Encoding(#[from] QrError),

    /// SVG/PNG 序列化或写文件失败
    #[error("导出 {target} 失败: {reason}")]
    Export { target: String, reason: String },

    /// 表单快照无法解析
    #[error("表单无效: {0}")]
    Form(String),
}

impl MagnetError {
    pub fn export(target: impl Into<String>, reason: impl ToString) -> Self {
        MagnetError::Export {
            target: target.into(),
            reason: reason.to_string(),
        }
    }
}
