// src/config.rs - 配置加载，支持文件覆盖

use crate::fonts;
use crate::qr::EcChoice;
use crate::svg::ArcTextMode;
use crate::types::{DesignSpec, ShapeKind};
use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// 默认问候语
    pub greeting: String,
    /// 默认说明文字
    pub instruction: String,
    pub shape: ShapeKind,
    pub fonts: FontChoice,
    pub labels: Labels,
    pub design: DesignSpec,
    pub export: ExportConfig,
    pub rofi: RofiConfig,
    /// watch 模式轮询表单文件的间隔（毫秒）
    pub watch_interval_ms: u64,
}

/// 三组文字各自使用的字体（目录中的名称）
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FontChoice {
    pub greeting: String,
    pub instruction: String,
    pub credentials: String,
}

/// 凭据行的前缀文字
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct Labels {
    pub network: String,
    pub password: String,
    /// 开放网络时代替密码行
    pub open_network: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ExportConfig {
    /// PNG 导出 DPI
    pub dpi: f64,
    /// 在 DPI 之外的超采样倍数
    pub dpi_scale: f64,
    /// 预览画布的设备像素倍数
    pub preview_scale: f64,
    /// 导出目录，缺省为当前目录
    pub out_dir: Option<PathBuf>,
    pub ec_level: EcChoice,
    pub arc_text_mode: ArcTextMode,
}

/// interactive 模式的 rofi 外观
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct RofiConfig {
    /// rofi 字体
    pub font: String,
    /// rofi 窗口位置 (0–8, 同 rofi -location)
    pub position: u8,
    pub x_offset: i32,
    pub y_offset: i32,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            greeting: "Scan to Connect".into(),
            instruction: "Point camera at QR code".into(),
            shape: ShapeKind::Square,
            fonts: FontChoice::default(),
            labels: Labels::default(),
            design: DesignSpec::default(),
            export: ExportConfig::default(),
            rofi: RofiConfig::default(),
            watch_interval_ms: 500,
        }
    }
}

impl Default for FontChoice {
    fn default() -> Self {
        Self {
            greeting: fonts::DEFAULT_TEXT_FONT.into(),
            instruction: fonts::DEFAULT_TEXT_FONT.into(),
            credentials: fonts::DEFAULT_CREDENTIALS_FONT.into(),
        }
    }
}

impl Default for Labels {
    fn default() -> Self {
        Self {
            network: "Network: ".into(),
            password: "Password: ".into(),
            open_network: "No password needed".into(),
        }
    }
}

impl Default for ExportConfig {
    fn default() -> Self {
        Self {
            dpi: 300.0,
            dpi_scale: 1.0,
            preview_scale: 2.0,
            out_dir: None,
            ec_level: EcChoice::M,
            arc_text_mode: ArcTextMode::Glyphs,
        }
    }
}

impl Default for RofiConfig {
    fn default() -> Self {
        Self {
            font: "DejaVu Sans Mono 8".into(),
            position: 0,
            x_offset: 0,
            y_offset: 0,
        }
    }
}

impl Config {
    /// 按优先级查找并加载配置文件；`explicit` 指定时只读它
    pub fn load(explicit: Option<&Path>) -> Result<Self> {
        if let Some(path) = explicit {
            return Self::from_file(path);
        }
        for path in &config_candidates() {
            if path.exists() {
                return Self::from_file(path);
            }
        }
        Ok(Config::default())
    }

    pub fn from_file(path: &Path) -> Result<Self> {
        let text = std::fs::read_to_string(path)
            .with_context(|| format!("读取配置 {} 失败", path.display()))?;
        let cfg: Config = toml::from_str(&text)
            .with_context(|| format!("解析配置 {} 失败", path.display()))?;
        log::debug!("已加载配置 {}", path.display());
        Ok(cfg)
    }

    /// 导出目录
    pub fn out_dir(&self) -> PathBuf {
        self.export
            .out_dir
            .clone()
            .unwrap_or_else(|| PathBuf::from("."))
    }
}

fn config_candidates() -> Vec<PathBuf> {
    let mut v = vec![];
    // 同目录下的 config.toml
    if let Ok(exe) = std::env::current_exe() {
        if let Some(dir) = exe.parent() {
            v.push(dir.join("config.toml"));
        }
    }
    // ~/.config/wifi-magnet/config.toml
    if let Some(dir) = dirs::config_dir() {
        v.push(dir.join("wifi-magnet/config.toml"));
    }
    v
}
