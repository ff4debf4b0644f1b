// src/types.rs - 所有核心数据类型

use clap::ValueEnum;
use serde::{Deserialize, Serialize};

/// 每英寸毫米数，mm ↔ px 换算的唯一常量
pub const MM_PER_INCH: f64 = 25.4;

/// 每英寸磅数（字号以 pt 给出）
pub const PT_PER_INCH: f64 = 72.0;

/// 加密类型（只保留二维码 `T:` 字段能表达的三种）
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum Security {
    Wpa,
    Wep,
    #[value(name = "nopass")]
    NoPass,
}

impl Security {
    pub fn needs_password(&self) -> bool {
        !matches!(self, Security::NoPass)
    }

    /// 二维码 `T:` 字段的取值
    pub fn payload_token(&self) -> &'static str {
        match self {
            Security::Wpa => "WPA",
            Security::Wep => "WEP",
            Security::NoPass => "nopass",
        }
    }
}

impl std::fmt::Display for Security {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.payload_token())
    }
}

impl From<&str> for Security {
    /// 兼容 nmcli 的 SECURITY 列（"WPA2 WPA3"、"WEP"、"--"）和 payload 中的 `T:` 值
    fn from(s: &str) -> Self {
        let up = s.trim().to_uppercase();
        if up.contains("WPA") || up.contains("SAE") {
            Security::Wpa
        } else if up.contains("WEP") {
            Security::Wep
        } else {
            Security::NoPass
        }
    }
}

/// 一组 Wi-Fi 凭据
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WifiCredentials {
    pub ssid: String,
    /// `security = NoPass` 时忽略
    pub password: String,
    pub security: Security,
    /// 隐藏网络（写入 `H:` 字段）
    #[serde(default)]
    pub hidden: bool,
}

/// CLI / 配置里选择的形状
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum ShapeKind {
    #[default]
    Square,
    Round,
}

impl ShapeKind {
    /// 固定目录中的尺寸
    pub fn magnet(self) -> MagnetShape {
        match self {
            ShapeKind::Square => MagnetShape::Square { side_mm: 60.0 },
            ShapeKind::Round => MagnetShape::Round { diameter_mm: 65.0 },
        }
    }
}

/// 磁贴外形，尺寸单位 mm
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub enum MagnetShape {
    Square { side_mm: f64 },
    Round { diameter_mm: f64 },
}

impl MagnetShape {
    pub fn name(&self) -> &'static str {
        match self {
            MagnetShape::Square { .. } => "square",
            MagnetShape::Round { .. } => "round",
        }
    }

    /// 面向用户的尺寸描述，如 `60×60mm`、`Ø65mm`
    pub fn dimensions(&self) -> String {
        match self {
            MagnetShape::Square { side_mm } => format!("{side_mm}×{side_mm}mm"),
            MagnetShape::Round { diameter_mm } => format!("Ø{diameter_mm}mm"),
        }
    }

    pub fn width_mm(&self) -> f64 {
        match *self {
            MagnetShape::Square { side_mm } => side_mm,
            MagnetShape::Round { diameter_mm } => diameter_mm,
        }
    }

    pub fn height_mm(&self) -> f64 {
        self.width_mm()
    }
}

/// 一段文字：内容、字体族（CSS 形式）、字号（pt）
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TextSpec {
    pub content: String,
    pub font_family: String,
    pub size_pt: f64,
}

/// 磁贴上的四段文字
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MagnetTexts {
    pub greeting: TextSpec,
    pub instruction: TextSpec,
    pub network: TextSpec,
    pub password: TextSpec,
}

/// 各段文字字号（pt）
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TextSizes {
    pub greeting: f64,
    pub instruction: f64,
    pub credentials: f64,
}

impl Default for TextSizes {
    fn default() -> Self {
        Self {
            greeting: 8.0,
            instruction: 6.0,
            credentials: 5.0,
        }
    }
}

/// 版式常量，全部以 mm 表示
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DesignSpec {
    pub qr_size_mm: f64,
    pub margin_mm: f64,
    pub text_sizes: TextSizes,
    /// 纵向堆叠时相邻元素的间距
    pub line_gap_mm: f64,
    /// 圆形磁贴上二维码中心相对圆心的上移量
    pub round_qr_lift_mm: f64,
    /// 弧形文字半径 = 外圆半径 - margin - arc_offset
    pub arc_offset_mm: f64,
    /// 圆形磁贴是否把二维码裁成圆形
    pub clip_round_qr: bool,
    /// 圆形磁贴的问候语/说明是否沿弧排布
    pub arc_text: bool,
}

impl Default for DesignSpec {
    fn default() -> Self {
        Self {
            qr_size_mm: 40.0,
            margin_mm: 3.0,
            text_sizes: TextSizes::default(),
            line_gap_mm: 1.2,
            round_qr_lift_mm: 5.0,
            arc_offset_mm: 3.5,
            clip_round_qr: true,
            arc_text: true,
        }
    }
}

/// 输出画布：逻辑尺寸由 mm × dpi 得到，再乘以 dpi_scale 得到设备像素
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct RenderTarget {
    pub width_px: f64,
    pub height_px: f64,
    pub dpi: f64,
    pub dpi_scale: f64,
}

impl RenderTarget {
    /// 预览画布最长边的逻辑像素
    pub const PREVIEW_PX: f64 = 150.0;

    pub fn export(shape: &MagnetShape, dpi: f64, dpi_scale: f64) -> Self {
        let mut target = Self {
            width_px: 0.0,
            height_px: 0.0,
            dpi,
            dpi_scale,
        };
        target.width_px = target.mm(shape.width_mm());
        target.height_px = target.mm(shape.height_mm());
        target
    }

    /// 1 个用户单位 = 1 mm，用于打印 SVG
    pub fn millimetres(shape: &MagnetShape) -> Self {
        Self::export(shape, MM_PER_INCH, 1.0)
    }

    /// 预览画布：最长边 150 逻辑像素，再按 dpi_scale 超采样
    pub fn preview(shape: &MagnetShape, dpi_scale: f64) -> Self {
        let longest = shape.width_mm().max(shape.height_mm());
        let dpi = Self::PREVIEW_PX / longest * MM_PER_INCH;
        Self::export(shape, dpi, dpi_scale)
    }

    pub fn px_per_mm(&self) -> f64 {
        self.dpi / MM_PER_INCH
    }

    /// mm → 设备像素；两次缩放各只在这里做一次
    pub fn mm(&self, mm: f64) -> f64 {
        mm * self.px_per_mm() * self.dpi_scale
    }

    /// pt → 设备像素
    pub fn pt(&self, pt: f64) -> f64 {
        self.mm(pt * MM_PER_INCH / PT_PER_INCH)
    }

    /// 位图尺寸（向上取整，至少 1px）
    pub fn pixel_size(&self) -> (u32, u32) {
        (
            (self.width_px.ceil() as u32).max(1),
            (self.height_px.ceil() as u32).max(1),
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn square_at_300_dpi_is_708_px() {
        let target = RenderTarget::export(&ShapeKind::Square.magnet(), 300.0, 1.0);
        assert!((target.width_px - 708.661).abs() < 0.01);
        assert!((target.height_px - 708.661).abs() < 0.01);
        assert_eq!(target.pixel_size(), (709, 709));
    }

    #[test]
    fn dpi_scale_multiplies_once() {
        let shape = ShapeKind::Round.magnet();
        let one = RenderTarget::export(&shape, 96.0, 1.0);
        let two = RenderTarget::export(&shape, 96.0, 2.0);
        assert!((two.width_px - 2.0 * one.width_px).abs() < 1e-9);
        assert!((two.mm(10.0) - 2.0 * one.mm(10.0)).abs() < 1e-9);
    }

    #[test]
    fn millimetre_target_uses_mm_units() {
        let target = RenderTarget::millimetres(&ShapeKind::Round.magnet());
        assert!((target.width_px - 65.0).abs() < 1e-9);
        assert!((target.mm(3.0) - 3.0).abs() < 1e-9);
        // 72pt = 1 inch
        assert!((target.pt(72.0) - 25.4).abs() < 1e-9);
    }

    #[test]
    fn preview_longest_side_is_150_logical_px() {
        let target = RenderTarget::preview(&ShapeKind::Square.magnet(), 2.0);
        assert!((target.width_px - 300.0).abs() < 1e-9);
    }

    #[test]
    fn security_from_nmcli_column() {
        assert_eq!(Security::from("WPA2 WPA3"), Security::Wpa);
        assert_eq!(Security::from("WEP"), Security::Wep);
        assert_eq!(Security::from("--"), Security::NoPass);
        assert_eq!(Security::from(""), Security::NoPass);
        assert_eq!(Security::from("nopass"), Security::NoPass);
    }

    #[test]
    fn shape_catalog() {
        assert_eq!(ShapeKind::Square.magnet().dimensions(), "60×60mm");
        assert_eq!(ShapeKind::Round.magnet().dimensions(), "Ø65mm");
        assert_eq!(ShapeKind::Round.magnet().name(), "round");
    }
}
