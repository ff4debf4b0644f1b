// src/layout.rs - 把二维码与文字排到画布上，输出与绘制端无关的图元

use crate::qr::QrMatrix;
use crate::types::{DesignSpec, MagnetShape, MagnetTexts, RenderTarget, TextSpec};
use serde::Serialize;
use std::f64::consts::{FRAC_PI_2, PI};

/// 两条弧共用的角度预算：每条弧占一半，即最多 0.9π
pub const ARC_BUDGET: f64 = PI * 1.8;

pub const BACKGROUND_FILL: &str = "#ffffff";
pub const BACKGROUND_STROKE: &str = "#000000";
/// 背景轮廓线宽（mm）
const OUTLINE_MM: f64 = 0.1;

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Point {
    pub x: f64,
    pub y: f64,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Circle {
    pub cx: f64,
    pub cy: f64,
    pub r: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub enum BackgroundShape {
    Rect { x: f64, y: f64, width: f64, height: f64 },
    Circle(Circle),
}

/// 二维码位置上的内容来源
#[derive(Debug, Clone, Copy)]
pub enum QrSlot<'a> {
    Code(&'a QrMatrix),
    /// SSID 为空
    Missing,
    /// 编码器报错
    Failed,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum PlaceholderKind {
    Missing,
    EncodingFailed,
}

impl PlaceholderKind {
    pub fn message(self) -> &'static str {
        match self {
            PlaceholderKind::Missing => "Enter network name to generate QR code",
            PlaceholderKind::EncodingFailed => "QR code could not be generated",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum TextRole {
    Greeting,
    Instruction,
    Network,
    Password,
}

impl TextRole {
    pub fn id(self) -> &'static str {
        match self {
            TextRole::Greeting => "greeting",
            TextRole::Instruction => "instruction",
            TextRole::Network => "network",
            TextRole::Password => "password",
        }
    }
}

/// 屏幕坐标系（y 向下）中的前进方向
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum ArcDirection {
    /// 角度递增；上弧从左到右
    Clockwise,
    /// 角度递减；下弧从左到右
    CounterClockwise,
}

/// 单个字符在弧上的位置与旋转（弧度，0 = 正立）
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct PlacedGlyph {
    pub ch: char,
    pub position: Point,
    pub rotation: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ArcPath {
    pub center: Point,
    pub radius: f64,
    pub mid_angle: f64,
    pub direction: ArcDirection,
    pub glyphs: Vec<PlacedGlyph>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TextRun {
    pub role: TextRole,
    pub content: String,
    /// 直排时为基线中点；弧排时为弧的中点
    pub origin: Point,
    pub font_family: String,
    pub size_px: f64,
    pub path: Option<ArcPath>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub enum Primitive {
    Background {
        shape: BackgroundShape,
        fill: &'static str,
        stroke: &'static str,
        stroke_width: f64,
    },
    QrBlock {
        origin: Point,
        module_size: f64,
        matrix: QrMatrix,
        clip: Option<Circle>,
    },
    Placeholder {
        origin: Point,
        size: f64,
        kind: PlaceholderKind,
        clip: Option<Circle>,
    },
    TextRun(TextRun),
}

/// 沿圆弧逐字排布，每个字符都与弧相切。
///
/// `step` 以字符数为参数返回相邻字符的角距；整段以 `mid_angle` 为中心。
pub fn place_on_arc(
    text: &str,
    center: Point,
    radius: f64,
    mid_angle: f64,
    direction: ArcDirection,
    step: impl Fn(usize) -> f64,
) -> Vec<PlacedGlyph> {
    let chars: Vec<char> = text.chars().collect();
    if chars.is_empty() {
        return Vec::new();
    }

    let step = step(chars.len());
    let sign = match direction {
        ArcDirection::Clockwise => 1.0,
        ArcDirection::CounterClockwise => -1.0,
    };
    let half = (chars.len() - 1) as f64 / 2.0;

    chars
        .into_iter()
        .enumerate()
        .map(|(i, ch)| {
            let angle = mid_angle + sign * (i as f64 - half) * step;
            PlacedGlyph {
                ch,
                position: Point {
                    x: center.x + radius * angle.cos(),
                    y: center.y + radius * angle.sin(),
                },
                rotation: angle + sign * FRAC_PI_2,
            }
        })
        .collect()
}

/// 每条弧的字符角距：`π × 1.8 / len` 的预算由上下两条弧平分
pub fn arc_step(len: usize) -> f64 {
    ARC_BUDGET / (2.0 * len.max(1) as f64)
}

/// 排版入口：背景、二维码（或占位块）、文字
pub fn layout(
    qr: QrSlot<'_>,
    texts: &MagnetTexts,
    shape: &MagnetShape,
    design: &DesignSpec,
    target: &RenderTarget,
) -> Vec<Primitive> {
    log::debug!(
        "排版 {} 于 {:.1}×{:.1}px (dpi {}, ×{})",
        shape.name(),
        target.width_px,
        target.height_px,
        target.dpi,
        target.dpi_scale
    );
    let mut ctx = Ctx {
        out: Vec::with_capacity(6),
        texts,
        design,
        target,
    };
    match shape {
        MagnetShape::Square { .. } => ctx.square(qr),
        MagnetShape::Round { .. } => ctx.round(qr),
    }
    ctx.out
}

struct Ctx<'a> {
    out: Vec<Primitive>,
    texts: &'a MagnetTexts,
    design: &'a DesignSpec,
    target: &'a RenderTarget,
}

enum Item<'a> {
    Text(TextRole, &'a TextSpec),
    Qr,
}

impl<'a> Ctx<'a> {
    fn square(&mut self, qr: QrSlot<'_>) {
        let t = self.target;
        let (w, h) = (t.width_px, t.height_px);
        self.out.push(Primitive::Background {
            shape: BackgroundShape::Rect { x: 0.0, y: 0.0, width: w, height: h },
            fill: BACKGROUND_FILL,
            stroke: BACKGROUND_STROKE,
            stroke_width: t.mm(OUTLINE_MM),
        });

        let texts = self.texts;
        let items: Vec<Item<'_>> = [
            Item::Text(TextRole::Greeting, &texts.greeting),
            Item::Qr,
            Item::Text(TextRole::Instruction, &texts.instruction),
            Item::Text(TextRole::Network, &texts.network),
            Item::Text(TextRole::Password, &texts.password),
        ]
        .into_iter()
        .filter(|item| match item {
            Item::Text(_, text) => !text.content.is_empty(),
            Item::Qr => true,
        })
        .collect();

        let qr_px = t.mm(self.design.qr_size_mm);
        let gap = t.mm(self.design.line_gap_mm);
        let margin = t.mm(self.design.margin_mm);

        let stack: f64 = items
            .iter()
            .map(|item| match item {
                Item::Text(_, text) => t.pt(text.size_pt),
                Item::Qr => qr_px,
            })
            .sum::<f64>()
            + gap * (items.len() as f64 - 1.0);

        // 整体垂直居中，但不侵入页边距
        let mut y = ((h - stack) / 2.0).max(margin);
        let cx = w / 2.0;
        for item in items {
            match item {
                Item::Text(role, text) => {
                    let baseline = y + t.pt(text.size_pt);
                    self.straight(role, text, Point { x: cx, y: baseline });
                    y = baseline + gap;
                }
                Item::Qr => {
                    self.qr(qr, Point { x: cx - qr_px / 2.0, y }, qr_px, None);
                    y += qr_px + gap;
                }
            }
        }
    }

    fn round(&mut self, qr: QrSlot<'_>) {
        let t = self.target;
        let d = self.design;
        let center = Point {
            x: t.width_px / 2.0,
            y: t.height_px / 2.0,
        };
        let radius = t.width_px.min(t.height_px) / 2.0;
        self.out.push(Primitive::Background {
            shape: BackgroundShape::Circle(Circle { cx: center.x, cy: center.y, r: radius }),
            fill: BACKGROUND_FILL,
            stroke: BACKGROUND_STROKE,
            stroke_width: t.mm(OUTLINE_MM),
        });

        let qr_px = t.mm(d.qr_size_mm);
        let gap = t.mm(d.line_gap_mm);
        let qr_center = Point {
            x: center.x,
            y: center.y - t.mm(d.round_qr_lift_mm),
        };
        let origin = Point {
            x: qr_center.x - qr_px / 2.0,
            y: qr_center.y - qr_px / 2.0,
        };
        let clip = d.clip_round_qr.then_some(Circle {
            cx: qr_center.x,
            cy: qr_center.y,
            r: qr_px / 2.0,
        });
        self.qr(qr, origin, qr_px, clip);

        let texts = self.texts;
        let text_radius = radius - t.mm(d.margin_mm) - t.mm(d.arc_offset_mm);
        // 不裁剪时整块方形都是二维码，弧上字符若会压到方块就改为直排
        let fits_arc = |text: &TextSpec, mid_angle: f64, direction: ArcDirection| {
            if !d.arc_text {
                return false;
            }
            if clip.is_some() {
                return true;
            }
            let glyphs = place_on_arc(
                &text.content,
                center,
                text_radius,
                mid_angle,
                direction,
                arc_step,
            );
            clear_of_block(&glyphs, origin, qr_px, t.pt(text.size_pt))
        };
        let greeting_arc = fits_arc(&texts.greeting, -FRAC_PI_2, ArcDirection::Clockwise);
        let instruction_arc =
            fits_arc(&texts.instruction, FRAC_PI_2, ArcDirection::CounterClockwise);
        if d.arc_text && !(greeting_arc && instruction_arc) {
            log::debug!("二维码未裁剪，弧形文字会压住方块，改为直排");
        }

        if greeting_arc {
            self.arc(
                TextRole::Greeting,
                &texts.greeting,
                center,
                text_radius,
                -FRAC_PI_2,
                ArcDirection::Clockwise,
            );
        } else if !texts.greeting.content.is_empty() {
            let baseline = Point {
                x: center.x,
                y: origin.y - gap,
            };
            self.straight(TextRole::Greeting, &texts.greeting, baseline);
        }
        if instruction_arc {
            self.arc(
                TextRole::Instruction,
                &texts.instruction,
                center,
                text_radius,
                FRAC_PI_2,
                ArcDirection::CounterClockwise,
            );
        }

        // 凭据始终直排，位于二维码下方、圆心以下
        let mut y = (origin.y + qr_px).max(center.y) + gap;
        let mut lines = vec![
            (TextRole::Network, &texts.network),
            (TextRole::Password, &texts.password),
        ];
        if !instruction_arc {
            lines.push((TextRole::Instruction, &texts.instruction));
        }
        for (role, text) in lines {
            if text.content.is_empty() {
                continue;
            }
            let baseline = y + t.pt(text.size_pt);
            self.straight(role, text, Point { x: center.x, y: baseline });
            y = baseline + gap;
        }
    }

    fn qr(&mut self, qr: QrSlot<'_>, origin: Point, size: f64, clip: Option<Circle>) {
        let primitive = match qr {
            QrSlot::Code(matrix) => Primitive::QrBlock {
                origin,
                module_size: size / matrix.dimension().max(1) as f64,
                matrix: matrix.clone(),
                clip,
            },
            QrSlot::Missing => Primitive::Placeholder {
                origin,
                size,
                kind: PlaceholderKind::Missing,
                clip,
            },
            QrSlot::Failed => Primitive::Placeholder {
                origin,
                size,
                kind: PlaceholderKind::EncodingFailed,
                clip,
            },
        };
        self.out.push(primitive);
    }

    fn straight(&mut self, role: TextRole, text: &TextSpec, origin: Point) {
        self.out.push(Primitive::TextRun(TextRun {
            role,
            content: text.content.clone(),
            origin,
            font_family: text.font_family.clone(),
            size_px: self.target.pt(text.size_pt),
            path: None,
        }));
    }

    fn arc(
        &mut self,
        role: TextRole,
        text: &TextSpec,
        center: Point,
        radius: f64,
        mid_angle: f64,
        direction: ArcDirection,
    ) {
        if text.content.is_empty() {
            return;
        }
        let glyphs = place_on_arc(&text.content, center, radius, mid_angle, direction, arc_step);
        self.out.push(Primitive::TextRun(TextRun {
            role,
            content: text.content.clone(),
            origin: Point {
                x: center.x + radius * mid_angle.cos(),
                y: center.y + radius * mid_angle.sin(),
            },
            font_family: text.font_family.clone(),
            size_px: self.target.pt(text.size_pt),
            path: Some(ArcPath {
                center,
                radius,
                mid_angle,
                direction,
                glyphs,
            }),
        }));
    }
}

/// 字符锚点（外扩 `pad`）全部落在方块之外
fn clear_of_block(glyphs: &[PlacedGlyph], origin: Point, size: f64, pad: f64) -> bool {
    glyphs.iter().all(|g| {
        let p = g.position;
        p.x < origin.x - pad
            || p.x > origin.x + size + pad
            || p.y < origin.y - pad
            || p.y > origin.y + size + pad
    })
}
