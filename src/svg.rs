// src/svg.rs - 图元列表序列化为 SVG 文本

use crate::layout::{
    ArcDirection, ArcPath, BackgroundShape, Circle, PlaceholderKind, Point, Primitive, TextRun,
};
use crate::types::RenderTarget;
use serde::{Deserialize, Serialize};

/// 根元素 width/height 的单位
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SvgUnit {
    /// 打印用；配合 `RenderTarget::millimetres`
    Mm,
    /// 栅格化用
    Px,
}

impl SvgUnit {
    fn suffix(self) -> &'static str {
        match self {
            SvgUnit::Mm => "mm",
            SvgUnit::Px => "px",
        }
    }
}

/// 弧形文字的输出方式
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, clap::ValueEnum)]
#[serde(rename_all = "kebab-case")]
pub enum ArcTextMode {
    /// 每个字符单独旋转，与 PNG 输出一致
    #[default]
    Glyphs,
    /// `<textPath>` 引用弧线，便于在编辑器里继续修改
    TextPath,
}

#[derive(Debug, Clone, Copy)]
pub struct SvgOptions {
    pub unit: SvgUnit,
    pub arc_mode: ArcTextMode,
}

pub fn render(primitives: &[Primitive], target: &RenderTarget, opts: SvgOptions) -> String {
    let mut defs = String::new();
    let mut body = String::new();
    let mut clip_count = 0usize;

    for p in primitives {
        match p {
            Primitive::Background {
                shape,
                fill,
                stroke,
                stroke_width,
            } => {
                let paint = format!(
                    r#"fill="{fill}" stroke="{stroke}" stroke-width="{}""#,
                    num(*stroke_width)
                );
                match shape {
                    BackgroundShape::Rect { x, y, width, height } => body.push_str(&format!(
                        "<rect x=\"{}\" y=\"{}\" width=\"{}\" height=\"{}\" {paint}/>\n",
                        num(*x),
                        num(*y),
                        num(*width),
                        num(*height)
                    )),
                    BackgroundShape::Circle(c) => {
                        body.push_str(&format!("{} {paint}/>\n", circle_open(c)))
                    }
                }
            }

            Primitive::QrBlock {
                origin,
                module_size,
                matrix,
                clip,
            } => {
                let clip_attr = clip_ref(clip, &mut clip_count, &mut defs);
                body.push_str(&format!("<g fill=\"#000000\"{clip_attr}>\n"));
                for (row, col) in matrix.dark_modules() {
                    body.push_str(&format!(
                        "<rect x=\"{}\" y=\"{}\" width=\"{}\" height=\"{}\"/>\n",
                        num(origin.x + col as f64 * module_size),
                        num(origin.y + row as f64 * module_size),
                        num(*module_size),
                        num(*module_size)
                    ));
                }
                body.push_str("</g>\n");
            }

            Primitive::Placeholder {
                origin,
                size,
                kind,
                clip,
            } => {
                let clip_attr = clip_ref(clip, &mut clip_count, &mut defs);
                let (fill, stroke, ink) = match kind {
                    PlaceholderKind::Missing => ("#f3f3f3", "#999999", "#666666"),
                    PlaceholderKind::EncodingFailed => ("#fdecea", "#c0392b", "#c0392b"),
                };
                let font = size / 24.0;
                body.push_str(&format!(
                    "<g{clip_attr}>\n<rect x=\"{}\" y=\"{}\" width=\"{s}\" height=\"{s}\" fill=\"{fill}\" stroke=\"{stroke}\" stroke-width=\"{}\" stroke-dasharray=\"{d} {d}\"/>\n",
                    num(origin.x),
                    num(origin.y),
                    num(size / 200.0),
                    s = num(*size),
                    d = num(size / 40.0),
                ));
                body.push_str(&format!(
                    "<text x=\"{}\" y=\"{}\" font-family=\"sans-serif\" font-size=\"{}\" fill=\"{ink}\" text-anchor=\"middle\">{}</text>\n</g>\n",
                    num(origin.x + size / 2.0),
                    num(origin.y + size / 2.0 + font / 3.0),
                    num(font),
                    escape_xml(kind.message())
                ));
            }

            Primitive::TextRun(run) => match &run.path {
                None => body.push_str(&format!(
                    "<text x=\"{}\" y=\"{}\" {}>{}</text>\n",
                    num(run.origin.x),
                    num(run.origin.y),
                    text_attrs(run),
                    escape_xml(&run.content)
                )),
                Some(arc) => match opts.arc_mode {
                    ArcTextMode::Glyphs => body.push_str(&arc_glyphs(run, arc)),
                    ArcTextMode::TextPath => {
                        let id = format!("arc-{}", run.role.id());
                        defs.push_str(&format!(
                            "<path id=\"{id}\" d=\"{}\" fill=\"none\"/>\n",
                            arc_d(arc)
                        ));
                        body.push_str(&format!(
                            "<text {}><textPath href=\"#{id}\" startOffset=\"50%\">{}</textPath></text>\n",
                            text_attrs(run),
                            escape_xml(&run.content)
                        ));
                    }
                },
            },
        }
    }

    let (w, h) = (num(target.width_px), num(target.height_px));
    let unit = opts.unit.suffix();
    let mut svg = format!(
        "<svg xmlns=\"http://www.w3.org/2000/svg\" width=\"{w}{unit}\" height=\"{h}{unit}\" viewBox=\"0 0 {w} {h}\">\n"
    );
    if !defs.is_empty() {
        svg.push_str("<defs>\n");
        svg.push_str(&defs);
        svg.push_str("</defs>\n");
    }
    svg.push_str(&body);
    svg.push_str("</svg>\n");
    svg
}

fn circle_open(c: &Circle) -> String {
    format!(
        "<circle cx=\"{}\" cy=\"{}\" r=\"{}\"",
        num(c.cx),
        num(c.cy),
        num(c.r)
    )
}

/// 需要裁剪时登记一个 `<clipPath>`，返回引用它的属性
fn clip_ref(clip: &Option<Circle>, count: &mut usize, defs: &mut String) -> String {
    match clip {
        None => String::new(),
        Some(c) => {
            *count += 1;
            let id = format!("qr-clip-{count}");
            defs.push_str(&format!(
                "<clipPath id=\"{id}\">{}/></clipPath>\n",
                circle_open(c)
            ));
            format!(" clip-path=\"url(#{id})\"")
        }
    }
}

fn text_attrs(run: &TextRun) -> String {
    format!(
        "font-family=\"{}\" font-size=\"{}\" fill=\"#000000\" text-anchor=\"middle\"",
        escape_xml(&run.font_family),
        num(run.size_px)
    )
}

fn arc_glyphs(run: &TextRun, arc: &ArcPath) -> String {
    let mut out = format!("<g {}>\n", text_attrs(run));
    for g in arc.glyphs.iter().filter(|g| !g.ch.is_whitespace() && xml_char(g.ch)) {
        let (x, y) = (num(g.position.x), num(g.position.y));
        out.push_str(&format!(
            "<text x=\"{x}\" y=\"{y}\" transform=\"rotate({} {x} {y})\">{}</text>\n",
            num(g.rotation.to_degrees()),
            escape_xml(g.ch.encode_utf8(&mut [0u8; 4]))
        ));
    }
    out.push_str("</g>\n");
    out
}

/// 从左端点到右端点的半圆弧；上弧顺时针经过顶部，下弧逆时针经过底部
fn arc_d(arc: &ArcPath) -> String {
    let Point { x, y } = arc.center;
    let r = arc.radius;
    let sweep = match arc.direction {
        ArcDirection::Clockwise => 1,
        ArcDirection::CounterClockwise => 0,
    };
    format!(
        "M {} {} A {r} {r} 0 0 {sweep} {} {}",
        num(x - r),
        num(y),
        num(x + r),
        num(y),
        r = num(r)
    )
}

/// 最多三位小数，去掉多余的 0
fn num(v: f64) -> String {
    let s = format!("{v:.3}");
    let s = s.trim_end_matches('0').trim_end_matches('.');
    match s {
        "-0" | "" => "0".to_string(),
        _ => s.to_string(),
    }
}

fn escape_xml(input: &str) -> String {
    let mut out = String::with_capacity(input.len());
    for ch in input.chars() {
        match ch {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&apos;"),
            c if xml_char(c) => out.push(c),
            // XML 1.0 不允许的字符直接丢弃
            _ => {}
        }
    }
    out
}

/// XML 1.0 `Char` 产生式：tab、换行、回车以外的 C0 控制字符与 U+FFFE/U+FFFF 不合法
fn xml_char(c: char) -> bool {
    matches!(c, '\t' | '\n' | '\r' | '\u{20}'..='\u{FFFD}' | '\u{10000}'..)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::layout::{layout, QrSlot};
    use crate::qr::QrMatrix;
    use crate::types::{DesignSpec, MagnetTexts, ShapeKind, TextSpec};
    use pretty_assertions::assert_eq;

    fn line(content: &str) -> TextSpec {
        TextSpec {
            content: content.into(),
            font_family: "Montserrat, sans-serif".into(),
            size_pt: 6.0,
        }
    }

    fn texts() -> MagnetTexts {
        MagnetTexts {
            greeting: line("Tom & Jerry's <Wi-Fi>"),
            instruction: line("Scan"),
            network: line("Network: Home"),
            password: line("Password: a\"b"),
        }
    }

    fn opts(arc_mode: ArcTextMode) -> SvgOptions {
        SvgOptions {
            unit: SvgUnit::Mm,
            arc_mode,
        }
    }

    #[test]
    fn number_formatting() {
        assert_eq!(num(1.0), "1");
        assert_eq!(num(708.6614), "708.661");
        assert_eq!(num(0.1), "0.1");
        assert_eq!(num(-0.0001), "0");
    }

    #[test]
    fn square_svg_is_sized_in_mm_with_one_rect_per_dark_module() {
        let shape = ShapeKind::Square.magnet();
        let target = RenderTarget::millimetres(&shape);
        let m = QrMatrix::from_rows(&[&[true, false], &[true, true]]);
        let prims = layout(QrSlot::Code(&m), &texts(), &shape, &DesignSpec::default(), &target);
        let svg = render(&prims, &target, opts(ArcTextMode::Glyphs));

        assert!(svg.starts_with(
            "<svg xmlns=\"http://www.w3.org/2000/svg\" width=\"60mm\" height=\"60mm\" viewBox=\"0 0 60 60\">"
        ));
        assert!(svg.trim_end().ends_with("</svg>"));
        // 背景 1 个 + 深色模块 3 个
        assert_eq!(svg.matches("<rect").count(), 4);
        assert!(svg.contains("width=\"20\" height=\"20\"/>"));
        assert!(!svg.contains("clip-path"));
    }

    #[test]
    fn text_content_is_escaped() {
        let shape = ShapeKind::Square.magnet();
        let target = RenderTarget::millimetres(&shape);
        let prims = layout(QrSlot::Missing, &texts(), &shape, &DesignSpec::default(), &target);
        let svg = render(&prims, &target, opts(ArcTextMode::Glyphs));
        assert!(svg.contains("Tom &amp; Jerry&apos;s &lt;Wi-Fi&gt;"));
        assert!(svg.contains("Password: a&quot;b"));
        assert!(svg.contains("Enter network name to generate QR code"));
    }

    #[test]
    fn round_svg_uses_clip_and_text_path() {
        let shape = ShapeKind::Round.magnet();
        let target = RenderTarget::millimetres(&shape);
        let m = QrMatrix::from_rows(&[&[true]]);
        let prims = layout(QrSlot::Code(&m), &texts(), &shape, &DesignSpec::default(), &target);
        let svg = render(&prims, &target, opts(ArcTextMode::TextPath));

        assert!(svg.contains(
            "<clipPath id=\"qr-clip-1\"><circle cx=\"32.5\" cy=\"27.5\" r=\"20\"/></clipPath>"
        ));
        assert!(svg.contains("clip-path=\"url(#qr-clip-1)\""));
        assert!(svg.contains("<path id=\"arc-greeting\" d=\"M 6.5 32.5 A 26 26 0 0 1 58.5 32.5\""));
        assert!(
            svg.contains("<path id=\"arc-instruction\" d=\"M 6.5 32.5 A 26 26 0 0 0 58.5 32.5\"")
        );
        assert_eq!(svg.matches("<textPath").count(), 2);
    }

    #[test]
    fn glyph_mode_rotates_each_visible_character() {
        let shape = ShapeKind::Round.magnet();
        let target = RenderTarget::millimetres(&shape);
        let mut t = texts();
        t.greeting = line("A B");
        t.instruction = line("");
        let prims = layout(QrSlot::Missing, &t, &shape, &DesignSpec::default(), &target);
        let svg = render(&prims, &target, opts(ArcTextMode::Glyphs));
        assert_eq!(svg.matches("transform=\"rotate(").count(), 2);
        assert!(!svg.contains("<textPath"));
    }

    #[test]
    fn control_characters_are_dropped_from_text() {
        assert_eq!(escape_xml("Bad\u{1}Net\u{1b}"), "BadNet");
        assert_eq!(escape_xml("a\tb\nc\r"), "a\tb\nc\r");
        assert_eq!(escape_xml("x\u{FFFE}y\u{1F4F6}"), "xy\u{1F4F6}");

        let shape = ShapeKind::Round.magnet();
        let target = RenderTarget::millimetres(&shape);
        let mut t = texts();
        t.greeting = line("Hi\u{7}!");
        t.network = line("Network: Bad\u{1}Net");
        let prims = layout(QrSlot::Missing, &t, &shape, &DesignSpec::default(), &target);
        let svg = render(&prims, &target, opts(ArcTextMode::Glyphs));
        assert!(svg.contains("Network: BadNet"));
        assert!(!svg.contains('\u{1}'));
        assert!(!svg.contains('\u{7}'));
        // 只剩 "H" "i" "!" 三个弧上字符 + "Scan" 四个
        assert_eq!(svg.matches("transform=\"rotate(").count(), 7);
    }
}
