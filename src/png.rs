// src/png.rs - 用 resvg 把导出 DPI 下的 SVG 栅格化为 PNG

use crate::error::MagnetError;
use crate::fonts;
use crate::types::RenderTarget;
use resvg::{tiny_skia, usvg};

/// `svg` 须以像素为单位、与 `target` 同尺寸；返回 PNG 字节
pub fn rasterize(
    svg: &str,
    target: &RenderTarget,
    default_family: &str,
) -> Result<Vec<u8>, MagnetError> {
    let mut opt = usvg::Options::default();
    opt.font_family = fonts::primary(default_family).to_string();
    opt.fontdb_mut().load_system_fonts();

    let tree = usvg::Tree::from_str(svg, &opt).map_err(|e| MagnetError::export("PNG", e))?;

    let (w, h) = target.pixel_size();
    let mut pixmap = tiny_skia::Pixmap::new(w, h)
        .ok_or_else(|| MagnetError::export("PNG", format!("无法分配 {w}×{h} 画布")))?;

    resvg::render(&tree, tiny_skia::Transform::default(), &mut pixmap.as_mut());
    log::debug!("PNG 栅格化完成: {w}×{h}");

    pixmap.encode_png().map_err(|e| MagnetError::export("PNG", e))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::layout::{layout, QrSlot};
    use crate::qr::{encode, EcChoice};
    use crate::svg::{render, ArcTextMode, SvgOptions, SvgUnit};
    use crate::types::{DesignSpec, MagnetTexts, ShapeKind, TextSpec};

    fn line(content: &str) -> TextSpec {
        TextSpec {
            content: content.into(),
            font_family: "Arial, sans-serif".into(),
            size_pt: 6.0,
        }
    }

    #[test]
    fn rasterizes_round_magnet_to_png() {
        let shape = ShapeKind::Round.magnet();
        let target = RenderTarget::export(&shape, 96.0, 1.0);
        let m = encode("WIFI:T:WPA;S:Home;P:pw;H:false;;", EcChoice::M).unwrap();
        let texts = MagnetTexts {
            greeting: line("Hello"),
            instruction: line("Scan"),
            network: line("Network: Home"),
            password: line("Password: pw"),
        };
        let prims = layout(QrSlot::Code(&m), &texts, &shape, &DesignSpec::default(), &target);
        let svg = render(
            &prims,
            &target,
            SvgOptions {
                unit: SvgUnit::Px,
                arc_mode: ArcTextMode::Glyphs,
            },
        );

        let png = rasterize(&svg, &target, "Arial, sans-serif").unwrap();
        assert_eq!(&png[..8], b"\x89PNG\r\n\x1a\n");
    }

    #[test]
    fn control_characters_in_labels_still_rasterize() {
        let shape = ShapeKind::Square.magnet();
        let target = RenderTarget::export(&shape, 72.0, 1.0);
        let texts = MagnetTexts {
            greeting: line("Hi\u{7}"),
            instruction: line("Scan"),
            network: line("Network: Bad\u{1}Net"),
            password: line("Password: \u{1b}pw"),
        };
        let prims = layout(QrSlot::Missing, &texts, &shape, &DesignSpec::default(), &target);
        let svg = render(
            &prims,
            &target,
            SvgOptions {
                unit: SvgUnit::Px,
                arc_mode: ArcTextMode::Glyphs,
            },
        );

        let png = rasterize(&svg, &target, "sans-serif").unwrap();
        assert_eq!(&png[..8], b"\x89PNG\r\n\x1a\n");
    }

    #[test]
    fn malformed_svg_is_export_error() {
        let target = RenderTarget::export(&ShapeKind::Square.magnet(), 96.0, 1.0);
        let err = rasterize("<svg", &target, "sans-serif").unwrap_err();
        assert!(matches!(err, MagnetError::Export { .. }));
    }
}
