// src/export.rs - 导出 SVG/PNG 文件（原子写，防止留下写一半的文件）

use crate::config::Config;
use crate::error::MagnetError;
use crate::magnet::Magnet;
use crate::png;
use crate::svg::SvgUnit;
use crate::types::{MagnetShape, RenderTarget};
use clap::ValueEnum;
use std::path::{Path, PathBuf};

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum Format {
    Svg,
    Png,
    /// 同时导出两种
    Both,
}

impl Format {
    pub fn includes_svg(self) -> bool {
        matches!(self, Format::Svg | Format::Both)
    }

    pub fn includes_png(self) -> bool {
        matches!(self, Format::Png | Format::Both)
    }
}

/// `wifi-magnet-<shape>-<ssid>.<ext>`，SSID 只保留 `[A-Za-z0-9_-]`
pub fn file_name(shape: &MagnetShape, ssid: &str, ext: &str) -> String {
    let clean = sanitize(ssid);
    if clean.is_empty() {
        format!("wifi-magnet-{}.{ext}", shape.name())
    } else {
        format!("wifi-magnet-{}-{clean}.{ext}", shape.name())
    }
}

pub fn sanitize(s: &str) -> String {
    s.chars()
        .filter(|c| c.is_ascii_alphanumeric() || *c == '_' || *c == '-')
        .collect()
}

/// 原子写：先写临时文件再 rename
pub fn write_atomic(path: &Path, bytes: &[u8]) -> Result<(), MagnetError> {
    let target = path.display().to_string();
    if let Some(dir) = path.parent().filter(|d| !d.as_os_str().is_empty()) {
        std::fs::create_dir_all(dir).map_err(|e| MagnetError::export(&target, e))?;
    }
    let tmp = path.with_extension("tmp");
    std::fs::write(&tmp, bytes).map_err(|e| MagnetError::export(&target, e))?;
    std::fs::rename(&tmp, path).map_err(|e| {
        let _ = std::fs::remove_file(&tmp);
        MagnetError::export(&target, e)
    })
}

/// 打印用 SVG：1 用户单位 = 1 mm
pub fn svg(magnet: &Magnet, ssid: &str, cfg: &Config, dir: &Path) -> Result<PathBuf, MagnetError> {
    let target = RenderTarget::millimetres(&magnet.shape);
    let text = magnet.svg(&target, SvgUnit::Mm, cfg.export.arc_text_mode);
    let path = dir.join(file_name(&magnet.shape, ssid, "svg"));
    write_atomic(&path, text.as_bytes())?;
    log::info!("已导出 {}", path.display());
    Ok(path)
}

/// 按导出 DPI 重新排版后栅格化
pub fn png(magnet: &Magnet, ssid: &str, cfg: &Config, dir: &Path) -> Result<PathBuf, MagnetError> {
    let target = RenderTarget::export(&magnet.shape, cfg.export.dpi, cfg.export.dpi_scale);
    let text = magnet.svg(&target, SvgUnit::Px, cfg.export.arc_text_mode);
    let bytes = png::rasterize(&text, &target, &magnet.texts.greeting.font_family)?;
    let path = dir.join(file_name(&magnet.shape, ssid, "png"));
    write_atomic(&path, &bytes)?;
    log::info!("已导出 {}", path.display());
    Ok(path)
}

/// 按格式导出；失败只影响对应文件，返回成功写出的路径与遇到的错误
pub fn run(
    magnet: &Magnet,
    ssid: &str,
    cfg: &Config,
    dir: &Path,
    format: Format,
) -> (Vec<PathBuf>, Vec<MagnetError>) {
    let mut written = Vec::new();
    let mut errors = Vec::new();
    let mut record = |r: Result<PathBuf, MagnetError>| match r {
        Ok(p) => written.push(p),
        Err(e) => errors.push(e),
    };
    if format.includes_svg() {
        record(svg(magnet, ssid, cfg, dir));
    }
    if format.includes_png() {
        record(png(magnet, ssid, cfg, dir));
    }
    (written, errors)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::form::FormSnapshot;
    use crate::types::ShapeKind;

    #[test]
    fn filename_sanitizes_ssid() {
        let square = ShapeKind::Square.magnet();
        assert_eq!(file_name(&square, "Caf;e 2.4GHz", "svg"), "wifi-magnet-square-Cafe24GHz.svg");
        assert_eq!(
            file_name(&ShapeKind::Round.magnet(), "my_net-5G", "png"),
            "wifi-magnet-round-my_net-5G.png"
        );
        assert_eq!(file_name(&square, "咖啡", "svg"), "wifi-magnet-square.svg");
    }

    #[test]
    fn atomic_write_creates_dirs_and_leaves_no_tmp() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested/out.svg");
        write_atomic(&path, b"<svg/>").unwrap();
        assert_eq!(std::fs::read(&path).unwrap(), b"<svg/>");
        assert!(!path.with_extension("tmp").exists());
    }

    #[test]
    fn write_into_file_path_is_export_error() {
        let dir = tempfile::tempdir().unwrap();
        let blocker = dir.path().join("blocker");
        std::fs::write(&blocker, "x").unwrap();
        let err = write_atomic(&blocker.join("out.svg"), b"x").unwrap_err();
        assert!(matches!(err, MagnetError::Export { .. }));
    }

    #[test]
    fn exports_both_formats() {
        let dir = tempfile::tempdir().unwrap();
        let cfg = Config::default();
        let form = FormSnapshot {
            ssid: "Home".into(),
            password: "hunter2".into(),
            ..FormSnapshot::default()
        };
        let magnet = Magnet::from_form(&form, &cfg);
        let (written, errors) = run(&magnet, &form.ssid, &cfg, dir.path(), Format::Both);
        assert!(errors.is_empty(), "{errors:?}");
        assert_eq!(written.len(), 2);

        let svg = std::fs::read_to_string(dir.path().join("wifi-magnet-square-Home.svg")).unwrap();
        assert!(svg.contains("width=\"60mm\""));
        let png = std::fs::read(dir.path().join("wifi-magnet-square-Home.png")).unwrap();
        assert_eq!(&png[..4], b"\x89PNG");
    }
}
