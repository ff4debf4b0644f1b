//! End-to-end tests for the `wifi-magnet` binary.

use std::path::Path;
use std::process::{Command, Output};

fn bin() -> &'static str {
    env!("CARGO_BIN_EXE_wifi-magnet")
}

/// Runs the binary with an empty config so user-level config files never leak in.
fn run(dir: &Path, args: &[&str]) -> Output {
    let config = dir.join("config.toml");
    if !config.exists() {
        std::fs::write(&config, "").unwrap();
    }
    Command::new(bin())
        .arg("--config")
        .arg(&config)
        .args(args)
        .env_remove("DISPLAY")
        .env_remove("WAYLAND_DISPLAY")
        .output()
        .expect("failed to execute wifi-magnet")
}

fn stdout(out: &Output) -> String {
    String::from_utf8_lossy(&out.stdout).into_owned()
}

#[test]
fn payload_escapes_reserved_characters() {
    let dir = tempfile::tempdir().unwrap();
    let out = run(dir.path(), &["payload", "--ssid", "Caf;e", "--password", "p,w"]);
    assert!(out.status.success());
    assert_eq!(stdout(&out).trim(), "WIFI:T:WPA;S:Caf\\;e;P:p\\,w;H:false;;");
}

#[test]
fn payload_for_open_network_drops_password() {
    let dir = tempfile::tempdir().unwrap();
    let out = run(
        dir.path(),
        &["payload", "--ssid", "Guest", "--password", "secret", "--security", "nopass", "--hidden"],
    );
    assert!(out.status.success());
    assert_eq!(stdout(&out).trim(), "WIFI:T:nopass;S:Guest;P:;H:true;;");
}

#[test]
fn payload_without_ssid_fails() {
    let dir = tempfile::tempdir().unwrap();
    let out = run(dir.path(), &["payload", "--password", "x"]);
    assert!(!out.status.success());
    assert!(String::from_utf8_lossy(&out.stderr).contains("SSID"));
}

#[test]
fn payload_decode_round_trips() {
    let dir = tempfile::tempdir().unwrap();
    let out = run(dir.path(), &["payload", "--decode", "WIFI:T:WEP;S:a\\;b;P:c\\\\d;H:false;;"]);
    assert!(out.status.success());
    let text = stdout(&out);
    assert!(text.contains("a;b"));
    assert!(text.contains("c\\d"));
    assert!(text.contains("WEP"));
}

#[test]
fn export_svg_writes_sanitized_file() {
    let dir = tempfile::tempdir().unwrap();
    let out_dir = dir.path().join("out");
    let out = run(
        dir.path(),
        &[
            "export", "--ssid", "Caf;e 2", "--password", "pw", "--shape", "round",
            "--format", "svg", "--out", out_dir.to_str().unwrap(),
        ],
    );
    assert!(out.status.success(), "{}", String::from_utf8_lossy(&out.stderr));

    let svg = std::fs::read_to_string(out_dir.join("wifi-magnet-round-Cafe2.svg")).unwrap();
    assert!(svg.contains("width=\"65mm\" height=\"65mm\" viewBox=\"0 0 65 65\""));
    assert!(svg.contains("clip-path"));
    assert!(svg.contains("Network: Caf;e 2"));
}

#[test]
fn export_without_ssid_writes_placeholder_design() {
    let dir = tempfile::tempdir().unwrap();
    let out = run(
        dir.path(),
        &["export", "--format", "svg", "--out", dir.path().to_str().unwrap()],
    );
    assert!(out.status.success());
    let svg = std::fs::read_to_string(dir.path().join("wifi-magnet-square.svg")).unwrap();
    assert!(svg.contains("Enter network name to generate QR code"));
}

#[test]
fn export_png_at_low_dpi() {
    let dir = tempfile::tempdir().unwrap();
    let out = run(
        dir.path(),
        &[
            "export", "--ssid", "Home", "--format", "png", "--dpi", "72",
            "--out", dir.path().to_str().unwrap(),
        ],
    );
    assert!(out.status.success(), "{}", String::from_utf8_lossy(&out.stderr));
    let png = std::fs::read(dir.path().join("wifi-magnet-square-Home.png")).unwrap();
    assert_eq!(&png[..8], b"\x89PNG\r\n\x1a\n");
}

#[test]
fn preview_json_lists_primitives() {
    let dir = tempfile::tempdir().unwrap();
    let out = run(dir.path(), &["preview", "--ssid", "Home", "--json"]);
    assert!(out.status.success());
    let prims: serde_json::Value = serde_json::from_str(&stdout(&out)).unwrap();
    let list = prims.as_array().unwrap();
    assert!(list[0].get("Background").is_some());
    assert!(list.iter().any(|p| p.get("QrBlock").is_some()));
}

#[test]
fn preview_prints_terminal_qr_and_writes_svg() {
    let dir = tempfile::tempdir().unwrap();
    let svg_path = dir.path().join("preview.svg");
    let out = run(
        dir.path(),
        &["preview", "--ssid", "Home", "--svg", svg_path.to_str().unwrap()],
    );
    assert!(out.status.success());
    assert!(stdout(&out).contains("WIFI:T:WPA;S:Home;"));
    let svg = std::fs::read_to_string(svg_path).unwrap();
    assert!(svg.contains("width=\"300px\""));
}

#[test]
fn form_file_feeds_export() {
    let dir = tempfile::tempdir().unwrap();
    let form = dir.path().join("form.toml");
    let text = "ssid = \"Loft\"\nsecurity = \"nopass\"\ngreeting = \"Hi there\"\n";
    std::fs::write(&form, text).unwrap();
    let out = run(
        dir.path(),
        &[
            "export", "--form", form.to_str().unwrap(), "--format", "svg",
            "--out", dir.path().to_str().unwrap(),
        ],
    );
    assert!(out.status.success());
    let svg = std::fs::read_to_string(dir.path().join("wifi-magnet-square-Loft.svg")).unwrap();
    assert!(svg.contains("Hi there"));
    assert!(svg.contains("No password needed"));
}

#[test]
fn fonts_lists_catalog() {
    let dir = tempfile::tempdir().unwrap();
    let out = run(dir.path(), &["fonts"]);
    assert!(out.status.success());
    let text = stdout(&out);
    assert!(text.contains("Montserrat"));
    assert!(text.contains("Monospace:"));
}

#[test]
fn explicit_missing_config_fails() {
    let out = Command::new(bin())
        .args(["--config", "/nonexistent/wifi-magnet.toml", "fonts"])
        .output()
        .unwrap();
    assert!(!out.status.success());
}
