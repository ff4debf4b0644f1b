// src/rofi.rs - interactive 模式下的 rofi 表单

use crate::config::RofiConfig;
use tokio::io::AsyncWriteExt;
use tokio::process::Command;

/// 通用 rofi dmenu，返回用户选择的行，Esc 返回 None
pub async fn dmenu(
    items: &[String],
    prompt: &str,
    cfg: &RofiConfig,
    extra: &[&str], // 额外参数，如 -mesg、-password、-filter
) -> Option<String> {
    let input = items.join("\n");
    let mut args = vec![
        "-dmenu".to_string(),
        "-p".to_string(),
        prompt.to_string(),
        "-font".to_string(),
        cfg.font.clone(),
        "-location".to_string(),
        cfg.position.to_string(),
        "-yoffset".to_string(),
        cfg.y_offset.to_string(),
        "-xoffset".to_string(),
        cfg.x_offset.to_string(),
    ];
    args.extend(extra.iter().map(|e| e.to_string()));

    let mut child = Command::new("rofi")
        .args(&args)
        .stdin(std::process::Stdio::piped())
        .stdout(std::process::Stdio::piped())
        .spawn()
        .ok()?;

    // 写完候选项后必须关闭 stdin，否则 rofi 一直等待输入
    if let Some(mut stdin) = child.stdin.take() {
        let _ = stdin.write_all(input.as_bytes()).await;
    }

    let out = child.wait_with_output().await.ok()?;
    if out.status.success() {
        Some(String::from_utf8_lossy(&out.stdout).trim().to_string())
    } else {
        None // 用户按了 Esc
    }
}

/// 单行文本输入，`default` 预填在输入框中
pub async fn input_prompt(prompt: &str, default: &str, cfg: &RofiConfig) -> Option<String> {
    let mut extra = vec!["-lines", "0"];
    if !default.is_empty() {
        extra.extend(["-filter", default]);
    }
    dmenu(&[], prompt, cfg, &extra).await
}

/// 密码输入（显示为圆点）
pub async fn password_prompt(cfg: &RofiConfig) -> Option<String> {
    dmenu(&[], "🔒 密码: ", cfg, &["-password", "-lines", "0"]).await
}

/// 从固定选项中选一个，返回下标
pub async fn choose(options: &[&str], prompt: &str, cfg: &RofiConfig) -> Option<usize> {
    let items: Vec<String> = options.iter().map(|s| s.to_string()).collect();
    let lines = items.len().to_string();
    let picked = dmenu(&items, prompt, cfg, &["-no-custom", "-lines", &lines]).await?;
    options.iter().position(|o| *o == picked)
}

/// 在 rofi -mesg 区域显示 UTF-8 二维码，返回是否确认
pub async fn confirm_qr(title: &str, qr_text: &str, cfg: &RofiConfig) -> bool {
    let qr_width = qr_text
        .lines()
        .next()
        .map(|l| l.chars().count())
        .unwrap_or(40);
    let rofi_width = format!("-{}", qr_width + 4);

    let items = vec!["✓ 导出".to_string(), "✗ 取消".to_string()];
    let extra = [
        "-mesg",
        qr_text,
        "-lines",
        "2",
        "-font",
        "Monospace 9",
        "-width",
        rofi_width.as_str(),
        "-no-custom",
    ];
    matches!(
        dmenu(&items, &format!("📷 {title}"), cfg, &extra).await.as_deref(),
        Some("✓ 导出")
    )
}
