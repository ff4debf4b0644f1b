// src/notify.rs - 面向用户的短暂提示：有图形会话时发桌面通知，否则写 stderr

/// 通知自动消失的时间（毫秒）
const EXPIRE_MS: &str = "4000";

#[derive(Debug, Clone, Copy)]
pub enum Urgency { Low, Normal, Critical }

impl Urgency {
    fn as_str(self) -> &'static str {
        match self {
            Urgency::Low      => "low",
            Urgency::Normal   => "normal",
            Urgency::Critical => "critical",
        }
    }

    fn level(self) -> log::Level {
        match self {
            Urgency::Low      => log::Level::Debug,
            Urgency::Normal   => log::Level::Info,
            Urgency::Critical => log::Level::Error,
        }
    }
}

pub fn send(urgency: Urgency, title: &str, body: &str) {
    log::log!(urgency.level(), "{title}: {body}");

    let u = urgency.as_str();
    let ok = has_display()
        && std::process::Command::new("notify-send")
            .args(["-u", u, "-t", EXPIRE_MS, &format!("Wi-Fi 磁贴: {title}"), body])
            .status()
            .map(|s| s.success())
            .unwrap_or(false);

    if !ok {
        let detail = if body.is_empty() {
            String::new()
        } else {
            format!(": {body}")
        };
        eprintln!("[{u}] {title}{detail}");
    }
}

fn has_display() -> bool {
    std::env::var_os("DISPLAY").is_some() || std::env::var_os("WAYLAND_DISPLAY").is_some()
}

pub fn low(title: &str, body: &str)      { send(Urgency::Low,      title, body) }
pub fn normal(title: &str, body: &str)   { send(Urgency::Normal,   title, body) }
pub fn critical(title: &str, body: &str) { send(Urgency::Critical, title, body) }
