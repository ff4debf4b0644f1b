// src/nmcli.rs - 从 NetworkManager 读取已保存的 Wi-Fi 凭据

use crate::types::{Security, WifiCredentials};
use anyhow::{anyhow, bail, Context, Result};
use tokio::process::Command;

const WIRELESS_TYPE: &str = "802-11-wireless";

/// 已保存的所有 Wi-Fi connection 名称
pub async fn saved_connections() -> Result<Vec<String>> {
    let out = Command::new("nmcli")
        .env("LANGUAGE", "C")
        .args(["-t", "-f", "NAME,TYPE", "connection", "show"])
        .output()
        .await
        .context("无法执行 nmcli")?;
    Ok(wireless_names(&String::from_utf8_lossy(&out.stdout)))
}

/// 当前激活的 Wi-Fi connection 名称
pub async fn active_connection() -> Option<String> {
    let out = Command::new("nmcli")
        .env("LANGUAGE", "C")
        .args(["-t", "-f", "NAME,TYPE", "connection", "show", "--active"])
        .output()
        .await
        .ok()?;
    wireless_names(&String::from_utf8_lossy(&out.stdout))
        .into_iter()
        .next()
}

/// 读取某个 profile 的 SSID、加密方式、密码（需要 polkit 授权）
pub async fn profile_credentials(name: &str) -> Result<WifiCredentials> {
    let out = Command::new("nmcli")
        .env("LANGUAGE", "C")
        .args([
            "-s",
            "-t",
            "-f",
            "802-11-wireless.ssid,802-11-wireless.hidden,802-11-wireless-security.key-mgmt,802-11-wireless-security.psk,802-11-wireless-security.wep-key0",
            "connection",
            "show",
            name,
        ])
        .output()
        .await
        .context("无法执行 nmcli")?;
    if !out.status.success() {
        let err = String::from_utf8_lossy(&out.stderr);
        return Err(anyhow!("读取 {name} 失败: {}", err.trim()));
    }
    parse_profile(&String::from_utf8_lossy(&out.stdout))
        .with_context(|| format!("无法导入 {name}"))
}

/// 当前连接的凭据
pub async fn current_credentials() -> Result<WifiCredentials> {
    let name = active_connection()
        .await
        .ok_or_else(|| anyhow!("当前没有已连接的 Wi-Fi"))?;
    profile_credentials(&name).await
}

fn wireless_names(stdout: &str) -> Vec<String> {
    stdout
        .lines()
        .filter_map(|l| {
            let fields = split_terse(l);
            match fields.as_slice() {
                [name, kind] if kind == WIRELESS_TYPE => Some(name.clone()),
                _ => None,
            }
        })
        .collect()
}

/// 解析 `connection show` 的 `key:value` 行
///
/// 802.1X 企业网络没有可以写进二维码的共享密钥，直接拒绝。
fn parse_profile(stdout: &str) -> Result<WifiCredentials> {
    let mut ssid = None;
    let mut hidden = false;
    let mut key_mgmt = String::new();
    let mut psk = String::new();
    let mut wep = String::new();

    for line in stdout.lines() {
        let Some((key, value)) = line.split_once(':') else {
            continue;
        };
        let value = unescape_terse(value);
        match key {
            "802-11-wireless.ssid" => ssid = Some(value),
            "802-11-wireless.hidden" => hidden = value == "yes",
            "802-11-wireless-security.key-mgmt" => key_mgmt = value,
            "802-11-wireless-security.psk" => psk = value,
            "802-11-wireless-security.wep-key0" => wep = value,
            _ => {}
        }
    }

    let ssid = ssid
        .filter(|s| !s.is_empty())
        .ok_or_else(|| anyhow!("不是 Wi-Fi 连接"))?;

    let (security, password) = match key_mgmt.as_str() {
        "wpa-psk" | "sae" => (Security::Wpa, psk),
        "wpa-eap" | "wpa-eap-suite-b-192" | "ieee8021x" => {
            bail!("{ssid} 使用 802.1X 认证 ({key_mgmt})，二维码无法携带企业凭据")
        }
        // 静态 WEP 的 key-mgmt 为 none
        "none" if !wep.is_empty() => (Security::Wep, wep),
        _ => (Security::NoPass, String::new()),
    };

    Ok(WifiCredentials {
        ssid,
        password,
        security,
        hidden,
    })
}

/// nmcli -t 用 ':' 分隔，字段内的 ':' 与 '\' 以反斜杠转义
fn split_terse(line: &str) -> Vec<String> {
    let mut fields = Vec::new();
    let mut current = String::new();
    let mut chars = line.chars();
    while let Some(c) = chars.next() {
        match c {
            '\\' => current.extend(chars.next()),
            ':' => fields.push(std::mem::take(&mut current)),
            _ => current.push(c),
        }
    }
    fields.push(current);
    fields
}

fn unescape_terse(value: &str) -> String {
    split_terse(value).join(":")
}
