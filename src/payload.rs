// src/payload.rs - 生成 Wi-Fi 入网二维码的文本内容

use crate::error::MagnetError;
use crate::types::{Security, WifiCredentials};

/// 组装 `WIFI:T:<sec>;S:<ssid>;P:<pass>;H:<hidden>;;`
///
/// 固定约定：`T:` 取 `WPA`/`WEP`/`nopass`；`nopass` 时 `P:` 恒为空；
/// `H:` 恒存在，取 `true` 或 `false`。
pub fn build(creds: &WifiCredentials) -> Result<String, MagnetError> {
    if creds.ssid.trim().is_empty() {
        return Err(MagnetError::EmptySsid);
    }

    let sec_str = creds.security.payload_token();
    let ssid_esc = escape_wifi_field(&creds.ssid);
    let pass_esc = if creds.security.needs_password() {
        escape_wifi_field(&creds.password)
    } else {
        String::new()
    };
    let hidden = if creds.hidden { "true" } else { "false" };

    Ok(format!(
        "WIFI:T:{sec_str};S:{ssid_esc};P:{pass_esc};H:{hidden};;"
    ))
}

/// 转义 Wi-Fi QR 格式中的保留字符（; , " \）
pub fn escape_wifi_field(s: &str) -> String {
    let mut out = String::with_capacity(s.len() + 4);
    for c in s.chars() {
        match c {
            '\\' | ';' | ',' | '"' => {
                out.push('\\');
                out.push(c);
            }
            _ => out.push(c),
        }
    }
    out
}

/// `escape_wifi_field` 的逆操作：去掉每个转义反斜杠
pub fn unescape(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    let mut chars = s.chars();
    while let Some(c) = chars.next() {
        if c == '\\' {
            // 末尾孤立的反斜杠原样保留
            out.push(chars.next().unwrap_or('\\'));
        } else {
            out.push(c);
        }
    }
    out
}

/// 从 payload 还原出的字段
#[derive(Debug, Clone, PartialEq)]
pub struct ParsedPayload {
    pub credentials: WifiCredentials,
}

/// 解析 `WIFI:` payload；格式不符返回 None
pub fn parse(payload: &str) -> Option<ParsedPayload> {
    let body = payload.strip_prefix("WIFI:")?;

    let mut ssid = None;
    let mut password = String::new();
    let mut security = Security::NoPass;
    let mut hidden = false;

    for field in split_unescaped(body, ';') {
        if field.is_empty() {
            continue;
        }
        let (key, value) = field.split_once(':')?;
        match key {
            "T" => security = Security::from(value),
            "S" => ssid = Some(unescape(value)),
            "P" => password = unescape(value),
            "H" => hidden = value.eq_ignore_ascii_case("true"),
            // 未知字段忽略，与扫码端行为一致
            _ => {}
        }
    }

    Some(ParsedPayload {
        credentials: WifiCredentials {
            ssid: ssid?,
            password,
            security,
            hidden,
        },
    })
}

/// 按未被转义的分隔符切分，保留各段内的转义序列
fn split_unescaped(s: &str, sep: char) -> Vec<&str> {
    let mut parts = Vec::new();
    let mut start = 0;
    let mut escaped = false;
    for (i, c) in s.char_indices() {
        if escaped {
            escaped = false;
        } else if c == '\\' {
            escaped = true;
        } else if c == sep {
            parts.push(&s[start..i]);
            start = i + c.len_utf8();
        }
    }
    parts.push(&s[start..]);
    parts
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn creds(ssid: &str, password: &str, security: Security) -> WifiCredentials {
        WifiCredentials {
            ssid: ssid.into(),
            password: password.into(),
            security,
            hidden: false,
        }
    }

    #[test]
    fn escapes_reserved_characters_verbatim() {
        let payload = build(&creds("Caf;e", "p,w", Security::Wpa)).unwrap();
        assert!(payload.contains("S:Caf\\;e;P:p\\,w"), "{payload}");
        assert_eq!(payload, "WIFI:T:WPA;S:Caf\\;e;P:p\\,w;H:false;;");
    }

    #[test]
    fn empty_ssid_fails_regardless_of_other_fields() {
        for (ssid, pass, sec) in [
            ("", "secret", Security::Wpa),
            ("   ", "", Security::NoPass),
            ("\t", "x", Security::Wep),
        ] {
            assert_eq!(build(&creds(ssid, pass, sec)), Err(MagnetError::EmptySsid));
        }
    }

    #[test]
    fn nopass_never_embeds_password() {
        let payload = build(&creds("Guest", "leaked;secret", Security::NoPass)).unwrap();
        assert_eq!(payload, "WIFI:T:nopass;S:Guest;P:;H:false;;");
        assert!(!payload.contains("leaked"));
    }

    #[test]
    fn hidden_flag() {
        let mut c = creds("Attic", "pw", Security::Wep);
        c.hidden = true;
        assert_eq!(build(&c).unwrap(), "WIFI:T:WEP;S:Attic;P:pw;H:true;;");
    }

    #[test]
    fn escaping_round_trips_tricky_values() {
        let cases = [
            ("a;b,c\"d\\e", "\\\\;;,,\"\""),
            ("\\", ";"),
            ("plain", "trailing\\"),
            ("咖啡;馆", "密,码"),
            ("Bob's \"Net\"", "x:y;z"),
        ];
        for (ssid, password) in cases {
            let payload = build(&creds(ssid, password, Security::Wpa)).unwrap();
            let parsed = parse(&payload).expect("payload parses");
            assert_eq!(parsed.credentials.ssid, ssid);
            assert_eq!(parsed.credentials.password, password);
            assert_eq!(unescape(&escape_wifi_field(ssid)), ssid);
        }
    }

    #[test]
    fn single_quote_and_colon_are_not_escaped() {
        assert_eq!(escape_wifi_field("it's:ok"), "it's:ok");
    }

    #[test]
    fn parse_rejects_non_wifi_payloads() {
        assert!(parse("https://example.com").is_none());
        assert!(parse("WIFI:T:WPA;P:x;;").is_none());
    }

    #[test]
    fn output_is_deterministic() {
        let c = creds("Home", "hunter2", Security::Wpa);
        assert_eq!(build(&c).unwrap(), build(&c).unwrap());
    }

    fn any_field() -> impl Strategy<Value = String> {
        let alphabet = vec![';', ',', '"', '\\', ':', '\'', ' ', 'a', 'Z', '7', '咖'];
        prop::collection::vec(prop::sample::select(alphabet), 0..24)
            .prop_map(|cs| cs.into_iter().collect())
    }

    fn any_security() -> impl Strategy<Value = Security> {
        prop_oneof![
            Just(Security::Wpa),
            Just(Security::Wep),
            Just(Security::NoPass)
        ]
    }

    proptest! {
        #[test]
        fn reserved_characters_round_trip(
            ssid in any_field().prop_filter("SSID 不能为空白", |s| !s.trim().is_empty()),
            password in any_field(),
            security in any_security(),
            hidden in any::<bool>()
        ) {
            let c = WifiCredentials {
                ssid: ssid.clone(),
                password: password.clone(),
                security,
                hidden,
            };
            let payload = build(&c).unwrap();
            let parsed = parse(&payload).expect("payload parses").credentials;

            prop_assert_eq!(&parsed.ssid, &ssid);
            prop_assert_eq!(parsed.security, security);
            prop_assert_eq!(parsed.hidden, hidden);
            if security.needs_password() {
                prop_assert_eq!(&parsed.password, &password);
            } else {
                prop_assert!(payload.contains(";P:;H:"), "{}", payload);
                prop_assert!(parsed.password.is_empty());
            }
        }
    }
}
