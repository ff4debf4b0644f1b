// src/form.rs - 表单快照：命令行参数、表单文件、nmcli 三个来源合并

use crate::config::{Config, FontChoice};
use crate::error::MagnetError;
use crate::nmcli;
use crate::types::{Security, ShapeKind, WifiCredentials};
use anyhow::{Context, Result};
use clap::Args;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// 一次渲染所需的全部输入；渲染前完整读取，渲染中不再变化
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FormSnapshot {
    pub ssid: String,
    pub password: String,
    pub security: Security,
    pub hidden: bool,
    pub greeting: String,
    pub instruction: String,
    pub shape: ShapeKind,
    pub fonts: FontChoice,
}

impl Default for FormSnapshot {
    fn default() -> Self {
        Self::from_config(&Config::default())
    }
}

impl FormSnapshot {
    /// 以配置中的默认文字/形状/字体为底
    pub fn from_config(cfg: &Config) -> Self {
        Self {
            ssid: String::new(),
            password: String::new(),
            security: Security::Wpa,
            hidden: false,
            greeting: cfg.greeting.clone(),
            instruction: cfg.instruction.clone(),
            shape: cfg.shape,
            fonts: cfg.fonts.clone(),
        }
    }

    /// 解析 TOML 表单，缺省字段取配置默认值
    pub fn from_toml(text: &str, cfg: &Config) -> Result<Self, MagnetError> {
        let mut merged = toml::Value::try_from(Self::from_config(cfg))
            .map_err(|e| MagnetError::Form(e.to_string()))?;
        let overlay: toml::Table =
            toml::from_str(text).map_err(|e| MagnetError::Form(e.to_string()))?;
        if let toml::Value::Table(base) = &mut merged {
            for (key, value) in overlay {
                match (base.get_mut(&key), value) {
                    // fonts 按字段合并
                    (Some(toml::Value::Table(dst)), toml::Value::Table(src)) => dst.extend(src),
                    (_, value) => {
                        base.insert(key, value);
                    }
                }
            }
        }
        merged
            .try_into::<FormSnapshot>()
            .map_err(|e| MagnetError::Form(e.to_string()))
    }

    pub fn credentials(&self) -> WifiCredentials {
        WifiCredentials {
            ssid: self.ssid.clone(),
            password: self.password.clone(),
            security: self.security,
            hidden: self.hidden,
        }
    }
}

/// 所有子命令共用的表单参数
#[derive(Debug, Clone, Default, Args)]
pub struct FormArgs {
    /// 从 TOML 表单文件读取（命令行参数优先）
    #[arg(long, value_name = "FILE")]
    pub form: Option<PathBuf>,
    /// 使用 NetworkManager 当前连接的 SSID 与密码
    #[arg(long)]
    pub from_nmcli: bool,
    /// 网络名称
    #[arg(long)]
    pub ssid: Option<String>,
    #[arg(long)]
    pub password: Option<String>,
    #[arg(long, value_enum)]
    pub security: Option<Security>,
    /// 隐藏网络
    #[arg(long)]
    pub hidden: bool,
    #[arg(long)]
    pub greeting: Option<String>,
    #[arg(long)]
    pub instruction: Option<String>,
    #[arg(long, value_enum)]
    pub shape: Option<ShapeKind>,
    #[arg(long, value_name = "FONT")]
    pub greeting_font: Option<String>,
    #[arg(long, value_name = "FONT")]
    pub instruction_font: Option<String>,
    #[arg(long, value_name = "FONT")]
    pub credentials_font: Option<String>,
}

impl FormArgs {
    /// 表单文件 → nmcli → 命令行，后者覆盖前者
    pub async fn snapshot(&self, cfg: &Config) -> Result<FormSnapshot> {
        let mut form = match &self.form {
            Some(path) => {
                let text = tokio::fs::read_to_string(path)
                    .await
                    .with_context(|| format!("读取表单 {} 失败", path.display()))?;
                FormSnapshot::from_toml(&text, cfg)?
            }
            None => FormSnapshot::from_config(cfg),
        };

        if self.from_nmcli {
            let creds = nmcli::current_credentials().await?;
            form.ssid = creds.ssid;
            form.password = creds.password;
            form.security = creds.security;
            form.hidden = creds.hidden;
        }

        self.apply(&mut form);
        Ok(form)
    }

    fn apply(&self, form: &mut FormSnapshot) {
        if let Some(v) = &self.ssid {
            form.ssid = v.clone();
        }
        if let Some(v) = &self.password {
            form.password = v.clone();
        }
        if let Some(v) = self.security {
            form.security = v;
        }
        if self.hidden {
            form.hidden = true;
        }
        if let Some(v) = &self.greeting {
            form.greeting = v.clone();
        }
        if let Some(v) = &self.instruction {
            form.instruction = v.clone();
        }
        if let Some(v) = self.shape {
            form.shape = v;
        }
        if let Some(v) = &self.greeting_font {
            form.fonts.greeting = v.clone();
        }
        if let Some(v) = &self.instruction_font {
            form.fonts.instruction = v.clone();
        }
        if let Some(v) = &self.credentials_font {
            form.fonts.credentials = v.clone();
        }
    }
}
