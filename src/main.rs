// src/main.rs - 主入口 & 子命令分发
mod config;
mod error;
mod export;
mod fonts;
mod form;
mod layout;
mod magnet;
mod nmcli;
mod notify;
mod payload;
mod png;
mod qr;
mod rofi;
mod svg;
mod types;
mod watch;

use anyhow::{anyhow, Context, Result};
use clap::{Args, Parser, Subcommand};
use config::Config;
use error::MagnetError;
use export::Format;
use form::{FormArgs, FormSnapshot};
use magnet::Magnet;
use qr::EcChoice;
use std::path::{Path, PathBuf};
use svg::{ArcTextMode, SvgUnit};
use types::{RenderTarget, Security, ShapeKind};

// ════════════════════════════════════════════════════════════════
// CLI 参数
// ════════════════════════════════════════════════════════════════

#[derive(Parser)]
#[command(name = "wifi-magnet", about = "Wi-Fi 二维码磁贴生成器", version)]
struct Cli {
    /// 配置文件（缺省按 exe 目录、~/.config/wifi-magnet/ 顺序查找）
    #[arg(long, global = true, value_name = "FILE")]
    config: Option<PathBuf>,

    #[command(subcommand)]
    cmd: Cmd,
}

#[derive(Subcommand)]
enum Cmd {
    /// 输出二维码中的 WIFI: 文本
    Payload {
        #[command(flatten)]
        form: FormArgs,
        /// 反向解析一段已有的 payload
        #[arg(long, value_name = "PAYLOAD")]
        decode: Option<String>,
    },
    /// 在终端预览二维码与版式
    Preview {
        #[command(flatten)]
        form: FormArgs,
        #[command(flatten)]
        render: RenderArgs,
        /// 同时写出 150px 预览 SVG
        #[arg(long, value_name = "FILE")]
        svg: Option<PathBuf>,
        /// 以 JSON 输出图元列表
        #[arg(long)]
        json: bool,
    },
    /// 导出打印文件
    Export {
        #[command(flatten)]
        form: FormArgs,
        #[command(flatten)]
        render: RenderArgs,
        #[command(flatten)]
        output: OutputArgs,
    },
    /// 用 rofi 逐项填写后导出
    Interactive {
        #[command(flatten)]
        render: RenderArgs,
        #[command(flatten)]
        output: OutputArgs,
    },
    /// 监视表单文件，每次修改后重新导出
    Watch {
        /// TOML 表单文件
        form_file: PathBuf,
        #[command(flatten)]
        render: RenderArgs,
        #[command(flatten)]
        output: OutputArgs,
    },
    /// 列出字体目录
    Fonts,
}

/// 覆盖配置中的版式选项
#[derive(Debug, Clone, Default, Args)]
struct RenderArgs {
    /// 纠错级别
    #[arg(long, value_enum)]
    ec: Option<EcChoice>,
    /// 圆形磁贴不裁剪二维码（会压住方块的弧形文字改为直排）
    #[arg(long)]
    no_clip: bool,
    /// 圆形磁贴的问候语/说明改为直排
    #[arg(long)]
    straight: bool,
    /// SVG 中弧形文字的写法
    #[arg(long, value_enum)]
    arc_text: Option<ArcTextMode>,
}

#[derive(Debug, Clone, Args)]
struct OutputArgs {
    #[arg(long, value_enum, default_value = "both")]
    format: Format,
    /// 导出目录
    #[arg(short, long, value_name = "DIR")]
    out: Option<PathBuf>,
    /// PNG 分辨率
    #[arg(long)]
    dpi: Option<f64>,
    /// PNG 超采样倍数
    #[arg(long)]
    dpi_scale: Option<f64>,
}

impl RenderArgs {
    fn apply(&self, cfg: &mut Config) {
        if let Some(ec) = self.ec {
            cfg.export.ec_level = ec;
        }
        if self.no_clip {
            cfg.design.clip_round_qr = false;
        }
        if self.straight {
            cfg.design.arc_text = false;
        }
        if let Some(mode) = self.arc_text {
            cfg.export.arc_text_mode = mode;
        }
    }
}

impl OutputArgs {
    fn apply(&self, cfg: &mut Config) {
        if let Some(dir) = &self.out {
            cfg.export.out_dir = Some(dir.clone());
        }
        if let Some(dpi) = self.dpi {
            cfg.export.dpi = dpi;
        }
        if let Some(scale) = self.dpi_scale {
            cfg.export.dpi_scale = scale;
        }
    }
}

// ════════════════════════════════════════════════════════════════
// 入口
// ════════════════════════════════════════════════════════════════

#[tokio::main]
async fn main() -> Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("warn")).init();

    let cli = Cli::parse();
    let mut cfg = match Config::load(cli.config.as_deref()) {
        Ok(cfg) => cfg,
        Err(e) if cli.config.is_none() => {
            log::warn!("{e:#}，使用默认配置");
            Config::default()
        }
        Err(e) => return Err(e),
    };

    match cli.cmd {
        Cmd::Payload { form, decode } => match decode {
            Some(text) => decode_payload(&text)?,
            None => {
                let form = form.snapshot(&cfg).await?;
                println!("{}", payload::build(&form.credentials())?);
            }
        },
        Cmd::Preview {
            form,
            render,
            svg,
            json,
        } => {
            render.apply(&mut cfg);
            let form = form.snapshot(&cfg).await?;
            preview(&form, &cfg, svg.as_deref(), json)?;
        }
        Cmd::Export {
            form,
            render,
            output,
        } => {
            render.apply(&mut cfg);
            output.apply(&mut cfg);
            let form = form.snapshot(&cfg).await?;
            do_export(&form, &cfg, output.format)?;
        }
        Cmd::Interactive { render, output } => {
            render.apply(&mut cfg);
            output.apply(&mut cfg);
            interactive(&cfg, output.format).await?;
        }
        Cmd::Watch {
            form_file,
            render,
            output,
        } => {
            render.apply(&mut cfg);
            output.apply(&mut cfg);
            watch::run(&form_file, &cfg, &cfg.out_dir(), output.format).await?;
        }
        Cmd::Fonts => list_fonts(),
    }

    Ok(())
}

// ════════════════════════════════════════════════════════════════
// 子命令
// ════════════════════════════════════════════════════════════════

fn decode_payload(text: &str) -> Result<()> {
    let parsed = payload::parse(text.trim()).ok_or_else(|| anyhow!("不是有效的 WIFI: payload"))?;
    let c = parsed.credentials;
    println!("SSID     : {}", c.ssid);
    println!("加密     : {}", c.security);
    println!("密码     : {}", c.password);
    println!("隐藏网络 : {}", if c.hidden { "是" } else { "否" });
    Ok(())
}

fn preview(form: &FormSnapshot, cfg: &Config, svg_path: Option<&Path>, json: bool) -> Result<()> {
    let magnet = Magnet::from_form(form, cfg);
    let target = RenderTarget::preview(&magnet.shape, cfg.export.preview_scale);

    if json {
        let prims = magnet.primitives(&target);
        println!("{}", serde_json::to_string_pretty(&prims)?);
        return Ok(());
    }

    println!("形状     : {} ({})", magnet.shape.name(), magnet.shape.dimensions());
    match &magnet.payload {
        Ok(p) => {
            println!("Payload  : {p}");
            match qr::terminal(p, cfg.export.ec_level) {
                Ok(art) => println!("{art}"),
                Err(e) => println!("  [{e}]"),
            }
        }
        Err(e) => println!("  [{e}]"),
    }
    let t = &magnet.texts;
    for (label, text) in [
        ("问候语", &t.greeting),
        ("说明", &t.instruction),
        ("网络", &t.network),
        ("密码", &t.password),
    ] {
        println!("{label:<6}: {} ({}, {}pt)", text.content, text.font_family, text.size_pt);
    }

    if let Some(path) = svg_path {
        let text = magnet.svg(&target, SvgUnit::Px, cfg.export.arc_text_mode);
        export::write_atomic(path, text.as_bytes())?;
        println!("预览已写入 {}", path.display());
    }
    Ok(())
}

fn do_export(form: &FormSnapshot, cfg: &Config, format: Format) -> Result<()> {
    let magnet = Magnet::from_form(form, cfg);
    if let Err(e) = &magnet.qr {
        notify::low("二维码未生成", &format!("{e}，导出的是占位设计"));
    }

    let (written, errors) = export::run(&magnet, &form.ssid, cfg, &cfg.out_dir(), format);
    for path in &written {
        println!("{}", path.display());
    }
    for e in &errors {
        notify::critical("导出失败", &e.to_string());
    }
    if errors.is_empty() {
        Ok(())
    } else {
        Err(anyhow!("{} 个文件导出失败", errors.len()))
    }
}

fn list_fonts() {
    let mut current = None;
    for font in fonts::CATALOG {
        if current != Some(font.category) {
            println!("{}:", font.category);
            current = Some(font.category);
        }
        println!("  {:<18} {}", font.name, font.family);
    }
}

// ════════════════════════════════════════════════════════════════
// interactive（任一步按 Esc 均静默退出）
// ════════════════════════════════════════════════════════════════

async fn interactive(cfg: &Config, format: Format) -> Result<()> {
    let r = &cfg.rofi;
    let mut form = FormSnapshot::from_config(cfg);

    let source = ["✏️  手动输入", "📶 已保存的网络"];
    match rofi::choose(&source, "📶 网络来源: ", r).await {
        Some(0) => {
            form.ssid = match rofi::input_prompt("SSID: ", "", r).await {
                Some(s) if !s.trim().is_empty() => s,
                _ => return Ok(()),
            };
            let kinds = ["WPA/WPA2/WPA3", "WEP", "开放网络"];
            form.security = match rofi::choose(&kinds, "🔒 加密: ", r).await {
                Some(0) => Security::Wpa,
                Some(1) => Security::Wep,
                Some(_) => Security::NoPass,
                None => return Ok(()),
            };
            if form.security.needs_password() {
                form.password = match rofi::password_prompt(r).await {
                    Some(p) => p,
                    None => return Ok(()),
                };
            }
        }
        Some(_) => {
            let saved = nmcli::saved_connections().await.unwrap_or_default();
            if saved.is_empty() {
                notify::low("提示", "没有已保存的 Wi-Fi 配置");
                return Ok(());
            }
            let picked = rofi::dmenu(&saved, "📶 选择网络: ", r, &["-no-custom", "-lines", "8"]).await;
            let name = match picked {
                Some(n) if !n.is_empty() => n,
                _ => return Ok(()),
            };
            let creds = nmcli::profile_credentials(&name)
                .await
                .with_context(|| format!("读取 {name} 的凭据失败"))?;
            form.ssid = creds.ssid;
            form.password = creds.password;
            form.security = creds.security;
            form.hidden = creds.hidden;
        }
        None => return Ok(()),
    }

    form.greeting = match rofi::input_prompt("问候语: ", &form.greeting, r).await {
        Some(s) => s,
        None => return Ok(()),
    };
    form.instruction = match rofi::input_prompt("说明: ", &form.instruction, r).await {
        Some(s) => s,
        None => return Ok(()),
    };
    let shapes = ["□ square 60×60mm", "○ round Ø65mm"];
    form.shape = match rofi::choose(&shapes, "形状: ", r).await {
        Some(0) => ShapeKind::Square,
        Some(_) => ShapeKind::Round,
        None => return Ok(()),
    };

    let magnet = Magnet::from_form(&form, cfg);
    let payload = match &magnet.payload {
        Ok(p) => p.clone(),
        Err(e) => {
            notify::critical("无法生成", &e.to_string());
            return Ok(());
        }
    };
    let art = match qr::terminal(&payload, cfg.export.ec_level) {
        Ok(a) => a,
        Err(e @ MagnetError::Encoding(_)) => {
            notify::critical("无法生成", &e.to_string());
            return Ok(());
        }
        Err(e) => return Err(e.into()),
    };
    if !rofi::confirm_qr(&form.ssid, &art, r).await {
        return Ok(());
    }

    let (written, errors) = export::run(&magnet, &form.ssid, cfg, &cfg.out_dir(), format);
    for e in &errors {
        notify::critical("导出失败", &e.to_string());
    }
    if !written.is_empty() {
        let names: Vec<String> = written.iter().map(|p| p.display().to_string()).collect();
        notify::normal("已导出", &names.join("\n"));
    }
    Ok(())
}
