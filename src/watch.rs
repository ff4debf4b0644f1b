// src/watch.rs - 监视表单文件，每次内容变化都完整重算并重新导出

use crate::config::Config;
use crate::export::{self, Format};
use crate::form::FormSnapshot;
use crate::magnet::Magnet;
use crate::notify;
use anyhow::Result;
use std::path::Path;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;
use tokio::time;

/// 轮询 `form_path`；内容不变则跳过，编辑期间的中间状态以最后一次读到的为准
pub async fn run(form_path: &Path, cfg: &Config, dir: &Path, format: Format) -> Result<()> {
    let stop = Arc::new(AtomicBool::new(false));
    let flag = stop.clone();
    // 注册 Ctrl-C：结束循环而不是直接退出进程
    ctrlc::set_handler(move || flag.store(true, Ordering::SeqCst)).ok();

    println!(
        "监视 {}，每 {}ms 检查一次，Ctrl-C 退出",
        form_path.display(),
        cfg.watch_interval_ms
    );

    let mut ticker = time::interval(Duration::from_millis(cfg.watch_interval_ms.max(50)));
    let mut last: Option<String> = None;
    let mut renders = 0usize;

    while !stop.load(Ordering::SeqCst) {
        ticker.tick().await;

        let text = match tokio::fs::read_to_string(form_path).await {
            Ok(t) => t,
            Err(e) => {
                log::debug!("读取表单失败: {e}");
                continue;
            }
        };
        if last.as_deref() == Some(text.as_str()) {
            continue;
        }

        if render_once(&text, cfg, dir, format) {
            renders += 1;
        }
        last = Some(text);
    }

    println!("已停止监视，共渲染 {renders} 次");
    Ok(())
}

/// 渲染一次；表单无效或导出失败只提示，不中断监视
fn render_once(text: &str, cfg: &Config, dir: &Path, format: Format) -> bool {
    let form = match FormSnapshot::from_toml(text, cfg) {
        Ok(f) => f,
        Err(e) => {
            notify::low("表单无效", &e.to_string());
            return false;
        }
    };

    let magnet = Magnet::from_form(&form, cfg);
    let (written, errors) = export::run(&magnet, &form.ssid, cfg, dir, format);
    for e in &errors {
        notify::critical("导出失败", &e.to_string());
    }
    for path in &written {
        println!("↻ {}", path.display());
    }
    !written.is_empty()
}
