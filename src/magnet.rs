// src/magnet.rs - 一次渲染的完整流水线：表单 → payload → 二维码 → 图元 → SVG

use crate::config::Config;
use crate::error::MagnetError;
use crate::fonts;
use crate::form::FormSnapshot;
use crate::layout::{self, Primitive, QrSlot};
use crate::payload;
use crate::qr::{self, QrMatrix};
use crate::svg::{self, ArcTextMode, SvgOptions, SvgUnit};
use crate::types::{DesignSpec, MagnetShape, MagnetTexts, RenderTarget, Security, TextSpec};

/// 由一个表单快照推导出的全部结果；每次输入变化都重新构建
#[derive(Debug, Clone)]
pub struct Magnet {
    pub shape: MagnetShape,
    pub texts: MagnetTexts,
    pub design: DesignSpec,
    pub payload: Result<String, MagnetError>,
    pub qr: Result<QrMatrix, MagnetError>,
}

impl Magnet {
    /// 不会失败：SSID 为空或编码失败都降级为占位块
    pub fn from_form(form: &FormSnapshot, cfg: &Config) -> Self {
        let payload = payload::build(&form.credentials());
        let qr = match &payload {
            Ok(p) => qr::encode(p, cfg.export.ec_level),
            Err(e) => Err(e.clone()),
        };
        match &qr {
            Ok(_) => {}
            Err(MagnetError::EmptySsid) => log::info!("SSID 为空，显示占位块"),
            Err(e) => log::warn!("{e}"),
        }

        Self {
            shape: form.shape.magnet(),
            texts: texts(form, cfg),
            design: cfg.design,
            payload,
            qr,
        }
    }

    pub fn slot(&self) -> QrSlot<'_> {
        match &self.qr {
            Ok(m) => QrSlot::Code(m),
            Err(MagnetError::EmptySsid) => QrSlot::Missing,
            Err(_) => QrSlot::Failed,
        }
    }

    pub fn primitives(&self, target: &RenderTarget) -> Vec<Primitive> {
        layout::layout(self.slot(), &self.texts, &self.shape, &self.design, target)
    }

    pub fn svg(&self, target: &RenderTarget, unit: SvgUnit, arc_mode: ArcTextMode) -> String {
        svg::render(&self.primitives(target), target, SvgOptions { unit, arc_mode })
    }
}

/// 按表单与配置组装四段文字
pub fn texts(form: &FormSnapshot, cfg: &Config) -> MagnetTexts {
    let sizes = cfg.design.text_sizes;
    let credentials_font = fonts::family_for(&form.fonts.credentials);
    let password = if form.security == Security::NoPass {
        cfg.labels.open_network.clone()
    } else {
        format!("{}{}", cfg.labels.password, form.password)
    };

    MagnetTexts {
        greeting: TextSpec {
            content: form.greeting.trim().to_string(),
            font_family: fonts::family_for(&form.fonts.greeting),
            size_pt: sizes.greeting,
        },
        instruction: TextSpec {
            content: form.instruction.trim().to_string(),
            font_family: fonts::family_for(&form.fonts.instruction),
            size_pt: sizes.instruction,
        },
        network: TextSpec {
            content: format!("{}{}", cfg.labels.network, form.ssid.trim()),
            font_family: credentials_font.clone(),
            size_pt: sizes.credentials,
        },
        password: TextSpec {
            content: password,
            font_family: credentials_font,
            size_pt: sizes.credentials,
        },
    }
}
