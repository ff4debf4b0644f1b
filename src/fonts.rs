// src/fonts.rs - 固定字体目录

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FontCategory {
    Serif,
    SansSerif,
    Monospace,
}

impl std::fmt::Display for FontCategory {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            FontCategory::Serif => write!(f, "Serif"),
            FontCategory::SansSerif => write!(f, "Sans Serif"),
            FontCategory::Monospace => write!(f, "Monospace"),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Font {
    pub name: &'static str,
    /// CSS 字体族列表，末尾带通用族作回退
    pub family: &'static str,
    pub category: FontCategory,
}

const fn font(name: &'static str, family: &'static str, category: FontCategory) -> Font {
    Font {
        name,
        family,
        category,
    }
}

pub const CATALOG: &[Font] = &[
    font("Playfair Display", "Playfair Display, serif", FontCategory::Serif),
    font("Georgia", "Georgia, serif", FontCategory::Serif),
    font("Times New Roman", "Times New Roman, serif", FontCategory::Serif),
    font("Montserrat", "Montserrat, sans-serif", FontCategory::SansSerif),
    font("Roboto", "Roboto, sans-serif", FontCategory::SansSerif),
    font("Arial", "Arial, sans-serif", FontCategory::SansSerif),
    font("Inconsolata", "Inconsolata, monospace", FontCategory::Monospace),
    font("Courier New", "Courier New, monospace", FontCategory::Monospace),
    font("Monaco", "Monaco, monospace", FontCategory::Monospace),
];

pub const DEFAULT_TEXT_FONT: &str = "Montserrat";
pub const DEFAULT_CREDENTIALS_FONT: &str = "Inconsolata";

/// 按名称或完整字体族查找（忽略大小写）
pub fn find(name: &str) -> Option<&'static Font> {
    let name = name.trim();
    CATALOG
        .iter()
        .find(|f| f.name.eq_ignore_ascii_case(name) || f.family.eq_ignore_ascii_case(name))
}

/// 目录外的字体原样使用，交给渲染端回退
pub fn family_for(name: &str) -> String {
    match find(name) {
        Some(font) => font.family.to_string(),
        None => {
            log::warn!("字体 {name:?} 不在目录中，按原样使用");
            name.trim().to_string()
        }
    }
}

/// 字体族列表中的第一个具体字体名
pub fn primary(family: &str) -> &str {
    family
        .split(',')
        .map(|s| s.trim().trim_matches('"').trim_matches('\''))
        .find(|s| !s.is_empty())
        .unwrap_or("sans-serif")
}
