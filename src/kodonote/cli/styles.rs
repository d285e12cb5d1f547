//! Styles for the kodonote terminal client.
//!
//! Templates refer to styles by semantic name (`time`, `block-code`, ...) through
//! the `style` filter; the actual colors live here only. When a template asks
//! for a name that is not registered, the text is prefixed with `(!?)` so the
//! typo shows up in output instead of silently rendering plain.
//!
//! All styles are registered once through `once_cell::sync::Lazy`.

use console::Style;
use once_cell::sync::Lazy;
use std::collections::HashMap;

/// Prefix shown when a style name is not found.
pub const MISSING_STYLE_INDICATOR: &str = "(!?)";

/// Style identifiers shared between templates and renderers.
pub mod names {
    pub const REGULAR: &str = "regular";
    pub const MUTED: &str = "muted";
    pub const FAINT: &str = "faint";
    pub const TITLE: &str = "title";
    pub const TIME: &str = "time";
    pub const ERROR: &str = "error";
    pub const WARNING: &str = "warning";
    pub const SUCCESS: &str = "success";
    pub const INFO: &str = "info";
    pub const LIST_INDEX: &str = "list-index";
    pub const LIST_TITLE: &str = "list-title";
    pub const BLOCK_CODE: &str = "block-code";
    pub const BLOCK_TEXT: &str = "block-text";
}

/// A named collection of styles.
#[derive(Clone, Default)]
pub struct Theme {
    styles: HashMap<&'static str, Style>,
}

impl Theme {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add(mut self, name: &'static str, style: Style) -> Self {
        self.styles.insert(name, style);
        self
    }

    pub fn has(&self, name: &str) -> bool {
        self.styles.contains_key(name)
    }

    /// Styles `text` by name. Without color the text is returned as is, but an
    /// unknown name is still flagged.
    pub fn apply(&self, name: &str, text: &str, use_color: bool) -> String {
        match self.styles.get(name) {
            Some(style) if use_color => style.clone().force_styling(true).apply_to(text).to_string(),
            Some(_) => text.to_string(),
            None => format!("{} {}", MISSING_STYLE_INDICATOR, text),
        }
    }
}

pub static KODO_THEME: Lazy<Theme> = Lazy::new(|| {
    let muted = Style::new().color256(245);
    Theme::new()
        .add(names::REGULAR, Style::new())
        .add(names::MUTED, muted.clone())
        .add(names::FAINT, Style::new().color256(249))
        .add(names::TITLE, Style::new().bold())
        .add(names::TIME, muted.clone().italic())
        .add(names::ERROR, Style::new().red().bold())
        .add(names::WARNING, Style::new().yellow().bold())
        .add(names::SUCCESS, Style::new().green())
        .add(names::INFO, muted)
        .add(names::LIST_INDEX, Style::new().yellow())
        .add(names::LIST_TITLE, Style::new())
        .add(names::BLOCK_CODE, Style::new().cyan().bold())
        .add(names::BLOCK_TEXT, Style::new().magenta().bold())
});

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn plain_mode_leaves_text_alone() {
        assert_eq!(KODO_THEME.apply(names::TITLE, "Algebra", false), "Algebra");
    }

    #[test]
    fn color_mode_adds_escape_codes() {
        let styled = KODO_THEME.apply(names::SUCCESS, "ok", true);
        assert!(styled.contains("\u{1b}["));
        assert!(styled.contains("ok"));
    }

    #[test]
    fn unknown_style_is_flagged() {
        assert_eq!(KODO_THEME.apply("typo", "Hello", false), "(!?) Hello");
    }

    #[test]
    fn every_name_is_registered() {
        for name in [
            names::REGULAR,
            names::MUTED,
            names::FAINT,
            names::TITLE,
            names::TIME,
            names::ERROR,
            names::WARNING,
            names::SUCCESS,
            names::INFO,
            names::LIST_INDEX,
            names::LIST_TITLE,
            names::BLOCK_CODE,
            names::BLOCK_TEXT,
        ] {
            assert!(KODO_THEME.has(name), "missing style {name}");
        }
    }
}
