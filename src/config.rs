//! Timing and storage settings, optionally overridden by a JSON block
//! embedded in the page.

use std::time::Duration;

use serde::Deserialize;

use crate::error::Result;

/// Id of the `<script type="application/json">` element holding overrides.
pub const CONFIG_ELEMENT_ID: &str = "interactions-config";

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct InteractionConfig {
    pub filter: FilterTiming,
    pub gallery: GalleryTiming,
    pub theme: ThemeSettings,
    /// How long a live-region announcement stays in the document.
    pub announce_clear_ms: u32,
}

impl Default for InteractionConfig {
    fn default() -> Self {
        Self {
            filter: FilterTiming::default(),
            gallery: GalleryTiming::default(),
            theme: ThemeSettings::default(),
            announce_clear_ms: 1000,
        }
    }
}

impl InteractionConfig {
    /// Parse overrides; missing fields keep their defaults.
    pub fn from_json(text: &str) -> Result<Self> {
        Ok(serde_json::from_str(text)?)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct FilterTiming {
    /// Delay added per list position before an item fades in.
    pub stagger_ms: u32,
    pub hide_ms: u32,
    pub show_ms: u32,
}

impl Default for FilterTiming {
    fn default() -> Self {
        Self {
            stagger_ms: 100,
            hide_ms: 300,
            show_ms: 600,
        }
    }
}

impl FilterTiming {
    pub fn stagger(&self) -> Duration {
        Duration::from_millis(self.stagger_ms.into())
    }

    pub fn hide(&self) -> Duration {
        Duration::from_millis(self.hide_ms.into())
    }

    pub fn show(&self) -> Duration {
        Duration::from_millis(self.show_ms.into())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct GalleryTiming {
    /// Duration of each half of the fade-out, swap, fade-in sequence.
    pub fade_ms: u32,
    /// Entrance animation when the lightbox opens.
    pub open_ms: u32,
}

impl Default for GalleryTiming {
    fn default() -> Self {
        Self {
            fade_ms: 150,
            open_ms: 300,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct ThemeSettings {
    pub storage_key: String,
}

impl Default for ThemeSettings {
    fn default() -> Self {
        Self {
            storage_key: "theme".to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::Error;

    #[test]
    fn empty_object_yields_defaults() {
        let cfg = InteractionConfig::from_json("{}").unwrap();
        assert_eq!(cfg, InteractionConfig::default());
        assert_eq!(cfg.filter.stagger(), Duration::from_millis(100));
        assert_eq!(cfg.theme.storage_key, "theme");
    }

    #[test]
    fn partial_override_keeps_other_fields() {
        let cfg =
            InteractionConfig::from_json(r#"{"filter":{"hide_ms":120},"theme":{"storage_key":"site-theme"}}"#)
                .unwrap();
        assert_eq!(cfg.filter.hide_ms, 120);
        assert_eq!(cfg.filter.stagger_ms, 100);
        assert_eq!(cfg.gallery, GalleryTiming::default());
        assert_eq!(cfg.theme.storage_key, "site-theme");
    }

    #[test]
    fn malformed_json_is_a_config_error() {
        let err = InteractionConfig::from_json("{ filter: ").unwrap_err();
        assert!(matches!(err, Error::Config(_)));
    }
}
