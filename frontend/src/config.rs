use log::{warn, Level};
use serde::Deserialize;
use web_sys::Document;

#[cfg(debug_assertions)]
pub fn log_level() -> Level {
    Level::Debug // Verbose while developing locally
}

#[cfg(not(debug_assertions))]
pub fn log_level() -> Level {
    Level::Info
}

/// Id of the optional `<script type="application/json">` element that
/// overrides parts of the page contract.
pub const CONFIG_ELEMENT_ID: &str = "site-config";

/// Everything the script expects from the page, plus the layout constants.
#[derive(Deserialize, Debug, Default, Clone, PartialEq)]
#[serde(default)]
pub struct SiteConfig {
    pub selectors: Selectors,
    pub classes: Classes,
    pub layout: Layout,
    pub observers: Observers,
}

#[derive(Deserialize, Debug, Clone, PartialEq)]
#[serde(default)]
pub struct Selectors {
    pub header: String,
    pub nav_links: String,
    pub sections: String,
    pub reveal: String,
    pub modal_overlay: String,
    pub modal_content: String,
    pub modal_close: String,
    pub modal_trigger: String,
    pub contact_form: String,
    pub gallery_items: String,
    pub lightbox: String,
    pub lightbox_image: String,
    pub lightbox_close: String,
    pub back_to_top: String,
    pub hero_image: String,
    pub hero_video: String,
    pub hero_fallback: String,
    pub hero_reserve: String,
    pub formation_container: String,
    pub formation_form: String,
}

impl Default for Selectors {
    fn default() -> Self {
        Self {
            header: "header, .hero-header".to_string(),
            nav_links: ".main-nav a, .hero-nov a".to_string(),
            sections: "main section[id]".to_string(),
            reveal: ".reveal".to_string(),
            modal_overlay: "#modalOverlay".to_string(),
            modal_content: "#modalContent".to_string(),
            modal_close: ".modal-close".to_string(),
            modal_trigger: "[data-action=\"open-modal\"]".to_string(),
            contact_form: "#contactForm".to_string(),
            gallery_items: ".gallery-item".to_string(),
            lightbox: "#lightbox".to_string(),
            lightbox_image: "#lightboxImg".to_string(),
            lightbox_close: ".lightbox-close".to_string(),
            back_to_top: "#backToTop".to_string(),
            hero_image: "#heroImage".to_string(),
            hero_video: "#heroVideo".to_string(),
            hero_fallback: "#heroFallback".to_string(),
            hero_reserve: "#heroReserveBtn".to_string(),
            formation_container: "#formationForm".to_string(),
            formation_form: "#formationForm form".to_string(),
        }
    }
}

#[derive(Deserialize, Debug, Clone, PartialEq)]
#[serde(default)]
pub struct Classes {
    pub active_link: String,
    pub revealed: String,
    pub open: String,
    pub back_to_top_visible: String,
}

impl Default for Classes {
    fn default() -> Self {
        Self {
            active_link: "active".to_string(),
            revealed: "visible".to_string(),
            open: "active".to_string(),
            back_to_top_visible: "show".to_string(),
        }
    }
}

#[derive(Deserialize, Debug, Clone, PartialEq)]
#[serde(default)]
pub struct Layout {
    /// Used when the page has no header element.
    pub fallback_header_height: f64,
    /// Gap kept between the header and a scrolled-to section.
    pub anchor_padding: f64,
    /// The hero video is only attempted on viewports wider than this.
    pub hero_video_min_width: f64,
    /// Back-to-top shows once the scroll offset passes this share of the viewport height.
    pub back_to_top_ratio: f64,
    pub header_height_variable: String,
}

impl Default for Layout {
    fn default() -> Self {
        Self {
            fallback_header_height: 110.0,
            anchor_padding: 8.0,
            hero_video_min_width: 560.0,
            back_to_top_ratio: 0.5,
            header_height_variable: "--header-height".to_string(),
        }
    }
}

#[derive(Deserialize, Debug, Clone, PartialEq)]
#[serde(default)]
pub struct Observers {
    /// Bottom part of the active-section root margin; the top part is
    /// always the negative header offset.
    pub active_bottom_margin: String,
    pub active_threshold: f64,
    pub reveal_root_margin: String,
    pub reveal_threshold: f64,
}

impl Default for Observers {
    fn default() -> Self {
        Self {
            active_bottom_margin: "-55%".to_string(),
            active_threshold: 0.0,
            reveal_root_margin: "0px 0px -10% 0px".to_string(),
            reveal_threshold: 0.15,
        }
    }
}

impl Observers {
    /// Root margin for the active-section observer given the current header offset.
    pub fn active_root_margin(&self, header_offset: f64) -> String {
        format!(
            "-{}px 0px {} 0px",
            header_offset.max(0.0).round(),
            self.active_bottom_margin
        )
    }
}

impl SiteConfig {
    pub fn from_json(raw: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(raw)
    }

    /// Reads overrides from the page, falling back to the defaults.
    pub fn load(document: &Document) -> Self {
        let raw = document
            .get_element_by_id(CONFIG_ELEMENT_ID)
            .and_then(|el| el.text_content());

        match raw {
            Some(raw) if !raw.trim().is_empty() => match Self::from_json(&raw) {
                Ok(config) => config,
                Err(e) => {
                    warn!("Ignoring invalid #{}: {}", CONFIG_ELEMENT_ID, e);
                    Self::default()
                }
            },
            _ => Self::default(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_match_page_contract() {
        let config = SiteConfig::default();
        assert_eq!(config.layout.fallback_header_height, 110.0);
        assert_eq!(config.layout.anchor_padding, 8.0);
        assert_eq!(config.layout.hero_video_min_width, 560.0);
        assert_eq!(config.selectors.modal_overlay, "#modalOverlay");
        assert_eq!(config.selectors.nav_links, ".main-nav a, .hero-nov a");
    }

    #[test]
    fn partial_override_keeps_other_defaults() {
        let config = SiteConfig::from_json(
            r#"{"layout": {"anchor_padding": 16}, "classes": {"revealed": "in-view"}, "extra": 1}"#,
        )
        .unwrap();
        assert_eq!(config.layout.anchor_padding, 16.0);
        assert_eq!(config.layout.fallback_header_height, 110.0);
        assert_eq!(config.classes.revealed, "in-view");
        assert_eq!(config.classes.active_link, "active");
        assert_eq!(config.selectors, Selectors::default());
    }

    #[test]
    fn invalid_json_is_an_error() {
        assert!(SiteConfig::from_json("{ not json").is_err());
        assert!(SiteConfig::from_json(r#"{"layout": {"anchor_padding": "big"}}"#).is_err());
    }

    #[test]
    fn active_root_margin_tracks_header() {
        let observers = Observers::default();
        assert_eq!(observers.active_root_margin(72.4), "-72px 0px -55% 0px");
        assert_eq!(observers.active_root_margin(-3.0), "-0px 0px -55% 0px");
    }
}
