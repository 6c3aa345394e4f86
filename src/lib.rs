//! Interactive layer of the portfolio page: category filtering for the
//! project, skill and photo grids, the photo lightbox, and the theme toggle.
//!
//! The controllers are plain Rust and build on every target. The browser
//! wiring is only compiled for `wasm32`.

pub mod collection;
pub mod config;
pub mod error;
pub mod filter;
pub mod gallery;
pub mod ports;
pub mod theme;

pub use collection::{Category, DisplayState, Item, ItemCollection};
pub use config::InteractionConfig;
pub use error::{Error, GalleryError, StoreError};
pub use filter::{FilterController, Generation, Settle, Transition};
pub use gallery::{GalleryNavigator, Photo};
pub use theme::{Theme, ThemePreference, ThemeSource};

// Only compile wasm-specific code when targeting wasm32.
#[cfg(target_arch = "wasm32")]
pub use wasm::{mount, FilterSection, Lightbox, Page, ThemeToggle};

#[cfg(target_arch = "wasm32")]
mod wasm {
    use std::rc::Rc;

    use wasm_bindgen::prelude::*;
    use web_sys::Document;

    use crate::config::{InteractionConfig, CONFIG_ELEMENT_ID};
    use crate::error::Error;

    mod animate;
    mod announce;
    mod dom;
    mod filter_section;
    mod lightbox;
    mod storage;
    mod theme_toggle;

    use announce::LiveRegion;
    use filter_section::{SectionSpec, PHOTOS, PORTFOLIO, SKILLS};

    pub use filter_section::FilterSection;
    pub use lightbox::Lightbox;
    pub use theme_toggle::ThemeToggle;

    impl From<Error> for JsValue {
        fn from(err: Error) -> Self {
            js_sys::Error::new(&err.to_string()).into()
        }
    }

    /// Handles to every wired feature of the page.
    pub struct Page {
        pub theme: Rc<ThemeToggle>,
        pub portfolio: Option<Rc<FilterSection>>,
        pub skills: Option<Rc<FilterSection>>,
        pub photos: Option<Rc<FilterSection>>,
        pub lightbox: Option<Rc<Lightbox>>,
    }

    impl Page {
        fn sections(&self) -> impl Iterator<Item = &Rc<FilterSection>> {
            [&self.portfolio, &self.skills, &self.photos]
                .into_iter()
                .flatten()
        }
    }

    #[wasm_bindgen(start)]
    pub fn main() -> Result<(), JsValue> {
        console_log::init_with_level(log::Level::Info).ok();
        let document = dom::document()?;

        if document.ready_state() == "loading" {
            let doc = document.clone();
            dom::listen(&document, "DOMContentLoaded", move |_| {
                if let Err(err) = mount(&doc) {
                    log::error!("mount failed: {err}");
                }
            })?;
        } else {
            mount(&document)?;
        }
        Ok(())
    }

    /// Wire every section present in `document`. Missing sections are
    /// skipped; only a missing document root is an error.
    pub fn mount(document: &Document) -> Result<Page, Error> {
        let root = document
            .document_element()
            .ok_or_else(|| Error::missing("html"))?;
        let config = load_config(document);
        let announcer = Rc::new(LiveRegion::new(document.clone(), config.announce_clear_ms));

        let theme = ThemeToggle::mount(document, &config.theme)?;
        let section = |spec: &'static SectionSpec| {
            FilterSection::mount(&root, spec, config.filter, Rc::clone(&announcer))
                .unwrap_or_else(|err| {
                    log::warn!("{}: {err}", spec.name);
                    None
                })
        };
        let page = Page {
            theme,
            portfolio: section(&PORTFOLIO),
            skills: section(&SKILLS),
            photos: section(&PHOTOS),
            lightbox: Lightbox::mount(document, config.gallery).unwrap_or_else(|err| {
                log::warn!("lightbox: {err}");
                None
            }),
        };

        let sections: Vec<Rc<FilterSection>> = page.sections().cloned().collect();
        for section in &sections {
            if let Err(err) = section.reveal_when_visible() {
                log::debug!("scroll reveal unavailable: {err}");
                section.reveal();
            }
        }
        dom::listen(document, theme_toggle::THEME_CHANGE_EVENT, move |_| {
            for section in &sections {
                let section = Rc::clone(section);
                dom::defer(300, move || section.reveal());
            }
        })?;

        log::info!("portfolio interactions ready");
        Ok(page)
    }

    fn load_config(document: &Document) -> InteractionConfig {
        let Some(text) = document
            .get_element_by_id(CONFIG_ELEMENT_ID)
            .and_then(|el| el.text_content())
        else {
            return InteractionConfig::default();
        };
        InteractionConfig::from_json(&text).unwrap_or_else(|err| {
            log::warn!("using default configuration: {err}");
            InteractionConfig::default()
        })
    }
}
