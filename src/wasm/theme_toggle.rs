//! Applies the theme preference to the document and binds toggle buttons.

use std::cell::RefCell;
use std::rc::Rc;

use wasm_bindgen::{JsCast, JsValue};
use web_sys::{CustomEvent, CustomEventInit, Document, Element, MediaQueryListEvent};

use crate::config::ThemeSettings;
use crate::error::Error;
use crate::theme::{Theme, ThemePreference, ThemeSource};

use super::dom::{defer, js_err, listen, query, query_all, set_attr, set_class};
use super::storage::LocalStore;

pub const THEME_CHANGE_EVENT: &str = "themechange";
const DARK_QUERY: &str = "(prefers-color-scheme: dark)";

pub struct ThemeToggle {
    preference: RefCell<ThemePreference<LocalStore>>,
}

impl ThemeToggle {
    pub fn mount(document: &Document, settings: &ThemeSettings) -> Result<Rc<Self>, Error> {
        let root = document
            .document_element()
            .ok_or_else(|| Error::missing("html"))?;
        let media = web_sys::window()
            .and_then(|w| w.match_media(DARK_QUERY).ok().flatten());
        let system_dark = media.as_ref().is_some_and(|m| m.matches());

        let mut preference =
            ThemePreference::resolve_initial(LocalStore::open(), &settings.storage_key, system_dark);
        let buttons = query_all(&root, ".theme-toggle");

        // First paint: no transition, no broadcast.
        set_class(&root, "no-transition", true);
        apply(document, &root, &buttons, preference.value());
        let settle_root = root.clone();
        defer(10, move || set_class(&settle_root, "no-transition", false));

        {
            let document = document.clone();
            let root = root.clone();
            let buttons = buttons.clone();
            preference.subscribe(move |theme| {
                apply(&document, &root, &buttons, theme);
                if let Err(err) = broadcast(&document, theme) {
                    log::warn!("theme broadcast: {err}");
                }
            });
        }

        let toggle = Rc::new(Self {
            preference: RefCell::new(preference),
        });

        if buttons.is_empty() {
            log::debug!("theme: no .theme-toggle buttons");
        }
        for button in &buttons {
            let toggle = Rc::clone(&toggle);
            listen(button, "click", move |_| {
                toggle.toggle();
            })?;
        }

        if let Some(media) = media {
            let toggle = Rc::clone(&toggle);
            listen(&media, "change", move |event| {
                if let Some(change) = event.dyn_ref::<MediaQueryListEvent>() {
                    toggle.preference.borrow_mut().system_changed(change.matches());
                }
            })?;
        }

        Ok(toggle)
    }

    pub fn toggle(&self) -> Theme {
        let theme = self.preference.borrow_mut().toggle();
        log::info!("theme switched to {theme}");
        theme
    }

    pub fn current(&self) -> Theme {
        self.preference.borrow().value()
    }

    pub fn source(&self) -> ThemeSource {
        self.preference.borrow().source()
    }
}

fn apply(document: &Document, root: &Element, buttons: &[Element], theme: Theme) {
    set_attr(root, "data-theme", theme.as_str());
    let pressed = if theme.is_dark() { "true" } else { "false" };
    for button in buttons {
        set_attr(button, "aria-pressed", pressed);
    }
    update_meta_color(document, root);
}

/// Mirror `--bg-primary` into `<meta name="theme-color">` for mobile chrome.
fn update_meta_color(document: &Document, root: &Element) {
    let Some(color) = web_sys::window()
        .and_then(|w| w.get_computed_style(root).ok().flatten())
        .and_then(|style| style.get_property_value("--bg-primary").ok())
        .map(|value| value.trim().to_string())
        .filter(|value| !value.is_empty())
    else {
        return;
    };
    let meta = match query(root, r#"meta[name="theme-color"]"#) {
        Some(meta) => meta,
        None => {
            let Some(head) = document.head() else { return };
            let Ok(meta) = document.create_element("meta") else {
                return;
            };
            set_attr(&meta, "name", "theme-color");
            if let Err(err) = head.append_child(&meta) {
                log::debug!("meta theme-color: {}", js_err(err));
                return;
            }
            meta
        }
    };
    set_attr(&meta, "content", &color);
}

fn broadcast(document: &Document, theme: Theme) -> Result<(), Error> {
    let detail = js_sys::Object::new();
    js_sys::Reflect::set(&detail, &JsValue::from_str("theme"), &JsValue::from_str(theme.as_str()))
        .map_err(js_err)?;
    let init = CustomEventInit::new();
    init.set_detail(&detail);
    let event =
        CustomEvent::new_with_event_init_dict(THEME_CHANGE_EVENT, &init).map_err(js_err)?;
    document.dispatch_event(&event).map_err(js_err)?;
    Ok(())
}
