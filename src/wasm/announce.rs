use web_sys::Document;

use crate::ports::Announcer;

use super::dom::{defer, js_err, set_attr};

/// Polite live region: each announcement is a short-lived `sr-only` node.
pub struct LiveRegion {
    document: Document,
    clear_ms: u32,
}

impl LiveRegion {
    pub fn new(document: Document, clear_ms: u32) -> Self {
        Self { document, clear_ms }
    }
}

impl Announcer for LiveRegion {
    fn announce(&self, text: &str) {
        let Some(body) = self.document.body() else {
            return;
        };
        let node = match self.document.create_element("div") {
            Ok(node) => node,
            Err(err) => {
                log::warn!("announce: {}", js_err(err));
                return;
            }
        };
        set_attr(&node, "aria-live", "polite");
        set_attr(&node, "aria-atomic", "true");
        node.set_class_name("sr-only");
        node.set_text_content(Some(text));
        if let Err(err) = body.append_child(&node) {
            log::warn!("announce: {}", js_err(err));
            return;
        }
        log::debug!("announced {text:?}");
        defer(self.clear_ms, move || node.remove());
    }
}
