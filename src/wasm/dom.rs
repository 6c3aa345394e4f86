//! Thin helpers over the DOM substrate.

use wasm_bindgen::closure::Closure;
use wasm_bindgen::{JsCast, JsValue};
use web_sys::{Document, Element, Event, EventTarget, HtmlElement};

use crate::error::Error;

pub fn js_err(value: JsValue) -> Error {
    let message = value
        .as_string()
        .or_else(|| {
            value
                .dyn_ref::<js_sys::Error>()
                .map(|err| String::from(err.message()))
        })
        .unwrap_or_else(|| format!("{value:?}"));
    Error::Js { message }
}

pub fn document() -> Result<Document, Error> {
    web_sys::window()
        .and_then(|w| w.document())
        .ok_or_else(|| Error::missing("document"))
}

/// Every element under `root` matching `selector`, in document order.
pub fn query_all(root: &Element, selector: &str) -> Vec<Element> {
    let Ok(list) = root.query_selector_all(selector) else {
        return Vec::new();
    };
    (0..list.length())
        .filter_map(|i| list.get(i))
        .filter_map(|node| node.dyn_into::<Element>().ok())
        .collect()
}

pub fn query(root: &Element, selector: &str) -> Option<Element> {
    root.query_selector(selector).ok().flatten()
}

pub fn html(element: &Element) -> Option<HtmlElement> {
    element.clone().dyn_into::<HtmlElement>().ok()
}

/// Text of the first descendant matching `selector`, empty when absent.
pub fn text_of(root: &Element, selector: &str) -> String {
    query(root, selector)
        .and_then(|el| el.text_content())
        .unwrap_or_default()
}

/// Text of every descendant matching `selector`.
pub fn texts_of(root: &Element, selector: &str) -> Vec<String> {
    query_all(root, selector)
        .iter()
        .filter_map(|el| el.text_content())
        .collect()
}

/// First non-empty attribute among `names`.
pub fn attr_any(element: &Element, names: &[&str]) -> Option<String> {
    names
        .iter()
        .filter_map(|name| element.get_attribute(name))
        .find(|value| !value.is_empty())
}

pub fn set_class(element: &Element, class: &str, on: bool) {
    let classes = element.class_list();
    let result = if on {
        classes.add_1(class)
    } else {
        classes.remove_1(class)
    };
    if let Err(err) = result {
        log::warn!("class {class}: {}", js_err(err));
    }
}

pub fn set_attr(element: &Element, name: &str, value: &str) {
    if let Err(err) = element.set_attribute(name, value) {
        log::warn!("attribute {name}: {}", js_err(err));
    }
}

pub fn set_style(element: &HtmlElement, property: &str, value: &str) {
    if let Err(err) = element.style().set_property(property, value) {
        log::warn!("style {property}: {}", js_err(err));
    }
}

/// Attach a listener for the lifetime of the page.
pub fn listen<F>(target: &EventTarget, event: &str, handler: F) -> Result<(), Error>
where
    F: FnMut(Event) + 'static,
{
    let closure = Closure::<dyn FnMut(Event)>::new(handler);
    target
        .add_event_listener_with_callback(event, closure.as_ref().unchecked_ref())
        .map_err(js_err)?;
    closure.forget();
    Ok(())
}

/// Run `callback` once after `ms`. The closure frees itself after it runs.
pub fn defer<F>(ms: u32, callback: F)
where
    F: FnOnce() + 'static,
{
    let Some(window) = web_sys::window() else {
        return;
    };
    let callback = Closure::once_into_js(callback);
    let delay = i32::try_from(ms).unwrap_or(i32::MAX);
    if let Err(err) = window
        .set_timeout_with_callback_and_timeout_and_arguments_0(callback.unchecked_ref(), delay)
    {
        log::warn!("timer: {}", js_err(err));
    }
}
