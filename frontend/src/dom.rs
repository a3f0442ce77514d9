use std::fmt;

use log::warn;
use thiserror::Error;
use wasm_bindgen::closure::Closure;
use wasm_bindgen::{JsCast, JsValue};
use web_sys::{
    Document, Element, Event, EventTarget, HtmlElement, ScrollBehavior, ScrollToOptions, Window,
};

#[derive(Debug, Error)]
pub enum DomError {
    #[error("no browser window available")]
    NoWindow,
    #[error("no element matches `{0}`")]
    Missing(String),
    #[error("`{0}` is not a {1}")]
    WrongType(String, &'static str),
    #[error("browser call failed: {0}")]
    Js(String),
}

impl From<JsValue> for DomError {
    fn from(value: JsValue) -> Self {
        DomError::Js(value.as_string().unwrap_or_else(|| format!("{:?}", value)))
    }
}

pub fn window() -> Result<Window, DomError> {
    web_sys::window().ok_or(DomError::NoWindow)
}

pub fn document() -> Result<Document, DomError> {
    window()?.document().ok_or(DomError::NoWindow)
}

/// First match for `selector`, `None` when absent or when the selector is invalid.
pub fn query(document: &Document, selector: &str) -> Option<Element> {
    document.query_selector(selector).ok().flatten()
}

pub fn require(document: &Document, selector: &str) -> Result<Element, DomError> {
    query(document, selector).ok_or_else(|| DomError::Missing(selector.to_string()))
}

pub fn require_as<T: JsCast>(
    document: &Document,
    selector: &str,
    kind: &'static str,
) -> Result<T, DomError> {
    require(document, selector)?
        .dyn_into::<T>()
        .map_err(|_| DomError::WrongType(selector.to_string(), kind))
}

pub fn query_all(document: &Document, selector: &str) -> Vec<Element> {
    let mut found = Vec::new();
    if let Ok(list) = document.query_selector_all(selector) {
        for i in 0..list.length() {
            if let Some(el) = list.item(i).and_then(|n| n.dyn_into::<Element>().ok()) {
                found.push(el);
            }
        }
    }
    found
}

/// Attaches `handler` for the lifetime of the page.
pub fn listen<E, F>(target: &EventTarget, event: &str, handler: F) -> Result<(), DomError>
where
    E: JsCast + 'static,
    F: FnMut(E) + 'static,
{
    let mut handler = handler;
    let callback = Closure::wrap(Box::new(move |e: Event| {
        if let Ok(e) = e.dyn_into::<E>() {
            handler(e);
        }
    }) as Box<dyn FnMut(Event)>);

    target.add_event_listener_with_callback(event, callback.as_ref().unchecked_ref())?;
    // Page-lifetime listener, never removed.
    callback.forget();
    Ok(())
}

/// Logs a failed DOM write. Returns whether the write succeeded.
pub fn warn_on_failure<E: fmt::Debug>(action: &str, result: Result<(), E>) -> bool {
    match result {
        Ok(()) => true,
        Err(e) => {
            warn!("Could not {}: {:?}", action, e);
            false
        }
    }
}

pub fn set_display(element: &Element, value: &str) {
    if let Some(el) = element.dyn_ref::<HtmlElement>() {
        warn_on_failure(
            &format!("set display {}", value),
            el.style().set_property("display", value),
        );
    }
}

pub fn inline_display(element: &Element) -> String {
    element
        .dyn_ref::<HtmlElement>()
        .and_then(|el| el.style().get_property_value("display").ok())
        .unwrap_or_default()
}

pub fn set_class(element: &Element, class: &str, on: bool) {
    let classes = element.class_list();
    let result = if on {
        classes.add_1(class)
    } else {
        classes.remove_1(class)
    };
    warn_on_failure(&format!("toggle class {}", class), result);
}

/// Native smooth scroll; the browser owns the animation.
pub fn smooth_scroll_to(window: &Window, top: f64) {
    let options = ScrollToOptions::new();
    options.set_top(top);
    options.set_behavior(ScrollBehavior::Smooth);
    window.scroll_to_with_scroll_to_options(&options);
}

/// Whether the event target is `container` itself rather than one of its children.
pub fn is_background_click(event: &Event, container: &Element) -> bool {
    event
        .target()
        .and_then(|t| t.dyn_into::<Element>().ok())
        .map(|t| t.is_same_node(Some(container.as_ref())))
        .unwrap_or(false)
}

/// Whether the event target is, or sits inside, an element matching `selector`.
pub fn target_within(event: &Event, selector: &str) -> bool {
    event
        .target()
        .and_then(|t| t.dyn_into::<Element>().ok())
        .and_then(|t| t.closest(selector).ok().flatten())
        .is_some()
}

pub fn alert(message: &str) {
    if let Some(window) = web_sys::window() {
        warn_on_failure(
            &format!("show alert \"{}\"", message),
            window.alert_with_message(message),
        );
    }
}
