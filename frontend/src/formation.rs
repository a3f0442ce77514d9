use log::{debug, info};
use wasm_bindgen::closure::Closure;
use wasm_bindgen::{JsCast, JsValue};
use web_sys::js_sys::Reflect;
use web_sys::{Event, HtmlFormElement};

use crate::config::SiteConfig;
use crate::dom::{self, DomError};

pub const FORMATION_THANKS: &str = "Merci ! Vous recevrez bientôt les infos sur la formation.";

/// Inline display after a toggle: only an explicit `none` opens the panel.
pub fn toggled_display(current: &str) -> &'static str {
    if current == "none" {
        "block"
    } else {
        "none"
    }
}

pub fn toggle(config: &SiteConfig) {
    let Ok(document) = dom::document() else {
        return;
    };
    if let Some(panel) = dom::query(&document, &config.selectors.formation_container) {
        let next = toggled_display(&dom::inline_display(&panel));
        debug!("Formation panel -> {}", next);
        dom::set_display(&panel, next);
    }
}

/// Publishes `showForm()` for inline handlers and wires the request form.
pub fn install(config: &SiteConfig) -> Result<(), DomError> {
    let window = dom::window()?;
    let document = dom::document()?;

    {
        let config = config.clone();
        let show_form = Closure::wrap(Box::new(move || toggle(&config)) as Box<dyn FnMut()>);
        Reflect::set(&window, &JsValue::from_str("showForm"), show_form.as_ref())?;
        show_form.forget();
    }

    let Some(form) = dom::query(&document, &config.selectors.formation_form) else {
        debug!("No formation form on this page");
        return Ok(());
    };
    let form = form
        .dyn_into::<HtmlFormElement>()
        .map_err(|_| DomError::WrongType(config.selectors.formation_form.clone(), "form"))?;

    let container_selector = config.selectors.formation_container.clone();
    let target = form.clone();
    dom::listen(&form, "submit", move |e: Event| {
        e.prevent_default();
        dom::alert(FORMATION_THANKS);
        target.reset();
        if let Ok(document) = dom::document() {
            if let Some(panel) = dom::query(&document, &container_selector) {
                dom::set_display(&panel, "none");
            }
        }
    })?;

    info!("Formation form installed");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn hidden_panel_opens() {
        assert_eq!(toggled_display("none"), "block");
    }

    #[test]
    fn anything_else_closes() {
        assert_eq!(toggled_display("block"), "none");
        assert_eq!(toggled_display(""), "none");
        assert_eq!(toggled_display("flex"), "none");
    }
}
