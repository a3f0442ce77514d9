use std::cell::RefCell;
use std::collections::HashMap;
use std::rc::Rc;

use log::{info, warn};
use wasm_bindgen::closure::Closure;
use wasm_bindgen::{JsCast, JsValue};
use web_sys::js_sys::Array;
use web_sys::{
    Document, Element, Event, HtmlElement, IntersectionObserver, IntersectionObserverEntry,
    IntersectionObserverInit, MouseEvent, Window,
};

use crate::config::SiteConfig;
use crate::dom::{self, DomError};
use crate::navigation::controller::{ClickDisposition, NavigationController, Viewport};
use crate::navigation::state::{anchor_id, reveal_keys, IntersectionEntry};

const REVEAL_KEY_ATTR: &str = "data-reveal-key";

pub type SharedController = Rc<RefCell<NavigationController<BrowserViewport>>>;

pub struct BrowserViewport {
    window: Window,
    document: Document,
    header_selector: String,
    links: Vec<Element>,
    active_class: String,
    reveal_targets: HashMap<String, Element>,
    revealed_class: String,
}

impl Viewport for BrowserViewport {
    fn header_height(&self) -> Option<f64> {
        dom::query(&self.document, &self.header_selector)
            .map(|header| header.get_bounding_client_rect().height())
    }

    fn scroll_y(&self) -> f64 {
        self.window.scroll_y().unwrap_or(0.0)
    }

    fn element_top(&self, id: &str) -> Option<f64> {
        self.document
            .get_element_by_id(id)
            .map(|el| el.get_bounding_client_rect().top())
    }

    fn smooth_scroll_to(&self, top: f64) {
        dom::smooth_scroll_to(&self.window, top);
    }

    fn set_layout_variable(&self, name: &str, value: &str) {
        let root = self
            .document
            .document_element()
            .and_then(|el| el.dyn_into::<HtmlElement>().ok());
        if let Some(root) = root {
            if let Err(e) = root.style().set_property(name, value) {
                warn!("Could not set {}: {:?}", name, e);
            }
        }
    }

    fn set_active_link(&self, index: Option<usize>) {
        for (i, link) in self.links.iter().enumerate() {
            dom::set_class(link, &self.active_class, Some(i) == index);
        }
    }

    fn mark_revealed(&self, key: &str) {
        if let Some(el) = self.reveal_targets.get(key) {
            dom::set_class(el, &self.revealed_class, true);
        }
    }
}

/// Converts raw observer entries, keying each target with `key_of`.
fn read_entries(raw: &Array, key_of: impl Fn(&Element) -> Option<String>) -> Vec<IntersectionEntry> {
    raw.iter()
        .filter_map(|value| value.dyn_into::<IntersectionObserverEntry>().ok())
        .filter_map(|entry| {
            key_of(&entry.target()).map(|key| IntersectionEntry::new(key, entry.is_intersecting()))
        })
        .collect()
}

pub fn install(config: &SiteConfig) -> Result<SharedController, DomError> {
    let window = dom::window()?;
    let document = dom::document()?;

    let links = dom::query_all(&document, &config.selectors.nav_links);
    let hrefs = links
        .iter()
        .map(|link| link.get_attribute("href").unwrap_or_default())
        .collect();

    let reveal_elements = dom::query_all(&document, &config.selectors.reveal);
    let mut reveal_targets = HashMap::new();
    for (key, el) in reveal_keys(reveal_elements.len())
        .into_iter()
        .zip(&reveal_elements)
    {
        el.set_attribute(REVEAL_KEY_ATTR, &key)?;
        reveal_targets.insert(key, el.clone());
    }

    let viewport = BrowserViewport {
        window: window.clone(),
        document: document.clone(),
        header_selector: config.selectors.header.clone(),
        links: links.clone(),
        active_class: config.classes.active_link.clone(),
        reveal_targets,
        revealed_class: config.classes.revealed.clone(),
    };
    let controller: SharedController = Rc::new(RefCell::new(NavigationController::new(
        viewport,
        config.layout.clone(),
        hrefs,
    )));

    sync_header_height_variable(&controller, &window)?;
    bind_nav_clicks(&controller, &links)?;
    // Reveal still gets its own fallback when the active-section watch fails.
    if let Err(e) = observe_active_section(
        &controller,
        &dom::query_all(&document, &config.selectors.sections),
        config,
    ) {
        warn!("Active section highlighting disabled: {}", e);
    }
    observe_reveal(&controller, &reveal_elements, config);

    info!(
        "Navigation installed: {} links, {} reveal targets",
        links.len(),
        reveal_elements.len()
    );
    Ok(controller)
}

/// Writes the header variable now and again on every `load` and `resize`.
pub fn sync_header_height_variable(
    controller: &SharedController,
    window: &Window,
) -> Result<(), DomError> {
    controller.borrow().sync_header_height_variable();

    for event in ["load", "resize"] {
        let controller = controller.clone();
        dom::listen(window, event, move |_: Event| {
            controller.borrow().sync_header_height_variable();
        })?;
    }
    Ok(())
}

pub fn bind_nav_clicks(controller: &SharedController, links: &[Element]) -> Result<(), DomError> {
    for link in links {
        let href = link.get_attribute("href").unwrap_or_default();
        if anchor_id(&href).is_none() {
            continue;
        }
        let controller = controller.clone();
        dom::listen(link, "click", move |e: MouseEvent| {
            if controller.borrow().handle_nav_click(&href) == ClickDisposition::Intercepted {
                e.prevent_default();
            }
        })?;
    }
    Ok(())
}

pub fn observe_active_section(
    controller: &SharedController,
    sections: &[Element],
    config: &SiteConfig,
) -> Result<(), DomError> {
    if sections.is_empty() {
        return Ok(());
    }

    let callback = {
        let controller = controller.clone();
        Closure::wrap(Box::new(move |raw: Array, _observer: IntersectionObserver| {
            let entries = read_entries(&raw, |el| Some(el.id()));
            controller.borrow_mut().on_section_entries(&entries);
        }) as Box<dyn FnMut(Array, IntersectionObserver)>)
    };

    let offset = controller.borrow().compute_header_offset();
    let init = IntersectionObserverInit::new();
    init.set_root_margin(&config.observers.active_root_margin(offset));
    init.set_threshold(&JsValue::from_f64(config.observers.active_threshold));

    let observer = IntersectionObserver::new_with_options(callback.as_ref().unchecked_ref(), &init)?;
    for section in sections {
        observer.observe(section);
    }
    callback.forget();
    Ok(())
}

/// Without observer support every target is revealed up front.
pub fn observe_reveal(controller: &SharedController, targets: &[Element], config: &SiteConfig) {
    if targets.is_empty() {
        return;
    }

    let callback = {
        let controller = controller.clone();
        Closure::wrap(Box::new(move |raw: Array, observer: IntersectionObserver| {
            let entries = read_entries(&raw, |el| el.get_attribute(REVEAL_KEY_ATTR));
            let newly = controller.borrow_mut().on_reveal_entries(&entries);
            if newly.is_empty() {
                return;
            }
            for value in raw.iter() {
                if let Ok(entry) = value.dyn_into::<IntersectionObserverEntry>() {
                    let target = entry.target();
                    let done = target
                        .get_attribute(REVEAL_KEY_ATTR)
                        .map(|key| newly.contains(&key))
                        .unwrap_or(false);
                    if done {
                        observer.unobserve(&target);
                    }
                }
            }
        }) as Box<dyn FnMut(Array, IntersectionObserver)>)
    };

    let init = IntersectionObserverInit::new();
    init.set_root_margin(&config.observers.reveal_root_margin);
    init.set_threshold(&JsValue::from_f64(config.observers.reveal_threshold));

    match IntersectionObserver::new_with_options(callback.as_ref().unchecked_ref(), &init) {
        Ok(observer) => {
            for target in targets {
                observer.observe(target);
            }
            callback.forget();
        }
        Err(e) => {
            warn!("IntersectionObserver unavailable ({:?}), revealing everything", e);
            let keys: Vec<String> = targets
                .iter()
                .filter_map(|el| el.get_attribute(REVEAL_KEY_ATTR))
                .collect();
            controller.borrow_mut().reveal_all(&keys);
        }
    }
}
