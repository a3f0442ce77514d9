use std::cell::RefCell;
use std::rc::Rc;

use log::{debug, info};
use wasm_bindgen::JsCast;
use web_sys::{Element, HtmlImageElement, KeyboardEvent, MouseEvent};

use crate::config::SiteConfig;
use crate::dom::{self, DomError};
use crate::modal::{close_trigger, key_close_trigger, CloseTrigger};

/// Full-size source for a gallery item: an explicit `data-full`, then the
/// thumbnail image, then a wrapping link.
pub fn pick_source(
    data_full: Option<String>,
    image_src: Option<String>,
    href: Option<String>,
) -> Option<String> {
    [data_full, image_src, href]
        .into_iter()
        .flatten()
        .map(|s| s.trim().to_string())
        .find(|s| !s.is_empty())
}

pub struct Lightbox {
    container: Element,
    image: HtmlImageElement,
    open_class: String,
    src: Option<String>,
}

impl Lightbox {
    pub fn open(&mut self, src: &str) {
        self.src = Some(src.to_string());
        self.image.set_src(src);
        dom::set_class(&self.container, &self.open_class, true);
    }

    pub fn close(&mut self, trigger: CloseTrigger) {
        if let Some(src) = self.src.take() {
            debug!("Lightbox {} closed via {:?}", src, trigger);
        }
        dom::warn_on_failure("clear lightbox image", self.image.remove_attribute("src"));
        dom::set_class(&self.container, &self.open_class, false);
    }

    pub fn is_open(&self) -> bool {
        self.src.is_some()
    }
}

fn item_source(item: &Element) -> Option<String> {
    let image = match item.dyn_ref::<HtmlImageElement>() {
        Some(img) => Some(img.clone()),
        None => item
            .query_selector("img")
            .ok()
            .flatten()
            .and_then(|el| el.dyn_into::<HtmlImageElement>().ok()),
    };
    pick_source(
        item.get_attribute("data-full"),
        image.map(|img| img.src()),
        item.get_attribute("href"),
    )
}

pub fn install(config: &SiteConfig) -> Result<(), DomError> {
    let document = dom::document()?;
    let selectors = &config.selectors;
    let items = dom::query_all(&document, &selectors.gallery_items);
    if items.is_empty() {
        debug!("No gallery items, lightbox disabled");
        return Ok(());
    }

    let container = dom::require(&document, &selectors.lightbox)?;
    let image = dom::require_as::<HtmlImageElement>(&document, &selectors.lightbox_image, "image")?;
    let lightbox = Rc::new(RefCell::new(Lightbox {
        container: container.clone(),
        image,
        open_class: config.classes.open.clone(),
        src: None,
    }));

    for item in &items {
        let lightbox = lightbox.clone();
        let source_item = item.clone();
        dom::listen(item, "click", move |e: MouseEvent| {
            if let Some(src) = item_source(&source_item) {
                e.prevent_default();
                lightbox.borrow_mut().open(&src);
            }
        })?;
    }

    {
        let lightbox = lightbox.clone();
        let container_el = container.clone();
        let close_selector = selectors.lightbox_close.clone();
        dom::listen(&container, "click", move |e: MouseEvent| {
            if let Some(trigger) = close_trigger(
                dom::target_within(&e, &close_selector),
                dom::is_background_click(&e, &container_el),
            ) {
                lightbox.borrow_mut().close(trigger);
            }
        })?;
    }

    {
        let lightbox = lightbox.clone();
        dom::listen(&document, "keydown", move |e: KeyboardEvent| {
            if let Some(trigger) = key_close_trigger(&e.key()) {
                if lightbox.borrow().is_open() {
                    lightbox.borrow_mut().close(trigger);
                }
            }
        })?;
    }

    info!("Lightbox installed for {} items", items.len());
    Ok(())
}
