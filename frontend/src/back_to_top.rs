use log::{debug, info};
use web_sys::{Event, MouseEvent};

use crate::config::SiteConfig;
use crate::dom::{self, DomError};

/// Visible once the page is scrolled past `ratio` of the viewport height.
pub fn is_visible(scroll_y: f64, viewport_height: f64, ratio: f64) -> bool {
    scroll_y > viewport_height * ratio
}

pub fn install(config: &SiteConfig) -> Result<(), DomError> {
    let window = dom::window()?;
    let document = dom::document()?;
    let Some(button) = dom::query(&document, &config.selectors.back_to_top) else {
        debug!("No back-to-top control on this page");
        return Ok(());
    };

    let update = {
        let window = window.clone();
        let button = button.clone();
        let class = config.classes.back_to_top_visible.clone();
        let ratio = config.layout.back_to_top_ratio;
        move || {
            let scroll_y = window.scroll_y().unwrap_or(0.0);
            let height = window
                .inner_height()
                .ok()
                .and_then(|h| h.as_f64())
                .unwrap_or(0.0);
            dom::set_class(&button, &class, is_visible(scroll_y, height, ratio));
        }
    };

    // Initial check
    update();
    dom::listen(&window, "scroll", move |_: Event| update())?;

    {
        let window = window.clone();
        dom::listen(&button, "click", move |e: MouseEvent| {
            e.prevent_default();
            dom::smooth_scroll_to(&window, 0.0);
        })?;
    }

    info!("Back-to-top installed");
    Ok(())
}
