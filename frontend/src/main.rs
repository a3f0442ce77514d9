use log::{info, warn};
use web_sys::Event;

mod back_to_top;
mod config;
mod contact;
mod dom;
mod formation;
mod hero;
mod lightbox;
mod modal;
mod navigation {
    pub mod browser;
    pub mod controller;
    pub mod state;
}

use config::SiteConfig;
use dom::DomError;

fn report(feature: &str, result: Result<(), DomError>) {
    match result {
        Ok(()) => {}
        Err(DomError::Missing(selector)) => {
            log::debug!("{} disabled, no `{}` on this page", feature, selector)
        }
        Err(e) => warn!("{} not installed: {}", feature, e),
    }
}

/// Installs every behavior. A feature whose elements are missing is skipped.
fn install_all() {
    let config = match dom::document() {
        Ok(document) => SiteConfig::load(&document),
        Err(e) => {
            warn!("Nothing to install: {}", e);
            return;
        }
    };

    report("Navigation", navigation::browser::install(&config).map(|_| ()));
    report("Modal", modal::install(&config).map(|_| ()));
    report("Lightbox", lightbox::install(&config));
    report("Contact form", contact::install(&config));
    report("Formation form", formation::install(&config));
    report("Hero media", hero::install(&config));
    report("Back to top", back_to_top::install(&config));
}

fn main() {
    // Initialize console error panic hook for better error messages
    console_error_panic_hook::set_once();

    // Initialize logging
    console_log::init_with_level(config::log_level()).expect("error initializing log");

    info!("Starting site behaviors");
    let document = match dom::document() {
        Ok(document) => document,
        Err(e) => {
            warn!("{}", e);
            return;
        }
    };

    if document.ready_state() == "loading" {
        let installed = dom::listen(&document, "DOMContentLoaded", |_: Event| install_all());
        report("Startup", installed);
    } else {
        install_all();
    }
}
