use std::cell::RefCell;
use std::rc::Rc;

use log::{debug, info};
use web_sys::{Element, Event, KeyboardEvent, MouseEvent};
use yew::prelude::*;
use yew::AppHandle;

use crate::config::SiteConfig;
use crate::dom::{self, DomError};

pub const STUDIO_PHONE: &str = "01 39 59 15 48";
pub const STUDIO_PHONE_HREF: &str = "tel:+33139591548";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ModalKind {
    Reservation,
    Subscription,
}

impl ModalKind {
    /// Exactly `reservation` opens the reservation template, anything else the subscription one.
    pub fn from_data_type(value: Option<&str>) -> Self {
        match value {
            Some("reservation") => ModalKind::Reservation,
            _ => ModalKind::Subscription,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct ModalTemplate {
    pub title: &'static str,
    pub lead: &'static str,
    pub phone: &'static str,
    pub note: &'static str,
}

pub fn template(kind: ModalKind) -> ModalTemplate {
    match kind {
        ModalKind::Reservation => ModalTemplate {
            title: "Réserver une séance",
            lead: "Pour réserver votre séance ou votre cours, appelez-nous au",
            phone: STUDIO_PHONE,
            note: "Vous pouvez aussi passer directement à l'accueil du club.",
        },
        ModalKind::Subscription => ModalTemplate {
            title: "S'abonner",
            lead: "Nos formules d'abonnement se souscrivent à l'accueil. Pour toute question, appelez-nous au",
            phone: STUDIO_PHONE,
            note: "Pensez à apporter une pièce d'identité et un RIB.",
        },
    }
}

#[derive(Properties, PartialEq)]
pub struct ModalContentProps {
    pub kind: ModalKind,
}

#[function_component(ModalContent)]
pub fn modal_content(props: &ModalContentProps) -> Html {
    let ModalTemplate {
        title,
        lead,
        phone,
        note,
    } = template(props.kind);

    html! {
        <div class="modal-body">
            <button type="button" class="modal-close" aria-label="Fermer">{"×"}</button>
            <h2>{title}</h2>
            <p>
                {lead}{" "}
                <a href={STUDIO_PHONE_HREF} class="modal-phone">{phone}</a>
            </p>
            <p class="modal-note">{note}</p>
        </div>
    }
}

/// Which control asked the modal (or lightbox) to close.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CloseTrigger {
    CloseButton,
    Background,
    Escape,
}

/// Decides whether a click on an overlay closes it. Clicks inside the
/// content box, other than on the close control, do not.
pub fn close_trigger(in_close_control: bool, on_container: bool) -> Option<CloseTrigger> {
    if in_close_control {
        Some(CloseTrigger::CloseButton)
    } else if on_container {
        Some(CloseTrigger::Background)
    } else {
        None
    }
}

pub fn key_close_trigger(key: &str) -> Option<CloseTrigger> {
    match key {
        "Escape" | "Esc" => Some(CloseTrigger::Escape),
        _ => None,
    }
}

pub struct Modal {
    overlay: Element,
    content: Element,
    open_class: String,
    open: Option<ModalKind>,
    mounted: Option<AppHandle<ModalContent>>,
}

impl Modal {
    pub fn open(&mut self, kind: ModalKind) {
        self.clear_content();
        self.mounted = Some(
            yew::Renderer::<ModalContent>::with_root_and_props(
                self.content.clone(),
                ModalContentProps { kind },
            )
            .render(),
        );
        self.open = Some(kind);
        dom::set_class(&self.overlay, &self.open_class, true);
        debug!("Modal opened: {:?}", kind);
    }

    pub fn close(&mut self, trigger: CloseTrigger) {
        if let Some(kind) = self.open.take() {
            debug!("Modal {:?} closed via {:?}", kind, trigger);
        }
        self.clear_content();
        dom::set_class(&self.overlay, &self.open_class, false);
    }

    pub fn is_open(&self) -> bool {
        self.open.is_some()
    }

    fn clear_content(&mut self) {
        if let Some(handle) = self.mounted.take() {
            handle.destroy();
        }
        self.content.set_inner_html("");
    }
}

pub type SharedModal = Rc<RefCell<Modal>>;

pub fn install(config: &SiteConfig) -> Result<SharedModal, DomError> {
    let document = dom::document()?;
    let selectors = &config.selectors;
    let overlay = dom::require(&document, &selectors.modal_overlay)?;
    let content = dom::require(&document, &selectors.modal_content)?;

    let modal = Rc::new(RefCell::new(Modal {
        overlay: overlay.clone(),
        content,
        open_class: config.classes.open.clone(),
        open: None,
        mounted: None,
    }));

    for trigger in dom::query_all(&document, &selectors.modal_trigger) {
        let modal = modal.clone();
        let kind = ModalKind::from_data_type(trigger.get_attribute("data-type").as_deref());
        dom::listen(&trigger, "click", move |e: MouseEvent| {
            e.prevent_default();
            modal.borrow_mut().open(kind);
        })?;
    }

    if let Some(button) = dom::query(&document, &selectors.hero_reserve) {
        let modal = modal.clone();
        dom::listen(&button, "click", move |e: MouseEvent| {
            e.prevent_default();
            modal.borrow_mut().open(ModalKind::Reservation);
        })?;
    }

    // The close control may be static or part of a rendered template, so
    // both it and the background are handled on the overlay.
    {
        let modal = modal.clone();
        let overlay_el = overlay.clone();
        let close_selector = selectors.modal_close.clone();
        dom::listen(&overlay, "click", move |e: MouseEvent| {
            if let Some(trigger) = close_trigger(
                dom::target_within(&e, &close_selector),
                dom::is_background_click(&e, &overlay_el),
            ) {
                modal.borrow_mut().close(trigger);
            }
        })?;
    }

    // <dialog> overlays fire `cancel` on Escape.
    {
        let modal = modal.clone();
        dom::listen(&overlay, "cancel", move |e: Event| {
            e.prevent_default();
            modal.borrow_mut().close(CloseTrigger::Escape);
        })?;
    }

    {
        let modal = modal.clone();
        dom::listen(&document, "keydown", move |e: KeyboardEvent| {
            if let Some(trigger) = key_close_trigger(&e.key()) {
                if modal.borrow().is_open() {
                    modal.borrow_mut().close(trigger);
                }
            }
        })?;
    }

    info!("Modal installed");
    Ok(modal)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn data_type_selects_template() {
        assert_eq!(
            ModalKind::from_data_type(Some("reservation")),
            ModalKind::Reservation
        );
        assert_eq!(
            ModalKind::from_data_type(Some("abonnement")),
            ModalKind::Subscription
        );
        assert_eq!(ModalKind::from_data_type(None), ModalKind::Subscription);
    }

    #[test]
    fn reservation_template_shows_phone() {
        let reservation = template(ModalKind::Reservation);
        assert_eq!(reservation.phone, "01 39 59 15 48");
        assert_ne!(reservation.title, template(ModalKind::Subscription).title);
    }

    #[test]
    fn data_type_must_match_exactly() {
        assert_eq!(
            ModalKind::from_data_type(Some(" reservation ")),
            ModalKind::Subscription
        );
        assert_eq!(
            ModalKind::from_data_type(Some("Reservation")),
            ModalKind::Subscription
        );
    }

    #[test]
    fn close_control_closes_even_inside_content() {
        assert_eq!(close_trigger(true, false), Some(CloseTrigger::CloseButton));
        assert_eq!(close_trigger(true, true), Some(CloseTrigger::CloseButton));
    }

    #[test]
    fn background_click_closes() {
        assert_eq!(close_trigger(false, true), Some(CloseTrigger::Background));
    }

    #[test]
    fn click_inside_content_box_keeps_it_open() {
        assert_eq!(close_trigger(false, false), None);
    }

    #[test]
    fn escape_key_closes() {
        assert_eq!(key_close_trigger("Escape"), Some(CloseTrigger::Escape));
        assert_eq!(key_close_trigger("Esc"), Some(CloseTrigger::Escape));
        assert_eq!(key_close_trigger("Enter"), None);
        assert_eq!(key_close_trigger("e"), None);
    }
}
