use log::{debug, info};
use thiserror::Error;
use wasm_bindgen::JsCast;
use web_sys::{Element, Event, HtmlFormElement, HtmlInputElement, HtmlTextAreaElement};
use yew::prelude::*;

use crate::config::SiteConfig;
use crate::dom::{self, DomError};

pub const MISSING_FIELDS_ALERT: &str = "Merci de remplir tous les champs.";

/// Field values as read from the form. `None` means the page has no such field.
#[derive(Debug, Default, Clone, PartialEq)]
pub struct ContactFields {
    pub name: Option<String>,
    pub email: Option<String>,
    pub message: Option<String>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Confirmation {
    pub name: Option<String>,
}

impl Confirmation {
    pub fn greeting(&self) -> String {
        match &self.name {
            Some(name) => format!("Merci {} !", name),
            None => "Merci !".to_string(),
        }
    }

    pub fn text(&self) -> String {
        format!(
            "{} Votre message a bien été envoyé. Nous vous répondrons très vite.",
            self.greeting()
        )
    }
}

#[derive(Debug, Error, PartialEq)]
pub enum ContactError {
    #[error("missing fields: {}", .0.join(", "))]
    MissingFields(Vec<&'static str>),
}

impl ContactFields {
    /// Every field present on the page is required and must be non-blank once trimmed.
    pub fn validate(&self) -> Result<Confirmation, ContactError> {
        let missing: Vec<&'static str> = [
            ("name", &self.name),
            ("email", &self.email),
            ("message", &self.message),
        ]
        .into_iter()
        .filter(|(_, value)| matches!(value, Some(v) if v.trim().is_empty()))
        .map(|(field, _)| field)
        .collect();

        if !missing.is_empty() {
            return Err(ContactError::MissingFields(missing));
        }
        Ok(Confirmation {
            name: self.name.as_deref().map(|n| n.trim().to_string()),
        })
    }
}

#[derive(Properties, PartialEq)]
pub struct ContactConfirmationProps {
    pub greeting: String,
}

#[function_component(ContactConfirmation)]
pub fn contact_confirmation(props: &ContactConfirmationProps) -> Html {
    html! {
        <div class="form-success">
            <h3>{props.greeting.clone()}</h3>
            <p>{"Votre message a bien été envoyé. Nous vous répondrons très vite."}</p>
        </div>
    }
}

fn field_value(form: &Element, name: &str) -> Option<String> {
    let field = form
        .query_selector(&format!("[name=\"{}\"]", name))
        .ok()
        .flatten()?;
    if let Some(input) = field.dyn_ref::<HtmlInputElement>() {
        return Some(input.value());
    }
    field.dyn_ref::<HtmlTextAreaElement>().map(|area| area.value())
}

pub fn read_fields(form: &Element) -> ContactFields {
    ContactFields {
        name: field_value(form, "name"),
        email: field_value(form, "email"),
        message: field_value(form, "message"),
    }
}

pub fn install(config: &SiteConfig) -> Result<(), DomError> {
    let document = dom::document()?;
    let Some(form) = dom::query(&document, &config.selectors.contact_form) else {
        debug!("No contact form on this page");
        return Ok(());
    };
    let form = form
        .dyn_into::<HtmlFormElement>()
        .map_err(|_| DomError::WrongType(config.selectors.contact_form.clone(), "form"))?;

    let host: Element = form.clone().into();
    dom::listen(&form, "submit", move |e: Event| {
        e.prevent_default();
        match read_fields(&host).validate() {
            Ok(confirmation) => {
                debug!("{}", confirmation.text());
                host.set_inner_html("");
                yew::Renderer::<ContactConfirmation>::with_root_and_props(
                    host.clone(),
                    ContactConfirmationProps {
                        greeting: confirmation.greeting(),
                    },
                )
                .render();
            }
            Err(err) => {
                debug!("Contact form rejected: {}", err);
                dom::alert(MISSING_FIELDS_ALERT);
            }
        }
    })?;

    info!("Contact form installed");
    Ok(())
}
