//! Views over the elements of the route templates.
//!
//! Elements are looked up by id on every call, so a view stays valid while
//! its template is swapped in and out. A missing element is logged and the
//! call does nothing.
use wasm_bindgen::{JsCast, JsValue, prelude::Closure};
use web_sys::{
    HtmlElement, HtmlFormElement, HtmlInputElement, ScrollBehavior, ScrollIntoViewOptions,
    ScrollLogicalPosition,
};

use super::{document, element, element_as, window};
use crate::{
    registro::{Field, LogEntry, escape_html},
    str::Str,
    view::{CardsView, FormMode, FormView, Messages, PROMPT_SELECT_MONTH, no_entries_message},
};

pub const FORM: &str = "frmBitacora";
pub const SAVE_BUTTON: &str = "btnGuardar";
pub const CLEAR_BUTTON: &str = "btnLimpiar";
pub const CARDS: &str = "contenedorTarjetas";
pub const MONTH_SELECT: &str = "selMes";
pub const LOGIN_FORM: &str = "frmInicioSesion";
pub const APP_CONTENT: &str = "appContent";

/// Attribute of the patient input holding the signed in user's name.
const DEFAULT_PATIENT: &str = "data-default-paciente";
/// Class of the controls disabled while a request is in flight.
const WHILE_WAITING: &str = "while-waiting";
const TOAST_MILLIS: i32 = 2000;

fn logged<T>(what: &str, result: Result<T, JsValue>) -> Option<T> {
    result
        .inspect_err(|e| log::error!("{what}: {e:?}"))
        .ok()
}

/// The bitácora form, `#frmBitacora`.
#[derive(Clone, Copy, Debug, Default)]
pub struct DomForm;

impl DomForm {
    fn input(field: Field) -> Option<HtmlInputElement> {
        logged("form field", element_as(field.dom_id()))
    }
}

impl FormView for DomForm {
    fn field(&self, field: Field) -> Str {
        Self::input(field)
            .map(|input| input.value().into())
            .unwrap_or_default()
    }

    fn set_field(&self, field: Field, value: impl Into<Str>) {
        if let Some(input) = Self::input(field) {
            input.set_value(value.into().as_str());
        }
    }

    fn reset(&self) {
        if let Some(form) = logged("form", element_as::<HtmlFormElement>(FORM)) {
            form.reset();
        }
    }

    fn default_patient(&self) -> Str {
        Self::input(Field::Paciente)
            .and_then(|input| input.get_attribute(DEFAULT_PATIENT))
            .map(Str::from)
            .unwrap_or_default()
    }

    fn set_default_patient(&self, patient: impl Into<Str>) {
        if let Some(input) = Self::input(Field::Paciente) {
            logged(
                "default patient",
                input.set_attribute(DEFAULT_PATIENT, patient.into().as_str()),
            );
        }
    }

    fn set_patient_readonly(&self, readonly: bool) {
        if let Some(input) = Self::input(Field::Paciente) {
            input.set_read_only(readonly);
        }
    }

    fn set_mode(&self, mode: FormMode) {
        let Some(button) = logged("save button", element(SAVE_BUTTON)) else {
            return;
        };
        let other = match mode {
            FormMode::Create => FormMode::Edit,
            FormMode::Edit => FormMode::Create,
        };
        button.set_text_content(Some(mode.label()));
        let classes = button.class_list();
        logged("save button class", classes.remove_1(other.class()));
        logged("save button class", classes.add_1(mode.class()));
    }

    fn scroll_into_view(&self) {
        if let Some(form) = logged("form", element(FORM)) {
            let options = ScrollIntoViewOptions::new();
            options.set_behavior(ScrollBehavior::Smooth);
            options.set_block(ScrollLogicalPosition::Start);
            form.scroll_into_view_with_scroll_into_view_options(&options);
        }
    }
}

/// The cards container, `#contenedorTarjetas`.
#[derive(Clone, Copy, Debug, Default)]
pub struct DomCards;

impl DomCards {
    fn fill(html: &str) {
        if let Some(container) = logged("cards", element(CARDS)) {
            container.set_inner_html(html);
        }
    }

    fn alert(kind: &str, icon: &str, text: &str) {
        Self::fill(&format!(
            r#"<div class="col-12"><div class="alert alert-{kind} text-center" role="alert"><i class="bi bi-{icon}"></i> {}</div></div>"#,
            escape_html(text)
        ));
    }
}

impl CardsView for DomCards {
    fn show_prompt(&self) {
        Self::alert("info", "info-circle", PROMPT_SELECT_MONTH);
    }

    fn show_loading(&self) {
        Self::fill(
            r#"<div class="col-12 text-center"><div class="spinner-border" style="width: 3rem; height: 3rem;" role="status"><span class="visually-hidden">Cargando...</span></div></div>"#,
        );
    }

    fn show_entries(&self, entries: &[LogEntry]) {
        let html: String = entries.iter().map(LogEntry::card_html).collect();
        Self::fill(&html);
    }

    fn show_empty(&self, month_name: &str) {
        Self::alert(
            "warning",
            "exclamation-triangle",
            &no_entries_message(month_name),
        );
    }
}

/// Bootstrap alerts for messages, `.while-waiting` controls for the busy
/// state.
#[derive(Clone, Copy, Debug, Default)]
pub struct DomMessages;

impl DomMessages {
    fn add_to_body(class: &str, html: &str, prepend: bool) -> Result<HtmlElement, JsValue> {
        let document = document()?;
        let body = document
            .body()
            .ok_or_else(|| JsValue::from_str("no body"))?;
        let div = document.create_element("div")?;
        div.set_class_name(class);
        div.set_inner_html(html);
        if prepend {
            body.prepend_with_node_1(&div)?;
        } else {
            body.append_child(&div)?;
        }
        div.dyn_into::<HtmlElement>()
            .map_err(|_| JsValue::from_str("not an html element"))
    }

    fn remove_all(selector: &str) -> Result<(), JsValue> {
        let found = document()?.query_selector_all(selector)?;
        for i in 0..found.length() {
            if let Some(element) = found.get(i).and_then(|n| n.dyn_into::<web_sys::Element>().ok()) {
                element.remove();
            }
        }
        Ok(())
    }

    fn pop_alert(message: &str) -> Result<(), JsValue> {
        Self::remove_all(".div-temporal")?;
        Self::add_to_body(
            "div-temporal",
            &format!(
                r#"<div class="alert alert-info alert-dismissible" role="alert">{}</div>"#,
                escape_html(message)
            ),
            true,
        )?;
        Ok(())
    }

    fn modal_dialog(body: &str) -> Result<(), JsValue> {
        Self::remove_all(".div-modal")?;
        let dialog = Self::add_to_body(
            "div-modal position-fixed top-50 start-50 translate-middle",
            &format!(
                r#"<div class="card shadow"><div class="card-header">Mensaje</div><div class="card-body">{body}</div><div class="card-footer text-end"><button class="btn btn-lg btn-secondary">Aceptar</button></div></div>"#
            ),
            false,
        )?;
        let close = Closure::once_into_js({
            let dialog = dialog.clone();
            move || dialog.remove()
        });
        dialog.set_onclick(Some(close.unchecked_ref::<js_sys::Function>()));
        Ok(())
    }

    fn toast_alert(message: &str) -> Result<(), JsValue> {
        let toast = Self::add_to_body(
            "div-toast position-fixed bottom-0 end-0 p-3",
            &format!(
                r#"<div class="alert alert-dark" role="status">{}</div>"#,
                escape_html(message)
            ),
            false,
        )?;
        let expire = Closure::once_into_js(move || toast.remove());
        window()?.set_timeout_with_callback_and_timeout_and_arguments_0(
            expire.unchecked_ref::<js_sys::Function>(),
            TOAST_MILLIS,
        )?;
        Ok(())
    }

    fn set_waiting(busy: bool) -> Result<(), JsValue> {
        let controls = document()?.query_selector_all(&format!(".{WHILE_WAITING}"))?;
        for i in 0..controls.length() {
            let Some(control) = controls
                .get(i)
                .and_then(|n| n.dyn_into::<web_sys::Element>().ok())
            else {
                continue;
            };
            if busy {
                control.set_attribute("disabled", "true")?;
                control.class_list().add_1("disabled")?;
            } else {
                control.remove_attribute("disabled")?;
                control.class_list().remove_1("disabled")?;
            }
        }
        Ok(())
    }
}

impl Messages for DomMessages {
    fn pop(&self, message: impl Into<Str>) {
        logged("pop", Self::pop_alert(message.into().as_str()));
    }

    fn modal(&self, message: impl Into<Str>) {
        logged("modal", Self::modal_dialog(&escape_html(message.into().as_str())));
    }

    fn modal_html(&self, html: impl Into<Str>) {
        logged("modal", Self::modal_dialog(html.into().as_str()));
    }

    fn toast(&self, message: impl Into<Str>) {
        logged("toast", Self::toast_alert(message.into().as_str()));
    }

    fn set_busy(&self, busy: bool) {
        logged("busy", Self::set_waiting(busy));
    }
}

/// Ask the user to confirm with the browser's dialog.
pub fn confirm(message: &str) -> bool {
    window()
        .and_then(|w| w.confirm_with_message(message))
        .unwrap_or_default()
}

/// Value of the named input inside the login form.
pub fn login_input(name: &str) -> Str {
    document()
        .and_then(|d| d.query_selector(&format!("#{LOGIN_FORM} [name={name}]")))
        .ok()
        .flatten()
        .and_then(|e| e.dyn_into::<HtmlInputElement>().ok())
        .map(|input| input.value().into())
        .unwrap_or_default()
}

/// `data-id` of the button with `class` that an event came from.
pub fn card_button_id(event: &web_sys::Event, class: &str) -> Option<i64> {
    let target = event.target()?.dyn_into::<web_sys::Element>().ok()?;
    let button = target.closest(&format!(".{class}")).ok()??;
    button.get_attribute("data-id")?.trim().parse().ok()
}
