//! Traits for the views the components and controllers drive, plus in-memory
//! implementations of each.
//!
//! The in-memory views keep their state in [`Shared`] values, so a clone
//! handed to a component and a clone kept by a test (or a server-side
//! renderer) observe the same state.
use std::collections::BTreeMap;

use crate::{
    registro::{Field, LogEntry},
    route::Route,
    str::Str,
    sync::Shared,
};

/// Text shown while no month has been chosen.
pub const PROMPT_SELECT_MONTH: &str =
    "Por favor, selecciona un mes para ver tus registros de bitácora.";

/// Text shown when a month has no entries.
pub fn no_entries_message(month_name: &str) -> String {
    format!("No se encontraron registros de bitácora para el mes de {month_name}.")
}

/// Whether the form creates a new entry or updates the loaded one.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum FormMode {
    #[default]
    Create,
    Edit,
}

impl FormMode {
    /// Label of the submit button.
    pub fn label(self) -> &'static str {
        match self {
            FormMode::Create => "Guardar Registro",
            FormMode::Edit => "Actualizar Registro",
        }
    }

    /// Bootstrap class of the submit button.
    pub fn class(self) -> &'static str {
        match self {
            FormMode::Create => "btn-primary",
            FormMode::Edit => "btn-warning",
        }
    }
}

/// The bitácora form.
pub trait FormView {
    fn field(&self, field: Field) -> Str;
    fn set_field(&self, field: Field, value: impl Into<Str>);
    /// Blank every field.
    fn reset(&self);
    fn default_patient(&self) -> Str;
    fn set_default_patient(&self, patient: impl Into<Str>);
    fn set_patient_readonly(&self, readonly: bool);
    fn set_mode(&self, mode: FormMode);
    fn scroll_into_view(&self);
}

/// The container of bitácora cards.
pub trait CardsView {
    fn show_prompt(&self);
    fn show_loading(&self);
    fn show_entries(&self, entries: &[LogEntry]);
    fn show_empty(&self, month_name: &str);
}

/// User facing notices and the "waiting for the server" state.
pub trait Messages {
    fn pop(&self, message: impl Into<Str>);
    fn modal(&self, message: impl Into<Str>);
    /// A modal showing markup built by the caller, which escapes what it
    /// interpolates.
    fn modal_html(&self, html: impl Into<Str>);
    fn toast(&self, message: impl Into<Str>);
    fn set_busy(&self, busy: bool);
}

/// Changes the active route.
pub trait Navigator {
    fn navigate(&self, route: Route);
}

#[derive(Clone, Default, Debug)]
pub struct MemoryForm {
    pub fields: Shared<BTreeMap<Field, Str>>,
    pub default_patient: Shared<Str>,
    pub patient_readonly: Shared<bool>,
    pub mode: Shared<FormMode>,
    pub scrolls: Shared<usize>,
}

impl MemoryForm {
    pub fn mode(&self) -> FormMode {
        *self.mode.get()
    }

    /// `true` when every field but the patient is blank.
    pub fn is_blank(&self) -> bool {
        Field::ALL
            .into_iter()
            .filter(|f| *f != Field::Paciente)
            .all(|f| self.field(f).is_empty())
    }
}

impl FormView for MemoryForm {
    fn field(&self, field: Field) -> Str {
        self.fields.get().get(&field).cloned().unwrap_or_default()
    }

    fn set_field(&self, field: Field, value: impl Into<Str>) {
        self.fields.get_mut().insert(field, value.into());
    }

    fn reset(&self) {
        self.fields.get_mut().clear();
    }

    fn default_patient(&self) -> Str {
        self.default_patient.cloned()
    }

    fn set_default_patient(&self, patient: impl Into<Str>) {
        self.default_patient.set(patient.into());
    }

    fn set_patient_readonly(&self, readonly: bool) {
        self.patient_readonly.set(readonly);
    }

    fn set_mode(&self, mode: FormMode) {
        self.mode.set(mode);
    }

    fn scroll_into_view(&self) {
        *self.scrolls.get_mut() += 1;
    }
}

/// What the cards container currently shows.
#[derive(Clone, Debug, Default, PartialEq)]
pub enum Cards {
    #[default]
    Nothing,
    Prompt,
    Loading,
    Entries(Vec<LogEntry>),
    NoEntries(String),
}

#[derive(Clone, Default, Debug)]
pub struct MemoryCards {
    pub cards: Shared<Cards>,
}

impl MemoryCards {
    pub fn cards(&self) -> Cards {
        self.cards.cloned()
    }
}

impl CardsView for MemoryCards {
    fn show_prompt(&self) {
        self.cards.set(Cards::Prompt);
    }

    fn show_loading(&self) {
        self.cards.set(Cards::Loading);
    }

    fn show_entries(&self, entries: &[LogEntry]) {
        self.cards.set(Cards::Entries(entries.to_vec()));
    }

    fn show_empty(&self, month_name: &str) {
        self.cards.set(Cards::NoEntries(no_entries_message(month_name)));
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum MessageKind {
    Pop,
    Modal,
    ModalHtml,
    Toast,
}

#[derive(Clone, Default, Debug)]
pub struct MemoryMessages {
    pub shown: Shared<Vec<(MessageKind, Str)>>,
    pub busy: Shared<bool>,
}

impl MemoryMessages {
    pub fn last(&self) -> Option<(MessageKind, Str)> {
        self.shown.get().last().cloned()
    }

    pub fn is_busy(&self) -> bool {
        *self.busy.get()
    }
}

impl Messages for MemoryMessages {
    fn pop(&self, message: impl Into<Str>) {
        self.shown.get_mut().push((MessageKind::Pop, message.into()));
    }

    fn modal(&self, message: impl Into<Str>) {
        self.shown.get_mut().push((MessageKind::Modal, message.into()));
    }

    fn modal_html(&self, html: impl Into<Str>) {
        self.shown.get_mut().push((MessageKind::ModalHtml, html.into()));
    }

    fn toast(&self, message: impl Into<Str>) {
        self.shown.get_mut().push((MessageKind::Toast, message.into()));
    }

    fn set_busy(&self, busy: bool) {
        self.busy.set(busy);
    }
}

#[derive(Clone, Default, Debug)]
pub struct MemoryNavigator {
    pub visited: Shared<Vec<Route>>,
}

impl MemoryNavigator {
    pub fn current(&self) -> Option<Route> {
        self.visited.get().last().copied()
    }
}

impl Navigator for MemoryNavigator {
    fn navigate(&self, route: Route) {
        self.visited.get_mut().push(route);
    }
}
