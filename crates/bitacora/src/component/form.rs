use serde_json::Value;

use crate::{
    event::{CARGAR_PARA_EDITAR, LIMPIAR_FORMULARIO, Payload, REGISTRO_GUARDADO, is_truthy},
    mediator::{Receiver, WeakMediator},
    registro::{Field, LogEntry},
    view::{FormMode, FormView},
};

/// Keeps the bitácora form in step with the rest of the page.
///
/// The form is in "create" mode until an entry is loaded for editing, and goes
/// back once that entry is saved or the form is cleared. The mode lives only
/// in the view: the submit button and the hidden id field.
pub struct FormComponent<V> {
    view: V,
    mediator: WeakMediator,
}

impl<V: FormView> FormComponent<V> {
    pub fn new(view: V, mediator: WeakMediator) -> Self {
        FormComponent { view, mediator }
    }

    pub fn view(&self) -> &V {
        &self.view
    }

    /// Blank the form and put the default patient back.
    pub fn clear(&self) {
        self.view.reset();
        self.view.set_field(Field::IdBitacora, "");
        let patient = self.view.default_patient();
        self.view.set_field(Field::Paciente, patient);
        self.view.set_mode(FormMode::Create);
    }

    /// Show `entry` for editing.
    pub fn load(&self, entry: &LogEntry) {
        for field in Field::ALL {
            self.view.set_field(field, entry.value(field));
        }
        self.view.set_mode(FormMode::Edit);
        self.view.scroll_into_view();
    }

    fn load_payload(&self, data: &Payload) {
        let Some(registro) = data.get("registro").filter(|v| is_truthy(v)) else {
            log::trace!("nothing to load into the form");
            return;
        };
        match serde_json::from_value::<LogEntry>(Value::clone(registro)) {
            Ok(entry) => self.load(&entry),
            Err(e) => log::warn!("cannot load entry into the form: {e}"),
        }
    }

    /// Tell every other component about `event`.
    pub fn notify(&self, event: &str, data: &Payload) {
        self.mediator.broadcast(event, data);
    }
}

impl<V: FormView> Receiver for FormComponent<V> {
    fn receive(&self, event: &str, data: &Payload) {
        match event {
            REGISTRO_GUARDADO | LIMPIAR_FORMULARIO => self.clear(),
            CARGAR_PARA_EDITAR => self.load_payload(data),
            _ => {}
        }
    }
}
