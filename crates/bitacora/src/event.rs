//! Lifecycle events exchanged through the [`Mediator`](crate::mediator::Mediator).
//!
//! On the wire an event is a name plus a JSON object payload. [`BitacoraEvent`]
//! is the typed view of the same vocabulary, used by the controllers that
//! produce events.
use serde_json::{Map, Value, json};

use crate::{registro::LogEntry, str::Str};

/// Payload carried along with an event name.
pub type Payload = Map<String, Value>;

/// A log entry was created.
pub const REGISTRO_GUARDADO: &str = "registro_guardado";
/// An existing log entry was updated.
pub const REGISTRO_ACTUALIZADO: &str = "registro_actualizado";
/// A log entry was deleted.
pub const REGISTRO_ELIMINADO: &str = "registro_eliminado";
/// Load `data.registro` into the form for editing.
pub const CARGAR_PARA_EDITAR: &str = "cargar_para_editar";
/// The month selector changed, `data.mes` holds the selection.
pub const MES_SELECCIONADO: &str = "mes_seleccionado";
/// Reset the form.
pub const LIMPIAR_FORMULARIO: &str = "limpiar_formulario";

/// Turn a JSON value into a payload.
///
/// Anything other than an object becomes an empty payload.
pub fn payload(value: Value) -> Payload {
    match value {
        Value::Object(map) => map,
        _ => Payload::new(),
    }
}

/// JavaScript truthiness of a payload value.
///
/// Components only act on payload values that pass this check.
pub fn is_truthy(value: &Value) -> bool {
    match value {
        Value::Null => false,
        Value::Bool(b) => *b,
        Value::Number(n) => n.as_f64().is_some_and(|f| f != 0.0 && !f.is_nan()),
        Value::String(s) => !s.is_empty(),
        Value::Array(_) | Value::Object(_) => true,
    }
}

/// The events of the bitácora views.
#[derive(Clone, Debug, PartialEq)]
pub enum BitacoraEvent {
    Saved { id: Value },
    Updated { id: Value },
    Deleted { id: Value },
    LoadForEdit { entry: Option<LogEntry> },
    MonthSelected { month: Str },
    ClearForm,
}

impl BitacoraEvent {
    /// The event's name on the mediator.
    pub fn name(&self) -> &'static str {
        match self {
            BitacoraEvent::Saved { .. } => REGISTRO_GUARDADO,
            BitacoraEvent::Updated { .. } => REGISTRO_ACTUALIZADO,
            BitacoraEvent::Deleted { .. } => REGISTRO_ELIMINADO,
            BitacoraEvent::LoadForEdit { .. } => CARGAR_PARA_EDITAR,
            BitacoraEvent::MonthSelected { .. } => MES_SELECCIONADO,
            BitacoraEvent::ClearForm => LIMPIAR_FORMULARIO,
        }
    }

    /// The event's payload.
    pub fn payload(&self) -> Payload {
        payload(match self {
            BitacoraEvent::Saved { id }
            | BitacoraEvent::Updated { id }
            | BitacoraEvent::Deleted { id } => json!({ "id": id }),
            BitacoraEvent::LoadForEdit { entry } => {
                let registro = entry
                    .as_ref()
                    .and_then(|entry| serde_json::to_value(entry).ok())
                    .unwrap_or(Value::Null);
                json!({ "registro": registro })
            }
            BitacoraEvent::MonthSelected { month } => json!({ "mes": month.as_str() }),
            BitacoraEvent::ClearForm => json!({}),
        })
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn truthiness() {
        assert!(!is_truthy(&Value::Null));
        assert!(!is_truthy(&json!(false)));
        assert!(!is_truthy(&json!(0)));
        assert!(!is_truthy(&json!("")));
        assert!(is_truthy(&json!("0")));
        assert!(is_truthy(&json!({})));
        assert!(is_truthy(&json!(7)));
    }

    #[test]
    fn payload_shapes() {
        let deleted = BitacoraEvent::Deleted { id: json!(3) };
        assert_eq!(deleted.name(), "registro_eliminado");
        assert_eq!(deleted.payload().get("id"), Some(&json!(3)));

        let month = BitacoraEvent::MonthSelected { month: "04".into() };
        assert_eq!(month.payload().get("mes"), Some(&json!("04")));

        let empty = BitacoraEvent::LoadForEdit { entry: None };
        assert_eq!(empty.payload().get("registro"), Some(&Value::Null));

        assert!(BitacoraEvent::ClearForm.payload().is_empty());
        assert!(payload(json!([1, 2])).is_empty());
    }
}
