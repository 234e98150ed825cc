//! Bitácora log entries, the form fields that edit them and the cards that
//! display them.
use std::collections::BTreeMap;

use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;

use crate::str::Str;

/// One bitácora entry as the server returns it.
///
/// Textual fields accept strings, numbers, booleans and `null`, so that
/// whatever the backend stored always renders as text.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LogEntry {
    #[serde(default, deserialize_with = "id")]
    pub id_bitacora: Option<i64>,
    #[serde(default, deserialize_with = "text")]
    pub fecha: String,
    #[serde(default, deserialize_with = "text")]
    pub hora_inicio: String,
    #[serde(default, deserialize_with = "text")]
    pub hora_fin: String,
    #[serde(default, deserialize_with = "text")]
    pub drenaje_inicial: String,
    #[serde(default, deserialize_with = "text")]
    pub uf_total: String,
    #[serde(default, deserialize_with = "text")]
    pub tiempo_medio_perm: String,
    #[serde(default, deserialize_with = "text")]
    pub liquido_ingerido: String,
    #[serde(default, deserialize_with = "text")]
    pub cantidad_orina: String,
    #[serde(default, deserialize_with = "text")]
    pub glucosa: String,
    #[serde(default, deserialize_with = "text")]
    pub presion_arterial: String,
    #[serde(default, deserialize_with = "text")]
    pub paciente: String,
}

pub(crate) fn text<'de, D: Deserializer<'de>>(deserializer: D) -> Result<String, D::Error> {
    Ok(match Value::deserialize(deserializer)? {
        Value::Null => String::new(),
        Value::String(s) => s,
        Value::Bool(b) => b.to_string(),
        Value::Number(n) => n.to_string(),
        other => other.to_string(),
    })
}

fn id<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Option<i64>, D::Error> {
    Ok(match Value::deserialize(deserializer)? {
        Value::Number(n) => n.as_i64(),
        Value::String(s) => s.trim().parse().ok(),
        _ => None,
    })
}

impl LogEntry {
    /// The text the given form field shows for this entry.
    pub fn value(&self, field: Field) -> Str {
        match field {
            Field::IdBitacora => self
                .id_bitacora
                .map(|id| id.to_string())
                .unwrap_or_default()
                .into(),
            Field::Fecha => (&self.fecha).into(),
            Field::HoraInicio => (&self.hora_inicio).into(),
            Field::HoraFin => (&self.hora_fin).into(),
            Field::DrenajeInicial => (&self.drenaje_inicial).into(),
            Field::UfTotal => (&self.uf_total).into(),
            Field::TiempoMedioPerm => (&self.tiempo_medio_perm).into(),
            Field::LiquidoIngerido => (&self.liquido_ingerido).into(),
            Field::CantidadOrina => (&self.cantidad_orina).into(),
            Field::Glucosa => (&self.glucosa).into(),
            Field::PresionArterial => (&self.presion_arterial).into(),
            Field::Paciente => (&self.paciente).into(),
        }
    }

    /// Render this entry as a bootstrap card.
    pub fn card_html(&self) -> String {
        let id = self
            .id_bitacora
            .map(|id| id.to_string())
            .unwrap_or_default();
        let line = |label: &str, value: &str| {
            let value = if value.is_empty() { "N/A" } else { value };
            format!(
                r#"<p class="card-text"><strong>{label}:</strong> {}</p>"#,
                escape_html(value)
            )
        };
        let head = [
            line("Paciente", &self.paciente),
            line("Fecha", &self.fecha),
            line("Hora Inicio", &self.hora_inicio),
            line("Hora Fin", &self.hora_fin),
        ]
        .concat();
        let body = [
            line("Drenaje Inicial", &self.drenaje_inicial),
            line("UF Total", &self.uf_total),
            line("Tiempo Medio Permanencia", &self.tiempo_medio_perm),
            line("Líquido Ingerido", &self.liquido_ingerido),
            line("Cantidad Orina", &self.cantidad_orina),
            line("Glucosa", &self.glucosa),
            line("Presión Arterial", &self.presion_arterial),
        ]
        .concat();
        format!(
            r#"<div class="col-md-4 mb-4"><div class="card shadow-sm h-100"><div class="card-header bg-primary text-white"><h5 class="card-title mb-0">Registro #{id}</h5></div><div class="card-body">{head}<hr>{body}</div><div class="card-footer bg-light"><button class="btn btn-warning btn-sm btn-editar-bitacora me-1 while-waiting" data-id="{id}">Editar</button><button class="btn btn-danger btn-sm btn-eliminar-bitacora while-waiting" data-id="{id}">Eliminar</button></div></div></div>"#
        )
    }
}

/// Escape text for inclusion in HTML content or a quoted attribute.
pub fn escape_html(s: &str) -> String {
    s.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
        .replace('\'', "&#39;")
}

/// The fields of the bitácora form.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Field {
    IdBitacora,
    Fecha,
    HoraInicio,
    HoraFin,
    DrenajeInicial,
    UfTotal,
    TiempoMedioPerm,
    LiquidoIngerido,
    CantidadOrina,
    Glucosa,
    PresionArterial,
    Paciente,
}

impl Field {
    pub const ALL: [Field; 12] = [
        Field::IdBitacora,
        Field::Fecha,
        Field::HoraInicio,
        Field::HoraFin,
        Field::DrenajeInicial,
        Field::UfTotal,
        Field::TiempoMedioPerm,
        Field::LiquidoIngerido,
        Field::CantidadOrina,
        Field::Glucosa,
        Field::PresionArterial,
        Field::Paciente,
    ];

    /// Id of the input element in the form template.
    pub fn dom_id(self) -> &'static str {
        match self {
            Field::IdBitacora => "txtIdBitacora",
            Field::Fecha => "txtFecha",
            Field::HoraInicio => "txtHoraInicio",
            Field::HoraFin => "txtHoraFin",
            Field::DrenajeInicial => "txtDrenajeInicial",
            Field::UfTotal => "txtUfTotal",
            Field::TiempoMedioPerm => "txtTiempoMedioPerm",
            Field::LiquidoIngerido => "txtLiquidoIngerido",
            Field::CantidadOrina => "txtCantidadOrina",
            Field::Glucosa => "txtGlucosa",
            Field::PresionArterial => "txtPresionArterial",
            Field::Paciente => "txtPaciente",
        }
    }

    /// Name of the parameter when the form is posted.
    pub fn param(self) -> &'static str {
        match self {
            Field::IdBitacora => "id",
            Field::Fecha => "fecha",
            Field::HoraInicio => "horaInicio",
            Field::HoraFin => "horaFin",
            Field::DrenajeInicial => "drenajeInicial",
            Field::UfTotal => "ufTotal",
            Field::TiempoMedioPerm => "tiempoMedioPerm",
            Field::LiquidoIngerido => "liquidoIngerido",
            Field::CantidadOrina => "cantidadOrina",
            Field::Glucosa => "glucosa",
            Field::PresionArterial => "presionArterial",
            Field::Paciente => "paciente",
        }
    }
}

/// Values read out of the form, ready to be posted.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct EntryForm {
    values: BTreeMap<Field, Str>,
}

impl EntryForm {
    /// Read every field through `read`.
    pub fn read(mut read: impl FnMut(Field) -> Str) -> Self {
        EntryForm {
            values: Field::ALL.into_iter().map(|f| (f, read(f))).collect(),
        }
    }

    pub fn get(&self, field: Field) -> &str {
        self.values.get(&field).map(Str::as_str).unwrap_or("")
    }

    /// The id being edited, if any.
    pub fn id(&self) -> Option<&str> {
        Some(self.get(Field::IdBitacora)).filter(|id| !id.is_empty())
    }

    pub fn is_edit(&self) -> bool {
        self.id().is_some()
    }

    /// Parameters in posting order.
    pub fn params(&self) -> Vec<(&'static str, String)> {
        Field::ALL
            .into_iter()
            .map(|f| (f.param(), self.get(f).to_string()))
            .collect()
    }
}

const MONTHS: [&str; 13] = [
    "",
    "Enero",
    "Febrero",
    "Marzo",
    "Abril",
    "Mayo",
    "Junio",
    "Julio",
    "Agosto",
    "Septiembre",
    "Octubre",
    "Noviembre",
    "Diciembre",
];

/// Spanish name of a month selection such as `"3"` or `"03"`.
///
/// Anything that is not a month number between 1 and 12 has no name.
pub fn month_name(month: &str) -> &'static str {
    month
        .trim()
        .parse::<usize>()
        .ok()
        .and_then(|n| MONTHS.get(n).copied())
        .unwrap_or("")
}

/// Parameters of a bitácora search.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct SearchQuery {
    pub mes: String,
    pub paciente: String,
}

impl SearchQuery {
    pub fn params(&self) -> Vec<(&'static str, String)> {
        vec![("mes", self.mes.clone()), ("paciente", self.paciente.clone())]
    }
}

#[cfg(test)]
mod test {
    use serde_json::json;

    use super::*;

    #[test]
    fn entry_fields_render_as_text() {
        let entry: LogEntry = serde_json::from_value(json!({
            "idBitacora": "12",
            "fecha": "2024-01-01",
            "ufTotal": 350,
            "glucosa": null,
            "paciente": "Ana"
        }))
        .unwrap();
        assert_eq!(entry.id_bitacora, Some(12));
        assert_eq!(entry.value(Field::IdBitacora), "12");
        assert_eq!(entry.value(Field::UfTotal), "350");
        assert_eq!(entry.value(Field::Glucosa), "");
        assert_eq!(entry.value(Field::HoraFin), "");
        assert_eq!(entry.value(Field::Paciente), "Ana");
    }

    #[test]
    fn months() {
        assert_eq!(month_name("1"), "Enero");
        assert_eq!(month_name("03"), "Marzo");
        assert_eq!(month_name("12"), "Diciembre");
        assert_eq!(month_name("0"), "");
        assert_eq!(month_name("13"), "");
        assert_eq!(month_name("marzo"), "");
    }

    #[test]
    fn form_params_follow_field_order() {
        let form = EntryForm::read(|f| match f {
            Field::Fecha => "2024-02-02".into(),
            Field::Paciente => "Luis".into(),
            _ => Str::default(),
        });
        assert!(!form.is_edit());
        let params = form.params();
        assert_eq!(params.len(), 12);
        assert_eq!(params[0], ("id", String::new()));
        assert_eq!(params[1], ("fecha", "2024-02-02".to_string()));
        assert_eq!(params[11], ("paciente", "Luis".to_string()));

        let editing = EntryForm::read(|f| match f {
            Field::IdBitacora => "9".into(),
            _ => Str::default(),
        });
        assert_eq!(editing.id(), Some("9"));
    }

    #[test]
    fn card_escapes_and_fills_blanks() {
        let entry = LogEntry {
            id_bitacora: Some(4),
            paciente: "<b>Ana</b>".into(),
            ..Default::default()
        };
        let html = entry.card_html();
        assert!(html.contains("Registro #4"));
        assert!(html.contains("&lt;b&gt;Ana&lt;/b&gt;"));
        assert!(html.contains("<strong>Fecha:</strong> N/A"));
        assert!(html.contains(r#"data-id="4""#));
    }
}
