//! The server endpoints the views talk to.
use std::future::Future;

use serde::Deserialize;
use serde_json::Value;

use crate::{
    producto::{Ingredient, Product},
    registro::{EntryForm, LogEntry, SearchQuery},
    session::Preferences,
};

pub const SIGN_IN: &str = "iniciarSesion";
pub const SIGN_OUT: &str = "cerrarSesion";
pub const BITACORA: &str = "bitacora";
pub const BITACORA_SEARCH: &str = "bitacora/buscar";
pub const BITACORA_DELETE: &str = "bitacora/eliminar";
pub const ACTIVITY_LOG: &str = "log";
pub const PRODUCT: &str = "producto";
pub const PRODUCT_INGREDIENTS: &str = "productos/ingredientes";
pub const PRODUCT_DELETE: &str = "producto/eliminar";

/// A failed request.
#[derive(Debug, thiserror::Error)]
pub enum ApiError {
    #[error("session expired")]
    Unauthorized,
    #[error("{message}")]
    Status { status: u16, message: String },
    #[error("Error en la petición: {0}")]
    Network(String),
    #[error("unexpected response: {0}")]
    Decode(#[from] serde_json::Error),
}

impl ApiError {
    /// Build the error for a non-success response.
    ///
    /// The server explains failures in an `error` field; the raw body is used
    /// when it doesn't.
    pub fn from_status(status: u16, body: &str) -> Self {
        if status == 401 {
            return ApiError::Unauthorized;
        }
        let message = serde_json::from_str::<Value>(body)
            .ok()
            .and_then(|v| v.get("error").and_then(Value::as_str).map(String::from))
            .unwrap_or_else(|| body.to_string());
        ApiError::Status { status, message }
    }
}

/// Response to saving an entry.
#[derive(Clone, Debug, Default, PartialEq, Deserialize)]
pub struct Saved {
    #[serde(default)]
    pub success: bool,
    /// Id of a newly created entry.
    #[serde(default)]
    pub id: Option<Value>,
}

/// Bitácora endpoints.
pub trait BitacoraApi {
    /// `GET bitacora/{id}`
    fn entry(&self, id: i64) -> impl Future<Output = Result<LogEntry, ApiError>>;
    /// `POST bitacora`
    fn save(&self, form: &EntryForm) -> impl Future<Output = Result<Saved, ApiError>>;
    /// `POST bitacora/eliminar`
    fn delete(&self, id: i64) -> impl Future<Output = Result<(), ApiError>>;
    /// `GET bitacora/buscar`
    fn search(&self, query: &SearchQuery) -> impl Future<Output = Result<Vec<LogEntry>, ApiError>>;
    /// `GET log`
    fn log_activity(
        &self,
        activity: &str,
        description: &str,
    ) -> impl Future<Output = Result<(), ApiError>>;
}

/// Product endpoints of the products view.
pub trait ProductsApi {
    /// `GET producto/{id}`, the matching rows.
    fn product(&self, id: i64) -> impl Future<Output = Result<Vec<Product>, ApiError>>;
    /// `GET productos/ingredientes/{id}`
    fn ingredients(&self, id: i64) -> impl Future<Output = Result<Vec<Ingredient>, ApiError>>;
    /// `POST producto/eliminar`
    fn delete_product(&self, id: i64) -> impl Future<Output = Result<(), ApiError>>;
}

/// Session endpoints.
pub trait SessionApi {
    /// `POST iniciarSesion`, yielding the matching user rows.
    fn sign_in(
        &self,
        user: &str,
        password: &str,
    ) -> impl Future<Output = Result<Vec<Preferences>, ApiError>>;
    /// `POST cerrarSesion`
    fn sign_out(&self) -> impl Future<Output = Result<(), ApiError>>;
}
