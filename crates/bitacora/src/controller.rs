//! Per-route view controllers.
//!
//! A controller is built when its route becomes active and dropped when the
//! route is left. It registers its components through a mediator
//! [`Scope`](crate::mediator::Scope), so dropping it also unregisters them.
//!
//! User actions reach a controller as intents on an [`async_channel`]; the
//! controller's `run` loop handles them one at a time.
use crate::{api::ApiError, mediator::Mediator, registro::LogEntry, sync::Shared, view::Messages};

mod bitacora;
mod login;
mod products;

pub use bitacora::{BitacoraController, ListIntent};
pub use login::{LoginController, LoginIntent};
pub use products::{FormIntent, ProductsController};

/// State that outlives any single view.
#[derive(Clone, Default)]
pub struct Context {
    pub mediator: Mediator,
    /// An entry picked for editing on one view, waiting for the form view to
    /// pick it up.
    pub pending_edit: Shared<Option<LogEntry>>,
}

impl Context {
    pub fn new() -> Self {
        Self::default()
    }
}

/// Show a failed request to the user.
///
/// An expired session is left to the caller, which signs the user out.
pub fn report(messages: &impl Messages, error: &ApiError) {
    log::error!("{error}");
    match error {
        ApiError::Unauthorized => {}
        ApiError::Network(_) => messages.toast("Error en la petición."),
        ApiError::Status { .. } | ApiError::Decode(_) => messages.modal(error.to_string()),
    }
}
