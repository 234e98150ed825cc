//! The moving parts of the clinic's bitácora pages.
//!
//! The pages are made of a few components (a form, a list of cards and a
//! month search) that never call each other. Instead they register with a
//! [`Mediator`](mediator::Mediator) under a well known name and talk through
//! it, either to one component by name or to all of them at once.
//!
//! Each component follows the same split:
//!
//! ### Model
//! Concrete state and logic that is the same on every platform, like
//! [`FormComponent`](component::FormComponent).
//!
//! ### View interface
//! A trait the logic drives the view through, like [`FormView`](view::FormView).
//!
//! ### View
//! An implementation of the view interface. The in-memory views in [`view`]
//! back the tests, the `web` feature adds views over the browser's DOM.
//!
//! View controllers in [`controller`] own the components of one route. They
//! are created when the route is entered and dropped when it is left, which
//! unregisters their components.
pub mod api;
pub mod component;
pub mod controller;
pub mod event;
pub mod mediator;
pub mod producto;
pub mod registro;
pub mod route;
pub mod session;
pub mod str;
pub mod sync;
pub mod view;
#[cfg(feature = "web")]
pub mod web;

pub mod prelude {
    pub use crate::{
        api::{ApiError, BitacoraApi, ProductsApi, SessionApi},
        controller::*,
        event::{BitacoraEvent, Payload},
        mediator::{Mediator, Receiver, Scope, WeakMediator},
        producto::{Ingredient, Product, Recipe},
        registro::{EntryForm, Field, LogEntry, SearchQuery},
        route::Route,
        session::{Session, Storage},
        str::Str,
        sync::Shared,
        view::*,
    };
}
