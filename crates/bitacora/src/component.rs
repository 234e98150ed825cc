//! The components that take part in the bitácora views.
//!
//! Each one implements [`Receiver`](crate::mediator::Receiver) and reacts to
//! the lifecycle events it cares about, ignoring the rest. None of them knows
//! about the others; they only hear from, and talk back to, the mediator.
mod form;
mod list;
mod search;

pub use form::FormComponent;
pub use list::{ListComponent, Refresh};
pub use search::SearchComponent;
