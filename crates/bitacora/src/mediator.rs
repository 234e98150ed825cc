//! Named components talking through a central hub.
//!
//! Components never hold references to one another. A view controller
//! registers the components it owns under well known names and from then on
//! producers only [`send`](Mediator::send) to a name or
//! [`broadcast`](Mediator::broadcast) to everybody.
//!
//! Dispatch is synchronous and best effort: a missing target is logged and
//! skipped, never surfaced to the caller.
//!
//! ```rust
//! use std::rc::Rc;
//! use bitacora::{event::Payload, mediator::{Mediator, Receiver}};
//!
//! struct Printer;
//!
//! impl Receiver for Printer {
//!     fn receive(&self, event: &str, _data: &Payload) {
//!         println!("got {event}");
//!     }
//! }
//!
//! let mediator = Mediator::default();
//! let printer = Rc::new(Printer);
//! mediator.register("printer", &printer);
//! mediator.send("printer", "hello", &Payload::new());
//! ```
use std::{
    cell::RefCell,
    rc::{Rc, Weak},
};

use crate::{
    event::{BitacoraEvent, Payload},
    str::Str,
};

/// Name of the form component.
pub const FORMULARIO: &str = "formulario";
/// Name of the list component.
pub const LISTA: &str = "lista";
/// Name of the search component.
pub const BUSQUEDA: &str = "busqueda";

/// The one capability every registered component has.
pub trait Receiver {
    /// React to `event`. Called synchronously from inside `send`/`broadcast`.
    fn receive(&self, event: &str, data: &Payload);
}

/// Why a direct send did not reach its target.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum MediatorError {
    #[error("component '{0}' is not registered")]
    NotFound(Str),
    #[error("component '{0}' is registered but no longer available")]
    Unavailable(Str),
}

struct Binding {
    name: Str,
    component: Weak<dyn Receiver>,
}

/// The component registry and dispatcher.
///
/// Cloning a `Mediator` yields another handle onto the same registry.
#[derive(Clone, Default)]
pub struct Mediator {
    bindings: Rc<RefCell<Vec<Binding>>>,
}

impl std::fmt::Debug for Mediator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Mediator")
            .field("names", &self.names())
            .finish()
    }
}

impl Mediator {
    pub fn new() -> Self {
        Self::default()
    }

    /// Bind `component` to `name`, replacing any previous binding.
    ///
    /// The mediator only keeps a weak reference; the caller stays the owner.
    /// A replaced binding keeps its place in broadcast order.
    pub fn register<R: Receiver + 'static>(&self, name: impl Into<Str>, component: &Rc<R>) {
        let component: Rc<dyn Receiver> = component.clone();
        self.bind(name.into(), Rc::downgrade(&component));
    }

    fn bind(&self, name: Str, component: Weak<dyn Receiver>) {
        if name.is_empty() {
            log::warn!("[Mediator] refusing to register a component without a name");
            return;
        }
        let mut bindings = self.bindings.borrow_mut();
        if let Some(binding) = bindings.iter_mut().find(|b| b.name == name) {
            log::debug!("[Mediator] component '{name}' replaced");
            binding.component = component;
        } else {
            log::debug!("[Mediator] component '{name}' registered");
            bindings.push(Binding { name, component });
        }
    }

    /// Remove the binding for `name`.
    ///
    /// Returns `true` if there was one.
    pub fn unregister(&self, name: &str) -> bool {
        let mut bindings = self.bindings.borrow_mut();
        let before = bindings.len();
        bindings.retain(|b| b.name != name);
        let removed = bindings.len() != before;
        if removed {
            log::debug!("[Mediator] component '{name}' unregistered");
        }
        removed
    }

    /// Look up the component bound to `name`.
    pub fn get(&self, name: &str) -> Option<Rc<dyn Receiver>> {
        self.bindings
            .borrow()
            .iter()
            .find(|b| b.name == name)
            .and_then(|b| b.component.upgrade())
    }

    /// Names currently bound, in broadcast order.
    pub fn names(&self) -> Vec<Str> {
        self.bindings
            .borrow()
            .iter()
            .map(|b| b.name.clone())
            .collect()
    }

    /// Deliver `event` to the component bound to `to`, reporting misses.
    pub fn try_send(&self, to: &str, event: &str, data: &Payload) -> Result<(), MediatorError> {
        // The registry borrow ends here so the receiver may call back in.
        let component = {
            let bindings = self.bindings.borrow();
            let binding = bindings
                .iter()
                .find(|b| b.name == to)
                .ok_or_else(|| MediatorError::NotFound(to.to_string().into()))?;
            binding
                .component
                .upgrade()
                .ok_or_else(|| MediatorError::Unavailable(to.to_string().into()))?
        };
        log::trace!("[Mediator] sending '{event}' to '{to}'");
        component.receive(event, data);
        Ok(())
    }

    /// Deliver `event` to the component bound to `to`.
    ///
    /// A missing or dropped target is logged and otherwise ignored.
    pub fn send(&self, to: &str, event: &str, data: &Payload) {
        if let Err(e) = self.try_send(to, event, data) {
            log::warn!("[Mediator] '{event}' not delivered: {e}");
        }
    }

    /// Deliver `event` to every live component, in registration order.
    ///
    /// Components registered or removed by a handler during the broadcast do
    /// not change who receives this one.
    pub fn broadcast(&self, event: &str, data: &Payload) {
        log::trace!("[Mediator] broadcast '{event}'");
        let receivers: Vec<Rc<dyn Receiver>> = self
            .bindings
            .borrow()
            .iter()
            .filter_map(|b| b.component.upgrade())
            .collect();
        for receiver in receivers {
            receiver.receive(event, data);
        }
    }

    /// Broadcast a typed event.
    pub fn emit(&self, event: &BitacoraEvent) {
        self.broadcast(event.name(), &event.payload());
    }

    /// Send a typed event to one component.
    pub fn emit_to(&self, to: &str, event: &BitacoraEvent) {
        self.send(to, event.name(), &event.payload());
    }

    /// Send a typed event to one component, reporting misses.
    pub fn try_emit_to(&self, to: &str, event: &BitacoraEvent) -> Result<(), MediatorError> {
        self.try_send(to, event.name(), &event.payload())
    }

    /// A handle that unregisters what it registered when dropped.
    pub fn scope(&self) -> Scope {
        Scope {
            mediator: self.clone(),
            owned: Default::default(),
        }
    }

    /// A handle that does not keep the registry alive.
    pub fn downgrade(&self) -> WeakMediator {
        WeakMediator {
            bindings: Rc::downgrade(&self.bindings),
        }
    }
}

/// A non-owning handle onto a [`Mediator`].
///
/// Components hold one of these to notify their peers without forming a
/// reference cycle with the registry that holds them.
#[derive(Clone, Default)]
pub struct WeakMediator {
    bindings: Weak<RefCell<Vec<Binding>>>,
}

impl WeakMediator {
    pub fn upgrade(&self) -> Option<Mediator> {
        self.bindings.upgrade().map(|bindings| Mediator { bindings })
    }

    /// Broadcast through the mediator, if it still exists.
    pub fn broadcast(&self, event: &str, data: &Payload) {
        match self.upgrade() {
            Some(mediator) => mediator.broadcast(event, data),
            None => log::warn!("[Mediator] '{event}' dropped, the mediator is gone"),
        }
    }
}

/// Registrations tied to the lifetime of one view.
///
/// Dropping the scope removes every binding it made, unless the name has since
/// been taken over by another component.
pub struct Scope {
    mediator: Mediator,
    owned: RefCell<Vec<(Str, Weak<dyn Receiver>)>>,
}

impl Scope {
    pub fn mediator(&self) -> &Mediator {
        &self.mediator
    }

    /// Register `component` under `name` for the lifetime of this scope.
    pub fn register<R: Receiver + 'static>(&self, name: impl Into<Str>, component: &Rc<R>) {
        let name = name.into();
        let component: Rc<dyn Receiver> = component.clone();
        let weak = Rc::downgrade(&component);
        self.mediator.bind(name.clone(), weak.clone());
        self.owned.borrow_mut().push((name, weak));
    }
}

impl Drop for Scope {
    fn drop(&mut self) {
        for (name, weak) in self.owned.take() {
            let still_ours = self
                .mediator
                .bindings
                .borrow()
                .iter()
                .any(|b| b.name == name && Weak::ptr_eq(&b.component, &weak));
            if still_ours {
                self.mediator.unregister(&name);
            }
        }
    }
}

#[cfg(test)]
mod test {
    use std::cell::Cell;

    use serde_json::json;

    use super::*;
    use crate::event::payload;

    #[derive(Default)]
    struct Counter {
        hits: Cell<usize>,
    }

    impl Receiver for Counter {
        fn receive(&self, _event: &str, _data: &Payload) {
            self.hits.set(self.hits.get() + 1);
        }
    }

    #[test]
    fn empty_names_are_refused() {
        let mediator = Mediator::new();
        let counter = Rc::new(Counter::default());
        mediator.register("", &counter);
        assert!(mediator.names().is_empty());
    }

    #[test]
    fn try_send_reports_misses() {
        let mediator = Mediator::new();
        assert_eq!(
            mediator.try_send("nadie", "x", &Payload::new()),
            Err(MediatorError::NotFound("nadie".into()))
        );

        let counter = Rc::new(Counter::default());
        mediator.register("contador", &counter);
        drop(counter);
        assert_eq!(
            mediator.try_send("contador", "x", &Payload::new()),
            Err(MediatorError::Unavailable("contador".into()))
        );
        assert!(mediator.get("contador").is_none());
    }

    #[test]
    fn dropped_components_are_skipped_by_broadcast() {
        let mediator = Mediator::new();
        let kept = Rc::new(Counter::default());
        let dropped = Rc::new(Counter::default());
        mediator.register("kept", &kept);
        mediator.register("dropped", &dropped);
        drop(dropped);

        mediator.broadcast("x", &payload(json!({"id": 1})));
        assert_eq!(kept.hits.get(), 1);
    }

    #[test]
    fn scope_drop_unregisters_only_its_own_bindings() {
        let mediator = Mediator::new();
        let first = Rc::new(Counter::default());
        let second = Rc::new(Counter::default());
        {
            let scope = mediator.scope();
            scope.register("lista", &first);
            scope.register("busqueda", &first);
            // another view takes over "busqueda" before this one is torn down
            mediator.register("busqueda", &second);
        }
        assert!(mediator.get("lista").is_none());
        assert!(mediator.get("busqueda").is_some());

        mediator.send("busqueda", "x", &Payload::new());
        assert_eq!(second.hits.get(), 1);
        assert_eq!(first.hits.get(), 0);
    }

    #[test]
    fn unregister() {
        let mediator = Mediator::new();
        let counter = Rc::new(Counter::default());
        mediator.register("contador", &counter);
        assert!(mediator.unregister("contador"));
        assert!(!mediator.unregister("contador"));
        mediator.broadcast("x", &Payload::new());
        assert_eq!(counter.hits.get(), 0);
    }

    #[test]
    fn weak_mediator_outlived() {
        let mediator = Mediator::new();
        let weak = mediator.downgrade();
        assert!(weak.upgrade().is_some());
        drop(mediator);
        assert!(weak.upgrade().is_none());
        // no panic
        weak.broadcast("x", &Payload::new());
    }
}
