//! DOM events as futures.
//!
//! An [`EventListener`] registers one JS callback on its target. Every
//! `.await` on [`EventListener::next`] resolves with the next event fired
//! after it started waiting.
use std::{cell::RefCell, pin::Pin, rc::Rc, task::Waker};

use wasm_bindgen::{JsCast, JsValue, prelude::Closure};

use crate::str::Str;

type Callback = Closure<dyn FnMut(JsValue)>;

/// One upcoming occurrence of an event, shared by everybody awaiting it.
#[derive(Clone, Default)]
struct Occurrence {
    event: Rc<RefCell<Option<web_sys::Event>>>,
    wakers: Rc<RefCell<Vec<Waker>>>,
}

impl std::future::Future for Occurrence {
    type Output = web_sys::Event;

    fn poll(
        self: Pin<&mut Self>,
        cx: &mut std::task::Context<'_>,
    ) -> std::task::Poll<Self::Output> {
        match self.event.borrow().as_ref() {
            Some(event) => std::task::Poll::Ready(event.clone()),
            None => {
                self.wakers.borrow_mut().push(cx.waker().clone());
                std::task::Poll::Pending
            }
        }
    }
}

struct Registration {
    target: web_sys::EventTarget,
    event_name: Str,
    callback: Callback,
}

impl Drop for Registration {
    fn drop(&mut self) {
        if let Err(e) = self.target.remove_event_listener_with_callback(
            self.event_name.as_str(),
            self.callback.as_ref().unchecked_ref(),
        ) {
            log::warn!("could not remove '{}' listener: {e:?}", self.event_name);
        } else {
            log::trace!("removed '{}' listener", self.event_name);
        }
    }
}

/// Listens for one kind of event on one target until the last clone is
/// dropped.
#[derive(Clone)]
pub struct EventListener {
    registration: Rc<Registration>,
    next: Rc<RefCell<Occurrence>>,
}

impl EventListener {
    pub fn new(
        target: impl AsRef<web_sys::EventTarget>,
        event_name: impl Into<Str>,
    ) -> Result<Self, JsValue> {
        let event_name = event_name.into();
        let next: Rc<RefCell<Occurrence>> = Default::default();
        let callback = Closure::wrap({
            let next = next.clone();
            Box::new(move |value: JsValue| {
                // resolve the pending occurrence and start a fresh one
                let occurrence = std::mem::take(&mut *next.borrow_mut());
                *occurrence.event.borrow_mut() = Some(value.unchecked_into());
                let wakers = std::mem::take(&mut *occurrence.wakers.borrow_mut());
                wakers.into_iter().for_each(Waker::wake);
            }) as Box<dyn FnMut(JsValue)>
        });

        let target = target.as_ref().clone();
        target.add_event_listener_with_callback(
            event_name.as_str(),
            callback.as_ref().unchecked_ref(),
        )?;
        log::trace!("listening for '{event_name}'");

        Ok(EventListener {
            registration: Rc::new(Registration {
                target,
                event_name,
                callback,
            }),
            next,
        })
    }

    /// Listen on the element with the given id.
    pub fn on_id(id: &str, event_name: impl Into<Str>) -> Result<Self, JsValue> {
        let element = super::element(id)?;
        Self::new(element, event_name)
    }

    /// Wait for the next event.
    pub fn next(&self) -> impl std::future::Future<Output = web_sys::Event> + use<> {
        self.next.borrow().clone()
    }
}
