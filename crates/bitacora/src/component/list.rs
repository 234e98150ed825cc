use std::rc::Rc;

use crate::{
    event::{
        MES_SELECCIONADO, Payload, REGISTRO_ACTUALIZADO, REGISTRO_ELIMINADO, REGISTRO_GUARDADO,
    },
    mediator::{Receiver, WeakMediator},
};

/// Re-runs the search the list is currently showing.
pub type Refresh = Rc<dyn Fn()>;

/// Keeps the list of entries current after any change to an entry.
pub struct ListComponent {
    refresh: Refresh,
    mediator: WeakMediator,
}

impl ListComponent {
    pub fn new(refresh: impl Fn() + 'static, mediator: WeakMediator) -> Self {
        ListComponent {
            refresh: Rc::new(refresh),
            mediator,
        }
    }

    pub fn refresh(&self) {
        (self.refresh)();
    }

    /// Tell every other component about `event`.
    pub fn notify(&self, event: &str, data: &Payload) {
        self.mediator.broadcast(event, data);
    }
}

impl Receiver for ListComponent {
    fn receive(&self, event: &str, _data: &Payload) {
        match event {
            REGISTRO_GUARDADO | REGISTRO_ELIMINADO | REGISTRO_ACTUALIZADO => {
                log::trace!("refreshing the list after '{event}'");
                self.refresh();
            }
            // the owning controller runs the search for a new month
            MES_SELECCIONADO => {}
            _ => {}
        }
    }
}
