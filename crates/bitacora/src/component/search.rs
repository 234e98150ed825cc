use crate::{
    event::{MES_SELECCIONADO, Payload},
    mediator::{Receiver, WeakMediator},
};

/// Hears about month selections.
///
/// The bitácora controller runs the query itself; this component is where
/// any extra refinement of a search would hook in.
pub struct SearchComponent {
    mediator: WeakMediator,
}

impl SearchComponent {
    pub fn new(mediator: WeakMediator) -> Self {
        SearchComponent { mediator }
    }

    pub fn search(&self, month: &str) {
        log::trace!("month '{month}' selected");
    }

    /// Tell every other component about `event`.
    pub fn notify(&self, event: &str, data: &Payload) {
        self.mediator.broadcast(event, data);
    }
}

impl Receiver for SearchComponent {
    fn receive(&self, event: &str, data: &Payload) {
        if event == MES_SELECCIONADO {
            let month = data
                .get("mes")
                .and_then(|mes| mes.as_str())
                .unwrap_or_default();
            self.search(month);
        }
    }
}
