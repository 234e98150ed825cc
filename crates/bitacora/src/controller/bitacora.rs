//! The bitácora view: a month selector and the cards of that month's entries.
use std::rc::Rc;

use async_channel::{Receiver, Sender};
use serde_json::json;

use super::{Context, report};
use crate::{
    api::{ApiError, BitacoraApi},
    component::{ListComponent, SearchComponent},
    event::BitacoraEvent,
    mediator::{BUSQUEDA, FORMULARIO, LISTA, Mediator, Scope},
    registro::{LogEntry, SearchQuery, month_name},
    route::Route,
    session::Session,
    str::Str,
    sync::Shared,
    view::{CardsView, Messages, Navigator},
};

/// What the user (or the list component) asked the bitácora view to do.
#[derive(Clone, Debug, PartialEq)]
pub enum ListIntent {
    SelectMonth(Str),
    Search,
    Edit(i64),
    Delete(i64),
}

pub struct BitacoraController<C, A, M, N> {
    scope: Scope,
    _list: Rc<ListComponent>,
    _search: Rc<SearchComponent>,
    cards: C,
    api: A,
    messages: M,
    navigator: N,
    month: Shared<Str>,
    is_admin: bool,
    user: Str,
    patient_filter: Shared<Str>,
    pending_edit: Shared<Option<LogEntry>>,
    intents: (Sender<ListIntent>, Receiver<ListIntent>),
}

impl<C, A, M, N> BitacoraController<C, A, M, N>
where
    C: CardsView,
    A: BitacoraApi,
    M: Messages,
    N: Navigator,
{
    pub fn new(
        context: &Context,
        session: &Session,
        cards: C,
        api: A,
        messages: M,
        navigator: N,
    ) -> Self {
        let intents = async_channel::unbounded();
        let scope = context.mediator.scope();

        let list = Rc::new(ListComponent::new(
            {
                let tx = intents.0.clone();
                move || {
                    if let Err(e) = tx.try_send(ListIntent::Search) {
                        log::warn!("cannot queue a refresh: {e}");
                    }
                }
            },
            context.mediator.downgrade(),
        ));
        let search = Rc::new(SearchComponent::new(context.mediator.downgrade()));
        scope.register(LISTA, &list);
        scope.register(BUSQUEDA, &search);

        let is_admin = session.is_admin();
        let user = session.user_name();
        let patient_filter = if is_admin { Str::default() } else { user.clone() };

        cards.show_prompt();

        BitacoraController {
            scope,
            _list: list,
            _search: search,
            cards,
            api,
            messages,
            navigator,
            month: Shared::default(),
            is_admin,
            user,
            patient_filter: Shared::new(patient_filter),
            pending_edit: context.pending_edit.clone(),
            intents,
        }
    }

    pub fn mediator(&self) -> &Mediator {
        self.scope.mediator()
    }

    /// Sender for queueing intents from the view.
    pub fn intents(&self) -> Sender<ListIntent> {
        self.intents.0.clone()
    }

    pub fn month(&self) -> Str {
        self.month.cloned()
    }

    /// Run the search for the selected month.
    pub async fn search(&self) -> Result<(), ApiError> {
        let month = self.month();
        if month.is_empty() {
            self.cards.show_prompt();
            return Ok(());
        }

        self.cards.show_loading();
        self.mediator().emit(&BitacoraEvent::MonthSelected {
            month: month.clone(),
        });

        if !self.is_admin && self.patient_filter.get().is_empty() {
            self.patient_filter.set(self.user.clone());
        }
        let query = SearchQuery {
            mes: month.to_string(),
            paciente: self.patient_filter.cloned().into(),
        };

        self.messages.set_busy(true);
        let result = self.api.search(&query).await;
        self.messages.set_busy(false);
        let entries = result?;

        log::info!("{} entries for month {month}", entries.len());
        if entries.is_empty() {
            self.cards.show_empty(month_name(&month));
        } else {
            self.cards.show_entries(&entries);
        }
        Ok(())
    }

    pub async fn select_month(&self, month: Str) -> Result<(), ApiError> {
        self.month.set(month);
        self.search().await
    }

    /// Hand entry `id` to the form and go to the form's view.
    pub async fn edit(&self, id: i64) -> Result<(), ApiError> {
        let entry = self.api.entry(id).await?;
        let event = BitacoraEvent::LoadForEdit {
            entry: Some(entry.clone()),
        };
        if self.mediator().try_emit_to(FORMULARIO, &event).is_err() {
            log::debug!("no form on this view, handing entry {id} over");
            self.pending_edit.set(Some(entry));
        }
        self.navigator.navigate(Route::Products);
        Ok(())
    }

    /// Delete entry `id`. The list component takes care of the refresh.
    pub async fn delete(&self, id: i64) -> Result<(), ApiError> {
        self.messages.set_busy(true);
        let result = self.api.delete(id).await;
        self.messages.set_busy(false);
        result?;

        if let Err(e) = self
            .api
            .log_activity(
                "Eliminación de Registro.",
                &format!("Se eliminó un registro \"{id}\""),
            )
            .await
        {
            log::warn!("activity not logged: {e}");
        }
        self.mediator()
            .emit(&BitacoraEvent::Deleted { id: json!(id) });
        Ok(())
    }

    pub async fn handle(&self, intent: ListIntent) -> Result<(), ApiError> {
        log::debug!("bitácora intent {intent:?}");
        match intent {
            ListIntent::SelectMonth(month) => self.select_month(month).await,
            ListIntent::Search => self.search().await,
            ListIntent::Edit(id) => self.edit(id).await,
            ListIntent::Delete(id) => self.delete(id).await,
        }
    }

    /// Try to take the next queued intent without waiting.
    pub fn try_next(&self) -> Option<ListIntent> {
        self.intents.1.try_recv().ok()
    }

    /// Handle intents until the session expires.
    pub async fn run(&self) -> Result<(), ApiError> {
        while let Ok(intent) = self.intents.1.recv().await {
            match self.handle(intent).await {
                Ok(()) => {}
                Err(ApiError::Unauthorized) => return Err(ApiError::Unauthorized),
                Err(e) => report(&self.messages, &e),
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod test {
    use futures_lite::future::block_on;

    use super::*;
    use crate::{
        controller::{ProductsController, fake::FakeServer},
        view::{
            Cards, FormMode, FormView, MemoryCards, MemoryForm, MemoryMessages, MemoryNavigator,
            no_entries_message,
        },
    };

    type Controller = BitacoraController<MemoryCards, FakeServer, MemoryMessages, MemoryNavigator>;

    struct Fixture {
        context: Context,
        server: FakeServer,
        cards: MemoryCards,
        navigator: MemoryNavigator,
        controller: Controller,
    }

    fn entry(id: i64, fecha: &str, paciente: &str) -> LogEntry {
        LogEntry {
            id_bitacora: Some(id),
            fecha: fecha.into(),
            paciente: paciente.into(),
            ..Default::default()
        }
    }

    fn fixture(kind: i64) -> Fixture {
        let context = Context::new();
        let server = FakeServer::default();
        server.entries.get_mut().extend([
            entry(1, "2024-03-02", "Ana"),
            entry(2, "2024-03-09", "Luis"),
            entry(3, "2024-04-01", "Ana"),
        ]);
        let cards = MemoryCards::default();
        let navigator = MemoryNavigator::default();
        let session = Session {
            kind: Some(kind),
            user: Some("Ana".into()),
            id: Some(4),
        };
        let controller = BitacoraController::new(
            &context,
            &session,
            cards.clone(),
            server.clone(),
            MemoryMessages::default(),
            navigator.clone(),
        );
        Fixture {
            context,
            server,
            cards,
            navigator,
            controller,
        }
    }

    #[test]
    fn prompt_until_a_month_is_chosen() {
        let f = fixture(2);
        assert_eq!(f.cards.cards(), Cards::Prompt);
        block_on(f.controller.handle(ListIntent::Search)).unwrap();
        assert_eq!(f.cards.cards(), Cards::Prompt);
        assert!(f.server.searches.get().is_empty());
    }

    #[test]
    fn repeating_a_search_shows_the_same_cards() {
        let f = fixture(1);
        block_on(async {
            f.controller.select_month("03".into()).await.unwrap();
            f.controller.handle(ListIntent::Search).await.unwrap();
            let first = f.cards.cards();
            f.controller.handle(ListIntent::Search).await.unwrap();
            assert_eq!(f.cards.cards(), first);
            assert!(matches!(first, Cards::Entries(ref entries) if entries.len() == 2));
        });
        let searches = f.server.searches.get();
        assert_eq!(searches.len(), 3);
        assert!(searches.iter().all(|q| *q == searches[0]));
    }

    #[test]
    fn patients_only_see_their_own_entries() {
        let f = fixture(2);
        block_on(f.controller.select_month("03".into())).unwrap();
        let Cards::Entries(entries) = f.cards.cards() else {
            panic!("expected cards, got {:?}", f.cards.cards());
        };
        assert_eq!(entries.len(), 1);
        assert_eq!(entries[0].paciente, "Ana");
        assert_eq!(f.server.searches.get()[0].paciente, "Ana");
    }

    #[test]
    fn admins_see_everybody() {
        let f = fixture(1);
        block_on(f.controller.select_month("3".into())).unwrap();
        let Cards::Entries(entries) = f.cards.cards() else {
            panic!("expected cards");
        };
        assert_eq!(entries.len(), 2);
        assert_eq!(f.server.searches.get()[0].paciente, "");
    }

    #[test]
    fn empty_month() {
        let f = fixture(1);
        block_on(f.controller.select_month("7".into())).unwrap();
        assert_eq!(f.cards.cards(), Cards::NoEntries(no_entries_message("Julio")));
    }

    #[test]
    fn deletion_queues_exactly_one_refresh() {
        let f = fixture(1);
        block_on(async {
            f.controller.select_month("3".into()).await.unwrap();
            f.controller.handle(ListIntent::Delete(2)).await.unwrap();
        });
        assert_eq!(f.controller.try_next(), Some(ListIntent::Search));
        assert_eq!(f.controller.try_next(), None);
        assert_eq!(f.server.activity.get().len(), 1);

        block_on(f.controller.handle(ListIntent::Search)).unwrap();
        let Cards::Entries(entries) = f.cards.cards() else {
            panic!("expected cards");
        };
        assert_eq!(entries.len(), 1);
        assert_eq!(f.server.searches.get().len(), 2);
    }

    #[test]
    fn edit_hands_the_entry_to_the_form_view() {
        let f = fixture(1);
        block_on(f.controller.edit(3)).unwrap();
        assert_eq!(f.navigator.current(), Some(Route::Products));

        // leaving the bitácora view...
        let Fixture {
            context, controller, ..
        } = f;
        drop(controller);
        assert!(context.mediator.names().is_empty());

        // ...and arriving at the form
        let form = MemoryForm::default();
        let _products = ProductsController::new(
            &context,
            &Session::default(),
            form.clone(),
            FakeServer::default(),
            MemoryMessages::default(),
        );
        assert_eq!(form.mode(), FormMode::Edit);
        assert_eq!(form.field(crate::registro::Field::IdBitacora), "3");
    }

    #[test]
    fn stale_views_do_not_hear_events() {
        let f = fixture(1);
        let mediator = f.context.mediator.clone();
        drop(f.controller);
        mediator.emit(&BitacoraEvent::Saved { id: json!(1) });
        // the dropped list had nobody left to queue a refresh for
        assert!(mediator.get(LISTA).is_none());
        assert!(mediator.get(BUSQUEDA).is_none());
    }
}
