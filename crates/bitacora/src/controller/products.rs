//! The products view: the bitácora form plus product recipes and removal.
use std::rc::Rc;

use async_channel::{Receiver, Sender};
use serde_json::Value;

use super::{Context, report};
use crate::{
    api::{ApiError, BitacoraApi, ProductsApi, Saved},
    component::FormComponent,
    event::{BitacoraEvent, is_truthy},
    mediator::{FORMULARIO, Mediator, Scope},
    producto::Recipe,
    registro::{EntryForm, Field},
    session::Session,
    view::{FormView, Messages},
};

/// What the user asked the products view to do.
#[derive(Clone, Debug, PartialEq)]
pub enum FormIntent {
    Submit,
    Clear,
    Edit(i64),
    /// Show the recipe of a product.
    ShowRecipe(i64),
    /// Remove a product, already confirmed by the user.
    DeleteProduct(i64),
}

const PRODUCT_NOT_FOUND: &str = "Producto no encontrado.";

pub struct ProductsController<V, A, M> {
    // dropped first, so the form is unregistered before it goes away
    scope: Scope,
    form: Rc<FormComponent<V>>,
    api: A,
    messages: M,
    intents: (Sender<FormIntent>, Receiver<FormIntent>),
}

impl<V, A, M> ProductsController<V, A, M>
where
    V: FormView + Clone + 'static,
    A: BitacoraApi + ProductsApi,
    M: Messages,
{
    pub fn new(context: &Context, session: &Session, view: V, api: A, messages: M) -> Self {
        let scope = context.mediator.scope();
        let form = Rc::new(FormComponent::new(
            view.clone(),
            context.mediator.downgrade(),
        ));
        scope.register(FORMULARIO, &form);

        let patient = session.user_name();
        view.set_field(Field::Paciente, patient.clone());
        view.set_default_patient(patient);
        view.set_patient_readonly(!session.is_admin());

        let controller = ProductsController {
            scope,
            form,
            api,
            messages,
            intents: async_channel::unbounded(),
        };

        if let Some(entry) = context.pending_edit.take() {
            log::info!("loading handed over entry {:?}", entry.id_bitacora);
            controller.mediator().emit_to(
                FORMULARIO,
                &BitacoraEvent::LoadForEdit { entry: Some(entry) },
            );
        }

        controller
    }

    pub fn mediator(&self) -> &Mediator {
        self.scope.mediator()
    }

    pub fn view(&self) -> &V {
        self.form.view()
    }

    /// Sender for queueing intents from the view.
    pub fn intents(&self) -> Sender<FormIntent> {
        self.intents.0.clone()
    }

    /// Fetch entry `id` and load it into the form.
    pub async fn load_for_edit(&self, id: i64) -> Result<(), ApiError> {
        let entry = self.api.entry(id).await?;
        self.mediator().emit_to(
            FORMULARIO,
            &BitacoraEvent::LoadForEdit { entry: Some(entry) },
        );
        Ok(())
    }

    pub fn clear(&self) {
        self.mediator().emit_to(FORMULARIO, &BitacoraEvent::ClearForm);
    }

    /// Post the form, then let every component know.
    pub async fn submit(&self) -> Result<Saved, ApiError> {
        let form = EntryForm::read(|field| self.view().field(field));

        self.messages.set_busy(true);
        let result = self.api.save(&form).await;
        self.messages.set_busy(false);
        let saved = result?;

        let form_id = Value::String(form.id().unwrap_or_default().to_string());
        if form.is_edit() {
            log::info!("updated entry {form_id}");
            self.messages.pop("Has actualizado un registro de bitácora.");
            self.mediator().emit(&BitacoraEvent::Updated { id: form_id });
        } else {
            let id = saved.id.clone().filter(is_truthy).unwrap_or(form_id);
            log::info!("created entry {id}");
            self.messages.pop("Has agregado un registro de bitácora.");
            self.mediator().emit(&BitacoraEvent::Saved { id });
        }
        Ok(saved)
    }

    /// Fetch product `id` and its ingredients and show them in a modal.
    ///
    /// Yields `None` when the server has no such product.
    pub async fn show_recipe(&self, id: i64) -> Result<Option<Recipe>, ApiError> {
        let product = self.api.product(id).await?.into_iter().next();
        let ingredients = self.api.ingredients(id).await?;
        let Some(product) = product else {
            log::warn!("no product {id}");
            self.messages.modal(PRODUCT_NOT_FOUND);
            return Ok(None);
        };
        let recipe = Recipe {
            product,
            ingredients,
        };
        self.messages.modal_html(recipe.html());
        Ok(Some(recipe))
    }

    pub async fn delete_product(&self, id: i64) -> Result<(), ApiError> {
        self.messages.set_busy(true);
        let result = self.api.delete_product(id).await;
        self.messages.set_busy(false);
        result?;
        log::info!("deleted product {id}");
        Ok(())
    }

    pub async fn handle(&self, intent: FormIntent) -> Result<(), ApiError> {
        log::debug!("form intent {intent:?}");
        match intent {
            FormIntent::Submit => self.submit().await.map(|_| ()),
            FormIntent::Clear => {
                self.clear();
                Ok(())
            }
            FormIntent::Edit(id) => self.load_for_edit(id).await,
            FormIntent::ShowRecipe(id) => self.show_recipe(id).await.map(|_| ()),
            FormIntent::DeleteProduct(id) => self.delete_product(id).await,
        }
    }

    /// Handle intents until the session expires.
    ///
    /// Other failures are shown to the user and the loop carries on.
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
    use serde_json::json;

    use super::*;
    use crate::{
        controller::fake::FakeServer,
        event::{Payload, REGISTRO_ACTUALIZADO, REGISTRO_GUARDADO},
        mediator::Receiver,
        producto::{Ingredient, Product},
        registro::LogEntry,
        sync::Shared,
        view::{FormMode, MemoryForm, MemoryMessages, MessageKind},
    };

    #[derive(Default)]
    struct Recorder {
        seen: Shared<Vec<(String, Payload)>>,
    }

    impl Receiver for Recorder {
        fn receive(&self, event: &str, data: &Payload) {
            self.seen.get_mut().push((event.to_string(), data.clone()));
        }
    }

    fn session(kind: i64) -> Session {
        Session {
            kind: Some(kind),
            user: Some("Ana".into()),
            id: Some(1),
        }
    }

    fn entry(id: i64) -> LogEntry {
        LogEntry {
            id_bitacora: Some(id),
            fecha: "2024-01-01".into(),
            glucosa: "98".into(),
            paciente: "Ana".into(),
            ..Default::default()
        }
    }

    #[test]
    fn activation_prepares_the_patient_field() {
        let context = Context::new();
        let view = MemoryForm::default();
        let _controller = ProductsController::new(
            &context,
            &session(2),
            view.clone(),
            FakeServer::default(),
            MemoryMessages::default(),
        );
        assert_eq!(view.field(Field::Paciente), "Ana");
        assert_eq!(view.default_patient(), "Ana");
        assert!(*view.patient_readonly.get());
        assert!(context.mediator.get(FORMULARIO).is_some());
    }

    #[test]
    fn teardown_unregisters_the_form() {
        let context = Context::new();
        let controller = ProductsController::new(
            &context,
            &session(1),
            MemoryForm::default(),
            FakeServer::default(),
            MemoryMessages::default(),
        );
        drop(controller);
        assert!(context.mediator.get(FORMULARIO).is_none());
        assert!(context.mediator.names().is_empty());
    }

    #[test]
    fn create_then_edit() {
        let _ = env_logger::builder().is_test(true).try_init();
        let context = Context::new();
        let server = FakeServer::default();
        server.entries.get_mut().push(entry(7));
        let view = MemoryForm::default();
        let messages = MemoryMessages::default();
        let controller = ProductsController::new(
            &context,
            &session(1),
            view.clone(),
            server.clone(),
            messages.clone(),
        );
        let recorder = Rc::new(Recorder::default());
        context.mediator.register("recorder", &recorder);

        block_on(async {
            view.set_field(Field::Fecha, "2024-05-05");
            let saved = controller.submit().await.unwrap();
            assert_eq!(saved.id, Some(json!(1)));
            // the form heard registro_guardado and reset itself
            assert!(view.is_blank());
            assert_eq!(view.field(Field::Paciente), "Ana");
            assert_eq!(
                messages.last(),
                Some((MessageKind::Pop, "Has agregado un registro de bitácora.".into()))
            );

            controller.handle(FormIntent::Edit(7)).await.unwrap();
            assert_eq!(view.mode(), FormMode::Edit);
            assert_eq!(view.field(Field::Glucosa), "98");

            controller.submit().await.unwrap();
        });

        let seen = recorder.seen.get();
        assert_eq!(seen.len(), 2);
        assert_eq!(seen[0].0, REGISTRO_GUARDADO);
        assert_eq!(seen[0].1.get("id"), Some(&json!(1)));
        assert_eq!(seen[1].0, REGISTRO_ACTUALIZADO);
        assert_eq!(seen[1].1.get("id"), Some(&json!("7")));
        assert!(!messages.is_busy());

        let posted = server.saved.get();
        assert_eq!(posted[0].get(Field::Fecha), "2024-05-05");
        assert_eq!(posted[1].id(), Some("7"));
        // registro_actualizado does not reset the form
        assert_eq!(view.mode(), FormMode::Edit);
    }

    #[test]
    fn clear_intent_resets_edit_mode() {
        let context = Context::new();
        let server = FakeServer::default();
        server.entries.get_mut().push(entry(3));
        let view = MemoryForm::default();
        let controller = ProductsController::new(
            &context,
            &session(1),
            view.clone(),
            server,
            MemoryMessages::default(),
        );
        block_on(async {
            controller.handle(FormIntent::Edit(3)).await.unwrap();
            controller.handle(FormIntent::Clear).await.unwrap();
        });
        assert_eq!(view.mode(), FormMode::Create);
        assert!(view.is_blank());
    }

    #[test]
    fn pending_edit_is_loaded_on_activation() {
        let context = Context::new();
        context.pending_edit.set(Some(entry(11)));
        let view = MemoryForm::default();
        let _controller = ProductsController::new(
            &context,
            &session(1),
            view.clone(),
            FakeServer::default(),
            MemoryMessages::default(),
        );
        assert_eq!(view.mode(), FormMode::Edit);
        assert_eq!(view.field(Field::IdBitacora), "11");
        assert!(context.pending_edit.get().is_none());
    }

    #[test]
    fn missing_entry_is_reported_and_the_loop_goes_on() {
        let context = Context::new();
        let messages = MemoryMessages::default();
        let controller = ProductsController::new(
            &context,
            &session(1),
            MemoryForm::default(),
            FakeServer::default(),
            messages.clone(),
        );
        let intents = controller.intents();
        block_on(async {
            intents.send(FormIntent::Edit(99)).await.unwrap();
            intents.send(FormIntent::Clear).await.unwrap();
            intents.close();
            controller.run().await.unwrap();
        });
        assert_eq!(
            messages.last(),
            Some((MessageKind::Modal, "Registro no encontrado".into()))
        );
    }

    #[test]
    fn expired_session_stops_the_loop() {
        let context = Context::new();
        let server = FakeServer::default();
        server.expired.set(true);
        let controller = ProductsController::new(
            &context,
            &session(1),
            MemoryForm::default(),
            server,
            MemoryMessages::default(),
        );
        let intents = controller.intents();
        block_on(async {
            intents.send(FormIntent::Submit).await.unwrap();
            assert!(matches!(
                controller.run().await,
                Err(ApiError::Unauthorized)
            ));
        });
    }

    fn bakery() -> FakeServer {
        let server = FakeServer::default();
        server.products.get_mut().push(Product {
            id: Some(5),
            name: "Concha".into(),
            precio: 12.5,
            ..Default::default()
        });
        server.recipes.get_mut().extend([
            (
                5,
                Ingredient {
                    name: "Harina".into(),
                    cantidad: "0.5".into(),
                    unidad: "kg".into(),
                    existencias: "40".into(),
                },
            ),
            (
                6,
                Ingredient {
                    name: "Leche".into(),
                    ..Default::default()
                },
            ),
        ]);
        server
    }

    #[test]
    fn recipe_is_shown_in_a_modal() {
        let context = Context::new();
        let messages = MemoryMessages::default();
        let controller = ProductsController::new(
            &context,
            &session(1),
            MemoryForm::default(),
            bakery(),
            messages.clone(),
        );
        let recipe = block_on(controller.show_recipe(5)).unwrap().unwrap();
        assert_eq!(recipe.product.name, "Concha");
        assert_eq!(recipe.ingredients.len(), 1);
        assert_eq!(recipe.ingredients[0].name, "Harina");
        let (kind, html) = messages.last().unwrap();
        assert_eq!(kind, MessageKind::ModalHtml);
        assert!(html.contains("$ 12.50"));
        assert!(html.contains("<td>0.5 kg</td>"));
    }

    #[test]
    fn unknown_product_has_no_recipe() {
        let context = Context::new();
        let messages = MemoryMessages::default();
        let controller = ProductsController::new(
            &context,
            &session(1),
            MemoryForm::default(),
            bakery(),
            messages.clone(),
        );
        let intents = controller.intents();
        block_on(async {
            intents.send(FormIntent::ShowRecipe(6)).await.unwrap();
            intents.close();
            controller.run().await.unwrap();
        });
        assert_eq!(
            messages.last(),
            Some((MessageKind::Modal, PRODUCT_NOT_FOUND.into()))
        );
    }

    #[test]
    fn delete_product_removes_it_on_the_server() {
        let context = Context::new();
        let server = bakery();
        let messages = MemoryMessages::default();
        let view = MemoryForm::default();
        let controller = ProductsController::new(
            &context,
            &session(1),
            view.clone(),
            server.clone(),
            messages.clone(),
        );
        view.set_field(Field::Fecha, "2024-05-05");
        block_on(controller.handle(FormIntent::DeleteProduct(5))).unwrap();
        assert!(server.products.get().is_empty());
        assert!(!messages.is_busy());
        // the bitácora form is not involved
        assert_eq!(view.field(Field::Fecha), "2024-05-05");
        assert!(server.saved.get().is_empty());
    }

    #[test]
    fn product_calls_stop_on_an_expired_session() {
        let context = Context::new();
        let server = bakery();
        server.expired.set(true);
        let messages = MemoryMessages::default();
        let controller = ProductsController::new(
            &context,
            &session(1),
            MemoryForm::default(),
            server,
            messages.clone(),
        );
        assert!(matches!(
            block_on(controller.handle(FormIntent::ShowRecipe(5))),
            Err(ApiError::Unauthorized)
        ));
        assert!(matches!(
            block_on(controller.handle(FormIntent::DeleteProduct(5))),
            Err(ApiError::Unauthorized)
        ));
        assert!(!messages.is_busy());
    }
}
