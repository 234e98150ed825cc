//! Browser entry point.
//!
//! A hash router swaps route templates into `#appContent` and runs one view
//! controller per route. A controller lives until the next `hashchange`, when
//! it is dropped along with the mediator registrations of its components.
use anyhow::anyhow;
use bitacora::{
    prelude::*,
    session,
    web::{self, dom, prelude::*},
};
use futures_lite::FutureExt;
use wasm_bindgen::{JsCast, prelude::*};

/// Prefix of the server endpoints, relative to the page.
const API_BASE: &str = "";
const LOG_LEVEL: log::Level = log::Level::Debug;

fn js(e: JsValue) -> anyhow::Error {
    anyhow!("{e:?}")
}

#[wasm_bindgen(start)]
pub fn start() -> Result<(), JsValue> {
    console_error_panic_hook::set_once();
    console_log::init_with_level(LOG_LEVEL).map_err(|e| JsValue::from_str(&e.to_string()))?;
    log::info!("starting");

    wasm_bindgen_futures::spawn_local(async {
        if let Err(e) = sign_out_on_request().await {
            log::error!("sign out button: {e:#}");
        }
    });
    wasm_bindgen_futures::spawn_local(async {
        if let Err(e) = App::new(API_BASE).run().await {
            log::error!("{e:#}");
        }
    });
    Ok(())
}

/// Sign out whenever a `.btn-cerrar-sesion` is clicked, on any route.
async fn sign_out_on_request() -> anyhow::Result<()> {
    let clicks = EventListener::new(web::document().map_err(js)?, "click").map_err(js)?;
    let login = LoginController::new(
        HttpApi::new(API_BASE),
        LocalStorage,
        DomMessages,
        HashNavigator,
    );
    loop {
        let event = clicks.next().await;
        let clicked = event
            .target()
            .and_then(|t| t.dyn_into::<web_sys::Element>().ok())
            .and_then(|e| e.closest(".btn-cerrar-sesion").ok().flatten());
        if clicked.is_some() {
            login.sign_out().await;
        }
    }
}

struct App {
    context: Context,
    api: HttpApi,
}

impl App {
    fn new(base: &str) -> Self {
        App {
            context: Context::new(),
            api: HttpApi::new(base.to_string()),
        }
    }

    async fn run(&self) -> anyhow::Result<()> {
        let hashchange = EventListener::new(web::window().map_err(js)?, "hashchange").map_err(js)?;

        loop {
            let route = HashNavigator::current();
            let logged_in = session::is_logged_in(&LocalStorage);
            let hash = web::window()
                .and_then(|w| w.location().hash())
                .unwrap_or_default();
            let target = route.redirect(logged_in).unwrap_or(route);
            let path = match hash.trim_start_matches('#') {
                "" => "/",
                path => path,
            };
            if path != target.path() {
                log::info!("redirecting '{hash}' to {target:?}");
                HashNavigator.navigate(target);
                hashchange.next().await;
                continue;
            }

            let left = async {
                hashchange.next().await;
                None
            };
            let finished = async { Some(self.activate(route).await) }.or(left).await;
            let Some(result) = finished else {
                log::debug!("left {route:?}");
                continue;
            };
            match result {
                Ok(()) => {}
                Err(e) if matches!(e.downcast_ref::<ApiError>(), Some(ApiError::Unauthorized)) => {
                    log::info!("session expired");
                    session::logout(&LocalStorage);
                    HashNavigator.navigate(Route::Login);
                }
                Err(e) => log::error!("{route:?}: {e:#}"),
            }
            hashchange.next().await;
        }
    }

    /// Load the route's template and run its controller.
    async fn activate(&self, route: Route) -> anyhow::Result<()> {
        let html = self.api.text(route.template()).await?;
        web::element(dom::APP_CONTENT).map_err(js)?.set_inner_html(&html);
        log::info!("entered {route:?}");

        match route {
            Route::Login => self.login().await,
            Route::Products => self.products().await,
            Route::Bitacora => self.bitacora().await,
        }
    }

    async fn login(&self) -> anyhow::Result<()> {
        let controller = LoginController::new(
            self.api.clone(),
            LocalStorage,
            DomMessages,
            HashNavigator,
        );
        let submit = EventListener::on_id(dom::LOGIN_FORM, "submit").map_err(js)?;
        let intents = controller.intents();
        let forward = async move {
            loop {
                submit.next().await.prevent_default();
                let intent = LoginIntent::SignIn {
                    user: dom::login_input("usuario"),
                    password: dom::login_input("contrasena"),
                };
                if intents.send(intent).await.is_err() {
                    break;
                }
            }
            Ok(())
        };
        controller.run().or(forward).await?;
        Ok(())
    }

    async fn products(&self) -> anyhow::Result<()> {
        let session = session::restore(&LocalStorage);
        let controller = ProductsController::new(
            &self.context,
            &session,
            DomForm,
            self.api.clone(),
            DomMessages,
        );
        let submit = EventListener::on_id(dom::FORM, "submit").map_err(js)?;
        let clear = EventListener::on_id(dom::CLEAR_BUTTON, "click").map_err(js)?;
        // product rows are rendered after the template loads
        let clicks = EventListener::new(web::document().map_err(js)?, "click").map_err(js)?;
        let intents = controller.intents();
        let forward = async move {
            loop {
                let submitted = async {
                    submit.next().await.prevent_default();
                    Some(FormIntent::Submit)
                };
                let cleared = async {
                    clear.next().await;
                    Some(FormIntent::Clear)
                };
                let clicked = async {
                    let event = clicks.next().await;
                    if let Some(id) = dom::card_button_id(&event, "btn-ingredientes") {
                        Some(FormIntent::ShowRecipe(id))
                    } else if let Some(id) = dom::card_button_id(&event, "btn-eliminar") {
                        dom::confirm("¿Eliminar este producto?")
                            .then_some(FormIntent::DeleteProduct(id))
                    } else {
                        None
                    }
                };
                let Some(intent) = submitted.or(cleared).or(clicked).await else {
                    continue;
                };
                if intents.send(intent).await.is_err() {
                    break;
                }
            }
            Ok(())
        };
        controller.run().or(forward).await?;
        Ok(())
    }

    async fn bitacora(&self) -> anyhow::Result<()> {
        let session = session::restore(&LocalStorage);
        let controller = BitacoraController::new(
            &self.context,
            &session,
            DomCards,
            self.api.clone(),
            DomMessages,
            HashNavigator,
        );
        let month = EventListener::on_id(dom::MONTH_SELECT, "change").map_err(js)?;
        let cards = EventListener::on_id(dom::CARDS, "click").map_err(js)?;
        let intents = controller.intents();
        let forward = async move {
            loop {
                let selected = async {
                    month.next().await;
                    let value = web::element_as::<web_sys::HtmlSelectElement>(dom::MONTH_SELECT)
                        .map(|select| select.value())
                        .unwrap_or_default();
                    Some(ListIntent::SelectMonth(value.into()))
                };
                let clicked = async {
                    let event = cards.next().await;
                    if let Some(id) = dom::card_button_id(&event, "btn-editar-bitacora") {
                        Some(ListIntent::Edit(id))
                    } else if let Some(id) = dom::card_button_id(&event, "btn-eliminar-bitacora") {
                        dom::confirm("¿Eliminar este Registro?").then_some(ListIntent::Delete(id))
                    } else {
                        None
                    }
                };
                let Some(intent) = selected.or(clicked).await else {
                    continue;
                };
                if intents.send(intent).await.is_err() {
                    break;
                }
            }
            Ok(())
        };
        controller.run().or(forward).await?;
        Ok(())
    }
}
