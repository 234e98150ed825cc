//! The login view.
use async_channel::{Receiver, Sender};

use super::report;
use crate::{
    api::{ApiError, SessionApi},
    route::Route,
    session::{self, Session, Storage},
    str::Str,
    view::{Messages, Navigator},
};

#[derive(Clone, Debug, PartialEq)]
pub enum LoginIntent {
    SignIn { user: Str, password: Str },
    SignOut,
}

pub struct LoginController<A, S, M, N> {
    api: A,
    storage: S,
    messages: M,
    navigator: N,
    intents: (Sender<LoginIntent>, Receiver<LoginIntent>),
}

impl<A, S, M, N> LoginController<A, S, M, N>
where
    A: SessionApi,
    S: Storage,
    M: Messages,
    N: Navigator,
{
    pub fn new(api: A, storage: S, messages: M, navigator: N) -> Self {
        LoginController {
            api,
            storage,
            messages,
            navigator,
            intents: async_channel::unbounded(),
        }
    }

    pub fn intents(&self) -> Sender<LoginIntent> {
        self.intents.0.clone()
    }

    /// Sign in, caching the session and moving on to the products view.
    ///
    /// Returns `None` when the credentials are wrong.
    pub async fn sign_in(&self, user: &str, password: &str) -> Result<Option<Session>, ApiError> {
        self.messages.pop("Iniciando sesión, espere un momento...");
        self.messages.set_busy(true);
        let result = self.api.sign_in(user, password).await;
        self.messages.set_busy(false);

        let Some(row) = result?.into_iter().next() else {
            log::info!("rejected credentials for '{user}'");
            self.messages.pop("Usuario y/o contraseña incorrecto(s)");
            return Ok(None);
        };
        let session = session::login(&self.storage, &row);
        log::info!("signed in as {:?}", session.user);
        self.navigator.navigate(Route::Products);
        Ok(Some(session))
    }

    /// Sign out on the server (best effort) and forget the session.
    pub async fn sign_out(&self) {
        if let Err(e) = self.api.sign_out().await {
            log::warn!("server sign out failed: {e}");
        }
        session::logout(&self.storage);
        self.navigator.navigate(Route::Login);
    }

    pub async fn handle(&self, intent: LoginIntent) -> Result<(), ApiError> {
        match intent {
            LoginIntent::SignIn { user, password } => self.sign_in(&user, &password).await.map(|_| ()),
            LoginIntent::SignOut => {
                self.sign_out().await;
                Ok(())
            }
        }
    }

    pub async fn run(&self) -> Result<(), ApiError> {
        while let Ok(intent) = self.intents.1.recv().await {
            if let Err(e) = self.handle(intent).await {
                report(&self.messages, &e);
            }
        }
        Ok(())
    }
}
