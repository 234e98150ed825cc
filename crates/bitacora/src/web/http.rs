//! The server API over `fetch`.
use serde::de::DeserializeOwned;
use wasm_bindgen::{JsCast, JsValue};
use wasm_bindgen_futures::JsFuture;
use web_sys::{Headers, Request, RequestInit, Response, UrlSearchParams};

use super::{LocalStorage, window};
use crate::{
    api::{
        ACTIVITY_LOG, ApiError, BITACORA, BITACORA_DELETE, BITACORA_SEARCH, BitacoraApi, PRODUCT,
        PRODUCT_DELETE, PRODUCT_INGREDIENTS, ProductsApi, SIGN_IN, SIGN_OUT, Saved, SessionApi,
    },
    producto::{Ingredient, Product},
    registro::{EntryForm, LogEntry, SearchQuery},
    session::{Preferences, Storage, TOKEN_KEY},
    str::Str,
};

fn network(e: JsValue) -> ApiError {
    ApiError::Network(format!("{e:?}"))
}

fn encode(params: &[(&str, String)]) -> Result<String, ApiError> {
    let search = UrlSearchParams::new().map_err(network)?;
    for (key, value) in params {
        search.append(key, value);
    }
    Ok(search.to_string().into())
}

/// Talks to the server the page was loaded from, relative to `base`.
#[derive(Clone, Debug, Default)]
pub struct HttpApi {
    base: Str,
    storage: LocalStorage,
}

impl HttpApi {
    /// `base` is prepended to every endpoint path, eg `""` or `"/app/"`.
    pub fn new(base: impl Into<Str>) -> Self {
        HttpApi {
            base: base.into(),
            storage: LocalStorage,
        }
    }

    fn url(&self, path: &str) -> String {
        format!("{}{path}", self.base)
    }

    /// Send a request and return the body of a successful response.
    async fn request(
        &self,
        method: &str,
        path: &str,
        params: &[(&str, String)],
    ) -> Result<String, ApiError> {
        let init = RequestInit::new();
        init.set_method(method);

        let headers = Headers::new().map_err(network)?;
        if let Some(token) = self.storage.get_item(TOKEN_KEY) {
            headers
                .set("Authorization", &format!("Bearer {token}"))
                .map_err(network)?;
        }

        let mut url = self.url(path);
        let query = encode(params)?;
        if method == "GET" {
            if !query.is_empty() {
                url = format!("{url}?{query}");
            }
        } else {
            headers
                .set(
                    "Content-Type",
                    "application/x-www-form-urlencoded; charset=UTF-8",
                )
                .map_err(network)?;
            init.set_body(&JsValue::from_str(&query));
        }
        init.set_headers(&headers);

        log::debug!("{method} {url}");
        let request = Request::new_with_str_and_init(&url, &init).map_err(network)?;
        let response: Response = JsFuture::from(window().map_err(network)?.fetch_with_request(&request))
            .await
            .map_err(network)?
            .dyn_into()
            .map_err(network)?;
        let body = JsFuture::from(response.text().map_err(network)?)
            .await
            .map_err(network)?
            .as_string()
            .unwrap_or_default();

        if response.ok() {
            Ok(body)
        } else {
            log::warn!("{method} {url} failed with {}", response.status());
            Err(ApiError::from_status(response.status(), &body))
        }
    }

    /// `GET` a plain text resource, like a route template.
    pub async fn text(&self, path: &str) -> Result<String, ApiError> {
        self.request("GET", path, &[]).await
    }

    async fn json<T: DeserializeOwned>(
        &self,
        method: &str,
        path: &str,
        params: &[(&str, String)],
    ) -> Result<T, ApiError> {
        let body = self.request(method, path, params).await?;
        Ok(serde_json::from_str(&body)?)
    }
}

impl BitacoraApi for HttpApi {
    async fn entry(&self, id: i64) -> Result<LogEntry, ApiError> {
        self.json("GET", &format!("{BITACORA}/{id}"), &[]).await
    }

    async fn save(&self, form: &EntryForm) -> Result<Saved, ApiError> {
        self.json("POST", BITACORA, &form.params()).await
    }

    async fn delete(&self, id: i64) -> Result<(), ApiError> {
        self.request("POST", BITACORA_DELETE, &[("id", id.to_string())])
            .await
            .map(|_| ())
    }

    async fn search(&self, query: &SearchQuery) -> Result<Vec<LogEntry>, ApiError> {
        self.json("GET", BITACORA_SEARCH, &query.params()).await
    }

    async fn log_activity(&self, activity: &str, description: &str) -> Result<(), ApiError> {
        let params = [
            ("actividad", activity.to_string()),
            ("descripcion", description.to_string()),
        ];
        // the server answers with its whole log as plain text
        self.request("GET", ACTIVITY_LOG, &params).await.map(|_| ())
    }
}

impl ProductsApi for HttpApi {
    async fn product(&self, id: i64) -> Result<Vec<Product>, ApiError> {
        self.json("GET", &format!("{PRODUCT}/{id}"), &[]).await
    }

    async fn ingredients(&self, id: i64) -> Result<Vec<Ingredient>, ApiError> {
        self.json("GET", &format!("{PRODUCT_INGREDIENTS}/{id}"), &[])
            .await
    }

    async fn delete_product(&self, id: i64) -> Result<(), ApiError> {
        self.request("POST", PRODUCT_DELETE, &[("id", id.to_string())])
            .await
            .map(|_| ())
    }
}

impl SessionApi for HttpApi {
    async fn sign_in(&self, user: &str, password: &str) -> Result<Vec<Preferences>, ApiError> {
        let params = [
            ("usuario", user.to_string()),
            ("contrasena", password.to_string()),
        ];
        self.json("POST", SIGN_IN, &params).await
    }

    async fn sign_out(&self) -> Result<(), ApiError> {
        self.request("POST", SIGN_OUT, &[]).await.map(|_| ())
    }
}
