//! The signed in user, cached in local storage between page loads.
use serde_json::{Map, Value};

use crate::{str::Str, sync::Shared};

/// Set to `"1"` while signed in.
pub const LOGIN_KEY: &str = "flask-login";
/// JSON object describing the signed in user.
pub const PREFERENCES_KEY: &str = "flask-preferencias";
/// Bearer token sent with every request.
pub const TOKEN_KEY: &str = "flask-JWT";

/// Key/value string storage, like the browser's `localStorage`.
pub trait Storage {
    fn get_item(&self, key: &str) -> Option<String>;
    fn set_item(&self, key: &str, value: &str);
    fn remove_item(&self, key: &str);
}

#[derive(Clone, Default, Debug)]
pub struct MemoryStorage {
    pub items: Shared<Vec<(String, String)>>,
}

impl Storage for MemoryStorage {
    fn get_item(&self, key: &str) -> Option<String> {
        self.items
            .get()
            .iter()
            .find(|(k, _)| k == key)
            .map(|(_, v)| v.clone())
    }

    fn set_item(&self, key: &str, value: &str) {
        let mut items = self.items.get_mut();
        match items.iter_mut().find(|(k, _)| k == key) {
            Some((_, v)) => *v = value.to_string(),
            None => items.push((key.to_string(), value.to_string())),
        }
    }

    fn remove_item(&self, key: &str) {
        self.items.get_mut().retain(|(k, _)| k != key);
    }
}

/// The user description the server hands back, kept as raw JSON.
pub type Preferences = Map<String, Value>;

fn first_present<'a>(prefs: &'a Preferences, keys: &[&str]) -> Option<&'a Value> {
    keys.iter()
        .filter_map(|k| prefs.get(*k))
        .find(|v| !v.is_null())
}

fn first_truthy<'a>(prefs: &'a Preferences, keys: &[&str]) -> Option<&'a Value> {
    keys.iter()
        .filter_map(|k| prefs.get(*k))
        .find(|v| crate::event::is_truthy(v))
}

fn as_int(value: &Value) -> Option<i64> {
    match value {
        Value::Number(n) => n.as_i64(),
        Value::String(s) => s.trim().parse().ok(),
        _ => None,
    }
}

fn as_text(value: &Value) -> Option<Str> {
    match value {
        Value::String(s) => Some(s.into()),
        Value::Number(n) => Some(n.to_string().into()),
        _ => None,
    }
}

/// Who is signed in.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct Session {
    /// User type, `1` for administrators.
    pub kind: Option<i64>,
    pub user: Option<Str>,
    pub id: Option<i64>,
}

impl Session {
    /// Read a session out of cached preferences.
    pub fn from_preferences(prefs: &Preferences) -> Self {
        Session {
            kind: first_present(prefs, &["tipo", "tipo_usuario"]).and_then(as_int),
            user: first_truthy(prefs, &["usr", "nombre"]).and_then(as_text),
            id: first_present(prefs, &["idUsuario", "id"]).and_then(as_int),
        }
    }

    /// Read a session out of the user row the login endpoint returns.
    ///
    /// That row names its fields the other way around from the cached
    /// preferences, so the precedence is reversed.
    pub fn from_login(row: &Preferences) -> Self {
        Session {
            kind: first_present(row, &["tipo_usuario", "tipo"]).and_then(as_int),
            user: first_truthy(row, &["nombre", "usr"]).and_then(as_text),
            id: first_present(row, &["idUsuario", "id"]).and_then(as_int),
        }
    }

    pub fn is_admin(&self) -> bool {
        self.kind == Some(1)
    }

    pub fn user_name(&self) -> Str {
        self.user.clone().unwrap_or_default()
    }
}

/// Whether storage says a user is signed in.
pub fn is_logged_in(storage: &impl Storage) -> bool {
    storage
        .get_item(LOGIN_KEY)
        .is_some_and(|login| !login.is_empty())
}

/// Cached preferences. Missing or corrupt entries read as empty.
pub fn stored_preferences(storage: &impl Storage) -> Preferences {
    storage
        .get_item(PREFERENCES_KEY)
        .and_then(|raw| match serde_json::from_str::<Value>(&raw) {
            Ok(Value::Object(prefs)) => Some(prefs),
            Ok(_) => None,
            Err(e) => {
                log::warn!("discarding unreadable preferences: {e}");
                None
            }
        })
        .unwrap_or_default()
}

/// Restore the session cached by a previous page load.
pub fn restore(storage: &impl Storage) -> Session {
    Session::from_preferences(&stored_preferences(storage))
}

/// Cache a freshly signed in user.
pub fn login(storage: &impl Storage, row: &Preferences) -> Session {
    storage.set_item(LOGIN_KEY, "1");
    storage.set_item(PREFERENCES_KEY, &Value::Object(row.clone()).to_string());
    Session::from_login(row)
}

/// Forget the signed in user.
pub fn logout(storage: &impl Storage) {
    for key in [TOKEN_KEY, LOGIN_KEY, PREFERENCES_KEY] {
        storage.remove_item(key);
    }
}
