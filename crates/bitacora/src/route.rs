//! Hash routes of the application and the login guard.

/// Where the user is.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub enum Route {
    #[default]
    Login,
    Products,
    Bitacora,
}

impl Route {
    /// Parse a location hash such as `#/productos`.
    ///
    /// Unknown routes resolve to the login route.
    pub fn from_hash(hash: &str) -> Route {
        let path = hash.trim_start_matches('#');
        match path.split(['?', '#']).next().unwrap_or_default() {
            "/productos" => Route::Products,
            "/bitacora" => Route::Bitacora,
            _ => Route::Login,
        }
    }

    pub fn path(self) -> &'static str {
        match self {
            Route::Login => "/",
            Route::Products => "/productos",
            Route::Bitacora => "/bitacora",
        }
    }

    pub fn hash(self) -> String {
        format!("#{}", self.path())
    }

    /// Server path of the route's HTML template.
    pub fn template(self) -> &'static str {
        match self {
            Route::Login => "login",
            Route::Products => "productos",
            Route::Bitacora => "bitacora",
        }
    }

    /// Where a user with the given login state must go instead, if anywhere.
    pub fn redirect(self, logged_in: bool) -> Option<Route> {
        match (self, logged_in) {
            (Route::Login, true) => Some(Route::Products),
            (Route::Login, false) => None,
            (_, true) => None,
            (_, false) => Some(Route::Login),
        }
    }
}
