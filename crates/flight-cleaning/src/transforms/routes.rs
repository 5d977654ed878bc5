//! Route splitting.

use crate::config::DEFAULT_ROUTE_SEPARATOR;
use serde::{Deserialize, Serialize};

/// Destination and origin parts of a route, both upper-cased.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Route {
    pub to: String,
    pub from: String,
}

impl Route {
    pub fn new(to: impl Into<String>, from: impl Into<String>) -> Self {
        Self {
            to: to.into(),
            from: from.into(),
        }
    }
}

/// Splits combined `ORIGIN_DESTINATION` values into [`Route`]s.
#[derive(Debug, Clone, Copy)]
pub struct RouteSplitter {
    separator: char,
}

impl Default for RouteSplitter {
    fn default() -> Self {
        Self::new(DEFAULT_ROUTE_SEPARATOR)
    }
}

impl RouteSplitter {
    pub fn new(separator: char) -> Self {
        Self { separator }
    }

    /// Split on the first separator only.
    ///
    /// A missing route yields two empty parts; a route without the separator
    /// keeps the whole value in `to` and leaves `from` empty. Each part is
    /// trimmed, then ASCII letters are upper-cased.
    pub fn split(&self, route: Option<&str>) -> Route {
        let Some(route) = route else {
            return Route::default();
        };

        let (to, from) = route.split_once(self.separator).unwrap_or((route, ""));
        Route {
            to: normalize_part(to),
            from: normalize_part(from),
        }
    }

    /// Whether the raw value contains the separator at all.
    pub fn has_separator(&self, route: &str) -> bool {
        route.contains(self.separator)
    }
}

fn normalize_part(part: &str) -> String {
    part.trim().to_ascii_uppercase()
}
