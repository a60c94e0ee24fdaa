//! View names.
//!
//! Views are addressed with dotted names (`admin.users.index`), optionally
//! prefixed by a namespace hint (`mail::welcome`).

use crate::error::{ViewError, ViewResult};

/// Separates a namespace hint from the view name.
pub const HINT_PATH_DELIMITER: &str = "::";

/// Helpers for working with view names.
pub struct ViewName;

impl ViewName {
    /// Turn path separators into dots, keeping any namespace prefix.
    pub fn normalize(name: &str) -> String {
        match name.split_once(HINT_PATH_DELIMITER) {
            Some((namespace, view)) => {
                format!("{}{}{}", namespace, HINT_PATH_DELIMITER, view.replace('/', "."))
            }
            None => name.replace('/', "."),
        }
    }

    /// Whether the name carries a namespace hint.
    pub fn has_hint(name: &str) -> bool {
        name.contains(HINT_PATH_DELIMITER)
    }

    /// Split a hinted name into namespace and view.
    pub fn split_hint(name: &str) -> ViewResult<(&str, &str)> {
        match name.split_once(HINT_PATH_DELIMITER) {
            Some((namespace, view))
                if !namespace.is_empty()
                    && !view.is_empty()
                    && !view.contains(HINT_PATH_DELIMITER) =>
            {
                Ok((namespace, view))
            }
            _ => Err(ViewError::InvalidName(name.to_string())),
        }
    }

    /// Relative file stem for a dotted view name.
    pub fn to_relative_path(view: &str) -> String {
        view.replace('.', "/")
    }
}
