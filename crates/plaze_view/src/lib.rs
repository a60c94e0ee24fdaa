//! # plaze_view
//!
//! Locating Plaze views by name and serving their compiled form.
//!
//! View names are dotted paths relative to a search path (`admin.users`
//! maps to `admin/users.plaze.php`). A `namespace::` prefix restricts the
//! lookup to the hint paths registered for that namespace.

pub mod config;
pub mod engine;
pub mod error;
pub mod finder;
pub mod name;

pub use config::ViewConfig;
pub use engine::CompilingEngine;
pub use error::{ViewError, ViewResult};
pub use finder::{FileViewFinder, DEFAULT_EXTENSIONS};
pub use name::{ViewName, HINT_PATH_DELIMITER};
