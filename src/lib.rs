//! RustF view driver - convention-based template location for MVC apps
//!
//! Maps a template reference and the routed controller/action onto a view
//! file and hands rendering to a template engine:
//! - controller/action naming rules (`auto_rule`)
//! - single-app and multi-app view roots, plus `module@template` references
//! - typed engine capabilities through [`TemplateEngine`](views::TemplateEngine)
//! - literal output replacements (`tpl_replace_string`)
//!
//! MiniJinja is the bundled engine (`minijinja-engine` feature, on by default).

// Enforce error handling best practices
#![cfg_attr(
    not(test),
    warn(
        clippy::unwrap_used,
        clippy::expect_used,
        clippy::panic,
        clippy::unimplemented,
        clippy::todo,
    )
)]
// Allow in tests
#![cfg_attr(test, allow(clippy::unwrap_used, clippy::expect_used,))]

pub mod app;
pub mod config;
pub mod error;
pub mod utils;
pub mod views;

pub use app::{AppPaths, RequestContext, Route};
pub use config::{AutoRule, ViewConfig};
pub use error::{Error, Result};
#[cfg(feature = "minijinja-engine")]
pub use views::MiniJinjaEngine;
pub use views::{PathResolver, TemplateEngine, ViewDriver};

/// Prelude module for common imports
pub mod prelude {
    pub use crate::*;
    pub use serde_json::json;
}
