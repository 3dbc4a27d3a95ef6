use crate::error::Result;
use serde_json::{Map, Value};
use std::path::Path;
use std::time::Duration;

pub mod driver;
#[cfg(feature = "minijinja-engine")]
pub mod minijinja;
pub mod resolver;

pub use driver::ViewDriver;
#[cfg(feature = "minijinja-engine")]
pub use self::minijinja::MiniJinjaEngine;
pub use resolver::PathResolver;

/// Operations the view driver needs from a template engine
///
/// The driver owns path resolution; an engine receives absolute file paths
/// and is responsible for compiling, caching and rendering them.
pub trait TemplateEngine: Send {
    /// Set the markers that open and close a variable expression
    fn set_delimiters(&mut self, begin: &str, end: &str) -> Result<()>;

    /// Enable or disable the rendered-output cache
    fn set_caching(&mut self, enabled: bool);

    /// Recompile templates on every render
    fn set_force_compile(&mut self, force: bool);

    /// How long a rendered-output cache entry stays valid
    fn set_cache_lifetime(&mut self, lifetime: Duration);

    /// Directory relative template names (includes, parents) are loaded from
    fn set_template_dir(&mut self, dir: &Path);

    fn set_cache_dir(&mut self, dir: &Path);

    fn set_compile_dir(&mut self, dir: &Path);

    /// Add variables to the render context; existing keys are overwritten
    fn assign(&mut self, data: &Map<String, Value>);

    /// Drop every assigned variable
    fn clear_assign(&mut self);

    /// Render the template file at `path` with the assigned variables
    fn fetch(&mut self, path: &Path) -> Result<String>;

    /// Drop compiled templates and cached output
    fn clear_cache(&mut self) -> Result<()>;
}
