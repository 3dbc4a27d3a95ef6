use crate::app::{AppPaths, RequestContext};
use crate::config::ViewConfig;
use crate::error::{Error, Result};
use crate::views::resolver::PathResolver;
use crate::views::TemplateEngine;
use serde_json::{Map, Value};
use std::io::Write;
use std::path::{Path, PathBuf};
use std::time::Duration;

/// Convention-based view driver
///
/// Turns a template reference plus the routed controller/action into a view
/// file, hands it to the wrapped [`TemplateEngine`] and post-processes the
/// output with the `tpl_replace_string` table.
///
/// # Example
/// ```ignore
/// use rustf_view_driver::prelude::*;
///
/// let app = AppPaths::from_root("/srv/site").with_debug(true);
/// let mut views = ViewDriver::minijinja(app, ViewConfig::load()?)?;
///
/// let route = Route::new("blog.post", "showList");
/// // renders /srv/site/view/blog/post/show_list.html
/// let html = views.fetch("", &json!({ "posts": [] }), &route)?;
/// ```
pub struct ViewDriver<E: TemplateEngine> {
    app: AppPaths,
    config: ViewConfig,
    engine: E,
}

impl<E: TemplateEngine> ViewDriver<E> {
    /// Wrap `engine` and apply the engine settings from `config`
    pub fn new(app: AppPaths, config: ViewConfig, engine: E) -> Result<Self> {
        config.validate()?;

        let mut driver = Self {
            app,
            config,
            engine,
        };
        apply_settings(&mut driver.engine, &driver.app, &driver.config)?;
        Ok(driver)
    }

    /// Apply `overrides` on top of the current configuration and reconfigure the engine
    ///
    /// Top-level keys are replaced whole. On error the previous configuration
    /// stays in effect and the engine is put back on it.
    pub fn config(&mut self, overrides: toml::Table) -> Result<()> {
        let merged = self.config.merged(overrides)?;

        if let Err(e) = apply_settings(&mut self.engine, &self.app, &merged) {
            log::warn!("View engine rejected new configuration: {}", e);
            apply_settings(&mut self.engine, &self.app, &self.config)?;
            return Err(e);
        }

        self.config = merged;
        Ok(())
    }

    /// Read a single configuration option by key
    pub fn get_config(&self, name: &str) -> Option<toml::Value> {
        self.config.get_value(name)
    }

    pub fn view_config(&self) -> &ViewConfig {
        &self.config
    }

    pub fn app(&self) -> &AppPaths {
        &self.app
    }

    pub fn engine(&self) -> &E {
        &self.engine
    }

    /// Direct access for engine tuning the driver does not cover
    pub fn engine_mut(&mut self) -> &mut E {
        &mut self.engine
    }

    pub fn resolver(&self) -> PathResolver<'_> {
        PathResolver::new(&self.config, &self.app)
    }

    /// Resolve a template reference to a file path
    ///
    /// References with a file extension are taken as literal paths.
    pub fn locate(&self, template: &str, request: &dyn RequestContext) -> Result<PathBuf> {
        if has_extension(template) {
            return Ok(PathBuf::from(template));
        }
        self.resolver().resolve(template, request)
    }

    /// Check whether a template reference names an existing file
    pub fn exists(&self, template: &str, request: &dyn RequestContext) -> bool {
        self.locate(template, request)
            .map(|path| path.is_file())
            .unwrap_or(false)
    }

    /// Render a template and return the output
    pub fn fetch(
        &mut self,
        template: &str,
        data: &Value,
        request: &dyn RequestContext,
    ) -> Result<String> {
        let variables = match data {
            Value::Object(map) => map.clone(),
            Value::Null => Map::new(),
            other => {
                return Err(Error::template(format!(
                    "View data must be an object, got {}",
                    json_kind(other)
                )))
            }
        };

        let path = if has_extension(template) {
            // Literal paths include relative to the configured view dir
            self.engine
                .set_template_dir(Path::new(&self.config.view_dir_name));
            PathBuf::from(template)
        } else {
            let (root, path) = self.resolver().resolve_with_root(template, request)?;
            self.engine.set_template_dir(&root);
            path
        };

        if !path.is_file() {
            return Err(Error::template_not_found(path));
        }

        if self.app.debug {
            let keys: Vec<&String> = variables.keys().collect();
            log::info!("[ VIEW ] {} [ {:?} ]", path.display(), keys);
        }

        self.engine.assign(&variables);
        let rendered = self.engine.fetch(&path);
        self.engine.clear_assign();

        Ok(self.replace_strings(rendered?))
    }

    /// Render a template and write the output to `out`
    pub fn display<W: Write + ?Sized>(
        &mut self,
        template: &str,
        data: &Value,
        request: &dyn RequestContext,
        out: &mut W,
    ) -> Result<()> {
        let output = self.fetch(template, data, request)?;
        out.write_all(output.as_bytes())?;
        Ok(())
    }

    /// Drop the engine's compiled templates and cached output
    pub fn clear_cache(&mut self) -> Result<()> {
        self.engine.clear_cache()
    }

    fn replace_strings(&self, mut output: String) -> String {
        for (search, replace) in &self.config.tpl_replace_string {
            if output.contains(search.as_str()) {
                output = output.replace(search.as_str(), replace);
            }
        }
        output
    }
}

#[cfg(feature = "minijinja-engine")]
impl ViewDriver<crate::views::MiniJinjaEngine> {
    /// Driver backed by the bundled MiniJinja engine
    pub fn minijinja(app: AppPaths, config: ViewConfig) -> Result<Self> {
        Self::new(app, config, crate::views::MiniJinjaEngine::new())
    }
}

fn apply_settings<E: TemplateEngine>(
    engine: &mut E,
    app: &AppPaths,
    config: &ViewConfig,
) -> Result<()> {
    engine.set_delimiters(&config.tpl_begin, &config.tpl_end)?;
    engine.set_caching(config.tpl_cache);
    engine.set_force_compile(!config.tpl_cache);
    engine.set_cache_lifetime(Duration::from_secs(config.cache_lifetime));
    engine.set_template_dir(Path::new(&config.view_dir_name));
    engine.set_cache_dir(&app.cache_dir());
    engine.set_compile_dir(&app.compile_dir());
    Ok(())
}

fn has_extension(template: &str) -> bool {
    Path::new(template).extension().is_some()
}

fn json_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "an array",
        Value::Object(_) => "an object",
    }
}
