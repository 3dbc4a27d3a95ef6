//! Template reference to file path resolution
//!
//! A template reference takes one of these forms:
//!
//! | Reference          | Resolves to                                           |
//! |--------------------|-------------------------------------------------------|
//! | `""`               | `<root>/<controller>/<action>.<suffix>`               |
//! | `"edit"`           | `<root>/<controller>/edit.<suffix>`                   |
//! | `"user/edit"`      | `<root>/user/edit.<suffix>`                           |
//! | `"/public/header"` | `<root>/public/header.<suffix>`                       |
//! | `"admin@user/edit"`| `<app_path>/admin/<view_dir_name>/user/edit.<suffix>` |
//!
//! `<root>` is `<root_path>/<view_dir_name>/` when that directory exists,
//! otherwise `<base_path>/<view_dir_name>/`.

use crate::app::{AppPaths, RequestContext};
use crate::config::{AutoRule, ViewConfig};
use crate::error::{Error, Result};
use crate::utils::{to_snake_case, to_snake_case_last_segment};
use std::path::{PathBuf, MAIN_SEPARATOR};

/// Maps template references onto view files
#[derive(Debug, Clone, Copy)]
pub struct PathResolver<'a> {
    config: &'a ViewConfig,
    paths: &'a AppPaths,
}

impl<'a> PathResolver<'a> {
    pub fn new(config: &'a ViewConfig, paths: &'a AppPaths) -> Self {
        Self { config, paths }
    }

    /// Resolve a template reference to the view file it names
    ///
    /// Only the view root directory is checked for existence here; the
    /// returned file may still be missing.
    pub fn resolve(&self, template: &str, request: &dyn RequestContext) -> Result<PathBuf> {
        self.resolve_with_root(template, request).map(|(_, path)| path)
    }

    /// Like [`resolve`](Self::resolve), also returning the view root used
    pub fn resolve_with_root(
        &self,
        template: &str,
        request: &dyn RequestContext,
    ) -> Result<(PathBuf, PathBuf)> {
        let (module, template) = split_module(template);
        let root = self.view_root(module)?;
        let relative = self.relative_name(template, request);

        let file_name = format!(
            "{}.{}",
            relative.trim_start_matches('/'),
            self.config.suffix()
        );
        let path = root.join(file_name);

        log::trace!("Resolved template '{}' to {}", template, path.display());
        Ok((root, path))
    }

    /// Locate the view root for an optional module
    pub fn view_root(&self, module: Option<&str>) -> Result<PathBuf> {
        let view_dir = &self.config.view_dir_name;

        if let Some(module) = module {
            let module_root = self.paths.app_path.join(module).join(view_dir);
            if module_root.is_dir() {
                return Ok(module_root);
            }
            return Err(Error::template_not_found(module_root));
        }

        let single_app = self.paths.root_path.join(view_dir);
        if single_app.is_dir() {
            return Ok(single_app);
        }

        let multi_app = self.paths.base_path.join(view_dir);
        if multi_app.is_dir() {
            return Ok(multi_app);
        }

        Err(Error::template_not_found(single_app))
    }

    /// Template name relative to the view root, without suffix
    ///
    /// `template` must already have any `module@` prefix removed.
    pub fn relative_name(&self, template: &str, request: &dyn RequestContext) -> String {
        let depr = self.config.view_depr.as_str();

        if let Some(absolute) = template.strip_prefix('/') {
            return normalize_separators(absolute, depr);
        }

        let template = normalize_separators(template, depr);
        let controller = request.controller();
        if controller.is_empty() {
            return template;
        }

        let controller_dir =
            to_snake_case_last_segment(&controller).replace('.', &MAIN_SEPARATOR.to_string());

        if template.is_empty() {
            let action = self.action_name(request);
            format!("{}{}{}", controller_dir, depr, action)
        } else if !template.contains(depr) {
            format!("{}{}{}", controller_dir, depr, template)
        } else {
            template
        }
    }

    /// View file name for the current action under the configured rule
    pub fn action_name(&self, request: &dyn RequestContext) -> String {
        match self.config.auto_rule {
            AutoRule::Snake => to_snake_case(&request.action(false)),
            AutoRule::Lower => request.action(true),
            AutoRule::Action => request.action(false),
        }
    }
}

/// Split `module@template` on the first `@`
///
/// A leading `@` is not a module separator. Anything after a second `@`
/// is dropped, so `a@b@c` names template `b` in module `a`.
pub fn split_module(template: &str) -> (Option<&str>, &str) {
    match template.find('@') {
        Some(pos) if pos > 0 => {
            let rest = &template[pos + 1..];
            let name = rest.split('@').next().unwrap_or(rest);
            (Some(&template[..pos]), name)
        }
        _ => (None, template),
    }
}

fn normalize_separators(template: &str, depr: &str) -> String {
    template.replace(['/', ':'], depr)
}
