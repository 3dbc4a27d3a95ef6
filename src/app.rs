//! Application and request context consumed by the view driver
//!
//! The driver never reaches into global state: directory layout comes from
//! [`AppPaths`] at construction time and the routed controller/action is
//! passed in with every render call through [`RequestContext`].

use std::path::{Path, PathBuf};

/// Directory layout of the running application
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AppPaths {
    /// Runtime directory; template caches live below it
    pub runtime_path: PathBuf,
    /// Single-application root (`<root>/<view_dir_name>/`)
    pub root_path: PathBuf,
    /// Multi-application root, used when the single-app view directory is absent
    pub base_path: PathBuf,
    /// Directory holding one sub-directory per module (`module@template`)
    pub app_path: PathBuf,
    /// Log every render when set
    pub debug: bool,
}

impl AppPaths {
    /// Conventional layout below a project root:
    /// `runtime/`, `app/` as base and module directory
    pub fn from_root<P: AsRef<Path>>(root: P) -> Self {
        let root = root.as_ref();
        Self {
            runtime_path: root.join("runtime"),
            root_path: root.to_path_buf(),
            base_path: root.join("app"),
            app_path: root.join("app"),
            debug: false,
        }
    }

    pub fn with_runtime_path<P: Into<PathBuf>>(mut self, path: P) -> Self {
        self.runtime_path = path.into();
        self
    }

    pub fn with_base_path<P: Into<PathBuf>>(mut self, path: P) -> Self {
        self.base_path = path.into();
        self
    }

    pub fn with_app_path<P: Into<PathBuf>>(mut self, path: P) -> Self {
        self.app_path = path.into();
        self
    }

    pub fn with_debug(mut self, debug: bool) -> Self {
        self.debug = debug;
        self
    }

    /// Rendered-output cache directory
    pub fn cache_dir(&self) -> PathBuf {
        self.runtime_path.join("tplcache")
    }

    /// Compiled-template directory
    pub fn compile_dir(&self) -> PathBuf {
        self.runtime_path.join("compilecache")
    }
}

/// Routing information for the request being rendered
pub trait RequestContext {
    /// Controller name, dotted when namespaced (`admin.UserProfile`)
    fn controller(&self) -> String;

    /// Action name; lowercased when `lowercase` is set
    fn action(&self, lowercase: bool) -> String;
}

/// Plain controller/action pair
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Route {
    pub controller: String,
    pub action: String,
}

impl Route {
    pub fn new(controller: impl Into<String>, action: impl Into<String>) -> Self {
        Self {
            controller: controller.into(),
            action: action.into(),
        }
    }
}

impl RequestContext for Route {
    fn controller(&self) -> String {
        self.controller.clone()
    }

    fn action(&self, lowercase: bool) -> String {
        if lowercase {
            self.action.to_lowercase()
        } else {
            self.action.clone()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_root_layout() {
        let paths = AppPaths::from_root("/srv/site");
        assert_eq!(paths.root_path, PathBuf::from("/srv/site"));
        assert_eq!(paths.base_path, PathBuf::from("/srv/site/app"));
        assert_eq!(paths.cache_dir(), PathBuf::from("/srv/site/runtime/tplcache"));
        assert_eq!(
            paths.compile_dir(),
            PathBuf::from("/srv/site/runtime/compilecache")
        );
        assert!(!paths.debug);
    }

    #[test]
    fn test_route_action_case() {
        let route = Route::new("blog.Post", "showList");
        assert_eq!(route.controller(), "blog.Post");
        assert_eq!(route.action(false), "showList");
        assert_eq!(route.action(true), "showlist");
    }
}
