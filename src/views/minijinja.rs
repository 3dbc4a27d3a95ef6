//! MiniJinja-backed template engine
//!
//! Compiled templates are kept in the MiniJinja environment and dropped when
//! any file the loader read (layouts and includes too) changes on disk.
//! Rendered output can additionally be cached on disk, keyed by template path
//! and assigned variables, together with the files it was rendered from.

use crate::error::{Error, Result};
use crate::views::TemplateEngine;
use minijinja::syntax::SyntaxConfig;
use minijinja::{Environment, ErrorKind};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use sha2::{Digest, Sha256};
use std::collections::HashMap;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex, MutexGuard};
use std::time::{Duration, SystemTime};

/// Files read by the loader, with their state at load time
type LoadedFiles = Arc<Mutex<HashMap<PathBuf, FileStamp>>>;

/// Modification time and size of a template file
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
struct FileStamp {
    modified: Option<SystemTime>,
    len: u64,
}

impl FileStamp {
    fn of(path: &Path) -> Option<Self> {
        let metadata = fs::metadata(path).ok()?;
        Some(Self {
            modified: metadata.modified().ok(),
            len: metadata.len(),
        })
    }

    fn is_current(&self, path: &Path) -> bool {
        Self::of(path).as_ref() == Some(self)
    }
}

/// On-disk output cache entry
#[derive(Debug, Serialize, Deserialize)]
struct CachedOutput {
    dependencies: Vec<(PathBuf, FileStamp)>,
    output: String,
}

fn lock(loaded: &LoadedFiles) -> MutexGuard<'_, HashMap<PathBuf, FileStamp>> {
    loaded.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
}

/// Template engine built on a MiniJinja [`Environment`]
pub struct MiniJinjaEngine {
    env: Environment<'static>,
    template_dir: PathBuf,
    cache_dir: Option<PathBuf>,
    compile_dir: Option<PathBuf>,
    caching: bool,
    force_compile: bool,
    cache_lifetime: Duration,
    assigned: Map<String, Value>,
    loaded: LoadedFiles,
}

impl Default for MiniJinjaEngine {
    fn default() -> Self {
        Self::new()
    }
}

impl MiniJinjaEngine {
    pub fn new() -> Self {
        let mut engine = Self {
            env: Environment::new(),
            template_dir: PathBuf::from("view"),
            cache_dir: None,
            compile_dir: None,
            caching: false,
            force_compile: false,
            cache_lifetime: Duration::from_secs(3600),
            assigned: Map::new(),
            loaded: Arc::new(Mutex::new(HashMap::new())),
        };
        engine.install_loader();
        engine
    }

    /// Underlying environment, for registering filters, functions or globals
    pub fn environment_mut(&mut self) -> &mut Environment<'static> {
        &mut self.env
    }

    pub fn template_dir(&self) -> &Path {
        &self.template_dir
    }

    pub fn assigned(&self) -> &Map<String, Value> {
        &self.assigned
    }

    fn install_loader(&mut self) {
        let base_dir = self.template_dir.clone();
        let loaded = Arc::clone(&self.loaded);
        self.env.set_loader(move |name: &str| {
            let path = Path::new(name);
            let path = if path.is_absolute() {
                path.to_path_buf()
            } else {
                base_dir.join(path)
            };

            let stamp = FileStamp::of(&path);
            match fs::read_to_string(&path) {
                Ok(source) => {
                    if let Some(stamp) = stamp {
                        lock(&loaded).insert(path, stamp);
                    }
                    Ok(Some(source))
                }
                Err(err) if err.kind() == io::ErrorKind::NotFound => Ok(None),
                Err(err) => Err(minijinja::Error::new(
                    ErrorKind::InvalidOperation,
                    format!("could not read template {}", path.display()),
                )
                .with_source(err)),
            }
        });
    }

    fn drop_compiled(&mut self) {
        self.env.clear_templates();
        lock(&self.loaded).clear();
    }

    /// Drop compiled templates when forced or when any loaded file changed
    fn refresh_compiled(&mut self) {
        if self.force_compile {
            self.drop_compiled();
            return;
        }

        let changed = lock(&self.loaded)
            .iter()
            .find(|(path, stamp)| !stamp.is_current(path))
            .map(|(path, _)| path.clone());
        if let Some(path) = changed {
            log::debug!("Template changed on disk, recompiling: {}", path.display());
            self.drop_compiled();
        }
    }

    fn render(&mut self, path: &Path) -> Result<String> {
        self.refresh_compiled();

        let name = path.to_string_lossy().to_string();
        let context = minijinja::Value::from_serialize(&self.assigned);
        let output = {
            let template = self.env.get_template(&name)?;
            template.render(context)?
        };

        if let Some(compile_dir) = &self.compile_dir {
            fs::create_dir_all(compile_dir)?;
        }

        Ok(output)
    }

    fn cache_file(&self, cache_dir: &Path, path: &Path) -> Result<PathBuf> {
        let mut hasher = Sha256::new();
        hasher.update(path.to_string_lossy().as_bytes());
        hasher.update([0u8]);
        hasher.update(serde_json::to_vec(&self.assigned)?);
        Ok(cache_dir.join(format!("{:x}.cache", hasher.finalize())))
    }

    /// Cached output if it is younger than the lifetime and no file it was
    /// rendered from has changed
    fn read_cached(&self, cache_file: &Path) -> Option<String> {
        let cached_at = fs::metadata(cache_file).and_then(|m| m.modified()).ok()?;

        let age = SystemTime::now().duration_since(cached_at).unwrap_or_default();
        if age > self.cache_lifetime {
            return None;
        }

        let content = fs::read_to_string(cache_file).ok()?;
        let entry: CachedOutput = match serde_json::from_str(&content) {
            Ok(entry) => entry,
            Err(e) => {
                log::warn!("Ignoring unreadable cache entry {}: {}", cache_file.display(), e);
                return None;
            }
        };

        let fresh = entry
            .dependencies
            .iter()
            .all(|(path, stamp)| stamp.is_current(path));
        fresh.then_some(entry.output)
    }

    /// Write rendered output along with every file compiled so far
    fn write_cached(&self, cache_dir: &Path, cache_file: &Path, output: &str) -> Result<()> {
        let dependencies = lock(&self.loaded)
            .iter()
            .map(|(path, stamp)| (path.clone(), *stamp))
            .collect();
        let entry = CachedOutput {
            dependencies,
            output: output.to_string(),
        };

        fs::create_dir_all(cache_dir)?;
        fs::write(cache_file, serde_json::to_vec(&entry)?)?;
        Ok(())
    }
}

impl TemplateEngine for MiniJinjaEngine {
    fn set_delimiters(&mut self, begin: &str, end: &str) -> Result<()> {
        let syntax = SyntaxConfig::builder()
            .variable_delimiters(begin.to_string(), end.to_string())
            .build()
            .map_err(|e| Error::config(format!("Invalid template delimiters: {}", e)))?;
        self.env.set_syntax(syntax);
        self.drop_compiled();
        Ok(())
    }

    fn set_caching(&mut self, enabled: bool) {
        self.caching = enabled;
    }

    fn set_force_compile(&mut self, force: bool) {
        self.force_compile = force;
    }

    fn set_cache_lifetime(&mut self, lifetime: Duration) {
        self.cache_lifetime = lifetime;
    }

    fn set_template_dir(&mut self, dir: &Path) {
        if self.template_dir == dir {
            return;
        }
        self.template_dir = dir.to_path_buf();
        self.install_loader();
        // Relative includes may now point at different files
        self.drop_compiled();
    }

    fn set_cache_dir(&mut self, dir: &Path) {
        self.cache_dir = Some(dir.to_path_buf());
    }

    fn set_compile_dir(&mut self, dir: &Path) {
        self.compile_dir = Some(dir.to_path_buf());
    }

    fn assign(&mut self, data: &Map<String, Value>) {
        for (key, value) in data {
            self.assigned.insert(key.clone(), value.clone());
        }
    }

    fn clear_assign(&mut self) {
        self.assigned.clear();
    }

    fn fetch(&mut self, path: &Path) -> Result<String> {
        let cache_dir = match (&self.cache_dir, self.caching) {
            (Some(dir), true) => dir.clone(),
            _ => return self.render(path),
        };

        let cache_file = self.cache_file(&cache_dir, path)?;
        if let Some(output) = self.read_cached(&cache_file) {
            log::trace!("Serving cached output for {}", path.display());
            return Ok(output);
        }

        let output = self.render(path)?;
        self.write_cached(&cache_dir, &cache_file, &output)?;
        Ok(output)
    }

    fn clear_cache(&mut self) -> Result<()> {
        self.drop_compiled();

        for dir in [&self.cache_dir, &self.compile_dir].into_iter().flatten() {
            if dir.is_dir() {
                for entry in fs::read_dir(dir)? {
                    let entry = entry?;
                    if entry.file_type()?.is_file() {
                        fs::remove_file(entry.path())?;
                    }
                }
            }
        }
        Ok(())
    }
}
