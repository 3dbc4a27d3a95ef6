use log::{LevelFilter, Log, Metadata, Record};
use rustf_view_driver::prelude::*;
use std::fs;
use std::sync::{Mutex, Once};
use tempfile::TempDir;

/// Logger that keeps every formatted message for inspection
struct CaptureLogger {
    messages: Mutex<Vec<String>>,
}

impl Log for CaptureLogger {
    fn enabled(&self, _metadata: &Metadata) -> bool {
        true
    }

    fn log(&self, record: &Record) {
        if let Ok(mut messages) = self.messages.lock() {
            messages.push(record.args().to_string());
        }
    }

    fn flush(&self) {}
}

static LOGGER: CaptureLogger = CaptureLogger {
    messages: Mutex::new(Vec::new()),
};
static INIT: Once = Once::new();

fn init_logger() {
    INIT.call_once(|| {
        log::set_logger(&LOGGER).unwrap();
        log::set_max_level(LevelFilter::Trace);
    });
}

fn messages_mentioning(needle: &str) -> Vec<String> {
    LOGGER
        .messages
        .lock()
        .unwrap()
        .iter()
        .filter(|message| message.contains(needle))
        .cloned()
        .collect()
}

fn render(debug: bool) -> (TempDir, String) {
    let temp_dir = TempDir::new().unwrap();
    let view = temp_dir.path().join("view/index/index.html");
    fs::create_dir_all(view.parent().unwrap()).unwrap();
    fs::write(&view, "{{ a }}{{ b }}").unwrap();

    let app = AppPaths::from_root(temp_dir.path()).with_debug(debug);
    let config = ViewConfig {
        view_depr: "/".to_string(),
        ..ViewConfig::default()
    };
    let mut driver = ViewDriver::minijinja(app, config).unwrap();
    let route = Route::new("index", "index");

    let html = driver
        .fetch("", &json!({ "a": 1, "b": 2 }), &route)
        .unwrap();
    assert_eq!(html, "12");

    (temp_dir, view.display().to_string())
}

#[test]
fn test_debug_render_logs_path_and_keys() {
    init_logger();
    let (_temp_dir, view) = render(true);

    let lines = messages_mentioning(&view);
    assert_eq!(lines.len(), 1, "got {:?}", lines);
    assert_eq!(lines[0], format!("[ VIEW ] {} [ [\"a\", \"b\"] ]", view));
}

#[test]
fn test_no_render_log_without_debug() {
    init_logger();
    let (_temp_dir, view) = render(false);

    assert!(messages_mentioning(&view).is_empty());
}
