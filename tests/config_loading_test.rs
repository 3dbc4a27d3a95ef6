use rustf_view_driver::{AutoRule, ViewConfig};
use std::fs;
use tempfile::TempDir;

#[test]
fn test_load_defaults_without_files() {
    let temp_dir = TempDir::new().unwrap();
    let config = ViewConfig::load_with_base_dir(temp_dir.path()).unwrap();
    assert_eq!(config.view_dir_name, "view");
    assert_eq!(config.auto_rule, AutoRule::Snake);
}

#[test]
fn test_environment_file_overrides_base() {
    let temp_dir = TempDir::new().unwrap();
    fs::write(
        temp_dir.path().join("view.toml"),
        r#"
auto_rule = 2
view_dir_name = "templates"

[tpl_replace_string]
"__STATIC__" = "/static"
"#,
    )
    .unwrap();

    let env_name = ViewConfig::detect_environment();
    fs::write(
        temp_dir.path().join(format!("view.{}.toml", env_name)),
        r#"
tpl_cache = false

[tpl_replace_string]
"__CDN__" = "https://cdn.example.com"
"#,
    )
    .unwrap();

    let config = ViewConfig::load_with_base_dir(temp_dir.path()).unwrap();
    assert_eq!(config.auto_rule, AutoRule::Lower);
    assert_eq!(config.view_dir_name, "templates");
    assert!(!config.tpl_cache);
    assert_eq!(config.tpl_replace_string.len(), 2);
    assert_eq!(
        config.tpl_replace_string.get("__STATIC__").map(String::as_str),
        Some("/static")
    );
}

#[test]
fn test_invalid_file_rejected() {
    let temp_dir = TempDir::new().unwrap();
    fs::write(temp_dir.path().join("view.toml"), "auto_rule = 7\n").unwrap();

    assert!(ViewConfig::load_with_base_dir(temp_dir.path()).is_err());
}
