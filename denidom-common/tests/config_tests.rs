//! Configuration resolution tests
//!
//! Priority: CLI > ENV > TOML > OS default. Tests touching DENIDOM_* variables
//! are #[serial] so they never observe each other's environment.

use denidom_common::config::{
    load_toml_config, resolve_root_folder, ServiceConfig, TomlConfig, DEFAULT_BIND_ADDRESS,
    ENV_AI_API_KEY, ENV_BIND_ADDRESS, ENV_JWT_SECRET, ENV_ROOT_FOLDER,
};
use serial_test::serial;
use std::env;
use std::io::Write;
use std::path::PathBuf;

fn clear_env() {
    env::remove_var(ENV_ROOT_FOLDER);
    env::remove_var(ENV_BIND_ADDRESS);
    env::remove_var(ENV_JWT_SECRET);
    env::remove_var(ENV_AI_API_KEY);
}

#[test]
#[serial]
fn test_cli_overrides_everything() {
    clear_env();
    env::set_var(ENV_ROOT_FOLDER, "/env/path");
    let toml = TomlConfig {
        root_folder: Some(PathBuf::from("/toml/path")),
        ..Default::default()
    };

    assert_eq!(
        resolve_root_folder(Some("/cli/path"), &toml),
        PathBuf::from("/cli/path")
    );
    clear_env();
}

#[test]
#[serial]
fn test_env_overrides_toml() {
    clear_env();
    env::set_var(ENV_ROOT_FOLDER, "/env/path");
    let toml = TomlConfig {
        root_folder: Some(PathBuf::from("/toml/path")),
        ..Default::default()
    };

    assert_eq!(resolve_root_folder(None, &toml), PathBuf::from("/env/path"));
    clear_env();
}

#[test]
#[serial]
fn test_empty_env_is_ignored() {
    clear_env();
    env::set_var(ENV_ROOT_FOLDER, "  ");
    let toml = TomlConfig {
        root_folder: Some(PathBuf::from("/toml/path")),
        ..Default::default()
    };

    assert_eq!(resolve_root_folder(None, &toml), PathBuf::from("/toml/path"));
    clear_env();
}

#[test]
#[serial]
fn test_defaults_without_sources() {
    clear_env();
    let config = ServiceConfig::from_sources(None, None, &TomlConfig::default());

    assert_eq!(config.bind_address, DEFAULT_BIND_ADDRESS);
    assert_eq!(config.token_ttl_hours, 24);
    assert!(config.jwt_secret.is_none());
    assert!(config.ai.api_key.is_none());
    assert_eq!(config.logging.level, "info");
    assert!(config.database_path().ends_with("denidom.db"));
}

#[test]
#[serial]
fn test_env_supplies_secrets() {
    clear_env();
    env::set_var(ENV_JWT_SECRET, "from-env");
    env::set_var(ENV_AI_API_KEY, "ai-key");
    env::set_var(ENV_BIND_ADDRESS, "0.0.0.0:9000");

    let config = ServiceConfig::from_sources(None, None, &TomlConfig::default());
    assert_eq!(config.jwt_secret.as_deref(), Some("from-env"));
    assert_eq!(config.ai.api_key.as_deref(), Some("ai-key"));
    assert_eq!(config.bind_address, "0.0.0.0:9000");

    let config = ServiceConfig::from_sources(None, Some("127.0.0.1:1"), &TomlConfig::default());
    assert_eq!(config.bind_address, "127.0.0.1:1");
    clear_env();
}

#[test]
#[serial]
fn test_toml_file_parsing() {
    clear_env();
    let mut file = tempfile::NamedTempFile::new().unwrap();
    writeln!(
        file,
        r#"
root_folder = "/srv/denidom"
bind_address = "0.0.0.0:8080"
token_ttl_hours = 8

[logging]
level = "debug"

[ai]
model = "gemini-pro"
timeout_secs = 10
"#
    )
    .unwrap();

    let toml = load_toml_config(file.path()).unwrap();
    assert_eq!(toml.root_folder, Some(PathBuf::from("/srv/denidom")));
    assert_eq!(toml.logging.level, "debug");
    assert_eq!(toml.ai.model, "gemini-pro");
    assert_eq!(toml.ai.timeout_secs, 10);
    assert!(toml.ai.endpoint.starts_with("https://"));

    let config = ServiceConfig::from_sources(None, None, &toml);
    assert_eq!(config.root_folder, PathBuf::from("/srv/denidom"));
    assert_eq!(config.bind_address, "0.0.0.0:8080");
    assert_eq!(config.token_ttl_hours, 8);
}

#[test]
fn test_toml_parse_error_reported() {
    let mut file = tempfile::NamedTempFile::new().unwrap();
    writeln!(file, "root_folder = [not valid").unwrap();
    assert!(load_toml_config(file.path()).is_err());
}

#[test]
fn test_missing_toml_reported() {
    assert!(load_toml_config(std::path::Path::new("/nonexistent/denidom.toml")).is_err());
}

#[test]
#[serial]
fn test_ensure_root_folder_creates_directory() {
    clear_env();
    let dir = tempfile::TempDir::new().unwrap();
    let root = dir.path().join("data");
    let root_str = root.to_string_lossy().to_string();

    let config = ServiceConfig::from_sources(Some(&root_str), None, &TomlConfig::default());
    config.ensure_root_folder().unwrap();
    assert!(root.is_dir());
}
