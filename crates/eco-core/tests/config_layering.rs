//! Layering of global, repo-local and explicit config files

use ecosystem_core::config::{ConfigOverrides, REPO_CONFIG_FILE, resolve_config};
use ecosystem_core::home::config_dir;
use serde_json::json;
use std::fs;
use tempfile::TempDir;

fn write_global(home: &TempDir, contents: &str) {
    let dir = config_dir(home.path());
    fs::create_dir_all(&dir).unwrap();
    fs::write(dir.join("config.toml"), contents).unwrap();
}

fn repo(contents: Option<&str>) -> TempDir {
    let dir = TempDir::new().unwrap();
    fs::create_dir(dir.path().join(".git")).unwrap();
    if let Some(contents) = contents {
        fs::write(dir.path().join(REPO_CONFIG_FILE), contents).unwrap();
    }
    dir
}

#[test]
fn test_repo_section_replaces_global_section() {
    let home = TempDir::new().unwrap();
    write_global(
        &home,
        r#"
[plugins.echo]
greeting = "global"
loud = true

[plugins.audit]
module = "builtin.audit"
"#,
    );
    let repo = repo(Some(
        r#"
[plugins.echo]
module = "builtin.echo"
greeting = "repo"
"#,
    ));

    let config = resolve_config(&ConfigOverrides::default(), repo.path(), home.path()).unwrap();
    let sections = config.plugin_sections().unwrap();

    let names: Vec<&str> = sections.iter().map(|s| s.name.as_str()).collect();
    assert_eq!(names, vec!["audit", "echo"]);

    let echo = &sections[1];
    assert_eq!(echo.module, "builtin.echo");
    assert_eq!(echo.config.get("greeting"), Some(&json!("repo")));
    assert!(echo.config.get("loud").is_none());
}

#[test]
fn test_repo_config_found_from_subdirectory() {
    let home = TempDir::new().unwrap();
    let repo = repo(Some(
        r#"
[plugins.echo]
greeting = "nested"
"#,
    ));
    let nested = repo.path().join("src").join("deep");
    fs::create_dir_all(&nested).unwrap();

    let config = resolve_config(&ConfigOverrides::default(), &nested, home.path()).unwrap();

    assert!(config.plugin_config("echo").is_some());
}

#[test]
fn test_explicit_config_wins_and_must_parse() {
    let home = TempDir::new().unwrap();
    let repo = repo(Some(
        r#"
[plugins.echo]
greeting = "repo"
"#,
    ));

    let explicit = repo.path().join("override.toml");
    fs::write(
        &explicit,
        r#"
[plugins.echo]
greeting = "explicit"
"#,
    )
    .unwrap();
    let overrides = ConfigOverrides {
        config_path: Some(explicit.clone()),
        ..Default::default()
    };
    let config = resolve_config(&overrides, repo.path(), home.path()).unwrap();
    let section = &config.plugin_sections().unwrap()[0];
    assert_eq!(section.config.get("greeting"), Some(&json!("explicit")));

    fs::write(&explicit, "[plugins.echo\n").unwrap();
    assert!(resolve_config(&overrides, repo.path(), home.path()).is_err());
}

#[test]
fn test_malformed_repo_config_is_skipped() {
    let home = TempDir::new().unwrap();
    write_global(
        &home,
        r#"
[plugins.echo]
greeting = "global"
"#,
    );
    let repo = repo(Some("this is = = not toml"));

    let config = resolve_config(&ConfigOverrides::default(), repo.path(), home.path()).unwrap();
    let section = &config.plugin_sections().unwrap()[0];
    assert_eq!(section.config.get("greeting"), Some(&json!("global")));
}
