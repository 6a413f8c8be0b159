//! Integration tests for Settings layered loading and the shared snapshot.
//!
//! Environment overrides are fed through an explicit source map so tests do
//! not depend on (or mutate) the process environment.

use std::collections::HashMap;
use std::fs;
use std::sync::Arc;

use rstest::rstest;
use tempfile::TempDir;

use boxtree::config::{env_source, RenderSettings, RenderStyle, Settings, SharedSettings};
use boxtree::BoxtreeError;

fn env(vars: &[(&str, &str)]) -> config::Environment {
    let map: HashMap<String, String> = vars
        .iter()
        .map(|(k, v)| (k.to_string(), v.to_string()))
        .collect();
    env_source().source(Some(map))
}

// ============================================================
// Settings::load_layers()
// ============================================================

#[rstest]
fn given_no_files_when_load_then_returns_defaults() {
    let settings = Settings::load_layers(None, None, env(&[])).expect("load settings");

    assert_eq!(settings, Settings::default());
    assert_eq!(settings.render.indent, "\t");
    assert_eq!(settings.render.style, RenderStyle::Plain);
}

#[rstest]
fn given_missing_files_when_load_then_skips_them() {
    let dir = TempDir::new().unwrap();
    let missing = dir.path().join("nope.toml");

    let settings =
        Settings::load_layers(Some(&missing), Some(&missing), env(&[])).expect("load settings");

    assert_eq!(settings, Settings::default());
}

#[rstest]
fn given_global_and_local_files_when_load_then_local_wins_per_field() {
    let dir = TempDir::new().unwrap();
    let global = dir.path().join("global.toml");
    let local = dir.path().join("local.toml");
    fs::write(
        &global,
        r#"
[render]
indent = "  "
style = "tree"
"#,
    )
    .unwrap();
    fs::write(
        &local,
        r#"
[render]
style = "plain"
"#,
    )
    .unwrap();

    let settings =
        Settings::load_layers(Some(&global), Some(&local), env(&[])).expect("load settings");

    assert_eq!(settings.render.indent, "  ", "indent inherited from global");
    assert_eq!(settings.render.style, RenderStyle::Plain, "style from local");
}

#[rstest]
fn given_env_overrides_when_load_then_env_replaces_file_values() {
    let dir = TempDir::new().unwrap();
    let local = dir.path().join("local.toml");
    fs::write(&local, "[render]\nindent = \"  \"\n").unwrap();

    let settings = Settings::load_layers(
        None,
        Some(&local),
        env(&[
            ("BOXTREE_RENDER__INDENT", "--"),
            ("BOXTREE_RENDER__STYLE", "tree"),
            ("UNRELATED_RENDER__STYLE", "plain"),
        ]),
    )
    .expect("load settings");

    assert_eq!(settings.render.indent, "--");
    assert_eq!(settings.render.style, RenderStyle::Tree);
}

#[rstest]
fn given_invalid_env_style_when_load_then_returns_config_error() {
    let result = Settings::load_layers(None, None, env(&[("BOXTREE_RENDER__STYLE", "fancy")]));

    match result {
        Err(BoxtreeError::Config { message }) => assert!(message.contains("fancy")),
        other => panic!("expected config error, got {:?}", other),
    }
}

#[rstest]
fn given_malformed_toml_when_load_then_returns_config_error() {
    let dir = TempDir::new().unwrap();
    let local = dir.path().join("broken.toml");
    fs::write(&local, "[render\nindent = ").unwrap();

    let result = Settings::load_layers(None, Some(&local), env(&[]));

    assert!(matches!(result, Err(BoxtreeError::Config { .. })));
}

#[rstest]
fn given_local_file_when_load_with_process_env_then_applies_local_values() {
    let dir = TempDir::new().unwrap();
    let local = dir.path().join("boxtree.toml");
    fs::write(&local, "[render]\nindent = \"..\"\n").unwrap();

    let settings = Settings::load(Some(&local)).expect("load settings");

    if std::env::var("BOXTREE_RENDER__INDENT").is_err() {
        assert_eq!(settings.render.indent, "..");
    }
}

#[rstest]
fn given_loaded_settings_when_building_renderer_then_uses_them() {
    let settings = Settings {
        render: RenderSettings {
            indent: ">".to_string(),
            style: RenderStyle::Plain,
        },
    };

    let renderer = settings.renderer();

    assert_eq!(renderer.indent(), ">");
    assert_eq!(renderer.style(), RenderStyle::Plain);
}

// ============================================================
// SharedSettings
// ============================================================

#[rstest]
fn given_current_snapshot_when_replacing_then_new_settings_visible() {
    let shared = SharedSettings::new(Settings::default());
    let old = shared.snapshot();

    let mut next = (*old).clone();
    next.render.style = RenderStyle::Tree;

    assert!(shared.replace(&old, next));
    assert_eq!(shared.snapshot().render.style, RenderStyle::Tree);
    // Previously taken snapshots are immutable
    assert_eq!(old.render.style, RenderStyle::Plain);
}

#[rstest]
fn given_stale_snapshot_when_replacing_then_rejected() {
    let shared = SharedSettings::default();
    let stale = shared.snapshot();
    assert!(shared.replace(&stale, Settings::default()));

    let mut next = Settings::default();
    next.render.indent = "  ".to_string();

    assert!(!shared.replace(&stale, next));
    assert_eq!(shared.snapshot().render.indent, "\t");
    assert!(!Arc::ptr_eq(&stale, &shared.snapshot()));
}
