//! Layered settings loading against a temporary working directory.
//!
//! The global layer and `NAVTREE__*` variables are shut out by
//! `isolate_config_env`.

use std::fs;

use rstest::{fixture, rstest};
use tempfile::TempDir;

use navtree::config::{local_config_path, Settings};
use navtree::domain::FieldKind;
use navtree::util::testing;

#[fixture]
fn workdir() -> TempDir {
    testing::init_test_setup();
    testing::isolate_config_env();
    TempDir::new().expect("temp dir")
}

fn write_local(dir: &TempDir, content: &str) {
    fs::write(local_config_path(dir.path()), content).expect("write local config");
}

#[test]
#[cfg(target_os = "linux")]
fn given_isolated_env_when_resolving_global_path_then_it_is_inside_private_dir() {
    testing::init_test_setup();
    let private = testing::isolate_config_env();

    let global = navtree::config::global_config_path().unwrap();

    assert!(global.starts_with(&private), "{}", global.display());
    assert!(!global.exists());
}

#[rstest]
fn given_no_local_config_when_loading_then_defaults(workdir: TempDir) {
    let settings = Settings::load(Some(workdir.path())).unwrap();

    assert_eq!(settings, Settings::default());
    assert_eq!(settings.form.type_options, vec!["page".to_string()]);
    assert_eq!(settings.output.indent(), Some(2));
}

#[rstest]
fn given_local_type_options_when_loading_then_union_with_negation(workdir: TempDir) {
    // Arrange
    write_local(
        &workdir,
        r#"
[form]
type_options = ["link", "section", "!page"]
default_type = "link"
"#,
    );

    // Act
    let settings = Settings::load(Some(workdir.path())).unwrap();

    // Assert
    assert_eq!(settings.form.type_options, vec!["link", "section"]);
    assert_eq!(settings.form.default_type.as_deref(), Some("link"));
    let spec = settings.form.form_spec();
    match &spec.field("type").unwrap().kind {
        FieldKind::SingleOption { options } => assert_eq!(options, &vec!["link", "section"]),
        other => panic!("expected single option, got {:?}", other),
    }
}

#[rstest]
fn given_local_output_and_value_file_when_loading_then_overrides_apply(workdir: TempDir) {
    write_local(
        &workdir,
        r#"
value_file = "nav.json"

[output]
pretty = false
"#,
    );

    let settings = Settings::load(Some(workdir.path())).unwrap();

    assert_eq!(settings.value_file.as_deref(), Some(std::path::Path::new("nav.json")));
    assert_eq!(settings.output.indent(), None);
}

#[rstest]
fn given_malformed_local_config_when_loading_then_config_error(workdir: TempDir) {
    write_local(&workdir, "[form\ntype_options = 3");

    let err = Settings::load(Some(workdir.path())).unwrap_err();

    assert!(err.to_string().contains(".navtree.toml"), "{}", err);
}
