//! Commands run end to end against temporary nav files.

use std::fs;
use std::path::PathBuf;

use clap::Parser;
use rstest::{fixture, rstest};
use serde_json::{json, Value};
use tempfile::TempDir;

use navtree::cli::{execute_command, Cli, CliError};
use navtree::exitcode;
use navtree::util::testing;

struct Workspace {
    _dir: TempDir,
    nav: PathBuf,
}

impl Workspace {
    fn run(&self, args: &[&str]) -> Result<(), CliError> {
        let nav = self.nav.to_string_lossy().into_owned();
        let mut argv = vec!["navtree", "-f", nav.as_str()];
        argv.extend_from_slice(args);
        execute_command(&Cli::parse_from(argv))
    }

    fn value(&self) -> Value {
        serde_json::from_str(&fs::read_to_string(&self.nav).unwrap()).unwrap()
    }

    fn write_script(&self, content: &str) -> PathBuf {
        let path = self.nav.with_file_name("reorder.drag");
        fs::write(&path, content).unwrap();
        path
    }
}

#[fixture]
fn workspace() -> Workspace {
    testing::init_test_setup();
    testing::isolate_config_env();
    let dir = TempDir::new().unwrap();
    let nav = dir.path().join("nav.json");
    fs::write(
        &nav,
        r#"[{"label":"Home","slug":"/","type":"page"},{"label":"About","slug":"/about","type":"page"}]"#,
    )
    .unwrap();
    Workspace { _dir: dir, nav }
}

fn labels(value: &Value) -> Vec<&str> {
    value
        .as_array()
        .unwrap()
        .iter()
        .map(|n| n["label"].as_str().unwrap())
        .collect()
}

#[rstest]
fn given_nav_file_when_add_in_place_then_node_appended(workspace: Workspace) {
    // Act
    workspace
        .run(&["add", "-l", "Blog", "-s", "/blog", "-t", "page", "-i"])
        .unwrap();

    // Assert
    assert_eq!(
        workspace.value()[2],
        json!({"label": "Blog", "slug": "/blog", "type": "page"})
    );
}

#[rstest]
fn given_nav_file_when_add_and_move_then_order_is_about_blog_home(workspace: Workspace) {
    workspace.run(&["add", "-l", "Blog", "-i"]).unwrap();

    workspace.run(&["move", "0", "-n", "2", "-i"]).unwrap();

    assert_eq!(labels(&workspace.value()), vec!["About", "Blog", "Home"]);
}

#[rstest]
fn given_nav_file_when_adding_under_node_then_children_key_appears(workspace: Workspace) {
    workspace.run(&["add", "-l", "Team", "-p", "1", "-i"]).unwrap();

    let value = workspace.value();
    assert_eq!(value[1]["children"], json!([{"label": "Team"}]));
    assert!(value[0].get("children").is_none());
}

#[rstest]
fn given_unknown_type_when_adding_then_data_error_and_file_untouched(workspace: Workspace) {
    let before = fs::read_to_string(&workspace.nav).unwrap();

    let err = workspace
        .run(&["add", "-l", "X", "-t", "nonsense", "-i"])
        .unwrap_err();

    assert_eq!(err.exit_code(), exitcode::DATAERR);
    assert_eq!(fs::read_to_string(&workspace.nav).unwrap(), before);
}

#[rstest]
fn given_move_into_own_subtree_when_run_then_data_error(workspace: Workspace) {
    workspace.run(&["add", "-l", "Team", "-p", "0", "-i"]).unwrap();

    let err = workspace.run(&["move", "0", "-p", "0.0", "-n", "0"]).unwrap_err();

    assert_eq!(err.exit_code(), exitcode::DATAERR);
}

#[rstest]
#[case::missing_node(&["move", "5", "-n", "0"])]
#[case::bad_parent(&["add", "-l", "X", "-p", "0.9"])]
fn given_bad_node_path_when_run_then_usage_error(workspace: Workspace, #[case] args: &[&str]) {
    let err = workspace.run(args).unwrap_err();

    assert_eq!(err.exit_code(), exitcode::USAGE);
}

#[rstest]
fn given_drag_script_when_replayed_in_place_then_drop_is_persisted(workspace: Workspace) {
    let script = workspace.write_script("# home to the end\npress 0\nstart 0\nenter node 1\nend\n");

    let script = script.to_string_lossy().into_owned();

    workspace.run(&["drag", "-x", script.as_str(), "-i"]).unwrap();

    assert_eq!(labels(&workspace.value()), vec!["About", "Home"]);
}

#[rstest]
fn given_cancelled_drag_when_replayed_then_file_unchanged(workspace: Workspace) {
    let before = workspace.value();
    let script = workspace.write_script("press 0\nstart 0\nenter node 1\ncancel\n");

    let script = script.to_string_lossy().into_owned();

    workspace.run(&["drag", "-x", script.as_str(), "-i"]).unwrap();

    assert_eq!(workspace.value(), before);
}

#[rstest]
fn given_conforming_file_when_checked_then_ok(workspace: Workspace) {
    workspace.run(&["check"]).unwrap();
}

#[rstest]
fn given_empty_children_list_when_checked_then_check_fails(workspace: Workspace) {
    fs::write(&workspace.nav, r#"[{"label":"A","children":[]}]"#).unwrap();

    let err = workspace.run(&["check"]).unwrap_err();

    assert_eq!(err.exit_code(), exitcode::CHECK_FAILED);
}

#[rstest]
fn given_type_outside_options_when_checked_then_data_error(workspace: Workspace) {
    fs::write(&workspace.nav, r#"[{"label":"A","type":"folder"}]"#).unwrap();

    let err = workspace.run(&["check"]).unwrap_err();

    assert_eq!(err.exit_code(), exitcode::DATAERR);
}

#[rstest]
fn given_compact_file_when_formatted_in_place_then_pretty_printed(workspace: Workspace) {
    workspace.run(&["fmt", "-i"]).unwrap();

    let content = fs::read_to_string(&workspace.nav).unwrap();
    assert!(content.starts_with("[\n  {\n    \"label\": \"Home\""), "{}", content);
    assert_eq!(labels(&workspace.value()), vec!["Home", "About"]);
}

#[test]
fn given_missing_file_when_show_then_no_input() {
    testing::init_test_setup();
    testing::isolate_config_env();
    let dir = TempDir::new().unwrap();
    let missing = dir.path().join("absent.json");
    let file = missing.to_string_lossy().into_owned();
    let cli = Cli::parse_from(["navtree", "-f", file.as_str(), "show"]);

    let err = execute_command(&cli).unwrap_err();

    assert_eq!(err.exit_code(), exitcode::NOINPUT);
    assert!(!missing.exists());
}
