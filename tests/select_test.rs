//! Integration tests for the `select` command

mod common;

use common::TestProject;

#[test]
fn test_select_persists_the_flavor() {
    let project = TestProject::new();

    let output = project.run(&["select", "--flavor", "debug"]);
    assert!(
        output.status.success(),
        "select failed: {}",
        String::from_utf8_lossy(&output.stderr)
    );

    let config = project.read_file(".frosting.toml");
    assert!(config.contains("selection = \"debug\""));
    assert!(config.contains("flavors = [\"debug\"]"));
}

#[test]
fn test_select_reports_the_current_flavor() {
    let project = TestProject::new();
    assert!(project.run(&["select", "--flavor", "debug"]).status.success());

    let output = project.run(&["select"]);
    assert!(output.status.success());
    assert!(String::from_utf8_lossy(&output.stdout).contains("debug"));
}

#[test]
fn test_select_defaults_to_release() {
    let project = TestProject::new();

    let output = project.run(&["select"]);
    assert!(output.status.success());
    assert!(String::from_utf8_lossy(&output.stdout).contains("release"));
}

#[test]
fn test_select_accepts_any_case() {
    let project = TestProject::new();

    let output = project.run(&["select", "--flavor", "Debug"]);
    assert!(output.status.success());
    // The canonical lowercase name is what gets stored.
    assert!(project
        .read_file(".frosting.toml")
        .contains("selection = \"debug\""));
}

#[test]
fn test_select_rejects_unknown_flavors() {
    let project = TestProject::new();

    let output = project.run(&["select", "--flavor", "profiled"]);
    assert!(!output.status.success());
    assert!(String::from_utf8_lossy(&output.stderr).contains("Unknown flavor"));
    assert!(!project.file_exists(".frosting.toml"));
}

#[test]
fn test_select_preserves_config_comments() {
    let project = TestProject::new();
    project.create_file(
        ".frosting.toml",
        "# build settings for the team\nselection = \"release\"\n",
    );

    assert!(project.run(&["select", "--flavor", "debug"]).status.success());

    let config = project.read_file(".frosting.toml");
    assert!(config.contains("# build settings for the team"));
    assert!(config.contains("selection = \"debug\""));
}
