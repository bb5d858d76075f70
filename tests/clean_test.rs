//! Integration tests for the `clean` command

mod common;

use common::{TestProject, SAMPLE_CMAKE_LISTS};

fn built_project() -> TestProject {
    let project = TestProject::new();
    project.create_file("CMakeLists.txt", SAMPLE_CMAKE_LISTS);
    project.install_tools();
    assert!(project.run(&["build"]).status.success());
    project
}

#[test]
fn test_clean_removes_the_build_directory() {
    let project = built_project();
    assert!(project.file_exists(".build/state.toml"));

    let output = project.run(&["clean"]);
    assert!(output.status.success());
    assert!(!project.file_exists(".build"));
    // Settings survive a clean.
    assert!(project.file_exists(".frosting.toml"));
}

#[test]
fn test_clean_without_a_build_directory_succeeds() {
    let project = TestProject::new();

    let output = project.run(&["clean"]);
    assert!(
        output.status.success(),
        "clean failed: {}",
        String::from_utf8_lossy(&output.stderr)
    );
}

#[test]
fn test_clean_forgets_all_recorded_state() {
    let project = built_project();
    assert!(project.run(&["clean"]).status.success());
    project.clear_calls();

    // Everything reruns from scratch.
    assert!(project.run(&["build"]).status.success());
    assert_eq!(project.calls().len(), 2);
}

#[test]
fn test_clean_respects_the_configured_build_directory() {
    let project = TestProject::new();
    project.create_file("CMakeLists.txt", SAMPLE_CMAKE_LISTS);
    project.create_file(".frosting.toml", "directory = \"out\"\n");
    project.install_tools();
    assert!(project.run(&["build"]).status.success());
    assert!(project.file_exists("out/state.toml"));

    assert!(project.run(&["clean"]).status.success());
    assert!(!project.file_exists("out"));
}
