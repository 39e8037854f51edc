use super::helpers::{TestTree, Whence};

fn stdout(output: &std::process::Output) -> String {
    String::from_utf8_lossy(&output.stdout).to_string()
}

fn stderr(output: &std::process::Output) -> String {
    String::from_utf8_lossy(&output.stderr).to_string()
}

#[test]
fn test_new_non_free_file_could_be_added() {
    let tree = TestTree::new();
    tree.write_defines(&["misc-nonfree"], &[]);
    let manifest = Whence::new()
        .section("foo", "Redistributable", &["foo.bin"])
        .build();
    tree.write_upstream("WHENCE", &manifest);
    tree.write_upstream("foo.bin", "firmware");

    let output = tree.run_checker(&[]);

    assert!(output.status.success(), "stderr: {}", stderr(&output));
    assert_eq!(stdout(&output), "foo.bin: could be added\n");
}

#[test]
fn test_changed_non_free_file() {
    let tree = TestTree::new();
    tree.write_defines(&["misc-nonfree"], &[]);
    let manifest = Whence::new()
        .section("foo", "Redistributable", &["foo.bin"])
        .build();
    tree.write_upstream("WHENCE", &manifest);
    tree.write_upstream("foo.bin", "firmware v2");
    tree.write_packaging("misc-nonfree/foo.bin", "firmware");

    let output = tree.run_checker(&[]);

    assert!(output.status.success(), "stderr: {}", stderr(&output));
    assert_eq!(stdout(&output), "foo.bin: changed\n");
}

#[test]
fn test_unchanged_and_free_files_are_silent() {
    let tree = TestTree::new();
    tree.write_defines(&["misc-nonfree"], &[]);
    tree.write_upstream(
        "WHENCE",
        &Whence::new()
            .section("foo", "Redistributable", &["foo.bin"])
            .section("bar", "Proprietary. All rights reserved.", &["bar.bin"])
            .build(),
    );
    tree.write_upstream("foo.bin", "firmware");
    tree.write_upstream("bar.bin", "firmware");
    tree.write_packaging("misc-nonfree/foo.bin", "firmware");

    let output = tree.run_checker(&[]);

    assert!(output.status.success(), "stderr: {}", stderr(&output));
    assert_eq!(stdout(&output), "");
}

#[test]
fn test_excluded_file_is_never_reported() {
    let tree = TestTree::new();
    tree.write_defines(&["misc-nonfree"], &["foo.*"]);
    let manifest = Whence::new()
        .section("foo", "Redistributable", &["foo.bin"])
        .build();
    tree.write_upstream("WHENCE", &manifest);
    tree.write_upstream("foo.bin", "firmware v2");
    tree.write_packaging("misc-nonfree/foo.bin", "firmware");

    let output = tree.run_checker(&[]);

    assert!(output.status.success(), "stderr: {}", stderr(&output));
    assert_eq!(stdout(&output), "");
}

#[test]
fn test_output_is_repeatable() {
    let tree = TestTree::new();
    tree.write_defines(&["amd-graphics", "misc-nonfree"], &[]);
    tree.write_upstream(
        "WHENCE",
        &Whence::new()
            .section("foo", "Redistributable", &["foo/a.bin", "foo/b.bin"])
            .section("baz", "Distributable", &["baz.fw"])
            .build(),
    );
    tree.write_upstream("foo/a.bin", "a");
    tree.write_upstream("foo/b.bin", "b v2");
    tree.write_upstream("baz.fw", "baz");
    tree.write_packaging("misc-nonfree/foo/b.bin", "b");

    let first = tree.run_checker(&[]);
    let second = tree.run_checker(&[]);

    assert_eq!(
        stdout(&first),
        "foo/a.bin: could be added\nfoo/b.bin: changed\nbaz.fw: could be added\n"
    );
    assert_eq!(first.stdout, second.stdout);
}

#[test]
fn test_json_report() {
    let tree = TestTree::new();
    tree.write_defines(&["misc-nonfree"], &[]);
    let manifest = Whence::new()
        .section("foo", "Redistributable", &["foo.bin"])
        .build();
    tree.write_upstream("WHENCE", &manifest);
    tree.write_upstream("foo.bin", "firmware");

    let output = tree.run_checker(&["--format", "json"]);

    assert!(output.status.success(), "stderr: {}", stderr(&output));
    let report: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
    assert_eq!(report["kernel_version"], "6.6.0-1");
    assert_eq!(report["findings"][0]["name"], "foo.bin");
    assert_eq!(report["findings"][0]["status"], "could_be_added");
    assert_eq!(report["summary"]["could_be_added"], 1);
}

#[test]
fn test_output_file() {
    let tree = TestTree::new();
    tree.write_defines(&["misc-nonfree"], &[]);
    let manifest = Whence::new()
        .section("foo", "Redistributable", &["foo.bin"])
        .build();
    tree.write_upstream("WHENCE", &manifest);
    tree.write_upstream("foo.bin", "firmware");
    let report_path = tree.dir.path().join("report.txt");

    let output = tree.run_checker(&["--output", report_path.to_str().unwrap()]);

    assert!(output.status.success(), "stderr: {}", stderr(&output));
    assert_eq!(stdout(&output), "");
    assert_eq!(
        std::fs::read_to_string(report_path).unwrap(),
        "foo.bin: could be added\n"
    );
}

#[test]
fn test_packaging_root_option() {
    let tree = TestTree::new();
    tree.write_defines(&["misc-nonfree"], &[]);
    let manifest = Whence::new()
        .section("foo", "Redistributable", &["foo.bin"])
        .build();
    tree.write_upstream("WHENCE", &manifest);
    tree.write_upstream("foo.bin", "firmware");

    let output = std::process::Command::new(&tree.binary_path)
        .arg("-C")
        .arg(tree.packaging())
        .arg(tree.upstream())
        .current_dir(tree.dir.path())
        .output()
        .expect("Failed to run check-upstream");

    assert!(output.status.success(), "stderr: {}", stderr(&output));
    assert_eq!(stdout(&output), "foo.bin: could be added\n");
}
