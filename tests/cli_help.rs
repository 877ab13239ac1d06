use assert_cmd::Command;

#[test]
fn help_lists_subcommands() {
    let mut cmd = Command::cargo_bin("radprof").unwrap();
    let assert = cmd.arg("--help").assert().success();
    let out = String::from_utf8(assert.get_output().stdout.clone()).unwrap();
    assert!(out.contains("run"));
    assert!(out.contains("analyze"));
    assert!(out.contains("scenes"));
}

#[test]
fn run_help_documents_the_configuration_surface() {
    let mut cmd = Command::cargo_bin("radprof").unwrap();
    let assert = cmd.args(["run", "--help"]).assert().success();
    let out = String::from_utf8(assert.get_output().stdout.clone()).unwrap();
    for flag in [
        "--input",
        "--out",
        "--scene",
        "--channel",
        "--select",
        "--pixel-size",
        "--fraction",
        "--reload",
        "--subtract-background",
        "--std-devs",
        "--analyze",
    ] {
        assert!(out.contains(flag), "missing flag {}", flag);
    }
}

#[test]
fn invalid_fraction_is_rejected() {
    let mut cmd = Command::cargo_bin("radprof").unwrap();
    cmd.args([
        "run",
        "--input", "does-not-matter",
        "--out", "also-unused",
        "--fraction", "1.5",
    ]);
    cmd.assert().failure();
}
