use predicates::prelude::*;
use std::fs;
use std::process::Command;
use tempfile::TempDir;

fn cmd() -> assert_cmd::Command {
    let mut cmd = assert_cmd::Command::from(Command::new(env!("CARGO_BIN_EXE_manindex")));
    for var in [
        "RUST_LOG",
        "MANINDEX_MANUAL",
        "MANINDEX_PACKAGES",
        "MANINDEX_MISC",
        "MANINDEX_DB",
    ] {
        cmd.env_remove(var);
    }
    cmd
}

fn fixture_path(name: &str) -> String {
    format!("{}/tests/fixtures/{}", env!("CARGO_MANIFEST_DIR"), name)
}

/// Command over the fixture roots with the snapshot in `dir`.
fn indexed(dir: &TempDir) -> assert_cmd::Command {
    let mut cmd = cmd();
    cmd.arg("--manual")
        .arg(fixture_path("Manual"))
        .arg("--packages")
        .arg(fixture_path("packages"))
        .arg("--index")
        .arg(dir.path().join("index.db"));
    cmd
}

fn stdout_of(cmd: &mut assert_cmd::Command) -> String {
    let assert = cmd.assert().success();
    String::from_utf8(assert.get_output().stdout.clone()).unwrap()
}

// -- build --

#[test]
fn build_reports_count_and_writes_snapshot() {
    let dir = TempDir::new().unwrap();
    indexed(&dir)
        .arg("build")
        .assert()
        .success()
        .stdout("16 records\n");

    let snapshot = fs::read_to_string(dir.path().join("index.db")).unwrap();
    assert!(snapshot.starts_with("% Generated by manindex"));
    assert_eq!(snapshot.lines().filter(|l| l.starts_with("record(")).count(), 16);
}

#[test]
fn build_warns_about_synthesized_section_id() {
    let dir = TempDir::new().unwrap();
    indexed(&dir)
        .arg("build")
        .assert()
        .success()
        .stderr(predicate::str::contains("sec:Unnumbered_remarks"));
}

#[test]
fn snapshot_is_trusted_until_rebuild() {
    let dir = TempDir::new().unwrap();
    let manual = dir.path().join("Manual");
    fs::create_dir(&manual).unwrap();
    fs::copy(fixture_path("Manual/arith.html"), manual.join("arith.html")).unwrap();

    let run = |args: &[&str]| {
        let mut cmd = cmd();
        cmd.arg("--manual")
            .arg(&manual)
            .arg("--index")
            .arg(dir.path().join("index.db"))
            .args(args);
        cmd
    };

    run(&["build"]).assert().success().stdout("4 records\n");
    fs::remove_file(manual.join("arith.html")).unwrap();

    run(&["find", "f(atan/_)"])
        .assert()
        .success()
        .stdout(predicate::str::starts_with("f(atan/2)\t"));

    run(&["rebuild"]).assert().success().stdout("0 records\n");
    run(&["find", "f(atan/_)"]).assert().failure();
}

#[test]
fn corrupt_snapshot_is_rebuilt() {
    let dir = TempDir::new().unwrap();
    fs::write(dir.path().join("index.db"), "record(append/3, unterminated\n").unwrap();

    indexed(&dir)
        .arg("build")
        .assert()
        .success()
        .stdout("16 records\n")
        .stderr(predicate::str::contains("ignoring snapshot"));

    let snapshot = fs::read_to_string(dir.path().join("index.db")).unwrap();
    assert!(!snapshot.contains("unterminated"));
}

#[test]
fn roots_from_environment() {
    let dir = TempDir::new().unwrap();
    cmd()
        .env("MANINDEX_PACKAGES", fixture_path("packages"))
        .env("MANINDEX_DB", dir.path().join("env.db"))
        .arg("build")
        .assert()
        .success()
        .stdout("4 records\n");
    assert!(dir.path().join("env.db").exists());
}

#[test]
fn relative_roots_are_stored_absolute() {
    let dir = TempDir::new().unwrap();
    let out = stdout_of(
        cmd()
            .current_dir(env!("CARGO_MANIFEST_DIR"))
            .args(["--manual", "tests/fixtures/Manual", "--index"])
            .arg(dir.path().join("index.db"))
            .args(["find", "f(atan/_)"]),
    );
    let location = out.split('\t').nth(1).unwrap();
    let file = location.rsplit_once(':').unwrap().0;
    assert!(std::path::Path::new(file).is_absolute());
    assert!(file.ends_with("tests/fixtures/Manual/arith.html"));

    let snapshot = fs::read_to_string(dir.path().join("index.db")).unwrap();
    assert!(!snapshot.contains("'tests/fixtures"));
}

// -- find --

#[test]
fn find_with_wildcard_arity() {
    let dir = TempDir::new().unwrap();
    let out = stdout_of(indexed(&dir).args(["find", "append/_"]));
    let fields: Vec<&str> = out.trim_end().split('\t').collect();
    assert_eq!(fields.len(), 3);
    assert_eq!(fields[0], "append/3");
    assert!(fields[1].contains("lists.html:"));
    assert_eq!(
        fields[2],
        "List1AndList2 is the concatenation of List1 and List2."
    );
}

#[test]
fn find_qualified_names() {
    let dir = TempDir::new().unwrap();
    let out = stdout_of(indexed(&dir).args(["find", "_:_"]));
    let objects: Vec<&str> = out
        .lines()
        .filter_map(|line| line.split('\t').next())
        .collect();
    assert_eq!(objects, vec!["lists:last/2", "lists:nth0/3", "json:json_read/2"]);
}

#[test]
fn shared_description_gives_shared_location() {
    let dir = TempDir::new().unwrap();
    let out = stdout_of(indexed(&dir).args(["find", "lists:_"]));
    let lines: Vec<Vec<&str>> = out.lines().map(|l| l.split('\t').collect()).collect();
    assert_eq!(lines.len(), 2);
    assert_eq!(lines[0][1], lines[1][1]);
    assert_eq!(lines[0][2], "Retrieve elements by position.");
    assert_eq!(lines[1][2], "Retrieve elements by position.");
}

#[test]
fn find_sections_by_name() {
    let dir = TempDir::new().unwrap();
    let out = stdout_of(indexed(&dir).args(["find", "sec:bibliography"]));
    assert!(out.starts_with("sec:bibliography\t"));
    assert!(out.trim_end().ends_with("\tBibliography"));

    let out = stdout_of(indexed(&dir).args(["find", "Manual/lists.html"]));
    assert!(out.starts_with("Manual/lists.html\t"));
    assert!(out.trim_end().ends_with("\tBuilt-in list operations"));
}

#[test]
fn find_rejects_bad_pattern() {
    let dir = TempDir::new().unwrap();
    indexed(&dir)
        .args(["find", "two words"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("invalid pattern"));
}

// -- summary --

#[test]
fn summary_of_callables() {
    let dir = TempDir::new().unwrap();
    indexed(&dir)
        .args(["summary", "length/2"])
        .assert()
        .success()
        .stdout("True if Length represents the number of elements in List.\n");
    indexed(&dir)
        .args(["summary", "c(PL_unify)"])
        .assert()
        .success()
        .stdout("Unify two terms!\n");
    indexed(&dir)
        .args(["summary", "json_value//1"])
        .assert()
        .success()
        .stdout("Grammar rule parsing one JSON value\n");
}

#[test]
fn summary_of_sections() {
    let dir = TempDir::new().unwrap();
    indexed(&dir)
        .args(["summary", "sec:lists"])
        .assert()
        .success()
        .stdout("Built-in list operations\n");
    indexed(&dir)
        .args(["summary", "sec:bibliography"])
        .assert()
        .success()
        .stdout("Bibliography\n");
}

#[test]
fn summary_of_unknown_object_fails() {
    let dir = TempDir::new().unwrap();
    indexed(&dir)
        .args(["summary", "missing/9"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("not documented"));
}

// -- check-ids --

#[test]
fn check_ids_clean() {
    let dir = TempDir::new().unwrap();
    indexed(&dir)
        .arg("check-ids")
        .assert()
        .success()
        .stdout("");
}

#[test]
fn check_ids_reports_duplicates() {
    let dir = TempDir::new().unwrap();
    let manual = dir.path().join("Manual");
    fs::create_dir(&manual).unwrap();
    for name in ["a.html", "b.html"] {
        fs::write(manual.join(name), r#"<h2 id="sec:dup">1 Twice</h2>"#).unwrap();
    }

    cmd()
        .arg("--manual")
        .arg(&manual)
        .arg("--index")
        .arg(dir.path().join("index.db"))
        .arg("check-ids")
        .assert()
        .failure()
        .stdout("sec:dup\n");
}

// -- dump / file --

#[test]
fn dump_matches_snapshot_file() {
    let dir = TempDir::new().unwrap();
    let dumped = stdout_of(indexed(&dir).arg("dump"));
    let written = fs::read_to_string(dir.path().join("index.db")).unwrap();
    assert_eq!(dumped, written);
}

#[test]
fn file_mode_indexes_one_page() {
    let dir = TempDir::new().unwrap();
    let page = fixture_path("packages/json.html");
    let out = stdout_of(
        cmd()
            .arg("--index")
            .arg(dir.path().join("unused.db"))
            .args(["file", &page, "--class", "packages"]),
    );

    let objects: Vec<&str> = out
        .lines()
        .filter_map(|line| line.split('\t').next())
        .collect();
    assert_eq!(objects, vec![page.as_str(), "sec:json", "json:json_read/2", "json_value//1"]);
    assert!(!dir.path().join("unused.db").exists());
}

#[test]
fn file_mode_rejects_unknown_class() {
    cmd()
        .args(["file", &fixture_path("Manual/arith.html"), "--class", "other"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("unknown class"));
}
