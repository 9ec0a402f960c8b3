/// CLI smoke tests: invoke the compiled binary without any network service.
use assert_cmd::Command;
use tempfile::TempDir;

#[allow(deprecated)]
fn cardsmith(home: &TempDir) -> Command {
    let mut cmd = Command::cargo_bin("cardsmith").unwrap();
    cmd.current_dir(home.path())
        .env("HOME", home.path())
        .env("XDG_CONFIG_HOME", home.path().join(".config"))
        .env_remove("OPENAI_API_KEY")
        .env_remove("ANTHROPIC_API_KEY")
        .env_remove("CARDSMITH_STORE_URL")
        .env_remove("FSRS_API_URL");
    cmd
}

// ── Binary runs ──────────────────────────────────────────────────────────

#[test]
fn help_flag_exits_zero() {
    let tmp = TempDir::new().unwrap();
    cardsmith(&tmp).arg("--help").assert().success();
}

#[test]
fn version_flag_exits_zero() {
    let tmp = TempDir::new().unwrap();
    cardsmith(&tmp).arg("--version").assert().success();
}

// ── Segment (offline) ────────────────────────────────────────────────────

#[test]
fn segment_reports_chunk_count() {
    let tmp = TempDir::new().unwrap();
    let notes = tmp.path().join("notes.txt");
    let words: Vec<String> = (0..10).map(|i| format!("w{}", i)).collect();
    std::fs::write(&notes, words.join(" ")).unwrap();

    let output = cardsmith(&tmp)
        .args(["segment", "--chunk-size", "4", "--overlap", "1", "--file"])
        .arg(&notes)
        .output()
        .unwrap();

    assert!(output.status.success());
    let stdout = String::from_utf8_lossy(&output.stdout);
    // Starts 0, 3, 6; the third window reaches the end.
    assert!(stdout.contains("3 chunk(s)"), "{}", stdout);
}

#[test]
fn segment_reads_stdin() {
    let tmp = TempDir::new().unwrap();
    let output = cardsmith(&tmp)
        .arg("segment")
        .write_stdin("just a few words")
        .output()
        .unwrap();

    assert!(output.status.success());
    assert!(String::from_utf8_lossy(&output.stdout).contains("1 chunk(s)"));
}

// ── Auth (no LLM needed) ─────────────────────────────────────────────────

#[test]
fn auth_list_exits_zero() {
    let tmp = TempDir::new().unwrap();
    cardsmith(&tmp).args(["auth", "list"]).assert().success();
}

#[test]
fn auth_status_without_config_exits_zero() {
    let tmp = TempDir::new().unwrap();
    cardsmith(&tmp).args(["auth", "status"]).assert().success();
}

#[test]
fn auth_logout_unknown_provider_fails() {
    let tmp = TempDir::new().unwrap();
    cardsmith(&tmp)
        .args(["auth", "logout", "gemini"])
        .assert()
        .failure();
}

// ── Graceful errors ──────────────────────────────────────────────────────

#[test]
fn generate_without_store_url_fails() {
    let tmp = TempDir::new().unwrap();
    cardsmith(&tmp)
        .args(["generate", "--user", "u1", "--deck", "d1"])
        .write_stdin("Mitochondria produce ATP.")
        .assert()
        .failure();
}

#[test]
fn generate_with_empty_notes_is_a_no_op() {
    let tmp = TempDir::new().unwrap();
    cardsmith(&tmp)
        .args(["generate", "--user", "u1", "--deck", "d1"])
        .write_stdin("   ")
        .assert()
        .success();
}

#[test]
fn decks_list_without_store_url_fails() {
    let tmp = TempDir::new().unwrap();
    cardsmith(&tmp)
        .args(["decks", "list", "--user", "u1"])
        .assert()
        .failure();
}

#[test]
fn cards_edit_without_changes_fails() {
    let tmp = TempDir::new().unwrap();
    cardsmith(&tmp)
        .args(["cards", "edit", "--user", "u1", "--deck", "d1", "c1"])
        .assert()
        .failure();
}

#[test]
fn store_subcommands_are_listed_in_help() {
    let tmp = TempDir::new().unwrap();
    let output = cardsmith(&tmp).args(["cards", "--help"]).output().unwrap();
    let stdout = String::from_utf8_lossy(&output.stdout);
    for sub in ["list", "show", "edit", "delete"] {
        assert!(stdout.contains(sub), "{}", stdout);
    }
}

#[test]
fn verbose_flag_accepted() {
    let tmp = TempDir::new().unwrap();
    cardsmith(&tmp)
        .args(["--verbose", "auth", "status"])
        .assert()
        .success();
}
