use assert_cmd::Command;
use assert_cmd::cargo::cargo_bin_cmd;
use assert_fs::prelude::*;
use predicates::prelude::*;

const FINGERPRINT: &str = "4F2A9C3D8E1B7A6F5C4D3E2F1A0B9C8D7E6F5A4B";
const AID: &str = "D2760001240103040006123456780000";

const MISS: &str = r#"cat >/dev/null
echo '{"success": false, "messages": ["no matching key"]}'
"#;
const FETCHED: &str = r#"cat >/dev/null
echo '{"success": true, "messages": ["fetched"], "key_data": "AQID", "master_key_id": "0x1122334455667788"}'
"#;
const KNOWN: &str = r#"cat >/dev/null
echo '{"success": true, "messages": ["already in keyring"], "master_key_id": "0x1122334455667788"}'
"#;
const OK: &str = r#"cat >/dev/null
echo '{"success": true, "messages": ["done"]}'
"#;
const BROKEN: &str = r#"cat >/dev/null
echo '{"success": false, "messages": ["keyring locked"]}'
"#;

/// Run tokenbind with given args.
fn tokenbind() -> Command {
    let mut cmd = cargo_bin_cmd!("tokenbind");
    cmd.env_remove("TOKENBIND_CONFIG").env_remove("TOKENBIND_LOG");
    cmd
}

/// A project with a token descriptor and one script per configured hook.
///
/// Every hook also appends its name to `calls.log`, so tests can check which
/// collaborators actually ran.
fn setup(hooks: &[(&str, &str)]) -> assert_fs::TempDir {
    let dir = assert_fs::TempDir::new().unwrap();

    dir.child("token.json")
        .write_str(&format!(
            r#"{{
  "fingerprints": ["{FINGERPRINT}"],
  "url": "https://keys.example.org/token.asc",
  "aid": "{AID}",
  "fingerprint_sign": "{FINGERPRINT}"
}}"#
        ))
        .unwrap();

    for sub in ["hooks", ".tokenbind", "keys"] {
        std::fs::create_dir_all(dir.path().join(sub)).unwrap();
    }

    let mut config = String::from("[tokenbind]\nversion = \"0.1.0\"\n\n[hooks]\n");
    for (name, script) in hooks {
        dir.child(format!("hooks/{name}.sh"))
            .write_str(&format!("echo {name} >> calls.log\n{script}"))
            .unwrap();
        config.push_str(&format!("{name} = [\"sh\", \"hooks/{name}.sh\"]\n"));
    }
    config.push_str("\n[permissions]\nallowed_dirs = [\"keys\"]\n");
    dir.child(".tokenbind/config.toml")
        .write_str(&config)
        .unwrap();
    dir.child("keys/key.asc")
        .write_str("-----BEGIN PGP PUBLIC KEY BLOCK-----\n")
        .unwrap();

    dir
}

fn calls(dir: &assert_fs::TempDir) -> Vec<String> {
    std::fs::read_to_string(dir.path().join("calls.log"))
        .unwrap_or_default()
        .lines()
        .map(str::to_string)
        .collect()
}

// ─── Lookup chain ────────────────────────────────────────────────

#[test]
fn key_found_by_url_is_imported_and_bound() {
    let dir = setup(&[
        ("local", MISS),
        ("url", FETCHED),
        ("keyserver", MISS),
        ("import", OK),
        ("promote", OK),
    ]);

    tokenbind()
        .current_dir(dir.path())
        .args(["resolve", "--token", "token.json", "--yes"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Key bound to token"))
        .stdout(predicate::str::contains("0x1122334455667788"));

    assert_eq!(calls(&dir), ["local", "url", "import", "promote"]);
}

#[test]
fn known_key_is_bound_without_import() {
    let dir = setup(&[("local", KNOWN), ("import", OK), ("promote", OK)]);

    tokenbind()
        .current_dir(dir.path())
        .args(["resolve", "--token", "token.json"])
        .assert()
        .success()
        .stdout(predicate::str::contains("0x1122334455667788"));

    assert_eq!(calls(&dir), ["local", "promote"]);
}

#[test]
fn all_sources_failing_is_not_resolved() {
    let dir = setup(&[("local", MISS), ("url", MISS), ("keyserver", MISS)]);

    tokenbind()
        .current_dir(dir.path())
        .args(["resolve", "--token", "token.json"])
        .assert()
        .failure()
        .stdout(predicate::str::contains("No source had a usable key"))
        .stderr(predicate::str::contains("No key was bound"));

    assert_eq!(calls(&dir), ["local", "url", "keyserver"]);
}

#[test]
fn missing_hooks_count_as_failed_lookups() {
    let dir = setup(&[("keyserver", KNOWN), ("promote", OK)]);

    tokenbind()
        .current_dir(dir.path())
        .args(["resolve", "--token", "token.json"])
        .assert()
        .success();

    assert_eq!(calls(&dir), ["keyserver", "promote"]);
}

#[test]
fn retry_walks_the_chain_again() {
    let dir = setup(&[("local", MISS), ("url", MISS), ("keyserver", MISS)]);

    tokenbind()
        .current_dir(dir.path())
        .args(["resolve", "--token", "token.json"])
        .write_stdin("r\nq\n")
        .assert()
        .failure();

    assert_eq!(
        calls(&dir),
        ["local", "url", "keyserver", "local", "url", "keyserver"]
    );
}

#[test]
fn declining_import_stops_the_run() {
    let dir = setup(&[("local", FETCHED), ("import", OK), ("promote", OK)]);

    tokenbind()
        .current_dir(dir.path())
        .args(["resolve", "--token", "token.json"])
        .write_stdin("n\n")
        .assert()
        .failure()
        .stdout(predicate::str::contains("Import skipped"));

    assert_eq!(calls(&dir), ["local"]);
}

// ─── Import / promote failures ───────────────────────────────────

#[test]
fn failed_import_is_not_retried_under_yes() {
    let dir = setup(&[("local", FETCHED), ("import", BROKEN), ("promote", OK)]);

    tokenbind()
        .current_dir(dir.path())
        .args(["resolve", "--token", "token.json", "--yes"])
        .assert()
        .failure()
        .stdout(predicate::str::contains("Import skipped"));

    assert_eq!(calls(&dir), ["local", "import"]);
}

#[test]
fn failed_promotion_offers_retry() {
    let dir = setup(&[("local", KNOWN), ("promote", BROKEN)]);

    tokenbind()
        .current_dir(dir.path())
        .args(["resolve", "--token", "token.json"])
        .assert()
        .failure()
        .stdout(predicate::str::contains("could not be bound"));
}

#[test]
fn crashing_hook_falls_through_to_next_source() {
    let dir = setup(&[
        ("local", "exit 7\n"),
        ("url", KNOWN),
        ("promote", OK),
    ]);

    tokenbind()
        .current_dir(dir.path())
        .args(["resolve", "--token", "token.json"])
        .assert()
        .success();

    assert_eq!(calls(&dir), ["local", "url", "promote"]);
}

// ─── File fallback ───────────────────────────────────────────────

#[test]
fn file_in_allowed_dir_is_read_directly() {
    let dir = setup(&[
        (
            "content_file",
            r#"grep -q 'key.asc' && echo '{"success": true, "key_data": "AQID", "master_key_id": 7}' || echo '{"success": false}'
"#,
        ),
        ("import", OK),
        ("promote", OK),
    ]);

    tokenbind()
        .current_dir(dir.path())
        .args(["resolve", "--token", "token.json", "--file", "keys/key.asc", "--yes"])
        .assert()
        .success()
        .stdout(predicate::str::contains("0x0000000000000007"));

    assert_eq!(calls(&dir), ["content_file", "import", "promote"]);
}

#[test]
fn file_outside_allowed_dirs_needs_permission() {
    let dir = setup(&[("content_file", KNOWN), ("promote", OK)]);
    std::fs::create_dir_all(dir.path().join("elsewhere")).unwrap();
    dir.child("elsewhere/key.asc").write_str("key").unwrap();

    tokenbind()
        .current_dir(dir.path())
        .args(["resolve", "--token", "token.json", "--file", "elsewhere/key.asc"])
        .write_stdin("y\n")
        .assert()
        .success()
        .stdout(predicate::str::contains("Allow tokenbind to read elsewhere/key.asc?"));

    assert_eq!(calls(&dir), ["content_file", "promote"]);
}

#[test]
fn denied_permission_skips_the_file() {
    let dir = setup(&[("content_file", KNOWN), ("promote", OK)]);
    std::fs::create_dir_all(dir.path().join("elsewhere")).unwrap();
    dir.child("elsewhere/key.asc").write_str("key").unwrap();

    tokenbind()
        .current_dir(dir.path())
        .args(["resolve", "--token", "token.json", "--file", "elsewhere/key.asc"])
        .assert()
        .failure()
        .stdout(predicate::str::contains("Read permission denied"));

    assert!(calls(&dir).is_empty());
}

#[test]
fn file_can_be_picked_after_the_chain_fails() {
    let dir = setup(&[
        ("local", MISS),
        ("url", MISS),
        ("keyserver", MISS),
        ("content_file", KNOWN),
        ("promote", OK),
    ]);

    tokenbind()
        .current_dir(dir.path())
        .args(["resolve", "--token", "token.json"])
        .write_stdin("f\nkeys/key.asc\n")
        .assert()
        .success();

    assert_eq!(
        calls(&dir),
        ["local", "url", "keyserver", "content_file", "promote"]
    );
}

// ─── Result log ──────────────────────────────────────────────────

#[test]
fn export_log_writes_every_operation() {
    let dir = setup(&[
        ("local", MISS),
        ("url", FETCHED),
        ("import", OK),
        ("promote", OK),
    ]);

    tokenbind()
        .current_dir(dir.path())
        .args([
            "resolve",
            "--token",
            "token.json",
            "--yes",
            "--export-log",
            "out/run.jsonl",
        ])
        .assert()
        .success();

    let content = std::fs::read_to_string(dir.path().join("out/run.jsonl")).unwrap();
    let lines: Vec<serde_json::Value> = content
        .lines()
        .map(|l| serde_json::from_str(l).unwrap())
        .collect();

    assert_eq!(lines.len(), 4);
    assert_eq!(lines[0]["origin"]["kind"], "lookup");
    assert_eq!(lines[0]["origin"]["source"], "local_store");
    assert_eq!(lines[0]["success"], false);
    assert!(lines[1]["key_digest"].is_string());
    assert_eq!(lines[2]["origin"]["kind"], "import");
    assert_eq!(lines[3]["origin"]["kind"], "promote");
}

#[test]
fn log_is_exported_even_when_unresolved() {
    let dir = setup(&[("local", MISS)]);

    tokenbind()
        .current_dir(dir.path())
        .args(["resolve", "--token", "token.json", "--export-log", "run.jsonl"])
        .assert()
        .failure();

    let content = std::fs::read_to_string(dir.path().join("run.jsonl")).unwrap();
    assert_eq!(content.lines().count(), 3);
}

#[test]
fn show_log_prints_entries() {
    let dir = setup(&[("local", KNOWN), ("promote", OK)]);

    tokenbind()
        .current_dir(dir.path())
        .args(["resolve", "--token", "token.json", "--show-log"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Result log (2 entries)"));
}

// ─── Inputs ──────────────────────────────────────────────────────

#[test]
fn invalid_token_is_rejected() {
    let dir = setup(&[]);
    dir.child("bad.json")
        .write_str(r#"{"fingerprints": ["xyz"], "aid": "D276", "fingerprint_sign": "xyz"}"#)
        .unwrap();

    tokenbind()
        .current_dir(dir.path())
        .args(["resolve", "--token", "bad.json"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("Invalid token descriptor"));
}

#[test]
fn missing_config_is_reported() {
    let dir = assert_fs::TempDir::new().unwrap();
    dir.child("token.json").write_str("{}").unwrap();

    tokenbind()
        .current_dir(dir.path())
        .args(["resolve", "--token", "token.json", "--config", "nope.toml"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("not found"));
}

#[test]
fn explicit_config_path_is_used() {
    let dir = setup(&[("local", KNOWN), ("promote", OK)]);
    std::fs::rename(
        dir.path().join(".tokenbind/config.toml"),
        dir.path().join("custom.toml"),
    )
    .unwrap();

    tokenbind()
        .current_dir(dir.path())
        .args(["resolve", "--token", "token.json", "--config", "custom.toml"])
        .assert()
        .success();
}
