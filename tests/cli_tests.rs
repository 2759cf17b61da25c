// End-to-end tests for the salesdeck command line

use assert_cmd::Command;
use predicates::prelude::*;
use serde_json::Value;
use tempfile::TempDir;
use std::fs;

/// Helper to create a temporary database and set it as the data location
fn setup_test_env() -> (TempDir, std::sync::MutexGuard<'static, ()>) {
    setup_test_env_with("")
}

fn setup_test_env_with(extra_config: &str) -> (TempDir, std::sync::MutexGuard<'static, ()>) {
    let guard = test_env::lock_test_env();
    let temp_dir = TempDir::new().unwrap();
    let db_path = temp_dir.path().join("test.db");

    let config_dir = temp_dir.path().join(".salesdeck");
    fs::create_dir_all(&config_dir).unwrap();
    fs::write(
        config_dir.join("rc"),
        format!("data.location={}\n{}", db_path.display(), extra_config),
    ).unwrap();
    (temp_dir, guard)
}

/// Helper to create a new command with test environment
fn new_cmd(temp_dir: &TempDir) -> Command {
    let mut cmd = Command::cargo_bin("salesdeck").unwrap();
    cmd.env("HOME", temp_dir.path());
    cmd.env_remove("RUST_LOG");
    cmd
}

/// Run a create command and return the id printed as "(id: ...)"
fn create(temp_dir: &TempDir, args: &[&str]) -> String {
    let output = new_cmd(temp_dir).args(args).assert().success().get_output().stdout.clone();
    let text = String::from_utf8(output).unwrap();
    let start = text.find("(id: ").expect("id in output") + 5;
    let end = text[start..].find(')').unwrap() + start;
    text[start..end].to_string()
}

fn run_json(temp_dir: &TempDir, args: &[&str]) -> Value {
    let output = new_cmd(temp_dir).args(args).assert().success().get_output().stdout.clone();
    serde_json::from_slice(&output).unwrap()
}

#[test]
fn test_board_lifecycle() {
    let (temp_dir, _guard) = setup_test_env();

    new_cmd(&temp_dir)
        .args(&["boards", "list"])
        .assert()
        .success()
        .stdout(predicate::str::contains("No boards found"));

    let board_id = create(&temp_dir, &["boards", "add", "Enterprise"]);

    new_cmd(&temp_dir)
        .args(&["boards", "list"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Enterprise"))
        .stdout(predicate::str::contains(board_id.as_str()));

    new_cmd(&temp_dir)
        .args(&["boards", "edit", &board_id, "--name", "Mid-market"])
        .assert()
        .success();

    let boards = run_json(&temp_dir, &["boards", "list", "--json"]);
    assert_eq!(boards[0]["name"], "Mid-market");

    new_cmd(&temp_dir)
        .args(&["boards", "remove", &board_id])
        .assert()
        .success()
        .stdout(predicate::str::contains("Removed board"));
}

#[test]
fn test_user_errors_exit_with_code_1() {
    let (temp_dir, _guard) = setup_test_env();

    new_cmd(&temp_dir)
        .args(&["boards", "show", "missing"])
        .assert()
        .code(1)
        .stderr(predicate::str::contains("Error: Board 'missing' not found"));

    new_cmd(&temp_dir)
        .args(&["boards", "add", "   "])
        .assert()
        .code(1)
        .stderr(predicate::str::contains("cannot be empty"));
}

#[test]
fn test_board_with_pipelines_cannot_be_removed() {
    let (temp_dir, _guard) = setup_test_env();
    let board_id = create(&temp_dir, &["boards", "add", "Main"]);
    let pipeline_id = create(&temp_dir, &["pipelines", "add", &board_id, "Sales", "--stage", "Lead"]);

    new_cmd(&temp_dir)
        .args(&["boards", "remove", &board_id])
        .assert()
        .code(1)
        .stderr(predicate::str::contains("still has 1 pipeline(s)"));

    new_cmd(&temp_dir)
        .args(&["pipelines", "remove", &pipeline_id])
        .assert()
        .success();
    new_cmd(&temp_dir)
        .args(&["boards", "remove", &board_id])
        .assert()
        .success();
}

#[test]
fn test_pipeline_stages_copy_and_archive() {
    let (temp_dir, _guard) = setup_test_env();
    let board_id = create(&temp_dir, &["boards", "add", "Main"]);
    let pipeline_id = create(&temp_dir, &[
        "pipelines", "add", &board_id, "Sales",
        "--stage", "Lead=10%", "--stage", "Demo", "--stage", "Won=Won",
        "--bg-color", "#5fd",
    ]);

    let detail = run_json(&temp_dir, &["pipelines", "show", &pipeline_id, "--json"]);
    assert_eq!(detail["stages"].as_array().unwrap().len(), 3);
    assert_eq!(detail["pipeline"]["bgColor"], "#5fd");

    new_cmd(&temp_dir)
        .args(&["pipelines", "copy", &pipeline_id])
        .assert()
        .success()
        .stdout(predicate::str::contains("Sales-copied"))
        .stdout(predicate::str::contains("3 stage(s)"));

    let pipelines = run_json(&temp_dir, &["pipelines", "list", &board_id, "--json"]);
    let copied = pipelines
        .as_array()
        .unwrap()
        .iter()
        .find(|p| p["name"] == "Sales-copied")
        .unwrap();
    let copied_detail = run_json(&temp_dir, &["pipelines", "show", copied["id"].as_str().unwrap(), "--json"]);
    let probabilities: Vec<&str> = copied_detail["stages"]
        .as_array()
        .unwrap()
        .iter()
        .map(|s| s["probability"].as_str().unwrap())
        .collect();
    assert_eq!(probabilities, vec!["10%", "10%", "Won"]);

    new_cmd(&temp_dir)
        .args(&["pipelines", "archive", &pipeline_id])
        .assert()
        .success()
        .stdout(predicate::str::contains("is now archived"));
    new_cmd(&temp_dir)
        .args(&["pipelines", "archive", &pipeline_id])
        .assert()
        .success()
        .stdout(predicate::str::contains("is now active"));
}

#[test]
fn test_pipeline_edit_keeps_named_stages() {
    let (temp_dir, _guard) = setup_test_env();
    let board_id = create(&temp_dir, &["boards", "add", "Main"]);
    let pipeline_id = create(&temp_dir, &[
        "pipelines", "add", &board_id, "Sales", "--stage", "Lead", "--stage", "Demo",
    ]);
    let before = run_json(&temp_dir, &["pipelines", "show", &pipeline_id, "--json"]);
    let lead_id = before["stages"][0]["id"].as_str().unwrap().to_string();
    let deal_id = create(&temp_dir, &["deals", "add", &lead_id, "Acme"]);

    new_cmd(&temp_dir)
        .args(&["pipelines", "edit", &pipeline_id, "--stage", "Lead", "--stage", "Won"])
        .assert()
        .success();

    let after = run_json(&temp_dir, &["pipelines", "show", &pipeline_id, "--json"]);
    let names: Vec<&str> = after["stages"]
        .as_array()
        .unwrap()
        .iter()
        .map(|s| s["name"].as_str().unwrap())
        .collect();
    assert_eq!(names, vec!["Lead", "Won"]);
    assert_eq!(after["stages"][0]["id"], lead_id.as_str());

    // deal on the kept stage survives
    new_cmd(&temp_dir)
        .args(&["deals", "show", &deal_id])
        .assert()
        .success()
        .stdout(predicate::str::contains("Acme"));
}

#[test]
fn test_invalid_number_config_is_rejected() {
    let (temp_dir, _guard) = setup_test_env();
    let board_id = create(&temp_dir, &["boards", "add", "Main"]);

    new_cmd(&temp_dir)
        .args(&[
            "pipelines", "add", &board_id, "Sales",
            "--number-config", "DEAL-{year}", "--number-size", "4",
        ])
        .assert()
        .code(1)
        .stderr(predicate::str::contains("must not end with a number"));

    new_cmd(&temp_dir)
        .args(&[
            "pipelines", "add", &board_id, "Sales",
            "--number-config", "DEAL-{year}-", "--number-size", "4",
        ])
        .assert()
        .success();
}

#[test]
fn test_save_board_as_template_and_use_it() {
    let (temp_dir, _guard) = setup_test_env();
    let board_id = create(&temp_dir, &["boards", "add", "Enterprise"]);
    create(&temp_dir, &["pipelines", "add", &board_id, "New business", "--stage", "Lead", "--stage", "Won"]);

    new_cmd(&temp_dir)
        .args(&["boards", "save-as-template", &board_id, "--name", "Enterprise flow"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Board and all pipelines saved as template successfully"));

    let page = run_json(&temp_dir, &["templates", "list", "--json"]);
    assert_eq!(page["totalCount"], 1);
    let template = &page["list"][0];
    assert_eq!(template["contentType"], "sales:board");
    assert_eq!(template["description"], "Template created from board: Enterprise");
    let template_id = template["id"].as_str().unwrap().to_string();

    let restored = run_json(&temp_dir, &["templates", "use", &template_id]);
    assert_eq!(restored["resourceType"], "board");
    assert_eq!(restored["name"], "Enterprise");
    assert_ne!(restored["boardId"], board_id.as_str());

    let boards = run_json(&temp_dir, &["boards", "list", "--json"]);
    assert_eq!(boards.as_array().unwrap().len(), 2);
    let restored_board = run_json(&temp_dir, &["boards", "show", restored["boardId"].as_str().unwrap(), "--json"]);
    assert_eq!(restored_board["pipelines"][0]["stages"].as_array().unwrap().len(), 2);
}

#[test]
fn test_pipeline_template_needs_board() {
    let (temp_dir, _guard) = setup_test_env();
    let board_id = create(&temp_dir, &["boards", "add", "Main"]);
    let pipeline_id = create(&temp_dir, &["pipelines", "add", &board_id, "Sales", "--stage", "Lead"]);

    let saved = run_json(&temp_dir, &[
        "templates", "save-from", &pipeline_id, "sales:pipeline", "--name", "Sales flow",
    ]);
    assert_eq!(saved["success"], true);
    let template_id = saved["templateId"].as_str().unwrap().to_string();

    // without a board the restore fails and the raw template comes back
    let raw = run_json(&temp_dir, &["templates", "use", &template_id]);
    assert_eq!(raw["id"], template_id.as_str());
    assert_eq!(raw["contentType"], "sales:pipeline");

    let restored = run_json(&temp_dir, &["templates", "use", &template_id, "--board", &board_id]);
    assert_eq!(restored["resourceType"], "pipeline");
    let pipelines = run_json(&temp_dir, &["pipelines", "list", &board_id, "--json"]);
    assert_eq!(pipelines.as_array().unwrap().len(), 2);
}

#[test]
fn test_template_use_strict_policy() {
    let (temp_dir, _guard) = setup_test_env_with("template.use_fallback=false\n");
    let template_id = create(&temp_dir, &[
        "templates", "add", "Widget", "--content", "{}", "--content-type", "inventory:widget",
    ]);

    new_cmd(&temp_dir)
        .args(&["templates", "use", &template_id])
        .assert()
        .code(1)
        .stderr(predicate::str::contains("inventory.templates.useTemplate"));
}

#[test]
fn test_template_crud_and_search() {
    let (temp_dir, _guard) = setup_test_env();

    new_cmd(&temp_dir)
        .args(&["templates", "add", "Bad", "--content", "{}", "--content-type", "salesboard"])
        .assert()
        .code(1)
        .stderr(predicate::str::contains("Invalid content type"));

    let a = create(&temp_dir, &["templates", "add", "Foo board", "--content", "{}", "--content-type", "sales:board"]);
    create(&temp_dir, &["templates", "add", "Other", "--content", "{}", "--description", "has FOO inside"]);
    create(&temp_dir, &["templates", "add", "Hidden foo", "--content", "{}", "--status", "inactive"]);
    create(&temp_dir, &["templates", "add", "Unrelated", "--content", "{}"]);

    let page = run_json(&temp_dir, &["templates", "list", "--search", "foo", "--json"]);
    assert_eq!(page["totalCount"], 2);
    let names: Vec<&str> = page["list"].as_array().unwrap().iter().map(|t| t["name"].as_str().unwrap()).collect();
    assert!(names.contains(&"Foo board"));
    assert!(names.contains(&"Other"));

    let page = run_json(&temp_dir, &["templates", "list", "--per-page", "1", "--page", "2", "--json"]);
    assert_eq!(page["totalCount"], 3);
    assert_eq!(page["pageInfo"]["hasNextPage"], true);
    assert_eq!(page["pageInfo"]["hasPreviousPage"], true);

    new_cmd(&temp_dir)
        .args(&["templates", "types"])
        .assert()
        .success()
        .stdout(predicate::str::contains("sales:board"));

    new_cmd(&temp_dir)
        .args(&["templates", "edit", &a, "--description", "Updated"])
        .assert()
        .success();
    let shown = run_json(&temp_dir, &["templates", "show", &a, "--json"]);
    assert_eq!(shown["description"], "Updated");

    new_cmd(&temp_dir)
        .args(&["templates", "remove", &a])
        .assert()
        .success();
    new_cmd(&temp_dir)
        .args(&["templates", "show", &a])
        .assert()
        .code(1);
}

#[test]
fn test_categories() {
    let (temp_dir, _guard) = setup_test_env();
    let root = create(&temp_dir, &["categories", "add", "Sales", "sales", "--content-type", "sales:board"]);
    let child = create(&temp_dir, &[
        "categories", "add", "Enterprise", "sales.enterprise", "--content-type", "sales:board", "--parent", &root,
    ]);

    let page = run_json(&temp_dir, &["categories", "list", "--json"]);
    assert_eq!(page["totalCount"], 2);

    new_cmd(&temp_dir)
        .args(&["categories", "add", "Again", "sales", "--content-type", "sales:board"])
        .assert()
        .code(1)
        .stderr(predicate::str::contains("already in use"));

    new_cmd(&temp_dir)
        .args(&["categories", "remove", &root])
        .assert()
        .code(1);
    new_cmd(&temp_dir)
        .args(&["categories", "remove", &child])
        .assert()
        .success();
    new_cmd(&temp_dir)
        .args(&["categories", "remove", &root])
        .assert()
        .success();
}

#[test]
fn test_time_tracking() {
    let (temp_dir, _guard) = setup_test_env();
    let board_id = create(&temp_dir, &["boards", "add", "Main"]);
    let pipeline_id = create(&temp_dir, &["pipelines", "add", &board_id, "Sales", "--stage", "Lead"]);
    let detail = run_json(&temp_dir, &["pipelines", "show", &pipeline_id, "--json"]);
    let stage_id = detail["stages"][0]["id"].as_str().unwrap().to_string();
    let deal_id = create(&temp_dir, &["deals", "add", &stage_id, "Acme"]);

    new_cmd(&temp_dir)
        .args(&["items", "time-track", &deal_id, "paused", "1h30m", "--start-date", "2026-01-10"])
        .assert()
        .success()
        .stdout(predicate::str::contains("set to paused"));

    let deal = run_json(&temp_dir, &["deals", "show", &deal_id, "--json"]);
    assert_eq!(deal["timeTrack"]["status"], "paused");
    assert_eq!(deal["timeTrack"]["timeSpent"], 5400);

    new_cmd(&temp_dir)
        .args(&["items", "time-track", "missing", "started", "0"])
        .assert()
        .code(1)
        .stderr(predicate::str::contains("Deal 'missing' not found"));
}

#[test]
fn test_pipeline_removal_cleans_field_groups() {
    let (temp_dir, _guard) = setup_test_env();
    let board_id = create(&temp_dir, &["boards", "add", "Main"]);
    let keep = create(&temp_dir, &["pipelines", "add", &board_id, "Keep"]);
    let drop = create(&temp_dir, &["pipelines", "add", &board_id, "Drop"]);
    create(&temp_dir, &["field-groups", "add", "Deal fields", "--pipeline", &keep, "--pipeline", &drop]);

    new_cmd(&temp_dir)
        .args(&["pipelines", "remove", &drop])
        .assert()
        .success();

    let groups = run_json(&temp_dir, &["field-groups", "list", "--json"]);
    assert_eq!(groups[0]["pipelineIds"], serde_json::json!([keep]));
}

#[test]
fn test_repeated_stage_name_on_edit_adds_a_stage() {
    let (temp_dir, _guard) = setup_test_env();
    let board_id = create(&temp_dir, &["boards", "add", "Main"]);
    let pipeline_id = create(&temp_dir, &["pipelines", "add", &board_id, "Sales", "--stage", "Lead"]);
    let before = run_json(&temp_dir, &["pipelines", "show", &pipeline_id, "--json"]);
    let lead_id = before["stages"][0]["id"].as_str().unwrap().to_string();

    new_cmd(&temp_dir)
        .args(&["pipelines", "edit", &pipeline_id, "--stage", "Lead", "--stage", "Lead=50%"])
        .assert()
        .success();

    let after = run_json(&temp_dir, &["pipelines", "show", &pipeline_id, "--json"]);
    let stages = after["stages"].as_array().unwrap();
    assert_eq!(stages.len(), 2);
    assert_eq!(stages[0]["id"], lead_id.as_str());
    assert_ne!(stages[1]["id"], lead_id.as_str());
    assert_eq!(stages[1]["probability"], "50%");
}

#[test]
fn test_pipeline_reorder_and_watch() {
    let (temp_dir, _guard) = setup_test_env_with("user=u-7\n");
    let board_id = create(&temp_dir, &["boards", "add", "Main"]);
    let first = create(&temp_dir, &["pipelines", "add", &board_id, "First"]);
    let second = create(&temp_dir, &["pipelines", "add", &board_id, "Second"]);

    new_cmd(&temp_dir)
        .args(&["pipelines", "reorder", &format!("{}=2", first), &format!("{}=1", second)])
        .assert()
        .success()
        .stdout(predicate::str::contains("Pipeline 'First' moved to position 2"));
    let pipelines = run_json(&temp_dir, &["pipelines", "list", &board_id, "--json"]);
    assert_eq!(pipelines[0]["name"], "Second");
    assert_eq!(pipelines[1]["name"], "First");

    new_cmd(&temp_dir)
        .args(&["pipelines", "reorder", &format!("{}=5", first), "missing=1"])
        .assert()
        .code(1)
        .stderr(predicate::str::contains("Pipeline 'missing' not found"));
    let unchanged = run_json(&temp_dir, &["pipelines", "show", &first, "--json"]);
    assert_eq!(unchanged["pipeline"]["order"], 2);

    new_cmd(&temp_dir)
        .args(&["pipelines", "watch", &first])
        .assert()
        .success()
        .stdout(predicate::str::contains("Watching pipeline 'First' (1 watcher(s))"));
    let watched = run_json(&temp_dir, &["pipelines", "show", &first, "--json"]);
    assert_eq!(watched["pipeline"]["watchedUserIds"], serde_json::json!(["u-7"]));

    new_cmd(&temp_dir)
        .args(&["pipelines", "watch", &first, "--remove"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Stopped watching"));
}

#[test]
fn test_template_edit_clears_category() {
    let (temp_dir, _guard) = setup_test_env();
    let category = create(&temp_dir, &["categories", "add", "Sales", "sales", "--content-type", "sales:board"]);
    let template = create(&temp_dir, &[
        "templates", "add", "Std", "--content", "{}", "--category", &category, "--description", "Ours",
    ]);

    new_cmd(&temp_dir)
        .args(&["templates", "edit", &template, "--category", "", "--description", ""])
        .assert()
        .success();
    let shown = run_json(&temp_dir, &["templates", "show", &template, "--json"]);
    assert_eq!(shown["category"], serde_json::Value::Null);
    assert_eq!(shown["description"], serde_json::Value::Null);
}

#[test]
fn test_malformed_board_template_is_not_restored() {
    let (temp_dir, _guard) = setup_test_env();
    let template = create(&temp_dir, &[
        "templates", "add", "Broken", "--content-type", "sales:board",
        "--content", r#"{"board":{"name":"  "},"pipelines":[]}"#,
    ]);

    let raw = run_json(&temp_dir, &["templates", "use", &template]);
    assert_eq!(raw["id"], template.as_str());
    new_cmd(&temp_dir)
        .args(&["boards", "list"])
        .assert()
        .success()
        .stdout(predicate::str::contains("No boards found"));
}
