mod support;

use predicates::str::contains;
use serde_json::Value;

use support::{add_task, tb_cmd, TestBoard};

#[test]
fn add_reports_the_new_task() {
    let board = TestBoard::new();

    tb_cmd(&board)
        .args(["add", "Buy milk", "--note", "half-fat"])
        .assert()
        .success()
        .stdout(contains("Added 'Buy milk'"))
        .stdout(contains("half-fat"));

    let tasks = board.read_tasks();
    assert_eq!(tasks.len(), 1);
    assert_eq!(tasks[0]["title"], "Buy milk");
    assert_eq!(tasks[0]["note"], "half-fat");
    assert_eq!(tasks[0]["status"], "todo");
}

#[test]
fn add_json_envelope_carries_the_task() {
    let board = TestBoard::new();

    let stdout = tb_cmd(&board)
        .args(["add", "Write report", "--json"])
        .assert()
        .success()
        .get_output()
        .stdout
        .clone();

    let value: Value = serde_json::from_slice(&stdout).expect("envelope json");
    assert_eq!(value["schema_version"], "tb.v1");
    assert_eq!(value["command"], "add");
    assert_eq!(value["status"], "success");
    assert_eq!(value["data"]["title"], "Write report");
    assert_eq!(value["data"]["status"], "todo");
    assert!(value["data"]["id"].as_str().is_some());
    assert!(value["data"]["createdAt"].as_i64().is_some());
}

#[test]
fn new_tasks_go_on_top() {
    let board = TestBoard::new();
    add_task(&board, "First task");
    add_task(&board, "Second task");

    let tasks = board.read_tasks();
    assert_eq!(tasks[0]["title"], "Second task");
    assert_eq!(tasks[1]["title"], "First task");
}

#[test]
fn add_rejects_bad_titles_without_writing() {
    let board = TestBoard::new();

    tb_cmd(&board)
        .args(["add", "   "])
        .assert()
        .failure()
        .code(3)
        .stderr(contains("title is required"));

    tb_cmd(&board)
        .args(["add", "ab"])
        .assert()
        .failure()
        .code(3)
        .stderr(contains("title must be at least 3 characters"));

    tb_cmd(&board)
        .arg("add")
        .arg("x".repeat(81))
        .assert()
        .failure()
        .code(3)
        .stderr(contains("title must be at most 80 characters"));

    assert!(!board.tasks_path().exists());
}

#[test]
fn duplicate_titles_fail_case_insensitively() {
    let board = TestBoard::new();
    add_task(&board, "Buy milk");

    tb_cmd(&board)
        .args(["add", "  BUY MILK  "])
        .assert()
        .failure()
        .code(3)
        .stderr(contains("a task with this title already exists"))
        .stderr(contains("hint: tb list to see existing titles"));

    assert_eq!(board.read_tasks().len(), 1);
}

#[test]
fn validation_error_envelope_with_json() {
    let board = TestBoard::new();

    let stdout = tb_cmd(&board)
        .args(["add", "ab", "--json"])
        .assert()
        .failure()
        .code(3)
        .get_output()
        .stdout
        .clone();

    let value: Value = serde_json::from_slice(&stdout).expect("error envelope");
    assert_eq!(value["status"], "error");
    assert_eq!(value["kind"], "validation_failed");
    assert_eq!(value["error"]["code"], 3);
    assert_eq!(value["error"]["error"], "title must be at least 3 characters");
}

#[test]
fn toggle_accepts_a_unique_id_prefix() {
    let board = TestBoard::new();
    let id = add_task(&board, "Flip me");

    tb_cmd(&board)
        .args(["toggle", &id[..8]])
        .assert()
        .success()
        .stdout(contains("Toggled 'Flip me'"))
        .stdout(contains("done"));

    assert_eq!(board.read_tasks()[0]["status"], "done");

    tb_cmd(&board)
        .args(["toggle", &id])
        .assert()
        .success()
        .stdout(contains("todo"));

    assert_eq!(board.read_tasks()[0]["status"], "todo");
}

#[test]
fn toggle_unknown_id_is_a_successful_noop() {
    let board = TestBoard::new();
    add_task(&board, "Keep me");

    let stdout = tb_cmd(&board)
        .args(["toggle", "ffffffff", "--json"])
        .assert()
        .success()
        .get_output()
        .stdout
        .clone();

    let value: Value = serde_json::from_slice(&stdout).expect("envelope");
    assert_eq!(value["data"]["changed"], false);
    assert!(value["warnings"][0]
        .as_str()
        .expect("warning")
        .contains("no task matches 'ffffffff'"));
    assert_eq!(board.read_tasks()[0]["status"], "todo");
}

#[test]
fn ambiguous_prefix_is_an_error() {
    let board = TestBoard::new();
    board.write_tasks_raw(
        r#"[
            {"id":"aaaa1111-0000-4000-8000-000000000000","title":"First task","note":"","status":"todo","createdAt":1700000000000},
            {"id":"aaaa2222-0000-4000-8000-000000000000","title":"Second task","note":"","status":"todo","createdAt":1700000000001}
        ]"#,
    );

    tb_cmd(&board)
        .args(["toggle", "aaaa"])
        .assert()
        .failure()
        .code(2)
        .stderr(contains("Ambiguous task id prefix: aaaa matches 2 tasks"))
        .stderr(contains("hint: tb list --json to see full ids"));
}

#[test]
fn move_sets_the_status_unconditionally() {
    let board = TestBoard::new();
    let id = add_task(&board, "Shift me");

    tb_cmd(&board)
        .args(["move", &id, "done"])
        .assert()
        .success()
        .stdout(contains("Moved 'Shift me' to done"));
    assert_eq!(board.read_tasks()[0]["status"], "done");

    // Moving onto the current status is a harmless write-through.
    let stdout = tb_cmd(&board)
        .args(["move", &id, "done", "--json"])
        .assert()
        .success()
        .get_output()
        .stdout
        .clone();
    let value: Value = serde_json::from_slice(&stdout).expect("envelope");
    assert_eq!(value["data"]["changed"], true);
    assert_eq!(value["data"]["status"], "done");
}

#[test]
fn move_rejects_unknown_statuses() {
    let board = TestBoard::new();
    let id = add_task(&board, "Stay put");

    tb_cmd(&board)
        .args(["move", &id, "archived"])
        .assert()
        .failure()
        .code(2)
        .stderr(contains("unknown status 'archived'"));

    assert_eq!(board.read_tasks()[0]["status"], "todo");
}

#[test]
fn delete_then_delete_again() {
    let board = TestBoard::new();
    let id = add_task(&board, "Short lived");

    tb_cmd(&board)
        .args(["delete", &id])
        .assert()
        .success()
        .stdout(contains("Deleted 'Short lived'"));
    assert_eq!(board.read_tasks().len(), 0);

    // The id no longer matches anything, so the repeat is a no-op.
    let stdout = tb_cmd(&board)
        .args(["delete", &id, "--json"])
        .assert()
        .success()
        .get_output()
        .stdout
        .clone();
    let value: Value = serde_json::from_slice(&stdout).expect("envelope");
    assert_eq!(value["data"]["changed"], false);
}

#[test]
fn list_shows_tasks_and_counts() {
    let board = TestBoard::new();
    add_task(&board, "First task");
    let second = add_task(&board, "Second task");
    tb_cmd(&board)
        .args(["toggle", &second])
        .assert()
        .success();

    let stdout = tb_cmd(&board)
        .args(["list", "--json"])
        .assert()
        .success()
        .get_output()
        .stdout
        .clone();
    let value: Value = serde_json::from_slice(&stdout).expect("envelope");
    assert_eq!(value["command"], "list");
    assert_eq!(value["data"]["todo"], 1);
    assert_eq!(value["data"]["done"], 1);
    assert_eq!(value["data"]["tasks"].as_array().expect("tasks").len(), 2);

    tb_cmd(&board)
        .arg("list")
        .assert()
        .success()
        .stdout(contains("Tasks"))
        .stdout(contains("[x]"))
        .stdout(contains("[ ]"));
}

#[test]
fn list_filters_by_status_and_limits() {
    let board = TestBoard::new();
    add_task(&board, "First task");
    add_task(&board, "Second task");
    let third = add_task(&board, "Third task");
    tb_cmd(&board).args(["toggle", &third]).assert().success();

    let stdout = tb_cmd(&board)
        .args(["list", "--status", "done", "--json"])
        .assert()
        .success()
        .get_output()
        .stdout
        .clone();
    let value: Value = serde_json::from_slice(&stdout).expect("envelope");
    let tasks = value["data"]["tasks"].as_array().expect("tasks");
    assert_eq!(tasks.len(), 1);
    assert_eq!(tasks[0]["title"], "Third task");

    let stdout = tb_cmd(&board)
        .args(["list", "--limit", "1", "--json"])
        .assert()
        .success()
        .get_output()
        .stdout
        .clone();
    let value: Value = serde_json::from_slice(&stdout).expect("envelope");
    assert_eq!(value["data"]["tasks"].as_array().expect("tasks").len(), 1);
    // Counts describe the whole board, not the truncated page.
    assert_eq!(value["data"]["todo"], 2);

    tb_cmd(&board)
        .args(["list", "--status", "archived"])
        .assert()
        .failure()
        .code(2);
}

#[test]
fn empty_board_lists_cleanly() {
    let board = TestBoard::new();

    tb_cmd(&board)
        .arg("list")
        .assert()
        .success()
        .stdout(contains("No tasks yet"));
}

#[test]
fn quiet_suppresses_human_output() {
    let board = TestBoard::new();

    tb_cmd(&board)
        .args(["-q", "add", "Silent task"])
        .assert()
        .success()
        .stdout("");

    assert_eq!(board.read_tasks().len(), 1);
}
