use std::fs;
use std::path::{Path, PathBuf};

use assert_cmd::Command;
use serde_json::Value;
use tempfile::TempDir;

/// A scratch data directory plus helpers to run `tb` against it and to
/// inspect the files it writes.
pub struct TestBoard {
    dir: TempDir,
}

impl TestBoard {
    pub fn new() -> Self {
        let dir = tempfile::tempdir().expect("failed to create tempdir");
        Self { dir }
    }

    pub fn data_dir(&self) -> &Path {
        self.dir.path()
    }

    pub fn tasks_path(&self) -> PathBuf {
        self.dir.path().join("tasks.v1.json")
    }

    pub fn events_path(&self) -> PathBuf {
        self.dir.path().join("events.jsonl")
    }

    pub fn read_tasks(&self) -> Vec<Value> {
        let contents = fs::read_to_string(self.tasks_path()).expect("tasks file");
        serde_json::from_str(&contents).expect("tasks json")
    }

    pub fn write_tasks_raw(&self, contents: &str) {
        fs::write(self.tasks_path(), contents).expect("write tasks file");
    }

    pub fn read_events(&self) -> Vec<Value> {
        let contents = fs::read_to_string(self.events_path()).expect("events file");
        contents
            .lines()
            .filter(|line| !line.trim().is_empty())
            .map(|line| serde_json::from_str(line).expect("event json"))
            .collect()
    }
}

pub fn tb_cmd(board: &TestBoard) -> Command {
    let mut cmd = Command::cargo_bin("tb").expect("binary");
    cmd.env("TB_DATA_DIR", board.data_dir());
    cmd.env_remove("TB_EVENTS");
    // Keep any config.toml on the host machine out of the test run.
    cmd.env("XDG_CONFIG_HOME", board.data_dir());
    cmd
}

/// Add a task and return its full id from the JSON envelope.
pub fn add_task(board: &TestBoard, title: &str) -> String {
    let stdout = tb_cmd(board)
        .args(["add", title, "--json"])
        .assert()
        .success()
        .get_output()
        .stdout
        .clone();
    let value: Value = serde_json::from_slice(&stdout).expect("add output");
    value["data"]["id"].as_str().expect("task id").to_string()
}
