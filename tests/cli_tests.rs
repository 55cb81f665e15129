//! CLI integration tests.

use std::path::{Path, PathBuf};

use assert_cmd::cargo::cargo_bin_cmd;
use assert_cmd::Command;
use predicates::prelude::*;
use tempfile::TempDir;

struct Workspace {
    dir: TempDir,
}

impl Workspace {
    fn new(config: &str) -> Self {
        let dir = tempfile::tempdir().expect("create temp dir");
        std::fs::write(dir.path().join("config.toml"), config).expect("write config");
        Self { dir }
    }

    fn path(&self, name: &str) -> PathBuf {
        self.dir.path().join(name)
    }

    /// `farewatch` pointed at this workspace's config and database.
    fn farewatch(&self) -> Command {
        let mut cmd = cargo_bin_cmd!("farewatch");
        cmd.env_remove("RUST_LOG")
            .arg("--color")
            .arg("never")
            .arg("--config")
            .arg(self.path("config.toml"))
            .arg("--database")
            .arg(self.path("farewatch.db"));
        cmd
    }

    fn add_route(&self) {
        self.farewatch()
            .args([
                "route",
                "add",
                "--name",
                "Paris to New York",
                "--id",
                "paris-nyc",
                "--origin",
                "CDG,ORY",
                "--destination",
                "JFK",
                "--start",
                "2025-05-01",
                "--end",
                "2025-05-31",
                "--min-days",
                "7",
                "--max-days",
                "14",
                "--price-limit",
                "450",
            ])
            .assert()
            .success();
    }
}

fn json_stdout(cmd: &mut Command) -> serde_json::Value {
    let output = cmd.arg("--json").output().expect("run farewatch");
    assert!(
        output.status.success(),
        "stderr: {}",
        String::from_utf8_lossy(&output.stderr)
    );
    serde_json::from_slice(&output.stdout).expect("stdout is one JSON document")
}

#[test]
fn help_lists_commands() {
    cargo_bin_cmd!("farewatch")
        .arg("--help")
        .assert()
        .success()
        .stdout(predicate::str::contains("run"))
        .stdout(predicate::str::contains("route"))
        .stdout(predicate::str::contains("history"))
        .stdout(predicate::str::contains("import"));
}

#[test]
fn version_prints_name() {
    cargo_bin_cmd!("farewatch")
        .arg("--version")
        .assert()
        .success()
        .stdout(predicate::str::contains("farewatch"));
}

#[test]
fn route_lifecycle() {
    let ws = Workspace::new("");
    ws.add_route();

    let listed = json_stdout(ws.farewatch().args(["route", "list"]));
    let routes = listed["routes"].as_array().unwrap();
    assert_eq!(routes.len(), 1);
    assert_eq!(routes[0]["route"]["id"], "paris-nyc");
    assert!(routes[0]["best_ever"].is_null());

    ws.farewatch()
        .args(["route", "show", "paris-nyc"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Paris to New York"));

    ws.farewatch()
        .args(["route", "remove", "paris-nyc"])
        .assert()
        .success();

    ws.farewatch()
        .args(["route", "show", "paris-nyc"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("paris-nyc"));
}

#[test]
fn duplicate_route_fails() {
    let ws = Workspace::new("");
    ws.add_route();
    ws.farewatch()
        .args([
            "route", "add", "--name", "Again", "--id", "paris-nyc", "--origin", "CDG",
            "--destination", "JFK", "--start", "2025-05-01", "--end", "2025-05-31",
            "--min-days", "7", "--max-days", "14",
        ])
        .assert()
        .failure();
}

#[test]
fn invalid_route_arguments_fail() {
    let ws = Workspace::new("");
    ws.farewatch()
        .args([
            "route", "add", "--name", "Backwards", "--origin", "CDG", "--destination", "JFK",
            "--start", "2025-05-31", "--end", "2025-05-01", "--min-days", "7", "--max-days",
            "14",
        ])
        .assert()
        .failure();
}

#[test]
fn import_then_best_and_link() {
    let ws = Workspace::new("");
    ws.add_route();
    let records = ws.path("flight_records.jsonl");
    std::fs::write(
        &records,
        concat!(
            r#"{"date": "2024-05-01", "departure": "CDG", "destination": "JFK", "company": "Air France", "duration_out": "8h", "duration_return": "7h", "price": 512, "dep_date": "2025-05-03", "arrival_date": "2025-05-12"}"#,
            "\n",
            r#"{"date": "2024-05-02", "price": 498}"#,
            "\n",
            r#"{"date": "2024-05-03", "departure": "ORY", "destination": "JFK", "company": "French bee", "duration_out": "8h", "duration_return": "7h", "price": 431, "dep_date": "2025-05-04", "arrival_date": "2025-05-13"}"#,
            "\n",
        ),
    )
    .unwrap();

    let imported = json_stdout(
        ws.farewatch()
            .args(["import", "paris-nyc"])
            .arg(&records),
    );
    assert_eq!(imported["report"]["imported"], 3);

    let best = json_stdout(ws.farewatch().args(["best", "paris-nyc"]));
    assert_eq!(best["best_ever"]["date"], "2024-05-03");

    let history = json_stdout(ws.farewatch().args(["history", "paris-nyc", "--limit", "2"]));
    assert_eq!(history["observations"].as_array().unwrap().len(), 2);

    ws.farewatch()
        .args(["link", "paris-nyc"])
        .assert()
        .success()
        .stdout(predicate::str::contains(
            "https://www.kayak.com/flights/ORY-JFK/2025-05-04/2025-05-13",
        ));
}

#[test]
fn explicit_missing_config_fails() {
    let ws = Workspace::new("");
    cargo_bin_cmd!("farewatch")
        .arg("--config")
        .arg(ws.path("missing.toml"))
        .args(["route", "list"])
        .assert()
        .failure();
}

#[test]
fn invalid_config_points_at_the_field() {
    let ws = Workspace::new("[scheduler]\ninterval_secs = 0\n");
    ws.farewatch()
        .args(["check", "config"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("interval_secs"));
}

#[test]
fn check_config_reports_summary() {
    let ws = Workspace::new("[fetcher]\ntype = \"command\"\nprogram = \"fare-scraper\"\n");
    ws.farewatch()
        .args(["check", "config"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Configuration file is valid"))
        .stdout(predicate::str::contains("fare-scraper"));
}

#[test]
fn run_without_fetcher_fails() {
    let ws = Workspace::new("");
    ws.farewatch()
        .args(["run", "--once"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("fetcher"));
}

fn command_fetcher_config(dir: &Path) -> String {
    let script = dir.join("fetch.sh");
    std::fs::write(
        &script,
        "cat > /dev/null\necho '{\"price\": 321, \"departure\": \"CDG\", \"destination\": \"JFK\"}'\n",
    )
    .unwrap();
    format!(
        "[fetcher]\ntype = \"command\"\nprogram = \"sh\"\nargs = [\"{}\"]\n",
        script.display()
    )
}

#[cfg(unix)]
#[test]
fn run_once_records_a_price_per_route() {
    let dir = tempfile::tempdir().unwrap();
    let ws = Workspace::new(&command_fetcher_config(dir.path()));
    ws.add_route();

    let run = json_stdout(ws.farewatch().args(["run", "--once"]));
    assert_eq!(run["results"][0]["outcome"], "recorded");

    let best = json_stdout(ws.farewatch().args(["best", "paris-nyc"]));
    assert_eq!(best["best_ever"]["price"], "321");
}
