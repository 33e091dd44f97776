use std::path::{Path, PathBuf};
use std::process::{Command, Output};
use std::time::{SystemTime, UNIX_EPOCH};

fn temp_path(file_name: &str) -> PathBuf {
    let nanos = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .unwrap()
        .as_nanos();
    std::env::temp_dir().join(format!("reno-{nanos}-{file_name}"))
}

fn reno(store_path: &Path, args: &[&str]) -> Output {
    Command::new(env!("CARGO_BIN_EXE_reno"))
        .args(args)
        .env("RENO_STORE_PATH", store_path)
        .env("RENO_CONFIG_PATH", store_path.with_extension("config.json"))
        .env("RENO_TODAY", "2024-01-01")
        .env_remove("RENO_LOG")
        .output()
        .expect("failed to run reno")
}

fn seed_kitchen(store_path: &Path, statuses: &[&str]) {
    let ids: Vec<String> = (1..=statuses.len()).map(|n| format!("T{n}")).collect();
    let tasks: Vec<serde_json::Value> = statuses
        .iter()
        .zip(&ids)
        .map(|(status, id)| {
            serde_json::json!({
                "id": id,
                "zone_id": "kitchen",
                "description": format!("step {id}"),
                "status": status
            })
        })
        .collect();
    let content = serde_json::json!({
        "schema_version": 1,
        "zones": [{ "id": "kitchen", "name": "Kitchen", "tasks": ids }],
        "tasks": tasks
    });
    std::fs::write(store_path, serde_json::to_string_pretty(&content).unwrap()).unwrap();
}

#[test]
fn kitchen_with_two_of_four_done_is_half_done() {
    let store_path = temp_path("cli-progress.json");
    seed_kitchen(&store_path, &["done", "done", "pending", "in_progress"]);

    let output = reno(&store_path, &["--json", "show-progress", "kitchen"]);
    assert!(output.status.success());
    let parsed: serde_json::Value =
        serde_json::from_str(&String::from_utf8_lossy(&output.stdout)).expect("json output");
    assert_eq!(parsed["overall_percent"], 50.0);
    assert_eq!(parsed["zones"][0]["zone_id"], "kitchen");
    assert_eq!(parsed["zones"][0]["percent_done"], 50.0);

    let output = reno(&store_path, &["show-progress"]);
    std::fs::remove_file(&store_path).ok();

    assert!(output.status.success());
    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(stdout.contains("Kitchen"));
    assert!(stdout.contains("50.0%"));
    assert!(stdout.contains("(2/4 done)"));
}

#[test]
fn empty_zone_reports_zero() {
    let store_path = temp_path("cli-progress-empty.json");
    seed_kitchen(&store_path, &[]);

    let output = reno(&store_path, &["--json", "show-progress", "kitchen"]);
    std::fs::remove_file(&store_path).ok();

    assert!(output.status.success());
    let parsed: serde_json::Value =
        serde_json::from_str(&String::from_utf8_lossy(&output.stdout)).expect("json output");
    assert_eq!(parsed["zones"][0]["percent_done"], 0.0);
}

#[test]
fn overview_estimates_completion() {
    let store_path = temp_path("cli-overview.json");
    seed_kitchen(&store_path, &["done", "pending", "pending"]);

    let output = reno(&store_path, &["--json", "overview"]);
    assert!(output.status.success());
    let parsed: serde_json::Value =
        serde_json::from_str(&String::from_utf8_lossy(&output.stdout)).expect("json output");
    assert_eq!(parsed["remaining_effort_days"], 2.0);
    assert_eq!(parsed["estimated_completion"], "2024-01-07");
    assert_eq!(parsed["recommended"][0]["id"], "T2");
    assert_eq!(parsed["recommended"][1]["id"], "T3");
    assert_eq!(parsed["priority_tasks"], serde_json::json!([]));

    let output = reno(
        &store_path,
        &["--config-override", "hours_per_day=8", "--json", "overview"],
    );
    std::fs::remove_file(&store_path).ok();

    assert!(output.status.success());
    let parsed: serde_json::Value =
        serde_json::from_str(&String::from_utf8_lossy(&output.stdout)).expect("json output");
    assert_eq!(parsed["estimated_completion"], "2024-01-03");
}

#[test]
fn bad_config_override_is_rejected() {
    let store_path = temp_path("cli-override.json");

    let output = reno(&store_path, &["--config-override", "colour=blue", "zones"]);

    assert_eq!(output.status.code(), Some(1));
    assert!(String::from_utf8_lossy(&output.stderr).contains("ERROR: invalid_input"));
}
