use assert_cmd::Command;
use predicates::prelude::PredicateBooleanExt;
use predicates::str::{contains, is_empty};
use serde_json::{Value, json};
use std::fs;
use std::path::PathBuf;
use std::time::{SystemTime, UNIX_EPOCH};
use wiremock::matchers::{header, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

const ENV_VARS: [&str; 8] = [
    "STRAICO_API_KEY",
    "STRAICO_BASE_URL",
    "STRAICO_TIMEOUT",
    "STRAICO_CONTINUE_ON_FAIL",
    "STRAICO_OUTPUT",
    "STRAICO_CONFIG",
    "STRAICO_MODEL",
    "RUST_LOG",
];

fn straico_cmd() -> Command {
    let mut cmd = Command::new(assert_cmd::cargo::cargo_bin!("straico"));
    for var in ENV_VARS {
        cmd.env_remove(var);
    }
    cmd
}

fn complete_cmd() -> Command {
    let mut cmd = Command::new(assert_cmd::cargo::cargo_bin!("straico-complete"));
    for var in ENV_VARS {
        cmd.env_remove(var);
    }
    cmd
}

fn unique_temp_path(label: &str) -> PathBuf {
    let nanos = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .unwrap_or_default()
        .as_nanos();
    std::env::temp_dir().join(format!("straico-test-{nanos}-{label}"))
}

fn parse_stdout_json(output: &[u8]) -> Value {
    let text = String::from_utf8(output.to_vec()).expect("stdout should be utf-8");
    serde_json::from_str(text.trim()).expect("stdout should contain valid JSON")
}

#[test]
fn dry_run_prompt_completion_shows_json_body() {
    let assert = straico_cmd()
        .args([
            "run",
            "--resource",
            "promptCompletion",
            "--operation",
            "execute",
            "--param",
            "model=gpt-4o-mini",
            "--param",
            "message=hi",
            "--param",
            "additionalFields={\"temperature\":0.2}",
            "--dry-run",
        ])
        .assert()
        .success();

    let body = parse_stdout_json(&assert.get_output().stdout);
    assert_eq!(body[0]["dry_run"], Value::Bool(true));
    assert_eq!(body[0]["action"], json!("Execute a prompt completion"));
    assert_eq!(body[0]["base_url"], json!("https://api.straico.com"));
    assert_eq!(body[0]["request"]["method"], json!("POST"));
    assert_eq!(body[0]["request"]["path"], json!("/v0/prompt/completion"));
    assert_eq!(
        body[0]["request"]["body"],
        json!({"model": "gpt-4o-mini", "message": "hi", "temperature": 0.2})
    );
}

#[test]
fn dry_run_needs_no_api_key_and_never_sends_authorization() {
    let assert = straico_cmd()
        .args(["run", "--resource", "models", "--operation", "get", "--dry-run"])
        .assert()
        .success();

    let body = parse_stdout_json(&assert.get_output().stdout);
    assert_eq!(body[0]["request"]["headers"], json!({}));
}

#[test]
fn dry_run_reads_items_and_attaches_files() {
    let upload = unique_temp_path("upload.png");
    fs::write(&upload, b"PNG").expect("upload should be writable");
    let input = unique_temp_path("items.json");
    fs::write(
        &input,
        r#"[{"params":{"ragId":"r1","fileBinaryData":true}},{"params":{"ragId":"r2"}}]"#,
    )
    .expect("input should be writable");

    let file_arg = format!("data={}", upload.display());
    let assert = straico_cmd()
        .args(["run", "--resource", "rag", "--operation", "update", "--input"])
        .arg(&input)
        .args(["--file", &file_arg, "--dry-run"])
        .assert()
        .success();

    let body = parse_stdout_json(&assert.get_output().stdout);
    let file_name = upload
        .file_name()
        .and_then(|name| name.to_str())
        .expect("file name")
        .to_string();
    assert_eq!(body[0]["request"]["method"], json!("PUT"));
    assert_eq!(body[0]["request"]["bodyKind"], json!("multipart"));
    assert_eq!(
        body[0]["request"]["body"]["file"],
        json!({"filename": file_name, "mimeType": "image/png", "size": 3})
    );
    assert_eq!(body[1]["request"]["path"], json!("/v0/rag/r2"));
    assert_eq!(body[1]["request"]["bodyKind"], json!("none"));
}

#[test]
fn item_values_win_over_param_flags() {
    let assert = straico_cmd()
        .args(["run", "--resource", "rag", "--operation", "get", "--input", "-"])
        .args(["--param", "ragId=fallback", "--dry-run", "--output", "lines"])
        .write_stdin(r#"[{"params":{"ragId":"own"}},{}]"#)
        .assert()
        .success();

    let stdout = String::from_utf8(assert.get_output().stdout.clone()).expect("utf-8");
    let lines: Vec<Value> = stdout
        .lines()
        .map(|line| serde_json::from_str(line).expect("each line is JSON"))
        .collect();
    assert_eq!(lines.len(), 2);
    assert_eq!(lines[0]["request"]["path"], json!("/v0/rag/own"));
    assert_eq!(lines[1]["request"]["path"], json!("/v0/rag/fallback"));
}

#[test]
fn unsupported_pair_fails_with_configuration_error() {
    straico_cmd()
        .args(["run", "--resource", "models", "--operation", "delete", "--dry-run"])
        .assert()
        .failure()
        .stderr(contains(
            "The operation 'delete' is not supported for resource 'models'",
        ));
}

#[test]
fn continue_on_fail_records_dry_run_errors() {
    let assert = straico_cmd()
        .args(["run", "--resource", "rag", "--operation", "get", "--input", "-"])
        .args(["--continue-on-fail", "--dry-run"])
        .write_stdin(r#"[{}, {"params":{"ragId":"ok"}}]"#)
        .assert()
        .success();

    let body = parse_stdout_json(&assert.get_output().stdout);
    assert_eq!(body[0], json!({"error": "Missing required parameter 'ragId'"}));
    assert_eq!(body[1]["request"]["path"], json!("/v0/rag/ok"));
}

#[test]
fn invalid_resource_lists_supported_values() {
    straico_cmd()
        .args(["run", "--resource", "files", "--operation", "get"])
        .assert()
        .failure()
        .stderr(contains(
            "Invalid resource 'files'. Supported values: models, promptCompletion, rag, agents.",
        ));
}

#[test]
fn missing_api_key_is_reported() {
    straico_cmd()
        .args(["run", "--resource", "agents", "--operation", "get"])
        .args(["--base-url", "http://127.0.0.1:1"])
        .assert()
        .failure()
        .stderr(contains("STRAICO_API_KEY is not set in the environment"));
}

#[tokio::test(flavor = "multi_thread")]
async fn run_against_server_prints_flattened_output() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/v0/models"))
        .and(header("authorization", "Bearer cli-secret"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([{"model": "a"}, {"model": "b"}])))
        .expect(1)
        .mount(&server)
        .await;

    let assert = straico_cmd()
        .env("STRAICO_API_KEY", "cli-secret")
        .args(["run", "--resource", "models", "--operation", "get", "--verbose"])
        .args(["--base-url", &server.uri()])
        .assert()
        .success()
        .stderr(
            contains("api_key_present=true")
                .and(contains("action=\"Get a list of available models\""))
                .and(contains("\u{1b}[").not())
                .and(contains("cli-secret").not()),
        );

    let body = parse_stdout_json(&assert.get_output().stdout);
    assert_eq!(body, json!([{"model": "a"}, {"model": "b"}]));
}

#[tokio::test(flavor = "multi_thread")]
async fn credential_test_reports_status() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/v0/models"))
        .and(header("authorization", "Bearer good"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"data": []})))
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/v0/models"))
        .respond_with(ResponseTemplate::new(401).set_body_string("bad key"))
        .mount(&server)
        .await;

    straico_cmd()
        .env("STRAICO_API_KEY", "good")
        .args(["credential", "test", "--base-url", &server.uri()])
        .assert()
        .success()
        .stdout(contains("credential OK"));

    straico_cmd()
        .env("STRAICO_API_KEY", "nope")
        .args(["credential", "test", "--base-url", &server.uri()])
        .assert()
        .failure()
        .stderr(contains("credential test failed: Straico API error 401 Unauthorized: bad key"));
}

#[test]
fn complete_dry_run_uses_argument_over_stdin() {
    let assert = straico_cmd()
        .args(["complete", "--model", "gpt-4o-mini", "--max-tokens", "128", "--dry-run"])
        .arg("argument prompt")
        .write_stdin("stdin prompt")
        .assert()
        .success();

    let body = parse_stdout_json(&assert.get_output().stdout);
    assert_eq!(
        body[0]["request"]["body"],
        json!({"model": "gpt-4o-mini", "message": "argument prompt", "max_tokens": 128})
    );
}

#[test]
fn complete_reads_message_from_stdin() {
    let assert = complete_cmd()
        .env("STRAICO_MODEL", "env-model")
        .args(["--dry-run"])
        .write_stdin("piped prompt")
        .assert()
        .success();

    let body = parse_stdout_json(&assert.get_output().stdout);
    assert_eq!(body[0]["request"]["body"]["model"], json!("env-model"));
    assert_eq!(body[0]["request"]["body"]["message"], json!("piped prompt"));
}

#[test]
fn complete_without_model_returns_explicit_error() {
    complete_cmd()
        .arg("hello")
        .assert()
        .failure()
        .stderr(contains("No model provided. Use --model or set STRAICO_MODEL."));
}

#[test]
fn complete_rejects_out_of_range_temperature() {
    straico_cmd()
        .args(["complete", "--model", "m", "--temperature", "2.5", "--dry-run", "hi"])
        .assert()
        .failure()
        .stderr(contains("Invalid temperature '2.5'"));
}

#[test]
fn profile_supplies_base_url_and_output() {
    let config_path = unique_temp_path("config");
    fs::write(
        &config_path,
        "[profiles.local]\nbase_url = \"http://localhost:8080\"\noutput = \"lines\"\n",
    )
    .expect("config should be writable");

    let assert = straico_cmd()
        .env("STRAICO_CONFIG", &config_path)
        .args(["run", "--resource", "agents", "--operation", "get"])
        .args(["--profile", "local", "--dry-run"])
        .assert()
        .success();

    let stdout = String::from_utf8(assert.get_output().stdout.clone()).expect("utf-8");
    assert_eq!(stdout.lines().count(), 1);
    let line: Value = serde_json::from_str(stdout.trim()).expect("line is JSON");
    assert_eq!(line["base_url"], json!("http://localhost:8080"));
}

#[test]
fn env_and_cli_precedence_is_respected() {
    let config_path = unique_temp_path("precedence");
    fs::write(&config_path, "[profiles.p]\nbase_url = \"http://profile\"\n")
        .expect("config should be writable");

    let from_env = straico_cmd()
        .env("STRAICO_CONFIG", &config_path)
        .env("STRAICO_BASE_URL", "http://env")
        .args(["run", "--resource", "agents", "--operation", "get"])
        .args(["--profile", "p", "--dry-run"])
        .assert()
        .success();
    let body = parse_stdout_json(&from_env.get_output().stdout);
    assert_eq!(body[0]["base_url"], json!("http://env"));

    let from_cli = straico_cmd()
        .env("STRAICO_CONFIG", &config_path)
        .env("STRAICO_BASE_URL", "http://env")
        .args(["run", "--resource", "agents", "--operation", "get"])
        .args(["--profile", "p", "--base-url", "http://cli", "--dry-run"])
        .assert()
        .success();
    let body = parse_stdout_json(&from_cli.get_output().stdout);
    assert_eq!(body[0]["base_url"], json!("http://cli"));
}

#[test]
fn profile_file_missing_returns_explicit_error() {
    let config_path = unique_temp_path("missing-config");

    straico_cmd()
        .env("STRAICO_CONFIG", &config_path)
        .args(["run", "--resource", "models", "--operation", "get", "--profile", "x"])
        .assert()
        .failure()
        .stderr(contains("Failed to read config file"));
}

#[test]
fn invalid_profile_toml_returns_parse_error() {
    let config_path = unique_temp_path("invalid-toml");
    fs::write(&config_path, "[profiles.bad\nbase_url = \"x\"").expect("config should be writable");

    straico_cmd()
        .env("STRAICO_CONFIG", &config_path)
        .args(["config", "check"])
        .assert()
        .failure()
        .stderr(contains("Failed to parse config file"));
}

#[test]
fn profile_not_found_returns_error() {
    let config_path = unique_temp_path("profile-not-found");
    fs::write(&config_path, "[profiles.work]\n").expect("config should be writable");

    straico_cmd()
        .env("STRAICO_CONFIG", &config_path)
        .args(["run", "--resource", "models", "--operation", "get"])
        .args(["--profile", "missing", "--dry-run"])
        .assert()
        .failure()
        .stderr(contains("Profile 'missing' not found"));
}

#[test]
fn config_check_validates_profiles() {
    let config_path = unique_temp_path("check");
    fs::write(
        &config_path,
        "[profiles.good]\noutput = \"json\"\n[profiles.bad]\noutput = \"yaml\"\n",
    )
    .expect("config should be writable");

    straico_cmd()
        .env("STRAICO_CONFIG", &config_path)
        .args(["config", "check", "--profile", "good"])
        .assert()
        .success()
        .stdout(contains("config OK"));

    straico_cmd()
        .env("STRAICO_CONFIG", &config_path)
        .args(["config", "check"])
        .assert()
        .failure()
        .stderr(contains("Invalid profile output 'yaml'"));
}

#[test]
fn version_prints_build_metadata() {
    straico_cmd()
        .arg("--version")
        .assert()
        .success()
        .stdout(contains("commit:").and(contains("built:")));

    complete_cmd()
        .arg("--version")
        .assert()
        .success()
        .stdout(contains("commit:"));
}

#[test]
fn quiet_suppresses_verbose_logs_on_stderr() {
    straico_cmd()
        .args(["run", "--resource", "agents", "--operation", "get"])
        .args(["--dry-run", "--verbose", "--quiet"])
        .assert()
        .success()
        .stderr(is_empty());
}

#[test]
fn quiet_keeps_fatal_errors_visible() {
    complete_cmd()
        .args(["--quiet", "hello"])
        .assert()
        .failure()
        .stderr(contains("No model provided."));
}

#[test]
fn help_mentions_commands_and_examples() {
    straico_cmd()
        .arg("--help")
        .assert()
        .success()
        .stdout(
            contains("completion")
                .and(contains("Generate shell completion script"))
                .and(contains("Examples:")),
        );
}

#[test]
fn completion_scripts_are_generated() {
    straico_cmd()
        .args(["completion", "bash"])
        .assert()
        .success()
        .stdout(contains("_straico").and(contains("complete")));

    straico_cmd()
        .args(["completion", "fish"])
        .assert()
        .success()
        .stdout(contains("complete -c straico"));
}
