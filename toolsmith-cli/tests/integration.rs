use std::fs;
use std::path::Path;

use assert_cmd::Command;
use serde_json::Value;
use tempfile::TempDir;

const PETS_SPEC: &str = r#"
openapi: 3.0.0
info: { title: Pets, version: 1.0.0 }
servers:
  - url: http://127.0.0.1:9
paths:
  /pets:
    get:
      operationId: listPets
      summary: List pets
      tags: [pets]
      parameters:
        - { name: limit, in: query, schema: { type: integer } }
      responses:
        "200": { description: ok }
  /pets/{petId}:
    get:
      operationId: showPet
      summary: Show a pet
      parameters:
        - { name: petId, in: path, required: true, schema: { type: string } }
      responses:
        "200": { description: ok }
"#;

fn spec_dir() -> TempDir {
    let tmp = TempDir::new().unwrap();
    let dir = tmp.path().join("pets");
    fs::create_dir_all(&dir).unwrap();
    fs::write(dir.join("openapi.yaml"), PETS_SPEC).unwrap();
    tmp
}

fn toolsmith(spec_dir: &Path, args: &[&str]) -> Command {
    let mut cmd = Command::cargo_bin("toolsmith").unwrap();
    cmd.env_remove("RUST_LOG")
        .env_remove("TOOLSMITH_BASE_URL")
        .args(args)
        .args(["--format", "json"])
        .arg("--spec-dir")
        .arg(spec_dir);
    cmd
}

fn stdout_json(output: &std::process::Output) -> Value {
    serde_json::from_slice(&output.stdout).expect("stdout is JSON")
}

#[test]
fn tools_lists_generated_and_utility_tools() {
    let tmp = spec_dir();
    let out = toolsmith(tmp.path(), &["tools"]).assert().success();
    let json = stdout_json(out.get_output());
    assert_eq!(json["count"], 5);
    let names: Vec<&str> = json["tools"]
        .as_array()
        .unwrap()
        .iter()
        .map(|t| t["name"].as_str().unwrap())
        .collect();
    assert!(names.contains(&"api_pets_listPets"));
    assert!(names.contains(&"api_raw_request"));
}

#[test]
fn tools_filters_by_query() {
    let tmp = spec_dir();
    let out = toolsmith(tmp.path(), &["tools", "--paginated", "--schemas"])
        .assert()
        .success();
    let json = stdout_json(out.get_output());
    assert_eq!(json["count"], 1);
    assert_eq!(json["tools"][0]["name"], "api_pets_listPets");
    assert_eq!(json["tools"][0]["inputSchema"]["properties"]["limit"]["type"], "integer");
}

#[test]
fn describe_prints_one_definition() {
    let tmp = spec_dir();
    let out = toolsmith(tmp.path(), &["describe", "api_pets_showPet"])
        .assert()
        .success();
    let json = stdout_json(out.get_output());
    assert_eq!(json["inputSchema"]["required"][0], "petId");

    toolsmith(tmp.path(), &["describe", "api_pets_nope"])
        .assert()
        .failure()
        .code(2);
}

#[test]
fn stats_and_check() {
    let tmp = spec_dir();
    let out = toolsmith(tmp.path(), &["stats"]).assert().success();
    let json = stdout_json(out.get_output());
    assert_eq!(json["total"], 2);
    assert_eq!(json["by_product"]["pets"], 2);

    toolsmith(tmp.path(), &["check"]).assert().success();

    let broken = tmp.path().join("broken");
    fs::create_dir_all(&broken).unwrap();
    fs::write(broken.join("openapi.json"), "{ not json").unwrap();
    let out = toolsmith(tmp.path(), &["check"]).assert().failure().code(2);
    let json = stdout_json(out.get_output());
    assert_eq!(json["ok"], false);
    assert_eq!(json["operations"], 2);
}

#[test]
fn missing_spec_dir_is_a_runtime_error() {
    let tmp = TempDir::new().unwrap();
    toolsmith(&tmp.path().join("absent"), &["stats"])
        .assert()
        .failure()
        .code(4);
}

#[test]
fn invoke_reports_normalized_errors() {
    let tmp = spec_dir();
    let out = toolsmith(tmp.path(), &["invoke", "api_pets_showPet", "--args", "{}"])
        .assert()
        .failure()
        .code(3);
    let json = stdout_json(out.get_output());
    assert_eq!(json["error"]["kind"], "validation");
    assert_eq!(json["error"]["issues"][0]["path"], "petId");

    let out = toolsmith(tmp.path(), &["invoke", "api_pets_unknown"])
        .assert()
        .failure()
        .code(3);
    assert_eq!(stdout_json(out.get_output())["error"]["kind"], "configuration");

    toolsmith(tmp.path(), &["invoke", "api_pets_showPet", "--args", "[1, 2]"])
        .assert()
        .failure()
        .code(2);
}

#[test]
fn request_without_a_server_fails_fast() {
    let tmp = spec_dir();
    let out = toolsmith(tmp.path(), &["request", "GET", "/health", "--query", "verbose=1"])
        .assert()
        .failure()
        .code(3);
    let json = stdout_json(out.get_output());
    assert_eq!(json["error"]["kind"], "configuration");
    assert_eq!(json["error"]["retryable"], false);

    toolsmith(tmp.path(), &["request", "GET", "/health", "--header", "novalue"])
        .assert()
        .failure()
        .code(2);
}
