use pretty_assertions::assert_eq;
use std::fs;
use std::path::{Path, PathBuf};
use std::process::{Command, Output};

const DOMAIN: &str = r#"package model

import (
	"github.com/shopspring/decimal"
	"gorm.io/gorm"
)

type VehicleForSale struct {
	gorm.Model
	Amount decimal.Decimal `goalesce:"map:ParseAmount;map_api:FormatAmount"`
	Parts  []Part
}

type Part struct {
	gorm.Model
	Name string
}
"#;

const WIRE: &str = r#"package api

import "time"

type VehicleForSale struct {
	ID        uint
	CreatedAt time.Time
	UpdatedAt time.Time
	DeletedAt *time.Time
	Amount    string
	Parts     *[]PartApi
}
"#;

fn write(dir: &Path, name: &str, body: &str) -> PathBuf {
    let path = dir.join(name);
    fs::write(&path, body).unwrap();
    path
}

fn goalesce(args: &[&str]) -> Output {
    Command::new(env!("CARGO_BIN_EXE_goalesce"))
        .args(args)
        .env_remove("RUST_LOG")
        .env_remove("GOALESCE_CONFIG")
        .output()
        .unwrap()
}

fn json(output: &Output) -> serde_json::Value {
    assert!(output.status.success(), "{}", String::from_utf8_lossy(&output.stderr));
    serde_json::from_slice(&output.stdout).unwrap()
}

#[test]
fn test_plan_command() {
    let dir = tempfile::tempdir().unwrap();
    let models = write(dir.path(), "models.go", DOMAIN);
    let wire = write(dir.path(), "api.go", WIRE);

    let output = goalesce(&["plan", models.to_str().unwrap(), wire.to_str().unwrap()]);
    let doc = json(&output);

    assert_eq!(doc.as_array().map(Vec::len), Some(1));
    let to_wire = &doc[0]["to_wire"];
    assert_eq!(to_wire[4]["descriptor"]["function"], "FormatAmount");
    assert_eq!(to_wire[5]["descriptor"]["entry_point"], "MapPtrSlice");
    assert_eq!(to_wire[5]["descriptor"]["guarded"], true);
    assert_eq!(doc[0]["to_domain"][4]["descriptor"]["function"], "ParseAmount");

    // Part has no wire counterpart.
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("no wire model found"), "{}", stderr);
}

#[test]
fn test_plan_with_wire_section() {
    let dir = tempfile::tempdir().unwrap();
    let models = write(dir.path(), "models.go", DOMAIN);
    let wire = write(dir.path(), "api.go", WIRE);
    let config = write(dir.path(), "goalesce.yaml", "wire:\n  module_name: example.com/app\n");

    let doc = json(&goalesce(&[
        "--config",
        config.to_str().unwrap(),
        "plan",
        models.to_str().unwrap(),
        wire.to_str().unwrap(),
    ]));
    assert_eq!(doc.as_array().map(Vec::len), Some(1));
    assert_eq!(doc[0]["model"], "VehicleForSale");
}

#[test]
fn test_inspect_with_config() {
    let dir = tempfile::tempdir().unwrap();
    let models = write(
        dir.path(),
        "models.go",
        "package model\ntype Filter struct {\n\tQuery string\n}\n",
    );
    let config = write(dir.path(), "goalesce.yaml", "domain:\n  allow_custom_models: true\n");

    let strict = json(&goalesce(&["inspect", models.to_str().unwrap()]));
    assert_eq!(strict["models"].as_array().map(Vec::len), Some(0));
    assert_eq!(strict["rejected"][0]["name"], "Filter");

    let permissive = json(&goalesce(&[
        "--config",
        config.to_str().unwrap(),
        "inspect",
        models.to_str().unwrap(),
    ]));
    assert_eq!(permissive["models"][0]["fields"][0]["name"], "Query");
}

#[test]
fn test_project_command() {
    let dir = tempfile::tempdir().unwrap();
    let models = write(dir.path(), "models.go", DOMAIN);
    let doc = json(&goalesce(&["project", models.to_str().unwrap()]));

    assert_eq!(doc[0]["model"], "VehicleForSale");
    let amount = &doc[0]["properties"][4];
    assert_eq!(amount["property"], "amount");
    assert_eq!(amount["wire_type"]["kind"], "string");
    assert_eq!(amount["wire_type"]["format"], "decimal");
}

#[test]
fn test_declaration_error_fails() {
    let dir = tempfile::tempdir().unwrap();
    let models = write(dir.path(), "models.go", "package model\ntype X struct {\n\tA int =\n}\n");
    let output = goalesce(&["inspect", models.to_str().unwrap()]);
    assert!(!output.status.success());
    assert!(String::from_utf8_lossy(&output.stderr).contains("line 3"));
}
