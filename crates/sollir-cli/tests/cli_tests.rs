use assert_cmd::Command;
use predicates::prelude::*;
use std::io::Write;
use tempfile::NamedTempFile;

const COUNTER: &str = r#"{
    "contract": "Counter",
    "functions": [
        {
            "name": "sum_odd",
            "returns": "uint256",
            "body": [
                {
                    "stmt": "decl",
                    "var": { "id": 0, "name": "sum", "ty": "uint256" },
                    "init": { "ty": "uint256", "kind": { "expr": "literal", "value": { "number": "0" } } }
                },
                {
                    "stmt": "for",
                    "init": {
                        "stmt": "decl",
                        "var": { "id": 1, "name": "i", "ty": "uint256" },
                        "init": { "ty": "uint256", "kind": { "expr": "literal", "value": { "number": "0" } } }
                    },
                    "cond": {
                        "ty": "bool",
                        "kind": {
                            "expr": "binary", "op": "lt",
                            "left": { "ty": "uint256", "kind": { "expr": "var", "decl": 1 } },
                            "right": { "ty": "uint256", "kind": { "expr": "literal", "value": { "number": "3" } } }
                        }
                    },
                    "post": {
                        "ty": "uint256",
                        "kind": {
                            "expr": "assign", "op": "add",
                            "target": { "ty": "uint256", "kind": { "expr": "var", "decl": 1 } },
                            "value": { "ty": "uint256", "kind": { "expr": "literal", "value": { "number": "1" } } }
                        }
                    },
                    "body": { "stmt": "continue" }
                },
                {
                    "stmt": "return",
                    "value": { "ty": "uint256", "kind": { "expr": "var", "decl": 0 } }
                },
                {
                    "stmt": "expr",
                    "expr": {
                        "ty": "uint256",
                        "kind": {
                            "expr": "assign",
                            "target": { "ty": "uint256", "kind": { "expr": "var", "decl": 0 } },
                            "value": { "ty": "uint256", "kind": { "expr": "literal", "value": { "number": "9" } } }
                        }
                    }
                }
            ]
        }
    ]
}"#;

const BROKEN: &str = r#"{
    "contract": "Broken",
    "functions": [
        { "name": "oops", "body": [ { "stmt": "break" } ] }
    ]
}"#;

fn fixture(content: &str) -> NamedTempFile {
    let mut file = NamedTempFile::new().unwrap();
    file.write_all(content.as_bytes()).unwrap();
    file
}

fn sollir() -> Command {
    Command::cargo_bin("sollir").unwrap()
}

#[test]
fn test_emit_ir_prints_blocks() {
    let input = fixture(COUNTER);
    sollir()
        .arg("compile")
        .arg(input.path())
        .assert()
        .success()
        .stdout(predicate::str::contains("contract Counter {"))
        .stdout(predicate::str::contains("; for.inc"))
        .stdout(predicate::str::contains("; unreachable (unreachable)"));
}

#[test]
fn test_optimised_build_drops_unreachable_blocks() {
    let input = fixture(COUNTER);
    sollir()
        .arg("compile")
        .arg(input.path())
        .arg("-O2")
        .assert()
        .success()
        .stdout(predicate::str::contains("unreachable").not());
}

#[test]
fn test_emit_json_to_file() {
    let input = fixture(COUNTER);
    let dir = tempfile::tempdir().unwrap();
    let out = dir.path().join("counter.json");

    sollir()
        .arg("compile")
        .arg(input.path())
        .args(["--action", "emit-json", "-o"])
        .arg(&out)
        .assert()
        .success()
        .stdout(predicate::str::is_empty());

    let written = std::fs::read_to_string(&out).unwrap();
    let json: serde_json::Value = serde_json::from_str(&written).unwrap();
    assert_eq!(json["name"], "Counter");
    assert!(json["functions"]["sum_odd()"].is_object());
}

#[test]
fn test_ast_dump_and_syntax_only() {
    let input = fixture(COUNTER);
    sollir()
        .arg("compile")
        .arg(input.path())
        .args(["--action", "ast-dump"])
        .assert()
        .success()
        .stdout(predicate::str::contains("\"contract\": \"Counter\""));

    sollir()
        .arg("compile")
        .arg(input.path())
        .args(["--action", "syntax-only"])
        .assert()
        .success()
        .stdout(predicate::str::is_empty());
}

#[test]
fn test_invariant_violation_fails() {
    let input = fixture(BROKEN);
    sollir()
        .arg("compile")
        .arg(input.path())
        .assert()
        .failure()
        .code(1)
        .stderr(predicate::str::contains("oops"))
        .stderr(predicate::str::contains("outside of a loop"));
}

#[test]
fn test_malformed_input_fails() {
    let input = fixture("{ \"contract\": 3 }");
    sollir()
        .arg("compile")
        .arg(input.path())
        .assert()
        .failure()
        .stderr(predicate::str::contains("failed to parse"));
}

#[test]
fn test_debug_summary() {
    let input = fixture(COUNTER);
    sollir()
        .arg("debug")
        .arg(input.path())
        .assert()
        .success()
        .stdout(predicate::str::contains("Function: sum_odd"))
        .stdout(predicate::str::contains("Signature: sum_odd()"));
}

#[test]
fn test_deploy_defaults_to_chain() {
    let input = fixture(COUNTER);
    sollir()
        .arg("compile")
        .arg(input.path())
        .arg("--verbose")
        .assert()
        .success()
        .stderr(predicate::str::contains("deploy: Chain"));

    sollir()
        .arg("compile")
        .arg(input.path())
        .arg("--verbose")
        .args(["--deploy", "normal"])
        .assert()
        .success()
        .stderr(predicate::str::contains("deploy: Normal"));
}
