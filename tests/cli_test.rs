//! CLI integration tests for schema-forms binary.

use assert_cmd::Command;
use predicates::prelude::*;
use std::fs;
use tempfile::TempDir;

fn cmd() -> Command {
    Command::new(assert_cmd::cargo::cargo_bin!("schema-forms"))
}

// Helper to create a temp file
fn write_temp_file(dir: &TempDir, name: &str, content: &str) -> std::path::PathBuf {
    let path = dir.path().join(name);
    fs::write(&path, content).unwrap();
    path
}

const READER_SCHEMA: &str = r#"{
    "type": "object",
    "required": ["file_type"],
    "properties": {
        "file_type": { "enum": ["CSV", "JSON"] },
        "password": { "type": "string", "secret": true }
    },
    "allOf": [{
        "if": { "properties": { "file_type": { "const": "CSV" } } },
        "then": {
            "properties": { "delimiter": { "type": "string" } },
            "required": ["delimiter"]
        }
    }]
}"#;

mod resolve_command {
    use super::*;

    #[test]
    fn applies_matching_branch() {
        let dir = TempDir::new().unwrap();
        let schema = write_temp_file(&dir, "schema.json", READER_SCHEMA);
        let data = write_temp_file(&dir, "data.json", r#"{"file_type":"CSV"}"#);

        cmd()
            .args([
                "resolve",
                schema.to_str().unwrap(),
                "--data",
                data.to_str().unwrap(),
            ])
            .assert()
            .success()
            .stdout(predicate::str::contains(r#""delimiter":{"type":"string"}"#))
            .stdout(predicate::str::contains(r#""required":["file_type","delimiter"]"#));
    }

    #[test]
    fn without_data_applies_nothing() {
        let dir = TempDir::new().unwrap();
        let schema = write_temp_file(&dir, "schema.json", READER_SCHEMA);

        cmd()
            .args(["resolve", schema.to_str().unwrap()])
            .assert()
            .success()
            .stdout(predicate::str::contains("delimiter").not());
    }

    #[test]
    fn resolve_with_pretty() {
        let dir = TempDir::new().unwrap();
        let schema = write_temp_file(&dir, "schema.json", READER_SCHEMA);

        cmd()
            .args(["resolve", schema.to_str().unwrap(), "--pretty"])
            .assert()
            .success()
            .stdout(predicate::str::contains("\n  \"type\": \"object\""));
    }

    #[test]
    fn resolve_to_output_file() {
        let dir = TempDir::new().unwrap();
        let schema = write_temp_file(&dir, "schema.json", READER_SCHEMA);
        let output = dir.path().join("out.json");

        cmd()
            .args([
                "resolve",
                schema.to_str().unwrap(),
                "--output",
                output.to_str().unwrap(),
            ])
            .assert()
            .success();

        let content = fs::read_to_string(&output).unwrap();
        assert!(content.contains("file_type"));
    }

    #[test]
    fn registry_references() {
        let dir = TempDir::new().unwrap();
        let defs = dir.path().join("defs");
        fs::create_dir(&defs).unwrap();
        fs::write(
            defs.join("csv_options.json"),
            r#"{"properties":{"quote":{"type":"string"}}}"#,
        )
        .unwrap();
        let schema = write_temp_file(
            &dir,
            "schema.json",
            r#"{
                "type": "object",
                "allOf": [{
                    "if": { "properties": { "file_type": { "const": "CSV" } } },
                    "then": { "$ref": "csv_options.json" }
                }]
            }"#,
        );
        let data = write_temp_file(&dir, "data.json", r#"{"file_type":"CSV"}"#);

        cmd()
            .args([
                "resolve",
                schema.to_str().unwrap(),
                "--data",
                data.to_str().unwrap(),
                "--registry",
                defs.to_str().unwrap(),
            ])
            .assert()
            .success()
            .stdout(predicate::str::contains("quote"));
    }

    #[test]
    fn self_referencing_registry_schema() {
        let dir = TempDir::new().unwrap();
        let defs = dir.path().join("defs");
        fs::create_dir(&defs).unwrap();
        fs::write(
            defs.join("tree.json"),
            r#"{
                "type": "object",
                "properties": {
                    "left": { "$ref": "tree" },
                    "right": { "$ref": "tree" }
                }
            }"#,
        )
        .unwrap();
        let schema = write_temp_file(&dir, "schema.json", r#"{"$ref":"tree"}"#);

        cmd()
            .args([
                "render",
                schema.to_str().unwrap(),
                "--registry",
                defs.to_str().unwrap(),
                "--deny-divergence",
            ])
            .assert()
            .success()
            .stdout(predicate::str::contains("- left [fallback_text]"));
    }

    #[test]
    fn deny_divergence_exits_1() {
        let dir = TempDir::new().unwrap();
        let schema = write_temp_file(&dir, "schema.json", READER_SCHEMA);
        let data = write_temp_file(&dir, "data.json", r#"{"file_type":"CSV"}"#);

        cmd()
            .args([
                "resolve",
                schema.to_str().unwrap(),
                "--data",
                data.to_str().unwrap(),
                "--max-passes",
                "1",
                "--deny-divergence",
            ])
            .assert()
            .code(1)
            .stderr(predicate::str::contains("did not converge"));
    }

    #[test]
    fn divergence_without_deny_still_succeeds() {
        let dir = TempDir::new().unwrap();
        let schema = write_temp_file(&dir, "schema.json", READER_SCHEMA);
        let data = write_temp_file(&dir, "data.json", r#"{"file_type":"CSV"}"#);

        cmd()
            .args([
                "resolve",
                schema.to_str().unwrap(),
                "--data",
                data.to_str().unwrap(),
                "--max-passes",
                "1",
            ])
            .assert()
            .success()
            .stdout(predicate::str::contains("delimiter"));
    }
}

mod render_command {
    use super::*;

    #[test]
    fn outline_masks_secrets() {
        let dir = TempDir::new().unwrap();
        let schema = write_temp_file(&dir, "schema.json", READER_SCHEMA);
        let data = write_temp_file(
            &dir,
            "data.json",
            r#"{"file_type":"CSV","password":"abc"}"#,
        );

        cmd()
            .args([
                "render",
                schema.to_str().unwrap(),
                "--data",
                data.to_str().unwrap(),
            ])
            .assert()
            .success()
            .stdout(predicate::str::contains("- file_type* [choice] = CSV"))
            .stdout(predicate::str::contains("- password [masked] = •••"))
            .stdout(predicate::str::contains("- delimiter* [text]"));
    }

    #[test]
    fn reveal_shows_secret() {
        let dir = TempDir::new().unwrap();
        let schema = write_temp_file(&dir, "schema.json", READER_SCHEMA);
        let data = write_temp_file(&dir, "data.json", r#"{"password":"abc"}"#);

        cmd()
            .args([
                "render",
                schema.to_str().unwrap(),
                "--data",
                data.to_str().unwrap(),
                "--reveal",
                "password",
            ])
            .assert()
            .success()
            .stdout(predicate::str::contains("- password [masked] = abc"));
    }

    #[test]
    fn json_output_with_errors() {
        let dir = TempDir::new().unwrap();
        let schema = write_temp_file(&dir, "schema.json", READER_SCHEMA);
        let errors = write_temp_file(&dir, "errors.json", r#"{"file_type":"pick one"}"#);

        cmd()
            .args([
                "render",
                schema.to_str().unwrap(),
                "--errors",
                errors.to_str().unwrap(),
                "--json",
            ])
            .assert()
            .success()
            .stdout(predicate::str::contains(r#""kind":"choice""#))
            .stdout(predicate::str::contains(r#""error":"pick one""#));
    }

    #[test]
    fn required_table_marks_fields() {
        let dir = TempDir::new().unwrap();
        let schema = write_temp_file(&dir, "schema.json", READER_SCHEMA);
        let table = write_temp_file(
            &dir,
            "table.json",
            r#"{
                "allOf": [{
                    "if": { "properties": { "file_type": { "const": "JSON" } } },
                    "then": { "required": ["password"] }
                }]
            }"#,
        );
        let data = write_temp_file(&dir, "data.json", r#"{"file_type":"JSON"}"#);

        cmd()
            .args([
                "render",
                schema.to_str().unwrap(),
                "--data",
                data.to_str().unwrap(),
                "--required-table",
                table.to_str().unwrap(),
            ])
            .assert()
            .success()
            .stdout(predicate::str::contains("- password* [masked]"));
    }
}

mod path_commands {
    use super::*;

    #[test]
    fn get_nested_value() {
        let dir = TempDir::new().unwrap();
        let data = write_temp_file(
            &dir,
            "data.json",
            r#"{"columns":[{"name":"id"},{"name":"price"}]}"#,
        );

        cmd()
            .args(["get", data.to_str().unwrap(), "columns.1.name"])
            .assert()
            .success()
            .stdout("\"price\"\n");
    }

    #[test]
    fn get_missing_path_exits_1() {
        let dir = TempDir::new().unwrap();
        let data = write_temp_file(&dir, "data.json", r#"{"a":1}"#);

        cmd()
            .args(["get", data.to_str().unwrap(), "a.b"])
            .assert()
            .code(1)
            .stderr(predicate::str::contains("no value at a.b"));
    }

    #[test]
    fn set_creates_intermediates() {
        let dir = TempDir::new().unwrap();
        let data = write_temp_file(&dir, "data.json", r#"{"keep":true}"#);

        cmd()
            .args(["set", data.to_str().unwrap(), "source.port", "5432"])
            .assert()
            .success()
            .stdout(predicate::str::contains(r#"{"keep":true,"source":{"port":5432}}"#));
    }

    #[test]
    fn set_bare_word_as_string() {
        let dir = TempDir::new().unwrap();
        let data = write_temp_file(&dir, "data.json", "{}");

        cmd()
            .args(["set", data.to_str().unwrap(), "file_type", "CSV"])
            .assert()
            .success()
            .stdout(predicate::str::contains(r#"{"file_type":"CSV"}"#));
    }
}

mod error_handling {
    use super::*;

    #[test]
    fn missing_schema_exits_3() {
        cmd()
            .args(["resolve", "/nonexistent/schema.json"])
            .assert()
            .code(3)
            .stderr(predicate::str::contains("Error loading schema"));
    }

    #[test]
    fn invalid_json_exits_2() {
        let dir = TempDir::new().unwrap();
        let schema = write_temp_file(&dir, "schema.json", "{ not json");

        cmd()
            .args(["resolve", schema.to_str().unwrap()])
            .assert()
            .code(2);
    }

    #[test]
    fn non_object_schema_exits_2() {
        let dir = TempDir::new().unwrap();
        let schema = write_temp_file(&dir, "schema.json", "[1, 2]");

        cmd()
            .args(["render", schema.to_str().unwrap()])
            .assert()
            .code(2);
    }
}
