//! Command-line tests that need no model service.

use std::fs;
use std::io::{Cursor, Write};
use std::path::Path;

use assert_cmd::Command;
use predicates::prelude::*;
use tempfile::TempDir;
use zip::write::SimpleFileOptions;

const INVOICE_TEMPLATE: &str = r#"{
    "id": "invoice",
    "name": "Invoice",
    "sections": [{
        "id": "s1", "name": "Header",
        "fields": [{
            "id": "f1", "name": "Invoice No", "type": "text", "required": true,
            "extraction": {"method": "regex", "regex": "INV-(\\d+)"}
        }]
    }]
}"#;

const BROKEN_TEMPLATE: &str = r#"{
    "id": "broken",
    "name": "Broken",
    "sections": [{
        "id": "s1", "name": "Header",
        "fields": [
            {"id": "f1", "name": "Bad", "extraction": {"method": "regex", "regex": "(unclosed"}},
            {"id": "f2", "name": "Odd", "extraction": {"method": "barcode"}}
        ]
    }]
}"#;

fn docbind(config_home: &Path) -> Command {
    let mut cmd = Command::cargo_bin("docbind").unwrap();
    cmd.env("XDG_CONFIG_HOME", config_home)
        .env("HOME", config_home)
        .env_remove("QWEN_API_KEY")
        .env_remove("QWEN_API_BASE");
    cmd
}

fn write(dir: &TempDir, name: &str, content: impl AsRef<[u8]>) -> std::path::PathBuf {
    let path = dir.path().join(name);
    fs::write(&path, content).unwrap();
    path
}

/// A minimal `.docx` package with one paragraph per line of `text`.
fn docx(text: &str) -> Vec<u8> {
    let paragraphs: String = text
        .lines()
        .map(|line| format!("<w:p><w:r><w:t>{line}</w:t></w:r></w:p>"))
        .collect();
    let xml = format!(
        r#"<w:document xmlns:w="http://schemas.openxmlformats.org/wordprocessingml/2006/main"><w:body>{paragraphs}</w:body></w:document>"#
    );
    let mut writer = zip::ZipWriter::new(Cursor::new(Vec::new()));
    writer
        .start_file("word/document.xml", SimpleFileOptions::default())
        .unwrap();
    writer.write_all(xml.as_bytes()).unwrap();
    writer.finish().unwrap().into_inner()
}

#[test]
fn detect_reports_document_types() {
    let dir = TempDir::new().unwrap();
    let png = write(&dir, "scan.bin", [0x89, b'P', b'N', b'G', 0x0D, 0x0A, 0x1A, 0x0A, 0, 0]);
    let docx = write(&dir, "notes.docx", docx("plain text"));
    let sheet = write(&dir, "data.bin", "x");

    docbind(dir.path())
        .arg("detect")
        .arg(&png)
        .arg(&docx)
        .assert()
        .success()
        .stdout(predicate::str::contains(": image (image/png)"))
        .stdout(predicate::str::contains(": word ("));

    docbind(dir.path())
        .args(["detect", "--media-type", "excel"])
        .arg(&sheet)
        .assert()
        .success()
        .stdout(predicate::str::contains(": excel (excel)"));
}

#[test]
fn detect_missing_file_fails() {
    let dir = TempDir::new().unwrap();
    docbind(dir.path())
        .args(["detect", "does-not-exist.pdf"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("Input file not found"));
}

#[test]
fn template_validate_accepts_good_template() {
    let dir = TempDir::new().unwrap();
    let template = write(&dir, "invoice.json", INVOICE_TEMPLATE);

    docbind(dir.path())
        .args(["template", "validate"])
        .arg(&template)
        .assert()
        .success()
        .stdout(predicate::str::contains("'Invoice' is valid (1 fields)"));
}

#[test]
fn template_validate_lists_problems() {
    let dir = TempDir::new().unwrap();
    let template = write(&dir, "broken.json", BROKEN_TEMPLATE);

    docbind(dir.path())
        .args(["template", "validate"])
        .arg(&template)
        .assert()
        .failure()
        .stdout(predicate::str::contains("Field 'Bad': invalid regex"))
        .stdout(predicate::str::contains("unknown extraction method 'barcode'"))
        .stderr(predicate::str::contains("2 problem(s) found"));
}

#[test]
fn template_import_assigns_fresh_id() {
    let dir = TempDir::new().unwrap();
    let template = write(&dir, "invoice.json", INVOICE_TEMPLATE);
    let output = dir.path().join("imported.json");

    docbind(dir.path())
        .args(["template", "import"])
        .arg(&template)
        .arg("--output")
        .arg(&output)
        .assert()
        .success();

    let imported: serde_json::Value =
        serde_json::from_str(&fs::read_to_string(&output).unwrap()).unwrap();
    assert!(imported["id"].as_str().unwrap().starts_with("template_"));
    assert_eq!(imported["name"], "Invoice");
}

#[test]
fn normalize_word_text_offline() {
    let dir = TempDir::new().unwrap();
    let doc = write(&dir, "contract.txt", "甲方：ACME\n乙方：Globex");

    docbind(dir.path())
        .args(["normalize", "--media-type", "word"])
        .arg(&doc)
        .assert()
        .success()
        .stdout(predicate::str::contains("\"type\": \"word\""))
        .stdout(predicate::str::contains("甲方：ACME"));
}

#[test]
fn detect_uses_file_extension_for_text_and_tiff() {
    let dir = TempDir::new().unwrap();
    let notes = write(&dir, "notes.txt", "Ref: INV-9");
    let scan = write(&dir, "scan.tif", "not really a tiff");

    docbind(dir.path())
        .arg("detect")
        .arg(&notes)
        .arg(&scan)
        .assert()
        .success()
        .stdout(predicate::str::contains("notes.txt: word ("))
        .stdout(predicate::str::contains("scan.tif: image (image/tiff)"));
}

#[test]
fn normalize_text_file_without_media_type() {
    let dir = TempDir::new().unwrap();
    let doc = write(&dir, "contract.txt", "甲方：ACME");

    docbind(dir.path())
        .arg("normalize")
        .arg(&doc)
        .assert()
        .success()
        .stdout(predicate::str::contains("\"type\": \"word\""))
        .stdout(predicate::str::contains("甲方：ACME"));
}

#[test]
fn normalize_docx_reads_document_text() {
    let dir = TempDir::new().unwrap();
    let doc = write(&dir, "contract.docx", docx("合同编号：HT-001\n甲方：ACME"));

    docbind(dir.path())
        .arg("normalize")
        .arg(&doc)
        .assert()
        .success()
        .stdout(predicate::str::contains("合同编号：HT-001"))
        .stdout(predicate::str::contains("甲方：ACME"));
}

#[test]
fn normalize_legacy_doc_fails() {
    let dir = TempDir::new().unwrap();
    let doc = write(&dir, "old.doc", [0xD0, 0xCF, 0x11, 0xE0, 0xA1, 0xB1, 0x1A, 0xE1]);

    docbind(dir.path())
        .arg("normalize")
        .arg(&doc)
        .assert()
        .failure()
        .stderr(predicate::str::contains("Legacy .doc files are not supported"));
}

#[test]
fn extract_per_field_regex_without_network() {
    let dir = TempDir::new().unwrap();
    let template = write(&dir, "invoice.json", INVOICE_TEMPLATE);
    let doc = write(&dir, "invoice.docx", docx("Customer: ACME\nRef: INV-4821 dated 2024-03-01"));

    docbind(dir.path())
        .env("QWEN_API_KEY", "test")
        .args(["extract", "--mode", "per-field", "--template"])
        .arg(&template)
        .arg(&doc)
        .assert()
        .success()
        .stdout(predicate::str::contains("\"documentType\": \"word\""))
        .stdout(predicate::str::contains("\"4821\""));
}

#[test]
fn extract_without_api_key_fails() {
    let dir = TempDir::new().unwrap();
    let template = write(&dir, "invoice.json", INVOICE_TEMPLATE);
    let doc = write(&dir, "invoice.docx", docx("Ref: INV-4821"));

    docbind(dir.path())
        .arg("extract")
        .arg("--template")
        .arg(&template)
        .arg(&doc)
        .assert()
        .failure()
        .stderr(predicate::str::contains("QWEN_API_KEY"));
}

#[test]
fn extract_picks_template_from_directory() {
    let dir = TempDir::new().unwrap();
    let templates = dir.path().join("templates");
    fs::create_dir(&templates).unwrap();
    fs::write(templates.join("invoice.json"), INVOICE_TEMPLATE).unwrap();
    fs::write(templates.join("broken.json"), BROKEN_TEMPLATE).unwrap();
    let doc = write(&dir, "invoice.docx", docx("INV-77"));

    docbind(dir.path())
        .env("QWEN_API_KEY", "test")
        .args(["extract", "--mode", "per-field", "--format", "csv", "--template"])
        .arg(&templates)
        .arg(&doc)
        .assert()
        .failure()
        .stderr(predicate::str::contains("choose one with --template-id"));

    docbind(dir.path())
        .env("QWEN_API_KEY", "test")
        .args(["extract", "--mode", "per-field", "--format", "csv"])
        .args(["--template-id", "invoice", "--template"])
        .arg(&templates)
        .arg(&doc)
        .assert()
        .success()
        .stdout(predicate::str::contains("f1,Invoice No,77,0.90,1"));
}

#[test]
fn config_init_then_get_and_set() {
    let dir = TempDir::new().unwrap();
    let config_path = dir.path().join("docbind").join("config.json");

    docbind(dir.path())
        .args(["config", "path"])
        .assert()
        .success()
        .stdout(predicate::str::contains("not created"));

    docbind(dir.path())
        .args(["config", "init"])
        .assert()
        .success();
    assert!(config_path.exists());

    docbind(dir.path())
        .args(["config", "init"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("--force"));

    docbind(dir.path())
        .args(["config", "set", "extraction.mode", "per_field"])
        .assert()
        .success();

    docbind(dir.path())
        .args(["config", "get", "extraction.mode"])
        .assert()
        .success()
        .stdout(predicate::str::contains("\"per_field\""));
}
