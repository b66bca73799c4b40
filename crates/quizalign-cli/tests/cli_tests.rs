//! CLI integration tests using assert_cmd.

use assert_cmd::Command;
use predicates::prelude::*;
use tempfile::TempDir;

/// A command isolated from the user's config and API keys.
fn quizalign(dir: &TempDir) -> Command {
    #[allow(deprecated)]
    let mut cmd = Command::cargo_bin("quizalign").unwrap();
    cmd.current_dir(dir.path())
        .env("HOME", dir.path())
        .env_remove("QUIZALIGN_OPENAI_KEY");
    cmd
}

const GOOD_MCQ_PROMPT: &str = "Risolvi l'equazione 2x + 3 = 7. Usa equazione, incognita, primo grado, \
     bilanciare, uguaglianza, frazione, denominatore, numeratore, uguale, soluzione.";

fn items_file(dir: &TempDir) -> std::path::PathBuf {
    let batch = serde_json::json!({
        "questions": [
            {
                "type": "MCQ",
                "prompt": GOOD_MCQ_PROMPT,
                "options": ["x = 1", "x = 2", "x = 3", "x = 4"],
                "correctAnswer": { "selected": 1 },
                "points": 2
            },
            {
                "type": "MCQ",
                "prompt": GOOD_MCQ_PROMPT,
                "options": ["uguaglianza", "somma", "prodotto", "potenza"],
                "correctAnswer": { "selected": 0 },
                "points": 2
            },
            {
                "type": "TF",
                "prompt": "Vero o falso?",
                "correctAnswer": { "value": true }
            }
        ]
    });
    let path = dir.path().join("items.json");
    std::fs::write(&path, serde_json::to_string_pretty(&batch).unwrap()).unwrap();
    path
}

#[test]
fn generate_with_template_writes_report() {
    let dir = TempDir::new().unwrap();
    let output = dir.path().join("reports");

    quizalign(&dir)
        .args(["generate", "--subject", "Matematica"])
        .args(["--topic", "Equazioni di primo grado", "--class", "2ª media"])
        .args(["--count", "5", "--provider", "template"])
        .arg("--output")
        .arg(&output)
        .assert()
        .success()
        .stderr(predicate::str::contains("Complete: 5/5 items"))
        .stderr(predicate::str::contains("Report saved to"));

    let reports: Vec<_> = std::fs::read_dir(&output)
        .unwrap()
        .map(|e| e.unwrap().path())
        .collect();
    assert_eq!(reports.len(), 1);

    let report: serde_json::Value =
        serde_json::from_str(&std::fs::read_to_string(&reports[0]).unwrap()).unwrap();
    assert_eq!(report["provider"], "template");
    assert_eq!(report["questions"].as_array().unwrap().len(), 5);
    assert_eq!(report["diagnostics"]["acceptedCount"], 5);
}

#[test]
fn generate_blank_topic_prints_error_response() {
    let dir = TempDir::new().unwrap();

    quizalign(&dir)
        .args(["generate", "--subject", "Matematica"])
        .args(["--topic", "   ", "--class", "2ª media"])
        .assert()
        .failure()
        .stdout(predicate::str::contains("\"errorCode\": \"VALIDATION\""))
        .stderr(predicate::str::contains("Error"));
}

#[test]
fn generate_unknown_provider_fails() {
    let dir = TempDir::new().unwrap();

    quizalign(&dir)
        .args(["generate", "--subject", "Storia"])
        .args(["--topic", "Roma antica", "--class", "1ª media"])
        .args(["--provider", "nessuno"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("not configured"));
}

#[test]
fn generate_rejects_unknown_difficulty() {
    let dir = TempDir::new().unwrap();

    quizalign(&dir)
        .args(["generate", "--subject", "Storia"])
        .args(["--topic", "Roma antica", "--class", "1ª media"])
        .args(["--difficulty", "impossibile"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("unknown difficulty"));
}

#[test]
fn validate_reports_each_item() {
    let dir = TempDir::new().unwrap();
    let items = items_file(&dir);

    quizalign(&dir)
        .arg("validate")
        .arg("--items")
        .arg(&items)
        .args(["--subject", "Matematica", "--topic", "Equazioni di primo grado"])
        .args(["--class", "2ª media"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Batch: 3 item(s)"))
        .stdout(predicate::str::contains("[1] OK"))
        .stdout(predicate::str::contains("[2] FAIL MCQ coverage 1.00: spoiler"))
        .stdout(predicate::str::contains("[3] FAIL"))
        .stdout(predicate::str::contains("1 valid item(s)."));
}

#[test]
fn validate_nonexistent_file() {
    let dir = TempDir::new().unwrap();

    quizalign(&dir)
        .args(["validate", "--items", "nonexistent.json"])
        .args(["--subject", "Storia", "--topic", "Roma", "--class", "1ª media"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("failed to read items"));
}

#[test]
fn validate_rejects_batch_without_questions() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("bad.json");
    std::fs::write(&path, r#"{"items": []}"#).unwrap();

    quizalign(&dir)
        .arg("validate")
        .arg("--items")
        .arg(&path)
        .args(["--subject", "Storia", "--topic", "Roma", "--class", "1ª media"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("failed to parse items"));
}

#[test]
fn keywords_shows_band_and_keywords() {
    let dir = TempDir::new().unwrap();

    quizalign(&dir)
        .args(["keywords", "--subject", "Matematica"])
        .args(["--topic", "Equazioni di primo grado", "--class", "2ª media"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Band: middle"))
        .stdout(predicate::str::contains("max 45 words"))
        .stdout(predicate::str::contains("equazione"));
}

#[test]
fn keywords_warns_about_unknown_subject() {
    let dir = TempDir::new().unwrap();

    quizalign(&dir)
        .args(["keywords", "--subject", "Astrologia"])
        .args(["--topic", "Segni zodiacali", "--class", "liceo"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Band: secondary"))
        .stdout(predicate::str::contains("not in the keyword bank"));
}

#[test]
fn keywords_follow_configured_token_filter() {
    let dir = TempDir::new().unwrap();
    std::fs::write(
        dir.path().join("quizalign.toml"),
        "[alignment]\ntoken_filter = \"stopwords\"\n",
    )
    .unwrap();

    quizalign(&dir)
        .args(["keywords", "--subject", "Filosofia"])
        .args(["--topic", "Il mito della caverna", "--class", "liceo"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Keywords (2):"))
        .stdout(predicate::str::contains("caverna"))
        .stdout(predicate::str::contains("della").not());
}

#[test]
fn init_creates_files() {
    let dir = TempDir::new().unwrap();

    quizalign(&dir)
        .arg("init")
        .assert()
        .success()
        .stdout(predicate::str::contains("Created quizalign.toml"))
        .stdout(predicate::str::contains("Created keywords.toml"));

    assert!(dir.path().join("quizalign.toml").exists());
    assert!(dir.path().join("keywords.toml").exists());
}

#[test]
fn init_skips_existing() {
    let dir = TempDir::new().unwrap();

    quizalign(&dir).arg("init").assert().success();

    quizalign(&dir)
        .arg("init")
        .assert()
        .success()
        .stdout(predicate::str::contains("already exists"));
}

#[test]
fn init_config_is_picked_up() {
    let dir = TempDir::new().unwrap();

    quizalign(&dir).arg("init").assert().success();

    quizalign(&dir)
        .args(["generate", "--subject", "Storia"])
        .args(["--topic", "Roma antica", "--class", "1ª media"])
        .assert()
        .success()
        .stderr(predicate::str::contains("via template"));

    assert!(dir.path().join("quizalign-reports").is_dir());
}

#[test]
fn help_output() {
    let dir = TempDir::new().unwrap();

    quizalign(&dir)
        .arg("--help")
        .assert()
        .success()
        .stdout(predicate::str::contains("Curriculum-aligned quiz generation"));
}

#[test]
fn version_output() {
    let dir = TempDir::new().unwrap();

    quizalign(&dir)
        .arg("--version")
        .assert()
        .success()
        .stdout(predicate::str::contains("quizalign"));
}
