use std::fs;
use std::path::Path;

use assert_cmd::Command;
use predicates::str::contains;
use tempfile::TempDir;

const TOPIC: &str = "---\nid: topic-1\ntitle: Patch Hosts\ntype: Standard\ntechnology: Linux\nis-training-topic: true\ntraining-frequency: Quarterly\nlast-trained: 2024-01-01\n---\n# Patch Hosts\n";
const PLAN: &str = "---\ntitle: Rollout\ntype: plan\n---\n";

#[test]
fn status_reports_due_training_with_data_exit() -> Result<(), Box<dyn std::error::Error>> {
    let library = scaffold_library()?;

    cli()
        .arg("--root")
        .arg(library.path())
        .args(["status", "--now", "2024-02-01"])
        .assert()
        .success()
        .stdout(contains("OK (1 articles)"))
        .stdout(contains("[OK] Patch Hosts"));

    cli()
        .arg("--root")
        .arg(library.path())
        .args(["status", "--now", "2024-06-01"])
        .assert()
        .failure()
        .code(65)
        .stdout(contains("[DUE] Patch Hosts"))
        .stdout(contains("training required"));
    Ok(())
}

#[test]
fn status_json_is_tagged() -> Result<(), Box<dyn std::error::Error>> {
    let library = scaffold_library()?;
    cli()
        .arg("--root")
        .arg(library.path())
        .args(["status", "--json", "--now", "2024-02-01"])
        .assert()
        .success()
        .stdout(contains("\"type\":\"status\""))
        .stdout(contains("\"training_required\":false"));
    Ok(())
}

#[test]
fn unknown_type_tag_fails_with_data_exit() -> Result<(), Box<dyn std::error::Error>> {
    let library = scaffold_library()?;
    write(library.path(), "Linux/widget.md", "---\ntitle: W\ntype: Widget\n---\n")?;

    cli()
        .arg("--root")
        .arg(library.path())
        .arg("status")
        .assert()
        .failure()
        .code(65)
        .stderr(contains("[widget]"))
        .stderr(contains("widget.md"));
    Ok(())
}

#[test]
fn missing_root_is_config_error() -> Result<(), Box<dyn std::error::Error>> {
    let temp = TempDir::new()?;
    cli()
        .arg("--root")
        .arg(temp.path().join("absent"))
        .arg("status")
        .assert()
        .failure()
        .code(78)
        .stderr(contains("does not exist"));
    Ok(())
}

#[test]
fn root_can_come_from_environment() -> Result<(), Box<dyn std::error::Error>> {
    let library = scaffold_library()?;
    cli()
        .env("LOREBOOK_ROOT", library.path())
        .args(["status", "--now", "2024-02-01"])
        .assert()
        .success()
        .stdout(contains("Patch Hosts"));
    Ok(())
}

#[test]
fn train_records_once_per_day() -> Result<(), Box<dyn std::error::Error>> {
    let library = scaffold_library()?;
    let roster = library.path().join("roster.json");
    fs::write(&roster, r#"[{"SamAccountName": "jdoe", "Role": "Operator"}]"#)?;

    for expected in ["Recorded training", "already recorded"] {
        cli()
            .arg("--root")
            .arg(library.path())
            .arg("--roster")
            .arg(&roster)
            .args(["train", "--contributor", "jdoe", "--article", "topic-1", "--date", "2024-05-20"])
            .assert()
            .success()
            .stdout(contains(expected));
    }

    let saved = fs::read_to_string(&roster)?;
    assert_eq!(saved.matches("2024-05-20").count(), 1, "{saved}");
    let article = fs::read_to_string(library.path().join("Linux/topic.md"))?;
    assert!(article.contains("last-trained:"), "{article}");
    assert!(article.contains("2024-05-20"), "{article}");
    Ok(())
}

#[test]
fn train_without_roster_is_config_error() -> Result<(), Box<dyn std::error::Error>> {
    let library = scaffold_library()?;
    cli()
        .arg("--root")
        .arg(library.path())
        .args(["train", "--contributor", "jdoe", "--article", "topic-1"])
        .assert()
        .failure()
        .code(78)
        .stderr(contains("no roster"));
    Ok(())
}

#[test]
fn fmt_check_then_fmt_rewrites() -> Result<(), Box<dyn std::error::Error>> {
    let library = scaffold_library()?;

    cli()
        .arg("--root")
        .arg(library.path())
        .args(["fmt", "--check"])
        .assert()
        .failure()
        .code(65)
        .stdout(contains("1 of 1 articles are not canonical"));

    cli()
        .arg("--root")
        .arg(library.path())
        .arg("fmt")
        .assert()
        .success()
        .stdout(contains("Formatted 1 of 1 articles"));

    cli()
        .arg("--root")
        .arg(library.path())
        .args(["fmt", "--check"])
        .assert()
        .success()
        .stdout(contains("All 1 articles are canonical"));

    let plan = fs::read_to_string(library.path().join("Linux/plan.md"))?;
    assert_eq!(plan, PLAN);
    Ok(())
}

#[test]
fn new_creates_article_from_template() -> Result<(), Box<dyn std::error::Error>> {
    let library = scaffold_library()?;
    let templates = library.path().join("templates");
    fs::create_dir(&templates)?;
    fs::write(templates.join("Create.template.md"), "# {{title}}\n\nFor {{technology}}.\n")?;

    cli()
        .arg("--root")
        .arg(library.path())
        .arg("--templates")
        .arg(&templates)
        .args([
            "new",
            "--title",
            "Add a User",
            "--type",
            "create",
            "--technology",
            "Linux",
            "--author",
            "jdoe",
        ])
        .assert()
        .success()
        .stdout(contains("Created article 'Add a User'"));

    let created = fs::read_to_string(library.path().join("Linux/Create - Add a User.md"))?;
    assert!(created.contains("type: Create"), "{created}");
    assert!(created.ends_with("# Add a User\n\nFor Linux.\n"), "{created}");
    Ok(())
}

#[test]
fn new_rejects_unknown_type() -> Result<(), Box<dyn std::error::Error>> {
    let library = scaffold_library()?;
    cli()
        .arg("--root")
        .arg(library.path())
        .args(["new", "--title", "X", "--type", "memo", "--technology", "Linux"])
        .assert()
        .failure()
        .code(64)
        .stderr(contains("unknown type 'memo'"));
    Ok(())
}

#[test]
fn schema_prints_roster_schema() {
    cli()
        .arg("schema")
        .assert()
        .success()
        .stdout(contains("SamAccountName"))
        .stdout(contains("TrainingRecords"));
}

fn scaffold_library() -> Result<TempDir, Box<dyn std::error::Error>> {
    let temp = TempDir::new()?;
    write(temp.path(), "Linux/topic.md", TOPIC)?;
    write(temp.path(), "Linux/plan.md", PLAN)?;
    Ok(temp)
}

fn write(root: &Path, rel: &str, content: &str) -> std::io::Result<()> {
    let path = root.join(rel);
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)?;
    }
    fs::write(path, content)
}

fn cli() -> Command {
    let mut cmd = Command::new(env!("CARGO_BIN_EXE_lorebook"));
    cmd.env_remove("LOREBOOK_ROOT")
        .env_remove("LOREBOOK_ROSTER")
        .env_remove("LOREBOOK_TEMPLATES");
    cmd
}
