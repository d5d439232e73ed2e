use std::path::Path;

use anyhow::Result;
use predicates::str::contains;
use pretty_assertions::assert_eq;
use serde_json::Value as JsonValue;
use tempfile::TempDir;

fn bionel_command(cache_root: &Path) -> Result<assert_cmd::Command> {
    let mut cmd = assert_cmd::Command::cargo_bin("bionel")?;
    cmd.env("BIONEL_CACHE_ROOT", cache_root);
    Ok(cmd)
}

#[test]
fn models_lists_registry() -> Result<()> {
    let cache_root = TempDir::new()?;

    bionel_command(cache_root.path())?
        .arg("models")
        .assert()
        .success()
        .stdout(contains("ctd-disease"))
        .stdout(contains("dmis-lab/biosyn-sapbert-bc2gn"))
        .stdout(contains("exact-string-match"));

    Ok(())
}

#[test]
fn help_explains_onnx_requirement() -> Result<()> {
    let cache_root = TempDir::new()?;

    bionel_command(cache_root.path())?
        .arg("--help")
        .assert()
        .success()
        .stdout(contains("onnx/model.onnx"))
        .stdout(contains("--model"));

    Ok(())
}

#[test]
fn exact_match_links_json_lines() -> Result<()> {
    let cache_root = TempDir::new()?;
    let dictionary = cache_root.path().join("species.txt");
    std::fs::write(&dictionary, "NCBITaxon:9606||human\nNCBITaxon:10090||mouse\n")?;

    let input = concat!(
        r#"{"text": "Human and mouse cells.", "mentions": [{"start": 0, "end": 5, "type": "species"}, {"start": 10, "end": 15, "type": "species"}]}"#,
        "\n",
        r#"{"text": "Yeast only.", "mentions": [{"start": 0, "end": 5, "type": "species"}]}"#,
        "\n"
    );

    let output = bionel_command(cache_root.path())?
        .args([
            "link",
            "--model",
            "exact-string-match",
            "--dictionary",
            dictionary.to_str().unwrap_or_default(),
            "--entity-type",
            "species",
            "--no-abbreviations",
        ])
        .write_stdin(input)
        .output()?;
    assert!(output.status.success());

    let stdout = String::from_utf8(output.stdout)?;
    let records: Vec<JsonValue> = stdout
        .lines()
        .map(serde_json::from_str)
        .collect::<Result<_, _>>()?;
    assert_eq!(records.len(), 2);

    let labels = &records[0]["labels"]["species_nen"];
    let ids: Vec<&str> = labels
        .as_array()
        .map(|labels| {
            labels
                .iter()
                .filter_map(|label| label["concept_id"].as_str())
                .collect()
        })
        .unwrap_or_default();
    assert_eq!(ids, vec!["9606", "10090"]);
    assert_eq!(labels[0]["database"], "NCBITaxon");
    assert_eq!(labels[0]["span"]["text"], "Human");

    assert_eq!(records[1]["labels"], serde_json::json!({}));

    Ok(())
}

#[test]
fn unknown_model_fails_with_choices() -> Result<()> {
    let cache_root = TempDir::new()?;

    bionel_command(cache_root.path())?
        .args(["link", "--model", "no-such-model"])
        .write_stdin("")
        .assert()
        .failure()
        .stderr(contains("no-such-model"))
        .stderr(contains("exact-string-match"));

    Ok(())
}

#[test]
fn link_requires_model() -> Result<()> {
    let cache_root = TempDir::new()?;

    bionel_command(cache_root.path())?
        .arg("link")
        .write_stdin("")
        .assert()
        .failure()
        .stderr(contains("--model"));

    Ok(())
}
