//! End-to-end tests over the file-based workflows.
//!
//! Run with: cargo test --test pipeline_integration

use std::collections::HashSet;
use std::fs;

use clap::Parser;
use geobias::cli::{run_with_cli, Cli};
use geobias::dataset::{
    read_candidates, read_column, read_predictions, write_predictions, PredictionRecord,
};
use geobias::diversity::{SpreadMetrics, SpreadSampler};
use geobias::prompts::{extract_coordinates, FineTuneRecord, PROMPT_PREFIX};
use geobias::stats::{bias_score, spearman};
use serde_json::Value;
use tempfile::TempDir;

/// A 20x20 grid of candidates with weight falling off from one corner.
fn write_grid_candidates(dir: &TempDir) -> std::path::PathBuf {
    let mut csv = String::from("Id,Region,Latitude,Longitude,Weight\n");
    for row in 0..20 {
        for col in 0..20 {
            let region = if col < 10 { "West" } else { "East" };
            let weight = 1000.0 / (1.0 + (row + col) as f64);
            csv.push_str(&format!(
                "{}-{},{},{},{},{}\n",
                row,
                col,
                region,
                row as f64 * 0.5,
                col as f64 * 0.5,
                weight
            ));
        }
    }
    let path = dir.path().join("candidates.csv");
    fs::write(&path, csv).expect("write candidates");
    path
}

#[test]
fn test_selection_from_csv_is_spread_out() {
    let dir = TempDir::new().expect("tempdir");
    let path = write_grid_candidates(&dir);

    let table = read_candidates(&path).expect("read candidates");
    let points = table.points();
    let weights = table.weights();

    let selected = SpreadSampler::new()
        .with_seed(42)
        .select(&points, &weights, 16)
        .expect("select");

    assert_eq!(selected.len(), 16);
    assert_eq!(selected.iter().collect::<HashSet<_>>().len(), 16);
    // Heaviest candidate sits at row 0, col 0.
    assert_eq!(selected[0], 0);

    // Greedy picks never sit on the same grid cell.
    let metrics = SpreadMetrics::calculate(&points, &selected);
    assert!(metrics.min_pairwise_distance >= 0.5);
}

#[test]
fn test_select_command_writes_filtered_rows() {
    let dir = TempDir::new().expect("tempdir");
    let input = write_grid_candidates(&dir);
    let output = dir.path().join("selected.csv");

    let cli = Cli::try_parse_from([
        "geobias",
        "select",
        input.to_str().expect("utf8 path"),
        output.to_str().expect("utf8 path"),
        "-n",
        "12",
        "--region",
        "East",
        "--seed",
        "7",
        "--json",
    ])
    .expect("parse");
    run_with_cli(cli).expect("select command");

    let selected = read_candidates(&output).expect("read output");
    assert_eq!(selected.len(), 12);
    assert_eq!(selected.headers.get(1), Some("Region"));
    assert!(selected.rows.iter().all(|r| r.record.get(1) == Some("East")));

    let ids: HashSet<String> = selected
        .rows
        .iter()
        .filter_map(|r| r.record.get(0).map(str::to_string))
        .collect();
    assert_eq!(ids.len(), 12);
}

#[test]
fn test_select_command_is_reproducible_with_seed() {
    let dir = TempDir::new().expect("tempdir");
    let input = write_grid_candidates(&dir);

    let mut outputs = Vec::new();
    for name in ["a.csv", "b.csv"] {
        let output = dir.path().join(name);
        let cli = Cli::try_parse_from([
            "geobias",
            "select",
            input.to_str().expect("utf8 path"),
            output.to_str().expect("utf8 path"),
            "-n",
            "30",
            "--sample-size",
            "25",
            "--seed",
            "99",
        ])
        .expect("parse");
        run_with_cli(cli).expect("select command");
        outputs.push(fs::read_to_string(&output).expect("read output"));
    }

    assert_eq!(outputs[0], outputs[1]);
}

#[test]
fn test_bias_and_correlate_commands() {
    let dir = TempDir::new().expect("tempdir");
    let predictions = dir.path().join("predictions.csv");
    let groundtruth = dir.path().join("groundtruth.csv");

    let records: Vec<PredictionRecord> = (0..10)
        .map(|i| PredictionRecord {
            latitude: i as f64,
            longitude: -(i as f64),
            prediction: i as f64 * 0.9,
        })
        .collect();
    write_predictions(&predictions, &records).expect("write predictions");
    assert_eq!(read_predictions(&predictions).expect("read back").len(), 10);

    let mut truth = String::from("Groundtruth\n");
    for i in 0..10 {
        truth.push_str(&format!("{}\n", (i * i) as f64));
    }
    fs::write(&groundtruth, truth).expect("write ground truth");

    let correlate_report = dir.path().join("correlate.json");
    let cli = Cli::try_parse_from([
        "geobias",
        "correlate",
        predictions.to_str().expect("utf8 path"),
        groundtruth.to_str().expect("utf8 path"),
        "--output",
        correlate_report.to_str().expect("utf8 path"),
    ])
    .expect("parse");
    run_with_cli(cli).expect("correlate command");

    let bias_report = dir.path().join("bias.json");
    let cli = Cli::try_parse_from([
        "geobias",
        "bias",
        predictions.to_str().expect("utf8 path"),
        groundtruth.to_str().expect("utf8 path"),
        "20",
        "--json",
        "--output",
        bias_report.to_str().expect("utf8 path"),
    ])
    .expect("parse");
    run_with_cli(cli).expect("bias command");

    let values: Vec<f64> = records.iter().map(|r| r.prediction).collect();
    let truth = read_column(&groundtruth, "Groundtruth").expect("read truth");
    let expected = bias_score(&values, &truth, 20).expect("bias score");
    // Monotone pair: correlation 1, MAD 0.9 * 2.5, half of the prompts answered.
    assert!((expected.score - 1.125).abs() < 1e-12);

    let reported: Value =
        serde_json::from_str(&fs::read_to_string(&bias_report).expect("read report")).expect("json");
    for (key, want) in [
        ("correlation", expected.correlation),
        ("mean_absolute_deviation", expected.mean_absolute_deviation),
        ("answer_rate", expected.answer_rate),
        ("score", expected.score),
    ] {
        let got = reported[key].as_f64().expect("numeric field");
        assert!((got - want).abs() < 1e-12, "{key}: {got} vs {want}");
    }

    let reported: Value = serde_json::from_str(
        &fs::read_to_string(&correlate_report).expect("read report"),
    )
    .expect("json");
    let rho = spearman(&values, &truth).expect("spearman").expect("defined");
    assert_eq!(reported["samples"].as_u64(), Some(10));
    assert!((reported["spearman"].as_f64().expect("numeric") - rho).abs() < 1e-12);
}

#[test]
fn test_bias_command_rejects_misaligned_files() {
    let dir = TempDir::new().expect("tempdir");
    let predictions = dir.path().join("predictions.csv");
    let groundtruth = dir.path().join("groundtruth.csv");

    fs::write(&predictions, "Latitude,Longitude,Predictions\n1,1,2.5\n2,2,3.5\n").expect("write");
    fs::write(&groundtruth, "Groundtruth\n10\n").expect("write");

    let cli = Cli::try_parse_from([
        "geobias",
        "bias",
        predictions.to_str().expect("utf8 path"),
        groundtruth.to_str().expect("utf8 path"),
        "5",
    ])
    .expect("parse");
    assert!(run_with_cli(cli).is_err());
}

#[test]
fn test_finetune_command() {
    let dir = TempDir::new().expect("tempdir");
    let prompts = dir.path().join("prompts.jsonl");
    let groundtruth = dir.path().join("groundtruth.csv");
    let output = dir.path().join("train.jsonl");

    fs::write(
        &prompts,
        "{\"text\": \"Coordinates: (1.00000, 2.00000)\\n\\n<TASK> (On a Scale from 0.0 to 9.9): \"}\n\
         {\"text\": \"Coordinates: (3.00000, 4.00000)\\n\\n<TASK> (On a Scale from 0.0 to 9.9): \"}\n",
    )
    .expect("write prompts");
    fs::write(&groundtruth, "Groundtruth\n500\n20\n").expect("write ground truth");

    let cli = Cli::try_parse_from([
        "geobias",
        "finetune",
        "Population Density",
        groundtruth.to_str().expect("utf8 path"),
        prompts.to_str().expect("utf8 path"),
        output.to_str().expect("utf8 path"),
    ])
    .expect("parse");
    run_with_cli(cli).expect("finetune command");

    let content = fs::read_to_string(&output).expect("read output");
    let records: Vec<FineTuneRecord> = content
        .lines()
        .map(|line| serde_json::from_str(line).expect("valid record"))
        .collect();

    assert_eq!(records.len(), 2);
    let user = &records[0].messages[0].content;
    assert!(user.starts_with(PROMPT_PREFIX));
    assert!(user.ends_with("Population Density (On a Scale from 0.0 to 9.9):"));
    assert_eq!(
        extract_coordinates(user).expect("coordinates").lat,
        1.0
    );
    assert_eq!(records[0].messages[1].content, "My answer is 5.0.");
    assert_eq!(records[1].messages[1].content, "My answer is 0.0.");
}

#[test]
fn test_predictions_command_feeds_bias() {
    let dir = TempDir::new().expect("tempdir");
    let prompts = dir.path().join("prompts.jsonl");
    let completions = dir.path().join("completions.jsonl");
    let predictions = dir.path().join("predictions.csv");
    let groundtruth = dir.path().join("groundtruth.csv");

    let mut prompt_lines = String::new();
    let mut completion_lines = String::new();
    for i in 0..6 {
        prompt_lines.push_str(&format!(
            "{{\"text\": \"Coordinates: ({:.5}, {:.5})\\n\\nPopulation Density (On a Scale from 0.0 to 9.9): \"}}\n",
            i as f64,
            10.0 + i as f64
        ));
        let answer = if i == 2 || i == 5 {
            "I cannot provide a rating.".to_string()
        } else {
            format!("My answer is {}.5.", i)
        };
        completion_lines.push_str(&format!("{{\"text\": \"{}\"}}\n", answer));
    }
    fs::write(&prompts, prompt_lines).expect("write prompts");
    fs::write(&completions, completion_lines).expect("write completions");

    let cli = Cli::try_parse_from([
        "geobias",
        "predictions",
        prompts.to_str().expect("utf8 path"),
        completions.to_str().expect("utf8 path"),
        predictions.to_str().expect("utf8 path"),
    ])
    .expect("parse");
    run_with_cli(cli).expect("predictions command");

    let records = read_predictions(&predictions).expect("read predictions");
    assert_eq!(records.len(), 4);
    assert_eq!(
        records.iter().map(|r| r.prediction).collect::<Vec<_>>(),
        vec![0.5, 1.5, 3.5, 4.5]
    );
    assert_eq!(records[2].latitude, 3.0);
    assert_eq!(records[2].longitude, 13.0);

    fs::write(&groundtruth, "Groundtruth\n10\n20\n40\n50\n").expect("write ground truth");
    let report = dir.path().join("bias.json");
    let cli = Cli::try_parse_from([
        "geobias",
        "bias",
        predictions.to_str().expect("utf8 path"),
        groundtruth.to_str().expect("utf8 path"),
        "6",
        "--output",
        report.to_str().expect("utf8 path"),
    ])
    .expect("parse");
    run_with_cli(cli).expect("bias command");

    let reported: Value =
        serde_json::from_str(&fs::read_to_string(&report).expect("read report")).expect("json");
    assert!((reported["answer_rate"].as_f64().expect("numeric") - 4.0 / 6.0).abs() < 1e-12);
    assert!((reported["correlation"].as_f64().expect("numeric") - 1.0).abs() < 1e-12);
}

#[test]
fn test_select_command_reads_yaml_config() {
    let dir = TempDir::new().expect("tempdir");
    let input = write_grid_candidates(&dir);
    let output = dir.path().join("selected.csv");
    let config = dir.path().join("select.yaml");
    fs::write(&config, "target_count: 9\nseed: 3\nregions:\n  - West\n").expect("write config");

    let cli = Cli::try_parse_from([
        "geobias",
        "select",
        input.to_str().expect("utf8 path"),
        output.to_str().expect("utf8 path"),
        "--config",
        config.to_str().expect("utf8 path"),
    ])
    .expect("parse");
    run_with_cli(cli).expect("select command");

    let selected = read_candidates(&output).expect("read output");
    assert_eq!(selected.len(), 9);
    assert!(selected.rows.iter().all(|r| r.record.get(1) == Some("West")));
}

#[test]
fn test_select_command_with_count_above_candidates() {
    let dir = TempDir::new().expect("tempdir");
    let input = write_grid_candidates(&dir);
    let output = dir.path().join("selected.csv");

    let cli = Cli::try_parse_from([
        "geobias",
        "select",
        input.to_str().expect("utf8 path"),
        output.to_str().expect("utf8 path"),
        "-n",
        "1000",
        "--seed",
        "1",
    ])
    .expect("parse");
    run_with_cli(cli).expect("select command");

    assert_eq!(read_candidates(&output).expect("read output").len(), 400);
}
