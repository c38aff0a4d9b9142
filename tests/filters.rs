//! Note type and card type filters.

use apkg_export::{run_conversion, Config, ConversionError, ErrorKind};

#[path = "helpers.rs"]
mod helpers;

use helpers::{mixed_package, temp_dir, Layout};

#[tokio::test]
async fn test_note_type_filter() {
    let dir = temp_dir();
    let input = mixed_package(Layout::Legacy).write(dir.path(), "mixed.apkg").await;
    let output = dir.path().join("basic.csv");

    let config = Config {
        input,
        output: Some(output.clone()),
        note_type: Some("Basic".to_string()),
        ..Default::default()
    };
    let report = run_conversion(&config).await.expect("conversion should succeed");

    assert_eq!(report.rows_written, 2);
    assert_eq!(
        std::fs::read_to_string(&output).expect("Failed to read output"),
        "Note Type,Front,Back\nBasic,chat,cat\nBasic,oiseau,bird\n"
    );
}

#[tokio::test]
async fn test_card_type_filter_implies_card_rows() {
    let dir = temp_dir();
    let input = mixed_package(Layout::Legacy).write(dir.path(), "mixed.apkg").await;
    let output = dir.path().join("reverse.csv");

    let config = Config {
        input,
        output: Some(output.clone()),
        card_type: Some("Card 2".to_string()),
        ..Default::default()
    };
    let report = run_conversion(&config).await.expect("conversion should succeed");

    assert_eq!(report.rows_written, 1);
    assert_eq!(
        std::fs::read_to_string(&output).expect("Failed to read output"),
        "Note Type,Card Type,Front,Back\nBasic (and reversed card),Card 2,chien,dog\n"
    );
}

#[tokio::test]
async fn test_combined_filters() {
    let dir = temp_dir();
    let input = mixed_package(Layout::Schema18).write(dir.path(), "mixed.apkg").await;
    let output = dir.path().join("combined.csv");

    let config = Config {
        input,
        output: Some(output.clone()),
        note_type: Some("Basic".to_string()),
        card_type: Some("Card 1".to_string()),
        ..Default::default()
    };
    let report = run_conversion(&config).await.expect("conversion should succeed");
    assert_eq!(report.rows_written, 2);
}

#[tokio::test]
async fn test_unmatched_note_type_writes_nothing() {
    let dir = temp_dir();
    let input = mixed_package(Layout::Legacy).write(dir.path(), "mixed.apkg").await;
    let output = dir.path().join("none.csv");

    let config = Config {
        input,
        output: Some(output.clone()),
        note_type: Some("Nonexistent".to_string()),
        media: true,
        ..Default::default()
    };
    let err = run_conversion(&config).await.expect_err("no rows should fail");

    assert!(matches!(
        &err,
        ConversionError::NoMatchingRecords { note_type: Some(n), card_type: None } if n == "Nonexistent"
    ));
    assert_eq!(err.kind(), ErrorKind::NoMatchingRecords);
    assert!(err.to_string().contains("Nonexistent"));
    assert!(!output.exists());
    assert!(!dir.path().join("media").exists());
}

#[tokio::test]
async fn test_filter_matches_exact_name() {
    let dir = temp_dir();
    let input = mixed_package(Layout::Legacy).write(dir.path(), "mixed.apkg").await;

    let config = Config {
        input,
        output: Some(dir.path().join("out.csv")),
        note_type: Some("basic".to_string()),
        ..Default::default()
    };
    let err = run_conversion(&config).await.expect_err("case differs");
    assert_eq!(err.kind(), ErrorKind::NoMatchingRecords);
}

#[tokio::test]
async fn test_unused_note_type_has_no_rows() {
    let dir = temp_dir();
    let input = mixed_package(Layout::Legacy).write(dir.path(), "mixed.apkg").await;

    let config = Config {
        input,
        output: Some(dir.path().join("vocab.csv")),
        note_type: Some("Vocab".to_string()),
        ..Default::default()
    };
    let err = run_conversion(&config).await.expect_err("Vocab has no notes");
    assert_eq!(err.exit_code(), 4);
}
