//! Integration tests for corpus loading.

// Integration tests live outside cfg(test)
#![allow(clippy::tests_outside_test_module)]

use std::{fs, path::PathBuf};

use qe_index::{Analyzer, IndexError, IndexReader, load_corpus, read_documents};

/// Writes `content` to a corpus file inside `dir`.
fn corpus(dir: &tempfile::TempDir, content: &str) -> PathBuf {
    let path = dir.path().join("corpus.jsonl");
    fs::write(&path, content).unwrap();
    path
}

#[test]
fn loads_documents_in_order() {
    let dir = tempfile::tempdir().unwrap();
    let path = corpus(
        &dir,
        concat!(
            r#"{"id": "doc-1", "body": "zebra zebra lion", "title": "savanna"}"#,
            "\n\n",
            r#"{"id": "doc-2", "body": "tiger lion"}"#,
            "\n",
        ),
    );

    let index = load_corpus(&path, Analyzer::default()).unwrap();
    assert_eq!(index.num_docs(), 2);
    assert_eq!(index.internal_id("doc-2").unwrap(), 1);
    assert_eq!(index.inverted_list("lion", "body").df(), 2);
    assert_eq!(index.inverted_list("savanna", "title").df(), 1);
    assert_eq!(index.field_stats("body").total_term_occurrences, 5);
}

#[test]
fn reports_line_of_bad_document() {
    let dir = tempfile::tempdir().unwrap();
    let path = corpus(&dir, "{\"id\": \"a\", \"body\": \"x\"}\n{\"body\": 3}\n");

    let err = read_documents(&path).unwrap_err();
    assert!(matches!(err, IndexError::Corpus { line: 2, .. }));
    assert!(err.to_string().contains("corpus.jsonl:2"));
}

#[test]
fn missing_file_is_io_error() {
    let dir = tempfile::tempdir().unwrap();
    let err = load_corpus(&dir.path().join("absent.jsonl"), Analyzer::default()).unwrap_err();
    assert!(matches!(err, IndexError::Io(_)));
}

#[test]
fn duplicate_ids_fail_loading() {
    let dir = tempfile::tempdir().unwrap();
    let path = corpus(&dir, "{\"id\": \"a\"}\n{\"id\": \"a\"}\n");
    assert!(matches!(
        load_corpus(&path, Analyzer::default()),
        Err(IndexError::DuplicateDocument(_))
    ));
}
