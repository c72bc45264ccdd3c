//! CLI integration tests for qe commands.
//!
//! These tests focus on exit codes, run-file lines, and the files the run
//! command writes.

// Integration tests live outside cfg(test)
#![allow(clippy::tests_outside_test_module)]

use std::{fs, path::Path};

use assert_cmd::Command;
use predicates::prelude::*;

/// Helper to get a qe command.
fn qe() -> Command {
    #[allow(deprecated)]
    Command::cargo_bin("qe").unwrap()
}

/// Writes a small corpus and returns its path.
fn write_corpus(dir: &Path) -> String {
    let path = dir.join("corpus.jsonl");
    fs::write(
        &path,
        concat!(
            r#"{"id": "doc-a", "body": "apple pie apple tart"}"#,
            "\n",
            r#"{"id": "doc-b", "body": "apple cheese tart"}"#,
            "\n",
            r#"{"id": "doc-c", "body": "pizza cheese pizza"}"#,
            "\n",
            r#"{"id": "doc-d", "body": "zebra lion tiger savanna"}"#,
            "\n",
        ),
    )
    .unwrap();
    path.display().to_string()
}

/// Writes a query file and returns its path.
fn write_queries(dir: &Path, content: &str) -> String {
    let path = dir.join("queries.txt");
    fs::write(&path, content).unwrap();
    path.display().to_string()
}

mod run {
    use super::*;

    #[test]
    fn writes_trec_run_to_stdout() {
        let dir = tempfile::tempdir().unwrap();
        let corpus = write_corpus(dir.path());
        let queries = write_queries(dir.path(), "1:pizza\n");

        qe().args(["run", "--corpus", &corpus, "--queries", &queries])
            .args(["--model", "ranked-boolean", "--run-id", "test"])
            .assert()
            .success()
            .stdout("1 Q0 doc-c 1 2.000000000000 test\n");
    }

    #[test]
    fn writes_run_to_output_file() {
        let dir = tempfile::tempdir().unwrap();
        let corpus = write_corpus(dir.path());
        let queries = write_queries(dir.path(), "7:#AND(apple tart)\n");
        let output = dir.path().join("run.teIn");

        qe().args(["run", "--corpus", &corpus, "--queries", &queries])
            .args(["--model", "unranked-boolean", "-o"])
            .arg(&output)
            .assert()
            .success()
            .stdout("");

        let run = fs::read_to_string(&output).unwrap();
        assert_eq!(
            run,
            concat!(
                "7 Q0 doc-a 1 1.000000000000 run-1\n",
                "7 Q0 doc-b 2 1.000000000000 run-1\n",
            )
        );
    }

    #[test]
    fn limit_truncates_each_ranking() {
        let dir = tempfile::tempdir().unwrap();
        let corpus = write_corpus(dir.path());
        let queries = write_queries(dir.path(), "1:apple\n");

        let output = qe()
            .args(["run", "--corpus", &corpus, "--queries", &queries, "-n", "1"])
            .assert()
            .success()
            .get_output()
            .stdout
            .clone();
        assert_eq!(String::from_utf8(output).unwrap().lines().count(), 1);
    }

    #[test]
    fn failed_query_writes_sentinel_and_fails() {
        let dir = tempfile::tempdir().unwrap();
        let corpus = write_corpus(dir.path());
        let queries = write_queries(dir.path(), "1:#FROB(apple)\n2:zebra\n");

        qe().args(["run", "--corpus", &corpus, "--queries", &queries])
            .args(["--model", "unranked-boolean"])
            .assert()
            .failure()
            .stdout(predicate::str::contains("1 Q0 dummy 1 0.000000000000 run-1"))
            .stdout(predicate::str::contains("2 Q0 doc-d 1 1.000000000000 run-1"))
            .stderr(predicate::str::contains("Failed queries (1)"));
    }

    #[test]
    fn unknown_model_fails() {
        let dir = tempfile::tempdir().unwrap();
        let corpus = write_corpus(dir.path());
        let queries = write_queries(dir.path(), "1:apple\n");

        qe().args(["run", "--corpus", &corpus, "--queries", &queries])
            .args(["--model", "lsi"])
            .assert()
            .failure()
            .stderr(predicate::str::contains("unknown retrieval model 'lsi'"));
    }

    #[test]
    fn missing_corpus_fails() {
        let dir = tempfile::tempdir().unwrap();
        let queries = write_queries(dir.path(), "1:apple\n");

        qe().args(["run", "--corpus", "absent.jsonl", "--queries", &queries])
            .assert()
            .failure()
            .stderr(predicate::str::contains("failed to load corpus"));
    }

    #[test]
    fn malformed_query_file_fails() {
        let dir = tempfile::tempdir().unwrap();
        let corpus = write_corpus(dir.path());
        let queries = write_queries(dir.path(), "no separator\n");

        qe().args(["run", "--corpus", &corpus, "--queries", &queries])
            .assert()
            .failure()
            .stdout("");
    }

    #[test]
    fn invalid_feedback_weight_fails() {
        let dir = tempfile::tempdir().unwrap();
        let corpus = write_corpus(dir.path());
        let queries = write_queries(dir.path(), "1:apple\n");

        qe().args(["run", "--corpus", &corpus, "--queries", &queries])
            .args(["--feedback", "--fb-orig-weight", "1.5"])
            .assert()
            .failure()
            .stderr(predicate::str::contains("fbOrigWeight"));
    }

    #[test]
    fn feedback_writes_expansion_file() {
        let dir = tempfile::tempdir().unwrap();
        let corpus = write_corpus(dir.path());
        let queries = write_queries(dir.path(), "1:pie\n2:walrus\n");
        let expansions = dir.path().join("expanded.qry");

        qe().args(["run", "--corpus", &corpus, "--queries", &queries])
            .args(["--model", "indri", "--feedback", "--fb-docs", "1"])
            .args(["--fb-terms", "2", "--expansion-output"])
            .arg(&expansions)
            .assert()
            .success()
            .stdout(predicate::str::contains("1 Q0 doc-a 1"))
            .stdout(predicate::str::contains("2 Q0 dummy 1"));

        let written = fs::read_to_string(&expansions).unwrap();
        let lines: Vec<&str> = written.lines().collect();
        assert_eq!(lines.len(), 2);
        assert!(lines[0].starts_with("1: #wand("));
        assert_eq!(lines[1], "2: walrus");
    }

    #[test]
    fn feedback_reads_initial_ranking() {
        let dir = tempfile::tempdir().unwrap();
        let corpus = write_corpus(dir.path());
        let queries = write_queries(dir.path(), "1:pizza\n");
        let initial = dir.path().join("init.teIn");
        fs::write(&initial, "1 Q0 doc-d 1 1.0 prior\n").unwrap();
        let expansions = dir.path().join("expanded.qry");

        qe().args(["run", "--corpus", &corpus, "--queries", &queries])
            .args(["--model", "bm25", "--feedback", "--fb-docs", "1", "--fb-terms", "1"])
            .arg("--initial-ranking")
            .arg(&initial)
            .arg("--expansion-output")
            .arg(&expansions)
            .assert()
            .success();

        // The learned term comes from doc-d, not from the pizza document.
        let written = fs::read_to_string(&expansions).unwrap();
        assert!(written.starts_with("1: #wand("));
        assert!(!written.contains("pizza"));
    }

    #[test]
    fn config_file_supplies_settings() {
        let dir = tempfile::tempdir().unwrap();
        let corpus = write_corpus(dir.path());
        let queries = write_queries(dir.path(), "1:pizza\n");
        let config = dir.path().join("qe.toml");
        fs::write(
            &config,
            "[retrieval]\nmodel = \"ranked-boolean\"\n[output]\nrun_id = \"from-config\"\n",
        )
        .unwrap();

        qe().args(["run", "--corpus", &corpus, "--queries", &queries, "--config"])
            .arg(&config)
            .assert()
            .success()
            .stdout("1 Q0 doc-c 1 2.000000000000 from-config\n");
    }
}

mod parse {
    use super::*;

    #[test]
    fn prints_tree_and_canonical_query() {
        qe().args(["parse", "#NEAR/2(Apple pie)", "--model", "unranked-boolean"])
            .assert()
            .success()
            .stdout(predicate::str::contains("Near/2"))
            .stdout(predicate::str::contains("#near/2(apple.body pie.body)"));
    }

    #[test]
    fn bare_query_uses_model_default_operator() {
        qe().args(["parse", "apple pie", "--model", "bm25"])
            .assert()
            .success()
            .stdout(predicate::str::contains("Dialect: bm25"))
            .stdout(predicate::str::contains("Sum"));
    }

    #[test]
    fn corpus_analyzer_stems_terms() {
        let dir = tempfile::tempdir().unwrap();
        let corpus = write_corpus(dir.path());

        qe().args(["parse", "#SYN(apples cheese)", "--corpus", &corpus])
            .assert()
            .success()
            .stdout(predicate::str::contains("appl.body"))
            .stdout(predicate::str::contains("chees.body"));
    }

    #[test]
    fn syntax_error_fails() {
        qe().args(["parse", "#AND(apple"])
            .assert()
            .failure()
            .stderr(predicate::str::starts_with("error:"));
    }
}

mod config {
    use super::*;

    #[test]
    fn prints_defaults() {
        qe().arg("config")
            .assert()
            .success()
            .stdout(predicate::str::contains("[retrieval]"))
            .stdout(predicate::str::contains("model = \"bm25\""));
    }

    #[test]
    fn reports_warnings() {
        let dir = tempfile::tempdir().unwrap();
        let config = dir.path().join("qe.toml");
        fs::write(&config, "[retrieval]\nmodel = \"indri\"\n[bm25]\nk1 = 2.0\n").unwrap();

        qe().args(["config", "--config"])
            .arg(&config)
            .assert()
            .success()
            .stdout(predicate::str::contains("model = \"indri\""))
            .stderr(predicate::str::contains("Warnings (1):"))
            .stderr(predicate::str::contains("[bm25] has no effect"));
    }

    #[test]
    fn invalid_config_fails() {
        let dir = tempfile::tempdir().unwrap();
        let config = dir.path().join("qe.toml");
        fs::write(&config, "[bm25]\nk2 = 1.0\n").unwrap();

        qe().args(["config", "--config"])
            .arg(&config)
            .assert()
            .failure()
            .stderr(predicate::str::contains("failed to load configuration"));
    }
}
