//! Integration tests for the mdchunker CLI

use assert_cmd::Command;
use predicates::prelude::*;
use serde_json::json;
use std::fs;
use std::io::{BufRead, BufReader, Read, Write};
use std::net::{TcpListener, TcpStream};
use std::thread;
use tempfile::TempDir;

const DOC: &str = "# A\ntext\n## B\nmore";

const GUIDE: &str = "# Install\napt install tool\n# Usage\nrun it";

const CONFIG_KEYS: &[&str] = &[
    "MDCHUNKER_MAX_CHUNK_SIZE",
    "EMBEDDING_ENDPOINT",
    "EMBEDDING_MODEL",
    "EMBEDDING_DIM",
    "EMBEDDING_BATCH",
    "QUESTIONS_ENDPOINT",
    "QUESTIONS_MODEL",
    "QUESTIONS_MAX_TOKENS",
    "GROQ_API_KEY",
    "SEARCH_TOP_K",
    "RUST_LOG",
    "HTTP_PROXY",
    "http_proxy",
    "HTTPS_PROXY",
    "https_proxy",
    "ALL_PROXY",
    "all_proxy",
];

fn mdchunker() -> Command {
    let mut cmd = Command::cargo_bin("mdchunker").unwrap();
    for key in CONFIG_KEYS {
        cmd.env_remove(key);
    }
    cmd.env("NO_PROXY", "127.0.0.1");
    cmd
}

/// Command wired to a local stand-in for the chat and embedding services
fn mdchunker_with_services(base: &str) -> Command {
    let mut cmd = mdchunker();
    cmd.env("QUESTIONS_ENDPOINT", base)
        .env("EMBEDDING_ENDPOINT", base)
        .env("EMBEDDING_DIM", "2");
    cmd
}

/// Two-dimensional keyword embedding: install-ish texts vs everything else
fn keyword_vector(text: &str) -> Vec<f32> {
    if text.to_lowercase().contains("install") {
        vec![1.0, 0.0]
    } else {
        vec![0.0, 1.0]
    }
}

/// Serve `/chat/completions` and `/embed` on an ephemeral port
fn spawn_services() -> String {
    let listener = TcpListener::bind("127.0.0.1:0").unwrap();
    let addr = listener.local_addr().unwrap();

    thread::spawn(move || {
        for stream in listener.incoming() {
            match stream {
                Ok(stream) => answer(stream),
                Err(_) => break,
            }
        }
    });

    format!("http://{}", addr)
}

fn answer(mut stream: TcpStream) {
    let mut reader = BufReader::new(stream.try_clone().unwrap());

    let mut request_line = String::new();
    reader.read_line(&mut request_line).unwrap();

    let mut content_length = 0;
    loop {
        let mut header = String::new();
        reader.read_line(&mut header).unwrap();
        if header.trim().is_empty() {
            break;
        }
        if let Some((name, value)) = header.split_once(':') {
            if name.eq_ignore_ascii_case("content-length") {
                content_length = value.trim().parse().unwrap();
            }
        }
    }

    let mut body = vec![0; content_length];
    reader.read_exact(&mut body).unwrap();
    let request: serde_json::Value = serde_json::from_slice(&body).unwrap();

    let response = if request_line.contains("/embed") {
        let embeddings: Vec<Vec<f32>> = request["texts"]
            .as_array()
            .unwrap()
            .iter()
            .map(|t| keyword_vector(t.as_str().unwrap()))
            .collect();
        json!({ "embeddings": embeddings })
    } else {
        let prompt = request["messages"][0]["content"].as_str().unwrap();
        let topic = if prompt.contains("apt install") {
            "install"
        } else {
            "run"
        };
        let content = format!(r#"{{"questions": [{{"question": "How do I {} it?"}}]}}"#, topic);
        json!({ "choices": [{ "message": { "role": "assistant", "content": content } }] })
    };

    let body = response.to_string();
    write!(
        stream,
        "HTTP/1.1 200 OK\r\nContent-Type: application/json\r\nContent-Length: {}\r\nConnection: close\r\n\r\n{}",
        body.len(),
        body
    )
    .unwrap();
}

fn write_doc(dir: &TempDir, name: &str, content: &str) -> String {
    let path = dir.path().join(name);
    fs::write(&path, content).unwrap();
    path.display().to_string()
}

#[test]
fn test_no_arguments_prints_usage() {
    mdchunker()
        .assert()
        .failure()
        .stderr(predicate::str::contains("Usage"));
}

#[test]
fn test_two_positional_arguments_rejected() {
    let dir = TempDir::new().unwrap();
    let path = write_doc(&dir, "doc.md", DOC);

    mdchunker()
        .arg(&path)
        .arg(&path)
        .assert()
        .failure()
        .stderr(predicate::str::contains("Usage"));
}

#[test]
fn test_summary_line_per_chunk() {
    let dir = TempDir::new().unwrap();
    let path = write_doc(&dir, "doc.md", DOC);

    mdchunker()
        .arg(&path)
        .assert()
        .success()
        .stdout(predicate::str::contains("Number of chunks: 2"))
        .stdout(predicate::str::contains("[0] L1 lines 0-1 (8 chars) A"))
        .stdout(predicate::str::contains("[1] L2 lines 2-3 (9 chars) A > B"));
}

#[test]
fn test_json_output() {
    let dir = TempDir::new().unwrap();
    let path = write_doc(&dir, "doc.md", DOC);

    let output = mdchunker().arg(&path).arg("--json").output().unwrap();
    assert!(output.status.success());

    let records: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
    assert_eq!(records.as_array().unwrap().len(), 2);
    assert_eq!(records[1]["header_path"], "A > B");
    assert_eq!(records[1]["metadata"]["hierarchy"][0], "A");
    assert_eq!(records[1]["metadata"]["section_level"], 2);
}

#[test]
fn test_max_chunk_size_splits_sections() {
    let dir = TempDir::new().unwrap();
    let body = vec!["paragraph text"; 10].join("\n\n");
    let path = write_doc(&dir, "long.md", &format!("# Long\n{}", body));

    mdchunker()
        .arg(&path)
        .arg("--max-chunk-size")
        .arg("40")
        .assert()
        .success()
        .stdout(predicate::str::contains("Number of chunks: 1").not())
        .stdout(predicate::str::contains("[1] L1"));

    mdchunker()
        .arg(&path)
        .arg("--no-split")
        .assert()
        .success()
        .stdout(predicate::str::contains("Number of chunks: 1"));
}

#[test]
fn test_zero_budget_rejected() {
    let dir = TempDir::new().unwrap();
    let path = write_doc(&dir, "doc.md", DOC);

    mdchunker()
        .arg(&path)
        .arg("--max-chunk-size")
        .arg("0")
        .assert()
        .failure()
        .stderr(predicate::str::contains("positive"));
}

#[test]
fn test_missing_file_fails() {
    let dir = TempDir::new().unwrap();
    let missing = dir.path().join("missing.md");

    mdchunker()
        .arg(&missing)
        .assert()
        .failure()
        .stderr(predicate::str::contains("Failed to chunk"));
}

#[test]
fn test_directory_input() {
    let dir = TempDir::new().unwrap();
    write_doc(&dir, "b.md", "# Second");
    write_doc(&dir, "a.md", DOC);
    write_doc(&dir, "notes.txt", "# Ignored");

    let assert = mdchunker().arg(dir.path()).assert().success();
    let stdout = String::from_utf8(assert.get_output().stdout.clone()).unwrap();

    let a = stdout.find("a.md ==").unwrap();
    let b = stdout.find("b.md ==").unwrap();
    assert!(a < b);
    assert!(!stdout.contains("notes.txt"));
}

#[test]
fn test_chunking_ignores_unrelated_config() {
    let dir = TempDir::new().unwrap();
    let path = write_doc(&dir, "doc.md", DOC);

    mdchunker()
        .env("EMBEDDING_BATCH", "lots")
        .env("SEARCH_TOP_K", "many")
        .arg(&path)
        .assert()
        .success()
        .stdout(predicate::str::contains("Number of chunks: 2"));
}

#[test]
fn test_invalid_chunk_size_env_fails() {
    let dir = TempDir::new().unwrap();
    let path = write_doc(&dir, "doc.md", DOC);

    mdchunker()
        .env("MDCHUNKER_MAX_CHUNK_SIZE", "big")
        .arg(&path)
        .assert()
        .failure()
        .stderr(predicate::str::contains("MDCHUNKER_MAX_CHUNK_SIZE"));
}

#[test]
fn test_search_validates_embedding_config() {
    let dir = TempDir::new().unwrap();
    let index = write_doc(&dir, "index.json", "[]");

    mdchunker()
        .env("EMBEDDING_BATCH", "lots")
        .args(["search", &index, "query"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("EMBEDDING_BATCH"));
}

#[test]
fn test_search_missing_index_fails() {
    let dir = TempDir::new().unwrap();
    let missing = dir.path().join("missing.json").display().to_string();

    mdchunker()
        .args(["search", &missing, "query"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("Failed to load"));
}

#[test]
fn test_questions_requires_output() {
    let dir = TempDir::new().unwrap();
    let path = write_doc(&dir, "guide.md", GUIDE);

    mdchunker()
        .args(["questions", &path])
        .assert()
        .failure()
        .stderr(predicate::str::contains("--output"));
}

#[test]
fn test_questions_then_search() {
    let base = spawn_services();
    let dir = TempDir::new().unwrap();
    let path = write_doc(&dir, "guide.md", GUIDE);
    let index = dir.path().join("index.json").display().to_string();

    mdchunker_with_services(&base)
        .args(["questions", &path, "-o", &index])
        .assert()
        .success()
        .stdout(predicate::str::contains("2 chunks, 2 questions (2 embedded)"));

    let written: serde_json::Value =
        serde_json::from_str(&fs::read_to_string(&index).unwrap()).unwrap();
    assert_eq!(written[0]["chunk_id"], 0);
    assert_eq!(written[0]["questions"][0]["question"], "How do I install it?");
    assert_eq!(written[1]["questions"][0]["embedding"], json!([0.0, 1.0]));

    mdchunker_with_services(&base)
        .args(["search", &index, "install steps", "-k", "1"])
        .assert()
        .success()
        .stdout(predicate::str::contains("1. (1.0000) chunk 0: How do I install it?"))
        .stdout(predicate::str::contains("    apt install tool"))
        .stdout(predicate::str::contains("How do I run it?").not());
}

#[test]
fn test_embed_fills_missing_vectors() {
    let base = spawn_services();
    let dir = TempDir::new().unwrap();
    let path = write_doc(&dir, "guide.md", GUIDE);
    let index = dir.path().join("index.json").display().to_string();

    mdchunker_with_services(&base)
        .args(["questions", &path, "-o", &index, "--no-embed"])
        .assert()
        .success()
        .stdout(predicate::str::contains("(0 embedded)"));

    mdchunker_with_services(&base)
        .args(["embed", &index])
        .assert()
        .success()
        .stdout(predicate::str::contains("2 of 2 questions embedded"));

    let output = mdchunker_with_services(&base)
        .args(["search", &index, "how to run", "--json"])
        .output()
        .unwrap();
    assert!(output.status.success());

    let hits: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
    assert_eq!(hits.as_array().unwrap().len(), 2);
    assert_eq!(hits[0]["chunk_id"], 1);
    assert_eq!(hits[0]["question"], "How do I run it?");
}
