/// End-to-end integration tests for the codesearch pipeline.
///
/// Tests the complete flow:
///   Config → DB → Embedder → Indexer → Search → Delete
use codesearch::chunker::{ChunkError, CodeSplitter, SourceIndex, SplitterConfig};
use codesearch::config::Config;
use codesearch::db::Db;
use codesearch::embedder::Embedder;
use codesearch::embedder::hash::HashEmbedder;
use codesearch::indexer::{Language, chunk_source};
use codesearch::search::QueryMode;
use codesearch::service::{SearchService, ServiceError};
use std::fs;
use std::sync::Arc;
use tempfile::tempdir;

const STORE_PY: &str = r#"import sqlite3


class Store:
    """Keeps documents in a local SQLite file."""

    def __init__(self, path):
        self.conn = sqlite3.connect(path)

    def insert_document(self, name, body):
        self.conn.execute(
            "INSERT INTO docs (name, body) VALUES (?, ?)",
            (name, body),
        )
        self.conn.commit()

    def delete_document(self, name):
        self.conn.execute("DELETE FROM docs WHERE name = ?", (name,))
        self.conn.commit()
"#;

const TOKENIZE_RS: &str = r#"/// Split text into lower-case words.
pub fn tokenize(text: &str) -> Vec<String> {
    text.split_whitespace()
        .map(|w| w.to_lowercase())
        .collect()
}

/// Count how often each word occurs.
pub fn word_counts(text: &str) -> std::collections::HashMap<String, usize> {
    let mut counts = std::collections::HashMap::new();
    for word in tokenize(text) {
        *counts.entry(word).or_insert(0) += 1;
    }
    counts
}
"#;

const ROUTES_TS: &str = r#"interface Route {
  path: string;
  handler: (req: Request) => Response;
}

export function matchRoute(routes: Route[], path: string): Route | undefined {
  return routes.find((r) => r.path === path);
}
"#;

fn rust_module(functions: usize) -> String {
    (0..functions)
        .map(|i| {
            format!(
                "pub fn step_{i}(input: u64) -> u64 {{\n    let doubled = input * 2;\n    doubled + {i}\n}}\n\n"
            )
        })
        .collect()
}

fn service_at(db_path: &std::path::Path) -> SearchService {
    let mut config = Config::default();
    config.db_path = db_path.to_string_lossy().into_owned();
    config.model.dimensions = 128;
    let db = Db::open(&config.db_path, config.model.dimensions).unwrap();
    let embedder = Arc::new(HashEmbedder::new(config.model.dimensions));
    SearchService::new(db, embedder, config).unwrap()
}

/// Full pipeline: create sources → index → list → search → re-index → delete
#[tokio::test]
async fn test_full_pipeline() {
    let temp_dir = tempdir().unwrap();
    let repo = temp_dir.path().join("repo");
    fs::create_dir_all(repo.join("src")).unwrap();
    fs::create_dir_all(repo.join("web")).unwrap();
    fs::write(repo.join("src/store.py"), STORE_PY).unwrap();
    fs::write(repo.join("src/tokenize.rs"), TOKENIZE_RS).unwrap();
    fs::write(repo.join("web/routes.ts"), ROUTES_TS).unwrap();
    fs::write(repo.join("README.md"), "# notes, not indexed").unwrap();

    let svc = service_at(&temp_dir.path().join("store.db"));
    svc.create_collection("repo").await.unwrap();

    let report = svc.index_collection("repo", &repo, false).await.unwrap();
    assert_eq!(report.added, 3, "three source files: {report:?}");
    assert_eq!(report.failed, 0);
    assert!(report.chunks >= 3);

    let collections = svc.list_collections().await.unwrap();
    assert_eq!(collections.len(), 1);
    assert_eq!(collections[0].documents, 3);
    assert_eq!(collections[0].chunks, report.chunks);

    let hits = svc
        .search("repo", "delete_document", QueryMode::Hybrid)
        .await
        .unwrap();
    assert!(!hits.is_empty());
    assert_eq!(hits[0].file_path, "src/store.py");
    assert_eq!(hits[0].file_name, "store.py");
    assert!(hits[0].content.contains("delete_document"));

    let hits = svc
        .search("repo", "word_counts tokenize", QueryMode::Sparse)
        .await
        .unwrap();
    assert_eq!(hits[0].file_name, "tokenize.rs");

    let hits = svc
        .search("repo", "matchRoute path", QueryMode::Dense)
        .await
        .unwrap();
    assert!(hits.iter().any(|h| h.file_name == "routes.ts"));

    // Unchanged tree is skipped; forced run re-indexes
    let again = svc.index_collection("repo", &repo, false).await.unwrap();
    assert_eq!(again.skipped, 3);
    assert_eq!(again.chunks, 0);
    let forced = svc.index_collection("repo", &repo, true).await.unwrap();
    assert_eq!(forced.updated, 3);

    svc.delete_collection("repo").await.unwrap();
    assert!(matches!(
        svc.search("repo", "tokenize", QueryMode::Hybrid).await,
        Err(ServiceError::CollectionNotFound(_))
    ));
}

/// Collections persist across service instances backed by the same file.
#[tokio::test]
async fn test_store_persists() {
    let temp_dir = tempdir().unwrap();
    let db_path = temp_dir.path().join("persist.db");
    let src = temp_dir.path().join("src");
    fs::create_dir_all(&src).unwrap();
    fs::write(src.join("tokenize.rs"), TOKENIZE_RS).unwrap();

    {
        let svc = service_at(&db_path);
        svc.create_collection("words").await.unwrap();
        svc.index_collection("words", &src, false).await.unwrap();
    }

    let svc = service_at(&db_path);
    let hits = svc
        .search("words", "tokenize", QueryMode::Hybrid)
        .await
        .unwrap();
    assert!(!hits.is_empty());
    let report = svc.index_collection("words", &src, false).await.unwrap();
    assert_eq!(report.skipped, 1);
}

/// Chunks of a real parse tile the file: contiguous lines, budget respected
/// except for indivisible nodes, every line kept.
#[test]
fn test_tree_sitter_chunks_tile_file() {
    let source = rust_module(12);
    let tree = Language::Rust.parse(&source).unwrap();
    let index = SourceIndex::new(source.as_str());
    let splitter = CodeSplitter::new("rust", SplitterConfig::new(200, 2).unwrap());

    let chunks = splitter.split(&tree.root_node(), &index).unwrap();
    assert!(chunks.len() > 1);
    assert_eq!(chunks[0].line_start, 1);
    for pair in chunks.windows(2) {
        assert_eq!(pair[0].line_end, pair[1].line_start);
        assert_eq!(pair[0].range.end, pair[1].range.start);
    }
    let last = chunks.last().unwrap();
    assert_eq!(last.line_end as usize, source.lines().count() + 1);

    let rebuilt: Vec<&str> = chunks.iter().map(|c| c.content.as_str()).collect();
    let source_lines: Vec<&str> = source.lines().collect();
    assert_eq!(rebuilt.join("\n"), source_lines.join("\n"));

    for chunk in &chunks {
        let non_blank = chunk.content.lines().filter(|l| !l.trim().is_empty()).count();
        assert!(non_blank >= 2 || std::ptr::eq(chunk, last));
    }
}

#[test]
fn test_top_level_error_rejected() {
    let err = chunk_source(
        Language::Rust,
        "}\npub fn ok() {}\n",
        SplitterConfig::default(),
        None,
    )
    .unwrap_err();
    assert!(matches!(err, ChunkError::Parse { .. }));
}

/// A long chained expression nests one syntax level per operator.
#[test]
fn test_deeply_nested_expression_chunks() {
    let source = format!("x = {}1\n", "1 + ".repeat(20_000));
    let chunks = chunk_source(Language::Python, &source, SplitterConfig::default(), Some(40))
        .unwrap();
    assert!(!chunks.is_empty());
    assert_eq!(chunks[0].line_start, 1);
    assert!(chunks[0].content.starts_with("x = 1 + 1 + "));
}

#[test]
fn test_every_language_chunks() {
    let samples = [
        (Language::Python, STORE_PY),
        (Language::Rust, TOKENIZE_RS),
        (Language::TypeScript, ROUTES_TS),
        (Language::JavaScript, "function add(a, b) {\n  return a + b;\n}\n"),
        (Language::Go, "package main\n\nfunc add(a int, b int) int {\n\treturn a + b\n}\n"),
        (
            Language::Tsx,
            "export const App = () => {\n  return <div>hello</div>;\n};\n",
        ),
    ];
    for (language, source) in samples {
        let chunks = chunk_source(language, source, SplitterConfig::default(), Some(40)).unwrap();
        assert!(!chunks.is_empty(), "{language} produced no chunks");
        assert_eq!(chunks[0].line_start, 1, "{language}");
    }
}

#[test]
fn test_hash_embedder_matches_store_dimensions() {
    let embedder = HashEmbedder::new(64);
    let db = Db::open_in_memory(embedder.dimensions()).unwrap();
    assert_eq!(db.dimensions(), 64);
    let vector = embedder.embed("fn tokenize(text: &str)").unwrap();
    assert_eq!(vector.len(), 64);
}
