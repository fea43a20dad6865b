use crate::chunker::{ChunkError, CodeChunk, CodeSplitter, SourceIndex, SplitterConfig};
use crate::db::Db;
use crate::db::models::NewChunk;
use crate::embedder::{Embedder, EmbedderError, MAX_BATCH};
use crate::indexer::describe::embedding_text;
use crate::indexer::languages::Language;
use crate::indexer::post_merge::merge_small_chunks;
use chrono::{DateTime, Utc};
use globset::GlobSet;
use ignore::WalkBuilder;
use serde::Serialize;
use std::collections::HashSet;
use std::path::Path;
use std::sync::Arc;
use thiserror::Error;
use tokio::sync::Mutex as TokioMutex;
use tracing::{debug, info, warn};

/// Per-run counts of a directory sync.
#[derive(Debug, Default, Clone, PartialEq, Eq, Serialize)]
pub struct IndexReport {
    pub added: usize,
    pub updated: usize,
    pub skipped: usize,
    pub failed: usize,
    /// Documents dropped because their file disappeared or is now excluded.
    pub removed: usize,
    /// Chunks written during this run.
    pub chunks: usize,
}

#[derive(Error, Debug)]
pub enum IndexError {
    #[error("failed to read {path}: {source}")]
    Read {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error(transparent)]
    Chunk(#[from] ChunkError),

    #[error(transparent)]
    Embed(#[from] EmbedderError),

    #[error(transparent)]
    Db(#[from] rusqlite::Error),
}

/// How files are turned into chunks.
#[derive(Debug, Clone)]
pub struct IndexOptions {
    pub splitter: SplitterConfig,
    pub merge_min_length: Option<usize>,
    /// Matched against paths relative to the indexed root.
    pub exclude: GlobSet,
}

impl Default for IndexOptions {
    fn default() -> Self {
        Self {
            splitter: SplitterConfig::default(),
            merge_min_length: None,
            exclude: GlobSet::empty(),
        }
    }
}

/// Parse and chunk one source file, dropping whitespace-only chunks.
pub fn chunk_source(
    language: Language,
    source: &str,
    splitter: SplitterConfig,
    merge_min_length: Option<usize>,
) -> Result<Vec<CodeChunk>, ChunkError> {
    let tree = language.parse(source)?;
    let index = SourceIndex::new(source);
    let splitter = CodeSplitter::new(language.name(), splitter);
    let mut chunks = splitter.split(&tree.root_node(), &index)?;
    if let Some(min_length) = merge_min_length {
        chunks = merge_small_chunks(chunks, min_length);
    }
    chunks.retain(|c| !c.content.trim().is_empty());
    Ok(chunks)
}

/// Forward-slash path of `path` relative to `root`; the file name when
/// `root` is the file itself.
fn relative_key(root: &Path, path: &Path) -> String {
    let rel = path.strip_prefix(root).unwrap_or(path);
    let rel = if rel.as_os_str().is_empty() {
        path.file_name().map(Path::new).unwrap_or(path)
    } else {
        rel
    };
    rel.to_string_lossy().replace('\\', "/")
}

pub struct Indexer<'a, E: Embedder + ?Sized> {
    pub db: Arc<TokioMutex<Db>>,
    pub embedder: &'a E,
    pub options: IndexOptions,
}

impl<'a, E: Embedder + ?Sized> Indexer<'a, E> {
    pub fn new(db: Arc<TokioMutex<Db>>, embedder: &'a E, options: IndexOptions) -> Self {
        Self {
            db,
            embedder,
            options,
        }
    }

    /// Sync the source files under `dir` into a collection.
    ///
    /// Files whose modification time matches the stored one are skipped
    /// unless `force` is set. A file that fails to read, parse or embed is
    /// counted as failed and keeps whatever was stored for it before.
    pub async fn index_directory<P: AsRef<Path>>(
        &mut self,
        collection_id: i64,
        dir: P,
        force: bool,
    ) -> Result<IndexReport, IndexError> {
        let dir = dir.as_ref();

        // Get existing documents from DB map(filename -> modified_at)
        let existing_docs = {
            let db_guard = self.db.lock().await;
            db_guard.list_documents(collection_id)?
        };

        let mut report = IndexReport::default();
        let mut seen = HashSet::new();

        // Walk builder respects .gitignore by default
        let walker = WalkBuilder::new(dir).hidden(false).build();

        for entry in walker.into_iter().filter_map(|e| e.ok()) {
            let path = entry.path();
            if path.is_dir() {
                continue;
            }
            let Some(language) = Language::from_path(path) else {
                continue;
            };

            let key = relative_key(dir, path);
            if self.options.exclude.is_match(&key) {
                debug!("Excluded {key}");
                continue;
            }
            seen.insert(key.clone());

            let mod_time: DateTime<Utc> = match entry
                .metadata()
                .map_err(|e| e.to_string())
                .and_then(|m| m.modified().map_err(|e| e.to_string()))
            {
                Ok(t) => t.into(),
                Err(e) => {
                    warn!("Failed to stat {key}: {e}");
                    report.failed += 1;
                    continue;
                }
            };

            let existing = existing_docs.get(&key);
            if let Some(existing_time) = existing {
                if !force && mod_time.timestamp() == existing_time.timestamp() {
                    debug!("Unchanged {key}");
                    report.skipped += 1;
                    continue;
                }
            }

            match self
                .index_file(collection_id, path, &key, language, mod_time)
                .await
            {
                Ok(count) => {
                    report.chunks += count;
                    if existing.is_some() {
                        report.updated += 1;
                    } else {
                        report.added += 1;
                    }
                }
                Err(e) => {
                    warn!("Failed to index {key}: {e}");
                    report.failed += 1;
                }
            }
        }

        {
            let db_guard = self.db.lock().await;
            for filename in existing_docs.keys().filter(|f| !seen.contains(*f)) {
                if db_guard.delete_document(collection_id, filename)? {
                    debug!("Removed {filename}");
                    report.removed += 1;
                }
            }
        }

        info!(
            "Indexed {}: {} added, {} updated, {} skipped, {} failed, {} removed, {} chunks",
            dir.display(),
            report.added,
            report.updated,
            report.skipped,
            report.failed,
            report.removed,
            report.chunks
        );
        Ok(report)
    }

    /// Chunk, embed and store one file; returns the number of chunks written.
    async fn index_file(
        &mut self,
        collection_id: i64,
        real_path: &Path,
        key: &str,
        language: Language,
        mod_time: DateTime<Utc>,
    ) -> Result<usize, IndexError> {
        let source = tokio::fs::read_to_string(real_path)
            .await
            .map_err(|source| IndexError::Read {
                path: key.to_string(),
                source,
            })?;

        let chunks = chunk_source(
            language,
            &source,
            self.options.splitter,
            self.options.merge_min_length,
        )?;

        // Embedding text carries a short description ahead of the code
        let texts: Vec<String> = chunks
            .iter()
            .map(|c| embedding_text(language, &c.content))
            .collect();
        let mut vectors = Vec::with_capacity(texts.len());
        for batch in texts.chunks(MAX_BATCH) {
            let refs: Vec<&str> = batch.iter().map(String::as_str).collect();
            vectors.extend(self.embedder.embed_batch(&refs)?);
        }

        let rows: Vec<NewChunk<'_>> = chunks
            .iter()
            .enumerate()
            .map(|(position, c)| NewChunk {
                position,
                content: &c.content,
                language: language.name(),
                line_start: c.line_start,
                line_end: c.line_end,
                start_byte: c.range.start,
                end_byte: c.range.end,
            })
            .collect();

        {
            let mut db_guard = self.db.lock().await;
            db_guard.insert_document(collection_id, key, mod_time, &rows, &vectors)?;
        }

        Ok(rows.len())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::embedder::hash::HashEmbedder;
    use globset::{Glob, GlobSetBuilder};
    use std::fs;
    use tempfile::tempdir;

    const RUST_SOURCE: &str = "use std::fmt;\n\npub struct Point {\n    x: i32,\n    y: i32,\n}\n\nimpl fmt::Display for Point {\n    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {\n        write!(f, \"({}, {})\", self.x, self.y)\n    }\n}\n";

    const PYTHON_SOURCE: &str = "def load(path):\n    with open(path) as f:\n        return f.read()\n\n\ndef save(path, data):\n    with open(path, 'w') as f:\n        f.write(data)\n";

    async fn setup() -> (Arc<TokioMutex<Db>>, i64) {
        let db = Db::open_in_memory(32).unwrap();
        let col = db.insert_collection("test").unwrap();
        (Arc::new(TokioMutex::new(db)), col)
    }

    #[test]
    fn test_chunk_source_covers_file() {
        let config = SplitterConfig::new(80, 2).unwrap();
        let chunks = chunk_source(Language::Rust, RUST_SOURCE, config, None).unwrap();
        assert!(chunks.len() > 1);
        assert_eq!(chunks[0].line_start, 1);
        for pair in chunks.windows(2) {
            assert!(pair[1].line_start <= pair[0].line_end);
        }
        let all: Vec<&str> = chunks.iter().map(|c| c.content.as_str()).collect();
        let all = all.join("\n");
        assert!(all.contains("pub struct Point"));
        assert!(all.contains("write!(f"));
    }

    #[test]
    fn test_chunk_source_rejects_top_level_error() {
        let err = chunk_source(
            Language::Rust,
            "}\nfn main() {}\n",
            SplitterConfig::default(),
            None,
        )
        .unwrap_err();
        assert!(matches!(err, ChunkError::Parse { .. }));
    }

    #[test]
    fn test_chunk_source_empty_file() {
        let chunks =
            chunk_source(Language::Python, "", SplitterConfig::default(), Some(40)).unwrap();
        assert!(chunks.is_empty());
    }

    #[test]
    fn test_relative_key() {
        assert_eq!(
            relative_key(Path::new("/repo"), Path::new("/repo/src/lib.rs")),
            "src/lib.rs"
        );
        assert_eq!(
            relative_key(Path::new("/repo/main.py"), Path::new("/repo/main.py")),
            "main.py"
        );
    }

    #[tokio::test]
    async fn test_indexer_differential_sync() {
        let temp_dir = tempdir().unwrap();
        let dir_path = temp_dir.path();
        fs::write(dir_path.join("point.rs"), RUST_SOURCE).unwrap();
        fs::write(dir_path.join("io.py"), PYTHON_SOURCE).unwrap();
        fs::write(dir_path.join("README.md"), "# not code").unwrap();

        let (db, col) = setup().await;
        let embedder = HashEmbedder::new(32);
        let mut indexer = Indexer::new(db.clone(), &embedder, IndexOptions::default());

        // First sync
        let res1 = indexer.index_directory(col, dir_path, false).await.unwrap();
        assert_eq!(res1.added, 2);
        assert_eq!(res1.skipped, 0);
        assert_eq!(res1.failed, 0);
        assert!(res1.chunks >= 2);

        // Second sync immediately - should skip both
        let res2 = indexer.index_directory(col, dir_path, false).await.unwrap();
        assert_eq!(res2.added, 0);
        assert_eq!(res2.updated, 0);
        assert_eq!(res2.skipped, 2);
        assert_eq!(res2.chunks, 0);

        // Force re-indexes everything
        let res3 = indexer.index_directory(col, dir_path, true).await.unwrap();
        assert_eq!(res3.updated, 2);
        assert_eq!(res3.skipped, 0);
        assert_eq!(res3.chunks, res1.chunks);

        // Deleted files are dropped from the collection
        fs::remove_file(dir_path.join("io.py")).unwrap();
        let res4 = indexer.index_directory(col, dir_path, false).await.unwrap();
        assert_eq!(res4.removed, 1);
        assert_eq!(res4.skipped, 1);

        let docs = db.lock().await.list_documents(col).unwrap();
        assert_eq!(docs.len(), 1);
        assert!(docs.contains_key("point.rs"));
    }

    #[tokio::test]
    async fn test_parse_failure_is_counted() {
        let temp_dir = tempdir().unwrap();
        fs::write(temp_dir.path().join("good.py"), PYTHON_SOURCE).unwrap();
        fs::write(temp_dir.path().join("bad.rs"), "}\nfn main() {}\n").unwrap();

        let (db, col) = setup().await;
        let embedder = HashEmbedder::new(32);
        let mut indexer = Indexer::new(db.clone(), &embedder, IndexOptions::default());

        let report = indexer
            .index_directory(col, temp_dir.path(), false)
            .await
            .unwrap();
        assert_eq!(report.added, 1);
        assert_eq!(report.failed, 1);

        let docs = db.lock().await.list_documents(col).unwrap();
        assert!(docs.contains_key("good.py"));
        assert!(!docs.contains_key("bad.rs"));
    }

    #[tokio::test]
    async fn test_exclude_patterns() {
        let temp_dir = tempdir().unwrap();
        let vendored = temp_dir.path().join("vendor");
        fs::create_dir_all(&vendored).unwrap();
        fs::write(vendored.join("dep.py"), PYTHON_SOURCE).unwrap();
        fs::write(temp_dir.path().join("app.py"), PYTHON_SOURCE).unwrap();

        let mut builder = GlobSetBuilder::new();
        builder.add(Glob::new("vendor/**").unwrap());
        let options = IndexOptions {
            exclude: builder.build().unwrap(),
            ..IndexOptions::default()
        };

        let (db, col) = setup().await;
        let embedder = HashEmbedder::new(32);
        let mut indexer = Indexer::new(db.clone(), &embedder, options);

        let report = indexer
            .index_directory(col, temp_dir.path(), false)
            .await
            .unwrap();
        assert_eq!(report.added, 1);

        let docs = db.lock().await.list_documents(col).unwrap();
        assert_eq!(docs.keys().collect::<Vec<_>>(), vec!["app.py"]);
    }
}
