//! Collection lifecycle, ingestion and search behind one handle.
use std::path::{Path, PathBuf};
use std::sync::Arc;

use thiserror::Error;
use tokio::sync::Mutex as TokioMutex;
use tracing::{debug, info};

use crate::chunker::ChunkError;
use crate::config::Config;
use crate::db::Db;
use crate::db::models::CollectionInfo;
use crate::embedder::{Embedder, EmbedderError};
use crate::indexer::{IndexError, IndexOptions, IndexReport, Indexer};
use crate::search::{
    LexicalReranker, QueryMode, RRF_K, Reranker, SearchHit, query_terms, reciprocal_rank_fusion,
};

#[derive(Error, Debug)]
pub enum ServiceError {
    #[error("collection already exists: {0}")]
    CollectionExists(String),

    #[error("collection not found: {0}")]
    CollectionNotFound(String),

    #[error("invalid collection name: {0:?}")]
    InvalidCollectionName(String),

    #[error("path not found: {}", .0.display())]
    PathNotFound(PathBuf),

    #[error("embedder produces {embedder} dimensions but the store holds {store}")]
    DimensionMismatch { embedder: usize, store: usize },

    #[error("invalid exclude pattern: {0}")]
    Pattern(#[from] globset::Error),

    #[error(transparent)]
    Db(#[from] rusqlite::Error),

    #[error(transparent)]
    Embedder(#[from] EmbedderError),

    #[error(transparent)]
    Chunk(#[from] ChunkError),

    #[error(transparent)]
    Index(#[from] IndexError),
}

pub type Result<T> = std::result::Result<T, ServiceError>;

fn collection_id(db: &Db, name: &str) -> Result<i64> {
    db.collection_id(name)?
        .ok_or_else(|| ServiceError::CollectionNotFound(name.to_string()))
}

/// Shared state for every collection operation.
#[derive(Clone)]
pub struct SearchService {
    db: Arc<TokioMutex<Db>>,
    embedder: Arc<dyn Embedder>,
    reranker: Arc<dyn Reranker>,
    config: Arc<Config>,
    index_options: IndexOptions,
}

impl SearchService {
    pub fn new(db: Db, embedder: Arc<dyn Embedder>, config: Config) -> Result<Self> {
        if embedder.dimensions() != db.dimensions() {
            return Err(ServiceError::DimensionMismatch {
                embedder: embedder.dimensions(),
                store: db.dimensions(),
            });
        }
        let index_options = IndexOptions {
            splitter: config.splitter_config()?,
            merge_min_length: config.chunking.merge_min_length,
            exclude: config.exclude_set()?,
        };
        Ok(Self {
            db: Arc::new(TokioMutex::new(db)),
            embedder,
            reranker: Arc::new(LexicalReranker),
            config: Arc::new(config),
            index_options,
        })
    }

    /// Replace the reranker applied to every query.
    #[must_use]
    pub fn with_reranker(mut self, reranker: Arc<dyn Reranker>) -> Self {
        self.reranker = reranker;
        self
    }

    #[must_use]
    pub fn config(&self) -> &Config {
        &self.config
    }

    pub async fn create_collection(&self, name: &str) -> Result<i64> {
        let name = name.trim();
        if name.is_empty() {
            return Err(ServiceError::InvalidCollectionName(name.to_string()));
        }
        let db = self.db.lock().await;
        if db.collection_id(name)?.is_some() {
            return Err(ServiceError::CollectionExists(name.to_string()));
        }
        let id = db.insert_collection(name)?;
        info!("Created collection {name}");
        Ok(id)
    }

    /// Drop a collection and everything indexed into it.
    pub async fn delete_collection(&self, name: &str) -> Result<()> {
        let mut db = self.db.lock().await;
        let id = collection_id(&db, name)?;
        db.drop_collection(id)?;
        info!("Deleted collection {name}");
        Ok(())
    }

    pub async fn list_collections(&self) -> Result<Vec<CollectionInfo>> {
        let db = self.db.lock().await;
        Ok(db.list_collections()?)
    }

    /// Sync the source files under `path` into the named collection.
    pub async fn index_collection(
        &self,
        name: &str,
        path: &Path,
        force: bool,
    ) -> Result<IndexReport> {
        if !path.exists() {
            return Err(ServiceError::PathNotFound(path.to_path_buf()));
        }
        let id = {
            let db = self.db.lock().await;
            collection_id(&db, name)?
        };

        let mut indexer = Indexer::new(
            self.db.clone(),
            self.embedder.as_ref(),
            self.index_options.clone(),
        );
        Ok(indexer.index_directory(id, path, force).await?)
    }

    /// Answer `query` from one collection.
    ///
    /// Each retriever contributes up to `search.top_k` candidates; the
    /// reranker keeps `search.rerank_top_n` of them.
    pub async fn search(
        &self,
        name: &str,
        query: &str,
        mode: QueryMode,
    ) -> Result<Vec<SearchHit>> {
        let top_k = self.config.search.top_k;
        let terms = query_terms(query);

        let candidates = {
            let db = self.db.lock().await;
            let id = collection_id(&db, name)?;
            if query.trim().is_empty() {
                return Ok(Vec::new());
            }

            let term_refs: Vec<&str> = terms.iter().map(String::as_str).collect();
            match mode {
                QueryMode::Dense => {
                    let vector = self.embedder.embed(query)?;
                    db.search_dense(id, &vector, top_k)?
                }
                QueryMode::Sparse => db.search_keywords(id, &term_refs, top_k)?,
                QueryMode::Hybrid => {
                    let vector = self.embedder.embed(query)?;
                    let dense = db.search_dense(id, &vector, top_k)?;
                    let sparse = db.search_keywords(id, &term_refs, top_k)?;
                    reciprocal_rank_fusion(&[&dense, &sparse], RRF_K)
                }
            }
        };

        debug!(
            "{} candidates for {:?} in {} ({})",
            candidates.len(),
            query,
            name,
            mode
        );
        let ranked = self
            .reranker
            .rerank(&terms, candidates, self.config.search.rerank_top_n);
        Ok(ranked.into_iter().map(SearchHit::from).collect())
    }
}
