//! # codesearch: syntax-aware code chunking and hybrid search
//!
//! Splits source files along their syntax tree into line-aligned chunks,
//! embeds them, stores them per collection in SQLite, and answers queries
//! with dense, keyword, or fused retrieval.
//!
//! ## Architecture
//!
//! - **[`chunker`]**: Tree-guided splitting of one parsed document into chunks
//! - **[`indexer`]**: Language registry, tree-sitter parsing, directory sync
//! - **[`embedder`]**: Embedding trait and the built-in hashing embedder
//! - **[`db`]**: SQLite + sqlite-vec store for collections, chunks and vectors
//! - **[`search`]**: Query modes, reciprocal-rank fusion, reranking
//! - **[`service`]**: Collection lifecycle, ingestion and search facade
//! - **[`config`]**: JSON configuration loading and validation

pub mod chunker;
pub mod config;
pub mod db;
pub mod embedder;
pub mod indexer;
pub mod search;
pub mod service;
