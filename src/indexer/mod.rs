//! Turns source trees into stored, embedded chunks.
//!
//! [`languages`] picks a tree-sitter grammar per file, the chunker splits the
//! parse, [`post_merge`] folds tiny chunks together, [`describe`] builds the
//! text that gets embedded, and [`Indexer`] drives a directory sync.
pub mod core;
pub mod describe;
pub mod languages;
pub mod post_merge;

pub use self::core::{IndexError, IndexOptions, IndexReport, Indexer, chunk_source};
pub use languages::Language;
