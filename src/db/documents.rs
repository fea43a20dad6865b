use super::{Db, models::NewChunk, serialize_vector};
use chrono::{DateTime, Utc};
use rusqlite::{OptionalExtension, Result, params};
use std::collections::HashMap;

impl Db {
    /// Returns a map of filename -> modified_at for a collection's documents
    pub fn list_documents(&self, collection_id: i64) -> Result<HashMap<String, DateTime<Utc>>> {
        let mut stmt = self
            .conn
            .prepare("SELECT filename, modified_at FROM documents WHERE collection_id = ?")?;
        let rows = stmt.query_map(params![collection_id], |row| {
            let filename: String = row.get(0)?;
            let modified_at: DateTime<Utc> = row.get(1)?;
            Ok((filename, modified_at))
        })?;

        let mut docs = HashMap::new();
        for row in rows {
            let (filename, modified_at) = row?;
            docs.insert(filename, modified_at);
        }

        Ok(docs)
    }

    /// Deletes a document and its associated chunks from the database
    pub fn delete_document(&self, collection_id: i64, filename: &str) -> Result<bool> {
        let doc_id: Option<i64> = self
            .conn
            .query_row(
                "SELECT id FROM documents WHERE collection_id = ? AND filename = ?",
                params![collection_id, filename],
                |row| row.get(0),
            )
            .optional()?;

        if let Some(doc_id) = doc_id {
            // Virtual table cascade deletion workaround
            self.conn.execute(
                "DELETE FROM vec_chunks WHERE rowid IN (SELECT id FROM chunks WHERE document_id = ?)",
                params![doc_id],
            )?;

            let rows = self
                .conn
                .execute("DELETE FROM documents WHERE id = ?", params![doc_id])?;
            Ok(rows > 0)
        } else {
            Ok(false)
        }
    }

    /// Inserts or replaces a document with its chunks and embeddings
    pub fn insert_document(
        &mut self,
        collection_id: i64,
        filename: &str,
        modified_at: DateTime<Utc>,
        chunks: &[NewChunk<'_>],
        embeddings: &[Vec<f32>],
    ) -> Result<()> {
        assert_eq!(
            chunks.len(),
            embeddings.len(),
            "chunks and embeddings length mismatch"
        );

        let tx = self.conn.transaction()?;

        let doc_id: i64 = tx.query_row(
            r#"
            INSERT INTO documents (collection_id, filename, modified_at, indexed_at)
            VALUES (?, ?, ?, CURRENT_TIMESTAMP)
            ON CONFLICT(collection_id, filename) DO UPDATE SET
                modified_at = excluded.modified_at,
                indexed_at = CURRENT_TIMESTAMP
            RETURNING id
            "#,
            params![collection_id, filename, modified_at],
            |row| row.get(0),
        )?;

        // Clean up old contents if any (re-indexing)
        tx.execute(
            "DELETE FROM vec_chunks WHERE rowid IN (SELECT id FROM chunks WHERE document_id = ?)",
            params![doc_id],
        )?;
        tx.execute("DELETE FROM chunks WHERE document_id = ?", params![doc_id])?;

        for (chunk, embedding) in chunks.iter().zip(embeddings) {
            tx.execute(
                r#"
                INSERT INTO chunks
                    (document_id, position, content, language, line_start, line_end, start_byte, end_byte)
                VALUES (?, ?, ?, ?, ?, ?, ?, ?)
                "#,
                params![
                    doc_id,
                    chunk.position as i64,
                    chunk.content,
                    chunk.language,
                    chunk.line_start,
                    chunk.line_end,
                    chunk.start_byte as i64,
                    chunk.end_byte as i64,
                ],
            )?;
            let chunk_id = tx.last_insert_rowid();

            tx.execute(
                "INSERT INTO vec_chunks (rowid, embedding) VALUES (?, ?)",
                params![chunk_id, serialize_vector(embedding)],
            )?;
        }

        tx.commit()?;
        Ok(())
    }

    /// Number of chunks stored in a collection.
    pub fn count_chunks(&self, collection_id: i64) -> Result<usize> {
        let count: i64 = self.conn.query_row(
            r#"
            SELECT COUNT(*) FROM chunks c
            JOIN documents d ON c.document_id = d.id
            WHERE d.collection_id = ?
            "#,
            params![collection_id],
            |row| row.get(0),
        )?;
        Ok(count as usize)
    }
}
