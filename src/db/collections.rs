use super::{Db, models::CollectionInfo};
use rusqlite::{OptionalExtension, Result, params};

impl Db {
    /// Create a collection and return its id.
    pub fn insert_collection(&self, name: &str) -> Result<i64> {
        self.conn
            .execute("INSERT INTO collections (name) VALUES (?)", params![name])?;
        Ok(self.conn.last_insert_rowid())
    }

    pub fn collection_id(&self, name: &str) -> Result<Option<i64>> {
        self.conn
            .query_row(
                "SELECT id FROM collections WHERE name = ?",
                params![name],
                |row| row.get(0),
            )
            .optional()
    }

    /// All collections with their document and chunk counts, by name.
    pub fn list_collections(&self) -> Result<Vec<CollectionInfo>> {
        let mut stmt = self.conn.prepare(
            r#"
            SELECT
                col.id,
                col.name,
                COUNT(DISTINCT d.id),
                COUNT(c.id)
            FROM collections col
            LEFT JOIN documents d ON d.collection_id = col.id
            LEFT JOIN chunks c ON c.document_id = d.id
            GROUP BY col.id
            ORDER BY col.name
            "#,
        )?;
        let rows = stmt.query_map([], |row| {
            Ok(CollectionInfo {
                id: row.get(0)?,
                name: row.get(1)?,
                documents: row.get::<_, i64>(2)? as usize,
                chunks: row.get::<_, i64>(3)? as usize,
            })
        })?;
        rows.collect()
    }

    /// Drop a collection with all its documents, chunks and vectors.
    pub fn drop_collection(&mut self, collection_id: i64) -> Result<bool> {
        let tx = self.conn.transaction()?;
        // vec0 rows are not covered by foreign-key cascades.
        tx.execute(
            r#"
            DELETE FROM vec_chunks WHERE rowid IN (
                SELECT c.id FROM chunks c
                JOIN documents d ON c.document_id = d.id
                WHERE d.collection_id = ?
            )
            "#,
            params![collection_id],
        )?;
        let rows = tx.execute(
            "DELETE FROM collections WHERE id = ?",
            params![collection_id],
        )?;
        tx.commit()?;
        Ok(rows > 0)
    }
}
