use super::{Db, models::StoredChunk, serialize_vector};
use rusqlite::types::Value;
use rusqlite::{Result, params};

fn like_escape(term: &str) -> String {
    term.replace('\\', "\\\\")
        .replace('%', "\\%")
        .replace('_', "\\_")
}

fn map_chunk_row(row: &rusqlite::Row<'_>) -> rusqlite::Result<StoredChunk> {
    Ok(StoredChunk {
        chunk_id: row.get(0)?,
        filename: row.get(1)?,
        content: row.get(2)?,
        language: row.get(3)?,
        line_start: row.get(4)?,
        line_end: row.get(5)?,
        score: row.get(6)?,
    })
}

impl Db {
    /// Nearest chunks of a collection by cosine distance, most similar first.
    ///
    /// Scores are `1 - distance / 2`, so 1.0 means identical direction.
    pub fn search_dense(
        &self,
        collection_id: i64,
        query_vector: &[f32],
        top_k: usize,
    ) -> Result<Vec<StoredChunk>> {
        let mut stmt = self.conn.prepare(
            r#"
            SELECT
                c.id,
                d.filename,
                c.content,
                c.language,
                c.line_start,
                c.line_end,
                1.0 - (vec_distance_cosine(v.embedding, ?) / 2.0) AS similarity
            FROM vec_chunks v
            JOIN chunks c ON v.rowid = c.id
            JOIN documents d ON c.document_id = d.id
            WHERE d.collection_id = ?
            ORDER BY similarity DESC, c.id ASC
            LIMIT ?
            "#,
        )?;
        let rows = stmt.query_map(
            params![serialize_vector(query_vector), collection_id, top_k as i64],
            map_chunk_row,
        )?;
        rows.collect()
    }

    /// Chunks of a collection containing any of `terms`, scored by how many
    /// distinct terms they contain (case-insensitive substring match).
    pub fn search_keywords(
        &self,
        collection_id: i64,
        terms: &[&str],
        top_k: usize,
    ) -> Result<Vec<StoredChunk>> {
        if terms.is_empty() {
            return Ok(Vec::new());
        }

        let mut cases = Vec::with_capacity(terms.len());
        let mut params: Vec<Value> = Vec::with_capacity(terms.len() + 2);
        for term in terms {
            cases.push("CASE WHEN LOWER(c.content) LIKE ? ESCAPE '\\' THEN 1 ELSE 0 END");
            params.push(Value::Text(format!("%{}%", like_escape(&term.to_lowercase()))));
        }

        let query = format!(
            r#"
            SELECT * FROM (
                SELECT
                    c.id,
                    d.filename,
                    c.content,
                    c.language,
                    c.line_start,
                    c.line_end,
                    CAST(({}) AS REAL) AS hits
                FROM chunks c
                JOIN documents d ON c.document_id = d.id
                WHERE d.collection_id = ?
            )
            WHERE hits > 0
            ORDER BY hits DESC, id ASC
            LIMIT ?
            "#,
            cases.join(" + ")
        );
        params.push(Value::Integer(collection_id));
        params.push(Value::Integer(top_k as i64));

        let param_refs: Vec<&dyn rusqlite::ToSql> =
            params.iter().map(|p| p as &dyn rusqlite::ToSql).collect();

        let mut stmt = self.conn.prepare(&query)?;
        let rows = stmt.query_map(param_refs.as_slice(), map_chunk_row)?;
        rows.collect()
    }
}
