//! Segment store operations.

use std::borrow::Borrow;

use rusqlite::{params, OptionalExtension};
use tracing::{debug, info};

use super::{Database, DbError, DbResult};
use crate::models::{segments_digest, ReportDocument, Segment, SegmentSource};
use crate::retrieval::{RetrievalResult, Retriever, DEFAULT_RETRIEVAL_LIMIT};

impl Database {
    /// Store a document's chunks. Positions follow slice order.
    pub fn insert_document(&self, title: Option<&str>, chunks: &[String]) -> DbResult<ReportDocument> {
        let document_id = uuid::Uuid::new_v4().to_string();
        let digest = segments_digest(chunks.iter().map(String::as_str));

        let tx = self.conn.unchecked_transaction()?;
        tx.execute(
            "INSERT INTO report_documents (document_id, title, digest, segment_count) VALUES (?1, ?2, ?3, ?4)",
            params![document_id, title, digest, chunks.len() as i64],
        )?;
        {
            let mut stmt = tx.prepare(
                "INSERT INTO report_segments (segment_id, document_id, position, content) VALUES (?1, ?2, ?3, ?4)",
            )?;
            for (position, chunk) in chunks.iter().enumerate() {
                let segment_id = uuid::Uuid::new_v4().to_string();
                stmt.execute(params![segment_id, document_id, position as i64, chunk])?;
            }
        }
        tx.commit()?;

        info!(document_id = %document_id, segments = chunks.len(), "stored report document");

        self.get_document(&document_id)?
            .ok_or_else(|| DbError::NotFound(document_id.clone()))
    }

    /// Get a document by ID.
    pub fn get_document(&self, document_id: &str) -> DbResult<Option<ReportDocument>> {
        let row = self
            .conn
            .query_row(
                r#"
                SELECT document_id, title, digest, segment_count, created_at
                FROM report_documents
                WHERE document_id = ?
                "#,
                [document_id],
                document_from_row,
            )
            .optional()?;
        Ok(row)
    }

    /// All documents, newest first.
    pub fn list_documents(&self) -> DbResult<Vec<ReportDocument>> {
        let mut stmt = self.conn.prepare(
            r#"
            SELECT document_id, title, digest, segment_count, created_at
            FROM report_documents
            ORDER BY created_at DESC, rowid DESC
            "#,
        )?;
        let rows = stmt.query_map([], document_from_row)?;

        let mut documents = Vec::new();
        for row in rows {
            documents.push(row?);
        }
        Ok(documents)
    }

    /// Find a document previously stored with identical segments.
    pub fn find_document_by_digest(&self, digest: &str) -> DbResult<Option<ReportDocument>> {
        let row = self
            .conn
            .query_row(
                r#"
                SELECT document_id, title, digest, segment_count, created_at
                FROM report_documents
                WHERE digest = ?
                ORDER BY created_at DESC, rowid DESC
                LIMIT 1
                "#,
                [digest],
                document_from_row,
            )
            .optional()?;
        Ok(row)
    }

    /// All segments of a document in position order.
    pub fn document_segments(&self, document_id: &str) -> DbResult<Vec<Segment>> {
        let mut stmt = self.conn.prepare(
            r#"
            SELECT segment_id, document_id, position, content
            FROM report_segments
            WHERE document_id = ?
            ORDER BY position
            "#,
        )?;
        let rows = stmt.query_map([document_id], segment_from_row)?;

        let mut segments = Vec::new();
        for row in rows {
            segments.push(row?);
        }
        Ok(segments)
    }

    /// Search one document's segments using FTS5 (BM25 ranking).
    pub fn search_segments(&self, document_id: &str, query: &str, limit: usize) -> DbResult<Vec<Segment>> {
        let fts_query = escape_fts_query(query);
        if fts_query.is_empty() {
            return Ok(Vec::new());
        }

        let mut stmt = self.conn.prepare(
            r#"
            SELECT s.segment_id, s.document_id, s.position, s.content,
                   bm25(report_segments_fts) AS score
            FROM report_segments s
            JOIN report_segments_fts fts ON s.rowid = fts.rowid
            WHERE report_segments_fts MATCH ?1
            AND s.document_id = ?2
            ORDER BY score, s.position
            LIMIT ?3
            "#,
        )?;
        let rows = stmt.query_map(params![fts_query, document_id, limit as i64], segment_from_row)?;

        let mut segments = Vec::new();
        for row in rows {
            segments.push(row?);
        }
        debug!(document_id, query, hits = segments.len(), "segment search");
        Ok(segments)
    }

    /// Delete a document and its segments.
    pub fn delete_document(&self, document_id: &str) -> DbResult<bool> {
        let rows_affected = self
            .conn
            .execute("DELETE FROM report_documents WHERE document_id = ?", [document_id])?;
        Ok(rows_affected > 0)
    }

    /// Retriever scoped to one document, borrowing this store.
    pub fn retriever(&self, document_id: impl Into<String>) -> DocumentRetriever<&Database> {
        DocumentRetriever::new(self, document_id)
    }

    /// Retriever scoped to one document, owning this store.
    ///
    /// The owned form is `Send`, so `Mutex<DocumentRetriever<Database>>` can be
    /// shared by extraction worker threads.
    pub fn into_retriever(self, document_id: impl Into<String>) -> DocumentRetriever<Database> {
        DocumentRetriever::new(self, document_id)
    }
}

fn document_from_row(row: &rusqlite::Row<'_>) -> rusqlite::Result<ReportDocument> {
    let segment_count: i64 = row.get(3)?;
    Ok(ReportDocument {
        document_id: row.get(0)?,
        title: row.get(1)?,
        digest: row.get(2)?,
        segment_count: segment_count.max(0) as usize,
        created_at: row.get(4)?,
    })
}

fn segment_from_row(row: &rusqlite::Row<'_>) -> rusqlite::Result<Segment> {
    let position: i64 = row.get(2)?;
    Ok(Segment {
        text: row.get(3)?,
        source: Some(SegmentSource {
            segment_id: row.get(0)?,
            document_id: row.get(1)?,
            position: position.max(0) as usize,
        }),
    })
}

/// Escape special FTS5 characters; any term may match, with prefix matching.
fn escape_fts_query(query: &str) -> String {
    let cleaned: String = query
        .chars()
        .map(|c| if c.is_alphanumeric() { c } else { ' ' })
        .collect();

    cleaned
        .split_whitespace()
        .map(|word| format!("\"{}\"*", word))
        .collect::<Vec<_>>()
        .join(" OR ")
}

/// [`Retriever`] over one stored document.
pub struct DocumentRetriever<D> {
    db: D,
    document_id: String,
    limit: usize,
}

impl<D: Borrow<Database>> DocumentRetriever<D> {
    fn new(db: D, document_id: impl Into<String>) -> Self {
        Self {
            db,
            document_id: document_id.into(),
            limit: DEFAULT_RETRIEVAL_LIMIT,
        }
    }

    /// Change the number of segments returned per query.
    pub fn with_limit(mut self, limit: usize) -> Self {
        self.limit = limit;
        self
    }

    pub fn document_id(&self) -> &str {
        &self.document_id
    }

    pub fn database(&self) -> &Database {
        self.db.borrow()
    }
}

impl<D: Borrow<Database>> Retriever for DocumentRetriever<D> {
    fn search(&self, query: &str) -> RetrievalResult<Vec<Segment>> {
        Ok(self
            .database()
            .search_segments(&self.document_id, query, self.limit)?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn setup_db() -> Database {
        Database::open_in_memory().unwrap()
    }

    fn chunks(texts: &[&str]) -> Vec<String> {
        texts.iter().map(|t| t.to_string()).collect()
    }

    #[test]
    fn test_insert_and_get() {
        let db = setup_db();
        let doc = db
            .insert_document(Some("report.txt"), &chunks(&["SODIUM 138", "CALCIUM 9.4"]))
            .unwrap();

        let fetched = db.get_document(&doc.document_id).unwrap().unwrap();
        assert_eq!(fetched.title.as_deref(), Some("report.txt"));
        assert_eq!(fetched.segment_count, 2);
        assert_eq!(fetched.digest, segments_digest(["SODIUM 138", "CALCIUM 9.4"]));

        let segments = db.document_segments(&doc.document_id).unwrap();
        assert_eq!(segments.len(), 2);
        assert_eq!(segments[1].text, "CALCIUM 9.4");
        assert_eq!(segments[1].source.as_ref().unwrap().position, 1);
    }

    #[test]
    fn test_search_is_scoped_to_document() {
        let db = setup_db();
        let first = db.insert_document(None, &chunks(&["CREATININE 1.5 mg/dL"])).unwrap();
        let second = db.insert_document(None, &chunks(&["CREATININE 0.8 mg/dL"])).unwrap();

        let hits = db.search_segments(&second.document_id, "CREATININE", 4).unwrap();
        assert_eq!(hits.len(), 1);
        assert_eq!(hits[0].text, "CREATININE 0.8 mg/dL");

        let hits = db.search_segments(&first.document_id, "creatinine", 4).unwrap();
        assert_eq!(hits[0].text, "CREATININE 1.5 mg/dL");
    }

    #[test]
    fn test_search_any_term_and_prefix() {
        let db = setup_db();
        let doc = db
            .insert_document(
                None,
                &chunks(&[
                    "Hemoglobin 13.5 g/dL",
                    "Vitamin B12 350 pg/mL",
                    "BLOOD UREA NITROGEN 25 mg/dL",
                ]),
            )
            .unwrap();

        let hits = db.search_segments(&doc.document_id, "vitamin b12", 4).unwrap();
        assert_eq!(hits[0].text, "Vitamin B12 350 pg/mL");

        let hits = db.search_segments(&doc.document_id, "UREA", 4).unwrap();
        assert_eq!(hits.len(), 1);

        let hits = db.search_segments(&doc.document_id, "hemo", 4).unwrap();
        assert_eq!(hits[0].text, "Hemoglobin 13.5 g/dL");
    }

    #[test]
    fn test_search_empty_or_symbolic_query() {
        let db = setup_db();
        let doc = db.insert_document(None, &chunks(&["SODIUM 138"])).unwrap();

        assert!(db.search_segments(&doc.document_id, "", 4).unwrap().is_empty());
        assert!(db.search_segments(&doc.document_id, "\"*:()", 4).unwrap().is_empty());
    }

    #[test]
    fn test_retriever_limit() {
        let db = setup_db();
        let doc = db
            .insert_document(None, &chunks(&["mg one", "mg two", "mg three"]))
            .unwrap();

        let retriever = db.retriever(doc.document_id.clone()).with_limit(2);
        assert_eq!(retriever.search("mg").unwrap().len(), 2);
        assert_eq!(retriever.document_id(), doc.document_id);
    }

    #[test]
    fn test_delete_document() {
        let db = setup_db();
        let doc = db.insert_document(None, &chunks(&["SODIUM 138"])).unwrap();

        assert!(db.delete_document(&doc.document_id).unwrap());
        assert!(db.get_document(&doc.document_id).unwrap().is_none());
        assert!(db.document_segments(&doc.document_id).unwrap().is_empty());
        assert!(!db.delete_document(&doc.document_id).unwrap());
    }

    #[test]
    fn test_find_by_digest() {
        let db = setup_db();
        let doc = db.insert_document(None, &chunks(&["a", "b"])).unwrap();

        let found = db.find_document_by_digest(&doc.digest).unwrap().unwrap();
        assert_eq!(found.document_id, doc.document_id);
        assert!(db.find_document_by_digest("nope").unwrap().is_none());
    }

    #[test]
    fn test_escape_fts_query() {
        assert_eq!(
            escape_fts_query("BLOOD UREA NITROGEN"),
            r#""BLOOD"* OR "UREA"* OR "NITROGEN"*"#
        );
        assert_eq!(escape_fts_query("RBC-COUNT"), r#""RBC"* OR "COUNT"*"#);
        // Operator words are quoted, never parsed as operators
        assert_eq!(escape_fts_query("NOT"), r#""NOT"*"#);
        assert_eq!(escape_fts_query("  "), "");
    }
}
