//! SQLite schema definition.

/// Complete database schema for the segment store.
pub const SCHEMA: &str = r#"
-- Enable foreign keys
PRAGMA foreign_keys = ON;

-- ============================================================================
-- Report Documents
-- ============================================================================

CREATE TABLE IF NOT EXISTS report_documents (
    document_id TEXT PRIMARY KEY,
    title TEXT,
    digest TEXT NOT NULL,                         -- SHA-256 over segment texts
    segment_count INTEGER NOT NULL DEFAULT 0,
    created_at TEXT NOT NULL DEFAULT (datetime('now'))
);

CREATE INDEX IF NOT EXISTS idx_documents_digest ON report_documents(digest);

-- ============================================================================
-- Report Segments
-- ============================================================================

CREATE TABLE IF NOT EXISTS report_segments (
    segment_id TEXT PRIMARY KEY,
    document_id TEXT NOT NULL REFERENCES report_documents(document_id) ON DELETE CASCADE,
    position INTEGER NOT NULL,
    content TEXT NOT NULL,
    created_at TEXT NOT NULL DEFAULT (datetime('now')),
    UNIQUE (document_id, position)
);

CREATE INDEX IF NOT EXISTS idx_segments_document ON report_segments(document_id, position);

-- FTS5 virtual table for full-text search
CREATE VIRTUAL TABLE IF NOT EXISTS report_segments_fts USING fts5(
    content,
    content='report_segments',
    content_rowid='rowid'
);

-- Triggers to keep FTS5 in sync with main table
CREATE TRIGGER IF NOT EXISTS report_segments_ai AFTER INSERT ON report_segments BEGIN
    INSERT INTO report_segments_fts(rowid, content)
    VALUES (new.rowid, new.content);
END;

CREATE TRIGGER IF NOT EXISTS report_segments_ad AFTER DELETE ON report_segments BEGIN
    INSERT INTO report_segments_fts(report_segments_fts, rowid, content)
    VALUES ('delete', old.rowid, old.content);
END;

CREATE TRIGGER IF NOT EXISTS report_segments_au AFTER UPDATE ON report_segments BEGIN
    INSERT INTO report_segments_fts(report_segments_fts, rowid, content)
    VALUES ('delete', old.rowid, old.content);
    INSERT INTO report_segments_fts(rowid, content)
    VALUES (new.rowid, new.content);
END;
"#;
