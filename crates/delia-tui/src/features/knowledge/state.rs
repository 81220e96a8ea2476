//! Knowledge base state types.

use std::time::{Duration, Instant};

use delia_core::api::{Document, DocumentStats};

use crate::common::format_file_size;

/// How long a success notice stays on screen.
pub const SUCCESS_NOTICE_TTL: Duration = Duration::from_secs(3);

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NoticeKind {
    Success,
    Error,
}

/// A one-line outcome message under the header.
///
/// Success notices expire on their own; error notices stay until dismissed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Notice {
    pub kind: NoticeKind,
    pub text: String,
    expires_at: Option<Instant>,
}

impl Notice {
    pub fn success(text: impl Into<String>, now: Instant) -> Self {
        Self {
            kind: NoticeKind::Success,
            text: text.into(),
            expires_at: Some(now + SUCCESS_NOTICE_TTL),
        }
    }

    pub fn error(text: impl Into<String>) -> Self {
        Self {
            kind: NoticeKind::Error,
            text: text.into(),
            expires_at: None,
        }
    }

    pub fn is_expired(&self, now: Instant) -> bool {
        self.expires_at.is_some_and(|at| now >= at)
    }
}

#[derive(Debug, Default)]
pub struct KnowledgeState {
    /// Latest statistics; `None` until the first successful load.
    pub stats: Option<DocumentStats>,
    pub notice: Option<Notice>,
}

impl KnowledgeState {
    /// Header text: the counts, or "Loading..." before they arrive.
    pub fn stats_label(&self) -> String {
        self.stats
            .as_ref()
            .map_or_else(|| "Loading...".to_string(), ToString::to_string)
    }

    pub fn show(&mut self, notice: Notice) {
        self.notice = Some(notice);
    }

    /// Dismisses an error notice. Returns true if one was showing.
    pub fn dismiss_error(&mut self) -> bool {
        if self
            .notice
            .as_ref()
            .is_some_and(|n| n.kind == NoticeKind::Error)
        {
            self.notice = None;
            return true;
        }
        false
    }

    /// Drops an expired notice. Returns true if it changed.
    pub fn expire_notice(&mut self, now: Instant) -> bool {
        if self.notice.as_ref().is_some_and(|n| n.is_expired(now)) {
            self.notice = None;
            return true;
        }
        false
    }
}

/// System message body listing uploaded documents.
pub fn format_document_list(documents: &[Document]) -> String {
    if documents.is_empty() {
        return "No documents uploaded yet. Use /upload <path> to add one.".to_string();
    }
    let mut out = format!("{} document(s):", documents.len());
    for doc in documents {
        out.push_str(&format!(
            "\n• {} ({}, uploaded {})",
            doc.filename,
            format_file_size(doc.file_size),
            doc.upload_date
        ));
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_stats_label() {
        let mut state = KnowledgeState::default();
        assert_eq!(state.stats_label(), "Loading...");
        state.stats = Some(DocumentStats {
            total_documents: 2,
            total_chunks: 40,
        });
        assert_eq!(state.stats_label(), "2 documents, 40 chunks");
    }

    #[test]
    fn test_success_notice_expires_after_ttl() {
        let now = Instant::now();
        let mut state = KnowledgeState::default();
        state.show(Notice::success("Uploaded", now));
        assert!(!state.expire_notice(now + Duration::from_secs(2)));
        assert!(state.expire_notice(now + SUCCESS_NOTICE_TTL));
        assert!(state.notice.is_none());
    }

    #[test]
    fn test_error_notice_waits_for_dismissal() {
        let now = Instant::now();
        let mut state = KnowledgeState::default();
        state.show(Notice::error("Upload failed"));
        assert!(!state.expire_notice(now + Duration::from_secs(3600)));
        assert!(state.dismiss_error());
        assert!(!state.dismiss_error());
    }

    #[test]
    fn test_document_list() {
        let docs = vec![Document {
            id: "1".into(),
            filename: "guide.pdf".into(),
            upload_date: "2024-05-01".into(),
            file_size: 2048,
        }];
        let text = format_document_list(&docs);
        assert!(text.starts_with("1 document(s):"));
        assert!(text.contains("guide.pdf (2.0 KB, uploaded 2024-05-01)"));
        assert!(format_document_list(&[]).contains("/upload"));
    }
}
