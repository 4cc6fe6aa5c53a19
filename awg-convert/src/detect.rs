/// Format a piece of imported content appears to be in.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DetectedFormat {
    /// Starts like a JSON document.
    BackupJson,
    /// Mentions an `[Interface]` header or a `PrivateKey`.
    Text,
    /// Neither.
    Unknown,
}

/// Sniff the format of imported content. JSON wins when both match.
pub fn detect_format(content: &str) -> DetectedFormat {
    if looks_like_backup(content) {
        DetectedFormat::BackupJson
    } else if looks_like_text(content) {
        DetectedFormat::Text
    } else {
        DetectedFormat::Unknown
    }
}

/// Content whose first non-blank character opens a JSON object or array.
pub fn looks_like_backup(content: &str) -> bool {
    let trimmed = content.trim_start();
    trimmed.starts_with('{') || trimmed.starts_with('[')
}

/// Content carrying a stanza header or private key, in any case.
pub fn looks_like_text(content: &str) -> bool {
    let lowered = content.to_ascii_lowercase();
    lowered.contains("[interface]") || lowered.contains("privatekey")
}

#[cfg(test)]
mod tests {
    use super::{detect_format, looks_like_backup, looks_like_text, DetectedFormat};

    #[test]
    fn detects_backup_documents() {
        assert_eq!(detect_format("  {\"servers\": []}"), DetectedFormat::BackupJson);
        assert_eq!(detect_format("\n[1, 2]"), DetectedFormat::BackupJson);
    }

    #[test]
    fn detects_stanza_text() {
        assert_eq!(
            detect_format("# c\n[Interface]\nPrivateKey = A"),
            DetectedFormat::Text
        );
        assert_eq!(detect_format("privatekey = A"), DetectedFormat::Text);
    }

    #[test]
    fn unknown_content() {
        assert_eq!(detect_format("hello"), DetectedFormat::Unknown);
        assert_eq!(detect_format(""), DetectedFormat::Unknown);
    }

    #[test]
    fn stanza_text_starting_with_header_is_both_candidates() {
        // `[Interface]` opens like a JSON array too; ingestion falls back.
        let text = "[Interface]\nPrivateKey = A";
        assert!(looks_like_backup(text));
        assert!(looks_like_text(text));
        assert_eq!(detect_format(text), DetectedFormat::BackupJson);
    }
}
