//! Cell cleanup shared by header matching and text fields.
//!
//! No Unicode folding is done: "ngày" and "ngay" are different tokens, so
//! the alias tables in `header` list both spellings.

/// Lower-cased, trimmed, whitespace-collapsed token. Absent or blank input
/// yields an empty string.
pub fn normalize_cell(cell: Option<&str>) -> String {
    clean_text(cell).to_lowercase()
}

/// Trim and collapse internal whitespace (including line breaks inside
/// wrapped cells) without changing case.
pub fn clean_text(cell: Option<&str>) -> String {
    match cell {
        Some(s) => s.split_whitespace().collect::<Vec<_>>().join(" "),
        None => String::new(),
    }
}

pub fn normalize_row(row: &[Option<String>]) -> Vec<String> {
    row.iter().map(|c| normalize_cell(c.as_deref())).collect()
}

/// True if `phrase` occurs in `text` on word boundaries, so "ngay" does not
/// hit inside "ngayle" and "debit" does not hit inside "debited".
pub fn contains_phrase(text: &str, phrase: &str) -> bool {
    if phrase.is_empty() {
        return false;
    }
    text.match_indices(phrase).any(|(start, _)| {
        let end = start + phrase.len();
        let before_ok = text[..start]
            .chars()
            .next_back()
            .is_none_or(|c| !c.is_alphanumeric());
        let after_ok = text[end..].chars().next().is_none_or(|c| !c.is_alphanumeric());
        before_ok && after_ok
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_normalize_none_or_blank() {
        assert_eq!(normalize_cell(None), "");
        assert_eq!(normalize_cell(Some("")), "");
        assert_eq!(normalize_cell(Some("   \n ")), "");
    }

    #[test]
    fn test_normalize_lowercases_and_collapses() {
        assert_eq!(normalize_cell(Some("  Date  ")), "date");
        assert_eq!(normalize_cell(Some("Ghi   Nợ")), "ghi nợ");
        assert_eq!(normalize_cell(Some("NGÀY\nGIAO DỊCH")), "ngày giao dịch");
    }

    #[test]
    fn test_clean_text_keeps_case() {
        assert_eq!(clean_text(Some(" Payment\n to  ACME ")), "Payment to ACME");
    }

    #[test]
    fn test_contains_phrase_word_boundaries() {
        assert!(contains_phrase("số tiền ghi nợ", "ghi nợ"));
        assert!(contains_phrase("ghi nợ (vnđ)", "ghi nợ"));
        assert!(contains_phrase("debit", "debit"));
        assert!(!contains_phrase("debited amount", "debit"));
        assert!(!contains_phrase("thanh toan ngayle", "ngay"));
        assert!(!contains_phrase("anything", ""));
    }
}
