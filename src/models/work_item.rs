//! Work item model
//!
//! One retrievable (work-site, period) pair, parsed from a listing row.

use std::fmt::Display;

use regex::Regex;

/// Listing-row pattern: `<id> <site name> <YYYY/MM>`.
const ROW_PATTERN: &str = r"^(\d+)\s*(.*?)\s*(\d{4}/\d{2})$";

/// One payroll report to retrieve.
///
/// Immutable once created; lives for a single orchestration run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WorkItem {
    /// Portal-side identifier of the work site
    pub id: String,
    /// Human-readable work-site name (may contain characters illegal in filenames)
    pub site_name: String,
    /// Accounting period, "YYYY/MM"
    pub period: String,
}

impl WorkItem {
    /// Parse a listing row into a work item.
    ///
    /// Rows that do not match the `<id> <site> <period>` pattern yield `None`;
    /// the caller skips them silently (headers, pagination rows, etc.).
    pub fn parse(row: &str) -> Option<Self> {
        let re = Regex::new(ROW_PATTERN).ok()?;
        let caps = re.captures(row.trim())?;
        Some(Self {
            id: caps[1].trim().to_string(),
            site_name: caps[2].trim().to_string(),
            period: caps[3].trim().to_string(),
        })
    }

    /// Composite ledger key, `"{id}_{period}"`.
    pub fn history_key(&self) -> String {
        format!("{}_{}", self.id, self.period)
    }

    /// Deterministic output filename for this item.
    ///
    /// `"Report - {site} - {period with / replaced by -}.xlsx"`, with
    /// filesystem-illegal characters stripped from the whole name.
    pub fn canonical_file_name(&self) -> String {
        let name = format!(
            "Report - {} - {}.xlsx",
            self.site_name,
            self.period.replace('/', "-")
        );
        sanitize_file_name(&name)
    }
}

impl Display for WorkItem {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} ({})", self.site_name, self.period)
    }
}

/// Strip the characters Windows and the portal's export refuse in filenames.
pub fn sanitize_file_name(name: &str) -> String {
    if let Ok(re) = Regex::new(r#"[\\/*?:"<>|]"#) {
        re.replace_all(name, "").into_owned()
    } else {
        name.to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_a_plain_listing_row() {
        let item = WorkItem::parse("1042 Residencial Atlântico 2026/01").expect("should parse");
        assert_eq!(item.id, "1042");
        assert_eq!(item.site_name, "Residencial Atlântico");
        assert_eq!(item.period, "2026/01");
    }

    #[test]
    fn parses_a_row_without_spacing_around_the_site() {
        let item = WorkItem::parse("  7 Obra Central 2025/12  ").expect("should parse");
        assert_eq!(item.id, "7");
        assert_eq!(item.site_name, "Obra Central");
        assert_eq!(item.period, "2025/12");
    }

    #[test]
    fn rejects_rows_without_id_or_period() {
        assert!(WorkItem::parse("Obra Central 2025/12").is_none());
        assert!(WorkItem::parse("1042 Residencial Atlântico").is_none());
        assert!(WorkItem::parse("").is_none());
        assert!(WorkItem::parse("Nome  Competência  Ações").is_none());
    }

    #[test]
    fn history_key_is_id_underscore_period() {
        let item = WorkItem::parse("10 Alpha 2026/01").expect("should parse");
        assert_eq!(item.history_key(), "10_2026/01");
    }

    #[test]
    fn canonical_name_replaces_the_period_slash() {
        let item = WorkItem::parse("10 Alpha 2026/01").expect("should parse");
        assert_eq!(item.canonical_file_name(), "Report - Alpha - 2026-01.xlsx");
    }

    #[test]
    fn canonical_name_strips_illegal_characters_preserving_order() {
        let item = WorkItem {
            id: "5".to_string(),
            site_name: "Obra: A/B*C".to_string(),
            period: "2025/12".to_string(),
        };
        assert_eq!(
            item.canonical_file_name(),
            "Report - Obra ABC - 2025-12.xlsx"
        );
    }

    #[test]
    fn sanitize_removes_every_reserved_character() {
        assert_eq!(sanitize_file_name(r#"a\b/c*d?e:f"g<h>i|j"#), "abcdefghij");
    }
}
