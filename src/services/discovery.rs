//! Item discovery - capability layer
//!
//! Extracts the retrievable work items from the listing view. The listing is
//! either a plain table or a themed list of divs depending on the portal
//! skin, so both shapes are matched.

use tracing::{debug, info};

use crate::error::Result;
use crate::infrastructure::PageDriver;
use crate::models::WorkItem;

/// Rows of the listing view, whichever rendering the portal picked.
const LISTING_ROWS_XPATH: &str =
    "//tr | //div[contains(@class, 'list')]//div[contains(@class, 'item')]";

/// Discover the work items on the current listing view, in document order.
///
/// Rows that do not parse are skipped silently (headers, pagination, empty
/// rows). Items whose period is lexicographically below `min_period` are
/// excluded — `YYYY/MM` sorts correctly as a string.
pub async fn discover(driver: &PageDriver, min_period: &str) -> Result<Vec<WorkItem>> {
    let rows = driver.inner_texts(LISTING_ROWS_XPATH).await?;
    debug!("listing exposed {} rows", rows.len());

    let items = parse_rows(&rows, min_period);
    info!(
        "✓ {} retrievable items at or after {}",
        items.len(),
        min_period
    );
    Ok(items)
}

/// Pure parsing core of [`discover`], kept separate so it can be exercised
/// without a browser.
pub fn parse_rows(rows: &[String], min_period: &str) -> Vec<WorkItem> {
    rows.iter()
        .filter_map(|row| WorkItem::parse(row))
        .filter(|item| item.period.as_str() >= min_period)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn rows(texts: &[&str]) -> Vec<String> {
        texts.iter().map(|t| t.to_string()).collect()
    }

    #[test]
    fn filters_by_minimum_period_and_keeps_listing_order() {
        let rows = rows(&[
            "Nome Competência Ações",
            "10 Alpha 2026/01",
            "11 Beta 2025/11",
            "12 Gamma 2025/12",
            "",
        ]);

        let items = parse_rows(&rows, "2025/12");

        assert_eq!(items.len(), 2);
        assert_eq!(items[0].site_name, "Alpha");
        assert_eq!(items[1].site_name, "Gamma");
    }

    #[test]
    fn cutoff_is_inclusive() {
        let items = parse_rows(&rows(&["12 Gamma 2025/12"]), "2025/12");
        assert_eq!(items.len(), 1);
    }

    #[test]
    fn unparsable_rows_are_skipped_without_error() {
        let items = parse_rows(&rows(&["not a row", "also | not | a | row"]), "2000/01");
        assert!(items.is_empty());
    }

    #[test]
    fn two_item_end_to_end_filter() {
        // discovery half of the canonical two-item scenario
        let rows = rows(&["10 Alpha 2026/01", "11 Beta 2025/11"]);
        let items = parse_rows(&rows, "2025/12");

        assert_eq!(items.len(), 1);
        assert_eq!(items[0].id, "10");
        assert_eq!(items[0].history_key(), "10_2026/01");
        assert_eq!(
            items[0].canonical_file_name(),
            "Report - Alpha - 2026-01.xlsx"
        );
    }
}
