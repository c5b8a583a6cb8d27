// Unit tests for markdown formatter utilities

use options_activity::report::formatter::*;

#[cfg(test)]
mod tests {
    use super::*;

    // Note: formatter.rs already includes basic tests
    // These tests cover additional edge cases:

    #[test]
    fn test_empty_table() {
        let headers = vec!["Column 1", "Column 2"];
        let rows: Vec<Vec<String>> = vec![];

        let table = build_table(&headers, &rows);

        // Should still have header and separator
        assert!(table.contains("| Column 1 | Column 2 |"));
        assert!(table.contains("|--------|--------|"));

        // But no data rows
        let lines: Vec<&str> = table.lines().collect();
        assert_eq!(lines.len(), 2);
    }

    #[test]
    fn test_build_list_empty() {
        let items: Vec<String> = vec![];

        assert_eq!(build_list(&items), "");
    }

    #[test]
    fn test_strike_grouping() {
        assert_eq!(format_strike(0.0), "$0.00");
        assert_eq!(format_strike(999.99), "$999.99");
        assert_eq!(format_strike(1000.0), "$1,000.00");
        assert_eq!(format_strike(12345.678), "$12,345.68");
        assert_eq!(format_strike(123456.0), "$123,456.00");
    }

    #[test]
    fn test_count_grouping() {
        assert_eq!(format_count(0), "0");
        assert_eq!(format_count(100), "100");
        assert_eq!(format_count(1000), "1,000");
        assert_eq!(format_count(25_000_000), "25,000,000");
        assert_eq!(format_optional_count(Some(1500)), "1,500");
    }

    #[test]
    fn test_ratio_and_multiple() {
        assert_eq!(format_ratio(Some(5.0)), "5.00");
        assert_eq!(format_ratio(Some(0.25)), "0.25");
        assert_eq!(format_multiple(Some(1.5)), "1.5×");
        assert_eq!(format_multiple(Some(3.0)), "3.0×");
    }

    #[test]
    fn test_format_percentage_edge_cases() {
        assert_eq!(format_percentage(0.0), "0.00%");
        assert_eq!(format_percentage(-5.5), "-5.50%");
        assert_eq!(format_percentage(0.001), "0.00%");

        // Implied volatility arrives as a fraction
        assert_eq!(format_fraction_pct(Some(0.5)), "50.00%");
        assert_eq!(format_fraction_pct(Some(1.25)), "125.00%");
        assert_eq!(format_optional_pct(Some(4.0)), "4.00%");
        assert_eq!(format_optional_pct(None), "n/a");
    }

    #[test]
    fn test_format_datetime() {
        let dt = chrono::DateTime::from_timestamp(1792108800, 0).unwrap();
        assert_eq!(format_datetime(dt), "2026-10-16 00:00:00 UTC");
    }
}
