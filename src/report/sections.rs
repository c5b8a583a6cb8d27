// Section builders for the options activity report
//
// Each function builds a specific section of the report.
// Sections return Result<String, SectionError> for graceful degradation.

use super::{formatter, ReportSection, SectionError, EMPTY_STATE_MESSAGE};
use crate::activity::pipeline::TickerWarning;
use crate::activity::types::{ChainRecord, ImbalanceRow, Moneyness};
use crate::config::ActivityThresholds;
use chrono::{DateTime, Utc};

/// Build report header section with run metadata
///
/// Includes: generation time, watchlist, thresholds and volume gate
pub fn build_report_header(
    generated_at: DateTime<Utc>,
    watchlist: &[String],
    thresholds: &ActivityThresholds,
    min_volume: u64,
) -> ReportSection {
    let mut content = formatter::build_section_header("Options Activity Screen", 1);

    let headers = vec!["Setting", "Value"];
    let rows = vec![
        vec![
            "Generated At".to_string(),
            formatter::format_datetime(generated_at),
        ],
        vec!["Watchlist".to_string(), watchlist.join(", ")],
        vec![
            "Tiers (Vol/OI)".to_string(),
            format!(
                "Unusual ≥ {:.2}, High ≥ {:.2}, Extreme ≥ {:.2}",
                thresholds.unusual_min, thresholds.high_min, thresholds.extreme_min
            ),
        ],
        vec![
            "Minimum Volume".to_string(),
            formatter::format_count(min_volume),
        ],
    ];

    content.push_str(&formatter::build_table(&headers, &rows));
    content.push('\n');

    ReportSection {
        name: "header".to_string(),
        title: "Options Activity Screen".to_string(),
        content: Ok(content),
    }
}

fn moneyness_label(moneyness: Option<Moneyness>) -> String {
    moneyness
        .map(|m| m.to_string())
        .unwrap_or_else(|| formatter::UNDEFINED.to_string())
}

/// Build the ranked unusual activity table
///
/// Records are rendered in the order given; an empty list yields the
/// empty-state line instead of a table.
pub fn build_activity_section(records: &[ChainRecord]) -> ReportSection {
    let mut section = formatter::build_section_header("Unusual Activity", 2);

    if records.is_empty() {
        section.push_str(EMPTY_STATE_MESSAGE);
        section.push_str("\n\n");
    } else {
        let headers = vec![
            "Ticker",
            "Type",
            "Expiration",
            "Strike",
            "Volume",
            "Open Interest",
            "Vol/OI",
            "Activity",
            "Rel. Volume",
            "IV",
            "From Spot",
            "Moneyness",
        ];

        let rows: Vec<Vec<String>> = records
            .iter()
            .map(|r| {
                vec![
                    r.ticker.clone(),
                    r.option_type.to_string(),
                    r.expiration.clone(),
                    formatter::format_strike(r.strike),
                    formatter::format_count(r.volume),
                    formatter::format_optional_count(r.open_interest),
                    formatter::format_ratio(r.vol_over_oi),
                    r.activity_tier.to_string(),
                    formatter::format_multiple(r.relative_volume),
                    formatter::format_fraction_pct(r.implied_volatility),
                    formatter::format_optional_pct(r.pct_from_spot),
                    moneyness_label(r.moneyness),
                ]
            })
            .collect();

        section.push_str(&formatter::build_table(&headers, &rows));
        section.push('\n');
    }

    ReportSection {
        name: "unusual_activity".to_string(),
        title: "Unusual Activity".to_string(),
        content: Ok(section),
    }
}

/// Build the legend explaining the activity table's metrics and tiers
pub fn build_legend_section() -> ReportSection {
    let mut section = formatter::build_section_header("How to Read This Report", 2);

    let items = vec![
        "**Vol/OI** (volume ÷ open interest): how aggressively contracts trade \
         relative to existing positions."
            .to_string(),
        "**Rel. Volume**: a contract's volume against the median volume of its side \
         of the chain. Values above 1.0× indicate elevated interest."
            .to_string(),
        "**Activity**: Unusual is elevated but common, High is often institutional, \
         Extreme is rare and aggressive positioning (no upper cap)."
            .to_string(),
        "Large funds often build positions over time; repeated or clustered \
         appearances matter."
            .to_string(),
    ];
    section.push_str(&formatter::build_list(&items));
    section.push('\n');

    ReportSection {
        name: "legend".to_string(),
        title: "How to Read This Report".to_string(),
        content: Ok(section),
    }
}

/// Build the per-ticker call/put imbalance table
pub fn build_imbalance_section(imbalances: &[ImbalanceRow]) -> ReportSection {
    let content = if imbalances.is_empty() {
        Err(SectionError::NoTickerScreened)
    } else {
        let mut section = formatter::build_section_header("Flow Imbalance", 2);

        let headers = vec![
            "Ticker",
            "Expiration",
            "Call Volume",
            "Put Volume",
            "Call/Put",
            "Bias",
        ];
        let rows: Vec<Vec<String>> = imbalances
            .iter()
            .map(|row| {
                vec![
                    row.ticker.clone(),
                    row.expiration.clone(),
                    formatter::format_count(row.call_volume),
                    formatter::format_count(row.put_volume),
                    formatter::format_ratio(row.ratio),
                    row.bias.to_string(),
                ]
            })
            .collect();

        section.push_str(&formatter::build_table(&headers, &rows));
        section.push('\n');
        Ok(section)
    };

    ReportSection {
        name: "flow_imbalance".to_string(),
        title: "Flow Imbalance".to_string(),
        content,
    }
}

/// Build the warnings list; `None` when the run produced no warnings
pub fn build_warnings_section(warnings: &[TickerWarning]) -> Option<ReportSection> {
    if warnings.is_empty() {
        return None;
    }

    let mut section = formatter::build_section_header("Warnings", 2);
    let items: Vec<String> = warnings.iter().map(|w| w.message.clone()).collect();
    section.push_str(&formatter::build_list(&items));
    section.push('\n');

    Some(ReportSection {
        name: "warnings".to_string(),
        title: "Warnings".to_string(),
        content: Ok(section),
    })
}
