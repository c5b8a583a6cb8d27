// Report generator - assembles the markdown report for a screen result

use super::sections;
use super::ScreenReport;
use crate::activity::pipeline::{ScreenResult, WarningKind};
use crate::config::ScreenerConfig;

/// Renders screen results for the configuration they were produced with
pub struct ReportGenerator<'a> {
    config: &'a ScreenerConfig,
}

impl<'a> ReportGenerator<'a> {
    pub fn new(config: &'a ScreenerConfig) -> Self {
        Self { config }
    }

    /// Render a merged screen result to markdown
    pub fn render(&self, result: &ScreenResult) -> ScreenReport {
        let header = sections::build_report_header(
            result.generated_at,
            &self.config.watchlist,
            &self.config.thresholds,
            self.config.min_volume,
        );
        let activity = sections::build_activity_section(&result.records);
        let legend = sections::build_legend_section();
        let imbalance = sections::build_imbalance_section(&result.imbalances);
        let warnings = sections::build_warnings_section(&result.warnings);

        let mut failed_sections = Vec::new();
        for section in [&activity, &imbalance] {
            if section.content.is_err() {
                failed_sections.push(section.name.clone());
            }
        }

        let mut markdown = String::new();
        markdown.push_str(&header.render());
        markdown.push_str(&activity.render());
        markdown.push_str(&legend.render());
        markdown.push_str(&imbalance.render());
        if let Some(warnings) = &warnings {
            markdown.push_str(&warnings.render());
        }

        // Fallback warnings still produced rows, so they are not failures
        let failed_tickers = result
            .warnings
            .iter()
            .filter(|w| w.kind != WarningKind::ExpirationFallback)
            .map(|w| w.ticker.clone())
            .collect();

        ScreenReport {
            markdown_content: markdown,
            notable_contracts: result.records.len(),
            failed_tickers,
            failed_sections,
        }
    }
}
