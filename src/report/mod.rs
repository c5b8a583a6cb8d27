// Report module for the options activity screen
//
// Renders a merged screen result as a markdown document: header, unusual
// activity table with its legend, call/put imbalance table and per-ticker
// warnings.

pub mod formatter;
pub mod generator;
pub mod sections;

// Re-export main types
pub use generator::ReportGenerator;

use serde::{Deserialize, Serialize};

/// Line shown in place of the activity table when nothing qualifies
pub const EMPTY_STATE_MESSAGE: &str = "No unusual activity detected with current settings.";

/// The complete rendered screen report
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScreenReport {
    /// The complete markdown-formatted report
    pub markdown_content: String,

    /// Number of notable contracts listed
    pub notable_contracts: usize,

    /// Tickers skipped because of fetch failures or missing data
    pub failed_tickers: Vec<String>,

    /// List of sections that could not be rendered (if any)
    pub failed_sections: Vec<String>,
}

/// Internal representation of a report section
#[derive(Debug, Clone)]
pub(crate) struct ReportSection {
    pub name: String,
    pub title: String,
    pub content: Result<String, SectionError>,
}

impl ReportSection {
    pub fn render(&self) -> String {
        match &self.content {
            Ok(markdown) => markdown.clone(),
            Err(err) => self.render_error(err),
        }
    }

    fn render_error(&self, err: &SectionError) -> String {
        format!(
            "## {}\n\n**[Data Unavailable]**\n\n{}\n\n",
            self.title,
            err.user_message()
        )
    }
}

/// Errors that can occur when building a section
#[derive(Debug, Clone)]
pub(crate) enum SectionError {
    /// Every ticker of the watchlist was skipped
    NoTickerScreened,
}

impl SectionError {
    pub fn user_message(&self) -> String {
        match self {
            SectionError::NoTickerScreened => {
                "No ticker of the watchlist could be screened. \
                See the warnings below for details."
                    .to_string()
            }
        }
    }
}
