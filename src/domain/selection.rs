use chrono::{Local, NaiveDate};
use serde::{Deserialize, Serialize};

/// The language and date a fetch is made for.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Selection {
    pub language: String,
    pub date: NaiveDate,
}

impl Selection {
    pub fn new(language: impl Into<String>, date: NaiveDate) -> Self {
        Self {
            language: language.into(),
            date,
        }
    }

    pub fn today(language: impl Into<String>) -> Self {
        Self::new(language, Local::now().date_naive())
    }

    /// `YYYY/MM/DD`, as used in the feed path.
    pub fn date_path(&self) -> String {
        format_date_path(self.date)
    }
}

pub fn format_date_path(date: NaiveDate) -> String {
    date.format("%Y/%m/%d").to_string()
}

/// Accepts `YYYY/MM/DD` or `YYYY-MM-DD`.
pub fn parse_date(input: &str) -> Option<NaiveDate> {
    let input = input.trim();
    NaiveDate::parse_from_str(input, "%Y/%m/%d")
        .or_else(|_| NaiveDate::parse_from_str(input, "%Y-%m-%d"))
        .ok()
}
