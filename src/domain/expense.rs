//! Expense records and the drafts they are created from.

use std::fmt;

use chrono::{DateTime, Datelike, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::domain::{category::Category, common::Displayable};

/// Date format used for new records and for display of parsed dates.
pub const EXPENSE_DATE_FORMAT: &str = "%Y-%m-%d";

/// A single recorded transaction. Immutable once stored; only deletion exists.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Expense {
    pub id: String,
    pub amount: f64,
    /// Calendar date as entered. Kept verbatim so malformed persisted values
    /// survive a load and are skipped by date-based queries.
    pub date: String,
    pub category: Category,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub merchant: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub notes: Option<String>,
    #[serde(rename = "type", default)]
    pub source: ExpenseSource,
    /// Missing on records written before creation times were tracked; those
    /// load with the Unix epoch.
    #[serde(default)]
    pub created_at: DateTime<Utc>,
}

impl Expense {
    /// Parses [`Expense::date`], returning `None` for malformed values.
    pub fn parsed_date(&self) -> Option<NaiveDate> {
        parse_expense_date(&self.date)
    }

    /// Returns `true` when the record's date falls in `year`/`month`.
    pub fn falls_in_month(&self, year: i32, month: u32) -> bool {
        self.parsed_date()
            .map(|date| date.year() == year && date.month() == month)
            .unwrap_or(false)
    }

    pub fn merchant_label(&self) -> &str {
        self.merchant.as_deref().unwrap_or("Manual Entry")
    }
}

impl Displayable for Expense {
    fn display_label(&self) -> String {
        format!(
            "{} · {} · {:.2}",
            self.merchant_label(),
            self.category,
            self.amount
        )
    }
}

/// How a record was entered.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "lowercase")]
pub enum ExpenseSource {
    #[default]
    Manual,
    Ocr,
}

impl fmt::Display for ExpenseSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            ExpenseSource::Manual => "manual",
            ExpenseSource::Ocr => "scan",
        };
        f.write_str(label)
    }
}

/// Raw form input for a new expense, before validation.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ExpenseDraft {
    pub amount: String,
    pub date: Option<String>,
    pub category: Option<Category>,
    pub merchant: Option<String>,
    pub notes: Option<String>,
    pub source: ExpenseSource,
}

impl ExpenseDraft {
    pub fn manual(amount: impl Into<String>) -> Self {
        Self {
            amount: amount.into(),
            ..Self::default()
        }
    }

    pub fn with_category(mut self, category: Category) -> Self {
        self.category = Some(category);
        self
    }

    pub fn with_date(mut self, date: impl Into<String>) -> Self {
        self.date = Some(date.into());
        self
    }

    pub fn with_merchant(mut self, merchant: impl Into<String>) -> Self {
        self.merchant = Some(merchant.into());
        self
    }

    pub fn with_notes(mut self, notes: impl Into<String>) -> Self {
        self.notes = Some(notes.into());
        self
    }

    pub fn with_source(mut self, source: ExpenseSource) -> Self {
        self.source = source;
        self
    }

    /// Validates the draft and turns it into a stored record.
    ///
    /// A missing date falls back to `today`; blank merchant/notes collapse to `None`.
    pub fn build(
        self,
        id: String,
        created_at: DateTime<Utc>,
        today: NaiveDate,
    ) -> Result<Expense, DraftError> {
        let amount = parse_amount(&self.amount)?;
        let date = non_blank(self.date)
            .unwrap_or_else(|| today.format(EXPENSE_DATE_FORMAT).to_string());
        Ok(Expense {
            id,
            amount,
            date,
            category: self.category.unwrap_or_default(),
            merchant: non_blank(self.merchant),
            notes: non_blank(self.notes),
            source: self.source,
            created_at,
        })
    }
}

#[derive(Debug, Clone, PartialEq, Error)]
pub enum DraftError {
    #[error("Please enter an amount")]
    MissingAmount,
    #[error("Please enter a valid amount (got `{0}`)")]
    InvalidAmount(String),
}

/// Parses user-entered amount text. Accepts an optional leading `$`.
pub fn parse_amount(raw: &str) -> Result<f64, DraftError> {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return Err(DraftError::MissingAmount);
    }
    let digits = trimmed.strip_prefix('$').unwrap_or(trimmed).trim();
    match digits.parse::<f64>() {
        Ok(value) if value.is_finite() && value > 0.0 => Ok(value),
        _ => Err(DraftError::InvalidAmount(trimmed.to_string())),
    }
}

/// Parses `YYYY-MM-DD` or an RFC 3339 timestamp into a calendar date.
pub fn parse_expense_date(raw: &str) -> Option<NaiveDate> {
    let trimmed = raw.trim();
    NaiveDate::parse_from_str(trimmed, EXPENSE_DATE_FORMAT)
        .ok()
        .or_else(|| {
            DateTime::parse_from_rfc3339(trimmed)
                .ok()
                .map(|stamp| stamp.date_naive())
        })
}

fn non_blank(value: Option<String>) -> Option<String> {
    value
        .map(|text| text.trim().to_string())
        .filter(|text| !text.is_empty())
}
