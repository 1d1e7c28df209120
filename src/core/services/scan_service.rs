//! Receipt scanning capability and the draft prefill it feeds.
//!
//! No image analysis happens here: [`MockReceiptScanner`] stands in for a
//! real extraction backend and returns canned receipts after a fixed delay.

use std::{fmt, thread, time::Duration};

use chrono::NaiveDate;
use once_cell::sync::Lazy;
use regex::Regex;
use tracing::{debug, info, warn};
use uuid::Uuid;

use crate::core::time::{Clock, SystemClock};
use crate::domain::expense::EXPENSE_DATE_FORMAT;
use crate::domain::{ExpenseDraft, ExpenseSource};

pub const DEFAULT_SCAN_DELAY: Duration = Duration::from_millis(2000);

static AMOUNT_PATTERN: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\$?(\d+\.?\d*)").expect("amount pattern compiles"));
static SHORT_DATE_PATTERN: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\d{2}/\d{2}").expect("date pattern compiles"));

/// Opaque reference to a captured or selected image. Never inspected.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ImageRef(String);

impl ImageRef {
    pub fn new(reference: impl Into<String>) -> Self {
        Self(reference.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for ImageRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Fields pulled off a receipt.
#[derive(Debug, Clone, PartialEq)]
pub struct ReceiptExtraction {
    pub amount: Option<f64>,
    pub merchant: Option<String>,
    pub date: Option<NaiveDate>,
    pub raw_text: String,
}

#[derive(Debug, Clone, PartialEq)]
pub enum ScanOutcome {
    Extracted(ReceiptExtraction),
    Failed { reason: String },
}

impl ScanOutcome {
    pub fn is_success(&self) -> bool {
        matches!(self, ScanOutcome::Extracted(_))
    }
}

/// Capability that turns an image into receipt fields.
pub trait ReceiptScanner: Send + Sync {
    fn scan(&self, image: &ImageRef) -> ScanOutcome;
}

/// (merchant, amount, header line, total label)
const MOCK_RECEIPTS: [(&str, f64, &str, &str); 5] = [
    ("Starbucks Coffee", 45.67, "STARBUCKS COFFEE", "Total"),
    ("Target Store", 123.45, "TARGET", "Subtotal"),
    ("McDonald's", 28.99, "McDonald's", "Total"),
    ("Whole Foods Market", 89.50, "WHOLE FOODS MARKET", "Total"),
    ("Subway", 15.75, "SUBWAY", "Total"),
];

/// Waits a fixed delay and returns one of five canned receipts, dated today.
pub struct MockReceiptScanner {
    delay: Duration,
    clock: Box<dyn Clock>,
}

impl MockReceiptScanner {
    pub fn new(delay: Duration) -> Self {
        Self::with_clock(delay, Box::new(SystemClock))
    }

    pub fn with_clock(delay: Duration, clock: Box<dyn Clock>) -> Self {
        Self { delay, clock }
    }

    pub fn receipt_count() -> usize {
        MOCK_RECEIPTS.len()
    }

    /// The canned receipt at `index` (wrapping), dated `today`.
    pub fn receipt_at(index: usize, today: NaiveDate) -> ReceiptExtraction {
        let (merchant, amount, header, label) = MOCK_RECEIPTS[index % MOCK_RECEIPTS.len()];
        ReceiptExtraction {
            amount: Some(amount),
            merchant: Some(merchant.to_string()),
            date: Some(today),
            raw_text: format!(
                "{header}\n{label}: ${amount:.2}\nDate: {}",
                today.format("%-m/%-d/%Y")
            ),
        }
    }
}

impl Default for MockReceiptScanner {
    fn default() -> Self {
        Self::new(DEFAULT_SCAN_DELAY)
    }
}

impl ReceiptScanner for MockReceiptScanner {
    fn scan(&self, image: &ImageRef) -> ScanOutcome {
        debug!(image = %image, "processing receipt image");
        if image.as_str().trim().is_empty() {
            warn!("receipt scan received an empty image reference");
            return ScanOutcome::Failed {
                reason: "Failed to process image: empty image reference".into(),
            };
        }
        thread::sleep(self.delay);
        let pick = (Uuid::new_v4().as_u128() % MOCK_RECEIPTS.len() as u128) as usize;
        let receipt = Self::receipt_at(pick, self.clock.today());
        info!(merchant = ?receipt.merchant, amount = ?receipt.amount, "receipt processed");
        ScanOutcome::Extracted(receipt)
    }
}

/// Scanner double that always answers with the same outcome.
#[derive(Debug, Clone)]
pub struct StaticScanner {
    outcome: ScanOutcome,
}

impl StaticScanner {
    pub fn new(outcome: ScanOutcome) -> Self {
        Self { outcome }
    }

    pub fn failing(reason: impl Into<String>) -> Self {
        Self::new(ScanOutcome::Failed {
            reason: reason.into(),
        })
    }
}

impl ReceiptScanner for StaticScanner {
    fn scan(&self, _image: &ImageRef) -> ScanOutcome {
        self.outcome.clone()
    }
}

pub struct ScanService;

impl ScanService {
    /// Builds a scan-sourced draft from an extraction, or `None` when the scan
    /// failed and the caller should offer a retry or manual entry.
    pub fn prefill(outcome: &ScanOutcome, today: NaiveDate) -> Option<ExpenseDraft> {
        let ScanOutcome::Extracted(receipt) = outcome else {
            return None;
        };
        let date = receipt.date.unwrap_or(today);
        Some(ExpenseDraft {
            amount: receipt.amount.map(|value| value.to_string()).unwrap_or_default(),
            date: Some(date.format(EXPENSE_DATE_FORMAT).to_string()),
            category: None,
            merchant: receipt.merchant.clone(),
            notes: None,
            source: ExpenseSource::Ocr,
        })
    }

    /// Last `$`-optional number in `text`.
    pub fn extract_amount(text: &str) -> Option<f64> {
        AMOUNT_PATTERN
            .captures_iter(text)
            .last()
            .and_then(|caps| caps.get(1))
            .and_then(|m| m.as_str().parse::<f64>().ok())
            .filter(|value| !value.is_nan())
    }

    /// First of the leading three lines that reads like a merchant name.
    pub fn extract_merchant(text: &str) -> Option<String> {
        text.lines()
            .take(3)
            .map(str::trim)
            .find(|line| {
                line.chars().count() > 2
                    && !line.contains('$')
                    && !SHORT_DATE_PATTERN.is_match(line)
            })
            .map(str::to_string)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::time::FixedClock;

    fn today() -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 3, 15).unwrap()
    }

    #[test]
    fn mock_scanner_returns_a_canned_receipt_dated_today() {
        let scanner =
            MockReceiptScanner::with_clock(Duration::ZERO, Box::new(FixedClock::on(2024, 3, 15)));
        let ScanOutcome::Extracted(receipt) = scanner.scan(&ImageRef::new("file:///r.jpg")) else {
            panic!("mock scan should succeed");
        };
        assert_eq!(receipt.date, Some(today()));
        let known = (0..MockReceiptScanner::receipt_count())
            .map(|i| MockReceiptScanner::receipt_at(i, today()))
            .any(|candidate| candidate == receipt);
        assert!(known, "unexpected receipt {receipt:?}");
    }

    #[test]
    fn mock_scanner_fails_on_empty_reference() {
        let scanner = MockReceiptScanner::new(Duration::ZERO);
        assert!(!scanner.scan(&ImageRef::new("  ")).is_success());
    }

    #[test]
    fn prefill_marks_draft_as_scanned() {
        let outcome = ScanOutcome::Extracted(MockReceiptScanner::receipt_at(3, today()));
        let draft = ScanService::prefill(&outcome, today()).expect("draft");
        assert_eq!(draft.amount, "89.5");
        assert_eq!(draft.merchant.as_deref(), Some("Whole Foods Market"));
        assert_eq!(draft.date.as_deref(), Some("2024-03-15"));
        assert_eq!(draft.source, ExpenseSource::Ocr);
    }

    #[test]
    fn prefill_declines_failed_scans() {
        let outcome = ScanOutcome::Failed {
            reason: "blurry".into(),
        };
        assert_eq!(ScanService::prefill(&outcome, today()), None);
    }

    #[test]
    fn extracts_last_amount_and_leading_merchant() {
        let text = "  \n12/03 receipt\nCORNER DELI\nSubtotal: $9.00\nTotal: $10.35";
        assert_eq!(ScanService::extract_amount(text), Some(10.35));
        assert_eq!(ScanService::extract_merchant(text), Some("CORNER DELI".into()));
        assert_eq!(ScanService::extract_amount("no digits"), None);
    }

    #[test]
    fn canned_raw_text_uses_short_us_date() {
        let receipt = MockReceiptScanner::receipt_at(1, today());
        assert_eq!(receipt.raw_text, "TARGET\nSubtotal: $123.45\nDate: 3/15/2024");
    }
}
