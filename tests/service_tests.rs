use std::collections::HashSet;
use std::time::Duration;

use chrono::NaiveDate;
use expense_core::{
    core::services::{
        CategoryService, ExpenseStore, FilterService, HistoryFilter, ImageRef,
        MockReceiptScanner, ReceiptScanner, ScanOutcome, ScanService, ServiceError, SortOrder,
        StaticScanner, SummaryService,
    },
    core::FixedClock,
    domain::{Category, ExpenseDraft, ExpenseSource},
    storage::MemoryStore,
};

fn store_on(year: i32, month: u32, day: u32) -> ExpenseStore {
    ExpenseStore::open(
        Box::new(MemoryStore::new()),
        Box::new(FixedClock::on(year, month, day)),
    )
}

fn day(year: i32, month: u32, day: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(year, month, day).unwrap()
}

#[test]
fn month_scenario_produces_expected_stats() {
    let mut store = store_on(2024, 3, 15);
    store
        .add(ExpenseDraft::manual("45.67").with_category(Category::FoodAndDining))
        .unwrap();
    store
        .add(ExpenseDraft::manual("123.45").with_category(Category::Shopping))
        .unwrap();
    store
        .add(ExpenseDraft::manual("10.00").with_category(Category::FoodAndDining))
        .unwrap();

    let stats = SummaryService::monthly_stats(store.list(), store.today());
    assert!((stats.total_spent - 179.12).abs() < 1e-9);
    assert_eq!(stats.expense_count, 3);
    assert_eq!(stats.top_category, Some(Category::Shopping));
    assert!((stats.average_per_day - 179.12 / 15.0).abs() < 1e-9);

    let month = FilterService::current_month(store.list(), store.today());
    let breakdown = CategoryService::aggregate(month);
    assert_eq!(breakdown.len(), 2);
    assert!((breakdown.amount_for(Category::FoodAndDining) - 55.67).abs() < 1e-9);
    assert!((breakdown.amount_for(Category::Shopping) - 123.45).abs() < 1e-9);
}

#[test]
fn invalid_amount_is_rejected_and_list_stays_empty() {
    let mut store = store_on(2024, 3, 15);
    for raw in ["abc", "", "0", "-4", "NaN"] {
        let err = store.add(ExpenseDraft::manual(raw)).unwrap_err();
        assert!(matches!(err, ServiceError::Invalid(_)), "{raw} should be invalid");
    }
    assert!(store.is_empty());
}

#[test]
fn adds_are_newest_first_with_unique_ids() {
    let mut store = store_on(2024, 3, 15);
    let ids: Vec<String> = (1..=20)
        .map(|n| store.add(ExpenseDraft::manual(n.to_string())).unwrap().id)
        .collect();

    let listed: Vec<&str> = store.list().iter().map(|e| e.id.as_str()).collect();
    let expected: Vec<&str> = ids.iter().rev().map(String::as_str).collect();
    assert_eq!(listed, expected);
    assert_eq!(ids.iter().collect::<HashSet<_>>().len(), ids.len());
}

#[test]
fn delete_removes_only_the_matching_record() {
    let mut store = store_on(2024, 3, 15);
    assert!(!store.delete("missing").unwrap());

    let keep = store.add(ExpenseDraft::manual("1")).unwrap();
    let gone = store.add(ExpenseDraft::manual("2")).unwrap();
    assert!(store.delete(&gone.id).unwrap());
    assert!(store.get(&gone.id).is_none());
    assert!(!store.delete("missing").unwrap());
    assert_eq!(store.list(), &[keep]);
}

#[test]
fn monthly_filter_excludes_other_months_and_years() {
    let mut store = store_on(2024, 3, 15);
    for date in ["2024-03-01", "2024-02-29", "2023-03-10", "2024-03-31T23:00:00Z", "soon"] {
        store.add(ExpenseDraft::manual("5").with_date(date)).unwrap();
    }
    store.add(ExpenseDraft::manual("5")).unwrap();

    let month = FilterService::current_month(store.list(), store.today());
    let dates: Vec<&str> = month.iter().map(|e| e.date.as_str()).collect();
    assert_eq!(dates, vec!["2024-03-15", "2024-03-31T23:00:00Z", "2024-03-01"]);
}

#[test]
fn category_sums_add_up_to_total() {
    let mut store = store_on(2024, 3, 15);
    let samples = [
        ("12.10", Category::Travel),
        ("7.25", Category::Healthcare),
        ("3.33", Category::Travel),
        ("40", Category::Education),
    ];
    for (amount, category) in samples {
        store
            .add(ExpenseDraft::manual(amount).with_category(category))
            .unwrap();
    }

    let report = SummaryService::analytics(store.list(), store.today());
    let sum: f64 = report.breakdown.totals.iter().map(|entry| entry.amount).sum();
    assert!((sum - report.stats.total_spent).abs() < 1e-9);
    let pct: f64 = report.breakdown.totals.iter().map(|entry| entry.percentage).sum();
    assert!((pct - 100.0).abs() < 1e-6);
    assert_eq!(report.categories_used, 3);
    assert_eq!(report.highest_expense, 40.0);
}

#[test]
fn empty_month_has_no_top_category_and_zero_average() {
    let store = store_on(2024, 3, 15);
    let stats = SummaryService::monthly_stats(store.list(), store.today());
    assert_eq!(stats.average_per_day, 0.0);
    assert_eq!(stats.top_category_label(), "None");
    let json = serde_json::to_value(&stats).unwrap();
    assert_eq!(json["topCategory"], "None");
}

#[test]
fn history_filters_and_sorts() {
    let mut store = store_on(2024, 3, 15);
    store
        .add(ExpenseDraft::manual("20").with_date("2024-03-02").with_category(Category::Shopping))
        .unwrap();
    store
        .add(ExpenseDraft::manual("5").with_date("2024-03-09").with_category(Category::Shopping))
        .unwrap();
    store
        .add(ExpenseDraft::manual("50").with_date("2024-01-09").with_category(Category::Travel))
        .unwrap();

    let by_date = FilterService::history(store.list(), &HistoryFilter::default());
    let amounts: Vec<f64> = by_date.expenses.iter().map(|e| e.amount).collect();
    assert_eq!(amounts, vec![5.0, 20.0, 50.0]);
    assert_eq!(by_date.total, 75.0);

    let shopping = FilterService::history(
        store.list(),
        &HistoryFilter {
            category: Some(Category::Shopping),
            sort: SortOrder::Amount,
        },
    );
    let amounts: Vec<f64> = shopping.expenses.iter().map(|e| e.amount).collect();
    assert_eq!(amounts, vec![20.0, 5.0]);
    assert_eq!(shopping.total, 25.0);
}

#[test]
fn recent_is_capped_to_limit_within_month() {
    let mut store = store_on(2024, 3, 15);
    store.add(ExpenseDraft::manual("1").with_date("2024-02-01")).unwrap();
    for n in 0..7 {
        store.add(ExpenseDraft::manual(format!("{}", n + 2))).unwrap();
    }
    let recent = FilterService::recent(store.list(), day(2024, 3, 15), 5);
    assert_eq!(recent.len(), 5);
    assert_eq!(recent[0].amount, 8.0);
}

#[test]
fn scanned_receipt_becomes_ocr_expense() {
    let scanner = MockReceiptScanner::with_clock(
        Duration::ZERO,
        Box::new(FixedClock::on(2024, 3, 15)),
    );
    let outcome = scanner.scan(&ImageRef::new("file:///receipt.jpg"));
    let draft = ScanService::prefill(&outcome, day(2024, 3, 15)).expect("extracted");
    assert_eq!(draft.source, ExpenseSource::Ocr);
    assert_eq!(draft.date.as_deref(), Some("2024-03-15"));

    let mut store = store_on(2024, 3, 15);
    let expense = store.add(draft).unwrap();
    assert_eq!(expense.source, ExpenseSource::Ocr);
    assert!(expense.merchant.is_some());
    assert!(expense.amount > 0.0);
}

#[test]
fn failed_scan_offers_no_draft() {
    let scanner = StaticScanner::failing("blurry");
    let outcome = scanner.scan(&ImageRef::new("img"));
    assert!(!outcome.is_success());
    assert!(ScanService::prefill(&outcome, day(2024, 3, 15)).is_none());

    let empty = MockReceiptScanner::new(Duration::ZERO).scan(&ImageRef::new(" "));
    assert!(matches!(empty, ScanOutcome::Failed { .. }));
}

#[test]
fn receipt_text_helpers_find_amount_and_merchant() {
    let text = "STARBUCKS COFFEE\n03/15 14:02\nLatte $5.25\nTotal: $45.67";
    assert_eq!(ScanService::extract_amount(text), Some(45.67));
    assert_eq!(
        ScanService::extract_merchant(text).as_deref(),
        Some("STARBUCKS COFFEE")
    );
}
