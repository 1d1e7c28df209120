//! Canonical owner of the expense list and its persisted snapshot.

use chrono::NaiveDate;
use tracing::{debug, info, warn};
use uuid::Uuid;

use crate::core::time::Clock;
use crate::domain::{Expense, ExpenseDraft};
use crate::storage::{KeyValueStore, EXPENSES_KEY, UNREADABLE_EXPENSES_KEY};

use super::ServiceResult;

/// Holds the expense list in memory, newest first, and rewrites the full
/// snapshot through the injected [`KeyValueStore`] after every mutation.
pub struct ExpenseStore {
    storage: Box<dyn KeyValueStore>,
    clock: Box<dyn Clock>,
    expenses: Vec<Expense>,
}

impl ExpenseStore {
    /// Loads the persisted snapshot. A missing or unreadable snapshot yields
    /// an empty store; read failures are logged, not returned. Records that
    /// fail to parse are skipped, and the raw snapshot is copied to
    /// [`UNREADABLE_EXPENSES_KEY`] before any later save replaces it.
    pub fn open(storage: Box<dyn KeyValueStore>, clock: Box<dyn Clock>) -> Self {
        let expenses = load_snapshot(storage.as_ref());
        debug!(count = expenses.len(), "expense store opened");
        Self {
            storage,
            clock,
            expenses,
        }
    }

    /// Validates and stores a new expense at the front of the list.
    ///
    /// Nothing changes in memory unless the snapshot write succeeds.
    pub fn add(&mut self, draft: ExpenseDraft) -> ServiceResult<Expense> {
        let id = self.next_id();
        let expense = draft.build(id, self.clock.now(), self.clock.today())?;

        let mut updated = Vec::with_capacity(self.expenses.len() + 1);
        updated.push(expense.clone());
        updated.extend(self.expenses.iter().cloned());
        self.persist(&updated)?;
        self.expenses = updated;

        info!(
            id = %expense.id,
            amount = expense.amount,
            category = %expense.category,
            source = %expense.source,
            "expense added"
        );
        Ok(expense)
    }

    /// Removes the expense with `id`. Returns `false` when no record matched;
    /// that is not an error.
    pub fn delete(&mut self, id: &str) -> ServiceResult<bool> {
        let updated: Vec<Expense> = self
            .expenses
            .iter()
            .filter(|expense| expense.id != id)
            .cloned()
            .collect();
        let removed = updated.len() != self.expenses.len();
        self.persist(&updated)?;
        self.expenses = updated;
        if removed {
            info!(id, "expense deleted");
        } else {
            debug!(id, "delete requested for unknown expense");
        }
        Ok(removed)
    }

    /// Drops every record and the persisted snapshot.
    pub fn clear(&mut self) -> ServiceResult<()> {
        self.storage.remove(EXPENSES_KEY)?;
        let dropped = self.expenses.len();
        self.expenses.clear();
        info!(dropped, "expense data cleared");
        Ok(())
    }

    /// All records in insertion order, newest first.
    pub fn list(&self) -> &[Expense] {
        &self.expenses
    }

    pub fn get(&self, id: &str) -> Option<&Expense> {
        self.expenses.iter().find(|expense| expense.id == id)
    }

    pub fn len(&self) -> usize {
        self.expenses.len()
    }

    pub fn is_empty(&self) -> bool {
        self.expenses.is_empty()
    }

    /// Reference date for month-scoped queries.
    pub fn today(&self) -> NaiveDate {
        self.clock.today()
    }

    pub fn clock(&self) -> &dyn Clock {
        self.clock.as_ref()
    }

    fn next_id(&self) -> String {
        loop {
            let candidate = Uuid::new_v4().to_string();
            if self.get(&candidate).is_none() {
                return candidate;
            }
        }
    }

    fn persist(&self, expenses: &[Expense]) -> ServiceResult<()> {
        let json = serde_json::to_string(expenses).map_err(crate::errors::StorageError::from)?;
        if let Err(err) = self.storage.set(EXPENSES_KEY, &json) {
            warn!(error = %err, "failed to save expenses");
            return Err(err.into());
        }
        Ok(())
    }
}

fn load_snapshot(storage: &dyn KeyValueStore) -> Vec<Expense> {
    let raw = match storage.get(EXPENSES_KEY) {
        Ok(Some(raw)) => raw,
        Ok(None) => return Vec::new(),
        Err(err) => {
            warn!(error = %err, "failed to read expenses; starting empty");
            return Vec::new();
        }
    };
    let rows: Vec<serde_json::Value> = match serde_json::from_str(&raw) {
        Ok(rows) => rows,
        Err(err) => {
            warn!(error = %err, "stored expenses are unreadable; starting empty");
            set_aside(storage, &raw);
            return Vec::new();
        }
    };

    let total = rows.len();
    let expenses: Vec<Expense> = rows
        .into_iter()
        .enumerate()
        .filter_map(|(index, row)| match serde_json::from_value(row) {
            Ok(expense) => Some(expense),
            Err(err) => {
                warn!(index, error = %err, "skipping unreadable expense record");
                None
            }
        })
        .collect();
    if expenses.len() != total {
        set_aside(storage, &raw);
    }
    expenses
}

fn set_aside(storage: &dyn KeyValueStore, raw: &str) {
    match storage.set(UNREADABLE_EXPENSES_KEY, raw) {
        Ok(()) => warn!(key = UNREADABLE_EXPENSES_KEY, "kept a copy of the unreadable snapshot"),
        Err(err) => warn!(error = %err, "failed to keep a copy of the unreadable snapshot"),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::time::FixedClock;
    use crate::core::services::ServiceError;
    use crate::domain::Category;
    use crate::storage::MemoryStore;

    fn store() -> (ExpenseStore, MemoryStore) {
        let storage = MemoryStore::new();
        let store = ExpenseStore::open(
            Box::new(storage.clone()),
            Box::new(FixedClock::on(2024, 3, 15)),
        );
        (store, storage)
    }

    #[test]
    fn add_prepends_and_persists() {
        let (mut store, storage) = store();
        let first = store.add(ExpenseDraft::manual("10")).unwrap();
        let second = store
            .add(ExpenseDraft::manual("20").with_category(Category::Travel))
            .unwrap();

        let ids: Vec<_> = store.list().iter().map(|e| e.id.as_str()).collect();
        assert_eq!(ids, vec![second.id.as_str(), first.id.as_str()]);
        assert_ne!(first.id, second.id);

        let raw = storage.get(EXPENSES_KEY).unwrap().expect("snapshot written");
        let persisted: Vec<Expense> = serde_json::from_str(&raw).unwrap();
        assert_eq!(persisted, store.list());
    }

    #[test]
    fn add_rejects_invalid_amount_without_writing() {
        let (mut store, storage) = store();
        let err = store.add(ExpenseDraft::manual("abc")).unwrap_err();
        assert!(matches!(err, ServiceError::Invalid(_)));
        assert!(store.is_empty());
        assert!(storage.is_empty());
    }

    #[test]
    fn delete_unknown_id_is_noop() {
        let (mut store, _) = store();
        assert!(!store.delete("missing").unwrap());
        assert!(store.is_empty());
    }

    #[test]
    fn open_reads_existing_snapshot() {
        let (mut store, storage) = store();
        store.add(ExpenseDraft::manual("5.25")).unwrap();
        let reopened = ExpenseStore::open(
            Box::new(storage.clone()),
            Box::new(FixedClock::on(2024, 3, 16)),
        );
        assert_eq!(reopened.list(), store.list());
    }

    #[test]
    fn open_swallows_corrupt_snapshot() {
        let storage = MemoryStore::with_entry(EXPENSES_KEY, "{not json");
        let store = ExpenseStore::open(
            Box::new(storage.clone()),
            Box::new(FixedClock::on(2024, 3, 1)),
        );
        assert!(store.is_empty());
        assert_eq!(
            storage.get(UNREADABLE_EXPENSES_KEY).unwrap().as_deref(),
            Some("{not json")
        );
    }

    #[test]
    fn open_skips_bad_rows_and_keeps_the_rest() {
        let raw = r#"[{"id":"ok","amount":4,"date":"2024-03-02","category":"Travel"},{"id":"bad","date":"2024-03-03"}]"#;
        let storage = MemoryStore::with_entry(EXPENSES_KEY, raw);
        let mut store = ExpenseStore::open(
            Box::new(storage.clone()),
            Box::new(FixedClock::on(2024, 3, 15)),
        );
        let ids: Vec<_> = store.list().iter().map(|e| e.id.as_str()).collect();
        assert_eq!(ids, vec!["ok"]);
        assert_eq!(storage.get(UNREADABLE_EXPENSES_KEY).unwrap().as_deref(), Some(raw));

        store.add(ExpenseDraft::manual("1")).unwrap();
        assert_eq!(storage.get(UNREADABLE_EXPENSES_KEY).unwrap().as_deref(), Some(raw));
    }

    #[test]
    fn clean_snapshot_leaves_no_side_copy() {
        let (mut store, storage) = store();
        store.add(ExpenseDraft::manual("3")).unwrap();
        ExpenseStore::open(Box::new(storage.clone()), Box::new(FixedClock::on(2024, 3, 15)));
        assert!(!storage.contains(UNREADABLE_EXPENSES_KEY).unwrap());
    }

    #[test]
    fn clear_removes_snapshot() {
        let (mut store, storage) = store();
        store.add(ExpenseDraft::manual("1")).unwrap();
        store.clear().unwrap();
        assert!(store.is_empty());
        assert!(!storage.contains(EXPENSES_KEY).unwrap());
    }
}
