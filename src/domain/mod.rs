pub mod category;
pub mod common;
pub mod expense;
pub mod stats;
pub mod user;

pub use category::Category;
pub use common::Displayable;
pub use expense::{DraftError, Expense, ExpenseDraft, ExpenseSource};
pub use stats::{AnalyticsReport, CategoryBreakdown, CategoryTotal, MonthlyStats};
pub use user::User;
