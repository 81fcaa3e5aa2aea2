//! Types that represent the core data model, such as `Group`, `Member` and
//! `Expense`.
mod amount;
mod currency;
mod expense;
mod group;
mod member;

pub use amount::{Amount, AmountError};
pub use currency::Currency;
pub use expense::{
    Expense, ExpenseCategory, ExpenseDraft, SplitEntry, SplitInput, SplitMethod,
};
pub use group::Group;
pub use member::Member;
