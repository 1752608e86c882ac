//! Types that represent the core data model: `Amount`, `Sale` and the canonical `SalesTable`.
mod amount;
mod sale;
mod table;

pub use amount::{Amount, AmountError, MAX_AMOUNT};
pub use sale::{Sale, DATE_FORMAT, HEADERS};
pub use table::{AmountPolicy, LoadStats, SalesTable};
