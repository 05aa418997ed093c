//! Sales ledger domain module.
//!
//! This crate contains the sale record, its validation rules, and the period-bucketed
//! statistics derived from a set of sales, implemented purely as deterministic domain
//! logic (no IO, no HTTP, no storage).

pub mod sale;
pub mod stats;

pub use sale::{NewSale, Sale, SaleStatus, parse_sale_date};
pub use stats::{BucketKey, Period, PeriodTotal, SalesStats, TOP_SALES_LIMIT, group_by, top_sales, week_of_year};
