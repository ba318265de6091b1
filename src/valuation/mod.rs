//! Static item valuation used for mock deposits
//!
//! Values come from a fixed category → subcategory → brand table and are
//! scaled by a condition multiplier. No external calls.

pub mod oracle;

pub use oracle::{condition_multiplier, estimate, Valuation, ValuationRequest, CURRENCY};
