//! Filter and query execution
//!
//! ```ignore
//! let adults = store
//!     .bucket("users")
//!     .equal([("age", 18)])
//!     .select(["name"])
//!     .limit(10)
//!     .find()?;
//! ```
//!
//! Semantics:
//! - `equal` narrows the current predicate set, `or_equal` opens another
//! - a record matches if every predicate of any one set matches
//! - `limit` stops the scan once enough records matched, for every operation
//! - results are returned in identifier order

mod cancel;
mod predicate;
mod query;

pub use cancel::CancelFlag;
pub use predicate::{Comparison, Filter, Predicate, PredicateSet};
pub use query::Query;
