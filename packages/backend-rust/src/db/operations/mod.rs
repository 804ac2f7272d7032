pub mod lifestyle;
pub mod pain;
pub mod user;

pub use lifestyle::*;
pub use pain::*;
pub use user::*;

use chrono::{DateTime, SecondsFormat, Utc};

/// Fixed-width UTC timestamp so that text ordering matches time ordering.
pub fn format_timestamp(value: &DateTime<Utc>) -> String {
    value.to_rfc3339_opts(SecondsFormat::Micros, true)
}
