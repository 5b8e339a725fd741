//! Value normalization primitives used by the field transformer.

pub mod contact;
pub mod datetime;
pub mod numeric;
pub mod vocab;

pub use contact::{EmailValidator, normalize_phone};
pub use datetime::{normalize_date, parse_date};
pub use numeric::{parse_decimal, parse_integer};
pub use vocab::{Vocabulary, title_case};
