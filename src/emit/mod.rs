//! Target-syntax emitters: tsquery and POSIX regex.

mod regex;
mod tsquery;

pub use regex::to_regex;
pub use tsquery::to_tsquery;
