//! Console output

mod report;

pub use report::{format_copied_notice, format_status, EXAMPLE_LINE};
