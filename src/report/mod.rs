mod formatter;

pub use formatter::{Report, ReportFormatter};
