//! Report module tests

mod tests_report;
