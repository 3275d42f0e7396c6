//! Notify module tests

mod tests_events;
