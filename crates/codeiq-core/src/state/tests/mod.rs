//! State module tests

mod tests_memory;
