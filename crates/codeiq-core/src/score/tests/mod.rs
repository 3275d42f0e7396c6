//! Score module tests

#![allow(clippy::panic)]

mod tests_repo;
