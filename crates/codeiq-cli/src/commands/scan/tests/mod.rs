//! Scan command tests
