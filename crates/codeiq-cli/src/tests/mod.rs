//! Library tests
