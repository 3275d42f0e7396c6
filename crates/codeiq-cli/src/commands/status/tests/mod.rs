//! Status command tests
