//! Test-only helpers.

pub mod builders;
