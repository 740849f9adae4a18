//! Shared fixtures for unit tests.

pub(crate) mod helpers;
