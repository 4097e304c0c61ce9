//! Test helpers module
//!
//! Request plumbing shared by the router tests and the database integration tests.

pub mod app;
