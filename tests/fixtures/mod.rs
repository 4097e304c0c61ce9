//! Fixtures for the database integration tests

pub mod database_helper;
pub mod test_data;
