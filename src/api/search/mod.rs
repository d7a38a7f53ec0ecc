pub mod admin;
pub mod query;
pub mod types;
