pub mod config;
pub mod samples;
pub mod search;
pub mod translate;
