pub mod bulk_insert;
pub mod commands;
pub mod use_cases;
