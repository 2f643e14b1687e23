pub mod bulk_insert_commands;
pub mod error;
pub mod param;
pub mod row_batch;
pub mod script_format;
pub mod values_template;
