pub mod json_rows;
pub mod script_writer;
