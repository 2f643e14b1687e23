use std::path::PathBuf;

use crate::domain::script_format::ScriptFormat;

#[derive(Debug)]
pub struct GenerateBulkInsertCommand {
    pub raw_sql: String,
    pub rows_json: String,
    pub common_json: Option<String>,
    pub batch_size: Option<usize>,
    pub output_path: PathBuf,
    pub format: ScriptFormat,
}

#[derive(Debug)]
pub struct GenerateBulkInsertResult {
    pub output_path: PathBuf,
    pub batch_count: usize,
    pub row_count: u64,
}
