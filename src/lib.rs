//! Expands an `INSERT ... VALUES (...)...` template into batched multi-row
//! inserts.
//!
//! The tuple followed by `...` is repeated once per row. Parameters named
//! after a row field get a `_<row index>` suffix; every other parameter is
//! shared by all rows.
//!
//! ```
//! use sql_bulk_insert::{BulkInsert, bulk_params};
//!
//! struct Widget {
//!     name: &'static str,
//!     size: i32,
//! }
//! bulk_params!(Widget { name, size });
//!
//! let commands = BulkInsert::new("INSERT INTO widgets (name, size) VALUES (@name, @size)...;")
//!     .commands([Widget { name: "bolt", size: 3 }, Widget { name: "nut", size: 1 }])?
//!     .collect::<Vec<_>>();
//!
//! assert_eq!(
//!     &*commands[0].sql,
//!     "INSERT INTO widgets (name, size) VALUES (@name_0, @size_0),(@name_1, @size_1);"
//! );
//! # Ok::<(), sql_bulk_insert::BulkInsertError>(())
//! ```

pub mod application;
pub mod domain;
pub mod infrastructure;
pub mod interfaces;

pub use application::bulk_insert::{
    AsyncCommandExecutor, CommandExecutor, bulk_insert, bulk_insert_async,
    bulk_insert_async_with, bulk_insert_with,
};
pub use domain::{
    bulk_insert_commands::{
        BatchCommand, BulkInsert, BulkInsertCommands, MAX_PARAMS_PER_BATCH, bulk_insert_commands,
    },
    error::BulkInsertError,
    param::{FieldExtractor, FieldList, Param, ParamSource, ParamValue, SourceFields},
    values_template::ValuesTemplate,
};
