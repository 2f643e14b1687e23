use std::io::Write;

use anyhow::{Context, Result};
use serde::Serialize;

use crate::{
    application::bulk_insert::CommandExecutor,
    domain::{bulk_insert_commands::BatchCommand, param::Param, script_format::ScriptFormat},
};

#[derive(Serialize)]
struct ScriptLine<'c> {
    sql: &'c str,
    params: &'c [Param],
}

/// Executor that writes each batch to a script instead of a database.
///
/// Reports every row of a written batch as affected.
#[derive(Debug)]
pub struct ScriptWriter<W: Write> {
    writer: W,
    format: ScriptFormat,
    written_batch_count: usize,
}

impl<W: Write> ScriptWriter<W> {
    pub fn new(writer: W, format: ScriptFormat) -> Self {
        Self {
            writer,
            format,
            written_batch_count: 0,
        }
    }

    pub fn written_batch_count(&self) -> usize {
        self.written_batch_count
    }

    pub fn finish(mut self) -> Result<W> {
        self.writer.flush().context("Unable to flush script output")?;
        Ok(self.writer)
    }

    fn write_sql(&mut self, command: &BatchCommand) -> Result<()> {
        let row_label = if command.row_count == 1 { "row" } else { "rows" };
        writeln!(
            self.writer,
            "-- batch {} ({} {row_label})",
            self.written_batch_count + 1,
            command.row_count
        )?;
        for param in &command.params {
            writeln!(
                self.writer,
                "-- {} = {}",
                single_line(&param.name),
                single_line(&param.value.to_string())
            )?;
        }

        writeln!(self.writer, "{}", terminated_statement(&command.sql))?;
        Ok(())
    }

    fn write_json_line(&mut self, command: &BatchCommand) -> Result<()> {
        let line = ScriptLine {
            sql: &command.sql,
            params: &command.params,
        };
        serde_json::to_writer(&mut self.writer, &line).context("Unable to encode batch as JSON")?;
        writeln!(self.writer)?;
        Ok(())
    }
}

/// Escapes control characters so the text cannot leave a `--` comment.
fn single_line(text: &str) -> String {
    let mut escaped = String::with_capacity(text.len());
    for character in text.chars() {
        if character.is_control() {
            escaped.extend(character.escape_default());
        } else {
            escaped.push(character);
        }
    }
    escaped
}

/// Appends `;` unless present. A trailing line comment always gets the
/// terminator on a line of its own.
fn terminated_statement(sql: &str) -> String {
    let mut statement = sql.trim_end().to_string();
    if statement.lines().last().is_some_and(|line| line.contains("--")) {
        statement.push_str("\n;");
    } else if !statement.ends_with(';') {
        statement.push(';');
    }
    statement
}

impl<W: Write> CommandExecutor for ScriptWriter<W> {
    type Error = anyhow::Error;

    fn execute(&mut self, command: &BatchCommand) -> Result<u64> {
        match self.format {
            ScriptFormat::Sql => self.write_sql(command)?,
            ScriptFormat::JsonLines => self.write_json_line(command)?,
        }
        self.written_batch_count += 1;
        Ok(command.row_count as u64)
    }
}
