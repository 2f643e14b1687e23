use std::{
    env, fs,
    path::{Path, PathBuf},
};

use anyhow::{Result, anyhow};
use clap::Parser;
use console::style;
use dialoguer::{Editor, Input, Select, theme::ColorfulTheme};

use crate::{
    application::commands::GenerateBulkInsertCommand, domain::script_format::ScriptFormat,
};

const DEFAULT_OUTPUT: &str = "bulk_insert.sql";

#[derive(Debug, Parser)]
#[command(
    name = "sql-bulk-insert",
    version,
    about = "Expand one INSERT ... VALUES (...)... template into batched multi-row inserts"
)]
struct CliArgs {
    #[arg(long, short = 'q', help = "Raw SQL text")]
    sql: Option<String>,
    #[arg(long, short = 'f', help = "Read SQL from file path")]
    sql_file: Option<PathBuf>,
    #[arg(long, short = 'r', help = "JSON file holding an array of row objects")]
    rows: Option<PathBuf>,
    #[arg(long, short = 'c', help = "Inline JSON object of parameters shared by every row")]
    common: Option<String>,
    #[arg(
        long,
        short = 'b',
        help = "Rows per batch (derived from the 999 parameter limit when omitted)"
    )]
    batch_size: Option<usize>,
    #[arg(long, short = 'o', default_value = DEFAULT_OUTPUT)]
    output: PathBuf,
    #[arg(
        long,
        default_value_t = ScriptFormat::Sql,
        value_parser = parse_script_format,
        help = "Output format: sql or jsonl (also json_lines, ndjson)"
    )]
    format: ScriptFormat,
}

fn parse_script_format(value: &str) -> Result<ScriptFormat> {
    value.parse()
}

pub fn collect_generate_command() -> Result<GenerateBulkInsertCommand> {
    if env::args_os().len() == 1 {
        return collect_interactive_command();
    }
    collect_command_from_args(CliArgs::parse())
}

fn collect_command_from_args(args: CliArgs) -> Result<GenerateBulkInsertCommand> {
    let raw_sql = read_sql_from_sources(args.sql, args.sql_file)?;
    let rows_path = args
        .rows
        .ok_or_else(|| anyhow!("--rows is required when using argument mode"))?;
    let rows_json = read_text_file(&rows_path, "Rows")?;
    let batch_size = args.batch_size.map(ensure_positive_batch_size).transpose()?;
    let common_json = args
        .common
        .map(|common| ensure_non_empty_value(common, "Common parameters"))
        .transpose()?;

    Ok(GenerateBulkInsertCommand {
        raw_sql,
        rows_json,
        common_json,
        batch_size,
        output_path: args.output,
        format: args.format,
    })
}

fn collect_interactive_command() -> Result<GenerateBulkInsertCommand> {
    let theme = ColorfulTheme::default();

    println!();
    println!(
        "{}",
        style(" SQL BULK INSERT ")
            .black()
            .on_cyan()
            .bold()
            .underlined()
    );
    println!("{}", style("Expand VALUES (...)... into batched multi-row inserts").dim());
    println!();

    let source_options = ["Edit SQL in your editor", "Load SQL from file"];
    let source_index = Select::with_theme(&theme)
        .with_prompt("SQL source")
        .default(0)
        .items(&source_options)
        .interact()?;

    let raw_sql = if source_index == 0 {
        let edited_sql = Editor::new()
            .extension(".sql")
            .edit("INSERT INTO my_table (a, b) VALUES (@a, @b)...;")?
            .ok_or_else(|| anyhow!("No SQL input detected from editor"))?;
        ensure_non_empty_value(edited_sql, "Input SQL")?
    } else {
        let sql_file_path: String = Input::with_theme(&theme)
            .with_prompt("SQL file path")
            .interact_text()?;
        read_text_file(Path::new(sql_file_path.trim()), "Input SQL")?
    };

    let rows_file_path: String = Input::with_theme(&theme)
        .with_prompt("Rows JSON file path")
        .interact_text()?;
    let rows_json = read_text_file(Path::new(rows_file_path.trim()), "Rows")?;

    let common_json: String = Input::with_theme(&theme)
        .with_prompt("Common parameters as a JSON object (blank for none)")
        .allow_empty(true)
        .interact_text()?;

    let batch_size_text: String = Input::with_theme(&theme)
        .with_prompt("Batch size (blank to derive)")
        .allow_empty(true)
        .validate_with(|value: &String| {
            if value.trim().is_empty() || value.trim().parse::<usize>().is_ok_and(|size| size > 0) {
                Ok(())
            } else {
                Err("Batch size must be a number greater than 0")
            }
        })
        .interact_text()?;
    let batch_size = parse_optional_batch_size(&batch_size_text)?;

    let format_items = ScriptFormat::ALL
        .iter()
        .map(|format| format.as_str())
        .collect::<Vec<_>>();
    let selected_format_index = Select::with_theme(&theme)
        .with_prompt("Output format")
        .default(0)
        .items(&format_items)
        .interact()?;
    let format = ScriptFormat::ALL[selected_format_index];

    let output_name: String = Input::with_theme(&theme)
        .with_prompt("Output file")
        .default(DEFAULT_OUTPUT.to_string())
        .interact_text()?;

    Ok(GenerateBulkInsertCommand {
        raw_sql,
        rows_json,
        common_json: Some(common_json).filter(|common| !common.trim().is_empty()),
        batch_size,
        output_path: PathBuf::from(output_name.trim()),
        format,
    })
}

fn read_sql_from_sources(sql: Option<String>, sql_file: Option<PathBuf>) -> Result<String> {
    match (sql, sql_file) {
        (Some(_), Some(_)) => Err(anyhow!("Please provide only one of --sql or --sql-file")),
        (Some(sql_text), None) => ensure_non_empty_value(sql_text, "Input SQL"),
        (None, Some(file_path)) => read_text_file(&file_path, "Input SQL"),
        (None, None) => Err(anyhow!(
            "One of --sql or --sql-file is required when using argument mode"
        )),
    }
}

fn read_text_file(path: &Path, field_name: &str) -> Result<String> {
    let content = fs::read_to_string(path)
        .map_err(|error| anyhow!("Unable to read {field_name} file {}: {error}", path.display()))?;
    ensure_non_empty_value(content, field_name)
}

fn parse_optional_batch_size(value: &str) -> Result<Option<usize>> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return Ok(None);
    }
    let batch_size = trimmed
        .parse::<usize>()
        .map_err(|error| anyhow!("Invalid batch size {trimmed}: {error}"))?;
    ensure_positive_batch_size(batch_size).map(Some)
}

fn ensure_positive_batch_size(batch_size: usize) -> Result<usize> {
    if batch_size == 0 {
        return Err(anyhow!("Batch size must be greater than 0"));
    }
    Ok(batch_size)
}

fn ensure_non_empty_value(value: String, field_name: &str) -> Result<String> {
    if value.trim().is_empty() {
        return Err(anyhow!("{field_name} must not be empty"));
    }
    Ok(value)
}

#[cfg(test)]
mod tests {
    use std::{
        fs,
        path::{Path, PathBuf},
    };

    use clap::Parser;
    use tempfile::TempDir;

    use crate::domain::script_format::ScriptFormat;

    use super::{CliArgs, collect_command_from_args, parse_optional_batch_size};

    fn write_temp_file(dir: &TempDir, name: &str, content: &str) -> PathBuf {
        let path = dir.path().join(name);
        fs::write(&path, content).expect("temp file should be written");
        path
    }

    fn path_arg(path: &Path) -> &str {
        path.to_str()
            .expect("temp path should be valid utf8 for test")
    }

    #[test]
    fn parses_args_mode_with_inline_sql_and_common_params() {
        let temp_dir = tempfile::tempdir().expect("temp dir should be created");
        let rows_file = write_temp_file(&temp_dir, "rows.json", r#"[{"foo": 1}]"#);

        let args = CliArgs::try_parse_from([
            "sql-bulk-insert",
            "--sql",
            "INSERT INTO t (foo) VALUES (@foo)...",
            "--rows",
            path_arg(&rows_file),
            "--common",
            r#"{"tenant": 1}"#,
            "--batch-size",
            "50",
            "--format",
            "jsonl",
            "--output",
            "out.jsonl",
        ])
        .expect("cli args should parse");

        let command = collect_command_from_args(args).expect("command should be created");

        assert_eq!(command.raw_sql, "INSERT INTO t (foo) VALUES (@foo)...");
        assert_eq!(command.rows_json, r#"[{"foo": 1}]"#);
        assert_eq!(command.common_json.as_deref(), Some(r#"{"tenant": 1}"#));
        assert_eq!(command.batch_size, Some(50));
        assert_eq!(command.output_path, PathBuf::from("out.jsonl"));
        assert_eq!(command.format, ScriptFormat::JsonLines);
    }

    #[test]
    fn parses_args_mode_with_sql_file_and_defaults() {
        let temp_dir = tempfile::tempdir().expect("temp dir should be created");
        let sql_file = write_temp_file(&temp_dir, "insert.sql", "VALUES (@foo)...");
        let rows_file = write_temp_file(&temp_dir, "rows.json", "[]");

        let args = CliArgs::try_parse_from([
            "sql-bulk-insert",
            "--sql-file",
            path_arg(&sql_file),
            "--rows",
            path_arg(&rows_file),
        ])
        .expect("cli args should parse");

        let command = collect_command_from_args(args).expect("command should be created");
        assert_eq!(command.raw_sql, "VALUES (@foo)...");
        assert_eq!(command.batch_size, None);
        assert_eq!(command.common_json, None);
        assert_eq!(command.output_path, PathBuf::from("bulk_insert.sql"));
        assert_eq!(command.format, ScriptFormat::Sql);
    }

    #[test]
    fn rejects_when_both_sql_and_sql_file_are_provided() {
        let temp_dir = tempfile::tempdir().expect("temp dir should be created");
        let sql_file = write_temp_file(&temp_dir, "insert.sql", "VALUES (@foo)...");
        let rows_file = write_temp_file(&temp_dir, "rows.json", "[]");

        let args = CliArgs::try_parse_from([
            "sql-bulk-insert",
            "--sql",
            "VALUES (@foo)...",
            "--sql-file",
            path_arg(&sql_file),
            "--rows",
            path_arg(&rows_file),
        ])
        .expect("cli args should parse");

        let error = collect_command_from_args(args).expect_err("should reject dual sql sources");
        assert!(
            error
                .to_string()
                .contains("Please provide only one of --sql or --sql-file")
        );
    }

    #[test]
    fn format_flag_accepts_aliases_and_rejects_unknown_names() {
        let args = CliArgs::try_parse_from([
            "sql-bulk-insert",
            "--sql",
            "VALUES (@foo)...",
            "--format",
            "NDJSON",
        ])
        .expect("cli args should parse");
        assert_eq!(args.format, ScriptFormat::JsonLines);

        let error = CliArgs::try_parse_from([
            "sql-bulk-insert",
            "--sql",
            "VALUES (@foo)...",
            "--format",
            "csv",
        ])
        .expect_err("csv should be rejected");
        assert!(error.to_string().contains("Available values: sql,jsonl"));
    }

    #[test]
    fn rejects_missing_rows_and_zero_batch_size() {
        let missing_rows = CliArgs::try_parse_from(["sql-bulk-insert", "--sql", "VALUES (@foo)..."])
            .expect("cli args should parse");
        let error = collect_command_from_args(missing_rows)
            .expect_err("missing rows should be rejected");
        assert!(
            error
                .to_string()
                .contains("--rows is required when using argument mode")
        );

        let temp_dir = tempfile::tempdir().expect("temp dir should be created");
        let rows_file = write_temp_file(&temp_dir, "rows.json", "[]");
        let zero_batch = CliArgs::try_parse_from([
            "sql-bulk-insert",
            "--sql",
            "VALUES (@foo)...",
            "--rows",
            path_arg(&rows_file),
            "--batch-size",
            "0",
        ])
        .expect("cli args should parse");
        let error = collect_command_from_args(zero_batch)
            .expect_err("zero batch size should be rejected");
        assert!(error.to_string().contains("Batch size must be greater than 0"));
    }

    #[test]
    fn optional_batch_size_accepts_blank_and_positive_numbers() {
        assert_eq!(parse_optional_batch_size("  ").expect("blank should parse"), None);
        assert_eq!(parse_optional_batch_size(" 12 ").expect("number should parse"), Some(12));
        assert!(parse_optional_batch_size("0").is_err());
        assert!(parse_optional_batch_size("many").is_err());
    }
}
