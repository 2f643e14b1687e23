use std::{fs::File, io::BufWriter};

use anyhow::{Context, Result};

use crate::{
    application::{
        bulk_insert::bulk_insert_with,
        commands::{GenerateBulkInsertCommand, GenerateBulkInsertResult},
    },
    domain::bulk_insert_commands::BulkInsert,
    infrastructure::{
        json_rows::{JsonFieldExtractor, JsonRow, parse_common_params, parse_rows},
        script_writer::ScriptWriter,
    },
};

#[derive(Debug, Default)]
pub struct GenerateBulkInsertUseCase;

impl GenerateBulkInsertUseCase {
    pub fn execute(&self, command: GenerateBulkInsertCommand) -> Result<GenerateBulkInsertResult> {
        let rows = parse_rows(&command.rows_json)?;
        let common_params = command
            .common_json
            .as_deref()
            .map(parse_common_params)
            .transpose()?
            .unwrap_or_default();
        let field_extractor = JsonFieldExtractor::from_first_row(&rows);

        let bulk_insert = BulkInsert::new(&command.raw_sql)
            .common_params(common_params)
            .with_batch_size(command.batch_size);

        // Validate before touching the output path.
        bulk_insert
            .commands_with(std::iter::empty::<JsonRow>(), field_extractor.clone())
            .context("Invalid bulk insert template")?;

        let output_file = File::create(&command.output_path).with_context(|| {
            format!("Unable to create file: {}", command.output_path.display())
        })?;
        let mut script_writer = ScriptWriter::new(BufWriter::new(output_file), command.format);

        let row_count = bulk_insert_with(&mut script_writer, &bulk_insert, rows, field_extractor)?;
        let batch_count = script_writer.written_batch_count();
        script_writer.finish()?;

        Ok(GenerateBulkInsertResult {
            output_path: command.output_path,
            batch_count,
            row_count,
        })
    }
}

#[cfg(test)]
mod tests {
    use std::fs;

    use crate::{
        application::commands::GenerateBulkInsertCommand, domain::script_format::ScriptFormat,
    };

    use super::GenerateBulkInsertUseCase;

    fn command(
        output_dir: &tempfile::TempDir,
        raw_sql: &str,
        rows_json: &str,
    ) -> GenerateBulkInsertCommand {
        GenerateBulkInsertCommand {
            raw_sql: raw_sql.to_string(),
            rows_json: rows_json.to_string(),
            common_json: None,
            batch_size: None,
            output_path: output_dir.path().join("out.sql"),
            format: ScriptFormat::Sql,
        }
    }

    #[test]
    fn writes_batches_to_output_file() {
        let output_dir = tempfile::tempdir().expect("temp dir should be created");
        let mut generate_command = command(
            &output_dir,
            "INSERT INTO t (tenant, foo) VALUES (@tenant, @foo)...",
            r#"[{"foo": 1}, {"foo": 2}, {"foo": 3}]"#,
        );
        generate_command.common_json = Some(r#"{"tenant": "acme"}"#.to_string());
        generate_command.batch_size = Some(2);

        let result = GenerateBulkInsertUseCase
            .execute(generate_command)
            .expect("use case should succeed");

        assert_eq!(result.batch_count, 2);
        assert_eq!(result.row_count, 3);
        let script = fs::read_to_string(&result.output_path).expect("output should be readable");
        assert!(script.contains(
            "INSERT INTO t (tenant, foo) VALUES (@tenant, @foo_0),(@tenant, @foo_1);"
        ));
        assert!(script.contains("-- tenant = 'acme'"));
        assert!(script.contains("-- batch 2 (1 row)"));
    }

    #[test]
    fn empty_rows_write_an_empty_script() {
        let output_dir = tempfile::tempdir().expect("temp dir should be created");
        let result = GenerateBulkInsertUseCase
            .execute(command(&output_dir, "VALUES (@foo)...", "[]"))
            .expect("use case should succeed");

        assert_eq!(result.batch_count, 0);
        assert_eq!(result.row_count, 0);
        let script = fs::read_to_string(&result.output_path).expect("output should be readable");
        assert!(script.is_empty());
    }

    #[test]
    fn invalid_template_does_not_create_output() {
        let output_dir = tempfile::tempdir().expect("temp dir should be created");
        let generate_command = command(&output_dir, "VALUES (@foo)", r#"[{"foo": 1}]"#);
        let output_path = generate_command.output_path.clone();

        let error = GenerateBulkInsertUseCase
            .execute(generate_command)
            .expect_err("missing ellipsis should be rejected");

        assert!(format!("{error:#}").contains("followed by ')...'"));
        assert!(!output_path.exists());
    }
}
