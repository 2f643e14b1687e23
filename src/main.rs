use anyhow::Result;
use console::style;
use tracing_subscriber::EnvFilter;

use sql_bulk_insert::{
    application::use_cases::generate_bulk_insert::GenerateBulkInsertUseCase,
    interfaces::cli::collect_generate_command,
};

fn main() -> Result<()> {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();

    let command = collect_generate_command()?;
    let use_case = GenerateBulkInsertUseCase::default();

    println!("{}", style("Generating bulk insert batches...").cyan());
    let result = use_case.execute(command)?;

    println!(
        "{} {} ({} batches, {} rows)",
        style("Generated SQL has been saved to").green(),
        style(result.output_path.display()).bold(),
        result.batch_count,
        result.row_count,
    );
    Ok(())
}
