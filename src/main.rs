use std::fs::File;
use std::io::{self, BufWriter, Write};
use std::process::ExitCode;

use clap::Parser;
use dbdiff::client::{open_source, Cli, Commands, DiffArgs, DumpArgs, OutputFormat, Prompt};
use dbdiff::compare::Diff;
use dbdiff::db::{self, dump::SchemaDump};
use dbdiff::errors::OutputError;
use dbdiff::output::{ConsoleOutput, CountingOutput, CsvOutput, JsonOutput, Output};
use env_logger::Env;

#[tokio::main]
async fn main() -> ExitCode {
    dotenv::dotenv().ok();
    env_logger::Builder::from_env(Env::default().default_filter_or("warn")).init();

    let cli = Cli::parse();
    let result = match cli.command {
        Commands::Diff(args) => run_diff(args).await,
        Commands::Dump(args) => run_dump(args).await.map(|_| ExitCode::SUCCESS),
    };

    match result {
        Ok(code) => code,
        Err(e) => {
            log::error!("{}", e);
            eprintln!("Error: {}", e);
            ExitCode::from(2)
        }
    }
}

async fn run_diff(args: DiffArgs) -> Result<ExitCode, Box<dyn std::error::Error>> {
    let mut prompt = Prompt::stdio();
    let primary = open_source(
        &args.primary_source(),
        "Primary Database",
        &args.default_collation,
        &mut prompt,
    )
    .await?;
    let comparison = open_source(
        &args.comparison_source(),
        "Secondary Database",
        &args.default_collation,
        &mut prompt,
    )
    .await?;

    let mut output = CountingOutput::new(build_output(&args)?);
    Diff::new()
        .run(primary.as_ref(), comparison.as_ref(), &mut output)
        .await?;

    log::info!("{} passed, {} failed", output.passed(), output.failed());

    if args.fail_on_diff && output.has_failures() {
        return Ok(ExitCode::from(1));
    }
    Ok(ExitCode::SUCCESS)
}

fn build_output(args: &DiffArgs) -> Result<Box<dyn Output>, OutputError> {
    let writer: Box<dyn Write + Send> = match &args.output {
        Some(path) => Box::new(BufWriter::new(File::create(path)?)),
        None => Box::new(io::stdout()),
    };

    let output: Box<dyn Output> = match args.format {
        OutputFormat::Console => Box::new(ConsoleOutput::new(writer, args.show_passed)),
        OutputFormat::Json => Box::new(JsonOutput::new(writer)),
        OutputFormat::Csv => Box::new(CsvOutput::new(writer)),
    };
    Ok(output)
}

async fn run_dump(args: DumpArgs) -> Result<(), Box<dyn std::error::Error>> {
    let provider = db::connect_url(&args.url).await?;
    let dump = SchemaDump::capture(provider.as_ref()).await?;

    match &args.output {
        Some(path) => dump.save(path)?,
        None => println!("{}", dump.to_json()?),
    }
    Ok(())
}
