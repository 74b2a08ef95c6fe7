//! Command line surface: argument parsing, connection prompts and source
//! resolution.

use std::io::{BufRead, Write};

use crate::db::{self, dump::SchemaDump, SchemaProvider};

pub mod cli;
pub mod prompt;

pub use cli::{Cli, Commands, DiffArgs, DumpArgs, OutputFormat, Source};
pub use prompt::{collect_connection, Prompt};

/// Open one side of a comparison, prompting for connection details when
/// neither a file nor a URL was given.
pub async fn open_source<R: BufRead, W: Write>(
    source: &Source,
    label: &str,
    default_collation: &str,
    prompt: &mut Prompt<R, W>,
) -> Result<Box<dyn SchemaProvider>, Box<dyn std::error::Error>> {
    let provider: Box<dyn SchemaProvider> = match source {
        Source::File(path) => {
            log::info!("Loading {} from {}", label, path.display());
            Box::new(SchemaDump::load(path)?)
        }
        Source::Url(url) => db::connect_url(url).await?,
        Source::Interactive => {
            prompt.section(&format!("{} Details", label))?;
            let config = collect_connection(prompt, label, default_collation)?;
            db::connect(&config).await?
        }
    };

    Ok(provider)
}
