use std::path::PathBuf;

use clap::{Args, Parser, Subcommand, ValueEnum};

#[derive(Parser, Debug)]
#[command(name = "dbdiff")]
#[command(version, about = "Compare the schemas of two databases", long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Compare a primary database against a comparison database
    Diff(DiffArgs),

    /// Write the schema of a database to a JSON dump
    Dump(DumpArgs),
}

#[derive(Args, Debug)]
pub struct DiffArgs {
    /// Connection URL of the primary database
    #[arg(long, env = "DBDIFF_PRIMARY_URL")]
    pub primary_url: Option<String>,

    /// Schema dump to use as the primary database
    #[arg(long)]
    pub primary_file: Option<PathBuf>,

    /// Connection URL of the comparison database
    #[arg(long, env = "DBDIFF_COMPARISON_URL")]
    pub comparison_url: Option<String>,

    /// Schema dump to use as the comparison database
    #[arg(long)]
    pub comparison_file: Option<PathBuf>,

    #[arg(long, value_enum, default_value_t = OutputFormat::Console)]
    pub format: OutputFormat,

    /// Write the report to a file instead of stdout
    #[arg(long)]
    pub output: Option<PathBuf>,

    /// Include passing checks in the console report
    #[arg(long)]
    pub show_passed: bool,

    /// Exit with status 1 when any check failed
    #[arg(long)]
    pub fail_on_diff: bool,

    /// The collation to use by default for all connections
    #[arg(long, default_value = "utf8mb4_general_ci")]
    pub default_collation: String,
}

#[derive(Args, Debug)]
pub struct DumpArgs {
    /// Connection URL of the database to dump
    #[arg(long, env = "DBDIFF_URL")]
    pub url: String,

    /// Write the dump to a file instead of stdout
    #[arg(long)]
    pub output: Option<PathBuf>,
}

#[derive(ValueEnum, Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputFormat {
    Console,
    Json,
    Csv,
}

/// Where one side of a comparison is read from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Source {
    File(PathBuf),
    Url(String),
    Interactive,
}

impl DiffArgs {
    pub fn primary_source(&self) -> Source {
        source(&self.primary_file, &self.primary_url)
    }

    pub fn comparison_source(&self) -> Source {
        source(&self.comparison_file, &self.comparison_url)
    }
}

// An explicit file wins over a URL that may come from the environment.
fn source(file: &Option<PathBuf>, url: &Option<String>) -> Source {
    match (file, url) {
        (Some(path), _) => Source::File(path.clone()),
        (None, Some(url)) => Source::Url(url.clone()),
        (None, None) => Source::Interactive,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn diff_args(args: &[&str]) -> DiffArgs {
        let cli = Cli::try_parse_from(["dbdiff", "diff"].iter().chain(args)).unwrap();
        match cli.command {
            Commands::Diff(args) => args,
            Commands::Dump(_) => panic!("expected diff"),
        }
    }

    #[test]
    fn file_beats_url() {
        let args = diff_args(&[
            "--primary-file",
            "a.json",
            "--primary-url",
            "mysql://root@localhost/a",
            "--comparison-url",
            "postgres://localhost/b",
        ]);

        assert_eq!(args.primary_source(), Source::File(PathBuf::from("a.json")));
        assert_eq!(
            args.comparison_source(),
            Source::Url("postgres://localhost/b".to_string())
        );
    }

    #[test]
    fn defaults() {
        let args = diff_args(&["--primary-file", "a.json", "--comparison-file", "b.json"]);

        assert_eq!(args.format, OutputFormat::Console);
        assert_eq!(args.default_collation, "utf8mb4_general_ci");
        assert!(!args.show_passed);
        assert!(!args.fail_on_diff);
    }

    #[test]
    fn format_values() {
        let args = diff_args(&[
            "--primary-file",
            "a.json",
            "--comparison-file",
            "b.json",
            "--format",
            "csv",
        ]);

        assert_eq!(args.format, OutputFormat::Csv);
        assert!(Cli::try_parse_from(["dbdiff", "diff", "--format", "xml"]).is_err());
    }
}
