use std::path::{Path, PathBuf};

use clap::{Parser, Subcommand, ValueEnum};
use serde::Serialize;

use ruby_indexer::{Arity, Configuration, Entry, Index, Result, RubyIndexer, Visibility, CONFIG_FILENAME};

#[derive(Parser)]
#[command(name = "ruby-indexer")]
#[command(about = "Index Ruby declarations and query them")]
#[command(version)]
#[command(after_long_help = r#"
EXAMPLES:
    # Show what was indexed
    ruby-indexer stats lib/**/*.rb

    # Look up a fully-qualified name
    ruby-indexer lookup Foo::Bar lib/foo.rb lib/foo/bar.rb

    # Fuzzy search, JSON output
    ruby-indexer --format json search --fuzzy Serializr lib/*.rb

    # Check whether a method accepts two positional arguments
    ruby-indexer arity perform 2 app/jobs/*.rb
"#)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Path to the configuration file (defaults to ./.index.yml when present)
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,

    /// Output format
    #[arg(long, value_enum, default_value = "text", global = true)]
    pub format: OutputFormat,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    Text,
    Json,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Show index statistics
    Stats {
        /// Ruby files to index
        #[arg(required = true)]
        files: Vec<PathBuf>,
    },

    /// Find all entries for an exact name
    Lookup {
        /// Fully-qualified constant name or bare method name
        name: String,

        /// Ruby files to index
        #[arg(required = true)]
        files: Vec<PathBuf>,
    },

    /// Search names by prefix or similarity
    Search {
        /// Search query
        query: String,

        /// Use fuzzy matching instead of prefix matching
        #[arg(long)]
        fuzzy: bool,

        /// Minimum similarity for fuzzy matches (0.0-1.0)
        #[arg(long, default_value = "0.7")]
        threshold: f64,

        /// Maximum number of results
        #[arg(long, default_value = "20")]
        limit: usize,

        /// Ruby files to index
        #[arg(required = true)]
        files: Vec<PathBuf>,
    },

    /// Check whether a method accepts a number of positional arguments
    Arity {
        /// Method name
        method: String,

        /// Number of positional arguments
        count: usize,

        /// Ruby files to index
        #[arg(required = true)]
        files: Vec<PathBuf>,
    },
}

/// Explicit `--config` path, else `.index.yml` in the working directory if present.
pub fn load_configuration(path: Option<&Path>) -> Result<Configuration> {
    match path {
        Some(path) => Configuration::from_file(path),
        None => {
            let default = Path::new(CONFIG_FILENAME);
            if default.is_file() {
                tracing::debug!("Loading configuration from {}", default.display());
                Configuration::from_file(default)
            } else {
                Ok(Configuration::new())
            }
        }
    }
}

fn build_index(configuration: Configuration, files: &[PathBuf]) -> Result<Index> {
    let indexer = RubyIndexer::new(configuration)?;
    let index = Index::new();
    let report = indexer.index_paths(&index, files);

    if report.files_indexed == 0 {
        eprintln!("No Ruby files were indexed");
    }

    Ok(index)
}

fn print_json<T: Serialize>(value: &T) -> Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

fn print_entry(entry: &Entry) {
    let visibility = match entry.visibility {
        Visibility::Public => String::new(),
        other => format!(" [{}]", other.as_str()),
    };
    println!(
        "{} ({}){} - {}",
        entry.name,
        entry.kind.as_str(),
        visibility,
        entry.location_string()
    );

    if let Some(owner) = entry.owner() {
        println!("  Owner: {}", owner);
    }
    if entry.is_method() && !entry.parameters().is_empty() {
        let params: Vec<String> = entry
            .parameters()
            .iter()
            .map(|p| format!("{} ({})", p.name, p.kind.as_str()))
            .collect();
        println!("  Parameters: {}", params.join(", "));
    }
    for line in &entry.comments {
        println!("  # {}", line);
    }
}

pub fn show_stats(configuration: Configuration, files: &[PathBuf], format: OutputFormat) -> Result<()> {
    let index = build_index(configuration, files)?;
    let stats = index.stats();

    if format == OutputFormat::Json {
        return print_json(&stats);
    }

    println!("Index Statistics:");
    println!("  Total files: {}", stats.total_files);
    println!("  Total names: {}", stats.total_names);
    println!("  Total entries: {}", stats.total_entries);

    if !stats.entries_by_kind.is_empty() {
        println!("\n  Entries by kind:");
        for (kind, count) in &stats.entries_by_kind {
            println!("    {}: {}", kind, count);
        }
    }

    Ok(())
}

pub fn lookup(configuration: Configuration, files: &[PathBuf], name: &str, format: OutputFormat) -> Result<()> {
    let index = build_index(configuration, files)?;
    let entries = index.get(name);

    if format == OutputFormat::Json {
        return print_json(&entries);
    }

    if entries.is_empty() {
        println!("No entries found for: {}", name);
        return Ok(());
    }

    for entry in &entries {
        print_entry(entry);
    }

    Ok(())
}

#[derive(Serialize)]
struct SearchHit {
    #[serde(flatten)]
    entry: Entry,
    score: f64,
}

pub fn search(
    configuration: Configuration,
    files: &[PathBuf],
    query: &str,
    fuzzy: bool,
    threshold: f64,
    limit: usize,
    format: OutputFormat,
) -> Result<()> {
    let index = build_index(configuration, files)?;

    let hits: Vec<SearchHit> = if fuzzy {
        index
            .fuzzy_search(query, threshold)
            .into_iter()
            .take(limit)
            .map(|(entry, score)| SearchHit { entry, score })
            .collect()
    } else {
        index
            .prefix_search(query)
            .into_iter()
            .take(limit)
            .map(|entry| SearchHit { entry, score: 1.0 })
            .collect()
    };

    if format == OutputFormat::Json {
        return print_json(&hits);
    }

    if hits.is_empty() {
        println!("No entries found for query: {}", query);
        return Ok(());
    }

    for hit in &hits {
        println!(
            "{} ({}) - {} [score: {:.2}]",
            hit.entry.name,
            hit.entry.kind.as_str(),
            hit.entry.location_string(),
            hit.score
        );
    }

    Ok(())
}

#[derive(Serialize)]
struct ArityCheck {
    location: String,
    owner: Option<String>,
    required: usize,
    max: Option<usize>,
    accepts: bool,
}

pub fn check_arity(
    configuration: Configuration,
    files: &[PathBuf],
    method: &str,
    count: usize,
    format: OutputFormat,
) -> Result<()> {
    let index = build_index(configuration, files)?;

    let checks: Vec<ArityCheck> = index
        .get(method)
        .iter()
        .filter(|entry| entry.is_method())
        .map(|entry| {
            let arity = Arity::from_parameters(entry.parameters());
            ArityCheck {
                location: entry.location_string(),
                owner: entry.owner().map(str::to_string),
                required: arity.required,
                max: arity.max(),
                accepts: entry.accepts_arity(count),
            }
        })
        .collect();

    if format == OutputFormat::Json {
        return print_json(&checks);
    }

    if checks.is_empty() {
        println!("No method named: {}", method);
        return Ok(());
    }

    for check in &checks {
        let max = check.max.map_or_else(|| "*".to_string(), |max| max.to_string());
        let verdict = if check.accepts { "accepts" } else { "rejects" };
        println!(
            "{}{} ({}..{}) {} {} argument(s) - {}",
            check.owner.as_deref().map(|o| format!("{}#", o)).unwrap_or_default(),
            method,
            check.required,
            max,
            verdict,
            count,
            check.location
        );
    }

    Ok(())
}
