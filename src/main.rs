//! hdt-query command-line interface.
//!
//! Usage:
//!   hdt-query import data/triples.tsv data/store.idx
//!   hdt-query search data/store.idx --subject http://example.org/a --limit 10
//!   hdt-query count data/store.idx --predicate http://example.org/knows
//!   hdt-query literals data/store.idx Alice --offset 0 --limit 20
//!   hdt-query terms data/store.idx --position subject --prefix http://example.org/

use std::fs::File;
use std::io::BufReader;
use std::path::{Path, PathBuf};

use clap::{Args as ClapArgs, Parser, Subcommand};
use hdt_query::{
    Document, Limit, LiteralQuery, MemoryIndex, Page, QueryConfig, Role, TermsQuery,
    TriplePattern,
};
use serde::Serialize;
use tracing::info;
use tracing_subscriber::EnvFilter;

#[derive(Parser, Debug)]
#[command(name = "hdt-query")]
#[command(about = "Query a dictionary-encoded RDF triple index", long_about = None)]
struct Cli {
    /// JSON config file
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Worker pool size, overrides the config file
    #[arg(long, global = true)]
    workers: Option<usize>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Build an index snapshot from tab-separated `subject predicate object` lines
    Import {
        input: PathBuf,
        output: PathBuf,
        /// Build without literal substring search
        #[arg(long)]
        no_literal_search: bool,
    },
    /// Print one page of triples matching a pattern
    Search {
        index: PathBuf,
        #[command(flatten)]
        pattern: PatternArgs,
        #[arg(long, default_value = "0")]
        offset: usize,
        /// Omit for no limit
        #[arg(long)]
        limit: Option<usize>,
    },
    /// Print the number of triples matching a pattern
    Count {
        index: PathBuf,
        #[command(flatten)]
        pattern: PatternArgs,
    },
    /// Print literals containing a substring
    Literals {
        index: PathBuf,
        substring: String,
        #[arg(long, default_value = "0")]
        offset: usize,
        #[arg(long)]
        limit: Option<usize>,
    },
    /// Autocomplete terms by prefix, or list the predicates between a subject and an object
    Terms {
        index: PathBuf,
        /// subject, predicate or object
        #[arg(long, default_value = "predicate")]
        position: String,
        #[arg(long, default_value = "")]
        prefix: String,
        #[arg(long)]
        subject: Option<String>,
        #[arg(long)]
        object: Option<String>,
        #[arg(long)]
        limit: Option<usize>,
    },
}

#[derive(ClapArgs, Debug)]
struct PatternArgs {
    #[arg(short, long, default_value = "")]
    subject: String,
    #[arg(short, long, default_value = "")]
    predicate: String,
    #[arg(short, long, default_value = "")]
    object: String,
}

impl PatternArgs {
    fn to_pattern(&self) -> TriplePattern {
        TriplePattern::new(&self.subject, &self.predicate, &self.object)
    }
}

fn load_config(cli: &Cli) -> hdt_query::Result<QueryConfig> {
    let mut config = match &cli.config {
        Some(path) => QueryConfig::load_from_file(path)?,
        None => QueryConfig::default(),
    };
    if let Some(workers) = cli.workers {
        config.max_concurrent_queries = workers;
    }
    config.validate()?;
    Ok(config)
}

fn print_json<T: Serialize>(value: &T) -> hdt_query::Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

fn import(input: &Path, output: &Path, literal_search: bool) -> hdt_query::Result<()> {
    let reader = BufReader::new(File::open(input)?);
    let mut builder = MemoryIndex::builder().literal_search(literal_search);
    let added = builder.add_tsv(reader)?;
    let index = builder.build();
    index.save_to_file(output)?;
    info!(
        lines = added,
        triples = index.triple_count(),
        bytes = index.size_in_bytes(),
        "imported {}",
        input.display()
    );
    Ok(())
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")))
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    let config = load_config(&cli)?;

    match cli.command {
        Command::Import { input, output, no_literal_search } => {
            import(&input, &output, !no_literal_search)?;
        }
        Command::Search { index, pattern, offset, limit } => {
            let document = Document::open(&index, config).await?;
            let page = Page::new(offset, Limit::from(limit));
            print_json(&document.search_triples(pattern.to_pattern(), page).await?)?;
        }
        Command::Count { index, pattern } => {
            let document = Document::open(&index, config).await?;
            print_json(&document.count_triples(pattern.to_pattern()).await?)?;
        }
        Command::Literals { index, substring, offset, limit } => {
            let document = Document::open(&index, config).await?;
            let query = LiteralQuery::new(&substring, Page::new(offset, Limit::from(limit)));
            print_json(&document.search_literals(query).await?)?;
        }
        Command::Terms { index, position, prefix, subject, object, limit } => {
            let position = Role::parse(&position).ok_or_else(|| {
                hdt_query::Error::InvalidArgument(
                    "Invalid position argument. Expected subject, predicate or object.".to_string(),
                )
            })?;
            let document = Document::open(&index, config).await?;
            let query = TermsQuery {
                position,
                prefix,
                subject,
                object,
                limit: limit.unwrap_or(document.config().default_terms_limit),
            };
            print_json(&document.search_terms(query).await?)?;
        }
    }

    Ok(())
}
