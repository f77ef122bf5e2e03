//! Command-line definition

use std::path::PathBuf;

use clap::{Parser, Subcommand};

use annot_core::{SortKey, StatusFilter};

/// Top-level parser for the `annot` binary.
#[derive(Debug, Parser)]
#[command(name = "annot", version, about = "Codebook-driven article annotation")]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Config file (defaults to ./annot.toml, then the user config dir)
    #[arg(short, long, global = true)]
    pub config: Option<PathBuf>,
}

#[derive(Debug, Subcommand)]
pub enum Commands {
    /// List articles, one row per experiment
    Dashboard {
        /// all, coded, or not-coded
        #[arg(long, default_value = "all", value_parser = parse_status)]
        status: StatusFilter,

        /// Case-insensitive search over title, author and article index
        #[arg(short, long)]
        search: Option<String>,

        /// date, author, or title
        #[arg(long, default_value = "date", value_parser = parse_sort)]
        sort: SortKey,

        /// Sort descending
        #[arg(long)]
        desc: bool,

        /// Only this group
        #[arg(short, long)]
        group: Option<String>,
    },

    /// Show the entry form for an article and experiment
    Show {
        article_index: Option<String>,

        #[arg(default_value_t = 1)]
        experiment: u32,

        /// Navigate directly to a mode ("Add Entry", "Review Entry")
        /// instead of selecting a row
        #[arg(long)]
        mode: Option<String>,
    },

    /// Code an entry and save it
    Annotate {
        article_index: String,

        #[arg(default_value_t = 1)]
        experiment: u32,

        /// Field value, repeatable; separate multi-select options with ';'
        #[arg(long = "set", value_name = "CODE=VALUE", value_parser = parse_assignment)]
        values: Vec<(String, String)>,

        /// Metadata value (title, authors, year, journal, url, searchterms)
        #[arg(long = "meta", value_name = "NAME=VALUE", value_parser = parse_assignment)]
        metadata: Vec<(String, String)>,

        /// Clear every coded value before applying --set
        #[arg(long)]
        clear: bool,
    },

    /// Write all annotations to a timestamped CSV
    Export,

    /// List codebook fields by section
    Codebook,
}

fn parse_status(s: &str) -> Result<StatusFilter, String> {
    s.parse()
}

fn parse_sort(s: &str) -> Result<SortKey, String> {
    s.parse()
}

/// Split `name=value` at the first `=`.
pub fn parse_assignment(s: &str) -> Result<(String, String), String> {
    let (name, value) = s
        .split_once('=')
        .ok_or_else(|| format!("expected NAME=VALUE, got '{}'", s))?;
    let name = name.trim();
    if name.is_empty() {
        return Err(format!("missing name in '{}'", s));
    }
    Ok((name.to_string(), value.to_string()))
}
