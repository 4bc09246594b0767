//! CLI definition for the box office command-line interface.

use std::path::PathBuf;

use clap::{Parser, Subcommand};

/// Box office form tooling
///
/// Validates records against the box office schemas and computes the changed
/// values a form would submit.
#[derive(Parser, Debug)]
#[command(name = "boxoffice")]
#[command(version)]
#[command(about = "Box office form validation and change tracking")]
pub struct Cli {
    /// Enable debug output to stderr
    #[arg(short, long, global = true)]
    pub debug: bool,

    /// Configuration file merged above discovered boxoffice.* files
    #[arg(short, long, global = true, value_name = "FILE")]
    pub config: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Validate a JSON record against a named schema
    ///
    /// Exits 0 when valid, 2 when invalid and 1 on error.
    Validate {
        /// Schema name (see `boxoffice schemas`)
        schema: String,
        /// JSON file to validate; reads stdin when omitted
        file: Option<PathBuf>,
    },
    /// Print the top-level fields of CURRENT that differ from ORIGINAL
    Diff {
        /// JSON file holding the original record
        original: PathBuf,
        /// JSON file holding the edited record
        current: PathBuf,
        /// Field to leave out of the result; replaces the configured list
        #[arg(short, long = "exclude", value_name = "FIELD")]
        exclude: Vec<String>,
    },
    /// List the available schemas and their fields
    Schemas,
    /// Print the resolved configuration as JSON
    Config,
}
