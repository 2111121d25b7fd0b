use clap::Parser;
use std::path::PathBuf;

use crate::config::{DEFAULT_REPORT_PATH, DEFAULT_TABLE, DISPLAYED_KEYWORDS};

#[derive(Parser, Debug)]
#[command(
    name = "redstat",
    about = "Classify red envelope ads by app category and recommend keywords and release hours",
    version,
    long_about = None
)]
pub struct Args {
    /// Dataset to analyze (.csv, or .db/.sqlite/.sqlite3)
    #[arg(default_value = "wechat.csv")]
    pub input: PathBuf,

    /// Table holding `content` and `time` columns in SQLite inputs
    #[arg(long, default_value = DEFAULT_TABLE)]
    pub table: String,

    /// Where to write the qualifying domain report
    #[arg(long, default_value = DEFAULT_REPORT_PATH)]
    pub report: PathBuf,

    /// Number of top domains to display
    #[arg(short, long)]
    pub top: Option<usize>,

    /// Minimum support: domains must appear more often than this
    #[arg(long)]
    pub min_support: Option<u32>,

    /// Keywords kept per category
    #[arg(long)]
    pub top_keywords: Option<usize>,

    /// Keywords printed per category
    #[arg(short, long, default_value_t = DISPLAYED_KEYWORDS)]
    pub keywords: usize,

    /// Path to custom recommendation file
    #[arg(short, long)]
    pub recommendations: Option<PathBuf>,

    /// Only print the recommendation for this category ("Not Sure" for general advice)
    #[arg(short, long)]
    pub category: Option<String>,

    /// Print the analysis as JSON
    #[arg(long)]
    pub json: bool,

    /// Enable verbose logging
    #[arg(short, long)]
    pub verbose: bool,

    /// Initialize recommendations.txt with default recommendations
    #[arg(long)]
    pub init: bool,
}
