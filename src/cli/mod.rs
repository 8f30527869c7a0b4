pub mod browse;
pub mod commands;

use std::path::PathBuf;

use chrono::NaiveDate;
use clap::{Parser, Subcommand};

use crate::domain::selection::parse_date;

#[derive(Parser)]
#[command(name = "wikidash")]
#[command(about = "Featured encyclopedia content in the terminal", long_about = None)]
pub struct Cli {
    /// Config file to use instead of ~/.config/wikidash/config.toml
    #[arg(short, long, global = true)]
    pub config: Option<PathBuf>,

    /// Keep read status in memory only
    #[arg(long, global = true)]
    pub ephemeral: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Fetch featured content once and print a page of it
    Fetch {
        /// Language code (default from config)
        #[arg(short, long)]
        language: Option<String>,
        /// Date as YYYY-MM-DD or YYYY/MM/DD (default: today)
        #[arg(short, long, value_parser = date_arg)]
        date: Option<NaiveDate>,
        /// Page of the most-read list
        #[arg(short, long, default_value_t = 1)]
        page: usize,
        /// Articles per page (default from config)
        #[arg(long)]
        page_size: Option<usize>,
    },
    /// List languages
    Languages {
        /// Ask the translation provider instead of the built-in list
        #[arg(long)]
        remote: bool,
    },
    /// Translate text with the translation provider
    Translate {
        text: String,
        /// Target language code
        #[arg(short, long)]
        target: String,
    },
    /// Interactive session driven by commands on stdin
    Browse {
        #[arg(short, long)]
        language: Option<String>,
        #[arg(short, long, value_parser = date_arg)]
        date: Option<NaiveDate>,
    },
    /// Run the cross-origin feed proxy
    Serve {
        /// Address to listen on (default from config)
        #[arg(short, long)]
        bind: Option<String>,
    },
}

fn date_arg(s: &str) -> Result<NaiveDate, String> {
    parse_date(s).ok_or_else(|| format!("invalid date {:?}, expected YYYY-MM-DD", s))
}
