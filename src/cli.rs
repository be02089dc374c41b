use clap::{Parser, Subcommand};
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "foto-report")]
#[command(about = "Batch photo-report generator for spreadsheet templates", long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Verbose output
    #[arg(short, long, global = true)]
    pub verbose: bool,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Run one report job: fill a template with photos and save the workbook
    Run {
        /// Template spreadsheet (.xlsx)
        #[arg(required = true)]
        template: PathBuf,

        /// Photo inputs: local paths or http(s)/drive URLs, in placement order
        #[arg(short, long)]
        photo: Vec<String>,

        /// Scan a folder for photos (sorted by file name) instead of --photo
        #[arg(short = 'd', long)]
        photo_dir: Option<PathBuf>,

        /// Output directory (default: configured output dir)
        #[arg(short, long)]
        output: Option<PathBuf>,

        /// Job identifier (default: generated)
        #[arg(long)]
        job_id: Option<String>,

        /// Overall job timeout in seconds
        #[arg(long)]
        timeout: Option<u64>,
    },

    /// Analyze a template and print its structure
    Inspect {
        /// Template spreadsheet (.xlsx)
        #[arg(required = true)]
        template: PathBuf,
    },

    /// Show or change persisted settings
    Config {
        /// Set the output directory
        #[arg(long)]
        set_output_dir: Option<PathBuf>,

        /// Set the job timeout in seconds
        #[arg(long)]
        set_timeout: Option<u64>,

        /// Show current settings
        #[arg(long)]
        show: bool,
    },
}
