use std::path::PathBuf;

use clap::{Parser, Subcommand};

#[derive(Parser)]
#[command(name = "cv-analyzer")]
#[command(about = "Upload CVs, match them against job descriptions and browse past analyses", long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Validate and upload a CV file
    Upload {
        #[arg(required = true)]
        file: PathBuf,
    },

    /// List saved job descriptions
    Jobs {
        /// Free-text filter on title, company, location and skills
        #[arg(short, long)]
        query: Option<String>,

        /// date, score or name
        #[arg(short, long, default_value = "date")]
        sort: String,

        /// Only this experience level
        #[arg(long)]
        level: Option<String>,

        /// List the built-in sample descriptions instead
        #[arg(long)]
        samples: bool,
    },

    /// Analyze an uploaded CV against a job description
    Analyze {
        /// Uploaded CV id
        #[arg(long)]
        cv: String,

        /// Saved job description id
        #[arg(long, conflicts_with_all = ["job_file", "sample"])]
        job: Option<String>,

        /// Job description JSON file, validated by the backend first
        #[arg(long, conflicts_with = "sample")]
        job_file: Option<PathBuf>,

        /// Position of a sample job description (see `jobs --samples`)
        #[arg(long)]
        sample: Option<usize>,
    },

    /// Browse recent analyses
    History {
        /// low, medium or high
        #[arg(short, long)]
        bucket: Option<String>,

        /// date, score or job
        #[arg(short, long, default_value = "date")]
        sort: String,

        #[arg(short, long)]
        query: Option<String>,
    },

    /// Show the notification log
    Notifications {
        #[arg(long)]
        mark_read: bool,

        #[arg(long, conflicts_with = "mark_read")]
        clear: bool,
    },

    /// Export a stored analysis as JSON
    Export {
        #[arg(long)]
        analysis: String,

        /// Output directory (default: current directory)
        #[arg(short, long)]
        out: Option<PathBuf>,
    },
}
