use std::path::PathBuf;

use clap::{Parser, Subcommand};

#[derive(Parser, Debug)]
#[command(name = "ficous-quiz", version, about = "Timed Ficous exercise quizzes in the terminal")]
pub struct Cli {
    /// Config file [default: ./ficous.yaml, then the user config dir]
    #[arg(long, global = true, value_name = "path")]
    pub config: Option<PathBuf>,

    /// Backend base URL (overrides config and FICOUS_API_URL)
    #[arg(long, global = true, value_name = "url")]
    pub api_url: Option<String>,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Take a timed quiz for an exercise
    Quiz {
        /// Exercise id
        exercise_id: String,
    },

    /// List exercises
    List {
        /// Question kind (open, closed, mix)
        #[arg(long)]
        kind: Option<String>,

        /// Difficulty (easy, medium, hard)
        #[arg(long)]
        difficulty: Option<String>,

        /// Tag filter
        #[arg(long)]
        tag: Option<String>,

        #[arg(long)]
        limit: Option<u32>,

        #[arg(long)]
        offset: Option<u32>,
    },

    /// Print an exercise's questions
    Show {
        /// Exercise id
        exercise_id: String,
    },

    /// Store the bearer token used for API requests
    Login {
        token: String,
    },

    /// Remove the stored token
    Logout,
}
