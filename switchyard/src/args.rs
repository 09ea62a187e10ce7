use std::path::PathBuf;

use clap::{Parser, Subcommand};

/// Switchyard capability router
#[derive(Debug, Parser)]
#[command(
    name = "switchyard",
    about = "Inspect routes and run the offline capabilities of the Switchyard router"
)]
pub struct Args {
    /// Path to configuration file; built-in defaults when it does not exist
    #[arg(short, long, default_value = "switchyard.toml", env = "SWITCHYARD_CONFIG")]
    pub config: PathBuf,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// List registered (capability, provider) routes
    Routes,

    /// Estimate prompt tokens, one user message per text
    CountTokens {
        #[arg(long)]
        provider: String,
        #[arg(required = true)]
        texts: Vec<String>,
    },

    /// Estimate tokens of each embedding input
    EmbeddingTokens {
        #[arg(long)]
        provider: String,
        #[arg(required = true)]
        texts: Vec<String>,
    },

    /// List synthesis voices
    Voices {
        #[arg(long)]
        provider: String,
        /// Language prefix, e.g. `en` or `zh-CN`
        #[arg(long)]
        language: Option<String>,
    },

    /// Rank documents with the positional stand-in backends
    Rerank {
        #[arg(long)]
        provider: String,
        #[arg(long)]
        query: String,
        #[arg(long)]
        top_n: Option<usize>,
        #[arg(required = true)]
        documents: Vec<String>,
    },

    /// Classify text with the configured moderation rules
    Moderate {
        #[arg(long)]
        provider: String,
        text: String,
    },

    /// Summarize text read from a file or stdin with the provider's chat route
    Summarize {
        #[arg(long)]
        provider: String,
        /// Extra instruction for the summarizing model
        #[arg(long, default_value = "")]
        instruction: String,
        /// Text file; stdin when omitted
        file: Option<PathBuf>,
    },

    /// Estimate the cost of a call from configured prices
    Cost {
        #[arg(long)]
        provider: String,
        #[arg(long)]
        model: String,
        #[arg(long)]
        prompt_tokens: u32,
        #[arg(long, default_value_t = 0)]
        completion_tokens: u32,
    },
}
