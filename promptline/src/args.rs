use std::path::PathBuf;

use clap::{Parser, Subcommand};
use promptline_config::TemplateFamily;

/// Promptline inference tooling
#[derive(Debug, Parser)]
#[command(name = "promptline", about = "Inspect function-calling prompts, stop markers, and responses")]
pub struct Args {
    /// Path to configuration file
    #[arg(short, long, env = "PROMPTLINE_CONFIG", global = true)]
    pub config: Option<PathBuf>,

    /// Log filter used when neither `RUST_LOG` nor the config sets one
    #[arg(long, default_value = "warn", global = true)]
    pub log: String,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Render the prompt a request would be generated from
    Render {
        /// JSON request file, `-` for stdin
        #[arg(short, long)]
        request: PathBuf,

        #[command(flatten)]
        template: TemplateArgs,
    },
    /// List the stop markers used for a model
    StopMarkers {
        /// Extra stop markers, as a request would pass them
        #[arg(long = "stop")]
        stop: Vec<String>,

        #[command(flatten)]
        template: TemplateArgs,
    },
    /// Parse generated text into an assistant message
    Parse {
        /// File holding the generated text, `-` for stdin
        #[arg(short, long)]
        text: PathBuf,

        #[command(flatten)]
        template: TemplateArgs,
    },
}

/// How the template is chosen
#[derive(Debug, clap::Args)]
pub struct TemplateArgs {
    /// Model id matched against the configured template rules
    #[arg(short, long)]
    pub model: Option<String>,

    /// Template family, bypassing the configured rules
    #[arg(long, value_parser = parse_family)]
    pub family: Option<TemplateFamily>,
}

fn parse_family(value: &str) -> Result<TemplateFamily, String> {
    match value {
        "v1" => Ok(TemplateFamily::V1),
        "v2" => Ok(TemplateFamily::V2),
        other => Err(format!("unknown template family `{other}`, expected v1 or v2")),
    }
}
