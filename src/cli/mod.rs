pub mod client;
pub mod commands;
pub mod utils;

use clap::{Parser, Subcommand};
use serde::{Deserialize, Serialize};

use crate::resources::{BADGES, TAGS};
use client::ApiClient;

#[derive(Parser)]
#[command(name = "challenge")]
#[command(about = "Challenge CLI - command-line client for the Challenge API")]
#[command(version)]
pub struct Cli {
    #[arg(long, global = true, help = "Output in JSON format")]
    pub json: bool,

    #[arg(
        long,
        global = true,
        help = "API base URL (defaults to CHALLENGE_API_URL, then http://localhost:3000)"
    )]
    pub url: Option<String>,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    #[command(about = "Badge operations")]
    Badges {
        #[command(subcommand)]
        cmd: commands::resource::ResourceCommands,
    },

    #[command(about = "Tag operations")]
    Tags {
        #[command(subcommand)]
        cmd: commands::resource::ResourceCommands,
    },

    #[command(about = "Challenges joined by a user")]
    UserChallenges {
        #[command(subcommand)]
        cmd: commands::user_challenges::UserChallengeCommands,
    },
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum OutputFormat {
    Text,
    Json,
}

impl OutputFormat {
    pub fn from_cli(cli: &Cli) -> Self {
        if cli.json {
            OutputFormat::Json
        } else {
            OutputFormat::Text
        }
    }
}

pub async fn run(cli: Cli) -> anyhow::Result<()> {
    let output_format = OutputFormat::from_cli(&cli);
    let client = ApiClient::new(client::resolve_base_url(cli.url));

    match cli.command {
        Commands::Badges { cmd } => commands::resource::handle(&client, &BADGES, cmd, output_format).await,
        Commands::Tags { cmd } => commands::resource::handle(&client, &TAGS, cmd, output_format).await,
        Commands::UserChallenges { cmd } => commands::user_challenges::handle(&client, cmd, output_format).await,
    }
}
