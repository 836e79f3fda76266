use clap::Subcommand;
use percent_encoding::{utf8_percent_encode, AsciiSet, NON_ALPHANUMERIC};
use serde_json::Value;

use crate::cli::client::ApiClient;
use crate::cli::utils::output_records;
use crate::cli::OutputFormat;
use crate::resources::USER_CHALLENGES;

/// Everything but unreserved characters is escaped inside a path segment
const SEGMENT: &AsciiSet = &NON_ALPHANUMERIC.remove(b'-').remove(b'_').remove(b'.').remove(b'~');

#[derive(Subcommand)]
pub enum UserChallengeCommands {
    #[command(about = "List every user/challenge association")]
    List,

    #[command(about = "Challenges a user has joined")]
    Get {
        #[arg(help = "User ID")]
        user_id: String,
    },
}

pub async fn handle(client: &ApiClient, cmd: UserChallengeCommands, output_format: OutputFormat) -> anyhow::Result<()> {
    let (path, empty_message) = match cmd {
        UserChallengeCommands::List => (format!("/{}", USER_CHALLENGES.route), "No user challenges found".to_string()),
        UserChallengeCommands::Get { user_id } => (
            user_path(&user_id),
            format!("User {} has not joined any challenges", user_id),
        ),
    };

    let rows = client.get(&path).await?.unwrap_or(Value::Array(Vec::new()));
    output_records(output_format, &rows, &empty_message)
}

fn user_path(user_id: &str) -> String {
    format!("/{}/{}", USER_CHALLENGES.route, utf8_percent_encode(user_id, SEGMENT))
}
