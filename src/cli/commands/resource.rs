use clap::Subcommand;
use serde_json::{Map, Value};

use crate::cli::client::ApiClient;
use crate::cli::utils::{output_records, output_success};
use crate::cli::OutputFormat;
use crate::resources::ResourceSpec;

#[derive(Subcommand)]
pub enum ResourceCommands {
    #[command(about = "List all records")]
    List,

    #[command(about = "Get a record by id")]
    Get {
        #[arg(help = "Record ID")]
        id: u64,
    },

    #[command(about = "Create a record")]
    Create {
        #[arg(long, help = "Name")]
        name: String,
        #[arg(long, help = "Description (required for badges)")]
        description: Option<String>,
    },

    #[command(about = "Update fields of a record")]
    Update {
        #[arg(help = "Record ID to update")]
        id: u64,
        #[arg(long, help = "New name")]
        name: Option<String>,
        #[arg(long, help = "New description")]
        description: Option<String>,
    },

    #[command(about = "Delete a record")]
    Delete {
        #[arg(help = "Record ID to delete")]
        id: u64,
    },
}

pub async fn handle(
    client: &ApiClient,
    resource: &ResourceSpec,
    cmd: ResourceCommands,
    output_format: OutputFormat,
) -> anyhow::Result<()> {
    let collection = format!("/{}", resource.route);
    let label = resource.label.to_lowercase();

    match cmd {
        ResourceCommands::List => {
            let rows = client.get(&collection).await?.unwrap_or(Value::Array(Vec::new()));
            output_records(output_format, &rows, &format!("No {}s found", label))
        }
        ResourceCommands::Get { id } => {
            let rows = client
                .get(&format!("{}/{}", collection, id))
                .await?
                .unwrap_or(Value::Array(Vec::new()));
            output_records(output_format, &rows, &format!("No {} with id {}", label, id))
        }
        ResourceCommands::Create { name, description } => {
            let body = fields_body(Some(name), description);
            let created = client.post(&collection, &body).await?;
            output_success(output_format, &format!("{} created", resource.label), created)
        }
        ResourceCommands::Update { id, name, description } => {
            let body = fields_body(name, description);
            let updated = client.patch(&format!("{}/{}", collection, id), &body).await?;
            output_success(output_format, &format!("{} {} updated", resource.label, id), updated)
        }
        ResourceCommands::Delete { id } => {
            client.delete(&format!("{}/{}", collection, id)).await?;
            output_success(output_format, &format!("{} {} deleted", resource.label, id), None)
        }
    }
}

/// Only the flags actually given end up in the request body
fn fields_body(name: Option<String>, description: Option<String>) -> Value {
    let mut body = Map::new();
    if let Some(name) = name {
        body.insert("name".to_string(), Value::String(name));
    }
    if let Some(description) = description {
        body.insert("description".to_string(), Value::String(description));
    }
    Value::Object(body)
}
