use anyhow::{anyhow, bail, Result};
use clap::{Parser, Subcommand};
use shared::{
    domain::{ListId, ToDoList},
    protocol::validate_text,
};
use storage::Storage;

#[derive(Parser, Debug)]
struct Cli {
    #[arg(long, default_value = "sqlite://./data/todo.db")]
    database_url: String,
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    CreateList {
        name: String,
    },
    AddItem {
        list_id: String,
        label: String,
    },
    /// Print every list with its items as JSON.
    Dump,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    let storage = Storage::new(&cli.database_url).await?;

    match cli.command {
        Command::CreateList { name } => {
            let list_id = create_list(&storage, &name).await?;
            println!("created list_id={list_id}");
        }
        Command::AddItem { list_id, label } => {
            let list = add_item(&storage, &ListId(list_id), &label).await?;
            println!(
                "added item to {} ({} items)",
                list.name,
                list.items.len()
            );
        }
        Command::Dump => {
            let lists = dump(&storage).await?;
            println!("{}", serde_json::to_string_pretty(&lists)?);
        }
    }

    Ok(())
}

/// Applies the same trimming and length rules as the API server.
fn checked_text<'a>(field: &str, value: &'a str) -> Result<&'a str> {
    validate_text(field, value).map_err(|err| anyhow!(err.message))
}

async fn create_list(storage: &Storage, name: &str) -> Result<ListId> {
    storage.create_list(checked_text("name", name)?).await
}

async fn add_item(storage: &Storage, list_id: &ListId, label: &str) -> Result<ToDoList> {
    let label = checked_text("label", label)?;
    let Some(list) = storage.create_item(list_id, label).await? else {
        bail!("todo list {list_id} not found");
    };
    Ok(list)
}

async fn dump(storage: &Storage) -> Result<Vec<ToDoList>> {
    let mut lists = Vec::new();
    for summary in storage.list_summaries().await? {
        if let Some(list) = storage.get_list(&summary.id).await? {
            lists.push(list);
        }
    }
    Ok(lists)
}
