use std::fmt::Write as _;

use anyhow::Result;
use clap::{Parser, Subcommand};
use client_core::{AppView, ClientConfig, TodoApp};
use shared::domain::{ItemId, ListId};
use tracing_subscriber::EnvFilter;

#[derive(Parser, Debug)]
#[command(name = "todo", about = "Browse and edit to-do lists on a lists API server")]
struct Args {
    /// Base URL of the lists API (falls back to TODO_API_URL, then http://127.0.0.1:8000).
    #[arg(long)]
    api_url: Option<String>,
    /// Print the resulting view as JSON.
    #[arg(long)]
    json: bool,
    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Show all list summaries.
    Lists,
    Create {
        name: String,
    },
    Delete {
        list_id: String,
    },
    /// Show one list with its items.
    Show {
        list_id: String,
    },
    AddItem {
        list_id: String,
        label: String,
    },
    RemoveItem {
        list_id: String,
        item_id: String,
    },
    Check {
        list_id: String,
        item_id: String,
        #[arg(long)]
        unchecked: bool,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")))
        .init();
    let args = Args::parse();

    let config = ClientConfig::resolve(args.api_url.as_deref())?;
    let mut app = TodoApp::from_config(&config);

    match args.command.unwrap_or(Command::Lists) {
        Command::Lists => app.reload_data().await,
        Command::Create { name } => app.create_list(&name).await,
        Command::Delete { list_id } => app.delete_list(&ListId(list_id)).await,
        Command::Show { list_id } => {
            app.select_list(ListId(list_id));
            app.load_selected().await;
        }
        Command::AddItem { list_id, label } => {
            app.select_list(ListId(list_id));
            app.add_item(&label).await;
        }
        Command::RemoveItem { list_id, item_id } => {
            app.select_list(ListId(list_id));
            app.delete_item(&ItemId(item_id)).await;
        }
        Command::Check {
            list_id,
            item_id,
            unchecked,
        } => {
            app.select_list(ListId(list_id));
            app.set_checked(&ItemId(item_id), !unchecked).await;
        }
    }

    if args.json {
        println!("{}", render_json(app.view())?);
    } else {
        print!("{}", render_text(app.view()));
    }
    Ok(())
}

fn render_text(view: AppView<'_>) -> String {
    let mut out = String::new();
    match view {
        AppView::Loading => out.push_str("Loading...\n"),
        AppView::Overview([]) => out.push_str("No to-do lists.\n"),
        AppView::Overview(summaries) => {
            for summary in summaries {
                let _ = writeln!(
                    out,
                    "{}  {} ({} items)",
                    summary.id, summary.name, summary.item_count
                );
            }
        }
        AppView::Detail { list_id, list: None } => {
            let _ = writeln!(out, "To-do list {list_id} is unavailable.");
        }
        AppView::Detail {
            list: Some(list), ..
        } => {
            let _ = writeln!(out, "{}", list.name);
            if list.items.is_empty() {
                out.push_str("  (no items)\n");
            }
            for item in &list.items {
                let mark = if item.checked { 'x' } else { ' ' };
                let _ = writeln!(out, "  [{mark}] {}  {}", item.label, item.id);
            }
        }
    }
    out
}

fn render_json(view: AppView<'_>) -> Result<String> {
    let value = match view {
        AppView::Loading => serde_json::Value::Null,
        AppView::Overview(summaries) => serde_json::to_value(summaries)?,
        AppView::Detail { list, .. } => serde_json::to_value(list)?,
    };
    Ok(serde_json::to_string_pretty(&value)?)
}
