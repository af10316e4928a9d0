use std::sync::Arc;

use anyhow::{anyhow, bail, Context, Result};
use clap::{Parser, Subcommand};
use client_core::{GatedAction, HttpTaskGateway, TaskController};
use shared::domain::{QueryState, SortSpec, TaskField, TaskId};
use tokio::{
    io::{AsyncBufReadExt, AsyncWriteExt, BufReader},
    sync::broadcast,
};
use tracing::debug;
use tracing_subscriber::EnvFilter;

mod config;
mod render;

use config::load_settings;

#[derive(Parser, Debug)]
#[command(name = "tasks", about = "Browse and edit the remote task list")]
struct Args {
    /// Base URL of the task API; overrides tasks.toml and the environment.
    #[arg(long)]
    api_host: Option<String>,
    #[arg(long)]
    page_size: Option<u32>,
    /// Zero-based page of the task list to operate on.
    #[arg(long, default_value_t = 0)]
    page: u32,
    /// Sort key as `field` or `field:asc|desc`; repeat for secondary keys.
    #[arg(long = "sort", value_parser = parse_sort)]
    sort: Vec<SortSpec>,
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Show one page of tasks.
    List {
        #[arg(long)]
        show_id: bool,
    },
    Create {
        #[arg(long)]
        name: Option<String>,
        #[arg(long)]
        description: Option<String>,
        #[arg(long)]
        author: Option<String>,
    },
    /// Edit a task on the selected page.
    Update {
        #[arg(long)]
        id: String,
        #[arg(long)]
        name: Option<String>,
        #[arg(long)]
        description: Option<String>,
        #[arg(long)]
        author: Option<String>,
    },
    /// Mark a task on the selected page complete.
    Complete {
        #[arg(long)]
        id: String,
        /// Skip the confirmation prompt.
        #[arg(long)]
        yes: bool,
    },
    /// Delete a task on the selected page.
    Delete {
        #[arg(long)]
        id: String,
        /// Skip the confirmation prompt.
        #[arg(long)]
        yes: bool,
    },
}

fn parse_sort(raw: &str) -> Result<SortSpec, String> {
    SortSpec::parse(raw).ok_or_else(|| format!("invalid sort key '{raw}', expected field[:asc|desc]"))
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .init();
    let args = Args::parse();

    let mut settings = load_settings()?;
    if let Some(api_host) = args.api_host {
        settings.api_host = api_host;
    }
    if let Some(page_size) = args.page_size {
        if page_size == 0 {
            bail!("--page-size must be greater than zero");
        }
        settings.page_size = page_size;
    }
    debug!(
        api_host = %settings.api_host,
        page_size = settings.page_size,
        "tasks: settings resolved"
    );

    let gateway = HttpTaskGateway::with_timeout(&settings.api_host, settings.request_timeout())
        .context("failed to build task gateway")?;
    let controller = TaskController::with_query(
        Arc::new(gateway),
        QueryState {
            page_index: args.page,
            page_size: settings.page_size,
            sort: args.sort,
        },
    );
    let mut events = controller.subscribe_events();

    let result = run(&controller, args.command).await;
    print_events(&mut events);
    result
}

async fn run(controller: &TaskController, command: Command) -> Result<()> {
    // A failed initial load keeps an empty window; gated commands then report
    // the task as unknown and list renders the error banner.
    let _ = controller.start().await;

    match command {
        Command::List { show_id } => {
            let view = controller.view().await;
            print!("{}", render::render_table(&view, show_id));
            if view.error {
                bail!("failed to load tasks");
            }
            Ok(())
        }
        Command::Create {
            name,
            description,
            author,
        } => {
            controller.open_create_form().await;
            fill_form(
                controller,
                [
                    (TaskField::Name, Some(name.unwrap_or_default())),
                    (TaskField::Description, Some(description.unwrap_or_default())),
                    (TaskField::Author, Some(author.unwrap_or_default())),
                ],
            )
            .await?;
            submit(controller).await
        }
        Command::Update {
            id,
            name,
            description,
            author,
        } => {
            let id = TaskId::new(id);
            let view = controller.view().await;
            let record = view
                .window
                .find(&id)
                .cloned()
                .ok_or_else(|| anyhow!("task {id} is not on page {}", view.query.page_index))?;
            controller.open_edit_form(&record).await;
            fill_form(
                controller,
                [
                    (TaskField::Name, name),
                    (TaskField::Description, description),
                    (TaskField::Author, author),
                ],
            )
            .await?;
            submit(controller).await
        }
        Command::Complete { id, yes } => {
            gated(controller, TaskId::new(id), GatedAction::Complete, yes).await
        }
        Command::Delete { id, yes } => {
            gated(controller, TaskId::new(id), GatedAction::Delete, yes).await
        }
    }
}

async fn fill_form<const N: usize>(
    controller: &TaskController,
    values: [(TaskField, Option<String>); N],
) -> Result<()> {
    for (field, value) in values {
        if let Some(value) = value {
            controller.set_form_field(field, value).await?;
        }
    }
    Ok(())
}

async fn submit(controller: &TaskController) -> Result<()> {
    let form = controller
        .form()
        .await
        .ok_or_else(|| anyhow!("no task form is open"))?;
    if !form.is_submittable() {
        eprint!("{}", render::render_form_errors(&form));
        controller.close_form().await;
        bail!("{} is missing required fields", form.title());
    }
    controller.submit_form().await?;
    Ok(())
}

async fn gated(
    controller: &TaskController,
    id: TaskId,
    action: GatedAction,
    assume_yes: bool,
) -> Result<()> {
    let pending = controller.request_confirmation(&id, action).await?;
    if !assume_yes && !prompt_yes_no(&format!("{}\n{}", pending.title(), pending.prompt())).await? {
        controller.cancel_confirmation().await;
        println!("Cancelled.");
        return Ok(());
    }
    controller.confirm().await?;
    Ok(())
}

async fn prompt_yes_no(question: &str) -> Result<bool> {
    let mut stdout = tokio::io::stdout();
    stdout
        .write_all(format!("{question} [y/N] ").as_bytes())
        .await?;
    stdout.flush().await?;

    let mut answer = String::new();
    BufReader::new(tokio::io::stdin())
        .read_line(&mut answer)
        .await
        .context("failed to read confirmation")?;
    Ok(matches!(answer.trim().to_ascii_lowercase().as_str(), "y" | "yes"))
}

fn print_events(events: &mut broadcast::Receiver<client_core::ControllerEvent>) {
    while let Ok(event) = events.try_recv() {
        if let Some(line) = render::render_event(&event) {
            eprintln!("{line}");
        }
    }
}
