use std::sync::Arc;

use anyhow::{Context, Result};
use catalog_core::{load_settings, CatalogController, CatalogIntent, QueryState};
use clap::{Parser, Subcommand};
use shared::domain::SortKey;
use tokio::io::{AsyncBufReadExt, BufReader};
use tracing::warn;
use tracing_subscriber::EnvFilter;

mod render;

use render::{render_categories, render_view};

#[derive(Parser, Debug)]
#[command(about = "Browse the product catalog from a terminal")]
struct Cli {
    /// Overrides `api_base_url` from catalog.toml and the environment.
    #[arg(long, global = true)]
    api_base_url: Option<String>,
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Render one page of products.
    Browse {
        #[arg(long, conflicts_with = "category")]
        search: Option<String>,
        #[arg(long)]
        category: Option<String>,
        #[arg(long, default_value = "default")]
        sort: SortKey,
        #[arg(long, default_value_t = 1)]
        page: u32,
    },
    /// List the available categories.
    Categories,
    /// Interactive browsing; type `help` for commands.
    Shell,
}

#[derive(Debug, PartialEq, Eq)]
enum ShellCommand {
    Intent(CatalogIntent),
    Categories,
    Help,
    Quit,
}

const SHELL_HELP: &str = "commands: search <term> | category <slug> | sort <key> | page <n> | next | prev | clear | retry | categories | help | quit";

fn parse_shell_command(line: &str) -> Result<ShellCommand, String> {
    let line = line.trim();
    let (verb, rest) = line.split_once(char::is_whitespace).unwrap_or((line, ""));
    let rest = rest.trim();

    let command = match verb.to_ascii_lowercase().as_str() {
        "search" | "s" => ShellCommand::Intent(CatalogIntent::SetSearch(rest.to_string())),
        "category" | "cat" => ShellCommand::Intent(CatalogIntent::SetCategory(rest.to_string())),
        "sort" => {
            let sort = rest.parse::<SortKey>().map_err(|err| err.to_string())?;
            ShellCommand::Intent(CatalogIntent::SetSort(sort))
        }
        "page" | "p" => {
            let page = rest
                .parse::<u32>()
                .map_err(|_| format!("invalid page number '{rest}'"))?;
            ShellCommand::Intent(CatalogIntent::SetPage(page))
        }
        "next" | "n" => ShellCommand::Intent(CatalogIntent::NextPage),
        "prev" => ShellCommand::Intent(CatalogIntent::PrevPage),
        "clear" => ShellCommand::Intent(CatalogIntent::ClearFilters),
        "retry" | "r" => ShellCommand::Intent(CatalogIntent::Retry),
        "categories" => ShellCommand::Categories,
        "help" | "?" => ShellCommand::Help,
        "quit" | "exit" | "q" => ShellCommand::Quit,
        other => return Err(format!("unknown command '{other}'")),
    };
    Ok(command)
}

fn browse_query(search: Option<&str>, category: Option<&str>, sort: SortKey) -> QueryState {
    let mut query = QueryState::default();
    if let Some(term) = search {
        query.set_search(term);
    } else if let Some(category) = category {
        query.set_category(category);
    }
    query.set_sort(sort);
    query
}

/// One product fetch for the filters, plus one more when a later page is asked for.
async fn browse(
    controller: &CatalogController,
    search: Option<String>,
    category: Option<String>,
    sort: SortKey,
    page: u32,
) -> Result<()> {
    let query = browse_query(search.as_deref(), category.as_deref(), sort);
    tokio::join!(controller.load_categories(), controller.apply_query(query));

    if page > 1 {
        controller
            .set_page(page)
            .await
            .with_context(|| format!("cannot open page {page}"))?;
    }

    println!("{}", render_view(&controller.snapshot().await));
    Ok(())
}

async fn shell(controller: Arc<CatalogController>) -> Result<()> {
    controller.initialize().await;
    println!("{}", render_view(&controller.snapshot().await));
    println!("{SHELL_HELP}");

    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    while let Some(line) = lines.next_line().await.context("failed to read stdin")? {
        if line.trim().is_empty() {
            continue;
        }
        match parse_shell_command(&line) {
            Ok(ShellCommand::Intent(intent)) => match controller.handle(intent).await {
                Ok(true) => println!("{}", render_view(&controller.snapshot().await)),
                Ok(false) => println!("(no change)"),
                Err(err) => println!("{err}"),
            },
            Ok(ShellCommand::Categories) => {
                println!("{}", render_categories(&controller.snapshot().await.categories));
            }
            Ok(ShellCommand::Help) => println!("{SHELL_HELP}"),
            Ok(ShellCommand::Quit) => break,
            Err(message) => {
                warn!(input = line.as_str(), "rejected shell input");
                println!("{message}\n{SHELL_HELP}");
            }
        }
    }
    Ok(())
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    let mut settings = load_settings();
    if let Some(api_base_url) = cli.api_base_url {
        settings.api_base_url = api_base_url;
    }

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_new(&settings.log_filter).unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .init();

    let controller = CatalogController::from_settings(&settings).with_context(|| {
        format!(
            "failed to set up catalog client for {}",
            settings.api_base_url
        )
    })?;

    match cli.command {
        Command::Browse {
            search,
            category,
            sort,
            page,
        } => browse(&controller, search, category, sort, page).await?,
        Command::Categories => {
            controller.load_categories().await;
            println!("{}", render_categories(&controller.snapshot().await.categories));
        }
        Command::Shell => shell(controller).await?,
    }

    Ok(())
}
