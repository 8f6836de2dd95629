use miette::{IntoDiagnostic, Result};
use sanity_common::config::FileStore;
use sanity_common::{Config, PageData, TagAction, TagClient};
use std::path::PathBuf;

use clap::{Parser, Subcommand};

#[derive(Parser)]
#[command(version, about = "Sanity - render arXiv paper lists and manage tags", long_about = None)]
#[command(propagate_version = true)]
struct Cli {
    /// Path to config file (.toml or .json)
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Base URL of the paper server, overrides the config file
    #[arg(long, global = true, env = "SANITY_ENDPOINT")]
    endpoint: Option<String>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Render page data (JSON) to HTML
    Render {
        /// Page data with papers, tags, user and words
        data: PathBuf,

        /// Output file, stdout if omitted
        #[arg(short, long)]
        output: Option<PathBuf>,

        /// Render as this user, showing the tag controls
        #[arg(long)]
        user: Option<String>,
    },
    /// Change the tags on the server
    Tag {
        #[command(subcommand)]
        action: TagCommand,
    },
    /// Write the effective settings to the config file
    SaveConfig {
        /// Default user for rendering
        #[arg(long)]
        user: Option<String>,
    },
}

#[derive(Subcommand)]
enum TagCommand {
    /// Add a tag to a paper
    Add { pid: String, tag: String },
    /// Remove a tag from a paper
    Sub { pid: String, tag: String },
    /// Delete a tag from every paper
    Del { tag: String },
}

impl From<TagCommand> for TagAction {
    fn from(command: TagCommand) -> Self {
        match command {
            TagCommand::Add { pid, tag } => TagAction::Add { pid, tag },
            TagCommand::Sub { pid, tag } => TagAction::Sub { pid, tag },
            TagCommand::Del { tag } => TagAction::Delete { tag },
        }
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    init_miette();
    init_tracing();

    let cli = Cli::parse();
    let store = cli.config.clone().or_else(FileStore::default_path).map(FileStore::new);
    let mut config = load_config(store.as_ref()).await?;
    if let Some(endpoint) = cli.endpoint {
        config.endpoint = endpoint;
    }

    match cli.command {
        Commands::Render { data, output, user } => {
            render(data, output, user.or(config.user)).await?;
        }
        Commands::Tag { action } => {
            let client = TagClient::from_config(&config)?;
            let body = client.send(action.into()).await?;
            println!("{body}");
        }
        Commands::SaveConfig { user } => {
            let store = store.ok_or_else(|| {
                miette::miette!("No config path given and no platform config directory found")
            })?;
            if user.is_some() {
                config.user = user;
            }
            config.save(&store).await?;
            println!("Saved config to {}", store.path().display());
        }
    }

    Ok(())
}

async fn load_config(store: Option<&FileStore>) -> Result<Config> {
    match store {
        Some(store) if store.path().exists() => {
            tracing::debug!(path = %store.path().display(), "loading config");
            Ok(Config::load(store).await?)
        }
        _ => Ok(Config::default()),
    }
}

#[tracing::instrument(skip_all, fields(path = %data.display()))]
async fn render(data: PathBuf, output: Option<PathBuf>, user: Option<String>) -> Result<()> {
    let json = tokio::fs::read_to_string(&data).await.into_diagnostic()?;
    let mut page = PageData::from_json(&json)?;
    if user.is_some() {
        page.user = user;
    }
    tracing::info!(
        papers = page.papers.len(),
        tags = page.tags.len(),
        "rendering page"
    );

    let html = sanity_renderer::render_page(&page);
    match output {
        Some(path) => tokio::fs::write(&path, html).await.into_diagnostic()?,
        None => print!("{html}"),
    }
    Ok(())
}

fn init_tracing() {
    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .init();
}

fn init_miette() {
    miette::set_hook(Box::new(|_| {
        Box::new(
            miette::MietteHandlerOpts::new()
                .terminal_links(true)
                .with_cause_chain()
                .color(true)
                .context_lines(5)
                .tab_width(2)
                .break_words(true)
                .build(),
        )
    }))
    .expect("couldn't set the miette hook");
    miette::set_panic_hook();
}
