use anyhow::{Context, Result};
use clap::Parser;
use std::path::PathBuf;
use std::sync::Arc;
use tokio::io::{AsyncBufReadExt, BufReader};
use tracing::info;

use art_rater::config;
use art_rater::entry::EntryView;
use art_rater::gateway::ArticClient;
use art_rater::model::{ArtworkId, MetadataState};
use art_rater::ArtRater;

#[derive(Debug, Parser)]
#[command(author, version, about = "Browse and rate artworks from the command line")]
struct Args {
    /// Path to YAML config file (defaults to ./config.yaml, then the built-in seed)
    #[arg(long)]
    config: Option<PathBuf>,
}

const HELP: &str = "commands: list | rate <id> <1-5> | submit <id> | add [id] | edit <text> | \
delete <id> | confirm | cancel | dismiss | help | quit";

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_target(false)
        .compact()
        .init();

    let args = Args::parse();
    let cfg = config::load(args.config.as_deref())?;
    let gateway = ArticClient::from_config(&cfg)?;
    let rater = ArtRater::from_config(&cfg, Arc::new(gateway)).await;

    info!(entries = cfg.seed.len(), "loading artworks");
    rater.settle().await;
    print_list(&rater).await;
    println!("{}", HELP);

    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    while let Some(line) = lines.next_line().await.context("failed to read stdin")? {
        let line = line.trim();
        if line.is_empty() {
            continue;
        }
        let (cmd, rest) = line.split_once(' ').unwrap_or((line, ""));
        if cmd == "quit" || cmd == "exit" {
            break;
        }
        if let Err(err) = run_command(&rater, cmd, rest.trim()).await {
            println!("error: {}", err);
        }
        if let Some(message) = rater.notification() {
            println!(">> {}", message);
        }
    }

    Ok(())
}

async fn run_command(rater: &ArtRater, cmd: &str, rest: &str) -> Result<()> {
    match cmd {
        "list" => print_list(rater).await,
        "rate" => {
            let (id, rating) = rest.split_once(' ').context("usage: rate <id> <1-5>")?;
            let id = parse_id(id)?;
            let rating: u8 = rating.trim().parse().context("rating must be a number")?;
            rater.select_rating(id, rating).await?;
        }
        "submit" => {
            let status = rater.submit(parse_id(rest)?).await?;
            println!("{}", status.as_str());
        }
        "add" => {
            let added = if rest.is_empty() {
                rater.submit_form().await
            } else {
                rater.propose_add(rest).await
            };
            match added {
                Ok(_) => {
                    rater.settle().await;
                    print_list(rater).await;
                }
                Err(err) => println!("{}", err),
            }
        }
        "edit" => rater.edit_input(rest).await,
        "delete" => {
            rater.request_delete(parse_id(rest)?).await?;
            if let Some(prompt) = rater.delete_prompt().await {
                println!("{} {} (confirm/cancel)", prompt.title, prompt.body);
            }
        }
        "confirm" => {
            rater.confirm_delete().await?;
        }
        "cancel" => rater.cancel_delete().await,
        "dismiss" => rater.dismiss(),
        _ => println!("{}", HELP),
    }
    Ok(())
}

fn parse_id(raw: &str) -> Result<ArtworkId> {
    raw.parse::<ArtworkId>()
        .with_context(|| format!("invalid artwork id: {:?}", raw))
}

async fn print_list(rater: &ArtRater) {
    for view in rater.entries().await {
        println!("{}", describe(&view));
    }
}

fn describe(view: &EntryView) -> String {
    let body = if view.placeholder {
        "[no image]".to_string()
    } else {
        match view.metadata_state {
            MetadataState::Loaded => format!(
                "{} - {}",
                view.title.as_deref().unwrap_or_default(),
                view.artist_title.as_deref().unwrap_or_default()
            ),
            other => format!("[{}]", other.as_str()),
        }
    };
    let rating = view
        .selected_rating
        .map(|r| r.to_string())
        .unwrap_or_else(|| "-".into());
    let mut line = format!(
        "{:>7}  {}  rating={} status={}",
        view.id,
        body,
        rating,
        view.status.as_str()
    );
    if let Some(msg) = view.inline_message {
        line.push_str(&format!("  ({})", msg));
    }
    line
}
