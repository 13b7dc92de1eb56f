use std::sync::Arc;

use anyhow::{Result, bail};
use tracing::Level;
use tracing_subscriber::FmtSubscriber;

use crate::core::config::Config;
use crate::core::llm::LlmRouter;
use crate::core::runner::MeetingRunner;
use crate::core::store::{MeetingStore, seed::seed_examples};
use crate::core::terminal::{self, GuideSection};
use crate::interfaces::web::{AppState, serve};

fn print_help() {
    terminal::print_banner();

    GuideSection::new("Core")
        .command("serve", "Start the HTTP API server")
        .command("chat", "Run a single prompt against a stored agent")
        .print();

    GuideSection::new("Setup")
        .command("seed", "Load example styles, agents, and workflows")
        .print();

    println!(" Usage: quorum <command> [flags]\n");
}

pub async fn run_main() -> Result<()> {
    let subscriber = FmtSubscriber::builder()
        .with_max_level(Level::INFO)
        .finish();
    tracing::subscriber::set_global_default(subscriber).ok();

    let args: Vec<String> = std::env::args().collect();
    match args.get(1).map(String::as_str) {
        Some("serve") => cmd_serve(&args).await,
        Some("seed") => cmd_seed().await,
        Some("chat") => cmd_chat(&args).await,
        Some("help") | None => {
            print_help();
            Ok(())
        }
        Some(other) => {
            print_help();
            bail!("Unknown command: {other}");
        }
    }
}

pub(crate) fn parse_serve_flags(
    args: &[String],
    start: usize,
    mut host: String,
    mut port: u16,
) -> (String, u16) {
    let mut i = start;
    while i < args.len() {
        match args[i].as_str() {
            "--host" => {
                if i + 1 < args.len() {
                    host = args[i + 1].clone();
                    i += 2;
                } else {
                    i += 1;
                }
            }
            "--port" => {
                if i + 1 < args.len() {
                    if let Ok(p) = args[i + 1].parse() {
                        port = p;
                    }
                    i += 2;
                } else {
                    i += 1;
                }
            }
            _ => i += 1,
        }
    }
    (host, port)
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct ChatCommandArgs {
    pub agent: String,
    pub prompt: String,
}

pub(crate) fn parse_chat_args(args: &[String], start: usize) -> ChatCommandArgs {
    let mut agent = String::new();
    let mut prompt = String::new();
    let mut i = start;
    while i < args.len() {
        match args[i].as_str() {
            "--agent" | "-a" => {
                if i + 1 < args.len() {
                    agent = args[i + 1].clone();
                    i += 2;
                } else {
                    i += 1;
                }
            }
            "--prompt" | "-p" => {
                if i + 1 < args.len() {
                    prompt = args[i + 1].clone();
                    i += 2;
                } else {
                    i += 1;
                }
            }
            _ => i += 1,
        }
    }
    ChatCommandArgs { agent, prompt }
}

async fn build_runner(config: &Config) -> Result<(Arc<MeetingStore>, Arc<MeetingRunner>)> {
    let store = Arc::new(MeetingStore::open(config.db_path()).await?);
    let router = LlmRouter::from_config(config);
    if router.list_providers().is_empty() {
        terminal::print_warn(
            "No provider API keys configured; model calls will fail until one is set",
        );
    }
    let runner = Arc::new(MeetingRunner::new(Arc::clone(&store), Arc::new(router)));
    Ok((store, runner))
}

async fn cmd_serve(args: &[String]) -> Result<()> {
    let config = Config::load()?;
    let (host, port) = parse_serve_flags(
        args,
        2,
        config.server.host.clone(),
        config.server.port,
    );

    let (store, runner) = build_runner(&config).await?;

    terminal::print_banner();
    terminal::print_link("API", &format!("http://{host}:{port}"));
    serve(&host, port, AppState::new(store, runner)).await
}

async fn cmd_seed() -> Result<()> {
    let config = Config::load()?;
    let store = MeetingStore::open(config.db_path()).await?;
    if seed_examples(&store).await? {
        terminal::print_success("Seeded example styles, agents, and workflows");
    } else {
        terminal::print_info("Store already seeded, nothing to do");
    }
    Ok(())
}

async fn cmd_chat(args: &[String]) -> Result<()> {
    let chat_args = parse_chat_args(args, 2);
    if chat_args.agent.is_empty() || chat_args.prompt.is_empty() {
        bail!("Usage: quorum chat --agent <agent id> --prompt <text>");
    }

    let config = Config::load()?;
    let (store, runner) = build_runner(&config).await?;
    let Some(agent) = store.get_agent(&chat_args.agent).await? else {
        bail!("Agent not found: {}", chat_args.agent);
    };

    terminal::print_status("Agent", &format!("{} ({})", agent.name, agent.model));
    let completion = runner
        .one_shot_chat(&agent, &chat_args.prompt, None)
        .await?;
    println!("{}", completion.text);
    Ok(())
}
