use std::path::PathBuf;
use std::sync::Arc;

use clap::{Parser, Subcommand};
use taskmesh::cli::{render_agents, render_response, render_stats};
use taskmesh::utils::LoggingConfig;
use taskmesh::{Marketplace, Orchestrator, OrchestratorConfig, SearchQuery};

#[derive(Parser)]
#[command(name = "taskmesh", version, about = "Task orchestration CLI", author)]
struct Cli {
    /// JSON 配置文件；环境变量 TASKMESH_* 会覆盖其中的值
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// 运行一条自然语言请求
    Run {
        prompt: String,
        /// 输出完整的 JSON 结果
        #[arg(long)]
        json: bool,
    },
    /// 列出注册表中的 Agent
    Agents {
        #[arg(long)]
        category: Option<String>,
    },
    Stats,
    Search {
        query: String,
        #[arg(long)]
        capability: Option<String>,
        #[arg(long)]
        min_rating: Option<f64>,
    },
}

fn load_config(path: Option<PathBuf>) -> anyhow::Result<OrchestratorConfig> {
    let base = match path {
        Some(path) => OrchestratorConfig::from_json_file(path)?,
        None => OrchestratorConfig::default(),
    };
    Ok(base.overlay_env()?)
}

#[cfg(feature = "openai-client")]
fn attach_llm(
    orchestrator: Orchestrator,
    config: &OrchestratorConfig,
) -> anyhow::Result<Orchestrator> {
    use taskmesh::llm::OpenAiClient;

    let Some(settings) = &config.llm else {
        return Ok(orchestrator);
    };
    let api_key = settings.resolve_api_key()?;
    let client = OpenAiClient::with_base_url(
        settings.base_url.clone(),
        api_key,
        settings.model.clone(),
    );
    Ok(orchestrator.with_llm(Arc::new(client)))
}

#[cfg(not(feature = "openai-client"))]
fn attach_llm(
    orchestrator: Orchestrator,
    config: &OrchestratorConfig,
) -> anyhow::Result<Orchestrator> {
    if config.llm.is_some() {
        tracing::warn!("llm settings present but the `openai-client` feature is disabled");
    }
    Ok(orchestrator)
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    LoggingConfig::init();

    let cli = Cli::parse();
    let config = load_config(cli.config)?;
    let orchestrator = Orchestrator::new(Arc::new(Marketplace::default())).with_config(config.clone());
    let orchestrator = attach_llm(orchestrator, &config)?;

    match cli.command {
        Command::Run { prompt, json } => {
            let response = orchestrator.process_prompt(&prompt).await;
            if json {
                println!("{}", serde_json::to_string_pretty(&response)?);
            } else {
                print!("{}", render_response(&response));
            }
            if !response.success {
                std::process::exit(1);
            }
        }
        Command::Agents { category } => {
            print!("{}", render_agents(&orchestrator.list_agents(category.as_deref())));
        }
        Command::Stats => {
            print!("{}", render_stats(&orchestrator.marketplace_stats()));
        }
        Command::Search {
            query,
            capability,
            min_rating,
        } => {
            let mut search = SearchQuery::new(query);
            if let Some(capability) = capability {
                search = search.with_capability(capability);
            }
            if let Some(min_rating) = min_rating {
                search = search.with_min_rating(min_rating);
            }
            print!("{}", render_agents(&orchestrator.search_agents(&search).await?));
        }
    }
    Ok(())
}
