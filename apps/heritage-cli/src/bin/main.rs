use anyhow::{bail, Result};
use clap::{Parser, Subcommand, ValueEnum};

use heritage_cli::{init, print_json};
use heritage_core::error::Error;
use heritage_core::types::{HeritageRecord, QueryIntent};
use heritage_rag::service::{GraphStatus, IndexStatus};
use heritage_rag::{HeritageService, SearchKind};

#[derive(Parser)]
#[command(name = "heritage", about = "Intangible cultural heritage question answering")]
struct Cli {
    /// Print machine-readable JSON instead of text
    #[arg(long, global = true)]
    json: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Answer a question from the knowledge graph and documents
    Ask {
        question: String,
        /// Skip the language model and list matches
        #[arg(long)]
        no_ai: bool,
    },
    /// Look items up by name, category or region
    Search {
        query: String,
        #[arg(long, value_enum, default_value_t = By::Name)]
        by: By,
    },
    /// Show one item and a few related ones
    Project { name: String },
    /// Graph totals
    Stats,
    /// Items per category
    Categories,
    /// Which capabilities are up
    Health,
}

#[derive(Clone, Copy, ValueEnum)]
enum By {
    Name,
    Category,
    Region,
}

impl From<By> for SearchKind {
    fn from(by: By) -> Self {
        match by {
            By::Name => SearchKind::Name,
            By::Category => SearchKind::Category,
            By::Region => SearchKind::Region,
        }
    }
}

fn graph_down(e: Error) -> anyhow::Error {
    if e.is_unavailable() {
        anyhow::anyhow!("知识图谱未连接")
    } else {
        e.into()
    }
}

fn describe(r: &HeritageRecord) -> String {
    let mut line = r.name.clone();
    let fields = [("类别", &r.category), ("地区", &r.region), ("保护单位", &r.organization)];
    for (label, value) in fields {
        if let Some(v) = value {
            line.push_str(&format!("  {}：{}", label, v));
        }
    }
    line
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    let settings = init()?;
    let service = HeritageService::from_settings(&settings).await?;

    match cli.command {
        Commands::Ask { question, no_ai } => {
            if question.trim().is_empty() {
                bail!("请提供消息内容");
            }
            let reply = service.chat(&question, !no_ai).await.map_err(graph_down)?;
            if cli.json {
                return print_json(&reply);
            }
            println!("{}", reply.answer);
            if !reply.sources.is_empty() {
                println!("\n📚 来源: {}", reply.sources.join("、"));
            }
            match &reply.intent {
                Some(QueryIntent::ByName(k)) => println!("🔎 意图: 名称 ({})", k),
                Some(QueryIntent::ByCategory(k)) => println!("🔎 意图: 类别 ({})", k),
                Some(QueryIntent::ByRegion(k)) => println!("🔎 意图: 地区 ({})", k),
                None => println!("🔎 意图: unknown"),
            }
        }
        Commands::Search { query, by } => {
            let found = service.search(&query, by.into()).await.map_err(graph_down)?;
            if cli.json {
                return print_json(&found);
            }
            println!("Found {} results for '{}'", found.count, found.query);
            for (i, r) in found.results.iter().enumerate() {
                println!("{:>3}. {}", i + 1, describe(r));
            }
        }
        Commands::Project { name } => {
            let detail = service.project(&name).await.map_err(graph_down)?;
            if cli.json {
                return print_json(&detail);
            }
            match &detail.project {
                Some(project) => {
                    println!("{}", describe(project));
                    if !detail.related.is_empty() {
                        println!("\n相关项目:");
                        for r in &detail.related {
                            println!("  - {}", describe(r));
                        }
                    }
                }
                None => println!("未找到项目 '{}'", name),
            }
        }
        Commands::Stats => {
            let stats = service.statistics().await.map_err(graph_down)?;
            if cli.json {
                return print_json(&stats);
            }
            println!("📊 项目总数: {}", stats.item_count);
            println!("   类别数: {}", stats.category_count);
            println!("   地区数: {}", stats.region_count);
            println!("   保护单位数: {}", stats.organization_count);
        }
        Commands::Categories => {
            let categories = service.categories().await.map_err(graph_down)?;
            if cli.json {
                return print_json(&categories);
            }
            for c in &categories {
                println!("{:<8} {:>6}", c.category, c.count);
            }
        }
        Commands::Health => {
            let health = service.health();
            if cli.json {
                return print_json(&health);
            }
            let graph = match health.knowledge_graph {
                GraphStatus::Connected => "✅ connected",
                GraphStatus::Disconnected => "❌ disconnected",
            };
            let index = match health.similarity_index {
                IndexStatus::Ready => "✅ ready",
                IndexStatus::NotReady => "⚠️  not ready",
            };
            let generator = if health.generator { "✅ configured" } else { "⚠️  not configured" };
            println!("knowledge graph:  {}", graph);
            println!("similarity index: {} ({} documents)", index, health.indexed_documents);
            println!("generator:        {}", generator);
        }
    }
    Ok(())
}
