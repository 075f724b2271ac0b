use std::path::PathBuf;
use std::time::Duration;

use anyhow::{anyhow, Result};
use clap::Parser;

use heritage_cli::init;
use heritage_llm::{ChatClient, IntroBatch, RESEARCHER_SYSTEM_PROMPT};

/// Generate project introductions for the national list with the LLM.
#[derive(Parser)]
#[command(name = "heritage-intro-gen")]
struct Args {
    /// National list CSV (名称/类别/申报地区/保护单位 columns)
    csv: PathBuf,
    /// Output JSON; existing records are kept and skipped
    output: PathBuf,
    /// Generate at most this many new introductions
    #[arg(long)]
    limit: Option<usize>,
    /// Pause between requests
    #[arg(long, default_value_t = 1000)]
    delay_ms: u64,
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();
    let settings = init()?;
    let key = settings.llm_api_key()
        .ok_or_else(|| anyhow!("请设置环境变量 QWEN_API_KEY 或 DASHSCOPE_API_KEY"))?;
    let client = ChatClient::new(&settings.llm, key)?.with_system_prompt(RESEARCHER_SYSTEM_PROMPT);

    let summary = IntroBatch::new(&client, client.model())
        .limit(args.limit)
        .delay(Duration::from_millis(args.delay_ms))
        .run(&args.csv, &args.output)
        .await?;

    println!(
        "✅ Generated {} introductions ({} failed); {} records in {}",
        summary.generated, summary.failed, summary.total, args.output.display()
    );
    Ok(())
}
