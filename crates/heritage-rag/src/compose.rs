use std::time::Duration;

use tracing::{error, info};

use heritage_core::traits::Generator;
use heritage_core::types::{Answer, RetrievalResult};

/// Graph records shown in context, answers and sources.
pub const MAX_LISTED: usize = 5;
/// Documents at or below this score stay out of the context.
pub const MIN_DOCUMENT_SCORE: f32 = 0.5;
const EXCERPT_CHARS: usize = 500;
const UNKNOWN: &str = "未知";

pub const GENERATION_APOLOGY: &str = "抱歉，生成回答时出现错误。";

pub fn not_found_message(query: &str) -> String {
    format!("抱歉，未找到与'{}'相关的非遗信息。", query)
}

/// Render retrieval evidence as the reference block of the prompt.
pub fn build_context(retrieval: &RetrievalResult) -> String {
    let graph_lines: Vec<String> = retrieval.graph_results.iter().take(MAX_LISTED)
        .map(|r| format!(
            "- {}: 类别={}，地区={}",
            r.name,
            r.category.as_deref().unwrap_or(UNKNOWN),
            r.region.as_deref().unwrap_or(UNKNOWN)
        ))
        .collect();
    let document_lines: Vec<String> = retrieval.vector_results.iter()
        .filter(|hit| hit.score > MIN_DOCUMENT_SCORE)
        .map(|hit| {
            let excerpt: String = hit.document.content.chars().take(EXCERPT_CHARS).collect();
            format!("- {}: {}...", hit.document.title, excerpt)
        })
        .collect();

    let mut sections = Vec::new();
    if !graph_lines.is_empty() {
        sections.push(format!("【知识图谱信息】\n{}", graph_lines.join("\n")));
    }
    if !document_lines.is_empty() {
        sections.push(format!("【相关文档】\n{}", document_lines.join("\n")));
    }
    sections.join("\n\n")
}

pub fn build_prompt(context: &str, query: &str) -> String {
    format!(
        "你是一位中国非物质文化遗产专家，请根据以下参考信息回答用户问题。\n\n\
         参考信息：\n{}\n\n\
         用户问题：{}\n\n\
         请给出准确、专业的回答，如果参考信息不足，请诚实说明。",
        context, query
    )
}

fn sources(retrieval: &RetrievalResult) -> Vec<String> {
    retrieval.graph_results.iter().take(MAX_LISTED).map(|r| r.name.clone()).collect()
}

/// Deterministic answer listing graph hits.
///
/// With document hits but no graph hits the answer text is empty.
pub fn template_answer(retrieval: &RetrievalResult) -> Answer {
    if retrieval.is_empty() {
        return Answer { answer: not_found_message(&retrieval.query), sources: Vec::new() };
    }
    let mut lines = Vec::new();
    if !retrieval.graph_results.is_empty() {
        lines.push(format!("找到 {} 个相关非遗项目：", retrieval.graph_results.len()));
        lines.extend(retrieval.graph_results.iter().take(MAX_LISTED).map(|r| {
            format!("• **{}** ({})", r.name, r.category.as_deref().unwrap_or_default())
        }));
    }
    Answer { answer: lines.join("\n"), sources: sources(retrieval) }
}

/// Turn retrieval evidence into an answer.
///
/// Without a generator the answer is [`template_answer`]. With one, the
/// generated text is returned as is; a failed or timed-out call yields
/// [`GENERATION_APOLOGY`] and no sources.
pub async fn compose(
    retrieval: &RetrievalResult,
    generator: Option<&dyn Generator>,
    timeout: Duration,
) -> Answer {
    let Some(generator) = generator else { return template_answer(retrieval) };

    let prompt = build_prompt(&build_context(retrieval), &retrieval.query);
    match generate_within(generator, &prompt, timeout).await {
        Some(text) => Answer { answer: text, sources: sources(retrieval) },
        None => Answer { answer: GENERATION_APOLOGY.to_string(), sources: Vec::new() },
    }
}

/// Run one generation under `timeout`, logging any failure.
pub async fn generate_within(
    generator: &dyn Generator,
    prompt: &str,
    timeout: Duration,
) -> Option<String> {
    match tokio::time::timeout(timeout, generator.generate(prompt)).await {
        Ok(Ok(text)) => {
            info!(chars = text.chars().count(), "generated answer");
            Some(text)
        }
        Ok(Err(e)) => {
            error!(error = %e, "generation failed");
            None
        }
        Err(_) => {
            error!(secs = timeout.as_secs(), "generation timed out");
            None
        }
    }
}
