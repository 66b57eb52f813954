//! Service Construction
//!
//! Builds the orchestrator and its collaborators from the loaded `Config`.

use crate::config::{ClassifierKind, Config};
use anyhow::{Context, Result};
use async_openai::config::OpenAIConfig;
use std::{collections::HashMap, fs, path::Path, sync::Arc};
use study_router_core::{
    Orchestrator, OrchestratorConfig,
    context::ContextWindow,
    intent::{IntentClassifier, KeywordClassifier, LlmIntentClassifier},
    llm_client::{LLMClient, OpenAICompatibleClient},
    prompts::PromptSet,
    responder::{ExamDetailedResponder, ResponderRegistry, SimpleExplainResponder},
    retrieval::{FirecrawlSearch, SearchTool},
};
use tracing::{info, warn};

const SEARCH_RESULT_LIMIT: usize = 5;

/// Loads every `*.md` file in `prompts_path`, keyed by file stem.
///
/// A missing directory is not an error; built-in templates are used instead.
pub fn load_prompts(prompts_path: &Path) -> Result<HashMap<String, String>> {
    let mut prompts = HashMap::new();
    if !prompts_path.is_dir() {
        warn!(path = %prompts_path.display(), "Prompts directory not found, using built-in prompts");
        return Ok(prompts);
    }
    for entry in fs::read_dir(prompts_path)? {
        let entry = entry?;
        let path = entry.path();
        if path.is_file() && path.extension().and_then(|s| s.to_str()) == Some("md") {
            let prompt_key = path
                .file_stem()
                .and_then(|s| s.to_str())
                .context("Could not get file stem")?
                .to_string();
            let content = fs::read_to_string(&path)
                .with_context(|| format!("Failed to read prompt {}", path.display()))?;
            prompts.insert(prompt_key, content);
        }
    }
    Ok(prompts)
}

/// Wires the text-generation client, retrieval tool, classifier and
/// responders into an `Orchestrator`.
pub fn build_orchestrator(config: &Config, prompts: PromptSet) -> Orchestrator {
    let openai_config = OpenAIConfig::new()
        .with_api_key(config.api_key.clone())
        .with_api_base(config.provider.api_base());
    let llm: Arc<dyn LLMClient> = Arc::new(OpenAICompatibleClient::new(
        openai_config,
        config.chat_model.clone(),
        config.temperature,
    ));

    let search: Option<Arc<dyn SearchTool>> = match &config.firecrawl_api_key {
        Some(key) => {
            info!("Retrieval enabled for exam answers.");
            Some(Arc::new(FirecrawlSearch::new(key.clone(), SEARCH_RESULT_LIMIT)))
        }
        None => {
            info!("FIRECRAWL_API_KEY not set; exam answers will not use retrieval.");
            None
        }
    };

    build_with(config, prompts, llm, search)
}

/// Same as `build_orchestrator`, with the external collaborators supplied.
pub fn build_with(
    config: &Config,
    prompts: PromptSet,
    llm: Arc<dyn LLMClient>,
    search: Option<Arc<dyn SearchTool>>,
) -> Orchestrator {
    let classifier: Arc<dyn IntentClassifier> = match config.classifier {
        ClassifierKind::Keyword => Arc::new(KeywordClassifier),
        ClassifierKind::Llm => Arc::new(LlmIntentClassifier::new(
            llm.clone(),
            prompts.intent_classifier.clone(),
        )),
    };

    let registry = ResponderRegistry::new(
        Arc::new(SimpleExplainResponder::new(
            llm.clone(),
            prompts.simple_explain.clone(),
        )),
        Arc::new(
            ExamDetailedResponder::new(llm, search, prompts.exam_detailed.clone())
                .with_max_tool_calls(config.max_tool_calls)
                .with_deadline(config.responder_timeout),
        ),
    );

    Orchestrator::new(
        classifier,
        registry,
        OrchestratorConfig {
            window: ContextWindow {
                max_turns: config.context_turns,
                ..ContextWindow::default()
            },
            clarifying_question: prompts.clarifying_question,
        },
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;

    #[test]
    fn test_load_prompts_reads_markdown_only() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(dir.path().join("simple_explain.md"), "Be gentle. {context}").unwrap();
        fs::write(dir.path().join("notes.txt"), "ignored").unwrap();

        let prompts = load_prompts(dir.path()).unwrap();
        assert_eq!(prompts.len(), 1);
        assert_eq!(prompts["simple_explain"], "Be gentle. {context}");

        let set = PromptSet::from_map(&prompts);
        assert_eq!(set.simple_explain, "Be gentle. {context}");
    }

    #[test]
    fn test_load_prompts_missing_dir_is_empty() {
        let prompts = load_prompts(Path::new("/definitely/not/here")).unwrap();
        assert!(prompts.is_empty());
    }
}
