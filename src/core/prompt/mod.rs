use crate::core::entities::{truncate_chars, IntentRecord, ResearchResult};
use serde_json::Value;

/// Top-level fields every generated workflow must contain.
pub const REQUIRED_WORKFLOW_FIELDS: &[&str] = &[
    "meta",
    "active",
    "connections",
    "createdAt",
    "updatedAt",
    "id",
    "name",
    "nodes",
    "pinData",
    "settings",
    "staticData",
    "tags",
    "triggerCount",
    "versionId",
];

const MAX_DIGEST_RESULTS: usize = 3;
const DIGEST_SNIPPET_CHARS: usize = 150;
const EXAMPLE_CHARS: usize = 1500;

const JSON_ONLY_INSTRUCTION: &str =
    "Respond with a single JSON object only. Do not add explanations or markdown.";

/// Constructs the prompts sent to the generative backend.
pub struct PromptBuilder;

impl PromptBuilder {
    /// Prompt asking the backend to turn a request into an intent record.
    pub fn analysis_prompt(request: &str) -> String {
        let mut prompt = String::from("# Automation Request\n\n");
        prompt.push_str(request.trim());
        prompt.push_str("\n\n## Task\n\n");
        prompt.push_str(
            "Analyze the request and describe the automation it needs. Return a JSON object with these fields:\n",
        );
        prompt.push_str("- intent: one-sentence summary of the goal\n");
        prompt.push_str("- triggerType: one of webhook, schedule, email, manual\n");
        prompt.push_str("- servicesNeeded: list of service identifiers such as google-sheets, slack, gmail, http-request\n");
        prompt.push_str("- dataFlow: how data moves between the services\n");
        prompt.push_str("- businessRules: list of conditions or rules\n");
        prompt.push_str("- customRequirements: object of any other specifics\n");
        prompt.push_str("- complexity: one of simple, medium, complex\n");
        prompt.push_str("- searchKeywords: up to 5 keywords for finding similar workflows\n");
        prompt.push_str("- similarUseCases: list of comparable automations\n\n");
        prompt.push_str(JSON_ONLY_INSTRUCTION);
        prompt.push('\n');
        prompt
    }

    /// Prompt asking the backend for a complete workflow document.
    pub fn generation_prompt(
        intent: &IntentRecord,
        research: &[ResearchResult],
        example: Option<&Value>,
        platform_term: &str,
    ) -> String {
        let mut prompt = format!(
            "# Task\n\nCreate a complete {} workflow JSON document for the requirements below.\n\n",
            platform_term
        );

        prompt.push_str("## Requirements\n\n");
        let intent_json = serde_json::to_string_pretty(intent).unwrap_or_else(|_| intent.intent.clone());
        prompt.push_str(&intent_json);
        prompt.push_str("\n\n");

        let digest = Self::research_digest(research);
        if !digest.is_empty() {
            prompt.push_str("## Research\n\n");
            prompt.push_str(&digest);
            prompt.push('\n');
        }

        if let Some(example) = example {
            if let Ok(text) = serde_json::to_string(example) {
                prompt.push_str("## Reference Workflow\n\n");
                prompt.push_str(&truncate_chars(&text, EXAMPLE_CHARS));
                prompt.push_str("\n\n");
            }
        }

        prompt.push_str("## Output Rules\n\n");
        prompt.push_str("The JSON object must contain every one of these top-level fields: ");
        prompt.push_str(&REQUIRED_WORKFLOW_FIELDS.join(", "));
        prompt.push_str(".\n");
        prompt.push_str("Each node needs id, name, type, typeVersion, parameters and position.\n");
        prompt.push_str("Connections map a source node to {\"main\": [[{\"node\": target, \"type\": \"main\", \"index\": 0}]]}.\n");
        prompt.push_str("Use {{$env.NAME}} expressions for secrets and identifiers.\n\n");
        prompt.push_str(JSON_ONLY_INSTRUCTION);
        prompt.push('\n');
        prompt
    }

    /// Numbered digest of the top results with shortened snippets.
    pub fn research_digest(research: &[ResearchResult]) -> String {
        research
            .iter()
            .take(MAX_DIGEST_RESULTS)
            .enumerate()
            .map(|(i, result)| {
                format!(
                    "{}. {}: {}\n",
                    i + 1,
                    result.title,
                    truncate_chars(&result.snippet, DIGEST_SNIPPET_CHARS)
                )
            })
            .collect()
    }

    /// Pick the example sharing the most services and keywords with the
    /// intent. Ties keep the earlier example.
    pub fn select_example<'a>(intent: &IntentRecord, examples: &'a [Value]) -> Option<&'a Value> {
        let terms: Vec<String> = intent
            .services_needed
            .iter()
            .chain(intent.search_keywords.iter())
            .map(|term| term.to_lowercase())
            .collect();

        let mut best: Option<(usize, &Value)> = None;
        for example in examples {
            let text = example.to_string().to_lowercase();
            let score = terms.iter().filter(|term| text.contains(term.as_str())).count();
            if best.map_or(true, |(best_score, _)| score > best_score) {
                best = Some((score, example));
            }
        }
        best.map(|(_, example)| example)
    }
}
