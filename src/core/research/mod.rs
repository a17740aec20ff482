use crate::core::backend::{SearchBackend, SearchHit};
use crate::core::config::validation::{MAX_RESEARCH_RESULTS, MAX_SEARCH_QUERIES, MIN_RELEVANCE_SCORE};
use crate::core::config::SearchConfig;
use crate::core::entities::{truncate_chars, IntentRecord, ResearchResult};
use crate::core::error::StageError;
use std::collections::HashSet;
use std::sync::Arc;

const MAX_QUERIES: usize = 5;
const QUERY_INTENT_CHARS: usize = 60;

const KEYWORD_WEIGHT: u32 = 2;
const SERVICE_WEIGHT: u32 = 3;
const PLATFORM_BONUS: u32 = 5;
const WORKFLOW_BONUS: u32 = 2;

/// Queries an external search service and ranks hits against an intent.
pub struct ResearchAggregator {
    backend: Arc<dyn SearchBackend>,
    config: SearchConfig,
    platform_term: String,
}

impl ResearchAggregator {
    pub fn new(backend: Arc<dyn SearchBackend>, config: SearchConfig, platform_term: &str) -> Self {
        Self {
            backend,
            config,
            platform_term: platform_term.to_lowercase(),
        }
    }

    /// Run up to `max_queries` searches one after another and return the
    /// ranked, filtered results. Failed searches contribute nothing.
    /// Limits above the hard caps are clamped even for unvalidated configs.
    pub async fn research(&self, intent: &IntentRecord) -> Vec<ResearchResult> {
        if !self.config.enabled {
            tracing::debug!("research disabled");
            return Vec::new();
        }

        let queries = derive_queries(intent, &self.platform_term);
        let query_limit = self.config.max_queries.min(MAX_SEARCH_QUERIES);
        let mut hits = Vec::new();
        for (i, query) in queries.iter().take(query_limit).enumerate() {
            if i > 0 && !self.config.query_delay().is_zero() {
                tokio::time::sleep(self.config.query_delay()).await;
            }
            match self.search_once(query).await {
                Ok(found) => {
                    tracing::debug!(query = %query, hits = found.len(), "search completed");
                    hits.extend(found);
                }
                Err(err) => {
                    tracing::warn!(query = %query, error = %err, "search failed, skipping query");
                }
            }
        }

        let results = rank_hits(
            hits,
            intent,
            &self.platform_term,
            self.config.min_score,
            self.config.max_results.min(MAX_RESEARCH_RESULTS),
        );
        tracing::info!(
            backend = self.backend.backend_name(),
            results = results.len(),
            "research finished"
        );
        results
    }

    async fn search_once(&self, query: &str) -> Result<Vec<SearchHit>, StageError> {
        match tokio::time::timeout(self.config.timeout(), self.backend.search(query)).await {
            Ok(result) => result,
            Err(_) => Err(StageError::SearchFailure(format!(
                "search timed out after {}s",
                self.config.timeout_seconds
            ))),
        }
    }
}

/// Templated queries: product, intent, integration, generic, tutorial.
pub fn derive_queries(intent: &IntentRecord, platform_term: &str) -> Vec<String> {
    let services = intent.services_needed.join(" ");
    let keywords = intent.search_keywords.join(" ");
    let first_service = intent.services_needed.first().map(String::as_str).unwrap_or("");

    let candidates = [
        format!("{} {} workflow", platform_term, services),
        format!(
            "{} {}",
            platform_term,
            truncate_chars(intent.intent.trim(), QUERY_INTENT_CHARS)
        ),
        format!("{} integration automation", services),
        format!("{} automation", keywords),
        format!("{} {} tutorial", platform_term, first_service),
    ];

    let mut seen = HashSet::new();
    candidates
        .into_iter()
        .map(|q| q.split_whitespace().collect::<Vec<_>>().join(" "))
        .filter(|q| !q.is_empty() && seen.insert(q.clone()))
        .take(MAX_QUERIES)
        .collect()
}

/// Relevance of one hit, computed over its lowercased title and snippet.
pub fn score_hit(hit: &SearchHit, intent: &IntentRecord, platform_term: &str) -> u32 {
    let text = format!("{} {}", hit.title, hit.snippet).to_lowercase();

    let keywords = intent
        .search_keywords
        .iter()
        .filter(|k| !k.is_empty() && text.contains(&k.to_lowercase()))
        .count() as u32;

    let services = intent
        .services_needed
        .iter()
        .filter(|s| {
            let service = s.to_lowercase();
            text.contains(&service) || text.contains(&service.replace('-', " "))
        })
        .count() as u32;

    let mut score = KEYWORD_WEIGHT * keywords + SERVICE_WEIGHT * services;
    if !platform_term.is_empty() && text.contains(&platform_term.to_lowercase()) {
        score += PLATFORM_BONUS;
    }
    if text.contains("workflow") {
        score += WORKFLOW_BONUS;
    }
    score
}

/// Score, drop results at or below `min_score` (never below the relevance
/// floor), sort descending, drop repeated URLs and keep the best `max_results`.
pub fn rank_hits(
    hits: Vec<SearchHit>,
    intent: &IntentRecord,
    platform_term: &str,
    min_score: u32,
    max_results: usize,
) -> Vec<ResearchResult> {
    let min_score = min_score.max(MIN_RELEVANCE_SCORE);
    let mut scored: Vec<ResearchResult> = hits
        .into_iter()
        .filter_map(|hit| {
            let score = score_hit(&hit, intent, platform_term);
            (score > min_score).then(|| ResearchResult::new(&hit.title, &hit.url, &hit.snippet, score))
        })
        .collect();
    scored.sort_by(|a, b| b.relevance_score.cmp(&a.relevance_score));

    let mut seen = HashSet::new();
    scored
        .into_iter()
        .filter(|result| seen.insert(result.url.clone()))
        .take(max_results)
        .collect()
}
