use super::{SearchBackend, SearchHit};
use crate::core::config::SearchConfig;
use crate::core::error::StageError;
use async_trait::async_trait;
use reqwest::StatusCode;
use serde::Deserialize;

#[derive(Debug, Deserialize)]
struct InstantAnswer {
    #[serde(rename = "RelatedTopics", default)]
    related_topics: Vec<RelatedTopic>,
}

/// Either a plain topic or a named group of topics.
#[derive(Debug, Deserialize)]
struct RelatedTopic {
    #[serde(rename = "Text")]
    text: Option<String>,
    #[serde(rename = "FirstURL")]
    first_url: Option<String>,
    #[serde(rename = "Topics", default)]
    topics: Vec<RelatedTopic>,
}

fn flatten_topics(topics: Vec<RelatedTopic>, out: &mut Vec<SearchHit>) {
    for topic in topics {
        if let (Some(text), Some(url)) = (topic.text, topic.first_url) {
            if !text.trim().is_empty() && !url.trim().is_empty() {
                let title = text
                    .split(" - ")
                    .next()
                    .unwrap_or(text.as_str())
                    .trim()
                    .to_string();
                out.push(SearchHit {
                    title,
                    url,
                    snippet: text,
                });
            }
        }
        flatten_topics(topic.topics, out);
    }
}

/// Parse an instant-answer body into hits, flattening topic groups.
pub fn parse_instant_answer(body: &str) -> Result<Vec<SearchHit>, StageError> {
    let answer: InstantAnswer =
        serde_json::from_str(body).map_err(|e| StageError::SearchFailure(e.to_string()))?;
    let mut hits = Vec::new();
    flatten_topics(answer.related_topics, &mut hits);
    Ok(hits)
}

/// DuckDuckGo instant-answer compatible search client.
pub struct DuckDuckGoClient {
    config: SearchConfig,
    client: reqwest::Client,
}

impl DuckDuckGoClient {
    pub fn new(config: SearchConfig) -> Self {
        Self {
            config,
            client: reqwest::Client::new(),
        }
    }
}

#[async_trait]
impl SearchBackend for DuckDuckGoClient {
    fn backend_name(&self) -> &'static str {
        "duckduckgo"
    }

    async fn search(&self, query: &str) -> Result<Vec<SearchHit>, StageError> {
        let response = self
            .client
            .get(&self.config.endpoint)
            .query(&[
                ("q", query),
                ("format", "json"),
                ("no_redirect", "1"),
                ("no_html", "1"),
            ])
            .timeout(self.config.timeout())
            .send()
            .await
            .map_err(|e| StageError::SearchFailure(e.to_string()))?;

        let status = response.status();
        if status != StatusCode::OK {
            return Err(StageError::SearchFailure(format!(
                "server returned status: {}",
                status
            )));
        }

        let body = response
            .text()
            .await
            .map_err(|e| StageError::SearchFailure(e.to_string()))?;
        parse_instant_answer(&body)
    }
}
