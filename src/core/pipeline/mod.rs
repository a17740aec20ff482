//! Request-to-workflow pipeline: analyze, research, synthesize, normalize.

#![allow(clippy::result_large_err)]

use crate::core::analyzer::{AnalysisSource, RequestAnalyzer};
use crate::core::backend::{
    DisabledSearch, DuckDuckGoClient, GenerativeBackend, OpenRouterClient, SearchBackend,
};
use crate::core::config::{FlowsmithConfig, WorkflowDefaults};
use crate::core::entities::{IntentRecord, ResearchResult};
use crate::core::error::AppError;
use crate::core::prompt::PromptBuilder;
use crate::core::research::ResearchAggregator;
use crate::core::synthesizer::WorkflowSynthesizer;
use crate::core::types::WorkflowOrigin;
use crate::core::workflow::inspect::{dangling_references, InspectionReport};
use crate::core::workflow::{FallbackBuilder, GeneratedOutput, Normalizer, WorkflowDocument};
use serde::Serialize;
use serde_json::Value;
use std::sync::Arc;
use tracing::Instrument;

mod sink;

pub use sink::{FileSink, StdoutSink, WorkflowSink};

/// Output of the planning half of the pipeline.
#[derive(Debug, Clone, Serialize)]
pub struct Plan {
    pub explanation: String,
    pub intent: IntentRecord,
    pub research: Vec<ResearchResult>,
    pub analysis: AnalysisSource,
}

impl Plan {
    pub fn into_parts(self) -> (String, IntentRecord, Vec<ResearchResult>) {
        (self.explanation, self.intent, self.research)
    }
}

/// Delivered workflow plus how it was produced.
#[derive(Debug, Clone, Serialize)]
pub struct GenerationReport {
    pub document: WorkflowDocument,
    pub origin: WorkflowOrigin,
    pub explanation: String,
    pub confidence: u8,
}

pub struct WorkflowPipeline {
    analyzer: RequestAnalyzer,
    research: ResearchAggregator,
    synthesizer: WorkflowSynthesizer,
    defaults: WorkflowDefaults,
}

impl WorkflowPipeline {
    pub fn new(
        generator: Arc<dyn GenerativeBackend>,
        search: Arc<dyn SearchBackend>,
        config: &FlowsmithConfig,
    ) -> Self {
        let platform_term = config.workflow.platform_term.as_str();
        Self {
            analyzer: RequestAnalyzer::new(generator.clone()),
            research: ResearchAggregator::new(search, config.search.clone(), platform_term),
            synthesizer: WorkflowSynthesizer::new(generator, platform_term),
            defaults: config.workflow.clone(),
        }
    }

    /// Pipeline wired to the OpenRouter and DuckDuckGo clients.
    pub fn from_config(config: &FlowsmithConfig) -> Self {
        let generator: Arc<dyn GenerativeBackend> =
            Arc::new(OpenRouterClient::new(config.generation.clone()));
        let search: Arc<dyn SearchBackend> = if config.search.enabled {
            Arc::new(DuckDuckGoClient::new(config.search.clone()))
        } else {
            Arc::new(DisabledSearch)
        };
        Self::new(generator, search, config)
    }

    /// Analyze the request and gather research. Never fails.
    pub async fn plan(&self, text: &str) -> Plan {
        let span = tracing::info_span!("plan", request_chars = text.len());
        async {
            let analysis = self.analyzer.analyze_detailed(text).await;
            tracing::info!(
                source = ?analysis.source,
                trigger = %analysis.record.trigger_type,
                services = ?analysis.record.services_needed,
                "request analyzed"
            );
            let research = self.research.research(&analysis.record).await;
            let explanation = plan_explanation(&analysis.record, &research, analysis.source);
            Plan {
                explanation,
                intent: analysis.record,
                research,
                analysis: analysis.source,
            }
        }
        .instrument(span)
        .await
    }

    /// Always returns a structurally valid document.
    pub async fn generate(&self, intent: &IntentRecord, research: &[ResearchResult]) -> WorkflowDocument {
        self.generate_with_hints(intent, research, &[]).await.document
    }

    pub async fn generate_with_hints(
        &self,
        intent: &IntentRecord,
        research: &[ResearchResult],
        examples: &[Value],
    ) -> GenerationReport {
        let span = tracing::info_span!("generate", services = intent.services_needed.len());
        async {
            let normalizer =
                Normalizer::new(self.defaults.clone()).with_default_name(intent.workflow_name());
            let example = PromptBuilder::select_example(intent, examples);

            let (document, origin) = match self.synthesizer.synthesize(intent, research, example).await {
                Ok(raw) => {
                    let output = GeneratedOutput::from_text(&raw);
                    if output.is_parsed() {
                        self.integrity_gate(normalizer.normalize(output), &normalizer)
                    } else {
                        tracing::warn!("generated workflow was not a JSON object, using minimal workflow");
                        (self.minimal(&normalizer), WorkflowOrigin::Fallback)
                    }
                }
                Err(err) => {
                    tracing::warn!(category = %err.category(), error = %err, "workflow synthesis failed, using minimal workflow");
                    (self.minimal(&normalizer), WorkflowOrigin::Fallback)
                }
            };

            let confidence = confidence(intent, research, self.synthesizer.is_available());
            let explanation = generation_explanation(&document, origin, confidence);
            tracing::info!(
                origin = %origin,
                nodes = document.nodes.len(),
                confidence,
                "workflow ready"
            );
            GenerationReport {
                document,
                origin,
                explanation,
                confidence,
            }
        }
        .instrument(span)
        .await
    }

    /// Plan, generate and hand the result to `sink`.
    pub async fn run(
        &self,
        text: &str,
        examples: &[Value],
        sink: &dyn WorkflowSink,
    ) -> Result<GenerationReport, AppError> {
        let plan = self.plan(text).await;
        let report = self
            .generate_with_hints(&plan.intent, &plan.research, examples)
            .await;
        let explanation = format!("{}\n{}", plan.explanation, report.explanation);
        sink.deliver(&report.document, &explanation)?;
        Ok(report)
    }

    fn minimal(&self, normalizer: &Normalizer) -> WorkflowDocument {
        FallbackBuilder::new(normalizer.defaults().clone()).build_minimal()
    }

    /// Documents without nodes or with connections to unknown nodes are
    /// replaced by the minimal workflow.
    fn integrity_gate(
        &self,
        document: WorkflowDocument,
        normalizer: &Normalizer,
    ) -> (WorkflowDocument, WorkflowOrigin) {
        if document.nodes.is_empty() {
            tracing::warn!("generated workflow has no nodes, using minimal workflow");
            return (self.minimal(normalizer), WorkflowOrigin::Fallback);
        }
        let dangling = dangling_references(&document);
        if !dangling.is_empty() {
            tracing::warn!(dangling = dangling.len(), "generated workflow has dangling connections, using minimal workflow");
            return (self.minimal(normalizer), WorkflowOrigin::Fallback);
        }
        (document, WorkflowOrigin::Generated)
    }
}

/// Heuristic confidence in the delivered workflow, 0..=100.
pub fn confidence(intent: &IntentRecord, research: &[ResearchResult], generation_available: bool) -> u8 {
    let mut score: u32 = 60;
    if !research.is_empty() {
        score += (research.len() as u32 * 8).min(25);
        let best = research.iter().map(|r| r.relevance_score).max().unwrap_or(0);
        if best > 10 {
            score += 10;
        } else if best > 5 {
            score += 5;
        }
    }
    if !intent.services_needed.is_empty() {
        score += 5;
    }
    if intent.services_needed.len() > 1 {
        score += 5;
    }
    if !intent.custom_requirements.is_empty() {
        score += 5;
    }
    if !intent.business_rules.is_empty() {
        score += 5;
    }
    if generation_available && !research.is_empty() {
        score += 10;
    }
    score.min(100) as u8
}

fn plan_explanation(intent: &IntentRecord, research: &[ResearchResult], source: AnalysisSource) -> String {
    let mut out = String::from("Automation plan\n");
    out.push_str(&format!("Goal: {}\n", intent.intent.trim()));
    out.push_str(&format!("Trigger: {}\n", intent.trigger_type));
    out.push_str(&format!("Services: {}\n", intent.services_needed.join(", ")));
    out.push_str(&format!("Data flow: {}\n", intent.data_flow));
    for rule in &intent.business_rules {
        out.push_str(&format!("Rule: {}\n", rule));
    }
    out.push_str(&format!(
        "Analysis: {}\n",
        match source {
            AnalysisSource::Generated => "generated",
            AnalysisSource::Heuristic => "heuristic",
        }
    ));
    if research.is_empty() {
        out.push_str("Research: no relevant results\n");
    } else {
        out.push_str(&format!("Research: {} relevant results\n", research.len()));
        for (i, result) in research.iter().enumerate() {
            out.push_str(&format!(
                "  {}. {} ({}) {}\n",
                i + 1,
                result.title,
                result.relevance_score,
                result.url
            ));
        }
    }
    out
}

fn generation_explanation(document: &WorkflowDocument, origin: WorkflowOrigin, confidence: u8) -> String {
    let report = InspectionReport::build(document);
    let mut out = match origin {
        WorkflowOrigin::Generated => format!("Generated workflow \"{}\"\n", document.name),
        WorkflowOrigin::Fallback => format!(
            "Generation was unavailable; delivered the minimal workflow \"{}\"\n",
            document.name
        ),
    };
    out.push_str(&format!(
        "Nodes: {}, connections: {}, confidence: {}%\n",
        report.stats.total_nodes, report.stats.total_connections, confidence
    ));
    if !report.required_env_vars.is_empty() {
        out.push_str(&format!(
            "Environment variables: {}\n",
            report.required_env_vars.join(", ")
        ));
    }
    if !report.credentials.is_empty() {
        out.push_str(&format!("Credentials to configure: {}\n", report.credentials.join(", ")));
    }
    out
}
