use crate::github::RepositoryMetadata;
use crate::llm::LlmClient;
use crate::prompts;
use serde::de::Deserializer;
use serde::ser::{SerializeMap, Serializer};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;
use tracing::{info, warn};

/// Stored for every kind when no completion credentials are configured
pub const API_KEY_MISSING: &str = "OpenAI API key not set. Analysis not available.";
/// Stored for a kind whose completion call failed
pub const ANALYSIS_FAILED: &str = "Analysis failed. See server logs for details.";

/// Category of generated text
///
/// Declaration order is the order of the command-line report.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AnalysisKind {
    Overview,
    TechnicalAnalysis,
    ActionableInsights,
    MetadataAnalysis,
    TaggingFramework,
    CreativeRepurposing,
    SpeculativeIntegration,
    CrossDisciplinaryInnovation,
    DependencyAnalysis,
    CodeQuality,
    SecurityReview,
}

impl AnalysisKind {
    /// Kinds generated for every stored project, in generation order
    pub const PROJECT: [AnalysisKind; 6] = [
        AnalysisKind::Overview,
        AnalysisKind::TechnicalAnalysis,
        AnalysisKind::ActionableInsights,
        AnalysisKind::DependencyAnalysis,
        AnalysisKind::CodeQuality,
        AnalysisKind::SecurityReview,
    ];

    /// Kinds generated by the full command-line report
    pub const REPORT: [AnalysisKind; 11] = [
        AnalysisKind::Overview,
        AnalysisKind::TechnicalAnalysis,
        AnalysisKind::ActionableInsights,
        AnalysisKind::MetadataAnalysis,
        AnalysisKind::TaggingFramework,
        AnalysisKind::CreativeRepurposing,
        AnalysisKind::SpeculativeIntegration,
        AnalysisKind::CrossDisciplinaryInnovation,
        AnalysisKind::DependencyAnalysis,
        AnalysisKind::CodeQuality,
        AnalysisKind::SecurityReview,
    ];

    /// Key used in stored documents
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Overview => "overview",
            Self::TechnicalAnalysis => "technical_analysis",
            Self::ActionableInsights => "actionable_insights",
            Self::MetadataAnalysis => "metadata_analysis",
            Self::TaggingFramework => "tagging_framework",
            Self::CreativeRepurposing => "creative_repurposing",
            Self::SpeculativeIntegration => "speculative_integration",
            Self::CrossDisciplinaryInnovation => "cross_disciplinary_innovation",
            Self::DependencyAnalysis => "dependency_analysis",
            Self::CodeQuality => "code_quality",
            Self::SecurityReview => "security_review",
        }
    }

    /// Human-readable name for progress output
    pub fn label(&self) -> &'static str {
        match self {
            Self::Overview => "overview",
            Self::TechnicalAnalysis => "technical analysis",
            Self::ActionableInsights => "actionable insights",
            Self::MetadataAnalysis => "metadata analysis",
            Self::TaggingFramework => "tagging framework",
            Self::CreativeRepurposing => "creative repurposing",
            Self::SpeculativeIntegration => "speculative integration",
            Self::CrossDisciplinaryInnovation => "cross-disciplinary innovation",
            Self::DependencyAnalysis => "dependency analysis",
            Self::CodeQuality => "code quality",
            Self::SecurityReview => "security review",
        }
    }
}

impl fmt::Display for AnalysisKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Generated text per analysis kind, kept in generation order
#[derive(Debug, Clone, Default, PartialEq)]
pub struct AnalysisBundle {
    entries: Vec<(AnalysisKind, String)>,
}

impl AnalysisBundle {
    /// A bundle mapping every kind in `kinds` to `text`
    pub fn placeholder(kinds: &[AnalysisKind], text: &str) -> Self {
        Self {
            entries: kinds.iter().map(|kind| (*kind, text.to_string())).collect(),
        }
    }

    /// Sets the text for `kind`, replacing any previous value
    pub fn insert(&mut self, kind: AnalysisKind, text: String) {
        match self.entries.iter_mut().find(|(k, _)| *k == kind) {
            Some(entry) => entry.1 = text,
            None => self.entries.push((kind, text)),
        }
    }

    /// Text generated for `kind`
    pub fn get(&self, kind: AnalysisKind) -> Option<&str> {
        self.entries
            .iter()
            .find(|(k, _)| *k == kind)
            .map(|(_, text)| text.as_str())
    }

    pub fn iter(&self) -> impl Iterator<Item = (AnalysisKind, &str)> {
        self.entries.iter().map(|(kind, text)| (*kind, text.as_str()))
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl Serialize for AnalysisBundle {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.entries.len()))?;
        for (kind, text) in &self.entries {
            map.serialize_entry(kind.as_str(), text)?;
        }
        map.end()
    }
}

impl<'de> Deserialize<'de> for AnalysisBundle {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> std::result::Result<Self, D::Error> {
        let map = BTreeMap::<AnalysisKind, String>::deserialize(deserializer)?;
        Ok(Self {
            entries: map.into_iter().collect(),
        })
    }
}

/// Runs prompt rendering and completion for each analysis kind
pub struct AnalysisOrchestrator {
    llm: LlmClient,
}

impl AnalysisOrchestrator {
    pub fn new(llm: LlmClient) -> Self {
        Self { llm }
    }

    pub fn llm(&self) -> &LlmClient {
        &self.llm
    }

    /// Generates the six project analyses
    ///
    /// With an unconfigured client every kind gets [`API_KEY_MISSING`] and
    /// no request is made. A failed call marks only its own kind with
    /// [`ANALYSIS_FAILED`].
    pub async fn run_all(&self, metadata: &RepositoryMetadata, model: &str) -> AnalysisBundle {
        if !self.llm.is_configured() {
            warn!("Completion client not configured; storing placeholder analyses");
            return AnalysisBundle::placeholder(&AnalysisKind::PROJECT, API_KEY_MISSING);
        }

        let mut bundle = AnalysisBundle::default();
        for kind in AnalysisKind::PROJECT {
            info!("Generating {} for {}", kind.label(), metadata.name().unwrap_or("repository"));
            let prompt = prompts::prompt_for(kind, metadata);
            let text = match self.llm.complete(&prompt, model).await {
                Ok(text) => text,
                Err(e) => {
                    warn!("Failed to generate {}: {}", kind, e);
                    ANALYSIS_FAILED.to_string()
                }
            };
            bundle.insert(kind, text);
        }
        bundle
    }

    /// Generates every report kind, calling `on_step` before each one
    ///
    /// Failed calls leave an empty string for their kind, and so does every
    /// kind when the client is unconfigured. No request is made in that case.
    pub async fn run_report<F>(&self, metadata: &RepositoryMetadata, model: &str, mut on_step: F) -> AnalysisBundle
    where
        F: FnMut(AnalysisKind),
    {
        if !self.llm.is_configured() {
            warn!("Completion client not configured; report will be empty");
            return AnalysisBundle::placeholder(&AnalysisKind::REPORT, "");
        }

        let mut bundle = AnalysisBundle::default();
        for kind in AnalysisKind::REPORT {
            on_step(kind);
            let prompt = prompts::prompt_for(kind, metadata);
            bundle.insert(kind, self.llm.complete_or_empty(&prompt, model).await);
        }
        bundle
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::github::ContentListing;
    use crate::llm::OpenAiChat;
    use mockito::Matcher;
    use pretty_assertions::assert_eq;
    use serde_json::{json, Map, Value};

    const COMPLETION: &str = r#"{"id":"chatcmpl-1","object":"chat.completion","created":1700000000,"model":"gpt-4",
        "choices":[{"index":0,"message":{"role":"assistant","content":"Generated analysis"},"finish_reason":"stop","logprobs":null}],
        "usage":{"prompt_tokens":10,"completion_tokens":2,"total_tokens":12}}"#;

    fn metadata() -> RepositoryMetadata {
        let record: Map<String, Value> =
            serde_json::from_value(json!({"name": "widget", "description": "A widget"})).unwrap();
        RepositoryMetadata::new(record, None, ContentListing::default())
    }

    #[tokio::test]
    async fn test_unconfigured_client_yields_placeholders() {
        let orchestrator = AnalysisOrchestrator::new(LlmClient::Unconfigured);
        let bundle = orchestrator.run_all(&metadata(), "gpt-4").await;

        assert_eq!(bundle.len(), 6);
        for kind in AnalysisKind::PROJECT {
            assert_eq!(bundle.get(kind), Some(API_KEY_MISSING));
        }
    }

    #[tokio::test]
    async fn test_unconfigured_report_is_empty() {
        let orchestrator = AnalysisOrchestrator::new(LlmClient::Unconfigured);
        let mut steps = 0;
        let bundle = orchestrator.run_report(&metadata(), "gpt-4", |_| steps += 1).await;

        assert_eq!(steps, 0);
        assert_eq!(bundle.len(), 11);
        assert!(bundle.iter().all(|(_, text)| text.is_empty()));
    }

    #[tokio::test]
    async fn test_configured_client_fills_every_kind() {
        let mut server = mockito::Server::new_async().await;
        let mock = server
            .mock("POST", "/chat/completions")
            .with_status(200)
            .with_header("content-type", "application/json")
            .with_body(COMPLETION)
            .expect(6)
            .create_async()
            .await;

        let llm = LlmClient::Configured(OpenAiChat::new("sk-test", Some(&server.url())));
        let bundle = AnalysisOrchestrator::new(llm).run_all(&metadata(), "gpt-4").await;

        let kinds: Vec<AnalysisKind> = bundle.iter().map(|(kind, _)| kind).collect();
        assert_eq!(kinds, AnalysisKind::PROJECT.to_vec());
        assert!(bundle.iter().all(|(_, text)| text == "Generated analysis"));
        mock.assert_async().await;
    }

    #[tokio::test]
    async fn test_failed_kind_does_not_spoil_others() {
        let mut server = mockito::Server::new_async().await;
        let _ok = server
            .mock("POST", "/chat/completions")
            .match_body(Matcher::Regex(
                "highly detailed|deep technical analysis|synthesize actionable|Analyze the dependencies|Review the code quality".into(),
            ))
            .with_status(200)
            .with_header("content-type", "application/json")
            .with_body(COMPLETION)
            .create_async()
            .await;
        let _failing = server
            .mock("POST", "/chat/completions")
            .match_body(Matcher::Regex("Conduct a security review".into()))
            .with_status(400)
            .with_header("content-type", "application/json")
            .with_body(r#"{"error":{"message":"rejected","type":"invalid_request_error","param":null,"code":null}}"#)
            .create_async()
            .await;

        let llm = LlmClient::Configured(OpenAiChat::new("sk-test", Some(&server.url())));
        let bundle = AnalysisOrchestrator::new(llm).run_all(&metadata(), "gpt-4").await;

        assert_eq!(bundle.get(AnalysisKind::SecurityReview), Some(ANALYSIS_FAILED));
        assert_eq!(bundle.get(AnalysisKind::Overview), Some("Generated analysis"));
        assert_eq!(bundle.get(AnalysisKind::CodeQuality), Some("Generated analysis"));
    }

    #[tokio::test]
    async fn test_report_covers_every_kind() {
        let mut server = mockito::Server::new_async().await;
        let _mock = server
            .mock("POST", "/chat/completions")
            .with_status(200)
            .with_header("content-type", "application/json")
            .with_body(COMPLETION)
            .expect(11)
            .create_async()
            .await;

        let llm = LlmClient::Configured(OpenAiChat::new("sk-test", Some(&server.url())));
        let mut steps = Vec::new();
        let bundle = AnalysisOrchestrator::new(llm)
            .run_report(&metadata(), "gpt-4", |kind| steps.push(kind))
            .await;

        assert_eq!(steps, AnalysisKind::REPORT.to_vec());
        assert_eq!(bundle.len(), 11);
    }

    #[test]
    fn test_bundle_serializes_in_generation_order() {
        let bundle = AnalysisBundle::placeholder(&AnalysisKind::PROJECT, "x");
        let text = serde_json::to_string(&bundle).unwrap();
        assert_eq!(
            text,
            r#"{"overview":"x","technical_analysis":"x","actionable_insights":"x","dependency_analysis":"x","code_quality":"x","security_review":"x"}"#
        );

        let back: AnalysisBundle = serde_json::from_str(&text).unwrap();
        assert_eq!(back, bundle);
    }

    #[test]
    fn test_bundle_rejects_unknown_kind() {
        assert!(serde_json::from_str::<AnalysisBundle>(r#"{"poetry":"x"}"#).is_err());
    }

    #[test]
    fn test_insert_replaces() {
        let mut bundle = AnalysisBundle::default();
        bundle.insert(AnalysisKind::Overview, "a".into());
        bundle.insert(AnalysisKind::Overview, "b".into());
        assert_eq!(bundle.len(), 1);
        assert_eq!(bundle.get(AnalysisKind::Overview), Some("b"));
    }
}
