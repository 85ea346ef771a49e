use crate::providers::ProviderError;
use crate::risk::{Factor, RiskAssessment};
use crate::underwriting::RiskBand;
use async_trait::async_trait;
use serde::Deserialize;
use serde_json::json;

/// Turns an assessment into a short policyholder-facing explanation.
#[async_trait]
pub trait RiskExplainer: Send + Sync {
    async fn explain(
        &self,
        assessment: &RiskAssessment,
        band: RiskBand,
        location: &str,
    ) -> Result<String, ProviderError>;
}

fn dominant_factor(assessment: &RiskAssessment) -> Option<Factor> {
    assessment
        .metrics_percent
        .iter()
        .filter(|(_, percent)| **percent > 0.0)
        .max_by(|a, b| a.1.total_cmp(b.1))
        .map(|(factor, _)| *factor)
}

fn build_prompt(assessment: &RiskAssessment, band: RiskBand, location: &str) -> String {
    let mut prompt = format!(
        "The environmental risk at {location} scored {} out of 100 ({} band).",
        assessment.risk_percent,
        band.label()
    );
    if let Some(factor) = dominant_factor(assessment) {
        prompt.push_str(&format!(" The strongest signal is {}.", factor.key()));
    }
    prompt.push_str(
        " Write a short, simple, empathetic explanation for a policyholder. No jargon.",
    );
    prompt
}

const GEMINI_BASE_URL: &str = "https://generativelanguage.googleapis.com";
const GEMINI_MODEL: &str = "gemini-2.5-flash";

/// Explanation generator backed by the Gemini REST API.
#[derive(Clone)]
pub struct GeminiExplainer {
    http: reqwest::Client,
    base_url: String,
    api_key: String,
    model: String,
}

impl GeminiExplainer {
    pub fn new(http: reqwest::Client, api_key: String) -> Self {
        Self {
            http,
            base_url: GEMINI_BASE_URL.to_string(),
            api_key,
            model: GEMINI_MODEL.to_string(),
        }
    }

    pub fn with_base_url(http: reqwest::Client, base_url: String, api_key: String) -> Self {
        Self {
            base_url,
            ..Self::new(http, api_key)
        }
    }
}

#[derive(Debug, Deserialize)]
struct GenerateResponse {
    #[serde(default)]
    candidates: Vec<Candidate>,
}

#[derive(Debug, Deserialize)]
struct Candidate {
    content: CandidateContent,
}

#[derive(Debug, Deserialize)]
struct CandidateContent {
    #[serde(default)]
    parts: Vec<CandidatePart>,
}

#[derive(Debug, Deserialize)]
struct CandidatePart {
    #[serde(default)]
    text: String,
}

#[async_trait]
impl RiskExplainer for GeminiExplainer {
    async fn explain(
        &self,
        assessment: &RiskAssessment,
        band: RiskBand,
        location: &str,
    ) -> Result<String, ProviderError> {
        let url = format!(
            "{}/v1beta/models/{}:generateContent",
            self.base_url, self.model
        );
        let prompt = build_prompt(assessment, band, location);

        let response = self
            .http
            .post(&url)
            .query(&[("key", self.api_key.as_str())])
            .json(&json!({
                "contents": [{ "parts": [{ "text": prompt }] }]
            }))
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            return Err(ProviderError::Api {
                status: status.as_u16(),
                body: response.text().await.unwrap_or_default(),
            });
        }

        let parsed: GenerateResponse = response.json().await?;
        parsed
            .candidates
            .into_iter()
            .next()
            .and_then(|candidate| candidate.content.parts.into_iter().next())
            .map(|part| part.text)
            .filter(|text| !text.is_empty())
            .ok_or_else(|| ProviderError::InvalidResponse("empty candidate list".to_string()))
    }
}

/// Deterministic offline fallback used when no generation API is
/// configured, and in demos and tests.
#[derive(Debug, Clone, Copy, Default)]
pub struct TemplateExplainer;

#[async_trait]
impl RiskExplainer for TemplateExplainer {
    async fn explain(
        &self,
        assessment: &RiskAssessment,
        band: RiskBand,
        location: &str,
    ) -> Result<String, ProviderError> {
        let mut explanation = format!(
            "The location {location} scores {} out of 100, which we class as {} risk.",
            assessment.risk_percent,
            band.label().to_lowercase()
        );
        match dominant_factor(assessment) {
            Some(factor) => explanation.push_str(&format!(
                " The reading that contributes most right now is {}.",
                factor.key().replace('_', " ")
            )),
            None => explanation
                .push_str(" No individual hazard stands out in the current readings."),
        }
        Ok(explanation)
    }
}
