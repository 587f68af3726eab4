//! OpenAI-compatible chat-completions client that returns an `AuditReport`.

use async_trait::async_trait;
use lens_types::{AnalyzeError, Analyzer, AuditReport};
use serde::{Deserialize, Serialize};
use std::fmt;

const DEFAULT_API_URL: &str = "https://api.openai.com/v1/chat/completions";
const DEFAULT_MODEL: &str = "gpt-4o-mini";

const SYSTEM_PROMPT: &str = r#"You are an expert project reviewer and risk analyst.
Your role is to evaluate project plans BEFORE execution and identify early warning signs that could lead to project failure.

Evaluation criteria:
1. Goal clarity
2. Ownership and responsibility
3. Timeline realism
4. Task structure and dependencies
5. Scope definition and ambiguity

Tasks:
- Assign a severity (High, Medium, or Low) to each risk.
- Provide a professional suggestedProjectName (2-4 words) that summarizes the plan.

Output format:
{
    "riskLevel": "Low | Medium | High",
    "riskJustification": "one sentence justifying the overall level",
    "suggestedProjectName": "e.g. Legacy DB Migration",
    "topRisks": [
        {"name": "...", "why": "...", "reference": "direct quote from the plan", "severity": "High"}
    ],
    "fixNowSuggestions": [
        {"riskName": "name of a risk above", "action": "one concrete suggestion"}
    ]
}

List the top 3 risks and one suggestion per risk. Only output valid JSON, no additional text.
"#;

/// Connection settings for an OpenAI-compatible endpoint.
#[derive(Clone)]
pub struct OpenAiAnalyzerConfig {
    pub api_url: String,
    pub api_key: String,
    pub model: String,
    pub temperature: f64,
}

impl fmt::Debug for OpenAiAnalyzerConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("OpenAiAnalyzerConfig")
            .field("api_url", &self.api_url)
            .field("model", &self.model)
            .field("temperature", &self.temperature)
            .finish()
    }
}

impl OpenAiAnalyzerConfig {
    pub fn new(api_key: impl Into<String>) -> Self {
        Self {
            api_url: DEFAULT_API_URL.to_string(),
            api_key: api_key.into(),
            model: DEFAULT_MODEL.to_string(),
            temperature: 0.2,
        }
    }

    /// Read `LENS_API_URL`, `LENS_API_KEY` (required) and `LENS_MODEL`.
    pub fn from_env() -> Result<Self, AnalyzeError> {
        let api_key = std::env::var("LENS_API_KEY")
            .map_err(|_| AnalyzeError::Config("LENS_API_KEY is not set".to_string()))?;
        let mut config = Self::new(api_key);
        if let Ok(url) = std::env::var("LENS_API_URL") {
            config.api_url = url;
        }
        if let Ok(model) = std::env::var("LENS_MODEL") {
            config.model = model;
        }
        Ok(config)
    }
}

/// Analyzer backed by an OpenAI-compatible chat-completions endpoint.
#[derive(Debug, Clone)]
pub struct OpenAiAnalyzer {
    client: reqwest::Client,
    config: OpenAiAnalyzerConfig,
}

impl OpenAiAnalyzer {
    pub fn new(config: OpenAiAnalyzerConfig) -> Self {
        Self {
            client: reqwest::Client::new(),
            config,
        }
    }

    pub fn from_env() -> Result<Self, AnalyzeError> {
        OpenAiAnalyzerConfig::from_env().map(Self::new)
    }

    pub fn model(&self) -> &str {
        &self.config.model
    }
}

#[async_trait]
impl Analyzer for OpenAiAnalyzer {
    async fn analyze(&self, plan: &str) -> Result<AuditReport, AnalyzeError> {
        let messages = [
            ChatMessage {
                role: "system",
                content: SYSTEM_PROMPT,
            },
            ChatMessage {
                role: "user",
                content: plan,
            },
        ];
        let request = ChatRequest {
            model: &self.config.model,
            messages: &messages,
            temperature: Some(self.config.temperature),
            response_format: Some(ResponseFormat::JsonObject),
        };

        let response = self
            .client
            .post(&self.config.api_url)
            .bearer_auth(&self.config.api_key)
            .json(&request)
            .send()
            .await
            .map_err(|e| AnalyzeError::Api(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(AnalyzeError::Api(format!("status: {}, body: {}", status, body)));
        }

        let completion: ChatResponse = response
            .json()
            .await
            .map_err(|e| AnalyzeError::InvalidResponse(e.to_string()))?;

        let content = completion
            .choices
            .into_iter()
            .next()
            .and_then(|c| c.message.content)
            .filter(|c| !c.trim().is_empty())
            .ok_or(AnalyzeError::EmptyResponse)?;

        parse_report(&content).inspect_err(|e| {
            tracing::error!(error = ?e, "failed to parse analysis response");
        })
    }
}

/// Decode the model's message content into a report. Text around the JSON object is ignored.
pub fn parse_report(content: &str) -> Result<AuditReport, AnalyzeError> {
    let json_str = extract_json_from_text(content)
        .ok_or_else(|| AnalyzeError::InvalidResponse("no JSON object in response".to_string()))?;
    serde_json::from_str(json_str)
        .map_err(|e| AnalyzeError::InvalidResponse(format!("JSON parse error: {}", e)))
}

/// First `{` through last `}`.
fn extract_json_from_text(text: &str) -> Option<&str> {
    let start = text.find('{')?;
    let end = text.rfind('}')?;
    if start < end {
        Some(&text[start..=end])
    } else {
        None
    }
}

#[derive(Debug, Serialize)]
struct ChatMessage<'a> {
    role: &'a str,
    content: &'a str,
}

#[derive(Debug, Serialize)]
struct ChatRequest<'a> {
    model: &'a str,
    messages: &'a [ChatMessage<'a>],
    temperature: Option<f64>,
    response_format: Option<ResponseFormat>,
}

#[derive(Debug, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
enum ResponseFormat {
    JsonObject,
}

#[derive(Debug, Deserialize)]
struct ChatResponse {
    choices: Vec<Choice>,
}

#[derive(Debug, Deserialize)]
struct Choice {
    message: ResponseMessage,
}

#[derive(Debug, Deserialize)]
struct ResponseMessage {
    content: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use lens_types::RiskLevel;

    const FULL: &str = r#"{
        "riskLevel": "High",
        "riskJustification": "No owner and an aggressive timeline.",
        "suggestedProjectName": "Cloud Migration Sprint",
        "topRisks": [
            {"name": "Ownership", "why": "Nobody is accountable.", "reference": "No specific owner assigned yet", "severity": "High"},
            {"name": "Staging", "why": "Minimal staging hides failures.", "reference": "minimal staging instances", "severity": "medium"}
        ],
        "fixNowSuggestions": [
            {"riskName": "Ownership", "action": "Assign John as migration lead."}
        ]
    }"#;

    #[test]
    fn parses_complete_report() {
        let report = parse_report(FULL).unwrap();
        assert_eq!(report.risk_level, RiskLevel::High);
        assert_eq!(report.suggested_project_name, "Cloud Migration Sprint");
        assert_eq!(report.top_risks.len(), 2);
        assert_eq!(report.top_risks[1].severity, RiskLevel::Medium);
        assert_eq!(report.fix_now_suggestions[0].risk_name, "Ownership");
    }

    #[test]
    fn tolerates_text_around_json() {
        let wrapped = format!("```json\n{}\n```", FULL);
        assert!(parse_report(&wrapped).is_ok());
    }

    #[test]
    fn malformed_payload_is_an_error() {
        let err = parse_report("I cannot help with that.").unwrap_err();
        assert_eq!(err.to_string(), "Invalid response format from AI service.");

        let err = parse_report(r#"{"riskLevel": "Catastrophic", "riskJustification": "x"}"#)
            .unwrap_err();
        assert!(matches!(err, AnalyzeError::InvalidResponse(_)));
    }

    #[test]
    fn request_uses_json_object_format() {
        let messages = [ChatMessage {
            role: "user",
            content: "plan",
        }];
        let request = ChatRequest {
            model: "m",
            messages: &messages,
            temperature: None,
            response_format: Some(ResponseFormat::JsonObject),
        };
        let v = serde_json::to_value(&request).unwrap();
        assert_eq!(v["response_format"]["type"], "json_object");
        assert_eq!(v["messages"][0]["role"], "user");
    }

    #[test]
    fn config_debug_hides_key() {
        let config = OpenAiAnalyzerConfig::new("sk-secret");
        assert!(!format!("{:?}", config).contains("sk-secret"));
        assert_eq!(config.model, DEFAULT_MODEL);
    }
}
