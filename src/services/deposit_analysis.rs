//! Item recognition for deposits through an external vision model.
//!
//! The photo is sent to an OpenAI-compatible chat-completions endpoint that
//! answers with `KEY: value` lines. Missing or unparsable fields fall back
//! to the defaults in [`DepositAnalysis::default`].

use crate::config::VisionConfig;
use crate::error::{AppError, AppResult};
use base64::Engine;
use regex::Regex;
use reqwest::Client;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::str::FromStr;
use std::sync::OnceLock;
use tracing::{error, info};

const ANALYSIS_PROMPT: &str = "Identify the item in this photo for a resale marketplace. \
Answer with exactly these lines and nothing else:\n\
NAME: <short item name>\n\
DESCRIPTION: <one sentence>\n\
CATEGORY: <clothing, shoes, accessories, electronics or other>\n\
SUBCATEGORY: <e.g. shirt, sneakers, watch, phone>\n\
BRAND: <brand name or Generic>\n\
ESTIMATED_VALUE: <resale value in USD, number only>\n\
CONDITION: <new, excellent, good, fair or poor>";

static FIELD_LINE: OnceLock<Option<Regex>> = OnceLock::new();
static NUMBER: OnceLock<Option<Regex>> = OnceLock::new();

fn field_line() -> Option<&'static Regex> {
    FIELD_LINE
        .get_or_init(|| Regex::new(r"(?m)^\s*\**([A-Za-z_ ]+?)\**\s*:\s*(.*?)\s*$").ok())
        .as_ref()
}

fn number() -> Option<&'static Regex> {
    NUMBER
        .get_or_init(|| Regex::new(r"\d+(?:\.\d+)?").ok())
        .as_ref()
}

#[derive(Debug, Clone, Deserialize)]
pub struct AnalyzeDepositRequest {
    pub image_base64: String,
}

/// Recognized item attributes, ready to prefill a deposit
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DepositAnalysis {
    pub name: String,
    pub description: String,
    pub category: String,
    pub subcategory: String,
    pub brand: String,
    pub estimated_value: Decimal,
    pub condition: String,
}

impl Default for DepositAnalysis {
    fn default() -> Self {
        Self {
            name: "Unknown Item".to_string(),
            description: String::new(),
            category: "other".to_string(),
            subcategory: "general".to_string(),
            brand: "Generic".to_string(),
            estimated_value: Decimal::new(10, 0),
            condition: "good".to_string(),
        }
    }
}

impl DepositAnalysis {
    /// Parse the model's `KEY: value` answer. Unknown keys are ignored.
    pub fn parse(text: &str) -> Self {
        let mut analysis = Self::default();
        let Some(fields) = field_line() else {
            return analysis;
        };

        for caps in fields.captures_iter(text) {
            let key = caps[1].trim().to_uppercase().replace(' ', "_");
            let value = caps[2].trim();
            if value.is_empty() {
                continue;
            }

            match key.as_str() {
                "NAME" => analysis.name = value.to_string(),
                "DESCRIPTION" => analysis.description = value.to_string(),
                "CATEGORY" => analysis.category = value.to_lowercase(),
                "SUBCATEGORY" => analysis.subcategory = value.to_lowercase(),
                "BRAND" => analysis.brand = value.to_string(),
                "CONDITION" => analysis.condition = value.to_lowercase(),
                "ESTIMATED_VALUE" => {
                    let cleaned = value.replace(',', "");
                    if let Some(m) = number().and_then(|re| re.find(&cleaned)) {
                        if let Ok(v) = Decimal::from_str(m.as_str()) {
                            analysis.estimated_value = v.round_dp(2);
                        }
                    }
                }
                _ => {}
            }
        }

        analysis
    }
}

/// Strip an optional `data:<mime>;base64,` prefix and check the payload decodes
pub fn normalize_image(image_base64: &str) -> AppResult<String> {
    let trimmed = image_base64.trim();
    let payload = match trimmed.split_once(";base64,") {
        Some((prefix, data)) if prefix.starts_with("data:") => data,
        _ => trimmed,
    };

    if payload.is_empty() {
        return Err(AppError::Validation("image_base64 is required".to_string()));
    }

    base64::engine::general_purpose::STANDARD
        .decode(payload)
        .map_err(|e| AppError::Validation(format!("image_base64 is not valid base64: {}", e)))?;

    Ok(payload.to_string())
}

/// Client for the vision model used by deposit analysis
pub struct DepositAnalysisService {
    client: Client,
    config: VisionConfig,
}

impl DepositAnalysisService {
    pub fn new(config: VisionConfig) -> AppResult<Self> {
        let client = Client::builder()
            .timeout(config.timeout())
            .build()
            .map_err(|e| AppError::Config(format!("Failed to build HTTP client: {}", e)))?;

        Ok(Self { client, config })
    }

    pub fn is_configured(&self) -> bool {
        self.config.url.is_some()
    }

    pub async fn analyze(&self, req: AnalyzeDepositRequest) -> AppResult<DepositAnalysis> {
        let image = normalize_image(&req.image_base64)?;

        let url = self.config.url.as_deref().ok_or_else(|| {
            AppError::ExternalService("Vision service is not configured".to_string())
        })?;

        let body = serde_json::json!({
            "model": self.config.model,
            "messages": [{
                "role": "user",
                "content": [
                    { "type": "text", "text": ANALYSIS_PROMPT },
                    {
                        "type": "image_url",
                        "image_url": { "url": format!("data:image/jpeg;base64,{}", image) }
                    }
                ]
            }],
            "max_tokens": 300
        });

        let mut request = self.client.post(url).json(&body);
        if let Some(key) = &self.config.api_key {
            request = request.bearer_auth(key);
        }

        let response = request.send().await.map_err(|e| {
            error!("Vision service request failed: {}", e);
            AppError::ExternalService(format!("Vision service request failed: {}", e))
        })?;

        let status = response.status();
        if !status.is_success() {
            let text = response.text().await.unwrap_or_default();
            error!("Vision service returned {}: {}", status, text);
            return Err(AppError::ExternalService(format!(
                "Vision service returned {}",
                status
            )));
        }

        let payload: serde_json::Value = response.json().await.map_err(|e| {
            AppError::ExternalService(format!("Invalid vision service response: {}", e))
        })?;

        let content = payload
            .pointer("/choices/0/message/content")
            .and_then(|c| c.as_str())
            .ok_or_else(|| {
                AppError::ExternalService("Vision service response has no content".to_string())
            })?;

        let analysis = DepositAnalysis::parse(content);
        info!(
            "Analyzed deposit: {} ({} {}), estimated {}",
            analysis.name, analysis.brand, analysis.subcategory, analysis.estimated_value
        );
        Ok(analysis)
    }
}
