//! Google Gemini adapter for the three model capabilities the agent uses:
//! structured classification, forced function calling and free chat.

use std::time::Duration;

use reqwest::Client;
use serde::{Deserialize, Serialize};
use serde_json::{json, Map, Value};

use crate::constants::{
    CHAT_TEMPERATURE, CLASSIFIER_TEMPERATURE, GEMINI_API_BASE, GEMINI_REQUEST_TIMEOUT_SECS,
};
use crate::error::{AppError, Result};
use crate::models::{ChatRole, ChatTurn};
use crate::services::agent::domain::Domain;
use crate::services::agent::llm::{LanguageModel, ModelDecision, ToolCall};
use crate::services::agent::registry::ActionSpec;

#[derive(Debug, Clone)]
pub struct GeminiClient {
    api_key: String,
    model: String,
    base_url: String,
    client: Client,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct GenerateRequest {
    contents: Vec<Content>,
    #[serde(skip_serializing_if = "Option::is_none")]
    system_instruction: Option<Content>,
    #[serde(skip_serializing_if = "Option::is_none")]
    generation_config: Option<Value>,
    #[serde(skip_serializing_if = "Option::is_none")]
    tools: Option<Value>,
    #[serde(skip_serializing_if = "Option::is_none")]
    tool_config: Option<Value>,
}

#[derive(Debug, Serialize)]
struct Content {
    #[serde(skip_serializing_if = "Option::is_none")]
    role: Option<&'static str>,
    parts: Vec<TextPart>,
}

impl Content {
    fn text(role: Option<&'static str>, text: &str) -> Self {
        Self {
            role,
            parts: vec![TextPart {
                text: text.to_string(),
            }],
        }
    }
}

#[derive(Debug, Serialize)]
struct TextPart {
    text: String,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct GenerateResponse {
    #[serde(default)]
    candidates: Vec<Candidate>,
}

#[derive(Debug, Deserialize)]
struct Candidate {
    content: Option<CandidateContent>,
}

#[derive(Debug, Deserialize)]
struct CandidateContent {
    #[serde(default)]
    parts: Vec<ResponsePart>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ResponsePart {
    text: Option<String>,
    function_call: Option<FunctionCall>,
}

#[derive(Debug, Deserialize)]
struct FunctionCall {
    name: String,
    #[serde(default)]
    args: Option<Map<String, Value>>,
}

impl GeminiClient {
    pub fn new(api_key: String, model: String) -> Result<Self> {
        if api_key.trim().is_empty() {
            return Err(AppError::ExternalAPI("Gemini API key is empty".to_string()));
        }
        let client = Client::builder()
            .timeout(Duration::from_secs(GEMINI_REQUEST_TIMEOUT_SECS))
            .build()
            .map_err(|e| AppError::Internal(format!("Failed to build HTTP client: {}", e)))?;
        Ok(Self {
            api_key,
            model,
            base_url: GEMINI_API_BASE.to_string(),
            client,
        })
    }

    async fn generate_content(&self, request: &GenerateRequest) -> Result<Vec<ResponsePart>> {
        let url = format!("{}/models/{}:generateContent", self.base_url, self.model);

        let response = self
            .client
            .post(&url)
            .header("x-goog-api-key", &self.api_key)
            .json(request)
            .send()
            .await
            .map_err(|e| AppError::ExternalAPI(format!("Gemini request failed: {}", e)))?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            tracing::error!("Gemini API error: {} - {}", status, body);
            return Err(AppError::ExternalAPI(format!("Gemini HTTP {}", status)));
        }

        let parsed: GenerateResponse = response
            .json()
            .await
            .map_err(|e| AppError::ExternalAPI(format!("Invalid Gemini response: {}", e)))?;

        parsed
            .candidates
            .into_iter()
            .next()
            .and_then(|candidate| candidate.content)
            .map(|content| content.parts)
            .ok_or_else(|| AppError::ExternalAPI("Gemini returned no candidates".to_string()))
    }
}

fn joined_text(parts: &[ResponsePart]) -> String {
    parts
        .iter()
        .filter_map(|part| part.text.as_deref())
        .collect::<Vec<_>>()
        .join("")
}

fn classification_schema() -> Value {
    let domains: Vec<&str> = Domain::ALL.iter().map(Domain::as_str).collect();
    json!({
        "type": "OBJECT",
        "properties": {
            "domain": { "type": "STRING", "enum": domains },
            "confidence": { "type": "NUMBER" },
            "reason": { "type": "STRING" },
            "requires_wallet": { "type": "BOOLEAN" }
        },
        "required": ["domain", "confidence", "reason"]
    })
}

/// Function declaration advertised to the model. Trusted params are left out.
pub fn function_declaration(spec: &ActionSpec) -> Value {
    let mut declaration = json!({
        "name": spec.name,
        "description": spec.description,
    });

    let params: Vec<_> = spec.model_params().collect();
    if !params.is_empty() {
        let properties: Map<String, Value> = params
            .iter()
            .map(|param| {
                (
                    param.name.to_string(),
                    json!({ "type": param.kind.schema_type(), "description": param.description }),
                )
            })
            .collect();
        let required: Vec<&str> = params
            .iter()
            .filter(|param| param.required)
            .map(|param| param.name)
            .collect();
        declaration["parameters"] = json!({
            "type": "OBJECT",
            "properties": properties,
            "required": required,
        });
    }
    declaration
}

fn parse_decision(raw: &str) -> Result<ModelDecision> {
    let cleaned = raw
        .trim()
        .trim_start_matches("```json")
        .trim_start_matches("```")
        .trim_end_matches("```")
        .trim();
    serde_json::from_str(cleaned)
        .map_err(|e| AppError::ExternalAPI(format!("Unparseable classification: {}", e)))
}

#[async_trait::async_trait]
impl LanguageModel for GeminiClient {
    fn provider_name(&self) -> &'static str {
        "gemini"
    }

    async fn classify(&self, system_prompt: &str, text: &str) -> Result<ModelDecision> {
        let request = GenerateRequest {
            contents: vec![Content::text(Some("user"), text)],
            system_instruction: Some(Content::text(None, system_prompt)),
            generation_config: Some(json!({
                "temperature": CLASSIFIER_TEMPERATURE,
                "responseMimeType": "application/json",
                "responseSchema": classification_schema(),
            })),
            tools: None,
            tool_config: None,
        };
        let parts = self.generate_content(&request).await?;
        parse_decision(&joined_text(&parts))
    }

    async fn select_tool(
        &self,
        system_prompt: &str,
        text: &str,
        tools: &[&ActionSpec],
    ) -> Result<Option<ToolCall>> {
        if tools.is_empty() {
            return Ok(None);
        }
        let declarations: Vec<Value> = tools.iter().map(|spec| function_declaration(spec)).collect();
        let allowed: Vec<&str> = tools.iter().map(|spec| spec.name).collect();

        let request = GenerateRequest {
            contents: vec![Content::text(Some("user"), text)],
            system_instruction: Some(Content::text(None, system_prompt)),
            generation_config: Some(json!({ "temperature": 0.0 })),
            tools: Some(json!([{ "functionDeclarations": declarations }])),
            tool_config: Some(json!({
                "functionCallingConfig": {
                    "mode": "ANY",
                    "allowedFunctionNames": allowed,
                }
            })),
        };

        let parts = self.generate_content(&request).await?;
        let call = parts
            .into_iter()
            .find_map(|part| part.function_call)
            .map(|call| ToolCall {
                name: call.name,
                args: call.args.unwrap_or_default(),
            });
        Ok(call)
    }

    async fn generate(&self, system_prompt: &str, history: &[ChatTurn], text: &str) -> Result<String> {
        let mut contents: Vec<Content> = history
            .iter()
            .map(|turn| {
                let role = match turn.role {
                    ChatRole::User => "user",
                    ChatRole::Assistant => "model",
                };
                Content::text(Some(role), &turn.text)
            })
            .collect();
        contents.push(Content::text(Some("user"), text));

        let request = GenerateRequest {
            contents,
            system_instruction: Some(Content::text(None, system_prompt)),
            generation_config: Some(json!({ "temperature": CHAT_TEMPERATURE })),
            tools: None,
            tool_config: None,
        };
        let parts = self.generate_content(&request).await?;
        Ok(joined_text(&parts))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::services::agent::registry::ParamKind;

    #[test]
    fn new_rejects_empty_key() {
        assert!(GeminiClient::new("  ".to_string(), "gemini-2.0-flash".to_string()).is_err());
    }

    #[test]
    fn declaration_hides_trusted_params() {
        let spec = ActionSpec::new("send_sui", "Prepare a SUI transfer")
            .required("recipient", ParamKind::String, "0x address or contact name")
            .required("amount", ParamKind::Number, "Amount of SUI")
            .with_wallet()
            .with_caller();
        let declaration = function_declaration(&spec);
        let properties = declaration["parameters"]["properties"].as_object().unwrap();
        assert!(properties.contains_key("recipient"));
        assert!(!properties.contains_key("wallet_address"));
        assert!(!properties.contains_key("user_id"));
        assert_eq!(declaration["parameters"]["required"], json!(["recipient", "amount"]));
        assert_eq!(properties["amount"]["type"], "NUMBER");
    }

    #[test]
    fn declaration_without_params_omits_schema() {
        let spec = ActionSpec::new("get_balance", "balance").with_wallet();
        assert!(function_declaration(&spec).get("parameters").is_none());
    }

    #[test]
    fn parses_fenced_classification() {
        let decision =
            parse_decision("```json\n{\"domain\":\"nfts\",\"confidence\":0.9,\"reason\":\"asks\"}\n```")
                .unwrap();
        assert_eq!(decision.domain, Domain::Nfts);
        assert!(parse_decision("not json").is_err());
    }

    #[test]
    fn response_parts_expose_function_calls() {
        let raw = json!({
            "candidates": [{
                "content": { "parts": [{ "functionCall": { "name": "get_nfts", "args": { "limit": 3 } } }] }
            }]
        });
        let parsed: GenerateResponse = serde_json::from_value(raw).unwrap();
        let call = parsed.candidates[0].content.as_ref().unwrap().parts[0]
            .function_call
            .as_ref()
            .unwrap();
        assert_eq!(call.name, "get_nfts");
        assert_eq!(call.args.as_ref().unwrap()["limit"], 3);
    }
}
