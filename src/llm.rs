use std::collections::VecDeque;

use anyhow::{Context, Result};
use futures::stream::{self, BoxStream, StreamExt};
use serde::Serialize;
use serde_json::Value;
use tracing::{debug, error};

const DEFAULT_BASE_URL: &str = "https://generativelanguage.googleapis.com/v1beta";
const DEFAULT_MODEL: &str = "gemini-2.5-flash";

/// Harm categories the endpoint accepts a threshold for. All are set to `BLOCK_NONE`.
pub const SAFETY_CATEGORIES: &[&str] = &[
    "HARM_CATEGORY_HARASSMENT",
    "HARM_CATEGORY_HATE_SPEECH",
    "HARM_CATEGORY_SEXUALLY_EXPLICIT",
    "HARM_CATEGORY_DANGEROUS_CONTENT",
];

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Part {
    pub text: String,
}

/// One turn of engine-side history, in the wire shape of the generation API.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Content {
    pub role: String,
    pub parts: Vec<Part>,
}

impl Content {
    pub fn user(text: impl Into<String>) -> Self {
        Self {
            role: "user".to_string(),
            parts: vec![Part { text: text.into() }],
        }
    }

    pub fn model(text: impl Into<String>) -> Self {
        Self {
            role: "model".to_string(),
            parts: vec![Part { text: text.into() }],
        }
    }

    #[cfg(test)]
    pub fn text(&self) -> String {
        self.parts.iter().map(|p| p.text.as_str()).collect()
    }
}

/// Sampling parameters. Defaults are deterministic: answers must not drift between runs.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct GenerationConfig {
    pub temperature: f64,
    pub top_p: f64,
    pub top_k: u32,
    pub max_output_tokens: u32,
    pub response_mime_type: String,
    pub candidate_count: u32,
}

impl Default for GenerationConfig {
    fn default() -> Self {
        Self {
            temperature: 0.0,
            top_p: 0.90,
            top_k: 40,
            max_output_tokens: 2048,
            response_mime_type: "text/plain".to_string(),
            candidate_count: 1,
        }
    }
}

/// Text pieces of a streamed reply, in arrival order.
pub type ReplyStream = BoxStream<'static, Result<String>>;

pub struct LlmClient {
    client: reqwest::Client,
    base_url: String,
    model: String,
    api_key: String,
    generation: GenerationConfig,
}

impl LlmClient {
    pub fn from_env() -> Result<Self> {
        let api_key = dotenv::var("GENAI_API_KEY")
            .ok()
            .filter(|k| !k.is_empty())
            .context("GENAI_API_KEY not set. Add it to .env or your environment variables.")?;
        let base_url =
            dotenv::var("GENAI_BASE_URL").unwrap_or_else(|_| DEFAULT_BASE_URL.to_string());
        let model = dotenv::var("GENAI_MODEL").unwrap_or_else(|_| DEFAULT_MODEL.to_string());

        Self::new(base_url, model, api_key)
    }

    pub fn new(base_url: String, model: String, api_key: String) -> Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(std::time::Duration::from_secs(120))
            .build()
            .context("Failed to create HTTP client")?;

        Ok(Self {
            client,
            base_url,
            model,
            api_key,
            generation: GenerationConfig::default(),
        })
    }

    pub fn model(&self) -> &str {
        &self.model
    }

    /// Resolve the server-sent-events streaming endpoint.
    fn endpoint(&self) -> String {
        let base = self.base_url.trim_end_matches('/');
        format!("{}/models/{}:streamGenerateContent?alt=sse", base, self.model)
    }

    pub fn request_body(&self, system: &str, contents: &[Content]) -> Value {
        let safety: Vec<Value> = SAFETY_CATEGORIES
            .iter()
            .map(|c| serde_json::json!({ "category": c, "threshold": "BLOCK_NONE" }))
            .collect();

        serde_json::json!({
            "contents": contents,
            "systemInstruction": { "parts": [{ "text": system }] },
            "generationConfig": self.generation,
            "safetySettings": safety,
        })
    }

    /// Start a streamed completion over the whole conversation.
    pub async fn stream_chat(&self, system: &str, contents: &[Content]) -> Result<ReplyStream> {
        let body = self.request_body(system, contents);
        debug!(model = %self.model, turns = contents.len(), "Sending streaming request");

        let response = self
            .client
            .post(self.endpoint())
            .header("x-goog-api-key", &self.api_key)
            .json(&body)
            .send()
            .await
            .context("LLM request failed")?;

        let status = response.status();
        if !status.is_success() {
            let error_text = response
                .text()
                .await
                .unwrap_or_else(|_| "Unknown error".to_string());
            error!(status = %status, body = %error_text, model = %self.model, "LLM request rejected");
            anyhow::bail!("LLM API error (status {}): {}", status, error_text);
        }

        let state = SseState {
            response,
            decoder: SseDecoder::default(),
            pending: VecDeque::new(),
            done: false,
        };

        let stream = stream::unfold(state, |mut st| async move {
            loop {
                if let Some(item) = st.pending.pop_front() {
                    if item.is_err() {
                        st.done = true;
                        st.pending.clear();
                    }
                    return Some((item, st));
                }
                if st.done {
                    return None;
                }
                match st.response.chunk().await {
                    Ok(Some(bytes)) => st.pending.extend(st.decoder.push(&bytes)),
                    Ok(None) => {
                        st.done = true;
                        st.pending.extend(st.decoder.finish());
                    }
                    Err(e) => {
                        st.done = true;
                        st.pending
                            .push_back(Err(anyhow::Error::new(e).context("Failed to read streaming chunk")));
                    }
                }
            }
        });

        Ok(stream.boxed())
    }
}

struct SseState {
    response: reqwest::Response,
    decoder: SseDecoder,
    pending: VecDeque<Result<String>>,
    done: bool,
}

/// Reassembles SSE lines from network chunks and parses complete ones.
#[derive(Default)]
pub struct SseDecoder {
    /// Raw bytes; a multi-byte character may straddle two network chunks.
    buffer: Vec<u8>,
}

impl SseDecoder {
    /// Feed a chunk, returning the events of every line it completed.
    pub fn push(&mut self, bytes: &[u8]) -> Vec<Result<String>> {
        self.buffer.extend_from_slice(bytes);
        let mut events = Vec::new();
        while let Some(pos) = self.buffer.iter().position(|b| *b == b'\n') {
            let line: Vec<u8> = self.buffer.drain(..=pos).collect();
            push_event(&mut events, &String::from_utf8_lossy(&line));
        }
        events
    }

    /// End of body: a last line may lack its newline.
    pub fn finish(&mut self) -> Vec<Result<String>> {
        let mut events = Vec::new();
        if !self.buffer.is_empty() {
            let rest = std::mem::take(&mut self.buffer);
            push_event(&mut events, &String::from_utf8_lossy(&rest));
        }
        events
    }
}

fn push_event(events: &mut Vec<Result<String>>, line: &str) {
    match parse_sse_line(line) {
        Ok(Some(text)) => events.push(Ok(text)),
        Ok(None) => {}
        Err(e) => events.push(Err(e)),
    }
}

/// Parse one SSE line. Returns the text carried by a `data:` event, if any.
pub fn parse_sse_line(line: &str) -> Result<Option<String>> {
    let line = line.trim_end_matches(['\r', '\n']);
    let Some(data) = line.strip_prefix("data:") else {
        return Ok(None);
    };
    let data = data.trim();
    if data.is_empty() || data == "[DONE]" {
        return Ok(None);
    }

    let json: Value = serde_json::from_str(data).context("Failed to parse LLM stream event")?;

    if let Some(err) = json.get("error") {
        let message = err["message"].as_str().unwrap_or("unknown error");
        anyhow::bail!("LLM stream error: {}", message);
    }
    if let Some(reason) = json["promptFeedback"]["blockReason"].as_str() {
        anyhow::bail!("Prompt blocked: {}", reason);
    }

    let text: String = json["candidates"]
        .get(0)
        .and_then(|c| c["content"]["parts"].as_array())
        .map(|parts| parts.iter().filter_map(|p| p["text"].as_str()).collect())
        .unwrap_or_default();

    Ok((!text.is_empty()).then_some(text))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn client() -> LlmClient {
        LlmClient::new(
            "https://example.test/v1beta/".to_string(),
            "gemini-2.5-flash".to_string(),
            "key".to_string(),
        )
        .unwrap()
    }

    #[test]
    fn test_endpoint() {
        assert_eq!(
            client().endpoint(),
            "https://example.test/v1beta/models/gemini-2.5-flash:streamGenerateContent?alt=sse"
        );
    }

    #[test]
    fn test_request_body_shape() {
        let body = client().request_body("be brief", &[Content::model("hi"), Content::user("q")]);
        assert_eq!(body["systemInstruction"]["parts"][0]["text"], "be brief");
        assert_eq!(body["contents"][0]["role"], "model");
        assert_eq!(body["contents"][1]["parts"][0]["text"], "q");
        assert_eq!(body["generationConfig"]["temperature"], 0.0);
        assert_eq!(body["generationConfig"]["topK"], 40);
        assert_eq!(body["generationConfig"]["maxOutputTokens"], 2048);
        assert_eq!(body["generationConfig"]["responseMimeType"], "text/plain");
        assert_eq!(body["generationConfig"]["candidateCount"], 1);
        let safety = body["safetySettings"].as_array().unwrap();
        assert_eq!(safety.len(), 4);
        assert!(safety.iter().all(|s| s["threshold"] == "BLOCK_NONE"));
    }

    #[test]
    fn test_parse_text_event() {
        let line = r#"data: {"candidates":[{"content":{"role":"model","parts":[{"text":"ค่าเฉลี่ย"},{"text":" คือ"}]}}]}"#;
        assert_eq!(parse_sse_line(line).unwrap().as_deref(), Some("ค่าเฉลี่ย คือ"));
    }

    #[test]
    fn test_parse_ignores_non_data() {
        assert_eq!(parse_sse_line("").unwrap(), None);
        assert_eq!(parse_sse_line(": keep-alive").unwrap(), None);
        assert_eq!(parse_sse_line("event: message").unwrap(), None);
        assert_eq!(parse_sse_line("data: [DONE]").unwrap(), None);
    }

    #[test]
    fn test_parse_finish_event_without_text() {
        let line = r#"data: {"candidates":[{"finishReason":"STOP"}],"usageMetadata":{"totalTokenCount":12}}"#;
        assert_eq!(parse_sse_line(line).unwrap(), None);
    }

    #[test]
    fn test_parse_error_event() {
        let line = r#"data: {"error":{"code":429,"message":"quota exceeded"}}"#;
        let err = parse_sse_line(line).unwrap_err();
        assert!(err.to_string().contains("quota exceeded"));
    }

    #[test]
    fn test_parse_blocked_prompt() {
        let line = r#"data: {"promptFeedback":{"blockReason":"OTHER"}}"#;
        assert!(parse_sse_line(line).is_err());
    }

    fn event(text: &str) -> String {
        format!(
            "data: {{\"candidates\":[{{\"content\":{{\"parts\":[{{\"text\":\"{}\"}}]}}}}]}}",
            text
        )
    }

    #[test]
    fn test_decoder_joins_split_character() {
        let line = format!("{}\r\n\r\n", event("ค่ากลาง"));
        let bytes = line.as_bytes();
        // Split inside the three-byte encoding of the first Thai character
        let cut = line.find('ค').unwrap() + 1;

        let mut decoder = SseDecoder::default();
        assert!(decoder.push(&bytes[..cut]).is_empty());
        let events = decoder.push(&bytes[cut..]);
        assert_eq!(events.len(), 1);
        assert_eq!(events[0].as_ref().unwrap(), "ค่ากลาง");
        assert!(decoder.finish().is_empty());
    }

    #[test]
    fn test_decoder_flushes_unterminated_last_line() {
        let mut decoder = SseDecoder::default();
        let body = format!("{}\n{}", event("แรก"), event("สุดท้าย"));
        let first = decoder.push(body.as_bytes());
        assert_eq!(first.len(), 1);
        assert_eq!(first[0].as_ref().unwrap(), "แรก");

        let last = decoder.finish();
        assert_eq!(last.len(), 1);
        assert_eq!(last[0].as_ref().unwrap(), "สุดท้าย");
    }

    #[test]
    fn test_decoder_reports_bad_event() {
        let mut decoder = SseDecoder::default();
        let events = decoder.push(b"data: {not json\n");
        assert_eq!(events.len(), 1);
        assert!(events[0].is_err());
    }

    #[test]
    fn test_content_text() {
        let c = Content {
            role: "model".to_string(),
            parts: vec![Part { text: "a".into() }, Part { text: "b".into() }],
        };
        assert_eq!(c.text(), "ab");
    }
}
