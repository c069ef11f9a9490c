//! Hosted vision-language text source adapter.
//!
//! Sends one request per page to a `generateContent`-style vision
//! endpoint and parses the structured layout analysis out of the model's
//! reply. The service is treated as best-effort: transport failures,
//! rate-limit exhaustion, and malformed replies all surface as
//! "unavailable" (`Ok(None)`), signalling the orchestrator to fall back
//! to a local source. One attempt per page; only rate-limit signals are
//! retried, a bounded number of times with a fixed delay.

use crate::core::{SepResult, VisionConfig, WatermarkConfig};
use crate::domain::{FontSizeClass, TextRole, TextSpan};
use crate::processors::{BoundingBox, validate_bbox_in_bounds};
use crate::utils::encode_png;
use base64::Engine;
use base64::engine::general_purpose::STANDARD as BASE64;
use image::RgbImage;
use reqwest::StatusCode;
use serde::Deserialize;
use serde_json::json;
use std::time::Duration;
use tokio::time::sleep;
use tracing::{debug, warn};

/// Structured slide analysis returned by the vision service.
///
/// Every field tolerates absence; a reply with no usable text elements
/// simply produces an empty span set and triggers fallback upstream.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct VisionAnalysis {
    /// Detected text elements.
    #[serde(default)]
    pub text_elements: Vec<VisionTextElement>,
    /// Graphics the service believes it saw. Advisory only: the engine
    /// runs its own graphic detector.
    #[serde(default)]
    pub graphics: Vec<VisionGraphic>,
    /// Coarse layout classification.
    #[serde(default)]
    pub layout_type: Option<String>,
    /// Service-reported overall confidence.
    #[serde(default)]
    pub overall_confidence: Option<f32>,
    /// Service-reported extraction quality ("high" | "medium" | "low").
    #[serde(default)]
    pub extraction_quality: Option<String>,
}

/// One text element in a [`VisionAnalysis`].
#[derive(Debug, Clone, Deserialize)]
pub struct VisionTextElement {
    /// Extracted text content.
    #[serde(default)]
    pub text: String,
    /// `[x, y, width, height]` in page pixels.
    #[serde(default)]
    pub bbox: Vec<i64>,
    /// Layout role of the element.
    #[serde(default = "default_role")]
    pub role: TextRole,
    /// Relative size class.
    #[serde(default)]
    pub font_size: Option<FontSizeClass>,
    /// Element confidence.
    #[serde(default = "default_confidence")]
    pub confidence: f32,
}

/// One graphic element in a [`VisionAnalysis`].
#[derive(Debug, Clone, Deserialize)]
pub struct VisionGraphic {
    /// Graphic type ("icon" | "diagram" | "chart" | ...).
    #[serde(default, rename = "type")]
    pub kind: Option<String>,
    /// `[x, y, width, height]` in page pixels.
    #[serde(default)]
    pub bbox: Vec<i64>,
    /// Short description.
    #[serde(default)]
    pub description: String,
    /// Element confidence.
    #[serde(default = "default_confidence")]
    pub confidence: f32,
}

fn default_role() -> TextRole {
    TextRole::Body
}

fn default_confidence() -> f32 {
    1.0
}

/// Client for the hosted vision-language service.
pub struct VisionClient {
    http: reqwest::Client,
    api_key: String,
    config: VisionConfig,
}

impl VisionClient {
    /// Builds a client when the service is configured.
    ///
    /// Returns `Ok(None)` when no API key is present; the adapter is
    /// then unavailable and the orchestrator skips it.
    pub fn from_config(config: &VisionConfig) -> SepResult<Option<Self>> {
        let Some(api_key) = config.api_key.clone() else {
            return Ok(None);
        };

        let http = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()?;

        Ok(Some(Self {
            http,
            api_key,
            config: config.clone(),
        }))
    }

    /// Analyzes one page image.
    ///
    /// Returns `Ok(None)` when the service is unavailable for this page
    /// (transport error, exhausted rate-limit retries, or a reply that
    /// cannot be parsed). Errors are reserved for local failures such as
    /// image encoding.
    pub async fn analyze_page(
        &self,
        image: &RgbImage,
        page_number: usize,
    ) -> SepResult<Option<VisionAnalysis>> {
        let png = encode_png(image)?;
        let encoded = BASE64.encode(&png);
        let body = json!({
            "contents": [
                {
                    "role": "user",
                    "parts": [
                        { "text": analysis_prompt(page_number) },
                        {
                            "inline_data": {
                                "mime_type": "image/png",
                                "data": encoded
                            }
                        }
                    ]
                }
            ],
            "generationConfig": {
                "temperature": 0.0,
                "maxOutputTokens": self.config.max_output_tokens
            }
        });

        let url = format!(
            "{}/{}:generateContent",
            self.config.base_url, self.config.model
        );
        let delay = Duration::from_secs(self.config.retry_delay_secs);
        let mut attempt = 0usize;

        loop {
            attempt += 1;
            let response = match self
                .http
                .post(&url)
                .header("x-goog-api-key", self.api_key.clone())
                .json(&body)
                .send()
                .await
            {
                Ok(response) => response,
                Err(err) => {
                    warn!(page = page_number, error = %err, "vision service unreachable");
                    return Ok(None);
                }
            };

            let status = response.status();
            let text = response.text().await.unwrap_or_default();

            if status.is_success() {
                let analysis = parse_vision_response(&text);
                if analysis.is_none() {
                    warn!(page = page_number, "vision reply could not be parsed");
                }
                return Ok(analysis);
            }

            if is_rate_limited(status, &text) && attempt <= self.config.max_retries {
                warn!(
                    page = page_number,
                    attempt,
                    max = self.config.max_retries,
                    "vision service rate limited; waiting {}s",
                    delay.as_secs()
                );
                sleep(delay).await;
                continue;
            }

            warn!(page = page_number, %status, "vision service error");
            return Ok(None);
        }
    }
}

/// Builds the per-page analysis instruction.
fn analysis_prompt(page_number: usize) -> String {
    format!(
        "You are analyzing a rendered slide image (page {page_number}).\n\
         Extract ALL text content with precise bounding boxes.\n\
         For each piece of text: the exact content with proper word spacing, \
         the bounding box as [x, y, width, height] in pixels, and its role \
         (\"title\", \"subtitle\", \"body\", \"caption\", or \"label\").\n\
         Keep distinct visual blocks as separate elements; never merge text \
         from different areas. Also list graphics, icons, charts, and \
         decorative elements.\n\
         Return ONLY valid JSON (no markdown, no explanation):\n\
         {{\n\
           \"text_elements\": [{{\"text\": \"...\", \"bbox\": [x, y, w, h], \
         \"role\": \"title|subtitle|body|caption|label\", \
         \"font_size\": \"large|medium|small\", \"confidence\": 0.0}}],\n\
           \"graphics\": [{{\"type\": \"icon|diagram|chart|image|decoration\", \
         \"bbox\": [x, y, w, h], \"description\": \"...\", \"confidence\": 0.0}}],\n\
           \"layout_type\": \"title_with_image|two_column|centered|full_bleed|text_only\",\n\
           \"overall_confidence\": 0.0,\n\
           \"extraction_quality\": \"high|medium|low\"\n\
         }}"
    )
}

/// Parses the service reply into a [`VisionAnalysis`].
///
/// The reply is the raw `generateContent` response body; the analysis
/// JSON lives in the first candidate's text parts, possibly wrapped in a
/// markdown code fence. Any shape mismatch yields `None`.
pub fn parse_vision_response(body: &str) -> Option<VisionAnalysis> {
    let reply: GenerateContentResponse = serde_json::from_str(body).ok()?;
    let content = reply.candidates.first()?.content.as_ref()?;

    let mut text = String::new();
    for part in &content.parts {
        if let Some(part_text) = &part.text {
            text.push_str(part_text);
        }
    }

    let payload = strip_code_fences(&text);
    serde_json::from_str(payload.trim()).ok()
}

/// Strips a surrounding markdown code fence, if present.
fn strip_code_fences(text: &str) -> &str {
    if let Some(rest) = text.split("```json").nth(1) {
        return rest.split("```").next().unwrap_or(rest);
    }
    if let Some(rest) = text.split("```").nth(1) {
        return rest;
    }
    text
}

/// True when the response signals throttling rather than failure.
fn is_rate_limited(status: StatusCode, body: &str) -> bool {
    if status == StatusCode::TOO_MANY_REQUESTS {
        return true;
    }
    let code = status.as_u16();
    if code == 529 || code == 503 {
        return true;
    }
    let lower = body.to_lowercase();
    lower.contains("rate limit")
        || lower.contains("rate_limit")
        || lower.contains("resource_exhausted")
        || lower.contains("quota")
        || lower.contains("overloaded")
}

/// Converts a parsed analysis into pipeline text spans.
///
/// Watermark phrases are skipped; bounding boxes are validated against
/// the page bounds, with a small fallback box when the service omitted
/// one. The pixel font height is the validated box height.
pub fn analysis_to_spans(
    analysis: &VisionAnalysis,
    image_width: u32,
    image_height: u32,
    watermark: &WatermarkConfig,
) -> Vec<TextSpan> {
    let mut spans = Vec::with_capacity(analysis.text_elements.len());

    for element in &analysis.text_elements {
        let text = element.text.trim();
        if text.is_empty() {
            continue;
        }
        if watermark.matches(text) {
            debug!(text = %text, "discarding watermark span");
            continue;
        }

        let bbox = if element.bbox.len() >= 4 {
            BoundingBox::new(
                element.bbox[0] as i32,
                element.bbox[1] as i32,
                element.bbox[2].max(1) as u32,
                element.bbox[3].max(1) as u32,
            )
        } else {
            BoundingBox::new(0, 0, 100, 20)
        };
        let bbox = validate_bbox_in_bounds(&bbox, image_width, image_height);

        spans.push(TextSpan {
            text: text.to_string(),
            bbox,
            role: element.role,
            size_class: element.font_size,
            font_px: bbox.height as f32,
            font_name: None,
            font_color: None,
            confidence: element.confidence.clamp(0.0, 1.0),
        });
    }

    spans
}

#[derive(Debug, Deserialize)]
struct GenerateContentResponse {
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
    parts: Vec<CandidatePart>,
}

#[derive(Debug, Deserialize)]
struct CandidatePart {
    text: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn reply_with(analysis_json: &str) -> String {
        serde_json::to_string(&json!({
            "candidates": [
                { "content": { "parts": [ { "text": analysis_json } ] } }
            ]
        }))
        .unwrap()
    }

    #[test]
    fn parses_plain_json_reply() {
        let body = reply_with(
            r#"{"text_elements":[{"text":"Title","bbox":[10,10,200,40],"role":"title","confidence":0.95}]}"#,
        );
        let analysis = parse_vision_response(&body).unwrap();
        assert_eq!(analysis.text_elements.len(), 1);
        assert_eq!(analysis.text_elements[0].role, TextRole::Title);
        assert!(analysis.graphics.is_empty());
    }

    #[test]
    fn parses_fenced_json_reply() {
        let fenced = "```json\n{\"text_elements\":[{\"text\":\"x\",\"bbox\":[0,0,10,10]}]}\n```";
        let analysis = parse_vision_response(&reply_with(fenced)).unwrap();
        assert_eq!(analysis.text_elements.len(), 1);
        assert_eq!(analysis.text_elements[0].role, TextRole::Body);
    }

    #[test]
    fn malformed_reply_is_none() {
        assert!(parse_vision_response("not json at all").is_none());
        assert!(parse_vision_response(&reply_with("{ truncated")).is_none());
        assert!(parse_vision_response(r#"{"candidates":[]}"#).is_none());
    }

    #[test]
    fn absent_fields_become_empty_collections() {
        let analysis = parse_vision_response(&reply_with("{}")).unwrap();
        assert!(analysis.text_elements.is_empty());
        assert!(analysis.graphics.is_empty());
        assert!(analysis.layout_type.is_none());
    }

    #[test]
    fn spans_respect_bounds_and_watermark() {
        let analysis = parse_vision_response(&reply_with(
            r#"{
                "text_elements": [
                    {"text": "real", "bbox": [1800, 1000, 400, 300], "role": "body"},
                    {"text": "made with slidetool", "bbox": [10, 10, 100, 20]},
                    {"text": "boxless"}
                ]
            }"#,
        ))
        .unwrap();
        let watermark = WatermarkConfig {
            phrases: vec!["Made with SlideTool".to_string()],
            ..WatermarkConfig::default()
        };

        let spans = analysis_to_spans(&analysis, 1920, 1080, &watermark);
        assert_eq!(spans.len(), 2);
        assert!(spans[0].bbox.right() <= 1920);
        assert!(spans[0].bbox.bottom() <= 1080);
        // Missing bbox falls back to a small default box.
        assert_eq!(spans[1].bbox, BoundingBox::new(0, 0, 100, 20));
    }

    #[test]
    fn rate_limit_detection_covers_status_and_body() {
        assert!(is_rate_limited(StatusCode::TOO_MANY_REQUESTS, ""));
        assert!(is_rate_limited(StatusCode::SERVICE_UNAVAILABLE, ""));
        assert!(is_rate_limited(
            StatusCode::BAD_REQUEST,
            "RESOURCE_EXHAUSTED: quota exceeded"
        ));
        assert!(!is_rate_limited(StatusCode::BAD_REQUEST, "invalid argument"));
    }
}
