//! Parsing and normalization of generation-model output.
//!
//! The model is asked for one strict-JSON object but is not guaranteed to
//! honor that. The pipeline is a single pass: strip optional code fences,
//! try strict JSON, and on failure scan the raw text for a known Mermaid
//! opening keyword. The keyword scan is best effort - no grammar, no
//! look-ahead - and produces an empty analysis with a warning summary.

use crate::models::Analysis;
use regex::Regex;
use serde::Deserialize;
use std::sync::LazyLock;
use tracing::warn;

/// How much of an unparsable response is echoed back for diagnosis.
pub const RESPONSE_SNIPPET_LEN: usize = 500;

/// Caps applied to the analysis before it is persisted. A chatty model can
/// return arbitrarily large structures; the request still succeeds, the
/// overflow is dropped.
pub const MAX_FLOW_POINTS: usize = 100;
pub const MAX_ANALYSIS_BYTES: usize = 64 * 1024;

/// Summary used when the analysis was lost to a JSON parse failure.
pub const PARSE_FALLBACK_SUMMARY: &str =
    "Analysis JSON parsing failed. Displaying raw diagram if possible.";

static CODE_FENCE_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?s)^```(?:json)?\s*|\s*```$").unwrap());

static DIAGRAM_KEYWORD_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r"(?i)graph TD;|flowchart TD;|sequenceDiagram;|classDiagram;|stateDiagram;|erDiagram;|journey;|gantt|pie|mindmap",
    )
    .unwrap()
});

/// Outcome of one parse of the raw completion text.
#[derive(Debug)]
pub enum ParsedOutput {
    /// Valid JSON with usable diagram code.
    Structured {
        diagram_code: String,
        analysis: Analysis,
    },
    /// JSON parse failed but a Mermaid keyword was found; code is the raw
    /// text from the keyword onward, analysis is empty with a warning summary.
    Recovered {
        diagram_code: String,
        analysis: Analysis,
    },
    /// Valid JSON carrying the model's own error field.
    Declined { reason: String },
    /// Nothing recoverable. `message` is client-facing; `snippet` and
    /// `detail` go into the diagnostic body.
    Failed {
        message: String,
        snippet: String,
        detail: Option<String>,
    },
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct LlmOutput {
    mermaid_code: Option<String>,
    analysis: Option<Analysis>,
    error: Option<String>,
}

/// Remove a leading ```json (or bare ```) fence and a trailing ``` fence.
pub fn strip_code_fences(raw: &str) -> String {
    CODE_FENCE_RE.replace_all(raw.trim(), "").trim().to_string()
}

fn snippet(raw: &str) -> String {
    raw.chars().take(RESPONSE_SNIPPET_LEN).collect()
}

/// Single-pass parse of the raw completion text.
pub fn parse_llm_output(raw: &str) -> ParsedOutput {
    let cleaned = strip_code_fences(raw);

    match serde_json::from_str::<LlmOutput>(&cleaned) {
        Ok(output) => {
            if let Some(reason) = output.error {
                return ParsedOutput::Declined { reason };
            }
            let diagram_code = output
                .mermaid_code
                .map(|code| code.trim().to_string())
                .unwrap_or_default();
            if diagram_code.is_empty() {
                // The model can fail to produce code without using its error field.
                return ParsedOutput::Failed {
                    message: "AI failed to generate diagram code.".to_string(),
                    snippet: snippet(raw),
                    detail: None,
                };
            }
            ParsedOutput::Structured {
                diagram_code,
                analysis: output.analysis.unwrap_or_default(),
            }
        }
        Err(parse_err) => match DIAGRAM_KEYWORD_RE.find(raw) {
            Some(m) => {
                warn!("Falling back to keyword extraction for mermaid code after JSON parse failure");
                ParsedOutput::Recovered {
                    diagram_code: raw[m.start()..].trim().to_string(),
                    analysis: Analysis {
                        summary: PARSE_FALLBACK_SUMMARY.to_string(),
                        ..Default::default()
                    },
                }
            }
            None => ParsedOutput::Failed {
                message: "Failed to parse analysis from AI. The AI response was not valid JSON. Ensure the AI returns only a JSON object.".to_string(),
                snippet: snippet(raw),
                detail: Some(parse_err.to_string()),
            },
        },
    }
}

/// Take up to `max` characters; the bool reports whether anything was cut.
fn truncate_chars(text: &str, max: usize) -> (String, bool) {
    let prefix: String = text.chars().take(max).collect();
    let truncated = text.chars().count() > max;
    (prefix, truncated)
}

/// Fill defaulted analysis fields and apply the persistence caps.
pub fn normalize_analysis(mut analysis: Analysis, input_text: &str) -> Analysis {
    if analysis.summary.trim().is_empty() {
        let (prefix, truncated) = truncate_chars(input_text, 100);
        analysis.summary = format!(
            "Diagram based on input: \"{}{}\"",
            prefix,
            if truncated { "..." } else { "" }
        );
    }

    if analysis.flow_points.len() > MAX_FLOW_POINTS {
        warn!(
            dropped = analysis.flow_points.len() - MAX_FLOW_POINTS,
            "Truncating oversized flowPoints before persisting"
        );
        analysis.flow_points.truncate(MAX_FLOW_POINTS);
    }

    // Nothing in the analysis is kept at unbounded size. Shed weight in
    // order of how replaceable the content is: extra model-supplied fields
    // first, then arrow meanings, then flow points, and as a last resort the
    // summary itself is cut down.
    while serialized_len(&analysis) > MAX_ANALYSIS_BYTES && !analysis.extra.is_empty() {
        if let Some((key, _)) = analysis.extra.pop_last() {
            warn!(field = %key, "Dropping extra analysis field to stay within size cap");
        }
    }
    while serialized_len(&analysis) > MAX_ANALYSIS_BYTES && !analysis.arrow_meanings.is_empty() {
        if let Some((key, _)) = analysis.arrow_meanings.pop_last() {
            warn!(arrow = %key, "Dropping arrow meaning to stay within size cap");
        }
    }
    while serialized_len(&analysis) > MAX_ANALYSIS_BYTES && !analysis.flow_points.is_empty() {
        analysis.flow_points.pop();
    }
    while serialized_len(&analysis) > MAX_ANALYSIS_BYTES && !analysis.summary.is_empty() {
        let keep = analysis.summary.chars().count() / 2;
        analysis.summary = analysis.summary.chars().take(keep).collect();
    }

    analysis
}

fn serialized_len(analysis: &Analysis) -> usize {
    serde_json::to_vec(analysis).map(|v| v.len()).unwrap_or(0)
}

/// Display title: the summary when it sits in a sane display range,
/// otherwise a truncated prefix of the original input.
pub fn derive_title(summary: &str, input_text: &str) -> String {
    let len = summary.chars().count();
    if len > 10 && len < 150 {
        summary.to_string()
    } else {
        let (prefix, truncated) = truncate_chars(input_text, 50);
        format!(
            "Diagram: {}{}",
            prefix,
            if truncated { "..." } else { "" }
        )
    }
}
