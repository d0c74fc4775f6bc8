use serde::Deserialize;
use tracing::{error, trace};

use super::extract_json_object;
use crate::error::{AppError, AppResult};

/// A structured result the model is asked to reply with.
///
/// Parsing is tolerant: valid JSON is taken directly, otherwise the first
/// balanced JSON object is extracted from the (possibly fenced or chatty)
/// reply before deserializing.
pub trait Query: Sized + for<'de> Deserialize<'de> {
    /// Name used in parse diagnostics.
    const NAME: &'static str;

    fn from_response(raw: &str) -> AppResult<Self> {
        trace!("Raw content: {raw}");

        // Fast path: the model obeyed and replied with bare JSON.
        if let Ok(res) = serde_json::from_str(raw) {
            return Ok(res);
        }

        // Fallback: dig the JSON object out of surrounding noise.
        let candidate = extract_json_object(raw).ok_or_else(|| {
            error!("No JSON object found in {} response", Self::NAME);
            AppError::Parse(format!("no JSON object in {} response", Self::NAME))
        })?;
        trace!("Extracted content: {candidate}");
        let jd = &mut serde_json::Deserializer::from_str(candidate);
        serde_path_to_error::deserialize(jd).map_err(|e| {
            error!("Failed to deserialize {}: {e}", Self::NAME);
            error!("Failed to parse JSON at path: {}", e.path());
            AppError::Parse(format!("{}: {} at {}", Self::NAME, e.inner(), e.path()))
        })
    }
}

/// Parsed README summarization reply.
#[derive(Debug, Clone, Deserialize)]
pub struct AiSummaryResult {
    #[serde(default)]
    pub summary: String,
    #[serde(default, rename = "techStack", alias = "tech_stack")]
    pub tech_stack: Vec<String>,
}

impl Query for AiSummaryResult {
    const NAME: &'static str = "readme summary";
}

/// Parsed tech-stack extraction reply.
#[derive(Debug, Clone, Deserialize)]
pub struct TechStackList {
    #[serde(default, rename = "techStack", alias = "tech_stack")]
    pub tech_stack: Vec<String>,
}

impl Query for TechStackList {
    const NAME: &'static str = "tech stack extraction";
}
