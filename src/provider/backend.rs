use std::sync::Arc;

use image::RgbImage;

use crate::foundation::{
    core::CanvasSize,
    error::{ForgeError, ForgeResult},
};

/// Parameters for one image generation call.
#[derive(Clone, Debug, PartialEq)]
pub struct GenerateRequest {
    pub prompt: String,
    pub size: CanvasSize,
    pub seed: Option<u64>,
    /// Encoded reference image steering style, when the backend supports it.
    pub style_ref: Option<Arc<Vec<u8>>>,
    pub negative_prompt: Option<String>,
}

impl GenerateRequest {
    pub fn new(prompt: impl Into<String>, size: CanvasSize, seed: Option<u64>) -> Self {
        Self {
            prompt: prompt.into(),
            size,
            seed,
            style_ref: None,
            negative_prompt: None,
        }
    }
}

/// Raw generation output: pixels plus backend-specific metadata.
#[derive(Clone, Debug)]
pub struct Generated {
    pub image: RgbImage,
    pub metadata: serde_json::Map<String, serde_json::Value>,
}

/// A generation capability that turns a prompt into pixels.
///
/// Implementations must be shareable across worker threads.
pub trait ImageProvider: Send + Sync {
    fn kind(&self) -> ProviderKind;

    /// Stable provider name recorded in results and provenance.
    fn name(&self) -> &'static str {
        self.kind().name()
    }

    /// Cheap readiness probe; must not perform a generation.
    fn health_check(&self) -> bool;

    fn generate_image(&self, req: &GenerateRequest) -> ForgeResult<Generated>;
}

/// Known generation backends.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ProviderKind {
    /// Offline deterministic renderer; always available.
    Local,
    Firefly,
    #[serde(rename = "openai")]
    OpenAi,
}

impl ProviderKind {
    /// Probe order used by automatic selection.
    pub const PRIORITY: [ProviderKind; 3] =
        [ProviderKind::Firefly, ProviderKind::OpenAi, ProviderKind::Local];

    pub fn name(self) -> &'static str {
        match self {
            ProviderKind::Local => "local",
            ProviderKind::Firefly => "firefly",
            ProviderKind::OpenAi => "openai",
        }
    }

    /// Parse a backend name. `mock` is accepted as an alias for the local renderer.
    pub fn parse(name: &str) -> ForgeResult<Self> {
        match name.trim().to_ascii_lowercase().as_str() {
            "local" | "mock" => Ok(ProviderKind::Local),
            "firefly" => Ok(ProviderKind::Firefly),
            "openai" => Ok(ProviderKind::OpenAi),
            other => Err(ForgeError::configuration(format!(
                "unknown provider '{other}' (expected auto|firefly|openai|local)"
            ))),
        }
    }

    pub fn is_remote(self) -> bool {
        !matches!(self, ProviderKind::Local)
    }
}

impl std::fmt::Display for ProviderKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.name())
    }
}

/// API credentials for remote backends. Absent keys make that backend unhealthy.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct ProviderCredentials {
    pub firefly_api_key: Option<String>,
    pub firefly_workspace_id: Option<String>,
    pub openai_api_key: Option<String>,
}

impl ProviderCredentials {
    /// Read `FIREFLY_API_KEY`, `FIREFLY_WORKSPACE_ID` and `OPENAI_API_KEY`.
    pub fn from_env() -> Self {
        fn var(name: &str) -> Option<String> {
            std::env::var(name).ok().filter(|v| !v.trim().is_empty())
        }
        Self {
            firefly_api_key: var("FIREFLY_API_KEY"),
            firefly_workspace_id: var("FIREFLY_WORKSPACE_ID"),
            openai_api_key: var("OPENAI_API_KEY"),
        }
    }
}
