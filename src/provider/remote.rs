use crate::{
    foundation::error::{ForgeError, ForgeResult},
    provider::backend::{GenerateRequest, Generated, ImageProvider, ProviderKind},
};

/// Adobe Firefly backend.
///
/// The HTTP integration is not part of this build, so the backend never reports healthy and
/// selection falls through to the local renderer. A direct `generate_image` call reports a
/// typed error.
#[derive(Clone, Debug)]
pub struct FireflyProvider {
    api_key: String,
    workspace_id: Option<String>,
}

impl FireflyProvider {
    pub fn new(api_key: impl Into<String>, workspace_id: Option<String>) -> Self {
        Self {
            api_key: api_key.into(),
            workspace_id,
        }
    }

    pub fn workspace_id(&self) -> Option<&str> {
        self.workspace_id.as_deref()
    }
}

impl ImageProvider for FireflyProvider {
    fn kind(&self) -> ProviderKind {
        ProviderKind::Firefly
    }

    fn health_check(&self) -> bool {
        if !self.api_key.trim().is_empty() {
            tracing::debug!("firefly key configured but no API integration; reporting unhealthy");
        }
        false
    }

    fn generate_image(&self, req: &GenerateRequest) -> ForgeResult<Generated> {
        tracing::debug!(
            width = req.size.width,
            height = req.size.height,
            workspace = ?self.workspace_id,
            "firefly generation requested"
        );
        Err(ForgeError::generation(
            "firefly backend has no API integration in this build; use provider=local for offline runs",
        ))
    }
}

/// OpenAI Images backend. Like [`FireflyProvider`], never healthy without an API integration.
#[derive(Clone, Debug)]
pub struct OpenAiImagesProvider {
    api_key: String,
}

impl OpenAiImagesProvider {
    pub fn new(api_key: impl Into<String>) -> Self {
        Self {
            api_key: api_key.into(),
        }
    }
}

impl ImageProvider for OpenAiImagesProvider {
    fn kind(&self) -> ProviderKind {
        ProviderKind::OpenAi
    }

    fn health_check(&self) -> bool {
        if !self.api_key.trim().is_empty() {
            tracing::debug!("openai key configured but no API integration; reporting unhealthy");
        }
        false
    }

    fn generate_image(&self, req: &GenerateRequest) -> ForgeResult<Generated> {
        tracing::debug!(
            width = req.size.width,
            height = req.size.height,
            "openai generation requested"
        );
        Err(ForgeError::generation(
            "openai backend has no API integration in this build; use provider=local for offline runs",
        ))
    }
}
