use std::sync::Arc;

use crate::{
    foundation::error::{ForgeError, ForgeResult},
    provider::{
        backend::{ImageProvider, ProviderCredentials, ProviderKind},
        guard::{GuardedProvider, RetryPolicy},
        local::LocalRenderer,
        remote::{FireflyProvider, OpenAiImagesProvider},
    },
};

/// Name that requests automatic backend selection.
pub const AUTO: &str = "auto";

/// Outcome of provider selection.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Selection {
    pub kind: ProviderKind,
    /// True when the requested backend was unavailable and the local renderer was used instead.
    pub fell_back: bool,
}

/// Pure selection policy over (requested name, health of registered backends).
///
/// - `auto`: first healthy backend in [`ProviderKind::PRIORITY`] order, else local.
/// - a specific name: that backend when registered and healthy, else local.
pub fn select_provider(requested: &str, health: &[(ProviderKind, bool)]) -> ForgeResult<Selection> {
    let healthy = |kind: ProviderKind| health.iter().any(|&(k, ok)| k == kind && ok);

    if requested.trim().eq_ignore_ascii_case(AUTO) {
        let kind = ProviderKind::PRIORITY
            .into_iter()
            .find(|k| healthy(*k))
            .unwrap_or(ProviderKind::Local);
        return Ok(Selection {
            kind,
            fell_back: false,
        });
    }

    let wanted = ProviderKind::parse(requested)?;
    if healthy(wanted) || wanted == ProviderKind::Local {
        return Ok(Selection {
            kind: wanted,
            fell_back: false,
        });
    }
    Ok(Selection {
        kind: ProviderKind::Local,
        fell_back: true,
    })
}

/// Set of generation backends available to a run.
pub struct ProviderRegistry {
    providers: Vec<Arc<dyn ImageProvider>>,
}

impl ProviderRegistry {
    /// Registry holding only the offline renderer.
    pub fn local_only() -> Self {
        Self {
            providers: vec![Arc::new(LocalRenderer::new())],
        }
    }

    /// Local renderer plus every remote backend that has credentials, each behind `policy`.
    pub fn with_credentials(creds: &ProviderCredentials, policy: RetryPolicy) -> Self {
        let mut reg = Self::local_only();
        if let Some(key) = &creds.firefly_api_key {
            let inner = Arc::new(FireflyProvider::new(
                key.clone(),
                creds.firefly_workspace_id.clone(),
            ));
            reg.register(Arc::new(GuardedProvider::new(inner, policy)));
        }
        if let Some(key) = &creds.openai_api_key {
            let inner = Arc::new(OpenAiImagesProvider::new(key.clone()));
            reg.register(Arc::new(GuardedProvider::new(inner, policy)));
        }
        reg
    }

    /// Add or replace the backend of the same kind.
    pub fn register(&mut self, provider: Arc<dyn ImageProvider>) {
        let kind = provider.kind();
        self.providers.retain(|p| p.kind() != kind);
        self.providers.push(provider);
    }

    pub fn get(&self, kind: ProviderKind) -> Option<Arc<dyn ImageProvider>> {
        self.providers.iter().find(|p| p.kind() == kind).cloned()
    }

    /// Probe every registered backend once.
    pub fn health(&self) -> Vec<(ProviderKind, bool)> {
        self.providers
            .iter()
            .map(|p| (p.kind(), p.health_check()))
            .collect()
    }

    /// Resolve `requested` to a concrete backend.
    pub fn select(&self, requested: &str) -> ForgeResult<Arc<dyn ImageProvider>> {
        let selection = select_provider(requested, &self.health())?;
        if selection.fell_back {
            tracing::warn!(
                requested,
                "requested provider unavailable; falling back to local renderer"
            );
        }
        tracing::info!(provider = selection.kind.name(), "selected generation provider");
        match self.get(selection.kind) {
            Some(p) => Ok(p),
            None if selection.kind == ProviderKind::Local => Ok(Arc::new(LocalRenderer::new())),
            None => Err(ForgeError::configuration(format!(
                "provider '{}' selected but not registered",
                selection.kind
            ))),
        }
    }
}

impl Default for ProviderRegistry {
    fn default() -> Self {
        Self::local_only()
    }
}

#[cfg(test)]
#[path = "../../tests/unit/provider/registry.rs"]
mod tests;
