use std::sync::Arc;

use futures::future::join_all;

use super::provider::{invoke, ImageProvider, ProviderResult};

#[derive(Clone, Debug, PartialEq)]
pub struct ProviderOutcome {
    pub provider: String,
    pub result: ProviderResult,
}

/// Runs every provider at once and waits for all of them. The returned
/// outcomes follow `providers` order, not completion order. There is no
/// deadline beyond what each provider enforces on its own call.
pub async fn fan_out(
    providers: &[Arc<dyn ImageProvider>],
    model: &str,
    prompt: &str,
) -> Vec<ProviderOutcome> {
    let calls = providers.iter().map(|provider| async move {
        ProviderOutcome {
            provider: provider.name().to_string(),
            result: invoke(provider.as_ref(), model, prompt).await,
        }
    });

    join_all(calls).await
}
