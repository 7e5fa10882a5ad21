// src/resolver.rs
use std::sync::Arc;

use crate::error::ResolveError;
use crate::store::ProviderStore;

/// Resolves provider references to display names. Stateless; one instance is
/// shared by every concurrent enrichment.
#[derive(Clone)]
pub struct ProviderResolver {
    store: Arc<dyn ProviderStore>,
}

impl ProviderResolver {
    pub fn new(store: Arc<dyn ProviderStore>) -> Self {
        Self { store }
    }

    pub async fn resolve(&self, provider_ref: &str) -> Result<String, ResolveError> {
        let provider_ref = provider_ref.trim();
        if provider_ref.is_empty() {
            return Err(ResolveError::EmptyReference);
        }
        match self.store.find_provider(provider_ref).await? {
            Some(p) => Ok(p.name),
            None => Err(ResolveError::NotFound(provider_ref.to_string())),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::Provider;
    use crate::store::InMemoryStore;

    #[tokio::test]
    async fn resolves_known_and_rejects_unknown() {
        let store = Arc::new(InMemoryStore::new());
        store.insert_provider(Provider {
            id: "ll2".into(),
            name: "Launch Library 2".into(),
        });
        let r = ProviderResolver::new(store);

        assert_eq!(r.resolve("ll2").await.unwrap(), "Launch Library 2");
        assert!(matches!(
            r.resolve("nope").await,
            Err(ResolveError::NotFound(id)) if id == "nope"
        ));
        assert!(matches!(
            r.resolve("  ").await,
            Err(ResolveError::EmptyReference)
        ));
    }
}
