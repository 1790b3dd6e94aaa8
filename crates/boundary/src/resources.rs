//! Named resources the hub can ask a boundary for.

use {
    async_trait::async_trait,
    serde_json::Value,
    std::{
        collections::HashMap,
        future::Future,
        sync::{Arc, RwLock},
    },
    tracing::{debug, warn},
};

/// Produces the value of one resource from the request's `data`.
#[async_trait]
pub trait ResourceProvider: Send + Sync {
    async fn provide(&self, data: &Value) -> anyhow::Result<Value>;
}

/// Adapter turning an async closure into a [`ResourceProvider`].
pub struct FnProvider<F>(F);

pub fn provider_fn<F>(f: F) -> FnProvider<F> {
    FnProvider(f)
}

#[async_trait]
impl<F, Fut> ResourceProvider for FnProvider<F>
where
    F: Fn(Value) -> Fut + Send + Sync,
    Fut: Future<Output = anyhow::Result<Value>> + Send,
{
    async fn provide(&self, data: &Value) -> anyhow::Result<Value> {
        (self.0)(data.clone()).await
    }
}

/// Resource name to provider. Registering a name again replaces the earlier
/// provider.
#[derive(Default)]
pub struct ResourceRegistry {
    providers: RwLock<HashMap<String, Arc<dyn ResourceProvider>>>,
}

impl std::fmt::Debug for ResourceRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ResourceRegistry")
            .field("resources", &self.names())
            .finish()
    }
}

impl ResourceRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn register(&self, name: impl Into<String>, provider: impl ResourceProvider + 'static) {
        let name = name.into();
        let previous = self
            .providers
            .write()
            .unwrap_or_else(|e| e.into_inner())
            .insert(name.clone(), Arc::new(provider));
        if previous.is_some() {
            debug!(resource = %name, "resource provider replaced");
        }
    }

    pub fn contains(&self, name: &str) -> bool {
        self.providers
            .read()
            .unwrap_or_else(|e| e.into_inner())
            .contains_key(name)
    }

    /// Registered resource names, sorted.
    pub fn names(&self) -> Vec<String> {
        let mut names: Vec<String> = self
            .providers
            .read()
            .unwrap_or_else(|e| e.into_inner())
            .keys()
            .cloned()
            .collect();
        names.sort();
        names
    }

    /// Look up `name` and run its provider.
    ///
    /// Unknown resources and failing providers both yield `Value::Null`, so
    /// the hub always gets an answer.
    pub async fn gather(&self, name: &str, data: &Value) -> Value {
        let provider = self
            .providers
            .read()
            .unwrap_or_else(|e| e.into_inner())
            .get(name)
            .cloned();
        let Some(provider) = provider else {
            debug!(resource = %name, "no provider for requested resource");
            return Value::Null;
        };
        match provider.provide(data).await {
            Ok(value) => value,
            Err(e) => {
                warn!(resource = %name, error = %e, "resource provider failed");
                Value::Null
            },
        }
    }
}

#[allow(clippy::unwrap_used, clippy::expect_used)]
#[cfg(test)]
mod tests {
    use {super::*, serde_json::json};

    #[tokio::test]
    async fn unknown_resource_is_null() {
        let registry = ResourceRegistry::new();
        assert_eq!(registry.gather("nope", &json!({})).await, Value::Null);
    }

    #[tokio::test]
    async fn provider_receives_request_data() {
        let registry = ResourceRegistry::new();
        registry.register(
            "echo",
            provider_fn(|data: Value| async move { Ok(json!({"got": data})) }),
        );
        let value = registry.gather("echo", &json!({"id": "u1"})).await;
        assert_eq!(value, json!({"got": {"id": "u1"}}));
    }

    #[tokio::test]
    async fn failing_provider_answers_null() {
        let registry = ResourceRegistry::new();
        registry.register(
            "broken",
            provider_fn(|_data: Value| async { Err::<Value, _>(anyhow::anyhow!("db down")) }),
        );
        assert_eq!(registry.gather("broken", &Value::Null).await, Value::Null);
    }

    #[tokio::test]
    async fn later_registration_replaces_earlier() {
        let registry = ResourceRegistry::new();
        registry.register("v", provider_fn(|_d: Value| async { Ok(json!(1)) }));
        registry.register("v", provider_fn(|_d: Value| async { Ok(json!(2)) }));
        assert_eq!(registry.names(), vec!["v"]);
        assert_eq!(registry.gather("v", &Value::Null).await, json!(2));
    }
}
