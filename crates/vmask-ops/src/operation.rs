//! The operation trait and its name-keyed registry.

use async_trait::async_trait;
use schemars::schema::RootSchema;
use serde::de::DeserializeOwned;
use serde_json::Value;
use std::collections::BTreeMap;
use std::sync::Arc;
use tracing::debug;

use crate::context::OpsContext;
use crate::error::{OpsError, OpsResult};

/// One invocable operation with a compile-time parameter schema.
#[async_trait]
pub trait Operation: Send + Sync {
    /// Stable name callers dispatch on.
    fn name(&self) -> &'static str;

    /// One-line human description.
    fn description(&self) -> &'static str;

    /// JSON Schema of the accepted parameters.
    fn parameters_schema(&self) -> RootSchema;

    /// Run the operation. `params` must match [`Self::parameters_schema`].
    async fn execute(&self, ctx: &OpsContext, params: Value) -> OpsResult<Value>;
}

/// Deserialize operation parameters, treating `null` as `{}` so
/// parameterless operations can be invoked bare.
pub(crate) fn parse_params<T: DeserializeOwned>(params: Value) -> OpsResult<T> {
    let params = if params.is_null() {
        Value::Object(serde_json::Map::new())
    } else {
        params
    };
    serde_json::from_value(params).map_err(|e| OpsError::invalid_parameters(e.to_string()))
}

/// Dispatch table from operation name to implementation.
///
/// The set is closed: operations are registered up front and an unknown
/// name is an error, not a fallback.
pub struct OperationRegistry {
    ops: BTreeMap<&'static str, Arc<dyn Operation>>,
}

impl OperationRegistry {
    /// An empty registry.
    pub fn new() -> Self {
        Self {
            ops: BTreeMap::new(),
        }
    }

    /// The full built-in operation set.
    pub fn builtin() -> Self {
        use crate::operations::{
            ApplyMosaicOp, CreateSessionOp, ExtractFramesOp, ListSessionsOp, LoadAnnotationOp,
            SupportedFormatsOp, ValidateVideoOp, VideoInfoOp,
        };

        let mut registry = Self::new();
        registry.register(Arc::new(ExtractFramesOp));
        registry.register(Arc::new(ApplyMosaicOp));
        registry.register(Arc::new(VideoInfoOp));
        registry.register(Arc::new(ValidateVideoOp));
        registry.register(Arc::new(SupportedFormatsOp));
        registry.register(Arc::new(CreateSessionOp));
        registry.register(Arc::new(LoadAnnotationOp));
        registry.register(Arc::new(ListSessionsOp));
        registry
    }

    /// Add an operation, replacing any previous one with the same name.
    pub fn register(&mut self, op: Arc<dyn Operation>) {
        self.ops.insert(op.name(), op);
    }

    /// Look up an operation by name.
    pub fn get(&self, name: &str) -> Option<&Arc<dyn Operation>> {
        self.ops.get(name)
    }

    /// Registered names, sorted.
    pub fn names(&self) -> Vec<&'static str> {
        self.ops.keys().copied().collect()
    }

    /// Invoke an operation by name.
    pub async fn dispatch(
        &self,
        ctx: &OpsContext,
        name: &str,
        params: Value,
    ) -> OpsResult<Value> {
        let op = self
            .get(name)
            .ok_or_else(|| OpsError::unknown_operation(name))?;

        debug!(operation = name, "Dispatching operation");
        op.execute(ctx, params).await
    }
}

impl Default for OperationRegistry {
    fn default() -> Self {
        Self::builtin()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_builtin_set_is_closed_and_stable() {
        let registry = OperationRegistry::builtin();
        assert_eq!(
            registry.names(),
            vec![
                "apply_mosaic",
                "create_session",
                "extract_frames",
                "list_sessions",
                "load_annotation",
                "supported_formats",
                "validate_video",
                "video_info",
            ]
        );
    }

    #[tokio::test]
    async fn test_unknown_name_is_rejected() {
        let registry = OperationRegistry::builtin();
        let ctx = OpsContext::new(vmask_media::ProcessorConfig::default());

        let err = registry
            .dispatch(&ctx, "transmogrify", Value::Null)
            .await
            .unwrap_err();
        assert!(matches!(err, OpsError::UnknownOperation(_)));
    }

    #[test]
    fn test_every_operation_declares_a_schema() {
        let registry = OperationRegistry::builtin();
        for name in registry.names() {
            let op = registry.get(name).unwrap();
            let schema = serde_json::to_value(op.parameters_schema()).unwrap();
            assert!(schema.is_object(), "{name} has no schema");
            assert!(!op.description().is_empty());
        }
    }
}
