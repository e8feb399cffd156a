//! Long-lived context shared by all operations.

use std::path::Path;

use vmask_media::ProcessorConfig;
use vmask_session::SessionStore;

/// Resources the operation surface works against.
///
/// One context serves many operation calls; per-call state (decode handles,
/// temp frame stores) lives in the `RunContext` each media operation
/// creates for itself.
#[derive(Debug, Clone)]
pub struct OpsContext {
    config: ProcessorConfig,
    store: SessionStore,
}

impl OpsContext {
    pub fn new(config: ProcessorConfig) -> Self {
        let store = SessionStore::new(config.output_dir.join("annotations"));
        Self { config, store }
    }

    /// Use an explicit session store root instead of the default
    /// `{output_dir}/annotations`.
    pub fn with_store_root(config: ProcessorConfig, root: impl AsRef<Path>) -> Self {
        let store = SessionStore::new(root.as_ref());
        Self { config, store }
    }

    pub fn config(&self) -> &ProcessorConfig {
        &self.config
    }

    pub fn store(&self) -> &SessionStore {
        &self.store
    }
}
