use std::collections::HashMap;
use std::sync::Arc;

use thiserror::Error;

use super::{
    Capability, CapabilityFault, CapabilityInput, CapabilityKind, DocumentRequest,
    HeadlinesRequest, MessageRequest, PostRequest, RecentPostsRequest, SearchRequest,
    SharedCapability,
};

#[derive(Debug, Error, PartialEq, Eq)]
pub enum TableError {
    #[error("capability '{0}' already registered")]
    Duplicate(CapabilityKind),

    #[error("required capability '{0}' is missing")]
    Missing(CapabilityKind),
}

#[derive(Default)]
pub struct CapabilityTableBuilder {
    capabilities: HashMap<CapabilityKind, SharedCapability>,
}

impl CapabilityTableBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn register<C>(self, capability: C) -> Result<Self, TableError>
    where
        C: Capability + 'static,
    {
        self.register_shared(Arc::new(capability))
    }

    pub fn register_shared(mut self, capability: SharedCapability) -> Result<Self, TableError> {
        let kind = capability.kind();
        if self.capabilities.contains_key(&kind) {
            return Err(TableError::Duplicate(kind));
        }
        self.capabilities.insert(kind, capability);
        Ok(self)
    }

    /// Freezes the table, failing if any `required` kind was never registered.
    pub fn build(self, required: &[CapabilityKind]) -> Result<CapabilityTable, TableError> {
        if let Some(missing) = required
            .iter()
            .find(|kind| !self.capabilities.contains_key(*kind))
        {
            return Err(TableError::Missing(*missing));
        }

        Ok(CapabilityTable {
            capabilities: Arc::new(self.capabilities),
        })
    }
}

/// Read-only mapping from capability kind to implementation.
///
/// Cheap to clone; clones share the same capabilities.
#[derive(Clone, Default)]
pub struct CapabilityTable {
    capabilities: Arc<HashMap<CapabilityKind, SharedCapability>>,
}

impl CapabilityTable {
    pub fn builder() -> CapabilityTableBuilder {
        CapabilityTableBuilder::new()
    }

    pub fn get(&self, kind: CapabilityKind) -> Option<SharedCapability> {
        self.capabilities.get(&kind).map(Arc::clone)
    }

    pub fn contains(&self, kind: CapabilityKind) -> bool {
        self.capabilities.contains_key(&kind)
    }

    pub fn kinds(&self) -> Vec<CapabilityKind> {
        let mut kinds: Vec<CapabilityKind> = self.capabilities.keys().copied().collect();
        kinds.sort();
        kinds
    }

    pub fn require(&self, required: &[CapabilityKind]) -> Result<(), TableError> {
        match required.iter().find(|kind| !self.contains(**kind)) {
            Some(missing) => Err(TableError::Missing(*missing)),
            None => Ok(()),
        }
    }

    pub fn len(&self) -> usize {
        self.capabilities.len()
    }

    pub fn is_empty(&self) -> bool {
        self.capabilities.is_empty()
    }

    /// Invokes the capability owning `input`.
    ///
    /// A kind that is absent from the table surfaces as a fault rather than a panic.
    pub async fn invoke(&self, input: CapabilityInput) -> Result<String, CapabilityFault> {
        let kind = input.kind();
        let capability = self.get(kind).ok_or_else(|| {
            CapabilityFault::Failed(format!("capability '{}' is not registered", kind))
        })?;
        capability.invoke(input).await
    }

    pub async fn fetch_headlines(
        &self,
        request: HeadlinesRequest,
    ) -> Result<String, CapabilityFault> {
        self.invoke(request.into()).await
    }

    pub async fn send_message(&self, request: MessageRequest) -> Result<String, CapabilityFault> {
        self.invoke(request.into()).await
    }

    pub async fn fetch_recent_posts(
        &self,
        request: RecentPostsRequest,
    ) -> Result<String, CapabilityFault> {
        self.invoke(request.into()).await
    }

    pub async fn post_message(&self, request: PostRequest) -> Result<String, CapabilityFault> {
        self.invoke(request.into()).await
    }

    pub async fn summarize_document(
        &self,
        request: DocumentRequest,
    ) -> Result<String, CapabilityFault> {
        self.invoke(request.into()).await
    }

    pub async fn web_search(&self, request: SearchRequest) -> Result<String, CapabilityFault> {
        self.invoke(request.into()).await
    }
}
