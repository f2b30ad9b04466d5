//! Rewrites recorded payloads with replay parameters.
//!
//! Each tool is classified into a primary domain by its registered parameter
//! metadata, and the transform registered for that domain rewrites a copy of
//! the payload. The input payload is never touched.

mod domains;

use std::collections::HashMap;
use std::sync::Arc;

use serde_json::{Map, Value};
use tracing::{debug, warn};

pub use domains::{BusinessTransform, GenericTransform, VisualTransform};

use crate::flow::{FlowParameters, ToolPayload};
use crate::schema::{ParameterDomain, SharedSchemaRegistry};

/// A domain-specific rewrite over the open field map of a payload.
pub trait PayloadTransform: Send + Sync {
    fn apply(&self, fields: &mut Map<String, Value>, parameters: &FlowParameters);
}

pub struct ParameterTransformer {
    registry: SharedSchemaRegistry,
    transforms: HashMap<ParameterDomain, Arc<dyn PayloadTransform>>,
}

impl ParameterTransformer {
    /// Transformer with the visual, business and generic rules installed.
    pub fn new(registry: SharedSchemaRegistry) -> Self {
        let mut transformer = Self {
            registry,
            transforms: HashMap::new(),
        };
        transformer.register_transform(ParameterDomain::Visual, Arc::new(VisualTransform));
        transformer.register_transform(ParameterDomain::Business, Arc::new(BusinessTransform));
        transformer.register_transform(ParameterDomain::Generic, Arc::new(GenericTransform));
        transformer
    }

    pub fn register_transform(
        &mut self,
        domain: ParameterDomain,
        transform: Arc<dyn PayloadTransform>,
    ) {
        self.transforms.insert(domain, transform);
    }

    pub fn apply(
        &self,
        payload: &ToolPayload,
        parameters: &FlowParameters,
        tool: &str,
    ) -> ToolPayload {
        let Some(domain) = self.registry.read().domain_of(tool) else {
            debug!(tool, "no parameter schema for tool, payload left unchanged");
            return payload.clone();
        };
        let Some(transform) = self.transforms.get(&domain) else {
            return payload.clone();
        };
        let Some(mut fields) = payload.to_map() else {
            warn!(tool, "payload is not an object, parameters not applied");
            return payload.clone();
        };

        transform.apply(&mut fields, parameters);
        ToolPayload::from_map(tool, fields)
    }
}
