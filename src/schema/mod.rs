// 参数 schema：注册表、发现与校验

pub mod discovery;
pub mod metadata;
pub mod registry;
pub mod validation;

pub use discovery::ParameterDiscovery;
pub use metadata::{
    FlowParameterSchema, ParameterDomain, ParameterKind, ParameterMetadata, ValidationReport,
};
pub use registry::{generic_parameters, ParameterSchemaRegistry, SharedSchemaRegistry};
pub use validation::validate_parameters;
