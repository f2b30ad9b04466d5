use std::collections::{BTreeMap, HashMap};
use std::sync::Arc;

use once_cell::sync::Lazy;
use parking_lot::RwLock;
use tracing::debug;

use super::metadata::{ParameterDomain, ParameterMetadata};
use crate::flow::parameters::names;

use ParameterDomain::{Business, Generic, Visual};

/// Parameters every flow accepts, whatever tools it uses.
static GENERIC_PARAMETERS: Lazy<Vec<ParameterMetadata>> = Lazy::new(|| {
    vec![
        ParameterMetadata::number(names::COUNT, "Number of times to execute", Generic),
        ParameterMetadata::number(names::SPACING, "Spacing between instances", Generic),
        ParameterMetadata::number(
            names::DELAY,
            "Delay between executions (seconds)",
            Generic,
        ),
        ParameterMetadata::string(
            names::CONDITION,
            "Condition to check before execution",
            Generic,
        ),
        ParameterMetadata::enumeration(
            names::PRIORITY,
            "Execution priority",
            Generic,
            &["high", "medium", "low"],
        ),
    ]
});

pub fn generic_parameters() -> &'static [ParameterMetadata] {
    &GENERIC_PARAMETERS
}

pub type SharedSchemaRegistry = Arc<RwLock<ParameterSchemaRegistry>>;

/// Tool name → parameters that tool accepts.
#[derive(Clone, Debug, Default)]
pub struct ParameterSchemaRegistry {
    tools: HashMap<String, Vec<ParameterMetadata>>,
}

impl ParameterSchemaRegistry {
    pub fn new() -> Self {
        Self {
            tools: HashMap::new(),
        }
    }

    /// Registry seeded with the drawing tools and the sample business tools.
    pub fn with_builtins() -> Self {
        let mut registry = Self::new();
        for (tool, parameters) in builtin_tool_schemas() {
            registry.register(tool, parameters);
        }
        registry
    }

    pub fn shared(self) -> SharedSchemaRegistry {
        Arc::new(RwLock::new(self))
    }

    /// Adds a tool, replacing any previous entry under the same name.
    pub fn register(&mut self, tool: impl Into<String>, parameters: Vec<ParameterMetadata>) {
        let tool = tool.into();
        debug!(tool = %tool, parameters = parameters.len(), "registered tool parameter schema");
        self.tools.insert(tool, parameters);
    }

    pub fn get(&self, tool: &str) -> Option<&[ParameterMetadata]> {
        self.tools.get(tool).map(Vec::as_slice)
    }

    pub fn contains(&self, tool: &str) -> bool {
        self.tools.contains_key(tool)
    }

    /// Sorted snapshot for introspection.
    pub fn get_all(&self) -> BTreeMap<String, Vec<ParameterMetadata>> {
        self.tools
            .iter()
            .map(|(tool, parameters)| (tool.clone(), parameters.clone()))
            .collect()
    }

    pub fn generic(&self) -> &'static [ParameterMetadata] {
        generic_parameters()
    }

    /// Primary domain of a registered tool: business beats visual beats
    /// generic.
    pub fn domain_of(&self, tool: &str) -> Option<ParameterDomain> {
        let parameters = self.get(tool)?;
        let has = |domain: ParameterDomain| parameters.iter().any(|p| p.domain == domain);
        Some(if has(Business) {
            Business
        } else if has(Visual) {
            Visual
        } else {
            Generic
        })
    }
}

fn position() -> [ParameterMetadata; 2] {
    [
        ParameterMetadata::number("x", "X position", Visual).required(),
        ParameterMetadata::number("y", "Y position", Visual).required(),
    ]
}

fn shape(size_description: &str) -> Vec<ParameterMetadata> {
    let mut parameters = position().to_vec();
    parameters.extend([
        ParameterMetadata::number("size", size_description, Visual).required(),
        ParameterMetadata::string("strokeColor", "Border color", Visual),
        ParameterMetadata::string("backgroundColor", "Fill color", Visual),
        ParameterMetadata::number("strokeWidth", "Border thickness", Visual),
        ParameterMetadata::number("opacity", "Transparency", Visual),
    ]);
    parameters
}

fn builtin_tool_schemas() -> Vec<(&'static str, Vec<ParameterMetadata>)> {
    let mut add_text = position().to_vec();
    add_text.extend([
        ParameterMetadata::string("text", "Text content", Business).required(),
        ParameterMetadata::number("fontSize", "Font size", Visual),
        ParameterMetadata::string("strokeColor", "Text color", Visual),
    ]);

    let mut add_image = position().to_vec();
    add_image.extend([
        ParameterMetadata::string("imageUrl", "Image URL", Business).required(),
        ParameterMetadata::number("width", "Image width", Visual),
        ParameterMetadata::number("height", "Image height", Visual),
    ]);

    vec![
        ("drawSquare", shape("Size of square")),
        ("drawCircle", shape("Radius")),
        ("addText", add_text),
        ("addImage", add_image),
        (
            "createUser",
            vec![
                ParameterMetadata::string("username", "Username", Business).required(),
                ParameterMetadata::string("email", "Email address", Business).required(),
                ParameterMetadata::enumeration(
                    "role",
                    "User role",
                    Business,
                    &["admin", "user", "moderator"],
                ),
                ParameterMetadata::boolean("active", "Account active", Business),
            ],
        ),
        (
            "createJob",
            vec![
                ParameterMetadata::string("title", "Job title", Business).required(),
                ParameterMetadata::string("description", "Job description", Business),
                ParameterMetadata::number("salary", "Salary amount", Business),
                ParameterMetadata::string("location", "Job location", Business),
                ParameterMetadata::enumeration(
                    "type",
                    "Job type",
                    Business,
                    &["full-time", "part-time", "contract"],
                ),
            ],
        ),
        (
            "sendEmail",
            vec![
                ParameterMetadata::string("to", "Recipient email", Business).required(),
                ParameterMetadata::string("subject", "Email subject", Business).required(),
                ParameterMetadata::string("body", "Email body", Business).required(),
                ParameterMetadata::enumeration(
                    "priority",
                    "Email priority",
                    Business,
                    &["high", "normal", "low"],
                ),
            ],
        ),
        (
            "move",
            vec![
                ParameterMetadata::string("elementId", "Element to move", Generic).required(),
                ParameterMetadata::number("x", "New X position", Visual),
                ParameterMetadata::number("y", "New Y position", Visual),
            ],
        ),
        (
            "deleteElement",
            vec![ParameterMetadata::string("elementId", "Element to delete", Generic).required()],
        ),
    ]
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::schema::metadata::ParameterKind;

    #[test]
    fn classifies_primary_domain() {
        let registry = ParameterSchemaRegistry::with_builtins();
        assert_eq!(registry.domain_of("drawSquare"), Some(Visual));
        assert_eq!(registry.domain_of("addText"), Some(Business));
        assert_eq!(registry.domain_of("deleteElement"), Some(Generic));
        assert_eq!(registry.domain_of("unknownTool"), None);
    }

    #[test]
    fn register_overrides_entry() {
        let mut registry = ParameterSchemaRegistry::with_builtins();
        registry.register(
            "drawSquare",
            vec![ParameterMetadata::new(
                "edge",
                ParameterKind::Number,
                "Edge length",
                ParameterDomain::Custom,
            )],
        );
        let entry = registry.get("drawSquare").unwrap();
        assert_eq!(entry.len(), 1);
        assert_eq!(registry.domain_of("drawSquare"), Some(Generic));
        assert!(registry.get_all().contains_key("sendEmail"));
    }

    #[test]
    fn generic_set_is_fixed() {
        let names: Vec<&str> = generic_parameters().iter().map(|p| p.name.as_str()).collect();
        assert_eq!(names, vec!["count", "spacing", "delay", "condition", "priority"]);
    }
}
