//! The Glow schema model.
//!
//! A schema is a closed graph of [`SchemaNode`] values plus the global lookup
//! tables in [`CoreSchema`]: components (some of which are platform domains
//! with per-platform schemas), named registries such as actions and filters,
//! and pin providers. The whole graph deserializes from one JSON document and
//! is read-only afterwards; the resolver only ever borrows it.

use indexmap::IndexMap;
use serde::Deserialize;

use crate::errors::{GlowError, GlowResult};

/// Name of the registry holding automation actions.
pub const ACTION_REGISTRY: &str = "action";

/// One node of the schema graph, tagged by `"type"` in the JSON form.
#[derive(Debug, Clone, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum SchemaNode {
    /// A block with declared properties.
    Object(ObjectSchema),
    /// A closed set of scalar values.
    Enum(EnumSchema),
    /// An object whose shape is selected by a `type:` discriminator key.
    #[serde(rename = "typed")]
    TypedVariant(TypedSchema),
    /// An automation trigger: optional own properties plus action entries.
    Trigger(TriggerSchema),
    /// A reference into one of the named registries.
    Registry(RegistrySchema),
    /// A pin value, resolved through the document's pin providers.
    #[serde(rename = "pin")]
    PinReference(PinSchema),
    Boolean(BooleanSchema),
    /// Free-form scalar; nothing can be suggested inside it.
    #[serde(rename = "string")]
    Opaque,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct ObjectSchema {
    #[serde(default)]
    pub properties: IndexMap<String, Property>,
    /// Whether values are written as a sequence of blocks rather than one block.
    #[serde(default)]
    pub is_list: bool,
}

impl ObjectSchema {
    pub fn property(&self, name: &str) -> Option<&Property> {
        self.properties.get(name)
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct EnumSchema {
    pub values: Vec<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct TypedSchema {
    /// Variant shapes keyed by the `type:` discriminator value.
    pub variants: IndexMap<String, ObjectSchema>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct TriggerSchema {
    /// The trigger's own properties. Absent for bare triggers like `then`.
    #[serde(default)]
    pub schema: Option<Box<ObjectSchema>>,
    /// Whether the trigger provides a variable the actions must consume.
    #[serde(default)]
    pub has_required_var: bool,
}

#[derive(Debug, Clone, Deserialize)]
pub struct RegistrySchema {
    /// Which registry the entries come from.
    pub registry: String,
    /// When present, only these entries are offered.
    #[serde(default)]
    pub filter: Option<Vec<String>>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct PinSchema {
    /// Whether the pin is written as a block (`pin:\n  number: ...`).
    /// When false only a bare scalar is accepted and nothing is suggested.
    #[serde(rename = "schema")]
    pub accepts_schema: bool,
    /// Internal pins never list the document's port expanders.
    #[serde(default)]
    pub internal: bool,
}

#[derive(Debug, Clone, Deserialize)]
pub struct BooleanSchema {
    #[serde(default)]
    pub default: Option<bool>,
}

/// One declared property of an [`ObjectSchema`].
#[derive(Debug, Clone, Deserialize)]
pub struct Property {
    pub schema: SchemaNode,
    #[serde(default)]
    pub requirement: Requirement,
    /// Default value rendered as the candidate detail when present.
    #[serde(default)]
    pub default: Option<String>,
    #[serde(default)]
    pub docs: Option<String>,
    #[serde(default)]
    pub detail: Option<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Requirement {
    Required,
    #[default]
    Optional,
}

/// A top-level component. Platform domains (e.g. `sensor`) carry a table of
/// platform implementations; hubs and singletons carry just a schema.
#[derive(Debug, Clone, Deserialize)]
pub struct Component {
    #[serde(default)]
    pub docs: Option<String>,
    #[serde(default)]
    pub schema: Option<ObjectSchema>,
    #[serde(default)]
    pub platforms: Option<IndexMap<String, PlatformEntry>>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct PlatformEntry {
    #[serde(default)]
    pub docs: Option<String>,
    #[serde(default)]
    pub schema: ObjectSchema,
}

#[derive(Debug, Clone, Deserialize)]
pub struct RegistryEntry {
    #[serde(default)]
    pub docs: Option<String>,
    pub schema: SchemaNode,
}

/// A component that can own pins, e.g. a board or a port expander.
#[derive(Debug, Clone, Deserialize)]
pub struct PinProvider {
    /// Board providers resolve pins for the whole document; non-board
    /// providers (port expanders) only when referenced explicitly.
    #[serde(default)]
    pub board: bool,
    #[serde(default)]
    pub schema: Option<ObjectSchema>,
}

/// The global lookup tables. Built once at startup, shared immutably.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct CoreSchema {
    #[serde(default)]
    pub components: IndexMap<String, Component>,
    #[serde(default)]
    pub registries: IndexMap<String, IndexMap<String, RegistryEntry>>,
    #[serde(default)]
    pub pin_providers: IndexMap<String, PinProvider>,
}

impl CoreSchema {
    pub fn from_json(data: &str) -> GlowResult<Self> {
        serde_json::from_str(data).map_err(|e| GlowError::SchemaData {
            message: e.to_string(),
        })
    }

    pub fn component(&self, name: &str) -> Option<&Component> {
        self.components.get(name)
    }

    /// Whether `name` is a platform domain (its value is a sequence of
    /// `platform:`-discriminated blocks).
    pub fn is_platform(&self, name: &str) -> bool {
        self.components
            .get(name)
            .map(|c| c.platforms.is_some())
            .unwrap_or(false)
    }

    pub fn component_schema(&self, name: &str) -> Option<&ObjectSchema> {
        self.components.get(name)?.schema.as_ref()
    }

    /// Platform implementations available under a domain, e.g. the platforms
    /// of `sensor`.
    pub fn platforms(&self, domain: &str) -> Option<&IndexMap<String, PlatformEntry>> {
        self.components.get(domain)?.platforms.as_ref()
    }

    /// Schema of one platform implementation, e.g. (`sensor`, `dht`).
    pub fn platform_schema(&self, domain: &str, platform: &str) -> Option<&ObjectSchema> {
        Some(&self.platforms(domain)?.get(platform)?.schema)
    }

    pub fn registry(&self, name: &str) -> Option<&IndexMap<String, RegistryEntry>> {
        self.registries.get(name)
    }

    pub fn registry_entry(&self, registry: &str, name: &str) -> Option<&RegistryEntry> {
        self.registries.get(registry)?.get(name)
    }

    pub fn action(&self, name: &str) -> Option<&RegistryEntry> {
        self.registry_entry(ACTION_REGISTRY, name)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const SCHEMA_JSON: &str = r#"{
        "components": {
            "sensor": {
                "docs": "Sensor domain",
                "platforms": {
                    "dht": {
                        "schema": {
                            "properties": {
                                "pin": {"schema": {"type": "pin", "schema": true}, "requirement": "required"},
                                "model": {"schema": {"type": "enum", "values": ["DHT11", "DHT22"]}}
                            }
                        }
                    }
                }
            },
            "wifi": {
                "schema": {
                    "properties": {
                        "ssid": {"schema": {"type": "string"}},
                        "fast_connect": {"schema": {"type": "boolean", "default": false}}
                    }
                }
            }
        },
        "registries": {
            "action": {
                "delay": {"schema": {"type": "string"}}
            }
        },
        "pin_providers": {
            "esp32": {"board": true, "schema": {"properties": {}}}
        }
    }"#;

    #[test]
    fn test_loads_from_json() {
        let core = CoreSchema::from_json(SCHEMA_JSON).unwrap();
        assert!(core.is_platform("sensor"));
        assert!(!core.is_platform("wifi"));
        assert!(!core.is_platform("nonexistent"));
        assert!(core.platform_schema("sensor", "dht").is_some());
        assert!(core.platform_schema("sensor", "bme280").is_none());
        assert!(core.action("delay").is_some());
        assert!(core.pin_providers.get("esp32").map(|p| p.board).unwrap_or(false));
    }

    #[test]
    fn test_requirement_and_node_tags() {
        let core = CoreSchema::from_json(SCHEMA_JSON).unwrap();
        let dht = core.platform_schema("sensor", "dht").unwrap();
        let pin = dht.property("pin").unwrap();
        assert_eq!(pin.requirement, Requirement::Required);
        assert!(matches!(pin.schema, SchemaNode::PinReference(_)));
        let model = dht.property("model").unwrap();
        assert_eq!(model.requirement, Requirement::Optional);
        assert!(matches!(model.schema, SchemaNode::Enum(_)));

        let wifi = core.component_schema("wifi").unwrap();
        assert!(matches!(
            wifi.property("ssid").unwrap().schema,
            SchemaNode::Opaque
        ));
        assert!(matches!(
            wifi.property("fast_connect").unwrap().schema,
            SchemaNode::Boolean(BooleanSchema {
                default: Some(false)
            })
        ));
    }

    #[test]
    fn test_bad_schema_is_a_diagnostic() {
        let err = CoreSchema::from_json(r#"{"components": {"x": {"schema": {"properties": {"y": {"schema": {"type": "vortex"}}}}}}}"#)
            .unwrap_err();
        assert!(matches!(err, GlowError::SchemaData { .. }));
    }
}
