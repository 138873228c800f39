//! The schema-path resolver.
//!
//! Given a root-first document path and the loaded schema tables, walks the
//! schema graph and the document side by side and appends the candidates
//! legal at the path's end. Resolution is read-only: document and schema are
//! only borrowed, and pin-provider augmentation works on a request-scoped
//! copy.

use indexmap::IndexMap;

use crate::errors::{GlowError, GlowResult};
use crate::schema::{
    CoreSchema, ObjectSchema, PinProvider, PinSchema, Property, RegistryEntry, RegistrySchema,
    Requirement, SchemaNode, TriggerSchema, TypedSchema, ACTION_REGISTRY,
};
use crate::syntax::{DocumentTree, NodeId};

use super::candidate::{
    boolean_candidates, enum_value_candidate, platform_discriminator_candidate,
    platform_name_candidate, property_candidate, registry_entry_candidate, then_candidate,
    variant_discriminator_candidate, variant_name_candidate, Candidate, CandidateKind,
};
use super::path::PathSegment;

pub(crate) struct Resolver<'a> {
    core: &'a CoreSchema,
    tree: &'a DocumentTree,
    /// The document's root map.
    root: NodeId,
}

impl<'a> Resolver<'a> {
    pub(crate) fn new(core: &'a CoreSchema, tree: &'a DocumentTree, root: NodeId) -> Self {
        Self { core, tree, root }
    }

    /// Resolve `path` against the schema tables. `cursor` is the node the
    /// cursor landed on; it only influences the shape of the `platform:`
    /// discriminator insert.
    pub(crate) fn resolve(
        &self,
        path: &[PathSegment],
        cursor: NodeId,
    ) -> GlowResult<Vec<Candidate>> {
        let mut out = Vec::new();
        let Some(first_segment) = path.first() else {
            top_level_components(self.core, self.tree, Some(self.root), &mut out);
            return Ok(out);
        };
        let PathSegment::Key(first) = first_segment else {
            return Err(GlowError::UnexpectedShape {
                expected: "a component key",
                at_segment: first_segment.to_string(),
            });
        };
        tracing::debug!(component = %first, depth = path.len(), "resolving");

        let mut idx = 1;
        let mut node = self.tree.map_value(self.root, first);

        if self.core.is_platform(first) {
            // platform domains hold a sequence of blocks, so an index
            // segment may follow the domain key
            if let Some(PathSegment::Index(i)) = path.get(1) {
                if let Some(items) = node.and_then(|n| self.tree.seq_items(n)) {
                    node = items.get(*i).copied();
                    idx = 2;
                }
            }
            let platform = node
                .filter(|&n| self.tree.is_map(n))
                .and_then(|n| self.tree.map_scalar(n, "platform"));
            match platform.and_then(|p| self.core.platform_schema(first, p)) {
                Some(schema) => self.resolve_object(path, idx, schema, node, &mut out)?,
                None => out.push(platform_discriminator_candidate(self.in_open_item(cursor))),
            }
        } else {
            match self.core.component_schema(first) {
                Some(schema) => self.resolve_object(path, idx, schema, node, &mut out)?,
                None => tracing::debug!(component = %first, "unknown component"),
            }
        }
        Ok(out)
    }

    /// Whether the cursor already sits inside a sequence item's block, in
    /// which case inserts must not open a new item.
    fn in_open_item(&self, cursor: NodeId) -> bool {
        self.tree.is_map(cursor)
            && self
                .tree
                .parent(cursor)
                .map(|p| self.tree.is_sequence(p))
                .unwrap_or(false)
    }

    fn resolve_node(
        &self,
        path: &[PathSegment],
        idx: usize,
        schema: &SchemaNode,
        node: Option<NodeId>,
        out: &mut Vec<Candidate>,
    ) -> GlowResult<()> {
        match schema {
            SchemaNode::Object(object) => self.resolve_object(path, idx, object, node, out),
            SchemaNode::Enum(e) => {
                out.extend(e.values.iter().map(|v| enum_value_candidate(v)));
                Ok(())
            }
            SchemaNode::TypedVariant(typed) => self.resolve_typed(path, idx, typed, node, out),
            SchemaNode::Trigger(trigger) => self.resolve_trigger(path, idx, trigger, node, out),
            SchemaNode::Registry(registry) => {
                self.resolve_registry(path, idx, registry, node, out)
            }
            SchemaNode::PinReference(pin) => self.resolve_pin(path, idx, pin, node, out),
            SchemaNode::Boolean(b) => {
                out.extend(boolean_candidates(b.default));
                Ok(())
            }
            SchemaNode::Opaque => Ok(()),
        }
    }

    fn resolve_object(
        &self,
        path: &[PathSegment],
        idx: usize,
        schema: &ObjectSchema,
        node: Option<NodeId>,
        out: &mut Vec<Candidate>,
    ) -> GlowResult<()> {
        let map = node.filter(|&n| self.tree.is_map(n));
        if idx == path.len() {
            let as_list = map.is_none() && schema.is_list;
            self.add_properties(schema, map, as_list, out);
            Ok(())
        } else if map.is_some() {
            self.resolve_property(path, idx, schema, map, out)
        } else {
            Err(GlowError::UnexpectedShape {
                expected: "a block",
                at_segment: path[idx].to_string(),
            })
        }
    }

    /// Step from an object schema into one of its declared properties.
    /// Undeclared keys end resolution without candidates.
    fn resolve_property(
        &self,
        path: &[PathSegment],
        idx: usize,
        schema: &ObjectSchema,
        node: Option<NodeId>,
        out: &mut Vec<Candidate>,
    ) -> GlowResult<()> {
        let PathSegment::Key(name) = &path[idx] else {
            return Err(GlowError::UnexpectedShape {
                expected: "a property key",
                at_segment: path[idx].to_string(),
            });
        };
        let Some(prop) = schema.property(name) else {
            tracing::debug!(property = %name, "undeclared property");
            return Ok(());
        };
        let inner = node.and_then(|n| self.tree.map_value(n, name));
        self.resolve_node(path, idx + 1, &prop.schema, inner, out)
    }

    fn resolve_typed(
        &self,
        path: &[PathSegment],
        idx: usize,
        typed: &TypedSchema,
        node: Option<NodeId>,
        out: &mut Vec<Candidate>,
    ) -> GlowResult<()> {
        let Some(n) = node else {
            out.push(variant_discriminator_candidate());
            return Ok(());
        };
        let at_discriminator = idx + 1 == path.len()
            && matches!(&path[idx], PathSegment::Key(k) if k == "type");
        if at_discriminator {
            out.extend(typed.variants.keys().map(|name| variant_name_candidate(name)));
            return Ok(());
        }
        if !self.tree.is_map(n) {
            return Err(GlowError::UnexpectedShape {
                expected: "a typed block",
                at_segment: path.get(idx).map(|s| s.to_string()).unwrap_or_default(),
            });
        }
        match self.tree.map_scalar(n, "type") {
            Some(type_name) => {
                let Some(variant) = typed.variants.get(type_name) else {
                    return Err(GlowError::UnknownVariant {
                        type_name: type_name.to_string(),
                    });
                };
                if idx == path.len() {
                    self.add_properties(variant, Some(n), false, out);
                    Ok(())
                } else {
                    self.resolve_property(path, idx, variant, Some(n), out)
                }
            }
            // other keys may exist already, but the shape is still unchosen
            None => {
                out.push(variant_discriminator_candidate());
                Ok(())
            }
        }
    }

    /// A trigger value is either a single block or a sequence of them.
    fn resolve_trigger(
        &self,
        path: &[PathSegment],
        idx: usize,
        trigger: &TriggerSchema,
        node: Option<NodeId>,
        out: &mut Vec<Candidate>,
    ) -> GlowResult<()> {
        if let Some(items) = node.and_then(|n| self.tree.seq_items(n)) {
            if !items.is_empty() {
                if let Some(PathSegment::Index(i)) = path.get(idx) {
                    if let Some(&item) = items.get(*i) {
                        return self.resolve_trigger_block(path, idx + 1, trigger, Some(item), out);
                    }
                }
            }
        }
        self.resolve_trigger_block(path, idx, trigger, node, out)
    }

    fn resolve_trigger_block(
        &self,
        path: &[PathSegment],
        idx: usize,
        trigger: &TriggerSchema,
        node: Option<NodeId>,
        out: &mut Vec<Candidate>,
    ) -> GlowResult<()> {
        let map = node.filter(|&n| self.tree.is_map(n));
        if idx == path.len() {
            if let Some(schema) = &trigger.schema {
                self.add_properties(schema, map, false, out);
            }
            if let Some(actions) = self.core.registry(ACTION_REGISTRY) {
                push_registry_entries(actions, None, out);
            }
            if !map.map(|m| self.tree.map_has_key(m, "then")).unwrap_or(false) {
                out.push(then_candidate());
            }
            return Ok(());
        }
        let PathSegment::Key(key) = &path[idx] else {
            return Err(GlowError::UnexpectedShape {
                expected: "an action or trigger key",
                at_segment: path[idx].to_string(),
            });
        };
        if key == "then" {
            // every trigger supports then; it behaves as a bare trigger
            let then_node = map.and_then(|m| self.tree.map_value(m, "then"));
            let bare = TriggerSchema {
                schema: None,
                has_required_var: false,
            };
            return self.resolve_trigger(path, idx + 1, &bare, then_node, out);
        }
        // the trigger's own properties win over same-named actions
        if let Some(schema) = &trigger.schema {
            if schema.property(key).is_some() {
                return self.resolve_property(path, idx, schema, map, out);
            }
        }
        if let Some(action) = self.core.action(key) {
            let inner = map.and_then(|m| self.tree.map_value(m, key));
            return self.resolve_node(path, idx + 1, &action.schema, inner, out);
        }
        tracing::debug!(key = %key, "not a trigger property or action");
        Ok(())
    }

    /// A registry value is a sequence of single-entry maps (or one such map).
    fn resolve_registry(
        &self,
        path: &[PathSegment],
        idx: usize,
        registry: &RegistrySchema,
        node: Option<NodeId>,
        out: &mut Vec<Candidate>,
    ) -> GlowResult<()> {
        if let Some(items) = node.and_then(|n| self.tree.seq_items(n)) {
            if !items.is_empty() {
                if let Some(PathSegment::Index(i)) = path.get(idx) {
                    if let Some(&item) = items.get(*i) {
                        let map = Some(item).filter(|&m| self.tree.is_map(m));
                        return self.resolve_registry_entry(path, idx + 1, registry, map, out);
                    }
                }
            }
        }
        let map = node.filter(|&n| self.tree.is_map(n));
        self.resolve_registry_entry(path, idx, registry, map, out)
    }

    fn resolve_registry_entry(
        &self,
        path: &[PathSegment],
        idx: usize,
        registry: &RegistrySchema,
        node: Option<NodeId>,
        out: &mut Vec<Candidate>,
    ) -> GlowResult<()> {
        if idx == path.len() {
            if node.is_none() {
                let entries = self.core.registry(&registry.registry).ok_or_else(|| {
                    GlowError::UnknownRegistry {
                        name: registry.registry.clone(),
                    }
                })?;
                push_registry_entries(entries, registry.filter.as_deref(), out);
            }
            // an already-written entry map names its entry; nothing to add
            return Ok(());
        }
        let PathSegment::Key(name) = &path[idx] else {
            return Err(GlowError::UnexpectedShape {
                expected: "a registry entry name",
                at_segment: path[idx].to_string(),
            });
        };
        let Some(entry) = self.core.registry_entry(&registry.registry, name) else {
            tracing::debug!(registry = %registry.registry, entry = %name, "unknown entry");
            return Ok(());
        };
        let inner = node.and_then(|m| self.tree.map_value(m, name));
        self.resolve_node(path, idx + 1, &entry.schema, inner, out)
    }

    /// Resolve a pin value through the pin providers declared in the
    /// document: an expander referenced inside the pin block wins, otherwise
    /// the first board provider present at the root.
    fn resolve_pin(
        &self,
        path: &[PathSegment],
        idx: usize,
        pin: &PinSchema,
        node: Option<NodeId>,
        out: &mut Vec<Candidate>,
    ) -> GlowResult<()> {
        if !pin.accepts_schema {
            return Ok(());
        }
        let map = node.filter(|&n| self.tree.is_map(n));
        let mut provider: Option<&PinProvider> = None;
        if let Some(m) = map {
            provider = self
                .core
                .pin_providers
                .iter()
                .find(|(name, p)| {
                    !p.board
                        && self.tree.map_has_key(self.root, name)
                        && self.tree.map_has_key(m, name)
                })
                .map(|(_, p)| p);
        }
        if provider.is_none() {
            provider = self
                .core
                .pin_providers
                .iter()
                .find(|(name, p)| p.board && self.tree.map_has_key(self.root, name))
                .map(|(_, p)| p);
        }
        let Some(schema) = provider.and_then(|p| p.schema.as_ref()) else {
            return Ok(());
        };
        if map.is_none() && !pin.internal {
            // an empty pin block may also name any expander in the document
            let augmented = self.augmented_pin_schema(schema);
            return self.resolve_object(path, idx, &augmented, node, out);
        }
        self.resolve_object(path, idx, schema, node, out)
    }

    /// Copy of a provider schema with one optional opaque property per port
    /// expander present in the document. The shared tables stay untouched.
    fn augmented_pin_schema(&self, base: &ObjectSchema) -> ObjectSchema {
        let mut schema = base.clone();
        for (name, provider) in &self.core.pin_providers {
            if provider.board || !self.tree.map_has_key(self.root, name) {
                continue;
            }
            if schema.properties.contains_key(name) {
                continue;
            }
            schema.properties.insert(
                name.clone(),
                Property {
                    schema: SchemaNode::Opaque,
                    requirement: Requirement::Optional,
                    default: None,
                    docs: None,
                    detail: None,
                },
            );
        }
        schema
    }

    /// One candidate per declared property not already present in `node`.
    fn add_properties(
        &self,
        schema: &ObjectSchema,
        node: Option<NodeId>,
        as_list: bool,
        out: &mut Vec<Candidate>,
    ) {
        for (name, prop) in &schema.properties {
            if node.map(|n| self.tree.map_has_key(n, name)).unwrap_or(false) {
                continue;
            }
            out.push(property_candidate(name, prop, as_list));
        }
    }
}

fn push_registry_entries(
    entries: &IndexMap<String, RegistryEntry>,
    filter: Option<&[String]>,
    out: &mut Vec<Candidate>,
) {
    for (name, entry) in entries {
        if let Some(filter) = filter {
            if !filter.contains(name) {
                continue;
            }
        }
        out.push(registry_entry_candidate(name, entry));
    }
}

/// Top-level keys: platform domains first, then plain components, skipping
/// keys the document already has.
pub(crate) fn top_level_components(
    core: &CoreSchema,
    tree: &DocumentTree,
    root: Option<NodeId>,
    out: &mut Vec<Candidate>,
) {
    let present = |name: &str| {
        root.map(|r| tree.map_has_key(r, name)).unwrap_or(false)
    };
    for (name, component) in &core.components {
        if component.platforms.is_none() || present(name) {
            continue;
        }
        out.push(
            Candidate::new(name, CandidateKind::Class, format!("{name}:\n  - platform: "))
                .docs(component.docs.clone())
                .retrigger(),
        );
    }
    for (name, component) in &core.components {
        if component.platforms.is_some() || present(name) {
            continue;
        }
        out.push(
            Candidate::new(name, CandidateKind::Field, format!("{name}:\n  "))
                .docs(component.docs.clone())
                .retrigger(),
        );
    }
}

/// Platform implementation names for `platform: ` under a domain.
pub(crate) fn platform_choices(core: &CoreSchema, domain: &str, out: &mut Vec<Candidate>) {
    let Some(platforms) = core.platforms(domain) else {
        tracing::debug!(domain = %domain, "not a platform domain");
        return;
    };
    for (name, entry) in platforms {
        out.push(platform_name_candidate(name, entry));
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn core() -> CoreSchema {
        CoreSchema::from_json(
            r#"{
            "components": {
                "sensor": {
                    "docs": "Sensor domain",
                    "platforms": {
                        "dht": {
                            "schema": {
                                "properties": {
                                    "pin": {"schema": {"type": "pin", "schema": true}, "requirement": "required"},
                                    "model": {"schema": {"type": "enum", "values": ["DHT11", "DHT22"]}},
                                    "update_interval": {"schema": {"type": "string"}, "default": "60s"}
                                }
                            }
                        }
                    }
                },
                "binary_sensor": {
                    "platforms": {
                        "gpio": {
                            "schema": {
                                "properties": {
                                    "pin": {"schema": {"type": "pin", "schema": true}, "requirement": "required"},
                                    "on_press": {"schema": {"type": "trigger", "schema": {
                                        "properties": {"min_length": {"schema": {"type": "string"}}}
                                    }}},
                                    "filters": {"schema": {"type": "registry", "registry": "filter"}}
                                }
                            }
                        }
                    }
                },
                "light": {
                    "schema": {
                        "properties": {
                            "effect": {"schema": {"type": "typed", "variants": {
                                "pulse": {"properties": {"period": {"schema": {"type": "string"}}}},
                                "strobe": {"properties": {"colors": {"schema": {"type": "string"}}}}
                            }}}
                        }
                    }
                },
                "esp32": {"schema": {"properties": {"board": {"schema": {"type": "string"}}}}},
                "mcp23017": {"schema": {"properties": {}}}
            },
            "registries": {
                "action": {
                    "delay": {"schema": {"type": "string"}},
                    "light.turn_on": {"schema": {"type": "object", "properties": {
                        "brightness": {"schema": {"type": "string"}}
                    }}}
                },
                "filter": {
                    "invert": {"schema": {"type": "string"}},
                    "delayed_on": {"schema": {"type": "string"}}
                }
            },
            "pin_providers": {
                "esp32": {"board": true, "schema": {"properties": {
                    "number": {"schema": {"type": "string"}, "requirement": "required"},
                    "inverted": {"schema": {"type": "boolean"}}
                }}},
                "mcp23017": {"schema": {"properties": {
                    "number": {"schema": {"type": "string"}, "requirement": "required"}
                }}}
            }
        }"#,
        )
        .unwrap()
    }

    fn resolve_at(core: &CoreSchema, text: &str) -> Vec<Candidate> {
        let tree = DocumentTree::parse(text);
        let root = tree.root().unwrap();
        let (node, _) = tree.node_at_offset(text.len()).unwrap();
        let path = super::super::path::extract_path(&tree, node);
        Resolver::new(core, &tree, root)
            .resolve(&path, node)
            .unwrap()
    }

    fn labels(candidates: &[Candidate]) -> Vec<&str> {
        candidates.iter().map(|c| c.label.as_str()).collect()
    }

    #[test]
    fn test_platform_block_properties() {
        let core = core();
        let got = resolve_at(&core, "sensor:\n  - platform: dht\n    ");
        assert_eq!(labels(&got), vec!["pin", "model", "update_interval"]);
        let pin = &got[0];
        assert_eq!(pin.detail.as_deref(), Some("Required"));
        assert_eq!(got[2].detail.as_deref(), Some("60s"));
    }

    #[test]
    fn test_existing_keys_are_skipped() {
        let core = core();
        let got = resolve_at(&core, "sensor:\n  - platform: dht\n    model: DHT22\n    ");
        assert_eq!(labels(&got), vec!["pin", "update_interval"]);
    }

    #[test]
    fn test_missing_platform_offers_discriminator() {
        let core = core();
        let got = resolve_at(&core, "sensor:\n  ");
        assert_eq!(labels(&got), vec!["platform"]);
        assert_eq!(got[0].insert_text, "- platform: ");
    }

    #[test]
    fn test_discriminator_inside_open_item_drops_dash() {
        let core = core();
        let text = "sensor:\n  - update_interval: 30s\n    ";
        let tree = DocumentTree::parse(text);
        let root = tree.root().unwrap();
        let (node, _) = tree.node_at_offset(text.len()).unwrap();
        let path = super::super::path::extract_path(&tree, node);
        let got = Resolver::new(&core, &tree, root).resolve(&path, node).unwrap();
        assert_eq!(labels(&got), vec!["platform"]);
        assert_eq!(got[0].insert_text, "platform: ");
    }

    #[test]
    fn test_enum_values() {
        let core = core();
        let got = resolve_at(&core, "sensor:\n  - platform: dht\n    model: ");
        assert_eq!(labels(&got), vec!["DHT11", "DHT22"]);
        assert_eq!(got[0].insert_text, "DHT11");
    }

    #[test]
    fn test_trigger_offers_props_actions_and_then() {
        let core = core();
        let got = resolve_at(
            &core,
            "binary_sensor:\n  - platform: gpio\n    on_press:\n      ",
        );
        assert_eq!(
            labels(&got),
            vec!["min_length", "delay", "light.turn_on", "then"]
        );
        assert_eq!(got[1].insert_text, "- delay: ");
    }

    #[test]
    fn test_trigger_skips_existing_props_and_then() {
        let core = core();
        let got = resolve_at(
            &core,
            "binary_sensor:\n  - platform: gpio\n    on_press:\n      then:\n        - delay: 1s\n      min_length: 10ms\n      ",
        );
        assert_eq!(labels(&got), vec!["delay", "light.turn_on"]);
    }

    #[test]
    fn test_trigger_then_descends_into_actions() {
        let core = core();
        let got = resolve_at(
            &core,
            "binary_sensor:\n  - platform: gpio\n    on_press:\n      then:\n        ",
        );
        assert_eq!(labels(&got), vec!["delay", "light.turn_on", "then"]);
    }

    #[test]
    fn test_action_block_properties() {
        let core = core();
        let got = resolve_at(
            &core,
            "binary_sensor:\n  - platform: gpio\n    on_press:\n      light.turn_on:\n        ",
        );
        assert_eq!(labels(&got), vec!["brightness"]);
    }

    #[test]
    fn test_registry_entries() {
        let core = core();
        let got = resolve_at(
            &core,
            "binary_sensor:\n  - platform: gpio\n    filters:\n      ",
        );
        assert_eq!(labels(&got), vec!["invert", "delayed_on"]);
        assert_eq!(got[0].insert_text, "- invert: ");
    }

    #[test]
    fn test_typed_variant_discriminator_then_variant_props() {
        let core = core();
        let got = resolve_at(&core, "light:\n  effect:\n    ");
        assert_eq!(labels(&got), vec!["type"]);

        let got = resolve_at(&core, "light:\n  effect:\n    type: ");
        assert_eq!(labels(&got), vec!["pulse", "strobe"]);

        let got = resolve_at(&core, "light:\n  effect:\n    type: pulse\n    ");
        assert_eq!(labels(&got), vec!["period"]);
    }

    #[test]
    fn test_unknown_variant_is_an_error() {
        let core = core();
        let text = "light:\n  effect:\n    type: sawtooth\n    ";
        let tree = DocumentTree::parse(text);
        let root = tree.root().unwrap();
        let (node, _) = tree.node_at_offset(text.len()).unwrap();
        let path = super::super::path::extract_path(&tree, node);
        let err = Resolver::new(&core, &tree, root)
            .resolve(&path, node)
            .unwrap_err();
        assert!(matches!(err, GlowError::UnknownVariant { type_name } if type_name == "sawtooth"));
    }

    #[test]
    fn test_pin_uses_board_provider() {
        let core = core();
        let got = resolve_at(
            &core,
            "esp32:\n  board: nodemcu\nsensor:\n  - platform: dht\n    pin:\n      ",
        );
        assert_eq!(labels(&got), vec!["number", "inverted"]);
    }

    #[test]
    fn test_empty_pin_block_offers_document_expanders() {
        let core = core();
        let got = resolve_at(
            &core,
            "esp32:\n  board: nodemcu\nmcp23017:\nsensor:\n  - platform: dht\n    pin:\n      ",
        );
        assert_eq!(labels(&got), vec!["number", "inverted", "mcp23017"]);
    }

    #[test]
    fn test_pin_block_naming_expander_uses_its_schema() {
        let core = core();
        let text = "esp32:\n  board: x\nmcp23017:\nsensor:\n  - platform: dht\n    pin:\n      mcp23017: hub1\n      ";
        let got = resolve_at(&core, text);
        assert_eq!(labels(&got), vec!["number"]);
    }

    #[test]
    fn test_pin_without_providers_in_document_is_silent() {
        let core = core();
        let got = resolve_at(&core, "sensor:\n  - platform: dht\n    pin:\n      ");
        assert!(got.is_empty());
    }

    #[test]
    fn test_top_level_skips_existing_keys() {
        let core = core();
        let text = "esp32:\n  board: x\n";
        let tree = DocumentTree::parse(text);
        let mut out = Vec::new();
        top_level_components(&core, &tree, tree.root(), &mut out);
        let got = labels(&out);
        assert!(got.contains(&"sensor"));
        assert!(got.contains(&"light"));
        assert!(!got.contains(&"esp32"));
    }

    #[test]
    fn test_top_level_platform_inserts() {
        let core = core();
        let tree = DocumentTree::parse("");
        let mut out = Vec::new();
        top_level_components(&core, &tree, None, &mut out);
        let sensor = out.iter().find(|c| c.label == "sensor").unwrap();
        assert_eq!(sensor.kind, CandidateKind::Class);
        assert_eq!(sensor.insert_text, "sensor:\n  - platform: ");
        let light = out.iter().find(|c| c.label == "light").unwrap();
        assert_eq!(light.kind, CandidateKind::Field);
        assert_eq!(light.insert_text, "light:\n  ");
    }

    #[test]
    fn test_platform_choices() {
        let core = core();
        let mut out = Vec::new();
        platform_choices(&core, "sensor", &mut out);
        assert_eq!(labels(&out), vec!["dht"]);
        assert_eq!(out[0].insert_text, "dht\n  ");

        out.clear();
        platform_choices(&core, "wifi", &mut out);
        assert!(out.is_empty());
    }

    #[test]
    fn test_registry_filter_limits_entries() {
        let core = core();
        let tree = DocumentTree::parse("x:\n");
        let root = tree.root().unwrap();
        let resolver = Resolver::new(&core, &tree, root);
        let registry = RegistrySchema {
            registry: "filter".to_string(),
            filter: Some(vec!["invert".to_string()]),
        };
        let mut out = Vec::new();
        resolver
            .resolve_registry(&[], 0, &registry, None, &mut out)
            .unwrap();
        assert_eq!(labels(&out), vec!["invert"]);
    }

    #[test]
    fn test_unknown_registry_is_an_error() {
        let core = core();
        let tree = DocumentTree::parse("x:\n");
        let root = tree.root().unwrap();
        let resolver = Resolver::new(&core, &tree, root);
        let registry = RegistrySchema {
            registry: "condition".to_string(),
            filter: None,
        };
        let err = resolver
            .resolve_registry(&[], 0, &registry, None, &mut Vec::new())
            .unwrap_err();
        assert!(matches!(err, GlowError::UnknownRegistry { name } if name == "condition"));
    }
}
