//! Candidate records and the formatting rules that shape them.
//!
//! A [`Candidate`] is what the resolver produces; a [`Suggestion`] is a
//! candidate plus the overwrite range computed at the entry point. The insert
//! text encodes what typing the candidate should leave behind: keys get a
//! trailing `": "`, block-valued keys also open an indented line, sequence
//! entries carry their own `"- "` marker.

use serde::Serialize;

use crate::schema::{
    PlatformEntry, Property, RegistryEntry, Requirement, SchemaNode,
};

/// What sort of thing a candidate is, for editor-side icons.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum CandidateKind {
    /// A platform domain (`sensor:`).
    Class,
    /// A literal constant such as a boolean.
    Constant,
    /// A discriminator key whose value selects a shape.
    Enum,
    /// One value of a closed set.
    EnumMember,
    /// A trigger key.
    Event,
    /// A component hub or a registry-valued key.
    Field,
    /// A pin-valued key.
    Interface,
    /// A registry entry.
    Keyword,
    /// A plain property key.
    Property,
    /// A key opening a nested block.
    Struct,
    /// A boolean-valued key.
    Variable,
}

/// One completion produced by the resolver.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Candidate {
    pub label: String,
    pub kind: CandidateKind,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub docs: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub detail: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub sort_text: Option<String>,
    pub insert_text: String,
    /// Ask the editor to immediately request completion again, used when the
    /// inserted text opens a position with known follow-up candidates.
    pub retrigger: bool,
    pub preselect: bool,
}

impl Candidate {
    pub fn new(
        label: impl Into<String>,
        kind: CandidateKind,
        insert_text: impl Into<String>,
    ) -> Self {
        Self {
            label: label.into(),
            kind,
            docs: None,
            detail: None,
            sort_text: None,
            insert_text: insert_text.into(),
            retrigger: false,
            preselect: false,
        }
    }

    pub fn docs(mut self, docs: Option<String>) -> Self {
        self.docs = docs;
        self
    }

    pub fn retrigger(mut self) -> Self {
        self.retrigger = true;
        self
    }
}

/// A [`Candidate`] joined with the byte range it should replace.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Suggestion {
    pub label: String,
    pub kind: CandidateKind,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub docs: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub detail: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub sort_text: Option<String>,
    pub insert_text: String,
    pub retrigger: bool,
    pub preselect: bool,
    /// Byte range of existing text the insert replaces, when any.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub overwrite_range: Option<(usize, usize)>,
}

impl Suggestion {
    pub(crate) fn from_candidate(c: Candidate, overwrite_range: Option<(usize, usize)>) -> Self {
        Self {
            label: c.label,
            kind: c.kind,
            docs: c.docs,
            detail: c.detail,
            sort_text: c.sort_text,
            insert_text: c.insert_text,
            retrigger: c.retrigger,
            preselect: c.preselect,
            overwrite_range,
        }
    }
}

/// Candidate for one declared property of an object schema.
pub(crate) fn property_candidate(name: &str, prop: &Property, as_list: bool) -> Candidate {
    let mut insert = format!("{name}: ");
    if as_list {
        insert.insert_str(0, "- ");
    }
    let (kind, retrigger) = match &prop.schema {
        SchemaNode::Object(_) => {
            insert.push_str("\n  ");
            (CandidateKind::Struct, true)
        }
        SchemaNode::Enum(_) => (CandidateKind::Enum, true),
        SchemaNode::Trigger(_) => (CandidateKind::Event, false),
        SchemaNode::Registry(_) => (CandidateKind::Field, false),
        SchemaNode::PinReference(_) => (CandidateKind::Interface, false),
        SchemaNode::Boolean(_) => (CandidateKind::Variable, true),
        SchemaNode::TypedVariant(_) | SchemaNode::Opaque => (CandidateKind::Property, false),
    };
    let mut c = Candidate::new(name, kind, insert).docs(prop.docs.clone());
    c.retrigger = retrigger;
    if let Some(detail) = &prop.detail {
        c.detail = Some(detail.clone());
    } else if prop.requirement == Requirement::Required {
        c.detail = Some("Required".to_string());
        c.sort_text = Some(format!("0_{name}"));
    } else {
        c.detail = prop.default.clone();
    }
    c
}

/// Candidate for a registry entry; always inserted as a new sequence item.
/// Namespaced entries (`light.turn_on`) sort after the plain ones.
pub(crate) fn registry_entry_candidate(name: &str, entry: &RegistryEntry) -> Candidate {
    let mut c = Candidate::new(name, CandidateKind::Keyword, format!("- {name}: "))
        .docs(entry.docs.clone());
    if name.contains('.') {
        c.sort_text = Some(format!("z_{name}"));
    }
    c
}

/// Candidate for a platform implementation name after `platform: `.
pub(crate) fn platform_name_candidate(name: &str, entry: &PlatformEntry) -> Candidate {
    Candidate::new(name, CandidateKind::EnumMember, format!("{name}\n  "))
        .docs(entry.docs.clone())
        .retrigger()
}

/// The `platform:` discriminator key itself, offered when a platform block
/// has not chosen its platform yet. Inside an already-open sequence item the
/// insert skips the `- ` marker.
pub(crate) fn platform_discriminator_candidate(in_open_item: bool) -> Candidate {
    let insert = if in_open_item {
        "platform: "
    } else {
        "- platform: "
    };
    Candidate::new("platform", CandidateKind::EnumMember, insert).retrigger()
}

/// The `type:` discriminator key of a typed-variant schema.
pub(crate) fn variant_discriminator_candidate() -> Candidate {
    Candidate::new("type", CandidateKind::Enum, "type: ").retrigger()
}

/// One variant name completing a `type:` discriminator.
pub(crate) fn variant_name_candidate(name: &str) -> Candidate {
    Candidate::new(name, CandidateKind::Enum, format!("{name}\n")).retrigger()
}

pub(crate) fn enum_value_candidate(value: &str) -> Candidate {
    Candidate::new(value, CandidateKind::EnumMember, value)
}

/// The two boolean literals; the schema's declared default is preselected.
pub(crate) fn boolean_candidates(default: Option<bool>) -> [Candidate; 2] {
    [true, false].map(|v| {
        let literal = if v { "true" } else { "false" };
        let mut c = Candidate::new(literal, CandidateKind::Constant, literal);
        c.preselect = default == Some(v);
        c
    })
}

/// The `then` key every trigger supports.
pub(crate) fn then_candidate() -> Candidate {
    Candidate::new("then", CandidateKind::Event, "then:\n  ").retrigger()
}
