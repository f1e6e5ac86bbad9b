//! Object map: symbolic names for widgets.
//!
//! Each entry is a set of discriminating attributes that must identify
//! exactly one live widget. The `container` attribute refers to another
//! entry by name, so entries form a shallow parent-reference tree; the
//! `occurrence` attribute is a 1-based ordinal used when several widgets
//! share every other attribute.
//!
//! ```yaml
//! objects:
//!   gCS_QQuickWindowQmlImpl:
//!     title: GCS
//!     type: QQuickWindowQmlImpl
//!     visible: true
//!   gCS_buttonRect_Rectangle_2:
//!     container: gCS_QQuickWindowQmlImpl
//!     id: buttonRect
//!     occurrence: 2
//!     type: Rectangle
//! ```

use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashSet};
use std::fmt;
use std::path::Path;

use crate::result::{GroundcheckError, GroundcheckResult};

const BUILTIN_NAMES: &str = include_str!("../resources/names.yaml");

/// Attributes a widget can be matched on
pub const KNOWN_ATTRIBUTES: &[&str] = &[
    "type",
    "id",
    "objectName",
    "text",
    "title",
    "color",
    "source",
    "unnamed",
    "visible",
    "enabled",
];

/// Attribute value: string, number or boolean
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum AttrValue {
    /// Boolean value
    Bool(bool),
    /// Integer value
    Int(i64),
    /// Non-integer number
    Float(f64),
    /// String value
    Str(String),
}

impl AttrValue {
    /// String content, if this is a string
    #[must_use]
    pub fn as_str(&self) -> Option<&str> {
        match self {
            Self::Str(s) => Some(s),
            _ => None,
        }
    }

    /// Name of the value kind, for error messages
    #[must_use]
    pub const fn kind(&self) -> &'static str {
        match self {
            Self::Bool(_) => "boolean",
            Self::Int(_) => "integer",
            Self::Float(_) => "number",
            Self::Str(_) => "string",
        }
    }

    /// Unquoted text form, as the UI would show it
    #[must_use]
    pub fn text(&self) -> String {
        match self {
            Self::Bool(b) => b.to_string(),
            Self::Int(i) => i.to_string(),
            Self::Float(f) => f.to_string(),
            Self::Str(s) => s.clone(),
        }
    }

    fn as_number(&self) -> Option<f64> {
        match self {
            Self::Int(i) => Some(*i as f64),
            Self::Float(f) => Some(*f),
            Self::Str(s) => s.trim().parse().ok(),
            Self::Bool(_) => None,
        }
    }

    /// Check whether an observed value satisfies this expected value.
    ///
    /// Widget properties are text, so values compare by their text form. A
    /// numeric expectation also accepts any text with the same numeric value
    /// (`42.3314` matches `"42.331400"`).
    #[must_use]
    pub fn matches(&self, actual: &Self) -> bool {
        if self == actual || self.text() == actual.text() {
            return true;
        }
        let numeric = matches!(self, Self::Int(_) | Self::Float(_))
            || matches!(actual, Self::Int(_) | Self::Float(_));
        numeric
            && matches!((self.as_number(), actual.as_number()), (Some(a), Some(b)) if a == b)
    }
}

impl fmt::Display for AttrValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Bool(b) => write!(f, "{b}"),
            Self::Int(i) => write!(f, "{i}"),
            Self::Float(x) => write!(f, "{x}"),
            Self::Str(s) => write!(f, "{s:?}"),
        }
    }
}

impl From<&str> for AttrValue {
    fn from(value: &str) -> Self {
        Self::Str(value.to_string())
    }
}

impl From<bool> for AttrValue {
    fn from(value: bool) -> Self {
        Self::Bool(value)
    }
}

impl From<i64> for AttrValue {
    fn from(value: i64) -> Self {
        Self::Int(value)
    }
}

impl From<f64> for AttrValue {
    fn from(value: f64) -> Self {
        Self::Float(value)
    }
}

/// One object map entry
#[derive(Debug, Clone, PartialEq)]
pub struct ObjectMapEntry {
    /// Symbolic name
    pub name: String,
    /// Parent entry, by symbolic name
    pub container: Option<String>,
    /// 1-based ordinal among otherwise identical matches
    pub occurrence: Option<u32>,
    /// Attributes to match, keyed by attribute name
    pub attributes: BTreeMap<String, AttrValue>,
}

impl ObjectMapEntry {
    /// Create an entry constraining only the widget type
    #[must_use]
    pub fn new(name: impl Into<String>, type_name: impl Into<String>) -> Self {
        let mut attributes = BTreeMap::new();
        let _ = attributes.insert("type".to_string(), AttrValue::Str(type_name.into()));
        Self {
            name: name.into(),
            container: None,
            occurrence: None,
            attributes,
        }
    }

    /// Constrain an attribute
    #[must_use]
    pub fn with(mut self, key: impl Into<String>, value: impl Into<AttrValue>) -> Self {
        let _ = self.attributes.insert(key.into(), value.into());
        self
    }

    /// Set the container entry
    #[must_use]
    pub fn in_container(mut self, container: impl Into<String>) -> Self {
        self.container = Some(container.into());
        self
    }

    /// Set the occurrence
    #[must_use]
    pub const fn with_occurrence(mut self, occurrence: u32) -> Self {
        self.occurrence = Some(occurrence);
        self
    }

    /// Required `visible` value, if constrained
    #[must_use]
    pub fn visible(&self) -> Option<bool> {
        match self.attributes.get("visible") {
            Some(AttrValue::Bool(b)) => Some(*b),
            Some(AttrValue::Int(i)) => Some(*i != 0),
            _ => None,
        }
    }

    fn from_raw(name: &str, raw: BTreeMap<String, AttrValue>) -> GroundcheckResult<Self> {
        let mut entry = Self {
            name: name.to_string(),
            container: None,
            occurrence: None,
            attributes: BTreeMap::new(),
        };
        for (key, value) in raw {
            match (key.as_str(), value) {
                ("container", AttrValue::Str(parent)) => entry.container = Some(parent),
                ("occurrence", AttrValue::Int(n)) => {
                    let n = u32::try_from(n).ok().filter(|n| *n >= 1).ok_or_else(|| {
                        GroundcheckError::invalid_map(format!(
                            "'{name}': occurrence must be a positive integer, got {n}"
                        ))
                    })?;
                    entry.occurrence = Some(n);
                }
                ("container" | "occurrence", other) => {
                    return Err(GroundcheckError::invalid_map(format!(
                        "'{name}': {key} cannot be a {}",
                        other.kind()
                    )));
                }
                (_, value) => {
                    let _ = entry.attributes.insert(key, value);
                }
            }
        }
        Ok(entry)
    }

    fn to_raw(&self) -> BTreeMap<String, AttrValue> {
        let mut raw = self.attributes.clone();
        if let Some(container) = &self.container {
            let _ = raw.insert("container".to_string(), AttrValue::Str(container.clone()));
        }
        if let Some(n) = self.occurrence {
            let _ = raw.insert("occurrence".to_string(), AttrValue::Int(i64::from(n)));
        }
        raw
    }
}

impl fmt::Display for ObjectMapEntry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut first = true;
        for (key, value) in &self.attributes {
            if !first {
                write!(f, " ")?;
            }
            first = false;
            write!(f, "{key}={value}")?;
        }
        if let Some(container) = &self.container {
            write!(f, " container={container}")?;
        }
        if let Some(n) = self.occurrence {
            write!(f, " occurrence={n}")?;
        }
        Ok(())
    }
}

#[derive(Debug, Serialize, Deserialize)]
struct ObjectMapFile {
    objects: BTreeMap<String, BTreeMap<String, AttrValue>>,
}

/// A validated, read-only object map
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ObjectMap {
    entries: BTreeMap<String, ObjectMapEntry>,
}

impl ObjectMap {
    /// The object map of the GCS main window
    pub fn builtin() -> GroundcheckResult<Self> {
        Self::from_yaml(BUILTIN_NAMES)
    }

    /// Parse and validate an object map from YAML
    pub fn from_yaml(yaml: &str) -> GroundcheckResult<Self> {
        let file: ObjectMapFile = serde_yaml_ng::from_str(yaml)?;
        let entries = file
            .objects
            .into_iter()
            .map(|(name, raw)| ObjectMapEntry::from_raw(&name, raw).map(|e| (name, e)))
            .collect::<GroundcheckResult<BTreeMap<_, _>>>()?;
        let map = Self { entries };
        map.validate()?;
        Ok(map)
    }

    /// Load an object map file
    pub fn load(path: &Path) -> GroundcheckResult<Self> {
        let yaml = std::fs::read_to_string(path)?;
        Self::from_yaml(&yaml)
    }

    /// Build a map from entries, validating it
    pub fn from_entries(entries: impl IntoIterator<Item = ObjectMapEntry>) -> GroundcheckResult<Self> {
        let mut map = Self::default();
        for entry in entries {
            if map.entries.contains_key(&entry.name) {
                return Err(GroundcheckError::invalid_map(format!(
                    "duplicate name '{}'",
                    entry.name
                )));
            }
            let _ = map.entries.insert(entry.name.clone(), entry);
        }
        map.validate()?;
        Ok(map)
    }

    /// Serialize back to YAML
    pub fn to_yaml(&self) -> GroundcheckResult<String> {
        let file = ObjectMapFile {
            objects: self
                .entries
                .iter()
                .map(|(name, e)| (name.clone(), e.to_raw()))
                .collect(),
        };
        Ok(serde_yaml_ng::to_string(&file)?)
    }

    fn validate(&self) -> GroundcheckResult<()> {
        for entry in self.entries.values() {
            if !entry.attributes.contains_key("type") {
                return Err(GroundcheckError::invalid_map(format!(
                    "'{}' does not constrain 'type'",
                    entry.name
                )));
            }
            if let Some(key) = entry
                .attributes
                .keys()
                .find(|k| !KNOWN_ATTRIBUTES.contains(&k.as_str()))
            {
                return Err(GroundcheckError::invalid_map(format!(
                    "'{}' uses unknown attribute '{key}'",
                    entry.name
                )));
            }
            if let Some(container) = &entry.container {
                if !self.entries.contains_key(container) {
                    return Err(GroundcheckError::invalid_map(format!(
                        "'{}' refers to missing container '{container}'",
                        entry.name
                    )));
                }
            }
            self.container_chain(&entry.name)?;
        }
        Ok(())
    }

    /// Container chain of an entry, nearest container first.
    ///
    /// Fails if the chain is cyclic or names a missing entry.
    pub fn container_chain(&self, name: &str) -> GroundcheckResult<Vec<&ObjectMapEntry>> {
        let mut chain = Vec::new();
        let mut seen = HashSet::new();
        let _ = seen.insert(name);
        let mut current = self.entry(name)?;
        while let Some(parent) = &current.container {
            if !seen.insert(parent.as_str()) {
                return Err(GroundcheckError::invalid_map(format!(
                    "container cycle through '{parent}' starting at '{name}'"
                )));
            }
            current = self.entry(parent)?;
            chain.push(current);
        }
        Ok(chain)
    }

    /// Look up an entry by symbolic name
    pub fn entry(&self, name: &str) -> GroundcheckResult<&ObjectMapEntry> {
        self.entries
            .get(name)
            .ok_or_else(|| GroundcheckError::UnknownObject(name.to_string()))
    }

    /// Check if a name is defined
    #[must_use]
    pub fn contains(&self, name: &str) -> bool {
        self.entries.contains_key(name)
    }

    /// All symbolic names, sorted
    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.entries.keys().map(String::as_str)
    }

    /// All entries, sorted by name
    pub fn entries(&self) -> impl Iterator<Item = &ObjectMapEntry> {
        self.entries.values()
    }

    /// Number of entries
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether the map is empty
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
