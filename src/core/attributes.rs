//! Attribute bags for armed triggers and prepared actions.
//!
//! Validation may derive data the activation step needs later - the names of
//! the characters that matched a presence gate, a rendered description - and
//! stashes it in an [`Attributes`] bag scoped to that one arming. The bag is
//! never shared between armings, so a failed validation leaves nothing
//! behind.
//!
//! ## AttributeValue Types
//!
//! - `Int`: Numbers (counts, rolls)
//! - `Bool`: Flags
//! - `Text`: Strings (dialogue, rendered descriptions)
//! - `TextList`: String lists (matched character names)

use rustc_hash::FxHashMap;
use serde::{Deserialize, Serialize};

/// Key for accessing attributes.
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct AttributeKey(pub String);

impl AttributeKey {
    /// Create a new attribute key.
    pub fn new(key: impl Into<String>) -> Self {
        Self(key.into())
    }
}

impl From<&str> for AttributeKey {
    fn from(s: &str) -> Self {
        Self::new(s)
    }
}

impl From<String> for AttributeKey {
    fn from(s: String) -> Self {
        Self(s)
    }
}

/// Value for an attribute.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub enum AttributeValue {
    /// Integer value.
    Int(i64),
    /// Boolean flag.
    Bool(bool),
    /// Text value.
    Text(String),
    /// List of strings (matched character names, tags).
    TextList(Vec<String>),
}

impl AttributeValue {
    /// Get as integer if this is an Int value.
    #[must_use]
    pub fn as_int(&self) -> Option<i64> {
        match self {
            AttributeValue::Int(v) => Some(*v),
            _ => None,
        }
    }

    /// Get as bool if this is a Bool value.
    #[must_use]
    pub fn as_bool(&self) -> Option<bool> {
        match self {
            AttributeValue::Bool(v) => Some(*v),
            _ => None,
        }
    }

    /// Get as string reference if this is a Text value.
    #[must_use]
    pub fn as_text(&self) -> Option<&str> {
        match self {
            AttributeValue::Text(s) => Some(s),
            _ => None,
        }
    }

    /// Get as text list reference if this is a TextList value.
    #[must_use]
    pub fn as_text_list(&self) -> Option<&[String]> {
        match self {
            AttributeValue::TextList(v) => Some(v),
            _ => None,
        }
    }
}

impl From<i64> for AttributeValue {
    fn from(v: i64) -> Self {
        AttributeValue::Int(v)
    }
}

impl From<bool> for AttributeValue {
    fn from(v: bool) -> Self {
        AttributeValue::Bool(v)
    }
}

impl From<String> for AttributeValue {
    fn from(v: String) -> Self {
        AttributeValue::Text(v)
    }
}

impl From<&str> for AttributeValue {
    fn from(v: &str) -> Self {
        AttributeValue::Text(v.to_string())
    }
}

impl From<Vec<String>> for AttributeValue {
    fn from(v: Vec<String>) -> Self {
        AttributeValue::TextList(v)
    }
}

/// Collection of attributes.
pub type Attributes = FxHashMap<AttributeKey, AttributeValue>;

/// Get a text attribute, or `None` if absent or the wrong type.
#[must_use]
pub fn get_text<'a>(attributes: &'a Attributes, key: &str) -> Option<&'a str> {
    attributes.get(&AttributeKey::new(key)).and_then(|v| v.as_text())
}

/// Get a text-list attribute, or `None` if absent or the wrong type.
#[must_use]
pub fn get_text_list<'a>(attributes: &'a Attributes, key: &str) -> Option<&'a [String]> {
    attributes
        .get(&AttributeKey::new(key))
        .and_then(|v| v.as_text_list())
}
