//! Text operations: ordered retain/insert/delete spans over a document.
//!
//! Lengths are counted in chars (Unicode scalar values), matching the
//! rope's indexing. An operation is a value: builders return a new
//! operation and nothing mutates one after construction.

mod apply;

use std::fmt;

use serde::de::Error as _;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use serde_json::Value;

use crate::error::WireError;

pub use apply::{apply_to_rope, apply_to_str, check, invert};

/// One primitive span of a [`TextOperation`].
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Component {
    /// Skip over `n` chars, leaving them unchanged.
    Retain(usize),
    /// Insert text at the current position.
    Insert(String),
    /// Remove `n` chars at the current position.
    Delete(usize),
}

impl Component {
    /// Length of the component in chars.
    pub fn len(&self) -> usize {
        match self {
            Self::Retain(n) | Self::Delete(n) => *n,
            Self::Insert(text) => text.chars().count(),
        }
    }

    /// Whether the component spans nothing.
    pub fn is_empty(&self) -> bool {
        match self {
            Self::Retain(n) | Self::Delete(n) => *n == 0,
            Self::Insert(text) => text.is_empty(),
        }
    }
}

/// A normalized sequence of [`Component`]s.
///
/// The builder keeps a canonical form: no empty components, no two
/// adjacent components of the same kind, and an insert never directly
/// follows a delete. Two operations describing the same edit therefore
/// compare equal.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash)]
pub struct TextOperation {
    components: Vec<Component>,
    base_len: usize,
    target_len: usize,
}

impl TextOperation {
    /// An empty operation (applies only to an empty document).
    pub const fn new() -> Self {
        Self {
            components: Vec::new(),
            base_len: 0,
            target_len: 0,
        }
    }

    /// Retain `n` chars.
    #[must_use]
    pub fn retain(mut self, n: usize) -> Self {
        if n == 0 {
            return self;
        }
        self.base_len = self.base_len.saturating_add(n);
        self.target_len = self.target_len.saturating_add(n);
        if let Some(Component::Retain(last)) = self.components.last_mut() {
            *last = last.saturating_add(n);
        } else {
            self.components.push(Component::Retain(n));
        }
        self
    }

    /// Insert `text` at the current position.
    #[must_use]
    pub fn insert(mut self, text: impl Into<String>) -> Self {
        let text = text.into();
        if text.is_empty() {
            return self;
        }
        self.target_len = self.target_len.saturating_add(text.chars().count());
        // Inserts go before a trailing delete.
        let at = match self.components.last() {
            Some(Component::Delete(_)) => self.components.len() - 1,
            _ => self.components.len(),
        };
        let prev = at.checked_sub(1).and_then(|i| self.components.get_mut(i));
        if let Some(Component::Insert(prev)) = prev {
            prev.push_str(&text);
        } else {
            self.components.insert(at, Component::Insert(text));
        }
        self
    }

    /// Delete `n` chars at the current position.
    #[must_use]
    pub fn delete(mut self, n: usize) -> Self {
        if n == 0 {
            return self;
        }
        self.base_len = self.base_len.saturating_add(n);
        if let Some(Component::Delete(last)) = self.components.last_mut() {
            *last = last.saturating_add(n);
        } else {
            self.components.push(Component::Delete(n));
        }
        self
    }

    /// Append any component through the normalizing builder.
    #[must_use]
    pub fn push(self, component: Component) -> Self {
        match component {
            Component::Retain(n) => self.retain(n),
            Component::Insert(text) => self.insert(text),
            Component::Delete(n) => self.delete(n),
        }
    }

    /// Append `component` unless the operation's lengths would no longer
    /// fit in a `usize`.
    pub fn checked_push(self, component: Component) -> Option<Self> {
        let (base, target) = match &component {
            Component::Retain(n) => (*n, *n),
            Component::Insert(text) => (0, text.chars().count()),
            Component::Delete(n) => (*n, 0),
        };
        self.base_len.checked_add(base)?;
        self.target_len.checked_add(target)?;
        Some(self.push(component))
    }

    /// Build the operation replacing `removed` chars at `at` with `inserted`
    /// in a document of `len` chars.
    pub fn replacement(len: usize, at: usize, removed: usize, inserted: &str) -> Self {
        Self::new()
            .retain(at)
            .delete(removed)
            .insert(inserted)
            .retain(len.saturating_sub(at + removed))
    }

    /// The components in order.
    pub fn components(&self) -> &[Component] {
        &self.components
    }

    /// Document length the operation expects to be applied to.
    pub const fn base_len(&self) -> usize {
        self.base_len
    }

    /// Document length after the operation is applied.
    pub const fn target_len(&self) -> usize {
        self.target_len
    }

    /// Whether applying the operation leaves any document unchanged.
    pub fn is_noop(&self) -> bool {
        self.components
            .iter()
            .all(|c| matches!(c, Component::Retain(_)))
    }

    /// Parse the JSON wire form: positive ints retain, strings insert,
    /// negative ints delete.
    ///
    /// # Errors
    /// Returns an error if the input is not a JSON array of such values,
    /// or if the operation's total length overflows.
    pub fn from_json(input: &str) -> Result<Self, WireError> {
        let value: Value = serde_json::from_str(input)?;
        Self::from_value(&value)
    }

    /// Render the JSON wire form.
    pub fn to_json(&self) -> String {
        self.to_value().to_string()
    }

    fn from_value(value: &Value) -> Result<Self, WireError> {
        let Value::Array(items) = value else {
            return Err(WireError::BadComponent { index: 0 });
        };
        items
            .iter()
            .enumerate()
            .try_fold(Self::new(), |op, (index, item)| {
                component_from_value(item)
                    .and_then(|c| op.checked_push(c))
                    .ok_or(WireError::BadComponent { index })
            })
    }

    fn to_value(&self) -> Value {
        Value::Array(
            self.components
                .iter()
                .map(|c| match c {
                    Component::Retain(n) => Value::from(*n),
                    Component::Insert(text) => Value::from(text.as_str()),
                    Component::Delete(n) => {
                        Value::from(-i64::try_from(*n).unwrap_or(i64::MAX))
                    }
                })
                .collect(),
        )
    }
}

fn component_from_value(value: &Value) -> Option<Component> {
    match value {
        Value::String(text) => Some(Component::Insert(text.clone())),
        Value::Number(n) => {
            let n = n.as_i64()?;
            match n {
                0 => None,
                n if n > 0 => usize::try_from(n).ok().map(Component::Retain),
                n => usize::try_from(n.unsigned_abs()).ok().map(Component::Delete),
            }
        }
        _ => None,
    }
}

impl fmt::Display for TextOperation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_json())
    }
}

impl FromIterator<Component> for TextOperation {
    fn from_iter<I: IntoIterator<Item = Component>>(iter: I) -> Self {
        iter.into_iter().fold(Self::new(), Self::push)
    }
}

impl Serialize for TextOperation {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        self.to_value().serialize(serializer)
    }
}

impl<'de> Deserialize<'de> for TextOperation {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let value = Value::deserialize(deserializer)?;
        Self::from_value(&value).map_err(D::Error::custom)
    }
}
