//! Write-once vertex attribute bag.

use thiserror::Error;

/// A typed scalar attribute value.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AttrValue {
    Str(String),
    U32(u32),
    U64(u64),
}

/// Errors from attribute bag mutation.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum AttrError {
    /// An attribute of this name was already set; attributes are immutable
    /// once written (the graph model's IMMUTABLE rule).
    #[error("attribute '{0}' is already set and cannot be overwritten")]
    AlreadySet(String),
}

/// An insertion-ordered, write-once map of attribute name to value.
///
/// Names are not unique by construction; [`AttrBag::set`] rejects a second
/// write under the same name rather than silently overwriting it, since the
/// graph model treats every attribute as set exactly once at vertex creation.
#[derive(Debug, Clone, Default)]
pub struct AttrBag {
    entries: Vec<(String, AttrValue)>,
}

impl AttrBag {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets an attribute. Returns an error if the name is already present.
    pub fn set(&mut self, name: impl Into<String>, value: AttrValue) -> Result<(), AttrError> {
        let name = name.into();
        if self.entries.iter().any(|(n, _)| n == &name) {
            return Err(AttrError::AlreadySet(name));
        }
        self.entries.push((name, value));
        Ok(())
    }

    #[must_use]
    pub fn get(&self, name: &str) -> Option<&AttrValue> {
        self.entries
            .iter()
            .find(|(n, _)| n == name)
            .map(|(_, v)| v)
    }

    /// Iterates attributes in insertion order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &AttrValue)> {
        self.entries.iter().map(|(n, v)| (n.as_str(), v))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn set_then_get_roundtrips() {
        let mut bag = AttrBag::new();
        bag.set("manufacturer", AttrValue::Str("Acme".into())).unwrap();
        assert_eq!(
            bag.get("manufacturer"),
            Some(&AttrValue::Str("Acme".into()))
        );
    }

    #[test]
    fn second_write_to_same_name_is_rejected() {
        let mut bag = AttrBag::new();
        bag.set("start-phy", AttrValue::U32(0)).unwrap();
        let err = bag.set("start-phy", AttrValue::U32(1)).unwrap_err();
        assert_eq!(err, AttrError::AlreadySet("start-phy".into()));
        // The original value must survive the rejected write.
        assert_eq!(bag.get("start-phy"), Some(&AttrValue::U32(0)));
    }

    #[test]
    fn iteration_preserves_insertion_order() {
        let mut bag = AttrBag::new();
        bag.set("a", AttrValue::U32(1)).unwrap();
        bag.set("b", AttrValue::U32(2)).unwrap();
        bag.set("c", AttrValue::U32(3)).unwrap();
        let names: Vec<_> = bag.iter().map(|(n, _)| n).collect();
        assert_eq!(names, vec!["a", "b", "c"]);
    }
}
