//! Dispatch of abstract resource families onto concrete types.

use crate::errors::{DispatchError, ResourceError};
use crate::serialization::lookup;
use serde_json::Value;
use std::fmt::Debug;

/// Static mapping from discriminator strings to the concrete kinds of one family.
///
/// Several strings may map to the same kind (deprecated aliases). The reverse
/// direction always produces the first non-deprecated string.
#[derive(Debug)]
pub struct DiscriminatorTable<K: 'static> {
    /// Human-readable family name, e.g. `predictor`.
    pub family: &'static str,
    /// Dotted path of the discriminator, e.g. `config.type`.
    pub path: &'static str,
    /// `(discriminator, kind, deprecated)`
    pub rows: &'static [(&'static str, K, bool)],
}

impl<K: Copy + PartialEq> DiscriminatorTable<K> {
    /// Resolve the kind of `data` without modifying it.
    pub fn lookup(&self, data: &Value) -> Result<K, DispatchError> {
        let raw = lookup(data, self.path).ok_or_else(|| DispatchError::MissingDiscriminator {
            family: self.family,
            path: self.path.to_string(),
        })?;
        let value = match raw {
            Value::String(s) => s.as_str(),
            _ => "",
        };
        self.rows
            .iter()
            .find(|(name, _, _)| *name == value)
            .map(|(_, kind, _)| *kind)
            .ok_or_else(|| DispatchError::UnknownDiscriminator {
                family: self.family,
                value: raw.as_str().map(str::to_string).unwrap_or_else(|| raw.to_string()),
                legal: self.legal(),
            })
    }

    /// The discriminator string written when dumping `kind`.
    pub fn canonical(&self, kind: K) -> Option<&'static str> {
        let mut rows = self.rows.iter().filter(|(_, k, _)| *k == kind);
        rows.clone()
            .find(|(_, _, deprecated)| !deprecated)
            .or_else(|| rows.next())
            .map(|(name, _, _)| *name)
    }

    /// Every accepted discriminator string.
    pub fn legal(&self) -> Vec<String> {
        self.rows.iter().map(|(name, _, _)| name.to_string()).collect()
    }
}

/// An abstract family of resources whose concrete type is chosen by a discriminator.
pub trait PolymorphicSerializable: Sized {
    type Kind: Copy + PartialEq + Debug + 'static;

    const TABLE: DiscriminatorTable<Self::Kind>;

    /// Which concrete type `data` describes. Pure in `data`.
    fn get_type(data: &Value) -> Result<Self::Kind, DispatchError> {
        Self::TABLE.lookup(data)
    }

    /// Resolve the concrete type with [Self::get_type], then build it from `data`.
    fn build(data: Value) -> Result<Self, ResourceError>;

    fn kind(&self) -> Self::Kind;

    fn dump(&self) -> Result<Value, ResourceError>;

    /// The canonical discriminator for this value.
    fn discriminator(&self) -> Result<&'static str, ResourceError> {
        Self::TABLE.canonical(self.kind()).ok_or_else(|| {
            ResourceError::Invalid(format!(
                "{:?} has no discriminator in the {} table",
                self.kind(),
                Self::TABLE.family
            ))
        })
    }
}
