// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Framework-independent saved-state bundle.

use alloc::string::{String, ToString};
use alloc::vec::Vec;
use hashbrown::HashMap;

/// String-keyed bundle written by `save_instance_state` and read back at
/// construction. The host decides how and where to persist it.
pub type SavedStateMap = HashMap<String, SavedValue>;

/// A value in a [`SavedStateMap`]: a primitive or a composite of primitives.
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum SavedValue {
    /// A boolean.
    Bool(bool),
    /// A signed integer. Unsigned values are stored here when they fit.
    Int(i64),
    /// A string.
    Str(String),
    /// An ordered list.
    List(Vec<SavedValue>),
    /// A nested bundle.
    Map(SavedStateMap),
}

/// Failure to decode a [`SavedValue`].
///
/// Routing sources never surface this from construction; they log it and fall
/// back to their defaults. Application [`Saveable`] impls return it.
#[derive(Clone, Debug, PartialEq, Eq, thiserror::Error)]
pub enum SavedStateError {
    /// A required entry is absent.
    #[error("missing saved-state entry `{0}`")]
    Missing(String),
    /// The entry holds a different kind of value.
    #[error("expected {expected}, found {found}")]
    TypeMismatch {
        /// Kind that was expected.
        expected: &'static str,
        /// Kind that was found.
        found: &'static str,
    },
    /// A string does not name any known variant.
    #[error("unknown variant `{0}`")]
    UnknownVariant(String),
    /// An integer does not fit the target type.
    #[error("value {0} is out of range")]
    OutOfRange(i64),
    /// The entry is well-typed but inconsistent.
    #[error("invalid saved state: {0}")]
    Invalid(&'static str),
}

impl SavedValue {
    /// Name of this value's kind, used in error messages.
    pub fn kind(&self) -> &'static str {
        match self {
            Self::Bool(_) => "bool",
            Self::Int(_) => "int",
            Self::Str(_) => "string",
            Self::List(_) => "list",
            Self::Map(_) => "map",
        }
    }

    fn mismatch(&self, expected: &'static str) -> SavedStateError {
        SavedStateError::TypeMismatch {
            expected,
            found: self.kind(),
        }
    }

    /// The boolean payload.
    pub fn as_bool(&self) -> Result<bool, SavedStateError> {
        match self {
            Self::Bool(b) => Ok(*b),
            other => Err(other.mismatch("bool")),
        }
    }

    /// The integer payload.
    pub fn as_int(&self) -> Result<i64, SavedStateError> {
        match self {
            Self::Int(i) => Ok(*i),
            other => Err(other.mismatch("int")),
        }
    }

    /// The string payload.
    pub fn as_str(&self) -> Result<&str, SavedStateError> {
        match self {
            Self::Str(s) => Ok(s),
            other => Err(other.mismatch("string")),
        }
    }

    /// The list payload.
    pub fn as_list(&self) -> Result<&[Self], SavedStateError> {
        match self {
            Self::List(l) => Ok(l),
            other => Err(other.mismatch("list")),
        }
    }

    /// The nested bundle.
    pub fn as_map(&self) -> Result<&SavedStateMap, SavedStateError> {
        match self {
            Self::Map(m) => Ok(m),
            other => Err(other.mismatch("map")),
        }
    }

    /// Look up `key` in a nested bundle.
    pub fn field(&self, key: &str) -> Result<&Self, SavedStateError> {
        self.as_map()?
            .get(key)
            .ok_or_else(|| SavedStateError::Missing(key.to_string()))
    }
}

/// Types that can be written to and read from a [`SavedValue`].
///
/// Application keys implement this to make routing sources restorable. An
/// enum of screens typically saves its variant name:
///
/// ```rust
/// use understory_routing::{Saveable, SavedStateError, SavedValue};
///
/// #[derive(Clone, Debug, PartialEq)]
/// enum Screen {
///     Intro,
///     Settings,
/// }
///
/// impl Saveable for Screen {
///     fn save(&self) -> SavedValue {
///         let name = match self {
///             Self::Intro => "Intro",
///             Self::Settings => "Settings",
///         };
///         SavedValue::Str(name.into())
///     }
///
///     fn restore(value: &SavedValue) -> Result<Self, SavedStateError> {
///         match value.as_str()? {
///             "Intro" => Ok(Self::Intro),
///             "Settings" => Ok(Self::Settings),
///             other => Err(SavedStateError::UnknownVariant(other.into())),
///         }
///     }
/// }
///
/// assert_eq!(Screen::restore(&Screen::Settings.save()), Ok(Screen::Settings));
/// ```
pub trait Saveable: Sized {
    /// Encode `self`.
    fn save(&self) -> SavedValue;

    /// Decode a value previously produced by [`Saveable::save`].
    fn restore(value: &SavedValue) -> Result<Self, SavedStateError>;
}

impl Saveable for bool {
    fn save(&self) -> SavedValue {
        SavedValue::Bool(*self)
    }

    fn restore(value: &SavedValue) -> Result<Self, SavedStateError> {
        value.as_bool()
    }
}

impl Saveable for String {
    fn save(&self) -> SavedValue {
        SavedValue::Str(self.clone())
    }

    fn restore(value: &SavedValue) -> Result<Self, SavedStateError> {
        value.as_str().map(ToString::to_string)
    }
}

impl Saveable for char {
    fn save(&self) -> SavedValue {
        SavedValue::Str(self.to_string())
    }

    fn restore(value: &SavedValue) -> Result<Self, SavedStateError> {
        let s = value.as_str()?;
        let mut chars = s.chars();
        match (chars.next(), chars.next()) {
            (Some(c), None) => Ok(c),
            _ => Err(SavedStateError::Invalid("expected a single character")),
        }
    }
}

impl Saveable for i64 {
    fn save(&self) -> SavedValue {
        SavedValue::Int(*self)
    }

    fn restore(value: &SavedValue) -> Result<Self, SavedStateError> {
        value.as_int()
    }
}

macro_rules! saveable_int {
    ($($ty:ty),*) => {
        $(
            impl Saveable for $ty {
                fn save(&self) -> SavedValue {
                    // Values beyond i64::MAX saturate; restore then reports them out of range.
                    SavedValue::Int(i64::try_from(*self).unwrap_or(i64::MAX))
                }

                fn restore(value: &SavedValue) -> Result<Self, SavedStateError> {
                    let raw = value.as_int()?;
                    <$ty>::try_from(raw).map_err(|_| SavedStateError::OutOfRange(raw))
                }
            }
        )*
    };
}

saveable_int!(i32, u32, u64, usize);

impl<T: Saveable> Saveable for Vec<T> {
    fn save(&self) -> SavedValue {
        SavedValue::List(self.iter().map(Saveable::save).collect())
    }

    fn restore(value: &SavedValue) -> Result<Self, SavedStateError> {
        value.as_list()?.iter().map(T::restore).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use alloc::vec;

    #[test]
    fn primitives_restore() {
        assert_eq!(u32::restore(&7_u32.save()), Ok(7));
        assert_eq!(char::restore(&'x'.save()), Ok('x'));
        assert_eq!(bool::restore(&true.save()), Ok(true));
        assert_eq!(
            Vec::<usize>::restore(&vec![1_usize, 2, 3].save()),
            Ok(vec![1, 2, 3])
        );
    }

    #[test]
    fn out_of_range_and_mismatch_are_reported() {
        assert_eq!(
            u32::restore(&SavedValue::Int(-1)),
            Err(SavedStateError::OutOfRange(-1))
        );
        assert_eq!(
            char::restore(&SavedValue::Int(1)),
            Err(SavedStateError::TypeMismatch {
                expected: "string",
                found: "int",
            })
        );
        assert!(char::restore(&SavedValue::Str("ab".into())).is_err());
    }

    #[test]
    fn field_lookup() {
        let mut inner = SavedStateMap::new();
        inner.insert("active".into(), SavedValue::Int(2));
        let value = SavedValue::Map(inner);

        assert_eq!(value.field("active").and_then(SavedValue::as_int), Ok(2));
        assert_eq!(
            value.field("items"),
            Err(SavedStateError::Missing("items".into()))
        );
    }

    #[cfg(feature = "serde")]
    #[test]
    fn bundle_survives_json() {
        let mut map = SavedStateMap::new();
        map.insert("items".into(), vec!['a', 'b'].save());
        map.insert("active".into(), SavedValue::Int(1));

        let json = serde_json::to_string(&map).unwrap();
        let back: SavedStateMap = serde_json::from_str(&json).unwrap();
        assert_eq!(back, map);
    }
}
