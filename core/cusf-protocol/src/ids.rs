use core::cmp::Ordering;
use core::fmt;

#[cfg(feature = "serde")]
use serde::{Deserialize as SerdeDeserialize, Serialize as SerdeSerialize};

/// Splits an id like `12`, `3-4` or `5.1` into its numeric components.
/// Returns `None` for ids that are not numeric.
fn numeric_key(id: &str) -> Option<(u64, u64)> {
    let (major, minor) = match id.find(['-', '.']) {
        Some(i) => (&id[..i], &id[i + 1..]),
        None => (id, "0"),
    };
    Some((major.parse().ok()?, minor.parse().ok()?))
}

macro_rules! define_ref {
    ($name:ident, $doc:expr) => {
        #[doc = $doc]
        #[derive(Debug, Clone, PartialEq, Eq, Hash, Default)]
        #[cfg_attr(feature = "serde", derive(SerdeDeserialize, SerdeSerialize))]
        #[cfg_attr(feature = "serde", serde(transparent))]
        pub struct $name(pub String);

        impl $name {
            pub fn new(id: impl Into<String>) -> Self {
                Self(id.into())
            }

            pub fn as_str(&self) -> &str {
                &self.0
            }

            /// Numeric interpretation used for ordering, if the id has one.
            pub fn numeric_key(&self) -> Option<(u64, u64)> {
                numeric_key(&self.0)
            }
        }

        impl Ord for $name {
            fn cmp(&self, other: &Self) -> Ordering {
                match (self.numeric_key(), other.numeric_key()) {
                    (Some(a), Some(b)) => a.cmp(&b).then_with(|| self.0.cmp(&other.0)),
                    (Some(_), None) => Ordering::Less,
                    (None, Some(_)) => Ordering::Greater,
                    (None, None) => self.0.cmp(&other.0),
                }
            }
        }

        impl PartialOrd for $name {
            fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
                Some(self.cmp(other))
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str(&self.0)
            }
        }

        impl From<&str> for $name {
            fn from(id: &str) -> Self {
                Self(id.to_string())
            }
        }

        impl From<String> for $name {
            fn from(id: String) -> Self {
                Self(id)
            }
        }
    };
}

define_ref!(TokenRef, "Opaque reference to a token (node) of a sentence's syntax tree.");
define_ref!(SentenceId, "Identifier of a sentence unit, usually taken from its `sent_id` comment.");

impl TokenRef {
    /// True for plain word ids (`7`), false for ranges (`7-8`) and empty nodes (`7.1`).
    pub fn is_word(&self) -> bool {
        !self.0.is_empty() && self.0.bytes().all(|b| b.is_ascii_digit())
    }
}
