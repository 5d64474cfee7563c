//! crates/toc_core/src/ids.rs
//! Identifier newtypes: proposal keys and TOC names.
//! Strict shapes, no I/O.

use core::fmt;
use core::str::FromStr;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use crate::errors::CoreError;

const MAX_KEY_LEN: usize = 256;
const MAX_TOC_NAME_LEN: usize = 128;

/// Proposal key: 1..=256 chars, no control characters, not all whitespace.
#[inline]
pub fn is_valid_proposal_key(s: &str) -> bool {
    !s.trim().is_empty() && s.len() <= MAX_KEY_LEN && !s.chars().any(char::is_control)
}

/// TOC name: ^[A-Za-z0-9_.-]{1,128}$ and not a dot path segment.
/// TOC names become artifact file stems, so no separators are allowed.
#[inline]
pub fn is_valid_toc_name(s: &str) -> bool {
    let len = s.len();
    if len == 0 || len > MAX_TOC_NAME_LEN || s == "." || s == ".." {
        return false;
    }
    s.bytes()
        .all(|b| b.is_ascii_alphanumeric() || b == b'_' || b == b'.' || b == b'-')
}

macro_rules! simple_string_newtype {
    ($(#[$m:meta])* $name:ident, $check:path) => {
        $(#[$m])*
        #[derive(Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Debug)]
        #[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
        #[cfg_attr(feature = "serde", serde(try_from = "String", into = "String"))]
        pub struct $name(String);

        impl $name {
            #[inline] pub fn as_str(&self) -> &str { &self.0 }
        }

        impl fmt::Display for $name {
            #[inline]
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result { f.write_str(&self.0) }
        }

        impl FromStr for $name {
            type Err = CoreError;
            fn from_str(s: &str) -> Result<Self, Self::Err> {
                if $check(s) { Ok(Self(s.to_owned())) } else { Err(CoreError::InvalidKey) }
            }
        }

        impl TryFrom<&str> for $name {
            type Error = CoreError;
            #[inline]
            fn try_from(value: &str) -> Result<Self, Self::Error> { value.parse() }
        }

        impl TryFrom<String> for $name {
            type Error = CoreError;
            fn try_from(value: String) -> Result<Self, Self::Error> {
                if $check(&value) { Ok(Self(value)) } else { Err(CoreError::InvalidKey) }
            }
        }

        impl From<$name> for String {
            #[inline]
            fn from(value: $name) -> String { value.0 }
        }

        impl AsRef<str> for $name {
            #[inline]
            fn as_ref(&self) -> &str { &self.0 }
        }
    };
}

simple_string_newtype!(
    /// Unique key of one competition proposal (opaque to the engine).
    ProposalKey,
    is_valid_proposal_key
);

simple_string_newtype!(
    /// Name of a TOC; doubles as the artifact file stem.
    TocName,
    is_valid_toc_name
);
