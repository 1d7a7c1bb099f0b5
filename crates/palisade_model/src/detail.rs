//! Detail levels for fetched objects.
//!
//! Every object carries the level of detail it was last hydrated at. The
//! levels form a total order: a [`DetailLevel::Uid`] record holds nothing but
//! an identifier, [`DetailLevel::Standard`] adds the common business fields,
//! and [`DetailLevel::Full`] includes memberships and nested configuration.
//! Re-parsing an object at a lower level than it already has never strips
//! fields; levels only ever go up.

use std::fmt;
use std::str::FromStr;

use serde::de::{self, Deserialize, Deserializer};
use serde::ser::{Serialize, Serializer};

use crate::error::ModelError;

/// How much of an object's state has been fetched from the management server.
///
/// The order of the variants is meaningful: `Uid < Standard < Full`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum DetailLevel {
    /// Identifier only. The object is a placeholder for something the server
    /// mentioned by reference.
    Uid,
    /// Name, color, comments and the other flat business fields.
    Standard,
    /// Everything, including membership lists and nested settings.
    Full,
}

impl DetailLevel {
    /// Wire token for the `details-level` request parameter.
    pub fn token(self) -> &'static str {
        match self {
            DetailLevel::Uid => "uid",
            DetailLevel::Standard => "standard",
            DetailLevel::Full => "full",
        }
    }

    /// The higher of `self` and `other`.
    pub fn promote(self, other: DetailLevel) -> DetailLevel {
        self.max(other)
    }
}

impl Default for DetailLevel {
    fn default() -> Self {
        DetailLevel::Standard
    }
}

impl fmt::Display for DetailLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.token())
    }
}

impl FromStr for DetailLevel {
    type Err = ModelError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        if s.eq_ignore_ascii_case("uid") {
            Ok(DetailLevel::Uid)
        } else if s.eq_ignore_ascii_case("standard") {
            Ok(DetailLevel::Standard)
        } else if s.eq_ignore_ascii_case("full") {
            Ok(DetailLevel::Full)
        } else {
            Err(ModelError::UnknownDetailLevel(s.to_owned()))
        }
    }
}

impl Serialize for DetailLevel {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.token())
    }
}

impl<'de> Deserialize<'de> for DetailLevel {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let token = String::deserialize(deserializer)?;
        token.parse().map_err(de::Error::custom)
    }
}
