use std::fmt;
use std::str::FromStr;

use bitflags::bitflags;
use serde::de::Error as _;
use serde::{Deserialize, Deserializer, Serialize, Serializer};

bitflags! {
    /// Bitmask classifying a node's position in the tree and its entry kind.
    ///
    /// Positional bits (`TREE`, `TOP`, `LEAF`, `INTERMEDIATE`, `CUSTOM`) may
    /// combine freely; exactly one of `FILE` / `FOLDER` is set per node.
    #[derive(Clone, Copy, Debug, Eq, Hash, PartialEq)]
    pub struct Scope: u8 {
        /// The traversal root itself.
        const TREE = 1;
        /// A direct child of the traversal root.
        const TOP = 1 << 1;
        /// A folder with no sub-folders.
        const LEAF = 1 << 2;
        /// A folder between the top level and the leaves.
        const INTERMEDIATE = 1 << 3;
        /// A regular file entry.
        const FILE = 1 << 4;
        /// A directory entry.
        const FOLDER = 1 << 5;
        /// Caller-defined classification.
        const CUSTOM = 1 << 6;
    }
}

impl Default for Scope {
    fn default() -> Self {
        Self::empty()
    }
}

impl Scope {
    const NAMES: [(Self, &'static str); 7] = [
        (Self::TREE, "tree"),
        (Self::TOP, "top"),
        (Self::LEAF, "leaf"),
        (Self::INTERMEDIATE, "intermediate"),
        (Self::FILE, "file"),
        (Self::FOLDER, "folder"),
        (Self::CUSTOM, "custom"),
    ];

    /// Scope accepted by filters that do not care about position or kind.
    #[must_use]
    pub const fn any() -> Self {
        Self::all()
    }
}

impl fmt::Display for Scope {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut first = true;
        for (flag, name) in Self::NAMES {
            if self.contains(flag) {
                if !first {
                    f.write_str("|")?;
                }
                f.write_str(name)?;
                first = false;
            }
        }
        Ok(())
    }
}

impl FromStr for Scope {
    type Err = ScopeParseError;

    fn from_str(text: &str) -> Result<Self, Self::Err> {
        let mut scope = Self::empty();
        for part in text.split('|').map(str::trim).filter(|p| !p.is_empty()) {
            let flag = Self::NAMES
                .iter()
                .find(|(_, name)| name.eq_ignore_ascii_case(part))
                .map(|(flag, _)| *flag)
                .ok_or_else(|| ScopeParseError {
                    token: part.to_owned(),
                })?;
            scope |= flag;
        }
        Ok(scope)
    }
}

impl Serialize for Scope {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for Scope {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let text = String::deserialize(deserializer)?;
        text.parse().map_err(D::Error::custom)
    }
}

/// Error produced when a scope string contains an unknown token.
#[derive(Clone, Debug, Eq, PartialEq, thiserror::Error)]
#[error("unknown scope token '{token}'")]
pub struct ScopeParseError {
    /// The token that failed to parse.
    pub token: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn scope_round_trips_through_display() {
        let scope = Scope::TOP | Scope::LEAF | Scope::FOLDER;
        let text = scope.to_string();
        assert_eq!(text, "top|leaf|folder");
        assert_eq!(text.parse::<Scope>().unwrap(), scope);
    }

    #[test]
    fn scope_parse_is_case_insensitive() {
        let scope: Scope = "Tree|FILE".parse().unwrap();
        assert_eq!(scope, Scope::TREE | Scope::FILE);
    }

    #[test]
    fn scope_parse_rejects_unknown_token() {
        let error = "file|bogus".parse::<Scope>().unwrap_err();
        assert_eq!(error.token, "bogus");
    }

    #[test]
    fn empty_scope_parses_from_empty_string() {
        let scope: Scope = "".parse().unwrap();
        assert!(scope.is_empty());
    }
}
