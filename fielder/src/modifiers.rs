//! Visibility and storage flags carried by a field declaration.

use std::fmt;
use std::ops::BitOr;

use serde::Serialize;

use crate::error::ModifierError;

/// Bitset of field modifiers.
///
/// The numeric values are part of the annotation surface: `modifiers = 9`
/// means `public static`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize)]
#[serde(transparent)]
pub struct Modifiers(u64);

impl Modifiers {
    pub const NONE: Self = Self(0);
    pub const PUBLIC: Self = Self(1);
    pub const PRIVATE: Self = Self(2);
    pub const PROTECTED: Self = Self(4);
    pub const STATIC: Self = Self(8);
    pub const FINAL: Self = Self(16);

    const VISIBILITY: u64 = 1 | 2 | 4;
    const ALL: u64 = Self::VISIBILITY | 8 | 16;

    const KEYWORDS: [(&'static str, Modifiers); 5] = [
        ("public", Self::PUBLIC),
        ("private", Self::PRIVATE),
        ("protected", Self::PROTECTED),
        ("static", Self::STATIC),
        ("final", Self::FINAL),
    ];

    /// Build a modifier set from raw bits, rejecting unknown flags and
    /// conflicting visibilities.
    pub fn from_bits(bits: u64) -> Result<Self, ModifierError> {
        let unknown = bits & !Self::ALL;
        if unknown != 0 {
            return Err(ModifierError::UnknownBits { bits, unknown });
        }
        if (bits & Self::VISIBILITY).count_ones() > 1 {
            return Err(ModifierError::ConflictingVisibility(Self(bits)));
        }
        Ok(Self(bits))
    }

    /// Parse a whitespace or `|` separated keyword list such as `"public final"`.
    pub fn parse_keywords(input: &str) -> Result<Self, ModifierError> {
        let mut bits = 0;
        for word in input.split(|c: char| c.is_whitespace() || c == '|').filter(|w| !w.is_empty()) {
            let (_, flag) = Self::KEYWORDS
                .iter()
                .find(|(keyword, _)| *keyword == word)
                .ok_or_else(|| ModifierError::UnknownKeyword(word.to_string()))?;
            bits |= flag.0;
        }
        Self::from_bits(bits)
    }

    pub const fn bits(self) -> u64 {
        self.0
    }

    pub const fn contains(self, other: Self) -> bool {
        self.0 & other.0 == other.0
    }

    pub const fn is_empty(self) -> bool {
        self.0 == 0
    }
}

impl BitOr for Modifiers {
    type Output = Self;

    fn bitor(self, rhs: Self) -> Self {
        Self(self.0 | rhs.0)
    }
}

impl fmt::Display for Modifiers {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.is_empty() {
            return f.write_str("none");
        }
        let words: Vec<&str> = Self::KEYWORDS
            .iter()
            .filter(|(_, flag)| self.contains(*flag))
            .map(|(keyword, _)| *keyword)
            .collect();
        f.write_str(&words.join(" "))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_combined_bits() {
        let mods = Modifiers::PUBLIC | Modifiers::STATIC;
        assert_eq!(mods.bits(), 9);
        assert!(mods.contains(Modifiers::PUBLIC));
        assert!(!mods.contains(Modifiers::FINAL));
        assert_eq!(Modifiers::from_bits(9).unwrap(), mods);
    }

    #[test]
    fn test_rejects_unknown_and_conflicting_bits() {
        assert!(matches!(
            Modifiers::from_bits(32),
            Err(ModifierError::UnknownBits { unknown: 32, .. })
        ));
        assert!(matches!(
            Modifiers::from_bits(1 | 2),
            Err(ModifierError::ConflictingVisibility(_))
        ));
    }

    #[test]
    fn test_keywords() {
        assert_eq!(
            Modifiers::parse_keywords("public final").unwrap(),
            Modifiers::PUBLIC | Modifiers::FINAL
        );
        assert_eq!(Modifiers::parse_keywords("protected|static").unwrap().bits(), 12);
        assert_eq!(Modifiers::parse_keywords("").unwrap(), Modifiers::NONE);
        assert!(Modifiers::parse_keywords("pub").is_err());
    }

    #[test]
    fn test_display() {
        assert_eq!((Modifiers::PRIVATE | Modifiers::FINAL).to_string(), "private final");
        assert_eq!(Modifiers::NONE.to_string(), "none");
    }
}
