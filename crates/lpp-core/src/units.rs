// Copyright 2026 James Casey
// SPDX-License-Identifier: Apache-2.0

//! Metric prefixes and measurement units.
//!
//! A unit word is an optional metric prefix followed by a unit symbol:
//! `mL`, `us`, `kg`, `mol`, `rpm`. Splitting is exact-match-first — a
//! word that is itself a unit symbol (`min`, `mol`, `m`) is never broken
//! into prefix + remainder — and the two-character prefix `da` (deka) is
//! tried before the single-character prefixes.

/// A metric prefix scaling a unit by a power of ten.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum Prefix {
    Yotta,
    Zetta,
    Exa,
    Peta,
    Tera,
    Giga,
    Mega,
    Kilo,
    Hecto,
    Deka,
    Deci,
    Centi,
    Milli,
    Micro,
    Nano,
    Pico,
    Femto,
    Atto,
    Zepto,
    Yocto,
    #[default]
    None,
}

impl Prefix {
    /// All prefixes with their symbol, largest-scale first.
    const TABLE: &'static [(&'static str, Prefix)] = &[
        ("Y", Self::Yotta),
        ("Z", Self::Zetta),
        ("E", Self::Exa),
        ("P", Self::Peta),
        ("T", Self::Tera),
        ("G", Self::Giga),
        ("M", Self::Mega),
        ("k", Self::Kilo),
        ("h", Self::Hecto),
        ("da", Self::Deka),
        ("d", Self::Deci),
        ("c", Self::Centi),
        ("m", Self::Milli),
        ("u", Self::Micro),
        ("n", Self::Nano),
        ("p", Self::Pico),
        ("f", Self::Femto),
        ("a", Self::Atto),
        ("z", Self::Zepto),
        ("y", Self::Yocto),
    ];

    /// Looks up a prefix by its symbol.
    #[must_use]
    pub fn from_symbol(symbol: &str) -> Option<Self> {
        Self::TABLE
            .iter()
            .find(|(text, _)| *text == symbol)
            .map(|(_, prefix)| *prefix)
    }

    /// Returns the symbol for this prefix (empty for [`Prefix::None`]).
    #[must_use]
    pub fn symbol(self) -> &'static str {
        Self::TABLE
            .iter()
            .find(|(_, prefix)| *prefix == self)
            .map_or("", |(text, _)| text)
    }

    /// Returns the power-of-ten scale factor.
    #[must_use]
    pub fn scale(self) -> f64 {
        match self {
            Self::Yotta => 1e24,
            Self::Zetta => 1e21,
            Self::Exa => 1e18,
            Self::Peta => 1e15,
            Self::Tera => 1e12,
            Self::Giga => 1e9,
            Self::Mega => 1e6,
            Self::Kilo => 1e3,
            Self::Hecto => 1e2,
            Self::Deka => 1e1,
            Self::Deci => 1e-1,
            Self::Centi => 1e-2,
            Self::Milli => 1e-3,
            Self::Micro => 1e-6,
            Self::Nano => 1e-9,
            Self::Pico => 1e-12,
            Self::Femto => 1e-15,
            Self::Atto => 1e-18,
            Self::Zepto => 1e-21,
            Self::Yocto => 1e-24,
            Self::None => 1.0,
        }
    }
}

/// A measurement unit symbol.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum Unit {
    Liter,
    Second,
    Minute,
    Hour,
    Gram,
    Celsius,
    Fahrenheit,
    Kelvin,
    Volt,
    Ampere,
    Mole,
    Molar,
    Meter,
    Candela,
    Gforce,
    Rpm,
    #[default]
    None,
}

impl Unit {
    /// Unit symbols, longest first so `mol` wins over `m`.
    const TABLE: &'static [(&'static str, Unit)] = &[
        ("min", Self::Minute),
        ("mol", Self::Mole),
        ("rpm", Self::Rpm),
        ("cd", Self::Candela),
        ("L", Self::Liter),
        ("s", Self::Second),
        ("h", Self::Hour),
        ("g", Self::Gram),
        ("C", Self::Celsius),
        ("F", Self::Fahrenheit),
        ("K", Self::Kelvin),
        ("V", Self::Volt),
        ("A", Self::Ampere),
        ("M", Self::Molar),
        ("m", Self::Meter),
        ("G", Self::Gforce),
    ];

    /// Looks up a unit by its exact symbol.
    #[must_use]
    pub fn from_symbol(symbol: &str) -> Option<Self> {
        Self::TABLE
            .iter()
            .find(|(text, _)| *text == symbol)
            .map(|(_, unit)| *unit)
    }

    /// Returns the symbol for this unit (empty for [`Unit::None`]).
    #[must_use]
    pub fn symbol(self) -> &'static str {
        Self::TABLE
            .iter()
            .find(|(_, unit)| *unit == self)
            .map_or("", |(text, _)| text)
    }
}

/// Splits a word into `(prefix, unit)`.
///
/// Exact unit symbols match unprefixed first; otherwise the leading one
/// or two characters must be a metric prefix and the remainder a unit
/// symbol. Returns `None` when the word is not a unit.
#[must_use]
pub fn split_unit(word: &str) -> Option<(Prefix, Unit)> {
    if let Some(unit) = Unit::from_symbol(word) {
        return Some((Prefix::None, unit));
    }
    // "da" is the only two-character prefix; try it before single chars.
    if let Some(rest) = word.strip_prefix("da") {
        if let Some(unit) = Unit::from_symbol(rest) {
            return Some((Prefix::Deka, unit));
        }
    }
    let mut chars = word.chars();
    let first = chars.next()?;
    let prefix = Prefix::from_symbol(&first.to_string())?;
    let unit = Unit::from_symbol(chars.as_str())?;
    Some((prefix, unit))
}

/// Returns true if `word` lexes as a unit (optional prefix + unit symbol).
#[must_use]
pub fn is_unit_word(word: &str) -> bool {
    split_unit(word).is_some()
}
