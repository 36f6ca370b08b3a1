// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Keyword validators and parsers usable as descriptor converters.

use alloc::string::String;
use alloc::vec::Vec;
use smallvec::SmallVec;

use crate::error::ConversionError;

/// A predicate over textual values.
///
/// Implemented for [`KeywordValidator`] and for any `Fn(&str) -> bool`.
pub trait Validator {
    /// Returns `true` if `value` is acceptable.
    fn is_valid(&self, value: &str) -> bool;
}

impl<F: Fn(&str) -> bool> Validator for F {
    fn is_valid(&self, value: &str) -> bool {
        self(value)
    }
}

/// A set-membership predicate over a fixed list of keywords.
///
/// Matching is exact; [`make_parser`] lowercases before asking.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct KeywordValidator {
    allowed: SmallVec<[&'static str; 8]>,
}

impl KeywordValidator {
    /// Returns the accepted keywords.
    #[must_use]
    pub fn allowed(&self) -> &[&'static str] {
        &self.allowed
    }
}

impl Validator for KeywordValidator {
    fn is_valid(&self, value: &str) -> bool {
        self.allowed.contains(&value)
    }
}

/// Creates a validator accepting exactly the given keywords.
///
/// ```rust
/// use understory_property::{make_validator, Validator};
///
/// let is_visibility = make_validator(&["visible", "hidden", "collapse"]);
/// assert!(is_visibility.is_valid("hidden"));
/// assert!(!is_visibility.is_valid("Hidden"));
/// ```
#[must_use]
pub fn make_validator(allowed: &[&'static str]) -> KeywordValidator {
    KeywordValidator {
        allowed: allowed.iter().copied().collect(),
    }
}

/// Creates a converter that lowercases its input and checks it against
/// `validator`.
///
/// The accepted keyword is returned in lowercase; anything else fails with
/// [`ConversionError::InvalidValue`] carrying the original text.
///
/// ```rust
/// use understory_property::{make_parser, make_validator, ConversionError};
///
/// let parse = make_parser(make_validator(&["left", "right"]));
/// assert_eq!(parse("Left"), Ok("left".to_string()));
/// assert_eq!(parse("Up"), Err(ConversionError::invalid("Up")));
/// ```
pub fn make_parser<V>(validator: V) -> impl Fn(&str) -> Result<String, ConversionError>
where
    V: Validator,
{
    move |value: &str| {
        let lower = value.to_ascii_lowercase();
        if validator.is_valid(&lower) {
            Ok(lower)
        } else {
            Err(ConversionError::invalid(value))
        }
    }
}

/// Creates a converter mapping case-insensitive keywords onto typed values.
///
/// ```rust
/// use understory_property::make_keyword_parser;
///
/// #[derive(Clone, Copy, Debug, PartialEq)]
/// enum Orientation { Horizontal, Vertical }
///
/// let parse = make_keyword_parser(&[
///     ("horizontal", Orientation::Horizontal),
///     ("vertical", Orientation::Vertical),
/// ]);
/// assert_eq!(parse("VERTICAL"), Ok(Orientation::Vertical));
/// assert!(parse("diagonal").is_err());
/// ```
pub fn make_keyword_parser<T: Clone>(
    keywords: &[(&'static str, T)],
) -> impl Fn(&str) -> Result<T, ConversionError> + use<T> {
    let keywords: Vec<_> = keywords.to_vec();
    move |value: &str| {
        keywords
            .iter()
            .find(|(keyword, _)| keyword.eq_ignore_ascii_case(value))
            .map(|(_, parsed)| parsed.clone())
            .ok_or_else(|| ConversionError::invalid(value))
    }
}
