// Copyright 2018-2023 the Deno authors. All rights reserved. MIT license.

use std::cmp::Ordering;

use capacity_builder::CapacityDisplay;
use capacity_builder::StringAppendable;
use capacity_builder::StringBuilder;
use capacity_builder::StringType;

/// A single dot separated token of a pre-release or build metadata suffix.
///
/// The numeric value is only present when the text is a canonical
/// non-negative integer (`0` or a digit sequence without a leading zero)
/// that fits in a `u64`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, CapacityDisplay)]
pub struct Identifier {
  text: String,
  numeric: Option<u64>,
}

impl<'a> StringAppendable<'a> for &'a Identifier {
  fn append_to_builder<TString: StringType>(
    self,
    builder: &mut StringBuilder<'a, TString>,
  ) {
    builder.append(self.text.as_str());
  }
}

impl Identifier {
  pub(crate) fn new(text: &str) -> Self {
    Self {
      text: text.to_string(),
      numeric: parse_numeric(text),
    }
  }

  pub fn from_numeric(value: u64) -> Self {
    Self {
      text: value.to_string(),
      numeric: Some(value),
    }
  }

  pub fn as_str(&self) -> &str {
    &self.text
  }

  pub fn numeric_value(&self) -> Option<u64> {
    self.numeric
  }

  pub fn is_numeric(&self) -> bool {
    self.numeric.is_some()
  }

  /// Bumps a numeric identifier in place. Returns `false` and leaves the
  /// identifier untouched when it is not numeric or would overflow.
  pub(crate) fn increment(&mut self) -> bool {
    match self.numeric.and_then(|value| value.checked_add(1)) {
      Some(next) => {
        *self = Self::from_numeric(next);
        true
      }
      None => false,
    }
  }
}

fn parse_numeric(text: &str) -> Option<u64> {
  let is_canonical = !text.is_empty()
    && text.chars().all(|c| c.is_ascii_digit())
    && (text == "0" || !text.starts_with('0'));
  if is_canonical {
    text.parse::<u64>().ok()
  } else {
    None
  }
}

impl PartialOrd for Identifier {
  fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
    Some(self.cmp(other))
  }
}

impl Ord for Identifier {
  fn cmp(&self, other: &Self) -> Ordering {
    // numeric identifiers always have lower precedence
    match (self.numeric, other.numeric) {
      (Some(a), Some(b)) => a.cmp(&b),
      (Some(_), None) => Ordering::Less,
      (None, Some(_)) => Ordering::Greater,
      (None, None) => self.text.cmp(&other.text),
    }
  }
}

macro_rules! identifiers {
  ($ident:ident) => {
    impl $ident {
      pub fn new(identifiers: Vec<Identifier>) -> Self {
        Self { identifiers }
      }

      /// Gets if the suffix was absent.
      pub fn is_empty(&self) -> bool {
        self.identifiers.is_empty()
      }

      pub fn len(&self) -> usize {
        self.identifiers.len()
      }

      pub fn identifiers(&self) -> &[Identifier] {
        &self.identifiers
      }

      pub fn iter(&self) -> std::slice::Iter<'_, Identifier> {
        self.identifiers.iter()
      }
    }

    impl<'a> StringAppendable<'a> for &'a $ident {
      fn append_to_builder<TString: StringType>(
        self,
        builder: &mut StringBuilder<'a, TString>,
      ) {
        for (i, identifier) in self.identifiers.iter().enumerate() {
          if i > 0 {
            builder.append('.');
          }
          builder.append(identifier);
        }
      }
    }

    impl<'a> IntoIterator for &'a $ident {
      type Item = &'a Identifier;
      type IntoIter = std::slice::Iter<'a, Identifier>;

      fn into_iter(self) -> Self::IntoIter {
        self.identifiers.iter()
      }
    }
  };
}

/// The identifiers following `-` in a version.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, CapacityDisplay)]
pub struct PreRelease {
  identifiers: Vec<Identifier>,
}

identifiers!(PreRelease);

impl PreRelease {
  /// The lowest possible pre-release, `0`.
  pub fn floor() -> Self {
    Self::new(vec![Identifier::from_numeric(0)])
  }

  /// Bumps the last numeric identifier, or appends `0` when there is none.
  ///
  /// Returns `false` if the last numeric identifier is already `u64::MAX`.
  pub(crate) fn increment(&mut self) -> bool {
    if self.identifiers.is_empty() {
      *self = Self::floor();
      return true;
    }
    match self.identifiers.iter_mut().rev().find(|i| i.is_numeric()) {
      Some(identifier) => identifier.increment(),
      None => {
        self.identifiers.push(Identifier::from_numeric(0));
        true
      }
    }
  }
}

impl PartialOrd for PreRelease {
  fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
    Some(self.cmp(other))
  }
}

impl Ord for PreRelease {
  fn cmp(&self, other: &Self) -> Ordering {
    // not having a pre-release is greater than having one
    match (self.is_empty(), other.is_empty()) {
      (true, true) => Ordering::Equal,
      (true, false) => Ordering::Greater,
      (false, true) => Ordering::Less,
      // pairwise, then the shorter sequence is less
      (false, false) => self.identifiers.cmp(&other.identifiers),
    }
  }
}

/// The identifiers following `+` in a version. Never affects precedence.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, CapacityDisplay)]
pub struct BuildMetadata {
  identifiers: Vec<Identifier>,
}

identifiers!(BuildMetadata);
