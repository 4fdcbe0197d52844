// Copyright 2018-2023 the Deno authors. All rights reserved. MIT license.

use std::cmp::Ordering;
use std::fmt;
use std::str::FromStr;

use capacity_builder::CapacityDisplay;
use capacity_builder::StringAppendable;
use capacity_builder::StringBuilder;
use capacity_builder::StringType;
use monch::with_failure_handling;
use monch::ParseErrorFailureError;
use serde::Deserialize;
use serde::Serialize;
use thiserror::Error;

use crate::common;
use crate::PreRelease;
use crate::Version;
use crate::VersionParseError;

#[derive(Error, Debug, Clone)]
#[error("Invalid comparator '{text}'. {source}")]
pub struct ComparatorParseError {
  pub text: String,
  #[source]
  pub source: ParseErrorFailureError,
}

/// A relational operator of a comparator.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Operator {
  LessThan,
  LessThanOrEqual,
  Equal,
  GreaterThanOrEqual,
  GreaterThan,
}

impl Operator {
  pub fn as_str(self) -> &'static str {
    match self {
      Operator::LessThan => "<",
      Operator::LessThanOrEqual => "<=",
      Operator::Equal => "=",
      Operator::GreaterThanOrEqual => ">=",
      Operator::GreaterThan => ">",
    }
  }

  /// Gets if `ordering` (the result of `version.cmp(operand)`) passes.
  pub fn matches(self, ordering: Ordering) -> bool {
    match self {
      Operator::LessThan => ordering == Ordering::Less,
      Operator::LessThanOrEqual => ordering != Ordering::Greater,
      Operator::Equal => ordering == Ordering::Equal,
      Operator::GreaterThanOrEqual => ordering != Ordering::Less,
      Operator::GreaterThan => ordering == Ordering::Greater,
    }
  }
}

impl fmt::Display for Operator {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    f.write_str(self.as_str())
  }
}

/// A relational operator paired with a version, such as `>=1.2.3`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, CapacityDisplay)]
pub struct Comparator {
  operator: Operator,
  operand: Version,
}

impl<'a> StringAppendable<'a> for &'a Comparator {
  fn append_to_builder<TString: StringType>(
    self,
    builder: &mut StringBuilder<'a, TString>,
  ) {
    // equality is implied
    if self.operator != Operator::Equal {
      builder.append(self.operator.as_str());
    }
    builder.append(&self.operand);
  }
}

impl Comparator {
  /// Creates a comparator, applying the `<` pre-release floor.
  pub fn new(operator: Operator, mut operand: Version) -> Self {
    // <1.2.3-rc allows 1.2.3-beta since it has a pre-release, but <1.2.3
    // is assumed to exclude everything about 1.2.3, so its operand is
    // pushed down to the lowest pre-release, 1.2.3-0
    if operator == Operator::LessThan && operand.pre.is_empty() {
      operand.pre = PreRelease::floor();
    }
    Self { operator, operand }
  }

  /// Parses a comparator such as `>=1.2.3`. The operator defaults to `=`.
  pub fn parse(text: &str) -> Result<Self, ComparatorParseError> {
    let (operator, operand) = with_failure_handling(common::primitive)(text)
      .map_err(|source| ComparatorParseError {
        text: text.to_string(),
        source,
      })?;
    let comparator = Self::new(operator, operand);
    crate::trace!("comparator '{}' => '{}'", text, comparator);
    Ok(comparator)
  }

  pub fn operator(&self) -> Operator {
    self.operator
  }

  pub fn operand(&self) -> &Version {
    &self.operand
  }

  /// Gets if the version passes this comparator.
  pub fn matches(&self, version: &Version) -> bool {
    self.operator.matches(version.cmp(&self.operand))
  }

  /// Parses the version text and tests it against this comparator.
  pub fn test(&self, version: &str) -> Result<bool, VersionParseError> {
    let version = Version::parse(version)?;
    Ok(self.matches(&version))
  }
}

impl FromStr for Comparator {
  type Err = ComparatorParseError;

  fn from_str(s: &str) -> Result<Self, Self::Err> {
    Self::parse(s)
  }
}

impl Serialize for Comparator {
  fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
  where
    S: serde::Serializer,
  {
    serializer.serialize_str(&self.to_string())
  }
}

impl<'de> Deserialize<'de> for Comparator {
  fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
  where
    D: serde::Deserializer<'de>,
  {
    let text = String::deserialize(deserializer)?;
    Comparator::parse(&text).map_err(serde::de::Error::custom)
  }
}
