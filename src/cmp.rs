// Copyright 2018-2023 the Deno authors. All rights reserved. MIT license.

use std::cmp::Ordering;
use std::str::FromStr;

use thiserror::Error;

use crate::RangeParseError;
use crate::RangeSet;
use crate::Version;
use crate::VersionParseError;

#[derive(Error, Debug, Clone)]
pub enum CmpError {
  #[error("Invalid operator '{0}'.")]
  InvalidOperator(String),
  #[error(transparent)]
  Malformed(#[from] VersionParseError),
}

/// Operators accepted by [`cmp`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CmpOperator {
  /// `===`, raw string identity.
  Identical,
  /// `!==`, raw string difference.
  NotIdentical,
  /// `=`, `==` or no operator at all.
  Equal,
  /// `!=`
  NotEqual,
  /// `>`
  GreaterThan,
  /// `>=`
  GreaterThanOrEqual,
  /// `<`
  LessThan,
  /// `<=`
  LessThanOrEqual,
}

impl FromStr for CmpOperator {
  type Err = CmpError;

  fn from_str(s: &str) -> Result<Self, Self::Err> {
    Ok(match s {
      "===" => Self::Identical,
      "!==" => Self::NotIdentical,
      "" | "=" | "==" => Self::Equal,
      "!=" => Self::NotEqual,
      ">" => Self::GreaterThan,
      ">=" => Self::GreaterThanOrEqual,
      "<" => Self::LessThan,
      "<=" => Self::LessThanOrEqual,
      _ => return Err(CmpError::InvalidOperator(s.to_string())),
    })
  }
}

/// Parses both versions and compares their precedence.
pub fn compare(a: &str, b: &str) -> Result<Ordering, VersionParseError> {
  let a = Version::parse(a)?;
  let b = Version::parse(b)?;
  Ok(a.cmp(&b))
}

/// Compares `a` and `b` with the provided operator.
///
/// `===` and `!==` compare the raw text and never parse it.
pub fn cmp(a: &str, op: &str, b: &str) -> Result<bool, CmpError> {
  Ok(match op.parse::<CmpOperator>()? {
    CmpOperator::Identical => a == b,
    CmpOperator::NotIdentical => a != b,
    CmpOperator::Equal => compare(a, b)?.is_eq(),
    CmpOperator::NotEqual => compare(a, b)?.is_ne(),
    CmpOperator::GreaterThan => compare(a, b)?.is_gt(),
    CmpOperator::GreaterThanOrEqual => compare(a, b)?.is_ge(),
    CmpOperator::LessThan => compare(a, b)?.is_lt(),
    CmpOperator::LessThanOrEqual => compare(a, b)?.is_le(),
  })
}

// The predicates below treat unparsable input as not satisfying.

fn compare_matches(a: &str, b: &str, f: impl Fn(Ordering) -> bool) -> bool {
  compare(a, b).map(f).unwrap_or(false)
}

pub fn gt(a: &str, b: &str) -> bool {
  compare_matches(a, b, Ordering::is_gt)
}

pub fn gte(a: &str, b: &str) -> bool {
  compare_matches(a, b, Ordering::is_ge)
}

pub fn lt(a: &str, b: &str) -> bool {
  compare_matches(a, b, Ordering::is_lt)
}

pub fn lte(a: &str, b: &str) -> bool {
  compare_matches(a, b, Ordering::is_le)
}

pub fn eq(a: &str, b: &str) -> bool {
  compare_matches(a, b, Ordering::is_eq)
}

pub fn neq(a: &str, b: &str) -> bool {
  compare_matches(a, b, Ordering::is_ne)
}

/// Stable ascending sort. Versions of equal precedence (for example ones
/// differing only in build metadata) keep their input order.
pub fn sort(mut versions: Vec<Version>) -> Vec<Version> {
  versions.sort();
  versions
}

/// Stable descending sort.
pub fn rsort(mut versions: Vec<Version>) -> Vec<Version> {
  versions.sort_by(|a, b| b.cmp(a));
  versions
}

/// Parses the text as a version, returning `None` when it isn't one.
pub fn valid(text: &str) -> Option<Version> {
  Version::parse(text).ok()
}

#[derive(Error, Debug, Clone)]
pub enum SatisfiesError {
  #[error(transparent)]
  Version(#[from] VersionParseError),
  #[error(transparent)]
  Range(#[from] RangeParseError),
}

/// Parses both the version and the range and tests the version against it.
pub fn satisfies(version: &str, range: &str) -> Result<bool, SatisfiesError> {
  let version = Version::parse(version)?;
  let range = RangeSet::parse(range)?;
  Ok(range.satisfies(&version))
}
