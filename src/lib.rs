// Copyright 2018-2023 the Deno authors. All rights reserved. MIT license.

use std::cmp::Ordering;
use std::hash::Hash;
use std::str::FromStr;

use capacity_builder::CapacityDisplay;
use capacity_builder::StringAppendable;
use capacity_builder::StringBuilder;
use capacity_builder::StringType;
use monch::with_failure_handling;
use monch::ParseErrorFailureError;
use once_cell::sync::Lazy;
use serde::Deserialize;
use serde::Serialize;
use thiserror::Error;

/// Emits a `tracing` event when the `tracing` feature is enabled.
macro_rules! trace {
  ($($arg:tt)*) => {
    #[cfg(feature = "tracing")]
    {
      tracing::trace!($($arg)*);
    }
  };
}

pub(crate) use trace;

mod cmp;
mod common;
mod comparator;
mod identifier;
mod range;
mod translate;

pub use self::cmp::cmp;
pub use self::cmp::compare;
pub use self::cmp::eq;
pub use self::cmp::gt;
pub use self::cmp::gte;
pub use self::cmp::lt;
pub use self::cmp::lte;
pub use self::cmp::neq;
pub use self::cmp::rsort;
pub use self::cmp::satisfies;
pub use self::cmp::sort;
pub use self::cmp::valid;
pub use self::cmp::CmpError;
pub use self::cmp::CmpOperator;
pub use self::cmp::SatisfiesError;
pub use self::comparator::Comparator;
pub use self::comparator::ComparatorParseError;
pub use self::comparator::Operator;
pub use self::identifier::BuildMetadata;
pub use self::identifier::Identifier;
pub use self::identifier::PreRelease;
pub use self::range::RangeParseError;
pub use self::range::RangeSet;
pub use self::translate::Partial;
pub use self::translate::XRange;

/// Range that matches every version.
pub static WILDCARD_RANGE: Lazy<RangeSet> = Lazy::new(RangeSet::wildcard);

#[derive(Error, Debug, Clone)]
#[error("Invalid version '{text}'. {source}")]
pub struct VersionParseError {
  pub text: String,
  #[source]
  pub source: ParseErrorFailureError,
}

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum IncrementError {
  #[error(
    "Invalid increment kind '{0}'. Use major, minor, patch or prerelease."
  )]
  InvalidKind(String),
  #[error("Cannot increment the {component} of '{version}' past u64::MAX.")]
  Overflow {
    component: &'static str,
    version: String,
  },
}

/// Which part of a version to bump.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum IncrementKind {
  Major,
  Minor,
  Patch,
  PreRelease,
}

impl FromStr for IncrementKind {
  type Err = IncrementError;

  fn from_str(s: &str) -> Result<Self, Self::Err> {
    match s {
      "major" => Ok(Self::Major),
      "minor" => Ok(Self::Minor),
      "patch" => Ok(Self::Patch),
      "prerelease" => Ok(Self::PreRelease),
      _ => Err(IncrementError::InvalidKind(s.to_string())),
    }
  }
}

/// A semantic version.
///
/// Build metadata is kept for display, but is ignored by equality, hashing
/// and ordering.
#[derive(Clone, Debug, Default, CapacityDisplay)]
pub struct Version {
  pub major: u64,
  pub minor: u64,
  pub patch: u64,
  pub pre: PreRelease,
  pub build: BuildMetadata,
}

impl<'a> StringAppendable<'a> for &'a Version {
  fn append_to_builder<TString: StringType>(
    self,
    builder: &mut StringBuilder<'a, TString>,
  ) {
    builder.append(self.major);
    builder.append('.');
    builder.append(self.minor);
    builder.append('.');
    builder.append(self.patch);
    if !self.pre.is_empty() {
      builder.append('-');
      builder.append(&self.pre);
    }
    if !self.build.is_empty() {
      builder.append('+');
      builder.append(&self.build);
    }
  }
}

impl Serialize for Version {
  fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
  where
    S: serde::Serializer,
  {
    serializer.serialize_str(&self.to_string())
  }
}

impl<'de> Deserialize<'de> for Version {
  fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
  where
    D: serde::Deserializer<'de>,
  {
    let text = String::deserialize(deserializer)?;
    match Version::parse(&text) {
      Ok(version) => Ok(version),
      Err(err) => Err(serde::de::Error::custom(err)),
    }
  }
}

impl Version {
  pub fn new(major: u64, minor: u64, patch: u64) -> Self {
    Self {
      major,
      minor,
      patch,
      ..Default::default()
    }
  }

  /// Parses a strict `MAJOR.MINOR.PATCH[-PRE][+BUILD]` version with an
  /// optional leading `v`. Surrounding text (including whitespace) is an
  /// error.
  pub fn parse(text: &str) -> Result<Version, VersionParseError> {
    let version = with_failure_handling(common::version)(text).map_err(
      |source| VersionParseError {
        text: text.to_string(),
        source,
      },
    )?;
    trace!("created version '{}' from '{}'", version, text);
    Ok(version)
  }

  pub fn is_prerelease(&self) -> bool {
    !self.pre.is_empty()
  }

  /// Bumps the version in place. On error the version is left unchanged.
  pub fn increment(
    &mut self,
    kind: IncrementKind,
  ) -> Result<(), IncrementError> {
    let overflow = |component: &'static str, version: &Version| {
      IncrementError::Overflow {
        component,
        version: version.to_string(),
      }
    };
    match kind {
      IncrementKind::Major => {
        self.major = self
          .major
          .checked_add(1)
          .ok_or_else(|| overflow("major", self))?;
        self.minor = 0;
        self.patch = 0;
        self.pre = PreRelease::default();
      }
      IncrementKind::Minor => {
        self.minor = self
          .minor
          .checked_add(1)
          .ok_or_else(|| overflow("minor", self))?;
        self.patch = 0;
        self.pre = PreRelease::default();
      }
      IncrementKind::Patch => {
        self.patch = self
          .patch
          .checked_add(1)
          .ok_or_else(|| overflow("patch", self))?;
        self.pre = PreRelease::default();
      }
      IncrementKind::PreRelease => {
        let mut pre = self.pre.clone();
        if !pre.increment() {
          return Err(overflow("prerelease", self));
        }
        self.pre = pre;
      }
    }
    trace!("incremented {:?} => '{}'", kind, self);
    Ok(())
  }
}

impl FromStr for Version {
  type Err = VersionParseError;

  fn from_str(s: &str) -> Result<Self, Self::Err> {
    Self::parse(s)
  }
}

impl PartialEq for Version {
  fn eq(&self, other: &Self) -> bool {
    self.cmp(other) == Ordering::Equal
  }
}

impl Eq for Version {}

impl Hash for Version {
  fn hash<H: std::hash::Hasher>(&self, state: &mut H) {
    self.major.hash(state);
    self.minor.hash(state);
    self.patch.hash(state);
    self.pre.hash(state);
  }
}

impl PartialOrd for Version {
  fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
    Some(self.cmp(other))
  }
}

impl Ord for Version {
  fn cmp(&self, other: &Self) -> Ordering {
    self
      .major
      .cmp(&other.major)
      .then_with(|| self.minor.cmp(&other.minor))
      .then_with(|| self.patch.cmp(&other.patch))
      // build metadata never takes part in precedence
      .then_with(|| self.pre.cmp(&other.pre))
  }
}
