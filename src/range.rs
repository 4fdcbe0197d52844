// Copyright 2018-2023 the Deno authors. All rights reserved. MIT license.

use std::str::FromStr;

use capacity_builder::CapacityDisplay;
use capacity_builder::StringAppendable;
use capacity_builder::StringBuilder;
use capacity_builder::StringType;
use serde::Deserialize;
use serde::Serialize;
use thiserror::Error;

use crate::translate;
use crate::Comparator;
use crate::ComparatorParseError;
use crate::Version;
use crate::VersionParseError;

#[derive(Error, Debug, Clone)]
pub enum RangeParseError {
  #[error("Invalid range '{text}'. {source}")]
  Malformed {
    text: String,
    #[source]
    source: ComparatorParseError,
  },
  #[error(
    "Invalid range '{text}'. The {component} of '{token}' cannot be bumped."
  )]
  ComponentOverflow {
    text: String,
    token: String,
    component: &'static str,
  },
  #[error("Invalid range '{0}'. None of its alternatives could be parsed.")]
  Empty(String),
}

/// A disjunction (`||`) of comparator conjunctions, such as
/// `>=1.2.3 <2.0.0-0 || 3.x`.
///
/// An empty conjunction matches every version.
#[derive(Debug, Clone, PartialEq, Eq, Hash, CapacityDisplay)]
pub struct RangeSet {
  raw: String,
  set: Vec<Vec<Comparator>>,
}

impl<'a> StringAppendable<'a> for &'a RangeSet {
  fn append_to_builder<TString: StringType>(
    self,
    builder: &mut StringBuilder<'a, TString>,
  ) {
    for (i, comparators) in self.set.iter().enumerate() {
      if i > 0 {
        builder.append(" || ");
      }
      if comparators.is_empty() {
        builder.append('*');
      }
      for (j, comparator) in comparators.iter().enumerate() {
        if j > 0 {
          builder.append(' ');
        }
        builder.append(comparator);
      }
    }
  }
}

impl RangeSet {
  pub(crate) fn wildcard() -> Self {
    Self {
      raw: "*".to_string(),
      set: vec![Vec::new()],
    }
  }

  /// Parses a range such as `^1.2.3 || 2.x`.
  ///
  /// When there is more than one alternative, alternatives that fail to parse
  /// are dropped and an error is only returned when none remain.
  pub fn parse(text: &str) -> Result<Self, RangeParseError> {
    let mut set = Vec::new();
    let mut first_error = None;
    let mut count = 0;
    for disjunct in translate::split_disjuncts(text) {
      count += 1;
      match parse_disjunct(text, disjunct) {
        Ok(comparators) => set.push(comparators),
        Err(err) => {
          crate::trace!("dropping '{}' from '{}': {}", disjunct, text, err);
          first_error.get_or_insert(err);
        }
      }
    }

    if set.is_empty() {
      return Err(match first_error {
        Some(err) if count == 1 => err,
        _ => RangeParseError::Empty(text.to_string()),
      });
    }

    Ok(Self {
      raw: text.to_string(),
      set,
    })
  }

  /// The text this range was parsed from.
  pub fn raw(&self) -> &str {
    &self.raw
  }

  /// The comparator conjunctions, one per `||` alternative.
  pub fn comparators(&self) -> &[Vec<Comparator>] {
    &self.set
  }

  /// Gets if the version satisfies every comparator of at least one
  /// alternative.
  pub fn satisfies(&self, version: &Version) -> bool {
    self
      .set
      .iter()
      .any(|comparators| comparators.iter().all(|c| c.matches(version)))
  }

  /// Parses the version text and tests it against this range.
  pub fn satisfies_text(
    &self,
    version: &str,
  ) -> Result<bool, VersionParseError> {
    let version = Version::parse(version)?;
    Ok(self.satisfies(&version))
  }

  /// The highest version that satisfies this range.
  pub fn max_satisfying<'a>(
    &self,
    versions: impl IntoIterator<Item = &'a Version>,
  ) -> Option<&'a Version> {
    versions.into_iter().filter(|v| self.satisfies(v)).max()
  }

  /// The lowest version that satisfies this range.
  pub fn min_satisfying<'a>(
    &self,
    versions: impl IntoIterator<Item = &'a Version>,
  ) -> Option<&'a Version> {
    versions.into_iter().filter(|v| self.satisfies(v)).min()
  }
}

fn parse_disjunct(
  text: &str,
  disjunct: &str,
) -> Result<Vec<Comparator>, RangeParseError> {
  let comparators = translate::translate_disjunct(disjunct).map_err(|err| {
    RangeParseError::ComponentOverflow {
      text: text.to_string(),
      token: err.token,
      component: err.component,
    }
  })?;
  comparators
    .iter()
    .map(|comparator| {
      Comparator::parse(comparator).map_err(|source| {
        RangeParseError::Malformed {
          text: text.to_string(),
          source,
        }
      })
    })
    .collect()
}

impl Default for RangeSet {
  fn default() -> Self {
    crate::WILDCARD_RANGE.clone()
  }
}

impl FromStr for RangeSet {
  type Err = RangeParseError;

  fn from_str(s: &str) -> Result<Self, Self::Err> {
    Self::parse(s)
  }
}

impl Serialize for RangeSet {
  fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
  where
    S: serde::Serializer,
  {
    serializer.serialize_str(&self.raw)
  }
}

impl<'de> Deserialize<'de> for RangeSet {
  fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
  where
    D: serde::Deserializer<'de>,
  {
    let text = String::deserialize(deserializer)?;
    RangeSet::parse(&text).map_err(serde::de::Error::custom)
  }
}

#[cfg(test)]
mod test {
  use pretty_assertions::assert_eq;

  use super::*;

  struct RangeTester(RangeSet);

  impl RangeTester {
    #[track_caller]
    fn new(text: &str) -> Self {
      Self(RangeSet::parse(text).unwrap())
    }

    #[track_caller]
    fn matches(&self, version: &str) -> bool {
      self.0.satisfies_text(version).unwrap()
    }
  }

  #[test]
  fn exact() {
    let tester = RangeTester::new("2.1.2");
    assert!(!tester.matches("2.1.1"));
    assert!(tester.matches("2.1.2"));
    assert!(tester.matches("2.1.2+build"));
    assert!(!tester.matches("2.1.3"));

    let tester = RangeTester::new("2.1.2 || 2.1.5");
    assert!(!tester.matches("2.1.1"));
    assert!(tester.matches("2.1.2"));
    assert!(!tester.matches("2.1.3"));
    assert!(!tester.matches("2.1.4"));
    assert!(tester.matches("2.1.5"));
    assert!(!tester.matches("2.1.6"));
  }

  #[test]
  fn hyphen() {
    let tester = RangeTester::new("1.2.3 - 2.3.4");
    assert!(tester.matches("2.0.0"));
    assert!(tester.matches("1.2.3"));
    assert!(tester.matches("2.3.4"));
    assert!(!tester.matches("1.2.2"));
    assert!(!tester.matches("2.3.5"));
    assert!(tester.matches("2.3.4-beta.1"));

    let tester = RangeTester::new("1.2 - 2");
    assert!(tester.matches("1.2.0-0"));
    assert!(tester.matches("2.9.9"));
    assert!(!tester.matches("1.1.9"));
    assert!(!tester.matches("3.0.0-0"));
  }

  #[test]
  fn disjunction() {
    let tester = RangeTester::new("1.0.0 - 1.0.1 || 2.0.0 - 2.0.1");
    assert!(tester.matches("1.0.1"));
    assert!(tester.matches("2.0.0"));
    assert!(!tester.matches("1.5.0"));
    assert!(!tester.matches("2.0.2"));
  }

  #[test]
  fn tilde() {
    let tester = RangeTester::new("~1.2.3");
    assert!(tester.matches("1.2.3"));
    assert!(tester.matches("1.2.9"));
    assert!(!tester.matches("1.3.0"));
    assert!(!tester.matches("1.3.0-0"));
    assert!(!tester.matches("1.2.2"));

    let tester = RangeTester::new("~ 1");
    assert!(tester.matches("1.9.9"));
    assert!(!tester.matches("2.0.0-alpha"));
  }

  #[test]
  fn caret() {
    let tester = RangeTester::new("^0.2.3");
    assert!(tester.matches("0.2.3"));
    assert!(tester.matches("0.2.9"));
    assert!(!tester.matches("0.3.0"));
    assert!(!tester.matches("0.2.2"));

    let tester = RangeTester::new("^1.2.3");
    assert!(tester.matches("1.9.0"));
    assert!(!tester.matches("2.0.0"));
    assert!(!tester.matches("2.0.0-rc.1"));

    let tester = RangeTester::new("^0.0.3");
    assert!(tester.matches("0.0.3"));
    assert!(!tester.matches("0.0.4"));

    let tester = RangeTester::new("^1.2.3-beta.2");
    assert!(tester.matches("1.2.3-beta.4"));
    assert!(tester.matches("1.2.3"));
    assert!(!tester.matches("1.2.3-beta.1"));

    // partials behave like the zero completed triple
    for text in ["^0.0", "^0", "^0.0.0"] {
      let tester = RangeTester::new(text);
      assert!(tester.matches("0.0.0"), "{text}");
      assert!(!tester.matches("0.0.1-0"), "{text}");
      assert!(!tester.matches("0.0.5"), "{text}");
      assert!(!tester.matches("0.5.0"), "{text}");
    }
    let tester = RangeTester::new("^0.3");
    assert!(tester.matches("0.3.9"));
    assert!(!tester.matches("0.4.0"));
  }

  #[test]
  fn x_ranges() {
    let tester = RangeTester::new("1.1");
    assert!(!tester.matches("1.0.0"));
    assert!(tester.matches("1.1.0"));
    assert!(tester.matches("1.1.1"));
    assert!(!tester.matches("1.2.0"));

    let tester = RangeTester::new("1.x");
    assert!(tester.matches("1.0.0"));
    assert!(tester.matches("1.99.0"));
    assert!(!tester.matches("2.0.0"));
    assert!(!tester.matches("0.9.9"));

    let tester = RangeTester::new(">1.2");
    assert!(!tester.matches("1.2.9"));
    assert!(tester.matches("1.3.0"));
  }

  #[test]
  fn comparators() {
    let tester = RangeTester::new(">= 2.1.2 < 3.0.0 || 5.x");
    assert!(!tester.matches("2.1.1"));
    assert!(tester.matches("2.1.2"));
    assert!(tester.matches("2.9.9"));
    assert!(!tester.matches("3.0.0"));
    assert!(!tester.matches("3.0.0-beta"));
    assert!(tester.matches("5.0.0"));
    assert!(tester.matches("5.1.0"));
    assert!(!tester.matches("6.1.0"));

    let tester = RangeTester::new("<1.2.3");
    assert!(!tester.matches("1.2.3-beta"));
    let tester = RangeTester::new("<=1.2.3");
    assert!(tester.matches("1.2.3-beta"));
  }

  #[test]
  fn wildcards() {
    for text in ["", "  ", "*", "x", "X", ">=*", "1.0.0 ||"] {
      let tester = RangeTester::new(text);
      assert!(tester.matches("0.0.0-0"), "{text}");
      assert!(tester.matches("1.2.3-beta"), "{text}");
      assert!(tester.matches("999.0.0"), "{text}");
    }

    let nothing = RangeTester::new(">*");
    assert!(!nothing.matches("0.0.0-0"));
    assert!(!nothing.matches("1.0.0"));
  }

  #[test]
  fn malformed_and_empty() {
    let err = RangeSet::parse("~1.02").unwrap_err();
    assert!(matches!(
      &err,
      RangeParseError::Malformed { text, .. } if text == "~1.02"
    ));
    assert!(
      err
        .to_string()
        .starts_with("Invalid range '~1.02'. Invalid comparator '~1.02'."),
      "{err}"
    );

    assert!(matches!(
      RangeSet::parse("1.2.3 - 2.3.4 >=1.0.0"),
      Err(RangeParseError::Malformed { .. })
    ));
    assert!(matches!(
      RangeSet::parse("foo || bar"),
      Err(RangeParseError::Empty(text)) if text == "foo || bar"
    ));
  }

  #[test]
  fn component_overflow() {
    #[track_caller]
    fn run_error_test(input: &str, token: &str, component: &str) {
      let err = RangeSet::parse(input).unwrap_err();
      match &err {
        RangeParseError::ComponentOverflow {
          text,
          token: err_token,
          component: err_component,
        } => {
          assert_eq!(text, input);
          assert_eq!(err_token, token);
          assert_eq!(*err_component, component);
        }
        _ => panic!("unexpected error for '{input}': {err}"),
      }
      assert_eq!(
        err.to_string(),
        format!(
          "Invalid range '{input}'. The {component} of '{token}' cannot be \
           bumped."
        )
      );
    }

    run_error_test(
      "^18446744073709551615.1.1",
      "^18446744073709551615.1.1",
      "major",
    );
    run_error_test(">18446744073709551615", ">18446744073709551615", "major");
    run_error_test(
      "<=18446744073709551615.x",
      "<=18446744073709551615.x",
      "major",
    );
    run_error_test(
      "<= 1.18446744073709551615",
      "<=1.18446744073709551615",
      "minor",
    );

    // other alternatives still apply
    let range = RangeSet::parse("^18446744073709551615 || 1.x").unwrap();
    assert!(range.satisfies_text("1.2.3").unwrap());
    assert!(matches!(
      RangeSet::parse("^18446744073709551615 || ~18446744073709551615"),
      Err(RangeParseError::Empty(_))
    ));
  }

  #[test]
  fn invalid_alternatives_are_dropped() {
    let range =
      RangeSet::parse("1.x || ignored-invalid-range || $#$%").unwrap();
    assert_eq!(range.comparators().len(), 1);
    assert!(range.satisfies_text("1.5.0").unwrap());
  }

  #[test]
  fn satisfies_malformed_version() {
    let range = RangeSet::parse("^1.0.0").unwrap();
    let err = range.satisfies_text("1.0").unwrap_err();
    assert_eq!(err.text, "1.0");
  }

  #[test]
  fn display() {
    #[track_caller]
    fn run_test(input: &str, expected: &str) {
      let range = RangeSet::parse(input).unwrap();
      assert_eq!(range.to_string(), expected);
      assert_eq!(range.raw(), input);
      // the rendered form parses to the same comparators
      let reparsed = RangeSet::parse(&range.to_string()).unwrap();
      assert_eq!(reparsed.comparators(), range.comparators());
    }

    run_test("^1.2.3", ">=1.2.3 <2.0.0-0");
    run_test("~1.2", ">=1.2.0 <1.3.0-0");
    run_test("1.2.3 - 2.3", ">=1.2.3 <2.4.0-0");
    run_test("<1.0.0", "<1.0.0-0");
    run_test("=1.0.0", "1.0.0");
    run_test("* || 2.x", "* || >=2.0.0 <3.0.0-0");
  }

  #[test]
  fn max_min_satisfying() {
    let versions = ["1.0.0", "1.2.0", "1.2.5", "2.0.0", "1.3.0-beta"]
      .map(|text| Version::parse(text).unwrap());
    let range = RangeSet::parse("~1.2").unwrap();
    assert_eq!(range.max_satisfying(&versions).unwrap().to_string(), "1.2.5");
    assert_eq!(range.min_satisfying(&versions).unwrap().to_string(), "1.2.0");
    let range = RangeSet::parse(">=3").unwrap();
    assert!(range.max_satisfying(&versions).is_none());
  }

  #[test]
  fn serialize_deserialize() {
    let range = RangeSet::parse("^1.2.3 || 2.x").unwrap();
    let serialized = serde_json::to_string(&range).unwrap();
    assert_eq!(serialized, "\"^1.2.3 || 2.x\"");
    let deserialized: RangeSet = serde_json::from_str(&serialized).unwrap();
    assert_eq!(deserialized, range);
    assert!(serde_json::from_str::<RangeSet>("\"foo\"").is_err());
  }

  #[test]
  fn shared_across_threads() {
    let range = RangeSet::parse("^1.2.3 || ~2.0").unwrap();
    std::thread::scope(|scope| {
      for version in ["1.2.3", "1.9.9", "2.0.5"] {
        let range = &range;
        scope.spawn(move || {
          assert!(range.satisfies_text(version).unwrap());
        });
      }
    });
  }

  #[test]
  fn default_is_wildcard() {
    let range = RangeSet::default();
    assert_eq!(range.raw(), "*");
    assert!(range.satisfies_text("0.0.0-0").unwrap());
  }
}
