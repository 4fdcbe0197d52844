// Copyright 2018-2023 the Deno authors. All rights reserved. MIT license.

//! Rewrites range shorthand (hyphen, tilde, caret and x-ranges) into
//! primitive comparator strings such as `>=1.2.3 <1.3.0-0`.
//!
//! This is a purely syntactic step. Anything that isn't recognized is left
//! untouched so that comparator parsing reports it.

use monch::with_failure_handling;

use crate::common;
use crate::BuildMetadata;
use crate::Operator;
use crate::PreRelease;

/// A version component that could be a wildcard or number value.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum XRange {
  Wildcard,
  Val(u64),
}

impl XRange {
  pub fn is_wildcard(&self) -> bool {
    matches!(self, XRange::Wildcard)
  }

  fn or_zero(self) -> u64 {
    match self {
      XRange::Wildcard => 0,
      XRange::Val(val) => val,
    }
  }
}

/// A partial version such as `1`, `1.2.x` or `1.2.3-beta`.
#[derive(Debug, Clone)]
pub struct Partial {
  pub major: XRange,
  pub minor: XRange,
  pub patch: XRange,
  pub pre: PreRelease,
  pub build: BuildMetadata,
}

impl Partial {
  /// Gets if any of the components is a wildcard.
  pub fn has_wildcard(&self) -> bool {
    self.major.is_wildcard()
      || self.minor.is_wildcard()
      || self.patch.is_wildcard()
  }

  /// `M.m.p[-pre][+build]` with wildcards as zero.
  fn to_version_string(&self) -> String {
    let mut text = format!(
      "{}.{}.{}",
      self.major.or_zero(),
      self.minor.or_zero(),
      self.patch.or_zero()
    );
    if !self.pre.is_empty() {
      text.push('-');
      text.push_str(&self.pre.to_string());
    }
    if !self.build.is_empty() {
      text.push('+');
      text.push_str(&self.build.to_string());
    }
    text
  }

  /// `-pre` when there is one.
  fn pre_suffix(&self) -> String {
    if self.pre.is_empty() {
      String::new()
    } else {
      format!("-{}", self.pre)
    }
  }

  // `1.2.3 - 2.3.4` lower bound
  fn as_hyphen_start(&self) -> Option<String> {
    match (self.major, self.minor, self.patch) {
      (XRange::Wildcard, _, _) => None,
      (XRange::Val(major), XRange::Wildcard, _) => {
        Some(format!(">={major}.0.0-0"))
      }
      (XRange::Val(major), XRange::Val(minor), XRange::Wildcard) => {
        Some(format!(">={major}.{minor}.0-0"))
      }
      _ => Some(format!(">={}", self.to_version_string())),
    }
  }

  // `1.2.3 - 2.3.4` upper bound
  fn as_hyphen_end(&self) -> Result<Option<String>, Overflow> {
    Ok(match (self.major, self.minor, self.patch) {
      (XRange::Wildcard, _, _) => None,
      (XRange::Val(major), XRange::Wildcard, _) => {
        Some(format!("<{}.0.0-0", bump(major, "major")?))
      }
      (XRange::Val(major), XRange::Val(minor), XRange::Wildcard) => {
        Some(format!("<{major}.{}.0-0", bump(minor, "minor")?))
      }
      (XRange::Val(major), XRange::Val(minor), XRange::Val(patch)) => {
        if self.pre.is_empty() {
          Some(format!("<={}", self.to_version_string()))
        } else {
          Some(format!("<={major}.{minor}.{patch}{}", self.pre_suffix()))
        }
      }
    })
  }

  fn as_tilde(&self) -> Result<Vec<String>, Overflow> {
    // tilde ranges allow patch-level changes
    Ok(match (self.major, self.minor, self.patch) {
      (XRange::Wildcard, _, _) => Vec::new(),
      (XRange::Val(major), XRange::Wildcard, _) => vec![
        format!(">={major}.0.0"),
        format!("<{}.0.0-0", bump(major, "major")?),
      ],
      (XRange::Val(major), XRange::Val(minor), XRange::Wildcard) => vec![
        format!(">={major}.{minor}.0"),
        format!("<{major}.{}.0-0", bump(minor, "minor")?),
      ],
      (XRange::Val(major), XRange::Val(minor), XRange::Val(patch)) => vec![
        format!(">={major}.{minor}.{patch}{}", self.pre_suffix()),
        format!("<{major}.{}.0-0", bump(minor, "minor")?),
      ],
    })
  }

  fn as_caret(&self) -> Result<Vec<String>, Overflow> {
    // allows changes that do not modify the left-most non-zero component,
    // with missing components completed as zero (`^0.0` is `^0.0.0`)
    let XRange::Val(major) = self.major else {
      return Ok(Vec::new());
    };
    let minor = self.minor.or_zero();
    let patch = self.patch.or_zero();
    let end = if major > 0 {
      format!("<{}.0.0-0", bump(major, "major")?)
    } else if minor > 0 {
      format!("<0.{}.0-0", bump(minor, "minor")?)
    } else {
      format!("<0.0.{}-0", bump(patch, "patch")?)
    };
    Ok(vec![
      format!(">={major}.{minor}.{patch}{}", self.pre_suffix()),
      end,
    ])
  }

  /// Rewrites an x-range that has at least one wildcard component.
  fn as_x_range(&self, op: Option<Operator>) -> Result<Vec<String>, Overflow> {
    let XRange::Val(major) = self.major else {
      return Ok(match op {
        // nothing is allowed
        Some(Operator::GreaterThan) | Some(Operator::LessThan) => {
          vec!["<0.0.0-0".to_string()]
        }
        _ => Vec::new(),
      });
    };
    let minor = self.minor.or_zero();
    // the first version past the range, `1.x` => `2.0`, `1.2.x` => `1.3`
    let next = || -> Result<(u64, u64), Overflow> {
      if self.minor.is_wildcard() {
        Ok((bump(major, "major")?, 0))
      } else {
        Ok((major, bump(minor, "minor")?))
      }
    };
    Ok(match op.unwrap_or(Operator::Equal) {
      Operator::Equal => {
        let (next_major, next_minor) = next()?;
        vec![
          format!(">={major}.{minor}.0"),
          format!("<{next_major}.{next_minor}.0-0"),
        ]
      }
      Operator::GreaterThan => {
        // >1 => >=2.0.0, >1.2 => >=1.3.0
        let (next_major, next_minor) = next()?;
        vec![format!(">={next_major}.{next_minor}.0")]
      }
      Operator::LessThanOrEqual => {
        // <=0.7.x is actually <0.8.0, since any 0.7.x should pass
        let (next_major, next_minor) = next()?;
        vec![format!("<{next_major}.{next_minor}.0-0")]
      }
      Operator::LessThan => vec![format!("<{major}.{minor}.0-0")],
      Operator::GreaterThanOrEqual => vec![format!(">={major}.{minor}.0")],
    })
  }
}

/// A component that was `u64::MAX` and had to be bumped.
#[derive(Debug)]
struct Overflow(&'static str);

impl Overflow {
  fn in_token(self, token: &str) -> ComponentOverflow {
    ComponentOverflow {
      token: token.to_string(),
      component: self.0,
    }
  }
}

fn bump(value: u64, component: &'static str) -> Result<u64, Overflow> {
  value.checked_add(1).ok_or(Overflow(component))
}

/// A shorthand whose upper bound would need a component past `u64::MAX`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ComponentOverflow {
  pub token: String,
  pub component: &'static str,
}

/// Splits a range on `||` into its disjuncts.
pub fn split_disjuncts(text: &str) -> impl Iterator<Item = &str> {
  text.split("||").map(str::trim)
}

/// Rewrites a single disjunct into primitive comparator strings. An empty
/// result means the disjunct matches every version.
pub fn translate_disjunct(
  text: &str,
) -> Result<Vec<String>, ComponentOverflow> {
  // `1.2.3 - 2.3.4` => `>=1.2.3 <=2.3.4`
  if let Ok((start, end)) = with_failure_handling(common::hyphen)(text) {
    let end = end.as_hyphen_end().map_err(|err| err.in_token(text))?;
    let comparators: Vec<String> =
      start.as_hyphen_start().into_iter().chain(end).collect();
    crate::trace!("hyphen replace '{}' => {:?}", text, comparators);
    return Ok(comparators);
  }

  // `> 1.2.3 < 1.2.5` => `>1.2.3 <1.2.5`
  let tokens = trim_operators(text);
  crate::trace!("comparator trim '{}' => {:?}", text, tokens);

  let mut comparators = Vec::with_capacity(tokens.len() * 2);
  for token in tokens {
    match replace_token(&token).map_err(|err| err.in_token(&token))? {
      Some(replaced) => comparators.extend(replaced),
      None => comparators.push(token),
    }
  }
  crate::trace!("translated '{}' => {:?}", text, comparators);
  Ok(comparators)
}

/// Binds lone operators (`>`, `~`, `^`, ...) to the token that follows them
/// and collapses whitespace.
fn trim_operators(text: &str) -> Vec<String> {
  fn is_operator(token: &str) -> bool {
    token.chars().all(|c| matches!(c, '<' | '>' | '=' | '~' | '^'))
  }

  let mut tokens: Vec<String> = Vec::new();
  let mut pending: Option<&str> = None;
  for token in text.split_whitespace() {
    match pending.take() {
      Some(op) => tokens.push(format!("{op}{token}")),
      None if is_operator(token) => pending = Some(token),
      None => tokens.push(token.to_string()),
    }
  }
  if let Some(op) = pending {
    tokens.push(op.to_string());
  }
  tokens
}

/// `None` when the token isn't shorthand and should be parsed as is.
fn replace_token(token: &str) -> Result<Option<Vec<String>>, Overflow> {
  if let Some(rest) = token.strip_prefix('~') {
    // `~>` is accepted as a tilde
    let rest = rest.strip_prefix('>').unwrap_or(rest);
    return match with_failure_handling(common::partial)(rest) {
      Ok(partial) => partial.as_tilde().map(Some),
      Err(_) => Ok(None),
    };
  }
  if let Some(rest) = token.strip_prefix('^') {
    return match with_failure_handling(common::partial)(rest) {
      Ok(partial) => partial.as_caret().map(Some),
      Err(_) => Ok(None),
    };
  }
  match with_failure_handling(common::operator_partial)(token) {
    // already a primitive, leave it for the comparator parser
    Ok((_, partial)) if !partial.has_wildcard() => Ok(None),
    Ok((op, partial)) => partial.as_x_range(op).map(Some),
    Err(_) => Ok(None),
  }
}
