// Copyright 2018-2023 the Deno authors. All rights reserved. MIT license.

use monch::*;

use crate::BuildMetadata;
use crate::Identifier;
use crate::Operator;
use crate::Partial;
use crate::PreRelease;
use crate::Version;
use crate::XRange;

// https://semver.org/spec/v2.0.0.html#backusnaur-form-grammar-for-valid-semver-versions
// version    ::= 'v'? nr '.' nr '.' nr qualifier
// partial    ::= [v=\s]* xr ( '.' xr ( '.' xr qualifier )? )?
// xr         ::= 'x' | 'X' | '*' | nr
// nr         ::= '0' | ['1'-'9'] ( ['0'-'9'] ) *
// qualifier  ::= ( '-' pre )? ( '+' build )?
// pre        ::= pre-part ( '.' pre-part ) *
// pre-part   ::= nr | ['0'-'9']* [-A-Za-z] [-0-9A-Za-z]*
// build      ::= part ( '.' part ) *
// part       ::= [-0-9A-Za-z]+
// primitive  ::= ( '<' | '>' | '>=' | '<=' | '=' ) ? ( ' ' ) * version
// hyphen     ::= ( ' ' ) * partial ( ' ' ) + '-' ( ' ' ) + partial ( ' ' ) *

// nr ::= '0' | ['1'-'9'] ( ['0'-'9'] ) *
pub fn nr(input: &str) -> ParseResult<u64> {
  let (rest, digits) =
    if_true(take_while(|c| c.is_ascii_digit()), |digits| {
      !digits.is_empty()
    })(input)?;
  if digits.len() > 1 && digits.starts_with('0') {
    return ParseError::fail(
      input,
      format!("Leading zeros are not allowed in '{digits}'."),
    );
  }
  match digits.parse::<u64>() {
    Ok(value) => Ok((rest, value)),
    Err(err) => ParseError::fail(
      input,
      format!("Error parsing '{digits}' to u64.\n\n{err:#}"),
    ),
  }
}

// xr ::= 'x' | 'X' | '*' | nr
pub fn xr(input: &str) -> ParseResult<XRange> {
  or(
    map(or3(ch('x'), ch('X'), ch('*')), |_| XRange::Wildcard),
    map(nr, XRange::Val),
  )(input)
}

#[derive(Debug, Clone, Default)]
pub struct Qualifier {
  pub pre: PreRelease,
  pub build: BuildMetadata,
}

// qualifier ::= ( '-' pre )? ( '+' build )?
pub fn qualifier(input: &str) -> ParseResult<Qualifier> {
  let (input, pre) = maybe(preceded(ch('-'), identifiers(pre_part)))(input)?;
  let (input, build) =
    maybe(preceded(ch('+'), identifiers(build_part)))(input)?;
  Ok((
    input,
    Qualifier {
      pre: pre.map(PreRelease::new).unwrap_or_default(),
      build: build.map(BuildMetadata::new).unwrap_or_default(),
    },
  ))
}

/// Dot separated identifiers. A dot must always be followed by an identifier.
fn identifiers<'a>(
  part: impl Fn(&'a str) -> ParseResult<'a, &'a str>,
) -> impl Fn(&'a str) -> ParseResult<'a, Vec<Identifier>> {
  move |input| {
    let (mut input, first) = part(input)?;
    let mut items = vec![Identifier::new(first)];
    while let Some(rest) = input.strip_prefix('.') {
      match part(rest) {
        Ok((rest, text)) => {
          input = rest;
          items.push(Identifier::new(text));
        }
        Err(ParseError::Backtrace) => {
          return ParseError::fail(
            rest,
            "Expected identifier after '.'.".to_string(),
          );
        }
        Err(err) => return Err(err),
      }
    }
    Ok((input, items))
  }
}

// part ::= [-0-9A-Za-z]+
fn build_part(input: &str) -> ParseResult<&str> {
  if_true(
    take_while(|c| c.is_ascii_alphanumeric() || c == '-'),
    |result| !result.is_empty(),
  )(input)
}

// pre-part ::= nr | ['0'-'9']* [-A-Za-z] [-0-9A-Za-z]*
fn pre_part(input: &str) -> ParseResult<&str> {
  let (rest, text) = build_part(input)?;
  if text.chars().all(|c| c.is_ascii_digit()) {
    // purely numeric, so it needs to be a valid nr
    let (remaining, _) = nr(text)?;
    debug_assert!(remaining.is_empty());
  }
  Ok((rest, text))
}

// version ::= 'v'? nr '.' nr '.' nr qualifier
pub fn version(input: &str) -> ParseResult<Version> {
  let (input, _) = maybe(ch('v'))(input)?;
  let (input, major) = nr(input)?;
  let (input, _) = ch('.')(input)?;
  let (input, minor) = nr(input)?;
  let (input, _) = ch('.')(input)?;
  let (input, patch) = nr(input)?;
  let (input, qual) = qualifier(input)?;
  Ok((
    input,
    Version {
      major,
      minor,
      patch,
      pre: qual.pre,
      build: qual.build,
    },
  ))
}

// partial ::= [v=\s]* xr ( '.' xr ( '.' xr qualifier )? )?
pub fn partial(input: &str) -> ParseResult<Partial> {
  let (input, _) = skip_while(|c| c == 'v' || c == '=' || c.is_whitespace())(
    input,
  )?;
  let (input, major) = xr(input)?;
  let (input, maybe_minor) = maybe(preceded(ch('.'), xr))(input)?;
  let (input, maybe_patch) = if maybe_minor.is_some() {
    maybe(preceded(ch('.'), xr))(input)?
  } else {
    (input, None)
  };
  let (input, qual) = if maybe_patch.is_some() {
    qualifier(input)?
  } else {
    (input, Qualifier::default())
  };
  Ok((
    input,
    Partial {
      major,
      minor: maybe_minor.unwrap_or(XRange::Wildcard),
      patch: maybe_patch.unwrap_or(XRange::Wildcard),
      pre: qual.pre,
      build: qual.build,
    },
  ))
}

pub fn operator(input: &str) -> ParseResult<Operator> {
  or5(
    map(tag(">="), |_| Operator::GreaterThanOrEqual),
    map(tag("<="), |_| Operator::LessThanOrEqual),
    map(ch('<'), |_| Operator::LessThan),
    map(ch('>'), |_| Operator::GreaterThan),
    map(ch('='), |_| Operator::Equal),
  )(input)
}

// primitive ::= ( '<' | '>' | '>=' | '<=' | '=' ) ? ( ' ' ) * version
pub fn primitive(input: &str) -> ParseResult<(Operator, Version)> {
  let (input, op) = maybe(operator)(input)?;
  let (input, _) = skip_whitespace(input)?;
  let (input, version) = version(input)?;
  Ok((input, (op.unwrap_or(Operator::Equal), version)))
}

/// An operator prefixed x-range such as `>=1.2` or `1.x`.
pub fn operator_partial(
  input: &str,
) -> ParseResult<(Option<Operator>, Partial)> {
  let (input, op) = maybe(operator)(input)?;
  let (input, _) = skip_whitespace(input)?;
  let (input, partial) = partial(input)?;
  Ok((input, (op, partial)))
}

// hyphen ::= ( ' ' ) * partial ( ' ' ) + '-' ( ' ' ) + partial ( ' ' ) *
pub fn hyphen(input: &str) -> ParseResult<(Partial, Partial)> {
  let (input, _) = skip_whitespace(input)?;
  let (input, start) = partial(input)?;
  let (input, _) = whitespace(input)?;
  let (input, _) = ch('-')(input)?;
  let (input, _) = whitespace(input)?;
  let (input, end) = partial(input)?;
  let (input, _) = skip_whitespace(input)?;
  Ok((input, (start, end)))
}
