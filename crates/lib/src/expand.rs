//! Variable expansion for target commands.
//!
//! Commands reference variables as `${NAME}`. Two kinds are substituted:
//!
//! - user variables from the build file's `variables` section (plus `DATE`)
//! - automatic variables computed per target:
//!   - `${@}` - the target's name
//!   - `${<}` - the first dependency, or empty
//!   - `${^}` - all dependencies separated by single spaces
//!
//! User variables are substituted first and automatic variables last, so an
//! automatic variable also resolves inside a user variable's value
//! (`OUT: build/${@}`), and a user variable can never shadow one.
//!
//! Unknown tokens and an unterminated `${` pass through unchanged. Expansion
//! never fails and has no side effects.
//!
//! # Example
//!
//! ```
//! use chorus_lib::config::Variables;
//! use chorus_lib::expand::expand;
//!
//! let mut vars = Variables::new();
//! vars.insert("CC".to_string(), "gcc".to_string());
//!
//! let deps = vec!["main.o".to_string(), "util.o".to_string()];
//! let cmd = expand("${CC} -o ${@} ${^} $HOME ${NOPE}", "prog", &deps, &vars);
//! assert_eq!(cmd, "gcc -o prog main.o util.o $HOME ${NOPE}");
//! ```

use std::borrow::Cow;

use crate::config::Variables;

/// Names of the automatic variables.
pub const AUTOMATIC: [&str; 3] = ["@", "<", "^"];

/// A segment of parsed text.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Segment<'a> {
  /// Literal text (no tokens)
  Literal(&'a str),

  /// The name between `${` and `}`
  Token(&'a str),
}

/// Something that can supply a value for a `${NAME}` token.
pub trait Resolver {
  /// Returns `None` when the name is unknown; the token is then kept verbatim.
  fn resolve(&self, name: &str) -> Option<Cow<'_, str>>;
}

/// User variables. Automatic names are never looked up here.
pub struct UserVariables<'a>(pub &'a Variables);

impl Resolver for UserVariables<'_> {
  fn resolve(&self, name: &str) -> Option<Cow<'_, str>> {
    if AUTOMATIC.contains(&name) {
      return None;
    }
    self.0.get(name).map(|value| Cow::Borrowed(value.as_str()))
  }
}

/// Automatic variables of one target.
pub struct AutomaticVariables<'a> {
  pub target: &'a str,
  pub deps: &'a [String],
}

impl Resolver for AutomaticVariables<'_> {
  fn resolve(&self, name: &str) -> Option<Cow<'_, str>> {
    match name {
      "@" => Some(Cow::Borrowed(self.target)),
      "<" => Some(Cow::Borrowed(self.deps.first().map(String::as_str).unwrap_or_default())),
      "^" => Some(Cow::Owned(self.deps.join(" "))),
      _ => None,
    }
  }
}

/// Split a string into literal text and `${NAME}` tokens.
///
/// A `${` without a closing `}` is kept as literal text.
pub fn parse(input: &str) -> Vec<Segment<'_>> {
  let mut segments = Vec::new();
  let mut rest = input;

  while let Some(open) = rest.find("${") {
    let after_open = &rest[open + 2..];
    let Some(close) = after_open.find('}') else {
      break;
    };

    if open > 0 {
      segments.push(Segment::Literal(&rest[..open]));
    }
    segments.push(Segment::Token(&after_open[..close]));
    rest = &after_open[close + 1..];
  }

  if !rest.is_empty() {
    segments.push(Segment::Literal(rest));
  }

  segments
}

/// Substitute every token the resolver knows, leaving the rest verbatim.
pub fn substitute(input: &str, resolver: &impl Resolver) -> String {
  substitute_segments(&parse(input), resolver)
}

/// Substitute tokens in pre-parsed segments.
pub fn substitute_segments(segments: &[Segment<'_>], resolver: &impl Resolver) -> String {
  let mut result = String::new();

  for segment in segments {
    match segment {
      Segment::Literal(s) => result.push_str(s),
      Segment::Token(name) => match resolver.resolve(name) {
        Some(value) => result.push_str(&value),
        None => {
          result.push_str("${");
          result.push_str(name);
          result.push('}');
        }
      },
    }
  }

  result
}

/// Expand a command of `target` with its dependencies and the user variables.
pub fn expand(command: &str, target: &str, deps: &[String], variables: &Variables) -> String {
  let with_user = substitute(command, &UserVariables(variables));
  substitute(&with_user, &AutomaticVariables { target, deps })
}
