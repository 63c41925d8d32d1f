//! Types for the build file model.
//!
//! ```yaml
//! variables:
//!   CC: gcc
//! targets:
//!   prog:
//!     deps: [main.o]
//!     cmds: ["${CC} -o ${@} ${^}"]
//!   clean:
//!     phony: true
//!     cmds: ["rm -f prog *.o"]
//! ```
//!
//! Both sections keep declaration order. Variable order drives load-time
//! chaining (see [`super::load`]).

use std::fmt;

use indexmap::IndexMap;
use serde::de::{self, Deserializer, MapAccess, Visitor};
use serde::Deserialize;

/// User variables, in declaration order.
pub type Variables = IndexMap<String, String>;

/// A single buildable target.
#[derive(Debug, Default, Clone, PartialEq, Eq, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Target {
  /// Targets or files this target depends on, in build order.
  #[serde(default)]
  pub deps: Vec<String>,
  /// Commands run in order when the target is stale.
  #[serde(default)]
  pub cmds: Vec<String>,
  /// Phony targets never correspond to a file and are always rebuilt.
  #[serde(default)]
  pub phony: bool,
}

/// The complete build file. Top-level keys other than these two are ignored.
#[derive(Debug, Default, Clone, PartialEq, Eq, Deserialize)]
pub struct BuildConfig {
  #[serde(default, deserialize_with = "scalar_variables")]
  pub variables: Variables,
  #[serde(default, deserialize_with = "unique_targets")]
  pub targets: IndexMap<String, Target>,
}

impl BuildConfig {
  /// Look up a declared target.
  pub fn target(&self, name: &str) -> Option<&Target> {
    self.targets.get(name)
  }

  /// Look up a variable value.
  pub fn variable(&self, name: &str) -> Option<&str> {
    self.variables.get(name).map(String::as_str)
  }
}

/// Accept any YAML scalar as a variable value, so `VERSION: 1.2` or
/// `DEBUG: true` work without quoting.
fn scalar_variables<'de, D>(deserializer: D) -> Result<Variables, D::Error>
where
  D: Deserializer<'de>,
{
  use serde_yaml::Value;

  let raw: Option<IndexMap<String, Value>> = Option::deserialize(deserializer)?;
  let mut variables = Variables::new();

  for (name, value) in raw.unwrap_or_default() {
    let value = match value {
      Value::String(s) => s,
      Value::Number(n) => n.to_string(),
      Value::Bool(b) => b.to_string(),
      Value::Null => String::new(),
      Value::Sequence(_) | Value::Mapping(_) | Value::Tagged(_) => {
        return Err(de::Error::custom(format!("variable `{name}` must be a scalar value")));
      }
    };
    variables.insert(name, value);
  }

  Ok(variables)
}

/// Deserialize the target table, rejecting duplicate names and treating an
/// empty definition (`all:`) as a target with no deps and no commands.
fn unique_targets<'de, D>(deserializer: D) -> Result<IndexMap<String, Target>, D::Error>
where
  D: Deserializer<'de>,
{
  struct TargetsVisitor;

  impl<'de> Visitor<'de> for TargetsVisitor {
    type Value = IndexMap<String, Target>;

    fn expecting(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
      f.write_str("a mapping of target names to target definitions")
    }

    fn visit_unit<E: de::Error>(self) -> Result<Self::Value, E> {
      Ok(IndexMap::new())
    }

    fn visit_map<A: MapAccess<'de>>(self, mut map: A) -> Result<Self::Value, A::Error> {
      let mut targets = IndexMap::new();

      while let Some(name) = map.next_key::<String>()? {
        let target = map.next_value::<Option<Target>>()?.unwrap_or_default();
        if targets.contains_key(&name) {
          return Err(de::Error::custom(format!("duplicate target `{name}`")));
        }
        targets.insert(name, target);
      }

      Ok(targets)
    }
  }

  deserializer.deserialize_any(TargetsVisitor)
}
