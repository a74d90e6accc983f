//! Declarative rule files for the stanza block parser.
//!
//! `defaults/stanza.default.toml` is embedded into every binary so that the
//! documented defaults and runtime behavior stay in sync. Applications layer
//! user rule files on top of those defaults via [`Loader`], deserialize the
//! result into a [`RuleSet`], and [`compile`](RuleSet::compile) it into the
//! parser's definition tree, attaching an action per rule.

use std::fmt;
use std::path::Path;

use config::builder::DefaultState;
use config::{Config, ConfigBuilder, ConfigError, File, FileFormat};
use serde::Deserialize;

use stanza_parser::{Action, BlockDef, DefinitionError, Matcher, Nesting};

const DEFAULT_TOML: &str = include_str!("../defaults/stanza.default.toml");

/// The embedded default rule file, verbatim.
pub fn default_rules() -> &'static str {
    DEFAULT_TOML
}

/// How a group of rules composes: a single block, priority alternatives,
/// or a fixed order.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Mode {
    One,
    #[default]
    Choice,
    Sequence,
}

/// Top-level rule file: a composition mode and the block rules under it.
#[derive(Debug, Clone, Deserialize)]
pub struct RuleSet {
    #[serde(default)]
    pub mode: Mode,
    pub blocks: Vec<Rule>,
}

/// One declarative block rule. Mirrors the builder surface of
/// [`BlockDef`]; `head`/`body`/`tail` entries are regexes tried in order.
#[derive(Debug, Clone, Deserialize)]
pub struct Rule {
    pub name: Option<String>,
    #[serde(default)]
    pub head: Vec<String>,
    #[serde(default)]
    pub body: Vec<String>,
    #[serde(default)]
    pub tail: Vec<String>,
    /// Append a match-anything matcher to the body. Requires a head.
    #[serde(default)]
    pub catch_all: bool,
    pub line_count: Option<u64>,
    pub usage_limit: Option<u32>,
    #[serde(default)]
    pub strict: bool,
    #[serde(default = "default_priority")]
    pub priority: i32,
    /// How this rule's `children` compose.
    #[serde(default)]
    pub mode: Mode,
    #[serde(default)]
    pub children: Vec<Rule>,
}

fn default_priority() -> i32 {
    1
}

impl RuleSet {
    /// Compile the rule tree into a parser definition, asking `actions`
    /// for an optional action per rule.
    pub fn compile(
        &self,
        actions: &mut dyn FnMut(&Rule) -> Option<Action>,
    ) -> Result<Nesting, RulesError> {
        compile_group(self.mode, &self.blocks, actions)
    }
}

fn compile_group(
    mode: Mode,
    rules: &[Rule],
    actions: &mut dyn FnMut(&Rule) -> Option<Action>,
) -> Result<Nesting, RulesError> {
    if rules.is_empty() {
        return Ok(Nesting::None);
    }
    match mode {
        Mode::One => {
            if rules.len() != 1 {
                return Err(RulesError::SingleBlockRequired { found: rules.len() });
            }
            Ok(Nesting::one(compile_rule(&rules[0], actions)?))
        }
        Mode::Choice => {
            let defs = rules
                .iter()
                .map(|rule| compile_rule(rule, actions))
                .collect::<Result<Vec<_>, _>>()?;
            Ok(Nesting::choice(defs))
        }
        Mode::Sequence => {
            let defs = rules
                .iter()
                .map(|rule| compile_rule(rule, actions))
                .collect::<Result<Vec<_>, _>>()?;
            Ok(Nesting::sequence(defs))
        }
    }
}

fn compile_rule(
    rule: &Rule,
    actions: &mut dyn FnMut(&Rule) -> Option<Action>,
) -> Result<BlockDef, RulesError> {
    let mut builder = match &rule.name {
        Some(name) => BlockDef::named(name),
        None => BlockDef::builder(),
    };
    for pattern in &rule.head {
        builder = builder.head(Matcher::pattern(pattern)?);
    }
    for pattern in &rule.body {
        builder = builder.body(Matcher::pattern(pattern)?);
    }
    if rule.catch_all {
        builder = builder.body(Matcher::all_others());
    }
    for pattern in &rule.tail {
        builder = builder.tail(Matcher::pattern(pattern)?);
    }
    if let Some(count) = rule.line_count {
        builder = builder.line_count(count);
    }
    if let Some(limit) = rule.usage_limit {
        builder = builder.usage_limit(limit);
    }
    builder = builder
        .strict(rule.strict)
        .priority(rule.priority)
        .nested(compile_group(rule.mode, &rule.children, actions)?);
    if let Some(action) = actions(rule) {
        builder = builder.action(action);
    }
    Ok(builder.build()?)
}

/// Layers user rule files over the embedded defaults.
#[derive(Debug, Clone)]
pub struct Loader {
    builder: ConfigBuilder<DefaultState>,
}

impl Loader {
    /// Start a loader seeded with the embedded defaults.
    pub fn new() -> Self {
        let builder = Config::builder().add_source(File::from_str(DEFAULT_TOML, FileFormat::Toml));
        Self { builder }
    }

    /// Layer a rule file. Missing files trigger an error.
    pub fn with_file(mut self, path: impl AsRef<Path>) -> Self {
        let source = File::from(path.as_ref())
            .format(FileFormat::Toml)
            .required(true);
        self.builder = self.builder.add_source(source);
        self
    }

    /// Layer an optional rule file (ignored if the file is absent).
    pub fn with_optional_file(mut self, path: impl AsRef<Path>) -> Self {
        let source = File::from(path.as_ref())
            .format(FileFormat::Toml)
            .required(false);
        self.builder = self.builder.add_source(source);
        self
    }

    /// Layer rules given as an inline TOML string.
    pub fn with_inline(mut self, toml: &str) -> Self {
        self.builder = self
            .builder
            .add_source(File::from_str(toml, FileFormat::Toml));
        self
    }

    /// Finalize the builder and deserialize the resulting rule set.
    pub fn build(self) -> Result<RuleSet, RulesError> {
        let config = self.builder.build()?;
        Ok(config.try_deserialize()?)
    }
}

impl Default for Loader {
    fn default() -> Self {
        Self::new()
    }
}

/// Errors from loading or compiling a rule file.
#[derive(Debug)]
pub enum RulesError {
    /// The file could not be read or deserialized.
    Load(ConfigError),
    /// A rule compiled into an invalid block definition.
    Definition(DefinitionError),
    /// `mode = "one"` needs exactly one block in the group.
    SingleBlockRequired { found: usize },
}

impl fmt::Display for RulesError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RulesError::Load(e) => write!(f, "rule file error: {}", e),
            RulesError::Definition(e) => write!(f, "rule error: {}", e),
            RulesError::SingleBlockRequired { found } => {
                write!(f, "mode \"one\" requires exactly one block, found {}", found)
            }
        }
    }
}

impl std::error::Error for RulesError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            RulesError::Load(e) => Some(e),
            RulesError::Definition(e) => Some(e),
            RulesError::SingleBlockRequired { .. } => None,
        }
    }
}

impl From<ConfigError> for RulesError {
    fn from(e: ConfigError) -> Self {
        RulesError::Load(e)
    }
}

impl From<DefinitionError> for RulesError {
    fn from(e: DefinitionError) -> Self {
        RulesError::Definition(e)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_defaults_deserialize_and_compile() {
        let rules = Loader::new().build().unwrap();
        assert_eq!(rules.mode, Mode::Choice);
        assert_eq!(rules.blocks.len(), 1);
        assert_eq!(rules.blocks[0].name.as_deref(), Some("fence"));

        let nesting = rules.compile(&mut |_| None).unwrap();
        assert!(matches!(nesting, Nesting::Choice(_)));
    }

    #[test]
    fn test_user_rules_replace_the_default_blocks() {
        let rules = Loader::new()
            .with_inline(
                r#"
                mode = "one"

                [[blocks]]
                name = "entry"
                head = ["^BEGIN$"]
                tail = ["^END$"]
                strict = true
                "#,
            )
            .build()
            .unwrap();

        assert_eq!(rules.mode, Mode::One);
        assert_eq!(rules.blocks.len(), 1);
        assert_eq!(rules.blocks[0].name.as_deref(), Some("entry"));
        assert!(rules.blocks[0].strict);
    }

    #[test]
    fn test_nested_rules_compile_recursively() {
        let rules = Loader::new()
            .with_inline(
                r#"
                mode = "one"

                [[blocks]]
                name = "outer"
                head = ["outer_head"]
                tail = ["outer_tail"]
                mode = "sequence"

                [[blocks.children]]
                name = "setup"
                head = ["^setup$"]
                line_count = 1

                [[blocks.children]]
                name = "teardown"
                head = ["^teardown$"]
                line_count = 1
                "#,
            )
            .build()
            .unwrap();

        let nesting = rules.compile(&mut |_| None).unwrap();
        let Nesting::One(outer) = nesting else {
            panic!("expected one nesting");
        };
        assert_eq!(outer.name(), "outer");
    }

    #[test]
    fn test_one_mode_requires_a_single_block() {
        let rules = Loader::new()
            .with_inline(
                r#"
                mode = "one"

                [[blocks]]
                name = "a"
                head = ["a"]
                line_count = 1

                [[blocks]]
                name = "b"
                head = ["b"]
                line_count = 1
                "#,
            )
            .build()
            .unwrap();

        let err = rules.compile(&mut |_| None).unwrap_err();
        assert!(matches!(
            err,
            RulesError::SingleBlockRequired { found: 2 }
        ));
    }

    #[test]
    fn test_bad_regex_surfaces_as_definition_error() {
        let rules = Loader::new()
            .with_inline(
                r#"
                [[blocks]]
                name = "broken"
                head = ["(unclosed"]
                "#,
            )
            .build()
            .unwrap();

        let err = rules.compile(&mut |_| None).unwrap_err();
        assert!(matches!(err, RulesError::Definition(_)));
    }
}
