//! Rule set.
//!
//! A [`Rule`] names an ordered list of option sequences (spec §3, §4.1):
//! `options[0] | options[1] | ...`, where each option is itself a
//! sequence of matchers. This is exactly an anonymous `Any` of `All`s,
//! so `Rule::match_rule` builds that matcher once at construction time
//! and re-runs it through the shared driver on every lookup — no
//! variant-specific matching logic lives here.
//!
//! A [`RuleSet`] is the immutable, `Sync` map of rule name to `Rule`
//! that a [`crate::engine::state::ParseState`] resolves `RuleRef` and
//! entry-point lookups against (spec §5: built once, read-only for the
//! lifetime of every `apply` call made against it, safe to share across
//! threads running independent parses).

use std::collections::HashMap;

use crate::engine::error::GrammarError;
use crate::engine::matcher::Matcher;
use crate::engine::state::ParseState;
use crate::engine::tree::{ParseTree, fuse_children};

/// One named rule: an ordered alternation of option sequences.
#[derive(Debug, Clone)]
pub struct Rule {
    pub name: String,
    /// An anonymous rule is not relabeled into the tree when it succeeds
    /// as a `RuleRef` target (spec §4.2, §4.6).
    pub anonymous: bool,
    /// Whether `fuse_children` runs over the finished tree (spec §4.6).
    pub fuse_children: bool,
    pub options: Vec<Vec<Matcher>>,
    alternation: Matcher,
}

impl Rule {
    pub fn new(name: impl Into<String>, options: Vec<Vec<Matcher>>) -> Self {
        let alternation = Matcher::any(options.iter().cloned().map(Matcher::all).collect());
        Rule { name: name.into(), anonymous: false, fuse_children: false, options, alternation }
    }

    pub fn anonymous(mut self) -> Self {
        self.anonymous = true;
        self
    }

    pub fn fused(mut self) -> Self {
        self.fuse_children = true;
        self
    }

    /// Try every option in order and return the first success, fusing
    /// the resulting tree's consecutive leaves if `fuse_children` is set
    /// (spec §4.1, §4.6).
    pub(crate) fn match_rule(&self, state: &mut ParseState, index: usize) -> Result<(Option<ParseTree>, usize), GrammarError> {
        let (mut tree, next) = self.alternation.match_with_modifiers(state, index)?;
        if self.fuse_children {
            if let Some(t) = tree.as_mut() {
                fuse_children(t);
            }
        }
        Ok((tree, next))
    }
}

/// The fixed, read-only map of rule name to [`Rule`] a parse run
/// resolves references against.
#[derive(Debug, Default)]
pub struct RuleSet {
    rules: HashMap<String, Rule>,
}

impl RuleSet {
    pub fn new() -> Self {
        RuleSet { rules: HashMap::new() }
    }

    /// Insert or replace a rule, keyed by its own name.
    pub fn insert(&mut self, rule: Rule) -> &mut Self {
        self.rules.insert(rule.name.clone(), rule);
        self
    }

    pub fn contains(&self, name: &str) -> bool {
        self.rules.contains_key(name)
    }

    pub fn get(&self, name: &str) -> Result<&Rule, GrammarError> {
        self.rules.get(name).ok_or_else(|| GrammarError::configuration(format!("rule '{name}' not found")))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn first_matching_option_wins() {
        let mut rules = RuleSet::new();
        rules.insert(Rule::new("greeting", vec![vec![Matcher::exact("hi")], vec![Matcher::exact("hello")]]));
        let mut st = ParseState::new("hello", "t.qrl", &rules);
        let rule = rules_get(&rules, "greeting");
        let (tree, next) = rule.match_rule(&mut st, 0).unwrap();
        assert_eq!(tree.unwrap().to_matched_string(), "hello");
        assert_eq!(next, 5);
    }

    #[test]
    fn fuse_children_collapses_adjacent_literals() {
        let mut rules = RuleSet::new();
        rules.insert(Rule::new("digits", vec![vec![Matcher::exact("1").one_or_more()]]).fused());
        let mut st = ParseState::new("111", "t.qrl", &rules);
        let rule = rules_get(&rules, "digits");
        let (tree, _) = rule.match_rule(&mut st, 0).unwrap();
        assert_eq!(tree.unwrap().to_matched_string(), "111");
    }

    #[test]
    fn unknown_rule_is_configuration_error() {
        let rules = RuleSet::new();
        assert!(matches!(rules.get("missing"), Err(GrammarError::Configuration { .. })));
    }

    fn rules_get<'a>(rules: &'a RuleSet, name: &str) -> &'a Rule {
        rules.get(name).unwrap()
    }
}
