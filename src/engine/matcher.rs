//! Matcher hierarchy.
//!
//! A [`Matcher`] pairs one [`MatcherKind`] (the seven constructs of spec
//! §3: any-char, sequence, alternation, range, literal, rule reference,
//! stack reference) with the modifier fields every matcher shares
//! (`inverted`, `count_min`/`count_max`, `look_ahead`, `omit_match`,
//! `match_repl`, `actions`). The modifier logic itself lives in exactly
//! one place, `engine::driver::Matcher::match_with_modifiers` — this
//! module only implements each variant's *bare* attempt
//! (`match_specific`), matching spec §4.2's requirement that a matcher is
//! "constructible without knowing the containing grammar" and resolves
//! rule/stack names only at match time.
//!
//! `All` and `Any` recurse through the full modifier-wrapped match
//! (`match_with_modifiers`) for each child, not through `match_specific`
//! directly — a child may itself carry quantifiers, inversion, and so on.

use crate::engine::actions::ActionTable;
use crate::engine::error::GrammarError;
use crate::engine::state::ParseState;
use crate::engine::tree::{Leaf, ParseTree, TreeNode};

/// `match_repl` — one of `STRING`, `STACK`, or `IDENTIFIER` replacement
/// (spec §3, §4.3.1).
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MatchRepl {
    /// Replace the tree with a leaf holding this literal string.
    String(String),
    /// Replace the tree with a leaf holding `stack[-index-1]` (or `""`).
    Stack { stack: String, index: usize },
    /// Keep the tree's structure but relabel it.
    Identifier(String),
}

/// The seven matcher variants of spec §3.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MatcherKind {
    /// `.` — one input code unit, failing at EOF.
    AnyChar,
    /// `( ... )` — ordered sequence, all must succeed.
    All(Vec<Matcher>),
    /// `[ ... ]` — ordered alternatives, first success wins.
    Any(Vec<Matcher>),
    /// `'ab'` — single code unit in `[first, last]`, `first < last`.
    Range(char, char),
    /// `"literal"` — may be empty (spec §9's zero-width literal).
    Exact(String),
    /// A reference to another rule, resolved by name at match time.
    RuleRef(String),
    /// `:name.index:` — matches the stack value at `-index-1` from top,
    /// or `""` if the stack is shorter than `index + 1`.
    StackRef(String, usize),
}

/// One matcher: a [`MatcherKind`] plus the modifier fields shared by
/// every variant (spec §3).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Matcher {
    pub kind: MatcherKind,
    pub inverted: bool,
    pub count_min: u32,
    /// `None` means unbounded (`-1` in spec terms).
    pub count_max: Option<u32>,
    pub look_ahead: bool,
    pub omit_match: bool,
    pub match_repl: Option<MatchRepl>,
    pub actions: ActionTable,
}

impl Matcher {
    /// A bare matcher with default modifiers: exactly one match required,
    /// no inversion, look-ahead, omission, replacement, or actions.
    pub fn new(kind: MatcherKind) -> Self {
        Matcher {
            kind,
            inverted: false,
            count_min: 1,
            count_max: Some(1),
            look_ahead: false,
            omit_match: false,
            match_repl: None,
            actions: ActionTable::default(),
        }
    }

    pub fn any_char() -> Self {
        Matcher::new(MatcherKind::AnyChar)
    }

    pub fn all(children: Vec<Matcher>) -> Self {
        Matcher::new(MatcherKind::All(children))
    }

    pub fn any(children: Vec<Matcher>) -> Self {
        Matcher::new(MatcherKind::Any(children))
    }

    pub fn range(first: char, last: char) -> Self {
        assert!(first < last, "Range requires first < last");
        Matcher::new(MatcherKind::Range(first, last))
    }

    pub fn exact(value: impl Into<String>) -> Self {
        Matcher::new(MatcherKind::Exact(value.into()))
    }

    pub fn rule_ref(name: impl Into<String>) -> Self {
        Matcher::new(MatcherKind::RuleRef(name.into()))
    }

    pub fn stack_ref(stack: impl Into<String>, index: usize) -> Self {
        Matcher::new(MatcherKind::StackRef(stack.into(), index))
    }

    // --- modifier builders, mirroring the teacher crate's fluent rule! style ---

    pub fn inverted(mut self) -> Self {
        self.inverted = true;
        self
    }

    /// `min ≥ 0`, `max` of `None` for unbounded, `max = Some(m) ⇒ m ≥ min`,
    /// and not both zero (spec §3, §8: `#0-0` is forbidden).
    pub fn repeat(mut self, min: u32, max: Option<u32>) -> Self {
        if let Some(m) = max {
            assert!(m >= min, "count_max must be >= count_min");
        }
        assert!(min > 0 || max != Some(0), "quantifier #0-0 is forbidden");
        self.count_min = min;
        self.count_max = max;
        self
    }

    pub fn optional(self) -> Self {
        self.repeat(0, Some(1))
    }

    pub fn zero_or_more(self) -> Self {
        self.repeat(0, None)
    }

    pub fn one_or_more(self) -> Self {
        self.repeat(1, None)
    }

    pub fn look_ahead(mut self) -> Self {
        self.look_ahead = true;
        self
    }

    pub fn omit(mut self) -> Self {
        self.omit_match = true;
        self
    }

    pub fn replace_with(mut self, repl: MatchRepl) -> Self {
        self.match_repl = Some(repl);
        self
    }

    pub fn on_match(mut self, actions: Vec<crate::engine::actions::Action>) -> Self {
        self.actions.on_match = actions;
        self
    }

    pub fn on_fail(mut self, actions: Vec<crate::engine::actions::Action>) -> Self {
        self.actions.on_fail = actions;
        self
    }

    /// The bare, single-attempt match for this matcher's variant, with no
    /// modifier handling (spec §4.2). Never consumes input on failure.
    pub(crate) fn match_specific(
        &self,
        state: &mut ParseState,
        index: usize,
    ) -> Result<(Option<ParseTree>, usize), GrammarError> {
        match &self.kind {
            MatcherKind::AnyChar => match_any_char(state, index),
            MatcherKind::All(children) => match_all(children, state, index),
            MatcherKind::Any(children) => match_any(children, state, index),
            MatcherKind::Range(first, last) => match_range(*first, *last, state, index),
            MatcherKind::Exact(value) => match_exact(value, state, index),
            MatcherKind::RuleRef(name) => match_rule_ref(name, state, index),
            MatcherKind::StackRef(name, stack_index) => match_stack_ref(name, *stack_index, state, index),
        }
    }
}

fn match_any_char(state: &mut ParseState, index: usize) -> Result<(Option<ParseTree>, usize), GrammarError> {
    let Some(c) = state.char_at(index) else {
        return Ok((None, index));
    };
    let next = index + c.len();
    Ok((Some(ParseTree::Leaf(Leaf::new(c, state.get_position(index), state.get_position(next)))), next))
}

fn match_range(first: char, last: char, state: &mut ParseState, index: usize) -> Result<(Option<ParseTree>, usize), GrammarError> {
    let Some(c) = state.char_at(index) else {
        return Ok((None, index));
    };
    let ch = c.chars().next().expect("char_at always returns one char");
    if ch < first || ch > last {
        return Ok((None, index));
    }
    let next = index + c.len();
    Ok((Some(ParseTree::Leaf(Leaf::new(c, state.get_position(index), state.get_position(next)))), next))
}

fn match_exact(value: &str, state: &mut ParseState, index: usize) -> Result<(Option<ParseTree>, usize), GrammarError> {
    if !state.startswith(value, index) {
        return Ok((None, index));
    }
    let next = index + value.len();
    Ok((Some(ParseTree::Leaf(Leaf::new(value, state.get_position(index), state.get_position(next)))), next))
}

fn match_all(children: &[Matcher], state: &mut ParseState, index: usize) -> Result<(Option<ParseTree>, usize), GrammarError> {
    let old_index = index;
    let mut cursor = index;
    let mut parts = Vec::with_capacity(children.len());

    for child in children {
        let (sub, next) = child.match_with_modifiers(state, cursor)?;
        match sub {
            None => return Ok((None, old_index)),
            Some(tree) => {
                parts.push(tree);
                cursor = next;
            }
        }
    }

    let mut node = TreeNode::new(state.get_position(old_index));
    for part in parts {
        node.add_child(part, false);
    }
    Ok((Some(ParseTree::Node(node)), cursor))
}

fn match_any(children: &[Matcher], state: &mut ParseState, index: usize) -> Result<(Option<ParseTree>, usize), GrammarError> {
    for child in children {
        let (sub, next) = child.match_with_modifiers(state, index)?;
        if sub.is_some() {
            return Ok((sub, next));
        }
    }
    Ok((None, index))
}

fn match_rule_ref(name: &str, state: &mut ParseState, index: usize) -> Result<(Option<ParseTree>, usize), GrammarError> {
    if !state.has_rule(name) {
        let pos = state.get_position(index);
        return Err(GrammarError::configuration(format!("rule '{name}' not found")).with_location(state.filename(), pos));
    }
    let rule = state.get_rule(name)?;
    let (mut tree, next) = rule.match_rule(state, index)?;
    if let Some(ParseTree::Node(_)) = &tree {
        if !rule.anonymous {
            tree.as_mut().unwrap().set_name(rule.name.clone());
        }
    }
    Ok((tree, next))
}

fn match_stack_ref(name: &str, stack_index: usize, state: &mut ParseState, index: usize) -> Result<(Option<ParseTree>, usize), GrammarError> {
    let stack = state.stack(name);
    let target = if stack_index < stack.len() { stack[stack.len() - stack_index - 1].clone() } else { String::new() };

    if !state.startswith(&target, index) {
        return Ok((None, index));
    }
    let next = index + target.len();
    Ok((Some(ParseTree::Leaf(Leaf::new(target, state.get_position(index), state.get_position(next)))), next))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine::ruleset::RuleSet;

    fn state(text: &'static str) -> ParseState<'static> {
        let rules: &'static RuleSet = Box::leak(Box::new(RuleSet::new()));
        ParseState::new(text, "t.qrl", rules)
    }

    #[test]
    fn any_char_fails_at_eof() {
        let mut st = state("");
        let (tree, next) = Matcher::any_char().match_specific(&mut st, 0).unwrap();
        assert!(tree.is_none());
        assert_eq!(next, 0);
    }

    #[test]
    fn exact_empty_string_always_matches_zero_width() {
        let mut st = state("abc");
        let (tree, next) = Matcher::exact("").match_specific(&mut st, 1).unwrap();
        assert!(tree.is_some());
        assert_eq!(next, 1);
    }

    #[test]
    fn stack_ref_with_absent_stack_matches_empty_at_zero_width() {
        let mut st = state("anything");
        let (tree, next) = Matcher::stack_ref("tags", 0).match_specific(&mut st, 3).unwrap();
        assert!(tree.is_some());
        assert_eq!(next, 3);
    }

    #[test]
    fn all_fails_leaves_index_unchanged() {
        let mut st = state("ac");
        let m = Matcher::all(vec![Matcher::exact("a"), Matcher::exact("b")]);
        let (tree, next) = m.match_specific(&mut st, 0).unwrap();
        assert!(tree.is_none());
        assert_eq!(next, 0);
    }

    #[test]
    fn any_returns_first_match() {
        let mut st = state("ab");
        let m = Matcher::any(vec![Matcher::exact("a"), Matcher::exact("ab")]);
        let (tree, next) = m.match_specific(&mut st, 0).unwrap();
        assert_eq!(tree.unwrap().to_matched_string(), "a");
        assert_eq!(next, 1);
    }
}
