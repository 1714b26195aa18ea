use std::time::{Duration, Instant};

use crate::engine::error::GrammarError;
use crate::engine::metrics::ApplyMetrics;
use crate::engine::position::Position;
use crate::engine::ruleset::RuleSet;
use crate::engine::state::ParseState;
use crate::engine::tree::ParseTree;

/// Options that affect a single [`apply`] call.
///
/// This is intentionally minimal: `qrawlr` has no locale, timezone, or
/// classifier configuration to carry — only the two knobs spec §5
/// actually defines.
#[derive(Default)]
pub struct Options {
    /// Recursion depth above which `apply` raises `GrammarError::Integrity`
    /// instead of risking host stack exhaustion. `None` uses the engine's
    /// default (1024 grammar-frames).
    pub max_depth: Option<usize>,
    /// Checked once per matcher invocation; when it returns `true`, the
    /// in-progress parse unwinds as an ordinary failure.
    pub cancelled: Option<Box<dyn Fn() -> bool + Send + Sync>>,
}

impl std::fmt::Debug for Options {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Options")
            .field("max_depth", &self.max_depth)
            .field("cancelled", &self.cancelled.is_some())
            .finish()
    }
}

/// Result of a single [`apply`] call.
#[derive(Debug, Clone)]
pub struct ApplyOutcome {
    /// The parse tree, or `None` if the entry rule failed to match.
    pub tree: Option<ParseTree>,
    /// How far into `text` the farthest attempted match reached, useful
    /// for pointing a caller at the likely error location on failure.
    pub farthest_match_position: Position,
    /// Timing for this call.
    pub metrics: ApplyMetrics,
}

/// Match `entry_rule` against `text` using `rules`, per spec §4.8.
///
/// Steps:
/// 1. Resolve `entry_rule` in `rules`, raising `GrammarError::Configuration`
///    if it is unknown.
/// 2. Build a fresh [`ParseState`] over `text`.
/// 3. Run the entry rule's match through the shared driver.
/// 4. If it matched, unconditionally relabel the resulting node with
///    `entry_rule`'s name — even if the rule is anonymous, since it is
///    the thing the caller asked to parse.
/// 5. Require every effect stack to be empty; a non-empty stack at this
///    point is a grammar bug, not a parse failure, so it raises
///    `GrammarError::Integrity`.
/// 6. Return the tree (or `None`) together with the farthest-match
///    position, for diagnosing why a parse failed.
pub fn apply(rules: &RuleSet, text: &str, entry_rule: &str, filename: &str, options: &Options) -> Result<ApplyOutcome, GrammarError> {
    let start = Instant::now();

    if !rules.contains(entry_rule) {
        return Err(GrammarError::configuration(format!("entry rule '{entry_rule}' not found")));
    }

    let cancelled = options.cancelled.as_deref();
    let mut state = ParseState::new(text, filename, rules);
    if let Some(max_depth) = options.max_depth {
        state = state.with_max_depth(max_depth);
    }
    state = state.with_cancellation(cancelled);

    let rule = state.get_rule(entry_rule)?;
    let (mut tree, _next) = rule.match_rule(&mut state, 0)?;

    if let Some(t) = tree.as_mut() {
        t.set_name(entry_rule.to_string());
    }

    if !state.stacks_are_empty() {
        let names = state.nonempty_stack_names().join(", ");
        return Err(GrammarError::integrity(format!("stacks not empty after parsing: {names}")));
    }

    let farthest_match_position = state.get_position(state.farthest_match_index());
    let elapsed = start.elapsed();

    Ok(ApplyOutcome { tree, farthest_match_position, metrics: ApplyMetrics { elapsed } })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine::matcher::Matcher;
    use crate::engine::ruleset::Rule;

    fn greeting_rules() -> RuleSet {
        let mut rules = RuleSet::new();
        rules.insert(Rule::new("Greeting", vec![vec![Matcher::exact("hi"), Matcher::exact("!")]]));
        rules
    }

    #[test]
    fn apply_matches_entry_rule_and_relabels_result() {
        let rules = greeting_rules();
        let outcome = apply(&rules, "hi!", "Greeting", "<input>", &Options::default()).unwrap();

        let tree = outcome.tree.unwrap();
        assert_eq!(tree.name(), Some("Greeting"));
        assert_eq!(tree.to_matched_string(), "hi!");
        assert!(outcome.metrics.elapsed >= Duration::ZERO);
    }

    #[test]
    fn apply_reports_farthest_match_on_failure() {
        let rules = greeting_rules();
        let outcome = apply(&rules, "hiz", "Greeting", "<input>", &Options::default()).unwrap();

        assert!(outcome.tree.is_none());
        assert_eq!(outcome.farthest_match_position.index, 2);
    }

    #[test]
    fn unknown_entry_rule_is_configuration_error() {
        let rules = greeting_rules();
        let err = apply(&rules, "hi!", "Missing", "<input>", &Options::default()).unwrap_err();
        assert!(matches!(err, GrammarError::Configuration { .. }));
    }

    #[test]
    fn cancellation_makes_entry_rule_fail_without_error() {
        let rules = greeting_rules();
        let options = Options { max_depth: None, cancelled: Some(Box::new(|| true)) };
        let outcome = apply(&rules, "hi!", "Greeting", "<input>", &options).unwrap();
        assert!(outcome.tree.is_none());
    }

    /// Spec §8 scenario 4: a balanced tag grammar that pushes the opening
    /// name onto a stack and pops it against the closing `StackRef`.
    fn tag_rules() -> RuleSet {
        use crate::engine::actions::{Action, ActionArg};

        let mut rules = RuleSet::new();
        rules.insert(Rule::new(
            "Letter",
            vec![vec![Matcher::range('a', 'z')], vec![Matcher::range('A', 'Z')]],
        ).anonymous());
        rules.insert(Rule::new("Name", vec![vec![Matcher::rule_ref("Letter").one_or_more()]]).fused());

        let open_name = Matcher::rule_ref("Name")
            .on_match(vec![Action::new("push", vec![ActionArg::Match, ActionArg::Identifier("tags".into())])]);
        let close_name =
            Matcher::stack_ref("tags", 0).on_match(vec![Action::new("pop", vec![ActionArg::Identifier("tags".into())])]);

        rules.insert(Rule::new(
            "Tag",
            vec![vec![
                Matcher::exact("<"),
                open_name,
                Matcher::exact(">"),
                Matcher::exact("</"),
                close_name,
                Matcher::exact(">"),
            ]],
        ));
        rules
    }

    #[test]
    fn balanced_tag_matches_and_leaves_stack_empty() {
        let rules = tag_rules();
        let outcome = apply(&rules, "<b></b>", "Tag", "<input>", &Options::default()).unwrap();
        assert!(outcome.tree.is_some());
    }

    #[test]
    fn mismatched_tag_fails_and_rolls_back_the_pushed_name() {
        let rules = tag_rules();
        let outcome = apply(&rules, "<b></i>", "Tag", "<input>", &Options::default()).unwrap();
        assert!(outcome.tree.is_none());
    }
}
