//! Action dispatcher.
//!
//! Matchers attach ordered lists of actions to the `onMatch`/`onFail`
//! triggers (spec §4.5). [`dispatch`] runs them in the order recorded,
//! rewriting every `Match` argument to the stringified matched tree
//! (`tree.toString()`, spec §9) before invoking the action itself.
//!
//! Only four actions exist; any other name is a configuration error, just
//! like an unknown action name in `original_source/GrammarRule.py`'s
//! `_run_actions_for_trigger`.

use crate::engine::error::GrammarError;
use crate::engine::state::ParseState;
use crate::engine::tree::ParseTree;

/// Which point in the match lifecycle an action list runs at.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Trigger {
    OnMatch,
    OnFail,
}

/// The kind of an action argument, before `Match` placeholders are
/// resolved at dispatch time.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ActionArg {
    /// A literal string argument.
    String(String),
    /// An identifier argument (a stack name).
    Identifier(String),
    /// Placeholder resolved to `(String, tree.toString())` at dispatch.
    Match,
}

/// One `name(args...)` action call.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Action {
    pub name: String,
    pub args: Vec<ActionArg>,
}

impl Action {
    pub fn new(name: impl Into<String>, args: Vec<ActionArg>) -> Self {
        Action { name: name.into(), args }
    }
}

/// The `{ onMatch: [...], onFail: [...] }` block attached to a matcher.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ActionTable {
    pub on_match: Vec<Action>,
    pub on_fail: Vec<Action>,
}

impl ActionTable {
    fn actions_for(&self, trigger: Trigger) -> &[Action] {
        match trigger {
            Trigger::OnMatch => &self.on_match,
            Trigger::OnFail => &self.on_fail,
        }
    }
}

/// Run every action registered for `trigger`, in declaration order.
///
/// `tree` is the assembled node for `onMatch` (before replacement) and
/// `None` for `onFail`, per spec §4.3 steps 4 and 7.
pub(crate) fn dispatch(
    table: &ActionTable,
    trigger: Trigger,
    tree: Option<&ParseTree>,
    state: &mut ParseState,
    index: usize,
) -> Result<(), GrammarError> {
    for action in table.actions_for(trigger) {
        let resolved: Vec<ResolvedArg> = action
            .args
            .iter()
            .map(|arg| match arg {
                ActionArg::String(v) => ResolvedArg::String(v.clone()),
                ActionArg::Identifier(v) => ResolvedArg::Identifier(v.clone()),
                ActionArg::Match => ResolvedArg::String(tree.map(ParseTree::to_matched_string).unwrap_or_default()),
            })
            .collect();

        run_action(&action.name, &resolved, state, index)?;
    }
    Ok(())
}

enum ResolvedArg {
    String(String),
    Identifier(String),
}

impl ResolvedArg {
    fn as_string(&self) -> Option<&str> {
        match self {
            ResolvedArg::String(s) => Some(s),
            ResolvedArg::Identifier(_) => None,
        }
    }

    fn as_identifier(&self) -> Option<&str> {
        match self {
            ResolvedArg::Identifier(s) => Some(s),
            ResolvedArg::String(_) => None,
        }
    }
}

fn run_action(name: &str, args: &[ResolvedArg], state: &mut ParseState, index: usize) -> Result<(), GrammarError> {
    let at = state.get_position(index);
    let loc = |err: GrammarError| err.with_location(state.filename(), at);

    match name {
        "push" => {
            let [item, stack] = args else {
                return Err(loc(GrammarError::configuration("wrong number of arguments for action 'push'")));
            };
            let value = item
                .as_string()
                .ok_or_else(|| loc(GrammarError::configuration("expected string for action argument 'item'")))?;
            let stack_name = stack
                .as_identifier()
                .ok_or_else(|| loc(GrammarError::configuration("expected identifier for action argument 'stack'")))?;
            state.push_stack(stack_name, value.to_string());
            Ok(())
        }
        "pop" => {
            let [stack] = args else {
                return Err(loc(GrammarError::configuration("wrong number of arguments for action 'pop'")));
            };
            let stack_name = stack
                .as_identifier()
                .ok_or_else(|| loc(GrammarError::configuration("expected identifier for action argument 'stack'")))?;
            state.pop_stack(stack_name).map_err(loc)?;
            Ok(())
        }
        "message" => {
            let [msg] = args else {
                return Err(loc(GrammarError::configuration("wrong number of arguments for action 'message'")));
            };
            let text = msg
                .as_string()
                .ok_or_else(|| loc(GrammarError::configuration("expected string for action argument 'msg'")))?;
            log::info!("{}:{}: {}", state.filename(), at, text);
            Ok(())
        }
        "fail" => {
            let [msg] = args else {
                return Err(loc(GrammarError::configuration("wrong number of arguments for action 'fail'")));
            };
            let text = msg
                .as_string()
                .ok_or_else(|| loc(GrammarError::configuration("expected string for action argument 'msg'")))?;
            Err(loc(GrammarError::UserFail { message: text.to_string(), filename: None, position: None }))
        }
        other => Err(loc(GrammarError::configuration(format!("unknown action '{other}'")))),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine::ruleset::RuleSet;

    fn state() -> ParseState<'static> {
        let rules: &'static RuleSet = Box::leak(Box::new(RuleSet::new()));
        ParseState::new("<b></b>", "t.qrl", rules)
    }

    #[test]
    fn push_then_pop_round_trips() {
        let mut st = state();
        let table = ActionTable {
            on_match: vec![Action::new("push", vec![ActionArg::String("b".into()), ActionArg::Identifier("tags".into())])],
            on_fail: Vec::new(),
        };
        dispatch(&table, Trigger::OnMatch, None, &mut st, 0).unwrap();
        assert_eq!(st.stack("tags").clone(), vec!["b".to_string()]);

        let pop_table = ActionTable { on_match: vec![Action::new("pop", vec![ActionArg::Identifier("tags".into())])], on_fail: Vec::new() };
        dispatch(&pop_table, Trigger::OnMatch, None, &mut st, 0).unwrap();
        assert!(st.stacks_are_empty());
    }

    #[test]
    fn unknown_action_is_configuration_error() {
        let mut st = state();
        let table = ActionTable { on_match: vec![Action::new("frobnicate", vec![])], on_fail: Vec::new() };
        let err = dispatch(&table, Trigger::OnMatch, None, &mut st, 0).unwrap_err();
        assert!(matches!(err, GrammarError::Configuration { .. }));
    }

    #[test]
    fn fail_action_raises_user_fail_with_position() {
        let mut st = state();
        let table = ActionTable { on_match: vec![Action::new("fail", vec![ActionArg::String("boom".into())])], on_fail: Vec::new() };
        let err = dispatch(&table, Trigger::OnMatch, None, &mut st, 3).unwrap_err();
        match err {
            GrammarError::UserFail { message, position, .. } => {
                assert_eq!(message, "boom");
                assert_eq!(position.unwrap().index, 3);
            }
            _ => panic!("expected UserFail"),
        }
    }

    #[test]
    fn pop_from_empty_stack_is_integrity_error() {
        let mut st = state();
        let table = ActionTable { on_match: vec![Action::new("pop", vec![ActionArg::Identifier("tags".into())])], on_fail: Vec::new() };
        let err = dispatch(&table, Trigger::OnMatch, None, &mut st, 0).unwrap_err();
        assert!(matches!(err, GrammarError::Integrity { .. }));
    }
}
