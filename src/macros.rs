/// Build a [`crate::Rule`] ergonomically, in place of the out-of-scope
/// textual grammar DSL.
///
/// ```
/// use qrawlr::{Matcher, rule};
///
/// let greeting = rule! {
///     name: "Greeting",
///     options: [
///         [Matcher::exact("hi"), Matcher::exact("!")],
///         [Matcher::exact("hello")],
///     ],
/// };
/// assert_eq!(greeting.name, "Greeting");
/// ```
#[macro_export]
macro_rules! rule {
    (
        name: $name:expr,
        options: [ $([ $($m:expr),* $(,)? ]),* $(,)? ]
        $(, anonymous: $anon:expr)?
        $(, fuse: $fuse:expr)?
        $(,)?
    ) => {{
        #[allow(unused_mut)]
        let mut rule = $crate::Rule::new($name, vec![ $(vec![ $($m),* ]),* ]);
        $(if $anon { rule = rule.anonymous(); })?
        $(if $fuse { rule = rule.fused(); })?
        rule
    }};
}

/// Build a [`crate::RuleSet`] from a list of [`rule!`]-style definitions.
///
/// ```
/// use qrawlr::{Matcher, ruleset, rule};
///
/// let rules = ruleset![
///     rule! { name: "Greeting", options: [[Matcher::exact("hi")]] },
/// ];
/// assert!(rules.contains("Greeting"));
/// ```
#[macro_export]
macro_rules! ruleset {
    ( $($rule:expr),* $(,)? ) => {{
        #[allow(unused_mut)]
        let mut rules = $crate::RuleSet::new();
        $(rules.insert($rule);)*
        rules
    }};
}
