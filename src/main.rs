mod debug_report;

use qrawlr::{Action, ActionArg, Matcher, Options, Rule, RuleSet, apply, rule, ruleset};
use std::io::{self, IsTerminal, Read};

fn main() {
    let config = match parse_args() {
        Ok(config) => config,
        Err(err) => {
            eprintln!("{err}");
            std::process::exit(2);
        }
    };

    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("warn")).init();

    let rules = build_demo_rules();
    let options = Options { max_depth: config.max_depth, cancelled: None };

    match apply(&rules, &config.input, "Tag", "<stdin>", &options) {
        Ok(outcome) => debug_report::print_outcome(&config.input, &outcome, config.color),
        Err(err) => {
            eprintln!("error: {err}");
            std::process::exit(1);
        }
    }
}

/// A tiny illustrative grammar for the demo CLI: a balanced, stack-checked
/// tag like `<b>hi</b>`. Not a general-purpose grammar — just enough to
/// exercise rule references, quantifiers, fuse, and the push/pop/stack-ref
/// trio in one pass.
fn build_demo_rules() -> RuleSet {
    ruleset![
        rule! {
            name: "Letter",
            options: [[Matcher::range('a', 'z')], [Matcher::range('A', 'Z')]],
            anonymous: true,
        },
        rule! {
            name: "Identifier",
            options: [[Matcher::rule_ref("Letter").one_or_more()]],
            fuse: true,
        },
        {
            let open_name = Matcher::rule_ref("Identifier")
                .on_match(vec![Action::new("push", vec![ActionArg::Match, ActionArg::Identifier("tags".into())])]);
            let close_name =
                Matcher::stack_ref("tags", 0).on_match(vec![Action::new("pop", vec![ActionArg::Identifier("tags".into())])]);

            Rule::new(
                "Tag",
                vec![vec![
                    Matcher::exact("<"),
                    open_name,
                    Matcher::exact(">"),
                    Matcher::rule_ref("Identifier"),
                    Matcher::exact("</"),
                    close_name,
                    Matcher::exact(">"),
                ]],
            )
        },
    ]
}

struct CliConfig {
    input: String,
    max_depth: Option<usize>,
    color: bool,
}

fn parse_args() -> Result<CliConfig, String> {
    let mut input: Option<String> = None;
    let mut max_depth: Option<usize> = None;
    let mut color = io::stdout().is_terminal();
    let mut args = std::env::args().skip(1).peekable();

    while let Some(arg) = args.next() {
        match arg.as_str() {
            "-h" | "--help" => {
                print_help();
                std::process::exit(0);
            }
            "-V" | "--version" => {
                println!("qrawlr {}", env!("CARGO_PKG_VERSION"));
                std::process::exit(0);
            }
            "--color" => color = true,
            "--no-color" => color = false,
            "--max-depth" => {
                let value = args.next().ok_or_else(|| "error: --max-depth expects a value".to_string())?;
                max_depth = Some(value.parse().map_err(|_| format!("error: invalid --max-depth '{value}'"))?);
            }
            "--input" | "-i" => {
                let value = args.next().ok_or_else(|| "error: --input expects a value".to_string())?;
                if input.is_some() {
                    return Err("error: input provided multiple times".to_string());
                }
                input = Some(value);
            }
            "--" => {
                let rest = args.collect::<Vec<_>>().join(" ");
                if !rest.trim().is_empty() {
                    if input.is_some() {
                        return Err("error: input provided multiple times".to_string());
                    }
                    input = Some(rest);
                }
                break;
            }
            _ if arg.starts_with("--max-depth=") => {
                let value = arg.trim_start_matches("--max-depth=");
                max_depth = Some(value.parse().map_err(|_| format!("error: invalid --max-depth '{value}'"))?);
            }
            _ if arg.starts_with("--input=") => {
                let value = arg.trim_start_matches("--input=");
                if input.is_some() {
                    return Err("error: input provided multiple times".to_string());
                }
                input = Some(value.to_string());
            }
            _ if arg.starts_with('-') => {
                return Err(format!("error: unknown option '{arg}'"));
            }
            _ => {
                let rest = std::iter::once(arg).chain(args).collect::<Vec<_>>().join(" ");
                if input.is_some() {
                    return Err("error: input provided multiple times".to_string());
                }
                input = Some(rest);
                break;
            }
        }
    }

    let input = match input {
        Some(value) => value,
        None => read_stdin_input()?,
    };

    if input.trim().is_empty() {
        return Err(format!("error: no input provided\n\n{}", help_text()));
    }

    Ok(CliConfig { input, max_depth, color })
}

fn read_stdin_input() -> Result<String, String> {
    let mut buffer = String::new();
    io::stdin().read_to_string(&mut buffer).map_err(|err| format!("error: failed to read stdin: {err}"))?;
    Ok(buffer)
}

fn print_help() {
    println!("{}", help_text());
}

fn help_text() -> String {
    format!(
        "qrawlr {version}

Demo CLI for the qrawlr grammar engine. Applies a small built-in
grammar (a balanced `<name>...</name>` tag) to the given input.

Usage:
  qrawlr [OPTIONS] [--] <input...>
  qrawlr [OPTIONS] --input <text>

Options:
  -i, --input <text>     Input text to parse. If omitted, reads remaining args
                          or stdin when no args are provided.
  --max-depth <n>        Override the recursion-depth guard (default 1024).
  --color                Force ANSI color output.
  --no-color             Disable ANSI color output.
  -h, --help             Show this help message.
  -V, --version          Print version information.

Exit codes:
  0  Success (match attempted; check output for whether it matched).
  1  Grammar error (unknown rule, unbalanced stacks, recursion limit, fail action).
  2  Invalid arguments or missing input.
",
        version = env!("CARGO_PKG_VERSION")
    )
}
