use qrawlr::{ApplyOutcome, ParseTree};

mod ansi {
    pub const RESET: &str = "\x1b[0m";
    pub const DIM: &str = "\x1b[2m";
    pub const BOLD: &str = "\x1b[1m";

    pub const GREEN: &str = "\x1b[32m";
    pub const YELLOW: &str = "\x1b[33m";
    pub const BLUE: &str = "\x1b[34m";
    pub const CYAN: &str = "\x1b[36m";
    pub const GRAY: &str = "\x1b[90m";

    pub struct Palette {
        enabled: bool,
    }

    impl Palette {
        pub fn new(enabled: bool) -> Self {
            Self { enabled }
        }

        pub fn paint(&self, s: impl AsRef<str>, color: &str) -> String {
            if self.enabled { format!("{}{}{}", color, s.as_ref(), RESET) } else { s.as_ref().to_string() }
        }

        pub fn bold(&self, s: impl AsRef<str>) -> String {
            if self.enabled { format!("{}{}{}", BOLD, s.as_ref(), RESET) } else { s.as_ref().to_string() }
        }

        pub fn dim(&self, s: impl AsRef<str>) -> String {
            if self.enabled { format!("{}{}{}", DIM, s.as_ref(), RESET) } else { s.as_ref().to_string() }
        }
    }
}

pub fn print_outcome(input: &str, outcome: &ApplyOutcome, color: bool) {
    let palette = ansi::Palette::new(color);
    println!("\n{}", palette.bold(palette.paint(format!("⚙  Parsing: \"{}\"", input), ansi::CYAN)));

    match &outcome.tree {
        Some(tree) => {
            println!("\n{}", palette.paint("━━━ Parse tree ━━━", ansi::GRAY));
            print_tree(tree, 0, &palette);
        }
        None => {
            println!("\n{}", palette.paint("━━━ No match ━━━", ansi::YELLOW));
            println!(
                "  {} {}",
                palette.dim("farthest match reached:"),
                palette.paint(format!("{}", outcome.farthest_match_position), ansi::YELLOW),
            );
        }
    }

    println!("\n{}", palette.paint("━━━ Timing ━━━", ansi::GRAY));
    println!("  Elapsed: {}", palette.paint(format!("{:?}", outcome.metrics.elapsed), ansi::GREEN));
    println!();
}

fn print_tree(tree: &ParseTree, depth: usize, palette: &ansi::Palette) {
    let indent = "  ".repeat(depth);
    match tree {
        ParseTree::Leaf(leaf) => {
            println!(
                "{}{} {}",
                indent,
                palette.paint(format!("{:?}", leaf.value), ansi::GREEN),
                palette.dim(format!("[{}..{}]", leaf.position_begin.index, leaf.position_end.index)),
            );
        }
        ParseTree::Node(node) => {
            println!(
                "{}{} {}",
                indent,
                palette.bold(palette.paint(node.name.as_deref().unwrap_or("<anonymous>"), ansi::BLUE)),
                palette.dim(format!("[{}..{}]", node.position_begin.index, node.position_end.index)),
            );
            for child in &node.children {
                print_tree(child, depth + 1, palette);
            }
        }
    }
}
