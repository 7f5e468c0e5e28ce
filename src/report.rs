use quarry::ParseMetrics;

mod ansi {
    pub const RESET: &str = "\x1b[0m";
    pub const DIM: &str = "\x1b[2m";
    pub const BOLD: &str = "\x1b[1m";

    pub const RED: &str = "\x1b[31m";
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

/// Everything `html` and `json` runs print.
pub struct TreeRun<'a> {
    pub input: &'a str,
    pub complete: bool,
    /// `(line, offset)` where the parser stopped.
    pub stopped_at: (usize, usize),
    pub decoded: Option<String>,
    pub tree: Option<String>,
    /// Selector and the `name value` line of every match.
    pub queries: Vec<(String, Vec<String>)>,
    pub metrics: ParseMetrics,
}

pub fn print_expr(input: &str, value: Option<i64>, color: bool) {
    let palette = ansi::Palette::new(color);
    println!("\n{}", palette.bold(palette.paint(format!("⚙  Evaluating: \"{}\"", preview(input)), ansi::CYAN)));
    match value {
        Some(value) => {
            println!("  {} {}", palette.dim("="), palette.bold(palette.paint(value.to_string(), ansi::GREEN)));
        }
        None => {
            println!("  {}", palette.paint("✗ not a complete expression", ansi::RED));
            println!("{}", palette.dim("  Overflow and division by zero also stop the match"));
        }
    }
    println!();
}

pub fn print_tree_run(run: &TreeRun<'_>, color: bool) {
    let palette = ansi::Palette::new(color);
    println!("\n{}", palette.bold(palette.paint(format!("⚙  Parsing: \"{}\"", preview(run.input)), ansi::CYAN)));

    println!("\n{}", palette.paint("━━━ Parse ━━━", ansi::GRAY));
    if run.complete {
        println!("  {}", palette.paint(format!("✓ {} bytes", run.metrics.consumed), ansi::GREEN));
    } else {
        let (line, offset) = run.stopped_at;
        println!(
            "  {} {}",
            palette.paint("✗ no complete match", ansi::RED),
            palette.paint(format!("stopped at line {line}, offset {offset}"), ansi::YELLOW)
        );
    }
    if let Some(decoded) = &run.decoded {
        println!("  {} {}", palette.dim("value:"), palette.bold(decoded));
    }

    if let Some(tree) = &run.tree {
        println!("\n{}", palette.paint("━━━ Tree ━━━", ansi::GRAY));
        for line in tree.lines() {
            println!("  {line}");
        }
    }

    for (selector, items) in &run.queries {
        println!("\n{}", palette.paint(format!("━━━ Query {selector} ━━━"), ansi::GRAY));
        if items.is_empty() {
            println!("{}", palette.dim("  No matches"));
        }
        for (idx, item) in items.iter().enumerate() {
            println!("  {} {}", palette.paint(format!("[{idx}]"), ansi::GRAY), palette.paint(item, ansi::BLUE));
        }
    }

    println!("\n{}", palette.paint("━━━ Timing ━━━", ansi::GRAY));
    let pool = run.metrics.pool;
    println!(
        "  Total: {}  │  Groupings: {} new, {} reused  │  Retired: {}",
        palette.paint(format!("{:?}", run.metrics.duration), ansi::GREEN),
        palette.paint(pool.allocated.to_string(), ansi::YELLOW),
        palette.paint(pool.reused.to_string(), ansi::YELLOW),
        palette.dim(pool.retired.to_string()),
    );
    println!();
}

/// First line of `input`, shortened to 60 characters.
fn preview(input: &str) -> String {
    let line = input.lines().next().unwrap_or_default();
    let mut out: String = line.chars().take(60).collect();
    if out.len() < input.len() {
        out.push('…');
    }
    out
}
