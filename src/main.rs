mod report;

use clap::{Args, Parser, Subcommand};
use quarry::grammars::{expr, html, json};
use quarry::{Ast, GrammarError, Scanner, Trace};
use std::io::{self, IsTerminal, Read};
use std::path::Path;
use std::process::ExitCode;
use tracing_subscriber::EnvFilter;

const POOL_SIZE: usize = 256;

#[derive(Parser)]
#[command(name = "quarry", version)]
#[command(about = "Parse text with the bundled grammars and query the trees")]
struct Cli {
    /// Force ANSI color output.
    #[arg(long, global = true, overrides_with = "no_color")]
    color: bool,
    /// Disable ANSI color output.
    #[arg(long, global = true)]
    no_color: bool,
    /// Log every combinator step (target `quarry::ast`).
    #[arg(long, global = true)]
    trace: bool,
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Evaluate an integer arithmetic expression.
    Expr {
        /// Expression text, a file path, or `-` for stdin.
        input: String,
    },
    /// Parse a JSON document and print it back compactly.
    Json(TreeArgs),
    /// Parse a small HTML document.
    Html(TreeArgs),
}

#[derive(Args)]
struct TreeArgs {
    /// Document text, a file path, or `-` for stdin.
    input: String,
    /// Selector to run against the tree; may be repeated.
    #[arg(short, long = "query", value_name = "SELECTOR")]
    queries: Vec<String>,
    /// Print the tree.
    #[arg(long)]
    render: bool,
    /// Print the tree as Graphviz dot, and nothing else.
    #[arg(long)]
    dot: bool,
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    init_tracing(cli.trace);
    let color = if cli.no_color { false } else { cli.color || io::stdout().is_terminal() };
    let trace = if cli.trace { Trace::COMBINATORS | Trace::QUERY } else { Trace::from_env() };

    let outcome = match &cli.command {
        Command::Expr { input } => load(input).map(|text| run_expr(&text, color)),
        Command::Json(args) => load(&args.input).and_then(|text| run_tree(Grammar::Json, &text, args, color, trace)),
        Command::Html(args) => load(&args.input).and_then(|text| run_tree(Grammar::Html, &text, args, color, trace)),
    };
    match outcome {
        Ok(true) => ExitCode::SUCCESS,
        Ok(false) => ExitCode::from(1),
        Err(err) => {
            eprintln!("error: {err}");
            ExitCode::from(2)
        }
    }
}

fn init_tracing(verbose: bool) {
    let fallback = if verbose { "quarry=debug" } else { "warn" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(fallback));
    tracing_subscriber::fmt().with_env_filter(filter).with_writer(io::stderr).init();
}

/// `-` reads stdin, an existing path reads the file, anything else is the
/// text itself.
fn load(input: &str) -> Result<String, String> {
    if input == "-" {
        let mut buffer = String::new();
        io::stdin().read_to_string(&mut buffer).map_err(|err| format!("failed to read stdin: {err}"))?;
        return Ok(buffer);
    }
    let path = Path::new(input);
    if path.is_file() {
        return std::fs::read_to_string(path).map_err(|err| format!("failed to read {}: {err}", path.display()));
    }
    Ok(input.to_string())
}

fn run_expr(text: &str, color: bool) -> bool {
    let value = expr::evaluate(text);
    report::print_expr(text, value, color);
    value.is_some()
}

#[derive(Clone, Copy)]
enum Grammar {
    Json,
    Html,
}

fn run_tree(grammar: Grammar, text: &str, args: &TreeArgs, color: bool, trace: Trace) -> Result<bool, String> {
    let build: fn(&Ast) -> Result<quarry::Parser, GrammarError> = match grammar {
        Grammar::Json => json::grammar,
        Grammar::Html => html::grammar,
    };
    let name = match grammar {
        Grammar::Json => "json",
        Grammar::Html => "html",
    };
    let mut ast = Ast::new(name, POOL_SIZE);
    ast.set_trace(trace);
    let root = build(&ast).map_err(|err| err.to_string())?;

    let source = text.trim();
    let (node, rest, metrics) = ast.parse_with_metrics(&root, Scanner::new(source).track_lineno());
    let complete = node.is_some() && rest.at_end();
    let decoded = match grammar {
        Grammar::Json => node.and_then(json::decode).map(|v| v.to_string()),
        Grammar::Html => None,
    };

    if args.dot {
        print!("{}", ast.export_graph(name));
        return Ok(complete);
    }

    let mut run = report::TreeRun {
        input: source,
        complete,
        stopped_at: (rest.lineno(), rest.cursor()),
        decoded,
        tree: args.render.then(|| ast.render()),
        queries: Vec::with_capacity(args.queries.len()),
        metrics,
    };
    let mut found_all = true;
    for selector in &args.queries {
        let matches = ast.query(selector).map_err(|err| err.to_string())?;
        let items: Vec<String> = matches.map(|n| format!("{} {}", n.name(), n.value())).collect();
        found_all &= !items.is_empty();
        run.queries.push((selector.clone(), items));
    }
    report::print_tree_run(&run, color);
    Ok(complete && found_all)
}
