//! tagwalk CLI
//!
//! Parses HTML from a file or a string, prints the node tree and runs
//! `XPath` queries against it. With no input it runs a few built-in demo
//! documents.

mod dump;

use std::num::NonZeroUsize;
use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Parser;
use tagwalk_common::diagnostics::report;
use tagwalk_dom::Document;
use tagwalk_html::{Engine, ParseError, ParseOptions};
use tagwalk_xpath::Query;

use dump::{JsonDocument, JsonFailure};

const DEMO_DOCUMENTS: [&str; 3] = [
    "<html><body some_attr='b'><div id='boo'>hey<span class='boo'>some span text</span></div></body></html>",
    "<html><body some_attr='b'><div id='boo'>hey<span class='boo'>some span text</span></div><div>bah</div></body></html>",
    "",
];

const DEFAULT_QUERY: &str = "string(//div/*)";

/// tagwalk: permissive HTML parsing with XPath queries
#[derive(Parser, Debug)]
#[command(name = "tagwalk")]
#[command(author, version, about, long_about = None)]
#[command(after_help = r#"EXAMPLES:
    # Run the built-in demo documents
    tagwalk

    # Parse a file and dump its tree
    tagwalk ./index.html

    # Parse inline HTML and run several queries
    tagwalk --html '<ul><li>a</li><li>b</li></ul>' -x 'count(//li)' -x '//li[2]'

    # Emit the tree and query results as JSON
    tagwalk --json ./index.html
"#)]
struct Cli {
    /// Path to an HTML file
    #[arg(value_name = "FILE", conflicts_with = "html")]
    path: Option<PathBuf>,

    /// Parse this HTML string instead of a file
    #[arg(long, value_name = "HTML")]
    html: Option<String>,

    /// XPath expression to evaluate; repeat for several (default: string(//div/*))
    #[arg(short = 'x', long = "xpath", value_name = "EXPR")]
    queries: Vec<String>,

    /// Drop text nodes that are only whitespace
    #[arg(long)]
    strip_blanks: bool,

    /// Merge adjacent text into one node
    #[arg(long)]
    compact: bool,

    /// Do not collect or print parse diagnostics
    #[arg(short, long)]
    quiet: bool,

    /// Maximum element nesting depth (default: 256)
    #[arg(long, value_name = "N")]
    max_depth: Option<NonZeroUsize>,

    /// Encoding of the input file, overriding BOM and <meta> detection
    #[arg(long, value_name = "LABEL")]
    encoding: Option<String>,

    /// Print JSON instead of the text dump
    #[arg(long)]
    json: bool,
}

impl Cli {
    fn options(&self) -> ParseOptions {
        let mut options = ParseOptions::new()
            .with_strip_blank_text_nodes(self.strip_blanks)
            .with_compact_text(self.compact)
            .with_suppress_diagnostics(self.quiet);
        if let Some(depth) = self.max_depth {
            options = options.with_max_depth(depth);
        }
        if let Some(label) = &self.encoding {
            options = options.with_encoding(label.clone());
        }
        options
    }

    fn queries(&self) -> Result<Vec<Query>> {
        let expressions = if self.queries.is_empty() {
            vec![DEFAULT_QUERY.to_string()]
        } else {
            self.queries.clone()
        };
        expressions
            .iter()
            .map(|expr| {
                Query::compile(expr).with_context(|| format!("invalid XPath expression {expr:?}"))
            })
            .collect()
    }

    /// Print one parsed document in the selected format.
    fn show(&self, source: &str, doc: &Document, queries: &[Query]) -> Result<()> {
        if !self.quiet {
            for diagnostic in doc.diagnostics() {
                report("parser", diagnostic);
            }
        }

        if self.json {
            let json = JsonDocument::new(source, doc, queries);
            println!("{}", serde_json::to_string_pretty(&json)?);
        } else {
            println!("=== {source} ===");
            dump::print_tree(doc);
            dump::print_queries(doc, queries);
        }
        Ok(())
    }

    /// Print a document that failed to parse.
    fn show_failure(&self, source: &str, err: &ParseError) -> Result<()> {
        if self.json {
            let json = JsonFailure {
                source,
                error: err.to_string(),
            };
            println!("{}", serde_json::to_string_pretty(&json)?);
        } else {
            println!("=== {source} ===");
            println!("error: {err}");
        }
        Ok(())
    }
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    let engine = Engine::new(cli.options());
    let queries = cli.queries()?;

    if let Some(html) = &cli.html {
        let doc = engine
            .parse_str(html)
            .context("failed to parse --html input")?;
        cli.show("--html", &doc, &queries)
    } else if let Some(path) = &cli.path {
        let doc = engine
            .parse_file(path)
            .with_context(|| format!("failed to parse {}", path.display()))?;
        cli.show(&path.display().to_string(), &doc, &queries)
    } else {
        for (index, html) in DEMO_DOCUMENTS.iter().enumerate() {
            let source = format!("demo {}", index + 1);
            match engine.parse_str(html) {
                Ok(doc) => cli.show(&source, &doc, &queries)?,
                Err(err) => cli.show_failure(&source, &err)?,
            }
        }
        Ok(())
    }
}
