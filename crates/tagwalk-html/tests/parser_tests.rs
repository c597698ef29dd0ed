//! Integration tests for the HTML tree builder and the parse entry points.

use std::num::NonZeroUsize;

use quickcheck_macros::quickcheck;
use tagwalk_dom::{Document, NodeId, NodeKind};
use tagwalk_html::{Engine, ParseError, ParseOptions, Token, build, parse, parse_with, tokenize};

/// Helper to parse HTML that is expected to succeed.
fn parse_ok(html: &str) -> Document {
    parse(html).expect("parse failed")
}

/// Helper to collect the children of a node via `children` + `next`.
fn children(doc: &Document, id: NodeId) -> Vec<NodeId> {
    let mut out = Vec::new();
    let mut current = doc.children(id);
    while let Some(child) = current {
        out.push(child);
        current = doc.next(child);
    }
    out
}

/// Helper to get the tag names of a node's element children.
fn child_names(doc: &Document, id: NodeId) -> Vec<String> {
    children(doc, id)
        .into_iter()
        .filter(|&c| doc.kind(c) == NodeKind::Element)
        .map(|c| doc.name(c).to_string())
        .collect()
}

/// Helper to find the first element with a tag name, in document order.
fn find_element(doc: &Document, tag: &str) -> Option<NodeId> {
    doc.descendants(doc.document_node())
        .find(|&id| doc.name(id) == tag)
}

fn messages(doc: &Document) -> Vec<&str> {
    doc.diagnostics().iter().map(|d| d.message.as_str()).collect()
}

// ========== structure ==========

#[test]
fn test_nested_round_trip() {
    let doc = parse_ok("<a><b>x</b></a>");
    let a = doc.root();
    assert_eq!(doc.name(a), "a");
    assert_eq!(doc.kind(a), NodeKind::Element);

    let kids = children(&doc, a);
    assert_eq!(kids.len(), 1);
    let b = kids[0];
    assert_eq!(doc.name(b), "b");

    let text = children(&doc, b);
    assert_eq!(text.len(), 1);
    assert_eq!(doc.kind(text[0]), NodeKind::Text);
    assert_eq!(doc.text(text[0]), "x");
    assert_eq!(doc.parent(a), Some(doc.document_node()));
}

#[test]
fn test_end_tag_closes_inner_elements() {
    let doc = parse_ok("<div><span></div>");
    let div = doc.root();
    assert_eq!(doc.name(div), "div");
    assert_eq!(child_names(&doc, div), ["span"]);
    let span = children(&doc, div)[0];
    assert_eq!(doc.children(span), None);
    assert_eq!(doc.next(div), None);
    assert_eq!(
        messages(&doc),
        ["implicitly closing <span> before </div>"]
    );
}

#[test]
fn test_stray_end_tag_is_ignored() {
    let doc = parse_ok("<p>a</span>b</p>");
    let p = doc.root();
    assert_eq!(doc.text_content(p), "ab");
    assert_eq!(children(&doc, p).len(), 2);
    assert_eq!(messages(&doc), ["stray end tag </span> ignored"]);
}

#[test]
fn test_void_elements_are_not_pushed() {
    let doc = parse_ok("<p>a<br>b<img src=x>c</p>");
    let p = doc.root();
    let kids = children(&doc, p);
    assert_eq!(kids.len(), 5);
    assert_eq!(doc.name(kids[1]), "br");
    assert_eq!(doc.name(kids[3]), "img");
    assert_eq!(doc.attribute(kids[3], "src"), Some("x"));
    assert_eq!(doc.children(kids[1]), None);
}

#[test]
fn test_void_end_tag_is_ignored() {
    let doc = parse_ok("<div><br></br>x</div>");
    let div = doc.root();
    assert_eq!(child_names(&doc, div), ["br"]);
    assert_eq!(messages(&doc), ["end tag for void element </br> ignored"]);
}

#[test]
fn test_self_closing_non_void_is_not_pushed() {
    let doc = parse_ok("<div><x-icon/>text</div>");
    let div = doc.root();
    let kids = children(&doc, div);
    assert_eq!(kids.len(), 2);
    assert_eq!(doc.name(kids[0]), "x-icon");
    assert_eq!(doc.text(kids[1]), "text");
}

#[test]
fn test_paragraphs_auto_close() {
    let doc = parse_ok("<body><p>one<p>two<div>three</div></body>");
    let body = doc.root();
    assert_eq!(child_names(&doc, body), ["p", "p", "div"]);
    assert!(doc.diagnostics().is_empty());
}

#[test]
fn test_list_items_auto_close() {
    let doc = parse_ok("<ul><li>a<li>b<li>c</ul>");
    let ul = doc.root();
    assert_eq!(child_names(&doc, ul), ["li", "li", "li"]);
}

#[test]
fn test_table_cells_auto_close() {
    let doc = parse_ok("<table><tr><td>1<td>2<tr><td>3</table>");
    let table = doc.root();
    let rows = children(&doc, table);
    assert_eq!(rows.len(), 2);
    assert_eq!(child_names(&doc, rows[0]), ["td", "td"]);
    assert_eq!(child_names(&doc, rows[1]), ["td"]);
}

#[test]
fn test_unclosed_elements_at_end_of_input() {
    let doc = parse_ok("<div><span>text");
    let div = doc.root();
    assert_eq!(child_names(&doc, div), ["span"]);
    assert_eq!(
        messages(&doc),
        ["unclosed <span> at end of input", "unclosed <div> at end of input"]
    );
}

#[test]
fn test_script_content_stays_text() {
    let doc = parse_ok("<div><script>if (a<b) {}</script></div>");
    let script = find_element(&doc, "script").unwrap();
    let text = doc.children(script).unwrap();
    assert_eq!(doc.text(text), "if (a<b) {}");
}

#[test]
fn test_comments_and_doctype() {
    let doc = parse_ok("<!DOCTYPE html><!-- top --><html><!--in--></html>");
    assert_eq!(doc.doctype(), Some("html"));
    let top = children(&doc, doc.document_node());
    assert_eq!(top.len(), 2);
    assert_eq!(doc.kind(top[0]), NodeKind::Comment);
    assert_eq!(doc.comment(top[0]), Some(" top "));
    assert_eq!(doc.root(), top[1]);
    let inner = doc.children(top[1]).unwrap();
    assert_eq!(doc.comment(inner), Some("in"));
}

#[test]
fn test_misplaced_doctype_is_ignored() {
    let doc = parse_ok("<p>x</p><!DOCTYPE html>");
    assert_eq!(doc.doctype(), None);
    assert_eq!(messages(&doc), ["misplaced DOCTYPE ignored"]);
}

#[test]
fn test_text_only_document() {
    let doc = parse_ok("just text");
    let root = doc.root();
    assert_eq!(doc.kind(root), NodeKind::Text);
    assert_eq!(doc.text(root), "just text");
}

#[test]
fn test_attribute_lookup() {
    let doc = parse_ok("<div id='boo'>x</div>");
    let div = doc.root();
    assert_eq!(doc.attribute(div, "id"), Some("boo"));
    assert_eq!(doc.attribute(div, "missing"), None);
}

#[test]
fn test_unterminated_tag_becomes_text() {
    let doc = parse_ok("<p>hello <b");
    let p = doc.root();
    let kids = children(&doc, p);
    assert_eq!(kids.len(), 1);
    assert_eq!(doc.text(kids[0]), "hello <b");
    assert!(messages(&doc).contains(&"unterminated tag treated as text"));
}

#[test]
fn test_top_level_siblings_in_source_order() {
    let doc = parse_ok("<a></a>text<b></b><!--c--><c/>");
    let names: Vec<NodeKind> = children(&doc, doc.document_node())
        .into_iter()
        .map(|id| doc.kind(id))
        .collect();
    assert_eq!(
        names,
        [
            NodeKind::Element,
            NodeKind::Text,
            NodeKind::Element,
            NodeKind::Comment,
            NodeKind::Element,
        ]
    );
}

// ========== errors ==========

#[test]
fn test_empty_input_is_empty_document() {
    assert!(matches!(parse(""), Err(ParseError::EmptyDocument)));
}

#[test]
fn test_only_stray_end_tags_is_empty_document() {
    assert!(matches!(parse("</p></div>"), Err(ParseError::EmptyDocument)));
}

#[test]
fn test_blank_input_stripped_is_empty_document() {
    let options = ParseOptions::new().with_strip_blank_text_nodes(true);
    assert!(matches!(
        parse_with(" \n\t ", &options),
        Err(ParseError::EmptyDocument)
    ));
    assert!(parse(" \n\t ").is_ok());
}

#[test]
fn test_nesting_too_deep() {
    let options = ParseOptions::new().with_max_depth(NonZeroUsize::new(3).unwrap());
    assert!(parse_with("<a><b><c></c></b></a>", &options).is_ok());

    let err = parse_with("<a><b><c><d></d></c></b></a>", &options).unwrap_err();
    match err {
        ParseError::NestingTooDeep { limit, offset } => {
            assert_eq!(limit, 3);
            assert_eq!(offset, 9);
        }
        other => panic!("expected NestingTooDeep, got {other:?}"),
    }
}

#[test]
fn test_default_depth_limit_stops_runaway_nesting() {
    let html = "<div>".repeat(10_000);
    assert!(matches!(
        parse(&html),
        Err(ParseError::NestingTooDeep { limit: 256, .. })
    ));
}

#[test]
fn test_void_elements_do_not_count_toward_depth() {
    let options = ParseOptions::new().with_max_depth(NonZeroUsize::new(1).unwrap());
    assert!(parse_with("<p><br><br><img></p>", &options).is_ok());
}

// ========== options ==========

#[test]
fn test_strip_blank_text_nodes() {
    let html = "<ul>\n  <li>a</li>\n  <li> </li>\n</ul>";
    let kept = parse_ok(html);
    assert_eq!(children(&kept, kept.root()).len(), 5);

    let options = ParseOptions::new().with_strip_blank_text_nodes(true);
    let stripped = parse_with(html, &options).unwrap();
    let ul = stripped.root();
    assert_eq!(children(&stripped, ul).len(), 2);
    let second_li = children(&stripped, ul)[1];
    assert_eq!(stripped.children(second_li), None);
}

#[test]
fn test_compact_text_merges_adjacent_runs() {
    let html = "<p>a</em>b</p>";
    let loose = parse_ok(html);
    assert_eq!(children(&loose, loose.root()).len(), 2);

    let options = ParseOptions::new().with_compact_text(true);
    let compact = parse_with(html, &options).unwrap();
    let kids = children(&compact, compact.root());
    assert_eq!(kids.len(), 1);
    assert_eq!(compact.text(kids[0]), "ab");
}

#[test]
fn test_comments_are_never_merged() {
    let options = ParseOptions::new().with_compact_text(true);
    let doc = parse_with("<p>a<!--x-->b</p>", &options).unwrap();
    assert_eq!(children(&doc, doc.root()).len(), 3);
}

#[test]
fn test_suppress_diagnostics() {
    let html = "<div><span></div></p>";
    assert!(!parse_ok(html).diagnostics().is_empty());

    let options = ParseOptions::new().with_suppress_diagnostics(true);
    assert!(parse_with(html, &options).unwrap().diagnostics().is_empty());
}

// ========== engine ==========

#[test]
fn test_engine_parses_bytes_with_meta_charset() {
    let bytes = b"<html><head><meta charset=\"windows-1252\"></head><body>caf\xE9</body></html>";
    let doc = Engine::default().parse_bytes(bytes).unwrap();
    assert_eq!(doc.encoding(), "windows-1252");
    assert_eq!(doc.meta_encoding(), Some("windows-1252"));
    let body = find_element(&doc, "body").unwrap();
    assert_eq!(doc.text_content(body), "caf\u{e9}");
}

#[test]
fn test_engine_declared_encoding() {
    let engine = Engine::new(ParseOptions::new().with_encoding("iso-8859-1"));
    let doc = engine.parse_bytes(b"<p>\xE9t\xE9</p>").unwrap();
    assert_eq!(doc.text_content(doc.root()), "\u{e9}t\u{e9}");
}

#[test]
fn test_engine_unknown_encoding() {
    let engine = Engine::new(ParseOptions::new().with_encoding("klingon"));
    assert!(matches!(
        engine.parse_bytes(b"<p>x</p>"),
        Err(ParseError::Encoding(_))
    ));
}

#[test]
fn test_engine_reports_malformed_bytes() {
    let doc = Engine::default().parse_bytes(b"<p>\xFF</p>").unwrap();
    assert_eq!(doc.encoding(), "UTF-8");
    assert_eq!(doc.text_content(doc.root()), "\u{FFFD}");
    assert_eq!(doc.diagnostics().len(), 1);
}

#[test]
fn test_engine_missing_file() {
    let err = Engine::default()
        .parse_file("/definitely/not/here.html")
        .unwrap_err();
    assert!(matches!(err, ParseError::Io { .. }));
    assert!(err.to_string().contains("/definitely/not/here.html"));
}

#[test]
fn test_engine_reads_file() {
    let path = std::env::temp_dir().join(format!("tagwalk-engine-{}.html", std::process::id()));
    std::fs::write(&path, "<div id='boo'>hey</div>").unwrap();
    let doc = Engine::default().parse_file(&path).unwrap();
    std::fs::remove_file(&path).unwrap();
    assert_eq!(doc.attribute(doc.root(), "id"), Some("boo"));
}

// ========== token streams ==========

#[test]
fn test_build_from_tokenizer_output_matches_parse() {
    let html = "<ul><li>a<li>b</ul><!--end-->";
    let built = build(tokenize(html), &ParseOptions::new()).expect("build failed");
    let parsed = parse_ok(html);

    assert_eq!(built.len(), parsed.len());
    let ul = built.root();
    assert_eq!(child_names(&built, ul), ["li", "li"]);
    assert_eq!(built.text_content(ul), "ab");
}

#[test]
fn test_build_reports_token_offsets() {
    let tokens = [
        Token::start_tag("p", vec![], false),
        Token::text("x"),
        Token::end_tag("b"),
        Token::end_tag("p"),
    ];
    let doc = build(tokens, &ParseOptions::new()).expect("build failed");
    let diagnostics = doc.diagnostics();
    assert_eq!(diagnostics.len(), 1);
    assert_eq!(diagnostics[0].message, "stray end tag </b> ignored");
    assert_eq!(diagnostics[0].offset, 2);
}

#[test]
fn test_build_without_nodes_is_empty_document() {
    let tokens = [Token::end_tag("div")];
    assert!(matches!(
        build(tokens, &ParseOptions::new()),
        Err(ParseError::EmptyDocument)
    ));
}

// ========== properties ==========

/// N well-formed top-level elements come back as N siblings in order.
#[quickcheck]
fn prop_top_level_elements_are_siblings_in_order(tags: Vec<u8>) -> bool {
    const NAMES: [&str; 6] = ["div", "p", "span", "section", "em", "x-item"];
    if tags.is_empty() {
        return true;
    }
    let names: Vec<&str> = tags
        .iter()
        .map(|&t| NAMES[usize::from(t) % NAMES.len()])
        .collect();
    let html: String = names
        .iter()
        .enumerate()
        .map(|(i, name)| format!("<{name} data-i=\"{i}\">{i}</{name}>"))
        .collect();

    let Ok(doc) = parse(&html) else {
        return false;
    };
    let top = children(&doc, doc.document_node());
    top.len() == names.len()
        && top.iter().enumerate().all(|(i, &id)| {
            doc.name(id) == names[i] && doc.attribute(id, "data-i") == Some(i.to_string().as_str())
        })
}
