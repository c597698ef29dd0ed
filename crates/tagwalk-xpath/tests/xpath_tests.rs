//! Integration tests for XPath evaluation over parsed HTML.

use tagwalk_dom::{Document, NodeKind};
use tagwalk_xpath::{
    MAX_EXPRESSION_DEPTH, Query, QueryResult, ResultKind, XPathError, XPathExt, XPathNode,
    evaluate, evaluate_at,
};

const DEMO: &str = "<html><body some_attr='b'><div id='boo'>hey<span class='boo'>some span text</span></div></body></html>";

const LISTS: &str = "<ul><li>a</li><li>b</li><li>c</li></ul><ul><li>d</li><li>e</li></ul>";

/// Helper to parse a document, panicking on failure.
fn doc(html: &str) -> Document {
    tagwalk_html::parse(html).expect("document should parse")
}

/// Helper to evaluate and return the node-set as tag names.
fn names(doc: &Document, expr: &str) -> Vec<String> {
    evaluate(doc, expr)
        .expect("query should evaluate")
        .nodes()
        .expect("query should return a node-set")
        .iter()
        .map(|n| n.name(doc).to_string())
        .collect()
}

/// Helper to evaluate and return each node's string-value.
fn texts(doc: &Document, expr: &str) -> Vec<String> {
    evaluate(doc, expr)
        .expect("query should evaluate")
        .nodes()
        .expect("query should return a node-set")
        .iter()
        .map(|n| n.string_value(doc))
        .collect()
}

fn number(doc: &Document, expr: &str) -> f64 {
    evaluate(doc, expr)
        .expect("query should evaluate")
        .number()
        .expect("query should return a number")
}

fn string(doc: &Document, expr: &str) -> String {
    evaluate(doc, expr)
        .expect("query should evaluate")
        .string()
        .expect("query should return a string")
        .to_string()
}

fn boolean(doc: &Document, expr: &str) -> bool {
    evaluate(doc, expr)
        .expect("query should evaluate")
        .boolean()
        .expect("query should return a boolean")
}

fn assert_number(actual: f64, expected: f64) {
    assert!(
        (actual - expected).abs() < f64::EPSILON,
        "expected {expected}, got {actual}"
    );
}

// ========== Result kinds ==========

#[test]
fn test_count_divs() {
    let with_two = doc(&DEMO.replace("</body>", "<div>bah</div></body>"));
    assert_number(number(&with_two, "count(//div)"), 2.0);
    assert_number(number(&doc(DEMO), "count(//div)"), 1.0);
}

#[test]
fn test_compiled_query_is_reusable() {
    let query = Query::compile("count(//div)").expect("compile");
    let document = doc("<div></div><div><div></div></div>");
    for _ in 0..3 {
        assert_eq!(query.evaluate(&document), Ok(QueryResult::Number(3.0)));
    }
    assert_eq!(query.to_string(), "count(//div)");
    assert_eq!("count(//div)".parse::<Query>(), Ok(query));
}

#[test]
fn test_string_of_first_child_element() {
    assert_eq!(string(&doc(DEMO), "string(//div/*)"), "some span text");
    assert_eq!(
        string(&doc("<div>hey<span>txt</span></div>"), "string(//div/*)"),
        "txt"
    );
}

#[test]
fn test_string_of_empty_node_set_is_empty() {
    let document = doc(DEMO);
    assert_eq!(string(&document, "string(//table)"), "");
    assert!(number(&document, "number(//table)").is_nan());
}

#[test]
fn test_accessor_type_mismatch() {
    let result = evaluate(&doc(DEMO), "count(//div)").expect("evaluate");
    assert_eq!(
        result.string(),
        Err(XPathError::TypeMismatch {
            expected: ResultKind::String,
            found: ResultKind::Number,
        })
    );
    assert_eq!(result.kind(), ResultKind::Number);
    assert_eq!(result.to_string_value(&doc(DEMO)), "1");
}

#[test]
fn test_booleans() {
    let document = doc(DEMO);
    assert!(boolean(&document, "boolean(//span)"));
    assert!(!boolean(&document, "not(//span)"));
    assert!(boolean(&document, "true() and not(false())"));
    assert!(boolean(&document, "//table or 1"));
}

// ========== Paths and predicates ==========

#[test]
fn test_child_and_descendant_paths() {
    let document = doc(DEMO);
    assert_eq!(names(&document, "/html/body/div"), ["div"]);
    assert_eq!(names(&document, "/html//span"), ["span"]);
    assert!(names(&document, "/body").is_empty());
    assert_eq!(names(&document, "//*"), ["html", "body", "div", "span"]);
}

#[test]
fn test_root_path_selects_document_node() {
    let document = doc(DEMO);
    let result = evaluate(&document, "/").expect("evaluate");
    let nodes = result.nodes().expect("node-set");
    assert_eq!(nodes, [XPathNode::Node(document.document_node())]);
    assert_eq!(document.kind(nodes[0].id()), NodeKind::Document);
}

#[test]
fn test_positional_predicates() {
    let document = doc(LISTS);
    assert_eq!(texts(&document, "//li[2]"), ["b", "e"]);
    assert_eq!(texts(&document, "//li[last()]"), ["c", "e"]);
    assert_eq!(texts(&document, "(//li)[2]"), ["b"]);
    assert_eq!(texts(&document, "(//li)[last()]"), ["e"]);
    assert_eq!(texts(&document, "//ul[1]/li[position() < 3]"), ["a", "b"]);
}

#[test]
fn test_boolean_predicates() {
    let document = doc(LISTS);
    assert_eq!(texts(&document, "//li[. = 'd']"), ["d"]);
    assert_eq!(texts(&document, "//ul[count(li) = 2]/li"), ["d", "e"]);
    assert_eq!(texts(&document, "//li[. = 'b' or . = 'e']"), ["b", "e"]);
}

#[test]
fn test_filter_expression_then_path() {
    let document = doc(LISTS);
    assert_eq!(texts(&document, "(//ul)[2]/li"), ["d", "e"]);
    assert_eq!(texts(&document, "(//ul)[1]//text()"), ["a", "b", "c"]);
}

#[test]
fn test_union_is_in_document_order_without_duplicates() {
    let document = doc(LISTS);
    assert_eq!(texts(&document, "//li[3] | //li[1] | //li[1]"), ["a", "c", "d"]);
}

// ========== Attributes ==========

#[test]
fn test_attribute_axis() {
    let document = doc(DEMO);
    assert_eq!(string(&document, "string(//div/@id)"), "boo");
    assert_eq!(names(&document, "//*[@class = 'boo']"), ["span"]);
    assert_eq!(names(&document, "//*[@id]"), ["div"]);
    assert_eq!(names(&document, "//@*"), ["some_attr", "id", "class"]);
    assert_eq!(names(&document, "//span/@class/.."), ["span"]);
}

#[test]
fn test_attributes_follow_their_owner() {
    let document = doc(DEMO);
    let result = evaluate(&document, "//div | //div/@id | //span").expect("evaluate");
    let nodes = result.nodes().expect("node-set");
    assert_eq!(nodes.len(), 3);
    assert!(!nodes[0].is_attribute());
    assert!(nodes[1].is_attribute());
    assert_eq!(nodes[1].id(), nodes[0].id());
    assert_eq!(nodes[2].name(&document), "span");
}

// ========== Axes ==========

#[test]
fn test_parent_and_ancestor_axes() {
    let document = doc(DEMO);
    assert_eq!(names(&document, "//span/.."), ["div"]);
    assert_eq!(names(&document, "//span/parent::div"), ["div"]);
    assert_eq!(names(&document, "//span/ancestor::*"), ["html", "body", "div"]);
    assert_eq!(names(&document, "//span/ancestor::*[1]"), ["div"]);
    assert_eq!(
        names(&document, "//span/ancestor-or-self::*[2]"),
        ["div"]
    );
    assert_eq!(names(&document, "//span/@class/ancestor::*[1]"), ["span"]);
    assert_eq!(names(&document, "//span/@class/ancestor::*[last()]"), ["html"]);
}

#[test]
fn test_sibling_axes() {
    let document = doc(LISTS);
    assert_eq!(texts(&document, "//li[1]/following-sibling::li"), ["b", "c", "e"]);
    assert_eq!(texts(&document, "//ul[1]/li[3]/preceding-sibling::li[1]"), ["b"]);
    assert_eq!(texts(&document, "//ul[1]/li[3]/preceding-sibling::li"), ["a", "b"]);
}

#[test]
fn test_following_and_preceding_axes() {
    let document = doc(LISTS);
    assert_eq!(texts(&document, "(//li)[3]/following::li"), ["d", "e"]);
    assert_eq!(texts(&document, "(//li)[4]/preceding::li[1]"), ["c"]);
    assert_eq!(names(&document, "//ul[2]/preceding::ul/li").len(), 3);
}

#[test]
fn test_self_and_descendant_or_self() {
    let document = doc(DEMO);
    assert_eq!(names(&document, "//div/self::div"), ["div"]);
    assert!(names(&document, "//div/self::span").is_empty());
    assert_eq!(names(&document, "//div/descendant-or-self::*"), ["div", "span"]);
}

#[test]
fn test_node_type_tests() {
    let document = doc("<p>a<!--c-->b<i>d</i></p>");
    assert_eq!(texts(&document, "//p/text()"), ["a", "b"]);
    assert_eq!(texts(&document, "//comment()"), ["c"]);
    assert_eq!(
        evaluate(&document, "count(//p/node())").expect("evaluate"),
        QueryResult::Number(4.0)
    );
}

#[test]
fn test_evaluate_at_context_node() {
    let document = doc(DEMO);
    let span = evaluate(&document, "//span")
        .expect("evaluate")
        .nodes()
        .expect("node-set")[0]
        .id();
    let result = evaluate_at(&document, span, "..").expect("evaluate");
    assert_eq!(result.nodes().expect("node-set")[0].name(&document), "div");
    let result = evaluate_at(&document, span, "string(@class)").expect("evaluate");
    assert_eq!(result.string(), Ok("boo"));
}

// ========== Functions ==========

#[test]
fn test_string_functions() {
    let document = doc(DEMO);
    assert_eq!(string(&document, "concat('a', //div/@id, 1)"), "aboo1");
    assert!(boolean(&document, "contains(//span, 'span')"));
    assert!(boolean(&document, "starts-with(//div, 'hey')"));
    assert_eq!(string(&document, "normalize-space('  a \n b  ')"), "a b");
    assert_number(number(&document, "string-length(//span)"), 14.0);
    assert_eq!(string(&document, "name(//*[@id])"), "div");
    assert_eq!(string(&document, "local-name(//span/@class)"), "class");
    assert_eq!(string(&document, "name(//table)"), "");
}

#[test]
fn test_number_functions() {
    let document = doc("<p>1</p><p>2.5</p><p>x</p>");
    assert_number(number(&document, "sum(//p[position() < 3])"), 3.5);
    assert!(number(&document, "sum(//p)").is_nan());
    assert_number(number(&document, "floor(2.7)"), 2.0);
    assert_number(number(&document, "ceiling(2.1)"), 3.0);
    assert_number(number(&document, "round(2.5)"), 3.0);
    assert_number(number(&document, "round(-2.5)"), -2.0);
    assert_number(number(&document, "number('  12 ')"), 12.0);
}

#[test]
fn test_arithmetic() {
    let document = doc(DEMO);
    assert_number(number(&document, "1 + 2 * 3"), 7.0);
    assert_number(number(&document, "7 mod 3"), 1.0);
    assert_number(number(&document, "-7 mod 3"), -1.0);
    assert_number(number(&document, "9 div 2"), 4.5);
    assert_number(number(&document, "-(1 - 3)"), 2.0);
    assert_eq!(
        evaluate(&document, "1 div 0").expect("evaluate").to_string_value(&document),
        "Infinity"
    );
}

#[test]
fn test_comparisons() {
    let document = doc(LISTS);
    assert!(boolean(&document, "//li = 'b'"));
    assert!(boolean(&document, "//li != 'b'"));
    assert!(!boolean(&document, "//li = 'z'"));
    assert!(boolean(&document, "count(//li) > 4"));
    assert!(boolean(&document, "'b' = //li"));
    assert!(boolean(&document, "//ul[1]/li = //li[. = 'c']"));
    assert!(boolean(&document, "1 = '1.0'"));
    assert!(boolean(&document, "true() = 'x'"));
    assert!(!boolean(&document, "2 < 1"));
}

// ========== Errors ==========

#[test]
fn test_syntax_errors() {
    let document = doc(DEMO);
    assert!(matches!(
        evaluate(&document, "//div["),
        Err(XPathError::Syntax { position: 6, .. })
    ));
    assert!(matches!(
        Query::compile("//div)"),
        Err(XPathError::Syntax { position: 5, .. })
    ));
    assert!(matches!(
        Query::compile("'unterminated"),
        Err(XPathError::Syntax { position: 0, .. })
    ));
}

#[test]
fn test_deeply_nested_expressions_are_syntax_errors() {
    let document = doc(DEMO);
    let too_deep = |result: Result<QueryResult, XPathError>| {
        matches!(result, Err(XPathError::Syntax { ref message, .. })
            if message == "expression nested too deeply")
    };

    assert!(too_deep(evaluate(&document, &"(".repeat(1_000))));
    let balanced = format!("{}1{}", "(".repeat(200_000), ")".repeat(200_000));
    assert!(too_deep(evaluate(&document, &balanced)));
    assert!(too_deep(evaluate(
        &document,
        &format!("{}1", "-".repeat(100_000))
    )));
    assert!(too_deep(evaluate(&document, &"//div[".repeat(1_000))));
    assert!(too_deep(evaluate(&document, &format!("1{}", " or 1".repeat(10_000)))));

    let shallow = format!(
        "{}1{}",
        "(".repeat(MAX_EXPRESSION_DEPTH),
        ")".repeat(MAX_EXPRESSION_DEPTH)
    );
    assert_number(number(&document, &shallow), 1.0);
}

#[test]
fn test_evaluation_errors() {
    let document = doc(DEMO);
    for expr in [
        "frobnicate()",
        "count(1)",
        "count()",
        "true(1)",
        "concat('a')",
        "(1)/div",
        "1 | //div",
        "sum('x')",
    ] {
        assert!(
            matches!(evaluate(&document, expr), Err(XPathError::Evaluation { .. })),
            "expected an evaluation error for {expr}"
        );
    }
}

#[test]
fn test_xpath_extension_trait() {
    let document = doc(DEMO);
    assert_eq!(
        document.xpath("count(//span)"),
        Ok(QueryResult::Number(1.0))
    );
}
