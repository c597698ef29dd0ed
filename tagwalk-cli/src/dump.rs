//! Text and JSON renderings of a parsed document and its query results.

use serde::Serialize;
use serde::ser::Serializer;
use serde_json::Value;
use tagwalk_common::Diagnostic;
use tagwalk_dom::{Attributes, Document, NodeData, NodeId};
use tagwalk_xpath::{Query, QueryResult, XPathError, format_number};

/// Print `root()` and its following siblings, each followed by its subtree
/// indented by depth.
pub fn print_tree(doc: &Document) {
    let mut current = Some(doc.root());
    while let Some(id) = current {
        print_node(doc, id, 0);
        current = doc.next(id);
    }
}

fn print_node(doc: &Document, id: NodeId, depth: usize) {
    println!("{}{}", "  ".repeat(depth), node_line(doc, id));
    for child in doc.child_nodes(id) {
        print_node(doc, child, depth + 1);
    }
}

/// One node's name, kind, own text and attributes.
fn node_line(doc: &Document, id: NodeId) -> String {
    format!(
        "NODE > {} TYPE > {} TEXT > {} ATTRS > {}",
        doc.name(id),
        doc.kind(id),
        doc.text(id),
        doc.attributes(id)
    )
}

/// Run each query and print its result. Node-sets list every node's text
/// before the result's string-value.
pub fn print_queries(doc: &Document, queries: &[Query]) {
    for query in queries {
        println!("XPATH > {query}");
        match query.evaluate(doc) {
            Ok(result) => {
                if let Ok(nodes) = result.nodes() {
                    for node in nodes {
                        println!("node text: {}", node.string_value(doc));
                    }
                }
                println!("{}", result.to_string_value(doc));
            }
            Err(err) => println!("error: {err}"),
        }
    }
}

// ========== JSON ==========

/// A parsed document with its tree, query results and diagnostics.
#[derive(Serialize)]
pub struct JsonDocument<'a> {
    source: &'a str,
    encoding: &'static str,
    #[serde(skip_serializing_if = "Option::is_none")]
    doctype: Option<&'a str>,
    tree: JsonNode<'a>,
    queries: Vec<JsonQuery<'a>>,
    diagnostics: Vec<JsonDiagnostic<'a>>,
}

impl<'a> JsonDocument<'a> {
    /// Evaluate `queries` and capture everything about `doc`.
    pub fn new(source: &'a str, doc: &'a Document, queries: &'a [Query]) -> Self {
        Self {
            source,
            encoding: doc.encoding(),
            doctype: doc.doctype(),
            tree: JsonNode::new(doc, doc.document_node()),
            queries: queries
                .iter()
                .map(|q| JsonQuery::new(doc, q.source(), q.evaluate(doc)))
                .collect(),
            diagnostics: doc.diagnostics().iter().map(JsonDiagnostic::from).collect(),
        }
    }
}

/// A document that failed to parse.
#[derive(Serialize)]
pub struct JsonFailure<'a> {
    /// Where the input came from.
    pub source: &'a str,
    /// The parse error.
    pub error: String,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct JsonNode<'a> {
    #[serde(rename = "type")]
    kind: &'static str,
    #[serde(skip_serializing_if = "Option::is_none")]
    tag_name: Option<&'a str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    attributes: Option<JsonAttributes<'a>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    content: Option<&'a str>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    children: Vec<JsonNode<'a>>,
}

impl<'a> JsonNode<'a> {
    fn new(doc: &'a Document, id: NodeId) -> Self {
        let (tag_name, attributes, content) = match doc.get(id).map(|n| &n.data) {
            Some(NodeData::Element(element)) => (
                Some(element.tag_name.as_str()),
                Some(JsonAttributes(&element.attrs)),
                None,
            ),
            Some(NodeData::Text(s) | NodeData::Comment(s)) => (None, None, Some(s.as_str())),
            Some(NodeData::Document) | None => (None, None, None),
        };
        Self {
            kind: doc.kind(id).into(),
            tag_name,
            attributes,
            content,
            children: doc
                .child_nodes(id)
                .map(|child| Self::new(doc, child))
                .collect(),
        }
    }
}

/// Attributes as a JSON object in source order.
struct JsonAttributes<'a>(&'a Attributes);

impl Serialize for JsonAttributes<'_> {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_map(self.0.iter().map(|a| (&a.name, &a.value)))
    }
}

#[derive(Serialize)]
struct JsonQuery<'a> {
    expr: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    kind: Option<&'static str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    value: Option<Value>,
    #[serde(skip_serializing_if = "Option::is_none")]
    error: Option<String>,
}

impl<'a> JsonQuery<'a> {
    fn new(doc: &Document, expr: &'a str, result: Result<QueryResult, XPathError>) -> Self {
        match result {
            Ok(result) => Self {
                expr,
                kind: Some(result.kind().into()),
                value: Some(json_value(doc, &result)),
                error: None,
            },
            Err(err) => Self {
                expr,
                kind: None,
                value: None,
                error: Some(err.to_string()),
            },
        }
    }
}

/// Node-sets become arrays of string-values. Non-finite numbers use their
/// `XPath` spelling since JSON has no literal for them.
fn json_value(doc: &Document, result: &QueryResult) -> Value {
    match result {
        QueryResult::NodeSet(nodes) => nodes
            .iter()
            .map(|n| Value::from(n.string_value(doc)))
            .collect(),
        QueryResult::Boolean(b) => Value::from(*b),
        QueryResult::Number(n) if n.is_finite() => Value::from(*n),
        QueryResult::Number(n) => Value::from(format_number(*n)),
        QueryResult::String(s) => Value::from(s.as_str()),
    }
}

#[derive(Serialize)]
struct JsonDiagnostic<'a> {
    severity: String,
    message: &'a str,
    offset: usize,
}

impl<'a> From<&'a Diagnostic> for JsonDiagnostic<'a> {
    fn from(diagnostic: &'a Diagnostic) -> Self {
        Self {
            severity: diagnostic.severity.to_string(),
            message: &diagnostic.message,
            offset: diagnostic.offset,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn node_line_shows_only_own_text() {
        let doc = tagwalk_html::parse("<div id='boo'>hey<span>txt</span></div>").expect("parse");
        let div = doc.root();
        assert_eq!(
            node_line(&doc, div),
            r#"NODE > div TYPE > element TEXT >  ATTRS > {id: "boo"}"#
        );
        let text = doc.children(div).expect("div has children");
        assert_eq!(
            node_line(&doc, text),
            "NODE >  TYPE > text TEXT > hey ATTRS > {}"
        );
    }

    #[test]
    fn json_tree_keeps_attribute_order() {
        let doc = tagwalk_html::parse("<a z='1' b='2'>x</a>").expect("parse");
        let queries = [Query::compile("count(//a)").expect("compile")];
        let json = serde_json::to_value(JsonDocument::new("test", &doc, &queries))
            .expect("serialize");

        let element = &json["tree"]["children"][0];
        assert_eq!(element["type"], "element");
        assert_eq!(element["tagName"], "a");
        assert_eq!(element["children"][0]["content"], "x");
        let text = serde_json::to_string(&element["attributes"]).expect("serialize");
        assert_eq!(text, r#"{"z":"1","b":"2"}"#);

        assert_eq!(json["queries"][0]["kind"], "number");
        assert_eq!(json["queries"][0]["value"], 1.0);
    }

    #[test]
    fn json_query_errors_and_special_numbers() {
        let doc = tagwalk_html::parse("<p>1</p>").expect("parse");
        let queries = [
            Query::compile("count(1)").expect("compile"),
            Query::compile("1 div 0").expect("compile"),
            Query::compile("//p").expect("compile"),
        ];
        let json = serde_json::to_value(JsonDocument::new("test", &doc, &queries))
            .expect("serialize");

        assert!(json["queries"][0]["error"].is_string());
        assert_eq!(json["queries"][1]["value"], "Infinity");
        assert_eq!(json["queries"][2]["value"], serde_json::json!(["1"]));
    }
}
