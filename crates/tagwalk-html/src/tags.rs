//! Per-element parsing rules.
//!
//! The table answers the questions the tokenizer and tree builder need to
//! ask about a tag name: can it have an end tag, how is its content
//! tokenized, and which start tags implicitly close it.

use std::collections::HashMap;
use std::sync::LazyLock;

use strum_macros::{Display, IntoStaticStr};

/// Whether an element's end tag may be left out.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Display, IntoStaticStr)]
#[strum(serialize_all = "kebab-case")]
pub enum EndTag {
    /// The end tag must be present.
    Required,
    /// The end tag may be implied by context (`<p>`, `<li>`, `<td>`, ...).
    Optional,
    /// The element is void: it never has content or an end tag.
    Forbidden,
}

/// How the tokenizer treats an element's content.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Display, IntoStaticStr)]
#[strum(serialize_all = "kebab-case")]
pub enum ContentModel {
    /// Regular markup.
    Normal,
    /// Text up to the matching end tag, character references left alone.
    RawText,
    /// Text up to the matching end tag, character references decoded.
    EscapableRawText,
}

/// What the parser knows about one HTML element.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TagInfo {
    /// Lowercase tag name.
    pub name: &'static str,
    /// End tag requirement.
    pub end_tag: EndTag,
    /// How content is tokenized.
    pub content: ContentModel,
}

impl TagInfo {
    /// True if the element can never have children.
    #[must_use]
    pub const fn is_void(&self) -> bool {
        matches!(self.end_tag, EndTag::Forbidden)
    }
}

const fn element(name: &'static str) -> TagInfo {
    TagInfo {
        name,
        end_tag: EndTag::Required,
        content: ContentModel::Normal,
    }
}

const fn optional_end(name: &'static str) -> TagInfo {
    TagInfo {
        name,
        end_tag: EndTag::Optional,
        content: ContentModel::Normal,
    }
}

const fn void(name: &'static str) -> TagInfo {
    TagInfo {
        name,
        end_tag: EndTag::Forbidden,
        content: ContentModel::Normal,
    }
}

const fn text_only(name: &'static str, content: ContentModel) -> TagInfo {
    TagInfo {
        name,
        end_tag: EndTag::Required,
        content,
    }
}

const TAGS: &[TagInfo] = &[
    // Document structure
    optional_end("html"),
    optional_end("head"),
    optional_end("body"),
    text_only("title", ContentModel::EscapableRawText),
    void("base"),
    void("link"),
    void("meta"),
    text_only("style", ContentModel::RawText),
    text_only("script", ContentModel::RawText),
    element("noscript"),
    // Sections and grouping
    element("address"),
    element("article"),
    element("aside"),
    element("blockquote"),
    element("details"),
    element("dialog"),
    element("div"),
    element("fieldset"),
    element("figcaption"),
    element("figure"),
    element("footer"),
    element("form"),
    element("h1"),
    element("h2"),
    element("h3"),
    element("h4"),
    element("h5"),
    element("h6"),
    element("header"),
    element("hgroup"),
    element("main"),
    element("menu"),
    element("nav"),
    element("pre"),
    element("section"),
    element("summary"),
    optional_end("p"),
    void("hr"),
    // Lists
    element("ul"),
    element("ol"),
    element("dl"),
    optional_end("li"),
    optional_end("dt"),
    optional_end("dd"),
    // Tables
    element("table"),
    element("caption"),
    optional_end("colgroup"),
    void("col"),
    optional_end("thead"),
    optional_end("tbody"),
    optional_end("tfoot"),
    optional_end("tr"),
    optional_end("td"),
    optional_end("th"),
    // Forms
    element("select"),
    optional_end("optgroup"),
    optional_end("option"),
    element("button"),
    element("label"),
    void("input"),
    text_only("textarea", ContentModel::EscapableRawText),
    // Phrasing
    element("a"),
    element("abbr"),
    element("b"),
    element("bdi"),
    element("bdo"),
    element("cite"),
    element("code"),
    element("data"),
    element("dfn"),
    element("em"),
    element("i"),
    element("kbd"),
    element("mark"),
    element("q"),
    optional_end("rp"),
    optional_end("rt"),
    element("ruby"),
    element("s"),
    element("samp"),
    element("small"),
    element("span"),
    element("strong"),
    element("sub"),
    element("sup"),
    element("time"),
    element("u"),
    element("var"),
    void("br"),
    void("wbr"),
    // Embedded content
    void("area"),
    void("embed"),
    void("img"),
    void("param"),
    void("source"),
    void("track"),
    text_only("iframe", ContentModel::RawText),
    element("object"),
    element("video"),
    element("audio"),
    element("canvas"),
    // Legacy
    void("basefont"),
    void("frame"),
    element("frameset"),
    text_only("xmp", ContentModel::RawText),
    text_only("noembed", ContentModel::RawText),
    text_only("noframes", ContentModel::RawText),
    element("font"),
    element("center"),
];

static BY_NAME: LazyLock<HashMap<&'static str, &'static TagInfo>> =
    LazyLock::new(|| TAGS.iter().map(|info| (info.name, info)).collect());

/// Look up the parsing rules for a lowercase tag name.
///
/// # Examples
///
/// ```
/// use tagwalk_html::tags::{tag_info, EndTag};
///
/// assert!(tag_info("br").is_some_and(|t| t.is_void()));
/// assert_eq!(tag_info("li").map(|t| t.end_tag), Some(EndTag::Optional));
/// assert!(tag_info("x-widget").is_none());
/// ```
#[must_use]
pub fn tag_info(name: &str) -> Option<&'static TagInfo> {
    BY_NAME.get(name).copied()
}

/// True if `name` is a void element.
#[must_use]
pub fn is_void(name: &str) -> bool {
    tag_info(name).is_some_and(TagInfo::is_void)
}

/// How the content of `name` is tokenized. Unknown tags are [`ContentModel::Normal`].
#[must_use]
pub fn content_model(name: &str) -> ContentModel {
    tag_info(name).map_or(ContentModel::Normal, |info| info.content)
}

/// True if a `<tag>` start tag implicitly closes an open `<open>` element.
#[must_use]
pub fn auto_closes(open: &str, tag: &str) -> bool {
    match open {
        "p" => matches!(
            tag,
            "p" | "address"
                | "article"
                | "aside"
                | "blockquote"
                | "details"
                | "dialog"
                | "div"
                | "dl"
                | "fieldset"
                | "figcaption"
                | "figure"
                | "footer"
                | "form"
                | "h1"
                | "h2"
                | "h3"
                | "h4"
                | "h5"
                | "h6"
                | "header"
                | "hgroup"
                | "hr"
                | "main"
                | "menu"
                | "nav"
                | "ol"
                | "pre"
                | "section"
                | "summary"
                | "table"
                | "ul"
        ),
        "li" => tag == "li",
        "dt" | "dd" => matches!(tag, "dt" | "dd"),
        "tr" => matches!(tag, "tr" | "thead" | "tbody" | "tfoot"),
        "td" | "th" => matches!(tag, "td" | "th" | "tr" | "thead" | "tbody" | "tfoot"),
        "thead" | "tbody" | "tfoot" => matches!(tag, "thead" | "tbody" | "tfoot"),
        "option" => matches!(tag, "option" | "optgroup"),
        "optgroup" => tag == "optgroup",
        "colgroup" => matches!(tag, "colgroup" | "thead" | "tbody" | "tfoot" | "tr"),
        "rt" | "rp" => matches!(tag, "rt" | "rp"),
        "head" => matches!(tag, "body" | "frameset"),
        _ => false,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn void_list() {
        for name in [
            "area", "base", "br", "col", "embed", "hr", "img", "input", "link", "meta", "param",
            "source", "track", "wbr", "basefont", "frame",
        ] {
            assert!(is_void(name), "{name} should be void");
        }
        assert!(!is_void("div"));
        assert!(!is_void("unknown"));
    }

    #[test]
    fn content_models() {
        assert_eq!(content_model("script"), ContentModel::RawText);
        assert_eq!(content_model("style"), ContentModel::RawText);
        assert_eq!(content_model("title"), ContentModel::EscapableRawText);
        assert_eq!(content_model("textarea"), ContentModel::EscapableRawText);
        assert_eq!(content_model("div"), ContentModel::Normal);
        assert_eq!(ContentModel::EscapableRawText.to_string(), "escapable-raw-text");
    }

    #[test]
    fn paragraph_closed_by_block_not_inline() {
        assert!(auto_closes("p", "div"));
        assert!(auto_closes("p", "p"));
        assert!(!auto_closes("p", "span"));
        assert!(!auto_closes("div", "div"));
    }

    #[test]
    fn table_cells() {
        assert!(auto_closes("td", "td"));
        assert!(auto_closes("td", "th"));
        assert!(auto_closes("td", "tr"));
        assert!(auto_closes("tr", "tr"));
        assert!(!auto_closes("tr", "td"));
    }
}
