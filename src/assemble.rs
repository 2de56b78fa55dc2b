use std::sync::LazyLock;

use scraper::{ElementRef, Html, Selector};
use tracing::debug;

use crate::convert::{self, ClassifierConfig};
use crate::dom;
use crate::lang::Oracle;

pub const DEFAULT_TITLE: &str = "未找到标题";
pub const DEFAULT_AUTHOR: &str = "未找到作者";

static TITLE: LazyLock<Selector> = LazyLock::new(|| Selector::parse("#activity-name").unwrap());
static AUTHOR: LazyLock<Selector> = LazyLock::new(|| Selector::parse("#js_name").unwrap());
static CONTENT_ROOT: LazyLock<Selector> =
    LazyLock::new(|| Selector::parse("#js_content, .rich_media_content").unwrap());

/// Locate the article body container.
pub fn find_content_root(doc: &Html) -> Option<ElementRef<'_>> {
    doc.select(&CONTENT_ROOT).next()
}

pub fn page_title(doc: &Html) -> String {
    text_or(doc, &TITLE, DEFAULT_TITLE)
}

pub fn page_author(doc: &Html) -> String {
    text_or(doc, &AUTHOR, DEFAULT_AUTHOR)
}

fn text_or(doc: &Html, sel: &Selector, default: &str) -> String {
    doc.select(sel)
        .next()
        .map(dom::trimmed_text)
        .filter(|t| !t.is_empty())
        .unwrap_or_else(|| default.to_string())
}

/// Build the full Markdown document: title, byline, separator, converted
/// body. `None` only when no content root can be located — the one
/// externally visible failure of the whole conversion.
pub fn assemble(doc: &Html, oracle: &Oracle, cfg: &ClassifierConfig) -> Option<String> {
    let root = find_content_root(doc)?;
    let title = page_title(doc);
    let author = page_author(doc);
    debug!("Converting article: {}", title);

    let body = convert::convert_subtree(root, oracle, cfg);
    Some(format!("# {}\n\n作者: {}\n\n---\n\n{}", title, author, body))
}

// ── Tests ──

#[cfg(test)]
mod tests {
    use super::*;

    fn assemble_str(html: &str) -> Option<String> {
        let doc = Html::parse_document(html);
        assemble(&doc, &Oracle::offline(), &ClassifierConfig::default())
    }

    #[test]
    fn missing_content_root_yields_none() {
        assert!(assemble_str("<html><body><div>nothing here</div></body></html>").is_none());
    }

    #[test]
    fn missing_title_and_author_use_placeholders() {
        let out = assemble_str("<html><body><div id='js_content'><p>hi</p></div></body></html>")
            .unwrap();
        assert!(out.starts_with("# 未找到标题\n\n作者: 未找到作者\n\n---\n\nhi\n\n"));
    }

    #[test]
    fn document_shape() {
        let out = assemble_str(
            "<html><body>\
             <h1 id='activity-name'> 深入理解 Rust </h1>\
             <span id='js_name'> 木偶 </span>\
             <div id='js_content'><h2>第一节</h2><p>正文</p></div>\
             </body></html>",
        )
        .unwrap();
        assert_eq!(
            out,
            "# 深入理解 Rust\n\n作者: 木偶\n\n---\n\n## 第一节\n\n正文\n\n"
        );
    }

    #[test]
    fn rich_media_content_class_accepted_as_root() {
        let out = assemble_str(
            "<html><body><div class='rich_media_content'><p>body</p></div></body></html>",
        )
        .unwrap();
        assert!(out.contains("body\n\n"));
    }

    #[test]
    fn fixture_article_end_to_end() {
        let html = std::fs::read_to_string("tests/fixtures/article.html").unwrap();
        let out = assemble_str(&html).unwrap();

        assert!(out.starts_with("# Rust 异步编程入门\n\n作者: 编程随想\n\n---\n\n"));
        assert!(out.contains("## 什么是 async\n\n"));
        assert!(out.contains("- 零成本抽象\n- 内存安全\n\n"));
        assert!(out.contains("```python\ndef main():"));
        assert!(out.contains("> 引用"));
        assert!(out.contains("![图片](https://mmbiz.qpic.cn/demo.png)\n\n"));
        // Blank-line normalization holds for the assembled document body.
        assert!(!out["# Rust 异步编程入门\n\n".len()..].contains("\n\n\n"));
    }
}
