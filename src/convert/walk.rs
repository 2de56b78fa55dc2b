use std::collections::HashSet;
use std::fmt::Write;
use std::sync::LazyLock;

use regex::Regex;
use ego_tree::NodeId;
use scraper::{ElementRef, Selector};

use crate::dom;
use crate::lang::Oracle;

use super::classify::{self, ClassifierConfig, Verdict};

static LIST_ITEMS: LazyLock<Selector> = LazyLock::new(|| Selector::parse("li").unwrap());
static EXCESS_BLANKS: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"\n{3,}").unwrap());

/// Element roles the converter dispatches on, resolved once per node from
/// the tag name. Closed set: anything unknown is `Other` and falls to the
/// generic text-or-recurse rule, so the walk always makes progress.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ElementKind {
    Heading(u8),
    Paragraph,
    Blockquote,
    BulletList,
    NumberedList,
    ListItem,
    Image,
    Preformatted,
    InlineCode,
    Link,
    Bold,
    Italic,
    LineBreak,
    Container,
    Other,
}

impl ElementKind {
    pub fn of(tag: &str) -> Self {
        match tag {
            "h1" => Self::Heading(1),
            "h2" => Self::Heading(2),
            "h3" => Self::Heading(3),
            "h4" => Self::Heading(4),
            "h5" => Self::Heading(5),
            "h6" => Self::Heading(6),
            "p" => Self::Paragraph,
            "blockquote" => Self::Blockquote,
            "ul" => Self::BulletList,
            "ol" => Self::NumberedList,
            "li" => Self::ListItem,
            "img" => Self::Image,
            "pre" => Self::Preformatted,
            "code" => Self::InlineCode,
            "a" => Self::Link,
            "strong" | "b" => Self::Bold,
            "em" | "i" => Self::Italic,
            "br" => Self::LineBreak,
            "div" | "section" => Self::Container,
            _ => Self::Other,
        }
    }

    fn is_inline_formatting(self) -> bool {
        matches!(self, Self::Bold | Self::Italic | Self::Link | Self::InlineCode)
    }
}

/// Recursive HTML → Markdown walk over one conversion root.
///
/// The visit set and nesting depth are carried explicitly, so independent
/// conversions share nothing. Every call path (direct recursion, the
/// list-item query, container fallbacks) funnels through the visited check
/// at the top of `visit` — the single de-duplication guard.
pub struct Walker<'a> {
    visited: HashSet<NodeId>,
    cfg: &'a ClassifierConfig,
    oracle: &'a Oracle,
}

impl<'a> Walker<'a> {
    pub fn new(cfg: &'a ClassifierConfig, oracle: &'a Oracle) -> Self {
        Self {
            visited: HashSet::new(),
            cfg,
            oracle,
        }
    }

    /// Convert the subtree under `root`, then collapse surplus blank
    /// lines.
    pub fn run(mut self, root: ElementRef) -> String {
        let out = self.visit(root, 0);
        collapse_blank_lines(&out)
    }

    fn visit(&mut self, el: ElementRef, depth: usize) -> String {
        if !self.visited.insert(el.id()) {
            return String::new();
        }

        let kind = ElementKind::of(el.value().name());

        // Hidden elements drop out of the walk; images stay because the
        // real source often sits in a lazy-load attribute.
        if kind != ElementKind::Image && dom::is_hidden(el) {
            return String::new();
        }

        // The article container itself is structural by definition.
        if classify::is_content_root(el) {
            return self.visit_children(el, depth + 1);
        }

        match classify::classify(el, depth, self.cfg) {
            Verdict::Code => return self.emit_code(el),
            Verdict::Quote => return emit_quote(el),
            Verdict::Structural => {}
        }

        match kind {
            ElementKind::Heading(level) => {
                format!("{} {}\n\n", "#".repeat(level as usize), dom::trimmed_text(el))
            }
            ElementKind::Paragraph => {
                let text = dom::trimmed_text(el);
                if text.is_empty() {
                    String::new()
                } else {
                    format!("{}\n\n", text)
                }
            }
            ElementKind::Blockquote => emit_quote(el),
            ElementKind::BulletList => self.emit_list(el, false),
            ElementKind::NumberedList => self.emit_list(el, true),
            ElementKind::ListItem => {
                // A stray item outside any list container gets a bullet of
                // its own; one inside a list belongs to the list emitter.
                let in_list = dom::parent_element(el)
                    .is_some_and(|p| matches!(p.value().name(), "ul" | "ol"));
                if in_list {
                    String::new()
                } else {
                    format!("- {}\n\n", dom::trimmed_text(el))
                }
            }
            ElementKind::Image => emit_image(el),
            ElementKind::Preformatted => self.emit_code(el),
            ElementKind::InlineCode => {
                let in_pre = dom::parent_element(el).is_some_and(|p| p.value().name() == "pre");
                if in_pre {
                    // Already covered by the ancestor's fence.
                    String::new()
                } else {
                    format!("`{}`", dom::trimmed_text(el))
                }
            }
            ElementKind::Link => {
                let text = dom::trimmed_text(el);
                match el.value().attr("href") {
                    Some(href) => format!("[{}]({})", text, href),
                    None => text,
                }
            }
            ElementKind::Bold => format!("**{}**", dom::trimmed_text(el)),
            ElementKind::Italic => format!("*{}*", dom::trimmed_text(el)),
            ElementKind::LineBreak => "\n".to_string(),
            ElementKind::Container => {
                let out = self.visit_children(el, depth + 1);
                if !out.is_empty() {
                    return out;
                }
                // Flat markup: text sits directly in the wrapper with no
                // semantic child to claim it. Emit as a paragraph unless an
                // inline-formatting child already had its chance.
                let text = dom::trimmed_text(el);
                let has_inline_child = dom::child_elements(el)
                    .any(|c| ElementKind::of(c.value().name()).is_inline_formatting());
                if !text.is_empty() && !has_inline_child {
                    format!("{}\n\n", text)
                } else {
                    out
                }
            }
            ElementKind::Other => {
                let text = dom::trimmed_text(el);
                if !text.is_empty() && dom::child_elements(el).next().is_none() {
                    format!("{}\n\n", text)
                } else {
                    self.visit_children(el, depth + 1)
                }
            }
        }
    }

    fn visit_children(&mut self, el: ElementRef, depth: usize) -> String {
        let mut out = String::new();
        for child in dom::child_elements(el) {
            out.push_str(&self.visit(child, depth));
        }
        out
    }

    /// Emit every descendant item of a list, marking each visited so a
    /// later pass over the same subtree cannot re-emit it.
    fn emit_list(&mut self, el: ElementRef, ordered: bool) -> String {
        let mut out = String::new();
        let mut n = 1;
        for item in el.select(&LIST_ITEMS) {
            if !self.visited.insert(item.id()) {
                continue;
            }
            let text = dom::trimmed_text(item);
            if ordered {
                let _ = writeln!(out, "{}. {}", n, text);
                n += 1;
            } else {
                let _ = writeln!(out, "- {}", text);
            }
        }
        out.push('\n');
        out
    }

    /// Fenced emission: whitespace-preserving text, fence tagged with the
    /// oracle's guess (possibly empty), blank line after.
    fn emit_code(&self, el: ElementRef) -> String {
        let raw = dom::flat_text(el);
        let code = raw.trim();
        if code.is_empty() {
            return String::new();
        }
        let tag = self.oracle.detect(code);
        format!("```{}\n{}\n```\n\n", tag, code)
    }
}

/// Quoted-line emission shared by the quote verdict and the explicit
/// blockquote tag.
fn emit_quote(el: ElementRef) -> String {
    let text = dom::trimmed_text(el);
    if text.is_empty() {
        return String::new();
    }
    let mut out = String::new();
    for line in text.lines() {
        let line = line.trim();
        if !line.is_empty() {
            let _ = writeln!(out, "> {}", line);
        }
    }
    out.push('\n');
    out
}

fn emit_image(el: ElementRef) -> String {
    let element = el.value();
    let src = element
        .attr("data-src")
        .or_else(|| element.attr("src"))
        .unwrap_or("");
    if src.is_empty() {
        return String::new();
    }
    let alt = element
        .attr("alt")
        .filter(|a| !a.trim().is_empty())
        .unwrap_or("图片");
    format!("![{}]({})\n\n", alt, src)
}

/// Collapse any run of three or more newlines down to one blank line.
pub fn collapse_blank_lines(s: &str) -> String {
    EXCESS_BLANKS.replace_all(s, "\n\n").into_owned()
}

// ── Tests ──
