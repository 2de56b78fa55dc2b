use std::sync::LazyLock;

use scraper::{ElementRef, Selector};

use crate::dom::{self, Style};

static CODE_DESCENDANT: LazyLock<Selector> = LazyLock::new(|| Selector::parse("code").unwrap());
static QUOTE_INFO: LazyLock<Selector> =
    LazyLock::new(|| Selector::parse(".blockquote_info").unwrap());

/// Class names rich-text editors put on code snippets.
const CODE_CLASSES: &[&str] = &["code-snippet", "code_snippet", "highlight", "prism"];
/// Class prefixes that declare a language ("language-rust", "lang-js").
const LANG_CLASS_PREFIXES: &[&str] = &["language-", "lang-"];
/// Attributes that declare a snippet language outright.
const LANG_ATTRS: &[&str] = &["data-lang", "data-language"];
const MONOSPACE_FAMILIES: &[&str] = &["monospace", "courier", "consolas", "menlo", "monaco"];
/// Classes WeChat puts on quote wrappers.
const QUOTE_CLASSES: &[&str] = &["blockquote_info", "js_blockquote_wrap"];
const CODE_PUNCT: &[char] = &['{', '}', '(', ')', '[', ']', ';', '='];

/// Heuristic thresholds. The "correct" values are a judgment call against
/// unseen markup, so every bound is a field rather than an inline literal.
#[derive(Debug, Clone)]
pub struct ClassifierConfig {
    /// An element exceeding this in both rendered dimensions is a layout
    /// wrapper, never a code block. Default 500.
    pub layout_min_px: f32,
    /// Upper bound (chars, exclusive) on text length for the
    /// background-only code signal. Default 5000.
    pub code_text_max: usize,
    /// Upper bound (chars, exclusive) on text length for quote detection.
    /// Default 2000.
    pub quote_text_max: usize,
    /// Maximum nesting depth from the conversion root at which quote
    /// detection is honored. Default 1.
    pub quote_max_depth: usize,
}

impl Default for ClassifierConfig {
    fn default() -> Self {
        Self {
            layout_min_px: 500.0,
            code_text_max: 5000,
            quote_text_max: 2000,
            quote_max_depth: 1,
        }
    }
}

/// Role assigned to a node before descending further. Code and quote
/// verdicts convert the subtree wholesale.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Verdict {
    Code,
    Quote,
    Structural,
}

/// Classify one node. Code wins over quote; quote is honored only at
/// shallow depth.
pub fn classify(el: ElementRef, depth: usize, cfg: &ClassifierConfig) -> Verdict {
    if is_code_block(el, cfg) {
        Verdict::Code
    } else if depth <= cfg.quote_max_depth && is_quote_block(el, cfg) {
        Verdict::Quote
    } else {
        Verdict::Structural
    }
}

/// The single container holding the full article body.
pub fn is_content_root(el: ElementRef) -> bool {
    el.value().id() == Some("js_content") || dom::has_class(el, "rich_media_content")
}

/// Pure predicate: does this element hold code? Rules fire in order; the
/// rejections come first so an accept signal on a huge wrapper never wins.
pub fn is_code_block(el: ElementRef, cfg: &ClassifierConfig) -> bool {
    // Large in both rendered dimensions: a layout wrapper, not code.
    let (w, h) = dom::rendered_size(el);
    if w.is_some_and(|w| w > cfg.layout_min_px) && h.is_some_and(|h| h > cfg.layout_min_px) {
        return false;
    }

    if is_content_root(el) {
        return false;
    }

    let element = el.value();
    let declared_lang = LANG_ATTRS.iter().any(|a| element.attr(a).is_some());

    if element.name() == "pre"
        || CODE_CLASSES.iter().any(|c| dom::has_class(el, c))
        || el.select(&CODE_DESCENDANT).next().is_some()
        || element
            .classes()
            .any(|c| LANG_CLASS_PREFIXES.iter().any(|p| c.starts_with(p)))
        || declared_lang
        || dom::parent_element(el).is_some_and(|p| p.value().name() == "pre")
    {
        return true;
    }

    let style = Style::of(el);
    let family = style.font_family();
    let monospace = MONOSPACE_FAMILIES.iter().any(|f| family.contains(f));
    let distinct_bg = style.has_distinct_background();

    let text = dom::trimmed_text(el);
    let punct = has_code_punct(&text);
    let len = text.chars().count();
    let reasonable_size = len > 0 && len < cfg.code_text_max;

    (monospace && (distinct_bg || declared_lang || punct))
        || (distinct_bg && reasonable_size && punct)
}

/// Pure predicate: does this element look like a quote? The length bound
/// keeps large styled containers from reading as one giant quote.
pub fn is_quote_block(el: ElementRef, cfg: &ClassifierConfig) -> bool {
    let style = Style::of(el);
    let quote_signal = style.has_distinct_background()
        || style.has_solid_left_border()
        || QUOTE_CLASSES.iter().any(|c| dom::has_class(el, c))
        || el.select(&QUOTE_INFO).next().is_some()
        || el.value().name() == "blockquote";

    quote_signal && dom::trimmed_text(el).chars().count() < cfg.quote_text_max
}

fn has_code_punct(text: &str) -> bool {
    text.contains(CODE_PUNCT)
}

// ── Tests ──

#[cfg(test)]
mod tests {
    use super::*;
    use scraper::Html;

    fn check<F: FnOnce(ElementRef, &ClassifierConfig)>(html: &str, sel: &str, f: F) {
        let doc = Html::parse_fragment(html);
        let selector = Selector::parse(sel).unwrap();
        let el = doc.select(&selector).next().unwrap();
        f(el, &ClassifierConfig::default());
    }

    #[test]
    fn pre_is_code() {
        check("<pre>x = 1</pre>", "pre", |el, cfg| {
            assert!(is_code_block(el, cfg));
        });
    }

    #[test]
    fn snippet_class_is_code() {
        check("<section class='code-snippet'>x</section>", "section", |el, cfg| {
            assert!(is_code_block(el, cfg));
        });
    }

    #[test]
    fn language_class_prefix_is_code() {
        check("<div class='language-rust'>fn main() {}</div>", "div", |el, cfg| {
            assert!(is_code_block(el, cfg));
        });
    }

    #[test]
    fn declared_lang_attr_is_code() {
        check("<div data-lang='python'>print(1)</div>", "div", |el, cfg| {
            assert!(is_code_block(el, cfg));
        });
    }

    #[test]
    fn monospace_with_background_is_code() {
        check(
            "<span style='font-family: Consolas; background-color: #f6f8fa'>let x = 1;</span>",
            "span",
            |el, cfg| assert!(is_code_block(el, cfg)),
        );
    }

    #[test]
    fn background_with_punct_is_code() {
        check(
            "<div style='background-color: #282c34'>if (a == b) { return; }</div>",
            "div",
            |el, cfg| assert!(is_code_block(el, cfg)),
        );
    }

    #[test]
    fn background_without_punct_is_not_code() {
        check(
            "<div style='background-color: #282c34'>just prose here</div>",
            "div",
            |el, cfg| assert!(!is_code_block(el, cfg)),
        );
    }

    #[test]
    fn plain_paragraph_is_not_code() {
        check("<p>Hello world</p>", "p", |el, cfg| {
            assert!(!is_code_block(el, cfg));
        });
    }

    #[test]
    fn large_wrapper_never_code() {
        // Monospace, dark background, punctuation: everything says code,
        // but the rendered size says layout wrapper.
        check(
            "<div style='width: 600px; height: 600px; font-family: monospace; \
             background-color: #222'>x = 1;</div>",
            "div",
            |el, cfg| assert!(!is_code_block(el, cfg)),
        );
    }

    #[test]
    fn size_threshold_is_exclusive() {
        // Exactly at the threshold in both dimensions: not "exceeding", so
        // the rejection must not fire.
        check(
            "<div style='width: 500px; height: 500px; font-family: monospace; \
             background-color: #222'>x = 1;</div>",
            "div",
            |el, cfg| assert!(is_code_block(el, cfg)),
        );
    }

    #[test]
    fn large_in_one_dimension_only_still_code() {
        check(
            "<pre style='width: 900px; height: 120px'>x = 1;</pre>",
            "pre",
            |el, cfg| assert!(is_code_block(el, cfg)),
        );
    }

    #[test]
    fn content_root_never_code() {
        check(
            "<div id='js_content' style='font-family: monospace; background: #eee'>{};</div>",
            "div",
            |el, cfg| assert!(!is_code_block(el, cfg)),
        );
        check(
            "<div class='rich_media_content'><code>x</code></div>",
            "div",
            |el, cfg| assert!(!is_code_block(el, cfg)),
        );
    }

    #[test]
    fn blockquote_tag_is_quote() {
        check("<blockquote>wisdom</blockquote>", "blockquote", |el, cfg| {
            assert!(is_quote_block(el, cfg));
        });
    }

    #[test]
    fn left_border_is_quote() {
        check(
            "<section style='border-left: 4px solid #ddd'>aside</section>",
            "section",
            |el, cfg| assert!(is_quote_block(el, cfg)),
        );
    }

    #[test]
    fn quote_info_descendant_is_quote() {
        check(
            "<section><span class='blockquote_info'>src</span> text</section>",
            "section",
            |el, cfg| assert!(is_quote_block(el, cfg)),
        );
    }

    #[test]
    fn oversized_quote_rejected() {
        let long = "x".repeat(2000);
        let html = format!("<blockquote>{}</blockquote>", long);
        check(&html, "blockquote", |el, cfg| {
            assert!(!is_quote_block(el, cfg));
        });
    }

    #[test]
    fn quote_bound_is_exclusive() {
        let just_under = "x".repeat(1999);
        let html = format!("<blockquote>{}</blockquote>", just_under);
        check(&html, "blockquote", |el, cfg| {
            assert!(is_quote_block(el, cfg));
        });
    }

    #[test]
    fn code_wins_over_quote() {
        // Distinct background plus punctuation satisfies both predicates;
        // classification must pick code.
        check(
            "<pre style='background-color: #f0f0f0'>a = [1];</pre>",
            "pre",
            |el, cfg| {
                assert!(is_code_block(el, cfg));
                assert!(is_quote_block(el, cfg));
                assert_eq!(classify(el, 0, cfg), Verdict::Code);
            },
        );
    }

    #[test]
    fn quote_depth_gating() {
        check("<blockquote>wisdom</blockquote>", "blockquote", |el, cfg| {
            assert_eq!(classify(el, 1, cfg), Verdict::Quote);
            assert_eq!(classify(el, 2, cfg), Verdict::Structural);
        });
    }
}
