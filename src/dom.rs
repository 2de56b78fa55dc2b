use std::collections::HashMap;

use scraper::ElementRef;

/// Background values that read as "no background" when deciding whether an
/// element is visually distinct.
const PLAIN_BACKGROUNDS: &[&str] = &[
    "transparent",
    "rgba(0, 0, 0, 0)",
    "rgba(0,0,0,0)",
    "rgb(255, 255, 255)",
    "rgb(255,255,255)",
    "#ffffff",
    "#fff",
    "white",
    "none",
];

/// Inline-style view of one element. Names and values are lowercased on
/// parse; the source tree is never touched.
pub struct Style {
    props: HashMap<String, String>,
}

impl Style {
    pub fn of(el: ElementRef) -> Self {
        Self::parse(el.value().attr("style").unwrap_or(""))
    }

    pub fn parse(raw: &str) -> Self {
        let mut props = HashMap::new();
        for decl in raw.split(';') {
            if let Some((name, value)) = decl.split_once(':') {
                props.insert(name.trim().to_lowercase(), value.trim().to_lowercase());
            }
        }
        Self { props }
    }

    pub fn get(&self, name: &str) -> Option<&str> {
        self.props.get(name).map(String::as_str)
    }

    pub fn font_family(&self) -> &str {
        self.get("font-family").unwrap_or("")
    }

    /// `background-color`, falling back to the `background` shorthand.
    pub fn background(&self) -> &str {
        self.get("background-color")
            .or_else(|| self.get("background"))
            .unwrap_or("")
    }

    pub fn has_distinct_background(&self) -> bool {
        let bg = self.background();
        !bg.is_empty() && !PLAIN_BACKGROUNDS.iter().any(|p| bg.starts_with(p))
    }

    pub fn has_solid_left_border(&self) -> bool {
        self.get("border-left").is_some_and(|b| b.contains("solid"))
            || self.get("border-left-style").is_some_and(|b| b.contains("solid"))
    }

    pub fn is_hidden(&self) -> bool {
        self.get("display").is_some_and(|d| d == "none")
            || self.get("visibility").is_some_and(|v| v == "hidden")
    }

    /// Pixel value of a style property ("300px" → 300.0).
    pub fn px(&self, name: &str) -> Option<f32> {
        self.get(name)?.strip_suffix("px")?.trim().parse().ok()
    }
}

/// Rendered (width, height) as far as static markup can tell: inline style
/// pixel values first, then width/height attributes. Elements stating
/// neither report `None` and count as small.
pub fn rendered_size(el: ElementRef) -> (Option<f32>, Option<f32>) {
    let style = Style::of(el);
    let attr_px = |name: &str| {
        el.value()
            .attr(name)
            .and_then(|v| v.trim().trim_end_matches("px").trim().parse::<f32>().ok())
    };
    (
        style.px("width").or_else(|| attr_px("width")),
        style.px("height").or_else(|| attr_px("height")),
    )
}

/// Element is out of layout flow: inline display/visibility or the
/// `hidden` attribute.
pub fn is_hidden(el: ElementRef) -> bool {
    el.value().attr("hidden").is_some() || Style::of(el).is_hidden()
}

/// Flattened text content, whitespace preserved as written.
pub fn flat_text(el: ElementRef) -> String {
    el.text().collect()
}

/// Flattened text with outer whitespace trimmed.
pub fn trimmed_text(el: ElementRef) -> String {
    flat_text(el).trim().to_string()
}

pub fn has_class(el: ElementRef, name: &str) -> bool {
    el.value().classes().any(|c| c.eq_ignore_ascii_case(name))
}

pub fn parent_element(el: ElementRef<'_>) -> Option<ElementRef<'_>> {
    el.parent().and_then(ElementRef::wrap)
}

/// Direct element children, in document order.
pub fn child_elements<'a>(el: ElementRef<'a>) -> impl Iterator<Item = ElementRef<'a>> {
    el.children().filter_map(ElementRef::wrap)
}

// ── Tests ──
