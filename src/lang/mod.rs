pub mod engine;

use std::sync::LazyLock;

use regex::Regex;

pub use engine::{Engine, EngineStatus, SignaturePack};

/// Minimum relevance an engine guess must reach before it is trusted over
/// the signature table.
pub const DEFAULT_CONFIDENCE_FLOOR: f64 = 0.5;

// Signature table, most specific first. A broad pattern like the
// script-style one would otherwise swallow C++ (`const`) or C# snippets.
static CFAMILY_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"#include\s*<|\busing\s+namespace\b|\bstd::").unwrap());
static CPP_HINT_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"\biostream\b|\bstd::|\busing\s+namespace\b|\bcout\b|\bcin\b|\bvector\b|template\s*<")
        .unwrap()
});
static CSHARP_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\busing\s+System\b|\bnamespace\s+[\w.]+\s*[;{]").unwrap());
static TS_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"\binterface\s+\w+\s*\{|\bnamespace\s+\w+|:\s*(?:string|number|boolean)\b|\btype\s+\w+\s*=")
        .unwrap()
});
static PY_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?m)\bdef\s+\w+\s*\(|\bfrom\s+\w+\s+import\b|__main__|^import\s+[a-z_][\w.]*\s*$")
        .unwrap()
});
static JAVA_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r"\bpublic\s+(?:static\s+)?(?:void|class|interface|enum)\b|\bprivate\b|\bprotected\b|@Override\b|\bpackage\s+[\w.]+;|\bimport\s+java[\w.]*;",
    )
    .unwrap()
});
static GO_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\bfunc\s+\w+|\bpackage\s+main\b|\bgo\s+func\b|:=").unwrap());
static JS_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r"\b(?:var|let|const|function)\b|=>|\bdocument\.|\bwindow\.|\bconsole\.|\bsetTimeout\b|\bsetInterval\b",
    )
    .unwrap()
});
static HTML_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)<!doctype\s+html|<(?:html|head|body|div|span|script|meta|link)\b|</\w+>")
        .unwrap()
});
static CSS_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?s)[\w.#-]+\s*\{[^{}]*[\w-]+\s*:\s*[^{};]+;[^{}]*\}").unwrap()
});
static SQL_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r"(?is)\b(?:select\s+.+?\s+from|insert\s+into|update\s+\w+\s+set|delete\s+from|create\s+(?:table|index|database)|alter\s+table|drop\s+(?:table|index|database)|group\s+by|order\s+by)\b",
    )
    .unwrap()
});
static SHELL_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?m)^#!|\$\{?\w+|\b(?:echo|grep|sed|awk|curl|chmod|sudo|apt-get|mkdir)\s")
        .unwrap()
});

/// Best-effort language detection: an optional external engine guarded by
/// a confidence floor, with the fixed signature table underneath. Total:
/// `detect` never panics and never errors.
pub struct Oracle {
    engine: Option<Engine>,
    confidence_floor: f64,
}

impl Oracle {
    /// Oracle with no engine: signature table only.
    pub fn offline() -> Self {
        Self {
            engine: None,
            confidence_floor: DEFAULT_CONFIDENCE_FLOOR,
        }
    }

    pub fn from_status(status: EngineStatus) -> Self {
        match status {
            EngineStatus::Ready(engine) => Self {
                engine: Some(engine),
                confidence_floor: DEFAULT_CONFIDENCE_FLOOR,
            },
            EngineStatus::Unavailable => Self::offline(),
        }
    }

    pub fn with_floor(mut self, floor: f64) -> Self {
        self.confidence_floor = floor;
        self
    }

    /// Best-guess language tag for `code`; empty when nothing is
    /// recognized. Engine guesses below the floor are rejected outright
    /// rather than trusted.
    pub fn detect(&self, code: &str) -> String {
        if let Some(engine) = &self.engine {
            if let Some((language, relevance)) = engine.detect(code) {
                if relevance >= self.confidence_floor {
                    return language;
                }
            }
        }
        fallback_detect(code).to_string()
    }
}

/// Ordered signature table; first match wins, no match yields "".
pub fn fallback_detect(code: &str) -> &'static str {
    if code.trim().is_empty() {
        return "";
    }
    if CFAMILY_RE.is_match(code) {
        return if CPP_HINT_RE.is_match(code) { "cpp" } else { "c" };
    }
    if CSHARP_RE.is_match(code) {
        return "csharp";
    }
    if TS_RE.is_match(code) {
        return "typescript";
    }
    if PY_RE.is_match(code) {
        return "python";
    }
    if JAVA_RE.is_match(code) {
        return "java";
    }
    if GO_RE.is_match(code) {
        return "go";
    }
    if JS_RE.is_match(code) {
        return "javascript";
    }
    if HTML_RE.is_match(code) {
        return "html";
    }
    if CSS_RE.is_match(code) {
        return "css";
    }
    if SQL_RE.is_match(code) {
        return "sql";
    }
    if SHELL_RE.is_match(code) {
        return "bash";
    }
    ""
}

// ── Tests ──
