pub mod classify;
pub mod walk;

pub use classify::{ClassifierConfig, Verdict};
pub use walk::{ElementKind, Walker};

use scraper::ElementRef;

use crate::lang::Oracle;

/// Convert one content subtree to Markdown with a fresh visit set.
pub fn convert_subtree(root: ElementRef, oracle: &Oracle, cfg: &ClassifierConfig) -> String {
    Walker::new(cfg, oracle).run(root)
}
