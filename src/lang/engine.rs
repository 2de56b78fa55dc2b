use std::path::PathBuf;

use regex::Regex;
use serde::Deserialize;
use tokio::task::JoinSet;
use tracing::{debug, warn};

/// One language signature pack as stored on disk: a set of regex patterns
/// plus a weight scaling how much a full match is worth.
#[derive(Debug, Deserialize)]
pub struct SignaturePack {
    pub language: String,
    pub patterns: Vec<String>,
    #[serde(default = "default_weight")]
    pub weight: f64,
}

fn default_weight() -> f64 {
    1.0
}

struct CompiledPack {
    language: String,
    patterns: Vec<Regex>,
    weight: f64,
}

/// Outcome of the one-time engine load. Callers must tolerate
/// `Unavailable` and proceed with the signature-table fallback.
pub enum EngineStatus {
    Ready(Engine),
    Unavailable,
}

/// Compiled detection engine built from signature packs.
pub struct Engine {
    packs: Vec<CompiledPack>,
}

impl Engine {
    /// Compile packs, dropping any with a bad pattern. `None` when nothing
    /// compiled.
    pub fn from_packs(packs: Vec<SignaturePack>) -> Option<Self> {
        let compiled: Vec<CompiledPack> = packs.into_iter().filter_map(compile_pack).collect();
        if compiled.is_empty() {
            None
        } else {
            Some(Self { packs: compiled })
        }
    }

    /// Best guess with a relevance score: the fraction of a pack's
    /// patterns that match, scaled by the pack weight. `None` when no
    /// pattern of any pack matches.
    pub fn detect(&self, code: &str) -> Option<(String, f64)> {
        let mut best: Option<(&str, f64)> = None;
        for pack in &self.packs {
            if pack.patterns.is_empty() {
                continue;
            }
            let matched = pack.patterns.iter().filter(|p| p.is_match(code)).count();
            if matched == 0 {
                continue;
            }
            let relevance = matched as f64 / pack.patterns.len() as f64 * pack.weight;
            if best.is_none_or(|(_, r)| relevance > r) {
                best = Some((&pack.language, relevance));
            }
        }
        best.map(|(language, relevance)| (language.to_string(), relevance))
    }
}

fn compile_pack(pack: SignaturePack) -> Option<CompiledPack> {
    let mut patterns = Vec::with_capacity(pack.patterns.len());
    for raw in &pack.patterns {
        match Regex::new(raw) {
            Ok(re) => patterns.push(re),
            Err(e) => {
                warn!("Bad pattern in '{}' pack, dropping pack: {}", pack.language, e);
                return None;
            }
        }
    }
    Some(CompiledPack {
        language: pack.language,
        patterns,
        weight: pack.weight,
    })
}

/// Load every `*.json` signature pack under `dir`, one task per file,
/// resolving only once all of them have settled. Any failure degrades the
/// result to `Unavailable` (or a partial engine); it never propagates.
pub async fn load_packs(dir: PathBuf) -> EngineStatus {
    let mut entries = match tokio::fs::read_dir(&dir).await {
        Ok(entries) => entries,
        Err(e) => {
            warn!("Cannot read pack directory {}: {}", dir.display(), e);
            return EngineStatus::Unavailable;
        }
    };

    let mut set = JoinSet::new();
    loop {
        match entries.next_entry().await {
            Ok(Some(entry)) => {
                let path = entry.path();
                if path.extension().is_some_and(|e| e == "json") {
                    set.spawn(async move {
                        let raw = tokio::fs::read_to_string(&path).await?;
                        let pack: SignaturePack = serde_json::from_str(&raw)?;
                        anyhow::Ok(pack)
                    });
                }
            }
            Ok(None) => break,
            Err(e) => {
                warn!("Stopped listing {}: {}", dir.display(), e);
                break;
            }
        }
    }

    let mut packs = Vec::new();
    while let Some(joined) = set.join_next().await {
        match joined {
            Ok(Ok(pack)) => {
                debug!("Loaded '{}' signature pack", pack.language);
                packs.push(pack);
            }
            Ok(Err(e)) => warn!("Skipping signature pack: {}", e),
            Err(e) => warn!("Pack load task failed: {}", e),
        }
    }

    match Engine::from_packs(packs) {
        Some(engine) => EngineStatus::Ready(engine),
        None => EngineStatus::Unavailable,
    }
}

// ── Tests ──
