//! Protection-zone classification.

use axiom_config::{AxiomConfig, ZoneEntry};
use axiom_model::ZoneCategory;
use std::collections::BTreeMap;

/// Where a changed file landed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ZoneMatch {
    pub category: ZoneCategory,
    /// Index of the matching entry within its category.
    pub entry: usize,
}

/// The declared protection zones, ordered by classification precedence.
#[derive(Debug, Clone, Default)]
pub struct ZoneSet {
    zones: BTreeMap<ZoneCategory, Vec<ZoneEntry>>,
}

impl ZoneSet {
    pub fn new(zones: BTreeMap<ZoneCategory, Vec<ZoneEntry>>) -> Self {
        Self { zones }
    }

    pub fn from_config(config: &AxiomConfig) -> Self {
        Self::new(config.protection_zones.clone())
    }

    /// Entries of one category in declaration order.
    pub fn entries(&self, category: ZoneCategory) -> &[ZoneEntry] {
        self.zones
            .get(&category)
            .map(Vec::as_slice)
            .unwrap_or_default()
    }

    /// Classifies `file_path`, trying red, then yellow, then green.
    ///
    /// A file matches an entry when the entry's path occurs in it, either as
    /// a prefix or anywhere inside (`src/domain/core/x.rs` matches
    /// `domain/core`).
    pub fn classify(&self, file_path: &str) -> Option<ZoneMatch> {
        let normalized = file_path.replace('\\', "/");
        ZoneCategory::PRECEDENCE.into_iter().find_map(|category| {
            self.entries(category)
                .iter()
                .position(|entry| matches_pattern(&normalized, &entry.path))
                .map(|entry| ZoneMatch { category, entry })
        })
    }
}

fn matches_pattern(file_path: &str, pattern: &str) -> bool {
    let pattern = pattern.trim_end_matches('/');
    !pattern.is_empty() && file_path.contains(pattern)
}
