// ADP table: name-indexed lookup plus ranking and summary queries.
//
// The name index holds two keys per entry, the plain lowercase name and the
// suffix-stripped ADP key. On collision the later entry wins.

use std::collections::{BTreeSet, HashMap};

use serde::Serialize;

use crate::model::AdpEntry;
use crate::normalize::normalize_adp_name;

/// Cap on ADP table search results.
const ADP_SEARCH_LIMIT: usize = 20;

/// The loaded ADP table.
#[derive(Debug, Clone, Default)]
pub struct AdpTable {
    entries: Vec<AdpEntry>,
    /// Name key -> index into `entries`.
    by_name: HashMap<String, usize>,
}

/// Per-position ADP summary.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PositionAdpStats {
    pub position: String,
    pub count: usize,
    /// Mean ADP rounded to one decimal.
    pub average_adp: f64,
    pub top_player: Option<AdpEntry>,
}

/// Whole-table ADP summary.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AdpStats {
    pub total_players: usize,
    /// Mean ADP rounded to one decimal.
    pub average_adp: f64,
    pub positions: Vec<PositionAdpStats>,
}

impl AdpTable {
    pub fn new(entries: Vec<AdpEntry>) -> Self {
        let mut by_name = HashMap::with_capacity(entries.len() * 2);
        for (index, entry) in entries.iter().enumerate() {
            by_name.insert(entry.name.to_lowercase(), index);
            by_name.insert(normalize_adp_name(&entry.name), index);
        }
        AdpTable { entries, by_name }
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn entries(&self) -> &[AdpEntry] {
        &self.entries
    }

    /// Match a roster player's name against the table.
    ///
    /// Tries the suffix-stripped key first, then the plain lowercase full
    /// name. Exact key hits only; a miss returns `None`.
    pub fn match_player(&self, first_name: &str, last_name: &str) -> Option<&AdpEntry> {
        let full_name = format!("{first_name} {last_name}");
        [normalize_adp_name(&full_name), full_name.to_lowercase()]
            .iter()
            .find_map(|key| self.by_name.get(key))
            .map(|&index| &self.entries[index])
    }

    pub fn by_id(&self, id: &str) -> Option<&AdpEntry> {
        self.entries.iter().find(|e| e.id == id)
    }

    /// Distinct positions, sorted.
    pub fn positions(&self) -> Vec<String> {
        self.entries
            .iter()
            .map(|e| e.position.clone())
            .collect::<BTreeSet<_>>()
            .into_iter()
            .collect()
    }

    pub fn by_position(&self, position: &str) -> Vec<&AdpEntry> {
        self.entries.iter().filter(|e| e.position == position).collect()
    }

    /// The `count` earliest-drafted players at a position.
    pub fn top_by_position(&self, position: &str, count: usize) -> Vec<&AdpEntry> {
        let mut players = self.by_position(position);
        sort_by_adp(&mut players);
        players.truncate(count);
        players
    }

    /// 1 + the number of entries with a strictly lower ADP.
    pub fn overall_rank(&self, id: &str) -> Option<usize> {
        let entry = self.by_id(id)?;
        Some(1 + self.entries.iter().filter(|e| e.adp < entry.adp).count())
    }

    /// Like [`overall_rank`](Self::overall_rank) but among the entry's own position.
    pub fn position_rank(&self, id: &str) -> Option<usize> {
        let entry = self.by_id(id)?;
        let better = self
            .entries
            .iter()
            .filter(|e| e.position == entry.position && e.adp < entry.adp)
            .count();
        Some(1 + better)
    }

    /// Case-insensitive substring search over name and team, earliest ADP
    /// first.
    pub fn search(&self, query: &str) -> Vec<&AdpEntry> {
        let query = query.to_lowercase();
        let mut hits: Vec<&AdpEntry> = self
            .entries
            .iter()
            .filter(|e| e.name.to_lowercase().contains(&query) || e.team.to_lowercase().contains(&query))
            .collect();
        sort_by_adp(&mut hits);
        hits.truncate(ADP_SEARCH_LIMIT);
        hits
    }

    /// Table summary; `None` for an empty table.
    pub fn stats(&self) -> Option<AdpStats> {
        if self.entries.is_empty() {
            return None;
        }
        let positions = self
            .positions()
            .into_iter()
            .map(|position| {
                let mut players = self.by_position(&position);
                let mean = players.iter().map(|p| p.adp).sum::<f64>() / players.len() as f64;
                sort_by_adp(&mut players);
                PositionAdpStats {
                    count: players.len(),
                    average_adp: round_tenth(mean),
                    top_player: players.first().map(|p| (*p).clone()),
                    position,
                }
            })
            .collect();
        let mean = self.entries.iter().map(|e| e.adp).sum::<f64>() / self.entries.len() as f64;
        Some(AdpStats {
            total_players: self.entries.len(),
            average_adp: round_tenth(mean),
            positions,
        })
    }
}

fn sort_by_adp(entries: &mut [&AdpEntry]) {
    entries.sort_by(|a, b| a.adp.partial_cmp(&b.adp).unwrap_or(std::cmp::Ordering::Equal));
}

fn round_tenth(value: f64) -> f64 {
    (value * 10.0).round() / 10.0
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
