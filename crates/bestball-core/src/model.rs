// Input records and their enriched counterparts.
//
// Raw records mirror the DraftKings payloads field for field (serde renames
// keep the wire names out of the Rust side). Nothing downstream of the
// enricher accepts a raw `Player` or `Roster`.

use std::collections::{BTreeMap, BTreeSet};

use serde::{Deserialize, Serialize};

use crate::NO_ADP_SENTINEL;

// ---------------------------------------------------------------------------
// Raw records
// ---------------------------------------------------------------------------

/// A drafted player as it appears inside a roster payload.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Player {
    pub pid: i64,
    #[serde(rename = "fn")]
    pub first_name: String,
    #[serde(rename = "ln")]
    pub last_name: String,
    /// Roster-slot position (QB, RB, WR, TE, FLEX, BN, ...).
    #[serde(rename = "pn")]
    pub position: String,
    /// The player's own team as the roster payload reports it.
    #[serde(rename = "atabbr", default)]
    pub team_abbr: String,
    #[serde(rename = "htabbr", default)]
    pub opponent_abbr: String,
    #[serde(rename = "i", default)]
    pub image_url: Option<String>,
    /// Statistical fields the analyses never read. Kept so the record
    /// serializes back out intact.
    #[serde(flatten)]
    pub stats: serde_json::Map<String, serde_json::Value>,
}

impl Player {
    /// `"{first} {last}"`, the identity string every name-keyed map uses.
    pub fn full_name(&self) -> String {
        format!("{} {}", self.first_name, self.last_name)
    }
}

/// One drafted lineup.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct Roster {
    pub lineup_id: i64,
    #[serde(default)]
    pub sport_id: i64,
    #[serde(default)]
    pub contest_draft_group_id: i64,
    #[serde(default)]
    pub last_modified: String,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub display_name: String,
    #[serde(default)]
    pub entry_count: u32,
    pub players: Vec<Player>,
}

/// A row of the ADP table. Lower `adp` means drafted earlier.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AdpEntry {
    pub id: String,
    pub name: String,
    pub position: String,
    pub adp: f64,
    pub team: String,
}

/// A named attribute attached to a draftable (e.g. `ByeWeek`).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PlayerAttribute {
    pub name: String,
    pub value: String,
}

/// Draft-pool metadata for one player: the source of truth for true
/// position and team.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DraftablePlayer {
    #[serde(default)]
    pub draftable_id: i64,
    #[serde(default)]
    pub first_name: String,
    #[serde(default)]
    pub last_name: String,
    #[serde(default)]
    pub display_name: String,
    pub player_id: i64,
    #[serde(default)]
    pub position: String,
    #[serde(default)]
    pub team_abbreviation: String,
    #[serde(rename = "playerImage50", default)]
    pub player_image: Option<String>,
    #[serde(default)]
    pub player_attributes: Vec<PlayerAttribute>,
}

// ---------------------------------------------------------------------------
// Enriched records
// ---------------------------------------------------------------------------

/// A roster player joined against the ADP and draftables tables.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct EnrichedPlayer {
    #[serde(flatten)]
    pub player: Player,
    pub adp: Option<f64>,
    pub adp_rank: Option<i64>,
    /// True on-field position; falls back to the slot position.
    pub actual_position: String,
    /// True team; falls back to the roster payload's team.
    pub actual_team: String,
    pub bye_week: Option<String>,
    /// Draftable image when present, otherwise the roster payload's.
    pub image: Option<String>,
}

impl EnrichedPlayer {
    pub fn full_name(&self) -> String {
        self.player.full_name()
    }

    /// Lowercased full name: the key association and exposure counts use.
    pub fn name_key(&self) -> String {
        self.full_name().to_lowercase()
    }

    /// The player's ADP when it is present and positive, otherwise
    /// [`NO_ADP_SENTINEL`].
    pub fn adp_or_sentinel(&self) -> f64 {
        match self.adp {
            Some(adp) if adp > 0.0 => adp,
            _ => NO_ADP_SENTINEL,
        }
    }

    /// Coarse identity: same player id, or same full name. Two distinct
    /// players sharing a name are treated as one.
    pub fn same_player(&self, other: &EnrichedPlayer) -> bool {
        self.player.pid == other.player.pid || self.full_name() == other.full_name()
    }
}

/// A roster whose players have all been enriched, with ADP aggregates and
/// position groupings. Groupings hold indices into `players`, so the player
/// order of the source roster is untouched.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct EnrichedRoster {
    pub lineup_id: i64,
    pub sport_id: i64,
    pub contest_draft_group_id: i64,
    pub last_modified: String,
    pub name: String,
    pub display_name: String,
    pub entry_count: u32,
    pub players: Vec<EnrichedPlayer>,
    /// Sum of `adp` over players that have one.
    pub total_adp: f64,
    /// Mean `adp` over players that have one; 0 when none do.
    pub average_adp: f64,
    /// Slot position -> indices into `players`.
    pub players_by_position: BTreeMap<String, Vec<usize>>,
    /// Actual position -> indices into `players`.
    pub players_by_actual_position: BTreeMap<String, Vec<usize>>,
}

impl EnrichedRoster {
    /// Players occupying the given roster slot position.
    pub fn slot_players<'a>(&'a self, position: &str) -> impl Iterator<Item = &'a EnrichedPlayer> + 'a {
        self.grouped(&self.players_by_position, position)
    }

    /// Players whose actual position is `position`.
    pub fn players_at<'a>(&'a self, position: &str) -> impl Iterator<Item = &'a EnrichedPlayer> + 'a {
        self.grouped(&self.players_by_actual_position, position)
    }

    /// Number of players at an actual position.
    pub fn position_count(&self, position: &str) -> usize {
        self.players_by_actual_position
            .get(position)
            .map_or(0, Vec::len)
    }

    /// Distinct actual teams on the roster.
    pub fn teams(&self) -> BTreeSet<&str> {
        self.players.iter().map(|p| p.actual_team.as_str()).collect()
    }

    /// Players grouped by actual team, each group in roster order.
    pub fn team_groups(&self) -> BTreeMap<&str, Vec<&EnrichedPlayer>> {
        let mut groups: BTreeMap<&str, Vec<&EnrichedPlayer>> = BTreeMap::new();
        for player in &self.players {
            groups.entry(player.actual_team.as_str()).or_default().push(player);
        }
        groups
    }

    /// Largest same-team group of at least two players; 0 when the roster
    /// has no such group.
    pub fn max_stack_size(&self) -> usize {
        self.team_groups()
            .values()
            .map(Vec::len)
            .filter(|&n| n >= 2)
            .max()
            .unwrap_or(0)
    }

    /// Whether the roster holds `player` under the coarse id-or-name rule.
    pub fn contains(&self, player: &EnrichedPlayer) -> bool {
        self.players.iter().any(|p| p.same_player(player))
    }

    fn grouped<'a>(
        &'a self,
        groups: &'a BTreeMap<String, Vec<usize>>,
        position: &str,
    ) -> impl Iterator<Item = &'a EnrichedPlayer> + 'a {
        groups
            .get(position)
            .into_iter()
            .flatten()
            .filter_map(move |&i| self.players.get(i))
    }
}
