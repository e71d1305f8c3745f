// Draftables table: true position, team and bye week keyed by player id.

use std::collections::{BTreeSet, HashMap};

use crate::model::DraftablePlayer;

/// Attribute name carrying the bye week.
const BYE_WEEK_ATTRIBUTE: &str = "ByeWeek";

/// The loaded draftables table. The first record for a player id wins.
#[derive(Debug, Clone, Default)]
pub struct DraftableTable {
    players: Vec<DraftablePlayer>,
    by_player_id: HashMap<i64, usize>,
}

impl DraftableTable {
    pub fn new(players: Vec<DraftablePlayer>) -> Self {
        let mut by_player_id = HashMap::with_capacity(players.len());
        for (index, player) in players.iter().enumerate() {
            by_player_id.entry(player.player_id).or_insert(index);
        }
        DraftableTable {
            players,
            by_player_id,
        }
    }

    pub fn len(&self) -> usize {
        self.players.len()
    }

    pub fn is_empty(&self) -> bool {
        self.players.is_empty()
    }

    /// Exact lookup by player id. No name fallback.
    pub fn get(&self, player_id: i64) -> Option<&DraftablePlayer> {
        self.by_player_id.get(&player_id).map(|&i| &self.players[i])
    }

    pub fn actual_position(&self, player_id: i64) -> Option<&str> {
        self.get(player_id)
            .map(|p| p.position.as_str())
            .filter(|p| !p.is_empty())
    }

    pub fn team(&self, player_id: i64) -> Option<&str> {
        self.get(player_id)
            .map(|p| p.team_abbreviation.as_str())
            .filter(|t| !t.is_empty())
    }

    pub fn bye_week(&self, player_id: i64) -> Option<&str> {
        self.get(player_id)?
            .player_attributes
            .iter()
            .find(|attr| attr.name == BYE_WEEK_ATTRIBUTE)
            .map(|attr| attr.value.as_str())
    }

    pub fn by_position(&self, position: &str) -> Vec<&DraftablePlayer> {
        self.players.iter().filter(|p| p.position == position).collect()
    }

    /// Distinct actual positions, sorted.
    pub fn positions(&self) -> Vec<String> {
        self.players
            .iter()
            .map(|p| p.position.clone())
            .collect::<BTreeSet<_>>()
            .into_iter()
            .collect()
    }
}
