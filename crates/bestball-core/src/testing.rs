// Fixture builders shared by the unit tests.

use crate::enrich::{enrich_rosters, SideTables};
use crate::model::{AdpEntry, DraftablePlayer, EnrichedRoster, Player, PlayerAttribute, Roster};

pub fn adp_entry(id: &str, name: &str, position: &str, adp: f64, team: &str) -> AdpEntry {
    AdpEntry {
        id: id.into(),
        name: name.into(),
        position: position.into(),
        adp,
        team: team.into(),
    }
}

pub fn draftable(player_id: i64, position: &str, team: &str, bye_week: Option<&str>) -> DraftablePlayer {
    DraftablePlayer {
        draftable_id: player_id * 100,
        first_name: String::new(),
        last_name: String::new(),
        display_name: String::new(),
        player_id,
        position: position.into(),
        team_abbreviation: team.into(),
        player_image: None,
        player_attributes: bye_week
            .map(|week| {
                vec![PlayerAttribute {
                    name: "ByeWeek".into(),
                    value: week.into(),
                }]
            })
            .unwrap_or_default(),
    }
}

/// A raw player with `name` split on the first space.
pub fn player(pid: i64, name: &str, slot: &str, team: &str) -> Player {
    let (first, last) = name.split_once(' ').unwrap_or((name, ""));
    Player {
        pid,
        first_name: first.into(),
        last_name: last.into(),
        position: slot.into(),
        team_abbr: team.into(),
        opponent_abbr: String::new(),
        image_url: None,
        stats: serde_json::Map::new(),
    }
}

pub fn roster(lineup_id: i64, players: Vec<Player>) -> Roster {
    Roster {
        lineup_id,
        sport_id: 1,
        contest_draft_group_id: 1,
        last_modified: String::new(),
        name: format!("Lineup {lineup_id}"),
        display_name: format!("Lineup {lineup_id}"),
        entry_count: 1,
        players,
    }
}

/// Enrich rosters whose players use their slot as their true position and
/// carry the given ADP values by full name.
pub fn enriched(rosters: Vec<Roster>, adp: &[(&str, f64)]) -> Vec<EnrichedRoster> {
    let entries = adp
        .iter()
        .enumerate()
        .map(|(i, (name, value))| adp_entry(&i.to_string(), name, "", *value, ""))
        .collect();
    let tables = SideTables::new(entries, Vec::new());
    enrich_rosters(&rosters, &tables)
}
