// Player enrichment: join roster players against the ADP and draftables
// tables.
//
// Every fallback chain (true team -> payload team, true position -> slot
// position) is resolved here once, so analyzers read `actual_team` and
// `actual_position` directly.

use std::collections::BTreeMap;
use std::sync::Arc;

use crate::adp::AdpTable;
use crate::draftables::DraftableTable;
use crate::model::{AdpEntry, DraftablePlayer, EnrichedPlayer, EnrichedRoster, Player, Roster};

/// The two side tables the enricher joins against.
#[derive(Debug, Clone, Default)]
pub struct SideTables {
    pub adp: Arc<AdpTable>,
    pub draftables: Arc<DraftableTable>,
}

impl SideTables {
    pub fn new(adp: Vec<AdpEntry>, draftables: Vec<DraftablePlayer>) -> Self {
        SideTables {
            adp: Arc::new(AdpTable::new(adp)),
            draftables: Arc::new(DraftableTable::new(draftables)),
        }
    }

    pub fn from_tables(adp: Arc<AdpTable>, draftables: Arc<DraftableTable>) -> Self {
        SideTables { adp, draftables }
    }
}

/// Look up a player's ADP entry by name.
pub fn match_adp<'a>(tables: &'a SideTables, first_name: &str, last_name: &str) -> Option<&'a AdpEntry> {
    tables.adp.match_player(first_name, last_name)
}

/// Look up a player's draftable record by id.
pub fn match_draftable(tables: &SideTables, player_id: i64) -> Option<&DraftablePlayer> {
    tables.draftables.get(player_id)
}

/// Enrich a single player. Missing matches leave `adp` absent and fall back
/// to the roster payload for team and position; never an error.
pub fn enrich_player(player: &Player, tables: &SideTables) -> EnrichedPlayer {
    let adp = match_adp(tables, &player.first_name, &player.last_name).map(|e| e.adp);
    let draftable = match_draftable(tables, player.pid);

    let image = draftable
        .and_then(|d| d.player_image.clone())
        .filter(|url| !url.is_empty())
        .or_else(|| player.image_url.clone());

    EnrichedPlayer {
        adp,
        adp_rank: adp.map(|value| value.round() as i64),
        actual_position: resolve(tables.draftables.actual_position(player.pid), &player.position),
        actual_team: resolve(tables.draftables.team(player.pid), &player.team_abbr),
        bye_week: tables.draftables.bye_week(player.pid).map(str::to_string),
        image,
        player: player.clone(),
    }
}

/// Enrich every player of a roster and derive the ADP aggregates and
/// position groupings. Player order is preserved.
pub fn enrich_roster(roster: &Roster, tables: &SideTables) -> EnrichedRoster {
    let players: Vec<EnrichedPlayer> = roster
        .players
        .iter()
        .map(|p| enrich_player(p, tables))
        .collect();

    let mut players_by_position: BTreeMap<String, Vec<usize>> = BTreeMap::new();
    let mut players_by_actual_position: BTreeMap<String, Vec<usize>> = BTreeMap::new();
    for (index, player) in players.iter().enumerate() {
        players_by_position
            .entry(player.player.position.clone())
            .or_default()
            .push(index);
        players_by_actual_position
            .entry(player.actual_position.clone())
            .or_default()
            .push(index);
    }

    let adps: Vec<f64> = players.iter().filter_map(|p| p.adp).collect();
    let total_adp: f64 = adps.iter().sum();
    let average_adp = if adps.is_empty() {
        0.0
    } else {
        total_adp / adps.len() as f64
    };

    EnrichedRoster {
        lineup_id: roster.lineup_id,
        sport_id: roster.sport_id,
        contest_draft_group_id: roster.contest_draft_group_id,
        last_modified: roster.last_modified.clone(),
        name: roster.name.clone(),
        display_name: roster.display_name.clone(),
        entry_count: roster.entry_count,
        players,
        total_adp,
        average_adp,
        players_by_position,
        players_by_actual_position,
    }
}

/// Enrich a whole roster pool, one output per input in the same order.
pub fn enrich_rosters(rosters: &[Roster], tables: &SideTables) -> Vec<EnrichedRoster> {
    rosters.iter().map(|r| enrich_roster(r, tables)).collect()
}

/// The single fallback rule for resolved team and position: the side-table
/// value when present and non-empty, otherwise the payload value.
fn resolve(primary: Option<&str>, fallback: &str) -> String {
    primary
        .filter(|value| !value.is_empty())
        .unwrap_or(fallback)
        .to_string()
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::{adp_entry, draftable, player, roster};
    use assert_float_eq::*;

    fn tables() -> SideTables {
        let mut chase = draftable(1, "WR", "CIN", Some("10"));
        chase.player_image = Some("https://img/chase.png".into());
        SideTables::new(
            vec![
                adp_entry("a", "Ja'Marr Chase", "WR", 1.4, "CIN"),
                adp_entry("b", "Joe Burrow", "QB", 48.6, "CIN"),
            ],
            vec![chase, draftable(2, "QB", "CIN", Some("10"))],
        )
    }

    #[test]
    fn enriches_matched_player() {
        let tables = tables();
        let mut raw = player(1, "Ja'Marr Chase", "FLEX", "OLD");
        raw.image_url = Some("https://img/roster.png".into());
        let p = enrich_player(&raw, &tables);

        assert_eq!(p.adp, Some(1.4));
        assert_eq!(p.adp_rank, Some(1));
        assert_eq!(p.actual_position, "WR");
        assert_eq!(p.actual_team, "CIN");
        assert_eq!(p.bye_week.as_deref(), Some("10"));
        assert_eq!(p.image.as_deref(), Some("https://img/chase.png"));
        // Base record untouched.
        assert_eq!(p.player, raw);
    }

    #[test]
    fn unmatched_player_falls_back() {
        let tables = tables();
        let mut raw = player(77, "Nobody Special", "BN", "NYJ");
        raw.image_url = Some("https://img/roster.png".into());
        let p = enrich_player(&raw, &tables);

        assert_eq!(p.adp, None);
        assert_eq!(p.adp_rank, None);
        assert_eq!(p.actual_position, "BN");
        assert_eq!(p.actual_team, "NYJ");
        assert_eq!(p.bye_week, None);
        assert_eq!(p.image.as_deref(), Some("https://img/roster.png"));
    }

    #[test]
    fn adp_rank_rounds() {
        let tables = tables();
        let p = enrich_player(&player(2, "Joe Burrow", "QB", "CIN"), &tables);
        assert_eq!(p.adp_rank, Some(49));
    }

    #[test]
    fn roster_aggregates_use_only_adp_bearing_players() {
        let tables = tables();
        let r = roster(
            5,
            vec![
                player(1, "Ja'Marr Chase", "WR", "CIN"),
                player(2, "Joe Burrow", "QB", "CIN"),
                player(3, "Unknown Guy", "BN", "NYJ"),
            ],
        );
        let e = enrich_roster(&r, &tables);
        assert_float_absolute_eq!(e.total_adp, 50.0);
        assert_float_absolute_eq!(e.average_adp, 25.0);
    }

    #[test]
    fn roster_without_adp_averages_zero() {
        let tables = SideTables::default();
        let r = roster(5, vec![player(3, "Unknown Guy", "BN", "NYJ")]);
        let e = enrich_roster(&r, &tables);
        assert_eq!(e.total_adp, 0.0);
        assert_eq!(e.average_adp, 0.0);
    }

    #[test]
    fn groupings_are_views_over_player_order() {
        let tables = tables();
        let r = roster(
            5,
            vec![
                player(3, "Unknown Guy", "BN", "NYJ"),
                player(1, "Ja'Marr Chase", "FLEX", "CIN"),
                player(2, "Joe Burrow", "QB", "CIN"),
            ],
        );
        let e = enrich_roster(&r, &tables);

        let names: Vec<_> = e.players.iter().map(|p| p.full_name()).collect();
        assert_eq!(names, vec!["Unknown Guy", "Ja'Marr Chase", "Joe Burrow"]);

        let flex: Vec<_> = e.slot_players("FLEX").map(|p| p.full_name()).collect();
        assert_eq!(flex, vec!["Ja'Marr Chase"]);
        let wr: Vec<_> = e.players_at("WR").map(|p| p.full_name()).collect();
        assert_eq!(wr, vec!["Ja'Marr Chase"]);
        assert_eq!(e.position_count("BN"), 1);
        assert_eq!(e.position_count("TE"), 0);
    }

    #[test]
    fn enrich_rosters_preserves_length_and_base_fields() {
        let tables = tables();
        let rosters = vec![
            roster(1, vec![player(1, "Ja'Marr Chase", "WR", "CIN")]),
            roster(2, vec![]),
            roster(3, vec![player(9, "A B", "RB", "DAL"), player(2, "Joe Burrow", "QB", "CIN")]),
        ];
        let out = enrich_rosters(&rosters, &tables);
        assert_eq!(out.len(), rosters.len());
        for (raw, e) in rosters.iter().zip(&out) {
            assert_eq!(e.lineup_id, raw.lineup_id);
            assert_eq!(e.name, raw.name);
            assert_eq!(e.display_name, raw.display_name);
            assert_eq!(e.contest_draft_group_id, raw.contest_draft_group_id);
            let base: Vec<_> = e.players.iter().map(|p| p.player.clone()).collect();
            assert_eq!(base, raw.players);
        }
    }
}
