// Roster lookups and value rankings.

use serde::Serialize;

use crate::model::{EnrichedPlayer, EnrichedRoster};

/// ADP ceiling used to turn a draft position into a value score.
pub const VALUE_CEILING: f64 = 300.0;

/// Default ADP above which a player counts as a value pick.
pub const DEFAULT_VALUE_THRESHOLD: f64 = 100.0;

pub fn by_lineup_id(rosters: &[EnrichedRoster], lineup_id: i64) -> Option<&EnrichedRoster> {
    rosters.iter().find(|r| r.lineup_id == lineup_id)
}

/// Rosters with a player whose full name contains `name`, ignoring case.
pub fn containing_player<'a>(rosters: &'a [EnrichedRoster], name: &str) -> Vec<&'a EnrichedRoster> {
    let needle = name.to_lowercase();
    rosters
        .iter()
        .filter(|r| r.players.iter().any(|p| p.full_name().to_lowercase().contains(&needle)))
        .collect()
}

/// Rosters with a player whose roster payload lists `team` as their own or
/// their opponent's abbreviation.
pub fn containing_team<'a>(rosters: &'a [EnrichedRoster], team: &str) -> Vec<&'a EnrichedRoster> {
    rosters
        .iter()
        .filter(|r| {
            r.players
                .iter()
                .any(|p| p.player.team_abbr == team || p.player.opponent_abbr == team)
        })
        .collect()
}

/// Rosters carrying ADP data, cheapest total ADP first.
pub fn value_rankings(rosters: &[EnrichedRoster]) -> Vec<&EnrichedRoster> {
    let mut ranked: Vec<&EnrichedRoster> = rosters.iter().filter(|r| r.total_adp > 0.0).collect();
    ranked.sort_by(|a, b| a.total_adp.total_cmp(&b.total_adp));
    ranked
}

pub fn top_value_rosters(rosters: &[EnrichedRoster], count: usize) -> Vec<&EnrichedRoster> {
    let mut ranked = value_rankings(rosters);
    ranked.truncate(count);
    ranked
}

/// Value score: higher for earlier picks, 0 without a positive ADP.
pub fn player_value(player: &EnrichedPlayer) -> f64 {
    match player.adp {
        Some(adp) if adp > 0.0 => VALUE_CEILING - adp,
        _ => 0.0,
    }
}

/// Players drafted later than `threshold` ADP, latest first.
pub fn value_picks<'a, I>(players: I, threshold: f64) -> Vec<&'a EnrichedPlayer>
where
    I: IntoIterator<Item = &'a EnrichedPlayer>,
{
    let mut picks: Vec<&EnrichedPlayer> = players
        .into_iter()
        .filter(|p| p.adp.is_some_and(|adp| adp > threshold))
        .collect();
    picks.sort_by(|a, b| {
        let (a, b) = (a.adp.unwrap_or(0.0), b.adp.unwrap_or(0.0));
        b.total_cmp(&a)
    });
    picks
}

/// A roster's headline numbers for listings.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RosterSummary {
    pub lineup_id: i64,
    pub name: String,
    pub player_count: usize,
    pub total_adp: f64,
    pub average_adp: f64,
    pub max_stack_size: usize,
}

impl From<&EnrichedRoster> for RosterSummary {
    fn from(roster: &EnrichedRoster) -> Self {
        RosterSummary {
            lineup_id: roster.lineup_id,
            name: roster.display_name.clone(),
            player_count: roster.players.len(),
            total_adp: roster.total_adp,
            average_adp: roster.average_adp,
            max_stack_size: roster.max_stack_size(),
        }
    }
}
