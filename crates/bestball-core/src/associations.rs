// Player association analysis.
//
// Given one player, count how often every other player shares a roster with
// them. Players are keyed by lowercased full name, and roster membership
// uses the coarse id-or-name identity from `EnrichedPlayer::same_player`.

use std::collections::{BTreeSet, HashMap, HashSet};

use serde::Serialize;
use tracing::debug;

use crate::filter::{sort_by_metric, teams_match, StatSort, StatSortField};
use crate::model::{EnrichedPlayer, EnrichedRoster};
use crate::normalize::name_matches;
use crate::percentage;
use crate::search::{search_rosters, PlayerSearchResult};

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PlayerAssociation {
    pub player: EnrichedPlayer,
    /// Rosters holding both this player and the searched player.
    pub shared_rosters: usize,
    /// `shared_rosters` as a share of the searched player's rosters.
    pub shared_percentage: f64,
    pub average_adp: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PlayerAssociationsAnalysis {
    pub searched_player: EnrichedPlayer,
    pub searched_player_rosters: usize,
    /// Associations in first-seen order.
    pub associations: Vec<PlayerAssociation>,
}

impl PlayerAssociationsAnalysis {
    /// Distinct teams among the associated players, sorted.
    pub fn available_teams(&self) -> Vec<String> {
        let teams: BTreeSet<&str> = self
            .associations
            .iter()
            .map(|a| a.player.actual_team.as_str())
            .collect();
        teams.into_iter().map(str::to_string).collect()
    }
}

/// First player, in roster order, whose name matches `query`. A blank query
/// finds nobody.
pub fn find_player<'a>(rosters: &'a [EnrichedRoster], query: &str) -> Option<&'a EnrichedPlayer> {
    let query = query.trim();
    if query.is_empty() {
        return None;
    }
    rosters
        .iter()
        .flat_map(|r| r.players.iter())
        .find(|p| name_matches(&p.full_name(), query))
}

/// Co-occurrence counts for `searched`, or `None` when no roster holds them.
pub fn analyze_associations(
    rosters: &[EnrichedRoster],
    searched: &EnrichedPlayer,
) -> Option<PlayerAssociationsAnalysis> {
    let with_searched: Vec<&EnrichedRoster> = rosters.iter().filter(|r| r.contains(searched)).collect();
    let searched_player_rosters = with_searched.len();
    if searched_player_rosters == 0 {
        return None;
    }

    let mut index: HashMap<String, usize> = HashMap::new();
    let mut associations: Vec<PlayerAssociation> = Vec::new();
    for roster in &with_searched {
        let mut seen: HashSet<String> = HashSet::new();
        for player in roster.players.iter().filter(|p| !p.same_player(searched)) {
            let key = player.name_key();
            if !seen.insert(key.clone()) {
                continue;
            }
            match index.get(&key) {
                Some(&at) => associations[at].shared_rosters += 1,
                None => {
                    index.insert(key, associations.len());
                    associations.push(PlayerAssociation {
                        player: player.clone(),
                        shared_rosters: 1,
                        shared_percentage: 0.0,
                        average_adp: player.adp_or_sentinel(),
                    });
                }
            }
        }
    }

    for association in &mut associations {
        association.shared_percentage = percentage(association.shared_rosters, searched_player_rosters);
    }
    debug!(
        player = %searched.full_name(),
        rosters = searched_player_rosters,
        associations = associations.len(),
        "association analysis complete"
    );
    Some(PlayerAssociationsAnalysis {
        searched_player: searched.clone(),
        searched_player_rosters,
        associations,
    })
}

/// [`find_player`] then [`analyze_associations`]; `None` when the query
/// matches nobody.
pub fn analyze_associations_by_name(rosters: &[EnrichedRoster], query: &str) -> Option<PlayerAssociationsAnalysis> {
    analyze_associations(rosters, find_player(rosters, query)?)
}

/// Associations whose player is on every selected team, sorted.
pub fn filter_and_sort_associations<'a>(
    analysis: &'a PlayerAssociationsAnalysis,
    teams: &[String],
    sort: StatSort,
) -> Vec<&'a PlayerAssociation> {
    let mut associations: Vec<&PlayerAssociation> = analysis
        .associations
        .iter()
        .filter(|a| teams_match(teams, [a.player.actual_team.as_str()]))
        .collect();
    sort_by_metric(&mut associations, sort.direction, |a| match sort.field {
        StatSortField::Frequency => a.shared_rosters as f64,
        StatSortField::AverageAdp => a.average_adp,
    });
    associations
}

/// Every distinct player with their roster occurrence count, most frequent
/// first. Unlike a search this is not capped.
pub fn all_players(rosters: &[EnrichedRoster]) -> Vec<PlayerSearchResult> {
    let mut index: HashMap<String, usize> = HashMap::new();
    let mut players: Vec<PlayerSearchResult> = Vec::new();
    for player in rosters.iter().flat_map(|r| r.players.iter()) {
        let name = player.full_name();
        match index.get(&name) {
            Some(&at) => players[at].count += 1,
            None => {
                index.insert(name.clone(), players.len());
                players.push(PlayerSearchResult {
                    name,
                    position: player.actual_position.clone(),
                    team: player.actual_team.clone(),
                    count: 1,
                });
            }
        }
    }
    players.sort_by(|a, b| b.count.cmp(&a.count));
    players
}

/// Player picker for the association view: the same rules as the roster
/// search.
pub fn search_association_players(rosters: &[EnrichedRoster], query: &str) -> Vec<PlayerSearchResult> {
    search_rosters(rosters, query)
}
