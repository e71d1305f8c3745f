// Player search.
//
// Substring search over the distinct players of a roster set. Every search
// surface shares the same rules: queries shorter than two characters return
// nothing, matching is case-insensitive on the raw or normalized name, and
// results are ranked by occurrence count and capped at twenty.

use std::collections::HashMap;

use serde::Serialize;

use crate::model::{EnrichedPlayer, EnrichedRoster};
use crate::normalize::name_matches;

/// Shortest query that produces results.
pub const MIN_QUERY_LEN: usize = 2;

/// Most results any search returns.
pub const SEARCH_LIMIT: usize = 20;

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PlayerSearchResult {
    pub name: String,
    pub position: String,
    pub team: String,
    /// Occurrences across the searched pool.
    pub count: usize,
}

/// Whether `query` is long enough to search on.
pub fn is_searchable(query: &str) -> bool {
    query.trim().chars().count() >= MIN_QUERY_LEN
}

/// Search the distinct players of `players`, keyed by full name. The first
/// occurrence of a name supplies its position and team.
pub fn search_players<'a, I>(players: I, query: &str) -> Vec<PlayerSearchResult>
where
    I: IntoIterator<Item = &'a EnrichedPlayer>,
{
    if !is_searchable(query) {
        return Vec::new();
    }
    let query = query.trim();

    let mut index: HashMap<String, usize> = HashMap::new();
    let mut results: Vec<PlayerSearchResult> = Vec::new();
    for player in players {
        let name = player.full_name();
        if !name_matches(&name, query) {
            continue;
        }
        match index.get(&name) {
            Some(&at) => results[at].count += 1,
            None => {
                index.insert(name.clone(), results.len());
                results.push(PlayerSearchResult {
                    name,
                    position: player.actual_position.clone(),
                    team: player.actual_team.clone(),
                    count: 1,
                });
            }
        }
    }
    rank_results(results)
}

/// Search every player on every roster.
pub fn search_rosters(rosters: &[EnrichedRoster], query: &str) -> Vec<PlayerSearchResult> {
    search_players(rosters.iter().flat_map(|r| r.players.iter()), query)
}

/// Order by count descending, keeping first-seen order on ties, and apply
/// the result cap.
pub(crate) fn rank_results(mut results: Vec<PlayerSearchResult>) -> Vec<PlayerSearchResult> {
    results.sort_by(|a, b| b.count.cmp(&a.count));
    results.truncate(SEARCH_LIMIT);
    results
}
