// Player exposure analysis.
//
// Exposure is the share of all rosters a player appears on. A player listed
// twice on one roster still counts once for it.

use std::collections::{BTreeSet, HashMap, HashSet};

use serde::Serialize;
use tracing::debug;

use crate::filter::{sort_by_metric, teams_match, StatSort, StatSortField};
use crate::model::{EnrichedPlayer, EnrichedRoster};
use crate::normalize::name_matches;
use crate::percentage;
use crate::search::{is_searchable, rank_results, PlayerSearchResult};

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PlayerExposure {
    pub player: EnrichedPlayer,
    pub roster_count: usize,
    pub exposure_percentage: f64,
    pub average_adp: f64,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct PlayerExposureAnalysis {
    /// Exposures in first-seen order.
    pub exposures: Vec<PlayerExposure>,
    pub total_rosters: usize,
}

impl PlayerExposureAnalysis {
    pub fn available_teams(&self) -> Vec<String> {
        let teams: BTreeSet<&str> = self
            .exposures
            .iter()
            .map(|e| e.player.actual_team.as_str())
            .collect();
        teams.into_iter().map(str::to_string).collect()
    }
}

pub fn analyze_exposure(rosters: &[EnrichedRoster]) -> PlayerExposureAnalysis {
    let mut index: HashMap<String, usize> = HashMap::new();
    let mut exposures: Vec<PlayerExposure> = Vec::new();
    for roster in rosters {
        let mut seen: HashSet<String> = HashSet::new();
        for player in &roster.players {
            let key = player.name_key();
            if !seen.insert(key.clone()) {
                continue;
            }
            match index.get(&key) {
                Some(&at) => exposures[at].roster_count += 1,
                None => {
                    index.insert(key, exposures.len());
                    exposures.push(PlayerExposure {
                        player: player.clone(),
                        roster_count: 1,
                        exposure_percentage: 0.0,
                        average_adp: player.adp_or_sentinel(),
                    });
                }
            }
        }
    }

    let total_rosters = rosters.len();
    for exposure in &mut exposures {
        exposure.exposure_percentage = percentage(exposure.roster_count, total_rosters);
    }
    debug!(players = exposures.len(), rosters = total_rosters, "exposure analysis complete");
    PlayerExposureAnalysis {
        exposures,
        total_rosters,
    }
}

/// Exposure list filter: AND team selection plus an optional name query.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct ExposureFilter {
    pub teams: Vec<String>,
    /// Name substring; blank matches everyone.
    pub player: Option<String>,
}

pub fn filter_and_sort_exposures<'a>(
    analysis: &'a PlayerExposureAnalysis,
    filter: &ExposureFilter,
    sort: StatSort,
) -> Vec<&'a PlayerExposure> {
    let query = filter.player.as_deref().map(str::trim).filter(|q| !q.is_empty());
    let mut exposures: Vec<&PlayerExposure> = analysis
        .exposures
        .iter()
        .filter(|e| teams_match(&filter.teams, [e.player.actual_team.as_str()]))
        .filter(|e| query.map_or(true, |q| name_matches(&e.player.full_name(), q)))
        .collect();
    sort_by_metric(&mut exposures, sort.direction, |e| match sort.field {
        StatSortField::Frequency => e.roster_count as f64,
        StatSortField::AverageAdp => e.average_adp,
    });
    exposures
}

/// Search the exposure list. Counts are roster counts.
pub fn search_exposures(analysis: &PlayerExposureAnalysis, query: &str) -> Vec<PlayerSearchResult> {
    if !is_searchable(query) {
        return Vec::new();
    }
    let query = query.trim();
    let results = analysis
        .exposures
        .iter()
        .filter(|e| name_matches(&e.player.full_name(), query))
        .map(|e| PlayerSearchResult {
            name: e.player.full_name(),
            position: e.player.actual_position.clone(),
            team: e.player.actual_team.clone(),
            count: e.roster_count,
        })
        .collect();
    rank_results(results)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::filter::SortDirection;
    use crate::testing::{enriched, player, roster};
    use crate::NO_ADP_SENTINEL;
    use assert_float_eq::*;

    fn pool() -> Vec<EnrichedRoster> {
        enriched(
            vec![
                roster(
                    1,
                    vec![
                        player(1, "Bijan Robinson", "RB", "ATL"),
                        player(2, "Drake London", "WR", "ATL"),
                    ],
                ),
                roster(
                    2,
                    vec![
                        player(1, "Bijan Robinson", "RB", "ATL"),
                        player(3, "Puka Nacua", "WR", "LAR"),
                    ],
                ),
                roster(
                    3,
                    vec![
                        player(1, "Bijan Robinson", "RB", "ATL"),
                        player(3, "Puka Nacua", "WR", "LAR"),
                    ],
                ),
                roster(4, vec![player(4, "Kyren Williams", "RB", "LAR")]),
            ],
            &[("Bijan Robinson", 3.5), ("Puka Nacua", 12.0)],
        )
    }

    #[test]
    fn exposure_percentages() {
        let analysis = analyze_exposure(&pool());
        assert_eq!(analysis.total_rosters, 4);
        assert_eq!(analysis.exposures.len(), 4);

        let bijan = &analysis.exposures[0];
        assert_eq!(bijan.roster_count, 3);
        assert_float_absolute_eq!(bijan.exposure_percentage, 75.0);
        assert_float_absolute_eq!(bijan.average_adp, 3.5);

        let london = &analysis.exposures[1];
        assert_float_absolute_eq!(london.exposure_percentage, 25.0);
        assert_float_absolute_eq!(london.average_adp, NO_ADP_SENTINEL);
    }

    #[test]
    fn repeat_listing_counts_once_per_roster() {
        let rosters = enriched(
            vec![roster(
                1,
                vec![player(1, "Tank Dell", "WR", "HOU"), player(1, "Tank Dell", "FLEX", "HOU")],
            )],
            &[],
        );
        let analysis = analyze_exposure(&rosters);
        assert_eq!(analysis.exposures.len(), 1);
        assert_eq!(analysis.exposures[0].roster_count, 1);
        assert_float_absolute_eq!(analysis.exposures[0].exposure_percentage, 100.0);
    }

    #[test]
    fn empty_rosters() {
        let analysis = analyze_exposure(&[]);
        assert!(analysis.exposures.is_empty());
        assert_eq!(analysis.total_rosters, 0);
    }

    #[test]
    fn filter_by_team_and_name() {
        let analysis = analyze_exposure(&pool());
        assert_eq!(analysis.available_teams(), vec!["ATL", "LAR"]);

        let lar = filter_and_sort_exposures(
            &analysis,
            &ExposureFilter {
                teams: vec!["LAR".into()],
                player: None,
            },
            StatSort::default(),
        );
        let names: Vec<String> = lar.iter().map(|e| e.player.full_name()).collect();
        assert_eq!(names, vec!["Puka Nacua", "Kyren Williams"]);

        let named = filter_and_sort_exposures(
            &analysis,
            &ExposureFilter {
                teams: Vec::new(),
                player: Some("  nacua ".into()),
            },
            StatSort::default(),
        );
        assert_eq!(named.len(), 1);

        let by_adp_desc = filter_and_sort_exposures(
            &analysis,
            &ExposureFilter::default(),
            StatSort {
                field: StatSortField::AverageAdp,
                direction: SortDirection::Desc,
            },
        );
        assert_float_absolute_eq!(by_adp_desc[0].average_adp, NO_ADP_SENTINEL);
        assert_float_absolute_eq!(by_adp_desc[3].average_adp, 3.5);
    }

    #[test]
    fn exposure_filter_is_idempotent() {
        let analysis = analyze_exposure(&pool());
        let filter = ExposureFilter {
            teams: vec!["LAR".into()],
            player: Some("williams".into()),
        };
        let once = filter_and_sort_exposures(&analysis, &filter, StatSort::default());
        assert_eq!(once.len(), 1);

        let narrowed = PlayerExposureAnalysis {
            exposures: once.iter().map(|e| (*e).clone()).collect(),
            total_rosters: analysis.total_rosters,
        };
        let twice = filter_and_sort_exposures(&narrowed, &filter, StatSort::default());
        assert_eq!(once, twice);
    }

    #[test]
    fn search_uses_roster_counts() {
        let analysis = analyze_exposure(&pool());
        assert!(search_exposures(&analysis, "b").is_empty());
        let hits = search_exposures(&analysis, "ra");
        assert_eq!(hits.len(), 1);
        assert_eq!(hits[0].name, "Drake London");
        let hits = search_exposures(&analysis, "an");
        assert_eq!(hits[0].name, "Bijan Robinson");
        assert_eq!(hits[0].count, 3);
    }
}
