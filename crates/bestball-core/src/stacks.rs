// Team stack analysis.
//
// A stack is a set of two or more players from the same actual team on one
// roster. Every subset of each same-team group within the requested size
// range counts once per roster, keyed by team and sorted player names.

use std::collections::{BTreeSet, HashMap};

use serde::Serialize;
use tracing::debug;

use crate::filter::{sort_by_metric, teams_match, Bounds, StatSort, StatSortField};
use crate::model::{EnrichedPlayer, EnrichedRoster};
use crate::{percentage, NO_ADP_SENTINEL};

/// Smallest group that counts as a stack.
pub const MIN_STACK_SIZE: usize = 2;

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Stack {
    pub team: String,
    /// Players as first seen, in roster order.
    pub players: Vec<EnrichedPlayer>,
    /// Full names, sorted. Together with `team` this identifies the stack.
    pub player_names: Vec<String>,
    pub size: usize,
    /// Rosters containing this exact combination.
    pub frequency: usize,
    pub percentage: f64,
    /// Mean ADP over members with a positive ADP, or [`NO_ADP_SENTINEL`].
    pub average_adp: f64,
}

impl Stack {
    pub fn key(&self) -> String {
        stack_key(&self.team, &self.player_names)
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct StackAnalysis {
    /// Distinct stacks in first-seen order.
    pub stacks: Vec<Stack>,
    pub total_rosters: usize,
}

impl StackAnalysis {
    /// Distinct stack sizes, ascending.
    pub fn available_sizes(&self) -> Vec<usize> {
        let sizes: BTreeSet<usize> = self.stacks.iter().map(|s| s.size).collect();
        sizes.into_iter().collect()
    }

    /// Distinct stack teams, sorted.
    pub fn available_teams(&self) -> Vec<String> {
        let teams: BTreeSet<&str> = self.stacks.iter().map(|s| s.team.as_str()).collect();
        teams.into_iter().map(str::to_string).collect()
    }
}

// ---------------------------------------------------------------------------
// Subset enumeration
// ---------------------------------------------------------------------------

/// All `k`-element index subsets of `0..n`, in lexicographic order.
pub struct Subsets {
    n: usize,
    k: usize,
}

impl Subsets {
    pub fn new(n: usize, k: usize) -> Self {
        Self { n, k }
    }
}

impl IntoIterator for Subsets {
    type Item = Vec<usize>;
    type IntoIter = Iter;

    fn into_iter(self) -> Self::IntoIter {
        let exhausted = self.k > self.n;
        Iter {
            indices: (0..self.k).collect(),
            subsets: self,
            started: false,
            exhausted,
        }
    }
}

pub struct Iter {
    subsets: Subsets,
    indices: Vec<usize>,
    started: bool,
    exhausted: bool,
}

impl Iterator for Iter {
    type Item = Vec<usize>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.exhausted {
            return None;
        }
        if !self.started {
            self.started = true;
            return Some(self.indices.clone());
        }

        let (n, k) = (self.subsets.n, self.subsets.k);
        // Rightmost position that has not reached its final value.
        let Some(pos) = (0..k).rev().find(|&i| self.indices[i] != i + n - k) else {
            self.exhausted = true;
            return None;
        };
        self.indices[pos] += 1;
        for i in pos + 1..k {
            self.indices[i] = self.indices[i - 1] + 1;
        }
        Some(self.indices.clone())
    }
}

/// Binomial coefficient `n choose k`.
pub fn count_subsets(n: usize, k: usize) -> u64 {
    if k > n {
        return 0;
    }
    let k = k.min(n - k) as u64;
    (0..k).fold(1u64, |acc, i| acc * (n as u64 - i) / (i + 1))
}

// ---------------------------------------------------------------------------
// Analysis
// ---------------------------------------------------------------------------

pub fn stack_key(team: &str, sorted_names: &[String]) -> String {
    format!("{team}:{}", sorted_names.join(","))
}

/// Count every same-team combination of `min_size..=max_size` players.
/// `min_size` is raised to [`MIN_STACK_SIZE`]; a range that is empty after
/// that yields no stacks.
pub fn analyze_stacks(rosters: &[EnrichedRoster], min_size: usize, max_size: usize) -> StackAnalysis {
    let min_size = min_size.max(MIN_STACK_SIZE);
    let mut index: HashMap<String, usize> = HashMap::new();
    let mut stacks: Vec<Stack> = Vec::new();

    for roster in rosters {
        for (team, group) in roster.team_groups() {
            let largest = max_size.min(group.len());
            for size in min_size..=largest {
                for subset in Subsets::new(group.len(), size) {
                    let members: Vec<&EnrichedPlayer> = subset.iter().map(|&i| group[i]).collect();
                    let mut names: Vec<String> = members.iter().map(|p| p.full_name()).collect();
                    names.sort();
                    let key = stack_key(team, &names);
                    match index.get(&key) {
                        Some(&at) => stacks[at].frequency += 1,
                        None => {
                            index.insert(key, stacks.len());
                            stacks.push(Stack {
                                team: team.to_string(),
                                average_adp: average_adp(&members),
                                players: members.into_iter().cloned().collect(),
                                player_names: names,
                                size,
                                frequency: 1,
                                percentage: 0.0,
                            });
                        }
                    }
                }
            }
        }
    }

    let total_rosters = rosters.len();
    for stack in &mut stacks {
        stack.percentage = percentage(stack.frequency, total_rosters);
    }
    debug!(
        stacks = stacks.len(),
        rosters = total_rosters,
        min_size,
        max_size,
        "stack analysis complete"
    );
    StackAnalysis {
        stacks,
        total_rosters,
    }
}

fn average_adp(players: &[&EnrichedPlayer]) -> f64 {
    let known: Vec<f64> = players
        .iter()
        .filter_map(|p| p.adp)
        .filter(|&adp| adp > 0.0)
        .collect();
    if known.is_empty() {
        NO_ADP_SENTINEL
    } else {
        known.iter().sum::<f64>() / known.len() as f64
    }
}

// ---------------------------------------------------------------------------
// View
// ---------------------------------------------------------------------------

/// Stack list filter. Team selection uses the same AND rule as the roster
/// view, so selecting two teams matches no single-team stack.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct StackFilter {
    pub size: Bounds,
    pub teams: Vec<String>,
}

pub fn filter_and_sort_stacks<'a>(
    analysis: &'a StackAnalysis,
    filter: &StackFilter,
    sort: StatSort,
) -> Vec<&'a Stack> {
    let mut stacks: Vec<&Stack> = analysis
        .stacks
        .iter()
        .filter(|s| filter.size.contains(s.size))
        .filter(|s| teams_match(&filter.teams, [s.team.as_str()]))
        .collect();
    sort_by_metric(&mut stacks, sort.direction, |s| match sort.field {
        StatSortField::Frequency => s.frequency as f64,
        StatSortField::AverageAdp => s.average_adp,
    });
    stacks
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::filter::SortDirection;
    use crate::testing::{enriched, player, roster};
    use assert_float_eq::*;

    fn pool() -> Vec<EnrichedRoster> {
        enriched(
            vec![
                roster(
                    1,
                    vec![
                        player(1, "Patrick Mahomes", "QB", "KC"),
                        player(2, "Travis Kelce", "TE", "KC"),
                        player(3, "Rashee Rice", "WR", "KC"),
                        player(4, "Josh Allen", "QB", "BUF"),
                    ],
                ),
                roster(
                    2,
                    vec![
                        player(2, "Travis Kelce", "TE", "KC"),
                        player(1, "Patrick Mahomes", "QB", "KC"),
                        player(4, "Josh Allen", "QB", "BUF"),
                        player(5, "James Cook", "RB", "BUF"),
                    ],
                ),
            ],
            &[("Patrick Mahomes", 30.0), ("Travis Kelce", 20.0), ("Josh Allen", 25.0)],
        )
    }

    fn find<'a>(analysis: &'a StackAnalysis, team: &str, names: &[&str]) -> &'a Stack {
        let mut names: Vec<String> = names.iter().map(|n| n.to_string()).collect();
        names.sort();
        let key = stack_key(team, &names);
        analysis
            .stacks
            .iter()
            .find(|s| s.key() == key)
            .unwrap_or_else(|| panic!("missing stack {key}"))
    }

    #[test]
    fn subsets_enumerate_lexicographically() {
        let all: Vec<Vec<usize>> = Subsets::new(4, 2).into_iter().collect();
        assert_eq!(
            all,
            vec![
                vec![0, 1],
                vec![0, 2],
                vec![0, 3],
                vec![1, 2],
                vec![1, 3],
                vec![2, 3]
            ]
        );
        assert_eq!(Subsets::new(3, 3).into_iter().count(), 1);
        assert_eq!(Subsets::new(2, 3).into_iter().count(), 0);
        for (n, k) in [(5, 2), (6, 3), (8, 4), (10, 5)] {
            assert_eq!(Subsets::new(n, k).into_iter().count() as u64, count_subsets(n, k));
        }
    }

    #[test]
    fn three_player_team_yields_four_stacks() {
        let rosters = enriched(
            vec![roster(
                1,
                vec![
                    player(1, "Patrick Mahomes", "QB", "KC"),
                    player(2, "Travis Kelce", "TE", "KC"),
                    player(3, "Rashee Rice", "WR", "KC"),
                ],
            )],
            &[],
        );
        let analysis = analyze_stacks(&rosters, 2, 3);
        assert_eq!(analysis.stacks.len(), 4);
        assert!(analysis.stacks.iter().all(|s| s.frequency == 1));
        assert_eq!(analysis.available_sizes(), vec![2, 3]);
    }

    #[test]
    fn counts_each_combination_once_per_roster() {
        let analysis = analyze_stacks(&pool(), 2, 3);
        assert_eq!(analysis.total_rosters, 2);

        let pair = find(&analysis, "KC", &["Patrick Mahomes", "Travis Kelce"]);
        assert_eq!(pair.frequency, 2);
        assert_float_absolute_eq!(pair.percentage, 100.0);
        assert_float_absolute_eq!(pair.average_adp, 25.0);

        let trio = find(&analysis, "KC", &["Patrick Mahomes", "Travis Kelce", "Rashee Rice"]);
        assert_eq!(trio.frequency, 1);
        assert_eq!(trio.size, 3);
        assert_float_absolute_eq!(trio.percentage, 50.0);

        let buf = find(&analysis, "BUF", &["Josh Allen", "James Cook"]);
        assert_eq!(buf.frequency, 1);
        assert_float_absolute_eq!(buf.average_adp, 25.0);
    }

    #[test]
    fn stack_without_adp_uses_sentinel() {
        let analysis = analyze_stacks(&pool(), 2, 2);
        let stack = find(&analysis, "KC", &["Rashee Rice", "Travis Kelce"]);
        assert_float_absolute_eq!(stack.average_adp, 20.0);

        let rosters = enriched(
            vec![roster(
                1,
                vec![player(1, "A One", "WR", "NYJ"), player(2, "B Two", "WR", "NYJ")],
            )],
            &[],
        );
        let analysis = analyze_stacks(&rosters, 2, 2);
        assert_float_absolute_eq!(analysis.stacks[0].average_adp, NO_ADP_SENTINEL);
    }

    #[test]
    fn size_range_is_respected() {
        let analysis = analyze_stacks(&pool(), 3, 3);
        assert!(analysis.stacks.iter().all(|s| s.size == 3));
        assert_eq!(analysis.stacks.len(), 1);

        let clamped = analyze_stacks(&pool(), 0, 2);
        assert!(clamped.stacks.iter().all(|s| s.size == 2));

        assert!(analyze_stacks(&pool(), 4, 3).stacks.is_empty());
    }

    #[test]
    fn empty_roster_set() {
        let analysis = analyze_stacks(&[], 2, 4);
        assert!(analysis.stacks.is_empty());
        assert_eq!(analysis.total_rosters, 0);
    }

    #[test]
    fn stack_filter_is_idempotent() {
        let analysis = analyze_stacks(&pool(), 2, 3);
        let filter = StackFilter {
            size: Bounds::new(Some(2), Some(2)),
            teams: vec!["KC".into()],
        };
        let once = filter_and_sort_stacks(&analysis, &filter, StatSort::default());
        assert_eq!(once.len(), 3);

        let narrowed = StackAnalysis {
            stacks: once.iter().map(|s| (*s).clone()).collect(),
            total_rosters: analysis.total_rosters,
        };
        let twice = filter_and_sort_stacks(&narrowed, &filter, StatSort::default());
        assert_eq!(once, twice);
    }

    #[test]
    fn filter_and_sort() {
        let analysis = analyze_stacks(&pool(), 2, 3);
        assert_eq!(analysis.available_teams(), vec!["BUF", "KC"]);

        let kc = filter_and_sort_stacks(
            &analysis,
            &StackFilter {
                size: Bounds::default(),
                teams: vec!["KC".into()],
            },
            StatSort::default(),
        );
        assert_eq!(kc.len(), 4);
        assert_eq!(kc[0].frequency, 2);

        let both = filter_and_sort_stacks(
            &analysis,
            &StackFilter {
                size: Bounds::default(),
                teams: vec!["KC".into(), "BUF".into()],
            },
            StatSort::default(),
        );
        assert!(both.is_empty());

        let by_adp = filter_and_sort_stacks(
            &analysis,
            &StackFilter {
                size: Bounds::new(Some(2), Some(2)),
                teams: Vec::new(),
            },
            StatSort {
                field: StatSortField::AverageAdp,
                direction: SortDirection::Asc,
            },
        );
        assert!(by_adp.iter().all(|s| s.size == 2));
        assert!(by_adp.windows(2).all(|w| w[0].average_adp <= w[1].average_adp));
    }
}
