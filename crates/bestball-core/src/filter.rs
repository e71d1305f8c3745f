// Filter and sort engine.
//
// The predicates here are shared by every view: the roster list applies the
// full `FilterOptions`, while the stack, association and exposure lists reuse
// `teams_match`, `Bounds` and `sort_by_metric` with their own field
// extractors. Nothing in this module mutates its input.

use std::cmp::Ordering;
use std::collections::{BTreeMap, BTreeSet, HashSet};
use std::fmt;

use serde::Serialize;
use thiserror::Error;

use crate::model::EnrichedRoster;

/// Largest count any bound may take.
pub const MAX_BOUND: i64 = 20;

// ---------------------------------------------------------------------------
// Error type
// ---------------------------------------------------------------------------

#[derive(Debug, Error, PartialEq)]
pub enum FilterError {
    #[error("{field}: bound must not be negative, got {value}")]
    Negative { field: String, value: i64 },

    #[error("{field}: bound must be at most 20, got {value}")]
    TooLarge { field: String, value: i64 },

    #[error("{field}: min {min} is greater than max {max}")]
    Inverted { field: String, min: usize, max: usize },

    #[error("unknown position `{0}` (expected QB, RB, WR or TE)")]
    UnknownPosition(String),
}

// ---------------------------------------------------------------------------
// Bounds
// ---------------------------------------------------------------------------

/// An inclusive `[min, max]` range where either end may be open.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct Bounds {
    pub min: Option<usize>,
    pub max: Option<usize>,
}

impl Bounds {
    pub fn new(min: Option<usize>, max: Option<usize>) -> Self {
        Bounds { min, max }
    }

    /// Build bounds from unchecked user input, rejecting negative, oversized
    /// or inverted values. `field` names the input in the error.
    pub fn parse(field: &str, min: Option<i64>, max: Option<i64>) -> Result<Self, FilterError> {
        let bounds = Bounds {
            min: min.map(|v| checked_bound(field, v)).transpose()?,
            max: max.map(|v| checked_bound(field, v)).transpose()?,
        };
        bounds.validate(field)?;
        Ok(bounds)
    }

    pub fn is_open(&self) -> bool {
        self.min.is_none() && self.max.is_none()
    }

    pub fn contains(&self, value: usize) -> bool {
        self.min.map_or(true, |min| value >= min) && self.max.map_or(true, |max| value <= max)
    }

    fn validate(&self, field: &str) -> Result<(), FilterError> {
        for value in [self.min, self.max].into_iter().flatten() {
            if value as i64 > MAX_BOUND {
                return Err(FilterError::TooLarge {
                    field: field.to_string(),
                    value: value as i64,
                });
            }
        }
        if let (Some(min), Some(max)) = (self.min, self.max) {
            if min > max {
                return Err(FilterError::Inverted {
                    field: field.to_string(),
                    min,
                    max,
                });
            }
        }
        Ok(())
    }
}

impl fmt::Display for Bounds {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let show = |v: Option<usize>| v.map_or_else(|| "any".to_string(), |v| v.to_string());
        write!(f, "{}-{}", show(self.min), show(self.max))
    }
}

fn checked_bound(field: &str, value: i64) -> Result<usize, FilterError> {
    if value < 0 {
        return Err(FilterError::Negative {
            field: field.to_string(),
            value,
        });
    }
    if value > MAX_BOUND {
        return Err(FilterError::TooLarge {
            field: field.to_string(),
            value,
        });
    }
    Ok(value as usize)
}

// ---------------------------------------------------------------------------
// Filter options
// ---------------------------------------------------------------------------

/// Positions that accept a count constraint.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
pub enum CountedPosition {
    QB,
    RB,
    WR,
    TE,
}

impl CountedPosition {
    pub const ALL: [CountedPosition; 4] = [
        CountedPosition::QB,
        CountedPosition::RB,
        CountedPosition::WR,
        CountedPosition::TE,
    ];

    pub fn from_str_pos(s: &str) -> Option<Self> {
        match s.to_uppercase().as_str() {
            "QB" => Some(CountedPosition::QB),
            "RB" => Some(CountedPosition::RB),
            "WR" => Some(CountedPosition::WR),
            "TE" => Some(CountedPosition::TE),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            CountedPosition::QB => "QB",
            CountedPosition::RB => "RB",
            CountedPosition::WR => "WR",
            CountedPosition::TE => "TE",
        }
    }
}

impl fmt::Display for CountedPosition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Roster view filter state. Every list uses AND semantics.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct FilterOptions {
    pub teams: Vec<String>,
    pub players: Vec<String>,
    /// Matched against the actual position or the roster slot (`FLEX`, `BN`).
    pub positions: Vec<String>,
    /// Bound on the roster's largest same-team group.
    pub stack_size: Bounds,
    pub position_counts: BTreeMap<CountedPosition, Bounds>,
}

impl FilterOptions {
    pub fn add_team(&mut self, team: &str) {
        push_unique(&mut self.teams, team);
    }

    pub fn add_player(&mut self, player: &str) {
        push_unique(&mut self.players, player);
    }

    pub fn add_position(&mut self, position: &str) {
        push_unique(&mut self.positions, position);
    }

    /// Set a position-count constraint. An entry with both ends open is
    /// dropped rather than stored.
    pub fn set_position_count(&mut self, position: CountedPosition, bounds: Bounds) {
        if bounds.is_open() {
            self.position_counts.remove(&position);
        } else {
            self.position_counts.insert(position, bounds);
        }
    }

    pub fn clear(&mut self) {
        *self = FilterOptions::default();
    }

    pub fn is_active(&self) -> bool {
        !self.teams.is_empty()
            || !self.players.is_empty()
            || !self.positions.is_empty()
            || !self.stack_size.is_open()
            || !self.position_counts.is_empty()
    }

    /// Check every bound. Inputs built through [`Bounds::parse`] already
    /// pass; this catches values assembled by hand.
    pub fn validate(&self) -> Result<(), FilterError> {
        self.stack_size.validate("stack_size")?;
        for (position, bounds) in &self.position_counts {
            bounds.validate(position.as_str())?;
        }
        Ok(())
    }
}

impl fmt::Display for FilterOptions {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut parts = Vec::new();
        if !self.teams.is_empty() {
            parts.push(format!("Teams: {}", self.teams.join(", ")));
        }
        if !self.players.is_empty() {
            parts.push(format!("Players: {}", self.players.join(", ")));
        }
        if !self.positions.is_empty() {
            parts.push(format!("Positions: {}", self.positions.join(", ")));
        }
        if !self.stack_size.is_open() {
            parts.push(format!("Stack size: {}", self.stack_size));
        }
        if !self.position_counts.is_empty() {
            let counts: Vec<String> = self
                .position_counts
                .iter()
                .map(|(position, bounds)| format!("{position}: {bounds}"))
                .collect();
            parts.push(format!("Position counts: {}", counts.join(", ")));
        }
        f.write_str(&parts.join(" | "))
    }
}

fn push_unique(list: &mut Vec<String>, value: &str) {
    if !list.iter().any(|v| v == value) {
        list.push(value.to_string());
    }
}

// ---------------------------------------------------------------------------
// Sorting
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub enum SortDirection {
    #[default]
    Asc,
    Desc,
}

impl SortDirection {
    /// Orient an ascending comparison result.
    pub fn apply(self, ordering: Ordering) -> Ordering {
        match self {
            SortDirection::Asc => ordering,
            SortDirection::Desc => ordering.reverse(),
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub enum RosterSortField {
    AverageAdp,
    #[default]
    LineupId,
}

/// Roster view sort. Defaults to lineup id ascending.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct SortOptions {
    pub field: RosterSortField,
    pub direction: SortDirection,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub enum StatSortField {
    /// Stack frequency, shared-roster count or exposure roster count.
    #[default]
    Frequency,
    AverageAdp,
}

/// Sort for the stack, association and exposure lists. Defaults to
/// frequency descending.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct StatSort {
    pub field: StatSortField,
    pub direction: SortDirection,
}

impl Default for StatSort {
    fn default() -> Self {
        StatSort {
            field: StatSortField::Frequency,
            direction: SortDirection::Desc,
        }
    }
}

/// Stable sort on a numeric key. Ties keep their input order.
pub fn sort_by_metric<T>(items: &mut [T], direction: SortDirection, metric: impl Fn(&T) -> f64) {
    items.sort_by(|a, b| {
        let ordering = metric(a).partial_cmp(&metric(b)).unwrap_or(Ordering::Equal);
        direction.apply(ordering)
    });
}

// ---------------------------------------------------------------------------
// Predicates
// ---------------------------------------------------------------------------

/// AND team filter: every selected team must appear among `teams`. An empty
/// selection always matches.
pub fn teams_match<'a>(selected: &[String], teams: impl IntoIterator<Item = &'a str>) -> bool {
    if selected.is_empty() {
        return true;
    }
    let present: HashSet<&str> = teams.into_iter().collect();
    selected.iter().all(|team| present.contains(team.as_str()))
}

/// Whether a roster passes every active filter.
pub fn roster_matches(roster: &EnrichedRoster, filters: &FilterOptions) -> bool {
    if !teams_match(&filters.teams, roster.players.iter().map(|p| p.actual_team.as_str())) {
        return false;
    }

    if !filters.players.is_empty() {
        let names: Vec<String> = roster.players.iter().map(|p| p.full_name()).collect();
        let has_all = filters
            .players
            .iter()
            .all(|query| names.iter().any(|name| crate::normalize::name_matches(name, query)));
        if !has_all {
            return false;
        }
    }

    if !filters.positions.is_empty() {
        let has_all = filters
            .positions
            .iter()
            .all(|position| roster.position_count(position) > 0 || roster.slot_players(position).next().is_some());
        if !has_all {
            return false;
        }
    }

    if !filters.stack_size.is_open() && !filters.stack_size.contains(roster.max_stack_size()) {
        return false;
    }

    filters
        .position_counts
        .iter()
        .all(|(position, bounds)| bounds.contains(roster.position_count(position.as_str())))
}

/// Rosters passing `filters`, in input order.
pub fn apply_filters<'a, I>(rosters: I, filters: &FilterOptions) -> Vec<&'a EnrichedRoster>
where
    I: IntoIterator<Item = &'a EnrichedRoster>,
{
    rosters
        .into_iter()
        .filter(|roster| roster_matches(roster, filters))
        .collect()
}

/// Rosters ordered by `sort`, as a new sequence.
pub fn sort_rosters<'a, I>(rosters: I, sort: SortOptions) -> Vec<&'a EnrichedRoster>
where
    I: IntoIterator<Item = &'a EnrichedRoster>,
{
    let mut sorted: Vec<&EnrichedRoster> = rosters.into_iter().collect();
    sort_by_metric(&mut sorted, sort.direction, |roster| match sort.field {
        RosterSortField::AverageAdp => roster.average_adp,
        RosterSortField::LineupId => roster.lineup_id as f64,
    });
    sorted
}

/// Filter then sort: the roster view's list.
pub fn filter_and_sort_rosters<'a>(
    rosters: &'a [EnrichedRoster],
    filters: &FilterOptions,
    sort: SortOptions,
) -> Vec<&'a EnrichedRoster> {
    sort_rosters(apply_filters(rosters, filters), sort)
}

// ---------------------------------------------------------------------------
// Available filter values
// ---------------------------------------------------------------------------

/// A distinct player offered by the player filter.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PlayerOption {
    pub name: String,
    pub position: String,
    pub team: String,
}

/// Values the roster view can offer as filter choices.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct AvailableFilterValues {
    pub teams: Vec<String>,
    /// Alphabetical by name; the first occurrence supplies position and team.
    pub players: Vec<PlayerOption>,
    pub positions: Vec<String>,
    /// Sizes of same-team groups of two or more, across all rosters.
    pub stack_sizes: Vec<usize>,
}

pub fn available_filter_values(rosters: &[EnrichedRoster]) -> AvailableFilterValues {
    let mut teams = BTreeSet::new();
    let mut positions = BTreeSet::new();
    let mut stack_sizes = BTreeSet::new();
    let mut players: BTreeMap<String, PlayerOption> = BTreeMap::new();

    for roster in rosters {
        for player in &roster.players {
            teams.insert(player.actual_team.clone());
            positions.insert(player.actual_position.clone());
            let name = player.full_name();
            players.entry(name.clone()).or_insert_with(|| PlayerOption {
                name,
                position: player.actual_position.clone(),
                team: player.actual_team.clone(),
            });
        }
        for group in roster.team_groups().values() {
            if group.len() >= 2 {
                stack_sizes.insert(group.len());
            }
        }
    }

    AvailableFilterValues {
        teams: teams.into_iter().collect(),
        players: players.into_values().collect(),
        positions: positions.into_iter().collect(),
        stack_sizes: stack_sizes.into_iter().collect(),
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
