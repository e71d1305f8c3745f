// Text and JSON rendering of analysis results.

use bestball_core::adp::AdpStats;
use bestball_core::associations::{PlayerAssociation, PlayerAssociationsAnalysis};
use bestball_core::exposure::PlayerExposure;
use bestball_core::filter::FilterOptions;
use bestball_core::model::{AdpEntry, EnrichedPlayer, EnrichedRoster};
use bestball_core::rosters::RosterSummary;
use bestball_core::search::PlayerSearchResult;
use bestball_core::stacks::Stack;
use bestball_core::NO_ADP_SENTINEL;
use serde::Serialize;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Format {
    Text,
    Json,
}

impl Format {
    pub fn from_json_flag(json: bool) -> Self {
        if json {
            Format::Json
        } else {
            Format::Text
        }
    }
}

fn adp_label(adp: f64) -> String {
    if adp <= 0.0 || adp >= NO_ADP_SENTINEL {
        "-".to_string()
    } else {
        format!("{adp:.1}")
    }
}

/// One line per entry, newline-terminated.
fn text(lines: Vec<String>) -> String {
    let mut out = lines.join("\n");
    out.push('\n');
    out
}

fn player_label(player: &EnrichedPlayer) -> String {
    format!(
        "{} ({}, {})",
        player.full_name(),
        player.actual_position,
        player.actual_team
    )
}

// ---------------------------------------------------------------------------
// Rosters
// ---------------------------------------------------------------------------

#[derive(Serialize)]
struct RosterReport<'a> {
    total_rosters: usize,
    matched: usize,
    filters: &'a FilterOptions,
    rosters: Vec<RosterEntry<'a>>,
}

#[derive(Serialize)]
struct RosterEntry<'a> {
    #[serde(flatten)]
    summary: RosterSummary,
    players: &'a [EnrichedPlayer],
}

/// `shown` is the filtered and sorted list, possibly truncated; `matched`
/// is its length before truncation.
pub fn rosters(
    shown: &[&EnrichedRoster],
    matched: usize,
    total_rosters: usize,
    filters: &FilterOptions,
    format: Format,
) -> serde_json::Result<String> {
    if format == Format::Json {
        let report = RosterReport {
            total_rosters,
            matched,
            filters,
            rosters: shown
                .iter()
                .map(|r| RosterEntry {
                    summary: RosterSummary::from(*r),
                    players: &r.players,
                })
                .collect(),
        };
        return serde_json::to_string_pretty(&report);
    }

    let mut lines = vec![format!("{matched} of {total_rosters} rosters match")];
    if filters.is_active() {
        lines.push(format!("Filters: {filters}"));
    }
    for roster in shown {
        let summary = RosterSummary::from(*roster);
        lines.push(String::new());
        lines.push(format!(
            "#{} {}  avg ADP {}  total ADP {:.1}  largest stack {}",
            summary.lineup_id,
            summary.name,
            adp_label(summary.average_adp),
            summary.total_adp,
            summary.max_stack_size
        ));
        lines.extend(roster.players.iter().map(|player| {
            format!(
                "  {:<5} {:<28} ADP {}",
                player.player.position,
                player_label(player),
                player.adp.map_or_else(|| "-".to_string(), adp_label)
            )
        }));
    }
    Ok(text(lines))
}

// ---------------------------------------------------------------------------
// Stacks
// ---------------------------------------------------------------------------

#[derive(Serialize)]
struct StackReport<'a> {
    total_rosters: usize,
    stacks: &'a [&'a Stack],
}

pub fn stacks(shown: &[&Stack], total_rosters: usize, format: Format) -> serde_json::Result<String> {
    if format == Format::Json {
        return serde_json::to_string_pretty(&StackReport {
            total_rosters,
            stacks: shown,
        });
    }

    let mut lines = vec![format!("{} stacks across {total_rosters} rosters", shown.len())];
    lines.extend(shown.iter().map(|stack| {
        format!(
            "{:<4} {:<60} {:>4} rosters ({:>5.1}%)  avg ADP {}",
            stack.team,
            stack.player_names.join(" + "),
            stack.frequency,
            stack.percentage,
            adp_label(stack.average_adp)
        )
    }));
    Ok(text(lines))
}

// ---------------------------------------------------------------------------
// Associations
// ---------------------------------------------------------------------------

#[derive(Serialize)]
struct AssociationReport<'a> {
    searched_player: &'a EnrichedPlayer,
    searched_player_rosters: usize,
    associations: &'a [&'a PlayerAssociation],
}

/// `analysis` is `None` when no rostered player matched `query`.
pub fn associations(
    query: &str,
    analysis: Option<&PlayerAssociationsAnalysis>,
    shown: &[&PlayerAssociation],
    format: Format,
) -> serde_json::Result<String> {
    let Some(analysis) = analysis else {
        return match format {
            Format::Json => Ok("null".to_string()),
            Format::Text => Ok(format!("No rostered player matches \"{query}\"\n")),
        };
    };

    if format == Format::Json {
        return serde_json::to_string_pretty(&AssociationReport {
            searched_player: &analysis.searched_player,
            searched_player_rosters: analysis.searched_player_rosters,
            associations: shown,
        });
    }

    let mut lines = vec![format!(
        "{} appears on {} rosters",
        player_label(&analysis.searched_player),
        analysis.searched_player_rosters
    )];
    lines.extend(shown.iter().map(|association| {
        format!(
            "  {:<32} {:>4} shared ({:>5.1}%)  ADP {}",
            player_label(&association.player),
            association.shared_rosters,
            association.shared_percentage,
            adp_label(association.average_adp)
        )
    }));
    Ok(text(lines))
}

// ---------------------------------------------------------------------------
// Exposure
// ---------------------------------------------------------------------------

#[derive(Serialize)]
struct ExposureReport<'a> {
    total_rosters: usize,
    exposures: &'a [&'a PlayerExposure],
}

pub fn exposures(shown: &[&PlayerExposure], total_rosters: usize, format: Format) -> serde_json::Result<String> {
    if format == Format::Json {
        return serde_json::to_string_pretty(&ExposureReport {
            total_rosters,
            exposures: shown,
        });
    }

    let mut lines = vec![format!("Exposure across {total_rosters} rosters")];
    lines.extend(shown.iter().map(|exposure| {
        format!(
            "  {:<32} {:>4} rosters ({:>5.1}%)  ADP {}",
            player_label(&exposure.player),
            exposure.roster_count,
            exposure.exposure_percentage,
            adp_label(exposure.average_adp)
        )
    }));
    Ok(text(lines))
}

// ---------------------------------------------------------------------------
// Search
// ---------------------------------------------------------------------------

pub fn search(results: &[PlayerSearchResult], format: Format) -> serde_json::Result<String> {
    if format == Format::Json {
        return serde_json::to_string_pretty(results);
    }

    if results.is_empty() {
        return Ok("No matches (queries need at least two characters)\n".to_string());
    }
    let lines = results
        .iter()
        .map(|result| {
            format!(
                "  {:<28} {:<3} {:<4} x{}",
                result.name, result.position, result.team, result.count
            )
        })
        .collect();
    Ok(text(lines))
}

// ---------------------------------------------------------------------------
// ADP table
// ---------------------------------------------------------------------------

#[derive(Serialize)]
struct RankedAdpEntry<'a> {
    #[serde(flatten)]
    entry: &'a AdpEntry,
    overall_rank: Option<usize>,
    position_rank: Option<usize>,
}

/// Entries with their overall and position ranks.
pub fn adp_entries(
    ranked: &[(&AdpEntry, Option<usize>, Option<usize>)],
    format: Format,
) -> serde_json::Result<String> {
    if format == Format::Json {
        let rows: Vec<RankedAdpEntry> = ranked
            .iter()
            .map(|&(entry, overall_rank, position_rank)| RankedAdpEntry {
                entry,
                overall_rank,
                position_rank,
            })
            .collect();
        return serde_json::to_string_pretty(&rows);
    }

    let rank = |r: Option<usize>| r.map_or_else(|| "-".to_string(), |r| r.to_string());
    let lines = ranked
        .iter()
        .map(|&(entry, overall, position)| {
            format!(
                "  {:>6} {:<28} {:<3} {:<4} overall {:>4}  {}{}",
                adp_label(entry.adp),
                entry.name,
                entry.position,
                entry.team,
                rank(overall),
                entry.position,
                rank(position)
            )
        })
        .collect();
    Ok(text(lines))
}

pub fn adp_stats(stats: Option<&AdpStats>, format: Format) -> serde_json::Result<String> {
    if format == Format::Json {
        return serde_json::to_string_pretty(&stats);
    }
    let Some(stats) = stats else {
        return Ok("ADP table is empty\n".to_string());
    };

    let mut lines = vec![format!(
        "{} players, average ADP {:.1}",
        stats.total_players, stats.average_adp
    )];
    lines.extend(stats.positions.iter().map(|position| {
        let top = position
            .top_player
            .as_ref()
            .map_or("-", |p| p.name.as_str());
        format!(
            "  {:<4} {:>4} players  avg {:>6.1}  top {top}",
            position.position, position.count, position.average_adp
        )
    }));
    Ok(text(lines))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn adp_labels() {
        assert_eq!(adp_label(12.345), "12.3");
        assert_eq!(adp_label(0.0), "-");
        assert_eq!(adp_label(NO_ADP_SENTINEL), "-");
    }

    #[test]
    fn empty_search_explains_minimum() {
        let text = search(&[], Format::Text).unwrap();
        assert!(text.contains("two characters"));
        assert_eq!(search(&[], Format::Json).unwrap(), "[]");
    }

    #[test]
    fn text_output_is_newline_terminated_lines() {
        assert_eq!(text(vec!["a".into(), String::new(), "b".into()]), "a\n\nb\n");
        let results = vec![PlayerSearchResult {
            name: "Josh Allen".into(),
            position: "QB".into(),
            team: "BUF".into(),
            count: 2,
        }];
        let out = search(&results, Format::Text).unwrap();
        assert_eq!(out.lines().count(), 1);
        assert!(out.ends_with("x2\n"));
    }

    #[test]
    fn missing_association_player() {
        let text = associations("zzz", None, &[], Format::Text).unwrap();
        assert_eq!(text, "No rostered player matches \"zzz\"\n");
        assert_eq!(associations("zzz", None, &[], Format::Json).unwrap(), "null");
    }
}
