// Command-line interface.
//
// Each subcommand carries its view's filter and sort flags. Raw flag values
// are checked here and turned into the core filter types, so the analysis
// code only ever sees validated input.

use std::path::PathBuf;

use bestball_core::exposure::ExposureFilter;
use bestball_core::filter::{
    Bounds, CountedPosition, FilterError, FilterOptions, RosterSortField, SortDirection, SortOptions,
    StatSort, StatSortField,
};
use bestball_core::stacks::StackFilter;
use clap::{Args as ClapArgs, Parser, Subcommand, ValueEnum};

#[derive(Debug, Clone, Parser)]
#[command(name = "bestball", version, about = "Stack, association and exposure analysis for best ball rosters")]
pub struct Args {
    /// Print JSON instead of text.
    #[arg(long, global = true)]
    pub json: bool,

    /// Directory holding config/, defaults/ and the data files.
    #[arg(long, global = true, default_value = ".")]
    pub base_dir: PathBuf,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Debug, Clone, Subcommand)]
pub enum Command {
    /// List rosters, filtered and sorted.
    Rosters(RosterArgs),
    /// Same-team stacks across all rosters.
    Stacks(StackArgs),
    /// Players drafted alongside one player.
    Associations(AssociationArgs),
    /// How often each player was drafted.
    Exposure(ExposureArgs),
    /// Find players by name.
    Search(SearchArgs),
    /// Browse the ADP table.
    Adp(AdpArgs),
}

// ---------------------------------------------------------------------------
// Shared sort flags
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum StatSortArg {
    Frequency,
    Adp,
}

#[derive(Debug, Clone, ClapArgs)]
pub struct StatSortArgs {
    /// Sort key.
    #[arg(long, value_enum, default_value_t = StatSortArg::Frequency)]
    pub sort: StatSortArg,

    /// Sort ascending instead of descending.
    #[arg(long)]
    pub asc: bool,
}

impl StatSortArgs {
    pub fn to_sort(&self) -> StatSort {
        StatSort {
            field: match self.sort {
                StatSortArg::Frequency => StatSortField::Frequency,
                StatSortArg::Adp => StatSortField::AverageAdp,
            },
            direction: if self.asc { SortDirection::Asc } else { SortDirection::Desc },
        }
    }
}

// ---------------------------------------------------------------------------
// rosters
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum RosterSortArg {
    Lineup,
    Adp,
}

#[derive(Debug, Clone, ClapArgs)]
pub struct RosterArgs {
    /// Require a player from this team (repeatable; all must match).
    #[arg(long = "team")]
    pub teams: Vec<String>,

    /// Require a player whose name contains this text (repeatable).
    #[arg(long = "player")]
    pub players: Vec<String>,

    /// Require a player at this position (repeatable).
    #[arg(long = "position")]
    pub positions: Vec<String>,

    /// Smallest allowed largest-team group.
    #[arg(long, allow_negative_numbers = true)]
    pub min_stack: Option<i64>,

    /// Largest allowed largest-team group.
    #[arg(long, allow_negative_numbers = true)]
    pub max_stack: Option<i64>,

    /// Position count bound such as `QB=1-2`, `RB=3-` or `TE=-1` (repeatable).
    #[arg(long = "count", value_parser = parse_position_count)]
    pub counts: Vec<PositionCountArg>,

    #[arg(long, value_enum, default_value_t = RosterSortArg::Lineup)]
    pub sort: RosterSortArg,

    /// Sort descending instead of ascending.
    #[arg(long)]
    pub desc: bool,

    /// Show at most this many rosters.
    #[arg(long)]
    pub limit: Option<usize>,
}

impl RosterArgs {
    pub fn filters(&self) -> Result<FilterOptions, FilterError> {
        let mut filters = FilterOptions::default();
        for team in &self.teams {
            filters.add_team(team);
        }
        for player in &self.players {
            filters.add_player(player);
        }
        for position in &self.positions {
            filters.add_position(position);
        }
        filters.stack_size = Bounds::parse("stack_size", self.min_stack, self.max_stack)?;
        for count in &self.counts {
            let bounds = Bounds::parse(count.position.as_str(), count.min, count.max)?;
            filters.set_position_count(count.position, bounds);
        }
        filters.validate()?;
        Ok(filters)
    }

    pub fn sort_options(&self) -> SortOptions {
        SortOptions {
            field: match self.sort {
                RosterSortArg::Lineup => RosterSortField::LineupId,
                RosterSortArg::Adp => RosterSortField::AverageAdp,
            },
            direction: if self.desc { SortDirection::Desc } else { SortDirection::Asc },
        }
    }
}

/// A parsed `--count POS=MIN-MAX` flag. Bounds are unchecked until
/// [`RosterArgs::filters`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PositionCountArg {
    pub position: CountedPosition,
    pub min: Option<i64>,
    pub max: Option<i64>,
}

pub fn parse_position_count(s: &str) -> Result<PositionCountArg, String> {
    let (position, range) = s
        .split_once('=')
        .ok_or_else(|| format!("expected POS=MIN-MAX, got `{s}`"))?;
    let position = CountedPosition::from_str_pos(position.trim())
        .ok_or_else(|| FilterError::UnknownPosition(position.trim().to_string()).to_string())?;

    let range = range.trim();
    let (min, max) = match range.split_once('-') {
        Some((min, max)) => (parse_bound(min)?, parse_bound(max)?),
        None => {
            let exact = parse_bound(range)?;
            (exact, exact)
        }
    };
    Ok(PositionCountArg { position, min, max })
}

fn parse_bound(s: &str) -> Result<Option<i64>, String> {
    let s = s.trim();
    if s.is_empty() {
        return Ok(None);
    }
    s.parse::<i64>()
        .map(Some)
        .map_err(|_| format!("`{s}` is not a whole number"))
}

// ---------------------------------------------------------------------------
// stacks
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, ClapArgs)]
pub struct StackArgs {
    /// Smallest stack to enumerate; defaults to the configured value.
    #[arg(long, allow_negative_numbers = true)]
    pub min_size: Option<i64>,

    /// Largest stack to enumerate; defaults to the configured value.
    #[arg(long, allow_negative_numbers = true)]
    pub max_size: Option<i64>,

    /// Only stacks from this team (repeatable; all must match).
    #[arg(long = "team")]
    pub teams: Vec<String>,

    #[command(flatten)]
    pub sort: StatSortArgs,

    #[arg(long, default_value_t = 25)]
    pub limit: usize,
}

impl StackArgs {
    /// Enumeration range: flags override the configured sizes, which config
    /// validation has already bounded.
    pub fn size_range(&self, configured_min: usize, configured_max: usize) -> Result<(usize, usize), FilterError> {
        let flags = Bounds::parse("stack size", self.min_size, self.max_size)?;
        let min = flags.min.unwrap_or(configured_min);
        let max = flags.max.unwrap_or(configured_max);
        if min > max {
            return Err(FilterError::Inverted {
                field: "stack size".to_string(),
                min,
                max,
            });
        }
        Ok((min, max))
    }

    pub fn filter(&self) -> StackFilter {
        StackFilter {
            size: Bounds::default(),
            teams: self.teams.clone(),
        }
    }
}

// ---------------------------------------------------------------------------
// associations
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, ClapArgs)]
pub struct AssociationArgs {
    /// Name, or part of a name, of the player to analyze.
    pub player: String,

    /// Only associated players from this team (repeatable; all must match).
    #[arg(long = "team")]
    pub teams: Vec<String>,

    #[command(flatten)]
    pub sort: StatSortArgs,

    #[arg(long, default_value_t = 25)]
    pub limit: usize,
}

// ---------------------------------------------------------------------------
// exposure
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, ClapArgs)]
pub struct ExposureArgs {
    /// Only players from this team (repeatable; all must match).
    #[arg(long = "team")]
    pub teams: Vec<String>,

    /// Only players whose name contains this text.
    #[arg(long)]
    pub player: Option<String>,

    #[command(flatten)]
    pub sort: StatSortArgs,

    #[arg(long, default_value_t = 50)]
    pub limit: usize,
}

impl ExposureArgs {
    pub fn filter(&self) -> ExposureFilter {
        ExposureFilter {
            teams: self.teams.clone(),
            player: self.player.clone(),
        }
    }
}

// ---------------------------------------------------------------------------
// search
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum SearchScope {
    /// Count every roster appearance.
    Rosters,
    /// The association view's player picker; counts as `rosters`.
    Associations,
    /// Count rosters per player, as the exposure view does.
    Exposure,
}

#[derive(Debug, Clone, ClapArgs)]
pub struct SearchArgs {
    /// At least two characters of a player name.
    pub query: String,

    #[arg(long, value_enum, default_value_t = SearchScope::Rosters)]
    pub scope: SearchScope,
}

// ---------------------------------------------------------------------------
// adp
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, ClapArgs)]
pub struct AdpArgs {
    /// Only players at this position, earliest ADP first.
    #[arg(long)]
    pub position: Option<String>,

    /// Name or team substring.
    #[arg(long)]
    pub search: Option<String>,

    /// Print table statistics instead of players.
    #[arg(long)]
    pub stats: bool,

    #[arg(long, default_value_t = 20)]
    pub limit: usize,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(args: &[&str]) -> Args {
        Args::try_parse_from(std::iter::once("bestball").chain(args.iter().copied())).unwrap()
    }

    #[test]
    fn parses_position_counts() {
        assert_eq!(
            parse_position_count("qb=1-2").unwrap(),
            PositionCountArg {
                position: CountedPosition::QB,
                min: Some(1),
                max: Some(2)
            }
        );
        let open_max = parse_position_count("RB=3-").unwrap();
        assert_eq!((open_max.min, open_max.max), (Some(3), None));
        let open_min = parse_position_count("TE=-1").unwrap();
        assert_eq!((open_min.min, open_min.max), (None, Some(1)));
        let exact = parse_position_count("WR=4").unwrap();
        assert_eq!((exact.min, exact.max), (Some(4), Some(4)));

        assert!(parse_position_count("K=1-2").is_err());
        assert!(parse_position_count("QB").is_err());
        assert!(parse_position_count("QB=a-2").is_err());
    }

    #[test]
    fn roster_flags_become_filters() {
        let args = parse(&[
            "rosters", "--team", "KC", "--team", "BUF", "--player", "allen", "--count", "QB=1-2", "--min-stack",
            "2", "--sort", "adp", "--desc",
        ]);
        let Command::Rosters(rosters) = args.command else {
            panic!("expected rosters command");
        };
        let filters = rosters.filters().unwrap();
        assert_eq!(filters.teams, vec!["KC", "BUF"]);
        assert_eq!(filters.players, vec!["allen"]);
        assert_eq!(filters.stack_size, Bounds::new(Some(2), None));
        assert_eq!(
            filters.position_counts.get(&CountedPosition::QB),
            Some(&Bounds::new(Some(1), Some(2)))
        );
        assert_eq!(
            rosters.sort_options(),
            SortOptions {
                field: RosterSortField::AverageAdp,
                direction: SortDirection::Desc
            }
        );
    }

    #[test]
    fn invalid_roster_bounds_are_rejected() {
        let args = parse(&["rosters", "--min-stack", "-1"]);
        let Command::Rosters(rosters) = args.command else {
            panic!("expected rosters command");
        };
        assert!(matches!(rosters.filters(), Err(FilterError::Negative { .. })));

        let args = parse(&["rosters", "--count", "WR=5-2"]);
        let Command::Rosters(rosters) = args.command else {
            panic!("expected rosters command");
        };
        assert!(matches!(rosters.filters(), Err(FilterError::Inverted { .. })));
    }

    #[test]
    fn stat_sort_defaults_to_frequency_descending() {
        let args = parse(&["exposure", "--json"]);
        assert!(args.json);
        let Command::Exposure(exposure) = args.command else {
            panic!("expected exposure command");
        };
        assert_eq!(exposure.sort.to_sort(), StatSort::default());

        let args = parse(&["associations", "Josh Allen", "--sort", "adp", "--asc"]);
        let Command::Associations(assoc) = args.command else {
            panic!("expected associations command");
        };
        assert_eq!(assoc.player, "Josh Allen");
        assert_eq!(
            assoc.sort.to_sort(),
            StatSort {
                field: StatSortField::AverageAdp,
                direction: SortDirection::Asc
            }
        );
    }

    #[test]
    fn stack_size_range_uses_config_and_flags() {
        let args = parse(&["stacks", "--max-size", "3"]);
        let Command::Stacks(stacks) = args.command else {
            panic!("expected stacks command");
        };
        assert_eq!(stacks.size_range(2, 4).unwrap(), (2, 3));

        let args = parse(&["stacks", "--min-size", "5", "--max-size", "3"]);
        let Command::Stacks(stacks) = args.command else {
            panic!("expected stacks command");
        };
        assert!(stacks.size_range(2, 4).is_err());

        let args = parse(&["stacks", "--min-size", "6"]);
        let Command::Stacks(stacks) = args.command else {
            panic!("expected stacks command");
        };
        assert!(matches!(stacks.size_range(2, 4), Err(FilterError::Inverted { min: 6, max: 4, .. })));
    }

    #[test]
    fn stack_size_flags_reject_out_of_range_values() {
        let args = parse(&["stacks", "--min-size", "-2"]);
        let Command::Stacks(stacks) = args.command else {
            panic!("expected stacks command");
        };
        assert!(matches!(stacks.size_range(2, 4), Err(FilterError::Negative { value: -2, .. })));

        let args = parse(&["stacks", "--max-size", "9223372036854775807"]);
        let Command::Stacks(stacks) = args.command else {
            panic!("expected stacks command");
        };
        assert!(matches!(stacks.size_range(2, 4), Err(FilterError::TooLarge { .. })));

        assert!(Args::try_parse_from(["bestball", "stacks", "--max-size", "18446744073709551616"]).is_err());
    }

    #[test]
    fn search_scopes() {
        let args = parse(&["search", "allen", "--scope", "associations"]);
        let Command::Search(search) = args.command else {
            panic!("expected search command");
        };
        assert_eq!(search.scope, SearchScope::Associations);
    }
}
