// Command execution.
//
// Builds the configured data source, and runs one subcommand against a
// loaded snapshot. Execution is synchronous; only the load is async.

use std::path::Path;

use async_trait::async_trait;
use bestball_core::associations::{
    analyze_associations_by_name, filter_and_sort_associations, search_association_players,
};
use bestball_core::exposure::{analyze_exposure, filter_and_sort_exposures, search_exposures};
use bestball_core::filter::{filter_and_sort_rosters, FilterError};
use bestball_core::model::{AdpEntry, DraftablePlayer, Roster};
use bestball_core::repository::Snapshot;
use bestball_core::search::search_rosters;
use bestball_core::source::{DataSource, FileSource, HttpSource, SourceError};
use bestball_core::stacks::{analyze_stacks, filter_and_sort_stacks};
use thiserror::Error;
use tracing::info;

use crate::cli::{Command, SearchScope};
use crate::config::{Config, SourceKind};
use crate::report::{self, Format};

#[derive(Debug, Error)]
pub enum AppError {
    #[error("invalid filter: {0}")]
    Filter(#[from] FilterError),

    #[error("failed to render JSON output: {0}")]
    Render(#[from] serde_json::Error),
}

// ---------------------------------------------------------------------------
// Data source selection
// ---------------------------------------------------------------------------

/// The data source named by `[data] source`.
#[derive(Debug, Clone)]
pub enum ConfiguredSource {
    Files(FileSource),
    Http(HttpSource),
}

impl ConfiguredSource {
    /// File paths resolve against `base_dir`. Config validation guarantees a
    /// base URL for the HTTP source.
    pub fn from_config(config: &Config, base_dir: &Path) -> Self {
        let contest = config.contest.draft_group_id;
        match (config.data.source, config.data.base_url.as_deref()) {
            (SourceKind::Http, Some(url)) => {
                info!("reading data over HTTP from {url}");
                ConfiguredSource::Http(HttpSource::new(url, contest))
            }
            _ => {
                info!("reading data files under {}", base_dir.display());
                ConfiguredSource::Files(FileSource::new(base_dir, config.data.paths.clone(), contest))
            }
        }
    }
}

#[async_trait]
impl DataSource for ConfiguredSource {
    async fn fetch_rosters(&self) -> Result<Vec<Roster>, SourceError> {
        match self {
            ConfiguredSource::Files(source) => source.fetch_rosters().await,
            ConfiguredSource::Http(source) => source.fetch_rosters().await,
        }
    }

    async fn fetch_adp(&self) -> Result<Vec<AdpEntry>, SourceError> {
        match self {
            ConfiguredSource::Files(source) => source.fetch_adp().await,
            ConfiguredSource::Http(source) => source.fetch_adp().await,
        }
    }

    async fn fetch_draftables(&self) -> Result<Vec<DraftablePlayer>, SourceError> {
        match self {
            ConfiguredSource::Files(source) => source.fetch_draftables().await,
            ConfiguredSource::Http(source) => source.fetch_draftables().await,
        }
    }
}

// ---------------------------------------------------------------------------
// Command execution
// ---------------------------------------------------------------------------

/// Run `command` over `snapshot` and return the rendered output.
pub fn execute(command: &Command, snapshot: &Snapshot, config: &Config, format: Format) -> Result<String, AppError> {
    let rosters = &snapshot.rosters;
    let output = match command {
        Command::Rosters(args) => {
            let filters = args.filters()?;
            let mut shown = filter_and_sort_rosters(rosters, &filters, args.sort_options());
            let matched = shown.len();
            if let Some(limit) = args.limit {
                shown.truncate(limit);
            }
            info!(matched, filters = %filters, "roster view");
            report::rosters(&shown, matched, rosters.len(), &filters, format)?
        }
        Command::Stacks(args) => {
            let (min_size, max_size) =
                args.size_range(config.analysis.min_stack_size, config.analysis.max_stack_size)?;
            let analysis = analyze_stacks(rosters, min_size, max_size);
            let mut shown = filter_and_sort_stacks(&analysis, &args.filter(), args.sort.to_sort());
            shown.truncate(args.limit);
            report::stacks(&shown, analysis.total_rosters, format)?
        }
        Command::Associations(args) => {
            let analysis = analyze_associations_by_name(rosters, &args.player);
            let mut shown = analysis
                .as_ref()
                .map(|a| filter_and_sort_associations(a, &args.teams, args.sort.to_sort()))
                .unwrap_or_default();
            shown.truncate(args.limit);
            report::associations(&args.player, analysis.as_ref(), &shown, format)?
        }
        Command::Exposure(args) => {
            let analysis = analyze_exposure(rosters);
            let mut shown = filter_and_sort_exposures(&analysis, &args.filter(), args.sort.to_sort());
            shown.truncate(args.limit);
            report::exposures(&shown, analysis.total_rosters, format)?
        }
        Command::Search(args) => {
            let results = match args.scope {
                SearchScope::Rosters => search_rosters(rosters, &args.query),
                SearchScope::Associations => search_association_players(rosters, &args.query),
                SearchScope::Exposure => search_exposures(&analyze_exposure(rosters), &args.query),
            };
            report::search(&results, format)?
        }
        Command::Adp(args) => {
            let table = &snapshot.tables.adp;
            if args.stats {
                report::adp_stats(table.stats().as_ref(), format)?
            } else {
                let mut entries = match (&args.search, &args.position) {
                    (Some(query), _) => table.search(query),
                    (None, Some(position)) => table.top_by_position(&position.to_uppercase(), args.limit),
                    (None, None) => table.entries().iter().collect(),
                };
                if let (Some(_), Some(position)) = (&args.search, &args.position) {
                    entries.retain(|e| e.position.eq_ignore_ascii_case(position));
                }
                entries.truncate(args.limit);
                let ranked: Vec<_> = entries
                    .into_iter()
                    .map(|entry| (entry, table.overall_rank(&entry.id), table.position_rank(&entry.id)))
                    .collect();
                report::adp_entries(&ranked, format)?
            }
        }
    };
    Ok(output)
}
