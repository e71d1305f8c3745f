// Cached data repository.
//
// Owns a `DataSource` and one cache slot per document. A slot is filled on
// its first load and reused until `clear_cache`. Loads that find several
// slots empty fetch them concurrently.

use std::future::Future;
use std::sync::Arc;

use tracing::{debug, info};

use crate::adp::AdpTable;
use crate::draftables::DraftableTable;
use crate::enrich::{enrich_rosters, SideTables};
use crate::model::{EnrichedRoster, Roster};
use crate::source::{DataSource, SourceError};

/// Enriched rosters together with the side tables they were built from.
#[derive(Debug, Clone)]
pub struct Snapshot {
    pub rosters: Vec<EnrichedRoster>,
    pub tables: SideTables,
}

pub struct Repository<S> {
    source: S,
    rosters: Option<Arc<Vec<Roster>>>,
    adp: Option<Arc<AdpTable>>,
    draftables: Option<Arc<DraftableTable>>,
}

impl<S: DataSource> Repository<S> {
    pub fn new(source: S) -> Self {
        Repository {
            source,
            rosters: None,
            adp: None,
            draftables: None,
        }
    }

    pub fn source(&self) -> &S {
        &self.source
    }

    pub async fn load_rosters(&mut self) -> Result<Arc<Vec<Roster>>, SourceError> {
        let rosters = cached(&self.rosters, "rosters", || fetch_rosters(&self.source)).await?;
        self.rosters = Some(Arc::clone(&rosters));
        Ok(rosters)
    }

    pub async fn load_adp(&mut self) -> Result<Arc<AdpTable>, SourceError> {
        let table = cached(&self.adp, "ADP table", || fetch_adp(&self.source)).await?;
        self.adp = Some(Arc::clone(&table));
        Ok(table)
    }

    pub async fn load_draftables(&mut self) -> Result<Arc<DraftableTable>, SourceError> {
        let table = cached(&self.draftables, "draftables", || fetch_draftables(&self.source)).await?;
        self.draftables = Some(Arc::clone(&table));
        Ok(table)
    }

    /// Both side tables, fetching whichever are missing concurrently.
    pub async fn load_side_tables(&mut self) -> Result<SideTables, SourceError> {
        let (adp, draftables) = tokio::try_join!(
            cached(&self.adp, "ADP table", || fetch_adp(&self.source)),
            cached(&self.draftables, "draftables", || fetch_draftables(&self.source)),
        )?;
        self.adp = Some(Arc::clone(&adp));
        self.draftables = Some(Arc::clone(&draftables));
        Ok(SideTables::from_tables(adp, draftables))
    }

    /// Load everything missing concurrently, then enrich. Nothing is
    /// enriched unless all three loads succeed.
    pub async fn load_snapshot(&mut self) -> Result<Snapshot, SourceError> {
        let (rosters, adp, draftables) = tokio::try_join!(
            cached(&self.rosters, "rosters", || fetch_rosters(&self.source)),
            cached(&self.adp, "ADP table", || fetch_adp(&self.source)),
            cached(&self.draftables, "draftables", || fetch_draftables(&self.source)),
        )?;
        self.rosters = Some(Arc::clone(&rosters));
        self.adp = Some(Arc::clone(&adp));
        self.draftables = Some(Arc::clone(&draftables));

        let tables = SideTables::from_tables(adp, draftables);
        let enriched = enrich_rosters(&rosters, &tables);
        info!(rosters = enriched.len(), "enriched roster snapshot");
        Ok(Snapshot {
            rosters: enriched,
            tables,
        })
    }

    pub fn clear_cache(&mut self) {
        self.rosters = None;
        self.adp = None;
        self.draftables = None;
        debug!("cleared data cache");
    }

    /// Drop every cached document and load a fresh snapshot.
    pub async fn refresh(&mut self) -> Result<Snapshot, SourceError> {
        self.clear_cache();
        self.load_snapshot().await
    }
}

async fn cached<T, F, Fut>(slot: &Option<Arc<T>>, what: &str, fetch: F) -> Result<Arc<T>, SourceError>
where
    F: FnOnce() -> Fut,
    Fut: Future<Output = Result<Arc<T>, SourceError>>,
{
    match slot {
        Some(value) => {
            debug!("{what} served from cache");
            Ok(Arc::clone(value))
        }
        None => fetch().await,
    }
}

async fn fetch_rosters<S: DataSource>(source: &S) -> Result<Arc<Vec<Roster>>, SourceError> {
    let rosters = source.fetch_rosters().await?;
    info!(count = rosters.len(), "loaded rosters");
    Ok(Arc::new(rosters))
}

async fn fetch_adp<S: DataSource>(source: &S) -> Result<Arc<AdpTable>, SourceError> {
    let entries = source.fetch_adp().await?;
    info!(count = entries.len(), "loaded ADP table");
    Ok(Arc::new(AdpTable::new(entries)))
}

async fn fetch_draftables<S: DataSource>(source: &S) -> Result<Arc<DraftableTable>, SourceError> {
    let players = source.fetch_draftables().await?;
    info!(count = players.len(), "loaded draftables");
    Ok(Arc::new(DraftableTable::new(players)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{AdpEntry, DraftablePlayer};
    use crate::testing::{adp_entry, draftable, player, roster};
    use async_trait::async_trait;
    use std::sync::atomic::{AtomicUsize, Ordering};

    /// In-memory source that counts fetches and can be told to fail ADP.
    #[derive(Default)]
    struct CountingSource {
        roster_calls: AtomicUsize,
        adp_calls: AtomicUsize,
        draftable_calls: AtomicUsize,
        fail_adp: bool,
    }

    #[async_trait]
    impl DataSource for CountingSource {
        async fn fetch_rosters(&self) -> Result<Vec<Roster>, SourceError> {
            self.roster_calls.fetch_add(1, Ordering::SeqCst);
            Ok(vec![
                roster(1, vec![player(10, "Josh Allen", "QB", "BUF")]),
                roster(2, vec![player(11, "Unknown Rookie", "WR", "FA")]),
            ])
        }

        async fn fetch_adp(&self) -> Result<Vec<AdpEntry>, SourceError> {
            self.adp_calls.fetch_add(1, Ordering::SeqCst);
            if self.fail_adp {
                return Err(SourceError::Status {
                    url: "http://test/adp.csv".into(),
                    status: 503,
                });
            }
            Ok(vec![adp_entry("1", "Josh Allen", "QB", 22.0, "BUF")])
        }

        async fn fetch_draftables(&self) -> Result<Vec<DraftablePlayer>, SourceError> {
            self.draftable_calls.fetch_add(1, Ordering::SeqCst);
            Ok(vec![draftable(10, "QB", "BUF", Some("12"))])
        }
    }

    fn calls(source: &CountingSource) -> (usize, usize, usize) {
        (
            source.roster_calls.load(Ordering::SeqCst),
            source.adp_calls.load(Ordering::SeqCst),
            source.draftable_calls.load(Ordering::SeqCst),
        )
    }

    #[tokio::test]
    async fn loads_are_cached() {
        let mut repo = Repository::new(CountingSource::default());
        let first = repo.load_adp().await.unwrap();
        let second = repo.load_adp().await.unwrap();
        assert!(Arc::ptr_eq(&first, &second));
        repo.load_rosters().await.unwrap();
        repo.load_rosters().await.unwrap();
        assert_eq!(calls(repo.source()), (1, 1, 0));
    }

    #[tokio::test]
    async fn snapshot_enriches_and_reuses_cache() {
        let mut repo = Repository::new(CountingSource::default());
        repo.load_side_tables().await.unwrap();
        let snapshot = repo.load_snapshot().await.unwrap();
        assert_eq!(calls(repo.source()), (1, 1, 1));

        assert_eq!(snapshot.rosters.len(), 2);
        let allen = &snapshot.rosters[0].players[0];
        assert_eq!(allen.adp, Some(22.0));
        assert_eq!(allen.bye_week.as_deref(), Some("12"));
        assert_eq!(snapshot.rosters[1].players[0].adp, None);
        assert_eq!(snapshot.tables.adp.len(), 1);
    }

    #[tokio::test]
    async fn clear_and_refresh_refetch() {
        let mut repo = Repository::new(CountingSource::default());
        repo.load_snapshot().await.unwrap();
        repo.clear_cache();
        repo.load_adp().await.unwrap();
        assert_eq!(calls(repo.source()), (1, 2, 1));

        repo.refresh().await.unwrap();
        assert_eq!(calls(repo.source()), (2, 3, 2));
    }

    #[tokio::test]
    async fn failed_load_is_reported_and_not_cached() {
        let mut repo = Repository::new(CountingSource {
            fail_adp: true,
            ..Default::default()
        });
        let err = repo.load_snapshot().await.unwrap_err();
        assert!(matches!(err, SourceError::Status { status: 503, .. }));
        assert!(repo.load_adp().await.is_err());
        assert_eq!(repo.source().adp_calls.load(Ordering::SeqCst), 2);
    }
}
