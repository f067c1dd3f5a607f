use tracing::{info, warn};

use crate::error::StoreError;
use crate::infra::local::{LocalStore, PendingWrite};
use crate::infra::store::TableStore;

#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct ReplayReport {
    pub replayed: usize,
    pub failed: usize,
    /// Writes for tables with no configured remote.
    pub skipped: usize,
}

// ── ReplayPendingWrites ──────────────────────────────────────────────────────

/// Push writes made during remote outages back to the remote tables.
///
/// Each pending write is replayed with last-write-wins semantics: upserts
/// overwrite whatever the remote holds and tombstones delete it. A write is
/// marked synced only after the remote accepted it.
pub struct ReplayPendingWritesUseCase<R: TableStore> {
    pub local: LocalStore,
    pub remotes: Vec<R>,
}

impl<R: TableStore> ReplayPendingWritesUseCase<R> {
    pub async fn execute(&self) -> Result<ReplayReport, StoreError> {
        let mut report = ReplayReport::default();
        for write in self.local.pending().await? {
            let Some(remote) = self.remotes.iter().find(|r| r.table_name() == write.table) else {
                warn!(table = %write.table, "no remote table for pending write");
                report.skipped += 1;
                continue;
            };
            match push(remote, &write).await {
                Ok(()) => {
                    self.local.mark_synced(write.id).await?;
                    report.replayed += 1;
                }
                Err(e) => {
                    warn!(
                        table = %write.table,
                        partition_key = %write.entity.partition_key,
                        row_key = %write.entity.row_key,
                        error = %e,
                        "replay failed"
                    );
                    report.failed += 1;
                }
            }
        }
        info!(
            replayed = report.replayed,
            failed = report.failed,
            skipped = report.skipped,
            "pending writes replayed"
        );
        Ok(report)
    }
}

async fn push<R: TableStore>(remote: &R, write: &PendingWrite) -> Result<(), StoreError> {
    let entity = &write.entity;
    if write.deleted {
        return remote.delete(&entity.partition_key, &entity.row_key).await;
    }
    match remote.replace(entity).await {
        Err(StoreError::NotFound) => remote.insert(entity).await,
        other => other,
    }
}
