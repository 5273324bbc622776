use std::time::Duration;

use anyhow::Result;
use tokio::select;
use tokio_util::sync::CancellationToken;
use tracing::info;

use crate::{
    stats::{StatsReport, StatsService},
    store::record_store::RecordStore,
    utils::clock::Clock,
};

/// Detects Ctrl-C sent to the process and cancels the token.
pub async fn detect_shutdown(cancelation: CancellationToken) {
    select! {
        _ = tokio::signal::ctrl_c() => {
            cancelation.cancel();
        },
        _ = cancelation.cancelled() => (),
    };
}

/// Re-evaluates the stats every `every` until `shutdown` is cancelled. A failed render stops the
/// loop.
pub async fn watch<S: RecordStore, C: Clock>(
    service: &StatsService<S, C>,
    every: Duration,
    shutdown: CancellationToken,
    mut render: impl FnMut(&StatsReport) -> Result<()>,
) -> Result<()> {
    info!("Watching every {every:?}");
    loop {
        let report = service.refresh().await;
        render(&report)?;

        select! {
            _ = shutdown.cancelled() => {
                return Ok(())
            }
            _ = service.clock().sleep(every) => ()
        }
    }
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use anyhow::Result;
    use chrono::{TimeZone, Utc};
    use tokio_util::sync::CancellationToken;

    use crate::{
        stats::StatsService,
        store::record_store::MockRecordStore,
        utils::clock::FixedClock,
    };

    use super::watch;

    #[tokio::test(start_paused = true)]
    async fn test_watch_refreshes_until_cancelled() -> Result<()> {
        let mut store = MockRecordStore::new();
        // 5 collections per refresh, 3 refreshes.
        store
            .expect_read_collection()
            .returning(|_| Ok(vec![]))
            .times(15);
        let service = StatsService::new(
            store,
            FixedClock(Utc.with_ymd_and_hms(2025, 3, 12, 12, 0, 0).unwrap()),
        );

        let shutdown = CancellationToken::new();
        let mut rendered = 0;
        watch(&service, Duration::from_secs(30), shutdown.clone(), |report| {
            rendered += 1;
            assert_eq!(report.productivity.days.len(), 7);
            if rendered == 3 {
                shutdown.cancel();
            }
            Ok(())
        })
        .await?;

        assert_eq!(rendered, 3);
        Ok(())
    }

    #[tokio::test(start_paused = true)]
    async fn test_render_error_stops_watch() {
        let mut store = MockRecordStore::new();
        store.expect_read_collection().returning(|_| Ok(vec![]));
        let service = StatsService::new(
            store,
            FixedClock(Utc.with_ymd_and_hms(2025, 3, 12, 12, 0, 0).unwrap()),
        );

        let result = watch(
            &service,
            Duration::from_secs(1),
            CancellationToken::new(),
            |_| Err(anyhow::anyhow!("stdout closed")),
        )
        .await;
        assert!(result.is_err());
    }
}
