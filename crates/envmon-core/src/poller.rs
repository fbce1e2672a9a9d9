//! Dashboard Poller
//!
//! Refreshes the dashboard on a fixed interval and publishes the result
//! as a [`DashboardView`] through a watch channel. The last completed
//! refresh wins. A failed refresh never throws away data already shown.

use std::time::Duration;

use serde::Serialize;
use tokio::sync::watch;
use tokio::task::JoinHandle;
use tokio::time::{interval, MissedTickBehavior};
use tokio_util::sync::CancellationToken;
use tracing::{debug, warn};

use crate::dashboard::{Dashboard, DashboardData};

/// What the presentation layer should render
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum DashboardView {
    /// No refresh has completed yet
    Loading,
    /// The store holds no readings
    Empty,
    /// Latest derived data
    Ready(DashboardData),
    /// The last refresh failed
    Failed {
        /// Error message of the failed refresh
        error: String,
        /// Data from the last successful refresh, if any
        last: Option<DashboardData>,
    },
}

impl DashboardView {
    /// Data worth rendering, whether fresh or kept from before a failure
    pub fn data(&self) -> Option<&DashboardData> {
        match self {
            DashboardView::Ready(data) => Some(data),
            DashboardView::Failed { last, .. } => last.as_ref(),
            DashboardView::Loading | DashboardView::Empty => None,
        }
    }

    /// Next view after a refresh, given the current one
    fn next(&self, result: Result<Option<DashboardData>, String>) -> DashboardView {
        match result {
            Ok(Some(data)) => DashboardView::Ready(data),
            Ok(None) => DashboardView::Empty,
            Err(error) => DashboardView::Failed {
                error,
                last: self.data().cloned(),
            },
        }
    }
}

/// Background refresh loop
pub struct Poller {
    view: watch::Receiver<DashboardView>,
    handle: JoinHandle<()>,
}

impl Poller {
    /// Start polling `dashboard` every `period` until `cancel` fires
    ///
    /// The first refresh runs immediately.
    pub fn spawn(dashboard: Dashboard, period: Duration, cancel: CancellationToken) -> Self {
        let (tx, rx) = watch::channel(DashboardView::Loading);

        let handle = tokio::spawn(async move {
            let mut ticker = interval(period.max(Duration::from_millis(1)));
            ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

            loop {
                tokio::select! {
                    _ = cancel.cancelled() => {
                        debug!("Poller stopped");
                        break;
                    }
                    _ = ticker.tick() => {
                        let result = refresh_off_thread(&dashboard).await;
                        if let Err(e) = &result {
                            warn!("Dashboard refresh failed: {}", e);
                        }
                        tx.send_modify(|view| *view = view.next(result));
                    }
                }
            }
        });

        Self { view: rx, handle }
    }

    /// Subscribe to view updates
    pub fn subscribe(&self) -> watch::Receiver<DashboardView> {
        self.view.clone()
    }

    /// Current view
    pub fn current(&self) -> DashboardView {
        self.view.borrow().clone()
    }

    /// Wait for the loop to finish after cancellation
    pub async fn join(self) {
        if let Err(e) = self.handle.await {
            warn!("Poller task ended abnormally: {}", e);
        }
    }
}

/// Refresh on the blocking pool, store reads may hit the disk
async fn refresh_off_thread(dashboard: &Dashboard) -> Result<Option<DashboardData>, String> {
    let dashboard = dashboard.clone();
    match tokio::task::spawn_blocking(move || dashboard.refresh()).await {
        Ok(result) => result.map_err(|e| e.to_string()),
        Err(e) => Err(format!("Refresh task failed: {}", e)),
    }
}
