use std::sync::Arc;
use std::time::Duration;

use log::{debug, error, info};
use tokio::time::MissedTickBehavior;

use crate::checkout::Checkout;
use crate::forks::ForkLister;

/// Fetch all remotes and refresh the fork cache every `intv_secs`, forever.
/// The first round happens one interval after start, the checkout is fresh
/// right after cloning.
pub async fn start_refresh(checkout: Arc<Checkout>, forks: Arc<ForkLister>, intv_secs: u64) {
    info!("Refresh loop starting, interval: {intv_secs}s");
    let period = Duration::from_secs(intv_secs);
    let mut tk = tokio::time::interval_at(tokio::time::Instant::now() + period, period);
    tk.set_missed_tick_behavior(MissedTickBehavior::Delay);
    loop {
        let _ = tk.tick().await;

        let result = checkout
            .run(|repo| async move {
                debug!("git fetch '{}'", repo.path().display());
                repo.fetch().await
            })
            .await;
        match result {
            Ok(()) => debug!("Fetched checkout"),
            Err(e) => error!("Failed to fetch checkout: {e:#}"),
        }

        if let Err(e) = forks.refresh().await {
            error!("Failed to refresh forks: {e:#}");
        }
    }
}
