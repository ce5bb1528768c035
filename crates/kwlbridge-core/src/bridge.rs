// Bridge engine
//
// One event-loop task owns the whole session/poll/translate/write-back
// cycle. The device's embedded HTTP server cannot tolerate overlapping
// connections (observed as connection resets), so there is deliberately
// no parallelism here: page fetches run sequentially with a fixed delay,
// and every timer fires into the same loop. The ignored-page set and the
// translator's created set are only ever touched from this task.

use std::collections::HashSet;
use std::sync::Arc;

use tokio::sync::{mpsc, watch};
use tokio::time::{self, Instant, MissedTickBehavior};
use tokio_util::sync::CancellationToken;
use tracing::{debug, error, info, warn};

use kwlbridge_api::DeviceClient;

use crate::config::{BridgeConfig, COMPLETE_PAGES};
use crate::error::CoreError;
use crate::store::{StateChange, StateStore};
use crate::translate::Translator;

/// Entry point: starts the bridge for one device.
pub struct Bridge;

/// Handle for a running bridge. Exposes the shared state store and a
/// stop contract that cancels every pending timer.
pub struct BridgeHandle {
    store: Arc<StateStore>,
    cancel: CancellationToken,
    task: tokio::task::JoinHandle<()>,
}

impl Bridge {
    /// Validate the configuration, authenticate, run one complete poll,
    /// and keep polling until [`BridgeHandle::stop`] is called.
    ///
    /// Only construction-time problems (bad config, unbuildable client)
    /// are errors; once the task is running, every failure is logged and
    /// survived.
    pub fn start(config: BridgeConfig) -> Result<BridgeHandle, CoreError> {
        config.validate()?;
        let client = DeviceClient::new(&config.host, &config.transport)?;
        let store = Arc::new(StateStore::new());
        let cancel = CancellationToken::new();

        // The fresh store still holds its write-request stream.
        let writes = store
            .take_write_requests()
            .expect("write request stream already taken");
        let engine = Engine {
            client,
            translator: Translator::new(Arc::clone(&store)),
            store: Arc::clone(&store),
            config,
            ignored_pages: HashSet::new(),
        };
        let task = tokio::spawn(run(engine, writes, cancel.clone()));

        Ok(BridgeHandle {
            store,
            cancel,
            task,
        })
    }
}

impl BridgeHandle {
    /// The state store shared with consumers. Write a value with
    /// `ack = false` to request a device write-back.
    pub fn store(&self) -> Arc<StateStore> {
        Arc::clone(&self.store)
    }

    /// Watch the device connectivity flag.
    pub fn connected(&self) -> watch::Receiver<bool> {
        self.store.connected()
    }

    /// Stop the bridge: cancel all pending timers, wait for the loop to
    /// wind down, and mark connectivity false. Never fails, even if the
    /// loop already exited.
    pub async fn stop(self) {
        self.cancel.cancel();
        let _ = self.task.await;
        self.store.set_connected(false);
        debug!("bridge stopped");
    }
}

// ── Engine ──────────────────────────────────────────────────────────

struct Engine {
    client: DeviceClient,
    translator: Translator,
    store: Arc<StateStore>,
    config: BridgeConfig,
    /// Pages this firmware answered 404 for; never polled again for the
    /// lifetime of the process.
    ignored_pages: HashSet<u8>,
}

/// What a poll batch ran into.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum PollOutcome {
    Completed,
    /// A 401 aborted the batch; remaining pages were left unpolled.
    Unauthorized,
}

impl Engine {
    /// Authenticate with the device. Failure flips connectivity false and
    /// is logged, never propagated -- the next timer retries anyway.
    async fn login(&self) {
        match self.client.login(&self.config.password).await {
            Ok(()) => {
                self.store.set_connected(true);
            }
            Err(e) => {
                self.store.set_connected(false);
                error!(error = %e, "login failed");
                if let Some(body) = e.response_body() {
                    error!(body, "login response");
                }
            }
        }
    }

    /// Visit each page in order, sequentially, waiting the configured
    /// delay before every request. 401 aborts the remainder; 404 puts the
    /// page on the ignore list; anything else logs and moves on.
    async fn poll(&mut self, pages: &[u8]) -> PollOutcome {
        for &page in pages {
            if self.ignored_pages.contains(&page) {
                continue;
            }
            time::sleep(self.config.timing.page_delay).await;

            match self.client.fetch_page(page).await {
                Ok(body) => {
                    debug!(page, body = %body, "page fetched");
                    self.translator.translate(&body);
                }
                Err(e) if e.is_unauthorized() => {
                    info!("received 401, re-login in {:?}", self.config.timing.relogin_delay);
                    self.store.set_connected(false);
                    return PollOutcome::Unauthorized;
                }
                Err(e) if e.is_not_found() => {
                    info!(page, "page not supported by this firmware, ignoring from now on");
                    self.ignored_pages.insert(page);
                }
                Err(e) => {
                    error!(page, error = %e, "page fetch failed");
                    if let Some(body) = e.response_body() {
                        error!(page, body, "page response");
                    }
                }
            }
        }
        PollOutcome::Completed
    }

    /// Relay a consumer-originated state change to the device.
    ///
    /// Failure is logged, never retried -- the confirmatory poll that the
    /// caller schedules re-reads what the device actually applied.
    async fn write_back(&self, change: &StateChange) {
        let Some(entry) = self.store.get(&change.path) else {
            warn!(path = %change.path, "write request for unknown state, ignoring");
            return;
        };
        if entry.meta.variable.is_empty() {
            warn!(path = %change.path, "state has no device variable, ignoring write");
            return;
        }

        let value = change.value.to_string();
        debug!(variable = %entry.meta.variable, value = %value, "writing to device");
        match self.client.write_var(&entry.meta.variable, &value).await {
            Ok(()) => debug!(variable = %entry.meta.variable, "device accepted write"),
            Err(e) => {
                error!(variable = %entry.meta.variable, error = %e, "device write failed");
                if let Some(body) = e.response_body() {
                    error!(body, "write response");
                }
            }
        }
    }
}

/// Sleep until an optional deadline; pend forever when there is none.
async fn sleep_until_opt(deadline: Option<Instant>) {
    match deadline {
        Some(at) => time::sleep_until(at).await,
        None => std::future::pending().await,
    }
}

#[allow(clippy::cognitive_complexity)]
async fn run(
    mut engine: Engine,
    mut writes: mpsc::UnboundedReceiver<StateChange>,
    cancel: CancellationToken,
) {
    let update_pages = engine.config.effective_update_pages();
    let timing = engine.config.timing.clone();

    // Startup: authenticate, then read everything once.
    engine.login().await;
    let mut relogin_at = match engine.poll(&COMPLETE_PAGES).await {
        PollOutcome::Unauthorized => Some(Instant::now() + timing.relogin_delay),
        PollOutcome::Completed => None,
    };
    // One pending deadline per debounced operation; re-triggering replaces
    // the deadline instead of stacking a second timer.
    let mut confirm_at: Option<Instant> = None;

    let mut poll_tick = time::interval(engine.config.effective_poll_interval());
    // A poll batch can outlast the interval; don't burst-fire afterwards.
    poll_tick.set_missed_tick_behavior(MissedTickBehavior::Delay);
    poll_tick.tick().await; // consume the immediate first tick

    let mut refresh_tick = time::interval(timing.refresh_login_period);
    refresh_tick.set_missed_tick_behavior(MissedTickBehavior::Delay);
    refresh_tick.tick().await;

    loop {
        tokio::select! {
            biased;
            () = cancel.cancelled() => break,

            () = sleep_until_opt(relogin_at), if relogin_at.is_some() => {
                relogin_at = None;
                engine.login().await;
            }

            () = sleep_until_opt(confirm_at), if confirm_at.is_some() => {
                confirm_at = None;
                debug!("confirmatory poll after write-back");
                if engine.poll(&COMPLETE_PAGES).await == PollOutcome::Unauthorized {
                    relogin_at = Some(Instant::now() + timing.relogin_delay);
                }
            }

            _ = refresh_tick.tick() => {
                debug!("proactive session refresh");
                engine.login().await;
            }

            _ = poll_tick.tick() => {
                if engine.poll(&update_pages).await == PollOutcome::Unauthorized {
                    relogin_at = Some(Instant::now() + timing.relogin_delay);
                }
            }

            // Write requests queue unboundedly while a poll batch runs;
            // none can be lost to poll traffic.
            change = writes.recv() => match change {
                Some(change) => {
                    engine.write_back(&change).await;
                    // Replace any pending confirmation; the device's real
                    // state is read once, after the last write settles.
                    confirm_at = Some(Instant::now() + timing.confirm_delay);
                }
                None => break,
            },
        }
    }

    engine.store.set_connected(false);
    debug!("bridge loop exited");
}
