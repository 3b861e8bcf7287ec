use std::sync::{mpsc, Arc};
use std::thread;
use std::time::Duration;

use cheapo_core::SearchQuery;
use engine_logging::{engine_debug, engine_error, engine_warn};
use tokio_util::sync::CancellationToken;

use crate::fetch::{CatalogSearch, FetchSettings, ReqwestFetcher, StoreLocator};
use crate::{EngineEvent, FetchError, Ticket};

enum EngineCommand {
    LookupStores { ticket: Ticket, lat: f64, lon: f64 },
    Search { ticket: Ticket, query: SearchQuery },
    CancelSearch,
}

impl EngineCommand {
    fn name(&self) -> &'static str {
        match self {
            EngineCommand::LookupStores { .. } => "store lookup",
            EngineCommand::Search { .. } => "search",
            EngineCommand::CancelSearch => "cancel search",
        }
    }
}

/// Sending side of the engine. Each chain (store lookup, search) keeps at
/// most one request in flight; a newer command cancels the older one, which
/// then reports nothing.
#[derive(Clone)]
pub struct EngineHandle {
    cmd_tx: mpsc::Sender<EngineCommand>,
}

/// Receiving side of the engine.
pub struct EngineEvents {
    event_rx: mpsc::Receiver<EngineEvent>,
}

impl EngineHandle {
    pub fn spawn(settings: FetchSettings) -> Result<(Self, EngineEvents), FetchError> {
        let fetcher = Arc::new(ReqwestFetcher::new(settings)?);
        Ok(Self::with_services(fetcher.clone(), fetcher))
    }

    pub fn with_services(
        locator: Arc<dyn StoreLocator>,
        search: Arc<dyn CatalogSearch>,
    ) -> (Self, EngineEvents) {
        let (cmd_tx, cmd_rx) = mpsc::channel();
        let (event_tx, event_rx) = mpsc::channel();

        thread::spawn(move || {
            let runtime = match tokio::runtime::Runtime::new() {
                Ok(runtime) => runtime,
                Err(err) => {
                    engine_error!("could not start engine runtime: {err}");
                    return;
                }
            };
            let mut lookup_inflight: Option<CancellationToken> = None;
            let mut search_inflight: Option<CancellationToken> = None;

            while let Ok(command) = cmd_rx.recv() {
                match command {
                    EngineCommand::LookupStores { ticket, lat, lon } => {
                        let token = supersede(&mut lookup_inflight, "store lookup");
                        let locator = locator.clone();
                        let event_tx = event_tx.clone();
                        runtime.spawn(async move {
                            tokio::select! {
                                _ = token.cancelled() => {
                                    engine_debug!("store lookup {ticket} cancelled");
                                }
                                result = locator.nearby_stores(lat, lon) => {
                                    let _ = event_tx.send(EngineEvent::StoresLoaded { ticket, result });
                                }
                            }
                        });
                    }
                    EngineCommand::Search { ticket, query } => {
                        let token = supersede(&mut search_inflight, "search");
                        let search = search.clone();
                        let event_tx = event_tx.clone();
                        runtime.spawn(async move {
                            tokio::select! {
                                _ = token.cancelled() => {
                                    engine_debug!("search {ticket} cancelled");
                                }
                                result = search.search(&query) => {
                                    let _ = event_tx.send(EngineEvent::SearchLoaded { ticket, result });
                                }
                            }
                        });
                    }
                    EngineCommand::CancelSearch => {
                        if let Some(token) = search_inflight.take() {
                            token.cancel();
                        }
                    }
                }
            }
        });

        (Self { cmd_tx }, EngineEvents { event_rx })
    }

    pub fn lookup_stores(&self, ticket: Ticket, lat: f64, lon: f64) {
        self.send(EngineCommand::LookupStores { ticket, lat, lon });
    }

    pub fn search(&self, ticket: Ticket, query: SearchQuery) {
        self.send(EngineCommand::Search { ticket, query });
    }

    pub fn cancel_search(&self) {
        self.send(EngineCommand::CancelSearch);
    }

    /// `false` when the engine thread is gone and the command was dropped.
    fn send(&self, command: EngineCommand) -> bool {
        let name = command.name();
        match self.cmd_tx.send(command) {
            Ok(()) => true,
            Err(_) => {
                engine_warn!("engine is not running, dropped {name} command");
                false
            }
        }
    }
}

impl EngineEvents {
    /// Blocks until the next event; `None` once the engine thread is gone.
    pub fn recv(&self) -> Option<EngineEvent> {
        self.event_rx.recv().ok()
    }

    pub fn try_recv(&self) -> Option<EngineEvent> {
        self.event_rx.try_recv().ok()
    }

    pub fn recv_timeout(&self, timeout: Duration) -> Option<EngineEvent> {
        self.event_rx.recv_timeout(timeout).ok()
    }
}

/// Cancels the chain's in-flight request and registers a fresh token.
fn supersede(slot: &mut Option<CancellationToken>, chain: &str) -> CancellationToken {
    if let Some(previous) = slot.take() {
        if !previous.is_cancelled() {
            engine_debug!("{chain} superseded");
        }
        previous.cancel();
    }
    let token = CancellationToken::new();
    *slot = Some(token.clone());
    token
}
