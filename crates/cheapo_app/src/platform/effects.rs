use std::sync::mpsc;
use std::thread;

use cheapo_core::{Effect, Msg, ServiceFailure};
use cheapo_engine::{EngineEvent, EngineEvents, EngineHandle, FetchError, FetchSettings};
use engine_logging::{engine_debug, engine_info, engine_warn};

use super::app::Inbox;

/// Hands core effects to the engine and feeds engine answers back as `Msg`s.
pub struct EffectRunner {
    engine: EngineHandle,
}

impl EffectRunner {
    pub fn new(settings: FetchSettings, inbox: mpsc::Sender<Inbox>) -> Result<Self, FetchError> {
        let (engine, events) = EngineHandle::spawn(settings)?;
        spawn_event_loop(events, inbox);
        Ok(Self { engine })
    }

    pub fn run(&self, effects: Vec<Effect>) {
        for effect in effects {
            match effect {
                Effect::LookupStores { ticket, lat, lon } => {
                    engine_info!("LookupStores ticket={ticket} lat={lat} lon={lon}");
                    self.engine.lookup_stores(ticket, lat, lon);
                }
                Effect::SearchProducts { ticket, query } => {
                    engine_info!(
                        "SearchProducts ticket={ticket} start_index={} keyword={:?} category={:?} store={:?}",
                        query.start_index(),
                        query.keyword,
                        query.category_id,
                        query.store_id
                    );
                    self.engine.search(ticket, query);
                }
                Effect::CancelSearch => {
                    engine_debug!("CancelSearch");
                    self.engine.cancel_search();
                }
            }
        }
    }
}

fn spawn_event_loop(events: EngineEvents, inbox: mpsc::Sender<Inbox>) {
    thread::spawn(move || {
        while let Some(event) = events.recv() {
            if inbox.send(Inbox::Msg(to_msg(event))).is_err() {
                break;
            }
        }
    });
}

fn to_msg(event: EngineEvent) -> Msg {
    match event {
        EngineEvent::StoresLoaded { ticket, result } => Msg::StoresLoaded {
            ticket,
            outcome: result.map_err(|err| service_failure("store lookup", ticket, err)),
        },
        EngineEvent::SearchLoaded { ticket, result } => Msg::SearchLoaded {
            ticket,
            outcome: result.map_err(|err| service_failure("search", ticket, err)),
        },
    }
}

fn service_failure(chain: &str, ticket: u64, err: FetchError) -> ServiceFailure {
    engine_warn!("{chain} ticket={ticket} failed: {err}");
    ServiceFailure(err.to_string())
}
