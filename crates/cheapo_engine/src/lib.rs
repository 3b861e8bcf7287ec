//! Cheapo engine: executes lookup and search effects against the HTTP services.
mod engine;
mod fetch;
mod types;
mod wire;

pub use engine::{EngineEvents, EngineHandle};
pub use fetch::{CatalogSearch, FetchSettings, ReqwestFetcher, StoreLocator};
pub use types::{EngineEvent, FailureKind, FetchError, Ticket};
