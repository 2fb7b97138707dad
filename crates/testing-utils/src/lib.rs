pub mod bin;
mod cache_store;
mod fake_registry;

pub use cache_store::{FailingCacheStore, RecordingCacheStore};
pub use fake_registry::FakeRegistry;
