pub mod billing_repository;
pub mod preference_repository;

pub use billing_repository::{BillingRepository, HttpBillingRepository};
pub use preference_repository::{
    CachedPreferenceBackend, HttpPreferenceBackend, LocalBackend, RemoteBackend,
};
