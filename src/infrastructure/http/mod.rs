pub mod client;
pub mod guard;

pub use client::ApiClient;
pub use guard::{guarded, route_guard, GuardState};
