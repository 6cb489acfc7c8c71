pub mod jwt;
pub mod service;

pub use jwt::{Claims, ClaimsReader};
pub use service::SessionService;
