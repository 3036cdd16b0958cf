//! Legistar Web API client: matter lookup by file number, sponsor
//! retrieval, and same-named bill search across sessions.

mod legistar;
mod matter;

pub use legistar::{ApiError, LegistarClient};
pub use matter::{Matter, MatterSponsor};
