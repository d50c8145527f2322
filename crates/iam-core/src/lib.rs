pub mod config;
pub mod error;
pub mod events;
pub mod id;
pub mod pagination;
pub mod resilience;
pub mod security;
pub mod state_machine;
pub mod tracing_init;

pub use config::{AppConfig, Config, ConfigError, ConfigLoader, ConfigSource};
pub use error::{Error, ErrorKind, ErrorResponse, Result};
pub use events::{DomainEvent, EventBus, EventEnvelope};
pub use id::{generate_id, parse_id};
pub use pagination::{Page, PageRequest};
pub use resilience::{RetryPolicy, RetryStrategy};
pub use state_machine::{guard_transition, StatusMachine};
pub use tracing_init::init_tracing;

pub mod prelude {
    pub use crate::error::{Error, ErrorKind, Result};
    pub use crate::events::{DomainEvent, EventBus, EventEnvelope};
    pub use crate::id::generate_id;
    pub use crate::pagination::{Page, PageRequest};
    pub use uuid::Uuid;
}
