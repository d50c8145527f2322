use ulid::Ulid;
use uuid::Uuid;

use crate::error::{Error, Result};

/// Opaque, lexicographically sortable id used for every entity in §3.
pub fn generate_id() -> Uuid {
    Uuid::from(Ulid::new())
}

pub fn parse_id(value: &str) -> Result<Uuid> {
    value
        .parse::<Ulid>()
        .map(Uuid::from)
        .or_else(|_| value.parse::<Uuid>())
        .map_err(|_| Error::Validation(format!("invalid id format: {value}")))
}
