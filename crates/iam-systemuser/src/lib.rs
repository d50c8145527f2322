pub mod entities;
pub mod error;
pub mod migration;
pub mod service;

pub use entities::system_user::{self, Model as SystemUser};
pub use error::SystemUserError;
pub use service::{is_authenticatable, SystemUserService};
