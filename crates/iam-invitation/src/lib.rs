pub mod collaborators;
pub mod entities;
pub mod error;
pub mod migration;
pub mod service;
pub mod token;

pub use collaborators::InvitationEmailEnqueuer;
pub use entities::invitation::{self, InvitationStatus};
pub use error::InvitationError;
pub use service::InvitationService;
pub use token::{generate_invite_token, hash_token};
