pub mod entities;
pub mod error;
pub mod migration;
pub mod queue;
pub mod status;
pub mod tasks;

pub use entities::job::{self, JobStatus};
pub use error::JobError;
pub use migration::JobsMigration;
pub use queue::{JobQueue, SeaOrmJobQueue};
pub use status::{JobRuntimeStatus, TaskCounts};
pub use tasks::invitation_email::{
    EmailDispatcher, InvitationEmailRunner, JobInvitationEmailEnqueuer, NoopEmailDispatcher,
};
pub use tasks::tenant_init::{JobTenantInitEnqueuer, ReqwestTenantNotifier, TenantInitRunner, TenantNotifier};
