use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::id::generate_id;

/// Every mutation across C5/C6/C7 that the RBAC cache (C3) or the job
/// runtime (C8) needs to react to. Grounded on the teacher's
/// `DomainEvent` enum shape (one variant per mutation, tagged by kind).
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq, Eq)]
#[serde(tag = "type", content = "data")]
pub enum DomainEvent {
    MemberAdded { tenant_id: Uuid, user_id: Uuid },
    MemberRoleChanged { tenant_id: Uuid, user_id: Uuid },
    MemberRemoved { tenant_id: Uuid, user_id: Uuid },
    RolePermissionsChanged { role_id: Uuid },
    PlatformAdminGranted { user_id: Uuid },
    PlatformAdminRevoked { user_id: Uuid },
    TenantCreated { tenant_id: Uuid },
    TenantActivated { tenant_id: Uuid },
    InvitationCreated { tenant_id: Uuid, invitation_id: Uuid },
    InvitationAccepted { tenant_id: Uuid, invitation_id: Uuid },
    SystemUserRotated { application_name: String },
}

impl DomainEvent {
    pub fn event_type(&self) -> &'static str {
        match self {
            Self::MemberAdded { .. } => "member.added",
            Self::MemberRoleChanged { .. } => "member.role_changed",
            Self::MemberRemoved { .. } => "member.removed",
            Self::RolePermissionsChanged { .. } => "role.permissions_changed",
            Self::PlatformAdminGranted { .. } => "platform_admin.granted",
            Self::PlatformAdminRevoked { .. } => "platform_admin.revoked",
            Self::TenantCreated { .. } => "tenant.created",
            Self::TenantActivated { .. } => "tenant.activated",
            Self::InvitationCreated { .. } => "invitation.created",
            Self::InvitationAccepted { .. } => "invitation.accepted",
            Self::SystemUserRotated { .. } => "system_user.rotated",
        }
    }

    /// `(tenant_id, user_id)` pairs whose cached permission set is stale
    /// after this event, if any — the RBAC cache invalidates exactly these.
    pub fn affected_permission_key(&self) -> Option<(Uuid, Uuid)> {
        match self {
            Self::MemberAdded { tenant_id, user_id }
            | Self::MemberRoleChanged { tenant_id, user_id }
            | Self::MemberRemoved { tenant_id, user_id } => Some((*tenant_id, *user_id)),
            _ => None,
        }
    }
}

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct EventEnvelope {
    pub id: Uuid,
    pub event_type: String,
    pub tenant_id: Uuid,
    pub actor_id: Option<Uuid>,
    pub timestamp: DateTime<Utc>,
    pub event: DomainEvent,
}

impl EventEnvelope {
    pub fn new(tenant_id: Uuid, actor_id: Option<Uuid>, event: DomainEvent) -> Self {
        Self {
            id: generate_id(),
            event_type: event.event_type().to_string(),
            tenant_id,
            actor_id,
            timestamp: Utc::now(),
            event,
        }
    }
}
