pub mod auth;
pub mod rbac;
pub mod tenant;

pub use auth::CurrentUser;
pub use rbac::{
    check_permission, MemberCreate, PermissionSpec, RequirePermission, RequirePlatformAdmin, TenantDelete,
    TenantUpdate,
};
pub use tenant::CurrentTenant;
