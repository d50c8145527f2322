pub mod tenant_member;
