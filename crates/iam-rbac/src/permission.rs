use std::fmt;

/// A `service:entity:action` triple (spec §3/§4.3). Globally unique, catalog
/// data only — never per-tenant. Comparison is exact: no wildcards, no
/// `manage`-implies-everything collapsing.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, serde::Serialize, serde::Deserialize)]
pub struct Permission {
    pub service: String,
    pub entity: String,
    pub action: String,
}

impl Permission {
    pub fn new(service: impl Into<String>, entity: impl Into<String>, action: impl Into<String>) -> Self {
        Self {
            service: service.into(),
            entity: entity.into(),
            action: action.into(),
        }
    }

    /// Canonical `service:entity:action` string (spec §3).
    pub fn canonical(&self) -> String {
        format!("{}:{}:{}", self.service, self.entity, self.action)
    }

    pub fn parse(canonical: &str) -> Option<Self> {
        let mut parts = canonical.splitn(3, ':');
        let service = parts.next()?;
        let entity = parts.next()?;
        let action = parts.next()?;
        if service.is_empty() || entity.is_empty() || action.is_empty() {
            return None;
        }
        Some(Self::new(service, entity, action))
    }
}

impl fmt::Display for Permission {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.canonical())
    }
}

/// De-duplicates and stably sorts a permission set (spec §4.3 "tie-break:
/// duplicates are set-collapsed").
pub fn normalize_permissions(mut permissions: Vec<Permission>) -> Vec<Permission> {
    permissions.sort();
    permissions.dedup();
    permissions
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn canonical_string_round_trips_through_parse() {
        let permission = Permission::new("tenants", "member", "invite");
        assert_eq!(permission.canonical(), "tenants:member:invite");
        assert_eq!(Permission::parse("tenants:member:invite").unwrap(), permission);
    }

    #[test]
    fn parse_rejects_malformed_triples() {
        assert!(Permission::parse("tenants:member").is_none());
        assert!(Permission::parse("tenants::invite").is_none());
        assert!(Permission::parse("").is_none());
    }

    #[test]
    fn comparison_is_case_sensitive_and_exact() {
        let lower = Permission::new("tenants", "member", "invite");
        let upper = Permission::new("Tenants", "member", "invite");
        assert_ne!(lower, upper);
    }

    #[test]
    fn normalize_deduplicates_and_sorts() {
        let a = Permission::new("tenants", "member", "invite");
        let b = Permission::new("tenants", "member", "remove");
        let result = normalize_permissions(vec![b.clone(), a.clone(), a.clone()]);
        assert_eq!(result, vec![a, b]);
    }
}
