//! Permission strings and the fixed store roles that grant them.
//!
//! Permissions follow the `resource:action` convention. Roles are not
//! stored as rows; each user carries a single role name and the grant
//! set is resolved here when tokens are minted.

/// Common permission string constants for compile-time safety
pub mod consts {
    // Allocation boards (thaw/prep worksheets)
    pub const BOARDS_READ: &str = "boards:read";
    pub const BOARDS_WRITE: &str = "boards:write";

    // Planning configuration: projections, UTP factors, buffers,
    // adjustment messages, closure plans, instructions, sales-mix uploads
    pub const SETTINGS_READ: &str = "settings:read";
    pub const SETTINGS_WRITE: &str = "settings:write";

    // Truck order catalog and order sheets
    pub const TRUCK_READ: &str = "truck:read";
    pub const TRUCK_WRITE: &str = "truck:write";

    // Account administration
    pub const USERS_MANAGE: &str = "users:manage";
}

/// Role with every permission, including account administration.
pub const ROLE_ADMIN: &str = "admin";
/// Role for the kitchen leadership team: full planning and truck access.
pub const ROLE_MANAGER: &str = "manager";
/// Role for crew members: read the boards, nothing else.
pub const ROLE_TEAM: &str = "team";

/// Every permission the API understands.
pub fn all_permissions() -> Vec<String> {
    vec![
        consts::BOARDS_READ.to_string(),
        consts::BOARDS_WRITE.to_string(),
        consts::SETTINGS_READ.to_string(),
        consts::SETTINGS_WRITE.to_string(),
        consts::TRUCK_READ.to_string(),
        consts::TRUCK_WRITE.to_string(),
        consts::USERS_MANAGE.to_string(),
    ]
}

/// Resolve the permission grant set for a role name.
///
/// Unknown roles resolve to an empty set: a token minted for a user whose
/// role was removed from the fixed list can authenticate but do nothing.
pub fn role_permissions(role: &str) -> Vec<String> {
    match role {
        ROLE_ADMIN => all_permissions(),
        ROLE_MANAGER => vec![
            consts::BOARDS_READ.to_string(),
            consts::BOARDS_WRITE.to_string(),
            consts::SETTINGS_READ.to_string(),
            consts::SETTINGS_WRITE.to_string(),
            consts::TRUCK_READ.to_string(),
            consts::TRUCK_WRITE.to_string(),
        ],
        ROLE_TEAM => vec![consts::BOARDS_READ.to_string()],
        _ => Vec::new(),
    }
}

/// Whether the role name is one of the fixed store roles.
pub fn is_known_role(role: &str) -> bool {
    matches!(role, ROLE_ADMIN | ROLE_MANAGER | ROLE_TEAM)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn admin_holds_every_permission() {
        let perms = role_permissions(ROLE_ADMIN);
        for p in all_permissions() {
            assert!(perms.contains(&p), "admin missing {p}");
        }
    }

    #[test]
    fn manager_cannot_manage_users() {
        let perms = role_permissions(ROLE_MANAGER);
        assert!(perms.contains(&consts::SETTINGS_WRITE.to_string()));
        assert!(perms.contains(&consts::TRUCK_WRITE.to_string()));
        assert!(!perms.contains(&consts::USERS_MANAGE.to_string()));
    }

    #[test]
    fn team_is_read_only_boards() {
        assert_eq!(role_permissions(ROLE_TEAM), vec![consts::BOARDS_READ]);
    }

    #[test]
    fn unknown_role_grants_nothing() {
        assert!(role_permissions("visitor").is_empty());
        assert!(!is_known_role("visitor"));
        assert!(is_known_role(ROLE_MANAGER));
    }
}
