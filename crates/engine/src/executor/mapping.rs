//! Fixed lookup tables for enumerated tool values.

/// Jira project role name to role id.
pub const PROJECT_ROLES: &[(&str, &str)] = &[("Administrator", "10002"), ("Developer", "10001"), ("Viewer", "10000")];

/// Confluence space permission name to operation key.
pub const SPACE_PERMISSIONS: &[(&str, &str)] = &[("read", "read"), ("write", "write"), ("admin", "admin")];

pub fn project_role_id(role: &str) -> Option<&'static str> {
    lookup(PROJECT_ROLES, role)
}

pub fn space_operation_key(permission: &str) -> Option<&'static str> {
    lookup(SPACE_PERMISSIONS, permission)
}

/// Accepted names of a table, in declaration order.
pub fn accepted_names(table: &'static [(&'static str, &'static str)]) -> Vec<&'static str> {
    table.iter().map(|(name, _)| *name).collect()
}

fn lookup(table: &'static [(&'static str, &'static str)], name: &str) -> Option<&'static str> {
    table.iter().find(|(candidate, _)| *candidate == name).map(|(_, value)| *value)
}
