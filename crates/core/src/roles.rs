//! Well-known role name constants.
//!
//! These must match the seed data in `20260301000002_create_roles_and_users.sql`.

pub const ROLE_ADMIN: &str = "admin";
pub const ROLE_MANAGER: &str = "manager";
pub const ROLE_MEMBER: &str = "member";
