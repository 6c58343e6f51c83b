// Staff role lookup backed by the bot configuration.

use crate::core::filtering::RoleResolver;
use std::collections::HashMap;

/// Guild id -> moderator role id, as configured in `FILTER_STAFF_ROLES`.
#[derive(Debug, Clone, Default)]
pub struct ConfiguredStaffRoles {
    roles: HashMap<u64, u64>,
}

impl ConfiguredStaffRoles {
    pub fn new(roles: HashMap<u64, u64>) -> Self {
        Self { roles }
    }

    /// Does a member holding `member_roles` count as staff in this guild?
    pub fn is_staff(&self, guild_id: u64, member_roles: &[u64]) -> bool {
        self.staff_role_for(guild_id)
            .is_some_and(|role| member_roles.contains(&role))
    }
}

impl RoleResolver for ConfiguredStaffRoles {
    fn staff_role_for(&self, guild_id: u64) -> Option<u64> {
        self.roles.get(&guild_id).copied()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_staff_lookup() {
        let roles = ConfiguredStaffRoles::new(HashMap::from([(1, 10), (2, 20)]));

        assert_eq!(roles.staff_role_for(1), Some(10));
        assert_eq!(roles.staff_role_for(3), None);
        assert!(roles.is_staff(2, &[5, 20]));
        assert!(!roles.is_staff(2, &[10]));
        assert!(!roles.is_staff(3, &[10, 20]));
    }
}
