use crate::domain::{MemberId, MembershipCategory, Role};
use crate::ports::member_directory::{MemberDirectory as MemberDirectoryTrait, Result};
use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::{PoisonError, RwLock};

/// Mock implementation of MemberDirectory
///
/// Supports stateful testing by storing members in memory.
/// Members registered without a role are borrowers.
pub struct MemberDirectory {
    members: RwLock<HashMap<MemberId, (MembershipCategory, Role)>>,
}

impl MemberDirectory {
    pub fn new() -> Self {
        Self {
            members: RwLock::new(HashMap::new()),
        }
    }

    /// Add a borrower for testing purposes
    pub fn add_member(&self, member_id: MemberId, category: MembershipCategory) {
        self.add_member_with_role(member_id, category, Role::Borrower);
    }

    /// Add a member with an explicit role
    pub fn add_member_with_role(
        &self,
        member_id: MemberId,
        category: MembershipCategory,
        role: Role,
    ) {
        self.members
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .insert(member_id, (category, role));
    }
}

impl Default for MemberDirectory {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl MemberDirectoryTrait for MemberDirectory {
    async fn membership_category(
        &self,
        member_id: MemberId,
    ) -> Result<Option<MembershipCategory>> {
        Ok(self
            .members
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .get(&member_id)
            .map(|(category, _)| *category))
    }

    async fn role(&self, member_id: MemberId) -> Result<Option<Role>> {
        Ok(self
            .members
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .get(&member_id)
            .map(|(_, role)| *role))
    }
}
