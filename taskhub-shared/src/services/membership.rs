/// Project membership management
///
/// Adding a member is admin-only and always targets the project from the
/// request path. Listing, bulk patching and bulk deletion only scope by
/// project and do not check the caller's role.

use std::sync::Arc;

use tracing::info;
use uuid::Uuid;

use super::{ServiceError, ServiceResult};
use crate::auth::authorization::{authorize, AuthzError, ProjectAction};
use crate::models::membership::{
    CreateMembership, Membership, MembershipFilter, NewMembership, UpdateMembership,
};
use crate::store::Store;

/// Membership service
#[derive(Clone)]
pub struct MembershipService {
    store: Arc<dyn Store>,
}

impl MembershipService {
    pub fn new(store: Arc<dyn Store>) -> Self {
        Self { store }
    }

    pub async fn list_memberships(
        &self,
        project_id: Uuid,
        filter: &MembershipFilter,
    ) -> ServiceResult<Vec<Membership>> {
        Ok(self.store.list_memberships(project_id, filter).await?)
    }

    /// Adds a user to the project with the given role
    ///
    /// # Errors
    ///
    /// - `NotAuthorized` if the caller is not a member
    /// - `Forbidden("Can not assign")` if the caller is not an admin
    /// - `NotFound` if the target user does not exist
    /// - `Conflict("user is already a member")` on a duplicate invite
    pub async fn add_membership(
        &self,
        caller_id: Uuid,
        project_id: Uuid,
        input: NewMembership,
    ) -> ServiceResult<Membership> {
        authorize(self.store.as_ref(), caller_id, project_id, ProjectAction::AddMember)
            .await
            .map_err(|e| match e {
                AuthzError::Forbidden { .. } => ServiceError::Forbidden("Can not assign".to_string()),
                other => other.into(),
            })?;

        if self.store.find_user_by_id(input.user_id).await?.is_none() {
            return Err(ServiceError::NotFound("user not found".to_string()));
        }

        let membership = self
            .store
            .create_membership(CreateMembership {
                project_id,
                user_id: input.user_id,
                role: input.role,
            })
            .await?;

        info!(
            %project_id,
            user_id = %membership.user_id,
            role = %membership.role,
            added_by = %caller_id,
            "Membership added"
        );

        Ok(membership)
    }

    /// Updates every membership of the project matching `filter`
    pub async fn patch_memberships(
        &self,
        project_id: Uuid,
        patch: UpdateMembership,
        filter: &MembershipFilter,
    ) -> ServiceResult<u64> {
        let count = self.store.update_memberships(project_id, filter, patch).await?;

        info!(%project_id, count, "Memberships updated");

        Ok(count)
    }

    /// Deletes every membership of the project matching `filter`
    pub async fn delete_memberships(
        &self,
        project_id: Uuid,
        filter: &MembershipFilter,
    ) -> ServiceResult<u64> {
        let count = self.store.delete_memberships(project_id, filter).await?;

        info!(%project_id, count, "Memberships deleted");

        Ok(count)
    }
}
