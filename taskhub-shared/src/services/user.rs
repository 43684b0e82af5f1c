//! User lookups behind the relation endpoints

use std::sync::Arc;

use uuid::Uuid;

use super::{ServiceError, ServiceResult};
use crate::models::user::User;
use crate::store::Store;

/// User service
#[derive(Clone)]
pub struct UserService {
    store: Arc<dyn Store>,
}

impl UserService {
    pub fn new(store: Arc<dyn Store>) -> Self {
        Self { store }
    }

    /// Finds a user by ID
    pub async fn find_user(&self, id: Uuid) -> ServiceResult<User> {
        self.store
            .find_user_by_id(id)
            .await?
            .ok_or_else(|| ServiceError::NotFound("user not found".to_string()))
    }

    /// Returns the owner of a credential
    ///
    /// # Errors
    ///
    /// `NotFound` if the credential does not exist
    pub async fn user_for_credential(&self, credential_id: Uuid) -> ServiceResult<User> {
        let credential = self
            .store
            .find_credential_by_id(credential_id)
            .await?
            .ok_or_else(|| ServiceError::NotFound("credential not found".to_string()))?;

        self.find_user(credential.user_id).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::user::CreateUser;
    use crate::store::memory::MemoryStore;

    #[tokio::test]
    async fn test_user_for_credential() {
        let store = Arc::new(MemoryStore::new());
        let user = store
            .create_user_with_credential(
                CreateUser {
                    email: "ada@example.com".to_string(),
                    name: None,
                },
                "hash".to_string(),
            )
            .await
            .unwrap();
        let credential = store.find_credential_by_user_id(user.id).await.unwrap().unwrap();

        let service = UserService::new(store);
        assert_eq!(service.user_for_credential(credential.id).await.unwrap(), user);
    }

    #[tokio::test]
    async fn test_unknown_credential() {
        let service = UserService::new(Arc::new(MemoryStore::new()));

        let err = service.user_for_credential(Uuid::new_v4()).await.unwrap_err();
        assert!(matches!(err, ServiceError::NotFound(_)));
    }
}
