//! Static grant-table authorizer.

use async_trait::async_trait;
use std::collections::HashSet;
use std::sync::{Arc, RwLock};

use crate::task::{
    domain::{ProjectId, UserId},
    ports::{Authorizer, AuthorizerError, AuthorizerResult, Caller, Capability},
};

/// Authorizer backed by an explicit grant table.
///
/// Intended for tests and single-process tooling; production deployments
/// implement [`Authorizer`] against their permission service.
#[derive(Debug, Clone, Default)]
pub struct StaticAuthorizer {
    grants: Arc<RwLock<HashSet<(UserId, ProjectId, Capability)>>>,
}

impl StaticAuthorizer {
    /// Creates an authorizer that denies everything.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Grants one capability on a project to a user.
    ///
    /// # Errors
    ///
    /// Returns [`AuthorizerError::Backend`] when the grant table lock is
    /// poisoned.
    pub fn grant(
        &self,
        user_id: UserId,
        project_id: ProjectId,
        capability: Capability,
    ) -> AuthorizerResult<()> {
        let mut grants = self
            .grants
            .write()
            .map_err(|err| AuthorizerError::backend(std::io::Error::other(err.to_string())))?;
        grants.insert((user_id, project_id, capability));
        Ok(())
    }

    /// Grants every capability on a project to a user.
    ///
    /// # Errors
    ///
    /// Returns [`AuthorizerError::Backend`] when the grant table lock is
    /// poisoned.
    pub fn grant_all(&self, user_id: UserId, project_id: ProjectId) -> AuthorizerResult<()> {
        for capability in Capability::ALL {
            self.grant(user_id, project_id, capability)?;
        }
        Ok(())
    }

    /// Revokes one capability on a project from a user.
    ///
    /// # Errors
    ///
    /// Returns [`AuthorizerError::Backend`] when the grant table lock is
    /// poisoned.
    pub fn revoke(
        &self,
        user_id: UserId,
        project_id: ProjectId,
        capability: Capability,
    ) -> AuthorizerResult<()> {
        let mut grants = self
            .grants
            .write()
            .map_err(|err| AuthorizerError::backend(std::io::Error::other(err.to_string())))?;
        grants.remove(&(user_id, project_id, capability));
        Ok(())
    }
}

#[async_trait]
impl Authorizer for StaticAuthorizer {
    async fn is_allowed(
        &self,
        caller: &Caller,
        project_id: ProjectId,
        capability: Capability,
    ) -> AuthorizerResult<bool> {
        let grants = self
            .grants
            .read()
            .map_err(|err| AuthorizerError::backend(std::io::Error::other(err.to_string())))?;
        Ok(grants.contains(&(caller.user_id(), project_id, capability)))
    }
}
