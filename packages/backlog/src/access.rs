// ABOUTME: Access request workflow and access-code verification
// ABOUTME: Request submission, admin approve/reject with code minting, and code checks

use bulletin_core::{
    generate_access_code, normalize_email, AccessCode, AccessRequest, AccessRequestStatus,
};
use chrono::Utc;
use serde::Deserialize;
use subtle::ConstantTimeEq;
use tracing::{info, warn};

use crate::error::{BacklogError, BacklogResult};
use crate::store::BacklogStore;

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct AccessRequestInput {
    pub name: String,
    pub email: String,
    pub reason: String,
}

/// Check an admin key against the configured one.
///
/// Admin operations are disabled when no key is configured.
pub fn authorize_admin(configured: Option<&str>, provided: &str) -> BacklogResult<()> {
    let configured = configured.unwrap_or_default();
    if configured.is_empty() {
        return Err(BacklogError::Unauthorized("Unauthorized".to_string()));
    }

    if configured.as_bytes().ct_eq(provided.as_bytes()).unwrap_u8() == 1 {
        Ok(())
    } else {
        warn!("Rejected access admin request with an invalid key");
        Err(BacklogError::Unauthorized("Unauthorized".to_string()))
    }
}

impl BacklogStore {
    /// Record an access request.
    ///
    /// A pending request for the same email is returned unchanged instead of
    /// creating a duplicate.
    pub async fn submit_access_request(
        &self,
        input: AccessRequestInput,
    ) -> BacklogResult<AccessRequest> {
        let name = input.name.trim().to_string();
        let email = normalize_email(&input.email);
        let reason = input.reason.trim().to_string();

        if name.is_empty() || email.is_empty() {
            return Err(BacklogError::Validation(
                "Name and email are required".to_string(),
            ));
        }

        self.mutate(move |db| {
            if let Some(existing) = db.access_requests.iter().find(|item| {
                item.status == AccessRequestStatus::Pending && normalize_email(&item.email) == email
            }) {
                return Ok(existing.clone());
            }

            let now = Utc::now();
            let request = AccessRequest {
                id: db.next_access_request_id(),
                name,
                email,
                reason,
                status: AccessRequestStatus::Pending,
                created_at: now,
                updated_at: now,
                approved_code: None,
            };
            info!(id = request.id, "Received access request from {}", request.email);
            db.access_requests.push(request.clone());
            Ok(request)
        })
        .await
    }

    /// All requests, newest first
    pub async fn list_access_requests(&self) -> BacklogResult<Vec<AccessRequest>> {
        let mut items = self.read().await?.access_requests;
        items.sort_by(|a, b| b.id.cmp(&a.id));
        Ok(items)
    }

    /// Approve a request and mint a fresh code, replacing any earlier codes for that email
    pub async fn approve_access_request(&self, id: u64) -> BacklogResult<AccessRequest> {
        let code = generate_access_code();

        self.mutate(move |db| {
            let now = Utc::now();
            let request = db
                .access_requests
                .iter_mut()
                .find(|item| item.id == id)
                .ok_or_else(|| BacklogError::not_found("Access request", id))?;

            request.status = AccessRequestStatus::Approved;
            request.updated_at = now;
            request.approved_code = Some(code.clone());
            let approved = request.clone();

            db.access_codes.retain(|item| item.email != approved.email);
            db.access_codes.push(AccessCode {
                code,
                email: approved.email.clone(),
                active: true,
                created_at: now,
                created_by: "admin".to_string(),
            });

            info!(id, "Approved access request for {}", approved.email);
            Ok(approved)
        })
        .await
    }

    /// Reject a request and deactivate every code issued to that email
    pub async fn reject_access_request(&self, id: u64) -> BacklogResult<AccessRequest> {
        self.mutate(move |db| {
            let request = db
                .access_requests
                .iter_mut()
                .find(|item| item.id == id)
                .ok_or_else(|| BacklogError::not_found("Access request", id))?;

            request.status = AccessRequestStatus::Rejected;
            request.updated_at = Utc::now();
            let rejected = request.clone();

            for code in db
                .access_codes
                .iter_mut()
                .filter(|code| code.email == rejected.email)
            {
                code.active = false;
            }

            info!(id, "Rejected access request for {}", rejected.email);
            Ok(rejected)
        })
        .await
    }

    /// Look up an active code. Input is trimmed and uppercased first.
    pub async fn verify_access_code(&self, code: &str) -> BacklogResult<AccessCode> {
        let code = code.trim().to_uppercase();
        if code.is_empty() {
            return Err(BacklogError::Validation("Code is required".to_string()));
        }

        let db = self.read().await?;
        db.access_codes
            .into_iter()
            .find(|item| item.active && item.code == code)
            .ok_or_else(|| BacklogError::Unauthorized("Code is invalid or inactive".to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_authorize_admin() {
        assert!(authorize_admin(Some("s3cret"), "s3cret").is_ok());
        assert!(matches!(
            authorize_admin(Some("s3cret"), "guess"),
            Err(BacklogError::Unauthorized(_))
        ));
        // No configured key disables admin entirely
        assert!(authorize_admin(None, "").is_err());
        assert!(authorize_admin(Some(""), "").is_err());
    }
}
