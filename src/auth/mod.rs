//! Request authorization for the download action
//!
//! The download endpoint is multiplexed: a submission without the marker
//! field is not an error, the authorizer simply yields control back to
//! the caller. A submission with the marker must carry a valid
//! anti-forgery nonce and a positive attachment id, and must survive the
//! registered permission hooks.

mod nonce;

pub use nonce::NonceGuard;

use serde::Deserialize;

use crate::error::{AppError, Result};
use crate::hooks::{HookDecision, HookRegistry};

/// Action name the download nonce is bound to
pub const DOWNLOAD_ACTION: &str = "download_media_file_action";

/// Raw fields of the download form submission
#[derive(Debug, Clone, Default, Deserialize)]
pub struct DownloadForm {
    /// Presence marker; the submit button carries this name
    pub download_media_file: Option<String>,
    /// Attachment id, transmitted as a string form field
    pub post_id: Option<String>,
    /// Anti-forgery nonce bound to [`DOWNLOAD_ACTION`]
    pub download_media_file_nonce_field: Option<String>,
}

/// A validated download request
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DownloadRequest {
    pub resource_id: i64,
}

/// Validates download submissions before any response work happens.
pub struct RequestAuthorizer<'a> {
    nonces: &'a NonceGuard,
    hooks: &'a HookRegistry,
}

impl<'a> RequestAuthorizer<'a> {
    pub fn new(nonces: &'a NonceGuard, hooks: &'a HookRegistry) -> Self {
        Self { nonces, hooks }
    }

    /// Validate a form submission.
    ///
    /// Returns `Ok(None)` when the submission is not a download action
    /// (marker absent, or no usable attachment id), `Err(Forbidden)`
    /// when the nonce is invalid or a permission hook vetoes, and
    /// `Ok(Some(_))` otherwise.
    pub fn authorize(&self, form: &DownloadForm) -> Result<Option<DownloadRequest>> {
        if form.download_media_file.is_none() {
            return Ok(None);
        }

        let token = form
            .download_media_file_nonce_field
            .as_deref()
            .unwrap_or_default();
        if !self.nonces.verify(DOWNLOAD_ACTION, token) {
            return Err(AppError::Forbidden(
                "download nonce missing or invalid".to_string(),
            ));
        }

        let resource_id = match form
            .post_id
            .as_deref()
            .and_then(|raw| raw.trim().parse::<i64>().ok())
        {
            Some(id) if id > 0 => id,
            // missing or non-positive id is treated like an absent marker
            _ => return Ok(None),
        };

        if self.hooks.check_permissions(resource_id) == HookDecision::Halt {
            return Err(AppError::Forbidden(format!(
                "permission hook vetoed download of attachment {}",
                resource_id
            )));
        }

        Ok(Some(DownloadRequest { resource_id }))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;
    use std::time::Duration;

    fn guard() -> NonceGuard {
        NonceGuard::new("test-secret", Duration::from_secs(86400))
    }

    fn valid_form(nonces: &NonceGuard, post_id: &str) -> DownloadForm {
        DownloadForm {
            download_media_file: Some("Download".to_string()),
            post_id: Some(post_id.to_string()),
            download_media_file_nonce_field: Some(nonces.issue(DOWNLOAD_ACTION)),
        }
    }

    #[test]
    fn missing_marker_yields() {
        let nonces = guard();
        let hooks = HookRegistry::new();
        let authorizer = RequestAuthorizer::new(&nonces, &hooks);

        let form = DownloadForm {
            post_id: Some("42".to_string()),
            download_media_file_nonce_field: Some(nonces.issue(DOWNLOAD_ACTION)),
            ..DownloadForm::default()
        };
        assert_eq!(authorizer.authorize(&form).unwrap(), None);
    }

    #[test]
    fn valid_submission_authorizes() {
        let nonces = guard();
        let hooks = HookRegistry::new();
        let authorizer = RequestAuthorizer::new(&nonces, &hooks);

        let request = authorizer.authorize(&valid_form(&nonces, "42")).unwrap();
        assert_eq!(request, Some(DownloadRequest { resource_id: 42 }));
    }

    #[test]
    fn bad_nonce_is_forbidden() {
        let nonces = guard();
        let hooks = HookRegistry::new();
        let authorizer = RequestAuthorizer::new(&nonces, &hooks);

        let mut form = valid_form(&nonces, "42");
        form.download_media_file_nonce_field = Some("0000000000".to_string());
        assert!(matches!(
            authorizer.authorize(&form),
            Err(AppError::Forbidden(_))
        ));
    }

    #[test]
    fn missing_nonce_is_forbidden() {
        let nonces = guard();
        let hooks = HookRegistry::new();
        let authorizer = RequestAuthorizer::new(&nonces, &hooks);

        let mut form = valid_form(&nonces, "42");
        form.download_media_file_nonce_field = None;
        assert!(matches!(
            authorizer.authorize(&form),
            Err(AppError::Forbidden(_))
        ));
    }

    #[test]
    fn nonpositive_id_yields() {
        let nonces = guard();
        let hooks = HookRegistry::new();
        let authorizer = RequestAuthorizer::new(&nonces, &hooks);

        for post_id in ["0", "-3", "abc", ""] {
            let form = valid_form(&nonces, post_id);
            assert_eq!(authorizer.authorize(&form).unwrap(), None, "post_id={:?}", post_id);
        }
    }

    #[test]
    fn permission_hook_can_veto() {
        struct DenyAll;
        impl crate::hooks::PermissionHook for DenyAll {
            fn check(&self, _resource_id: i64) -> HookDecision {
                HookDecision::Halt
            }
        }

        let nonces = guard();
        let mut hooks = HookRegistry::new();
        hooks.register_permission(Arc::new(DenyAll));
        let authorizer = RequestAuthorizer::new(&nonces, &hooks);

        assert!(matches!(
            authorizer.authorize(&valid_form(&nonces, "42")),
            Err(AppError::Forbidden(_))
        ));
    }
}
