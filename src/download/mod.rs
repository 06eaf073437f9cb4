//! Streaming download responder
//!
//! Resolves an authorized attachment id, assembles the forced-download
//! response headers, and streams the file body in fixed chunks. The
//! returned response terminates the request: every path out of
//! [`StreamingResponder::respond`] is either a complete download or a
//! terminal error page, never a fall-through to other handling.

mod stream;

pub use stream::{chunked_stream, CHUNK_SIZE};

use axum::{
    body::Body,
    http::{header, HeaderMap, StatusCode},
    response::Response,
};
use tokio::fs::File;

use crate::error::{AppError, Result};
use crate::hooks::HookRegistry;
use crate::media::AttachmentStore;

/// Far-past expiry date used by both cache header branches
const FAR_PAST_EXPIRES: &str = "Wed, 11 Jan 1984 05:00:00 GMT";

/// Transport facts about the requesting client, taken from request
/// headers at the route edge.
#[derive(Debug, Clone, Default)]
pub struct ClientContext {
    pub user_agent: Option<String>,
    pub tls: bool,
}

impl ClientContext {
    pub fn from_headers(headers: &HeaderMap, tls_terminated: bool) -> Self {
        let user_agent = headers
            .get(header::USER_AGENT)
            .and_then(|value| value.to_str().ok())
            .map(str::to_owned);
        let forwarded_https = headers
            .get("x-forwarded-proto")
            .and_then(|value| value.to_str().ok())
            .map(|proto| proto.eq_ignore_ascii_case("https"))
            .unwrap_or(false);

        Self {
            user_agent,
            tls: tls_terminated || forwarded_https,
        }
    }

    /// Legacy Internet Explorer detection, Opera excluded. IE refuses
    /// TLS downloads when the standard no-cache headers are present.
    pub fn is_legacy_msie(&self) -> bool {
        match &self.user_agent {
            Some(ua) => (ua.contains("MSIE") || ua.contains("Trident")) && !ua.contains("Opera"),
            None => false,
        }
    }
}

/// Streams one attachment per call.
pub struct StreamingResponder<'a> {
    store: AttachmentStore<'a>,
    hooks: &'a HookRegistry,
    max_transfer_bytes: Option<u64>,
}

impl<'a> StreamingResponder<'a> {
    pub fn new(
        store: AttachmentStore<'a>,
        hooks: &'a HookRegistry,
        max_transfer_bytes: Option<u64>,
    ) -> Self {
        Self {
            store,
            hooks,
            max_transfer_bytes,
        }
    }

    /// Resolve `resource_id` and stream it as a forced download.
    ///
    /// No header is produced until the file is known to exist and be
    /// readable; after the body starts streaming, a read failure ends
    /// the connection mid-transfer since a clean error page is no
    /// longer possible.
    pub async fn respond(&self, resource_id: i64, client: &ClientContext) -> Result<Response> {
        let resolved = self.store.resolve(resource_id).await?.ok_or_else(|| {
            AppError::NotFound(format!(
                "attachment {} does not resolve to a readable file",
                resource_id
            ))
        })?;

        if let Some(max) = self.max_transfer_bytes {
            if resolved.size_bytes > max {
                return Err(AppError::BadRequest(format!(
                    "attachment {} is {} bytes, above the {} byte transfer cap",
                    resource_id, resolved.size_bytes, max
                )));
            }
        }

        // header hooks run before any core header is assembled
        let extension_headers = self.hooks.collect_headers(resource_id);

        let file = File::open(&resolved.absolute_path).await.map_err(|e| {
            AppError::NotFound(format!("attachment {} could not be opened: {}", resource_id, e))
        })?;

        let mut builder = Response::builder().status(StatusCode::OK);

        builder = if client.is_legacy_msie() && client.tls {
            builder
                .header(header::EXPIRES, FAR_PAST_EXPIRES)
                .header(header::CACHE_CONTROL, "private")
        } else {
            builder
                .header(header::EXPIRES, FAR_PAST_EXPIRES)
                .header(header::CACHE_CONTROL, "no-cache, must-revalidate, max-age=0")
        };

        builder = builder
            .header("x-robots-tag", "noindex, nofollow")
            .header(header::CONTENT_TYPE, resolved.mime_type.as_str())
            .header("content-description", "File Transfer")
            .header(
                header::CONTENT_DISPOSITION,
                format!(
                    "attachment; filename=\"{}\"",
                    sanitize_filename(&resolved.display_name)
                ),
            )
            .header("content-transfer-encoding", "binary")
            .header(header::CONTENT_LENGTH, resolved.size_bytes);

        for (name, value) in extension_headers {
            builder = builder.header(name, value);
        }

        tracing::info!(
            id = resource_id,
            name = %resolved.display_name,
            size_bytes = resolved.size_bytes,
            "Starting media transfer"
        );

        builder
            .body(Body::from_stream(chunked_stream(file)))
            .map_err(|e| AppError::Internal(e.to_string()))
    }
}

/// Keep a filename safe to embed in a quoted header parameter. The name
/// comes from the attachment index, never from the request, but an
/// on-disk name could still carry quotes or control characters.
fn sanitize_filename(name: &str) -> String {
    name.chars()
        .filter(|c| *c != '"' && !c.is_control())
        .collect()
}
