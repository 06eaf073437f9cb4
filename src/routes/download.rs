//! Download action route
//!
//! `POST /media/download` is the multiplexed action endpoint: form
//! submissions without the download marker are acknowledged without any
//! action, everything else goes through the authorize/respond pipeline.

use axum::{
    extract::State,
    http::{HeaderMap, StatusCode},
    response::{IntoResponse, Response},
    routing::post,
    Form, Router,
};

use crate::auth::{DownloadForm, RequestAuthorizer};
use crate::download::{ClientContext, StreamingResponder};
use crate::error::Result;
use crate::media::AttachmentStore;
use crate::state::AppState;

/// Create the download router
pub fn router() -> Router<AppState> {
    Router::new().route("/download", post(process_download))
}

async fn process_download(
    State(state): State<AppState>,
    headers: HeaderMap,
    Form(form): Form<DownloadForm>,
) -> Result<Response> {
    let authorizer = RequestAuthorizer::new(state.nonces(), state.hooks());
    let request = match authorizer.authorize(&form)? {
        Some(request) => request,
        // not a download action; nothing to do for this submission
        None => return Ok(StatusCode::NO_CONTENT.into_response()),
    };

    let client = ClientContext::from_headers(&headers, state.config().server.tls_enabled);
    let responder = StreamingResponder::new(
        AttachmentStore::new(state.db()),
        state.hooks(),
        state.config().download.max_transfer_bytes,
    );
    responder.respond(request.resource_id, &client).await
}
