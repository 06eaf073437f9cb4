//! Download form endpoint
//!
//! Returns the HTML form fragment the media UI embeds next to an
//! attachment: a hidden anti-forgery nonce, the attachment id, and the
//! submit marker the download endpoint looks for.

use axum::{
    extract::{Path, State},
    response::Html,
    routing::get,
    Router,
};

use crate::auth::DOWNLOAD_ACTION;
use crate::error::{AppError, Result};
use crate::media::AttachmentStore;
use crate::state::AppState;

/// Create the form router
pub fn router() -> Router<AppState> {
    Router::new().route("/:id/download-form", get(download_form))
}

async fn download_form(
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> Result<Html<String>> {
    let store = AttachmentStore::new(state.db());
    if store.resolve(id).await?.is_none() {
        return Err(AppError::NotFound(format!("attachment {} is not indexed", id)));
    }

    let nonce = state.nonces().issue(DOWNLOAD_ACTION);
    Ok(Html(format!(
        "<form class=\"download-media-file-form\" method=\"POST\" action=\"/media/download\">\n\
         <input type=\"hidden\" name=\"download_media_file_nonce_field\" value=\"{}\">\n\
         <input type=\"hidden\" name=\"post_id\" value=\"{}\">\n\
         <input type=\"submit\" class=\"button button-primary button-small\" \
         name=\"download_media_file\" value=\"Download\">\n\
         </form>\n",
        nonce, id
    )))
}
