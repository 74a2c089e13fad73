use actix_web::http::header::{self, ContentEncoding};
use actix_web::{web, Error, HttpRequest, HttpResponse};

use super::models::{ConfirmIssuanceForm, ReceiptPageQuery};
use crate::auth::actor_from_request;
use crate::receipt::{
    ContactId, ContributionContext, ContributionId, Download, PendingDocument, ReceiptView,
};
use crate::session::SessionScope;
use crate::AppState;

pub const RECEIPT_PATH: &str = "/contribute/taxreceipt";

const STATUS_NAMESPACE: &str = "status";
const STATUS_KEY: &str = "message";

async fn set_status(session: &SessionScope, message: &str) {
    session
        .set(STATUS_NAMESPACE, STATUS_KEY, message.to_string())
        .await;
}

async fn take_status(session: &SessionScope) -> Option<String> {
    session.take(STATUS_NAMESPACE, STATUS_KEY).await
}

pub fn page_url(context: &ContributionContext, offer_file: bool) -> String {
    let mut url = format!(
        "{}?reset=1&cid={}&id={}",
        RECEIPT_PATH, context.contact_id, context.contribution_id
    );
    if offer_file {
        url.push_str("&file=1");
    }
    url
}

pub fn download_url(context: &ContributionContext) -> String {
    format!(
        "{}?download=1&cid={}&id={}",
        RECEIPT_PATH, context.contact_id, context.contribution_id
    )
}

fn attachment_response(document: PendingDocument) -> HttpResponse {
    HttpResponse::Ok()
        .content_type("application/octet-stream")
        .insert_header(("Content-Description", "File Transfer"))
        .insert_header((
            header::CONTENT_DISPOSITION,
            format!("attachment; filename={}", document.filename),
        ))
        .insert_header(("Content-Transfer-Encoding", "binary"))
        .insert_header((header::EXPIRES, "0"))
        .insert_header((header::CACHE_CONTROL, "must-revalidate"))
        .insert_header((header::PRAGMA, "public"))
        // Keeps Compress off the body so the exact Content-Length is sent.
        .insert_header(ContentEncoding::Identity)
        .body(document.bytes)
}

#[utoipa::path(
    get,
    path = "/contribute/taxreceipt",
    tag = "Tax Receipts",
    params(ReceiptPageQuery),
    responses(
        (status = 200, description = "Receipt page, or the pending receipt file when download=1", body = ReceiptView),
        (status = 400, description = "No contribution selected", body = crate::ErrorResponse),
        (status = 401, description = "Missing or invalid token"),
        (status = 403, description = "Missing view capability", body = crate::ErrorResponse)
    )
)]
pub async fn view_tax_receipt(
    req: HttpRequest,
    query: web::Query<ReceiptPageQuery>,
    state: web::Data<AppState>,
) -> Result<HttpResponse, Error> {
    let actor = actor_from_request(&req)?;
    let session = state.session_for(&actor);
    let context = state
        .flow
        .resolve_context(&actor, &session, query.contribution_id(), query.contact_id())
        .await?;

    if query.wants_download() {
        match state
            .flow
            .download_pending_file(&actor, &session, &context)
            .await?
        {
            Download::Ready(document) => return Ok(attachment_response(document)),
            expired @ Download::Expired => {
                if let Some(message) = expired.status_message() {
                    set_status(&session, message).await;
                }
            }
        }
    }

    let mut view = state
        .flow
        .prepare(&actor, &context, query.offers_file())
        .await?;
    if view.pdf_file {
        view.download_url = Some(download_url(&context));
    }
    view.status = take_status(&session).await;

    Ok(HttpResponse::Ok().json(view))
}

#[utoipa::path(
    post,
    path = "/contribute/taxreceipt",
    tag = "Tax Receipts",
    request_body(content = ConfirmIssuanceForm, content_type = "application/x-www-form-urlencoded"),
    responses(
        (status = 303, description = "Receipt issued, rejected or failed; redirects back to the receipt page"),
        (status = 400, description = "No contribution selected", body = crate::ErrorResponse),
        (status = 401, description = "Missing or invalid token"),
        (status = 403, description = "Missing edit capability", body = crate::ErrorResponse),
        (status = 404, description = "Contribution not found", body = crate::ErrorResponse)
    )
)]
pub async fn confirm_tax_receipt(
    req: HttpRequest,
    form: Option<web::Form<ConfirmIssuanceForm>>,
    state: web::Data<AppState>,
) -> Result<HttpResponse, Error> {
    let actor = actor_from_request(&req)?;
    let session = state.session_for(&actor);
    let form = form.map(web::Form::into_inner).unwrap_or_default();
    let context = state
        .flow
        .resolve_context(
            &actor,
            &session,
            form.id.map(ContributionId),
            form.cid.map(ContactId),
        )
        .await?;

    let outcome = state
        .flow
        .confirm_issuance(&actor, &session, &context)
        .await?;
    set_status(&session, outcome.status_message()).await;

    let location = page_url(&context, outcome.has_pending_document());
    log::debug!("Redirecting to {}", location);
    Ok(HttpResponse::SeeOther()
        .insert_header((header::LOCATION, location))
        .finish())
}

pub fn config(cfg: &mut web::ServiceConfig) {
    cfg.service(
        web::resource(RECEIPT_PATH)
            .route(web::get().to(view_tax_receipt))
            .route(web::post().to(confirm_tax_receipt)),
    );
}
