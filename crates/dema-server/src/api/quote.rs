use axum::{
    extract::{rejection::JsonRejection, State},
    Extension, Json,
};
use chrono::Utc;
use dema_core::{QuoteDocument, QuoteError, QuoteRequest, CUSTOMER_SUBJECT};
use serde::Serialize;

use crate::mailer::{MailAttachment, MailMessage};
use crate::middleware::RequestId;

use super::{ApiError, AppState};

const ATTACHMENT_NAME: &str = "quote-request.pdf";
const SUCCESS_MESSAGE: &str = "Quote request sent successfully";
const FAILURE_MESSAGE: &str =
    "Failed to send quote request. Please try again or contact us directly.";

/// Sender and fixed recipient list for quote mail.
#[derive(Debug, Clone)]
pub struct QuoteMailSettings {
    pub from: String,
    pub recipients: Vec<String>,
}

#[derive(Debug, Serialize)]
pub(super) struct QuoteSubmitted {
    success: bool,
    message: &'static str,
}

/// Message for the sales team; replies go to the customer.
fn team_message(
    settings: &QuoteMailSettings,
    request: &QuoteRequest,
    document: &QuoteDocument,
    pdf: &MailAttachment,
) -> Result<MailMessage, QuoteError> {
    Ok(MailMessage {
        from: settings.from.clone(),
        to: settings.recipients.clone(),
        reply_to: Some(request.customer.email.clone()),
        subject: document.team_subject(),
        text: document.to_string(),
        html: document.to_html()?,
        attachments: vec![pdf.clone()],
    })
}

/// Acknowledgement for the customer, carrying a copy of the document.
fn customer_message(
    settings: &QuoteMailSettings,
    request: &QuoteRequest,
    document: &QuoteDocument,
    pdf: &MailAttachment,
) -> Result<MailMessage, QuoteError> {
    Ok(MailMessage {
        from: settings.from.clone(),
        to: vec![request.customer.email.clone()],
        reply_to: None,
        subject: CUSTOMER_SUBJECT.to_string(),
        text: document.confirmation_text()?,
        html: document.confirmation_html()?,
        attachments: vec![pdf.clone()],
    })
}

/// Render the document once and build both messages from it.
pub(super) fn compose(
    settings: &QuoteMailSettings,
    request: &QuoteRequest,
    document: &QuoteDocument,
) -> Result<(MailMessage, MailMessage), QuoteError> {
    let pdf = MailAttachment::pdf(ATTACHMENT_NAME, &document.to_pdf()?);
    Ok((
        team_message(settings, request, document, &pdf)?,
        customer_message(settings, request, document, &pdf)?,
    ))
}

/// Validate a quote request, mail it to the team and confirm to the
/// customer.
///
/// Only the team message decides the outcome; a failed confirmation is
/// logged.
pub(super) async fn submit_quote(
    State(state): State<AppState>,
    Extension(req_id): Extension<RequestId>,
    payload: Result<Json<QuoteRequest>, JsonRejection>,
) -> Result<Json<QuoteSubmitted>, ApiError> {
    let Json(request) = payload.map_err(|rejection| {
        tracing::warn!(error = %rejection, "malformed quote request body");
        ApiError::new(req_id.0.clone(), "bad_request", rejection.body_text())
    })?;

    request.validate().map_err(|e| {
        tracing::warn!(error = %e, "quote request rejected");
        ApiError::new(req_id.0.clone(), "validation_error", e.to_string())
    })?;

    let Some(mailer) = state.mailer.as_deref() else {
        tracing::error!("quote request received but no mail relay is configured");
        return Err(ApiError::new(req_id.0, "mail_error", FAILURE_MESSAGE));
    };

    let document = QuoteDocument::new(&request, Utc::now());
    let (team, confirmation) =
        compose(&state.quote_mail, &request, &document).map_err(|e| {
            tracing::error!(error = %e, request_id = %req_id.0, "failed to render quote request");
            ApiError::new(req_id.0.clone(), "render_error", FAILURE_MESSAGE)
        })?;

    if let Err(e) = mailer.send(&team).await {
        tracing::error!(error = %e, request_id = %req_id.0, "failed to send quote request to team");
        return Err(ApiError::new(req_id.0, "mail_error", FAILURE_MESSAGE));
    }

    if let Err(e) = mailer.send(&confirmation).await {
        tracing::error!(error = %e, request_id = %req_id.0, "failed to send quote confirmation to customer");
    }

    tracing::info!(
        request_id = %req_id.0,
        items = request.items.len(),
        units = request.total_quantity(),
        recipients = %state.quote_mail.recipients.join(", "),
        "quote request sent"
    );

    Ok(Json(QuoteSubmitted {
        success: true,
        message: SUCCESS_MESSAGE,
    }))
}
