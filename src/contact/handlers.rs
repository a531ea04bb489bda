// src/contact/handlers.rs
//! Contact form handler - emails the studio inbox, keeping a database
//! copy when delivery is unavailable

use axum::extract::{Extension, Json};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tokio::sync::RwLock;
use tracing::{error, info};

use crate::common::{generate_contact_message_id, ApiError, AppState};

#[derive(Debug, Deserialize)]
pub struct ContactFormRequest {
    pub name: String,
    pub email: String,
    pub message: String,
}

#[derive(Debug, Serialize)]
pub struct ContactFormResponse {
    pub success: bool,
    pub message: String,
}

/// POST /api/contact - Submit the contact form (public endpoint)
pub async fn submit_contact_form(
    Extension(state_lock): Extension<Arc<RwLock<AppState>>>,
    Json(request): Json<ContactFormRequest>,
) -> Result<Json<ContactFormResponse>, ApiError> {
    // Validate input
    if request.name.trim().is_empty() {
        return Err(ApiError::BadRequest("Name is required".to_string()));
    }
    if request.email.trim().is_empty() || !request.email.contains('@') {
        return Err(ApiError::BadRequest("Valid email is required".to_string()));
    }
    if request.message.trim().is_empty() {
        return Err(ApiError::BadRequest("Message is required".to_string()));
    }

    let state = state_lock.read().await.clone();

    // Try to send to the studio inbox when email is configured
    if let Some(inbox) = &state.contact_inbox {
        let subject = format!("Contact Form: {}", request.name);
        let body = build_contact_email_html(&request);

        match state
            .email_service
            .send(vec![inbox.clone()], &subject, &body)
            .await
        {
            Ok(()) => {
                info!(
                    from_name = %request.name,
                    from_email = %request.email,
                    "Contact form email sent successfully"
                );
                return Ok(Json(ContactFormResponse {
                    success: true,
                    message: "Thank you for your message! We'll get back to you soon.".to_string(),
                }));
            }
            Err(e) => {
                error!(error = %e, "Failed to send contact form email");
                // Fall through to store in database
            }
        }
    }

    // Store in database as fallback (or primary if email not configured)
    let contact_id = generate_contact_message_id();

    sqlx::query(
        r#"
        INSERT INTO contact_messages (id, name, email, message)
        VALUES (?, ?, ?, ?)
        "#,
    )
    .bind(&contact_id)
    .bind(&request.name)
    .bind(&request.email)
    .bind(&request.message)
    .execute(&state.db)
    .await
    .map_err(ApiError::DatabaseError)?;

    info!(
        contact_id = %contact_id,
        from_name = %request.name,
        from_email = %request.email,
        "Contact form submission stored in database"
    );

    Ok(Json(ContactFormResponse {
        success: true,
        message: "Thank you for your message! We'll get back to you soon.".to_string(),
    }))
}

/// Build HTML email content for contact form
fn build_contact_email_html(request: &ContactFormRequest) -> String {
    format!(
        r#"<!DOCTYPE html>
<html>
<head>
    <meta charset="UTF-8">
    <style>
        body {{ font-family: -apple-system, BlinkMacSystemFont, 'Segoe UI', Roboto, sans-serif; line-height: 1.6; color: #333; }}
        .container {{ max-width: 600px; margin: 0 auto; padding: 20px; }}
        .field-label {{ font-size: 12px; font-weight: 600; color: #6b7280; text-transform: uppercase; }}
        .message-box {{ background: #f9fafb; padding: 20px; border-radius: 8px; border: 1px solid #e5e7eb; }}
    </style>
</head>
<body>
    <div class="container">
        <h1>New contact form submission</h1>
        <div class="field-label">From</div>
        <p>{} &lt;{}&gt;</p>
        <div class="message-box">
            <div class="field-label">Message</div>
            <p style="white-space: pre-wrap;">{}</p>
        </div>
    </div>
</body>
</html>"#,
        html_escape(&request.name),
        html_escape(&request.email),
        html_escape(&request.message)
    )
}

/// Simple HTML escape function
pub(crate) fn html_escape(s: &str) -> String {
    s.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
        .replace('\'', "&#39;")
}
