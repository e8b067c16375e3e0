//! Summary emails about HubSpot syncs.

pub mod email;
pub mod templates;

pub use email::SmtpEmailSender;

use async_trait::async_trait;
use chrono::Utc;
use sea_orm::{ActiveModelTrait, ColumnTrait, DatabaseConnection, EntityTrait, QueryFilter, Set};
use thiserror::Error;

use crate::models::email_log;
use crate::models::prelude::*;
use crate::services::hubspot::FieldName;
use crate::services::hubspot_object::{HubspotDataEntry, HubspotObject, SyncState};

use templates::{
    full_template, main_content_template, simple_email_body_html, table_row_template,
    table_template,
};

#[derive(Debug, Error)]
pub enum NotifyError {
    #[error("Account {0} not found")]
    AccountNotFound(i64),

    #[error("Invalid email: {0}")]
    InvalidEmail(String),

    #[error("Failed to send email: {0}")]
    Send(String),

    #[error("Database error: {0}")]
    Database(#[from] sea_orm::DbErr),
}

/// A rendered email ready to be sent
#[derive(Debug, Clone, PartialEq)]
pub struct EmailMessage {
    pub recipient: String,
    pub subject: String,
    pub body_html: String,
}

/// Delivers HTML emails
#[async_trait]
pub trait EmailSender: Send + Sync {
    async fn send(&self, message: &EmailMessage) -> Result<(), NotifyError>;
}

/// Subject, body and idempotency id of a sync summary
#[derive(Debug, Clone)]
pub struct RenderedEmail {
    pub idempotency_id: String,
    pub subject: String,
    pub body_html: String,
}

fn extra_info(state: SyncState) -> Option<&'static str> {
    match state {
        SyncState::ErrorGpt => {
            Some("I had problems transforming your note into a HubSpot structures")
        }
        SyncState::ErrorHubspotSync => {
            Some("I encountered problems while syncing your data into your HubSpot")
        }
        SyncState::WarningAlreadyCreated => {
            Some("Note: The contact already exists in your HubSpot")
        }
        _ => None,
    }
}

fn object_to_table(heading: &str, obj: &HubspotObject, extra_content: &str) -> String {
    let rows: Vec<String> = obj
        .form
        .fields
        .iter()
        .filter(|field| !field.ignore_in_display && !field.ignore_in_email)
        .filter_map(|field| obj.display_label_with_value(&field.name))
        .map(|(label, value)| table_row_template(&label, &value))
        .collect();
    table_template(heading, &rows.join("\n"), extra_content)
}

/// The synced object, or what was extracted when syncing failed
fn objects_maybe_to_table(
    heading: &str,
    obj: Option<&HubspotObject>,
    gpt_obj: Option<&HubspotObject>,
    extra_content: &str,
) -> String {
    match (obj, gpt_obj) {
        (Some(obj), _) => object_to_table(heading, obj, extra_content),
        (None, Some(gpt_obj)) => {
            main_content_template("Could not sync data to HubSpot (API error)", Some(heading))
                + &object_to_table(heading, gpt_obj, extra_content)
        }
        (None, None) => main_content_template(
            "Could not parse data into structure (GPT error)",
            Some(heading),
        ),
    }
}

/// Render the summary email for a finished sync
pub fn render_hubspot_result(idempotency_id_prefix: &str, data: &HubspotDataEntry) -> RenderedEmail {
    let idempotency_id = format!("{}-result-{}", idempotency_id_prefix, data.state.as_str());
    let subject = format!(
        "HubSpot Data Entry for {} - {}",
        data.contact_name(),
        data.state.capitalized()
    );

    if data.state.needs_more_information() {
        let body_html = simple_email_body_html(
            &format!("Note is {} - please enter more information.", data.state),
            &data.transcript,
            Some("This is how I understood it"),
        );
        return RenderedEmail {
            idempotency_id,
            subject,
            body_html,
        };
    }

    let mut pre_header = subject.clone();
    let mut extra_info_html = String::new();
    if let Some(info) = extra_info(data.state) {
        extra_info_html = main_content_template(info, Some("Sync Status"));
        pre_header = info.to_string();
    }

    let contact_table = objects_maybe_to_table(
        "Contact Info",
        data.contact.as_ref(),
        data.gpt_contact.as_ref(),
        "",
    );

    // To Dos render below the task table
    let todos_field = FieldName::HsTaskBody.as_str();
    let todos_extra_content = match &data.task {
        Some(task) if task.has_value(todos_field) => format!(
            "\n            <p><b>To Dos</b></p>\n            <p>{}</p>",
            task.display_value(todos_field)
        ),
        _ => String::new(),
    };
    let task_table = objects_maybe_to_table(
        "Follow up Tasks",
        data.task.as_ref(),
        data.gpt_task.as_ref(),
        &todos_extra_content,
    );

    let further_details = match &data.call {
        Some(call) => main_content_template(
            &format!(
                r#"<p style="line-height: 1.5;">{}</p>"#,
                call.display_value(FieldName::HsCallBody.as_str())
            ),
            Some("Further Details"),
        ),
        None => main_content_template(
            "<p>Could not sync data to HubSpot (API error)</p>",
            Some("Further Details"),
        ),
    };

    let body_html = full_template(
        "HubSpot Data Entry Confirmation",
        &format!(
            "\n{}\n{}\n{}\n{}\n",
            contact_table, task_table, further_details, extra_info_html
        ),
        Some(pre_header.as_str()),
    );

    RenderedEmail {
        idempotency_id,
        subject,
        body_html,
    }
}

/// Email the sync summary to the account, at most once per idempotency id.
///
/// Returns `false` when the email was already sent.
pub async fn send_hubspot_result(
    db: &DatabaseConnection,
    sender: &dyn EmailSender,
    account_id: i64,
    idempotency_id_prefix: &str,
    data: &HubspotDataEntry,
) -> Result<bool, NotifyError> {
    let account = Account::find_by_id(account_id)
        .one(db)
        .await?
        .ok_or(NotifyError::AccountNotFound(account_id))?;

    let rendered = render_hubspot_result(idempotency_id_prefix, data);

    let already_sent = EmailLog::find()
        .filter(email_log::Column::IdempotencyId.eq(rendered.idempotency_id.as_str()))
        .one(db)
        .await?;
    if already_sent.is_some() {
        tracing::info!(
            "Email {} already sent to account {}, skipping",
            rendered.idempotency_id,
            account_id
        );
        return Ok(false);
    }

    let message = EmailMessage {
        recipient: account.email.clone(),
        subject: rendered.subject.clone(),
        body_html: rendered.body_html.clone(),
    };
    sender.send(&message).await?;

    let log = email_log::ActiveModel {
        account_id: Set(Some(account_id)),
        idempotency_id: Set(rendered.idempotency_id.clone()),
        recipient: Set(message.recipient),
        subject: Set(message.subject),
        body_html: Set(message.body_html),
        sent_at: Set(Utc::now()),
        ..Default::default()
    };
    log.insert(db).await?;

    tracing::info!(
        "Sent HubSpot result email {} to account {}",
        rendered.idempotency_id,
        account_id
    );
    Ok(true)
}
