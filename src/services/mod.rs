pub mod forms;
pub mod hubspot;
pub mod hubspot_object;
pub mod notification;
pub mod reconciler;
pub mod sync;

pub use hubspot::{CrmError, HubspotApi, HubspotClient, HttpHubspotApi};
pub use notification::{EmailSender, SmtpEmailSender};
pub use sync::FormFiller;
