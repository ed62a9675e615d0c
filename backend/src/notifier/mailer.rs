use lettre::{
    message::{header::ContentType, Mailbox},
    Message, SendmailTransport, SmtpTransport, Transport,
};

use super::{Notification, Notifier, NotifyError};
use crate::config::MailTransport;

/// [`Notifier`] backed by lettre, using either the local sendmail binary or
/// an unauthenticated SMTP relay.
pub enum Mailer {
    Sendmail(SendmailTransport),
    Smtp(SmtpTransport),
}

impl Mailer {
    pub fn from_config(transport: &MailTransport) -> Self {
        match transport {
            MailTransport::Sendmail { command: Some(command) } => {
                Self::Sendmail(SendmailTransport::new_with_command(command.as_os_str()))
            }
            MailTransport::Sendmail { command: None } => Self::Sendmail(SendmailTransport::new()),
            MailTransport::Smtp { host, port } => {
                Self::Smtp(SmtpTransport::builder_dangerous(host.as_str()).port(*port).build())
            }
        }
    }
}

impl Notifier for Mailer {
    fn send(&self, notification: &Notification) -> Result<(), NotifyError> {
        let message = build_message(notification)?;
        match self {
            Self::Sendmail(transport) => transport
                .send(&message)
                .map(|_| ())
                .map_err(|e| NotifyError::Transport(e.to_string())),
            Self::Smtp(transport) => transport
                .send(&message)
                .map(|_| ())
                .map_err(|e| NotifyError::Transport(e.to_string())),
        }
    }
}

fn build_message(notification: &Notification) -> Result<Message, NotifyError> {
    let reply_to: Mailbox =
        notification
            .reply_to
            .parse()
            .map_err(|e: lettre::address::AddressError| NotifyError::ReplyTo {
                address: notification.reply_to.clone(),
                message: e.to_string(),
            })?;

    Ok(Message::builder()
        .from(notification.from.clone())
        .reply_to(reply_to)
        .to(notification.to.clone())
        .subject(notification.subject.as_str())
        .header(ContentType::TEXT_PLAIN)
        .body(notification.body.clone())?)
}
