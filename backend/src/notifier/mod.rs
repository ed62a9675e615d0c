//! Staff notification for new submissions.
//!
//! [`compose`] turns a [`Submission`] into a plain-text [`Notification`];
//! a [`Notifier`] delivers it. Delivery is best effort: [`notify`] logs the
//! failure and reports `false`, it never fails the request.

pub mod mailer;

use common::model::submission::Submission;
use lettre::message::Mailbox;
use log::warn;
use thiserror::Error;

pub use mailer::Mailer;

const INTRO: &str = "Soulful Kitchen inquiry received";

#[derive(Debug, Error)]
pub enum NotifyError {
    #[error("reply-to address `{address}` rejected: {message}")]
    ReplyTo { address: String, message: String },

    #[error("could not build message: {0}")]
    Build(#[from] lettre::error::Error),

    #[error("transport failed: {0}")]
    Transport(String),
}

/// A composed, ready-to-send staff email.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Notification {
    pub to: Mailbox,
    pub from: Mailbox,
    /// The submitter's address, exactly as they typed it.
    pub reply_to: String,
    pub subject: String,
    pub body: String,
}

/// Anything that can deliver a [`Notification`]. Called from a blocking
/// thread, so implementations may block.
pub trait Notifier: Send + Sync {
    fn send(&self, notification: &Notification) -> Result<(), NotifyError>;
}

/// Builds the staff email for `submission`.
pub fn compose(submission: &Submission, to: &Mailbox, from: &Mailbox, subject: &str) -> Notification {
    let lines = [
        ("Name", &submission.name),
        ("Email", &submission.email),
        ("Phone", &submission.phone),
        ("Event date", &submission.date),
        ("Guests", &submission.guests),
        ("Location", &submission.location),
        ("Referral", &submission.referral),
        ("Source", &submission.source),
        ("Notes", &submission.notes),
        ("Submitted at", &submission.submitted_at),
    ];

    let mut body = format!("{INTRO}\n\n");
    for (label, value) in lines {
        body.push_str(&format!("{label}: {value}\n"));
    }

    Notification {
        to: to.clone(),
        from: from.clone(),
        reply_to: submission.email.clone(),
        subject: subject.to_string(),
        body,
    }
}

/// Sends `notification`, reporting success as a flag.
pub fn notify(notifier: &dyn Notifier, notification: &Notification) -> bool {
    match notifier.send(notification) {
        Ok(()) => true,
        Err(e) => {
            warn!("Notification to {} not sent: {e}", notification.to);
            false
        }
    }
}
