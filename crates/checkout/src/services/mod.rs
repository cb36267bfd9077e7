//! Side-effect services.
//!
//! # Services
//!
//! - `email` - SMTP delivery via lettre
//! - `notification` - Staff notification composition and dispatch

pub mod email;
pub mod notification;

pub use email::{EmailError, NotificationSender, SmtpMailer};
pub use notification::{
    NotificationError, NotificationPayload, collect_recipients, compose, spawn_notification,
};
