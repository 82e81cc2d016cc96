//! Provider-facing webhooks: inbound call personalization and telephony status.

pub mod directory;
pub mod handlers;
