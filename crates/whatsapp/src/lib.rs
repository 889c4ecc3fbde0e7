//! WhatsApp Cloud API integration.
//!
//! Covers the full provider edge: webhook subscription verification, payload
//! normalization into relay events, and outbound text delivery through the
//! Graph API with length capping.

pub mod config;
pub mod outbound;
pub mod text;
pub mod types;
pub mod webhook;

pub use {
    config::WhatsAppConfig,
    outbound::CloudApiSender,
    text::{TRUNCATION_MARKER, WHATSAPP_MAX_MESSAGE_LEN, truncate_with_marker},
    types::WebhookPayload,
    webhook::{normalize, verify_subscription},
};
