//! Gemini-backed reply generation.
//!
//! Wraps the `generateContent` REST endpoint behind the
//! [`parlo_core::ReplyGenerator`] trait. Failures never surface to callers;
//! they degrade to a canned fallback reply so the relay always has something
//! to send back.

pub mod config;
pub mod generate;

pub use {
    config::GeminiConfig,
    generate::{EMPTY_CANDIDATE_REPLY, FALLBACK_REPLY, GeminiGenerator},
};
