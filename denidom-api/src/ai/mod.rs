//! Generative-AI helpers
//!
//! [`client`] talks to the external API, [`prompts`] builds the requests and
//! [`flows`] combines them with the heuristic fallbacks from denidom-core.

pub mod client;
pub mod flows;
pub mod prompts;

pub use client::{AiClient, AiError};
pub use flows::{cost_advice, generate_estimate, CostAdvice, GeneratedEstimate, Source};
