//! Platform Integration
//!
//! Credential handling and the Vertex AI REST client the deployment
//! pipeline talks to.

pub mod auth;
pub mod client;

pub use client::VertexClient;
