//! Collaborator boundary: HTTP adapter for the backend API.

mod client;

pub use client::{classify_response, ApiClient, EndpointSource};
