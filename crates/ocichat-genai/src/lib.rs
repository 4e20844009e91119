//! OCI Generative AI inference client.

mod client;

pub use client::{GenAiClient, endpoint_for_region};
