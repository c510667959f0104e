//! MutualRisk backend integration.
//!
//! This module provides a high-level interface to the backend REST API,
//! handling transport, rate limiting, response decoding, caching and data
//! conversion.

mod cache;
mod client;
mod converter;
mod schema;
mod transport;

pub use cache::{QueryCache, QueryKey};
pub use client::ApiClient;
pub use converter::DataConverter;
pub use schema::PortfolioInitRequest;
pub use transport::{ApiRequest, ApiResponse, HttpMethod, ReqwestTransport, Transport};
