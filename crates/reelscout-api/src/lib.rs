//! Catalog client library for reelscout.
//!
//! Provides a client for the OMDb movie metadata service.

/// OMDb API client.
pub mod omdb;
