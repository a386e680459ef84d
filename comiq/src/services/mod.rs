//! Third-party services.

pub mod oai;
