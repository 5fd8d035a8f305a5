//! Networking modules for the BaaS REST API.
//!
//! SYSTEM CONTEXT
//! ==============
//! `baas` implements the identity provider, role store and table queries;
//! `types` defines the wire schema.

pub mod baas;
pub mod types;
