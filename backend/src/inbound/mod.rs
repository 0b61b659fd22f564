//! Inbound adapters translating external requests into driving-port calls.
//!
//! HTTP is the only transport; framework types stay inside [`http`].

pub mod http;
