//! Outbound adapters implementing the repository port.
//!
//! - **memory**: process-local storage evaluating scopes in memory
//! - **persistence**: PostgreSQL repositories using Diesel
//!
//! Adapters translate between domain types and storage representations and
//! contain no business rules.

pub mod memory;
pub mod persistence;
