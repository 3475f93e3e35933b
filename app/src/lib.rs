//! FindMyJob client core library.
//!
//! Layout follows ports and adapters: `domain` holds types, services, and
//! the traits they depend on; `outbound` implements those traits over HTTP
//! and the local filesystem; `inbound` drives the services from the command
//! line; `config` loads settings.

pub mod config;
pub mod domain;
pub mod inbound;
pub mod outbound;

#[cfg(any(test, feature = "test-support"))]
pub mod test_support;
