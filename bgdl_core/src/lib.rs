//! Background downloads with a completion broadcast relay.
//!
//! `service` runs the downloads and plays the role of the host download
//! manager; `relay` forwards its "a download has finished" broadcast to a
//! single application callback.

pub mod relay;
pub mod service;
pub mod types;
