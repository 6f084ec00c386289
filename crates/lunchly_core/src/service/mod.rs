//! Core use-case services.
//!
//! # Responsibility
//! - Orchestrate repository calls into use-case level APIs.
//! - Keep route handlers and the CLI decoupled from storage details.

pub mod customer_service;
