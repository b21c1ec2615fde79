// crates/stackctl-config/src/lib.rs
// ============================================================================
// Module: Stackctl Config Library
// Description: Canonical config model and validation.
// Purpose: Single source of truth for stackctl.toml semantics.
// Dependencies: stackctl-core, serde, toml
// ============================================================================

//! ## Overview
//! `stackctl-config` defines the configuration model for stackctl. Loading is
//! strict and fail-closed: oversized, non-UTF-8, or unknown-field inputs are
//! rejected, and the validated model converts directly into core types.

// ============================================================================
// SECTION: Modules
// ============================================================================

pub mod config;

// ============================================================================
// SECTION: Re-Exports
// ============================================================================

pub use config::*;
