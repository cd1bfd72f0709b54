//! # LandSight
//!
//! Land recognition backend: capture a geolocation fix and a photograph of a
//! plot of land, derive a land-characteristics report, and persist the
//! result as a per-user analysis record.
//!
//! ## Features
//!
//! - **Classification**: deterministic latitude-band mapping from a
//!   coordinate to terrain, vegetation, soil and land-use characteristics
//! - **Record Store**: per-owner insert/list/delete with in-memory and
//!   PostgreSQL backends behind a repository trait
//! - **Capture Session**: state machine orchestrating geolocation fix,
//!   image capture and atomic submission
//! - **History Browser**: refresh/select/delete view over past analyses
//! - **HTTP API**: axum endpoints with bearer authentication and permissive
//!   CORS for browser clients
//!
//! ## Architecture
//!
//! The crate is organized into several logical modules:
//!
//! - [`api`]: core domain types shared across layers
//! - [`classifier`]: the pure coordinate-to-report mapping
//! - [`db`]: repository pattern, service layer and persistence backends
//! - [`auth`]: bearer token exchange and session context lifecycle
//! - [`device`]: camera and geolocation collaborator traits
//! - [`capture`]: the capture session state machine
//! - [`history`]: the read path over stored analyses
//! - [`http`]: axum-based HTTP server and request handlers

pub mod api;
pub mod auth;
pub mod capture;
pub mod classifier;
pub mod db;
pub mod device;
pub mod history;

#[cfg(feature = "http-server")]
pub mod http;
