//! # ArtScope
//!
//! Backend for museum staff: museum registration, staff accounts, artwork
//! uploads with QR codes, translations and location-gated access checks.
//!
//! ## Features
//!
//! - **Accounts**: combined museum and admin registration, session login
//! - **Forms**: declarative forms that validate submissions and describe
//!   their fields to the client
//! - **Artworks**: uploads with media storage, artists, tags and translations
//! - **Geolocation**: QR code generation and WGS-84 geofence checks
//! - **HTTP API**: axum pages and form endpoints
//!
//! ## Architecture
//!
//! The crate is organized into several logical modules:
//!
//! - [`api`]: Identifier types and page data re-exports
//! - [`auth`]: Password hashing, sessions and flash messages
//! - [`config`]: Server configuration from file and environment
//! - [`db`]: Repository pattern and persistence layer
//! - [`forms`]: Form definitions and field cleaning
//! - [`geolocation`]: QR codes and geofencing
//! - [`media`]: Stored uploads and generated files
//! - [`models`]: Domain records
//! - [`routes`]: Route paths, templates and page contexts
//! - [`services`]: Business logic between handlers and repository
//! - [`http`]: Axum-based HTTP server and request handlers

// Allow large error types - RepositoryError contains rich context for debugging
#![allow(clippy::result_large_err)]

pub mod api;
pub mod auth;
pub mod config;

pub mod db;
pub mod forms;
pub mod geolocation;
pub mod media;
pub mod models;

pub mod routes;

pub mod services;

#[cfg(feature = "http-server")]
pub mod http;
