//! Page definitions: paths, template names and the context each page renders.

pub mod artworks;
pub mod auth;
pub mod dashboard;
pub mod landing;
