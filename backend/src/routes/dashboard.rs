//! Staff dashboard.

use serde::Serialize;

use super::artworks::ArtworkSummary;
use crate::models::Museum;

pub const DASHBOARD_PATH: &str = "/dashboard/";
pub const DASHBOARD_TEMPLATE: &str = "dashboard.html";

/// Number of recent artworks listed on the dashboard.
pub const DASHBOARD_ARTWORK_LIMIT: usize = 10;

/// Context of the dashboard page.
#[derive(Debug, Clone, Serialize)]
pub struct DashboardData {
    pub museum: Museum,
    pub staff_name: String,
    /// Most recent artworks, newest first
    pub artworks: Vec<ArtworkSummary>,
    pub total_artworks: usize,
    /// Artworks currently on display
    pub active_artworks: usize,
}
