//! Domain records stored by the repository layer.
//!
//! These carry only the attributes the forms, views and geolocation helpers
//! read or write.

pub mod artwork;
pub mod macros;
pub mod museum;

pub use artwork::*;
pub use museum::*;
