//! Image palette extraction and semantic color role assignment.
//!
//! [`pipeline::extract`] reduces an image to a few weighted colors and
//! [`pipeline::assign::categorize`] turns any color list into a role-indexed
//! [`theme::CategorizedPalette`]: background, foreground, accents, semantic
//! colors and derived surfaces.

pub mod cli;
pub mod color;
pub mod error;
pub mod pipeline;
pub mod preview;
pub mod role;
pub mod theme;

pub use pipeline::assign::categorize;
