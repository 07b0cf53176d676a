//! Highlight lifecycle
//!
//! [`HighlightManager`] owns every on-page highlight: it anchors incoming
//! annotations, keeps their overlay regions matched to current layout, and
//! turns pointer positions into hover enter/leave callbacks. All page-facing
//! effects go through a [`HighlightSurface`]; all state changes surface as
//! typed [`HighlightEvent`]s so presentation code can react without reaching
//! into the manager.

mod events;
mod manager;
mod surface;

pub use events::HighlightEvent;
pub use manager::{HighlightEntry, HighlightManager};
pub use surface::{HighlightSurface, OverlaySurface, RegionId};
