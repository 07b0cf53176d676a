//! Highlight surface boundary
//!
//! The manager never styles the page directly; it drives a
//! [`HighlightSurface`], the one object allowed to create visible artifacts.
//! A browser embedding would implement it over a native highlight registry
//! and positioned overlay elements. [`OverlaySurface`] is the in-memory
//! implementation: it records exactly what a renderer has been told, which
//! is what tests and the demo inspect.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::anchor::ResolvedRange;
use crate::geometry::Rect;

/// Opaque handle to one overlay region
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct RegionId(u64);

/// Rendering-side operations the manager is allowed to perform.
///
/// Regions are the interactive overlay fragments (one per highlight line
/// fragment); ranges feed the shared text styling. The manager only ever
/// removes regions it created.
pub trait HighlightSurface {
    /// Register a resolved range with the shared highlight styling.
    fn add_range(&mut self, range: ResolvedRange);

    /// Drop every registered range.
    fn remove_all_ranges(&mut self);

    /// Show or hide everything on the surface.
    fn set_visible(&mut self, visible: bool);

    /// Create an overlay region covering `rect`.
    fn create_region(&mut self, rect: Rect) -> RegionId;

    /// Move an existing region. Unknown ids are ignored.
    fn move_region(&mut self, id: RegionId, rect: Rect);

    /// Remove a region. Unknown ids are ignored.
    fn remove_region(&mut self, id: RegionId);
}

/// Recording [`HighlightSurface`]
#[derive(Debug, Clone)]
pub struct OverlaySurface {
    ranges: Vec<ResolvedRange>,
    regions: BTreeMap<RegionId, Rect>,
    next_region: u64,
    visible: bool,
}

impl OverlaySurface {
    pub fn new() -> Self {
        Self {
            ranges: Vec::new(),
            regions: BTreeMap::new(),
            next_region: 0,
            visible: true,
        }
    }

    pub fn ranges(&self) -> &[ResolvedRange] {
        &self.ranges
    }

    pub fn region_count(&self) -> usize {
        self.regions.len()
    }

    pub fn region_rect(&self, id: RegionId) -> Option<Rect> {
        self.regions.get(&id).copied()
    }

    /// Live regions in creation order.
    pub fn regions(&self) -> impl Iterator<Item = (RegionId, Rect)> + '_ {
        self.regions.iter().map(|(id, rect)| (*id, *rect))
    }

    pub fn is_visible(&self) -> bool {
        self.visible
    }
}

impl Default for OverlaySurface {
    fn default() -> Self {
        Self::new()
    }
}

impl HighlightSurface for OverlaySurface {
    fn add_range(&mut self, range: ResolvedRange) {
        self.ranges.push(range);
    }

    fn remove_all_ranges(&mut self) {
        self.ranges.clear();
    }

    fn set_visible(&mut self, visible: bool) {
        self.visible = visible;
    }

    fn create_region(&mut self, rect: Rect) -> RegionId {
        let id = RegionId(self.next_region);
        self.next_region += 1;
        self.regions.insert(id, rect);
        id
    }

    fn move_region(&mut self, id: RegionId, rect: Rect) {
        if let Some(existing) = self.regions.get_mut(&id) {
            *existing = rect;
        }
    }

    fn remove_region(&mut self, id: RegionId) {
        self.regions.remove(&id);
    }
}
