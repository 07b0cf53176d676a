//! Highlight entry lifecycle and reconciliation

use crate::anchor::{resolve, ResolvedRange};
use crate::annotations::Annotation;
use crate::dom::Document;
use crate::geometry::{Point, Rect};
use crate::layout::LayoutEngine;

use super::events::HighlightEvent;
use super::surface::{HighlightSurface, RegionId};

/// One anchored annotation and its live overlay regions
#[derive(Debug, Clone)]
pub struct HighlightEntry {
    pub annotation: Annotation,
    pub range: ResolvedRange,
    /// Current overlay fragments. Length always mirrors the live rectangle
    /// decomposition; empty while the highlight has no visible geometry.
    pub regions: Vec<(RegionId, Rect)>,
}

/// Owner of every highlight on one page.
///
/// Single-threaded and event-driven: the host feeds it annotations, frames,
/// and pointer positions; it feeds the surface regions and the host typed
/// events plus hover callbacks. One instance per page session; dropping it
/// drops all highlight state with it.
pub struct HighlightManager<S: HighlightSurface> {
    surface: S,
    entries: Vec<HighlightEntry>,
    visible: bool,
    reposition_pending: bool,
    hovered: Option<String>,
    on_hover: Option<Box<dyn FnMut(&Annotation, Rect)>>,
    on_leave: Option<Box<dyn FnMut()>>,
    subscribers: Vec<Box<dyn FnMut(&HighlightEvent)>>,
}

impl<S: HighlightSurface> HighlightManager<S> {
    pub fn new(surface: S) -> Self {
        Self {
            surface,
            entries: Vec::new(),
            visible: true,
            reposition_pending: false,
            hovered: None,
            on_hover: None,
            on_leave: None,
            subscribers: Vec::new(),
        }
    }

    /// Install hover callbacks. `on_hover` receives the annotation and the
    /// rectangle of the fragment under the pointer.
    pub fn set_hover_callbacks(
        &mut self,
        on_hover: impl FnMut(&Annotation, Rect) + 'static,
        on_leave: impl FnMut() + 'static,
    ) {
        self.on_hover = Some(Box::new(on_hover));
        self.on_leave = Some(Box::new(on_leave));
    }

    /// Observe manager state changes.
    pub fn subscribe(&mut self, subscriber: impl FnMut(&HighlightEvent) + 'static) {
        self.subscribers.push(Box::new(subscriber));
    }

    /// Anchor an annotation and put its highlight on the page.
    ///
    /// Returns `false` and changes nothing when the anchor cannot be
    /// resolved or the id is already present (the first entry wins). The
    /// current tree is re-scanned on every call. A resolvable anchor with no
    /// visible geometry still registers; its overlay fills in once layout
    /// gives it rectangles.
    pub fn add_annotation(
        &mut self,
        doc: &Document,
        layout: &dyn LayoutEngine,
        annotation: Annotation,
    ) -> bool {
        if self
            .entries
            .iter()
            .any(|entry| entry.annotation.id == annotation.id)
        {
            tracing::debug!(id = %annotation.id, "duplicate annotation id, keeping the first entry");
            return false;
        }

        let range = match resolve(doc, doc.body(), &annotation.anchor) {
            Ok(range) => range,
            Err(err) => {
                tracing::debug!(id = %annotation.id, %err, "annotation dropped");
                return false;
            }
        };

        self.surface.add_range(range);
        let regions: Vec<(RegionId, Rect)> = layout
            .rects_for_range(doc, &range)
            .into_iter()
            .map(|rect| (self.surface.create_region(rect), rect))
            .collect();
        if regions.is_empty() {
            tracing::debug!(id = %annotation.id, "anchored with empty overlay");
        }

        let event = HighlightEvent::EntryAdded {
            annotation: annotation.clone(),
        };
        self.entries.push(HighlightEntry {
            annotation,
            range,
            regions,
        });
        self.emit(event);
        true
    }

    /// Show or hide all highlights. Hiding releases an active hover with a
    /// single leave callback; showing again never re-fires enter.
    pub fn set_visible(&mut self, visible: bool) {
        if self.visible == visible {
            return;
        }
        self.visible = visible;
        self.surface.set_visible(visible);
        if !visible {
            self.release_hover();
        }
        self.emit(HighlightEvent::VisibilityChanged { visible });
    }

    pub fn is_visible(&self) -> bool {
        self.visible
    }

    /// Number of anchored entries, visible or not.
    pub fn count(&self) -> usize {
        self.entries.len()
    }

    pub fn entries(&self) -> &[HighlightEntry] {
        &self.entries
    }

    pub fn surface(&self) -> &S {
        &self.surface
    }

    /// Discard every entry and every surface artifact this manager created.
    ///
    /// Pending repositions are cancelled and hover state is reset without
    /// firing callbacks, so nothing can reference a discarded entry later.
    pub fn clear(&mut self) {
        self.reposition_pending = false;
        self.hovered = None;
        for entry in &self.entries {
            for (region, _) in &entry.regions {
                self.surface.remove_region(*region);
            }
        }
        self.surface.remove_all_ranges();
        self.entries.clear();
        self.emit(HighlightEvent::Cleared);
    }

    /// Ask for one reconciliation pass on the next frame. Idempotent while
    /// a pass is already pending.
    pub fn request_reposition(&mut self) {
        self.reposition_pending = true;
    }

    pub fn is_reposition_pending(&self) -> bool {
        self.reposition_pending
    }

    /// Frame tick. Runs at most one reconciliation pass, and only when one
    /// was requested since the last tick.
    pub fn on_frame(&mut self, doc: &Document, layout: &dyn LayoutEngine) {
        if !self.reposition_pending {
            return;
        }
        self.reposition_pending = false;
        self.reconcile(doc, layout);
    }

    /// Bring every entry's overlay in line with current layout.
    ///
    /// Per entry: a stale range is re-resolved first; then the rectangle
    /// decomposition is re-measured. An unchanged fragment count moves the
    /// existing regions in place, a changed count rebuilds them. An entry
    /// whose anchor cannot currently be resolved keeps its registration and
    /// an empty overlay until the text comes back.
    fn reconcile(&mut self, doc: &Document, layout: &dyn LayoutEngine) {
        let mut ranges_changed = false;
        for entry in &mut self.entries {
            if !entry.range.is_valid(doc) {
                match resolve(doc, doc.body(), &entry.annotation.anchor) {
                    Ok(range) => {
                        tracing::debug!(id = %entry.annotation.id, "re-anchored stale range");
                        entry.range = range;
                        ranges_changed = true;
                    }
                    Err(err) => {
                        tracing::debug!(id = %entry.annotation.id, %err, "anchor lost, keeping entry without overlay");
                        ranges_changed = true;
                        for (region, _) in &entry.regions {
                            self.surface.remove_region(*region);
                        }
                        entry.regions.clear();
                        continue;
                    }
                }
            }

            let rects = layout.rects_for_range(doc, &entry.range);
            if rects.len() == entry.regions.len() {
                for ((region, stored), rect) in entry.regions.iter_mut().zip(rects) {
                    self.surface.move_region(*region, rect);
                    *stored = rect;
                }
            } else {
                for (region, _) in &entry.regions {
                    self.surface.remove_region(*region);
                }
                entry.regions = rects
                    .into_iter()
                    .map(|rect| (self.surface.create_region(rect), rect))
                    .collect();
            }
        }

        if ranges_changed {
            self.surface.remove_all_ranges();
            for entry in &self.entries {
                if entry.range.is_valid(doc) {
                    self.surface.add_range(entry.range);
                }
            }
        }
    }

    /// Hit-test a pointer position against current overlay geometry.
    ///
    /// The topmost hit is the most recently added entry whose regions
    /// contain the point. Enter and leave fire only when the hovered entry's
    /// identity changes; moving between fragments of one entry is silent,
    /// and leaving all fragments fires leave exactly once.
    pub fn pointer_moved(&mut self, point: Point) {
        if !self.visible {
            return;
        }

        let hit = self.entries.iter().rev().find(|entry| {
            entry
                .regions
                .iter()
                .any(|(_, rect)| rect.contains(point.x, point.y))
        });

        let Some(entry) = hit else {
            if self.hovered.take().is_some() {
                if let Some(on_leave) = &mut self.on_leave {
                    on_leave();
                }
            }
            return;
        };

        if self.hovered.as_deref() == Some(entry.annotation.id.as_str()) {
            return;
        }

        let rect = entry
            .regions
            .iter()
            .find(|(_, rect)| rect.contains(point.x, point.y))
            .map(|(_, rect)| *rect)
            .unwrap_or_default();

        if self.hovered.is_some() {
            if let Some(on_leave) = &mut self.on_leave {
                on_leave();
            }
        }
        self.hovered = Some(entry.annotation.id.clone());
        if let Some(on_hover) = &mut self.on_hover {
            on_hover(&entry.annotation, rect);
        }
    }

    fn release_hover(&mut self) {
        if self.hovered.take().is_some() {
            if let Some(on_leave) = &mut self.on_leave {
                on_leave();
            }
        }
    }

    fn emit(&mut self, event: HighlightEvent) {
        for subscriber in &mut self.subscribers {
            subscriber(&event);
        }
    }
}

#[cfg(test)]
mod tests {
    use std::cell::RefCell;
    use std::rc::Rc;

    use chrono::Utc;

    use super::*;
    use crate::highlight::OverlaySurface;
    use crate::layout::FlowLayout;

    fn note(id: &str, anchor: &str) -> Annotation {
        Annotation {
            id: id.to_string(),
            mode: None,
            content: format!("about {anchor}"),
            anchor: anchor.to_string(),
            timestamp: Utc::now(),
        }
    }

    fn manager() -> HighlightManager<OverlaySurface> {
        HighlightManager::new(OverlaySurface::new())
    }

    #[test]
    fn test_add_annotation_anchors_and_builds_regions() {
        let doc = Document::parse("<body><p>The quick brown fox jumps</p></body>").unwrap();
        let layout = FlowLayout::new(800.0);
        let mut mgr = manager();

        assert!(mgr.add_annotation(&doc, &layout, note("n1", "quick brown")));
        assert_eq!(mgr.count(), 1);
        assert_eq!(mgr.entries()[0].regions.len(), 1);
        assert_eq!(mgr.surface().region_count(), 1);
        assert_eq!(mgr.surface().ranges().len(), 1);
    }

    #[test]
    fn test_unresolvable_annotation_is_dropped() {
        let doc = Document::parse("<body><p>some page text</p></body>").unwrap();
        let layout = FlowLayout::new(800.0);
        let mut mgr = manager();

        assert!(!mgr.add_annotation(&doc, &layout, note("n1", "not on the page")));
        assert_eq!(mgr.count(), 0);
        assert_eq!(mgr.surface().region_count(), 0);
        assert!(mgr.surface().ranges().is_empty());
    }

    #[test]
    fn test_duplicate_id_first_entry_wins() {
        let doc = Document::parse("<body><p>alpha beta gamma</p></body>").unwrap();
        let layout = FlowLayout::new(800.0);
        let mut mgr = manager();

        assert!(mgr.add_annotation(&doc, &layout, note("n1", "alpha")));
        assert!(!mgr.add_annotation(&doc, &layout, note("n1", "gamma")));
        assert_eq!(mgr.count(), 1);
        assert_eq!(mgr.entries()[0].annotation.anchor, "alpha");
    }

    #[test]
    fn test_subscribers_see_typed_events() {
        let doc = Document::parse("<body><p>watched text</p></body>").unwrap();
        let layout = FlowLayout::new(800.0);
        let mut mgr = manager();

        let log: Rc<RefCell<Vec<String>>> = Rc::new(RefCell::new(Vec::new()));
        let sink = Rc::clone(&log);
        mgr.subscribe(move |event| {
            let label = match event {
                HighlightEvent::EntryAdded { annotation } => format!("added:{}", annotation.id),
                HighlightEvent::VisibilityChanged { visible } => format!("visible:{visible}"),
                HighlightEvent::Cleared => "cleared".to_string(),
            };
            sink.borrow_mut().push(label);
        });

        mgr.add_annotation(&doc, &layout, note("n1", "watched text"));
        mgr.set_visible(false);
        mgr.set_visible(false); // no change, no event
        mgr.clear();

        assert_eq!(
            *log.borrow(),
            vec!["added:n1", "visible:false", "cleared"]
        );
    }

    #[test]
    fn test_hover_enter_once_per_entry_identity() {
        // 10 chars per line: the anchor wraps into two fragments
        let doc = Document::parse("<body><p>aaaa bbbb cccc</p></body>").unwrap();
        let layout = FlowLayout::new(80.0);
        let mut mgr = manager();
        mgr.add_annotation(&doc, &layout, note("n1", "aaaa bbbb cccc"));
        assert_eq!(mgr.entries()[0].regions.len(), 2);

        let log: Rc<RefCell<Vec<String>>> = Rc::new(RefCell::new(Vec::new()));
        let enter_log = Rc::clone(&log);
        let leave_log = Rc::clone(&log);
        mgr.set_hover_callbacks(
            move |annotation, _rect| enter_log.borrow_mut().push(format!("enter:{}", annotation.id)),
            move || leave_log.borrow_mut().push("leave".to_string()),
        );

        mgr.pointer_moved(Point::new(5.0, 5.0)); // fragment one
        mgr.pointer_moved(Point::new(60.0, 5.0)); // still fragment one
        mgr.pointer_moved(Point::new(5.0, 20.0)); // fragment two, same entry
        mgr.pointer_moved(Point::new(500.0, 300.0)); // off the highlight
        mgr.pointer_moved(Point::new(500.0, 300.0)); // still off

        assert_eq!(*log.borrow(), vec!["enter:n1", "leave"]);
    }

    #[test]
    fn test_hover_reports_fragment_rect() {
        let doc = Document::parse("<body><p>aaaa bbbb cccc</p></body>").unwrap();
        let layout = FlowLayout::new(80.0);
        let mut mgr = manager();
        mgr.add_annotation(&doc, &layout, note("n1", "aaaa bbbb cccc"));

        let seen: Rc<RefCell<Option<Rect>>> = Rc::new(RefCell::new(None));
        let sink = Rc::clone(&seen);
        mgr.set_hover_callbacks(move |_, rect| *sink.borrow_mut() = Some(rect), || {});

        mgr.pointer_moved(Point::new(5.0, 20.0)); // second fragment
        assert_eq!(seen.borrow().unwrap(), Rect::new(0.0, 16.0, 32.0, 16.0));
    }

    #[test]
    fn test_hover_topmost_is_latest_added() {
        let doc = Document::parse("<body><p>shared words</p></body>").unwrap();
        let layout = FlowLayout::new(800.0);
        let mut mgr = manager();
        mgr.add_annotation(&doc, &layout, note("older", "shared words"));
        mgr.add_annotation(&doc, &layout, note("newer", "shared words"));

        let seen: Rc<RefCell<Vec<String>>> = Rc::new(RefCell::new(Vec::new()));
        let sink = Rc::clone(&seen);
        mgr.set_hover_callbacks(
            move |annotation, _| sink.borrow_mut().push(annotation.id.clone()),
            || {},
        );

        mgr.pointer_moved(Point::new(5.0, 5.0));
        assert_eq!(*seen.borrow(), vec!["newer"]);
    }

    #[test]
    fn test_hide_releases_hover_with_one_leave() {
        let doc = Document::parse("<body><p>hover target</p></body>").unwrap();
        let layout = FlowLayout::new(800.0);
        let mut mgr = manager();
        mgr.add_annotation(&doc, &layout, note("n1", "hover target"));

        let leaves = Rc::new(RefCell::new(0usize));
        let counter = Rc::clone(&leaves);
        mgr.set_hover_callbacks(|_, _| {}, move || *counter.borrow_mut() += 1);

        mgr.pointer_moved(Point::new(5.0, 5.0));
        mgr.set_visible(false);
        assert_eq!(*leaves.borrow(), 1);

        // hidden highlights neither hover nor leave
        mgr.pointer_moved(Point::new(5.0, 5.0));
        mgr.set_visible(true);
        assert_eq!(*leaves.borrow(), 1);
    }

    #[test]
    fn test_clear_discards_everything_silently() {
        let doc = Document::parse("<body><p>clear me</p></body>").unwrap();
        let layout = FlowLayout::new(800.0);
        let mut mgr = manager();
        mgr.add_annotation(&doc, &layout, note("n1", "clear me"));

        let leaves = Rc::new(RefCell::new(0usize));
        let counter = Rc::clone(&leaves);
        mgr.set_hover_callbacks(|_, _| {}, move || *counter.borrow_mut() += 1);
        mgr.pointer_moved(Point::new(5.0, 5.0));
        mgr.request_reposition();

        mgr.clear();
        assert_eq!(mgr.count(), 0);
        assert_eq!(mgr.surface().region_count(), 0);
        assert!(mgr.surface().ranges().is_empty());
        assert!(!mgr.is_reposition_pending());
        assert_eq!(*leaves.borrow(), 0);

        // pointer after clear references nothing
        mgr.pointer_moved(Point::new(500.0, 300.0));
        assert_eq!(*leaves.borrow(), 0);
    }

    #[test]
    fn test_on_frame_runs_only_when_requested() {
        let mut doc =
            Document::parse("<body><p>above</p><p>target text</p></body>").unwrap();
        let layout = FlowLayout::new(800.0);
        let mut mgr = manager();
        mgr.add_annotation(&doc, &layout, note("n1", "target text"));
        assert_eq!(mgr.entries()[0].regions[0].1.y, 16.0);

        let first = doc
            .descendants(doc.root())
            .find(|&id| doc.tag(id) == Some("p"))
            .unwrap();
        doc.remove(first);

        // no request: the frame tick is a no-op
        mgr.on_frame(&doc, &layout);
        assert_eq!(mgr.entries()[0].regions[0].1.y, 16.0);

        mgr.request_reposition();
        mgr.request_reposition(); // coalesced
        assert!(mgr.is_reposition_pending());
        mgr.on_frame(&doc, &layout);
        assert!(!mgr.is_reposition_pending());
        assert_eq!(mgr.entries()[0].regions[0].1.y, 0.0);
    }

    #[test]
    fn test_reposition_in_place_keeps_region_ids() {
        let mut doc =
            Document::parse("<body><p>above</p><p>steady anchor</p></body>").unwrap();
        let layout = FlowLayout::new(800.0);
        let mut mgr = manager();
        mgr.add_annotation(&doc, &layout, note("n1", "steady anchor"));
        let (region, rect) = mgr.entries()[0].regions[0];
        assert_eq!(rect.y, 16.0);

        let first = doc
            .descendants(doc.root())
            .find(|&id| doc.tag(id) == Some("p"))
            .unwrap();
        doc.remove(first);
        mgr.request_reposition();
        mgr.on_frame(&doc, &layout);

        let (region_after, rect_after) = mgr.entries()[0].regions[0];
        assert_eq!(region, region_after);
        assert_eq!(rect_after.y, 0.0);
        assert_eq!(mgr.surface().region_rect(region).unwrap().y, 0.0);
    }

    #[test]
    fn test_shape_change_regenerates_regions() {
        let doc = Document::parse("<body><p>aaaa bbbb cccc</p></body>").unwrap();
        let mut layout = FlowLayout::new(200.0);
        let mut mgr = manager();
        mgr.add_annotation(&doc, &layout, note("n1", "aaaa bbbb cccc"));
        assert_eq!(mgr.entries()[0].regions.len(), 1);
        let (old_region, _) = mgr.entries()[0].regions[0];

        // narrower viewport: one line becomes two
        layout.width = 80.0;
        mgr.request_reposition();
        mgr.on_frame(&doc, &layout);

        assert_eq!(mgr.entries()[0].regions.len(), 2);
        assert_eq!(mgr.surface().region_count(), 2);
        assert!(mgr.surface().region_rect(old_region).is_none());

        // and back again
        layout.width = 200.0;
        mgr.request_reposition();
        mgr.on_frame(&doc, &layout);
        assert_eq!(mgr.entries()[0].regions.len(), 1);
        assert_eq!(mgr.surface().region_count(), 1);
    }

    #[test]
    fn test_stale_range_is_re_resolved() {
        let mut doc = Document::parse("<body><p>movable passage</p></body>").unwrap();
        let layout = FlowLayout::new(800.0);
        let mut mgr = manager();
        mgr.add_annotation(&doc, &layout, note("n1", "movable passage"));

        let p = doc
            .descendants(doc.root())
            .find(|&id| doc.tag(id) == Some("p"))
            .unwrap();
        doc.remove(p);
        let body = doc.body();
        let fresh = doc.append_element(body, "p");
        doc.append_text(fresh, "a movable passage returns");

        mgr.request_reposition();
        mgr.on_frame(&doc, &layout);

        let entry = &mgr.entries()[0];
        assert!(entry.range.is_valid(&doc));
        assert_eq!(entry.regions.len(), 1);
        assert_eq!(mgr.surface().ranges().len(), 1);
    }

    #[test]
    fn test_lost_anchor_keeps_entry_with_empty_overlay() {
        let mut doc = Document::parse("<body><p>vanishing text</p></body>").unwrap();
        let layout = FlowLayout::new(800.0);
        let mut mgr = manager();
        mgr.add_annotation(&doc, &layout, note("n1", "vanishing text"));

        let p = doc
            .descendants(doc.root())
            .find(|&id| doc.tag(id) == Some("p"))
            .unwrap();
        doc.remove(p);
        mgr.request_reposition();
        mgr.on_frame(&doc, &layout);

        assert_eq!(mgr.count(), 1);
        assert!(mgr.entries()[0].regions.is_empty());
        assert_eq!(mgr.surface().region_count(), 0);
        assert!(mgr.surface().ranges().is_empty());

        // the text comes back, so does the overlay
        let body = doc.body();
        let fresh = doc.append_element(body, "p");
        doc.append_text(fresh, "vanishing text restored");
        mgr.request_reposition();
        mgr.on_frame(&doc, &layout);
        assert_eq!(mgr.entries()[0].regions.len(), 1);
        assert_eq!(mgr.surface().ranges().len(), 1);
    }

    #[test]
    fn test_hidden_anchor_registers_with_empty_overlay() {
        let doc = Document::parse(
            "<body><div hidden><p>tucked away</p></div><p>visible</p></body>",
        )
        .unwrap();
        let layout = FlowLayout::new(800.0);
        let mut mgr = manager();

        assert!(mgr.add_annotation(&doc, &layout, note("n1", "tucked away")));
        assert_eq!(mgr.count(), 1);
        assert!(mgr.entries()[0].regions.is_empty());
        assert_eq!(mgr.surface().region_count(), 0);
        assert_eq!(mgr.surface().ranges().len(), 1);
    }

    #[test]
    fn test_visibility_toggle_preserves_entries() {
        let doc = Document::parse("<body><p>toggled text</p></body>").unwrap();
        let layout = FlowLayout::new(800.0);
        let mut mgr = manager();
        mgr.add_annotation(&doc, &layout, note("n1", "toggled text"));

        mgr.set_visible(false);
        assert!(!mgr.is_visible());
        assert!(!mgr.surface().is_visible());
        assert_eq!(mgr.count(), 1);

        mgr.set_visible(true);
        assert!(mgr.is_visible());
        assert_eq!(mgr.count(), 1);
    }
}
