//! Interactive figure editing.
//!
//! [`FigureController`] owns the figure list of the open item and turns
//! pointer and key events into edits. Every committed edit is recorded as a
//! full snapshot in a [`HistoryBuffer`], which undo and redo restore from.
//!
//! Event flow for a pointer-down while idle:
//!
//! 1. With a mask label active, start or extend a polygon; clicking near
//!    the first vertex closes and fills it.
//! 2. Otherwise, if a handle is under the cursor, start dragging it.
//! 3. Otherwise a review-marker label drops a marker immediately, and box
//!    or keypoint labels start a two-click creation gesture.

mod clipboard;
mod event;
mod mode;
mod picker;
mod selection;


pub use clipboard::Clipboard;
pub use event::{EventOutcome, InputEvent, KeyCommand};
pub use mode::{EditMode, Selection};
pub use picker::RadialPicker;
pub use selection::{by_surface_desc, pick};

use crate::codec;
use crate::constants::{DEFAULT_HISTORY_CAPACITY, gesture, hit};
use crate::geometry::{Point, Viewport, is_close};
use crate::history::HistoryBuffer;
use crate::model::{
    AnnotatedItem, BoundingBox, Figure, FigureError, FigureType, HitRadii, ItemId,
    KeypointGroup, LabelClass, LabelSet, MaskMode, ReviewMarker, SegmentationMask, Snapshot,
    default_keypoint_template, figures_from_snapshot, snapshot_of,
};
use crate::persistence::{ItemRepository, StorageError};
use crate::render::{DrawnFigure, PolygonPreview, RenderFrame, Renderer, UNKNOWN_LABEL_COLOR};

/// Tunable editor thresholds. Distances are in screen pixels.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct EditorSettings {
    pub handle_radius: f32,
    pub marker_radius: f32,
    pub lock_distance: f32,
    pub history_capacity: usize,
}

impl Default for EditorSettings {
    fn default() -> Self {
        Self {
            handle_radius: hit::HANDLE_RADIUS,
            marker_radius: hit::MARKER_RADIUS,
            lock_distance: hit::POLYGON_LOCK_DISTANCE,
            history_capacity: DEFAULT_HISTORY_CAPACITY,
        }
    }
}

/// Identity and flags of the open item. Figures live on the controller.
#[derive(Debug, Clone)]
struct OpenItem {
    id: ItemId,
    width: usize,
    height: usize,
    trash: bool,
    requires_review: bool,
}

/// Editing state machine for one item at a time.
#[derive(Debug)]
pub struct FigureController {
    labels: LabelSet,
    settings: EditorSettings,
    active_label: Option<String>,
    item: Option<OpenItem>,
    figures: Vec<Figure>,
    mode: EditMode,
    selection: Option<Selection>,
    preview: Option<Figure>,
    picker: Option<RadialPicker>,
    history: HistoryBuffer<Snapshot>,
    clipboard: Clipboard,
    viewport: Viewport,
    mask_mode: MaskMode,
    /// Last pointer position in image coordinates
    cursor: Point,
    /// Unsaved changes since the item was opened or saved
    dirty: bool,
    needs_redraw: bool,
}

impl FigureController {
    /// Create a controller with no open item. The first label is active.
    pub fn new(labels: LabelSet, settings: EditorSettings) -> Self {
        let active_label = labels.by_index(0).map(|c| c.name.clone());
        Self {
            labels,
            settings,
            active_label,
            item: None,
            figures: Vec::new(),
            mode: EditMode::Idle,
            selection: None,
            preview: None,
            picker: None,
            history: HistoryBuffer::new(settings.history_capacity),
            clipboard: Clipboard::default(),
            viewport: Viewport::default(),
            mask_mode: MaskMode::default(),
            cursor: Point::default(),
            dirty: false,
            needs_redraw: true,
        }
    }

    // ---- accessors ----

    pub fn labels(&self) -> &LabelSet {
        &self.labels
    }

    pub fn settings(&self) -> &EditorSettings {
        &self.settings
    }

    pub fn active_label(&self) -> Option<&str> {
        self.active_label.as_deref()
    }

    pub fn active_class(&self) -> Option<&LabelClass> {
        self.active_label.as_deref().and_then(|name| self.labels.get(name))
    }

    pub fn figures(&self) -> &[Figure] {
        &self.figures
    }

    pub fn mode(&self) -> &EditMode {
        &self.mode
    }

    pub fn selection(&self) -> Option<Selection> {
        self.selection
    }

    pub fn selected_figure(&self) -> Option<&Figure> {
        self.selection.and_then(|s| self.figures.get(s.figure))
    }

    pub fn preview(&self) -> Option<&Figure> {
        self.preview.as_ref()
    }

    pub fn picker(&self) -> Option<&RadialPicker> {
        self.picker.as_ref()
    }

    pub fn history(&self) -> &HistoryBuffer<Snapshot> {
        &self.history
    }

    pub fn clipboard(&self) -> &Clipboard {
        &self.clipboard
    }

    pub fn viewport(&self) -> &Viewport {
        &self.viewport
    }

    /// Mutable viewport for host-driven pan and zoom.
    pub fn viewport_mut(&mut self) -> &mut Viewport {
        self.needs_redraw = true;
        &mut self.viewport
    }

    pub fn mask_mode(&self) -> MaskMode {
        self.mask_mode
    }

    pub fn cursor(&self) -> Point {
        self.cursor
    }

    pub fn item_id(&self) -> Option<&ItemId> {
        self.item.as_ref().map(|i| &i.id)
    }

    pub fn is_trash(&self) -> bool {
        self.item.as_ref().is_some_and(|i| i.trash)
    }

    pub fn requires_review(&self) -> bool {
        self.item.as_ref().is_some_and(|i| i.requires_review)
    }

    /// Whether there are unsaved changes.
    pub fn is_dirty(&self) -> bool {
        self.dirty
    }

    /// Whether visible state changed since the last [`mark_drawn`](Self::mark_drawn).
    pub fn needs_redraw(&self) -> bool {
        self.needs_redraw
    }

    pub fn mark_drawn(&mut self) {
        self.needs_redraw = false;
    }

    fn radii(&self) -> HitRadii {
        HitRadii {
            handle: self.viewport.screen_distance(self.settings.handle_radius),
            marker: self.viewport.screen_distance(self.settings.marker_radius),
        }
    }

    fn mask_index(&self, label: &str) -> Option<usize> {
        self.figures
            .iter()
            .position(|f| f.as_mask().is_some_and(|m| m.label == label))
    }

    // ---- event dispatch ----

    /// Apply one input event.
    pub fn handle(&mut self, event: InputEvent) -> EventOutcome {
        let outcome = match event {
            InputEvent::PointerDown { x, y } => self.pointer_down(x, y),
            InputEvent::PointerMove { x, y } => self.pointer_move(x, y),
            InputEvent::PointerUp { x, y } => self.pointer_up(x, y),
            InputEvent::Zoom { x, y, steps } => {
                self.viewport.zoom_step(steps, x, y);
                EventOutcome::redraw()
            }
            InputEvent::Pan { dx, dy } => {
                self.viewport.pan_by(dx, dy);
                EventOutcome::redraw()
            }
            InputEvent::Key(command) => self.key(command),
        };
        if outcome.redraw {
            self.needs_redraw = true;
        }
        outcome
    }

    fn key(&mut self, command: KeyCommand) -> EventOutcome {
        match command {
            KeyCommand::Undo => EventOutcome::from_commit(self.undo()),
            KeyCommand::Redo => EventOutcome::from_commit(self.redo()),
            KeyCommand::Delete => EventOutcome::from_commit(self.delete_at_cursor()),
            KeyCommand::Cancel => {
                if self.cancel() {
                    EventOutcome::redraw()
                } else {
                    EventOutcome::none()
                }
            }
            KeyCommand::Commit => self.commit_gesture(),
            KeyCommand::Copy => {
                self.copy_selection();
                EventOutcome::none()
            }
            KeyCommand::Paste => match self.paste() {
                Ok(0) => EventOutcome::none(),
                Ok(_) => EventOutcome::committed(),
                Err(e) => {
                    log::error!("Paste failed: {}", e);
                    EventOutcome::none()
                }
            },
            KeyCommand::ToggleMaskMode => {
                self.toggle_mask_mode();
                EventOutcome::redraw()
            }
            KeyCommand::OpenLabelPicker => {
                if self.open_label_picker() {
                    EventOutcome::redraw()
                } else {
                    EventOutcome::none()
                }
            }
            KeyCommand::SelectLabel(index) => EventOutcome::from_commit(self.select_label_index(index)),
            KeyCommand::NextLabel => EventOutcome::from_commit(self.cycle_label(1)),
            KeyCommand::PreviousLabel => EventOutcome::from_commit(self.cycle_label(-1)),
            KeyCommand::ToggleTrash => {
                self.toggle_trash();
                EventOutcome::redraw()
            }
            KeyCommand::ToggleRequiresReview => {
                self.toggle_requires_review();
                EventOutcome::redraw()
            }
        }
    }

    // ---- pointer handling ----

    fn pointer_down(&mut self, sx: f32, sy: f32) -> EventOutcome {
        let p = self.viewport.screen_to_image(sx, sy);
        self.cursor = p;

        if let Some(picker) = self.picker.take() {
            return match picker.pick(&p).map(str::to_string) {
                Some(label) => EventOutcome::from_commit(self.set_active_label(&label)),
                None => EventOutcome::redraw(),
            };
        }

        match std::mem::take(&mut self.mode) {
            EditMode::Idle => self.begin_gesture(p),
            EditMode::Creating { start, .. } => {
                EventOutcome::from_commit(self.finish_creation(start, p))
            }
            moving @ EditMode::Moving { .. } => {
                self.mode = moving;
                self.finish_move()
            }
            EditMode::DrawingPolygon { vertices, .. } => self.polygon_click(vertices, p),
        }
    }

    fn begin_gesture(&mut self, p: Point) -> EventOutcome {
        let Some(class) = self.active_class().cloned() else {
            log::debug!("No active label, pointer-down ignored");
            return EventOutcome::none();
        };

        if class.figure_type == FigureType::Mask {
            if self.item.is_none() {
                log::warn!("Cannot draw mask '{}' without an open item", class.name);
                return EventOutcome::none();
            }
            self.selection = None;
            self.mode = EditMode::DrawingPolygon {
                vertices: vec![p],
                cursor: p,
            };
            return EventOutcome::redraw();
        }

        let hit = selection::pick(&self.figures, &p, &self.radii());
        if let Some(Selection {
            figure,
            point: Some(point),
        }) = hit
        {
            if let Some(original) = self.figures.get(figure) {
                log::debug!("Grabbed handle {} of figure {}", point, figure);
                self.mode = EditMode::Moving {
                    figure,
                    point,
                    original: Box::new(original.clone()),
                    moved: false,
                };
                self.selection = hit;
                return EventOutcome::redraw();
            }
        }
        self.selection = hit;

        if class.figure_type == FigureType::ReviewMarker {
            self.figures.push(ReviewMarker::new(&class.name, p).into());
            log::info!("Added review marker '{}' at ({:.1}, {:.1})", class.name, p.x, p.y);
            self.commit_change();
            return EventOutcome::committed();
        }

        self.mode = EditMode::Creating {
            start: p,
            current: p,
        };
        self.preview = build_figure(&class, p, p);
        EventOutcome::redraw()
    }

    fn finish_creation(&mut self, start: Point, end: Point) -> bool {
        self.preview = None;
        let Some(class) = self.active_class().cloned() else {
            return false;
        };

        let min_movement = match class.figure_type {
            FigureType::KeypointGroup => gesture::KEYPOINT_MIN_MOVEMENT,
            _ => gesture::BBOX_MIN_MOVEMENT,
        };
        let threshold = self.viewport.screen_distance(min_movement);
        let (dx, dy) = end.delta(&start);
        if dx <= threshold || dy <= threshold {
            log::debug!(
                "Discarded {} gesture: moved {:.1} x {:.1}, need more than {:.1}",
                class.figure_type.name(),
                dx,
                dy,
                threshold
            );
            return false;
        }

        let Some(figure) = build_figure(&class, start, end) else {
            return false;
        };
        log::info!("Created {} '{}'", class.figure_type.name(), class.name);
        self.figures.push(figure);
        self.commit_change();
        true
    }

    fn pointer_move(&mut self, sx: f32, sy: f32) -> EventOutcome {
        let p = self.viewport.screen_to_image(sx, sy);
        self.cursor = p;

        if let Some(picker) = self.picker.as_mut() {
            return if picker.hover(&p) {
                EventOutcome::redraw()
            } else {
                EventOutcome::none()
            };
        }

        let radii = self.radii();
        let start = match &mut self.mode {
            EditMode::Idle => {
                let hit = selection::pick(&self.figures, &p, &radii);
                if hit == self.selection {
                    return EventOutcome::none();
                }
                self.selection = hit;
                return EventOutcome::redraw();
            }
            EditMode::Creating { start, current } => {
                *current = p;
                *start
            }
            EditMode::Moving {
                figure,
                point,
                moved,
                ..
            } => {
                let next = self
                    .figures
                    .get_mut(*figure)
                    .and_then(|f| f.move_point(*point, p));
                if let Some(next) = next {
                    *point = next;
                    *moved = true;
                    self.selection = Some(Selection {
                        figure: *figure,
                        point: Some(next),
                    });
                }
                return EventOutcome::redraw();
            }
            EditMode::DrawingPolygon { cursor, .. } => {
                *cursor = p;
                return EventOutcome::redraw();
            }
        };

        self.preview = self
            .active_class()
            .and_then(|class| build_figure(class, start, p));
        EventOutcome::redraw()
    }

    fn pointer_up(&mut self, sx: f32, sy: f32) -> EventOutcome {
        self.cursor = self.viewport.screen_to_image(sx, sy);
        if matches!(self.mode, EditMode::Moving { .. }) {
            self.finish_move()
        } else {
            EventOutcome::none()
        }
    }

    fn finish_move(&mut self) -> EventOutcome {
        let EditMode::Moving { figure, moved, .. } = std::mem::take(&mut self.mode) else {
            return EventOutcome::none();
        };
        if !moved {
            return EventOutcome::redraw();
        }
        log::debug!("Committed drag of figure {}", figure);
        self.commit_change();
        EventOutcome::committed()
    }

    fn polygon_click(&mut self, mut vertices: Vec<Point>, p: Point) -> EventOutcome {
        let lock = self.viewport.screen_distance(self.settings.lock_distance);
        let closes = vertices.len() >= gesture::MIN_POLYGON_VERTICES
            && vertices.first().is_some_and(|first| is_close(first, &p, lock));
        if closes {
            return EventOutcome::from_commit(self.fill_polygon(&vertices));
        }
        vertices.push(p);
        self.mode = EditMode::DrawingPolygon {
            vertices,
            cursor: p,
        };
        EventOutcome::redraw()
    }

    /// Fill a closed polygon into the active label's mask, creating the
    /// mask on first use.
    fn fill_polygon(&mut self, vertices: &[Point]) -> bool {
        let Some(class) = self
            .active_class()
            .filter(|c| c.figure_type == FigureType::Mask)
            .cloned()
        else {
            return false;
        };
        let Some((width, height)) = self.item.as_ref().map(|i| (i.width, i.height)) else {
            log::warn!("Cannot fill mask '{}' without an open item", class.name);
            return false;
        };
        if let Err(e) = codec::cell_count(width, height) {
            log::warn!("Cannot fill mask '{}': {}", class.name, e);
            return false;
        }

        let index = match self.mask_index(&class.name) {
            Some(index) => index,
            None => {
                self.figures
                    .push(SegmentationMask::empty(&class.name, width, height).into());
                self.figures.len() - 1
            }
        };
        let Some(mask) = self.figures.get_mut(index).and_then(Figure::as_mask_mut) else {
            return false;
        };
        let written = mask.fill_polygon(vertices, self.mask_mode);
        mask.encode();
        log::info!(
            "Filled {} cells of mask '{}' ({:?}, {} vertices)",
            written,
            class.name,
            self.mask_mode,
            vertices.len()
        );
        self.commit_change();
        true
    }

    // ---- commands ----

    /// Finish the gesture in progress as if it had been completed by pointer.
    fn commit_gesture(&mut self) -> EventOutcome {
        match std::mem::take(&mut self.mode) {
            EditMode::Idle => EventOutcome::none(),
            EditMode::Creating { start, current } => {
                EventOutcome::from_commit(self.finish_creation(start, current))
            }
            moving @ EditMode::Moving { .. } => {
                self.mode = moving;
                self.finish_move()
            }
            EditMode::DrawingPolygon { vertices, cursor } => {
                if vertices.len() >= gesture::MIN_POLYGON_VERTICES {
                    EventOutcome::from_commit(self.fill_polygon(&vertices))
                } else {
                    log::debug!("Polygon needs {} vertices", gesture::MIN_POLYGON_VERTICES);
                    self.mode = EditMode::DrawingPolygon { vertices, cursor };
                    EventOutcome::none()
                }
            }
        }
    }

    /// Abort the gesture in progress or close the label picker.
    ///
    /// A cancelled drag puts the figure back where it was. Returns whether
    /// anything was cancelled.
    pub fn cancel(&mut self) -> bool {
        if self.picker.take().is_some() {
            log::debug!("Closed label picker");
            return true;
        }
        let cancelled = match std::mem::take(&mut self.mode) {
            EditMode::Idle => return false,
            EditMode::Moving {
                figure, original, ..
            } => {
                if let Some(slot) = self.figures.get_mut(figure) {
                    *slot = *original;
                }
                "Moving"
            }
            EditMode::Creating { .. } => "Creating",
            EditMode::DrawingPolygon { .. } => "DrawingPolygon",
        };
        self.preview = None;
        self.needs_redraw = true;
        log::debug!("Cancelled {} gesture", cancelled);
        true
    }

    /// Step back one snapshot. Cancels any gesture first.
    pub fn undo(&mut self) -> bool {
        self.cancel();
        match self.history.undo() {
            Some(snapshot) => self.restore(&snapshot),
            None => {
                log::debug!("Nothing to undo");
                false
            }
        }
    }

    /// Step forward one snapshot. Cancels any gesture first.
    pub fn redo(&mut self) -> bool {
        self.cancel();
        match self.history.redo() {
            Some(snapshot) => self.restore(&snapshot),
            None => {
                log::debug!("Nothing to redo");
                false
            }
        }
    }

    fn restore(&mut self, snapshot: &Snapshot) -> bool {
        match figures_from_snapshot(snapshot) {
            Ok(figures) => {
                self.figures = figures;
                self.selection = None;
                self.preview = None;
                self.mode = EditMode::Idle;
                self.dirty = true;
                self.needs_redraw = true;
                true
            }
            Err(e) => {
                log::error!("Failed to restore snapshot: {}", e);
                false
            }
        }
    }

    /// Delete the handle or figure under the last cursor position.
    ///
    /// Deleting a handle of a box or marker removes the figure, as does
    /// leaving a keypoint group with no points.
    pub fn delete_at_cursor(&mut self) -> bool {
        if self.mode.is_gesture() {
            log::debug!("Delete ignored during {} gesture", self.mode.name());
            return false;
        }
        let Some(hit) = selection::pick(&self.figures, &self.cursor, &self.radii()) else {
            return false;
        };
        let Some(figure) = self.figures.get_mut(hit.figure) else {
            return false;
        };
        if figure.delete_point(hit.point) == 0 {
            let removed = self.figures.remove(hit.figure);
            log::info!("Deleted {} '{}'", removed.figure_type().name(), removed.label());
        }
        self.selection = None;
        self.commit_change();
        true
    }

    /// Copy the selected figure, or every figure when nothing is selected.
    ///
    /// Returns the number of figures copied.
    pub fn copy_selection(&mut self) -> usize {
        let result = match self.selection.and_then(|s| self.figures.get(s.figure)) {
            Some(figure) => self.clipboard.copy(std::iter::once(figure)),
            None => self.clipboard.copy(&self.figures),
        };
        match result {
            Ok(count) => {
                log::info!("Copied {} figures", count);
                count
            }
            Err(e) => {
                log::error!("Copy failed: {}", e);
                0
            }
        }
    }

    /// Append fresh copies of the clipboard figures.
    ///
    /// A mask is skipped when its label already has a mask or its shape
    /// differs from the open item. Returns the number of figures added.
    pub fn paste(&mut self) -> Result<usize, FigureError> {
        if self.clipboard.is_empty() {
            return Ok(0);
        }
        self.cancel();

        let mut pasted = 0;
        for figure in self.clipboard.instantiate()? {
            if let Some(mask) = figure.as_mask() {
                let Some(item) = &self.item else {
                    log::warn!("Skipped pasted mask '{}': no open item", mask.label);
                    continue;
                };
                if (mask.width, mask.height) != (item.width, item.height) {
                    log::warn!(
                        "Skipped pasted mask '{}': {}x{} does not match item {}x{}",
                        mask.label,
                        mask.width,
                        mask.height,
                        item.width,
                        item.height
                    );
                    continue;
                }
                if self.mask_index(&mask.label).is_some() {
                    log::warn!("Skipped pasted mask '{}': label already has a mask", mask.label);
                    continue;
                }
            }
            self.figures.push(figure);
            pasted += 1;
        }
        if pasted > 0 {
            log::info!("Pasted {} figures", pasted);
            self.selection = None;
            self.commit_change();
        }
        Ok(pasted)
    }

    pub fn toggle_mask_mode(&mut self) -> MaskMode {
        self.mask_mode = self.mask_mode.toggled();
        log::info!("Mask mode: {:?}", self.mask_mode);
        self.mask_mode
    }

    // ---- labels ----

    /// Open the radial label picker at the cursor.
    pub fn open_label_picker(&mut self) -> bool {
        if self.labels.is_empty() {
            return false;
        }
        self.picker = Some(RadialPicker::open(self.cursor, &self.labels));
        true
    }

    /// Make `name` the active label.
    ///
    /// If an idle selection has the same figure type as the new label, it is
    /// relabelled and a snapshot is taken. Otherwise the selection and any
    /// gesture are reset. Returns whether a figure was relabelled.
    pub fn set_active_label(&mut self, name: &str) -> bool {
        let Some(class) = self.labels.get(name).cloned() else {
            log::warn!("Unknown label '{}'", name);
            return false;
        };
        self.active_label = Some(class.name.clone());
        self.needs_redraw = true;
        log::debug!("Active label: '{}' ({})", class.name, class.figure_type.name());

        let target = self
            .selection
            .filter(|_| self.mode.is_idle())
            .map(|s| s.figure)
            .filter(|&i| {
                self.figures
                    .get(i)
                    .is_some_and(|f| f.figure_type() == class.figure_type)
            });
        let Some(index) = target else {
            self.cancel();
            self.selection = None;
            return false;
        };

        let Some(figure) = self.figures.get_mut(index) else {
            return false;
        };
        if figure.label() == class.name {
            return false;
        }
        log::info!("Relabelled figure {} '{}' -> '{}'", index, figure.label(), class.name);
        figure.set_label(&class.name);
        self.commit_change();
        true
    }

    /// Activate the label at `index` in label-set order.
    pub fn select_label_index(&mut self, index: usize) -> bool {
        match self.labels.by_index(index).map(|c| c.name.clone()) {
            Some(name) => self.set_active_label(&name),
            None => {
                log::debug!("No label at index {}", index);
                false
            }
        }
    }

    /// Move the active label `step` positions through the label set, wrapping.
    pub fn cycle_label(&mut self, step: isize) -> bool {
        let count = self.labels.len();
        if count == 0 {
            return false;
        }
        let current = self
            .active_label
            .as_deref()
            .and_then(|name| self.labels.index_of(name))
            .unwrap_or(0);
        let next = (current as isize + step).rem_euclid(count as isize) as usize;
        self.select_label_index(next)
    }

    // ---- item flags ----

    /// Flip the trash flag of the open item. Returns the new value.
    pub fn toggle_trash(&mut self) -> Option<bool> {
        let item = self.item.as_mut()?;
        item.trash = !item.trash;
        log::info!("Item '{}' trash: {}", item.id, item.trash);
        self.dirty = true;
        Some(item.trash)
    }

    /// Flip the requires-review flag of the open item. Returns the new value.
    pub fn toggle_requires_review(&mut self) -> Option<bool> {
        let item = self.item.as_mut()?;
        item.requires_review = !item.requires_review;
        log::info!("Item '{}' requires review: {}", item.id, item.requires_review);
        self.dirty = true;
        Some(item.requires_review)
    }

    // ---- item lifecycle ----

    /// Make `item` the open item and reset all editing state.
    ///
    /// History is cleared and seeded with the loaded figures so the first
    /// edit can be undone.
    pub fn load(&mut self, item: AnnotatedItem) {
        self.cancel();
        self.figures = item.figures();
        self.viewport = Viewport::new(item.width as f32, item.height as f32);
        self.selection = None;
        self.preview = None;
        self.history.clear();
        self.record_snapshot();
        self.dirty = false;
        self.needs_redraw = true;
        log::info!(
            "Opened item '{}' ({}x{}, {} figures)",
            item.id,
            item.width,
            item.height,
            self.figures.len()
        );
        self.item = Some(OpenItem {
            id: item.id,
            width: item.width,
            height: item.height,
            trash: item.trash,
            requires_review: item.requires_review,
        });
    }

    /// Switch to another item, saving the current one first if it changed.
    pub fn open_item<R: ItemRepository + ?Sized>(
        &mut self,
        repo: &mut R,
        id: &ItemId,
    ) -> Result<(), StorageError> {
        self.save_if_dirty(repo)?;
        let item = repo.load_item(id)?;
        self.load(item);
        Ok(())
    }

    /// Save only when there are unsaved changes. Returns whether it saved.
    pub fn save_if_dirty<R: ItemRepository + ?Sized>(
        &mut self,
        repo: &mut R,
    ) -> Result<bool, StorageError> {
        if !self.dirty {
            return Ok(false);
        }
        self.save(repo)?;
        Ok(true)
    }

    /// Save the open item. A gesture in progress is cancelled first.
    pub fn save<R: ItemRepository + ?Sized>(&mut self, repo: &mut R) -> Result<(), StorageError> {
        if self.mode.is_gesture() {
            log::debug!("Cancelling {} gesture before save", self.mode.name());
            self.cancel();
        }
        let Some(item) = self.to_item().map_err(|source| StorageError::Figure {
            id: self.item_id().cloned().unwrap_or_default(),
            source,
        })?
        else {
            log::debug!("No open item to save");
            return Ok(());
        };
        repo.save_item(&item)?;
        self.dirty = false;
        Ok(())
    }

    /// Build the open item from the current figures and flags.
    pub fn to_item(&self) -> Result<Option<AnnotatedItem>, FigureError> {
        let Some(open) = &self.item else {
            return Ok(None);
        };
        let mut item = AnnotatedItem::new(open.id.clone(), open.width, open.height);
        item.trash = open.trash;
        item.requires_review = open.requires_review;
        item.set_figures(self.figures.clone())?;
        Ok(Some(item))
    }

    fn commit_change(&mut self) {
        self.dirty = true;
        self.needs_redraw = true;
        self.record_snapshot();
    }

    fn record_snapshot(&mut self) {
        match snapshot_of(&self.figures) {
            Ok(snapshot) => {
                self.history.add(snapshot);
            }
            Err(e) => log::error!("Failed to snapshot figures: {}", e),
        }
    }

    // ---- rendering ----

    /// Describe the visible state for a renderer.
    pub fn frame(&self) -> RenderFrame<'_> {
        let figures = by_surface_desc(&self.figures)
            .into_iter()
            .filter_map(|index| {
                let figure = self.figures.get(index)?;
                let selection = self.selection.filter(|s| s.figure == index);
                Some(DrawnFigure {
                    figure,
                    color: self
                        .labels
                        .get(figure.label())
                        .map_or(UNKNOWN_LABEL_COLOR, |c| c.color),
                    selected: selection.is_some(),
                    active_point: selection.and_then(|s| s.point),
                })
            })
            .collect();
        let polygon = match &self.mode {
            EditMode::DrawingPolygon { vertices, cursor } => Some(PolygonPreview {
                vertices,
                cursor: *cursor,
            }),
            _ => None,
        };
        RenderFrame {
            figures,
            preview: self.preview.as_ref(),
            polygon,
            picker: self.picker.as_ref(),
            viewport: self.viewport,
            mask_mode: self.mask_mode,
        }
    }

    /// Draw the current frame with a host renderer.
    pub fn render_with<R: Renderer>(&self, renderer: &mut R, canvas: R::Canvas) -> R::Canvas {
        renderer.render(canvas, &self.frame())
    }
}

/// Build the figure a creation gesture from `a` to `b` produces.
///
/// Only box and keypoint labels are created by gesture.
fn build_figure(class: &LabelClass, a: Point, b: Point) -> Option<Figure> {
    match class.figure_type {
        FigureType::BoundingBox => Some(BoundingBox::new(&class.name, a, b).into()),
        FigureType::KeypointGroup => {
            let figure = if class.keypoints.is_empty() {
                KeypointGroup::from_template(&class.name, &default_keypoint_template(), a, b)
            } else {
                KeypointGroup::from_template(&class.name, &class.keypoints, a, b)
            };
            Some(figure.into())
        }
        FigureType::Mask | FigureType::ReviewMarker => None,
    }
}
