#![forbid(unsafe_code)]

//! The canvas engine: document + scene + interaction state.
//!
//! [`Canvas`] is generic over its storage backend and owns everything a host
//! widget needs between redraws: the node list, the positioned scene, the
//! camera, selection/hover, the active edit session, undo history, and the
//! clipboard. Hosts translate toolkit events into
//! [`PointerEvent`]/[`KeyEvent`] values and hand them to
//! [`handle_pointer`](Canvas::handle_pointer) /
//! [`handle_key`](Canvas::handle_key); every mutation goes through the
//! store, and the scene is recomputed from storage state afterwards.

use crate::clipboard::Clipboard;
use crate::edit::EditSession;
use crate::observer::CanvasObserver;
use crate::undo::{UndoAction, UndoHistory};
use mindcanvas_core::camera::{WHEEL_ZOOM_IN, WHEEL_ZOOM_OUT};
use mindcanvas_core::{
    Camera, KeyCode, KeyEvent, MinimapProjection, Point, PointerButton, PointerEvent, Rect, Size,
    Vec2,
};
use mindcanvas_layout::{
    HORIZONTAL_SPACING, OVERLAP_PADDING, Scene, TreeIndex, compute_layout, find_free_position,
};
use mindcanvas_model::{
    LayoutMode, MapId, MindMap, Node, NodeId, NodeStore, Priority, Status, StoreError,
};
use std::collections::{HashMap, HashSet};
use tracing::{debug, trace};

/// Screen-space distance a press must travel before it becomes a drag
/// instead of a click.
pub const DRAG_THRESHOLD: f64 = 5.0;

/// Default text for newly created nodes.
const NEW_TOPIC_TEXT: &str = "New Topic";

/// What the primary pointer button is currently doing.
#[derive(Debug, Clone, Copy, PartialEq)]
enum Gesture {
    Idle,
    /// Pressed on a node, threshold not yet exceeded.
    Pending {
        node: NodeId,
        press: Point,
        origin: Point,
    },
    /// Live-dragging a node.
    DragNode {
        node: NodeId,
        press: Point,
        origin: Point,
    },
    /// Panning the view.
    Pan { press: Point, pan_origin: Vec2 },
}

#[derive(Debug, Clone)]
struct NoteDraft {
    node: NodeId,
    content: String,
}

/// The mindmap canvas engine.
pub struct Canvas<S: NodeStore> {
    store: S,
    map: Option<MindMap>,
    nodes: Vec<Node>,
    scene: Scene,
    camera: Camera,
    viewport: Size,

    selected: Option<NodeId>,
    hovered: Option<NodeId>,
    edit: Option<EditSession>,
    gesture: Gesture,
    moving: Option<NodeId>,

    history: UndoHistory,
    clipboard: Option<Clipboard>,
    note_draft: Option<NoteDraft>,
    notes_with_content: HashSet<NodeId>,
    observer: Option<Box<dyn CanvasObserver>>,

    auto_layout: bool,
    layout_mode: LayoutMode,
    show_grid: bool,
    show_minimap: bool,
}

impl<S: NodeStore> Canvas<S> {
    /// Create an engine over a storage backend. No map is loaded yet.
    pub fn new(store: S) -> Self {
        Self {
            store,
            map: None,
            nodes: Vec::new(),
            scene: Scene::default(),
            camera: Camera::default(),
            viewport: Size::default(),
            selected: None,
            hovered: None,
            edit: None,
            gesture: Gesture::Idle,
            moving: None,
            history: UndoHistory::new(),
            clipboard: None,
            note_draft: None,
            notes_with_content: HashSet::new(),
            observer: None,
            auto_layout: true,
            layout_mode: LayoutMode::Horizontal,
            show_grid: true,
            show_minimap: true,
        }
    }

    /// Install the host-side listener.
    pub fn set_observer(&mut self, observer: Box<dyn CanvasObserver>) {
        self.observer = Some(observer);
    }

    /// Tell the engine the widget size, used by centering and fit-zoom.
    pub fn set_viewport(&mut self, viewport: Size) {
        self.viewport = viewport;
    }

    // ==================== Loading ====================

    /// Load a map: apply its saved view settings, lay it out, and center
    /// the view if there is no usable saved pan.
    pub fn load_map(&mut self, map_id: MapId) -> Result<(), StoreError> {
        self.flush_note_draft()?;

        let map = self
            .store
            .map(map_id)?
            .ok_or(StoreError::MapNotFound(map_id))?;
        debug!(map = %map_id, name = %map.name, "loading map");

        self.camera = Camera::new(
            map.settings.zoom_level,
            map.settings.pan_x,
            map.settings.pan_y,
        );
        self.auto_layout = map.settings.auto_layout;
        self.layout_mode = map.settings.layout_mode;
        self.show_grid = map.settings.show_grid;
        self.show_minimap = map.settings.show_minimap;

        self.selected = None;
        self.hovered = None;
        self.edit = None;
        self.gesture = Gesture::Idle;
        self.moving = None;
        self.history.clear();

        self.nodes = self.store.nodes_for_map(map_id)?;
        self.notes_with_content = self.store.node_ids_with_notes(map_id)?;

        let no_saved_pan = map.settings.pan_x == 0.0 && map.settings.pan_y == 0.0;
        let root_had_position = self
            .nodes
            .iter()
            .find(|n| n.is_root())
            .is_some_and(|n| n.position.is_some());

        self.map = Some(map);
        self.relayout()?;

        if no_saved_pan || !root_had_position {
            self.center_view()?;
        }
        Ok(())
    }

    /// Drop the loaded map and all per-map state. Clipboard survives so a
    /// subtree can be pasted into another map.
    pub fn clear(&mut self) {
        self.map = None;
        self.nodes.clear();
        self.scene = Scene::default();
        self.selected = None;
        self.hovered = None;
        self.edit = None;
        self.gesture = Gesture::Idle;
        self.moving = None;
        self.note_draft = None;
        self.notes_with_content.clear();
        self.history.clear();
    }

    // ==================== Accessors ====================

    /// The loaded map, if any.
    #[must_use]
    pub fn map(&self) -> Option<&MindMap> {
        self.map.as_ref()
    }

    /// The current positioned scene.
    #[must_use]
    pub fn scene(&self) -> &Scene {
        &self.scene
    }

    /// The view transform.
    #[must_use]
    pub fn camera(&self) -> &Camera {
        &self.camera
    }

    /// Id of the selected node.
    #[must_use]
    pub fn selected_id(&self) -> Option<NodeId> {
        self.selected
    }

    /// The selected node's record.
    #[must_use]
    pub fn selected_node(&self) -> Option<&Node> {
        self.selected.and_then(|id| self.node(id))
    }

    /// Id of the hovered node.
    #[must_use]
    pub fn hovered_id(&self) -> Option<NodeId> {
        self.hovered
    }

    /// The active edit session, if a node is being edited.
    #[must_use]
    pub fn edit_session(&self) -> Option<&EditSession> {
        self.edit.as_ref()
    }

    /// Node currently in explicit move mode.
    #[must_use]
    pub fn moving_id(&self) -> Option<NodeId> {
        self.moving
    }

    /// Whether an undo is available.
    #[must_use]
    pub fn can_undo(&self) -> bool {
        self.history.can_undo()
    }

    /// Whether a redo is available.
    #[must_use]
    pub fn can_redo(&self) -> bool {
        self.history.can_redo()
    }

    /// Label of the next undo, or `""`.
    #[must_use]
    pub fn undo_description(&self) -> &'static str {
        self.history.undo_description()
    }

    /// Label of the next redo, or `""`.
    #[must_use]
    pub fn redo_description(&self) -> &'static str {
        self.history.redo_description()
    }

    /// Whether automatic layout is active for the loaded map.
    #[must_use]
    pub fn auto_layout(&self) -> bool {
        self.auto_layout
    }

    /// The active layout algorithm.
    #[must_use]
    pub fn layout_mode(&self) -> LayoutMode {
        self.layout_mode
    }

    /// Whether the background grid is shown.
    #[must_use]
    pub fn show_grid(&self) -> bool {
        self.show_grid
    }

    /// Whether the minimap panel is shown.
    #[must_use]
    pub fn show_minimap(&self) -> bool {
        self.show_minimap
    }

    /// Ids of nodes carrying a non-empty note (for indicators).
    #[must_use]
    pub fn nodes_with_notes(&self) -> &HashSet<NodeId> {
        &self.notes_with_content
    }

    /// Current layout boxes by node id (WYSIWYG export hook).
    #[must_use]
    pub fn node_positions(&self) -> HashMap<NodeId, Rect> {
        self.scene.iter().map(|p| (p.node.id, p.rect)).collect()
    }

    /// Projection of the scene into a minimap panel, or `None` while empty.
    #[must_use]
    pub fn minimap(&self, panel: Rect) -> Option<MinimapProjection> {
        self.scene
            .content_bounds()
            .map(|content| MinimapProjection::new(content, panel))
    }

    /// The storage backend.
    pub fn store(&self) -> &S {
        &self.store
    }

    /// Mutable access to the storage backend.
    pub fn store_mut(&mut self) -> &mut S {
        &mut self.store
    }

    /// The topmost node under a screen point.
    #[must_use]
    pub fn hit_test(&self, screen: Point) -> Option<NodeId> {
        self.scene.hit_test(self.camera.to_canvas(screen))
    }

    // ==================== Pointer input ====================

    /// Feed one pointer event through the interaction machine.
    pub fn handle_pointer(&mut self, event: PointerEvent) -> Result<(), StoreError> {
        match event {
            PointerEvent::Pressed {
                pos,
                button: PointerButton::Primary,
                clicks,
            } => self.on_primary_press(pos, clicks),
            PointerEvent::Pressed { .. } => Ok(()),
            PointerEvent::Moved { pos } => self.on_pointer_move(pos),
            PointerEvent::Released {
                pos,
                button: PointerButton::Primary,
            } => self.on_primary_release(pos),
            PointerEvent::Released { .. } => Ok(()),
            PointerEvent::Wheel {
                pos,
                delta_y,
                modifiers,
            } => {
                if modifiers.contains(mindcanvas_core::Modifiers::CTRL) {
                    let factor = if delta_y < 0.0 {
                        WHEEL_ZOOM_IN
                    } else {
                        WHEEL_ZOOM_OUT
                    };
                    self.camera.zoom_at(pos, factor);
                }
                Ok(())
            }
            PointerEvent::Left => {
                self.hovered = None;
                Ok(())
            }
        }
    }

    fn on_primary_press(&mut self, pos: Point, clicks: u8) -> Result<(), StoreError> {
        let hit = self.hit_test(pos);

        if clicks >= 2 {
            if let Some(id) = hit {
                self.begin_edit_select_all(id);
            }
            return Ok(());
        }

        if let Some(session) = &self.edit
            && hit != Some(session.node_id())
        {
            self.commit_edit()?;
        }

        self.set_selected(hit);

        // A press on a node arms a potential drag; while editing (or on
        // empty space) it arms a pan instead.
        self.gesture = match hit {
            Some(id) if self.edit.is_none() => {
                let origin = self
                    .scene
                    .rect_of(id)
                    .map_or(Point::default(), |r| r.origin());
                Gesture::Pending {
                    node: id,
                    press: pos,
                    origin,
                }
            }
            _ => Gesture::Pan {
                press: pos,
                pan_origin: self.camera.pan,
            },
        };
        Ok(())
    }

    fn on_pointer_move(&mut self, pos: Point) -> Result<(), StoreError> {
        self.hovered = self.hit_test(pos);

        if let Gesture::Pending {
            node,
            press,
            origin,
        } = self.gesture
            && press.distance(pos) >= DRAG_THRESHOLD
        {
            self.gesture = Gesture::DragNode {
                node,
                press,
                origin,
            };
        }

        match self.gesture {
            Gesture::DragNode {
                node,
                press,
                origin,
            } => {
                let delta = self.camera.delta_to_canvas(pos - press);
                let target = origin.offset(delta);
                if let Some(current) = self.scene.rect_of(node) {
                    self.scene
                        .apply_drag_delta(node, target - current.origin());
                }
            }
            Gesture::Pan { press, pan_origin } => {
                let delta = pos - press;
                self.camera.pan = Vec2::new(pan_origin.dx + delta.dx, pan_origin.dy + delta.dy);
            }
            _ => {}
        }
        Ok(())
    }

    fn on_primary_release(&mut self, _pos: Point) -> Result<(), StoreError> {
        let gesture = std::mem::replace(&mut self.gesture, Gesture::Idle);
        match gesture {
            // Below threshold: it was a click, selection already applied.
            Gesture::Pending { .. } | Gesture::Idle => Ok(()),
            Gesture::DragNode { node, .. } => {
                self.finish_node_drag(node)?;
                self.save_view_state()
            }
            Gesture::Pan { .. } => self.save_view_state(),
        }
    }

    /// Resolve a finished node drag: reparent when dropped on another node,
    /// otherwise pin the node where it landed (switching to manual layout).
    fn finish_node_drag(&mut self, node_id: NodeId) -> Result<(), StoreError> {
        let Some(dragged_rect) = self.scene.rect_of(node_id) else {
            return Ok(());
        };
        let Some(node) = self.node(node_id).cloned() else {
            return Ok(());
        };

        let drop_center = dragged_rect.center();
        let target = self
            .scene
            .iter()
            .find(|p| p.node.id != node_id && p.rect.contains(drop_center))
            .map(|p| (p.node.id, p.rect));

        if let Some((target_id, target_rect)) = target
            && node.parent_id.is_some()
        {
            let tree = TreeIndex::new(&self.nodes);
            if tree.is_ancestor(node_id, target_id) {
                // Dropping onto a descendant would cut the subtree loose;
                // snap everything back instead.
                trace!(node = %node_id, target = %target_id, "reparent refused: target is a descendant");
                return self.relayout();
            }
            self.reparent_dropped(node, target_id, target_rect, dragged_rect)
        } else {
            self.pin_dropped(node, dragged_rect)
        }
    }

    fn reparent_dropped(
        &mut self,
        mut node: Node,
        target_id: NodeId,
        target_rect: Rect,
        dragged_rect: Rect,
    ) -> Result<(), StoreError> {
        let old_parent = node.parent_id;
        let old_sort_order = node.sort_order;
        let new_sort_order = self.next_sort_order(Some(target_id), node.id);

        node.parent_id = Some(target_id);
        node.sort_order = new_sort_order;
        if self.auto_layout {
            node.position = None;
        } else {
            // Manual mode: park the subtree near its new parent.
            let desired = Point::new(target_rect.right() + HORIZONTAL_SPACING, target_rect.y);
            let free = find_free_position(
                &self.scene,
                desired,
                dragged_rect.size(),
                Some(node.id),
                OVERLAP_PADDING,
            );
            node.position = Some(free);
        }
        self.store.update_node(&node)?;
        debug!(node = %node.id, parent = %target_id, "reparented by drop");

        self.history.push(UndoAction::Move {
            node_id: node.id,
            old_parent,
            new_parent: Some(target_id),
            old_sort_order,
            new_sort_order,
        });

        self.reload()?;
        self.notify_structure_changed();
        Ok(())
    }

    fn pin_dropped(&mut self, mut node: Node, dragged_rect: Rect) -> Result<(), StoreError> {
        let free = find_free_position(
            &self.scene,
            dragged_rect.origin(),
            dragged_rect.size(),
            Some(node.id),
            OVERLAP_PADDING,
        );
        node.position = Some(free);
        self.store.update_node(&node)?;

        // Manual placement takes the map out of automatic layout.
        if self.auto_layout {
            self.auto_layout = false;
            if let Some(map) = &mut self.map {
                map.settings.auto_layout = false;
                self.store.set_map_settings(map.id, &map.settings)?;
            }
            debug!(node = %node.id, "manual placement disabled auto layout");
        }

        self.reload()
    }

    // ==================== Keyboard input ====================

    /// Feed one key event. Returns whether the engine consumed it.
    pub fn handle_key(&mut self, key: KeyEvent) -> Result<bool, StoreError> {
        if self.edit.is_some() {
            return self.handle_edit_key(key);
        }
        let ctrl = key.ctrl();
        let shift = key.shift();

        match key.code {
            KeyCode::Tab => {
                if self.selected.is_some() {
                    self.create_child()?;
                }
                Ok(true)
            }
            KeyCode::Enter if !ctrl => {
                if self.selected.is_some() {
                    self.create_sibling()?;
                }
                Ok(true)
            }
            KeyCode::Delete | KeyCode::Backspace => {
                if self.selected_node().is_some_and(|n| !n.is_root()) {
                    self.delete_selected()?;
                }
                Ok(true)
            }
            KeyCode::F2 => {
                if let Some(id) = self.selected {
                    self.begin_edit(id);
                }
                Ok(true)
            }
            KeyCode::Char(' ') if ctrl => {
                if self.selected.is_some() {
                    self.toggle_collapse()?;
                }
                Ok(true)
            }
            KeyCode::Up => {
                self.navigate_up();
                Ok(true)
            }
            KeyCode::Down => {
                self.navigate_down();
                Ok(true)
            }
            KeyCode::Left => {
                self.navigate_left();
                Ok(true)
            }
            KeyCode::Right => {
                self.navigate_right();
                Ok(true)
            }
            KeyCode::Char('z') if ctrl && !shift => {
                self.undo()?;
                Ok(true)
            }
            KeyCode::Char('z') if ctrl && shift => {
                self.redo()?;
                Ok(true)
            }
            KeyCode::Char('y') | KeyCode::Char('r') if ctrl => {
                self.redo()?;
                Ok(true)
            }
            KeyCode::Char('c') if ctrl => {
                self.copy_selected();
                Ok(true)
            }
            KeyCode::Char('v') if ctrl => {
                self.paste()?;
                Ok(true)
            }
            KeyCode::Char('+') | KeyCode::Char('=') => {
                if ctrl {
                    self.zoom_in()?;
                    return Ok(true);
                }
                Ok(false)
            }
            KeyCode::Char('-') => {
                if ctrl {
                    self.zoom_out()?;
                    return Ok(true);
                }
                Ok(false)
            }
            KeyCode::Char('0') => {
                if ctrl {
                    self.zoom_to_fit()?;
                    return Ok(true);
                }
                Ok(false)
            }
            KeyCode::Char('1') => {
                if ctrl {
                    self.zoom_to_100()?;
                    return Ok(true);
                }
                Ok(false)
            }
            KeyCode::Char(c) if !ctrl && !c.is_control() => {
                // Type-to-edit: replace the selection's text with the
                // typed character.
                if let Some(id) = self.selected {
                    self.edit = Some(EditSession::seeded(id, c));
                    return Ok(true);
                }
                Ok(false)
            }
            _ => Ok(false),
        }
    }

    fn handle_edit_key(&mut self, key: KeyEvent) -> Result<bool, StoreError> {
        let ctrl = key.ctrl();
        match key.code {
            KeyCode::Enter => {
                self.commit_edit()?;
                return Ok(true);
            }
            KeyCode::Escape => {
                self.cancel_edit();
                return Ok(true);
            }
            _ => {}
        }

        let Some(session) = self.edit.as_mut() else {
            return Ok(false);
        };
        match key.code {
            KeyCode::Backspace => session.backspace(),
            KeyCode::Delete => session.delete_forward(),
            KeyCode::Left => session.move_left(),
            KeyCode::Right => session.move_right(),
            KeyCode::Home => session.move_home(),
            KeyCode::End => session.move_end(),
            KeyCode::Char('a') if ctrl => session.select_all(),
            KeyCode::Char(c) if !ctrl && !c.is_control() => session.insert_char(c),
            _ => return Ok(false),
        }
        Ok(true)
    }

    // ==================== Selection & navigation ====================

    /// Select a node (or clear with `None`). Observers are notified on
    /// every call, matching click behavior.
    pub fn select(&mut self, id: Option<NodeId>) {
        self.set_selected(id);
    }

    fn set_selected(&mut self, id: Option<NodeId>) {
        self.selected = id;
        if let Some(mut obs) = self.observer.take() {
            let node = id.and_then(|i| self.node(i)).cloned();
            obs.node_selected(node.as_ref());
            self.observer = Some(obs);
        }
    }

    /// Select the previous sibling. With no selection, selects the root.
    pub fn navigate_up(&mut self) {
        match self.selected_sibling_offset(-1) {
            NavResult::Target(id) => self.set_selected(Some(id)),
            NavResult::SelectRoot => self.select_root(),
            NavResult::None => {}
        }
    }

    /// Select the next sibling; from the root, enters the first child.
    /// With no selection, selects the root.
    pub fn navigate_down(&mut self) {
        let Some(node) = self.selected_node() else {
            self.select_root();
            return;
        };
        if node.is_root() {
            if let Some(child) = self.first_visible_child(node.id) {
                self.set_selected(Some(child));
            }
            return;
        }
        if let NavResult::Target(id) = self.selected_sibling_offset(1) {
            self.set_selected(Some(id));
        }
    }

    /// Select the parent of the selection.
    pub fn navigate_left(&mut self) {
        if let Some(parent) = self.selected_node().and_then(|n| n.parent_id)
            && self.scene.get(parent).is_some()
        {
            self.set_selected(Some(parent));
        }
    }

    /// Select the first child of the selection.
    pub fn navigate_right(&mut self) {
        if let Some(node) = self.selected_node()
            && let Some(child) = self.first_visible_child(node.id)
        {
            self.set_selected(Some(child));
        }
    }

    fn select_root(&mut self) {
        if let Some(root) = self.scene.root() {
            let id = root.node.id;
            self.set_selected(Some(id));
        }
    }

    fn first_visible_child(&self, parent: NodeId) -> Option<NodeId> {
        let mut kids: Vec<&Node> = self
            .scene
            .iter()
            .map(|p| &p.node)
            .filter(|n| n.parent_id == Some(parent))
            .collect();
        kids.sort_by_key(|n| (n.sort_order, n.id));
        kids.first().map(|n| n.id)
    }

    fn selected_sibling_offset(&self, offset: i64) -> NavResult {
        let Some(node) = self.selected_node() else {
            return NavResult::SelectRoot;
        };
        let Some(parent) = node.parent_id else {
            return NavResult::None;
        };
        let mut siblings: Vec<&Node> = self
            .scene
            .iter()
            .map(|p| &p.node)
            .filter(|n| n.parent_id == Some(parent))
            .collect();
        siblings.sort_by_key(|n| (n.sort_order, n.id));
        let idx = siblings.iter().position(|n| n.id == node.id);
        match idx {
            Some(i) => {
                let j = i as i64 + offset;
                if j >= 0 && (j as usize) < siblings.len() {
                    NavResult::Target(siblings[j as usize].id)
                } else {
                    NavResult::None
                }
            }
            None => NavResult::None,
        }
    }

    // ==================== Editing ====================

    /// Start editing a node with the cursor at the end.
    pub fn begin_edit(&mut self, id: NodeId) {
        if let Some(node) = self.node(id) {
            self.edit = Some(EditSession::new(id, &node.text));
        }
    }

    /// Start editing a node with all text selected (double-click entry).
    pub fn begin_edit_select_all(&mut self, id: NodeId) {
        if let Some(node) = self.node(id) {
            self.edit = Some(EditSession::with_select_all(id, &node.text));
        }
    }

    fn begin_edit_placeholder(&mut self, id: NodeId) {
        if let Some(node) = self.node(id) {
            self.edit = Some(EditSession::placeholder(id, &node.text));
        }
    }

    /// Commit the active edit. Whitespace is trimmed; an empty result or an
    /// unchanged text ends the session without touching the document.
    pub fn commit_edit(&mut self) -> Result<(), StoreError> {
        if let Some(session) = self.edit.take() {
            let trimmed = session.text().trim().to_string();
            if !trimmed.is_empty()
                && let Some(node) = self.node(session.node_id()).cloned()
                && trimmed != node.text
            {
                let mut updated = node.clone();
                updated.text = trimmed.clone();
                self.store.update_node(&updated)?;
                self.replace_local(updated.clone());

                self.history.push(UndoAction::EditText {
                    node_id: node.id,
                    old_text: node.text,
                    new_text: trimmed,
                });
                if let Some(mut obs) = self.observer.take() {
                    obs.node_edited(&updated);
                    self.observer = Some(obs);
                }
            }
        }
        // Text size feeds layout, so recompute either way.
        self.relayout()
    }

    /// Abandon the active edit without saving.
    pub fn cancel_edit(&mut self) {
        self.edit = None;
    }

    /// Advance the cursor blink phase. Returns whether an edit is active
    /// (i.e. whether the host should keep its blink timer running).
    pub fn blink_tick(&mut self) -> bool {
        match self.edit.as_mut() {
            Some(session) => {
                session.toggle_blink();
                true
            }
            None => false,
        }
    }

    // ==================== Structure ====================

    /// Create a child of the selection, opened in placeholder edit.
    pub fn create_child(&mut self) -> Result<Option<NodeId>, StoreError> {
        let (Some(map_id), Some(parent)) = (self.map_id(), self.selected) else {
            return Ok(None);
        };
        self.create_and_open(map_id, Some(parent), None, None)
    }

    /// Create a sibling after the selection. Roots have no siblings.
    pub fn create_sibling(&mut self) -> Result<Option<NodeId>, StoreError> {
        let Some(map_id) = self.map_id() else {
            return Ok(None);
        };
        let Some(selected) = self.selected_node().cloned() else {
            return Ok(None);
        };
        let Some(parent) = selected.parent_id else {
            return Ok(None);
        };
        self.create_and_open(map_id, Some(parent), Some(selected.id), None)
    }

    /// Create a new topic under the root (context-menu "add topic" on empty
    /// canvas), opened in placeholder edit. In manual mode the topic is
    /// pinned near `at` (canvas coordinates); auto layout places it itself.
    pub fn create_topic_at(&mut self, at: Point) -> Result<Option<NodeId>, StoreError> {
        let Some(map_id) = self.map_id() else {
            return Ok(None);
        };
        let Some(root) = self.scene.root().map(|p| p.node.id) else {
            return Ok(None);
        };
        self.create_and_open(map_id, Some(root), None, Some(at))
    }

    fn create_and_open(
        &mut self,
        map_id: MapId,
        parent: Option<NodeId>,
        after: Option<NodeId>,
        desired: Option<Point>,
    ) -> Result<Option<NodeId>, StoreError> {
        let created = self
            .store
            .create_node(map_id, parent, NEW_TOPIC_TEXT, after)?;
        let id = created.id;
        debug!(node = %id, ?parent, "created node");

        self.history.push(UndoAction::Create {
            nodes: vec![created],
        });

        self.reload()?;
        self.set_selected(Some(id));

        // In manual mode the fresh node gets a pinned, collision-free spot
        // right away so it does not sit on top of a neighbor.
        if !self.auto_layout
            && let Some(rect) = self.scene.rect_of(id)
        {
            let free = find_free_position(
                &self.scene,
                desired.unwrap_or_else(|| rect.origin()),
                rect.size(),
                Some(id),
                OVERLAP_PADDING,
            );
            if let Some(mut node) = self.node(id).cloned() {
                node.position = Some(free);
                self.store.update_node(&node)?;
                self.replace_local(node);
                self.relayout()?;
            }
        }

        self.begin_edit_placeholder(id);
        self.notify_structure_changed();
        Ok(Some(id))
    }

    /// Delete the selected subtree. The root cannot be deleted.
    pub fn delete_selected(&mut self) -> Result<(), StoreError> {
        let Some(node) = self.selected_node().cloned() else {
            return Ok(());
        };
        if node.is_root() {
            return Ok(());
        }
        let parent = node.parent_id;

        // Snapshot the whole subtree, parents before children, so undo can
        // restore it under the original ids.
        let tree = TreeIndex::new(&self.nodes);
        let snapshot: Vec<Node> = tree
            .subtree_ids(node.id)
            .iter()
            .filter_map(|id| tree.node(*id).cloned())
            .collect();
        for n in &snapshot {
            self.notes_with_content.remove(&n.id);
        }

        self.history.push(UndoAction::Delete { nodes: snapshot });
        self.store.delete_node(node.id)?;
        debug!(node = %node.id, "deleted subtree");

        self.reload()?;
        let next = parent.filter(|p| self.scene.get(*p).is_some());
        self.set_selected(next);
        self.notify_structure_changed();
        Ok(())
    }

    /// Toggle the selection's collapsed flag.
    pub fn toggle_collapse(&mut self) -> Result<(), StoreError> {
        let Some(mut node) = self.selected_node().cloned() else {
            return Ok(());
        };
        node.is_collapsed = !node.is_collapsed;
        self.store.update_node(&node)?;
        self.replace_local(node);
        self.relayout()
    }

    // ==================== Move mode ====================

    /// Enter explicit move mode for the selection (non-root only).
    pub fn begin_move(&mut self) {
        if self.selected_node().is_some_and(|n| !n.is_root()) {
            self.moving = self.selected;
        }
    }

    /// Reparent the moving node under `target`. Refused (and move mode
    /// cancelled) when the target is the node itself or one of its
    /// descendants. Returns whether the move happened.
    pub fn complete_move(&mut self, target: NodeId) -> Result<bool, StoreError> {
        let Some(moving_id) = self.moving.take() else {
            return Ok(false);
        };
        if target == moving_id {
            return Ok(false);
        }
        let tree = TreeIndex::new(&self.nodes);
        if tree.is_ancestor(moving_id, target) {
            return Ok(false);
        }
        let Some(mut node) = self.node(moving_id).cloned() else {
            return Ok(false);
        };

        let old_parent = node.parent_id;
        let old_sort_order = node.sort_order;
        let new_sort_order = self.next_sort_order(Some(target), moving_id);
        node.parent_id = Some(target);
        node.sort_order = new_sort_order;
        self.store.update_node(&node)?;

        self.history.push(UndoAction::Move {
            node_id: moving_id,
            old_parent,
            new_parent: Some(target),
            old_sort_order,
            new_sort_order,
        });

        self.reload()?;
        self.notify_structure_changed();
        Ok(true)
    }

    /// Leave move mode without moving anything.
    pub fn cancel_move(&mut self) {
        self.moving = None;
    }

    // ==================== Styles ====================

    /// Set or clear the selection's priority marker.
    pub fn set_priority(&mut self, priority: Option<Priority>) -> Result<(), StoreError> {
        self.update_style(|style| style.priority = priority)
    }

    /// Set or clear the selection's status marker.
    pub fn set_status(&mut self, status: Option<Status>) -> Result<(), StoreError> {
        self.update_style(|style| style.status = status)
    }

    /// Set or clear the selection's custom color.
    pub fn set_color(&mut self, color: Option<String>) -> Result<(), StoreError> {
        self.update_style(move |style| style.color = color)
    }

    fn update_style(
        &mut self,
        apply: impl FnOnce(&mut mindcanvas_model::NodeStyle),
    ) -> Result<(), StoreError> {
        let Some(mut node) = self.selected_node().cloned() else {
            return Ok(());
        };
        let old_style = node.style.clone();
        apply(&mut node.style);
        self.store.update_node(&node)?;

        self.history.push(UndoAction::Style {
            node_id: node.id,
            old_style,
            new_style: node.style.clone(),
        });
        self.replace_local(node);
        self.relayout()
    }

    // ==================== View ====================

    /// One zoom-in step, persisted.
    pub fn zoom_in(&mut self) -> Result<(), StoreError> {
        self.camera.zoom_in();
        self.save_view_state()
    }

    /// One zoom-out step, persisted.
    pub fn zoom_out(&mut self) -> Result<(), StoreError> {
        self.camera.zoom_out();
        self.save_view_state()
    }

    /// Reset zoom to 100%, persisted.
    pub fn zoom_to_100(&mut self) -> Result<(), StoreError> {
        self.camera.zoom_to_100();
        self.save_view_state()
    }

    /// Fit the whole map in the viewport, persisted.
    pub fn zoom_to_fit(&mut self) -> Result<(), StoreError> {
        if let Some(content) = self.scene.content_bounds() {
            self.camera.zoom_to_fit(content, self.viewport);
            self.save_view_state()?;
        }
        Ok(())
    }

    /// Center the view on the root node, persisted.
    pub fn center_view(&mut self) -> Result<(), StoreError> {
        if let Some(root) = self.scene.root() {
            let target = root.rect.center();
            self.camera.center_on(target, self.viewport);
            self.save_view_state()?;
        }
        Ok(())
    }

    /// Toggle the background grid, written through to map settings.
    pub fn toggle_grid(&mut self) -> Result<(), StoreError> {
        self.show_grid = !self.show_grid;
        let show = self.show_grid;
        self.persist_settings(|s| s.show_grid = show)
    }

    /// Toggle the minimap, written through to map settings.
    pub fn toggle_minimap(&mut self) -> Result<(), StoreError> {
        self.show_minimap = !self.show_minimap;
        let show = self.show_minimap;
        self.persist_settings(|s| s.show_minimap = show)
    }

    /// Toggle automatic layout and recompute.
    pub fn toggle_auto_layout(&mut self) -> Result<(), StoreError> {
        self.auto_layout = !self.auto_layout;
        let auto = self.auto_layout;
        self.persist_settings(|s| s.auto_layout = auto)?;
        self.relayout()
    }

    /// Switch the layout algorithm and recompute.
    pub fn set_layout_mode(&mut self, mode: LayoutMode) -> Result<(), StoreError> {
        self.layout_mode = mode;
        self.persist_settings(|s| s.layout_mode = mode)?;
        self.relayout()
    }

    /// Re-run the automatic layout once and pin every node (including the
    /// root) where it landed, switching the map to manual layout. One
    /// undoable action restores all previous positions and the layout flag.
    pub fn auto_balance_layout(&mut self) -> Result<(), StoreError> {
        let Some(map_id) = self.map_id() else {
            return Ok(());
        };
        let old_auto_layout = self.auto_layout;
        let old_positions: Vec<(NodeId, Option<Point>)> =
            self.nodes.iter().map(|n| (n.id, n.position)).collect();

        let balanced = compute_layout(&self.nodes, self.layout_mode, true);
        let new_positions: Vec<(NodeId, Option<Point>)> = balanced
            .positions()
            .map(|(id, origin)| (id, Some(origin)))
            .collect();

        self.auto_layout = false;
        self.persist_settings(|s| s.auto_layout = false)?;

        for (id, pos) in &new_positions {
            if let Some(mut node) = self.node(*id).cloned() {
                node.position = *pos;
                self.store.update_node(&node)?;
            }
        }

        self.history.push(UndoAction::Layout {
            map_id,
            old_auto_layout,
            new_auto_layout: false,
            old_positions,
            new_positions,
        });
        debug!(map = %map_id, "auto-balanced layout");

        self.reload()?;
        self.notify_structure_changed();
        Ok(())
    }

    // ==================== Clipboard ====================

    /// Copy the selected subtree to the clipboard.
    pub fn copy_selected(&mut self) {
        let Some(node) = self.selected_node().cloned() else {
            return;
        };
        let tree = TreeIndex::new(&self.nodes);
        let subtree: Vec<Node> = tree
            .subtree_ids(node.id)
            .iter()
            .filter_map(|id| tree.node(*id).cloned())
            .collect();
        self.clipboard = Some(Clipboard::new(node, subtree));
    }

    /// Paste the clipboard under the selection (or the root when nothing is
    /// selected). Ids are remapped; the top node gets a " (copy)" suffix.
    /// Returns the id of the pasted top node.
    pub fn paste(&mut self) -> Result<Option<NodeId>, StoreError> {
        let parent = self
            .selected
            .or_else(|| self.scene.root().map(|p| p.node.id));
        self.paste_under(parent)
    }

    /// Paste the clipboard as a new topic under the root regardless of
    /// selection (context-menu paste on empty canvas).
    pub fn paste_floating(&mut self) -> Result<Option<NodeId>, StoreError> {
        let parent = self.scene.root().map(|p| p.node.id);
        self.paste_under(parent)
    }

    fn paste_under(&mut self, parent: Option<NodeId>) -> Result<Option<NodeId>, StoreError> {
        let Some(clip) = self.clipboard.clone() else {
            return Ok(None);
        };
        let Some(map_id) = self.map_id() else {
            return Ok(None);
        };

        let mut created = Vec::new();
        let top = clip.top.clone();
        self.paste_recursive(&clip, &top, parent, map_id, true, &mut created)?;
        let top_id = created.first().map(|n| n.id);
        debug!(?top_id, count = created.len(), "pasted subtree");

        self.history.push(UndoAction::Create { nodes: created });
        self.reload()?;
        self.notify_structure_changed();
        Ok(top_id)
    }

    fn paste_recursive(
        &mut self,
        clip: &Clipboard,
        src: &Node,
        parent: Option<NodeId>,
        map_id: MapId,
        is_top: bool,
        out: &mut Vec<Node>,
    ) -> Result<(), StoreError> {
        let text = if is_top {
            format!("{} (copy)", src.text)
        } else {
            src.text.clone()
        };
        let mut created = self.store.create_node(map_id, parent, &text, None)?;
        created.style = src.style.clone();
        self.store.update_node(&created)?;
        let new_id = created.id;
        out.push(created);

        for child in clip.children_of(src.id) {
            self.paste_recursive(clip, child, Some(new_id), map_id, false, out)?;
        }
        Ok(())
    }

    // ==================== Undo / redo ====================

    /// Undo the most recent action. Returns whether anything was undone.
    pub fn undo(&mut self) -> Result<bool, StoreError> {
        let Some(action) = self.history.pop_undo() else {
            return Ok(false);
        };
        debug!(action = action.description(), "undo");
        self.apply_action(&action, true)?;
        Ok(true)
    }

    /// Redo the most recently undone action. Returns whether anything was
    /// redone.
    pub fn redo(&mut self) -> Result<bool, StoreError> {
        let Some(action) = self.history.pop_redo() else {
            return Ok(false);
        };
        debug!(action = action.description(), "redo");
        self.apply_action(&action, false)?;
        Ok(true)
    }

    fn apply_action(&mut self, action: &UndoAction, is_undo: bool) -> Result<(), StoreError> {
        self.history.set_applying(true);
        let result = self.apply_action_inner(action, is_undo);
        self.history.set_applying(false);
        result?;

        self.reload()?;
        if self
            .selected
            .is_some_and(|id| self.scene.get(id).is_none())
        {
            self.set_selected(None);
        }
        self.notify_structure_changed();
        Ok(())
    }

    fn apply_action_inner(&mut self, action: &UndoAction, is_undo: bool) -> Result<(), StoreError> {
        match action {
            UndoAction::Create { nodes } => {
                if is_undo {
                    if let Some(top) = nodes.first() {
                        self.delete_if_present(top.id)?;
                    }
                } else {
                    for node in nodes {
                        self.restore_if_absent(node)?;
                    }
                }
            }
            UndoAction::Delete { nodes } => {
                if is_undo {
                    for node in nodes {
                        self.restore_if_absent(node)?;
                    }
                } else if let Some(top) = nodes.first() {
                    self.delete_if_present(top.id)?;
                }
            }
            UndoAction::EditText {
                node_id,
                old_text,
                new_text,
            } => {
                if let Some(mut node) = self.store.node(*node_id)? {
                    node.text = if is_undo {
                        old_text.clone()
                    } else {
                        new_text.clone()
                    };
                    self.store.update_node(&node)?;
                }
            }
            UndoAction::Move {
                node_id,
                old_parent,
                new_parent,
                old_sort_order,
                new_sort_order,
            } => {
                if let Some(mut node) = self.store.node(*node_id)? {
                    if is_undo {
                        node.parent_id = *old_parent;
                        node.sort_order = *old_sort_order;
                    } else {
                        node.parent_id = *new_parent;
                        node.sort_order = *new_sort_order;
                    }
                    self.store.update_node(&node)?;
                }
            }
            UndoAction::Style {
                node_id,
                old_style,
                new_style,
            } => {
                if let Some(mut node) = self.store.node(*node_id)? {
                    node.style = if is_undo {
                        old_style.clone()
                    } else {
                        new_style.clone()
                    };
                    self.store.update_node(&node)?;
                }
            }
            UndoAction::Layout {
                map_id,
                old_auto_layout,
                new_auto_layout,
                old_positions,
                new_positions,
            } => {
                let auto = if is_undo {
                    *old_auto_layout
                } else {
                    *new_auto_layout
                };
                if self.map_id() == Some(*map_id) {
                    self.auto_layout = auto;
                    self.persist_settings(|s| s.auto_layout = auto)?;
                }
                let positions = if is_undo { old_positions } else { new_positions };
                for (id, pos) in positions {
                    if let Some(mut node) = self.store.node(*id)? {
                        node.position = *pos;
                        self.store.update_node(&node)?;
                    }
                }
            }
        }
        Ok(())
    }

    /// Delete a subtree during undo application. The node may already be
    /// gone if a later action removed an ancestor; that is not an error.
    fn delete_if_present(&mut self, id: NodeId) -> Result<(), StoreError> {
        if self.store.node(id)?.is_some() {
            self.store.delete_node(id)?;
        }
        Ok(())
    }

    /// Restore a record during undo application, skipping ids that are
    /// still (or again) live.
    fn restore_if_absent(&mut self, node: &Node) -> Result<(), StoreError> {
        if self.store.node(node.id)?.is_none() {
            self.store.restore_node(node)?;
        }
        Ok(())
    }

    // ==================== Notes ====================

    /// Stage note text for a node. The host's debounce timer decides when
    /// to call [`flush_note_draft`](Self::flush_note_draft); switching maps
    /// flushes automatically, as does staging a draft for another node.
    pub fn set_note_draft(&mut self, node: NodeId, content: String) -> Result<(), StoreError> {
        if self
            .note_draft
            .as_ref()
            .is_some_and(|draft| draft.node != node)
        {
            self.flush_note_draft()?;
        }
        self.note_draft = Some(NoteDraft { node, content });
        Ok(())
    }

    /// Whether a note draft is waiting to be written.
    #[must_use]
    pub fn note_draft_pending(&self) -> bool {
        self.note_draft.is_some()
    }

    /// Write the staged note through to storage and refresh the indicator
    /// cache. A draft for a since-deleted node is discarded.
    pub fn flush_note_draft(&mut self) -> Result<(), StoreError> {
        let Some(draft) = self.note_draft.take() else {
            return Ok(());
        };
        let Some(node) = self.store.node(draft.node)? else {
            return Ok(());
        };
        self.store.set_note(draft.node, &draft.content)?;
        if draft.content.is_empty() {
            self.notes_with_content.remove(&draft.node);
        } else {
            self.notes_with_content.insert(draft.node);
        }
        if let Some(mut obs) = self.observer.take() {
            obs.note_saved(&node);
            self.observer = Some(obs);
        }
        Ok(())
    }

    // ==================== Internals ====================

    fn map_id(&self) -> Option<MapId> {
        self.map.as_ref().map(|m| m.id)
    }

    fn node(&self, id: NodeId) -> Option<&Node> {
        self.nodes.iter().find(|n| n.id == id)
    }

    /// Swap an updated record into the local node list without a reload.
    fn replace_local(&mut self, node: Node) {
        if let Some(slot) = self.nodes.iter_mut().find(|n| n.id == node.id) {
            *slot = node;
        }
    }

    /// Next sort_order for a child of `parent`, ignoring `exclude`.
    fn next_sort_order(&self, parent: Option<NodeId>, exclude: NodeId) -> i64 {
        self.nodes
            .iter()
            .filter(|n| n.parent_id == parent && n.id != exclude)
            .map(|n| n.sort_order)
            .max()
            .map_or(0, |max| max + 1)
    }

    /// Re-read the node list from storage and recompute the scene.
    fn reload(&mut self) -> Result<(), StoreError> {
        if let Some(map_id) = self.map_id() {
            self.nodes = self.store.nodes_for_map(map_id)?;
        }
        self.relayout()
    }

    /// Recompute the scene from the current node list. In manual mode,
    /// every rendered position is written through so a restart reproduces
    /// the same picture.
    fn relayout(&mut self) -> Result<(), StoreError> {
        trace!(mode = ?self.layout_mode, auto = self.auto_layout, nodes = self.nodes.len(), "layout");
        self.scene = compute_layout(&self.nodes, self.layout_mode, self.auto_layout);
        if !self.auto_layout {
            self.persist_scene_positions()?;
        }
        Ok(())
    }

    fn persist_scene_positions(&mut self) -> Result<(), StoreError> {
        let updates: Vec<(NodeId, Point)> = self
            .scene
            .iter()
            .filter(|p| p.node.position != Some(p.rect.origin()))
            .map(|p| (p.node.id, p.rect.origin()))
            .collect();
        for (id, origin) in updates {
            if let Some(mut node) = self.node(id).cloned() {
                node.position = Some(origin);
                self.store.update_node(&node)?;
                self.replace_local(node);
            }
        }
        Ok(())
    }

    fn save_view_state(&mut self) -> Result<(), StoreError> {
        let zoom = self.camera.zoom;
        let pan = self.camera.pan;
        let mode = self.layout_mode;
        self.persist_settings(|s| {
            s.zoom_level = zoom;
            s.pan_x = pan.dx;
            s.pan_y = pan.dy;
            s.layout_mode = mode;
        })
    }

    fn persist_settings(
        &mut self,
        apply: impl FnOnce(&mut mindcanvas_model::MapSettings),
    ) -> Result<(), StoreError> {
        if let Some(map) = &mut self.map {
            apply(&mut map.settings);
            self.store.set_map_settings(map.id, &map.settings)?;
        }
        Ok(())
    }

    fn notify_structure_changed(&mut self) {
        if let Some(mut obs) = self.observer.take() {
            obs.structure_changed();
            self.observer = Some(obs);
        }
    }
}

enum NavResult {
    Target(NodeId),
    SelectRoot,
    None,
}
