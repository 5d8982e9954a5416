//! Editing session: owns the current funnel and routes every change through
//! the mutation engine, history, selection and autosave in that order.

use crate::autosave::Autosave;
use crate::component::{DataPatch, StylePatch};
use crate::drag::{DragController, Rectangle};
use crate::mutation::{self, Edit, PagePatch};
use crate::persistence::{self, EditorConfig, KeyValueStore, RestoreSource};
use crate::selection::{self, PropertyEdit, Selection};
use crate::validation::{ValidatedFunnel, ValidationResult, ValidationSeverity};
use crate::{Component, EditorSettings, Funnel, FunnelEvent, History, Page, PageKind};
use anyhow::Result;
use std::collections::HashMap;
use std::time::Instant;
use tracing::{debug, info};

/// The funnel editor core
pub struct FunnelEditor<S: KeyValueStore> {
    funnel: Funnel,
    config: EditorConfig,
    history: History,
    selection: Selection,
    drag: DragController,
    autosave: Autosave,
    /// Latest time reported by the event loop through `tick`
    clock: Instant,
    store: S,
    /// Every accepted edit, oldest first
    events: Vec<FunnelEvent>,
    restore_source: RestoreSource,
    dirty: bool,
}

impl<S: KeyValueStore> FunnelEditor<S> {
    /// Open the funnel stored in `store`, or a starter funnel
    pub fn open(store: S, settings: &EditorSettings) -> Self {
        let restored = persistence::restore(&store);
        info!(source = ?restored.source, funnel = restored.funnel.name(), "editor opened");

        let mut editor = Self::with_funnel(store, restored.funnel, settings);
        editor.config = restored.config;
        editor.restore_source = restored.source;
        editor
    }

    /// Start a session on `funnel`, ignoring whatever `store` holds
    pub fn with_funnel(store: S, funnel: Funnel, settings: &EditorSettings) -> Self {
        Self {
            history: History::with_limit(funnel.clone(), settings.history_limit),
            funnel,
            config: EditorConfig::default(),
            selection: Selection::new(),
            drag: DragController::new(),
            autosave: Autosave::new(settings.autosave_delay()),
            clock: Instant::now(),
            store,
            events: Vec::new(),
            restore_source: RestoreSource::Missing,
            dirty: false,
        }
    }

    pub fn funnel(&self) -> &Funnel {
        &self.funnel
    }

    pub fn config(&self) -> &EditorConfig {
        &self.config
    }

    pub fn history(&self) -> &History {
        &self.history
    }

    pub fn selection(&self) -> &Selection {
        &self.selection
    }

    pub fn drag(&self) -> &DragController {
        &self.drag
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    pub fn into_store(self) -> S {
        self.store
    }

    pub fn events(&self) -> &[FunnelEvent] {
        &self.events
    }

    pub fn restore_source(&self) -> RestoreSource {
        self.restore_source
    }

    /// Changes not yet written to the store
    pub fn is_dirty(&self) -> bool {
        self.dirty
    }

    pub fn save_pending(&self) -> bool {
        self.autosave.is_pending()
    }

    pub fn page_index(&self) -> usize {
        self.selection.page_index()
    }

    pub fn current_page(&self) -> Option<&Page> {
        self.selection.current_page(&self.funnel)
    }

    pub fn current_component(&self) -> Option<&Component> {
        self.selection.current_component(&self.funnel)
    }

    pub fn can_undo(&self) -> bool {
        self.history.can_undo()
    }

    pub fn can_redo(&self) -> bool {
        self.history.can_redo()
    }

    // ========== Selection ==========

    pub fn select(&mut self, component_id: &str) -> bool {
        self.selection.select(&self.funnel, component_id)
    }

    pub fn clear_selection(&mut self) {
        self.selection.clear();
    }

    pub fn switch_page(&mut self, page_index: usize) -> bool {
        self.selection.switch_page(&self.funnel, page_index)
    }

    // ========== Components ==========

    /// Add a palette component to the current page; returns the new id
    pub fn add_component(&mut self, component_type: &str, at_index: usize) -> Option<String> {
        let edit = mutation::add_component(
            &self.funnel,
            self.page_index(),
            component_type,
            at_index,
        );
        let created = edit.created_component().map(str::to_string);
        self.commit(edit).then_some(created).flatten()
    }

    pub fn apply_property_edit(&mut self, edit: &PropertyEdit) -> bool {
        let edit = selection::apply_property_edit(&self.funnel, &self.selection, edit);
        self.commit(edit)
    }

    pub fn edit_selected_data(&mut self, patch: DataPatch) -> bool {
        self.apply_property_edit(&PropertyEdit::Data(patch))
    }

    pub fn edit_selected_style(&mut self, patch: StylePatch) -> bool {
        self.apply_property_edit(&PropertyEdit::Style(patch))
    }

    pub fn delete_component(&mut self, component_id: &str) -> bool {
        let edit = mutation::delete_component(&self.funnel, self.page_index(), component_id);
        self.commit(edit)
    }

    /// Duplicate a component on the current page; returns the copy's id
    pub fn duplicate_component(&mut self, component_id: &str) -> Option<String> {
        let edit = mutation::duplicate_component(&self.funnel, self.page_index(), component_id);
        let created = edit.created_component().map(str::to_string);
        self.commit(edit).then_some(created).flatten()
    }

    pub fn delete_selected(&mut self) -> bool {
        match self.selection.component_id().map(str::to_string) {
            Some(id) => self.delete_component(&id),
            None => false,
        }
    }

    pub fn duplicate_selected(&mut self) -> Option<String> {
        let id = self.selection.component_id()?.to_string();
        self.duplicate_component(&id)
    }

    /// Move a component on the current page to drop zone `to`
    pub fn move_component(&mut self, from: usize, to: usize) -> bool {
        let edit = mutation::move_component(&self.funnel, self.page_index(), from, to);
        self.commit(edit)
    }

    // ========== Drag and drop ==========

    pub fn begin_palette_drag(&mut self, component_type: &str) -> bool {
        self.drag.start_from_palette(component_type)
    }

    /// Start dragging a component of the current page
    pub fn begin_canvas_drag(&mut self, component_id: &str) -> bool {
        let Some(index) = self
            .current_page()
            .and_then(|page| page.component_index(component_id))
        else {
            debug!(component_id, "canvas drag of a component not on the current page");
            return false;
        };
        self.drag.start_from_canvas(component_id, index)
    }

    pub fn drag_over(&mut self, index: usize) {
        self.drag.drag_over(index);
    }

    pub fn drag_pointer(&mut self, x: f32, y: f32, canvas: &Rectangle, blocks: &[Rectangle]) {
        self.drag.drag_pointer(x, y, canvas, blocks);
    }

    pub fn drag_leave(&mut self) {
        self.drag.drag_leave();
    }

    /// Commit the active drag to the current page
    pub fn drop(&mut self) -> bool {
        let edit = self.drag.drop(&self.funnel, self.page_index());
        self.commit(edit)
    }

    pub fn cancel_drag(&mut self) -> bool {
        self.drag.cancel()
    }

    // ========== Pages ==========

    /// Add a page after the current one and switch to it
    pub fn add_page(&mut self, kind: PageKind) -> bool {
        let edit = mutation::add_page(&self.funnel, kind, self.page_index() + 1);
        self.commit(edit)
    }

    /// Duplicate the current page and switch to the copy
    pub fn duplicate_page(&mut self) -> bool {
        let edit = mutation::duplicate_page(&self.funnel, self.page_index());
        self.commit(edit)
    }

    pub fn delete_page(&mut self, page_index: usize) -> bool {
        let edit = mutation::delete_page(&self.funnel, page_index);
        self.commit(edit)
    }

    pub fn reorder_pages(&mut self, from: usize, to: usize) -> bool {
        let edit = mutation::reorder_pages(&self.funnel, from, to);
        self.commit(edit)
    }

    /// Change settings of the current page
    pub fn update_page(&mut self, patch: &PagePatch) -> bool {
        let edit = mutation::update_page(&self.funnel, self.page_index(), patch);
        self.commit(edit)
    }

    pub fn rename(&mut self, name: &str) -> bool {
        let edit = mutation::rename_funnel(&self.funnel, name);
        self.commit(edit)
    }

    // ========== History ==========

    pub fn undo(&mut self) -> bool {
        let Some(funnel) = self.history.undo().cloned() else {
            return false;
        };
        self.restore_snapshot(funnel);
        true
    }

    pub fn redo(&mut self) -> bool {
        let Some(funnel) = self.history.redo().cloned() else {
            return false;
        };
        self.restore_snapshot(funnel);
        true
    }

    fn restore_snapshot(&mut self, funnel: Funnel) {
        self.funnel = funnel;
        self.selection.reconcile_with(&self.funnel);
        self.mark_changed();
    }

    // ========== Configuration and saving ==========

    /// Change the editor config; not part of the undo history
    pub fn update_config(&mut self, update: impl FnOnce(&mut EditorConfig)) {
        let before = self.config.clone();
        update(&mut self.config);
        if self.config != before {
            self.mark_changed();
        }
    }

    /// Save if the quiet period after the last change has elapsed
    ///
    /// Changes are stamped with the latest `now` seen here, so the debounce
    /// runs on the caller's clock rather than the wall clock.
    pub fn tick(&mut self, now: Instant) -> Result<bool> {
        self.clock = self.clock.max(now);
        if !self.autosave.poll(now) {
            return Ok(false);
        }
        self.flush()?;
        Ok(true)
    }

    /// Save immediately
    pub fn flush(&mut self) -> Result<()> {
        self.autosave.cancel();
        persistence::save_all(&mut self.store, &self.funnel, &self.config)?;
        self.dirty = false;
        Ok(())
    }

    pub fn validate(&self) -> ValidationResult {
        self.funnel.validate()
    }

    /// Highest issue severity per page or component id
    pub fn issue_badges(&self) -> HashMap<String, ValidationSeverity> {
        let result = self.funnel.validate();
        self.funnel.ids_with_issues(&result)
    }

    fn commit(&mut self, edit: Edit) -> bool {
        let Some(event) = edit.event else {
            return false;
        };

        let event = FunnelEvent::new(event);
        self.funnel = edit.funnel;
        self.history.record(self.funnel.clone(), event.clone());
        self.selection.reconcile(&self.funnel, &event.event);
        debug!(event = ?event.event, "edit applied");
        self.events.push(event);
        self.mark_changed();
        true
    }

    fn mark_changed(&mut self) {
        self.dirty = true;
        self.autosave.schedule(self.clock);
    }
}
