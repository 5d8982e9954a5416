//! Mutation engine: the only code that changes the shape of a funnel.
//!
//! Every operation borrows the current funnel and returns an [`Edit`] holding
//! the next funnel. Inputs are never modified in place. Pages and components
//! sit behind `Arc`, so the returned funnel shares every page and component
//! the operation did not touch with its input.
//!
//! Stale or malformed references (page index out of range, unknown component
//! id, index past the end) are absorbed as no-ops: the edit carries the input
//! unchanged and no event.

use crate::component::{create_default_component, DataPatch, StylePatch};
use crate::validation::Validator;
use crate::{id_generator, Component, EventType, Funnel, Page, PageKind};
use std::collections::HashSet;
use std::sync::Arc;
use tracing::debug;

/// Result of a mutation: the next funnel and what changed
#[derive(Debug, Clone, PartialEq)]
pub struct Edit {
    pub funnel: Funnel,

    /// `None` when the operation was a no-op
    pub event: Option<EventType>,
}

impl Edit {
    fn applied(funnel: Funnel, event: EventType) -> Self {
        debug_assert!(
            Validator::validate(&funnel).is_valid(),
            "mutation broke funnel invariants: {}",
            Validator::validate(&funnel).error_summary()
        );
        Self {
            funnel,
            event: Some(event),
        }
    }

    pub(crate) fn unchanged(funnel: &Funnel) -> Self {
        Self {
            funnel: funnel.clone(),
            event: None,
        }
    }

    pub fn is_noop(&self) -> bool {
        self.event.is_none()
    }

    /// Id of the component this edit created, if any
    pub fn created_component(&self) -> Option<&str> {
        self.event.as_ref().and_then(EventType::created_component)
    }
}

/// Page-level settings to change; `None` fields are left alone
#[derive(Debug, Clone, Default, PartialEq)]
pub struct PagePatch {
    pub title: Option<String>,
    pub kind: Option<PageKind>,
    /// Clamped to 100
    pub progress_percent: Option<u8>,
    pub show_header: Option<bool>,
    pub show_progress: Option<bool>,
}

/// Index a component lands on when dropped at drop zone `to` after being lifted from `from`
///
/// Removing the component shifts every later index down by one, so drop
/// zones after the source are decremented.
pub fn adjusted_drop_index(from: usize, to: usize) -> usize {
    if to > from {
        to - 1
    } else {
        to
    }
}

// ========== Component Operations ==========

/// Insert a default component of `component_type` at `at_index` (clamped to `[0, len]`)
pub fn add_component(
    funnel: &Funnel,
    page_index: usize,
    component_type: &str,
    at_index: usize,
) -> Edit {
    let Some(page) = funnel.page(page_index) else {
        debug!(page_index, "add_component: no such page");
        return Edit::unchanged(funnel);
    };

    let index = at_index.min(page.len());
    let mut component = create_default_component(component_type);
    component.id = fresh_component_id(funnel, component.type_name());

    let event = EventType::ComponentAdded {
        page_id: page.id.clone(),
        component_id: component.id.clone(),
        component_type: component.type_name().to_string(),
        index,
    };

    let mut next = funnel.clone();
    if let Some(page) = next.page_mut(page_index) {
        page.components.insert(index, Arc::new(component));
    }

    Edit::applied(next, event)
}

/// Shallow-merge `patch` into the data of `component_id` on the given page
pub fn update_component_data(
    funnel: &Funnel,
    page_index: usize,
    component_id: &str,
    patch: &DataPatch,
) -> Edit {
    let Some((page, index)) = locate(funnel, page_index, component_id) else {
        return Edit::unchanged(funnel);
    };

    let current = &page.components[index];
    let data = match current.data.merged(patch) {
        Ok(data) => data,
        Err(e) => {
            debug!(component_id, error = %e, "update_component_data: patch rejected");
            return Edit::unchanged(funnel);
        }
    };
    if data == current.data {
        return Edit::unchanged(funnel);
    }

    let event = EventType::ComponentDataChanged {
        page_id: page.id.clone(),
        component_id: component_id.to_string(),
        fields: patch.keys().filter(|k| *k != "type").cloned().collect(),
    };

    let mut next = funnel.clone();
    if let Some(page) = next.page_mut(page_index) {
        Arc::make_mut(&mut page.components[index]).data = data;
    }

    Edit::applied(next, event)
}

/// Shallow-merge `patch` into the style of `component_id` on the given page
pub fn update_component_style(
    funnel: &Funnel,
    page_index: usize,
    component_id: &str,
    patch: &StylePatch,
) -> Edit {
    let Some((page, index)) = locate(funnel, page_index, component_id) else {
        return Edit::unchanged(funnel);
    };

    let current = &page.components[index];
    let style = current.style.merged(patch);
    if style == current.style {
        return Edit::unchanged(funnel);
    }

    let event = EventType::ComponentStyleChanged {
        page_id: page.id.clone(),
        component_id: component_id.to_string(),
        properties: patch.keys().cloned().collect(),
    };

    let mut next = funnel.clone();
    if let Some(page) = next.page_mut(page_index) {
        Arc::make_mut(&mut page.components[index]).style = style;
    }

    Edit::applied(next, event)
}

/// Remove `component_id` from the given page
pub fn delete_component(funnel: &Funnel, page_index: usize, component_id: &str) -> Edit {
    let Some((page, index)) = locate(funnel, page_index, component_id) else {
        return Edit::unchanged(funnel);
    };

    let event = EventType::ComponentDeleted {
        page_id: page.id.clone(),
        component_id: component_id.to_string(),
        index,
    };

    let mut next = funnel.clone();
    if let Some(page) = next.page_mut(page_index) {
        page.components.remove(index);
    }

    Edit::applied(next, event)
}

/// Deep-copy `component_id` under a fresh id, directly after the source
pub fn duplicate_component(funnel: &Funnel, page_index: usize, component_id: &str) -> Edit {
    let Some((page, index)) = locate(funnel, page_index, component_id) else {
        return Edit::unchanged(funnel);
    };

    let source = &page.components[index];
    let copy = source.duplicate_as(fresh_component_id(funnel, source.type_name()));

    let event = EventType::ComponentDuplicated {
        page_id: page.id.clone(),
        source_id: component_id.to_string(),
        component_id: copy.id.clone(),
        index: index + 1,
    };

    let mut next = funnel.clone();
    if let Some(page) = next.page_mut(page_index) {
        page.components.insert(index + 1, Arc::new(copy));
    }

    Edit::applied(next, event)
}

/// Move the component at `from` to drop zone `to`
///
/// Drop zones are numbered `0..=len`: zone `i` sits before the component
/// currently at `i`, zone `len` after the last one. Dropping onto either zone
/// adjacent to the component leaves the page unchanged.
pub fn move_component(funnel: &Funnel, page_index: usize, from: usize, to: usize) -> Edit {
    let Some(page) = funnel.page(page_index) else {
        return Edit::unchanged(funnel);
    };

    let len = page.len();
    if from >= len || to > len {
        debug!(from, to, len, "move_component: index out of range");
        return Edit::unchanged(funnel);
    }

    let target = adjusted_drop_index(from, to);
    if target == from {
        return Edit::unchanged(funnel);
    }

    let event = EventType::ComponentMoved {
        page_id: page.id.clone(),
        component_id: page.components[from].id.clone(),
        from,
        to: target,
    };

    let mut next = funnel.clone();
    if let Some(page) = next.page_mut(page_index) {
        let component = page.components.remove(from);
        page.components.insert(target, component);
    }

    Edit::applied(next, event)
}

// ========== Page Operations ==========

/// Insert a new page of `kind` (with its starter blocks) at `at_index` (clamped to `[0, len]`)
pub fn add_page(funnel: &Funnel, kind: PageKind, at_index: usize) -> Edit {
    let index = at_index.min(funnel.page_count());

    let mut page = Page::from_template(kind);
    page.id = id_generator::unique_id("page", &funnel.page_ids());
    refresh_component_ids(&mut page, funnel.component_ids());

    let event = EventType::PageAdded {
        page_id: page.id.clone(),
        kind,
        index,
    };

    let mut next = funnel.clone();
    next.pages_mut().insert(index, Arc::new(page));

    Edit::applied(next, event)
}

/// Copy a page and all its components under fresh ids, directly after the source
pub fn duplicate_page(funnel: &Funnel, page_index: usize) -> Edit {
    let Some(source) = funnel.page(page_index) else {
        return Edit::unchanged(funnel);
    };

    let mut copy = source.clone();
    copy.id = id_generator::unique_id("page", &funnel.page_ids());
    copy.title = format!("{} (copy)", source.title);
    refresh_component_ids(&mut copy, funnel.component_ids());

    let event = EventType::PageDuplicated {
        source_id: source.id.clone(),
        page_id: copy.id.clone(),
        index: page_index + 1,
    };

    let mut next = funnel.clone();
    next.pages_mut().insert(page_index + 1, Arc::new(copy));

    Edit::applied(next, event)
}

/// Remove a page; rejected when it is the last one
pub fn delete_page(funnel: &Funnel, page_index: usize) -> Edit {
    if funnel.page_count() <= 1 {
        debug!("delete_page: refusing to delete the last page");
        return Edit::unchanged(funnel);
    }
    let Some(page) = funnel.page(page_index) else {
        return Edit::unchanged(funnel);
    };

    let event = EventType::PageDeleted {
        page_id: page.id.clone(),
        index: page_index,
    };

    let mut next = funnel.clone();
    next.pages_mut().remove(page_index);

    Edit::applied(next, event)
}

/// Move the page at `from` so it ends up at index `to` (both in `[0, len)`)
pub fn reorder_pages(funnel: &Funnel, from: usize, to: usize) -> Edit {
    let len = funnel.page_count();
    if from >= len || to >= len || from == to {
        return Edit::unchanged(funnel);
    }

    let event = EventType::PagesReordered {
        page_id: funnel.pages()[from].id.clone(),
        from,
        to,
    };

    let mut next = funnel.clone();
    let page = next.pages_mut().remove(from);
    next.pages_mut().insert(to, page);

    Edit::applied(next, event)
}

/// Change page-level settings
pub fn update_page(funnel: &Funnel, page_index: usize, patch: &PagePatch) -> Edit {
    let Some(current) = funnel.page(page_index) else {
        return Edit::unchanged(funnel);
    };

    let mut page = current.clone();
    if let Some(title) = &patch.title {
        page.title = title.clone();
    }
    if let Some(kind) = patch.kind {
        page.kind = kind;
    }
    if let Some(progress) = patch.progress_percent {
        page.progress_percent = progress.min(100);
    }
    if let Some(show_header) = patch.show_header {
        page.show_header = show_header;
    }
    if let Some(show_progress) = patch.show_progress {
        page.show_progress = show_progress;
    }

    if page == *current {
        return Edit::unchanged(funnel);
    }

    let event = EventType::PageUpdated {
        page_id: page.id.clone(),
    };

    let mut next = funnel.clone();
    next.pages_mut()[page_index] = Arc::new(page);

    Edit::applied(next, event)
}

/// Change the funnel's display name
pub fn rename_funnel(funnel: &Funnel, name: &str) -> Edit {
    if funnel.name() == name {
        return Edit::unchanged(funnel);
    }

    let mut next = funnel.clone();
    next.set_name(name.to_string());

    Edit::applied(
        next,
        EventType::FunnelRenamed {
            name: name.to_string(),
        },
    )
}

// ========== Helpers ==========

/// Find a component by id on one page
fn locate<'a>(funnel: &'a Funnel, page_index: usize, component_id: &str) -> Option<(&'a Page, usize)> {
    let Some(page) = funnel.page(page_index) else {
        debug!(page_index, "no such page");
        return None;
    };
    let Some(index) = page.component_index(component_id) else {
        debug!(page_index, component_id, "component not on page");
        return None;
    };
    Some((page, index))
}

fn fresh_component_id(funnel: &Funnel, prefix: &str) -> String {
    id_generator::unique_id(prefix, &funnel.component_ids())
}

/// Give every component on `page` a new id not in `taken`
fn refresh_component_ids(page: &mut Page, mut taken: HashSet<String>) {
    for component in page.components.iter_mut() {
        let id = id_generator::unique_id(component.type_name(), &taken);
        taken.insert(id.clone());
        let copy: &mut Component = Arc::make_mut(component);
        copy.id = id;
    }
}
