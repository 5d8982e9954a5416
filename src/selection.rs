//! Current page, selected component, and the properties panel bound to it.
//!
//! The selection is held by id and scoped to the current page. Every panel
//! edit is routed through the mutation engine by that id, so a reorder that
//! lands between two edits can never redirect them to another component.

use crate::component::{ComponentData, DataPatch, StylePatch};
use crate::mutation::{self, Edit};
use crate::{Component, EventType, Funnel, Page};
use serde::{Deserialize, Serialize};

/// Current page and selected component
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Selection {
    page_index: usize,
    component_id: Option<String>,
}

impl Selection {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn page_index(&self) -> usize {
        self.page_index
    }

    pub fn component_id(&self) -> Option<&str> {
        self.component_id.as_deref()
    }

    /// Select a component on the current page; ids from other pages are refused
    pub fn select(&mut self, funnel: &Funnel, component_id: &str) -> bool {
        let on_page = self
            .current_page(funnel)
            .is_some_and(|page| page.component_index(component_id).is_some());
        if on_page {
            self.component_id = Some(component_id.to_string());
        }
        on_page
    }

    pub fn clear(&mut self) {
        self.component_id = None;
    }

    /// Change the current page; always clears the component selection
    pub fn switch_page(&mut self, funnel: &Funnel, page_index: usize) -> bool {
        if page_index >= funnel.page_count() {
            return false;
        }
        self.page_index = page_index;
        self.component_id = None;
        true
    }

    pub fn current_page<'a>(&self, funnel: &'a Funnel) -> Option<&'a Page> {
        funnel.page(self.page_index)
    }

    /// The component the properties panel is bound to
    pub fn current_component<'a>(&self, funnel: &'a Funnel) -> Option<&'a Component> {
        let id = self.component_id.as_deref()?;
        self.current_page(funnel)?.component(id)
    }

    /// Follow an accepted edit: select what it created, drop what it removed
    ///
    /// `funnel` is the funnel after the edit.
    pub fn reconcile(&mut self, funnel: &Funnel, event: &EventType) {
        match event {
            EventType::ComponentAdded { component_id, .. }
            | EventType::ComponentDuplicated { component_id, .. } => {
                self.select(funnel, component_id);
            }
            EventType::ComponentDeleted { component_id, .. } => {
                if self.component_id.as_deref() == Some(component_id.as_str()) {
                    self.clear();
                }
            }
            EventType::PageAdded { index, .. } | EventType::PageDuplicated { index, .. } => {
                self.switch_page(funnel, *index);
            }
            EventType::PageDeleted { index, .. } => {
                if *index < self.page_index {
                    self.page_index -= 1;
                } else if *index == self.page_index {
                    self.component_id = None;
                }
            }
            EventType::PagesReordered { from, to, .. } => {
                self.page_index = follow_reorder(self.page_index, *from, *to);
            }
            _ => {}
        }
        self.reconcile_with(funnel);
    }

    /// Make the selection valid for `funnel`, e.g. after undo or redo
    pub fn reconcile_with(&mut self, funnel: &Funnel) {
        let last = funnel.page_count().saturating_sub(1);
        if self.page_index > last {
            self.page_index = last;
            self.component_id = None;
        }
        if self.current_component(funnel).is_none() {
            self.component_id = None;
        }
    }
}

/// Where the page at `index` ends up after moving a page from `from` to `to`
fn follow_reorder(index: usize, from: usize, to: usize) -> usize {
    if index == from {
        to
    } else if from < index && index <= to {
        index - 1
    } else if to <= index && index < from {
        index + 1
    } else {
        index
    }
}

/// Groups of controls in the properties panel
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PanelSection {
    /// Text fields: headings, labels, button captions
    Content,
    /// Answer options of an option list
    Options,
    /// Image and video sources
    Media,
    Pricing,
    Timer,
    /// Repeated entries: bonuses, FAQ items, avatars
    Items,
    Style,
    /// Duplicate and delete
    Arrange,
}

/// Panel sections offered for a component
pub fn panel_sections(component: &Component) -> Vec<PanelSection> {
    use PanelSection::*;

    let mut sections = match &component.data {
        ComponentData::Heading(_)
        | ComponentData::Text(_)
        | ComponentData::Input(_)
        | ComponentData::Button(_)
        | ComponentData::Guarantee(_)
        | ComponentData::ProgressBar(_) => vec![Content],
        ComponentData::OptionList(_) => vec![Content, Options],
        ComponentData::Image(_) | ComponentData::Video(_) | ComponentData::Logo(_) => {
            vec![Media]
        }
        ComponentData::Testimonial(_) => vec![Content, Media],
        ComponentData::Price(_) => vec![Pricing, Items],
        ComponentData::Countdown(_) => vec![Content, Timer],
        ComponentData::BonusList(_) | ComponentData::FaqList(_) => vec![Content, Items],
        ComponentData::SocialProof(_) => vec![Content, Items],
        ComponentData::Spacer(_) | ComponentData::Custom { .. } => Vec::new(),
    };
    sections.extend([Style, Arrange]);
    sections
}

/// A change requested by the properties panel
#[derive(Debug, Clone, PartialEq)]
pub enum PropertyEdit {
    Data(DataPatch),
    Style(StylePatch),
}

/// Apply a panel edit to the selected component, addressed by id
///
/// With nothing selected, or a selection that is no longer on the current
/// page, the edit is a no-op.
pub fn apply_property_edit(funnel: &Funnel, selection: &Selection, edit: &PropertyEdit) -> Edit {
    let Some(component_id) = selection.component_id() else {
        return Edit::unchanged(funnel);
    };
    let page_index = selection.page_index();

    match edit {
        PropertyEdit::Data(patch) => {
            mutation::update_component_data(funnel, page_index, component_id, patch)
        }
        PropertyEdit::Style(patch) => {
            mutation::update_component_style(funnel, page_index, component_id, patch)
        }
    }
}
