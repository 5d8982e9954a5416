use crate::component::{Component, ComponentData, ComponentType, HeadingData};
use crate::id_generator;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::sync::Arc;
use ulid::Ulid;

/// What a page is for; drives grouping and templates, never mutation rules
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum PageKind {
    #[default]
    Intro,
    Question,
    Loading,
    Result,
    Offer,
    Transition,
    Sales,
    Checkout,
    Upsell,
    #[serde(other)]
    Other,
}

impl PageKind {
    /// Title given to a freshly added page of this kind
    pub fn default_title(&self) -> &'static str {
        match self {
            Self::Intro => "Welcome",
            Self::Question => "Question",
            Self::Loading => "Analyzing your answers",
            Self::Result => "Your result",
            Self::Offer => "Special offer",
            Self::Transition => "Almost there",
            Self::Sales => "Sales page",
            Self::Checkout => "Checkout",
            Self::Upsell => "One more thing",
            Self::Other => "New page",
        }
    }

    /// Starter blocks placed on a new page of this kind
    fn starter_components(&self) -> &'static [ComponentType] {
        match self {
            Self::Intro | Self::Transition | Self::Result => &[
                ComponentType::Heading,
                ComponentType::Text,
                ComponentType::Button,
            ],
            Self::Question => &[ComponentType::Heading, ComponentType::OptionList],
            Self::Loading => &[ComponentType::Heading, ComponentType::ProgressBar],
            Self::Offer | Self::Sales | Self::Upsell => &[
                ComponentType::Heading,
                ComponentType::Price,
                ComponentType::Button,
            ],
            Self::Checkout => &[
                ComponentType::Heading,
                ComponentType::Input,
                ComponentType::Button,
            ],
            Self::Other => &[],
        }
    }
}

fn default_true() -> bool {
    true
}

/// One screen of the funnel
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Page {
    pub id: String,

    pub title: String,

    pub kind: PageKind,

    /// Progress shown in the header, 0..=100
    #[serde(default)]
    pub progress_percent: u8,

    #[serde(default = "default_true")]
    pub show_header: bool,

    #[serde(default = "default_true")]
    pub show_progress: bool,

    /// Rendering order, index 0 is topmost
    #[serde(default)]
    pub components: Vec<Arc<Component>>,
}

impl Page {
    /// Create an empty page
    pub fn new(kind: PageKind, title: impl Into<String>) -> Self {
        Self {
            id: id_generator::generate_id("page"),
            title: title.into(),
            kind,
            progress_percent: 0,
            show_header: true,
            show_progress: true,
            components: Vec::new(),
        }
    }

    /// Create a page with the starter blocks for its kind
    pub fn from_template(kind: PageKind) -> Self {
        let mut page = Self::new(kind, kind.default_title());
        page.components = kind
            .starter_components()
            .iter()
            .map(|ty| Arc::new(Component::new(*ty)))
            .collect();

        if let Some(first) = page.components.first_mut() {
            if let ComponentData::Heading(_) = first.data {
                Arc::make_mut(first).data = ComponentData::Heading(HeadingData {
                    text: kind.default_title().to_string(),
                    level: 1,
                });
            }
        }

        page
    }

    /// Builder: replace the page id (useful for testing)
    pub fn with_id(mut self, id: impl Into<String>) -> Self {
        self.id = id.into();
        self
    }

    /// Builder: replace the component list
    pub fn with_components(mut self, components: Vec<Component>) -> Self {
        self.components = components.into_iter().map(Arc::new).collect();
        self
    }

    /// Position of a component on this page
    pub fn component_index(&self, id: &str) -> Option<usize> {
        self.components.iter().position(|c| c.id == id)
    }

    pub fn component(&self, id: &str) -> Option<&Component> {
        self.components.iter().find(|c| c.id == id).map(Arc::as_ref)
    }

    /// Component ids in rendering order
    pub fn component_ids(&self) -> Vec<&str> {
        self.components.iter().map(|c| c.id.as_str()).collect()
    }

    pub fn len(&self) -> usize {
        self.components.len()
    }

    pub fn is_empty(&self) -> bool {
        self.components.is_empty()
    }
}

/// The multi-page document being edited
///
/// Fields are private: only the mutation module produces changed funnels.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Funnel {
    id: String,
    name: String,
    pages: Vec<Arc<Page>>,
}

impl Funnel {
    /// Create a funnel from pages; an empty page list gets one intro page
    pub fn new(name: impl Into<String>, pages: Vec<Page>) -> Self {
        let mut pages: Vec<Arc<Page>> = pages.into_iter().map(Arc::new).collect();
        if pages.is_empty() {
            pages.push(Arc::new(Page::from_template(PageKind::Intro)));
        }

        Self {
            id: Ulid::new().to_string(),
            name: name.into(),
            pages,
        }
    }

    /// The default document: a single intro page
    pub fn starter() -> Self {
        Self::new("My funnel", vec![Page::from_template(PageKind::Intro)])
    }

    /// Builder: replace the funnel id (useful for testing)
    pub fn with_id(mut self, id: impl Into<String>) -> Self {
        self.id = id.into();
        self
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn pages(&self) -> &[Arc<Page>] {
        &self.pages
    }

    pub fn page(&self, index: usize) -> Option<&Page> {
        self.pages.get(index).map(Arc::as_ref)
    }

    pub fn page_count(&self) -> usize {
        self.pages.len()
    }

    pub fn page_index(&self, page_id: &str) -> Option<usize> {
        self.pages.iter().position(|p| p.id == page_id)
    }

    /// Locate a component anywhere in the funnel as `(page_index, component_index)`
    pub fn find_component(&self, component_id: &str) -> Option<(usize, usize)> {
        self.pages.iter().enumerate().find_map(|(page_index, page)| {
            page.component_index(component_id)
                .map(|component_index| (page_index, component_index))
        })
    }

    /// Every component id in the funnel
    pub fn component_ids(&self) -> HashSet<String> {
        self.pages
            .iter()
            .flat_map(|p| p.components.iter().map(|c| c.id.clone()))
            .collect()
    }

    pub fn page_ids(&self) -> HashSet<String> {
        self.pages.iter().map(|p| p.id.clone()).collect()
    }

    pub fn component_count(&self) -> usize {
        self.pages.iter().map(|p| p.components.len()).sum()
    }

    pub(crate) fn set_name(&mut self, name: String) {
        self.name = name;
    }

    pub(crate) fn pages_mut(&mut self) -> &mut Vec<Arc<Page>> {
        &mut self.pages
    }

    /// Copy-on-write access to one page; untouched pages stay shared
    pub(crate) fn page_mut(&mut self, index: usize) -> Option<&mut Page> {
        self.pages.get_mut(index).map(Arc::make_mut)
    }
}

impl Default for Funnel {
    fn default() -> Self {
        Self::starter()
    }
}
