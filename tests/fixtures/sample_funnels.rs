// Helper functions to build test funnels with known component ids
#![allow(dead_code)]

use funnel_editor::component::{ComponentData, HeadingData, Style, TextData};
use funnel_editor::{Component, Funnel, Page, PageKind};

/// A heading whose id and text are both `id`
pub fn heading(id: &str) -> Component {
    Component::with_id(
        id,
        ComponentData::Heading(HeadingData {
            text: id.to_string(),
            level: 1,
        }),
        Style::new(),
    )
}

/// A text block whose id and content are both `id`
pub fn text(id: &str) -> Component {
    Component::with_id(
        id,
        ComponentData::Text(TextData {
            content: id.to_string(),
        }),
        Style::from_pairs(&[("fontSize", "16px")]),
    )
}

/// One intro page holding headings with the given ids, in order
pub fn single_page_funnel(ids: &[&str]) -> Funnel {
    let page = Page::new(PageKind::Intro, "Intro")
        .with_id("page-intro")
        .with_components(ids.iter().map(|id| heading(id)).collect());
    Funnel::new("Test funnel", vec![page]).with_id("funnel-test")
}

/// Three pages (intro, question, result) with fixed ids
pub fn quiz_funnel() -> Funnel {
    Funnel::new(
        "Quiz",
        vec![
            Page::new(PageKind::Intro, "Welcome")
                .with_id("page-1")
                .with_components(vec![heading("title"), text("intro-text")]),
            Page::new(PageKind::Question, "Your goal")
                .with_id("page-2")
                .with_components(vec![heading("q1"), text("q1-help"), text("q1-note")]),
            Page::new(PageKind::Result, "Result")
                .with_id("page-3")
                .with_components(vec![heading("result")]),
        ],
    )
    .with_id("funnel-quiz")
}

/// Component ids of a page in rendering order
pub fn page_order(funnel: &Funnel, page_index: usize) -> Vec<String> {
    funnel
        .page(page_index)
        .map(|page| page.component_ids().into_iter().map(str::to_string).collect())
        .unwrap_or_default()
}
