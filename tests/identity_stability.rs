// Property tests: unreferenced components survive every mutation untouched

#[path = "fixtures/sample_funnels.rs"]
mod fixtures;

use fixtures::{page_order, quiz_funnel};
use funnel_editor::component::data_patch;
use funnel_editor::mutation::{self, Edit};
use funnel_editor::validation::Validator;
use funnel_editor::{ComponentType, Funnel, FunnelEvent, History};
use proptest::prelude::*;
use serde_json::json;
use std::collections::HashSet;

#[derive(Debug, Clone)]
enum Op {
    Add { page: usize, kind: usize, at: usize },
    Delete { page: usize, slot: usize },
    Duplicate { page: usize, slot: usize },
    Move { page: usize, from: usize, to: usize },
    Edit { page: usize, slot: usize },
}

fn op_strategy() -> impl Strategy<Value = Op> {
    prop_oneof![
        (0..4usize, 0..ComponentType::ALL.len(), 0..8usize)
            .prop_map(|(page, kind, at)| Op::Add { page, kind, at }),
        (0..4usize, 0..6usize).prop_map(|(page, slot)| Op::Delete { page, slot }),
        (0..4usize, 0..6usize).prop_map(|(page, slot)| Op::Duplicate { page, slot }),
        (0..4usize, 0..6usize, 0..7usize).prop_map(|(page, from, to)| Op::Move { page, from, to }),
        (0..4usize, 0..6usize).prop_map(|(page, slot)| Op::Edit { page, slot }),
    ]
}

/// Id of the component at `slot` on `page`, if any
fn id_at(funnel: &Funnel, page: usize, slot: usize) -> Option<String> {
    funnel
        .page(page)
        .and_then(|p| p.components.get(slot))
        .map(|c| c.id.clone())
}

/// Apply `op`, returning the edit and the component it references
fn apply(funnel: &Funnel, op: &Op) -> (Edit, Option<String>) {
    match *op {
        Op::Add { page, kind, at } => (
            mutation::add_component(funnel, page, ComponentType::ALL[kind].as_str(), at),
            None,
        ),
        Op::Delete { page, slot } => {
            let id = id_at(funnel, page, slot);
            let edit = match &id {
                Some(id) => mutation::delete_component(funnel, page, id),
                None => mutation::delete_component(funnel, page, "missing"),
            };
            (edit, id)
        }
        Op::Duplicate { page, slot } => {
            let id = id_at(funnel, page, slot);
            let edit = match &id {
                Some(id) => mutation::duplicate_component(funnel, page, id),
                None => mutation::duplicate_component(funnel, page, "missing"),
            };
            (edit, None)
        }
        Op::Move { page, from, to } => (
            mutation::move_component(funnel, page, from, to),
            id_at(funnel, page, from),
        ),
        Op::Edit { page, slot } => {
            let id = id_at(funnel, page, slot);
            let patch = data_patch(json!({ "text": "edited", "content": "edited" }));
            let edit = match &id {
                Some(id) => mutation::update_component_data(funnel, page, id, &patch),
                None => mutation::update_component_data(funnel, page, "missing", &patch),
            };
            (edit, id)
        }
    }
}

fn check_stability(before: &Funnel, after: &Funnel, referenced: Option<&str>) {
    let old_ids = before.component_ids();

    for page_index in 0..before.page_count() {
        let keep = |id: &String| old_ids.contains(id) && Some(id.as_str()) != referenced;

        let expected: Vec<String> = page_order(before, page_index)
            .into_iter()
            .filter(|id| keep(id))
            .collect();
        let actual: Vec<String> = page_order(after, page_index)
            .into_iter()
            .filter(|id| keep(id))
            .collect();
        assert_eq!(actual, expected, "relative order changed on page {}", page_index);

        let before_page = before.page(page_index).unwrap();
        let after_page = after.page(page_index).unwrap();
        for id in &expected {
            assert_eq!(
                before_page.component(id),
                after_page.component(id),
                "component {} changed",
                id
            );
        }
    }
}

proptest! {
    #[test]
    fn unreferenced_components_are_stable(ops in prop::collection::vec(op_strategy(), 1..40)) {
        let mut funnel = quiz_funnel();

        for op in &ops {
            let (edit, referenced) = apply(&funnel, op);

            check_stability(&funnel, &edit.funnel, referenced.as_deref());
            prop_assert!(Validator::validate(&edit.funnel).is_valid());
            if edit.is_noop() {
                prop_assert_eq!(&edit.funnel, &funnel);
            }

            funnel = edit.funnel;
        }
    }

    #[test]
    fn fresh_ids_never_collide(adds in prop::collection::vec((0..3usize, 0..ComponentType::ALL.len()), 1..60)) {
        let mut funnel = quiz_funnel();
        let mut seen: HashSet<String> = funnel.component_ids();

        for (page, kind) in adds {
            let edit = mutation::add_component(&funnel, page, ComponentType::ALL[kind].as_str(), usize::MAX);
            let id = edit.created_component().map(str::to_string);
            prop_assert!(id.is_some());
            prop_assert!(seen.insert(id.unwrap_or_default()));
            funnel = edit.funnel;
        }
    }

    #[test]
    fn undo_redo_inverse_law(op in op_strategy()) {
        let start = quiz_funnel();
        let (edit, _) = apply(&start, &op);
        prop_assume!(!edit.is_noop());

        let mut history = History::new(start.clone());
        let applied = edit.funnel.clone();
        history.record(edit.funnel, FunnelEvent::new(edit.event.unwrap()));

        prop_assert_eq!(history.undo().cloned(), Some(start));
        prop_assert_eq!(history.redo().cloned(), Some(applied));
    }
}
