// Stored funnels come back exactly as they were written, prices included

#[path = "fixtures/sample_funnels.rs"]
mod fixtures;

use fixtures::quiz_funnel;
use funnel_editor::component::data_patch;
use funnel_editor::mutation;
use funnel_editor::persistence::{self, decode_funnel, encode_funnel};
use funnel_editor::{ComponentData, EditorConfig, Funnel, MemoryStore, RestoreSource};
use proptest::prelude::*;
use serde_json::json;

/// Quiz funnel with a price block at the top of the first page
fn priced_funnel(price: f64, original_price: f64) -> Funnel {
    let added = mutation::add_component(&quiz_funnel(), 0, "price", 0);
    let id = added.funnel.page(0).unwrap().components[0].id.clone();

    let patch = data_patch(json!({ "price": price, "originalPrice": original_price }));
    let edit = mutation::update_component_data(&added.funnel, 0, &id, &patch);
    assert!(!edit.is_noop());
    edit.funnel
}

fn stored_price(funnel: &Funnel) -> (f64, Option<f64>) {
    match &funnel.page(0).unwrap().components[0].data {
        ComponentData::Price(data) => (data.price, data.original_price),
        other => panic!("expected a price block, got {:?}", other),
    }
}

#[test]
fn test_discounted_cent_prices_survive_encoding() {
    for cents in 1..2000u32 {
        let price = f64::from(cents) / 100.0 * 0.85;
        let funnel = priced_funnel(price, f64::from(cents) / 100.0);

        let decoded = decode_funnel(&encode_funnel(&funnel).unwrap()).unwrap();
        assert_eq!(
            stored_price(&decoded).0.to_bits(),
            price.to_bits(),
            "price {} changed after a save",
            price
        );
        assert_eq!(decoded, funnel);
    }
}

proptest! {
    #[test]
    fn prop_encoded_funnel_decodes_to_itself(
        price in prop::num::f64::NORMAL | prop::num::f64::SUBNORMAL | prop::num::f64::ZERO,
        original in prop::num::f64::NORMAL | prop::num::f64::ZERO,
    ) {
        let funnel = priced_funnel(price, original);
        prop_assert_eq!(stored_price(&funnel), (price, Some(original)));

        let decoded = decode_funnel(&encode_funnel(&funnel).unwrap()).unwrap();
        prop_assert_eq!(&decoded, &funnel);
    }

    #[test]
    fn prop_saved_funnel_restores_to_itself(price in 0.0f64..1_000_000.0) {
        let funnel = priced_funnel(price, price * 2.0);
        let mut store = MemoryStore::new();
        persistence::save_all(&mut store, &funnel, &EditorConfig::default()).unwrap();

        let restored = persistence::restore(&store);
        prop_assert_eq!(restored.source, RestoreSource::Stored);
        prop_assert_eq!(&restored.funnel, &funnel);
    }
}
