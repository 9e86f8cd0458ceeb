use netform_core::entity::Entity;
use netform_core::form::{build, patch_entity};
use netform_core::schema::SchemaRegistry;
use netform_core::validation::{ErrorKind, ErrorScope, aggregate};
use rstest::rstest;
use serde_json::{Value, json};

fn olt() -> Entity {
    Entity::from_value(json!({
        "id": "olt-7",
        "type": "olt",
        "name": "Central OLT",
        "status": "active",
        "createdAt": "2024-03-01",
        "metadata": {
            "vendor": "Huawei",
            "model": "MA5800",
            "totalPorts": 16,
            "uplinkPorts": 4,
            "cards": [
                {"slot": 1, "model": "GPHF", "ports": 8}
            ],
            "firmware": {"version": "R021"}
        }
    }))
    .unwrap()
}

#[test]
fn untouched_form_patches_to_identity() {
    let registry = SchemaRegistry::builtin();
    let entity = olt();
    let form = build(&registry, &entity);

    assert!(aggregate(&form).can_submit());
    assert!(!form.is_dirty());
    assert_eq!(patch_entity(&form, &entity), entity);
}

#[test]
fn untouched_sparse_items_patch_to_identity() {
    let registry = SchemaRegistry::builtin();
    let entity = Entity::from_value(json!({
        "id": "c-9",
        "type": "cable",
        "name": "Drop 9",
        "status": "active",
        "metadata": {
            "sourceId": "spl-1",
            "targetId": "ont-4",
            "fibers": [
                {"number": 1, "id": "f-77"},
                {"number": 2, "color": "orange", "spliceTray": 3}
            ]
        }
    }))
    .unwrap();
    let form = build(&registry, &entity);

    assert!(!form.is_dirty());
    assert_eq!(patch_entity(&form, &entity), entity);
}

#[test]
fn untouched_numeric_text_patches_to_identity() {
    let registry = SchemaRegistry::builtin();
    let entity = Entity::new("s-2", "splitter")
        .with("name", json!("S2"))
        .with("status", json!("active"))
        .with("metadata.splitRatio", json!("1:8"))
        .with("metadata.outputPorts", json!("8"));
    let form = build(&registry, &entity);

    assert!(form.form_errors().is_empty());
    let patched = patch_entity(&form, &entity);
    assert_eq!(patched.get("metadata.outputPorts"), Some(&json!("8")));
    assert_eq!(patched, entity);
}

#[test]
fn filling_name_allows_submission() {
    let registry = SchemaRegistry::builtin();
    let entity = Entity::new("c-3", "cable")
        .with("status", json!("active"))
        .with("metadata.sourceId", json!("olt-1"))
        .with("metadata.targetId", json!("spl-2"));
    let mut form = build(&registry, &entity);

    let summary = aggregate(&form);
    assert!(!summary.can_submit());
    assert!(summary.visible().is_empty());

    form.set_value("name", json!("Feeder 3")).unwrap();
    let summary = aggregate(&form);
    assert!(summary.is_empty());
    assert!(summary.can_submit());
}

#[test]
fn edits_land_on_nested_paths_and_keep_unknown_keys() {
    let registry = SchemaRegistry::builtin();
    let entity = olt();
    let mut form = build(&registry, &entity);

    form.set_value("metadata.optical.txPower", json!("5.5")).unwrap();
    form.set_item_value("metadata.cards", 0, "ports", json!(10)).unwrap();
    assert!(form.is_dirty());

    let patched = patch_entity(&form, &entity);
    assert_eq!(patched.get("metadata.optical.txPower"), Some(&json!(5.5)));
    assert_eq!(patched.get("metadata.cards.0.ports"), Some(&json!(10)));
    assert_eq!(patched.get("metadata.firmware.version"), Some(&json!("R021")));
    assert_eq!(patched.get("createdAt"), Some(&json!("2024-03-01")));
    assert_eq!(patched.id(), "olt-7");
}

#[test]
fn port_budget_tracks_items() {
    let registry = SchemaRegistry::builtin();
    let mut form = build(&registry, &olt());

    let index = form.add_item("metadata.cards").unwrap();
    form.set_item_value("metadata.cards", index, "slot", json!(2)).unwrap();
    form.set_item_value("metadata.cards", index, "model", json!("GPHF")).unwrap();
    form.set_item_value("metadata.cards", index, "ports", json!(8)).unwrap();

    let summary = aggregate(&form);
    let form_errors = summary.by_scope(ErrorScope::Form);
    assert_eq!(form_errors.len(), 1);
    assert_eq!(form_errors[0].kind, ErrorKind::UsedPortsExceeded { actual: 20, max: 16 });
    assert_eq!(form_errors[0].path, "metadata.cards");
    assert!(!summary.can_submit());

    form.remove_item("metadata.cards", index).unwrap();
    assert!(aggregate(&form).can_submit());
}

#[rstest]
#[case(json!("1:8"), json!(8), None)]
#[case(json!("1:16"), json!(8), Some(ErrorKind::InvalidSplitRatio { actual: 8, expected: 16 }))]
#[case(json!(""), json!(8), None)]
fn splitter_ratio_consistency(
    #[case] ratio: Value,
    #[case] outputs: Value,
    #[case] expected: Option<ErrorKind>,
) {
    let registry = SchemaRegistry::builtin();
    let entity = Entity::new("s-1", "splitter")
        .with("name", json!("S1"))
        .with("status", json!("active"))
        .with("metadata.splitRatio", ratio)
        .with("metadata.outputPorts", outputs);
    let form = build(&registry, &entity);

    let kinds: Vec<ErrorKind> = form.form_errors().iter().map(|e| e.kind.clone()).collect();
    assert_eq!(kinds, expected.into_iter().collect::<Vec<_>>());
}

#[test]
fn unknown_type_gets_common_fields_only() {
    let registry = SchemaRegistry::builtin();
    let entity = Entity::new("x-1", "antenna")
        .with("name", json!("Mast"))
        .with("status", json!("planned"))
        .with("metadata.height", json!(30));
    let form = build(&registry, &entity);

    let paths: Vec<&str> = form.controls().map(|(path, _)| path).collect();
    assert_eq!(paths, vec!["name", "code", "description", "status"]);
    assert_eq!(form.arrays().count(), 0);
    assert_eq!(patch_entity(&form, &entity), entity);
}

#[test]
fn invalid_number_text_blocks_submission() {
    let registry = SchemaRegistry::builtin();
    let mut form = build(&registry, &olt());

    form.set_value("metadata.totalPorts", json!("sixteen")).unwrap();
    form.touch("metadata.totalPorts").unwrap();

    let summary = aggregate(&form);
    let visible = summary.visible();
    assert_eq!(visible.len(), 1);
    assert_eq!(visible[0].path, "metadata.totalPorts");
    assert!(matches!(visible[0].kind, ErrorKind::NotANumber { .. }));
}
