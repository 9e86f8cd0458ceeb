//! Building forms from schemas and entities, and patching entities back.

use std::sync::Arc;

use indexmap::IndexMap;
use serde_json::Value;
use tracing::debug;

use super::control::{ArrayControl, Control, FormModel};
use crate::entity::Entity;
use crate::schema::{SchemaRegistry, TypeSchema};

/// Build an empty form for `schema`: one leaf control per scalar field and one
/// empty array control per array field.
pub fn assemble(schema: Arc<TypeSchema>) -> FormModel {
    let controls: IndexMap<String, Control> = schema
        .scalar_fields()
        .map(|field| (field.path.clone(), Control::empty(field)))
        .collect();
    let arrays: IndexMap<String, ArrayControl> = schema
        .array_fields()
        .map(|field| (field.path.clone(), ArrayControl::new(field)))
        .collect();
    FormModel::from_parts(schema, controls, arrays)
}

/// Load an entity's values into `form`.
///
/// Scalar controls take the value at their path, or the empty string when it
/// is absent. Array controls are rebuilt from scratch, one group per source
/// element; groups from earlier passes are discarded. Cross-field errors are
/// recomputed once at the end.
pub fn populate(form: &mut FormModel, entity: &Entity) {
    let schema = Arc::clone(form.schema());

    for field in schema.scalar_fields() {
        let value =
            entity.get(&field.path).cloned().unwrap_or_else(|| Value::String(String::new()));
        if let Some(control) = form.controls.get_mut(&field.path) {
            control.reset(value);
        }
    }

    for field in schema.array_fields() {
        let source = match entity.get(&field.path) {
            Some(Value::Array(items)) => items.as_slice(),
            _ => &[],
        };
        if let Some(array) = form.arrays.get_mut(&field.path) {
            array.rebuild(source);
            debug!("populated {} with {} item(s)", field.path, array.len());
        }
    }

    form.refresh_form_errors();
}

/// Resolve the entity's schema, assemble its form and populate it.
pub fn build(registry: &SchemaRegistry, entity: &Entity) -> FormModel {
    let schema = registry.resolve(entity.type_name());
    let mut form = assemble(schema);
    populate(&mut form, entity);
    form
}

/// Write the form's edits onto a copy of `original`.
///
/// Controls whose value is unchanged since population leave the record
/// alone, so an untouched form patches to an identical record. An edited
/// array field is written back in its current order, each item starting from
/// the record it was read from.
pub fn patch_entity(form: &FormModel, original: &Entity) -> Entity {
    let mut patched = original.clone();

    for (field, control) in form.controls() {
        if let Some(value) = control.patch_value(original.get(field).is_some()) {
            patched.set(field, value);
        }
    }

    for (field, array) in form.arrays() {
        if !array.is_dirty() || (original.get(field).is_none() && array.is_empty()) {
            continue;
        }
        patched.set(field, array.to_value());
    }

    patched
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn splitter() -> Entity {
        Entity::from_value(json!({
            "id": "s-1",
            "type": "splitter",
            "name": "SPL-01",
            "status": "active",
            "metadata": {"splitRatio": "1:8", "outputPorts": 8}
        }))
        .unwrap()
    }

    #[test]
    fn test_assemble_creates_controls_in_schema_order() {
        let registry = SchemaRegistry::builtin();
        let form = assemble(registry.resolve("olt"));
        let paths: Vec<&str> = form.controls().map(|(p, _)| p).take(5).collect();
        assert_eq!(paths, vec!["name", "code", "description", "status", "metadata.vendor"]);
        assert_eq!(form.array_len("metadata.cards"), Some(0));
        assert!(form.control("metadata.cards").is_none());
    }

    #[test]
    fn test_dotted_path_is_one_flat_control() {
        let registry = SchemaRegistry::builtin();
        let entity = Entity::new("n-1", "ont")
            .with("metadata.bandwidth.downstreamCapacity", json!(2500));
        let form = build(&registry, &entity);

        assert_eq!(form.value("metadata.bandwidth.downstreamCapacity"), Some(&json!(2500)));
        assert!(form.control("metadata").is_none());
        assert!(form.control("metadata.bandwidth").is_none());
    }

    #[test]
    fn test_absent_values_default_to_empty_string() {
        let registry = SchemaRegistry::builtin();
        let form = build(&registry, &splitter());
        assert_eq!(form.value("code"), Some(&json!("")));
        assert_eq!(form.value("metadata.insertionLoss"), Some(&json!("")));
    }

    #[test]
    fn test_populate_rebuilds_arrays() {
        let registry = SchemaRegistry::builtin();
        let entity = Entity::new("o-1", "olt")
            .with("metadata.cards", json!([{"slot": 0, "model": "A"}, {"slot": 1, "model": "B"}]));
        let mut form = build(&registry, &entity);
        assert_eq!(form.array_len("metadata.cards"), Some(2));

        let shorter =
            Entity::new("o-1", "olt").with("metadata.cards", json!([{"slot": 4, "model": "C"}]));
        populate(&mut form, &shorter);
        assert_eq!(form.array_len("metadata.cards"), Some(1));
        assert_eq!(form.item_value("metadata.cards", 0, "slot"), Some(&json!(4)));
    }

    #[test]
    fn test_patch_without_edits_is_identity() {
        let registry = SchemaRegistry::builtin();
        let entity = splitter();
        let form = build(&registry, &entity);
        assert_eq!(patch_entity(&form, &entity), entity);
    }

    #[test]
    fn test_patch_writes_nested_paths() {
        let registry = SchemaRegistry::builtin();
        let entity = splitter();
        let mut form = build(&registry, &entity);
        form.set_value("metadata.outputPorts", json!("16")).unwrap();
        form.set_value("metadata.splitRatio", json!("1:16")).unwrap();

        let patched = patch_entity(&form, &entity);
        assert_eq!(patched.get("metadata.outputPorts"), Some(&json!(16)));
        assert_eq!(patched.get("metadata.splitRatio"), Some(&json!("1:16")));
        assert_eq!(patched.id(), "s-1");
    }

    #[test]
    fn test_untouched_numeric_text_is_kept() {
        let registry = SchemaRegistry::builtin();
        let entity = splitter().with("metadata.outputPorts", json!("8"));
        let form = build(&registry, &entity);

        let patched = patch_entity(&form, &entity);
        assert_eq!(patched.get("metadata.outputPorts"), Some(&json!("8")));
        assert_eq!(patched, entity);
    }

    #[test]
    fn test_array_items_keep_undeclared_keys() {
        let registry = SchemaRegistry::builtin();
        let entity = Entity::new("c-1", "cable")
            .with("metadata.fibers", json!([{"number": 1, "id": "f-77"}, {"number": 2}]));
        let mut form = build(&registry, &entity);
        assert_eq!(patch_entity(&form, &entity), entity);

        form.set_item_value("metadata.fibers", 0, "color", json!("blue")).unwrap();
        form.remove_item("metadata.fibers", 1).unwrap();
        let patched = patch_entity(&form, &entity);
        assert_eq!(
            patched.get("metadata.fibers"),
            Some(&json!([{"number": 1, "id": "f-77", "color": "blue"}]))
        );
    }

    #[test]
    fn test_added_item_writes_only_filled_fields() {
        let registry = SchemaRegistry::builtin();
        let entity = Entity::new("o-1", "olt");
        let mut form = build(&registry, &entity);

        let index = form.add_item("metadata.cards").unwrap();
        form.set_item_value("metadata.cards", index, "slot", json!("3")).unwrap();
        form.set_item_value("metadata.cards", index, "model", json!("GPHF")).unwrap();

        let patched = patch_entity(&form, &entity);
        assert_eq!(patched.get("metadata.cards"), Some(&json!([{"slot": 3, "model": "GPHF"}])));
        assert!(patched.get("metadata.totalPorts").is_none());
    }
}
