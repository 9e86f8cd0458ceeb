//! The control tree backing one edit form.

use std::sync::Arc;

use indexmap::IndexMap;
use serde_json::{Map, Value};
use thiserror::Error;
use tracing::debug;

use crate::path;
use crate::schema::{FieldDescriptor, FieldKind, FieldLookup, TypeSchema};
use crate::validation::{ErrorKind, FieldRules, ValidationError};

/// Errors raised by user actions that address controls that do not exist.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum FormError {
    #[error("no control named '{0}'")]
    UnknownControl(String),

    #[error("no array field named '{0}'")]
    UnknownArray(String),

    #[error("item {index} out of range for '{array}' ({len} items)")]
    ItemOutOfRange { array: String, index: usize, len: usize },

    #[error("array '{array}' has no sub-field '{field}'")]
    UnknownItemField { array: String, field: String },
}

/// One leaf control: a value, its touched flag and its current errors.
#[derive(Debug, Clone, PartialEq)]
pub struct Control {
    value: Value,
    initial: Value,
    touched: bool,
    rules: FieldRules,
    errors: Vec<ErrorKind>,
}

impl Control {
    /// Create a control for `descriptor` holding `value`, validated immediately.
    pub fn new(descriptor: &FieldDescriptor, value: Value) -> Self {
        let rules = FieldRules {
            kind: descriptor.kind,
            options: descriptor.options.clone(),
            validators: descriptor.effective_validators(),
        };
        let errors = rules.check(&value);
        Self { initial: value.clone(), value, touched: false, rules, errors }
    }

    /// Create a control holding the kind's empty value.
    pub fn empty(descriptor: &FieldDescriptor) -> Self {
        Self::new(descriptor, descriptor.kind.empty_value())
    }

    pub fn value(&self) -> &Value {
        &self.value
    }

    /// Replace the value and revalidate.
    pub fn set_value(&mut self, value: Value) {
        self.errors = self.rules.check(&value);
        self.value = value;
    }

    /// Replace both the value and the baseline used by [`Control::is_dirty`].
    pub(crate) fn reset(&mut self, value: Value) {
        self.initial = value.clone();
        self.touched = false;
        self.set_value(value);
    }

    pub fn is_touched(&self) -> bool {
        self.touched
    }

    pub fn mark_touched(&mut self) {
        self.touched = true;
    }

    pub fn errors(&self) -> &[ErrorKind] {
        &self.errors
    }

    pub fn is_valid(&self) -> bool {
        self.errors.is_empty()
    }

    pub fn is_required(&self) -> bool {
        self.rules.is_required()
    }

    pub fn kind(&self) -> FieldKind {
        self.rules.kind
    }

    /// Whether the value differs from the populated one.
    pub fn is_dirty(&self) -> bool {
        self.value != self.initial
    }

    /// Value to write back onto the source record, `None` to leave it as is.
    ///
    /// Untouched values are never rewritten. An empty value is not written to
    /// a path the source record did not have.
    pub(crate) fn patch_value(&self, present: bool) -> Option<Value> {
        if !self.is_dirty() || (!present && path::is_empty(&self.value)) {
            return None;
        }
        Some(coerce(self.kind(), &self.value))
    }
}

/// The controls of one array item, keyed by sub-field path.
///
/// The group keeps the record it was read from so keys outside the schema
/// survive a save.
#[derive(Debug, Clone, PartialEq)]
pub struct ItemGroup {
    source: Value,
    controls: IndexMap<String, Control>,
}

impl ItemGroup {
    /// Build a fresh group, reading initial values from `source` when given.
    pub fn new(sub_fields: &[FieldDescriptor], source: Option<&Value>) -> Self {
        let source = source.cloned().unwrap_or_else(|| Value::Object(Map::new()));
        let controls = sub_fields
            .iter()
            .map(|sub| {
                let value = path::get(&source, &sub.path)
                    .cloned()
                    .unwrap_or_else(|| sub.kind.empty_value());
                (sub.path.clone(), Control::new(sub, value))
            })
            .collect();
        Self { source, controls }
    }

    pub fn control(&self, field: &str) -> Option<&Control> {
        self.controls.get(field)
    }

    pub fn control_mut(&mut self, field: &str) -> Option<&mut Control> {
        self.controls.get_mut(field)
    }

    pub fn controls(&self) -> impl Iterator<Item = (&str, &Control)> {
        self.controls.iter().map(|(k, v)| (k.as_str(), v))
    }

    pub fn is_valid(&self) -> bool {
        self.controls.values().all(Control::is_valid)
    }

    /// The source record with every edited sub-field written onto it.
    pub fn to_value(&self) -> Value {
        let mut item = self.source.clone();
        for (field, control) in &self.controls {
            let present = path::get(&self.source, field).is_some();
            if let Some(value) = control.patch_value(present) {
                path::set(&mut item, field, value);
            }
        }
        item
    }

    fn is_dirty(&self) -> bool {
        self.controls.values().any(Control::is_dirty)
    }

    fn mark_all_touched(&mut self) {
        self.controls.values_mut().for_each(Control::mark_touched);
    }
}

/// The control for one array field: an ordered list of item groups.
///
/// Items carry no stable key; their position is their identity.
#[derive(Debug, Clone, PartialEq)]
pub struct ArrayControl {
    descriptor: FieldDescriptor,
    pub(crate) items: Vec<ItemGroup>,
    pub(crate) reshaped: bool,
}

impl ArrayControl {
    /// Create an empty array control for `descriptor`.
    pub fn new(descriptor: &FieldDescriptor) -> Self {
        Self { descriptor: descriptor.clone(), items: Vec::new(), reshaped: false }
    }

    /// Layout of every item.
    pub fn sub_fields(&self) -> &[FieldDescriptor] {
        &self.descriptor.sub_fields
    }

    pub fn items(&self) -> &[ItemGroup] {
        &self.items
    }

    pub fn item(&self, index: usize) -> Option<&ItemGroup> {
        self.items.get(index)
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// Discard every item and rebuild one group per source element.
    pub(crate) fn rebuild(&mut self, source: &[Value]) {
        let sub_fields = &self.descriptor.sub_fields;
        self.items = source.iter().map(|item| ItemGroup::new(sub_fields, Some(item))).collect();
        self.reshaped = false;
    }

    /// The items as an array of records.
    pub fn to_value(&self) -> Value {
        Value::Array(self.items.iter().map(ItemGroup::to_value).collect())
    }

    /// Whether an item was added, removed or edited since population.
    pub fn is_dirty(&self) -> bool {
        self.reshaped || self.items.iter().any(ItemGroup::is_dirty)
    }
}

/// Control tree for one entity: flat leaf controls keyed by their full
/// dot-path, plus one [`ArrayControl`] per array field.
#[derive(Debug, Clone)]
pub struct FormModel {
    schema: Arc<TypeSchema>,
    pub(crate) controls: IndexMap<String, Control>,
    pub(crate) arrays: IndexMap<String, ArrayControl>,
    form_errors: Vec<ValidationError>,
}

impl FormModel {
    pub(crate) fn from_parts(
        schema: Arc<TypeSchema>,
        controls: IndexMap<String, Control>,
        arrays: IndexMap<String, ArrayControl>,
    ) -> Self {
        let mut form = Self { schema, controls, arrays, form_errors: Vec::new() };
        form.refresh_form_errors();
        form
    }

    pub fn schema(&self) -> &Arc<TypeSchema> {
        &self.schema
    }

    pub fn control(&self, path: &str) -> Option<&Control> {
        self.controls.get(path)
    }

    /// Leaf controls in schema order.
    pub fn controls(&self) -> impl Iterator<Item = (&str, &Control)> {
        self.controls.iter().map(|(k, v)| (k.as_str(), v))
    }

    pub fn array(&self, path: &str) -> Option<&ArrayControl> {
        self.arrays.get(path)
    }

    /// Array controls in schema order.
    pub fn arrays(&self) -> impl Iterator<Item = (&str, &ArrayControl)> {
        self.arrays.iter().map(|(k, v)| (k.as_str(), v))
    }

    pub fn value(&self, path: &str) -> Option<&Value> {
        self.controls.get(path).map(Control::value)
    }

    pub fn item_value(&self, array: &str, index: usize, field: &str) -> Option<&Value> {
        self.arrays.get(array)?.item(index)?.control(field).map(Control::value)
    }

    pub fn array_len(&self, path: &str) -> Option<usize> {
        self.arrays.get(path).map(ArrayControl::len)
    }

    /// Errors from the type's cross-field rules, as of the last mutation.
    pub fn form_errors(&self) -> &[ValidationError] {
        &self.form_errors
    }

    /// Whether any value or array length changed since population.
    pub fn is_dirty(&self) -> bool {
        self.controls.values().any(Control::is_dirty)
            || self.arrays.values().any(ArrayControl::is_dirty)
    }

    /// Set a leaf control's value.
    pub fn set_value(&mut self, path: &str, value: Value) -> Result<(), FormError> {
        let control = self
            .controls
            .get_mut(path)
            .ok_or_else(|| FormError::UnknownControl(path.to_string()))?;
        debug!("set {} = {}", path, value);
        control.set_value(value);
        self.refresh_form_errors();
        Ok(())
    }

    /// Mark a leaf control as touched.
    pub fn touch(&mut self, path: &str) -> Result<(), FormError> {
        self.controls
            .get_mut(path)
            .ok_or_else(|| FormError::UnknownControl(path.to_string()))?
            .mark_touched();
        Ok(())
    }

    /// Set a control inside array item `index`.
    pub fn set_item_value(
        &mut self,
        array: &str,
        index: usize,
        field: &str,
        value: Value,
    ) -> Result<(), FormError> {
        debug!("set {}[{}].{} = {}", array, index, field, value);
        self.item_control_mut(array, index, field)?.set_value(value);
        self.refresh_form_errors();
        Ok(())
    }

    /// Mark a control inside array item `index` as touched.
    pub fn touch_item(&mut self, array: &str, index: usize, field: &str) -> Result<(), FormError> {
        self.item_control_mut(array, index, field)?.mark_touched();
        Ok(())
    }

    /// Mark every control, including item controls, as touched.
    pub fn mark_all_touched(&mut self) {
        self.controls.values_mut().for_each(Control::mark_touched);
        for array in self.arrays.values_mut() {
            array.items.iter_mut().for_each(ItemGroup::mark_all_touched);
        }
    }

    fn item_control_mut(
        &mut self,
        array: &str,
        index: usize,
        field: &str,
    ) -> Result<&mut Control, FormError> {
        let control = self
            .arrays
            .get_mut(array)
            .ok_or_else(|| FormError::UnknownArray(array.to_string()))?;
        let len = control.len();
        control
            .items
            .get_mut(index)
            .ok_or_else(|| FormError::ItemOutOfRange { array: array.to_string(), index, len })?
            .control_mut(field)
            .ok_or_else(|| FormError::UnknownItemField {
                array: array.to_string(),
                field: field.to_string(),
            })
    }

    /// Recompute the cross-field errors from the current values.
    pub(crate) fn refresh_form_errors(&mut self) {
        let errors = match self.schema.form_validator() {
            Some(validator) => validator.validate(&*self),
            None => Vec::new(),
        };
        self.form_errors = errors;
    }
}

impl FieldLookup for FormModel {
    fn field(&self, path: &str) -> Option<&Value> {
        self.value(path)
    }

    fn item_values(&self, array: &str, field: &str) -> Vec<&Value> {
        match self.arrays.get(array) {
            Some(control) => control
                .items
                .iter()
                .filter_map(|item| item.control(field).map(Control::value))
                .collect(),
            None => Vec::new(),
        }
    }
}

/// Convert a control value to the shape stored in records.
///
/// Number controls holding numeric text are stored as numbers.
pub(crate) fn coerce(kind: FieldKind, value: &Value) -> Value {
    if kind == FieldKind::Number
        && let Value::String(s) = value
        && let Some(n) = path::as_number(value)
    {
        let trimmed = s.trim();
        if let Ok(i) = trimmed.parse::<i64>() {
            return Value::from(i);
        }
        return Value::from(n);
    }
    value.clone()
}
