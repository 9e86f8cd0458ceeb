//! Type schemas and the registry that resolves them by element type.

use std::collections::{HashMap, HashSet};
use std::sync::Arc;

use indexmap::IndexMap;
use tracing::{debug, warn};

use super::builtin;
use super::descriptor::{FieldDescriptor, Validator};
use super::discovery::SchemaRepository;
use super::errors::SchemaError;
use super::rules::{FormRule, FormValidator};
use crate::config::types::ResolvedConfig;
use crate::entity::ElementType;

/// Editable layout of one element type.
///
/// The four common fields always come first, followed by the type's own
/// fields in declaration order.
#[derive(Debug, Clone, PartialEq)]
pub struct TypeSchema {
    element_type: Option<ElementType>,
    fields: Vec<FieldDescriptor>,
    form_validator: FormValidator,
}

impl TypeSchema {
    /// Build and check a schema from the type's own fields and rules.
    pub fn new(
        element_type: ElementType,
        fields: Vec<FieldDescriptor>,
        rules: Vec<FormRule>,
    ) -> Result<Self, SchemaError> {
        let schema = Self::from_parts(Some(element_type), fields, rules);
        schema.check()?;
        Ok(schema)
    }

    /// Schema used for unrecognised types: the common fields only.
    pub fn fallback() -> Self {
        Self::from_parts(None, Vec::new(), Vec::new())
    }

    pub(crate) fn from_parts(
        element_type: Option<ElementType>,
        fields: Vec<FieldDescriptor>,
        rules: Vec<FormRule>,
    ) -> Self {
        let mut all = builtin::common_fields();
        all.extend(fields);
        Self { element_type, fields: all, form_validator: FormValidator::new(rules) }
    }

    /// `None` for the fallback schema.
    pub fn element_type(&self) -> Option<ElementType> {
        self.element_type
    }

    pub fn is_fallback(&self) -> bool {
        self.element_type.is_none()
    }

    /// All descriptors, common fields first.
    pub fn fields(&self) -> &[FieldDescriptor] {
        &self.fields
    }

    /// Descriptor for a top-level path.
    pub fn field(&self, path: &str) -> Option<&FieldDescriptor> {
        self.fields.iter().find(|f| f.path == path)
    }

    /// Non-array descriptors.
    pub fn scalar_fields(&self) -> impl Iterator<Item = &FieldDescriptor> {
        self.fields.iter().filter(|f| !f.is_array())
    }

    /// Array descriptors.
    pub fn array_fields(&self) -> impl Iterator<Item = &FieldDescriptor> {
        self.fields.iter().filter(|f| f.is_array())
    }

    /// Effective validators keyed by scalar path, in field order.
    pub fn validators(&self) -> IndexMap<String, Vec<Validator>> {
        self.scalar_fields().map(|f| (f.path.clone(), f.effective_validators())).collect()
    }

    /// The cross-field validator, if the type declares any rules.
    pub fn form_validator(&self) -> Option<&FormValidator> {
        (!self.form_validator.is_empty()).then_some(&self.form_validator)
    }

    /// Check the structural invariants of the schema.
    fn check(&self) -> Result<(), SchemaError> {
        check_fields(&self.fields)?;

        for rule in &self.form_validator.rules {
            for path in rule.referenced_paths() {
                if self.field(path).is_none() {
                    return Err(SchemaError::UnknownRulePath(path.to_string()));
                }
            }
            for (array, sub) in rule.item_references() {
                let declared = self.field(array).is_some_and(|f| {
                    f.is_array() && f.sub_fields.iter().any(|s| s.path == sub)
                });
                if !declared {
                    return Err(SchemaError::UnknownRulePath(format!("{array}.{sub}")));
                }
            }
        }
        Ok(())
    }
}

fn check_fields(fields: &[FieldDescriptor]) -> Result<(), SchemaError> {
    let mut seen = HashSet::new();
    for field in fields {
        if field.path.trim().is_empty() {
            return Err(SchemaError::EmptyPath { label: field.label.clone() });
        }
        if !seen.insert(field.path.as_str()) {
            return Err(SchemaError::DuplicatePath(field.path.clone()));
        }
        if field.is_array() {
            if field.sub_fields.is_empty() {
                return Err(SchemaError::EmptyArray(field.path.clone()));
            }
            if let Err(e) = check_fields(&field.sub_fields) {
                return Err(match e {
                    SchemaError::DuplicatePath(sub) => {
                        SchemaError::DuplicatePath(format!("{}.{}", field.path, sub))
                    }
                    other => other,
                });
            }
        } else if !field.sub_fields.is_empty() {
            return Err(SchemaError::UnexpectedSubFields(field.path.clone()));
        }
    }
    Ok(())
}

/// Registry of type schemas, shared read-only by every edit session.
#[derive(Debug)]
pub struct SchemaRegistry {
    schemas: HashMap<ElementType, Arc<TypeSchema>>,
    fallback: Arc<TypeSchema>,
}

impl Default for SchemaRegistry {
    fn default() -> Self {
        Self { schemas: HashMap::new(), fallback: Arc::new(TypeSchema::fallback()) }
    }
}

impl SchemaRegistry {
    /// Create an empty registry; every lookup falls back.
    pub fn new() -> Self {
        Self::default()
    }

    /// Registry with the built-in schema of every element type.
    pub fn builtin() -> Self {
        let mut registry = Self::new();
        for element_type in ElementType::ALL {
            registry
                .schemas
                .insert(element_type, Arc::new(builtin::schema(element_type)));
        }
        registry
    }

    /// Built-in schemas plus overrides from the configured schema directory.
    pub fn from_config(config: &ResolvedConfig) -> Result<Self, SchemaError> {
        let registry = Self::builtin();
        match &config.schemas_dir {
            Some(dir) => registry.with_overrides(&SchemaRepository::new(dir)?),
            None => Ok(registry),
        }
    }

    /// Replace schemas with every definition found in `repo`.
    pub fn with_overrides(mut self, repo: &SchemaRepository) -> Result<Self, SchemaError> {
        for schema in repo.load_all()? {
            self.register(schema)?;
        }
        Ok(self)
    }

    /// Register a schema, replacing any previous one for the same type.
    pub fn register(&mut self, schema: TypeSchema) -> Result<(), SchemaError> {
        let element_type = schema.element_type.ok_or(SchemaError::Untyped)?;
        if self.schemas.insert(element_type, Arc::new(schema)).is_some() {
            debug!("replaced schema for '{}'", element_type);
        }
        Ok(())
    }

    /// Schema registered for a type, without fallback.
    pub fn get(&self, element_type: ElementType) -> Option<Arc<TypeSchema>> {
        self.schemas.get(&element_type).cloned()
    }

    /// Resolve a raw type tag, falling back to the common-fields schema.
    pub fn resolve(&self, type_name: &str) -> Arc<TypeSchema> {
        Arc::clone(self.lookup(type_name))
    }

    /// Fields for a raw type tag.
    pub fn fields_for(&self, type_name: &str) -> &[FieldDescriptor] {
        self.lookup(type_name).fields()
    }

    /// Scalar validators for a raw type tag.
    pub fn validators_for(&self, type_name: &str) -> IndexMap<String, Vec<Validator>> {
        self.lookup(type_name).validators()
    }

    /// Cross-field validator for a raw type tag.
    pub fn form_validator_for(&self, type_name: &str) -> Option<&FormValidator> {
        self.lookup(type_name).form_validator()
    }

    /// Registered element types, sorted.
    pub fn types(&self) -> Vec<ElementType> {
        let mut types: Vec<ElementType> = self.schemas.keys().copied().collect();
        types.sort();
        types
    }

    pub fn len(&self) -> usize {
        self.schemas.len()
    }

    pub fn is_empty(&self) -> bool {
        self.schemas.is_empty()
    }

    fn lookup(&self, type_name: &str) -> &Arc<TypeSchema> {
        let found = type_name
            .parse::<ElementType>()
            .ok()
            .and_then(|t| self.schemas.get(&t));
        match found {
            Some(schema) => schema,
            None => {
                warn!("no schema for element type '{}', using common fields only", type_name);
                &self.fallback
            }
        }
    }
}
