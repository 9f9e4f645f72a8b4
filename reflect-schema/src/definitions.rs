//! Named definitions collected during one generation pass
//!
//! Composite named types are registered under their display name and
//! referenced as `#/$defs/<name>`. Registration happens before a type's
//! fields are walked, so a type that reaches itself again finds its own
//! entry and gets a reference instead of recursing.

use std::any::TypeId;
use std::collections::HashMap;

use crate::reflector::NamerFn;
use crate::schema::{Definitions, Schema};
use crate::types::Type;

/// Per-pass registry of named definitions
pub(crate) struct DefinitionRegistry<'a> {
    definitions: Definitions,
    owners: HashMap<String, TypeId>,
    namer: Option<&'a NamerFn>,
    inline: bool,
}

impl<'a> DefinitionRegistry<'a> {
    /// With `inline` set every operation is a no-op and nothing is referenced
    pub(crate) fn new(namer: Option<&'a NamerFn>, inline: bool) -> Self {
        Self {
            definitions: Definitions::new(),
            owners: HashMap::new(),
            namer,
            inline,
        }
    }

    /// Display name of `ty`: the namer's answer if non-empty, else the descriptor name
    pub(crate) fn name_of(&self, ty: &Type) -> String {
        if let Some(namer) = self.namer {
            let name = namer(ty);
            if !name.is_empty() {
                return name;
            }
        }
        ty.name().to_string()
    }

    /// Hold the type's name before its schema is built
    ///
    /// Returns the reserved name, or `None` when the type cannot be registered.
    pub(crate) fn reserve(&mut self, ty: &Type) -> Option<String> {
        if self.inline {
            return None;
        }
        let name = self.name_of(ty);
        if name.is_empty() {
            return None;
        }
        self.store(&name, ty, Schema::default());
        Some(name)
    }

    /// Store the finished schema for `ty` under `name` and reference it
    pub(crate) fn define(&mut self, name: &str, ty: &Type, schema: Schema) -> Schema {
        if self.inline || name.is_empty() {
            return schema;
        }
        self.store(name, ty, schema);
        Schema::definition_ref(name)
    }

    /// Register `ty` under its own name; hands the schema back when unnamed
    pub(crate) fn define_type(&mut self, ty: &Type, schema: Schema) -> Schema {
        let name = self.name_of(ty);
        self.define(&name, ty, schema)
    }

    /// Reference to the entry for `ty`, if one exists
    pub(crate) fn reference(&self, ty: &Type) -> Option<Schema> {
        if self.inline {
            return None;
        }
        let name = self.name_of(ty);
        if name.is_empty() || !self.definitions.contains_key(&name) {
            return None;
        }
        Some(Schema::definition_ref(&name))
    }

    pub(crate) fn into_definitions(self) -> Definitions {
        self.definitions
    }

    fn store(&mut self, name: &str, ty: &Type, schema: Schema) {
        if let Some(owner) = self.owners.insert(name.to_string(), ty.id()) {
            if owner != ty.id() {
                tracing::debug!(
                    name,
                    type_name = ty.rust_name(),
                    "definition name collision, overwriting"
                );
            }
        }
        self.definitions.insert(name.to_string(), schema);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::schema::{InstanceType, SchemaObject};
    use crate::types::{Kind, TypeInfo};

    struct Account;
    struct Ledger;

    fn named<T: 'static>(name: &'static str) -> Type {
        Type::from_info(TypeInfo::of::<T>(Kind::Struct(Vec::new())).with_name(name))
    }

    #[test]
    fn test_reserve_then_reference() {
        let ty = named::<Account>("Account");
        let mut registry = DefinitionRegistry::new(None, false);

        assert!(registry.reference(&ty).is_none());
        assert_eq!(registry.reserve(&ty).as_deref(), Some("Account"));
        assert_eq!(registry.reference(&ty), Some(Schema::definition_ref("Account")));
    }

    #[test]
    fn test_define_replaces_placeholder() {
        let ty = named::<Account>("Account");
        let mut registry = DefinitionRegistry::new(None, false);
        let name = registry.reserve(&ty).unwrap();

        let schema: Schema = SchemaObject::with_type(InstanceType::Object).into();
        let reference = registry.define(&name, &ty, schema.clone());

        assert_eq!(reference, Schema::definition_ref("Account"));
        assert_eq!(registry.into_definitions().get("Account"), Some(&schema));
    }

    #[test]
    fn test_unnamed_types_are_not_registered() {
        let ty = Type::of::<Vec<String>>();
        let mut registry = DefinitionRegistry::new(None, false);

        assert!(registry.reserve(&ty).is_none());
        let schema = Schema::Bool(true);
        assert_eq!(registry.define_type(&ty, schema.clone()), schema);
        assert!(registry.into_definitions().is_empty());
    }

    #[test]
    fn test_inline_mode_is_noop() {
        let ty = named::<Account>("Account");
        let mut registry = DefinitionRegistry::new(None, true);

        assert!(registry.reserve(&ty).is_none());
        assert!(registry.reference(&ty).is_none());
        let schema = Schema::Bool(true);
        assert_eq!(registry.define("Account", &ty, schema.clone()), schema);
        assert!(registry.into_definitions().is_empty());
    }

    #[test]
    fn test_namer_overrides_name() {
        let namer = |ty: &Type| format!("Renamed{}", ty.name());
        let ty = named::<Account>("Account");
        let registry = DefinitionRegistry::new(Some(&namer), false);
        assert_eq!(registry.name_of(&ty), "RenamedAccount");
    }

    #[test]
    fn test_collision_overwrites() {
        let first = named::<Account>("Shared");
        let second = named::<Ledger>("Shared");
        let mut registry = DefinitionRegistry::new(None, false);

        registry.define_type(&first, Schema::Bool(true));
        registry.define_type(&second, Schema::Bool(false));

        let definitions = registry.into_definitions();
        assert_eq!(definitions.len(), 1);
        assert_eq!(definitions.get("Shared"), Some(&Schema::Bool(false)));
    }
}
