//! Recursive type walker
//!
//! Resolution order for every type (after pointer dereferencing):
//!
//! 1. external id from the `lookup` hook → bare `$ref`
//! 2. existing definition → `$ref`
//! 3. alias capability → the alias type, resolved instead
//! 4. `mapper` hook → its schema, verbatim
//! 5. custom schema capability → registered, then referenced
//! 6. dual enum and well-known leaf types → fixed schemas
//! 7. kind dispatch (struct, sequence, array, map, primitives)
//! 8. extend capability, then registration or a final registry lookup

use std::any::TypeId;

use crate::definitions::DefinitionRegistry;
use crate::error::{ReflectError, Result};
use crate::keywords::apply_field_keywords;
use crate::properties::Properties;
use crate::reflector::Reflector;
use crate::schema::{Definitions, InstanceType, Schema, SchemaObject};
use crate::tags::FieldTags;
use crate::types::{Field, IntKind, Kind, Type, TypeFn};

/// Pattern accepted for integer-keyed map keys
pub const INTEGER_KEY_PATTERN: &str = "^[0-9]+$";

/// How a struct field contributes to its parent's schema
#[derive(Debug, Clone, PartialEq, Eq)]
enum FieldRole {
    Skip,
    Embed,
    Property {
        name: String,
        required: bool,
        nullable: bool,
    },
}

/// State of one generation pass
pub(crate) struct Walker<'r> {
    reflector: &'r Reflector,
    registry: DefinitionRegistry<'r>,
    name_tag: &'r str,
    /// Unregistered types whose schema is being built, innermost last
    expanding: Vec<TypeId>,
    /// Embedded structs being flattened, innermost last
    flattening: Vec<TypeId>,
}

impl<'r> Walker<'r> {
    pub(crate) fn new(reflector: &'r Reflector) -> Self {
        Self {
            reflector,
            registry: DefinitionRegistry::new(
                reflector.namer.as_deref(),
                reflector.do_not_reference,
            ),
            name_tag: reflector.name_tag(),
            expanding: Vec::new(),
            flattening: Vec::new(),
        }
    }

    pub(crate) fn display_name(&self, ty: &Type) -> String {
        self.registry.name_of(ty)
    }

    pub(crate) fn into_definitions(self) -> Definitions {
        self.registry.into_definitions()
    }

    /// Reference `ty` if it is known, reflect it otherwise
    pub(crate) fn resolve(&mut self, ty: &Type) -> Result<Schema> {
        let ty = ty.deref();

        if let Some(lookup) = self.reflector.lookup.as_deref() {
            let id = lookup(&ty);
            if !id.is_empty() {
                return Ok(Schema::new_ref(id.as_str()));
            }
        }

        if let Some(reference) = self.registry.reference(&ty) {
            return Ok(reference);
        }

        self.reflect_type(&ty)
    }

    /// Build the schema of `ty`, registering it when it is a named composite
    pub(crate) fn reflect_type(&mut self, ty: &Type) -> Result<Schema> {
        let ty = ty.deref();
        let capabilities = ty.capabilities();

        if let Some(alias) = capabilities.alias {
            return self.resolve(&alias());
        }

        if let Some(mapper) = self.reflector.mapper.as_deref() {
            if let Some(schema) = mapper(&ty) {
                return Ok(schema);
            }
        }

        if let Some(custom_schema) = capabilities.custom_schema {
            let schema = custom_schema();
            return Ok(self.registry.define_type(&ty, schema));
        }

        if capabilities.dual_enum {
            return Ok(SchemaObject {
                one_of: vec![
                    SchemaObject::with_type(InstanceType::String).into(),
                    SchemaObject::with_type(InstanceType::Integer).into(),
                ],
                ..Default::default()
            }
            .into());
        }

        if let Some(well_known) = capabilities.well_known {
            return Ok(well_known.schema());
        }

        // A registered type is referenced when met again; anything else
        // must not reach itself while it is being built.
        let reserved = match ty.kind() {
            Kind::Struct(_) | Kind::Seq(_) | Kind::Array(..) | Kind::Map { .. } => {
                self.registry.reserve(&ty)
            }
            _ => None,
        };
        let guarded = reserved.is_none();
        if guarded {
            if self.expanding.contains(&ty.id()) {
                return Err(ReflectError::RecursiveType {
                    type_name: ty.rust_name().to_string(),
                });
            }
            self.expanding.push(ty.id());
        }

        let mut schema = SchemaObject::default();
        let result = self.reflect_kind(&ty, &mut schema);
        if guarded {
            self.expanding.pop();
        }
        result?;

        if let Some(extend) = capabilities.extend {
            extend(&mut schema);
        }

        Ok(match reserved {
            Some(name) => self.registry.define(&name, &ty, schema.into()),
            None => self
                .registry
                .reference(&ty)
                .unwrap_or_else(|| schema.into()),
        })
    }

    /// Kind-specific construction
    fn reflect_kind(&mut self, ty: &Type, schema: &mut SchemaObject) -> Result<()> {
        match ty.kind() {
            Kind::Struct(_) => return self.reflect_struct(ty, schema),
            Kind::Seq(elem) => return self.reflect_seq(ty, *elem, None, schema),
            Kind::Array(elem, len) => return self.reflect_seq(ty, *elem, Some(*len), schema),
            Kind::Map { key, value } => return self.reflect_map(ty, *key, *value, schema),
            Kind::Bool => schema.instance_type = Some(InstanceType::Boolean),
            Kind::Integer(_) => schema.instance_type = Some(InstanceType::Integer),
            Kind::Number => schema.instance_type = Some(InstanceType::Number),
            Kind::String => schema.instance_type = Some(InstanceType::String),
            // Pointers never reach here; the caller dereferences them.
            Kind::Pointer(_) | Kind::Dynamic => {}
            Kind::Channel(_) | Kind::Function => {
                return Err(ReflectError::UnsupportedType {
                    type_name: ty.rust_name().to_string(),
                    kind: ty.kind().describe(),
                });
            }
        }
        Ok(())
    }

    fn reflect_struct(&mut self, ty: &Type, schema: &mut SchemaObject) -> Result<()> {
        let reflector = self.reflector;

        schema.instance_type = Some(InstanceType::Object);
        schema.properties = Some(Properties::with_capacity(
            self.estimate_property_capacity(ty, &mut Vec::new()),
        ));
        schema.description = reflector.lookup_comment(ty, "");

        if reflector.assign_anchor && !ty.name().is_empty() {
            schema.anchor = Some(ty.name().to_string());
        }
        if !reflector.allow_additional_properties && schema.additional_properties.is_none() {
            schema.additional_properties = Some(Box::new(Schema::Bool(false)));
        }

        if !reflector.is_ignored(ty) {
            self.reflect_struct_fields(schema, ty)?;
        }

        Ok(())
    }

    /// Add the properties of struct `ty` to `schema`
    ///
    /// Also used to flatten embedded structs into their parent.
    fn reflect_struct_fields(&mut self, schema: &mut SchemaObject, ty: &Type) -> Result<()> {
        let reflector = self.reflector;
        let ty = ty.deref();
        let Kind::Struct(fields) = ty.kind() else {
            return Ok(());
        };

        let tags = FieldTags::for_type(&ty, self.name_tag);
        for (field, field_tags) in fields.iter().zip(tags.iter()) {
            self.reflect_field(schema, &ty, field, field_tags)?;
        }

        if let Some(additional_fields) = reflector.additional_fields.as_deref() {
            for field in additional_fields(&ty) {
                let field_tags = FieldTags::for_field(&field, self.name_tag);
                self.reflect_field(schema, &ty, &field, &field_tags)?;
            }
        }

        Ok(())
    }

    fn reflect_field(
        &mut self,
        parent: &mut SchemaObject,
        owner: &Type,
        field: &Field,
        tags: &FieldTags,
    ) -> Result<()> {
        let (name, required, nullable) = match self.field_role(field, tags) {
            FieldRole::Skip => return Ok(()),
            FieldRole::Embed => return self.flatten_embedded(parent, &field.ty()),
            FieldRole::Property {
                name,
                required,
                nullable,
            } => (name, required, nullable),
        };

        let capabilities = owner.capabilities();
        let alias = capabilities
            .property_alias
            .and_then(|property_alias| property_alias(&name));
        let mut property = match alias {
            Some(alias) => self.resolve(&alias)?,
            None => self.resolve(&field.ty())?,
        };

        if let Schema::Object(obj) = &mut property {
            apply_field_keywords(obj, parent, &name, tags);
            if obj.description.is_none() {
                obj.description = self.reflector.lookup_comment(owner, field.name());
            }
            if let Some(doc) = capabilities.field_docs.and_then(|docs| docs(field.name())) {
                obj.description = Some(doc);
            }
        }

        if nullable {
            property = SchemaObject {
                one_of: vec![property, SchemaObject::with_type(InstanceType::Null).into()],
                ..Default::default()
            }
            .into();
        }

        parent.properties_mut().insert(name.clone(), property);
        if required && !parent.required.contains(&name) {
            parent.required.push(name);
        }

        Ok(())
    }

    /// Copy the fields of embedded struct `ty` into `parent`
    ///
    /// Only a struct that ends up embedding itself is an error; references
    /// to the embedded type from its own fields resolve normally.
    fn flatten_embedded(&mut self, parent: &mut SchemaObject, ty: &Type) -> Result<()> {
        let ty = ty.deref();
        let id = ty.id();
        if self.flattening.contains(&id) {
            return Err(ReflectError::RecursiveType {
                type_name: ty.rust_name().to_string(),
            });
        }

        self.flattening.push(id);
        let result = self.reflect_struct_fields(parent, &ty);
        self.flattening.pop();
        result
    }

    fn field_role(&self, field: &Field, tags: &FieldTags) -> FieldRole {
        if tags.ignored_by_name() || tags.ignored_by_schema() {
            return FieldRole::Skip;
        }

        let required = (!self.reflector.required_from_annotation_only && tags.required_by_name())
            || tags.required_by_schema();
        let nullable = tags.nullable();

        if field.is_embedded() && tags.name_override().is_empty() && field.ty().is_struct() {
            return FieldRole::Embed;
        }
        if tags.inlined() {
            return FieldRole::Embed;
        }

        let name = match tags.name_override() {
            "" => field.name(),
            explicit => explicit,
        };
        let name = match self.reflector.key_namer.as_deref() {
            Some(key_namer) => key_namer(name),
            None => name.to_string(),
        };

        if name.is_empty() {
            return FieldRole::Skip;
        }
        FieldRole::Property {
            name,
            required,
            nullable,
        }
    }

    /// Upper bound on the properties `ty` contributes, counting flattened embeds once
    fn estimate_property_capacity(&self, ty: &Type, seen: &mut Vec<TypeId>) -> usize {
        let ty = ty.deref();
        let Kind::Struct(fields) = ty.kind() else {
            return 0;
        };
        if seen.contains(&ty.id()) {
            return 0;
        }
        seen.push(ty.id());

        let tags = FieldTags::for_type(&ty, self.name_tag);
        let mut capacity = 0;
        for (field, field_tags) in fields.iter().zip(tags.iter()) {
            capacity += self.field_capacity(field, field_tags, seen);
        }

        if let Some(additional_fields) = self.reflector.additional_fields.as_deref() {
            for field in additional_fields(&ty) {
                let field_tags = FieldTags::for_field(&field, self.name_tag);
                capacity += self.field_capacity(&field, &field_tags, seen);
            }
        }

        capacity
    }

    fn field_capacity(&self, field: &Field, tags: &FieldTags, seen: &mut Vec<TypeId>) -> usize {
        match self.field_role(field, tags) {
            FieldRole::Skip => 0,
            FieldRole::Embed => self.estimate_property_capacity(&field.ty(), seen),
            FieldRole::Property { .. } => 1,
        }
    }

    fn reflect_seq(
        &mut self,
        ty: &Type,
        elem: TypeFn,
        len: Option<usize>,
        schema: &mut SchemaObject,
    ) -> Result<()> {
        schema.description = self.reflector.lookup_comment(ty, "");

        if let Some(len) = len {
            schema.min_items = Some(len as u64);
            schema.max_items = Some(len as u64);
        }

        let elem = elem();
        let is_bytes = matches!(elem.kind(), Kind::Integer(IntKind::U8));
        if len.is_none() && is_bytes {
            schema.instance_type = Some(InstanceType::String);
            schema.content_encoding = Some("base64".to_string());
        } else {
            schema.instance_type = Some(InstanceType::Array);
            schema.items = Some(Box::new(self.resolve(&elem)?));
        }

        Ok(())
    }

    fn reflect_map(
        &mut self,
        ty: &Type,
        key: TypeFn,
        value: TypeFn,
        schema: &mut SchemaObject,
    ) -> Result<()> {
        schema.instance_type = Some(InstanceType::Object);
        schema.description = self.reflector.lookup_comment(ty, "");

        let value = value();
        if let Kind::Integer(_) = key().deref().kind() {
            let value_schema = self.resolve(&value)?;
            schema
                .pattern_properties
                .insert(INTEGER_KEY_PATTERN.to_string(), value_schema);
            schema.additional_properties = Some(Box::new(Schema::Bool(false)));
            return Ok(());
        }

        if !matches!(value.deref().kind(), Kind::Dynamic) {
            schema.additional_properties = Some(Box::new(self.resolve(&value)?));
        }

        Ok(())
    }
}
