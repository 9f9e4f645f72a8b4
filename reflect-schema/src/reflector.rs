//! Reflector configuration and entry points

use std::collections::HashMap;
use std::fmt;
use std::sync::{Arc, OnceLock};

use crate::cache::{self, CacheKey, CacheStats, SchemaCache, DEFAULT_MAX_ENTRIES};
use crate::error::Result;
use crate::id::{to_kebab_case, Id};
use crate::schema::{Schema, VERSION};
use crate::tags::DEFAULT_NAME_TAG;
use crate::traits::Reflect;
use crate::types::{Field, Type};
use crate::walker::Walker;

/// Maps a type to an external schema id; a non-empty id short-circuits reflection
pub type LookupFn = dyn Fn(&Type) -> Id + Send + Sync;
/// Overrides the schema of a type; `None` falls through to reflection
pub type MapperFn = dyn Fn(&Type) -> Option<Schema> + Send + Sync;
/// Display name of a type for `$defs`; an empty string keeps the default
pub type NamerFn = dyn Fn(&Type) -> String + Send + Sync;
/// Maps a property name to the key written in the schema
pub type KeyNamerFn = dyn Fn(&str) -> String + Send + Sync;
/// Synthetic fields appended after a struct's declared fields
pub type AdditionalFieldsFn = dyn Fn(&Type) -> Vec<Field> + Send + Sync;
/// Documentation for a type (empty field name) or one of its fields
pub type LookupCommentFn = dyn Fn(&Type, &str) -> String + Send + Sync;

/// Configurable schema generator
///
/// All fields are public; the `with_*` methods are shorthands for building a
/// configuration in one expression. A reflector is `Send + Sync` and may be
/// shared between threads.
///
/// # Example
///
/// ```rust
/// use reflect_schema::{Field, Kind, Reflect, Reflector, TypeInfo};
///
/// struct User {
///     name: String,
/// }
///
/// impl Reflect for User {
///     fn type_info() -> TypeInfo {
///         TypeInfo::of::<Self>(Kind::Struct(vec![
///             Field::new::<String>("name").with_tag("json", "name"),
///         ]))
///         .with_name("User")
///     }
/// }
///
/// let schema = Reflector::new()
///     .with_expanded_struct(true)
///     .reflect::<User>()
///     .unwrap();
/// let json = serde_json::to_value(&schema).unwrap();
/// assert_eq!(json["properties"]["name"]["type"], "string");
/// ```
#[derive(Clone)]
pub struct Reflector {
    /// Base for root `$id`s
    pub base_id: Id,
    /// Never derive a root `$id`
    pub anonymous: bool,
    /// Set `$anchor` on struct schemas to the type name
    pub assign_anchor: bool,
    /// Leave `additionalProperties` unset on structs
    pub allow_additional_properties: bool,
    /// Only the `required` schema token marks properties as required
    pub required_from_annotation_only: bool,
    /// Inline every schema; no `$defs`, no `$ref`
    pub do_not_reference: bool,
    /// Return the root struct's definition itself instead of a `$ref` to it
    pub expanded_struct: bool,
    /// Annotation read for property names; `json` when empty
    pub name_tag: String,
    /// Structs reflected as empty objects
    pub ignored_types: Vec<Type>,
    pub lookup: Option<Arc<LookupFn>>,
    pub mapper: Option<Arc<MapperFn>>,
    pub namer: Option<Arc<NamerFn>>,
    pub key_namer: Option<Arc<KeyNamerFn>>,
    pub additional_fields: Option<Arc<AdditionalFieldsFn>>,
    pub lookup_comment: Option<Arc<LookupCommentFn>>,
    /// Documentation keyed by `module::Type` or `module::Type.field`
    pub comment_map: Option<Arc<HashMap<String, String>>>,
    /// Memoize schemas per root type and configuration
    ///
    /// Roots built with [`Type::from_info`] are always generated afresh.
    pub enable_cache: bool,
    /// Cache bound; zero means unbounded
    pub max_cache_entries: usize,
    cache: Arc<OnceLock<SchemaCache>>,
}

impl Reflector {
    pub fn new() -> Self {
        Self {
            base_id: Id::EMPTY,
            anonymous: false,
            assign_anchor: false,
            allow_additional_properties: false,
            required_from_annotation_only: false,
            do_not_reference: false,
            expanded_struct: false,
            name_tag: String::new(),
            ignored_types: Vec::new(),
            lookup: None,
            mapper: None,
            namer: None,
            key_namer: None,
            additional_fields: None,
            lookup_comment: None,
            comment_map: None,
            enable_cache: false,
            max_cache_entries: DEFAULT_MAX_ENTRIES,
            cache: Arc::new(OnceLock::new()),
        }
    }

    #[must_use = "This method returns a new Reflector and does not modify self"]
    pub fn with_base_id(mut self, base_id: impl Into<Id>) -> Self {
        self.base_id = base_id.into();
        self
    }

    #[must_use = "This method returns a new Reflector and does not modify self"]
    pub fn with_anonymous(mut self, anonymous: bool) -> Self {
        self.anonymous = anonymous;
        self
    }

    #[must_use = "This method returns a new Reflector and does not modify self"]
    pub fn with_assign_anchor(mut self, assign_anchor: bool) -> Self {
        self.assign_anchor = assign_anchor;
        self
    }

    #[must_use = "This method returns a new Reflector and does not modify self"]
    pub fn with_allow_additional_properties(mut self, allow: bool) -> Self {
        self.allow_additional_properties = allow;
        self
    }

    #[must_use = "This method returns a new Reflector and does not modify self"]
    pub fn with_required_from_annotation_only(mut self, enabled: bool) -> Self {
        self.required_from_annotation_only = enabled;
        self
    }

    #[must_use = "This method returns a new Reflector and does not modify self"]
    pub fn with_do_not_reference(mut self, do_not_reference: bool) -> Self {
        self.do_not_reference = do_not_reference;
        self
    }

    #[must_use = "This method returns a new Reflector and does not modify self"]
    pub fn with_expanded_struct(mut self, expanded: bool) -> Self {
        self.expanded_struct = expanded;
        self
    }

    #[must_use = "This method returns a new Reflector and does not modify self"]
    pub fn with_name_tag(mut self, tag: impl Into<String>) -> Self {
        self.name_tag = tag.into();
        self
    }

    /// Reflect `T` as an object without properties
    #[must_use = "This method returns a new Reflector and does not modify self"]
    pub fn with_ignored_type<T: Reflect + ?Sized>(mut self) -> Self {
        self.ignored_types.push(Type::of::<T>());
        self
    }

    #[must_use = "This method returns a new Reflector and does not modify self"]
    pub fn with_lookup(mut self, lookup: impl Fn(&Type) -> Id + Send + Sync + 'static) -> Self {
        self.lookup = Some(Arc::new(lookup));
        self
    }

    #[must_use = "This method returns a new Reflector and does not modify self"]
    pub fn with_mapper(
        mut self,
        mapper: impl Fn(&Type) -> Option<Schema> + Send + Sync + 'static,
    ) -> Self {
        self.mapper = Some(Arc::new(mapper));
        self
    }

    #[must_use = "This method returns a new Reflector and does not modify self"]
    pub fn with_namer(mut self, namer: impl Fn(&Type) -> String + Send + Sync + 'static) -> Self {
        self.namer = Some(Arc::new(namer));
        self
    }

    #[must_use = "This method returns a new Reflector and does not modify self"]
    pub fn with_key_namer(
        mut self,
        key_namer: impl Fn(&str) -> String + Send + Sync + 'static,
    ) -> Self {
        self.key_namer = Some(Arc::new(key_namer));
        self
    }

    #[must_use = "This method returns a new Reflector and does not modify self"]
    pub fn with_additional_fields(
        mut self,
        additional: impl Fn(&Type) -> Vec<Field> + Send + Sync + 'static,
    ) -> Self {
        self.additional_fields = Some(Arc::new(additional));
        self
    }

    #[must_use = "This method returns a new Reflector and does not modify self"]
    pub fn with_lookup_comment(
        mut self,
        lookup: impl Fn(&Type, &str) -> String + Send + Sync + 'static,
    ) -> Self {
        self.lookup_comment = Some(Arc::new(lookup));
        self
    }

    #[must_use = "This method returns a new Reflector and does not modify self"]
    pub fn with_comment_map(mut self, comments: HashMap<String, String>) -> Self {
        self.comment_map = Some(Arc::new(comments));
        self
    }

    #[must_use = "This method returns a new Reflector and does not modify self"]
    pub fn with_cache(mut self, enabled: bool) -> Self {
        self.enable_cache = enabled;
        self
    }

    #[must_use = "This method returns a new Reflector and does not modify self"]
    pub fn with_max_cache_entries(mut self, max: usize) -> Self {
        self.max_cache_entries = max;
        self
    }

    /// Effective name annotation
    pub fn name_tag(&self) -> &str {
        if self.name_tag.is_empty() {
            DEFAULT_NAME_TAG
        } else {
            &self.name_tag
        }
    }

    /// Schema for `T`
    pub fn reflect<T: Reflect + ?Sized>(&self) -> Result<Schema> {
        self.reflect_from_type(&Type::of::<T>())
    }

    /// Schema for the type of `value`
    pub fn reflect_value<T: Reflect>(&self, _value: &T) -> Result<Schema> {
        self.reflect::<T>()
    }

    /// Schema for a type descriptor
    pub fn reflect_from_type(&self, ty: &Type) -> Result<Schema> {
        let ty = ty.deref();
        if !self.enable_cache || !ty.is_interned() {
            return self.generate(&ty);
        }

        let cache = self.cache.get_or_init(SchemaCache::new);
        let key = CacheKey {
            type_id: ty.id(),
            fingerprint: cache::fingerprint(self),
        };
        if let Some(schema) = cache.get(&key) {
            return Ok(schema);
        }

        let schema = self.generate(&ty)?;
        cache.insert(key, &schema, self.max_cache_entries);
        Ok(schema)
    }

    /// Statistics of the schema cache, once it has been used
    pub fn cache_stats(&self) -> Option<CacheStats> {
        self.cache.get().map(SchemaCache::stats)
    }

    /// Drop every cached schema
    pub fn clear_cache(&self) {
        if let Some(cache) = self.cache.get() {
            cache.clear();
        }
    }

    fn generate(&self, ty: &Type) -> Result<Schema> {
        tracing::debug!(type_name = ty.rust_name(), "generating schema");

        let mut walker = Walker::new(self);
        let name = walker.display_name(ty);
        let reflected = walker.reflect_type(ty)?;
        let mut definitions = walker.into_definitions();

        let root = if self.expanded_struct {
            definitions.remove(&name).unwrap_or(reflected)
        } else {
            reflected
        };

        let Schema::Object(mut root) = root else {
            return Ok(root);
        };

        if let Some(lookup) = &self.lookup {
            let id = lookup(ty);
            if !id.is_empty() {
                root.id = id;
            }
        }

        if !self.anonymous && root.id.is_empty() {
            let base = self.base_id_for(ty);
            if !base.is_empty() {
                root.id = base.add(&to_kebab_case(&name));
            }
        }

        root.version = Some(VERSION.to_string());
        if !self.do_not_reference {
            root.definitions = definitions;
        }
        Ok(Schema::Object(root))
    }

    /// Configured base id, or one derived from the module path when that is a valid URL
    fn base_id_for(&self, ty: &Type) -> Id {
        if !self.base_id.is_empty() {
            return self.base_id.clone();
        }
        if ty.module_path().is_empty() {
            return Id::EMPTY;
        }
        let derived = Id::new(format!("https://{}", ty.module_path().replace("::", "/")));
        if derived.validate().is_ok() {
            derived
        } else {
            Id::EMPTY
        }
    }

    /// Documentation for `ty` (empty `field`) or one of its fields
    ///
    /// The `lookup_comment` hook wins; the comment map is consulted when it
    /// returns nothing.
    pub(crate) fn lookup_comment(&self, ty: &Type, field: &str) -> Option<String> {
        if let Some(lookup) = &self.lookup_comment {
            let comment = lookup(ty, field);
            if !comment.is_empty() {
                return Some(comment);
            }
        }

        let comments = self.comment_map.as_ref()?;
        comments
            .get(&comment_key(ty, field))
            .filter(|comment| !comment.is_empty())
            .cloned()
    }

    pub(crate) fn is_ignored(&self, ty: &Type) -> bool {
        self.ignored_types.iter().any(|ignored| ignored == ty)
    }
}

impl Default for Reflector {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Debug for Reflector {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Reflector")
            .field("base_id", &self.base_id)
            .field("anonymous", &self.anonymous)
            .field("assign_anchor", &self.assign_anchor)
            .field("allow_additional_properties", &self.allow_additional_properties)
            .field("required_from_annotation_only", &self.required_from_annotation_only)
            .field("do_not_reference", &self.do_not_reference)
            .field("expanded_struct", &self.expanded_struct)
            .field("name_tag", &self.name_tag())
            .field("ignored_types", &self.ignored_types)
            .field("lookup", &self.lookup.is_some())
            .field("mapper", &self.mapper.is_some())
            .field("namer", &self.namer.is_some())
            .field("key_namer", &self.key_namer.is_some())
            .field("additional_fields", &self.additional_fields.is_some())
            .field("lookup_comment", &self.lookup_comment.is_some())
            .field("comment_map", &self.comment_map.as_ref().map(|map| map.len()))
            .field("enable_cache", &self.enable_cache)
            .field("max_cache_entries", &self.max_cache_entries)
            .finish()
    }
}

/// Comment map key: `module::Type` for the type, `module::Type.field` for a field
pub fn comment_key(ty: &Type, field: &str) -> String {
    let mut key = if ty.module_path().is_empty() {
        ty.name().to_string()
    } else {
        format!("{}::{}", ty.module_path(), ty.name())
    };
    if !field.is_empty() {
        key.push('.');
        key.push_str(field);
    }
    key
}

/// Schema for `T` with the default configuration
pub fn reflect<T: Reflect + ?Sized>() -> Result<Schema> {
    Reflector::new().reflect::<T>()
}

/// Schema for a type descriptor with the default configuration
pub fn reflect_from_type(ty: &Type) -> Result<Schema> {
    Reflector::new().reflect_from_type(ty)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{Kind, TypeInfo};

    struct Account;

    fn account() -> Type {
        Type::from_info(
            TypeInfo::of::<Account>(Kind::Struct(Vec::new()))
                .with_name("Account")
                .with_module_path("bank::model"),
        )
    }

    #[test]
    fn test_name_tag_default() {
        assert_eq!(Reflector::new().name_tag(), "json");
        assert_eq!(Reflector::new().with_name_tag("yaml").name_tag(), "yaml");
    }

    #[test]
    fn test_comment_key() {
        assert_eq!(comment_key(&account(), ""), "bank::model::Account");
        assert_eq!(comment_key(&account(), "owner"), "bank::model::Account.owner");
    }

    #[test]
    fn test_lookup_comment_prefers_hook() {
        let comments = HashMap::from([
            ("bank::model::Account".to_string(), "From map".to_string()),
            ("bank::model::Account.owner".to_string(), "Owner from map".to_string()),
        ]);
        let reflector = Reflector::new()
            .with_comment_map(comments)
            .with_lookup_comment(|_, field| {
                if field.is_empty() {
                    "From hook".to_string()
                } else {
                    String::new()
                }
            });

        assert_eq!(
            reflector.lookup_comment(&account(), "").as_deref(),
            Some("From hook")
        );
        assert_eq!(
            reflector.lookup_comment(&account(), "owner").as_deref(),
            Some("Owner from map")
        );
        assert_eq!(reflector.lookup_comment(&account(), "missing"), None);
    }

    #[test]
    fn test_module_path_is_not_a_base_id() {
        let reflector = Reflector::new();
        assert!(reflector.base_id_for(&account()).is_empty());

        let reflector = Reflector::new().with_base_id("https://example.com/schemas");
        assert_eq!(
            reflector.base_id_for(&account()).as_str(),
            "https://example.com/schemas"
        );
    }

    #[test]
    fn test_debug_hides_hooks() {
        let reflector = Reflector::new().with_key_namer(|name| name.to_uppercase());
        let debug = format!("{reflector:?}");
        assert!(debug.contains("key_namer: true"));
        assert!(debug.contains("name_tag: \"json\""));
    }
}
