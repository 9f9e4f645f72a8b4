//! Field annotation parsing
//!
//! Each field carries up to four annotations:
//!
//! | annotation | split on | used for |
//! |------------|----------|----------|
//! | name tag (`json` by default) | `,` | property name, `omitempty`, `inline` |
//! | `jsonschema` | unescaped `,` | schema keywords, `required`, `nullable` |
//! | `jsonschema_extras` | `,` | extension keywords |
//! | `jsonschema_description` | - | property description |
//!
//! Parsed annotations are cached per (type, name tag) for the life of the
//! process.

use std::any::TypeId;
use std::sync::{Arc, LazyLock};

use dashmap::DashMap;

use crate::types::{Field, Kind, Tags, Type};

/// Annotation holding schema keywords
pub const SCHEMA_TAG: &str = "jsonschema";
/// Annotation holding extension keywords
pub const EXTRAS_TAG: &str = "jsonschema_extras";
/// Annotation holding the property description
pub const DESCRIPTION_TAG: &str = "jsonschema_description";
/// Name annotation used when none is configured
pub const DEFAULT_NAME_TAG: &str = "json";

static FIELD_TAGS: LazyLock<DashMap<(TypeId, String), Arc<[FieldTags]>>> =
    LazyLock::new(DashMap::new);

/// Parsed annotations of one field
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FieldTags {
    /// Name tag tokens; never empty
    pub name: Vec<String>,
    /// Schema keyword tokens; never empty
    pub schema: Vec<String>,
    /// Extension keyword tokens
    pub extras: Vec<String>,
    pub description: Option<String>,
}

impl FieldTags {
    /// Parse the annotations of one field
    pub fn parse(tags: &Tags, name_tag: &str) -> Self {
        Self {
            name: split_plain(tags.get(name_tag).unwrap_or_default()),
            schema: split_on_unescaped_commas(tags.get(SCHEMA_TAG).unwrap_or_default()),
            extras: split_plain(tags.get(EXTRAS_TAG).unwrap_or_default()),
            description: tags
                .get(DESCRIPTION_TAG)
                .filter(|description| !description.is_empty())
                .map(str::to_string),
        }
    }

    /// Parsed annotations for every field of `ty`, in declaration order
    ///
    /// Returns an empty list for non-struct types. Only interned descriptors
    /// are cached; hand-built ones are parsed on every call.
    pub fn for_type(ty: &Type, name_tag: &str) -> Arc<[FieldTags]> {
        if !ty.is_interned() {
            return Self::parse_fields(ty, name_tag);
        }

        let key = (ty.id(), name_tag.to_string());
        if let Some(cached) = FIELD_TAGS.get(&key) {
            return Arc::clone(cached.value());
        }

        let parsed = Self::parse_fields(ty, name_tag);
        tracing::trace!(type_name = ty.rust_name(), name_tag, "parsed field annotations");

        // Racing computations produce identical results; keep the first.
        Arc::clone(FIELD_TAGS.entry(key).or_insert(parsed).value())
    }

    fn parse_fields(ty: &Type, name_tag: &str) -> Arc<[FieldTags]> {
        match ty.kind() {
            Kind::Struct(fields) => fields
                .iter()
                .map(|field| FieldTags::parse(field.tags(), name_tag))
                .collect(),
            _ => Arc::from(Vec::new()),
        }
    }

    /// Parse a synthetic field that is not part of any descriptor
    pub fn for_field(field: &Field, name_tag: &str) -> Self {
        Self::parse(field.tags(), name_tag)
    }

    /// Name token 0, the explicit property name (may be empty)
    pub fn name_override(&self) -> &str {
        self.name.first().map(String::as_str).unwrap_or_default()
    }

    /// `-` as the name
    pub fn ignored_by_name(&self) -> bool {
        self.name_override() == "-"
    }

    /// `-` as the first schema token
    pub fn ignored_by_schema(&self) -> bool {
        self.schema.first().is_some_and(|token| token == "-")
    }

    /// Required unless the name tag says `omitempty` or `omitzero`
    pub fn required_by_name(&self) -> bool {
        !self
            .name
            .iter()
            .skip(1)
            .any(|token| token == "omitempty" || token == "omitzero")
    }

    /// Schema tokens contain `required`
    pub fn required_by_schema(&self) -> bool {
        self.schema.iter().any(|token| token == "required")
    }

    /// Schema tokens contain `nullable`
    pub fn nullable(&self) -> bool {
        !self.ignored_by_schema() && self.schema.iter().any(|token| token == "nullable")
    }

    /// Name tag options contain `inline`
    pub fn inlined(&self) -> bool {
        self.name.iter().skip(1).any(|token| token == "inline")
    }
}

fn split_plain(value: &str) -> Vec<String> {
    value.split(',').map(str::to_string).collect()
}

/// Split on commas not preceded by a backslash
///
/// `\,` yields a literal comma (the backslash is dropped); any other
/// backslash is kept. An empty input yields a single empty token.
pub fn split_on_unescaped_commas(value: &str) -> Vec<String> {
    let mut parts = Vec::with_capacity(4);
    let mut current = String::with_capacity(value.len());
    let mut escaped = false;

    for c in value.chars() {
        if c == ',' {
            if escaped {
                current.pop();
                current.push(',');
                escaped = false;
            } else {
                parts.push(std::mem::take(&mut current));
            }
            continue;
        }

        current.push(c);
        escaped = c == '\\';
    }

    parts.push(current);
    parts
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_split_on_unescaped_commas() {
        assert_eq!(
            split_on_unescaped_commas(r"pattern=^a\,b$,minLength=1"),
            vec![r"pattern=^a,b$", "minLength=1"]
        );
    }

    #[test]
    fn test_split_empty_yields_one_token() {
        assert_eq!(split_on_unescaped_commas(""), vec![""]);
    }

    #[test]
    fn test_split_keeps_other_backslashes() {
        assert_eq!(
            split_on_unescaped_commas(r"pattern=\d+,format=x"),
            vec![r"pattern=\d+", "format=x"]
        );
    }

    #[test]
    fn test_split_trailing_comma() {
        assert_eq!(split_on_unescaped_commas("a,"), vec!["a", ""]);
    }

    #[test]
    fn test_parse_field_tags() {
        let tags = Tags::new()
            .with("json", "email,omitempty")
            .with("jsonschema", "format=email,required")
            .with("jsonschema_extras", "x-a=1,x-b=2")
            .with("jsonschema_description", "Contact address");

        let parsed = FieldTags::parse(&tags, "json");
        assert_eq!(parsed.name, vec!["email", "omitempty"]);
        assert_eq!(parsed.schema, vec!["format=email", "required"]);
        assert_eq!(parsed.extras, vec!["x-a=1", "x-b=2"]);
        assert_eq!(parsed.description.as_deref(), Some("Contact address"));
        assert!(!parsed.required_by_name());
        assert!(parsed.required_by_schema());
    }

    #[test]
    fn test_missing_annotations_yield_empty_tokens() {
        let parsed = FieldTags::parse(&Tags::new(), "json");
        assert_eq!(parsed.name, vec![""]);
        assert_eq!(parsed.schema, vec![""]);
        assert_eq!(parsed.name_override(), "");
        assert!(parsed.required_by_name());
        assert!(!parsed.nullable());
    }

    #[test]
    fn test_custom_name_tag() {
        let tags = Tags::new().with("json", "a").with("yaml", "b");
        assert_eq!(FieldTags::parse(&tags, "yaml").name_override(), "b");
    }

    #[test]
    fn test_ignored_and_inline() {
        let parsed = FieldTags::parse(&Tags::new().with("json", "-"), "json");
        assert!(parsed.ignored_by_name());

        let parsed = FieldTags::parse(&Tags::new().with("jsonschema", "-"), "json");
        assert!(parsed.ignored_by_schema());

        let parsed = FieldTags::parse(&Tags::new().with("json", ",inline"), "json");
        assert!(parsed.inlined());
    }

    #[test]
    fn test_hand_built_descriptors_do_not_share_tags() {
        use crate::types::TypeInfo;

        struct Marker;
        let first = Type::from_info(TypeInfo::of::<Marker>(Kind::Struct(vec![
            Field::new::<String>("A").with_tag("json", "a"),
        ])));
        let second = Type::from_info(TypeInfo::of::<Marker>(Kind::Struct(vec![
            Field::new::<String>("X").with_tag("json", "x"),
            Field::new::<String>("Y").with_tag("json", "y"),
        ])));

        assert_eq!(FieldTags::for_type(&first, "json")[0].name_override(), "a");
        let tags = FieldTags::for_type(&second, "json");
        assert_eq!(tags.len(), 2);
        assert_eq!(tags[0].name_override(), "x");
        assert_eq!(tags[1].name_override(), "y");
    }

    #[test]
    fn test_nullable_ignored_when_skipped() {
        let parsed = FieldTags::parse(&Tags::new().with("jsonschema", "-,nullable"), "json");
        assert!(!parsed.nullable());
    }
}
