//! Integration tests for the Reflect derive macro.
//!
//! These tests verify that derived descriptors produce the same schemas as
//! hand-written ones and that attributes reach the generated schema.

use reflect_schema::{
    AliasSchema, CustomSchema, ExtendSchema, Field, FieldDocs, InstanceType, Kind, Reflect,
    Reflector, Schema, SchemaObject, Type, TypeInfo,
};
use serde_json::{json, Value};

fn expanded<T: Reflect>() -> Value {
    let schema = Reflector::new()
        .with_expanded_struct(true)
        .reflect::<T>()
        .unwrap();
    serde_json::to_value(&schema).unwrap()
}

// =============================================================================
// Basic Struct Tests
// =============================================================================

#[test]
fn test_basic_struct_derive() {
    #[derive(Reflect)]
    #[allow(dead_code)]
    struct User {
        name: String,
        age: u32,
    }

    let json = expanded::<User>();
    assert_eq!(json["type"], "object");
    assert_eq!(json["properties"]["name"]["type"], "string");
    assert_eq!(json["properties"]["age"]["type"], "integer");
    assert_eq!(json["required"], json!(["name", "age"]));
    assert_eq!(json["additionalProperties"], false);
}

#[test]
fn test_unit_struct_derive() {
    #[derive(Reflect)]
    struct Empty;

    let json = expanded::<Empty>();
    assert_eq!(json["type"], "object");
    assert_eq!(json["properties"], json!({}));
}

#[test]
fn test_newtype_takes_inner_shape() {
    #[derive(Reflect)]
    #[allow(dead_code)]
    struct Tags(Vec<String>);

    #[derive(Reflect)]
    #[allow(dead_code)]
    struct Label(String);

    let ty = Type::of::<Tags>();
    assert_eq!(ty.name(), "Tags");
    assert!(matches!(ty.kind(), Kind::Seq(_)));

    let json = serde_json::to_value(reflect_schema::reflect::<Tags>().unwrap()).unwrap();
    assert_eq!(json["$ref"], "#/$defs/Tags");
    assert_eq!(json["$defs"]["Tags"]["items"]["type"], "string");

    let json = serde_json::to_value(reflect_schema::reflect::<Label>().unwrap()).unwrap();
    assert_eq!(json["type"], "string");
}

#[test]
fn test_derive_matches_hand_written_descriptor() {
    #[derive(Reflect)]
    #[allow(dead_code)]
    struct Derived {
        #[reflect(json = "id", jsonschema = "minimum=1")]
        id: u64,
        #[reflect(json = "tags,omitempty")]
        tags: Vec<String>,
    }

    #[allow(dead_code)]
    struct HandWritten {
        id: u64,
        tags: Vec<String>,
    }

    impl Reflect for HandWritten {
        fn type_info() -> TypeInfo {
            TypeInfo::of::<Self>(Kind::Struct(vec![
                Field::new::<u64>("id")
                    .with_tag("json", "id")
                    .with_tag("jsonschema", "minimum=1"),
                Field::new::<Vec<String>>("tags").with_tag("json", "tags,omitempty"),
            ]))
            .with_name("Derived")
        }
    }

    let derived = Reflector::new().with_anonymous(true).reflect::<Derived>().unwrap();
    let hand_written = Reflector::new()
        .with_anonymous(true)
        .reflect::<HandWritten>()
        .unwrap();
    assert_eq!(derived, hand_written);
}

// =============================================================================
// Field Attribute Tests
// =============================================================================

#[test]
fn test_field_annotations() {
    #[derive(Reflect)]
    #[allow(dead_code)]
    struct Profile {
        #[reflect(
            json = "handle",
            jsonschema = "minLength=3,maxLength=20,pattern=^[a-z]+$",
            jsonschema_description = "Public handle"
        )]
        handle: String,
        #[reflect(json = "-")]
        secret: String,
        #[reflect(json = "bio,omitempty", jsonschema = "nullable")]
        bio: Option<String>,
        #[reflect(json = "score", jsonschema_extras = "x-unit=points")]
        score: f64,
    }

    let json = expanded::<Profile>();
    let handle = &json["properties"]["handle"];
    assert_eq!(handle["minLength"], 3);
    assert_eq!(handle["maxLength"], 20);
    assert_eq!(handle["pattern"], "^[a-z]+$");
    assert_eq!(handle["description"], "Public handle");

    assert!(json["properties"].get("secret").is_none());
    assert_eq!(
        json["properties"]["bio"]["oneOf"],
        json!([{"type": "string"}, {"type": "null"}])
    );
    assert_eq!(json["properties"]["score"]["x-unit"], "points");
    assert_eq!(json["required"], json!(["handle", "score"]));
}

#[test]
fn test_raw_tag_with_custom_name_tag() {
    #[derive(Reflect)]
    #[allow(dead_code)]
    struct Config {
        #[reflect(tag = "yaml:\"log_level\" json:\"logLevel\"")]
        log_level: String,
        #[reflect(tag = "yaml:\"port\"", json = "listenPort")]
        port: u16,
    }

    let yaml = Reflector::new()
        .with_expanded_struct(true)
        .with_name_tag("yaml")
        .reflect::<Config>()
        .unwrap();
    let yaml = serde_json::to_value(&yaml).unwrap();
    assert_eq!(yaml["required"], json!(["log_level", "port"]));

    let json = expanded::<Config>();
    assert_eq!(json["required"], json!(["logLevel", "listenPort"]));
}

#[test]
fn test_embedded_struct_is_flattened() {
    #[derive(Reflect)]
    #[allow(dead_code)]
    struct Audit {
        #[reflect(json = "createdBy")]
        created_by: String,
    }

    #[derive(Reflect)]
    #[allow(dead_code)]
    struct Document {
        #[reflect(json = "title")]
        title: String,
        #[reflect(embed)]
        audit: Audit,
    }

    let json = expanded::<Document>();
    assert_eq!(json["required"], json!(["title", "createdBy"]));
    assert_eq!(json["properties"]["createdBy"]["type"], "string");
    assert!(json.get("$defs").is_none());
}

#[test]
fn test_recursive_struct() {
    #[derive(Reflect)]
    #[allow(dead_code)]
    struct Category {
        #[reflect(json = "name")]
        name: String,
        #[reflect(json = "children,omitempty")]
        children: Vec<Category>,
    }

    let json = serde_json::to_value(reflect_schema::reflect::<Category>().unwrap()).unwrap();
    assert_eq!(json["$ref"], "#/$defs/Category");
    assert_eq!(
        json["$defs"]["Category"]["properties"]["children"]["items"]["$ref"],
        "#/$defs/Category"
    );
}

// =============================================================================
// Container Attribute Tests
// =============================================================================

#[test]
fn test_rename() {
    #[derive(Reflect)]
    #[reflect(rename = "Account")]
    #[allow(dead_code)]
    struct User {
        name: String,
    }

    let ty = Type::of::<User>();
    assert_eq!(ty.name(), "Account");
    assert_eq!(ty.module_path(), module_path!());

    let json = serde_json::to_value(reflect_schema::reflect::<User>().unwrap()).unwrap();
    assert_eq!(json["$ref"], "#/$defs/Account");
}

#[test]
fn test_capabilities_are_wired() {
    #[derive(Reflect)]
    #[reflect(extend, field_docs)]
    #[allow(dead_code)]
    struct Order {
        #[reflect(json = "total")]
        total: f64,
    }

    impl ExtendSchema for Order {
        fn extend_schema(schema: &mut SchemaObject) {
            schema.title = Some("Order".to_string());
        }
    }

    impl FieldDocs for Order {
        fn field_doc(field: &str) -> Option<String> {
            (field == "total").then(|| "Order total".to_string())
        }
    }

    let json = expanded::<Order>();
    assert_eq!(json["title"], "Order");
    assert_eq!(json["properties"]["total"]["description"], "Order total");
}

#[test]
fn test_custom_schema_and_alias() {
    #[derive(Reflect)]
    #[reflect(custom_schema)]
    struct Money;

    impl CustomSchema for Money {
        fn json_schema() -> Schema {
            SchemaObject::with_format(InstanceType::String, "decimal").into()
        }
    }

    #[derive(Reflect)]
    #[reflect(alias)]
    struct Price;

    impl AliasSchema for Price {
        fn alias_type() -> Type {
            Type::of::<Money>()
        }
    }

    let json = serde_json::to_value(reflect_schema::reflect::<Price>().unwrap()).unwrap();
    assert_eq!(json["$ref"], "#/$defs/Money");
    assert_eq!(json["$defs"]["Money"]["format"], "decimal");
}

#[test]
fn test_generic_struct() {
    #[derive(Reflect)]
    #[allow(dead_code)]
    struct Page<T> {
        #[reflect(json = "items")]
        items: Vec<T>,
        #[reflect(json = "total")]
        total: usize,
    }

    let json = expanded::<Page<bool>>();
    assert_eq!(json["properties"]["items"]["items"]["type"], "boolean");
    assert_eq!(Type::of::<Page<bool>>().name(), "Page");
}
