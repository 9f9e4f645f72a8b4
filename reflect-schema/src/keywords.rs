//! Keyword application from field annotations
//!
//! Schema tokens have the form `key=value`; tokens without `=` are flags
//! handled elsewhere (`required`, `nullable`) and are skipped here. Generic
//! keywords apply to every property; the rest are interpreted according to
//! the property's `type`.

use serde_json::{Number, Value};

use crate::schema::{InstanceType, Schema, SchemaObject};
use crate::tags::FieldTags;

/// Apply a field's annotations to its property schema
///
/// `parent` is the object schema the property belongs to; composition
/// keywords such as `oneof_required` are grafted onto it.
pub(crate) fn apply_field_keywords(
    schema: &mut SchemaObject,
    parent: &mut SchemaObject,
    property: &str,
    tags: &FieldTags,
) {
    schema.description = tags.description.clone();

    let unprocessed = generic_keywords(schema, parent, property, &tags.schema);
    apply_typed_keywords(schema, &unprocessed, true);
    extra_keywords(schema, &tags.extras);
}

fn apply_typed_keywords(schema: &mut SchemaObject, tokens: &[&str], allow_array: bool) {
    match schema.instance_type {
        Some(InstanceType::String) => string_keywords(schema, tokens),
        Some(InstanceType::Number | InstanceType::Integer) => numeric_keywords(schema, tokens),
        Some(InstanceType::Array) if allow_array => array_keywords(schema, tokens),
        Some(InstanceType::Boolean) => boolean_keywords(schema, tokens),
        _ => {}
    }
}

fn generic_keywords<'a>(
    schema: &mut SchemaObject,
    parent: &mut SchemaObject,
    property: &str,
    tokens: &'a [String],
) -> Vec<&'a str> {
    let mut unprocessed = Vec::new();

    for token in tokens {
        let Some((name, value)) = token.split_once('=') else {
            continue;
        };
        match name {
            "title" => schema.title = Some(value.to_string()),
            "description" => schema.description = Some(value.to_string()),
            "type" => {
                if let Some(instance_type) = InstanceType::from_name(value) {
                    schema.instance_type = Some(instance_type);
                }
            }
            "anchor" => schema.anchor = Some(value.to_string()),
            "oneof_required" => require_in_alternative(&mut parent.one_of, value, property),
            "anyof_required" => require_in_alternative(&mut parent.any_of, value, property),
            "oneof_ref" => {
                let target = item_or_self(schema);
                target.reference = None;
                target.one_of.extend(value.split(';').map(Schema::new_ref));
            }
            "anyof_ref" => {
                let target = item_or_self(schema);
                target.reference = None;
                target.any_of.extend(value.split(';').map(Schema::new_ref));
            }
            "oneof_type" => {
                schema.instance_type = None;
                schema.one_of.extend(typed_alternatives(value));
            }
            "anyof_type" => {
                schema.instance_type = None;
                schema.any_of.extend(typed_alternatives(value));
            }
            _ => unprocessed.push(token.as_str()),
        }
    }

    unprocessed
}

/// Add `property` to the `required` list of the alternative titled `title`,
/// creating the alternative when missing
fn require_in_alternative(alternatives: &mut Vec<Schema>, title: &str, property: &str) {
    let existing = alternatives
        .iter()
        .rposition(|alt| alt.as_object().and_then(|obj| obj.title.as_deref()) == Some(title));

    let index = match existing {
        Some(index) => index,
        None => {
            alternatives.push(Schema::Object(SchemaObject {
                title: Some(title.to_string()),
                ..Default::default()
            }));
            alternatives.len() - 1
        }
    };

    alternatives[index]
        .ensure_object()
        .required
        .push(property.to_string());
}

fn item_or_self(schema: &mut SchemaObject) -> &mut SchemaObject {
    match schema.items {
        Some(ref mut items) => items.ensure_object(),
        None => schema,
    }
}

fn typed_alternatives(value: &str) -> impl Iterator<Item = Schema> + '_ {
    value
        .split(';')
        .filter_map(InstanceType::from_name)
        .map(|instance_type| SchemaObject::with_type(instance_type).into())
}

fn string_keywords(schema: &mut SchemaObject, tokens: &[&str]) {
    for (name, value) in key_values(tokens) {
        match name {
            "minLength" => schema.min_length = value.parse().ok(),
            "maxLength" => schema.max_length = value.parse().ok(),
            "pattern" => schema.pattern = Some(value.to_string()),
            "format" => schema.format = Some(value.to_string()),
            "readOnly" => schema.read_only = parse_bool(value),
            "writeOnly" => schema.write_only = parse_bool(value),
            "default" => schema.default = Some(Value::String(value.to_string())),
            "example" => schema.examples.push(Value::String(value.to_string())),
            "enum" => schema.enum_values.push(Value::String(value.to_string())),
            _ => {}
        }
    }
}

fn numeric_keywords(schema: &mut SchemaObject, tokens: &[&str]) {
    for (name, value) in key_values(tokens) {
        match name {
            "multipleOf" => schema.multiple_of = parse_number(value),
            "minimum" => schema.minimum = parse_number(value),
            "maximum" => schema.maximum = parse_number(value),
            "exclusiveMaximum" => schema.exclusive_maximum = parse_number(value),
            "exclusiveMinimum" => schema.exclusive_minimum = parse_number(value),
            "default" => {
                if let Some(number) = parse_number(value) {
                    schema.default = Some(Value::Number(number));
                }
            }
            "example" => {
                if let Some(number) = parse_number(value) {
                    schema.examples.push(Value::Number(number));
                }
            }
            "enum" => {
                if let Some(number) = parse_number(value) {
                    schema.enum_values.push(Value::Number(number));
                }
            }
            _ => {}
        }
    }
}

fn array_keywords(schema: &mut SchemaObject, tokens: &[&str]) {
    let mut defaults = Vec::new();
    let mut unprocessed = Vec::new();

    for token in tokens {
        let Some((name, value)) = token.split_once('=') else {
            continue;
        };
        match name {
            "minItems" => schema.min_items = value.parse().ok(),
            "maxItems" => schema.max_items = value.parse().ok(),
            "uniqueItems" => schema.unique_items = true,
            "default" => defaults.push(Value::String(value.to_string())),
            "format" => {
                if let Some(items) = schema.items.as_deref_mut() {
                    items.ensure_object().format = Some(value.to_string());
                }
            }
            "pattern" => {
                if let Some(items) = schema.items.as_deref_mut() {
                    items.ensure_object().pattern = Some(value.to_string());
                }
            }
            _ => unprocessed.push(*token),
        }
    }

    if !defaults.is_empty() {
        schema.default = Some(Value::Array(defaults));
    }

    if unprocessed.is_empty() {
        return;
    }

    // Keywords for nested arrays are ambiguous and left alone.
    if let Some(items) = schema.items.as_deref_mut().and_then(Schema::as_object_mut) {
        apply_typed_keywords(items, &unprocessed, false);
    }
}

fn boolean_keywords(schema: &mut SchemaObject, tokens: &[&str]) {
    for (name, value) in key_values(tokens) {
        if name == "default" {
            match value {
                "true" => schema.default = Some(Value::Bool(true)),
                "false" => schema.default = Some(Value::Bool(false)),
                _ => {}
            }
        }
    }
}

/// Merge `key=value` extension tokens into `extras`
///
/// A repeated key collects string values into a list; integer and boolean
/// values are re-read from the new token instead. A new `minimum` key is
/// always an integer.
pub(crate) fn extra_keywords(schema: &mut SchemaObject, tokens: &[String]) {
    for token in tokens {
        if let Some((key, value)) = token.split_once('=') {
            set_extra(schema, key, value);
        }
    }
}

fn set_extra(schema: &mut SchemaObject, key: &str, value: &str) {
    match schema.extras.get_mut(key) {
        Some(existing) => match existing {
            Value::String(previous) => {
                let previous = std::mem::take(previous);
                *existing = Value::Array(vec![
                    Value::String(previous),
                    Value::String(value.to_string()),
                ]);
            }
            Value::Array(values) => values.push(Value::String(value.to_string())),
            Value::Number(_) => *existing = Value::from(value.parse::<i64>().unwrap_or(0)),
            Value::Bool(_) => *existing = Value::Bool(value == "true" || value == "t"),
            _ => {}
        },
        None => {
            let new_value = match (key, value) {
                ("minimum", _) => Value::from(value.parse::<i64>().unwrap_or(0)),
                (_, "true") => Value::Bool(true),
                (_, "false") => Value::Bool(false),
                _ => Value::String(value.to_string()),
            };
            schema.extras.insert(key.to_string(), new_value);
        }
    }
}

fn key_values<'a>(tokens: &'a [&'a str]) -> impl Iterator<Item = (&'a str, &'a str)> + 'a {
    tokens.iter().filter_map(|token| token.split_once('='))
}

/// Integer if possible, float otherwise; `None` when neither parses
fn parse_number(value: &str) -> Option<Number> {
    if let Ok(int) = value.parse::<i64>() {
        return Some(Number::from(int));
    }
    if let Ok(uint) = value.parse::<u64>() {
        return Some(Number::from(uint));
    }
    value.parse::<f64>().ok().and_then(Number::from_f64)
}

/// Boolean spellings accepted for `readOnly`/`writeOnly`; anything else is false
fn parse_bool(value: &str) -> bool {
    matches!(value, "1" | "t" | "T" | "true" | "TRUE" | "True")
}
