//! Maps chat tokens onto a tool's declared input schema.
//!
//! Tokens of the form `key=value` bind to the property `key` (the value is
//! read as a JSON literal when it parses as one); a pair naming a property
//! the tool does not declare is dropped. Tokens without `=` are plain text:
//! a single-property tool receives all of it when no pair was given,
//! otherwise it goes to the first unbound string property in declaration
//! order.

use relay_core::{BoundArguments, InputSchema, ValidationError};
use serde_json::{Number, Value};
use std::collections::BTreeMap;
use tracing::debug;

/// Argument key used when the tool declares no schema at all.
pub const FALLBACK_KEY: &str = "inputs";

/// Flat `{field: value}` map returned by a chat form.
pub type FieldValues = BTreeMap<String, String>;

#[derive(Debug, Clone, Default, PartialEq)]
pub struct Binding {
    pub arguments: BoundArguments,
    /// Required properties with no value, in the schema's `required` order.
    pub missing_required: Vec<String>,
    /// Rejected pairs and plain text that no property could take.
    pub ignored: Vec<String>,
}

struct Token<'a> {
    raw: &'a str,
    pair: Option<(&'a str, &'a str)>,
}

impl<'a> Token<'a> {
    fn parse(raw: &'a str) -> Self {
        Self {
            raw,
            pair: raw.split_once('='),
        }
    }
}

fn literal(value: &str) -> Value {
    serde_json::from_str(value).unwrap_or_else(|_| Value::String(value.to_string()))
}

/// Bind `tokens` against `schema`.
pub fn bind<S: AsRef<str>>(tokens: &[S], schema: Option<&InputSchema>) -> Binding {
    let mut arguments = BoundArguments::new();
    let mut plain: Vec<&str> = Vec::new();
    let mut ignored = Vec::new();
    let mut pairs_given = false;

    for token in tokens.iter().map(|t| Token::parse(t.as_ref())) {
        let Some((key, value)) = token.pair else {
            plain.push(token.raw);
            continue;
        };
        pairs_given = true;
        // Without a schema every named pair is taken at face value.
        let accepted = match schema {
            Some(schema) => schema.has_property(key),
            None => !key.is_empty(),
        };
        if accepted {
            arguments.insert(key.to_string(), literal(value));
        } else {
            debug!("Dropping argument '{}': not a declared property", token.raw);
            ignored.push(token.raw.to_string());
        }
    }

    if !plain.is_empty() {
        let text = plain.join(" ");
        match schema {
            None => {
                arguments.insert(FALLBACK_KEY.to_string(), Value::String(text));
            }
            Some(schema) => match plain_text_target(schema, &arguments, pairs_given) {
                Some(name) => {
                    arguments.insert(name, Value::String(text));
                }
                None => {
                    debug!("No string property left for plain text: {:?}", text);
                    ignored.extend(plain.iter().map(|s| s.to_string()));
                }
            },
        }
    }

    let missing_required = missing(schema, &arguments);
    Binding {
        arguments,
        missing_required,
        ignored,
    }
}

fn plain_text_target(schema: &InputSchema, bound: &BoundArguments, pairs_given: bool) -> Option<String> {
    let mut properties = schema.property_list();
    if schema.properties.len() == 1 && !pairs_given {
        return properties.next().map(|p| p.name.to_string());
    }
    properties
        .find(|p| p.is_string() && !bound.contains_key(p.name))
        .map(|p| p.name.to_string())
}

fn missing(schema: Option<&InputSchema>, arguments: &BoundArguments) -> Vec<String> {
    schema
        .map(|schema| {
            schema
                .required
                .iter()
                .filter(|name| !arguments.contains_key(name.as_str()))
                .cloned()
                .collect()
        })
        .unwrap_or_default()
}

fn coerce(kind: Option<&str>, value: &str) -> Value {
    let coerced = match kind {
        Some("number") | Some("float") => value
            .trim()
            .parse::<f64>()
            .ok()
            .and_then(Number::from_f64)
            .map(Value::Number),
        Some("integer") => value.trim().parse::<i64>().ok().map(Value::from),
        Some("boolean") => match value.trim().to_ascii_lowercase().as_str() {
            "true" => Some(Value::Bool(true)),
            "false" => Some(Value::Bool(false)),
            _ => None,
        },
        _ => None,
    };
    coerced.unwrap_or_else(|| Value::String(value.to_string()))
}

impl Binding {
    pub fn is_complete(&self) -> bool {
        self.missing_required.is_empty()
    }

    /// Fold the values of a submitted chat form into the arguments.
    ///
    /// Empty values leave the argument untouched. Values are coerced to the
    /// property's declared type where they parse as one.
    pub fn merge_fields(&mut self, fields: &FieldValues, schema: Option<&InputSchema>) {
        for (name, value) in fields {
            if value.trim().is_empty() {
                continue;
            }
            let kind = match schema {
                Some(schema) => match schema.property(name) {
                    Some(property) => property.kind(),
                    None => {
                        debug!("Dropping form field '{}' not declared by the tool", name);
                        continue;
                    }
                },
                None => None,
            };
            self.arguments.insert(name.clone(), coerce(kind, value));
        }
        self.missing_required = missing(schema, &self.arguments);
    }

    /// The arguments, or the required fields still missing.
    pub fn require_complete(self) -> Result<BoundArguments, ValidationError> {
        if self.missing_required.is_empty() {
            Ok(self.arguments)
        } else {
            Err(ValidationError::MissingRequired(self.missing_required))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn schema(value: Value) -> InputSchema {
        serde_json::from_value(value).unwrap()
    }

    #[test]
    fn test_single_param_shortcut() {
        let schema = schema(json!({
            "type": "object",
            "properties": {"url": {"type": "string"}},
            "required": ["url"]
        }));
        let binding = bind(&["hello", "world"], Some(&schema));
        assert_eq!(Value::Object(binding.arguments.clone()), json!({"url": "hello world"}));
        assert!(binding.is_complete());
    }

    #[test]
    fn test_undeclared_pairs_are_dropped() {
        let single = schema(json!({"properties": {"query": {"type": "string"}}}));
        let binding = bind(&["https://example.com/?q=rust", "docs"], Some(&single));
        assert_eq!(Value::Object(binding.arguments), json!({"query": "docs"}));
        assert_eq!(binding.ignored, vec!["https://example.com/?q=rust"]);

        let pair = schema(json!({
            "properties": {"a": {"type": "string"}, "b": {"type": "number"}}
        }));
        let binding = bind(&["c=3", "hi"], Some(&pair));
        assert_eq!(Value::Object(binding.arguments), json!({"a": "hi"}));
        assert_eq!(binding.ignored, vec!["c=3"]);
    }

    #[test]
    fn test_rejected_pair_still_counts_as_a_pair() {
        // The single-property shortcut only applies when no pair was given,
        // so the text falls back to the first unbound string property.
        let text = schema(json!({"properties": {"q": {"type": "string"}}}));
        let binding = bind(&["lang=en", "rust", "async"], Some(&text));
        assert_eq!(Value::Object(binding.arguments), json!({"q": "rust async"}));
        assert_eq!(binding.ignored, vec!["lang=en"]);

        let count = schema(json!({"properties": {"n": {"type": "integer"}}}));
        let binding = bind(&["lang=en", "five"], Some(&count));
        assert!(binding.arguments.is_empty());
        assert_eq!(binding.ignored, vec!["lang=en", "five"]);
    }

    #[test]
    fn test_leftover_tokens_go_to_first_unbound_string() {
        let schema = schema(json!({
            "type": "object",
            "properties": {"a": {"type": "string"}, "b": {"type": "number"}}
        }));
        let binding = bind(&["b=5", "extra", "text"], Some(&schema));
        assert_eq!(Value::Object(binding.arguments), json!({"b": 5, "a": "extra text"}));
        assert!(binding.ignored.is_empty());
    }

    #[test]
    fn test_non_string_properties_are_never_auto_filled() {
        let schema = schema(json!({
            "properties": {
                "count": {"type": "integer"},
                "verbose": {"type": "boolean"}
            }
        }));
        let binding = bind(&["lots", "please"], Some(&schema));
        assert!(binding.arguments.is_empty());
        assert_eq!(binding.ignored, vec!["lots", "please"]);
    }

    #[test]
    fn test_explicit_pairs_skip_bound_strings() {
        let schema = schema(json!({
            "properties": {
                "title": {"type": "string"},
                "body": {"type": "string"}
            }
        }));
        let binding = bind(&["title=\"Release notes\"", "ship", "it"], Some(&schema));
        assert_eq!(
            Value::Object(binding.arguments),
            json!({"title": "Release notes", "body": "ship it"})
        );
    }

    #[test]
    fn test_values_parse_as_json_literals() {
        let schema = schema(json!({
            "properties": {
                "n": {"type": "number"},
                "flag": {"type": "boolean"},
                "tags": {"type": "array"},
                "name": {"type": "string"},
                "empty": {"type": "string"}
            }
        }));
        let binding = bind(&["n=1.5", "flag=true", "tags=[\"a\",\"b\"]", "name=bob", "empty="], Some(&schema));
        assert_eq!(
            Value::Object(binding.arguments),
            json!({"n": 1.5, "flag": true, "tags": ["a", "b"], "name": "bob", "empty": ""})
        );
    }

    #[test]
    fn test_missing_required_in_declared_order() {
        let schema = schema(json!({
            "properties": {"x": {"type": "string"}, "y": {"type": "string"}, "z": {"type": "integer"}},
            "required": ["z", "x", "y"]
        }));
        let binding = bind(&["x=1"], Some(&schema));
        assert_eq!(binding.missing_required, vec!["z", "y"]);

        let err = binding.require_complete().unwrap_err();
        assert_eq!(err, ValidationError::MissingRequired(vec!["z".into(), "y".into()]));
    }

    #[test]
    fn test_missing_required_example() {
        let schema = schema(json!({
            "properties": {"x": {"type": "string"}, "y": {"type": "string"}},
            "required": ["x", "y"]
        }));
        let binding = bind(&["x=value"], Some(&schema));
        assert_eq!(binding.missing_required, vec!["y"]);
    }

    #[test]
    fn test_no_schema_uses_fallback_key() {
        let binding = bind(&["limit=3", "what", "is", "mcp"], None);
        assert_eq!(
            Value::Object(binding.arguments),
            json!({"limit": 3, "inputs": "what is mcp"})
        );
        assert!(binding.missing_required.is_empty());
    }

    #[test]
    fn test_no_tokens() {
        let schema = schema(json!({"properties": {"q": {"type": "string"}}, "required": ["q"]}));
        let binding = bind::<&str>(&[], Some(&schema));
        assert!(binding.arguments.is_empty());
        assert_eq!(binding.missing_required, vec!["q"]);
        assert!(bind::<&str>(&[], None).arguments.is_empty());
    }

    #[test]
    fn test_merge_fields_coerces_declared_types() {
        let schema = schema(json!({
            "properties": {
                "city": {"type": "string"},
                "days": {"type": "integer"},
                "ratio": {"type": "number"},
                "metric": {"type": "boolean"},
                "note": {"type": "string"}
            },
            "required": ["city", "days"]
        }));
        let mut binding = bind::<&str>(&[], Some(&schema));
        assert_eq!(binding.missing_required, vec!["city", "days"]);

        let fields: FieldValues = [
            ("city", "Osaka"),
            ("days", "3"),
            ("ratio", "0.25"),
            ("metric", "TRUE"),
            ("note", "   "),
            ("unknown", "x"),
        ]
        .into_iter()
        .map(|(k, v)| (k.to_string(), v.to_string()))
        .collect();
        binding.merge_fields(&fields, Some(&schema));

        assert!(binding.is_complete());
        let args = Value::Object(binding.require_complete().unwrap());
        assert_eq!(args, json!({"city": "Osaka", "days": 3, "metric": true, "ratio": 0.25}));
    }

    #[test]
    fn test_merge_fields_falls_back_to_strings() {
        let schema = schema(json!({"properties": {"days": {"type": "integer"}}}));
        let mut binding = Binding::default();
        let fields = FieldValues::from([("days".to_string(), "a few".to_string())]);
        binding.merge_fields(&fields, Some(&schema));
        assert_eq!(binding.arguments["days"], json!("a few"));
    }
}
