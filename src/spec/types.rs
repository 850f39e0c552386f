use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::HashMap;

/// A loaded API description: the path → verb → operation table plus the
/// shared components catalogue that `$ref`s resolve against.
///
/// The model is deliberately a subset of OpenAPI 3.0, limited to the pieces
/// the stub server consumes, enriched with the vendor extensions that link
/// response schemas to fixture data (`x-resourceId`) and describe which
/// fields a client may expand (`x-expandableFields`, `x-expansionResources`).
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct Api {
    pub paths: IndexMap<String, PathItem>,
    pub components: Components,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct Components {
    pub schemas: IndexMap<String, Schema>,
}

/// The operations available on a single path template, keyed by verb.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct PathItem {
    pub get: Option<Operation>,
    pub post: Option<Operation>,
    pub put: Option<Operation>,
    pub delete: Option<Operation>,
    pub patch: Option<Operation>,
    pub options: Option<Operation>,
    pub head: Option<Operation>,
}

impl PathItem {
    /// Iterate the operations present on this path in a fixed verb order.
    pub fn methods(&self) -> impl Iterator<Item = (http::Method, &Operation)> {
        [
            (http::Method::GET, &self.get),
            (http::Method::POST, &self.post),
            (http::Method::PUT, &self.put),
            (http::Method::DELETE, &self.delete),
            (http::Method::PATCH, &self.patch),
            (http::Method::OPTIONS, &self.options),
            (http::Method::HEAD, &self.head),
        ]
        .into_iter()
        .filter_map(|(method, op)| op.as_ref().map(|op| (method, op)))
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct Operation {
    #[serde(rename = "operationId")]
    pub operation_id: Option<String>,
    pub description: Option<String>,
    #[serde(rename = "requestBody")]
    pub request_body: Option<RequestBody>,
    /// Status-code string → response descriptor ("200", "default", ...).
    pub responses: HashMap<String, ResponseDef>,
}

impl Operation {
    /// The schema of the form-encoded request body, when the operation
    /// declares one. Only `application/x-www-form-urlencoded` is consulted;
    /// this API family never posts JSON bodies.
    pub fn form_request_schema(&self) -> Option<&Schema> {
        self.request_body
            .as_ref()?
            .content
            .get("application/x-www-form-urlencoded")?
            .schema
            .as_ref()
    }

    /// The schema of the 200 response's `application/json` content.
    pub fn ok_response_schema(&self) -> Option<&Schema> {
        self.responses
            .get("200")?
            .content
            .get("application/json")?
            .schema
            .as_ref()
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct RequestBody {
    pub required: bool,
    pub content: HashMap<String, MediaType>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct MediaType {
    pub schema: Option<Schema>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct ResponseDef {
    pub description: Option<String>,
    pub content: HashMap<String, MediaType>,
}

/// The `type` keyword of a schema. Anything outside the recognized set maps
/// to [`SchemaType::Unknown`] so a bad document surfaces as a generation
/// error rather than a load failure.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SchemaType {
    String,
    Integer,
    Number,
    Boolean,
    Array,
    Object,
    #[serde(other)]
    Unknown,
}

/// One node of a schema tree.
///
/// Deserialized structurally (every keyword optional) and classified through
/// [`Schema::kind`], which yields the discriminant all consumers dispatch on.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Schema {
    #[serde(rename = "$ref", skip_serializing_if = "Option::is_none")]
    pub reference: Option<String>,
    #[serde(rename = "type", skip_serializing_if = "Option::is_none")]
    pub schema_type: Option<SchemaType>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub format: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub items: Option<Box<Schema>>,
    #[serde(skip_serializing_if = "IndexMap::is_empty")]
    pub properties: IndexMap<String, Schema>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub required: Vec<String>,
    #[serde(rename = "anyOf", skip_serializing_if = "Vec::is_empty")]
    pub any_of: Vec<Schema>,
    #[serde(rename = "oneOf", skip_serializing_if = "Vec::is_empty")]
    pub one_of: Vec<Schema>,
    #[serde(rename = "enum", skip_serializing_if = "Vec::is_empty")]
    pub enum_values: Vec<Value>,
    #[serde(skip_serializing_if = "std::ops::Not::not")]
    pub nullable: bool,
    /// Marks this schema as the canonical shape of a named resource; the
    /// generator seeds matching objects from the fixture of that name.
    #[serde(rename = "x-resourceId", skip_serializing_if = "Option::is_none")]
    pub resource_id: Option<String>,
    /// Property names that clients may expand from an id into a full object.
    #[serde(rename = "x-expandableFields", skip_serializing_if = "Vec::is_empty")]
    pub expandable_fields: Vec<String>,
    /// For an expandable property, the object schemas it expands into
    /// (conventionally a `oneOf` list of `$ref`s).
    #[serde(rename = "x-expansionResources", skip_serializing_if = "Option::is_none")]
    pub expansion_resources: Option<Box<Schema>>,
}

/// Discriminant of a [`Schema`]. Keyword precedence follows how the
/// documents are written in practice: a `$ref` ignores siblings, a
/// composite ignores `type`, and `enum` wins over its carrier type.
#[derive(Debug, Clone, Copy)]
pub enum SchemaKind<'a> {
    Ref(&'a str),
    AnyOf(&'a [Schema]),
    OneOf(&'a [Schema]),
    Enum(&'a [Value]),
    Object,
    Array(Option<&'a Schema>),
    String,
    Integer,
    Number,
    Boolean,
    /// `type` present but not one this server understands.
    Unsupported,
    /// No recognizable keyword at all (e.g. a bare `{}` schema).
    Empty,
}

impl Schema {
    pub fn kind(&self) -> SchemaKind<'_> {
        if let Some(reference) = &self.reference {
            return SchemaKind::Ref(reference);
        }
        if !self.any_of.is_empty() {
            return SchemaKind::AnyOf(&self.any_of);
        }
        if !self.one_of.is_empty() {
            return SchemaKind::OneOf(&self.one_of);
        }
        if !self.enum_values.is_empty() {
            return SchemaKind::Enum(&self.enum_values);
        }
        match self.schema_type {
            Some(SchemaType::String) => SchemaKind::String,
            Some(SchemaType::Integer) => SchemaKind::Integer,
            Some(SchemaType::Number) => SchemaKind::Number,
            Some(SchemaType::Boolean) => SchemaKind::Boolean,
            Some(SchemaType::Array) => SchemaKind::Array(self.items.as_deref()),
            Some(SchemaType::Object) => SchemaKind::Object,
            Some(SchemaType::Unknown) => SchemaKind::Unsupported,
            None if !self.properties.is_empty() => SchemaKind::Object,
            None => SchemaKind::Empty,
        }
    }

    pub fn is_expandable_field(&self, name: &str) -> bool {
        self.expandable_fields.iter().any(|f| f == name)
    }
}

/// Canonical sample documents keyed by resource name, loaded alongside the
/// API description. The generator copies fixture values into responses so
/// that stubbed objects look like real ones.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct Fixtures {
    pub resources: HashMap<String, Value>,
}

impl Fixtures {
    pub fn get(&self, resource_id: &str) -> Option<&Value> {
        self.resources.get(resource_id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn schema_kind_precedence() {
        let schema: Schema = serde_json::from_value(json!({
            "$ref": "#/components/schemas/charge",
            "type": "string"
        }))
        .unwrap();
        assert!(matches!(schema.kind(), SchemaKind::Ref(_)));

        let schema: Schema = serde_json::from_value(json!({
            "type": "string",
            "enum": ["charge"]
        }))
        .unwrap();
        assert!(matches!(schema.kind(), SchemaKind::Enum(_)));

        let schema: Schema = serde_json::from_value(json!({
            "properties": { "id": { "type": "string" } }
        }))
        .unwrap();
        assert!(matches!(schema.kind(), SchemaKind::Object));

        let schema: Schema = serde_json::from_value(json!({})).unwrap();
        assert!(matches!(schema.kind(), SchemaKind::Empty));
    }

    #[test]
    fn unknown_type_is_tolerated_at_load_time() {
        let schema: Schema = serde_json::from_value(json!({ "type": "file" })).unwrap();
        assert!(matches!(schema.kind(), SchemaKind::Unsupported));
    }

    #[test]
    fn vendor_extensions_round_trip() {
        let schema: Schema = serde_json::from_value(json!({
            "type": "object",
            "x-resourceId": "charge",
            "x-expandableFields": ["customer"],
            "properties": {
                "customer": {
                    "anyOf": [
                        { "type": "string" },
                        { "$ref": "#/components/schemas/customer" }
                    ],
                    "x-expansionResources": {
                        "oneOf": [{ "$ref": "#/components/schemas/customer" }]
                    }
                }
            }
        }))
        .unwrap();
        assert_eq!(schema.resource_id.as_deref(), Some("charge"));
        assert!(schema.is_expandable_field("customer"));
        let customer = &schema.properties["customer"];
        assert_eq!(customer.expansion_resources.as_ref().unwrap().one_of.len(), 1);

        // Serialization must not invent keywords: the validator compiles
        // whatever this produces.
        let round = serde_json::to_value(&schema).unwrap();
        assert!(round.get("$ref").is_none());
        assert!(round.get("nullable").is_none());
        assert!(round.get("enum").is_none());
    }

    #[test]
    fn path_item_methods_in_fixed_verb_order() {
        let item: PathItem = serde_json::from_value(json!({
            "post": { "operationId": "create" },
            "get": { "operationId": "list" }
        }))
        .unwrap();
        let verbs: Vec<_> = item.methods().map(|(m, _)| m).collect();
        assert_eq!(verbs, vec![http::Method::GET, http::Method::POST]);
    }
}
