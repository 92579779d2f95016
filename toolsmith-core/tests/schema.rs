use serde_json::json;
use toolsmith_core::schema::{compile, Validator};

#[test]
fn object_with_required_fields_preserves_extras() {
    let v = compile(&json!({
        "type": "object",
        "required": ["a", "b"],
        "properties": { "a": { "type": "string" }, "b": { "type": "number" } }
    }));

    let ok = v.validate(&json!({"a": "x", "b": 2.5, "extra": true}));
    assert!(ok.is_valid());
    assert_eq!(ok.into_result().unwrap(), json!({"a": "x", "b": 2.5, "extra": true}));

    let missing = v.validate(&json!({"a": "x"}));
    let issues = missing.issues();
    assert_eq!(issues.len(), 1);
    assert_eq!(issues[0].path, "b");
    assert_eq!(issues[0].expected, "number");
    assert_eq!(issues[0].received, "missing");
}

#[test]
fn additional_properties_false_rejects_unknown_keys() {
    let v = compile(&json!({
        "type": "object",
        "properties": { "a": { "type": "string" } },
        "additionalProperties": false
    }));
    let res = v.validate(&json!({"a": "x", "b": 1}));
    assert_eq!(res.issues().len(), 1);
    assert_eq!(res.issues()[0].path, "b");
}

#[test]
fn string_constraints_and_formats() {
    let v = compile(&json!({"type": "string", "minLength": 2, "maxLength": 4, "pattern": "^[a-z]+$"}));
    assert!(v.validate(&json!("abc")).is_valid());
    assert!(!v.validate(&json!("a")).is_valid());
    assert!(!v.validate(&json!("abcde")).is_valid());
    assert!(!v.validate(&json!("AB")).is_valid());
    assert!(!v.validate(&json!(12)).is_valid());

    let email = compile(&json!({"type": "string", "format": "email"}));
    assert!(email.validate(&json!("a@b.io")).is_valid());
    assert!(!email.validate(&json!("not-an-email")).is_valid());

    let uri = compile(&json!({"type": "string", "format": "uri"}));
    assert!(uri.validate(&json!("https://example.com/x")).is_valid());
    assert!(!uri.validate(&json!("::nope")).is_valid());

    let uuid = compile(&json!({"type": "string", "format": "uuid"}));
    assert!(uuid.validate(&json!("67e55044-10b1-426f-9247-bb680e5fe0c8")).is_valid());
    assert!(!uuid.validate(&json!("1234")).is_valid());

    // Unknown formats are not enforced.
    let date = compile(&json!({"type": "string", "format": "date-time"}));
    assert!(date.validate(&json!("whenever")).is_valid());
}

#[test]
fn numbers_and_integers() {
    let int = compile(&json!({"type": "integer", "minimum": 1, "maximum": 10}));
    assert!(int.validate(&json!(5)).is_valid());
    assert!(!int.validate(&json!(5.5)).is_valid());
    assert!(!int.validate(&json!(0)).is_valid());
    assert!(!int.validate(&json!(11)).is_valid());
    assert!(!int.validate(&json!("5")).is_valid());

    let exclusive = compile(&json!({"type": "number", "minimum": 0, "exclusiveMinimum": true}));
    assert!(!exclusive.validate(&json!(0)).is_valid());
    assert!(exclusive.validate(&json!(0.1)).is_valid());
}

#[test]
fn arrays_validate_items_with_indexed_paths() {
    let v = compile(&json!({
        "type": "array",
        "minItems": 1,
        "items": { "type": "object", "required": ["name"], "properties": { "name": { "type": "string" } } }
    }));
    assert!(v.validate(&json!([{"name": "a"}])).is_valid());
    assert!(!v.validate(&json!([])).is_valid());

    let res = v.validate(&json!([{"name": "a"}, {"name": 3}]));
    assert_eq!(res.issues().len(), 1);
    assert_eq!(res.issues()[0].path, "1.name");
}

#[test]
fn all_of_requires_every_branch() {
    let v = compile(&json!({
        "allOf": [
            { "type": "object", "required": ["a"], "properties": { "a": { "type": "string" } } },
            { "type": "object", "required": ["b"], "properties": { "b": { "type": "integer" } } }
        ]
    }));
    assert!(matches!(v, Validator::AllOf(_)));
    assert!(v.validate(&json!({"a": "x", "b": 1})).is_valid());
    let res = v.validate(&json!({"a": "x"}));
    assert_eq!(res.issues().len(), 1);
    assert_eq!(res.issues()[0].path, "b");
}

#[test]
fn one_of_and_any_of_accept_any_branch() {
    for key in ["oneOf", "anyOf"] {
        let v = compile(&json!({ key: [ { "type": "string" }, { "type": "integer" } ] }));
        assert!(v.validate(&json!("x")).is_valid());
        assert!(v.validate(&json!(3)).is_valid());
        let res = v.validate(&json!(true));
        assert_eq!(res.issues().len(), 1);
        assert_eq!(res.issues()[0].expected, "string | integer");
    }

    // oneOf exclusivity is not enforced: a value matching both branches passes.
    let overlapping = compile(&json!({ "oneOf": [ { "type": "number" }, { "type": "integer" } ] }));
    assert!(overlapping.validate(&json!(1)).is_valid());
}

#[test]
fn nullable_enum_and_type_arrays() {
    let v = compile(&json!({"type": "string", "nullable": true}));
    assert!(v.validate(&json!(null)).is_valid());
    assert!(v.validate(&json!("x")).is_valid());

    let t = compile(&json!({"type": ["integer", "null"]}));
    assert!(t.validate(&json!(null)).is_valid());
    assert!(!t.validate(&json!("x")).is_valid());

    let e = compile(&json!({"type": "string", "enum": ["asc", "desc"]}));
    assert!(e.validate(&json!("asc")).is_valid());
    assert!(!e.validate(&json!("up")).is_valid());
}

#[test]
fn unsupported_shapes_fall_back_to_any() {
    for schema in [
        json!(null),
        json!(true),
        json!({"$ref": "#/components/schemas/Node"}),
        json!({"type": "file"}),
        json!({"description": "anything goes"}),
        json!({"type": "string", "pattern": "(unclosed"}),
    ] {
        let v = compile(&schema);
        assert!(v.validate(&json!("text")).is_valid(), "schema {schema} should accept a string");
    }
    assert!(compile(&json!({"type": "file"})).is_any());
}

#[test]
fn properties_without_type_compile_to_object() {
    let v = compile(&json!({
        "required": ["id"],
        "properties": { "id": { "type": "string" } }
    }));
    assert!(matches!(v, Validator::Object(_)));
    assert!(!v.validate(&json!({})).is_valid());
}
