use serde::Deserialize;
use serde_json::{json, Value};
use shape_schema_core::{MergeStrategy, PropertySpec, SchemaNode, merge_schemas};
use shape_schema_validate::{
    CompileError, Keyword, Schema, SchemaValidationError, ValidationContext, ValidationOptions,
    ValidationOverrides,
};

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

fn task_node() -> SchemaNode {
    SchemaNode::object()
        .add_properties([
            ("name", PropertySpec::Required(SchemaNode::string())),
            ("progress", PropertySpec::Required(SchemaNode::number())),
            ("isCompleted", PropertySpec::Optional(SchemaNode::boolean())),
        ])
        .unwrap()
}

/// Schema isolated from the process-wide context.
fn schema(node: SchemaNode) -> Schema {
    Schema::with_context(node, ValidationContext::default())
}

fn schema_with(node: SchemaNode, overrides: ValidationOverrides) -> Schema {
    schema(node).configure_validation(overrides)
}

fn message(result: Result<Value, SchemaValidationError>) -> String {
    result.unwrap_err().to_string()
}

// ---------------------------------------------------------------------------
// Error messages
// ---------------------------------------------------------------------------

#[test]
fn test_task_schema_reports_all_missing_properties() {
    let task = schema(task_node());
    assert_eq!(
        task.validate_value(json!({"name": "t", "progress": 0})).unwrap(),
        json!({"name": "t", "progress": 0})
    );
    assert_eq!(
        message(task.validate_value(json!({}))),
        "Invalid parameters: data must have required property 'name', \
         data must have required property 'progress'"
    );
}

#[test]
fn test_task_schema_first_error_only() {
    let task = schema_with(
        task_node(),
        ValidationOverrides {
            all_errors: Some(false),
            ..Default::default()
        },
    );
    let err = task.validate_value(json!({})).unwrap_err();
    assert_eq!(
        err.to_string(),
        "Invalid parameters: data must have required property 'name'"
    );
    assert_eq!(err.issues().len(), 1);
}

#[test]
fn test_nested_paths_and_issue_order() {
    let node = SchemaNode::object()
        .add_property("owner", task_node(), true, false)
        .unwrap()
        .add_property(
            "tags",
            SchemaNode::array(SchemaNode::string().with_max_length(3)),
            true,
            false,
        )
        .unwrap();
    let err = schema(node)
        .validate_value(json!({
            "owner": {"name": 1, "progress": -1, "isCompleted": "no"},
            "tags": ["ok", "toolong"]
        }))
        .unwrap_err();

    let paths: Vec<(&str, Keyword)> = err
        .issues()
        .iter()
        .map(|i| (i.instance_path.as_str(), i.keyword))
        .collect();
    assert_eq!(
        paths,
        vec![
            ("/owner/name", Keyword::Type),
            ("/owner/isCompleted", Keyword::Type),
            ("/tags/1", Keyword::MaxLength),
        ]
    );
    assert!(err.to_string().ends_with("data/tags/1 must NOT have more than 3 characters"));
}

#[test]
fn test_const_and_enum_messages() {
    let node = SchemaNode::object()
        .add_property("kind", SchemaNode::constant("task"), true, false)
        .unwrap()
        .add_property(
            "level",
            SchemaNode::enumeration([json!("low"), json!("high")]),
            true,
            false,
        )
        .unwrap();
    assert_eq!(
        message(schema(node).validate_value(json!({"kind": "note", "level": "mid"}))),
        "Invalid parameters: data/kind must be equal to constant, \
         data/level must be equal to one of the allowed values"
    );
}

// ---------------------------------------------------------------------------
// Combinators end to end
// ---------------------------------------------------------------------------

#[test]
fn test_one_of_tagged_branches() {
    let foo = SchemaNode::object()
        .add_property("type", SchemaNode::constant("foo"), true, false)
        .unwrap()
        .add_property("foo", SchemaNode::string(), true, false)
        .unwrap();
    let bar = SchemaNode::object()
        .add_property("type", SchemaNode::constant("bar"), true, false)
        .unwrap()
        .add_property("bar", SchemaNode::number(), true, false)
        .unwrap();
    let either = schema(SchemaNode::one_of(vec![foo, bar]).unwrap());

    assert!(either.validate_value(json!({"type": "foo", "foo": "x"})).is_ok());
    assert!(either.validate_value(json!({"type": "bar", "bar": 1})).is_ok());

    let err = either
        .validate_value(json!({"type": "foo", "bar": 42}))
        .unwrap_err();
    let text = err.to_string();
    assert!(text.contains("data must have required property 'foo'"));
    assert!(text.ends_with("data must match exactly one schema in oneOf"));
}

#[test]
fn test_added_then_picked_property() {
    let base = schema(task_node());
    let picked = base
        .derive(|node| {
            node.add_property("owner", SchemaNode::string(), true, false)?
                .pick_properties(&["owner"])
        })
        .unwrap();
    assert!(picked.validate_value(json!({"owner": "ana"})).is_ok());
    assert_eq!(
        message(picked.validate_value(json!({}))),
        "Invalid parameters: data must have required property 'owner'"
    );
    assert!(picked.validate_value(json!({"owner": "ana", "name": "t"})).is_err());
}

#[test]
fn test_rename_round_trip() {
    let renamed = schema(task_node())
        .derive(|node| node.rename_property("name", "title"))
        .unwrap();
    assert!(renamed.validate_value(json!({"title": "t", "progress": 1})).is_ok());
    assert!(renamed.validate_value(json!({"name": "t", "progress": 1})).is_err());

    let restored = renamed
        .derive(|node| node.rename_property("title", "name"))
        .unwrap();
    assert_eq!(restored.node().properties, task_node().properties);
    assert!(restored.node().is_required("name"));
    assert!(restored.validate_value(json!({"name": "t", "progress": 1})).is_ok());
}

#[test]
fn test_pick_additional_properties_with_remove_additional() {
    let node = SchemaNode::object()
        .add_property("s", SchemaNode::string(), true, false)
        .unwrap()
        .add_property("n", SchemaNode::number(), true, false)
        .unwrap();
    let picked = schema_with(
        node,
        ValidationOverrides {
            remove_additional: Some(true),
            ..Default::default()
        },
    )
    .derive(|node| node.pick_additional_properties(&["s"], Some(&[] as &[&str])))
    .unwrap();

    let stored = picked
        .validate_value(json!({"s": "x", "extra": 1}))
        .unwrap();
    assert_eq!(stored, json!({"s": "x"}));
}

#[test]
fn test_optionals_accept_empty_object() {
    let node = SchemaNode::object()
        .add_property("size", SchemaNode::integer().with_default(10), true, false)
        .unwrap()
        .add_property("name", SchemaNode::string(), true, false)
        .unwrap();
    let full = schema(node);
    assert!(full.validate_value(json!({})).is_err());

    let patch = full.derive(|node| Ok(node.to_optionals())).unwrap();
    assert_eq!(patch.validate_value(json!({})).unwrap(), json!({}));
}

#[test]
fn test_nullable_derivation() {
    let nullable = schema(task_node())
        .derive(|node| Ok(node.to_deep_nullable()))
        .unwrap();
    assert!(nullable.validate_value(Value::Null).is_ok());
    assert!(
        nullable
            .validate_value(json!({"name": null, "progress": null}))
            .is_ok()
    );
}

#[test]
fn test_merged_schema_validates_union_types() {
    let base = SchemaNode::object()
        .add_property("id", SchemaNode::integer(), true, false)
        .unwrap();
    let overlay = SchemaNode::object()
        .add_property("id", SchemaNode::string(), false, false)
        .unwrap();
    let merged = schema(merge_schemas(base, overlay, MergeStrategy::Merge).unwrap());
    assert!(merged.validate_value(json!({"id": 1})).is_ok());
    assert!(merged.validate_value(json!({"id": "a"})).is_ok());
    assert!(merged.validate_value(json!({})).is_err());
}

#[test]
fn test_merged_overlapping_types_accept_values_valid_on_both_sides() {
    let base = SchemaNode::object()
        .add_property("name", SchemaNode::string(), true, false)
        .unwrap();
    let overlay = SchemaNode::object()
        .add_property("name", SchemaNode::string().with_min_length(1), true, false)
        .unwrap();
    let merged = schema(base.merge_properties(overlay).unwrap());

    assert!(merged.validate_value(json!({"name": "abc"})).is_ok());
    assert!(merged.validate_value(json!({"name": ""})).is_ok());
    assert!(
        message(merged.validate_value(json!({"name": 5})))
            .ends_with("data/name must match a schema in anyOf")
    );
}

#[test]
fn test_transformed_property_accepts_overlapping_alternate() {
    let node = SchemaNode::object()
        .add_property("contact", SchemaNode::string(), true, false)
        .unwrap()
        .transform_properties(&SchemaNode::string().with_format("email"), None)
        .unwrap();
    let transformed = schema(node);

    assert!(transformed.validate_value(json!({"contact": "a@b.io"})).is_ok());
    assert!(transformed.validate_value(json!({"contact": "front desk"})).is_ok());
    assert!(transformed.validate_value(json!({"contact": 7})).is_err());
}

// ---------------------------------------------------------------------------
// Caching and isolation
// ---------------------------------------------------------------------------

#[test]
fn test_clone_changes_do_not_leak() {
    let original = schema(task_node());
    let samples = [
        json!({"name": "t", "progress": 1}),
        json!({"name": "t"}),
        json!({}),
    ];
    let before: Vec<bool> = samples.iter().map(|s| original.is_valid(s)).collect();

    let _changed = original
        .clone()
        .derive(|node| Ok(node.remove_property("progress")?.to_optionals()))
        .unwrap();
    let _nullable = original.derive(|node| Ok(node.to_nullable())).unwrap();

    let after: Vec<bool> = samples.iter().map(|s| original.is_valid(s)).collect();
    assert_eq!(before, after);
    assert_eq!(before, vec![true, false, false]);
}

#[test]
fn test_shared_context_applies_until_first_compile() {
    let context = ValidationContext::default();
    let compiled = Schema::with_context(task_node(), context.clone());
    let fresh = Schema::with_context(task_node(), context.clone());
    assert!(compiled.validate_value(json!({"name": "t", "progress": "1"})).is_err());

    context.update(ValidationOverrides {
        coerce_types: Some(true),
        ..Default::default()
    });
    assert!(compiled.validate_value(json!({"name": "t", "progress": "1"})).is_err());
    assert_eq!(
        fresh
            .validate_value(json!({"name": "t", "progress": "1"}))
            .unwrap(),
        json!({"name": "t", "progress": 1})
    );
}

// ---------------------------------------------------------------------------
// Lists, coercion, defaults
// ---------------------------------------------------------------------------

#[test]
fn test_validate_list() {
    let task = schema_with(
        task_node(),
        ValidationOverrides {
            coerce_types: Some(true),
            ..Default::default()
        },
    );

    let mut values = vec![
        json!({"name": "a", "progress": "1"}),
        json!({"name": "b", "progress": 2}),
    ];
    task.validate_list(&mut values).unwrap();
    assert_eq!(values[0]["progress"], json!(1));

    let mut values = vec![json!({"name": "a", "progress": 1}), json!({}), json!({})];
    let err = task.validate_list(&mut values).unwrap_err();
    assert!(err.issues().iter().all(|i| i.instance_path == "/1"));
    assert_eq!(err.issues().len(), 2);

    let err = task.validate_list(&mut Vec::new()).unwrap_err();
    assert_eq!(
        err.to_string(),
        "Invalid parameters: data must NOT have fewer than 1 items"
    );
}

#[test]
fn test_defaults_fill_required_only() {
    let node = SchemaNode::object()
        .add_property("page", SchemaNode::integer().with_default(1), true, false)
        .unwrap()
        .add_property("filter", SchemaNode::string().with_default("all"), false, false)
        .unwrap();
    let filled = schema(node.clone()).validate_value(json!({})).unwrap();
    assert_eq!(filled, json!({"page": 1}));

    let untouched = schema_with(
        node,
        ValidationOverrides {
            use_defaults: Some(false),
            ..Default::default()
        },
    );
    assert!(untouched.validate_value(json!({})).is_err());
}

#[test]
fn test_parse_typed_shape() {
    #[derive(Debug, Deserialize, PartialEq)]
    #[serde(rename_all = "camelCase")]
    struct Task {
        name: String,
        progress: f64,
        is_completed: Option<bool>,
    }

    let task = schema(task_node());
    let parsed: Task = task
        .parse(json!({"name": "t", "progress": 0.5, "isCompleted": true}))
        .unwrap();
    assert_eq!(
        parsed,
        Task {
            name: "t".into(),
            progress: 0.5,
            is_completed: Some(true),
        }
    );
    assert!(matches!(
        task.parse::<Task>(json!({"name": "t"})),
        Err(SchemaValidationError::Invalid { .. })
    ));
}

#[test]
fn test_formats_enforced() {
    let node = SchemaNode::object()
        .add_property("at", SchemaNode::string().with_format("date-time"), true, false)
        .unwrap()
        .add_property("mail", SchemaNode::string().with_format("email"), true, false)
        .unwrap();
    let s = schema(node);
    assert!(
        s.validate_value(json!({"at": "2024-01-15T10:30:00Z", "mail": "a@b.io"}))
            .is_ok()
    );
    assert_eq!(
        message(s.validate_value(json!({"at": "yesterday", "mail": "a@b.io"}))),
        "Invalid parameters: data/at must match format \"date-time\""
    );
}

// ---------------------------------------------------------------------------
// Strict mode
// ---------------------------------------------------------------------------

#[test]
fn test_strict_compile_errors() {
    let strict = ValidationOverrides {
        strict: Some(true),
        ..Default::default()
    };

    let optional_default = SchemaNode::object()
        .add_property("n", SchemaNode::integer().with_default(0), false, false)
        .unwrap();
    assert!(schema(optional_default.clone()).validate_value(json!({})).is_ok());
    let err = schema_with(optional_default, strict)
        .validate_value(json!({}))
        .unwrap_err();
    assert!(matches!(
        err,
        SchemaValidationError::Compile(CompileError::DefaultOnOptional { .. })
    ));

    let unknown = SchemaNode::string().with_format("color");
    assert!(schema(unknown.clone()).validate_value(json!("red")).is_ok());
    assert!(matches!(
        schema_with(unknown, strict).validate_value(json!("red")),
        Err(SchemaValidationError::Compile(CompileError::UnknownFormat { .. }))
    ));
}

#[test]
fn test_options_load_from_yaml() {
    use std::io::Write;

    let mut file = tempfile::NamedTempFile::new().unwrap();
    writeln!(file, "coerceTypes: true\nallErrors: false").unwrap();
    let options = ValidationOptions::load(file.path()).unwrap();

    let context = ValidationContext::new(options);
    let s = Schema::with_context(task_node(), context);
    assert_eq!(
        s.validate_value(json!({"name": 5, "progress": "2"})).unwrap(),
        json!({"name": "5", "progress": 2})
    );
}
