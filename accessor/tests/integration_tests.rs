use serde_json::json;
use shape_schema_accessor::{Accessor, AccessorError, PathSegment, SharedValue};
use shape_schema_core::{PropertySpec, SchemaNode};
use shape_schema_validate::{Schema, ValidationContext};

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

fn board_node() -> SchemaNode {
    let task = SchemaNode::object()
        .add_properties([
            ("name", PropertySpec::Required(SchemaNode::string())),
            ("progress", PropertySpec::Required(SchemaNode::number().with_maximum(100.0))),
        ])
        .unwrap();
    SchemaNode::object()
        .add_properties([
            ("title", PropertySpec::Required(SchemaNode::string())),
            ("tasks", PropertySpec::Required(SchemaNode::array(task))),
            ("meta", PropertySpec::Optional(SchemaNode::object())),
        ])
        .unwrap()
}

fn board() -> SharedValue {
    SharedValue::from(json!({
        "title": "sprint",
        "tasks": [
            {"name": "a", "progress": 10},
            {"name": "b", "progress": 50}
        ],
        "meta": {}
    }))
}

// ---------------------------------------------------------------------------
// Structural sharing
// ---------------------------------------------------------------------------

#[test]
fn test_set_copies_only_the_changed_path() {
    let root = board();
    let progress = Accessor::for_schema(board_node()).at("tasks").at(1).at("progress");
    let updated = progress.set(&root, SharedValue::from(80_i64)).unwrap();

    let old_tasks = root.get("tasks").unwrap();
    let new_tasks = updated.get("tasks").unwrap();
    assert!(!new_tasks.shares_with(old_tasks));
    assert!(new_tasks.index(0).unwrap().shares_with(old_tasks.index(0).unwrap()));
    assert!(!new_tasks.index(1).unwrap().shares_with(old_tasks.index(1).unwrap()));
    assert!(updated.get("meta").unwrap().shares_with(root.get("meta").unwrap()));

    assert_eq!(progress.get(&root), Some(SharedValue::from(50_i64)));
    assert_eq!(progress.get(&updated), Some(SharedValue::from(80_i64)));
}

#[test]
fn test_call_and_text_forms_are_identical() {
    let base = Accessor::for_schema(board_node());
    let called = base.at("tasks").at(0).at("name");
    let parsed = base.at_path("tasks[0].name").unwrap();
    assert_eq!(called, parsed);
    assert_eq!(called.to_string(), "tasks[0].name");
    assert_eq!(
        called.path(),
        [
            PathSegment::from("tasks"),
            PathSegment::from(0),
            PathSegment::from("name")
        ]
    );
    assert_eq!(called.schema(), Some(&SchemaNode::string()));
}

// ---------------------------------------------------------------------------
// Working with validation
// ---------------------------------------------------------------------------

#[test]
fn test_validate_after_update() {
    let schema = Schema::with_context(board_node(), ValidationContext::default());
    let root = board();
    assert!(schema.validate_value(root.to_value()).is_ok());

    let progress = Accessor::parse("tasks[0].progress").unwrap();
    let updated = progress
        .update(&root, |current| {
            let value = current.and_then(SharedValue::as_i64).unwrap_or(0);
            SharedValue::from(value + 200)
        })
        .unwrap();
    let err = schema.validate_value(updated.to_value()).unwrap_err();
    assert_eq!(
        err.to_string(),
        "Invalid parameters: data/tasks/0/progress must be <= 100"
    );
}

#[test]
fn test_errors_name_the_path() {
    let root = board();
    let read_only = Accessor::parse("title")
        .unwrap()
        .transform_read_only(|v| SharedValue::from(v.as_str().unwrap_or_default().to_uppercase()));
    assert_eq!(read_only.get(&root), Some(SharedValue::from("SPRINT")));

    let err = read_only.set(&root, SharedValue::from("X")).unwrap_err();
    assert_eq!(
        err.to_string(),
        "cannot set 'title': transform has no inverse mapping"
    );

    let err = Accessor::for_schema(board_node())
        .at("title")
        .narrow(None::<fn(&SchemaNode) -> shape_schema_accessor::Result<SchemaNode>>)
        .unwrap_err();
    assert!(matches!(err, AccessorError::NarrowWithoutTransform { path } if path == "title"));
}
