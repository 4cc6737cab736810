//! Process-wide configuration. Kept in its own test binary so no other test
//! observes the global context changing.

use serde_json::json;
use shape_schema_core::SchemaNode;
use shape_schema_validate::{Schema, ValidationContext, ValidationOptions, ValidationOverrides};

fn count_schema() -> Schema {
    Schema::new(
        SchemaNode::object()
            .add_property("count", SchemaNode::integer(), true, false)
            .unwrap(),
    )
}

#[test]
fn test_global_configuration_lifecycle() {
    let global = ValidationContext::global();
    global.reset();

    let early = count_schema();
    let pinned = count_schema().configure_validation(ValidationOverrides::default());
    let compiled = count_schema();
    assert!(compiled.validate_value(json!({"count": "1"})).is_err());

    // last writer wins for schemas that have not compiled yet
    global.update(ValidationOverrides {
        coerce_types: Some(false),
        ..Default::default()
    });
    global.update(ValidationOverrides {
        coerce_types: Some(true),
        ..Default::default()
    });

    assert_eq!(
        early.validate_value(json!({"count": "1"})).unwrap(),
        json!({"count": 1})
    );
    assert!(count_schema().validate_value(json!({"count": "2"})).is_ok());
    assert!(compiled.validate_value(json!({"count": "1"})).is_err());
    assert!(pinned.validate_value(json!({"count": "1"})).is_err());

    global.reset();
    assert_eq!(global.get(), ValidationOptions::default());
    assert!(early.validate_value(json!({"count": "3"})).is_ok());
}
