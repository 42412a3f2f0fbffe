//! Property tests for binding and projection.

use hypatia::prelude::*;
use hypatia::schema::ErrorKind;
use proptest::prelude::*;
use serde_json::json;
use std::sync::Arc;

fn bounded() -> OperationSpec {
    OperationSpec::builder("read_items")
        .path("/items/{item_id}")
        .param(Param::path(FieldSpec::new("item_id", FieldType::Int).ge(0.0).le(1000.0)))
        .param(Param::query(FieldSpec::new("size", FieldType::Float).gt(0.0).lt(10.5)))
        .build()
        .unwrap()
}

fn item() -> Arc<Schema> {
    Schema::builder("Item")
        .field(FieldSpec::new("name", FieldType::Str))
        .field(FieldSpec::new("description", FieldType::Str).optional())
        .field(FieldSpec::new("price", FieldType::Float))
        .field(FieldSpec::new("tags", FieldType::set(FieldType::Str)).default(json!([])))
        .build()
        .unwrap()
}

fn update_item() -> OperationSpec {
    let item = Schema::builder("Item")
        .field(FieldSpec::new("name", FieldType::Str))
        .field(FieldSpec::new("price", FieldType::Float).optional())
        .build()
        .unwrap();
    OperationSpec::builder("update_item")
        .path("/items/{item_id}")
        .param(Param::path(FieldSpec::new("item_id", FieldType::Int)))
        .param(Param::query(FieldSpec::new("q", FieldType::Str)))
        .param(Param::header(FieldSpec::new("x_token", FieldType::Str)))
        .param(Param::body(FieldSpec::new("item", FieldType::model(&item))))
        .param(Param::body(FieldSpec::new("importance", FieldType::Int)))
        .param(Param::query(FieldSpec::new("limit", FieldType::Int).default(json!(10))))
        .build()
        .unwrap()
}

// Required inputs of `update_item` below the path, by error location.
const REQUIRED: [&str; 5] = [
    "query.q",
    "header.x-token",
    "body.item",
    "body.item.name",
    "body.importance",
];

fn envelope_without(omitted: &str, q: &str, token: &str, importance: i64) -> RequestEnvelope {
    let mut builder = RequestEnvelope::builder().path_param("item_id", "5");
    if omitted != "query.q" {
        builder = builder.query("q", q);
    }
    if omitted != "header.x-token" {
        builder = builder.header("x-token", token);
    }
    let mut body = json!({"item": {"name": "Foo", "price": 1.5}, "importance": importance});
    match omitted {
        "body.item" => body.as_object_mut().unwrap().remove("item"),
        "body.item.name" => body["item"].as_object_mut().unwrap().remove("name"),
        "body.importance" => body.as_object_mut().unwrap().remove("importance"),
        _ => None,
    };
    builder.body(body).build()
}

#[test]
fn omitting_path_param_is_routing_fault() {
    let envelope = envelope_without("", "x", "t", 1);
    assert!(Engine::default().bind(&update_item(), &envelope).is_ok());

    let unrouted = RequestEnvelope::builder()
        .query("q", "x")
        .header("x-token", "t")
        .body(json!({"item": {"name": "Foo"}, "importance": 1}))
        .build();
    let err = Engine::default().bind(&update_item(), &unrouted).unwrap_err();
    assert!(matches!(err, BindError::UnmatchedPathParam { ref name, .. } if name == "item_id"));
}

proptest! {
    #[test]
    fn each_missing_required_field_reported_once(
        index in 0..REQUIRED.len(),
        q in "[a-z]{1,8}",
        token in "[a-z0-9]{1,8}",
        importance in -100i64..100,
    ) {
        let omitted = REQUIRED[index];
        let envelope = envelope_without(omitted, &q, &token, importance);
        let err = Engine::default().bind(&update_item(), &envelope).unwrap_err();
        let errors = err.validation_errors().unwrap();
        prop_assert_eq!(errors.len(), 1);
        let error = &errors.as_slice()[0];
        prop_assert_eq!(error.kind(), ErrorKind::MissingRequired);
        prop_assert_eq!(error.location().to_string(), omitted);
    }

    #[test]
    fn integer_bounds_hold(item_id in -2000i64..2000) {
        let envelope = RequestEnvelope::builder()
            .path_param("item_id", item_id.to_string())
            .query("size", "1")
            .build();
        let result = Engine::default().bind(&bounded(), &envelope);
        prop_assert_eq!(result.is_ok(), (0..=1000).contains(&item_id));
        if let Ok(frame) = result {
            prop_assert_eq!(frame.get::<i64>("item_id").unwrap(), item_id);
        }
    }

    #[test]
    fn float_bounds_hold(size in -20.0f64..20.0) {
        let envelope = RequestEnvelope::builder()
            .path_param("item_id", "1")
            .query("size", size.to_string())
            .build();
        let result = Engine::default().bind(&bounded(), &envelope);
        prop_assert_eq!(result.is_ok(), size > 0.0 && size < 10.5);
    }

    #[test]
    fn scalar_query_takes_last_value(values in prop::collection::vec("[a-z0-9]{1,8}", 1..6)) {
        let op = OperationSpec::builder("read_items")
            .path("/items/")
            .param(Param::query(FieldSpec::new("q", FieldType::Str)))
            .build()
            .unwrap();
        let envelope = values
            .iter()
            .fold(RequestEnvelope::builder(), |builder, v| builder.query("q", v.as_str()))
            .build();
        let frame = Engine::default().bind(&op, &envelope).unwrap();
        prop_assert_eq!(frame.value("q"), Some(&json!(values.last().unwrap())));
    }

    #[test]
    fn projection_is_idempotent(
        name in "[A-Za-z ]{1,12}",
        price in 0.0f64..1000.0,
        tags in prop::collection::vec("[a-c]", 0..6),
        exclude_description in any::<bool>(),
        omit_defaults in any::<bool>(),
    ) {
        let mut spec = ProjectionSpec::model(&item()).omit_defaults(omit_defaults);
        if exclude_description {
            spec = spec.exclude(["description"]);
        }
        let value = json!({"name": name, "price": price, "tags": tags, "extra": true});

        let projector = Projector::default();
        let once = projector.project(&value, &spec).unwrap();
        let twice = projector.project(&once, &spec).unwrap();
        prop_assert!(once.get("extra").is_none());
        prop_assert_eq!(once, twice);
    }

    #[test]
    fn binding_is_deterministic(item_id in "[a-z0-9-]{1,6}", size in "[0-9.x]{1,5}") {
        let envelope = RequestEnvelope::builder()
            .path_param("item_id", item_id)
            .query("size", size)
            .build();
        let first = Engine::default().bind(&bounded(), &envelope);
        let second = Engine::default().bind(&bounded(), &envelope);
        match (first, second) {
            (Ok(a), Ok(b)) => prop_assert_eq!(a, b),
            (Err(a), Err(b)) => prop_assert_eq!(a.validation_errors(), b.validation_errors()),
            _ => prop_assert!(false, "binding gave different outcomes"),
        }
    }
}
