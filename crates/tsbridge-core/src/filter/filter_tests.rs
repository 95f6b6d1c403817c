#![allow(non_snake_case)]

use super::*;
use crate::descriptor::{Marker, TypeRef};
use test_case::test_case;

fn user() -> TypeDescriptor {
    TypeDescriptor::class("app.model.User").with_superclass(TypeRef::named("app.model.BaseDTO"))
}

fn controller() -> TypeDescriptor {
    TypeDescriptor::class("app.ctrl.UserCtrl").with_marker(Marker::RestController)
}

#[test]
fn RejectAllFilter___any_type___is_rejected_with_reason() {
    let filter = RejectAllFilter;

    assert!(!filter.accept(&user()));
    assert!(filter.explain(&user()).contains("no accept policy"));
}

#[test]
fn FilterSpec___default___rejects_everything() {
    let filter = FilterSpec::default().build().unwrap();

    assert!(!filter.accept(&user()));
    assert!(!filter.accept(&controller()));
}

#[test_case(FilterSpec::AcceptAll, true ; "accept all")]
#[test_case(FilterSpec::TypeSet { names: vec!["app.model.User".into()] }, true ; "type set hit")]
#[test_case(FilterSpec::TypeSet { names: vec!["app.model.Other".into()] }, false ; "type set miss")]
#[test_case(FilterSpec::Extends { base: "app.model.BaseDTO".into() }, true ; "extends")]
#[test_case(FilterSpec::NameContains { text: "Use".into() }, true ; "name contains")]
#[test_case(FilterSpec::Regex { pattern: r"^app\.model\.".into() }, true ; "regex")]
#[test_case(FilterSpec::HasMarker { marker: MarkerKind::RestController }, false ; "missing marker")]
fn FilterSpec___built_filter___classifies_user(spec: FilterSpec, expected: bool) {
    let filter = spec.build().unwrap();

    assert_eq!(filter.accept(&user()), expected);
}

#[test]
fn AndFilter___no_operands___rejects() {
    let filter = AndFilter::new(vec![]);

    assert!(!filter.accept(&user()));
}

#[test]
fn OrFilter___one_operand_accepts___accepts() {
    let filter = OrFilter::new(vec![
        Box::new(HasMarkerFilter::new(MarkerKind::RestController)),
        Box::new(TypeSetFilter::new(["app.model.User"])),
    ]);

    assert!(filter.accept(&user()));
    assert!(filter.accept(&controller()));
}

#[test]
fn NotFilter___explain___nests_operand_reason() {
    let filter = NotFilter::new(Box::new(NameContainsFilter::new("Ctrl")));

    let reason = filter.explain(&controller());

    assert!(!filter.accept(&controller()));
    assert!(reason.starts_with("Not[NameContains"));
    assert!(reason.ends_with("=> rejected"));
}

#[test]
fn RegexFilter___invalid_pattern___returns_invalid_filter() {
    let result = RegexFilter::new("(unclosed");

    assert!(matches!(result, Err(GeneratorError::InvalidFilter(_))));
}

#[test]
fn FilterSpec___from_toml___parses_nested_operators() {
    let toml = r#"
        type = "and"
        filters = [
            { type = "regex", pattern = "^app\\.model\\." },
            { type = "not", filter = { type = "name_contains", text = "Internal" } },
        ]
    "#;

    let spec: FilterSpec = toml::from_str(toml).unwrap();
    let filter = spec.build().unwrap();

    assert!(filter.accept(&user()));
    assert!(!filter.accept(&TypeDescriptor::class("app.model.InternalState")));
}

#[test]
fn FilterSpec___has_marker_from_toml___parses_marker_kind() {
    let spec: FilterSpec = toml::from_str(
        r#"
        type = "has_marker"
        marker = "rest_controller"
    "#,
    )
    .unwrap();

    assert!(spec.build().unwrap().accept(&controller()));
}
