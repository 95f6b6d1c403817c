#![allow(non_snake_case)]

use super::*;
use crate::descriptor::{PrimitiveType, TypeDescriptor, TypeRef};
use crate::discovery::InMemoryDiscovery;
use crate::target::TsPrimitive;
use tempfile::TempDir;
use test_case::test_case;

const FULL: &str = r#"
packages = ["app"]
input = ["types.json"]
output_dir = "out"
package_depth = 1
log_level = "debug"
nullable_strategy = "marker-only"

[model_filter]
type = "regex"
pattern = "^app\\.model\\."

[rest_filter]
type = "has_marker"
marker = "rest_controller"

[converters.model]
include_ignored = true

[converters.rest]
response_wrapper = "Observable"
wrapper_module = "rxjs"

[custom_types]
"java.time.Instant" = { name = "string" }
"app.Money" = { name = "Money", module = "@acme/money" }
"#;

#[test]
fn GeneratorConfig___empty_document___uses_defaults() {
    let config = GeneratorConfig::from_str("").unwrap();

    assert_eq!(config, GeneratorConfig::default());
    assert_eq!(config.package_depth, 2);
    assert_eq!(config.log_level, "info");
    assert_eq!(config.model_filter, FilterSpec::RejectAll);
    assert!(config.converters.model.is_none());
    assert!(config.converters.rest.is_none());
}

#[test]
fn GeneratorConfig___full_document___parses_every_section() {
    let config = GeneratorConfig::from_str(FULL).unwrap();

    assert_eq!(config.packages, vec!["app".to_string()]);
    assert_eq!(config.package_depth, 1);
    assert_eq!(config.nullable_strategy, NullableStrategyKind::MarkerOnly);
    assert_eq!(
        config.model_filter,
        FilterSpec::Regex {
            pattern: "^app\\.model\\.".to_string()
        }
    );
    assert_eq!(
        config.converters.model,
        Some(ModelConverterConfig {
            include_ignored: true
        })
    );
    let rest = config.converters.rest.as_ref().unwrap();
    assert_eq!(rest.response_wrapper, "Observable");
    assert_eq!(rest.wrapper_module.as_deref(), Some("rxjs"));
    assert_eq!(config.custom_types.len(), 2);
    config.validate().unwrap();
}

#[test]
fn GeneratorConfig___empty_rest_table___uses_promise_wrapper() {
    let config = GeneratorConfig::from_str("packages = [\"app\"]\n[converters.rest]\n").unwrap();

    assert_eq!(
        config.converters.rest,
        Some(RestConverterConfig {
            response_wrapper: "Promise".to_string(),
            wrapper_module: None,
        })
    );
}

#[test]
fn GeneratorConfig___malformed_toml___returns_config_error() {
    let result = GeneratorConfig::from_str("packages = [");

    assert!(matches!(result, Err(GeneratorError::Config(_))));
}

#[test_case("packages = []" ; "no packages")]
#[test_case("packages = [\"\"]" ; "empty package")]
#[test_case("packages = [\"app\"]\npackage_depth = 0" ; "zero depth")]
#[test_case("packages = [\"app\"]\nsingle_module = \" \"" ; "blank single module")]
#[test_case("packages = [\"app\"]\nlog_level = \"loud\"" ; "unknown log level")]
#[test_case("packages = [\"app\"]\n[converters.rest]\nresponse_wrapper = \"\"" ; "empty wrapper")]
#[test_case("packages = [\"app\"]\n[custom_types]\n\"app.Money\" = { name = \"\" }" ; "empty custom name")]
fn validate___invalid_setting___returns_config_error(source: &str) {
    let config = GeneratorConfig::from_str(source).unwrap();

    assert!(matches!(config.validate(), Err(GeneratorError::Config(_))));
}

#[test]
fn validate___bad_regex___returns_invalid_filter() {
    let config = GeneratorConfig::from_str(
        "packages = [\"app\"]\n[model_filter]\ntype = \"regex\"\npattern = \"(\"",
    )
    .unwrap();

    assert!(matches!(
        config.validate(),
        Err(GeneratorError::InvalidFilter(_))
    ));
}

#[test]
fn CustomTypeSpec___module___maps_to_external_import() {
    let spec = CustomTypeSpec {
        name: "Money".to_string(),
        module: Some("@acme/money".to_string()),
    };

    assert_eq!(
        spec.target(),
        TargetTypeRef::External {
            name: "Money".to_string(),
            module: "@acme/money".to_string()
        }
    );
}

#[test]
fn from_file___relative_paths___resolved_against_config_dir() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("tsbridge.toml");
    std::fs::write(&path, FULL).unwrap();

    let config = GeneratorConfig::from_file(&path).unwrap();

    assert_eq!(config.input, vec![dir.path().join("types.json")]);
    assert_eq!(config.output_dir, dir.path().join("out"));
    assert_eq!(config.discovery().paths(), &[dir.path().join("types.json")]);
}

#[test]
fn from_file___missing_file___returns_io_error() {
    let dir = TempDir::new().unwrap();

    let result = GeneratorConfig::from_file(dir.path().join("absent.toml"));

    assert!(matches!(result, Err(GeneratorError::Io { .. })));
}

#[test]
fn build_generator___without_model_converter___fails_on_non_empty_model_set() {
    let config = GeneratorConfig::from_str(
        "packages = [\"app\"]\n[model_filter]\ntype = \"accept_all\"",
    )
    .unwrap();
    let discovery = InMemoryDiscovery::new(vec![TypeDescriptor::class("app.model.User")]);

    let result = config
        .build_generator()
        .unwrap()
        .generate(&discovery, &config.packages);

    assert!(matches!(
        result,
        Err(GeneratorError::MissingConverter { .. })
    ));
}

#[test]
fn build_generator___custom_type___applied_to_fields() {
    let config = GeneratorConfig::from_str(
        r#"
packages = ["app"]
package_depth = 1

[model_filter]
type = "accept_all"

[converters.model]

[custom_types]
"app.model.Money" = { name = "number" }
"#,
    )
    .unwrap();
    let order = TypeDescriptor::class("app.model.Order")
        .with_field("total", TypeRef::named("app.model.Money"))
        .with_field("count", TypeRef::primitive(PrimitiveType::Int));
    let discovery = InMemoryDiscovery::new(vec![order]);

    let modules = config
        .build_generator()
        .unwrap()
        .generate(&discovery, &config.packages)
        .unwrap();

    let decl = modules.find(&["app", "model"], "Order").unwrap();
    let crate::target::DeclBody::Interface(body) = &decl.body else {
        panic!("expected interface");
    };
    assert_eq!(
        body.properties[0].ty,
        TargetTypeRef::Primitive(TsPrimitive::Number)
    );
}

#[test]
fn build_generator___single_module___places_all_types_together() {
    let config = GeneratorConfig::from_str(
        "packages = [\"app\"]\nsingle_module = \"api\"\n[model_filter]\ntype = \"accept_all\"\n[converters.model]\n",
    )
    .unwrap();
    let discovery = InMemoryDiscovery::new(vec![
        TypeDescriptor::class("app.model.User"),
        TypeDescriptor::class("app.web.dto.Page"),
    ]);

    let modules = config
        .build_generator()
        .unwrap()
        .generate(&discovery, &config.packages)
        .unwrap();

    assert_eq!(modules.module_paths(), vec!["api"]);
    assert!(modules.find(&["api"], "User").is_some());
    assert!(modules.find(&["api"], "Page").is_some());
}
