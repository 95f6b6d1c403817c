#![allow(non_snake_case)]

use super::*;
use crate::converter::{ModelConverter, RestConverter};
use crate::descriptor::{
    HttpMethod, Marker, MarkerKind, Method, Parameter, PrimitiveType, TypeRef, well_known,
};
use crate::discovery::InMemoryDiscovery;
use crate::filter::{AcceptAllFilter, HasMarkerFilter, TypeSetFilter};
use crate::target::{DeclBody, EnumDecl, InterfaceDecl, TargetDecl, TsPrimitive};

fn namespaces(names: &[&str]) -> Vec<String> {
    names.iter().map(|s| s.to_string()).collect()
}

fn interface(decl: &TargetDecl) -> &InterfaceDecl {
    match &decl.body {
        DeclBody::Interface(body) => body,
        other => panic!("expected interface, got {other:?}"),
    }
}

fn endpoint(name: &str, method: HttpMethod, path: &str, params: Vec<Parameter>, returns: TypeRef) -> Method {
    Method {
        name: name.to_string(),
        params,
        returns,
        markers: vec![Marker::RequestMapping {
            path: path.to_string(),
            method: Some(method),
        }],
    }
}

fn body_param(name: &str, ty: TypeRef) -> Parameter {
    Parameter {
        name: name.to_string(),
        ty,
        markers: vec![Marker::RequestBody],
    }
}

fn user() -> TypeDescriptor {
    TypeDescriptor::class("app.model.User")
        .with_field("id", TypeRef::primitive(PrimitiveType::Int))
        .with_field(
            "email",
            TypeRef::generic(well_known::OPTIONAL, vec![TypeRef::named(well_known::STRING)]),
        )
        .with_field("nickname", TypeRef::named(well_known::STRING))
}

fn color() -> TypeDescriptor {
    TypeDescriptor::enumeration("app.enums.Color", &["RED", "GREEN"])
}

#[test]
fn generate___user_and_color___builds_sibling_modules() {
    let discovery = InMemoryDiscovery::new(vec![color(), user()]);
    let generator = Generator::new()
        .with_model_filter(TypeSetFilter::new(["app.model.User"]))
        .with_module_converter(Box::new(DepthModuleConverter::new(1)))
        .with_model_converter(ModelConverter::new());

    let modules = generator.generate(&discovery, &namespaces(&["app"])).unwrap();

    assert_eq!(modules.module_paths(), vec!["app", "app/enums", "app/model"]);
    let user = modules.find(&["app", "model"], "User").unwrap();
    let properties: Vec<(&str, String, bool)> = interface(user)
        .properties
        .iter()
        .map(|p| (p.name.as_str(), modules.render_type(&p.ty), p.nullable.is_set()))
        .collect();
    assert_eq!(
        properties,
        vec![
            ("id", "number".to_string(), false),
            ("email", "string".to_string(), true),
            ("nickname", "string".to_string(), false),
        ]
    );
    let color = modules.find(&["app", "enums"], "Color").unwrap();
    assert_eq!(
        color.body,
        DeclBody::Enum(EnumDecl {
            members: vec!["RED".into(), "GREEN".into()]
        })
    );
}

#[test]
fn generate___no_filters___classifies_nothing_but_enums() {
    let discovery = InMemoryDiscovery::new(vec![color(), user()]);

    let modules = Generator::new()
        .generate(&discovery, &namespaces(&["app"]))
        .unwrap();

    assert!(modules.find_source("app.model.User").is_none());
    assert!(modules.find_source("app.enums.Color").is_some());
}

#[test]
fn classify___enum_accepted_by_model_filter___routes_to_enums() {
    let types = [color(), user()];
    let generator = Generator::new().with_model_filter(AcceptAllFilter);

    let classification = generator.classify(types.iter());

    assert!(classification.enums.contains("app.enums.Color"));
    assert!(!classification.models.contains("app.enums.Color"));
    assert!(classification.models.contains("app.model.User"));
    assert_eq!(
        classification.categories_of("app.enums.Color"),
        vec![Category::Enum]
    );
}

#[test]
fn generate___models_without_model_converter___fails_with_missing_converter() {
    let discovery = InMemoryDiscovery::new(vec![user()]);
    let generator = Generator::new().with_model_filter(AcceptAllFilter);

    let result = generator.generate(&discovery, &namespaces(&["app"]));

    assert!(matches!(
        result,
        Err(GeneratorError::MissingConverter {
            category: Category::Model
        })
    ));
}

#[test]
fn generate___rest_types_without_rest_converter___fails_with_missing_converter() {
    let controller = TypeDescriptor::class("app.web.UserCtrl").with_marker(Marker::RestController);
    let discovery = InMemoryDiscovery::new(vec![controller]);
    let generator = Generator::new()
        .with_rest_filter(HasMarkerFilter::new(MarkerKind::RestController))
        .with_model_converter(ModelConverter::new());

    let result = generator.generate(&discovery, &namespaces(&["app"]));

    assert!(matches!(
        result,
        Err(GeneratorError::MissingConverter {
            category: Category::Rest
        })
    ));
}

#[test]
fn generate___mutually_referencing_models___populates_both() {
    let a = TypeDescriptor::class("app.model.A").with_field("b", TypeRef::named("app.model.B"));
    let b = TypeDescriptor::class("app.model.B").with_field("a", TypeRef::named("app.model.A"));
    let discovery = InMemoryDiscovery::new(vec![a, b]);
    let generator = Generator::new()
        .with_model_filter(AcceptAllFilter)
        .with_model_converter(ModelConverter::new());

    let modules = generator.generate(&discovery, &namespaces(&["app"])).unwrap();

    let table = modules.table();
    let a_id = table.lookup("app.model.A").unwrap();
    let b_id = table.lookup("app.model.B").unwrap();
    assert!(table.is_populated(a_id));
    assert!(table.is_populated(b_id));
    assert_eq!(
        interface(table.get(a_id)).properties[0].ty,
        TargetTypeRef::Declared(b_id)
    );
    assert_eq!(
        interface(table.get(b_id)).properties[0].ty,
        TargetTypeRef::Declared(a_id)
    );
}

#[test]
fn generate___custom_mapped_type___gets_no_declaration() {
    let money = TypeDescriptor::class("app.model.Money").with_field(
        "amount",
        TypeRef::primitive(PrimitiveType::Long),
    );
    let order = TypeDescriptor::class("app.model.Order").with_field("total", TypeRef::named("app.model.Money"));
    let discovery = InMemoryDiscovery::new(vec![money, order]);
    let generator = Generator::new()
        .with_model_filter(AcceptAllFilter)
        .with_model_converter(ModelConverter::new())
        .with_custom_type("app.model.Money", TargetTypeRef::Primitive(TsPrimitive::String));

    let modules = generator.generate(&discovery, &namespaces(&["app"])).unwrap();

    assert!(modules.find_source("app.model.Money").is_none());
    let order = modules.find_source("app.model.Order").unwrap();
    assert_eq!(
        interface(order).properties[0].ty,
        TargetTypeRef::Primitive(TsPrimitive::String)
    );
}

#[test]
fn generate___rest_endpoint___pulls_in_reachable_models() {
    let controller = TypeDescriptor::class("app.web.UserCtrl")
        .with_marker(Marker::RestController)
        .with_marker(Marker::RequestMapping {
            path: "/users".into(),
            method: None,
        })
        .with_method(endpoint(
            "create",
            HttpMethod::Post,
            "",
            vec![body_param("user", TypeRef::named("lib.dto.UserDto"))],
            TypeRef::named("lib.dto.UserDto"),
        ));
    let dto = TypeDescriptor::class("lib.dto.UserDto")
        .with_field("address", TypeRef::named("lib.dto.Address"));
    let address = TypeDescriptor::class("lib.dto.Address")
        .with_field("city", TypeRef::named(well_known::STRING));
    let discovery = InMemoryDiscovery::new(vec![controller, dto, address]);
    let generator = Generator::new()
        .with_rest_filter(HasMarkerFilter::new(MarkerKind::RestController))
        .with_model_converter(ModelConverter::new())
        .with_rest_converter(RestConverter::new());

    let modules = generator.generate(&discovery, &namespaces(&["app"])).unwrap();

    assert!(modules.find_source("lib.dto.UserDto").is_some());
    assert!(modules.find_source("lib.dto.Address").is_some());
    let ctrl = modules.find_source("app.web.UserCtrl").unwrap();
    let method = &interface(ctrl).methods[0];
    assert_eq!(method.docs, vec!["POST /users".to_string()]);
    assert_eq!(modules.render_type(&method.returns), "Promise<UserDto>");
}

#[test]
fn generate___model_reachable_from_endpoint___converted_without_model_filter() {
    let controller = TypeDescriptor::class("app.web.OrderCtrl")
        .with_marker(Marker::RestController)
        .with_method(endpoint(
            "get",
            HttpMethod::Get,
            "/orders/{id}",
            vec![],
            TypeRef::named("app.model.Order"),
        ));
    let order = TypeDescriptor::class("app.model.Order");
    let discovery = InMemoryDiscovery::new(vec![controller, order]);
    let generator = Generator::new()
        .with_rest_filter(HasMarkerFilter::new(MarkerKind::RestController))
        .with_model_converter(ModelConverter::new())
        .with_rest_converter(RestConverter::new());

    let modules = generator.generate(&discovery, &namespaces(&["app"])).unwrap();

    assert!(modules.find_source("app.model.Order").is_some());
}

#[test]
fn generate___rest_only_controller_with_base_class___converts_base_as_rest() {
    let base = TypeDescriptor::class("app.ctrl.BaseCtrl");
    let controller = TypeDescriptor::class("app.ctrl.UserCtrl")
        .with_marker(Marker::RestController)
        .with_superclass(TypeRef::named("app.ctrl.BaseCtrl"))
        .with_method(endpoint(
            "ping",
            HttpMethod::Get,
            "/ping",
            vec![],
            TypeRef::named(well_known::STRING),
        ));
    let discovery = InMemoryDiscovery::new(vec![base, controller]);
    let generator = Generator::new()
        .with_rest_filter(HasMarkerFilter::new(MarkerKind::RestController))
        .with_rest_converter(RestConverter::new());

    let modules = generator.generate(&discovery, &namespaces(&["app"])).unwrap();

    let table = modules.table();
    let base_id = table.lookup("app.ctrl.BaseCtrl").unwrap();
    assert!(table.is_populated(base_id));
    let ctrl = modules.find_source("app.ctrl.UserCtrl").unwrap();
    assert_eq!(interface(ctrl).extends, vec![TargetTypeRef::Declared(base_id)]);
    assert_eq!(interface(ctrl).methods[0].docs, vec!["GET /ping".to_string()]);
}

#[test]
fn classify_and_explore___rest_supertype___joins_rest_set() {
    let grand = TypeDescriptor::interface("app.ctrl.Api");
    let base = TypeDescriptor::class("app.ctrl.BaseCtrl")
        .with_interface(TypeRef::named("app.ctrl.Api"));
    let controller = TypeDescriptor::class("app.ctrl.UserCtrl")
        .with_marker(Marker::RestController)
        .with_superclass(TypeRef::generic(
            "app.ctrl.BaseCtrl",
            vec![TypeRef::named("app.model.User")],
        ));
    let user = TypeDescriptor::class("app.model.User");
    let index = TypeIndex::new([grand, base, controller.clone(), user]);
    let generator = Generator::new()
        .with_rest_filter(HasMarkerFilter::new(MarkerKind::RestController));
    let mut classification = generator.classify([&controller]);

    generator.explore_rest_types(&index, &TypeMapper::new(), &mut classification);

    assert_eq!(
        classification.rests.iter().map(String::as_str).collect::<Vec<_>>(),
        vec!["app.ctrl.Api", "app.ctrl.BaseCtrl", "app.ctrl.UserCtrl"]
    );
    assert!(classification.models.contains("app.model.User"));
}

#[test]
fn generate___same_input_twice___renders_identical_output() {
    let run = || {
        let discovery = InMemoryDiscovery::new(vec![user(), color()]);
        Generator::new()
            .with_model_filter(AcceptAllFilter)
            .with_model_converter(ModelConverter::new())
            .generate(&discovery, &namespaces(&["app"]))
            .unwrap()
            .render()
    };

    assert_eq!(run(), run());
}

#[test]
fn explain___enum___reports_enum_category_only() {
    let generator = Generator::new().with_model_filter(AcceptAllFilter);

    let explanations = generator.explain(&color());

    assert_eq!(explanations.len(), 1);
    assert_eq!(explanations[0].0, Category::Enum);
}

#[test]
fn explain___class___reports_both_filters() {
    let generator = Generator::new();

    let explanations = generator.explain(&user());

    let categories: Vec<Category> = explanations.iter().map(|(c, _)| *c).collect();
    assert_eq!(categories, vec![Category::Model, Category::Rest]);
}
