//! End-to-end generation from type manifests to files on disk

#![allow(non_snake_case)]

use std::fs;
use std::path::Path;

use tempfile::TempDir;
use tsbridge_core::{GeneratorConfig, GeneratorError, TypeDiscovery};

const MANIFEST: &str = r#"{
  "format_version": 1,
  "types": [
    { "name": "app.enums.Color", "kind": "enum", "constants": ["RED", "GREEN"] },
    {
      "name": "app.model.User",
      "kind": "class",
      "fields": [
        { "name": "id", "type": { "kind": "primitive", "name": "int" } },
        {
          "name": "email",
          "type": {
            "kind": "named",
            "name": "java.util.Optional",
            "args": [{ "kind": "named", "name": "java.lang.String" }]
          }
        },
        { "name": "nickname", "type": { "kind": "named", "name": "java.lang.String" } },
        { "name": "favorite", "type": { "kind": "named", "name": "app.enums.Color" } }
      ]
    },
    {
      "name": "app.web.UserController",
      "kind": "class",
      "markers": [
        { "kind": "rest_controller" },
        { "kind": "request_mapping", "path": "/api/users" }
      ],
      "methods": [
        {
          "name": "find",
          "params": [
            {
              "name": "id",
              "type": { "kind": "primitive", "name": "long" },
              "markers": [{ "kind": "path_variable" }]
            }
          ],
          "returns": { "kind": "named", "name": "app.model.User" },
          "markers": [{ "kind": "request_mapping", "path": "/{id}", "method": "GET" }]
        },
        {
          "name": "search",
          "params": [
            {
              "name": "name",
              "type": { "kind": "named", "name": "java.lang.String" },
              "markers": [{ "kind": "request_param", "required": false }]
            }
          ],
          "returns": {
            "kind": "named",
            "name": "java.util.List",
            "args": [{ "kind": "named", "name": "app.model.User" }]
          },
          "markers": [{ "kind": "request_mapping", "method": "GET" }]
        },
        { "name": "helper" }
      ]
    },
    { "name": "app.model.Broken", "kind": "nope" }
  ]
}"#;

const CONFIG: &str = r#"
packages = ["app"]
input = ["types.json"]
output_dir = "out"
package_depth = 1

[model_filter]
type = "type_set"
names = ["app.model.User"]

[rest_filter]
type = "has_marker"
marker = "rest_controller"

[converters.model]
[converters.rest]
"#;

fn setup(config: &str) -> (TempDir, GeneratorConfig) {
    let dir = TempDir::new().unwrap();
    fs::write(dir.path().join("types.json"), MANIFEST).unwrap();
    let path = dir.path().join("tsbridge.toml");
    fs::write(&path, config).unwrap();
    let config = GeneratorConfig::from_file(&path).unwrap();
    (dir, config)
}

fn read(dir: &Path, relative: &str) -> String {
    fs::read_to_string(dir.join(relative)).unwrap()
}

#[test]
fn generate___manifest_with_model_rest_and_enum___writes_one_file_per_module() {
    let (dir, config) = setup(CONFIG);

    let modules = config
        .build_generator()
        .unwrap()
        .generate(&config.discovery(), &config.packages)
        .unwrap();
    let written = modules.write_to(&config.output_dir).unwrap();

    let out = dir.path().join("out");
    assert_eq!(
        written,
        vec![
            out.join("app/enums.ts"),
            out.join("app/model.ts"),
            out.join("app/web.ts"),
        ]
    );
    assert_eq!(
        read(&out, "app/enums.ts"),
        "// Generated by tsbridge. Do not edit.\n\
         \n\
         export enum Color {\n\
         \x20   RED = 'RED',\n\
         \x20   GREEN = 'GREEN',\n\
         }\n"
    );
    assert_eq!(
        read(&out, "app/model.ts"),
        "// Generated by tsbridge. Do not edit.\n\
         \n\
         import { Color } from './enums';\n\
         \n\
         export interface User {\n\
         \x20   id: number;\n\
         \x20   email?: string;\n\
         \x20   nickname: string;\n\
         \x20   favorite: Color;\n\
         }\n"
    );
    assert_eq!(
        read(&out, "app/web.ts"),
        "// Generated by tsbridge. Do not edit.\n\
         \n\
         import { User } from './model';\n\
         \n\
         export interface UserController {\n\
         \x20   /**\n\
         \x20    * GET /api/users/{id}\n\
         \x20    */\n\
         \x20   find(id: number): Promise<User>;\n\
         \n\
         \x20   /**\n\
         \x20    * GET /api/users\n\
         \x20    */\n\
         \x20   search(name?: string): Promise<User[]>;\n\
         }\n"
    );
}

#[test]
fn discover___malformed_entry___reported_and_skipped() {
    let (_dir, config) = setup(CONFIG);

    let discovery = config.discovery().discover(&config.packages).unwrap();

    assert_eq!(discovery.failures.len(), 1);
    assert_eq!(discovery.failures[0].name, "app.model.Broken");
    assert_eq!(discovery.candidates.len(), 3);
}

#[test]
fn generate___missing_rest_converter___writes_nothing() {
    let config_without_rest = CONFIG.replace("[converters.rest]\n", "");
    let (dir, config) = setup(&config_without_rest);

    let result = config
        .build_generator()
        .unwrap()
        .generate(&config.discovery(), &config.packages)
        .and_then(|modules| modules.write_to(&config.output_dir));

    assert!(matches!(result, Err(GeneratorError::MissingConverter { .. })));
    assert!(!dir.path().join("out").exists());
}

#[test]
fn generate___observable_wrapper_from_module___imports_wrapper() {
    let config = CONFIG.replace(
        "[converters.rest]\n",
        "[converters.rest]\nresponse_wrapper = \"Observable\"\nwrapper_module = \"rxjs\"\n",
    );
    let (_dir, config) = setup(&config);

    let modules = config
        .build_generator()
        .unwrap()
        .generate(&config.discovery(), &config.packages)
        .unwrap();

    let web = modules
        .render()
        .into_iter()
        .find(|m| m.path == Path::new("app/web.ts"))
        .unwrap();
    assert!(web.content.contains("import { User } from './model';\nimport { Observable } from 'rxjs';\n"));
    assert!(web.content.contains("find(id: number): Observable<User>;"));
}
