//! Generator configuration, loaded from `tsbridge.toml`.
//!
//! ```toml
//! packages = ["com.acme"]
//! input = ["build/types.json"]
//! output_dir = "web/src/generated"
//! package_depth = 2
//!
//! [model_filter]
//! type = "regex"
//! pattern = "^com\\.acme\\..*\\.dto\\."
//!
//! [rest_filter]
//! type = "has_marker"
//! marker = "rest_controller"
//!
//! [converters.model]
//! [converters.rest]
//! response_wrapper = "Promise"
//!
//! [custom_types]
//! "java.time.Instant" = { name = "string" }
//! "com.acme.Money" = { name = "Money", module = "@acme/money" }
//! ```

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::converter::{ModelConverter, RestConverter};
use crate::discovery::ManifestDiscovery;
use crate::error::{GeneratorError, GeneratorResult};
use crate::filter::FilterSpec;
use crate::generator::{DEFAULT_PACKAGE_DEPTH, Generator};
use crate::module::{DepthModuleConverter, PackageToModuleConverter, SingleModuleConverter};
use crate::nullability::NullableStrategyKind;
use crate::target::TargetTypeRef;

/// Log levels accepted by `log_level`.
pub const LOG_LEVELS: [&str; 6] = ["trace", "debug", "info", "warn", "error", "off"];

/// Top-level generator configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GeneratorConfig {
    /// Namespaces to scan for candidate types
    #[serde(default)]
    pub packages: Vec<String>,

    /// Type manifest files to discover types from
    #[serde(default)]
    pub input: Vec<PathBuf>,

    /// Directory receiving the generated modules
    #[serde(default = "default_output_dir")]
    pub output_dir: PathBuf,

    /// Leading namespace segments collapsed into one top-level module
    #[serde(default = "default_package_depth")]
    pub package_depth: usize,

    /// Put every declaration in one module with this name
    #[serde(default)]
    pub single_module: Option<String>,

    #[serde(default = "default_log_level")]
    pub log_level: String,

    #[serde(default)]
    pub nullable_strategy: NullableStrategyKind,

    #[serde(default)]
    pub model_filter: FilterSpec,

    #[serde(default)]
    pub rest_filter: FilterSpec,

    #[serde(default)]
    pub converters: ConvertersConfig,

    /// Source identity → fixed target type
    #[serde(default)]
    pub custom_types: BTreeMap<String, CustomTypeSpec>,
}

/// Converters to install. A missing table means no converter for that category.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ConvertersConfig {
    #[serde(default)]
    pub model: Option<ModelConverterConfig>,

    #[serde(default)]
    pub rest: Option<RestConverterConfig>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ModelConverterConfig {
    /// Keep fields carrying the JSON-ignore marker
    #[serde(default)]
    pub include_ignored: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RestConverterConfig {
    /// Generic type wrapping endpoint results
    #[serde(default = "default_response_wrapper")]
    pub response_wrapper: String,

    /// Module to import the wrapper from; a global type when absent
    #[serde(default)]
    pub wrapper_module: Option<String>,
}

impl Default for RestConverterConfig {
    fn default() -> Self {
        Self {
            response_wrapper: default_response_wrapper(),
            wrapper_module: None,
        }
    }
}

/// Target of a custom type mapping
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CustomTypeSpec {
    /// Keyword, global or exported type name; `[]` suffix for arrays
    pub name: String,

    /// Module exporting `name`
    #[serde(default)]
    pub module: Option<String>,
}

impl CustomTypeSpec {
    pub fn target(&self) -> TargetTypeRef {
        TargetTypeRef::from_name(&self.name, self.module.as_deref())
    }
}

fn default_output_dir() -> PathBuf {
    PathBuf::from("generated")
}

fn default_package_depth() -> usize {
    DEFAULT_PACKAGE_DEPTH
}

fn default_log_level() -> String {
    "info".to_string()
}

fn default_response_wrapper() -> String {
    "Promise".to_string()
}

impl Default for GeneratorConfig {
    fn default() -> Self {
        Self {
            packages: Vec::new(),
            input: Vec::new(),
            output_dir: default_output_dir(),
            package_depth: default_package_depth(),
            single_module: None,
            log_level: default_log_level(),
            nullable_strategy: NullableStrategyKind::default(),
            model_filter: FilterSpec::default(),
            rest_filter: FilterSpec::default(),
            converters: ConvertersConfig::default(),
            custom_types: BTreeMap::new(),
        }
    }
}

impl GeneratorConfig {
    /// Load configuration from a file.
    ///
    /// Relative `input` and `output_dir` paths are resolved against the
    /// directory holding the file.
    pub fn from_file(path: impl AsRef<Path>) -> GeneratorResult<Self> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path).map_err(|e| GeneratorError::io(path, e))?;
        let mut config = Self::from_str(&content)?;
        if let Some(base) = path.parent() {
            config.resolve_paths(base);
        }
        Ok(config)
    }

    /// Parse configuration from a TOML string
    #[allow(clippy::should_implement_trait)]
    pub fn from_str(content: &str) -> GeneratorResult<Self> {
        Ok(toml::from_str(content)?)
    }

    /// Make relative paths relative to `base`.
    pub fn resolve_paths(&mut self, base: &Path) {
        for input in &mut self.input {
            if input.is_relative() {
                *input = base.join(&*input);
            }
        }
        if self.output_dir.is_relative() {
            self.output_dir = base.join(&self.output_dir);
        }
    }

    /// Validate the configuration
    pub fn validate(&self) -> GeneratorResult<()> {
        if self.packages.is_empty() {
            return Err(GeneratorError::Config(
                "at least one package to scan is required".to_string(),
            ));
        }
        if let Some(package) = self.packages.iter().find(|p| p.trim().is_empty()) {
            return Err(GeneratorError::Config(format!(
                "package name cannot be empty: {package:?}"
            )));
        }
        if self.package_depth == 0 {
            return Err(GeneratorError::Config(
                "package_depth must be at least 1".to_string(),
            ));
        }
        if matches!(&self.single_module, Some(name) if name.trim().is_empty()) {
            return Err(GeneratorError::Config(
                "single_module name cannot be empty".to_string(),
            ));
        }
        if !LOG_LEVELS.contains(&self.log_level.to_ascii_lowercase().as_str()) {
            return Err(GeneratorError::Config(format!(
                "invalid log level: {}",
                self.log_level
            )));
        }

        self.model_filter.build()?;
        self.rest_filter.build()?;

        if let Some(rest) = &self.converters.rest {
            if rest.response_wrapper.trim().is_empty() {
                return Err(GeneratorError::Config(
                    "response_wrapper cannot be empty".to_string(),
                ));
            }
        }

        for (identity, spec) in &self.custom_types {
            if identity.is_empty() {
                return Err(GeneratorError::Config(
                    "custom type identity cannot be empty".to_string(),
                ));
            }
            if spec.name.trim().is_empty() {
                return Err(GeneratorError::Config(format!(
                    "custom type '{identity}' has an empty target name"
                )));
            }
        }

        Ok(())
    }

    /// Turn the configuration into a configured [`Generator`].
    pub fn build_generator(&self) -> GeneratorResult<Generator> {
        self.validate()?;

        let module_converter: Box<dyn PackageToModuleConverter> =
            match &self.single_module {
                Some(name) => Box::new(SingleModuleConverter::new(name.clone())),
                None => Box::new(DepthModuleConverter::new(self.package_depth)),
            };

        let mut generator = Generator::new()
            .with_boxed_filters(self.model_filter.build()?, self.rest_filter.build()?)
            .with_nullable_strategy(self.nullable_strategy.build())
            .with_module_converter(module_converter);

        if let Some(model) = &self.converters.model {
            generator = generator
                .with_model_converter(ModelConverter::new().with_ignored_fields(model.include_ignored));
        }
        if let Some(rest) = &self.converters.rest {
            let wrapper =
                TargetTypeRef::from_name(&rest.response_wrapper, rest.wrapper_module.as_deref());
            generator =
                generator.with_rest_converter(RestConverter::new().with_response_wrapper(wrapper));
        }

        for (identity, spec) in &self.custom_types {
            generator
                .custom_type_mapping_mut()
                .insert(identity.clone(), spec.target());
        }

        Ok(generator)
    }

    /// Discovery over the configured manifests.
    pub fn discovery(&self) -> ManifestDiscovery {
        ManifestDiscovery::new(self.input.clone())
    }
}

#[cfg(test)]
#[path = "config/config_tests.rs"]
mod config_tests;
