/// Built-in WGSL sources and the "defines" that specialise them.
///
/// Sources live under `assets/shaders/` and are embedded at compile time.
/// Defines map onto WGSL pipeline-overridable constants (`override NAME`), so
/// a single module serves every variant; the constants are handed to the
/// pipeline stage that uses them.
use std::collections::{BTreeMap, HashMap};

use crate::error::{validated, RendererError};

const SOURCES: &[(&str, &str)] = &[
    ("cull", include_str!("../../../../assets/shaders/cull.wgsl")),
    ("instanced", include_str!("../../../../assets/shaders/instanced.wgsl")),
];

/// Named override values.  Booleans are stored as `1.0` / `0.0`.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct ShaderDefines {
    values: BTreeMap<String, f64>,
}

impl ShaderDefines {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_flag(mut self, name: &str, enabled: bool) -> Self {
        self.set(name, if enabled { 1.0 } else { 0.0 });
        self
    }

    pub fn set(&mut self, name: &str, value: f64) {
        self.values.insert(name.to_owned(), value);
    }

    pub fn get(&self, name: &str) -> Option<f64> {
        self.values.get(name).copied()
    }

    fn to_constants(&self) -> HashMap<String, f64> {
        self.values.iter().map(|(k, v)| (k.clone(), *v)).collect()
    }
}

/// A compiled module plus the override constants it was loaded with.
pub struct LoadedShader {
    pub name: &'static str,
    pub module: wgpu::ShaderModule,
    constants: HashMap<String, f64>,
}

impl LoadedShader {
    /// Compilation options carrying this shader's defines.
    pub fn compilation_options(&self) -> wgpu::PipelineCompilationOptions<'_> {
        wgpu::PipelineCompilationOptions {
            constants: &self.constants,
            ..Default::default()
        }
    }
}

pub struct ShaderLibrary;

impl ShaderLibrary {
    /// Embedded WGSL text for `name`.
    pub fn source(name: &str) -> Option<(&'static str, &'static str)> {
        SOURCES.iter().copied().find(|(n, _)| *n == name)
    }

    /// Compiles shader `name`.  Unknown names and compile errors are fatal.
    pub fn load(
        device: &wgpu::Device,
        name: &str,
        defines: &ShaderDefines,
    ) -> Result<LoadedShader, RendererError> {
        let (name, source) =
            Self::source(name).ok_or_else(|| RendererError::UnknownShader(name.to_owned()))?;

        let module = validated(device, name, || {
            device.create_shader_module(wgpu::ShaderModuleDescriptor {
                label: Some(name),
                source: wgpu::ShaderSource::Wgsl(source.into()),
            })
        })
        .map_err(|err| match err {
            RendererError::Validation { message, .. } => RendererError::Shader {
                name: name.to_owned(),
                message,
            },
            other => other,
        })?;

        log::debug!("compiled shader `{name}` with defines {:?}", defines.values);
        Ok(LoadedShader {
            name,
            module,
            constants: defines.to_constants(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn every_builtin_source_is_embedded() {
        for name in ["cull", "instanced"] {
            let (found, src) = ShaderLibrary::source(name).unwrap();
            assert_eq!(found, name);
            assert!(!src.is_empty());
        }
        assert!(ShaderLibrary::source("skybox").is_none());
    }

    #[test]
    fn flags_become_numeric_constants() {
        let defines = ShaderDefines::new()
            .with_flag("USE_NORMAL_MAPS", false)
            .with_flag("DEBUG", true);
        assert_eq!(defines.get("USE_NORMAL_MAPS"), Some(0.0));
        let constants = defines.to_constants();
        assert_eq!(constants.len(), 2);
        assert_eq!(constants["DEBUG"], 1.0);
    }

    #[test]
    fn instanced_shader_declares_its_overrides() {
        let (_, src) = ShaderLibrary::source("instanced").unwrap();
        assert!(src.contains("override USE_NORMAL_MAPS"));
    }
}
