use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Shading dialect requested by the active backend.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ApiType {
    /// GLSL-style source: `in`/`out` globals, uniform blocks, `gl_Position`.
    #[default]
    #[serde(alias = "gl", alias = "glsl")]
    OpenGl,
    /// HLSL-style source: `cbuffer`, semantic-annotated entry point returning `VS_OUTPUT`.
    #[serde(alias = "hlsl")]
    D3D,
}

/// Capabilities reported by the active rendering backend.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(default)]
pub struct BackendInfo {
    pub api_type: ApiType,
    /// `layout(binding = N)` is accepted in GLSL.
    pub supports_binding_layout: bool,
    /// A geometry stage may sit between the vertex and pixel stages, so vertex outputs go through
    /// an interface block.
    pub supports_geometry_shaders: bool,
    /// The host accepts a `[0, 1]` clip-space depth range with reversed sign (clip control).
    pub supports_clip_control: bool,
}

impl Default for BackendInfo {
    fn default() -> Self {
        Self {
            api_type: ApiType::OpenGl,
            supports_binding_layout: false,
            supports_geometry_shaders: true,
            supports_clip_control: false,
        }
    }
}

/// Immutable snapshot of the video settings consulted while building a descriptor.
///
/// Passed explicitly so descriptor construction is a pure function of register state plus this
/// snapshot.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(default)]
pub struct VideoConfig {
    pub enable_pixel_lighting: bool,
    pub multisamples: u32,
    pub ssaa: bool,
    pub backend: BackendInfo,
}

impl Default for VideoConfig {
    fn default() -> Self {
        Self {
            enable_pixel_lighting: false,
            multisamples: 1,
            ssaa: false,
            backend: BackendInfo::default(),
        }
    }
}

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("invalid video config: {0}")]
    Json(#[from] serde_json::Error),
    #[error("multisample count must be at least 1")]
    ZeroSamples,
}

impl VideoConfig {
    pub fn from_json(text: &str) -> Result<Self, ConfigError> {
        let config: Self = serde_json::from_str(text)?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.multisamples == 0 {
            return Err(ConfigError::ZeroSamples);
        }
        Ok(())
    }

    pub fn msaa(&self) -> bool {
        self.multisamples > 1
    }

    /// Per-sample shading; only meaningful with multisampling on.
    pub fn ssaa(&self) -> bool {
        self.msaa() && self.ssaa
    }
}
