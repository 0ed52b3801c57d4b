//! Captured draw states for the `flipper-vsgen` tool.
//!
//! A draw state is a JSON document holding everything the descriptor builder reads:
//!
//! ```json
//! { "config": { "multisamples": 4 }, "registers": { "bp_gen_mode": 1, "xf": { ... } }, "components": 32768 }
//! ```
//!
//! Captures come from outside the emulator, so [`DrawState::validate`] rejects the register
//! combinations the builder treats as fatal before it ever sees them.

use std::fmt::Write;

use flipper_vsgen::{
    generate_vertex_shader_code, get_vertex_shader_uid, ApiType, ConfigError, GpuRegisters,
    VertexComponents, VertexShaderUid, VideoConfig, MAX_TEX_GENS, NUM_COLOR_CHANNELS,
};
use flipper_vsgen::regs::TexGenType;
use serde::{Deserialize, Serialize};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum DrawStateError {
    #[error("invalid draw state: {0}")]
    Json(#[from] serde_json::Error),
    #[error(transparent)]
    Config(#[from] ConfigError),
    #[error("component mask {0:#x} sets bits outside the vertex attribute set")]
    UnknownComponents(u32),
    #[error("BP and XF disagree on the {what} count ({bp} vs {xf})")]
    CountMismatch {
        what: &'static str,
        bp: u32,
        xf: u32,
    },
    #[error("{0} texgens exceeds the {max} generators of the transform unit", max = MAX_TEX_GENS)]
    TooManyTexGens(u32),
    #[error("{0} color channels exceeds {max}", max = NUM_COLOR_CHANNELS)]
    TooManyColorChannels(u32),
    #[error("texgen {index} has source row {row} out of range")]
    BadSourceRow { index: usize, row: u32 },
    #[error("emboss texgen {index} reads texgen {reads}, but only {count} are active")]
    BadEmbossSource { index: usize, reads: u32, count: u32 },
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct DrawState {
    pub config: VideoConfig,
    pub registers: GpuRegisters,
    /// Raw [`VertexComponents`] mask.
    pub components: u32,
}

impl DrawState {
    pub fn from_json(text: &str) -> Result<Self, DrawStateError> {
        let state: Self = serde_json::from_str(text)?;
        state.validate()?;
        Ok(state)
    }

    pub fn validate(&self) -> Result<(), DrawStateError> {
        self.config.validate()?;

        if VertexComponents::from_bits(self.components).is_none() {
            return Err(DrawStateError::UnknownComponents(self.components));
        }

        let regs = &self.registers;
        let xf = &regs.xf;
        if regs.bp_gen_mode.num_tex_gens() != xf.num_tex_gens {
            return Err(DrawStateError::CountMismatch {
                what: "texgen",
                bp: regs.bp_gen_mode.num_tex_gens(),
                xf: xf.num_tex_gens,
            });
        }
        if regs.bp_gen_mode.num_color_chans() != xf.num_color_chans {
            return Err(DrawStateError::CountMismatch {
                what: "color channel",
                bp: regs.bp_gen_mode.num_color_chans(),
                xf: xf.num_color_chans,
            });
        }
        if xf.num_tex_gens as usize > MAX_TEX_GENS {
            return Err(DrawStateError::TooManyTexGens(xf.num_tex_gens));
        }
        if xf.num_color_chans as usize > NUM_COLOR_CHANNELS {
            return Err(DrawStateError::TooManyColorChannels(xf.num_color_chans));
        }

        for (index, info) in xf.tex_mtx_info[..xf.num_tex_gens as usize]
            .iter()
            .enumerate()
        {
            if info.source_row().is_none() {
                return Err(DrawStateError::BadSourceRow {
                    index,
                    row: info.source_row_bits(),
                });
            }
            if info.tex_gen_type() == TexGenType::EmbossMap
                && info.emboss_source_shift() >= xf.num_tex_gens
            {
                return Err(DrawStateError::BadEmbossSource {
                    index,
                    reads: info.emboss_source_shift(),
                    count: xf.num_tex_gens,
                });
            }
        }
        Ok(())
    }

    pub fn components(&self) -> VertexComponents {
        VertexComponents::from_bits_truncate(self.components)
    }

    /// Builds the descriptor. The state must have passed [`DrawState::validate`].
    pub fn uid(&self) -> VertexShaderUid {
        get_vertex_shader_uid(&self.registers, self.components(), &self.config)
    }
}

/// Command-line adjustments applied on top of a captured [`VideoConfig`].
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct ConfigOverrides {
    pub api: Option<ApiType>,
    pub pixel_lighting: Option<bool>,
    pub multisamples: Option<u32>,
}

impl ConfigOverrides {
    pub fn apply(&self, config: &mut VideoConfig) -> Result<(), ConfigError> {
        if let Some(api) = self.api {
            config.backend.api_type = api;
        }
        if let Some(pixel_lighting) = self.pixel_lighting {
            config.enable_pixel_lighting = pixel_lighting;
        }
        if let Some(samples) = self.multisamples {
            config.multisamples = samples;
        }
        config.validate()
    }
}

/// Renders the tool's output for `state`: the descriptor hash followed by either the raw
/// descriptor bytes (`uid_only`) or the generated source.
pub fn render(state: &DrawState, uid_only: bool) -> String {
    let uid = state.uid();
    let mut out = String::new();
    let _ = writeln!(out, "// vertex shader uid {:016x}", uid.uid_hash());
    if uid_only {
        for chunk in uid.as_bytes().chunks(16) {
            out.push_str("//");
            for byte in chunk {
                let _ = write!(out, " {byte:02x}");
            }
            out.push('\n');
        }
    } else {
        out.push_str(&generate_vertex_shader_code(&state.config.backend, &uid));
    }
    out
}
