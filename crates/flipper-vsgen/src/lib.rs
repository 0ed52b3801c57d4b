//! `flipper-vsgen` turns the fixed-function vertex pipeline state of the emulated GPU into a
//! canonical shader descriptor and, on a cache miss, into vertex shader source.
//!
//! The crate is split the same way a draw call uses it:
//! - [`uid::get_vertex_shader_uid`] collapses register state into a [`VertexShaderUid`], a plain
//!   byte-comparable value used as the cache key.
//! - [`shader_gen::generate_vertex_shader_code`] turns a descriptor back into source text for the
//!   dialect of the active backend (see [`ApiType`]).
//! - [`cache::VertexShaderCache`] glues the two together for callers that do not keep their own
//!   cache.

pub mod cache;
pub mod components;
pub mod config;
pub mod constants;
pub mod lighting;
pub mod output;
pub mod regs;
pub mod shader_gen;
pub mod uid;

pub use cache::{VertexShaderCache, VertexShaderLookup, VertexShaderLookupSource};
pub use components::VertexComponents;
pub use config::{ApiType, BackendInfo, ConfigError, VideoConfig};
pub use regs::GpuRegisters;
pub use shader_gen::{generate_vertex_shader_code, write_vertex_shader_code, GeneratedVertexShader};
pub use uid::{get_vertex_shader_uid, VertexShaderUid};

/// Number of texture coordinate generators in the transform unit.
pub const MAX_TEX_GENS: usize = 8;

/// Number of color channels (each with a color and an alpha half) in the transform unit.
pub const NUM_COLOR_CHANNELS: usize = 2;
