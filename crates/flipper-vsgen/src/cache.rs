use std::collections::hash_map::Entry;
use std::collections::HashMap;
use std::sync::Arc;

use crate::components::VertexComponents;
use crate::config::{BackendInfo, VideoConfig};
use crate::regs::GpuRegisters;
use crate::shader_gen::GeneratedVertexShader;
use crate::uid::{get_vertex_shader_uid, VertexShaderUid};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum VertexShaderLookupSource {
    /// The shader was already present in the in-memory cache.
    Memory,
    /// The synthesizer ran and the output was inserted into the in-memory cache.
    Generated,
}

#[derive(Debug, Clone)]
pub struct VertexShaderLookup {
    pub source: VertexShaderLookupSource,
    pub uid: VertexShaderUid,
    pub shader: Arc<GeneratedVertexShader>,
}

/// Cache of generated vertex shaders, keyed by the full descriptor.
///
/// Generated source depends on the backend capabilities as well as the descriptor, so every entry
/// belongs to the backend snapshot the cache currently holds.
#[derive(Debug, Default)]
pub struct VertexShaderCache {
    shaders: HashMap<VertexShaderUid, Arc<GeneratedVertexShader>>,
    backend: BackendInfo,
    hits: u64,
    misses: u64,
}

impl VertexShaderCache {
    pub fn new(backend: BackendInfo) -> Self {
        Self {
            backend,
            ..Self::default()
        }
    }

    pub fn backend(&self) -> BackendInfo {
        self.backend
    }

    /// Switches to a new backend snapshot, dropping every entry if it differs from the current one.
    pub fn set_backend(&mut self, backend: BackendInfo) {
        if self.backend != backend {
            tracing::debug!(
                flushed = self.shaders.len(),
                api = ?backend.api_type,
                "backend changed; flushing vertex shader cache"
            );
            self.backend = backend;
            self.shaders.clear();
        }
    }

    pub fn hits(&self) -> u64 {
        self.hits
    }

    pub fn misses(&self) -> u64 {
        self.misses
    }

    pub fn len(&self) -> usize {
        self.shaders.len()
    }

    pub fn is_empty(&self) -> bool {
        self.shaders.is_empty()
    }

    pub fn get_or_generate(&mut self, uid: &VertexShaderUid) -> VertexShaderLookup {
        match self.shaders.entry(*uid) {
            Entry::Occupied(e) => {
                self.hits += 1;
                VertexShaderLookup {
                    source: VertexShaderLookupSource::Memory,
                    uid: *uid,
                    shader: Arc::clone(e.get()),
                }
            }
            Entry::Vacant(e) => {
                let generated = Arc::new(GeneratedVertexShader::new(&self.backend, uid));
                self.misses += 1;
                tracing::debug!(
                    hash = generated.hash,
                    len = generated.source.len(),
                    "generated vertex shader"
                );
                VertexShaderLookup {
                    source: VertexShaderLookupSource::Generated,
                    uid: *uid,
                    shader: Arc::clone(e.insert(generated)),
                }
            }
        }
    }

    /// Builds the descriptor for a draw and looks it up, adopting `config.backend` first.
    pub fn get_or_generate_for_draw(
        &mut self,
        regs: &GpuRegisters,
        components: VertexComponents,
        config: &VideoConfig,
    ) -> VertexShaderLookup {
        self.set_backend(config.backend);
        let uid = get_vertex_shader_uid(regs, components, config);
        self.get_or_generate(&uid)
    }
}
