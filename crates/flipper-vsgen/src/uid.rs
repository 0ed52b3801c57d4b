//! Vertex shader descriptor ("UID") and the builder that derives it from register state.
//!
//! The descriptor is plain old data with no implicit padding, and the builder starts from an
//! all-zero value. Two descriptors are therefore interchangeable exactly when their bytes are
//! equal, which is what the shader cache keys on.

use std::hash::{Hash, Hasher};

use bytemuck::{Pod, Zeroable};

use crate::components::VertexComponents;
use crate::config::VideoConfig;
use crate::lighting::LightingUid;
use crate::regs::{GpuRegisters, SourceRow, TexGenType, TexInputForm, TexProjection};
use crate::{MAX_TEX_GENS, NUM_COLOR_CHANNELS};

/// Per-generator part of the descriptor.
#[repr(C)]
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Pod, Zeroable)]
pub struct TexMtxUid {
    /// Raw source row (see [`SourceRow::from_bits`]).
    pub source_row: u8,
    /// Raw 3-bit [`TexGenType`] encoding.
    pub tex_gen_type: u8,
    /// Canonical [`TexInputForm`] encoding.
    pub input_form: u8,
    pub emboss_light_shift: u8,
    pub emboss_source_shift: u8,
    pub _pad: [u8; 3],
}

impl TexMtxUid {
    pub fn source_row(&self) -> SourceRow {
        match SourceRow::from_bits(u32::from(self.source_row)) {
            Some(row) => row,
            None => panic!("texgen source row {} out of range", self.source_row),
        }
    }

    pub fn tex_gen_type(&self) -> TexGenType {
        TexGenType::from_bits(u32::from(self.tex_gen_type))
    }

    pub fn input_form(&self) -> TexInputForm {
        TexInputForm::from_bits(u32::from(self.input_form))
    }
}

/// Per-generator dual-transform part of the descriptor.
#[repr(C)]
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Pod, Zeroable)]
pub struct PostMtxUid {
    pub index: u8,
    pub normalize: u8,
}

/// Canonical description of the fixed-function vertex pipeline, used as a shader cache key.
///
/// Boolean fields are stored as `0`/`1` bytes so the whole value is `Pod`. Fields that do not
/// affect the generated shader for the current configuration are always zero.
#[repr(C)]
#[derive(Clone, Copy, Debug, PartialEq, Eq, Pod, Zeroable)]
pub struct VertexShaderUid {
    pub components: u32,
    pub num_tex_gens: u8,
    pub num_color_chans: u8,
    pub pixel_lighting: u8,
    pub msaa: u8,
    pub ssaa: u8,
    pub dual_tex_trans_enabled: u8,
    /// Bit `i` holds the [`TexProjection`] of regular generator `i`.
    pub tex_mtx_projection: u8,
    pub _pad: u8,
    pub lighting: LightingUid,
    pub tex_mtx_info: [TexMtxUid; MAX_TEX_GENS],
    pub post_mtx_info: [PostMtxUid; MAX_TEX_GENS],
}

impl Default for VertexShaderUid {
    fn default() -> Self {
        Self::zeroed()
    }
}

impl Hash for VertexShaderUid {
    fn hash<H: Hasher>(&self, state: &mut H) {
        state.write(self.as_bytes());
    }
}

impl VertexShaderUid {
    pub fn as_bytes(&self) -> &[u8] {
        bytemuck::bytes_of(self)
    }

    /// Stable 64-bit digest of the full descriptor bytes.
    pub fn uid_hash(&self) -> u64 {
        xxhash_rust::xxh3::xxh3_64(self.as_bytes())
    }

    pub fn components(&self) -> VertexComponents {
        VertexComponents::from_bits_retain(self.components)
    }

    pub fn num_tex_gens(&self) -> usize {
        usize::from(self.num_tex_gens)
    }

    pub fn num_color_chans(&self) -> usize {
        usize::from(self.num_color_chans)
    }

    pub fn pixel_lighting(&self) -> bool {
        self.pixel_lighting != 0
    }

    pub fn msaa(&self) -> bool {
        self.msaa != 0
    }

    pub fn ssaa(&self) -> bool {
        self.ssaa != 0
    }

    pub fn dual_tex_trans_enabled(&self) -> bool {
        self.dual_tex_trans_enabled != 0
    }

    pub fn projection(&self, tex_gen: usize) -> TexProjection {
        TexProjection::from_bits(u32::from(self.tex_mtx_projection >> tex_gen))
    }

    /// Whether generator `i` is followed by the dual (post) transform.
    ///
    /// The post transform only exists for regular generators; reserved types skip it.
    pub fn has_post_transform(&self, tex_gen: usize) -> bool {
        self.dual_tex_trans_enabled()
            && self.tex_mtx_info[tex_gen].tex_gen_type() == TexGenType::Regular
    }

    /// Checks the range invariants a built descriptor always satisfies.
    pub fn assert_valid(&self) {
        assert!(
            self.num_tex_gens() <= MAX_TEX_GENS,
            "descriptor has {} texgens (max {MAX_TEX_GENS})",
            self.num_tex_gens
        );
        assert!(
            self.num_color_chans() <= NUM_COLOR_CHANNELS,
            "descriptor has {} color channels (max {NUM_COLOR_CHANNELS})",
            self.num_color_chans
        );
        for (i, info) in self.tex_mtx_info[..self.num_tex_gens()].iter().enumerate() {
            assert!(
                SourceRow::from_bits(u32::from(info.source_row)).is_some(),
                "texgen {i} has source row {} out of range",
                info.source_row
            );
            if info.tex_gen_type() == TexGenType::EmbossMap {
                assert!(
                    info.emboss_source_shift < self.num_tex_gens,
                    "emboss texgen {i} reads texgen {} of {}",
                    info.emboss_source_shift,
                    self.num_tex_gens
                );
            }
        }
    }
}

/// Builds the descriptor for the current draw state.
///
/// # Panics
///
/// Panics if the BP and XF units disagree about the generator or channel count, or if the state
/// contains an out-of-range count, source row, or emboss source generator. These indicate desynchronized upstream state, not
/// a recoverable condition.
pub fn get_vertex_shader_uid(
    regs: &GpuRegisters,
    components: VertexComponents,
    config: &VideoConfig,
) -> VertexShaderUid {
    let xf = &regs.xf;
    assert_eq!(
        regs.bp_gen_mode.num_tex_gens(),
        xf.num_tex_gens,
        "BP and XF texgen counts disagree"
    );
    assert_eq!(
        regs.bp_gen_mode.num_color_chans(),
        xf.num_color_chans,
        "BP and XF color channel counts disagree"
    );
    let num_tex_gens = xf.num_tex_gens as usize;
    assert!(
        num_tex_gens <= MAX_TEX_GENS,
        "{num_tex_gens} texgens exceeds the {MAX_TEX_GENS} generators of the transform unit"
    );
    assert!(
        xf.num_color_chans as usize <= NUM_COLOR_CHANNELS,
        "{} color channels exceeds {NUM_COLOR_CHANNELS}",
        xf.num_color_chans
    );

    let mut uid = VertexShaderUid::zeroed();
    uid.num_tex_gens = num_tex_gens as u8;
    uid.num_color_chans = xf.num_color_chans as u8;
    uid.components = components.bits();
    uid.pixel_lighting = config.enable_pixel_lighting as u8;
    uid.msaa = config.msaa() as u8;
    uid.ssaa = config.ssaa() as u8;

    uid.lighting = LightingUid::from_registers(xf);

    for i in 0..num_tex_gens {
        let reg = xf.tex_mtx_info[i];
        let Some(source_row) = reg.source_row() else {
            panic!("texgen {i} has source row {} out of range", reg.source_row_bits());
        };
        let tex_gen_type = reg.tex_gen_type();

        let info = &mut uid.tex_mtx_info[i];
        info.source_row = source_row.to_bits() as u8;
        info.tex_gen_type = tex_gen_type.to_bits() as u8;
        info.input_form = reg.input_form().to_bits() as u8;

        match tex_gen_type {
            TexGenType::EmbossMap => {
                let source = reg.emboss_source_shift() as usize;
                assert!(
                    source < num_tex_gens,
                    "emboss texgen {i} reads texgen {source} of {num_tex_gens}"
                );
                info.emboss_source_shift = source as u8;
                // The light only matters when there are binormals to project it onto.
                if components.has_binormals() {
                    info.emboss_light_shift = reg.emboss_light_shift() as u8;
                }
            }
            TexGenType::ColorStrgbc0 | TexGenType::ColorStrgbc1 => {}
            TexGenType::Regular | TexGenType::Reserved(_) => {
                uid.tex_mtx_projection |= (reg.projection().to_bits() as u8) << i;
            }
        }

        uid.dual_tex_trans_enabled = xf.dual_tex_trans_enabled as u8;
        if xf.dual_tex_trans_enabled && tex_gen_type == TexGenType::Regular {
            let post = xf.post_mtx_info[i];
            uid.post_mtx_info[i] = PostMtxUid {
                index: post.index() as u8,
                normalize: post.normalize() as u8,
            };
        }
    }

    tracing::trace!(
        hash = uid.uid_hash(),
        num_tex_gens,
        components = uid.components,
        "built vertex shader uid"
    );
    uid
}
