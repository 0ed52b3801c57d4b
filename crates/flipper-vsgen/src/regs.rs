//! Typed views of the transform-unit (XF) and blitting-processor (BP) register words read when
//! building a vertex shader descriptor.
//!
//! Register words are kept raw (`u32`) so captured draw states round-trip exactly; the accessors
//! decode individual fields into closed enums.

use serde::{Deserialize, Serialize};

use crate::{MAX_TEX_GENS, NUM_COLOR_CHANNELS};

const fn bits(hex: u32, shift: u32, width: u32) -> u32 {
    (hex >> shift) & ((1 << width) - 1)
}

const fn with_bits(hex: u32, shift: u32, width: u32, value: u32) -> u32 {
    let mask = ((1 << width) - 1) << shift;
    (hex & !mask) | ((value << shift) & mask)
}

/// How a texture coordinate generator computes its output.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum TexGenType {
    /// Multiply the source row by a texture matrix.
    Regular,
    /// Offset a previously generated coordinate along the light direction in tangent space.
    EmbossMap,
    /// Use the red/green components of lit color channel 0.
    ColorStrgbc0,
    /// Use the red/green components of lit color channel 1.
    ColorStrgbc1,
    /// Encodings 4..7. Generated like [`TexGenType::Regular`], but never followed by the dual
    /// transform.
    Reserved(u8),
}

impl TexGenType {
    /// Decodes the 3-bit register field.
    pub const fn from_bits(v: u32) -> Self {
        match v & 0x7 {
            0 => TexGenType::Regular,
            1 => TexGenType::EmbossMap,
            2 => TexGenType::ColorStrgbc0,
            3 => TexGenType::ColorStrgbc1,
            v => TexGenType::Reserved(v as u8),
        }
    }

    pub const fn to_bits(self) -> u32 {
        match self {
            TexGenType::Regular => 0,
            TexGenType::EmbossMap => 1,
            TexGenType::ColorStrgbc0 => 2,
            TexGenType::ColorStrgbc1 => 3,
            TexGenType::Reserved(v) => v as u32 & 0x7,
        }
    }
}

/// Input row a texture coordinate generator reads.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum SourceRow {
    Geometry,
    Normal,
    Colors,
    BinormalT,
    BinormalB,
    /// Raw texcoord attribute 0..7.
    Tex(u8),
}

impl SourceRow {
    pub const TEX0_ROW: u32 = 5;
    pub const TEX7_ROW: u32 = 12;

    /// Decodes the 5-bit register field. Rows past `TEX7` are undefined and yield `None`.
    pub const fn from_bits(v: u32) -> Option<Self> {
        Some(match v {
            0 => SourceRow::Geometry,
            1 => SourceRow::Normal,
            2 => SourceRow::Colors,
            3 => SourceRow::BinormalT,
            4 => SourceRow::BinormalB,
            Self::TEX0_ROW..=Self::TEX7_ROW => SourceRow::Tex((v - Self::TEX0_ROW) as u8),
            _ => return None,
        })
    }

    pub const fn to_bits(self) -> u32 {
        match self {
            SourceRow::Geometry => 0,
            SourceRow::Normal => 1,
            SourceRow::Colors => 2,
            SourceRow::BinormalT => 3,
            SourceRow::BinormalB => 4,
            SourceRow::Tex(i) => Self::TEX0_ROW + i as u32,
        }
    }
}

/// Texture coordinate input form.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum TexInputForm {
    /// `(A, B, 1, 1)`: the third component is forced to one.
    Ab11,
    /// `(A, B, C, 1)`.
    Abc1,
}

impl TexInputForm {
    /// Only encoding 0 forces `z = 1`; the reserved encodings 2/3 behave like `ABC1`.
    pub const fn from_bits(v: u32) -> Self {
        match v & 0x3 {
            0 => TexInputForm::Ab11,
            _ => TexInputForm::Abc1,
        }
    }

    pub const fn to_bits(self) -> u32 {
        match self {
            TexInputForm::Ab11 => 0,
            TexInputForm::Abc1 => 1,
        }
    }
}

/// Output width of a regular texture matrix multiply.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum TexProjection {
    /// Two rows; `q` is an implicit 1.
    St,
    /// Three rows.
    Stq,
}

impl TexProjection {
    pub const fn from_bits(v: u32) -> Self {
        if v & 1 != 0 {
            TexProjection::Stq
        } else {
            TexProjection::St
        }
    }

    pub const fn to_bits(self) -> u32 {
        match self {
            TexProjection::St => 0,
            TexProjection::Stq => 1,
        }
    }
}

/// Diffuse term of a lit channel.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum DiffuseFunc {
    None,
    Sign,
    Clamp,
}

impl DiffuseFunc {
    /// Encoding 3 is reserved; it is treated as `Clamp`.
    pub const fn from_bits(v: u32) -> Self {
        match v & 0x3 {
            0 => DiffuseFunc::None,
            1 => DiffuseFunc::Sign,
            _ => DiffuseFunc::Clamp,
        }
    }

    pub const fn to_bits(self) -> u32 {
        match self {
            DiffuseFunc::None => 0,
            DiffuseFunc::Sign => 1,
            DiffuseFunc::Clamp => 2,
        }
    }
}

/// Attenuation model of a lit channel.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum AttenuationFunc {
    None,
    Spec,
    Dir,
    Spot,
}

impl AttenuationFunc {
    pub const fn from_bits(v: u32) -> Self {
        match v & 0x3 {
            0 => AttenuationFunc::None,
            1 => AttenuationFunc::Spec,
            2 => AttenuationFunc::Dir,
            _ => AttenuationFunc::Spot,
        }
    }

    pub const fn to_bits(self) -> u32 {
        match self {
            AttenuationFunc::None => 0,
            AttenuationFunc::Spec => 1,
            AttenuationFunc::Dir => 2,
            AttenuationFunc::Spot => 3,
        }
    }
}

/// BP `GENMODE`: pipeline counts as seen by the pixel side of the GPU.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct GenMode(pub u32);

impl GenMode {
    pub const fn num_tex_gens(self) -> u32 {
        bits(self.0, 0, 4)
    }

    pub const fn num_color_chans(self) -> u32 {
        bits(self.0, 4, 3)
    }

    pub const fn with_counts(self, num_tex_gens: u32, num_color_chans: u32) -> Self {
        Self(with_bits(with_bits(self.0, 0, 4, num_tex_gens), 4, 3, num_color_chans))
    }
}

/// XF `TEXMTXINFO` for one generator.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TexMtxInfo(pub u32);

impl TexMtxInfo {
    pub const fn projection(self) -> TexProjection {
        TexProjection::from_bits(bits(self.0, 1, 1))
    }

    pub const fn input_form(self) -> TexInputForm {
        TexInputForm::from_bits(bits(self.0, 2, 2))
    }

    pub const fn tex_gen_type(self) -> TexGenType {
        TexGenType::from_bits(bits(self.0, 4, 3))
    }

    pub const fn source_row_bits(self) -> u32 {
        bits(self.0, 7, 5)
    }

    pub const fn source_row(self) -> Option<SourceRow> {
        SourceRow::from_bits(self.source_row_bits())
    }

    /// Generator whose output an emboss generator offsets.
    pub const fn emboss_source_shift(self) -> u32 {
        bits(self.0, 12, 3)
    }

    /// Light whose position drives an emboss generator.
    pub const fn emboss_light_shift(self) -> u32 {
        bits(self.0, 15, 3)
    }

    pub const fn with_projection(self, v: TexProjection) -> Self {
        Self(with_bits(self.0, 1, 1, v.to_bits()))
    }

    pub const fn with_input_form(self, v: TexInputForm) -> Self {
        Self(with_bits(self.0, 2, 2, v.to_bits()))
    }

    pub const fn with_tex_gen_type(self, v: TexGenType) -> Self {
        Self(with_bits(self.0, 4, 3, v.to_bits()))
    }

    pub const fn with_source_row(self, v: SourceRow) -> Self {
        Self(with_bits(self.0, 7, 5, v.to_bits()))
    }

    pub const fn with_emboss_source_shift(self, v: u32) -> Self {
        Self(with_bits(self.0, 12, 3, v))
    }

    pub const fn with_emboss_light_shift(self, v: u32) -> Self {
        Self(with_bits(self.0, 15, 3, v))
    }
}

/// XF `POSTMTXINFO` for one generator (dual texture transform).
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct PostMtxInfo(pub u32);

impl PostMtxInfo {
    /// Base row of the post-transform matrix.
    pub const fn index(self) -> u32 {
        bits(self.0, 0, 6)
    }

    pub const fn normalize(self) -> bool {
        bits(self.0, 8, 1) != 0
    }

    pub const fn with_index(self, v: u32) -> Self {
        Self(with_bits(self.0, 0, 6, v))
    }

    pub const fn with_normalize(self, v: bool) -> Self {
        Self(with_bits(self.0, 8, 1, v as u32))
    }
}

/// XF color or alpha channel control word.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct LitChannel(pub u32);

impl LitChannel {
    /// Material color comes from the vertex (`true`) or the material register (`false`).
    pub const fn mat_source(self) -> bool {
        bits(self.0, 0, 1) != 0
    }

    pub const fn enable_lighting(self) -> bool {
        bits(self.0, 1, 1) != 0
    }

    /// Ambient color comes from the vertex (`true`) or the ambient register (`false`).
    pub const fn amb_source(self) -> bool {
        bits(self.0, 6, 1) != 0
    }

    pub const fn diffuse_func(self) -> DiffuseFunc {
        DiffuseFunc::from_bits(bits(self.0, 7, 2))
    }

    pub const fn attn_func(self) -> AttenuationFunc {
        AttenuationFunc::from_bits(bits(self.0, 9, 2))
    }

    /// All eight light enables, or zero when lighting is off for this channel.
    pub const fn full_light_mask(self) -> u32 {
        if self.enable_lighting() {
            bits(self.0, 2, 4) | (bits(self.0, 11, 4) << 4)
        } else {
            0
        }
    }

    pub const fn with_mat_source(self, v: bool) -> Self {
        Self(with_bits(self.0, 0, 1, v as u32))
    }

    pub const fn with_enable_lighting(self, v: bool) -> Self {
        Self(with_bits(self.0, 1, 1, v as u32))
    }

    pub const fn with_amb_source(self, v: bool) -> Self {
        Self(with_bits(self.0, 6, 1, v as u32))
    }

    pub const fn with_diffuse_func(self, v: DiffuseFunc) -> Self {
        Self(with_bits(self.0, 7, 2, v.to_bits()))
    }

    pub const fn with_attn_func(self, v: AttenuationFunc) -> Self {
        Self(with_bits(self.0, 9, 2, v.to_bits()))
    }

    pub const fn with_light_mask(self, mask: u8) -> Self {
        let mask = mask as u32;
        Self(with_bits(with_bits(self.0, 2, 4, mask & 0xf), 11, 4, mask >> 4))
    }
}

/// Transform-unit registers consulted by the vertex shader descriptor.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct XfRegisters {
    pub num_tex_gens: u32,
    pub num_color_chans: u32,
    pub color: [LitChannel; NUM_COLOR_CHANNELS],
    pub alpha: [LitChannel; NUM_COLOR_CHANNELS],
    pub tex_mtx_info: [TexMtxInfo; MAX_TEX_GENS],
    pub post_mtx_info: [PostMtxInfo; MAX_TEX_GENS],
    pub dual_tex_trans_enabled: bool,
}

/// Snapshot of every register word the descriptor builder reads.
///
/// The generator and channel counts are tracked independently by the BP and XF units; they must
/// agree whenever a descriptor is built.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct GpuRegisters {
    pub bp_gen_mode: GenMode,
    pub xf: XfRegisters,
}

impl GpuRegisters {
    /// Sets both copies of the generator/channel counts.
    pub fn set_counts(&mut self, num_tex_gens: u32, num_color_chans: u32) {
        self.bp_gen_mode = self.bp_gen_mode.with_counts(num_tex_gens, num_color_chans);
        self.xf.num_tex_gens = num_tex_gens;
        self.xf.num_color_chans = num_color_chans;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn tex_mtx_info_fields_round_trip_through_builders() {
        let info = TexMtxInfo::default()
            .with_projection(TexProjection::Stq)
            .with_input_form(TexInputForm::Abc1)
            .with_tex_gen_type(TexGenType::EmbossMap)
            .with_source_row(SourceRow::Tex(6))
            .with_emboss_source_shift(5)
            .with_emboss_light_shift(7);

        assert_eq!(info.projection(), TexProjection::Stq);
        assert_eq!(info.input_form(), TexInputForm::Abc1);
        assert_eq!(info.tex_gen_type(), TexGenType::EmbossMap);
        assert_eq!(info.source_row(), Some(SourceRow::Tex(6)));
        assert_eq!(info.emboss_source_shift(), 5);
        assert_eq!(info.emboss_light_shift(), 7);
    }

    #[test]
    fn tex_mtx_info_bit_layout() {
        // projection=STQ, inputform=ABC1, texgentype=EMBOSS, sourcerow=TEX0, src shift=1,
        // light shift=2.
        let hex = (1 << 1) | (1 << 2) | (1 << 4) | (5 << 7) | (1 << 12) | (2 << 15);
        let info = TexMtxInfo(hex);
        assert_eq!(info.projection(), TexProjection::Stq);
        assert_eq!(info.input_form(), TexInputForm::Abc1);
        assert_eq!(info.tex_gen_type(), TexGenType::EmbossMap);
        assert_eq!(info.source_row(), Some(SourceRow::Tex(0)));
        assert_eq!(info.emboss_source_shift(), 1);
        assert_eq!(info.emboss_light_shift(), 2);
    }

    #[test]
    fn reserved_encodings_decode() {
        assert_eq!(TexGenType::from_bits(5), TexGenType::Reserved(5));
        assert_eq!(TexGenType::Reserved(5).to_bits(), 5);
        assert_eq!(TexInputForm::from_bits(3), TexInputForm::Abc1);
        assert_eq!(DiffuseFunc::from_bits(3), DiffuseFunc::Clamp);
        assert_eq!(SourceRow::from_bits(13), None);
        assert_eq!(SourceRow::from_bits(31), None);
    }

    #[test]
    fn post_mtx_info_fields() {
        let info = PostMtxInfo::default().with_index(62).with_normalize(true);
        assert_eq!(info.0, 62 | (1 << 8));
        assert_eq!(info.index(), 62);
        assert!(info.normalize());
    }

    #[test]
    fn lit_channel_light_mask_spans_both_fields_and_requires_lighting() {
        let chan = LitChannel::default().with_light_mask(0b1001_0110);
        assert_eq!(chan.full_light_mask(), 0);

        let chan = chan.with_enable_lighting(true);
        assert_eq!(chan.full_light_mask(), 0b1001_0110);
    }

    #[test]
    fn gen_mode_counts() {
        let mode = GenMode::default().with_counts(8, 2);
        assert_eq!(mode.num_tex_gens(), 8);
        assert_eq!(mode.num_color_chans(), 2);
    }
}
