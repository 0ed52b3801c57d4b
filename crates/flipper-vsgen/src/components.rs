use bitflags::bitflags;

bitflags! {
    /// Vertex attributes physically present in the current vertex format.
    ///
    /// Produced by the vertex loader. Bit positions match the loader's component mask so the raw
    /// value can be stored in (and hashed as part of) [`crate::VertexShaderUid`] unchanged.
    /// Position is always present and has no bit.
    #[derive(Debug, Copy, Clone, Default, PartialEq, Eq, Hash)]
    pub struct VertexComponents: u32 {
        const POSMTXIDX = 1 << 1;
        const TEXMTXIDX0 = 1 << 2;
        const TEXMTXIDX1 = 1 << 3;
        const TEXMTXIDX2 = 1 << 4;
        const TEXMTXIDX3 = 1 << 5;
        const TEXMTXIDX4 = 1 << 6;
        const TEXMTXIDX5 = 1 << 7;
        const TEXMTXIDX6 = 1 << 8;
        const TEXMTXIDX7 = 1 << 9;
        const NRM0 = 1 << 10;
        const NRM1 = 1 << 11;
        const NRM2 = 1 << 12;
        const COL0 = 1 << 13;
        const COL1 = 1 << 14;
        const UV0 = 1 << 15;
        const UV1 = 1 << 16;
        const UV2 = 1 << 17;
        const UV3 = 1 << 18;
        const UV4 = 1 << 19;
        const UV5 = 1 << 20;
        const UV6 = 1 << 21;
        const UV7 = 1 << 22;

        const TEXMTXIDX_ALL = 0xff << 2;
        const NRM_ALL = 0x7 << 10;
        const UV_ALL = 0xff << 15;
    }
}

impl VertexComponents {
    /// Per-vertex texture matrix index for texcoord `i`.
    pub fn texmtxidx(i: usize) -> Self {
        assert!(i < 8, "texcoord index {i} out of range");
        Self::from_bits_retain(Self::TEXMTXIDX0.bits() << i)
    }

    /// Texcoord attribute `i`.
    pub fn uv(i: usize) -> Self {
        assert!(i < 8, "texcoord index {i} out of range");
        Self::from_bits_retain(Self::UV0.bits() << i)
    }

    /// Normal attribute `i`: 0 is the normal, 1 and 2 the binormals.
    pub fn normal(i: usize) -> Self {
        assert!(i < 3, "normal index {i} out of range");
        Self::from_bits_retain(Self::NRM0.bits() << i)
    }

    /// Vertex color attribute `i` (0 or 1).
    pub fn color(i: usize) -> Self {
        assert!(i < 2, "color index {i} out of range");
        Self::from_bits_retain(Self::COL0.bits() << i)
    }

    /// Whether texcoord `i` has to be declared as a vertex input.
    ///
    /// A texture matrix index travels in the `z` component of the texcoord attribute, so the
    /// attribute exists whenever either bit is set.
    pub fn has_texcoord_input(self, i: usize) -> bool {
        self.intersects(Self::uv(i) | Self::texmtxidx(i))
    }

    /// Whether either binormal/tangent attribute is present.
    pub fn has_binormals(self) -> bool {
        self.intersects(Self::NRM1 | Self::NRM2)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn indexed_helpers_match_named_bits() {
        assert_eq!(VertexComponents::uv(0), VertexComponents::UV0);
        assert_eq!(VertexComponents::uv(7), VertexComponents::UV7);
        assert_eq!(VertexComponents::texmtxidx(3), VertexComponents::TEXMTXIDX3);
        assert_eq!(VertexComponents::color(1), VertexComponents::COL1);
    }

    #[test]
    fn texcoord_input_exists_for_matrix_index_alone() {
        let c = VertexComponents::TEXMTXIDX2;
        assert!(c.has_texcoord_input(2));
        assert!(!c.has_texcoord_input(1));
        assert!(VertexComponents::UV1.has_texcoord_input(1));
    }

    #[test]
    fn aggregate_masks_cover_their_members() {
        assert!(VertexComponents::NRM_ALL.contains(VertexComponents::NRM0 | VertexComponents::NRM2));
        assert!((0..8).all(|i| VertexComponents::UV_ALL.contains(VertexComponents::uv(i))));
        assert!((0..8).all(|i| VertexComponents::TEXMTXIDX_ALL.contains(VertexComponents::texmtxidx(i))));
    }
}
