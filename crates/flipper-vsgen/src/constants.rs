//! Names and layout shared between generated vertex shaders and the code that fills their
//! constant buffer.

pub const I_POSNORMALMATRIX: &str = "cpnmtx";
pub const I_PROJECTION: &str = "cproj";
pub const I_MATERIALS: &str = "cmtrl";
pub const I_LIGHTS: &str = "clights";
pub const I_TEXMATRICES: &str = "ctexmtx";
pub const I_TRANSFORMMATRICES: &str = "ctrmtx";
pub const I_NORMALMATRICES: &str = "cnmtx";
pub const I_POSTTRANSFORMMATRICES: &str = "cpostmtx";
pub const I_PIXELCENTERCORRECTION: &str = "cpixelcenter";

/// Uniform block binding used when the backend supports `layout(binding = N)`.
pub const VS_UNIFORM_BINDING: u32 = 2;

/// Rows in the post-transform matrix array. Row indices wrap modulo this size.
pub const POST_TRANSFORM_MATRIX_ROWS: u32 = 64;
/// Rows in the normal matrix array indexed by a per-vertex position matrix index.
pub const NORMAL_MATRIX_ROWS: u32 = 32;

/// Members of the vertex constant block, in upload order.
pub const VS_UNIFORM_MEMBERS: &str = "\tfloat4 cpnmtx[6];\n\
\tfloat4 cproj[4];\n\
\tint4 cmtrl[4];\n\
\tLight clights[8];\n\
\tfloat4 ctexmtx[24];\n\
\tfloat4 ctrmtx[64];\n\
\tfloat4 cnmtx[32];\n\
\tfloat4 cpostmtx[64];\n\
\tfloat4 cpixelcenter;\n";

pub const SHADER_POSITION_ATTRIB: u32 = 0;
pub const SHADER_POSMTX_ATTRIB: u32 = 1;
pub const SHADER_NORM0_ATTRIB: u32 = 2;
pub const SHADER_NORM1_ATTRIB: u32 = 3;
pub const SHADER_NORM2_ATTRIB: u32 = 4;
pub const SHADER_COLOR0_ATTRIB: u32 = 5;
pub const SHADER_COLOR1_ATTRIB: u32 = 6;
pub const SHADER_TEXTURE0_ATTRIB: u32 = 8;
