use std::fmt::{self, Write};

use crate::components::VertexComponents;
use crate::config::{ApiType, BackendInfo};
use crate::constants::{
    I_LIGHTS, I_NORMALMATRICES, I_PIXELCENTERCORRECTION, I_POSNORMALMATRIX,
    I_POSTTRANSFORMMATRICES, I_PROJECTION, I_TEXMATRICES, I_TRANSFORMMATRICES, NORMAL_MATRIX_ROWS,
    POST_TRANSFORM_MATRIX_ROWS, SHADER_COLOR0_ATTRIB, SHADER_NORM0_ATTRIB, SHADER_POSITION_ATTRIB,
    SHADER_POSMTX_ATTRIB, SHADER_TEXTURE0_ATTRIB, VS_UNIFORM_BINDING, VS_UNIFORM_MEMBERS,
};
use crate::lighting::{write_lighting_code, LIGHTING_LOCALS, LIGHT_STRUCT};
use crate::output::{interpolation_qualifier, write_assign_vs_output_members, write_vs_output_members};
use crate::regs::{SourceRow, TexGenType, TexInputForm, TexProjection};
use crate::uid::VertexShaderUid;
use crate::MAX_TEX_GENS;

/// Vertex shader source produced for one descriptor.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct GeneratedVertexShader {
    /// [`VertexShaderUid::uid_hash`] of the source descriptor.
    pub hash: u64,
    pub api_type: ApiType,
    /// Output record shape; the pixel stage for this draw must be generated with the same values.
    pub num_tex_gens: u32,
    pub pixel_lighting: bool,
    pub source: String,
}

impl GeneratedVertexShader {
    pub fn new(backend: &BackendInfo, uid: &VertexShaderUid) -> Self {
        Self {
            hash: uid.uid_hash(),
            api_type: backend.api_type,
            num_tex_gens: u32::from(uid.num_tex_gens),
            pixel_lighting: uid.pixel_lighting(),
            source: generate_vertex_shader_code(backend, uid),
        }
    }
}

/// Generates vertex shader source for `uid` in the dialect selected by `backend`.
///
/// Output is a pure function of the arguments.
pub fn generate_vertex_shader_code(backend: &BackendInfo, uid: &VertexShaderUid) -> String {
    let mut source = String::new();
    // Formatting into a `String` cannot fail.
    let _ = write_vertex_shader_code(&mut source, backend, uid);
    source
}

/// Writes vertex shader source for `uid` into `out`.
///
/// # Panics
///
/// Panics if `uid` violates the invariants of a built descriptor (see
/// [`VertexShaderUid::assert_valid`]).
pub fn write_vertex_shader_code<W: Write>(
    out: &mut W,
    backend: &BackendInfo,
    uid: &VertexShaderUid,
) -> fmt::Result {
    uid.assert_valid();
    let api = backend.api_type;

    out.write_str(LIGHT_STRUCT)?;
    match api {
        ApiType::OpenGl => writeln!(
            out,
            "layout(std140{}) uniform VSBlock {{",
            if backend.supports_binding_layout {
                format!(", binding = {VS_UNIFORM_BINDING}")
            } else {
                String::new()
            }
        )?,
        ApiType::D3D => out.write_str("cbuffer VSBlock {\n")?,
    }
    out.write_str(VS_UNIFORM_MEMBERS)?;
    out.write_str("};\n")?;

    out.write_str("struct VS_OUTPUT {\n")?;
    write_vs_output_members(
        out,
        api,
        u32::from(uid.num_tex_gens),
        uid.pixel_lighting(),
        "",
    )?;
    out.write_str("};\n")?;

    match api {
        ApiType::OpenGl => write_glsl_interface(out, backend, uid)?,
        ApiType::D3D => write_hlsl_entry_point(out, uid)?,
    }

    write_vertex_body(out, backend, uid)?;

    match api {
        ApiType::OpenGl => write_glsl_epilogue(out, backend, uid)?,
        ApiType::D3D => out.write_str("return o;\n")?,
    }
    out.write_str("}\n")
}

fn texcoord_width(components: VertexComponents, i: usize) -> u32 {
    // The matrix index rides along as the third component.
    if components.contains(VertexComponents::texmtxidx(i)) {
        3
    } else {
        2
    }
}

fn write_glsl_interface<W: Write>(
    out: &mut W,
    backend: &BackendInfo,
    uid: &VertexShaderUid,
) -> fmt::Result {
    let components = uid.components();

    writeln!(out, "in float4 rawpos; // ATTR{SHADER_POSITION_ATTRIB},")?;
    if components.contains(VertexComponents::POSMTXIDX) {
        writeln!(out, "in int posmtx; // ATTR{SHADER_POSMTX_ATTRIB},")?;
    }
    for i in 0..3 {
        if components.contains(VertexComponents::normal(i)) {
            writeln!(out, "in float3 rawnorm{i}; // ATTR{},", SHADER_NORM0_ATTRIB + i as u32)?;
        }
    }
    for i in 0..2 {
        if components.contains(VertexComponents::color(i)) {
            writeln!(out, "in float4 color{i}; // ATTR{},", SHADER_COLOR0_ATTRIB + i as u32)?;
        }
    }
    for i in 0..MAX_TEX_GENS {
        if components.has_texcoord_input(i) {
            writeln!(
                out,
                "in float{} tex{i}; // ATTR{},",
                texcoord_width(components, i),
                SHADER_TEXTURE0_ATTRIB + i as u32
            )?;
        }
    }

    let num_tex_gens = u32::from(uid.num_tex_gens);
    if backend.supports_geometry_shaders {
        out.write_str("out VertexData {\n")?;
        write_vs_output_members(
            out,
            ApiType::OpenGl,
            num_tex_gens,
            uid.pixel_lighting(),
            interpolation_qualifier(
                uid.msaa(),
                uid.ssaa(),
                false,
                true,
                backend.supports_binding_layout,
            ),
        )?;
        out.write_str("} vs;\n")?;
    } else {
        let q = interpolation_qualifier(
            uid.msaa(),
            uid.ssaa(),
            false,
            false,
            backend.supports_binding_layout,
        );
        for i in 0..num_tex_gens {
            writeln!(out, "{q} out float3 uv{i};")?;
        }
        writeln!(out, "{q} out float4 clipPos;")?;
        if uid.pixel_lighting() {
            writeln!(out, "{q} out float3 Normal;")?;
            writeln!(out, "{q} out float3 WorldPos;")?;
        }
        writeln!(out, "{q} out float4 colors_0;")?;
        writeln!(out, "{q} out float4 colors_1;")?;
    }

    out.write_str("void main()\n{\n")
}

fn write_hlsl_entry_point<W: Write>(out: &mut W, uid: &VertexShaderUid) -> fmt::Result {
    let components = uid.components();

    out.write_str("VS_OUTPUT main(\n")?;
    for i in 0..3 {
        if components.contains(VertexComponents::normal(i)) {
            writeln!(out, "  float3 rawnorm{i} : NORMAL{i},")?;
        }
    }
    for i in 0..2 {
        if components.contains(VertexComponents::color(i)) {
            writeln!(out, "  float4 color{i} : COLOR{i},")?;
        }
    }
    for i in 0..MAX_TEX_GENS {
        if components.has_texcoord_input(i) {
            writeln!(
                out,
                "  float{} tex{i} : TEXCOORD{i},",
                texcoord_width(components, i)
            )?;
        }
    }
    if components.contains(VertexComponents::POSMTXIDX) {
        out.write_str("  int posmtx : BLENDINDICES,\n")?;
    }
    out.write_str("  float4 rawpos : POSITION) {\n")
}

/// Dialect-independent part of `main`: transforms, lighting, texgen and the final position fixups.
fn write_vertex_body<W: Write>(
    out: &mut W,
    backend: &BackendInfo,
    uid: &VertexShaderUid,
) -> fmt::Result {
    let components = uid.components();

    out.write_str("VS_OUTPUT o;\n")?;

    write_position_and_normals(out, components)?;

    writeln!(
        out,
        "o.pos = float4(dot({I_PROJECTION}[0], pos), dot({I_PROJECTION}[1], pos), dot({I_PROJECTION}[2], pos), dot({I_PROJECTION}[3], pos));"
    )?;

    out.write_str(LIGHTING_LOCALS)?;
    write_lighting_code(out, &uid.lighting, components, "color", "o.colors_")?;

    out.write_str("float4 coord = float4(0.0, 0.0, 1.0, 1.0);\n")?;
    for i in 0..uid.num_tex_gens() {
        write_tex_gen(out, uid, i)?;
    }

    if uid.num_color_chans == 0 {
        if components.contains(VertexComponents::COL0) {
            out.write_str("o.colors_0 = color0;\n")?;
        } else {
            out.write_str("o.colors_0 = float4(1.0, 1.0, 1.0, 1.0);\n")?;
        }
    }
    if uid.num_color_chans < 2 {
        if components.contains(VertexComponents::COL1) {
            out.write_str("o.colors_1 = color1;\n")?;
        } else {
            out.write_str("o.colors_1 = o.colors_0;\n")?;
        }
    }

    // The perspective divide of clipPos happens in the pixel stage.
    out.write_str("o.clipPos = o.pos;\n")?;

    if uid.pixel_lighting() {
        out.write_str("o.Normal = _norm0;\n")?;
        out.write_str("o.WorldPos = pos.xyz;\n")?;

        if components.contains(VertexComponents::COL0) {
            out.write_str("o.colors_0 = color0;\n")?;
        }
        if components.contains(VertexComponents::COL1) {
            out.write_str("o.colors_1 = color1;\n")?;
        }
    }

    // Emulated depth runs -1..0 after the divide.
    if backend.supports_clip_control {
        out.write_str("o.pos.z = -o.pos.z;\n")?;
    } else {
        // Rescale to the -1..1 range expected without clip control.
        out.write_str("o.pos.z = o.pos.z * -2.0 - o.pos.w;\n")?;
    }

    // Host and emulated rasterizers disagree on where pixel centers are.
    writeln!(
        out,
        "o.pos.xy = o.pos.xy - o.pos.w * {I_PIXELCENTERCORRECTION}.xy;"
    )
}

fn write_position_and_normals<W: Write>(out: &mut W, components: VertexComponents) -> fmt::Result {
    if components.contains(VertexComponents::POSMTXIDX) {
        writeln!(
            out,
            "float4 pos = float4(dot({m}[posmtx], rawpos), dot({m}[posmtx+1], rawpos), dot({m}[posmtx+2], rawpos), 1);",
            m = I_TRANSFORMMATRICES
        )?;

        if components.intersects(VertexComponents::NRM_ALL) {
            writeln!(out, "int normidx = posmtx & {};", NORMAL_MATRIX_ROWS - 1)?;
            writeln!(
                out,
                "float3 N0 = {m}[normidx].xyz, N1 = {m}[normidx+1].xyz, N2 = {m}[normidx+2].xyz;",
                m = I_NORMALMATRICES
            )?;
        }

        if components.contains(VertexComponents::NRM0) {
            out.write_str(
                "float3 _norm0 = normalize(float3(dot(N0, rawnorm0), dot(N1, rawnorm0), dot(N2, rawnorm0)));\n",
            )?;
        }
        for i in 1..3 {
            if components.contains(VertexComponents::normal(i)) {
                writeln!(
                    out,
                    "float3 _norm{i} = float3(dot(N0, rawnorm{i}), dot(N1, rawnorm{i}), dot(N2, rawnorm{i}));"
                )?;
            }
        }
    } else {
        writeln!(
            out,
            "float4 pos = float4(dot({m}[0], rawpos), dot({m}[1], rawpos), dot({m}[2], rawpos), 1.0);",
            m = I_POSNORMALMATRIX
        )?;
        if components.contains(VertexComponents::NRM0) {
            writeln!(
                out,
                "float3 _norm0 = normalize(float3(dot({m}[3].xyz, rawnorm0), dot({m}[4].xyz, rawnorm0), dot({m}[5].xyz, rawnorm0)));",
                m = I_POSNORMALMATRIX
            )?;
        }
        for i in 1..3 {
            if components.contains(VertexComponents::normal(i)) {
                writeln!(
                    out,
                    "float3 _norm{i} = float3(dot({m}[3].xyz, rawnorm{i}), dot({m}[4].xyz, rawnorm{i}), dot({m}[5].xyz, rawnorm{i}));",
                    m = I_POSNORMALMATRIX
                )?;
            }
        }
    }

    // Lighting always reads `_norm0`.
    if !components.contains(VertexComponents::NRM0) {
        out.write_str("float3 _norm0 = float3(0.0, 0.0, 0.0);\n")?;
    }
    Ok(())
}

fn write_tex_gen<W: Write>(out: &mut W, uid: &VertexShaderUid, i: usize) -> fmt::Result {
    let components = uid.components();
    let info = &uid.tex_mtx_info[i];
    let tex_gen_type = info.tex_gen_type();

    out.write_str("{\n")?;
    out.write_str("coord = float4(0.0, 0.0, 1.0, 1.0);\n")?;
    match info.source_row() {
        SourceRow::Geometry => out.write_str("coord.xyz = rawpos.xyz;\n")?,
        SourceRow::Normal => {
            if components.contains(VertexComponents::NRM0) {
                out.write_str("coord.xyz = rawnorm0.xyz;\n")?;
            }
        }
        SourceRow::Colors => {
            debug_assert!(
                matches!(
                    tex_gen_type,
                    TexGenType::ColorStrgbc0 | TexGenType::ColorStrgbc1
                ),
                "color source row used by {tex_gen_type:?} texgen {i}"
            );
        }
        SourceRow::BinormalT => {
            if components.contains(VertexComponents::NRM1) {
                out.write_str("coord.xyz = rawnorm1.xyz;\n")?;
            }
        }
        SourceRow::BinormalB => {
            if components.contains(VertexComponents::NRM2) {
                out.write_str("coord.xyz = rawnorm2.xyz;\n")?;
            }
        }
        SourceRow::Tex(n) => {
            if components.contains(VertexComponents::uv(usize::from(n))) {
                writeln!(out, "coord = float4(tex{n}.x, tex{n}.y, 1.0, 1.0);")?;
            }
        }
    }

    if info.input_form() == TexInputForm::Ab11 {
        out.write_str("coord.z = 1.0;\n")?;
    }

    match tex_gen_type {
        TexGenType::EmbossMap => {
            let source = info.emboss_source_shift;
            if components.has_binormals() {
                // Project the light direction onto the tangent frame.
                writeln!(
                    out,
                    "ldir = normalize({I_LIGHTS}[{}].pos.xyz - pos.xyz);",
                    info.emboss_light_shift
                )?;
                writeln!(
                    out,
                    "o.tex{i}.xyz = o.tex{source}.xyz + float3(dot(ldir, {}), dot(ldir, {}), 0.0);",
                    binormal(components, VertexComponents::NRM1, "_norm1"),
                    binormal(components, VertexComponents::NRM2, "_norm2"),
                )?;
            } else {
                // Some titles emboss without binormals; pass the source coordinates through.
                writeln!(out, "o.tex{i}.xyz = o.tex{source}.xyz;")?;
            }
        }
        TexGenType::ColorStrgbc0 => {
            writeln!(out, "o.tex{i}.xyz = float3(o.colors_0.x, o.colors_0.y, 1);")?;
        }
        TexGenType::ColorStrgbc1 => {
            writeln!(out, "o.tex{i}.xyz = float3(o.colors_1.x, o.colors_1.y, 1);")?;
        }
        TexGenType::Regular | TexGenType::Reserved(_) => {
            let projection = uid.projection(i);
            if components.contains(VertexComponents::texmtxidx(i)) {
                let m = I_TRANSFORMMATRICES;
                writeln!(out, "int tmp = int(tex{i}.z);")?;
                match projection {
                    TexProjection::Stq => writeln!(
                        out,
                        "o.tex{i}.xyz = float3(dot(coord, {m}[tmp]), dot(coord, {m}[tmp+1]), dot(coord, {m}[tmp+2]));"
                    )?,
                    TexProjection::St => writeln!(
                        out,
                        "o.tex{i}.xyz = float3(dot(coord, {m}[tmp]), dot(coord, {m}[tmp+1]), 1);"
                    )?,
                }
            } else {
                let m = I_TEXMATRICES;
                let row = 3 * i;
                match projection {
                    TexProjection::Stq => writeln!(
                        out,
                        "o.tex{i}.xyz = float3(dot(coord, {m}[{row}]), dot(coord, {m}[{}]), dot(coord, {m}[{}]));",
                        row + 1,
                        row + 2
                    )?,
                    TexProjection::St => writeln!(
                        out,
                        "o.tex{i}.xyz = float3(dot(coord, {m}[{row}]), dot(coord, {m}[{}]), 1);",
                        row + 1
                    )?,
                }
            }
        }
    }

    if uid.has_post_transform(i) {
        let post = &uid.post_mtx_info[i];
        let index = u32::from(post.index);
        let wrap = POST_TRANSFORM_MATRIX_ROWS - 1;
        let m = I_POSTTRANSFORMMATRICES;
        writeln!(out, "float4 P0 = {m}[{}];", index & wrap)?;
        writeln!(out, "float4 P1 = {m}[{}];", (index + 1) & wrap)?;
        writeln!(out, "float4 P2 = {m}[{}];", (index + 2) & wrap)?;

        if post.normalize != 0 {
            writeln!(out, "o.tex{i}.xyz = normalize(o.tex{i}.xyz);")?;
        }

        writeln!(
            out,
            "o.tex{i}.xyz = float3(dot(P0.xyz, o.tex{i}.xyz) + P0.w, dot(P1.xyz, o.tex{i}.xyz) + P1.w, dot(P2.xyz, o.tex{i}.xyz) + P2.w);"
        )?;
    }

    out.write_str("}\n")
}

/// A transformed binormal, or a zero vector when only the other one is present.
fn binormal(
    components: VertexComponents,
    bit: VertexComponents,
    name: &'static str,
) -> &'static str {
    if components.contains(bit) {
        name
    } else {
        "float3(0.0, 0.0, 0.0)"
    }
}

fn write_glsl_epilogue<W: Write>(
    out: &mut W,
    backend: &BackendInfo,
    uid: &VertexShaderUid,
) -> fmt::Result {
    let num_tex_gens = u32::from(uid.num_tex_gens);
    if backend.supports_geometry_shaders {
        write_assign_vs_output_members(out, "vs", "o", num_tex_gens, uid.pixel_lighting())?;
    } else {
        // TODO: use an interface block here too once GLSL 1.50 is the minimum supported version.
        for i in 0..num_tex_gens {
            writeln!(out, "uv{i}.xyz = o.tex{i};")?;
        }
        out.write_str("clipPos = o.clipPos;\n")?;
        if uid.pixel_lighting() {
            out.write_str("Normal = o.Normal;\n")?;
            out.write_str("WorldPos = o.WorldPos;\n")?;
        }
        out.write_str("colors_0 = o.colors_0;\n")?;
        out.write_str("colors_1 = o.colors_1;\n")?;
    }

    out.write_str("gl_Position = o.pos;\n")
}
