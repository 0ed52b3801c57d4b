//! The vertex output record shared by the vertex, geometry and pixel stages.
//!
//! Every stage declares the members through [`write_vs_output_members`] so the order and the
//! HLSL semantics stay identical on both sides of a stage boundary.

use std::fmt::{self, Write};

use crate::config::ApiType;

/// Interpolation qualifier for stage outputs/inputs under multisampling.
///
/// Without `GL_ARB_shading_language_420pack` (reported as binding layout support), GLSL only
/// accepts the combined `centroid in`/`centroid out` forms inside interface blocks.
pub fn interpolation_qualifier(
    msaa: bool,
    ssaa: bool,
    in_glsl_interface_block: bool,
    input: bool,
    supports_binding_layout: bool,
) -> &'static str {
    if !msaa {
        return "";
    }

    if in_glsl_interface_block && !supports_binding_layout {
        match (ssaa, input) {
            (false, true) => "centroid in",
            (false, false) => "centroid out",
            (true, true) => "sample in",
            (true, false) => "sample out",
        }
    } else if ssaa {
        "sample"
    } else {
        "centroid"
    }
}

#[allow(clippy::too_many_arguments)]
fn define_output_member<W: Write>(
    out: &mut W,
    api: ApiType,
    qualifier: &str,
    ty: &str,
    name: &str,
    var_index: Option<u32>,
    semantic: &str,
    semantic_index: Option<u32>,
) -> fmt::Result {
    write!(out, "\t{qualifier} {ty} {name}")?;
    if let Some(index) = var_index {
        write!(out, "{index}")?;
    }
    if api == ApiType::D3D && !semantic.is_empty() {
        match semantic_index {
            Some(index) => write!(out, " : {semantic}{index}")?,
            None => write!(out, " : {semantic}")?,
        }
    }
    out.write_str(";\n")
}

/// Writes the members of the vertex output record, in their fixed order.
pub fn write_vs_output_members<W: Write>(
    out: &mut W,
    api: ApiType,
    tex_gens: u32,
    per_pixel_lighting: bool,
    qualifier: &str,
) -> fmt::Result {
    define_output_member(out, api, qualifier, "float4", "pos", None, "POSITION", None)?;
    define_output_member(out, api, qualifier, "float4", "colors_", Some(0), "COLOR", Some(0))?;
    define_output_member(out, api, qualifier, "float4", "colors_", Some(1), "COLOR", Some(1))?;

    for i in 0..tex_gens {
        define_output_member(out, api, qualifier, "float3", "tex", Some(i), "TEXCOORD", Some(i))?;
    }

    define_output_member(
        out,
        api,
        qualifier,
        "float4",
        "clipPos",
        None,
        "TEXCOORD",
        Some(tex_gens),
    )?;

    if per_pixel_lighting {
        define_output_member(
            out,
            api,
            qualifier,
            "float3",
            "Normal",
            None,
            "TEXCOORD",
            Some(tex_gens + 1),
        )?;
        define_output_member(
            out,
            api,
            qualifier,
            "float3",
            "WorldPos",
            None,
            "TEXCOORD",
            Some(tex_gens + 2),
        )?;
    }
    Ok(())
}

/// Copies every output member from record `src` to record `dst`.
pub fn write_assign_vs_output_members<W: Write>(
    out: &mut W,
    dst: &str,
    src: &str,
    tex_gens: u32,
    per_pixel_lighting: bool,
) -> fmt::Result {
    writeln!(out, "\t{dst}.pos = {src}.pos;")?;
    writeln!(out, "\t{dst}.colors_0 = {src}.colors_0;")?;
    writeln!(out, "\t{dst}.colors_1 = {src}.colors_1;")?;
    for i in 0..tex_gens {
        writeln!(out, "\t{dst}.tex{i} = {src}.tex{i};")?;
    }
    writeln!(out, "\t{dst}.clipPos = {src}.clipPos;")?;
    if per_pixel_lighting {
        writeln!(out, "\t{dst}.Normal = {src}.Normal;")?;
        writeln!(out, "\t{dst}.WorldPos = {src}.WorldPos;")?;
    }
    Ok(())
}
