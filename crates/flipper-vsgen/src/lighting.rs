//! Per-vertex lighting: the lighting part of the vertex shader descriptor and the code that
//! evaluates the two lit color channels.
//!
//! Lit channels are numbered 0..4: color 0, color 1, alpha 0, alpha 1. Each per-channel field of
//! [`LightingUid`] is packed at that channel number (1 bit for the source selectors, 2 bits for the
//! functions, 8 bits for the light mask).

use std::fmt::{self, Write};

use bytemuck::{Pod, Zeroable};

use crate::components::VertexComponents;
use crate::constants::{I_LIGHTS, I_MATERIALS};
use crate::regs::{AttenuationFunc, DiffuseFunc, LitChannel, XfRegisters};
use crate::NUM_COLOR_CHANNELS;

/// Declaration of the per-light constant record.
pub const LIGHT_STRUCT: &str = "struct Light {\n\
\tint4 color;\n\
\tfloat4 cosatt;\n\
\tfloat4 distatt;\n\
\tfloat4 pos;\n\
\tfloat4 dir;\n\
};\n";

/// Scratch locals the lighting code writes to.
pub const LIGHTING_LOCALS: &str = "int4 lacc;\n\
float3 ldir, h, cosAttn, distAttn;\n\
float dist, dist2, attn;\n";

const NUM_LIT_CHANNELS: usize = 2 * NUM_COLOR_CHANNELS;
const NUM_LIGHTS: usize = 8;

#[repr(C)]
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Pod, Zeroable)]
pub struct LightingUid {
    pub mat_source: u8,
    pub enable_lighting: u8,
    pub amb_source: u8,
    pub diffuse_func: u8,
    pub attn_func: u8,
    pub _pad: [u8; 3],
    pub light_mask: u32,
}

impl LightingUid {
    /// Extracts the lighting configuration of both channels.
    ///
    /// Ambient source, functions and light mask are only recorded for channels with lighting
    /// enabled; they have no effect otherwise and stay zero.
    pub fn from_registers(xf: &XfRegisters) -> Self {
        let mut uid = Self::zeroed();
        for j in 0..NUM_COLOR_CHANNELS {
            uid.record(j, xf.color[j]);
            uid.record(j + NUM_COLOR_CHANNELS, xf.alpha[j]);
        }
        uid
    }

    fn record(&mut self, lit: usize, chan: LitChannel) {
        self.mat_source |= (chan.mat_source() as u8) << lit;
        self.enable_lighting |= (chan.enable_lighting() as u8) << lit;
        if !chan.enable_lighting() {
            return;
        }
        self.amb_source |= (chan.amb_source() as u8) << lit;
        self.diffuse_func |= (chan.diffuse_func().to_bits() as u8) << (2 * lit);
        self.attn_func |= (chan.attn_func().to_bits() as u8) << (2 * lit);
        self.light_mask |= chan.full_light_mask() << (8 * lit);
    }

    pub fn mat_from_vertex(&self, lit: usize) -> bool {
        self.mat_source & (1 << lit) != 0
    }

    pub fn lighting_enabled(&self, lit: usize) -> bool {
        self.enable_lighting & (1 << lit) != 0
    }

    pub fn amb_from_vertex(&self, lit: usize) -> bool {
        self.amb_source & (1 << lit) != 0
    }

    pub fn diffuse_func(&self, lit: usize) -> DiffuseFunc {
        DiffuseFunc::from_bits(u32::from(self.diffuse_func >> (2 * lit)))
    }

    pub fn attn_func(&self, lit: usize) -> AttenuationFunc {
        AttenuationFunc::from_bits(u32::from(self.attn_func >> (2 * lit)))
    }

    pub fn light_enabled(&self, lit: usize, light: usize) -> bool {
        self.light_mask & (1 << (light + 8 * lit)) != 0
    }
}

/// Emits the lighting computation for both color channels.
///
/// Vertex colors are read from `{in_color_name}0`/`{in_color_name}1`; results are written to
/// `{dest}0`/`{dest}1`. Expects `pos`, `_norm0` and [`LIGHTING_LOCALS`] in scope.
pub fn write_lighting_code<W: Write>(
    out: &mut W,
    uid: &LightingUid,
    components: VertexComponents,
    in_color_name: &str,
    dest: &str,
) -> fmt::Result {
    for j in 0..NUM_COLOR_CHANNELS {
        let alpha_lit = j + NUM_COLOR_CHANNELS;
        out.write_str("{\n")?;

        let color_mat_source = uid.mat_from_vertex(j);
        if color_mat_source {
            match vertex_color(components, in_color_name, j) {
                Some(color) => writeln!(out, "int4 mat = int4(round({color} * 255.0));")?,
                None => out.write_str("int4 mat = int4(255, 255, 255, 255);\n")?,
            }
        } else {
            writeln!(out, "int4 mat = {I_MATERIALS}[{}];", j + 2)?;
        }

        if uid.lighting_enabled(j) {
            if uid.amb_from_vertex(j) {
                // No vertex color to take the ambient from; white matches unlit output.
                match vertex_color(components, in_color_name, j) {
                    Some(color) => writeln!(out, "lacc = int4(round({color} * 255.0));")?,
                    None => out.write_str("lacc = int4(255, 255, 255, 255);\n")?,
                }
            } else {
                writeln!(out, "lacc = {I_MATERIALS}[{j}];")?;
            }
        } else {
            out.write_str("lacc = int4(255, 255, 255, 255);\n")?;
        }

        let alpha_mat_source = uid.mat_from_vertex(alpha_lit);
        if alpha_mat_source != color_mat_source {
            if alpha_mat_source {
                match vertex_color(components, in_color_name, j) {
                    Some(color) => writeln!(out, "mat.w = int(round({color}.w * 255.0));")?,
                    None => out.write_str("mat.w = 255;\n")?,
                }
            } else {
                writeln!(out, "mat.w = {I_MATERIALS}[{}].w;", j + 2)?;
            }
        }

        if uid.lighting_enabled(alpha_lit) {
            if uid.amb_from_vertex(alpha_lit) {
                match vertex_color(components, in_color_name, j) {
                    Some(color) => writeln!(out, "lacc.w = int(round({color}.w * 255.0));")?,
                    None => out.write_str("lacc.w = 255;\n")?,
                }
            } else {
                writeln!(out, "lacc.w = {I_MATERIALS}[{j}].w;")?;
            }
        } else {
            out.write_str("lacc.w = 255;\n")?;
        }

        if uid.lighting_enabled(j) {
            for light in 0..NUM_LIGHTS {
                if uid.light_enabled(j, light) {
                    write_light(out, uid, light, j, false)?;
                }
            }
        }
        if uid.lighting_enabled(alpha_lit) {
            for light in 0..NUM_LIGHTS {
                if uid.light_enabled(alpha_lit, light) {
                    write_light(out, uid, light, alpha_lit, true)?;
                }
            }
        }

        out.write_str("lacc = clamp(lacc, 0, 255);\n")?;
        writeln!(
            out,
            "{dest}{j} = float4((mat * (lacc + (lacc >> 7))) >> 8) / 255.0;"
        )?;
        out.write_str("}\n")?;
    }
    Ok(())
}

/// Vertex color feeding channel `j`: its own color if present, else color 0 if present.
fn vertex_color(components: VertexComponents, in_color_name: &str, j: usize) -> Option<String> {
    if components.contains(VertexComponents::color(j)) {
        Some(format!("{in_color_name}{j}"))
    } else if components.contains(VertexComponents::COL0) {
        Some(format!("{in_color_name}0"))
    } else {
        None
    }
}

fn write_light<W: Write>(
    out: &mut W,
    uid: &LightingUid,
    light: usize,
    lit: usize,
    alpha: bool,
) -> fmt::Result {
    debug_assert!(lit < NUM_LIT_CHANNELS);
    let swizzle = if alpha { "a" } else { "rgb" };
    let width = if alpha { "" } else { "3" };
    let diffuse = uid.diffuse_func(lit);
    let l = format!("{I_LIGHTS}[{light}]");

    match uid.attn_func(lit) {
        AttenuationFunc::None | AttenuationFunc::Dir => {
            writeln!(out, "ldir = normalize({l}.pos.xyz - pos.xyz);")?;
            out.write_str("attn = 1.0;\n")?;
            out.write_str("if (length(ldir) == 0.0)\n\t ldir = _norm0;\n")?;
        }
        AttenuationFunc::Spec => {
            writeln!(out, "ldir = normalize({l}.pos.xyz - pos.xyz);")?;
            writeln!(
                out,
                "attn = (dot(_norm0, ldir) >= 0.0) ? max(0.0, dot(_norm0, {l}.dir.xyz)) : 0.0;"
            )?;
            writeln!(out, "cosAttn = {l}.cosatt.xyz;")?;
            let normalize = if diffuse == DiffuseFunc::None {
                ""
            } else {
                "normalize"
            };
            writeln!(out, "distAttn = {normalize}({l}.distatt.xyz);")?;
            out.write_str(
                "attn = max(0.0, dot(cosAttn, float3(1.0, attn, attn*attn))) / dot(distAttn, float3(1.0, attn, attn*attn));\n",
            )?;
        }
        AttenuationFunc::Spot => {
            writeln!(out, "ldir = {l}.pos.xyz - pos.xyz;")?;
            out.write_str("dist2 = dot(ldir, ldir);\n")?;
            out.write_str("dist = sqrt(dist2);\n")?;
            out.write_str("ldir = ldir / dist;\n")?;
            writeln!(out, "attn = max(0.0, dot(ldir, {l}.dir.xyz));")?;
            // attn*attn may overflow
            writeln!(
                out,
                "attn = max(0.0, {l}.cosatt.x + {l}.cosatt.y*attn + {l}.cosatt.z*attn*attn) / dot({l}.distatt.xyz, float3(1.0,dist,dist2));"
            )?;
        }
    }

    match diffuse {
        DiffuseFunc::None => writeln!(
            out,
            "lacc.{swizzle} += int{width}(round(attn * float{width}({l}.color.{swizzle})));"
        )?,
        DiffuseFunc::Sign | DiffuseFunc::Clamp => {
            let open = if diffuse == DiffuseFunc::Sign {
                "("
            } else {
                "max(0.0,"
            };
            writeln!(
                out,
                "lacc.{swizzle} += int{width}(round(attn * {open}dot(ldir, _norm0)) * float{width}({l}.color.{swizzle})));"
            )?
        }
    }
    out.write_str("\n")
}
