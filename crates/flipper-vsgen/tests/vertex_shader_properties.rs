use flipper_vsgen::regs::{
    AttenuationFunc, DiffuseFunc, LitChannel, PostMtxInfo, SourceRow, TexGenType, TexInputForm,
    TexMtxInfo, TexProjection,
};
use flipper_vsgen::uid::{PostMtxUid, TexMtxUid};
use flipper_vsgen::{
    generate_vertex_shader_code, get_vertex_shader_uid, ApiType, BackendInfo, GpuRegisters,
    VertexComponents, VertexShaderUid, VideoConfig, MAX_TEX_GENS,
};
use pretty_assertions::assert_eq;

const BODY_START: &str = "VS_OUTPUT o;\n";
const BODY_END: &str = "o.pos.xy = o.pos.xy - o.pos.w * cpixelcenter.xy;\n";

fn backend(api_type: ApiType) -> BackendInfo {
    BackendInfo {
        api_type,
        ..BackendInfo::default()
    }
}

/// A busy draw: every generator type, indexed matrices, lighting on both channels.
fn busy_state() -> (GpuRegisters, VertexComponents) {
    let mut regs = GpuRegisters::default();
    regs.set_counts(6, 2);
    regs.xf.dual_tex_trans_enabled = true;
    regs.xf.color[0] = LitChannel::default()
        .with_enable_lighting(true)
        .with_light_mask(0b0000_0011)
        .with_diffuse_func(DiffuseFunc::Clamp)
        .with_attn_func(AttenuationFunc::Spot);
    regs.xf.alpha[1] = LitChannel::default()
        .with_enable_lighting(true)
        .with_mat_source(true)
        .with_light_mask(0b1000_0000)
        .with_attn_func(AttenuationFunc::Spec);

    let regular = TexMtxInfo::default().with_tex_gen_type(TexGenType::Regular);
    regs.xf.tex_mtx_info[0] = regular
        .with_source_row(SourceRow::Tex(0))
        .with_projection(TexProjection::Stq)
        .with_input_form(TexInputForm::Abc1);
    regs.xf.tex_mtx_info[1] = regular.with_source_row(SourceRow::Normal);
    regs.xf.tex_mtx_info[2] = TexMtxInfo::default()
        .with_tex_gen_type(TexGenType::EmbossMap)
        .with_source_row(SourceRow::Tex(2))
        .with_emboss_source_shift(0)
        .with_emboss_light_shift(1);
    regs.xf.tex_mtx_info[3] = TexMtxInfo::default()
        .with_tex_gen_type(TexGenType::ColorStrgbc0)
        .with_source_row(SourceRow::Colors);
    regs.xf.tex_mtx_info[4] = regular.with_source_row(SourceRow::BinormalT);
    regs.xf.tex_mtx_info[5] = regular.with_source_row(SourceRow::Tex(5));
    regs.xf.post_mtx_info[0] = PostMtxInfo::default().with_index(10);
    regs.xf.post_mtx_info[5] = PostMtxInfo::default().with_index(63).with_normalize(true);

    let components = VertexComponents::POSMTXIDX
        | VertexComponents::NRM0
        | VertexComponents::NRM1
        | VertexComponents::NRM2
        | VertexComponents::COL0
        | VertexComponents::UV0
        | VertexComponents::TEXMTXIDX0
        | VertexComponents::UV5;
    (regs, components)
}

fn busy_uid() -> VertexShaderUid {
    let (regs, components) = busy_state();
    get_vertex_shader_uid(&regs, components, &VideoConfig::default())
}

fn body(src: &str) -> &str {
    let start = src.find(BODY_START).expect("body start");
    let end = src.find(BODY_END).expect("body end") + BODY_END.len();
    &src[start..end]
}

#[test]
fn generation_is_deterministic() {
    let uid = busy_uid();
    for api in [ApiType::OpenGl, ApiType::D3D] {
        let a = generate_vertex_shader_code(&backend(api), &uid);
        let b = generate_vertex_shader_code(&backend(api), &uid);
        assert_eq!(a, b);
    }

    let (regs, components) = busy_state();
    let again = get_vertex_shader_uid(&regs, components, &VideoConfig::default());
    assert_eq!(again.as_bytes(), uid.as_bytes());
}

#[test]
fn unobservable_state_does_not_change_the_descriptor() {
    let (regs, components) = busy_state();
    let base = get_vertex_shader_uid(&regs, components, &VideoConfig::default());

    let mut noisy = regs;
    // Inactive generator slots.
    for i in 6..MAX_TEX_GENS {
        noisy.xf.tex_mtx_info[i] = TexMtxInfo(0xdead_beef);
        noisy.xf.post_mtx_info[i] = PostMtxInfo(0x1ff);
    }
    // Post info of generators that are not regular.
    noisy.xf.post_mtx_info[2] = PostMtxInfo(0x13f);
    noisy.xf.post_mtx_info[3] = PostMtxInfo(0x101);
    // Projection bit of a color generator.
    noisy.xf.tex_mtx_info[3] = noisy.xf.tex_mtx_info[3].with_projection(TexProjection::Stq);
    // Attenuation/diffuse of a channel with lighting disabled.
    noisy.xf.alpha[0] = LitChannel::default()
        .with_light_mask(0xff)
        .with_diffuse_func(DiffuseFunc::Sign)
        .with_attn_func(AttenuationFunc::Dir);

    let noisy_uid = get_vertex_shader_uid(&noisy, components, &VideoConfig::default());
    assert_eq!(noisy_uid, base);
    assert_eq!(noisy_uid.uid_hash(), base.uid_hash());
}

#[test]
fn observable_state_changes_the_descriptor() {
    let (regs, components) = busy_state();
    let base = get_vertex_shader_uid(&regs, components, &VideoConfig::default());

    let mut projection = regs;
    projection.xf.tex_mtx_info[1] = projection.xf.tex_mtx_info[1].with_projection(TexProjection::Stq);

    let mut post = regs;
    post.xf.post_mtx_info[0] = PostMtxInfo::default().with_index(11);

    let mut light = regs;
    light.xf.color[0] = light.xf.color[0].with_light_mask(0b0000_0111);

    for changed in [projection, post, light] {
        let uid = get_vertex_shader_uid(&changed, components, &VideoConfig::default());
        assert_ne!(uid, base);
        assert_ne!(uid.uid_hash(), base.uid_hash());
    }

    let fewer = get_vertex_shader_uid(
        &regs,
        components - VertexComponents::NRM2,
        &VideoConfig::default(),
    );
    assert_ne!(fewer, base);

    let pixel_lit = get_vertex_shader_uid(
        &regs,
        components,
        &VideoConfig {
            enable_pixel_lighting: true,
            ..VideoConfig::default()
        },
    );
    assert_ne!(pixel_lit, base);
}

#[test]
fn unpopulated_fields_are_zero() {
    let uid = busy_uid();
    for i in uid.num_tex_gens()..MAX_TEX_GENS {
        assert_eq!(uid.tex_mtx_info[i], TexMtxUid::default());
        assert_eq!(uid.post_mtx_info[i], PostMtxUid::default());
    }
    // Color generator: no shifts, no post info, no projection bit.
    assert_eq!(uid.tex_mtx_info[3].emboss_light_shift, 0);
    assert_eq!(uid.tex_mtx_info[3].emboss_source_shift, 0);
    assert_eq!(uid.post_mtx_info[3], PostMtxUid::default());
    assert_eq!(uid.tex_mtx_projection & (1 << 3), 0);
    // Emboss generator has no post info either.
    assert_eq!(uid.post_mtx_info[2], PostMtxUid::default());
    assert_eq!(uid._pad, 0);
}

#[test]
fn one_block_per_generator() {
    for n in 0..=MAX_TEX_GENS as u32 {
        let mut regs = GpuRegisters::default();
        regs.set_counts(n, 0);
        for i in 0..n as usize {
            regs.xf.tex_mtx_info[i] = TexMtxInfo::default().with_source_row(SourceRow::Tex(i as u8));
        }
        let uid = get_vertex_shader_uid(&regs, VertexComponents::UV_ALL, &VideoConfig::default());

        for api in [ApiType::OpenGl, ApiType::D3D] {
            let src = generate_vertex_shader_code(&backend(api), &uid);
            assert_eq!(
                src.matches("{\ncoord = float4(0.0, 0.0, 1.0, 1.0);\n").count(),
                n as usize,
                "{api:?} with {n} texgens:\n{src}"
            );
        }
    }
}

#[test]
fn color_reads_follow_channel_count() {
    let components = VertexComponents::COL0 | VertexComponents::COL1;
    let fallbacks = ["o.colors_0 = color0;\n", "o.colors_1 = color1;\n"];
    for (chans, expected) in [(0, [true, true]), (1, [false, true]), (2, [false, false])] {
        let mut regs = GpuRegisters::default();
        regs.set_counts(0, chans);
        let uid = get_vertex_shader_uid(&regs, components, &VideoConfig::default());
        let src = generate_vertex_shader_code(&BackendInfo::default(), &uid);
        for (line, expected) in fallbacks.iter().zip(expected) {
            assert_eq!(src.contains(line), expected, "{chans} channels, {line:?}:\n{src}");
        }
    }
}

#[test]
fn dialects_share_the_vertex_body() {
    let uid = busy_uid();
    let glsl = generate_vertex_shader_code(&backend(ApiType::OpenGl), &uid);
    let hlsl = generate_vertex_shader_code(&backend(ApiType::D3D), &uid);
    assert_eq!(body(&glsl), body(&hlsl));

    assert!(glsl.contains("in int posmtx; // ATTR1,\n"));
    assert!(glsl.contains("in float3 tex0; // ATTR8,\n"));
    assert!(glsl.contains("in float2 tex5; // ATTR13,\n"));
    assert!(hlsl.contains("  float3 tex0 : TEXCOORD0,\n"));
    assert!(hlsl.contains("  int posmtx : BLENDINDICES,\n"));
    assert!(hlsl.ends_with("return o;\n}\n"));
}

#[test]
fn depth_convention_follows_clip_control() {
    let uid = busy_uid();
    let with = generate_vertex_shader_code(
        &BackendInfo {
            supports_clip_control: true,
            ..BackendInfo::default()
        },
        &uid,
    );
    assert!(with.contains("o.pos.z = -o.pos.z;\n"));
    assert!(!with.contains("o.pos.z * -2.0"));

    let without = generate_vertex_shader_code(&BackendInfo::default(), &uid);
    assert!(without.contains("o.pos.z = o.pos.z * -2.0 - o.pos.w;\n"));
    assert!(!without.contains("o.pos.z = -o.pos.z;"));
}

#[test]
fn interface_block_follows_geometry_shader_support() {
    let uid = get_vertex_shader_uid(
        &busy_state().0,
        busy_state().1,
        &VideoConfig {
            multisamples: 4,
            enable_pixel_lighting: true,
            ..VideoConfig::default()
        },
    );

    let block = generate_vertex_shader_code(&BackendInfo::default(), &uid);
    assert!(block.contains("out VertexData {\n\tcentroid float4 pos;\n"), "{block}");
    assert!(block.contains("} vs;\n"));
    assert!(block.contains("\tvs.WorldPos = o.WorldPos;\n"));
    assert!(block.contains("\tvs.tex5 = o.tex5;\n"));
    assert!(!block.contains("uv0"));

    let flat = generate_vertex_shader_code(
        &BackendInfo {
            supports_geometry_shaders: false,
            ..BackendInfo::default()
        },
        &uid,
    );
    assert!(!flat.contains("VertexData"));
    assert!(flat.contains("centroid out float3 uv5;\n"), "{flat}");
    assert!(flat.contains("centroid out float3 WorldPos;\n"));
    assert!(flat.contains("uv5.xyz = o.tex5;\n"));
    assert!(flat.contains("WorldPos = o.WorldPos;\n"));
    assert!(flat.ends_with("gl_Position = o.pos;\n}\n"));
}

#[test]
fn uniform_block_binding_follows_backend() {
    let uid = VertexShaderUid::default();
    let bound = generate_vertex_shader_code(
        &BackendInfo {
            supports_binding_layout: true,
            ..BackendInfo::default()
        },
        &uid,
    );
    assert!(bound.contains("layout(std140, binding = 2) uniform VSBlock {\n"));

    let unbound = generate_vertex_shader_code(&BackendInfo::default(), &uid);
    assert!(unbound.contains("layout(std140) uniform VSBlock {\n"));

    let hlsl = generate_vertex_shader_code(&backend(ApiType::D3D), &uid);
    assert!(hlsl.contains("cbuffer VSBlock {\n"));
    assert!(hlsl.contains("VS_OUTPUT main(\n  float4 rawpos : POSITION) {\n"));
}
