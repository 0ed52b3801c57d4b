#![forbid(unsafe_code)]

// Native-only tool; keep a stub so `--target wasm32-unknown-unknown --workspace` still builds.
#[cfg(target_arch = "wasm32")]
fn main() {}

#[cfg(not(target_arch = "wasm32"))]
mod native {
    use std::path::PathBuf;

    use anyhow::{Context, Result};
    use clap::{Parser, ValueEnum};
    use flipper_vsgen::ApiType;
    use flipper_vsgen_cli::{render, ConfigOverrides, DrawState};

    #[derive(Debug, Clone, Copy, ValueEnum)]
    enum Api {
        /// GLSL-style source.
        Opengl,
        /// HLSL-style source.
        D3d,
    }

    impl From<Api> for ApiType {
        fn from(api: Api) -> Self {
            match api {
                Api::Opengl => ApiType::OpenGl,
                Api::D3d => ApiType::D3D,
            }
        }
    }

    #[derive(Debug, Parser)]
    #[command(
        name = "flipper-vsgen",
        about = "Build the vertex shader descriptor for a captured draw state and print its shader"
    )]
    pub struct Args {
        /// Draw state JSON (`{ "config": ..., "registers": ..., "components": ... }`).
        draw_state: PathBuf,

        /// Shading dialect to generate, overriding the captured backend.
        #[arg(long, value_enum)]
        api: Option<Api>,

        /// Per-pixel lighting, overriding the captured config. A bare flag means `true`.
        #[arg(long, value_name = "BOOL", num_args = 0..=1, default_missing_value = "true")]
        pixel_lighting: Option<bool>,

        /// Multisample count, overriding the captured config.
        #[arg(long)]
        msaa: Option<u32>,

        /// Print only the descriptor, not the generated source.
        #[arg(long)]
        uid: bool,

        /// Write to this file instead of stdout.
        #[arg(long, short)]
        output: Option<PathBuf>,
    }

    pub fn main() -> Result<()> {
        tracing_subscriber::fmt()
            .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
            .with_writer(std::io::stderr)
            .init();

        let args = Args::parse();

        let text = std::fs::read_to_string(&args.draw_state)
            .with_context(|| format!("failed to read draw state: {}", args.draw_state.display()))?;
        let mut state = DrawState::from_json(&text)
            .with_context(|| format!("failed to load draw state: {}", args.draw_state.display()))?;

        ConfigOverrides {
            api: args.api.map(ApiType::from),
            pixel_lighting: args.pixel_lighting,
            multisamples: args.msaa,
        }
        .apply(&mut state.config)
        .context("invalid config override")?;

        tracing::debug!(
            api = ?state.config.backend.api_type,
            components = state.components,
            "loaded draw state"
        );

        let rendered = render(&state, args.uid);
        match &args.output {
            Some(path) => std::fs::write(path, rendered)
                .with_context(|| format!("failed to write output: {}", path.display()))?,
            None => print!("{rendered}"),
        }
        Ok(())
    }
}

#[cfg(not(target_arch = "wasm32"))]
fn main() -> anyhow::Result<()> {
    native::main()
}
