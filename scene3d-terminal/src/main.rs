/// Scene3D terminal viewer
///
/// Loads one or more OBJ-style meshes (a cube when none are given) and
/// renders them as shaded ASCII. The camera, the light and every mesh can
/// be selected with Tab and moved with the keyboard.
use std::fs::File;
use std::path::PathBuf;
use std::sync::Mutex;

use anyhow::Context;
use clap::{Parser, ValueEnum};
use nalgebra::Point3;
use scene3d_core::{
    load_mesh, CameraKind, EngineConfig, Mesh, MeshInstance, OrthoProjection, Pose, RenderPath,
    Scene,
};
use scene3d_terminal::{TerminalApp, CELL_ASPECT};
use tracing_subscriber::EnvFilter;

/// Horizontal gap between consecutive meshes
const MESH_SPACING: f32 = 3.0;

#[derive(Clone, Copy, Debug, ValueEnum)]
enum CameraArg {
    /// Yaw/pitch driven camera, the look point stays fixed
    Angle,
    /// Camera that moves along its own view axes
    LookAt,
}

impl From<CameraArg> for CameraKind {
    fn from(arg: CameraArg) -> Self {
        match arg {
            CameraArg::Angle => CameraKind::AngleDriven,
            CameraArg::LookAt => CameraKind::LookAt,
        }
    }
}

#[derive(Clone, Copy, Debug, ValueEnum)]
enum RenderPathArg {
    Auto,
    Depth,
    Painter,
}

impl From<RenderPathArg> for RenderPath {
    fn from(arg: RenderPathArg) -> Self {
        match arg {
            RenderPathArg::Auto => RenderPath::Auto,
            RenderPathArg::Depth => RenderPath::DepthBuffer,
            RenderPathArg::Painter => RenderPath::Painter,
        }
    }
}

#[derive(Parser)]
#[command(name = "scene3d-terminal", about = "Interactive ASCII viewer for triangle meshes")]
struct Cli {
    /// Mesh files to load (v/f text format)
    meshes: Vec<PathBuf>,

    /// Camera behaviour
    #[arg(long, value_enum, default_value = "look-at")]
    camera: CameraArg,

    /// Visibility strategy
    #[arg(long, value_enum, default_value = "auto")]
    render_path: RenderPathArg,

    /// Movement per frame while a key is held
    #[arg(long, default_value = "0.05")]
    linear_step: f32,

    /// Rotation per frame while a key is held, in degrees
    #[arg(long, default_value = "2.0")]
    angular_step: f32,

    /// Cells per world unit for the painter path (defaults to a sixth of the width)
    #[arg(long)]
    scale: Option<f32>,

    /// Light position as x,y,z
    #[arg(long, value_delimiter = ',', num_args = 3, allow_negative_numbers = true)]
    light: Option<Vec<f32>>,

    /// Target frame rate
    #[arg(long, default_value = "30")]
    fps: u32,

    /// Enable verbose logging
    #[arg(short, long)]
    verbose: bool,

    /// Write logs to this file; otherwise only warnings reach stderr
    #[arg(long)]
    log_file: Option<PathBuf>,
}

fn init_logging(cli: &Cli) -> anyhow::Result<()> {
    match &cli.log_file {
        Some(path) => {
            let file = File::create(path)
                .with_context(|| format!("failed to create log file {}", path.display()))?;
            let level = if cli.verbose { "debug" } else { "info" };
            let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level));
            tracing_subscriber::fmt()
                .with_env_filter(filter)
                .with_writer(Mutex::new(file))
                .with_ansi(false)
                .init();
        }
        // stderr shares the terminal with the frame, keep it quiet
        None => {
            tracing_subscriber::fmt()
                .with_env_filter(EnvFilter::new("warn"))
                .with_writer(std::io::stderr)
                .init();
        }
    }
    Ok(())
}

fn load_meshes(paths: &[PathBuf]) -> anyhow::Result<Vec<(String, Mesh)>> {
    if paths.is_empty() {
        return Ok(vec![("cube".to_string(), Mesh::cube(2.0))]);
    }
    paths
        .iter()
        .map(|path| {
            let mesh = load_mesh(path)
                .with_context(|| format!("failed to load mesh {}", path.display()))?;
            let name = path
                .file_stem()
                .map(|stem| stem.to_string_lossy().into_owned())
                .unwrap_or_else(|| path.display().to_string());
            Ok((name, mesh))
        })
        .collect()
}

fn build_config(cli: &Cli) -> anyhow::Result<EngineConfig> {
    let mut config = EngineConfig {
        camera: cli.camera.into(),
        render_path: cli.render_path.into(),
        linear_step: cli.linear_step,
        angular_step: cli.angular_step.to_radians(),
        ..EngineConfig::default()
    };

    if let Some(light) = &cli.light {
        let [x, y, z] = light[..] else {
            anyhow::bail!("--light expects three comma separated values");
        };
        config.light_position = Point3::new(x, y, z);
    }

    let scale = match cli.scale {
        Some(scale) => scale,
        None => {
            let (columns, _) = crossterm::terminal::size().context("failed to query terminal size")?;
            f32::from(columns) / 6.0
        }
    };
    config.ortho = OrthoProjection {
        scale,
        pixel_aspect: CELL_ASPECT,
    };

    Ok(config)
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    init_logging(&cli)?;

    let config = build_config(&cli)?;
    let meshes = load_meshes(&cli.meshes)?;

    // Lay the meshes out in a row centred on the origin
    let offset = (meshes.len() as f32 - 1.0) * MESH_SPACING / 2.0;
    let mut scene = Scene::from_config(&config);
    for (i, (name, mesh)) in meshes.into_iter().enumerate() {
        if let Some((min, max)) = mesh.bounds() {
            tracing::info!(
                mesh = %name,
                faces = mesh.face_count(),
                min = ?min,
                max = ?max,
                "mesh bounds"
            );
        }
        let pose = Pose::at(i as f32 * MESH_SPACING - offset, 0.0, 0.0);
        scene = scene.with_mesh(MeshInstance::new(name, mesh, pose));
    }

    let mut app = TerminalApp::new(scene, config, cli.fps);
    app.run().context("terminal session failed")?;

    let scene = app.scene();
    for index in 0..scene.entity_count() {
        if let (Some(name), Some(entity)) = (scene.entity_name(index), scene.entity(index)) {
            tracing::info!(entity = %name, position = ?entity.pose().position, "final position");
        }
    }
    Ok(())
}
