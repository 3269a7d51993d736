/// Scene3D Core Library - Interactive 3D scene engine
///
/// This library provides the host-independent core: mesh loading, poses and
/// cameras, keyboard-to-velocity mapping and a renderer with depth-buffered
/// and painter's-algorithm paths over an abstract graphics backend.

pub mod camera;
pub mod config;
pub mod error;
pub mod frame;
pub mod geometry;
pub mod host;
pub mod input;
pub mod obj;
pub mod projection;
pub mod render;
pub mod scene;
pub mod transform;

// Re-export commonly used types
pub use camera::{Camera, CameraKind, CameraStrategy};
pub use config::{EngineConfig, RenderPath};
pub use error::MeshError;
pub use geometry::{Face, Mesh, Polygon};
pub use host::WindowHost;
pub use input::{InputState, Key, KeyAction, KeyEvent, Modifiers};
pub use obj::{load_mesh, parse_mesh};
pub use projection::{OrthoProjection, Perspective};
pub use render::{GraphicsBackend, Renderer};
pub use scene::{MeshInstance, PointLight, Scene};
pub use transform::{Pose, Transform, Transformable};
