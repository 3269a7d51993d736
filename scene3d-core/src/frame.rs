/// Per-frame driver: input, integration, view and rendering
use std::io;

use nalgebra::Vector3;

use crate::host::WindowHost;
use crate::input::InputState;
use crate::render::{GraphicsBackend, Renderer};
use crate::scene::Scene;

/// Aim the input velocity at the target entity, zero it for every other
/// entity, then integrate one step for all of them.
pub fn update(input: &InputState, scene: &mut Scene) {
    let target = input.target();
    for (index, entity) in scene.entities_mut().enumerate() {
        if index == target {
            entity
                .pose_mut()
                .set_velocity(input.linear_velocity(), input.angular_velocity());
        } else {
            entity
                .pose_mut()
                .set_velocity(Vector3::zeros(), Vector3::zeros());
        }
        entity.step();
    }
}

/// Run frames until the host is asked to close
pub fn run<H, B>(
    host: &mut H,
    backend: &mut B,
    renderer: &Renderer,
    scene: &mut Scene,
    input: &mut InputState,
) -> io::Result<()>
where
    H: WindowHost + ?Sized,
    B: GraphicsBackend + ?Sized,
{
    let taps_only = !host.reports_key_release();
    if taps_only {
        tracing::info!("host does not report key releases, keys act as one-frame taps");
    }

    tracing::info!(
        entities = scene.entity_count(),
        path = ?renderer.active_path(backend),
        "starting frame loop"
    );

    let mut frames = 0u64;
    while !host.should_close() {
        run_frame(host, backend, renderer, scene, input)?;
        if taps_only {
            input.release_all_taps();
        }
        frames += 1;
    }

    tracing::info!(frames, "frame loop finished");
    Ok(())
}

fn run_frame<H, B>(
    host: &mut H,
    backend: &mut B,
    renderer: &Renderer,
    scene: &mut Scene,
    input: &mut InputState,
) -> io::Result<()>
where
    H: WindowHost + ?Sized,
    B: GraphicsBackend + ?Sized,
{
    for event in host.poll_events()? {
        input.handle(event);
    }
    if input.close_requested() {
        host.set_should_close(true);
        return Ok(());
    }

    update(input, scene);

    let (width, height) = host.size();
    if backend.viewport() != (width, height) {
        tracing::debug!(width, height, "resizing viewport");
        backend.resize(width, height);
    }

    let title = scene
        .entity_name(input.target())
        .unwrap_or_else(|| "none".to_string());
    host.set_title(&format!("target: {title}"));

    tracing::trace!(target_entity = input.target(), "rendering frame");
    renderer.render(scene, backend)?;
    host.present()
}
