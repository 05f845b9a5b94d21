//! Ties the diorama to a host: renderer binding, the per-frame loop and resize handling.

use std::f64::consts::TAU;
use std::time::{Duration, Instant};

use glam::Vec3;
use log::{debug, error, info, warn};

use crate::config::{AnimationClock, DioramaConfig};
use crate::controls::OrbitControls;
use crate::diorama::{Diorama, Spin};
use crate::host::{Host, HostEvent};
use crate::loader::TextureLoader;
use crate::pipeline::{Buffer, Renderer};
use crate::util::format_mat4;
use crate::FrameStats;

/// Turns an animation step count into node rotations.
///
/// The count is kept in `f64` and every angle is recomputed as `rate * steps`
/// from it, so nothing accumulates rounding error over a long run.
pub struct Animator {
    clock: AnimationClock,
    steps: f64,
    /// Rotation each spinning node had when the animator was created.
    spins: Vec<(Spin, Vec3)>,
}

impl Animator {
    pub fn new(clock: AnimationClock, diorama: &Diorama) -> Self {
        let spins = diorama
            .spins
            .iter()
            .map(|s| (*s, diorama.scene.get(s.node).transform.rot))
            .collect();
        Self {
            clock,
            steps: 0.0,
            spins,
        }
    }

    /// Advance by one displayed frame that took `dt`.
    pub fn advance(&mut self, dt: Duration) {
        self.steps += match self.clock {
            AnimationClock::PerFrame => 1.0,
            AnimationClock::Elapsed { reference_fps } => dt.as_secs_f64() * reference_fps as f64,
        };
    }

    pub fn steps(&self) -> f64 {
        self.steps
    }

    /// Unwrapped angle, radians, reached by something turning `rate` per step.
    pub fn angle(&self, rate: f32) -> f64 {
        rate as f64 * self.steps
    }

    /// Write the current rotation of every spinning node, wrapped into `[0, 2π)`.
    pub fn apply(&self, diorama: &mut Diorama) {
        for (spin, base) in &self.spins {
            let turn = |rate: f32, base: f32| {
                (base as f64 + self.angle(rate)).rem_euclid(TAU) as f32
            };
            diorama.scene.get_mut(spin.node).transform.rot = Vec3::new(
                turn(spin.rate.x, base.x),
                turn(spin.rate.y, base.y),
                turn(spin.rate.z, base.z),
            );
        }
    }
}

/// Everything the frame loop and the resize handler operate on.
pub struct SceneContext<B: Buffer> {
    pub diorama: Diorama,
    pub renderer: Renderer<B>,
    pub controls: OrbitControls,
    pub loader: TextureLoader,
    pub animator: Animator,
}

/// Create a renderer matching `host`, attach the orbit controller to the camera
/// and bring the camera's aspect in line with the host surface.
pub fn bind_viewport<H: Host>(
    host: &H,
    mut diorama: Diorama,
    loader: TextureLoader,
    config: &DioramaConfig,
) -> SceneContext<H::Target> {
    let (width, height) = host.size();
    let pixel_ratio = host.pixel_ratio();
    let renderer = Renderer::new(width, height, pixel_ratio, config.renderer.background);
    info!(
        "Attached renderer to '{}': {}x{} at pixel ratio {}",
        host.title(),
        width,
        height,
        pixel_ratio
    );

    let controls = OrbitControls::attach(&mut diorama.camera, &config.orbit);
    let animator = Animator::new(config.clock, &diorama);

    let mut ctx = SceneContext {
        diorama,
        renderer,
        controls,
        loader,
        animator,
    };
    handle_resize(&mut ctx, width, height, pixel_ratio);
    ctx
}

/// Keep renderer and camera in step with the host surface. Calling it again
/// with the same values changes nothing.
pub fn handle_resize<B: Buffer>(
    ctx: &mut SceneContext<B>,
    width: usize,
    height: usize,
    pixel_ratio: f32,
) {
    if width == 0 || height == 0 {
        debug!("Ignoring resize to an empty surface ({}x{})", width, height);
        return;
    }

    ctx.renderer.set_pixel_ratio(pixel_ratio);
    ctx.renderer.set_size(width, height);

    let camera = &mut ctx.diorama.camera;
    camera.set_aspect(width as f32 / height as f32);
    camera.update_projection_matrix();

    debug!(
        "Viewport {}x{}, aspect {:.4}\n{}",
        width,
        height,
        camera.aspect,
        format_mat4("Projection", &camera.projection_matrix())
    );
}

/// Owns the host and the scene context and drives them one frame at a time.
pub struct FrameLoop<H: Host> {
    host: H,
    ctx: SceneContext<H::Target>,
    stats: FrameStats,
    frames: u64,
    last_tick: Instant,
}

impl<H: Host> FrameLoop<H> {
    pub fn new(host: H, ctx: SceneContext<H::Target>) -> Self {
        Self {
            host,
            ctx,
            stats: FrameStats::new(),
            frames: 0,
            last_tick: Instant::now(),
        }
    }

    pub fn context(&self) -> &SceneContext<H::Target> {
        &self.ctx
    }

    pub fn host(&self) -> &H {
        &self.host
    }

    pub fn frames(&self) -> u64 {
        self.frames
    }

    /// Run until the host closes.
    pub fn run(&mut self) {
        info!("Entering frame loop");
        while self.host.is_open() && self.tick() {}
        info!("Frame loop stopped after {} frames", self.frames);
    }

    /// One frame. Returns false once the host asked to close.
    pub fn tick(&mut self) -> bool {
        let now = Instant::now();
        let dt = now - self.last_tick;
        self.last_tick = now;

        if !self.drain_events() {
            return false;
        }

        self.ctx.loader.poll();

        self.ctx.animator.advance(dt);
        self.ctx.animator.apply(&mut self.ctx.diorama);

        let ctx = &mut self.ctx;
        ctx.renderer.render(&ctx.diorama.scene, &ctx.diorama.camera);
        if let Err(e) = self.host.present(ctx.renderer.front_buffer()) {
            error!("Failed to present frame {}: {}", self.frames, e);
        }

        self.frames += 1;
        if self.stats.update(dt) {
            debug!("{} | {:?}", self.stats, self.ctx.renderer.stats());
        }
        true
    }

    fn drain_events(&mut self) -> bool {
        let events = match self.host.poll_events() {
            Ok(events) => events,
            Err(e) => {
                warn!("Failed to read host events: {}", e);
                Vec::new()
            }
        };

        for event in events {
            match event {
                HostEvent::Close => {
                    info!("Host closed");
                    return false;
                }
                HostEvent::Resize {
                    width,
                    height,
                    pixel_ratio,
                } => handle_resize(&mut self.ctx, width, height, pixel_ratio),
                HostEvent::Drag { dx, dy } => {
                    let (_, height) = self.ctx.renderer.size();
                    self.ctx.controls.drag(dx, dy, height as f32);
                }
                HostEvent::Zoom(steps) => self.ctx.controls.zoom(steps),
            }
        }
        self.ctx.controls.update(&mut self.ctx.diorama.camera);
        true
    }
}

/// Bind `diorama` to `host` and run it until the host closes.
pub fn run<H: Host>(host: H, diorama: Diorama, loader: TextureLoader, config: &DioramaConfig) {
    let ctx = bind_viewport(&host, diorama, loader, config);
    FrameLoop::new(host, ctx).run();
}
