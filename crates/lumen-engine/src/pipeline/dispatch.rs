use std::sync::Arc;

use crate::backend::{Device, FrameTargets, RenderBackend, SceneBackend};
use crate::core::{EventQueue, LoopEvent};
use crate::error::FrameError;
use crate::frame::{FrameResourceEvent, FrameResources};
use crate::scene::{MaterialId, Scene, SceneUpdate, TextureGenerator};
use crate::streaming::AsyncContext;
use crate::time::{CadenceTick, CadenceTimer};

use super::Stage;

/// Material slot refreshed on every cadence tick.
pub struct CadenceBinding {
    pub material: MaterialId,
    pub slot: String,
    /// Cache key passed along with the image.
    pub key: String,
    pub generator: Box<dyn TextureGenerator>,
}

/// Borrowed bindings for one frame.
pub struct Backends<'a, D, S, R> {
    pub device: &'a D,
    pub scene: &'a mut S,
    pub render: &'a mut R,
}

#[derive(Debug, Copy, Clone, PartialEq)]
pub struct FrameInput {
    /// Clock reading for this frame, seconds.
    pub time: f64,
    /// Window drawable size in physical pixels.
    pub window_size: (u32, u32),
}

/// What a successful frame did.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct FrameOutcome {
    pub frame_index: u64,
    pub resources: Option<FrameResourceEvent>,
    pub cadence: Option<CadenceTick>,
    pub scene: SceneUpdate,
    pub committed_materials: usize,
}

/// Fixed-order per-frame dispatch.
///
/// Owns the frame resource set and the cadence timer; everything else is
/// borrowed for the duration of `run_frame`.
pub struct DispatchPipeline<T> {
    frame: FrameResources<T>,
    cadence: CadenceTimer,
    cadence_binding: Option<CadenceBinding>,
    texture_frame: u32,
    frames: u64,
}

impl<T> DispatchPipeline<T> {
    pub fn new(cadence: CadenceTimer) -> Self {
        Self {
            frame: FrameResources::new(),
            cadence,
            cadence_binding: None,
            texture_frame: 0,
            frames: 0,
        }
    }

    pub fn with_cadence_binding(mut self, binding: CadenceBinding) -> Self {
        self.cadence_binding = Some(binding);
        self
    }

    pub fn set_cadence_binding(&mut self, binding: Option<CadenceBinding>) {
        self.cadence_binding = binding;
    }

    pub fn cadence(&self) -> &CadenceTimer {
        &self.cadence
    }

    /// Number of cadence textures generated so far.
    pub fn texture_frame(&self) -> u32 {
        self.texture_frame
    }

    pub fn frames(&self) -> u64 {
        self.frames
    }

    pub fn resources(&self) -> &FrameResources<T> {
        &self.frame
    }

    pub fn targets(&self) -> Option<&T> {
        self.frame.targets()
    }

    /// Releases the frame targets; used at shutdown.
    pub fn release_targets(&mut self) -> Option<T> {
        self.frame.release()
    }

    /// Runs one frame. Any error aborts the rest of the frame.
    pub fn run_frame<D, S, R>(
        &mut self,
        backends: Backends<'_, D, S, R>,
        scene: &mut Scene,
        async_ctx: &mut AsyncContext,
        input: FrameInput,
        events: &mut EventQueue,
    ) -> Result<FrameOutcome, FrameError>
    where
        D: Device,
        S: SceneBackend<D>,
        R: RenderBackend<D, Targets = T>,
        T: FrameTargets<D>,
    {
        let Backends {
            device,
            scene: scene_backend,
            render,
        } = backends;
        let mut outcome = FrameOutcome {
            frame_index: self.frames,
            ..FrameOutcome::default()
        };

        // 1. renderer bookkeeping
        Stage::ManagerUpdate.enter();
        render.update();

        // 2. frame resources follow the window size
        Stage::Resize.enter();
        let (width, height) = input.window_size;
        outcome.resources = self
            .frame
            .ensure(input.window_size, |w, h| render.create_targets(device, w, h))
            .map_err(FrameError::at(Stage::Resize))?;
        match outcome.resources {
            Some(FrameResourceEvent::Created { .. }) => {
                log::info!("frame created {}x{}", width, height);
            }
            Some(FrameResourceEvent::Resized { .. }) => {
                log::info!("frame resized {}x{}", width, height);
                events.push(LoopEvent::FrameResized { width, height });
            }
            None => {}
        }

        // 3. cadence-driven texture
        Stage::Cadence.enter();
        outcome.cadence = self.cadence.poll(input.time);
        if outcome.cadence.is_some() {
            let behind = self.cadence.backlog(input.time);
            if behind > 0 {
                log::debug!("cadence {} step(s) behind", behind);
            }
            self.refresh_cadence_texture(scene);
        }

        // 4. motions, propagation, spatial structures
        Stage::Animate.enter();
        outcome.scene = scene.update(input.time);

        // 5. scene time and GPU-side creation
        Stage::SceneCommit.enter();
        scene.set_time(input.time);
        let dirty = scene.materials.commit();
        outcome.committed_materials = dirty.len();
        scene_backend
            .commit_scene(device, scene, &dirty, async_ctx)
            .map_err(FrameError::at(Stage::SceneCommit))?;

        // 6. manager commit
        Stage::ManagerCommit.enter();
        scene_backend
            .update(device, async_ctx)
            .map_err(FrameError::at(Stage::ManagerCommit))?;

        let Some(targets) = self.frame.targets_mut() else {
            return Err(FrameError::Rejected { stage: Stage::Resize });
        };

        // 7. scene -> spatial/object -> renderer compute
        let mut compute = device.create_compute();
        Stage::SceneCompute.enter();
        scene_backend.dispatch(device, &mut compute, scene);
        Stage::SpatialCompute.enter();
        render.dispatch_spatial(&mut compute, targets, scene);
        Stage::ObjectCompute.enter();
        render.dispatch_objects(&mut compute, targets, scene);
        Stage::RendererCompute.enter();
        render.dispatch_renderer(&mut compute, targets, scene);
        device.submit_compute(compute);

        // 8. uploads in dependency order
        Stage::FlushScene.enter();
        scene_backend.flush(device);
        Stage::FlushRenderer.enter();
        render.flush(device);
        Stage::FlushFrame.enter();
        targets.flush(device);

        // 9. geometry
        Stage::DeferredDraw.enter();
        render.draw_deferred(device, targets);

        // 10. light -> occluder -> luminance -> composite
        let mut compute = device.create_compute();
        Stage::LightCompute.enter();
        render.dispatch_light(device, &mut compute, targets);
        Stage::OccluderCompute.enter();
        render.dispatch_occluder(device, &mut compute, targets);
        Stage::LuminanceCompute.enter();
        render.dispatch_luminance(device, &mut compute, targets);
        Stage::CompositeCompute.enter();
        render.dispatch_composite(device, &mut compute, targets);
        device.submit_compute(compute);

        self.frames += 1;
        Ok(outcome)
    }

    fn refresh_cadence_texture(&mut self, scene: &mut Scene) {
        let Some(binding) = &self.cadence_binding else {
            return;
        };
        let Some(material) = scene.materials.get_mut(binding.material) else {
            log::debug!("cadence material is gone, skipping refresh");
            return;
        };
        let image = binding.generator.generate(self.texture_frame);
        material.set_texture(&binding.slot, &binding.key, Arc::new(image));
        self.texture_frame = self.texture_frame.wrapping_add(1);
    }
}
