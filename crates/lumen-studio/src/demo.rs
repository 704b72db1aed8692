//! Demo scene: a spinning textured torus lit from the camera position.

use std::sync::Arc;

use glam::DVec3;
use lumen_engine::error::SceneError;
use lumen_engine::pipeline::CadenceBinding;
use lumen_engine::scene::{
    Camera, Light, Material, MaterialId, MeshObject, Motion, NodeId, NodePayload, PatternTexture, Scene,
    TextureGenerator, Transform,
};

use crate::bindings::{StudioScene, TorusMesh, DIFFUSE_SLOT};

pub const EYE: DVec3 = DVec3::new(12.0, 12.0, 6.0);
const TEXTURE_KEY: &str = "procedural";

/// Handles into the scene built by [`build`].
#[derive(Debug, Copy, Clone)]
pub struct DemoScene {
    pub camera: NodeId,
    pub light: NodeId,
    pub torus: NodeId,
    pub material: MaterialId,
}

pub fn build(scene: &mut Scene, backend: &mut StudioScene, texture_size: u32) -> Result<DemoScene, SceneError> {
    let camera = scene.graph.insert(
        None,
        "camera",
        NodePayload::Camera(Camera::default()),
        Transform::look_at(EYE, DVec3::ZERO, DVec3::Z),
    )?;
    scene.camera = Some(camera);

    let light = scene.graph.insert(
        None,
        "light",
        NodePayload::Light(Light {
            intensity: 100.0,
            radius: 1000.0,
            color: [1.0; 3],
        }),
        Transform::from_translation(EYE),
    )?;

    let mut metal = Material::new("metal", None);
    metal.set_scalar("roughness_scale", 0.5);
    metal.set_scalar("metallic_scale", 1.0);
    let metal = scene.materials.insert(metal);

    let mut material = Material::new("torus", Some(metal));
    material.set_scalar("roughness_scale", 0.2);
    material.set_scalar("metallic_scale", 0.0);
    // Frame 0 of the pattern until the first cadence tick replaces it.
    let first = PatternTexture::new(texture_size).generate(0);
    material.set_texture(DIFFUSE_SLOT, TEXTURE_KEY, Arc::new(first));
    let material = scene.materials.insert(material);

    let torus_mesh = TorusMesh {
        major_radius: 8.0,
        minor_radius: 2.0,
    };
    let mesh = backend.register_torus(torus_mesh);
    let torus = scene.graph.insert(
        None,
        "torus",
        NodePayload::Mesh(MeshObject {
            mesh,
            material,
            bound_radius: torus_mesh.bound_radius(),
        }),
        Transform::IDENTITY,
    )?;
    scene.animator.attach(torus, Motion::spin(24.0, 16.0));

    log::info!("demo scene: {} nodes, {} materials", scene.graph.len(), scene.materials.len());
    Ok(DemoScene {
        camera,
        light,
        torus,
        material,
    })
}

/// Regenerates the torus diffuse texture on the cadence.
pub fn cadence_binding(demo: &DemoScene, texture_size: u32) -> CadenceBinding {
    CadenceBinding {
        material: demo.material,
        slot: DIFFUSE_SLOT.to_string(),
        key: TEXTURE_KEY.to_string(),
        generator: Box::new(PatternTexture::new(texture_size)),
    }
}

#[cfg(test)]
mod tests {
    use approx::assert_abs_diff_eq;
    use lumen_engine::scene::MaterialValue;

    use super::*;

    fn demo() -> (Scene, StudioScene, DemoScene) {
        let mut scene = Scene::new();
        let mut backend = StudioScene::new();
        let demo = build(&mut scene, &mut backend, 16).unwrap();
        (scene, backend, demo)
    }

    #[test]
    fn builds_camera_light_and_torus() {
        let (scene, backend, demo) = demo();
        assert_eq!(scene.graph.len(), 3);
        assert_eq!(scene.camera, Some(demo.camera));
        assert!(matches!(scene.graph.get(demo.light).unwrap().payload(), NodePayload::Light(_)));

        let NodePayload::Mesh(object) = scene.graph.get(demo.torus).unwrap().payload() else {
            panic!("torus is not a mesh node");
        };
        assert_eq!(backend.mesh(object.mesh).unwrap().major_radius, 8.0);
        assert_abs_diff_eq!(object.bound_radius, 10.0);
    }

    #[test]
    fn material_overrides_parent_scalars() {
        let (scene, _, demo) = demo();
        assert_eq!(
            scene.materials.resolve_param(demo.material, "roughness_scale"),
            Some(MaterialValue::Scalar(0.2))
        );
        let parent = scene.materials.get(demo.material).unwrap().parent().unwrap();
        assert_eq!(scene.materials.resolve_param(parent, "metallic_scale"), Some(MaterialValue::Scalar(1.0)));
    }

    #[test]
    fn torus_starts_textured_and_animates() {
        let (mut scene, _, demo) = demo();
        let slot = scene.materials.get(demo.material).unwrap().texture(DIFFUSE_SLOT).unwrap();
        assert_eq!(slot.image.width(), 16);

        let update = scene.update(1.0);
        assert_eq!(update.animated, 1);
        let spun = scene.graph.global_transform(demo.torus).unwrap();
        assert!(!spun.abs_diff_eq(&Transform::IDENTITY, 1e-6));
    }

    #[test]
    fn cadence_binding_targets_diffuse_slot() {
        let (_, _, demo) = demo();
        let binding = cadence_binding(&demo, 32);
        assert_eq!(binding.material, demo.material);
        assert_eq!(binding.slot, "diffuse");
        assert_eq!(binding.generator.generate(1).width(), 32);
    }
}
