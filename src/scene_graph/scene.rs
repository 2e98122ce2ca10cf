use std::collections::HashMap;

use glam::{Mat4, Quat, Vec3};
use id_arena::Arena;

use crate::color;
use crate::model::{Model, SceneModelId};
use crate::scene_graph::object3d::{Object3D, ObjectId};

/// Linear distance fog, same color as the background so distant geometry
/// dissolves into it.
#[derive(Debug, Clone)]
pub struct Fog {
    pub color: Vec3,
    pub near: f32,
    pub far: f32,
}

impl Fog {
    pub fn stage() -> Self {
        Self {
            color: color::BACKGROUND,
            near: 15.0,
            far: 20.0,
        }
    }
}

/// Scene graph root. Owns every visual node and every CPU-side mesh; nodes
/// are added over the page lifetime and never removed.
pub struct Scene {
    pub objects: Arena<Object3D>,
    pub models: Arena<Model>,
    pub background: Vec3,
    pub fog: Fog,
    // glTF meshes are deduplicated per source file; nodes sharing a mesh
    // share one model.
    gltf_mesh_to_model: HashMap<(String, usize), SceneModelId>,
}

impl Scene {
    pub fn new(background: Vec3, fog: Fog) -> Self {
        Self {
            objects: Arena::new(),
            models: Arena::new(),
            background,
            fog,
            gltf_mesh_to_model: HashMap::new(),
        }
    }

    pub fn add_object(&mut self, object: Object3D) -> ObjectId {
        self.objects.alloc(object)
    }

    pub fn add_group(&mut self, name: impl Into<String>) -> ObjectId {
        self.add_object(Object3D::group(name))
    }

    pub fn add_model(&mut self, model: Model) -> SceneModelId {
        self.models.alloc(model)
    }

    #[allow(dead_code)]
    pub fn get_object(&self, id: ObjectId) -> Option<&Object3D> {
        self.objects.get(id)
    }

    #[allow(dead_code)]
    pub fn get_object_by_name(&self, name: &str) -> Option<ObjectId> {
        self.objects
            .iter()
            .find(|(_, object)| object.name == name)
            .map(|(id, _)| id)
    }

    pub fn set_parent(&mut self, child_id: ObjectId, parent_id: ObjectId) {
        let old_parent = self
            .objects
            .get_mut(child_id)
            .and_then(|child| child.parent_id.take());

        if let Some(old_parent_id) = old_parent {
            if let Some(old_parent) = self.objects.get_mut(old_parent_id) {
                old_parent.child_ids.retain(|&id| id != child_id);
            }
        }

        if let Some(child) = self.objects.get_mut(child_id) {
            child.parent_id = Some(parent_id);
        }
        if let Some(parent) = self.objects.get_mut(parent_id) {
            parent.child_ids.push(child_id);
        }
    }

    pub fn set_translation(&mut self, id: ObjectId, translation: Vec3) {
        if let Some(object) = self.objects.get_mut(id) {
            object.transform.translation = translation;
        }
    }

    pub fn set_translation_x(&mut self, id: ObjectId, x: f32) {
        if let Some(object) = self.objects.get_mut(id) {
            object.transform.translation.x = x;
        }
    }

    pub fn translation(&self, id: ObjectId) -> Option<Vec3> {
        self.objects.get(id).map(|object| object.transform.translation)
    }

    /// The 100x100 ground plane. Receives shadows, casts none.
    pub fn spawn_floor(&mut self) -> ObjectId {
        let model_id = self.add_model(Model::plane("floor", 100.0, color::GROUND));
        self.add_object(Object3D {
            name: "floor".to_string(),
            model_id: Some(model_id),
            receive_shadow: true,
            ..Object3D::default()
        })
    }

    /// Instantiates a glTF scene under `parent`. Every mesh node is tagged
    /// as both a shadow caster and receiver.
    pub fn spawn_gltf_scene(
        &mut self,
        file_stem: &str,
        buffers: &[gltf::buffer::Data],
        gltf_scene: &gltf::Scene,
        parent: ObjectId,
    ) -> anyhow::Result<()> {
        for node in gltf_scene.nodes() {
            self.spawn_gltf_node(file_stem, buffers, &node, parent)?;
        }
        Ok(())
    }

    fn spawn_gltf_node(
        &mut self,
        file_stem: &str,
        buffers: &[gltf::buffer::Data],
        node: &gltf::Node,
        parent: ObjectId,
    ) -> anyhow::Result<ObjectId> {
        let node_name = node.name().unwrap_or("Unnamed").to_string();
        let (translation, rotation, scale) = node.transform().decomposed();

        let mut object = Object3D::group(node_name.clone());
        object.transform.translation = translation.into();
        object.transform.rotation = Quat::from_array(rotation);
        // Uniform scale assumed; the source assets are authored that way.
        object.transform.scale = scale[0];

        if let Some(mesh) = node.mesh() {
            let key = (file_stem.to_string(), mesh.index());
            let model_id = match self.gltf_mesh_to_model.get(&key).copied() {
                Some(model_id) => model_id,
                None => {
                    let mesh_name = mesh
                        .name()
                        .map(String::from)
                        .unwrap_or_else(|| format!("{} (Mesh)", node_name));
                    let model = Model::from_gltf(mesh_name, mesh, buffers)?;
                    let model_id = self.add_model(model);
                    self.gltf_mesh_to_model.insert(key, model_id);
                    model_id
                }
            };

            object.model_id = Some(model_id);
            object.cast_shadow = true;
            object.receive_shadow = true;
        }

        let object_id = self.add_object(object);
        self.set_parent(object_id, parent);

        for child in node.children() {
            self.spawn_gltf_node(file_stem, buffers, &child, object_id)?;
        }

        Ok(object_id)
    }

    /// Walks the whole graph in hierarchical order, handing each node its
    /// composed world matrix.
    pub fn visit_world(&self, f: &mut impl FnMut(&Object3D, Mat4)) {
        let roots: Vec<ObjectId> = self
            .objects
            .iter()
            .filter(|(_, object)| object.parent_id.is_none())
            .map(|(id, _)| id)
            .collect();

        for root in roots {
            self.visit_world_recursive(root, Mat4::IDENTITY, f);
        }
    }

    fn visit_world_recursive(
        &self,
        id: ObjectId,
        parent_matrix: Mat4,
        f: &mut impl FnMut(&Object3D, Mat4),
    ) {
        let Some(object) = self.objects.get(id) else {
            return;
        };

        let world = parent_matrix * object.transform.local_matrix();
        f(object, world);

        for &child_id in &object.child_ids {
            self.visit_world_recursive(child_id, world, f);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn test_scene() -> Scene {
        Scene::new(color::BACKGROUND, Fog::stage())
    }

    #[test]
    fn world_matrices_compose_through_parents() {
        let mut scene = test_scene();
        let group = scene.add_group("group");
        let child = scene.add_group("child");
        scene.set_parent(child, group);

        scene.set_translation(group, Vec3::new(5.0, 0.0, 0.0));
        scene.set_translation(child, Vec3::new(0.0, 2.0, 0.0));

        let mut child_world = None;
        scene.visit_world(&mut |object, world| {
            if object.name == "child" {
                child_world = Some(world.transform_point3(Vec3::ZERO));
            }
        });

        assert_eq!(child_world.unwrap(), Vec3::new(5.0, 2.0, 0.0));
    }

    #[test]
    fn floor_receives_but_does_not_cast() {
        let mut scene = test_scene();
        let floor = scene.spawn_floor();

        let object = scene.get_object(floor).unwrap();
        assert!(object.receive_shadow);
        assert!(!object.cast_shadow);
        assert!(object.model_id.is_some());
    }

    #[test]
    fn lookup_by_name() {
        let mut scene = test_scene();
        let bear = scene.add_group("bear");
        assert_eq!(scene.get_object_by_name("bear"), Some(bear));
        assert_eq!(scene.get_object_by_name("missing"), None);
    }

    #[test]
    fn fog_shares_the_background_color() {
        let scene = test_scene();
        assert_eq!(scene.fog.color, scene.background);
        assert_eq!(scene.fog.near, 15.0);
        assert_eq!(scene.fog.far, 20.0);
    }
}
