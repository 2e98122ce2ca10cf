use anyhow::Context;
use bytemuck::{Pod, Zeroable};
use glam::Vec3;
use id_arena::Id;
use itertools::izip;

pub type SceneModelId = Id<Model>;

#[repr(C)]
#[derive(Copy, Clone, Debug, Pod, Zeroable)]
pub struct Vertex {
    pub position: Vec3,
    pub normal: Vec3,
    /// Linear base color; materials here are flat-shaded color factors.
    pub color: Vec3,
}

pub struct ModelPrimitive {
    pub index: usize,
    pub vertices: Vec<Vertex>,
    pub indices: Vec<u32>,
}

pub struct Model {
    pub name: String,
    pub primitives: Vec<ModelPrimitive>,
}

impl Model {
    pub fn from_gltf(
        name: impl Into<String>,
        mesh: gltf::Mesh,
        buffers: &[gltf::buffer::Data],
    ) -> anyhow::Result<Model> {
        let mut model = Model {
            name: name.into(),
            primitives: Vec::new(),
        };

        for primitive in mesh.primitives() {
            if primitive.mode() != gltf::mesh::Mode::Triangles {
                return Err(anyhow::anyhow!(
                    "Unsupported primitive mode: {:?}",
                    primitive.mode()
                ));
            }

            let base_color = primitive
                .material()
                .pbr_metallic_roughness()
                .base_color_factor();
            let color = Vec3::new(base_color[0], base_color[1], base_color[2]);

            let reader = primitive.reader(|buffer| Some(&buffers[buffer.index()]));

            let position_reader = reader
                .read_positions()
                .with_context(|| format!("Mesh '{}' has no positions", model.name))?;
            let normal_reader = reader
                .read_normals()
                .with_context(|| format!("Mesh '{}' has no normals", model.name))?;

            let vertices = izip!(position_reader, normal_reader)
                .map(|(position, normal)| Vertex {
                    position: Vec3::from(position),
                    normal: Vec3::from(normal),
                    color,
                })
                .collect::<Vec<Vertex>>();

            let indices = match reader.read_indices() {
                Some(index_reader) => index_reader.into_u32().collect(),
                None => (0..vertices.len() as u32).collect(),
            };

            model.primitives.push(ModelPrimitive {
                index: primitive.index(),
                vertices,
                indices,
            });
        }

        if model.primitives.is_empty() {
            return Err(anyhow::anyhow!("Mesh without primitives: {}", model.name));
        }

        Ok(model)
    }

    /// Flat square in the XZ plane, centered on the origin, facing +Y.
    pub fn plane(name: impl Into<String>, size: f32, color: Vec3) -> Model {
        let half = size / 2.0;
        let normal = Vec3::Y;

        let vertices = vec![
            Vertex {
                position: Vec3::new(-half, 0.0, -half),
                normal,
                color,
            },
            Vertex {
                position: Vec3::new(half, 0.0, -half),
                normal,
                color,
            },
            Vertex {
                position: Vec3::new(half, 0.0, half),
                normal,
                color,
            },
            Vertex {
                position: Vec3::new(-half, 0.0, half),
                normal,
                color,
            },
        ];

        // Counter-clockwise seen from above.
        let indices = vec![0, 3, 2, 0, 2, 1];

        Model {
            name: name.into(),
            primitives: vec![ModelPrimitive {
                index: 0,
                vertices,
                indices,
            }],
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn plane_spans_the_requested_size() {
        let plane = Model::plane("floor", 100.0, Vec3::ONE);
        assert_eq!(plane.primitives.len(), 1);

        let primitive = &plane.primitives[0];
        assert_eq!(primitive.vertices.len(), 4);
        assert_eq!(primitive.indices.len(), 6);

        for vertex in &primitive.vertices {
            assert_eq!(vertex.position.x.abs(), 50.0);
            assert_eq!(vertex.position.z.abs(), 50.0);
            assert_eq!(vertex.position.y, 0.0);
            assert_eq!(vertex.normal, Vec3::Y);
        }
    }
}
