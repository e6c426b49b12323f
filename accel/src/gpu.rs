//! Uploads packed scene buffers into wgpu storage buffers.

use std::borrow::Cow;

use wgpu::{Buffer, Device, util::DeviceExt};

use crate::{
    records::{PackedBlasNode, PackedInstance, PackedMaterial, PackedTlasNode, PackedVertexInfo},
    scene::SceneBuffers,
};

/// Extends `wgpu::Device` with a fluent buffer builder.
pub trait WgpuExt {
    fn buffer(&self) -> BufferBuilder<'_>;
}

impl WgpuExt for Device {
    fn buffer(&self) -> BufferBuilder<'_> {
        BufferBuilder::new(self)
    }
}

pub struct BufferBuilder<'a> {
    device: &'a Device,
    label: Option<&'a str>,
    usage: wgpu::BufferUsages,
}

impl<'a> BufferBuilder<'a> {
    fn new(device: &'a Device) -> Self {
        Self {
            device,
            label: None,
            usage: wgpu::BufferUsages::empty(),
        }
    }

    pub fn label(mut self, label: &'a str) -> Self {
        self.label = Some(label);
        self
    }

    pub fn usage(mut self, usage: wgpu::BufferUsages) -> Self {
        self.usage = usage;
        self
    }

    pub fn storage<T: bytemuck::Pod>(self, data: &[T]) -> Buffer {
        self.device
            .create_buffer_init(&wgpu::util::BufferInitDescriptor {
                label: self.label,
                contents: bytemuck::cast_slice(data),
                usage: self.usage | wgpu::BufferUsages::STORAGE | wgpu::BufferUsages::COPY_DST,
            })
    }

    /// Storage buffer that holds `placeholder` instead when `data` is empty,
    /// since wgpu cannot bind a zero-sized storage buffer.
    pub fn storage_or<T: bytemuck::Pod>(self, data: &[T], placeholder: T) -> Buffer {
        self.storage::<T>(&non_empty_or(data, placeholder))
    }
}

fn non_empty_or<T: Clone>(data: &[T], placeholder: T) -> Cow<'_, [T]> {
    if data.is_empty() {
        Cow::Owned(vec![placeholder])
    } else {
        Cow::Borrowed(data)
    }
}

/// Storage buffers for one packed scene, bound in field order starting at
/// binding 0.
pub struct GpuSceneBuffers {
    pub vertices: Buffer,
    pub vertex_info: Buffer,
    pub blas_nodes: Buffer,
    pub triangle_indices: Buffer,
    pub instances: Buffer,
    pub materials: Buffer,
    pub tlas_nodes: Buffer,
    pub instance_count: u32,
    pub tlas_node_count: u32,
}

impl GpuSceneBuffers {
    pub const BINDING_COUNT: u32 = 7;

    pub fn upload(device: &Device, buffers: &SceneBuffers) -> Self {
        let gpu = Self {
            vertices: device
                .buffer()
                .label("Scene Vertex Buffer")
                .storage_or(&buffers.vertices, 0.0f32),
            vertex_info: device
                .buffer()
                .label("Scene Vertex Info Buffer")
                .storage_or(&buffers.vertex_info, PackedVertexInfo::default()),
            blas_nodes: device
                .buffer()
                .label("Scene BLAS Node Buffer")
                .storage_or(&buffers.blas_nodes, PackedBlasNode::default()),
            triangle_indices: device
                .buffer()
                .label("Scene Triangle Index Buffer")
                .storage_or(&buffers.triangle_indices, 0u32),
            instances: device
                .buffer()
                .label("Scene Instance Buffer")
                .storage_or(&buffers.instances, PackedInstance::default()),
            materials: device
                .buffer()
                .label("Scene Material Buffer")
                .storage_or(&buffers.materials, PackedMaterial::default()),
            tlas_nodes: device
                .buffer()
                .label("Scene TLAS Node Buffer")
                .storage_or(&buffers.tlas_nodes, PackedTlasNode::default()),
            instance_count: buffers.instances.len() as u32,
            tlas_node_count: buffers.tlas_nodes.len() as u32,
        };

        log::debug!(
            "Uploaded scene buffers: {} bytes, {} instances",
            buffers.total_bytes(),
            gpu.instance_count
        );
        gpu
    }

    fn ordered(&self) -> [&Buffer; Self::BINDING_COUNT as usize] {
        [
            &self.vertices,
            &self.vertex_info,
            &self.blas_nodes,
            &self.triangle_indices,
            &self.instances,
            &self.materials,
            &self.tlas_nodes,
        ]
    }

    /// Read-only storage layout entries matching [`GpuSceneBuffers::bind_group_entries`].
    pub fn bind_group_layout_entries(visibility: wgpu::ShaderStages) -> Vec<wgpu::BindGroupLayoutEntry> {
        (0..Self::BINDING_COUNT)
            .map(|binding| wgpu::BindGroupLayoutEntry {
                binding,
                visibility,
                ty: wgpu::BindingType::Buffer {
                    ty: wgpu::BufferBindingType::Storage { read_only: true },
                    has_dynamic_offset: false,
                    min_binding_size: None,
                },
                count: None,
            })
            .collect()
    }

    pub fn bind_group_entries(&self) -> Vec<wgpu::BindGroupEntry<'_>> {
        self.ordered()
            .into_iter()
            .enumerate()
            .map(|(binding, buffer)| wgpu::BindGroupEntry {
                binding: binding as u32,
                resource: buffer.as_entire_binding(),
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_data_gets_one_placeholder() {
        let empty: &[PackedTlasNode] = &[];
        let data = non_empty_or(empty, PackedTlasNode::default());
        assert_eq!(data.len(), 1);
        assert_eq!(bytemuck::cast_slice::<PackedTlasNode, u8>(&data).len(), 48);
    }

    #[test]
    fn test_non_empty_data_is_borrowed() {
        let indices = [4u32, 5, 6];
        let data = non_empty_or(&indices, 0);
        assert!(matches!(data, Cow::Borrowed(_)));
        assert_eq!(&*data, &indices);
    }

    #[test]
    fn test_layout_covers_every_buffer() {
        let entries = GpuSceneBuffers::bind_group_layout_entries(wgpu::ShaderStages::COMPUTE);
        assert_eq!(entries.len(), 7);
        assert_eq!(entries[6].binding, 6);
    }
}
