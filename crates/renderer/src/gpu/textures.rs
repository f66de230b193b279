use std::path::Path;

use image::imageops::flip_vertical_in_place;
use wgpu::util::{DeviceExt, TextureDataOrder};

use crate::sources::load_source_or_placeholder;

use super::context::SurfaceColorSpace;

/// One uploaded transition input.
pub(crate) struct SourceTexture {
    _texture: wgpu::Texture,
    pub view: wgpu::TextureView,
    pub sampler: wgpu::Sampler,
}

/// Loads, flips, and uploads a source image. Never fails: unreadable files
/// fall back to a placeholder texel inside `load_source_or_placeholder`.
pub(crate) fn upload_source(
    device: &wgpu::Device,
    queue: &wgpu::Queue,
    role: &str,
    path: &Path,
    color_space: SurfaceColorSpace,
) -> SourceTexture {
    let mut image = load_source_or_placeholder(role, path);
    // UV origin is bottom-left; store the bottom row first.
    flip_vertical_in_place(&mut image);
    let (width, height) = image.dimensions();

    let format = match color_space {
        SurfaceColorSpace::Gamma => wgpu::TextureFormat::Rgba8Unorm,
        SurfaceColorSpace::Linear => wgpu::TextureFormat::Rgba8UnormSrgb,
    };
    let texture = device.create_texture_with_data(
        queue,
        &wgpu::TextureDescriptor {
            label: Some(&format!("{role} source texture")),
            size: wgpu::Extent3d {
                width,
                height,
                depth_or_array_layers: 1,
            },
            mip_level_count: 1,
            sample_count: 1,
            dimension: wgpu::TextureDimension::D2,
            format,
            usage: wgpu::TextureUsages::TEXTURE_BINDING | wgpu::TextureUsages::COPY_DST,
            view_formats: &[],
        },
        TextureDataOrder::LayerMajor,
        image.as_raw(),
    );

    let view = texture.create_view(&wgpu::TextureViewDescriptor::default());
    let sampler = device.create_sampler(&wgpu::SamplerDescriptor {
        label: Some(&format!("{role} source sampler")),
        address_mode_u: wgpu::AddressMode::ClampToEdge,
        address_mode_v: wgpu::AddressMode::ClampToEdge,
        address_mode_w: wgpu::AddressMode::ClampToEdge,
        mag_filter: wgpu::FilterMode::Linear,
        min_filter: wgpu::FilterMode::Linear,
        mipmap_filter: wgpu::FilterMode::Nearest,
        ..Default::default()
    });

    tracing::debug!(role, width, height, ?format, "uploaded source texture");

    SourceTexture {
        _texture: texture,
        view,
        sampler,
    }
}

/// Layout entries for the `(texture, sampler)` pairs at bindings 0..4.
pub(crate) fn source_layout_entries() -> [wgpu::BindGroupLayoutEntry; 4] {
    std::array::from_fn(|binding| {
        let ty = if binding % 2 == 0 {
            wgpu::BindingType::Texture {
                sample_type: wgpu::TextureSampleType::Float { filterable: true },
                view_dimension: wgpu::TextureViewDimension::D2,
                multisampled: false,
            }
        } else {
            wgpu::BindingType::Sampler(wgpu::SamplerBindingType::Filtering)
        };
        wgpu::BindGroupLayoutEntry {
            binding: binding as u32,
            visibility: wgpu::ShaderStages::FRAGMENT,
            ty,
            count: None,
        }
    })
}

pub(crate) fn source_bind_group(
    device: &wgpu::Device,
    layout: &wgpu::BindGroupLayout,
    from: &SourceTexture,
    to: &SourceTexture,
) -> wgpu::BindGroup {
    device.create_bind_group(&wgpu::BindGroupDescriptor {
        label: Some("source bind group"),
        layout,
        entries: &[
            wgpu::BindGroupEntry {
                binding: 0,
                resource: wgpu::BindingResource::TextureView(&from.view),
            },
            wgpu::BindGroupEntry {
                binding: 1,
                resource: wgpu::BindingResource::Sampler(&from.sampler),
            },
            wgpu::BindGroupEntry {
                binding: 2,
                resource: wgpu::BindingResource::TextureView(&to.view),
            },
            wgpu::BindGroupEntry {
                binding: 3,
                resource: wgpu::BindingResource::Sampler(&to.sampler),
            },
        ],
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn layout_alternates_texture_and_sampler() {
        let entries = source_layout_entries();
        for (index, entry) in entries.iter().enumerate() {
            assert_eq!(entry.binding, index as u32);
            let is_texture = matches!(entry.ty, wgpu::BindingType::Texture { .. });
            assert_eq!(is_texture, index % 2 == 0);
        }
    }
}
