/// Conversions from the device vocabulary to Vulkan types
///
/// Pure functions, testable without a GPU.

use ash::vk;
use gpu_allocator::MemoryLocation;
use render_process::rproc::device::{
    AccessFlags, DependencyFlags, HostAccessPattern, ImageAspect, ImageLayout, ImageUsage, LoadOp,
    PipelineStages, StoreOp, SubpassSource, TextureFormat,
};

pub(crate) fn format_to_vk(format: TextureFormat) -> vk::Format {
    match format {
        TextureFormat::R8_UNORM => vk::Format::R8_UNORM,
        TextureFormat::R8G8B8A8_SRGB => vk::Format::R8G8B8A8_SRGB,
        TextureFormat::R8G8B8A8_UNORM => vk::Format::R8G8B8A8_UNORM,
        TextureFormat::B8G8R8A8_SRGB => vk::Format::B8G8R8A8_SRGB,
        TextureFormat::B8G8R8A8_UNORM => vk::Format::B8G8R8A8_UNORM,
        TextureFormat::R16G16B16A16_SFLOAT => vk::Format::R16G16B16A16_SFLOAT,
        TextureFormat::R32_SFLOAT => vk::Format::R32_SFLOAT,
        TextureFormat::R32G32B32A32_SFLOAT => vk::Format::R32G32B32A32_SFLOAT,
        TextureFormat::D16_UNORM => vk::Format::D16_UNORM,
        TextureFormat::D32_FLOAT => vk::Format::D32_SFLOAT,
        TextureFormat::D24_UNORM_S8_UINT => vk::Format::D24_UNORM_S8_UINT,
        TextureFormat::D32_FLOAT_S8_UINT => vk::Format::D32_SFLOAT_S8_UINT,
    }
}

pub(crate) fn image_usage_to_vk(usage: ImageUsage) -> vk::ImageUsageFlags {
    const PAIRS: [(ImageUsage, vk::ImageUsageFlags); 7] = [
        (ImageUsage::TRANSFER_SRC, vk::ImageUsageFlags::TRANSFER_SRC),
        (ImageUsage::TRANSFER_DST, vk::ImageUsageFlags::TRANSFER_DST),
        (ImageUsage::SAMPLED, vk::ImageUsageFlags::SAMPLED),
        (ImageUsage::STORAGE, vk::ImageUsageFlags::STORAGE),
        (ImageUsage::COLOR_ATTACHMENT, vk::ImageUsageFlags::COLOR_ATTACHMENT),
        (ImageUsage::DEPTH_STENCIL_ATTACHMENT, vk::ImageUsageFlags::DEPTH_STENCIL_ATTACHMENT),
        (ImageUsage::INPUT_ATTACHMENT, vk::ImageUsageFlags::INPUT_ATTACHMENT),
    ];
    PAIRS
        .iter()
        .filter(|(ours, _)| usage.contains(*ours))
        .fold(vk::ImageUsageFlags::empty(), |acc, (_, vk_flag)| acc | *vk_flag)
}

pub(crate) fn aspect_to_vk(aspect: ImageAspect) -> vk::ImageAspectFlags {
    let mut flags = vk::ImageAspectFlags::empty();
    if aspect.contains(ImageAspect::COLOR) {
        flags |= vk::ImageAspectFlags::COLOR;
    }
    if aspect.contains(ImageAspect::DEPTH) {
        flags |= vk::ImageAspectFlags::DEPTH;
    }
    if aspect.contains(ImageAspect::STENCIL) {
        flags |= vk::ImageAspectFlags::STENCIL;
    }
    flags
}

pub(crate) fn load_op_to_vk(load_op: LoadOp) -> vk::AttachmentLoadOp {
    match load_op {
        LoadOp::Load => vk::AttachmentLoadOp::LOAD,
        LoadOp::Clear => vk::AttachmentLoadOp::CLEAR,
        LoadOp::DontCare => vk::AttachmentLoadOp::DONT_CARE,
    }
}

pub(crate) fn store_op_to_vk(store_op: StoreOp) -> vk::AttachmentStoreOp {
    match store_op {
        StoreOp::Store => vk::AttachmentStoreOp::STORE,
        StoreOp::DontCare => vk::AttachmentStoreOp::DONT_CARE,
    }
}

pub(crate) fn image_layout_to_vk(layout: ImageLayout) -> vk::ImageLayout {
    match layout {
        ImageLayout::Undefined => vk::ImageLayout::UNDEFINED,
        ImageLayout::General => vk::ImageLayout::GENERAL,
        ImageLayout::ColorAttachment => vk::ImageLayout::COLOR_ATTACHMENT_OPTIMAL,
        ImageLayout::DepthStencilAttachment => vk::ImageLayout::DEPTH_STENCIL_ATTACHMENT_OPTIMAL,
        ImageLayout::DepthStencilReadOnly => vk::ImageLayout::DEPTH_STENCIL_READ_ONLY_OPTIMAL,
        ImageLayout::ShaderReadOnly => vk::ImageLayout::SHADER_READ_ONLY_OPTIMAL,
        ImageLayout::TransferSrc => vk::ImageLayout::TRANSFER_SRC_OPTIMAL,
        ImageLayout::TransferDst => vk::ImageLayout::TRANSFER_DST_OPTIMAL,
        ImageLayout::PresentSrc => vk::ImageLayout::PRESENT_SRC_KHR,
    }
}

pub(crate) fn pipeline_stages_to_vk(stages: PipelineStages) -> vk::PipelineStageFlags {
    const PAIRS: [(PipelineStages, vk::PipelineStageFlags); 9] = [
        (PipelineStages::TOP_OF_PIPE, vk::PipelineStageFlags::TOP_OF_PIPE),
        (PipelineStages::VERTEX_SHADER, vk::PipelineStageFlags::VERTEX_SHADER),
        (PipelineStages::FRAGMENT_SHADER, vk::PipelineStageFlags::FRAGMENT_SHADER),
        (PipelineStages::EARLY_FRAGMENT_TESTS, vk::PipelineStageFlags::EARLY_FRAGMENT_TESTS),
        (PipelineStages::LATE_FRAGMENT_TESTS, vk::PipelineStageFlags::LATE_FRAGMENT_TESTS),
        (PipelineStages::COLOR_ATTACHMENT_OUTPUT, vk::PipelineStageFlags::COLOR_ATTACHMENT_OUTPUT),
        (PipelineStages::COMPUTE_SHADER, vk::PipelineStageFlags::COMPUTE_SHADER),
        (PipelineStages::TRANSFER, vk::PipelineStageFlags::TRANSFER),
        (PipelineStages::BOTTOM_OF_PIPE, vk::PipelineStageFlags::BOTTOM_OF_PIPE),
    ];
    PAIRS
        .iter()
        .filter(|(ours, _)| stages.contains(*ours))
        .fold(vk::PipelineStageFlags::empty(), |acc, (_, vk_flag)| acc | *vk_flag)
}

pub(crate) fn access_flags_to_vk(access: AccessFlags) -> vk::AccessFlags {
    const PAIRS: [(AccessFlags, vk::AccessFlags); 9] = [
        (AccessFlags::INPUT_ATTACHMENT_READ, vk::AccessFlags::INPUT_ATTACHMENT_READ),
        (AccessFlags::SHADER_READ, vk::AccessFlags::SHADER_READ),
        (AccessFlags::SHADER_WRITE, vk::AccessFlags::SHADER_WRITE),
        (AccessFlags::COLOR_ATTACHMENT_READ, vk::AccessFlags::COLOR_ATTACHMENT_READ),
        (AccessFlags::COLOR_ATTACHMENT_WRITE, vk::AccessFlags::COLOR_ATTACHMENT_WRITE),
        (AccessFlags::DEPTH_STENCIL_ATTACHMENT_READ, vk::AccessFlags::DEPTH_STENCIL_ATTACHMENT_READ),
        (AccessFlags::DEPTH_STENCIL_ATTACHMENT_WRITE, vk::AccessFlags::DEPTH_STENCIL_ATTACHMENT_WRITE),
        (AccessFlags::TRANSFER_READ, vk::AccessFlags::TRANSFER_READ),
        (AccessFlags::TRANSFER_WRITE, vk::AccessFlags::TRANSFER_WRITE),
    ];
    PAIRS
        .iter()
        .filter(|(ours, _)| access.contains(*ours))
        .fold(vk::AccessFlags::empty(), |acc, (_, vk_flag)| acc | *vk_flag)
}

pub(crate) fn dependency_flags_to_vk(flags: DependencyFlags) -> vk::DependencyFlags {
    if flags.contains(DependencyFlags::BY_REGION) {
        vk::DependencyFlags::BY_REGION
    } else {
        vk::DependencyFlags::empty()
    }
}

pub(crate) fn subpass_source_to_vk(source: SubpassSource) -> u32 {
    match source {
        SubpassSource::External => vk::SUBPASS_EXTERNAL,
        SubpassSource::Subpass(index) => index,
    }
}

/// Memory the allocator should pick for a staging buffer
pub(crate) fn host_access_location(access: HostAccessPattern) -> gpu_allocator::MemoryLocation {
    match access {
        HostAccessPattern::Sequential => MemoryLocation::CpuToGpu,
        HostAccessPattern::Random => MemoryLocation::GpuToCpu,
    }
}

/// View type covering `layers` array layers
pub(crate) fn view_type_for_layers(layers: u32) -> vk::ImageViewType {
    if layers > 1 {
        vk::ImageViewType::TYPE_2D_ARRAY
    } else {
        vk::ImageViewType::TYPE_2D
    }
}

#[cfg(test)]
#[path = "vulkan_format_tests.rs"]
mod tests;
