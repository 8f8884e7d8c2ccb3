//! # GPU Resources
//!
//! Hot-reloadable caches for the objects a renderer builds once and uses
//! every frame:
//! - **Shaders** keyed by file, stage, entry point and defines
//! - **Fixed-function states** (blend, depth-stencil, rasterizer, sampler)
//!   keyed by their descriptors
//! - **Pipelines** composed from shader and state handles
//! - **Textures** loaded from disk or generated
//!
//! Every cache is a [`resource_cache::ResourceCache`], so equal keys share one
//! object and a reload repoints every live handle. The graphics API sits
//! behind the [`Device`] trait; [`HeadlessDevice`] implements it in software.
//!
//! ## Example
//!
//! ```rust
//! use std::sync::Arc;
//!
//! use gpu_resources::{
//!     GpuResources, HeadlessDevice, PipelineDesc, ResourceConfig, ShaderKey,
//!     position_color_uv_layout,
//! };
//!
//! let dir = std::env::temp_dir().join("gpu-resources-doctest");
//! std::fs::create_dir_all(&dir).unwrap();
//! std::fs::write(dir.join("scene.hlsl"), concat!(
//!     "float4 VSMain(float3 POSITION, float4 COLOR, float2 TEXCOORD) {}\n",
//!     "float4 PSMain() {}\n",
//! )).unwrap();
//!
//! let resources = GpuResources::new(Arc::new(HeadlessDevice::new()), &ResourceConfig::new(&dir));
//! let pipeline = resources
//!     .pipeline(&PipelineDesc::new(
//!         ShaderKey::vertex("scene.hlsl"),
//!         ShaderKey::pixel("scene.hlsl"),
//!         position_color_uv_layout(),
//!     ))
//!     .unwrap();
//!
//! assert!(resources.reload_all().is_ok());
//! assert_eq!(pipeline.get().input_layout.stride(), 24);
//! drop(pipeline);
//! ```

mod desc;
mod device;
mod headless;
mod pipeline;
mod resources;
mod shader;
mod state;
mod texture;
mod watcher;

pub use desc::{
	AddressMode, Blend, BlendDesc, BlendOp, ComparisonFunc, CullMode, DepthStencilDesc, FillMode,
	Filter, InputElement, MAX_RENDER_TARGETS, RasterizerDesc, RenderTargetBlend, SamplerDesc,
	Topology, VertexFormat, position_color_uv_layout,
};
pub use device::{Device, DeviceError, ShaderSource, ShaderStage, TextureDesc, TextureFormat};
pub use headless::{HeadlessDevice, HeadlessInputLayout, HeadlessShader, HeadlessState, HeadlessTexture};
pub use pipeline::{
	PipelineCache, PipelineDesc, PipelineError, PipelineFactory, PipelineHandle, PipelineState,
};
pub use resources::{GpuResources, ReloadFailure, ReloadSummary, ResourceConfig};
pub use shader::{ShaderCache, ShaderError, ShaderFactory, ShaderHandle, ShaderKey};
pub use state::{
	BlendStateCache, DepthStencilStateCache, RasterizerStateCache, SamplerStateCache, StateCache,
	StateDescriptor, StateFactory, StateHandle,
};
pub use texture::{
	MAX_TEXTURE_SIZE, TextureCache, TextureError, TextureFactory, TextureHandle, TextureKey,
};
pub use watcher::ShaderWatcher;
