//! Pipeline state objects composed from the lower-level caches.
//!
//! A [`PipelineState`] holds handles into the pixel shader and state caches
//! rather than its own copies. Reloading a pixel shader is therefore visible to
//! every pipeline using it without rebuilding those pipelines.
//!
//! The vertex shader is different: the input layout is validated against its
//! signature, so the pipeline pins the exact shader object the layout was
//! checked against. A vertex shader reload reaches the pipeline only when the
//! pipeline is rebuilt, and a failed rebuild leaves layout and shader matched.

use std::hash::{Hash, Hasher};
use std::sync::Arc;

use resource_cache::hash::{fingerprint, hash_combine};
use resource_cache::{Handle, ResourceCache, ResourceFactory};

use crate::desc::{BlendDesc, DepthStencilDesc, InputElement, RasterizerDesc, Topology};
use crate::device::{Device, DeviceError};
use crate::shader::{ShaderCache, ShaderError, ShaderHandle, ShaderKey};
use crate::state::{BlendStateCache, DepthStencilStateCache, RasterizerStateCache, StateHandle};

/// Everything needed to build one pipeline state object.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PipelineDesc {
	pub vertex_shader: ShaderKey,
	pub pixel_shader: ShaderKey,
	pub input_layout: Vec<InputElement>,
	pub blend: BlendDesc,
	pub depth_stencil: DepthStencilDesc,
	pub rasterizer: RasterizerDesc,
	pub topology: Topology,
}

impl PipelineDesc {
	/// Opaque, depth-tested, back-face culled triangles.
	pub fn new(vertex_shader: ShaderKey, pixel_shader: ShaderKey, input_layout: Vec<InputElement>) -> Self {
		Self {
			vertex_shader,
			pixel_shader,
			input_layout,
			blend: BlendDesc::OPAQUE,
			depth_stencil: DepthStencilDesc::DEPTH_LESS,
			rasterizer: RasterizerDesc::CULL_BACK,
			topology: Topology::TriangleList,
		}
	}

	/// Position-sensitive fold of the fingerprints of every part.
	pub fn fingerprint(&self) -> u64 {
		let parts = [
			fingerprint(&self.vertex_shader),
			fingerprint(&self.pixel_shader),
			fingerprint(&self.input_layout),
			fingerprint(&self.blend),
			fingerprint(&self.depth_stencil),
			fingerprint(&self.rasterizer),
			fingerprint(&self.topology),
		];
		parts.into_iter().fold(0, hash_combine)
	}
}

impl Hash for PipelineDesc {
	fn hash<H: Hasher>(&self, state: &mut H) {
		state.write_u64(self.fingerprint());
	}
}

#[derive(Debug, thiserror::Error)]
pub enum PipelineError {
	#[error("vertex shader: {0}")]
	VertexShader(#[source] ShaderError),

	#[error("pixel shader: {0}")]
	PixelShader(#[source] ShaderError),

	#[error("{stage} state: {source}")]
	State {
		stage: &'static str,
		#[source]
		source: DeviceError,
	},

	#[error(transparent)]
	InputLayout(DeviceError),
}

/// A built pipeline: shader and state handles plus the input layout.
pub struct PipelineState<D: Device> {
	/// The vertex shader `input_layout` was validated against.
	pub vertex_shader: Arc<D::Shader>,
	pub pixel_shader: ShaderHandle<D>,
	pub input_layout: D::InputLayout,
	pub blend: StateHandle<D, BlendDesc>,
	pub depth_stencil: StateHandle<D, DepthStencilDesc>,
	pub rasterizer: StateHandle<D, RasterizerDesc>,
	pub topology: Topology,
	/// Keeps the vertex shader's cache entry registered, and so reloadable.
	vertex_entry: ShaderHandle<D>,
}

impl<D: Device> PipelineState<D> {
	/// Key of the vertex shader this pipeline was built from.
	pub fn vertex_shader_key(&self) -> &ShaderKey {
		self.vertex_entry.key()
	}
}

/// Builds pipelines by pulling handles from the shader and state caches.
pub struct PipelineFactory<D: Device> {
	device: Arc<D>,
	shaders: Arc<ShaderCache<D>>,
	blend: Arc<BlendStateCache<D>>,
	depth_stencil: Arc<DepthStencilStateCache<D>>,
	rasterizer: Arc<RasterizerStateCache<D>>,
}

impl<D: Device> PipelineFactory<D> {
	pub fn new(
		device: Arc<D>,
		shaders: Arc<ShaderCache<D>>,
		blend: Arc<BlendStateCache<D>>,
		depth_stencil: Arc<DepthStencilStateCache<D>>,
		rasterizer: Arc<RasterizerStateCache<D>>,
	) -> Self {
		Self {
			device,
			shaders,
			blend,
			depth_stencil,
			rasterizer,
		}
	}
}

impl<D: Device> ResourceFactory for PipelineFactory<D> {
	type Key = PipelineDesc;
	type Resource = PipelineState<D>;
	type Error = PipelineError;

	fn create(&self, key: &PipelineDesc) -> Result<PipelineState<D>, PipelineError> {
		let vertex_entry = self.shaders.get(&key.vertex_shader).map_err(PipelineError::VertexShader)?;
		let pixel_shader = self.shaders.get(&key.pixel_shader).map_err(PipelineError::PixelShader)?;

		let vertex_shader = vertex_entry.get_arc();
		let input_layout = self
			.device
			.create_input_layout(&key.input_layout, &vertex_shader)
			.map_err(PipelineError::InputLayout)?;

		let state = |stage: &'static str| move |source: DeviceError| PipelineError::State {
			stage,
			source,
		};
		let blend = self.blend.get(&key.blend).map_err(state("blend"))?;
		let depth_stencil = self.depth_stencil.get(&key.depth_stencil).map_err(state("depth-stencil"))?;
		let rasterizer = self.rasterizer.get(&key.rasterizer).map_err(state("rasterizer"))?;

		Ok(PipelineState {
			vertex_shader,
			pixel_shader,
			input_layout,
			blend,
			depth_stencil,
			rasterizer,
			topology: key.topology,
			vertex_entry,
		})
	}
}

pub type PipelineCache<D> = ResourceCache<PipelineFactory<D>>;
pub type PipelineHandle<D> = Handle<PipelineFactory<D>>;

#[cfg(test)]
mod tests {
	use super::*;
	use crate::desc::position_color_uv_layout;

	fn desc() -> PipelineDesc {
		PipelineDesc::new(
			ShaderKey::vertex("scene_vs.hlsl"),
			ShaderKey::pixel("scene_ps.hlsl"),
			position_color_uv_layout(),
		)
	}

	#[test]
	fn test_equal_descs_equal_fingerprint() {
		assert_eq!(desc(), desc());
		assert_eq!(desc().fingerprint(), desc().fingerprint());
	}

	#[test]
	fn test_swapped_shader_paths_change_fingerprint() {
		let forward = PipelineDesc::new(
			ShaderKey::new("a.hlsl", crate::ShaderStage::Pixel, "Main"),
			ShaderKey::new("b.hlsl", crate::ShaderStage::Pixel, "Main"),
			Vec::new(),
		);
		let swapped = PipelineDesc::new(
			ShaderKey::new("b.hlsl", crate::ShaderStage::Pixel, "Main"),
			ShaderKey::new("a.hlsl", crate::ShaderStage::Pixel, "Main"),
			Vec::new(),
		);

		assert_ne!(forward, swapped);
		assert_ne!(forward.fingerprint(), swapped.fingerprint());
	}

	#[test]
	fn test_state_changes_change_fingerprint() {
		let alpha = PipelineDesc {
			blend: BlendDesc::ALPHA,
			..desc()
		};
		let wire = PipelineDesc {
			rasterizer: RasterizerDesc::WIREFRAME,
			..desc()
		};

		assert_ne!(desc().fingerprint(), alpha.fingerprint());
		assert_ne!(desc().fingerprint(), wire.fingerprint());
		assert_ne!(alpha.fingerprint(), wire.fingerprint());
	}
}
