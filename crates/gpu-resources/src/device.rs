//! The graphics device seen by the caches.
//!
//! Only object creation goes through this interface. Draw submission, swap
//! chains and presentation stay with the renderer that owns the device.

use crate::desc::{BlendDesc, DepthStencilDesc, InputElement, RasterizerDesc, SamplerDesc};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ShaderStage {
	Vertex,
	Pixel,
	Compute,
}

impl ShaderStage {
	/// Shader model 5 target profile for this stage.
	pub fn profile(self) -> &'static str {
		match self {
			Self::Vertex => "vs_5_0",
			Self::Pixel => "ps_5_0",
			Self::Compute => "cs_5_0",
		}
	}
}

/// Shader source handed to the device compiler.
#[derive(Debug, Clone, Copy)]
pub struct ShaderSource<'a> {
	/// Where the code came from, for diagnostics.
	pub name: &'a str,
	pub code: &'a str,
	pub entry_point: &'a str,
	pub stage: ShaderStage,
	pub defines: &'a [(String, String)],
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TextureFormat {
	Rgba8Unorm,
	Rgba8UnormSrgb,
}

impl TextureFormat {
	pub fn bytes_per_pixel(self) -> usize {
		4
	}
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct TextureDesc {
	pub width: u32,
	pub height: u32,
	pub mip_levels: u32,
	pub format: TextureFormat,
}

impl TextureDesc {
	/// Byte length of the full mip chain, level 0 first, tightly packed.
	pub fn data_len(&self) -> usize {
		(0..self.mip_levels)
			.map(|level| {
				let (w, h) = self.level_size(level);
				w as usize * h as usize * self.format.bytes_per_pixel()
			})
			.sum()
	}

	/// Dimensions of mip `level`, never smaller than 1x1.
	pub fn level_size(&self, level: u32) -> (u32, u32) {
		((self.width >> level).max(1), (self.height >> level).max(1))
	}
}

#[derive(Debug, thiserror::Error)]
pub enum DeviceError {
	#[error("{name}: {stage:?} shader `{entry_point}` failed to compile: {message}")]
	Compile {
		name: String,
		stage: ShaderStage,
		entry_point: String,
		message: String,
	},

	#[error("invalid {kind} descriptor: {reason}")]
	InvalidDescriptor {
		kind: &'static str,
		reason: String,
	},

	#[error("input layout does not match the vertex shader: {0}")]
	InputLayoutMismatch(String),

	#[error("device lost: {0}")]
	DeviceLost(String),
}

/// Object-creation interface of a graphics device.
///
/// Each associated type is the backend's native object. The caches own these
/// objects and hand out tracked handles to them.
pub trait Device: Send + Sync + 'static {
	type Shader: Send + Sync + 'static;
	type InputLayout: Send + Sync + 'static;
	type BlendState: Send + Sync + 'static;
	type DepthStencilState: Send + Sync + 'static;
	type RasterizerState: Send + Sync + 'static;
	type SamplerState: Send + Sync + 'static;
	type Texture: Send + Sync + 'static;

	/// Compile shader source into a device shader object.
	fn compile_shader(&self, source: &ShaderSource<'_>) -> Result<Self::Shader, DeviceError>;

	/// Create an input layout validated against a compiled vertex shader.
	fn create_input_layout(
		&self,
		elements: &[InputElement],
		vertex_shader: &Self::Shader,
	) -> Result<Self::InputLayout, DeviceError>;

	fn create_blend_state(&self, desc: &BlendDesc) -> Result<Self::BlendState, DeviceError>;

	fn create_depth_stencil_state(
		&self,
		desc: &DepthStencilDesc,
	) -> Result<Self::DepthStencilState, DeviceError>;

	fn create_rasterizer_state(
		&self,
		desc: &RasterizerDesc,
	) -> Result<Self::RasterizerState, DeviceError>;

	fn create_sampler_state(&self, desc: &SamplerDesc) -> Result<Self::SamplerState, DeviceError>;

	/// Create a texture from `data`, the full mip chain described by
	/// [`TextureDesc::data_len`].
	fn create_texture(&self, desc: &TextureDesc, data: &[u8]) -> Result<Self::Texture, DeviceError>;
}
