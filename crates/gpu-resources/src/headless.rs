//! A software [`Device`] that validates inputs without touching a GPU.
//!
//! Compilation checks that the entry point exists and honours `#error`
//! directives, and input layouts are matched against the semantics named in
//! the vertex shader source. Every created object gets a unique id so tests
//! can tell a rebuilt object from the one it replaced.

use std::sync::atomic::{AtomicBool, AtomicU64, AtomicUsize, Ordering};

use crate::desc::{BlendDesc, DepthStencilDesc, Filter, InputElement, RasterizerDesc, SamplerDesc};
use crate::device::{Device, DeviceError, ShaderSource, ShaderStage, TextureDesc};

#[derive(Debug)]
pub struct HeadlessShader {
	id: u64,
	stage: ShaderStage,
	entry_point: String,
	code: String,
	defines: Vec<(String, String)>,
}

impl HeadlessShader {
	pub fn id(&self) -> u64 {
		self.id
	}

	pub fn stage(&self) -> ShaderStage {
		self.stage
	}

	pub fn entry_point(&self) -> &str {
		&self.entry_point
	}

	pub fn code(&self) -> &str {
		&self.code
	}

	pub fn defines(&self) -> &[(String, String)] {
		&self.defines
	}
}

#[derive(Debug)]
pub struct HeadlessInputLayout {
	id: u64,
	elements: Vec<InputElement>,
}

impl HeadlessInputLayout {
	pub fn id(&self) -> u64 {
		self.id
	}

	pub fn elements(&self) -> &[InputElement] {
		&self.elements
	}

	/// Bytes per vertex in slot 0.
	pub fn stride(&self) -> u32 {
		self.elements
			.iter()
			.filter(|element| element.slot == 0)
			.map(|element| element.offset + element.format.size())
			.max()
			.unwrap_or(0)
	}
}

/// A fixed-function state object: the descriptor it was built from.
#[derive(Debug)]
pub struct HeadlessState<T> {
	id: u64,
	desc: T,
}

impl<T> HeadlessState<T> {
	pub fn id(&self) -> u64 {
		self.id
	}

	pub fn desc(&self) -> &T {
		&self.desc
	}
}

#[derive(Debug)]
pub struct HeadlessTexture {
	id: u64,
	desc: TextureDesc,
	data: Vec<u8>,
}

impl HeadlessTexture {
	pub fn id(&self) -> u64 {
		self.id
	}

	pub fn desc(&self) -> &TextureDesc {
		&self.desc
	}

	pub fn data(&self) -> &[u8] {
		&self.data
	}

	/// RGBA of pixel (x, y) in mip 0.
	pub fn pixel(&self, x: u32, y: u32) -> [u8; 4] {
		let offset = (y as usize * self.desc.width as usize + x as usize) * 4;
		let mut rgba = [0; 4];
		rgba.copy_from_slice(&self.data[offset..offset + 4]);
		rgba
	}
}

#[derive(Debug, Default)]
pub struct HeadlessDevice {
	next_id: AtomicU64,
	compiles: AtomicUsize,
	lost: AtomicBool,
}

impl HeadlessDevice {
	pub fn new() -> Self {
		Self::default()
	}

	/// Number of shader compilations attempted.
	pub fn compile_count(&self) -> usize {
		self.compiles.load(Ordering::Relaxed)
	}

	/// Number of objects created so far.
	pub fn object_count(&self) -> u64 {
		self.next_id.load(Ordering::Relaxed)
	}

	/// Make every creation call fail with [`DeviceError::DeviceLost`] until
	/// reset.
	pub fn set_lost(&self, lost: bool) {
		self.lost.store(lost, Ordering::Relaxed);
	}

	fn check_alive(&self) -> Result<(), DeviceError> {
		if self.lost.load(Ordering::Relaxed) {
			return Err(DeviceError::DeviceLost("headless device marked lost".into()));
		}
		Ok(())
	}

	fn allocate_id(&self) -> u64 {
		self.next_id.fetch_add(1, Ordering::Relaxed)
	}

	fn state<T>(&self, desc: T) -> Result<HeadlessState<T>, DeviceError> {
		self.check_alive()?;
		Ok(HeadlessState {
			id: self.allocate_id(),
			desc,
		})
	}
}

impl Device for HeadlessDevice {
	type Shader = HeadlessShader;
	type InputLayout = HeadlessInputLayout;
	type BlendState = HeadlessState<BlendDesc>;
	type DepthStencilState = HeadlessState<DepthStencilDesc>;
	type RasterizerState = HeadlessState<RasterizerDesc>;
	type SamplerState = HeadlessState<SamplerDesc>;
	type Texture = HeadlessTexture;

	fn compile_shader(&self, source: &ShaderSource<'_>) -> Result<HeadlessShader, DeviceError> {
		self.check_alive()?;
		self.compiles.fetch_add(1, Ordering::Relaxed);

		let fail = |message: String| DeviceError::Compile {
			name: source.name.to_string(),
			stage: source.stage,
			entry_point: source.entry_point.to_string(),
			message,
		};

		if let Some(line) = source.code.lines().map(str::trim).find(|line| line.starts_with("#error")) {
			return Err(fail(line.trim_start_matches("#error").trim().to_string()));
		}
		if !source.code.contains(&format!("{}(", source.entry_point)) {
			return Err(fail(format!("entry point `{}` not found", source.entry_point)));
		}

		Ok(HeadlessShader {
			id: self.allocate_id(),
			stage: source.stage,
			entry_point: source.entry_point.to_string(),
			code: source.code.to_string(),
			defines: source.defines.to_vec(),
		})
	}

	fn create_input_layout(
		&self,
		elements: &[InputElement],
		vertex_shader: &HeadlessShader,
	) -> Result<HeadlessInputLayout, DeviceError> {
		self.check_alive()?;

		if vertex_shader.stage != ShaderStage::Vertex {
			return Err(DeviceError::InputLayoutMismatch(format!(
				"`{}` is a {:?} shader",
				vertex_shader.entry_point, vertex_shader.stage
			)));
		}
		if let Some(missing) =
			elements.iter().find(|element| !vertex_shader.code.contains(element.semantic.as_str()))
		{
			return Err(DeviceError::InputLayoutMismatch(format!(
				"semantic `{}` is not consumed by `{}`",
				missing.semantic, vertex_shader.entry_point
			)));
		}

		Ok(HeadlessInputLayout {
			id: self.allocate_id(),
			elements: elements.to_vec(),
		})
	}

	fn create_blend_state(&self, desc: &BlendDesc) -> Result<HeadlessState<BlendDesc>, DeviceError> {
		if let Some(target) = desc.render_targets.iter().find(|target| target.write_mask > 0xf) {
			return Err(DeviceError::InvalidDescriptor {
				kind: "blend",
				reason: format!("write mask {:#x} has bits beyond RGBA", target.write_mask),
			});
		}
		self.state(*desc)
	}

	fn create_depth_stencil_state(
		&self,
		desc: &DepthStencilDesc,
	) -> Result<HeadlessState<DepthStencilDesc>, DeviceError> {
		self.state(*desc)
	}

	fn create_rasterizer_state(
		&self,
		desc: &RasterizerDesc,
	) -> Result<HeadlessState<RasterizerDesc>, DeviceError> {
		if !desc.depth_bias_clamp.is_finite() || !desc.slope_scaled_depth_bias.is_finite() {
			return Err(DeviceError::InvalidDescriptor {
				kind: "rasterizer",
				reason: "depth bias values must be finite".into(),
			});
		}
		self.state(*desc)
	}

	fn create_sampler_state(
		&self,
		desc: &SamplerDesc,
	) -> Result<HeadlessState<SamplerDesc>, DeviceError> {
		if desc.filter == Filter::Anisotropic && !(1..=16).contains(&desc.max_anisotropy) {
			return Err(DeviceError::InvalidDescriptor {
				kind: "sampler",
				reason: format!("max anisotropy {} outside 1..=16", desc.max_anisotropy),
			});
		}
		if desc.min_lod > desc.max_lod {
			return Err(DeviceError::InvalidDescriptor {
				kind: "sampler",
				reason: format!("min lod {} above max lod {}", desc.min_lod, desc.max_lod),
			});
		}
		self.state(*desc)
	}

	fn create_texture(&self, desc: &TextureDesc, data: &[u8]) -> Result<HeadlessTexture, DeviceError> {
		self.check_alive()?;

		let invalid = |reason: String| DeviceError::InvalidDescriptor {
			kind: "texture",
			reason,
		};
		if desc.width == 0 || desc.height == 0 {
			return Err(invalid(format!("empty extent {}x{}", desc.width, desc.height)));
		}
		let max_levels = 32 - desc.width.max(desc.height).leading_zeros();
		if desc.mip_levels == 0 || desc.mip_levels > max_levels {
			return Err(invalid(format!("{} mip levels outside 1..={max_levels}", desc.mip_levels)));
		}
		if data.len() != desc.data_len() {
			return Err(invalid(format!("expected {} bytes, got {}", desc.data_len(), data.len())));
		}

		Ok(HeadlessTexture {
			id: self.allocate_id(),
			desc: *desc,
			data: data.to_vec(),
		})
	}
}
