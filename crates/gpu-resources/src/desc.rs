//! Fixed-function state descriptors and vertex input layout.
//!
//! Descriptors double as cache keys, so equal construction parameters must
//! hash and compare equal. Descriptors with float fields compare those fields
//! by bit pattern: `0.0` and `-0.0` are different keys, and a NaN bias is
//! equal to itself.

use std::hash::{Hash, Hasher};

/// Blend factor.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Blend {
	Zero,
	One,
	SrcColor,
	InvSrcColor,
	SrcAlpha,
	InvSrcAlpha,
	DestAlpha,
	InvDestAlpha,
	DestColor,
	InvDestColor,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum BlendOp {
	Add,
	Subtract,
	RevSubtract,
	Min,
	Max,
}

/// Blend settings for one render target.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct RenderTargetBlend {
	pub enable: bool,
	pub src: Blend,
	pub dest: Blend,
	pub op: BlendOp,
	pub src_alpha: Blend,
	pub dest_alpha: Blend,
	pub op_alpha: BlendOp,
	/// RGBA write mask, one bit per channel.
	pub write_mask: u8,
}

impl RenderTargetBlend {
	pub const OPAQUE: Self = Self {
		enable: false,
		src: Blend::One,
		dest: Blend::Zero,
		op: BlendOp::Add,
		src_alpha: Blend::One,
		dest_alpha: Blend::Zero,
		op_alpha: BlendOp::Add,
		write_mask: 0xf,
	};

	pub const ALPHA: Self = Self {
		enable: true,
		src: Blend::SrcAlpha,
		dest: Blend::InvSrcAlpha,
		op: BlendOp::Add,
		src_alpha: Blend::One,
		dest_alpha: Blend::InvSrcAlpha,
		op_alpha: BlendOp::Add,
		write_mask: 0xf,
	};
}

pub const MAX_RENDER_TARGETS: usize = 8;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct BlendDesc {
	pub alpha_to_coverage: bool,
	pub independent_blend: bool,
	pub render_targets: [RenderTargetBlend; MAX_RENDER_TARGETS],
}

impl BlendDesc {
	pub const OPAQUE: Self = Self {
		alpha_to_coverage: false,
		independent_blend: false,
		render_targets: [RenderTargetBlend::OPAQUE; MAX_RENDER_TARGETS],
	};

	pub const ALPHA: Self = Self {
		alpha_to_coverage: false,
		independent_blend: false,
		render_targets: [RenderTargetBlend::ALPHA; MAX_RENDER_TARGETS],
	};
}

impl Default for BlendDesc {
	fn default() -> Self {
		Self::OPAQUE
	}
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ComparisonFunc {
	Never,
	Less,
	Equal,
	LessEqual,
	Greater,
	NotEqual,
	GreaterEqual,
	Always,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct DepthStencilDesc {
	pub depth_enable: bool,
	pub depth_write: bool,
	pub depth_func: ComparisonFunc,
	pub stencil_enable: bool,
	pub stencil_read_mask: u8,
	pub stencil_write_mask: u8,
}

impl DepthStencilDesc {
	pub const DEPTH_LESS: Self = Self {
		depth_enable: true,
		depth_write: true,
		depth_func: ComparisonFunc::Less,
		stencil_enable: false,
		stencil_read_mask: 0xff,
		stencil_write_mask: 0xff,
	};

	/// Depth test against the buffer without writing to it.
	pub const DEPTH_READ: Self = Self {
		depth_write: false,
		..Self::DEPTH_LESS
	};

	pub const DISABLED: Self = Self {
		depth_enable: false,
		depth_write: false,
		depth_func: ComparisonFunc::Always,
		..Self::DEPTH_LESS
	};
}

impl Default for DepthStencilDesc {
	fn default() -> Self {
		Self::DEPTH_LESS
	}
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FillMode {
	Solid,
	Wireframe,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CullMode {
	None,
	Front,
	Back,
}

#[derive(Debug, Clone, Copy)]
pub struct RasterizerDesc {
	pub fill: FillMode,
	pub cull: CullMode,
	pub front_counter_clockwise: bool,
	pub depth_bias: i32,
	pub depth_bias_clamp: f32,
	pub slope_scaled_depth_bias: f32,
	pub depth_clip: bool,
	pub scissor: bool,
	pub multisample: bool,
	pub antialiased_line: bool,
}

impl RasterizerDesc {
	pub const CULL_BACK: Self = Self {
		fill: FillMode::Solid,
		cull: CullMode::Back,
		front_counter_clockwise: false,
		depth_bias: 0,
		depth_bias_clamp: 0.0,
		slope_scaled_depth_bias: 0.0,
		depth_clip: true,
		scissor: false,
		multisample: false,
		antialiased_line: false,
	};

	pub const CULL_NONE: Self = Self {
		cull: CullMode::None,
		..Self::CULL_BACK
	};

	pub const WIREFRAME: Self = Self {
		fill: FillMode::Wireframe,
		cull: CullMode::None,
		..Self::CULL_BACK
	};

	fn bits(&self) -> (FillMode, CullMode, [bool; 5], i32, u32, u32) {
		(
			self.fill,
			self.cull,
			[
				self.front_counter_clockwise,
				self.depth_clip,
				self.scissor,
				self.multisample,
				self.antialiased_line,
			],
			self.depth_bias,
			self.depth_bias_clamp.to_bits(),
			self.slope_scaled_depth_bias.to_bits(),
		)
	}
}

impl Default for RasterizerDesc {
	fn default() -> Self {
		Self::CULL_BACK
	}
}

impl PartialEq for RasterizerDesc {
	fn eq(&self, other: &Self) -> bool {
		self.bits() == other.bits()
	}
}

impl Eq for RasterizerDesc {}

impl Hash for RasterizerDesc {
	fn hash<H: Hasher>(&self, state: &mut H) {
		self.bits().hash(state);
	}
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Filter {
	Point,
	Linear,
	Anisotropic,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum AddressMode {
	Wrap,
	Mirror,
	Clamp,
	Border,
}

#[derive(Debug, Clone, Copy)]
pub struct SamplerDesc {
	pub filter: Filter,
	pub address_u: AddressMode,
	pub address_v: AddressMode,
	pub address_w: AddressMode,
	pub mip_lod_bias: f32,
	pub max_anisotropy: u32,
	pub comparison: ComparisonFunc,
	pub border_color: [f32; 4],
	pub min_lod: f32,
	pub max_lod: f32,
}

impl SamplerDesc {
	pub const LINEAR_WRAP: Self = Self {
		filter: Filter::Linear,
		address_u: AddressMode::Wrap,
		address_v: AddressMode::Wrap,
		address_w: AddressMode::Wrap,
		mip_lod_bias: 0.0,
		max_anisotropy: 1,
		comparison: ComparisonFunc::Never,
		border_color: [0.0; 4],
		min_lod: 0.0,
		max_lod: f32::MAX,
	};

	pub const ANISOTROPIC_WRAP: Self = Self {
		filter: Filter::Anisotropic,
		max_anisotropy: 8,
		..Self::LINEAR_WRAP
	};

	pub const POINT_CLAMP: Self = Self {
		filter: Filter::Point,
		address_u: AddressMode::Clamp,
		address_v: AddressMode::Clamp,
		address_w: AddressMode::Clamp,
		..Self::LINEAR_WRAP
	};

	fn bits(&self) -> (Filter, [AddressMode; 3], u32, ComparisonFunc, [u32; 7]) {
		let [r, g, b, a] = self.border_color.map(f32::to_bits);
		(
			self.filter,
			[self.address_u, self.address_v, self.address_w],
			self.max_anisotropy,
			self.comparison,
			[
				self.mip_lod_bias.to_bits(),
				r,
				g,
				b,
				a,
				self.min_lod.to_bits(),
				self.max_lod.to_bits(),
			],
		)
	}
}

impl Default for SamplerDesc {
	fn default() -> Self {
		Self::LINEAR_WRAP
	}
}

impl PartialEq for SamplerDesc {
	fn eq(&self, other: &Self) -> bool {
		self.bits() == other.bits()
	}
}

impl Eq for SamplerDesc {}

impl Hash for SamplerDesc {
	fn hash<H: Hasher>(&self, state: &mut H) {
		self.bits().hash(state);
	}
}

/// Format of one vertex attribute.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum VertexFormat {
	Float32x2,
	Float32x3,
	Float32x4,
	Unorm8x4,
}

impl VertexFormat {
	pub fn size(self) -> u32 {
		match self {
			Self::Float32x2 => 8,
			Self::Float32x3 => 12,
			Self::Float32x4 => 16,
			Self::Unorm8x4 => 4,
		}
	}
}

/// One vertex attribute in an input layout.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct InputElement {
	pub semantic: String,
	pub semantic_index: u32,
	pub format: VertexFormat,
	pub slot: u32,
	pub offset: u32,
}

impl InputElement {
	pub fn new(semantic: impl Into<String>, format: VertexFormat, offset: u32) -> Self {
		Self {
			semantic: semantic.into(),
			semantic_index: 0,
			format,
			slot: 0,
			offset,
		}
	}
}

/// Position, color, texcoord: the layout of the scene's textured meshes.
pub fn position_color_uv_layout() -> Vec<InputElement> {
	vec![
		InputElement::new("POSITION", VertexFormat::Float32x3, 0),
		InputElement::new("COLOR", VertexFormat::Unorm8x4, 12),
		InputElement::new("TEXCOORD", VertexFormat::Float32x2, 16),
	]
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum Topology {
	#[default]
	TriangleList,
	TriangleStrip,
	LineList,
	PointList,
}
