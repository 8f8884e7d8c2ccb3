use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::{fs, io};

use parking_lot::Mutex;
use resource_cache::{Handle, ResourceCache, ResourceFactory};

use crate::device::{Device, DeviceError, TextureDesc, TextureFormat};

/// Largest width or height a generated texture may have.
pub const MAX_TEXTURE_SIZE: u32 = 16384;

/// Identifies a texture by how its pixels are produced.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum TextureKey {
	/// Tightly packed RGBA8 file, mip 0 only, relative to the texture root.
	Raw {
		path: PathBuf,
		width: u32,
		height: u32,
		srgb: bool,
	},
	/// Square checkerboard of `cell`-pixel squares with a full mip chain.
	Checkerboard {
		size: u32,
		cell: u32,
		dark: [u8; 4],
		light: [u8; 4],
	},
	/// 1x1 texture of one color.
	Solid([u8; 4]),
}

#[derive(Debug, thiserror::Error)]
pub enum TextureError {
	#[error("failed to read texture `{}`", .path.display())]
	Read {
		path: PathBuf,
		#[source]
		source: io::Error,
	},

	#[error("texture `{}` holds {actual} bytes, {expected} expected", .path.display())]
	SizeMismatch {
		path: PathBuf,
		expected: usize,
		actual: usize,
	},

	#[error("invalid checkerboard: {0}")]
	InvalidPattern(String),

	#[error(transparent)]
	Device(#[from] DeviceError),
}

/// Loads and generates textures.
///
/// Generated pixels go through a scratch buffer owned by the factory and
/// reused for every build, so repeated reloads do not reallocate.
pub struct TextureFactory<D> {
	device: Arc<D>,
	root: PathBuf,
	scratch: Mutex<Vec<u8>>,
}

impl<D: Device> TextureFactory<D> {
	pub fn new(device: Arc<D>, root: impl Into<PathBuf>) -> Self {
		Self {
			device,
			root: root.into(),
			scratch: Mutex::new(Vec::new()),
		}
	}

	pub fn root(&self) -> &Path {
		&self.root
	}

	/// Capacity of the scratch buffer, for diagnostics.
	pub fn scratch_capacity(&self) -> usize {
		self.scratch.lock().capacity()
	}

	fn load_raw(&self, path: &Path, desc: &TextureDesc) -> Result<D::Texture, TextureError> {
		let path = self.root.join(path);
		let data = fs::read(&path).map_err(|source| TextureError::Read {
			path: path.clone(),
			source,
		})?;
		if data.len() != desc.data_len() {
			return Err(TextureError::SizeMismatch {
				path,
				expected: desc.data_len(),
				actual: data.len(),
			});
		}
		Ok(self.device.create_texture(desc, &data)?)
	}
}

impl<D: Device> ResourceFactory for TextureFactory<D> {
	type Key = TextureKey;
	type Resource = D::Texture;
	type Error = TextureError;

	fn create(&self, key: &TextureKey) -> Result<D::Texture, TextureError> {
		match key {
			TextureKey::Raw {
				path,
				width,
				height,
				srgb,
			} => {
				let desc = TextureDesc {
					width: *width,
					height: *height,
					mip_levels: 1,
					format: if *srgb { TextureFormat::Rgba8UnormSrgb } else { TextureFormat::Rgba8Unorm },
				};
				self.load_raw(path, &desc)
			}
			TextureKey::Checkerboard {
				size,
				cell,
				dark,
				light,
			} => {
				if *size == 0 || *cell == 0 {
					return Err(TextureError::InvalidPattern(format!("size {size}, cell {cell}")));
				}
				if *size > MAX_TEXTURE_SIZE {
					return Err(TextureError::InvalidPattern(format!(
						"size {size} exceeds {MAX_TEXTURE_SIZE}"
					)));
				}
				let desc = TextureDesc {
					width: *size,
					height: *size,
					mip_levels: 32 - size.leading_zeros(),
					format: TextureFormat::Rgba8UnormSrgb,
				};

				let mut scratch = self.scratch.lock();
				scratch.clear();
				fill_checkerboard(&mut scratch, *size, *cell, *dark, *light);
				append_mip_chain(&mut scratch, &desc);
				Ok(self.device.create_texture(&desc, &scratch)?)
			}
			TextureKey::Solid(color) => {
				let desc = TextureDesc {
					width: 1,
					height: 1,
					mip_levels: 1,
					format: TextureFormat::Rgba8UnormSrgb,
				};
				Ok(self.device.create_texture(&desc, color)?)
			}
		}
	}
}

fn fill_checkerboard(out: &mut Vec<u8>, size: u32, cell: u32, dark: [u8; 4], light: [u8; 4]) {
	for y in 0..size {
		for x in 0..size {
			let color = if (x / cell + y / cell) % 2 == 0 { light } else { dark };
			out.extend_from_slice(&color);
		}
	}
}

/// Append levels 1.. to `out`, which holds level 0, by 2x2 box filtering.
fn append_mip_chain(out: &mut Vec<u8>, desc: &TextureDesc) {
	let mut src_start = 0;
	for level in 1..desc.mip_levels {
		let (src_w, src_h) = desc.level_size(level - 1);
		let (dst_w, dst_h) = desc.level_size(level);
		let dst_start = out.len();

		for y in 0..dst_h {
			for x in 0..dst_w {
				let mut sum = [0u32; 4];
				let taps = [(2 * x, 2 * y), (2 * x + 1, 2 * y), (2 * x, 2 * y + 1), (2 * x + 1, 2 * y + 1)];
				for (sx, sy) in taps {
					let (sx, sy) = (sx.min(src_w - 1), sy.min(src_h - 1));
					let offset = src_start + (sy * src_w + sx) as usize * 4;
					for (channel, total) in sum.iter_mut().enumerate() {
						*total += u32::from(out[offset + channel]);
					}
				}
				for total in sum {
					out.push(((total + 2) / 4) as u8);
				}
			}
		}
		src_start = dst_start;
	}
}

pub type TextureCache<D> = ResourceCache<TextureFactory<D>>;
pub type TextureHandle<D> = Handle<TextureFactory<D>>;
