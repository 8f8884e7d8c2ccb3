use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::{fs, io};

use resource_cache::hash::hash_bytes;
use resource_cache::{Handle, ResourceCache, ResourceFactory};
use tracing::debug;

use crate::device::{Device, DeviceError, ShaderSource, ShaderStage};

/// Identifies one compiled shader: file, stage, entry point and defines.
///
/// The same file compiled with a different entry point or define set is a
/// different shader.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ShaderKey {
	/// Path relative to the shader root.
	pub path: PathBuf,
	pub stage: ShaderStage,
	pub entry_point: String,
	pub defines: Vec<(String, String)>,
}

impl ShaderKey {
	pub fn new(path: impl Into<PathBuf>, stage: ShaderStage, entry_point: impl Into<String>) -> Self {
		Self {
			path: path.into(),
			stage,
			entry_point: entry_point.into(),
			defines: Vec::new(),
		}
	}

	/// Vertex shader with the `VSMain` entry point.
	pub fn vertex(path: impl Into<PathBuf>) -> Self {
		Self::new(path, ShaderStage::Vertex, "VSMain")
	}

	/// Pixel shader with the `PSMain` entry point.
	pub fn pixel(path: impl Into<PathBuf>) -> Self {
		Self::new(path, ShaderStage::Pixel, "PSMain")
	}

	pub fn with_define(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
		self.defines.push((name.into(), value.into()));
		self
	}
}

#[derive(Debug, thiserror::Error)]
pub enum ShaderError {
	#[error("failed to read shader `{}`", .path.display())]
	Read {
		path: PathBuf,
		#[source]
		source: io::Error,
	},

	#[error(transparent)]
	Device(#[from] DeviceError),
}

/// Reads shader files under a root directory and compiles them on the device.
pub struct ShaderFactory<D> {
	device: Arc<D>,
	root: PathBuf,
}

impl<D: Device> ShaderFactory<D> {
	pub fn new(device: Arc<D>, root: impl Into<PathBuf>) -> Self {
		Self {
			device,
			root: root.into(),
		}
	}

	pub fn root(&self) -> &Path {
		&self.root
	}

	/// On-disk location of a shader key's file.
	pub fn resolve(&self, path: &Path) -> PathBuf {
		self.root.join(path)
	}
}

impl<D: Device> ResourceFactory for ShaderFactory<D> {
	type Key = ShaderKey;
	type Resource = D::Shader;
	type Error = ShaderError;

	fn create(&self, key: &ShaderKey) -> Result<D::Shader, ShaderError> {
		let path = self.resolve(&key.path);
		let code = fs::read_to_string(&path).map_err(|source| ShaderError::Read {
			path: path.clone(),
			source,
		})?;

		let name = path.display().to_string();
		let shader = self.device.compile_shader(&ShaderSource {
			name: &name,
			code: &code,
			entry_point: &key.entry_point,
			stage: key.stage,
			defines: &key.defines,
		})?;

		debug!(
			path = %name,
			entry_point = %key.entry_point,
			profile = key.stage.profile(),
			source_hash = hash_bytes(code.as_bytes()),
			"compiled shader"
		);
		Ok(shader)
	}
}

pub type ShaderCache<D> = ResourceCache<ShaderFactory<D>>;
pub type ShaderHandle<D> = Handle<ShaderFactory<D>>;
