#![allow(dead_code)]

use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use gpu_resources::{GpuResources, HeadlessDevice, PipelineDesc, ResourceConfig, ShaderKey};
use tempfile::TempDir;

pub const SCENE_VS: &str = "float4 VSMain(float3 POSITION, float4 COLOR, float2 TEXCOORD) {}\n";
pub const SCENE_PS: &str = "float4 PSMain() { return 1; }\n";

/// A shader directory on disk plus the resources reading from it.
///
/// Field order matters: the resources drop before the directory they read.
pub struct Fixture {
	pub resources: GpuResources<HeadlessDevice>,
	pub device: Arc<HeadlessDevice>,
	pub dir: TempDir,
}

impl Fixture {
	pub fn new() -> Self {
		let dir = tempfile::tempdir().expect("tempdir");
		write(dir.path(), "scene_vs.hlsl", SCENE_VS);
		write(dir.path(), "scene_ps.hlsl", SCENE_PS);

		let device = Arc::new(HeadlessDevice::new());
		let resources = GpuResources::new(Arc::clone(&device), &ResourceConfig::new(dir.path()));
		Self {
			resources,
			device,
			dir,
		}
	}

	pub fn write(&self, name: &str, code: &str) {
		write(self.dir.path(), name, code);
	}

	pub fn path(&self, name: &str) -> PathBuf {
		self.dir.path().join(name).canonicalize().expect("shader exists")
	}
}

pub fn write(dir: &Path, name: &str, code: &str) {
	fs::write(dir.join(name), code).expect("write shader");
}

pub fn scene_pipeline() -> PipelineDesc {
	PipelineDesc::new(
		ShaderKey::vertex("scene_vs.hlsl"),
		ShaderKey::pixel("scene_ps.hlsl"),
		gpu_resources::position_color_uv_layout(),
	)
}
