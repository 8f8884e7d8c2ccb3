//! Edit a shader while "frames" render and watch the pipeline pick it up.
//!
//! Run with `RUST_LOG=debug` to see every cache event.

use std::fs;
use std::sync::Arc;
use std::time::Duration;

use gpu_resources::{
	GpuResources, HeadlessDevice, PipelineDesc, ResourceConfig, ShaderKey, ShaderWatcher,
	position_color_uv_layout,
};
use tracing_subscriber::EnvFilter;

const VERTEX: &str = "float4 VSMain(float3 POSITION, float4 COLOR, float2 TEXCOORD) {}\n";

fn main() -> Result<(), Box<dyn std::error::Error>> {
	tracing_subscriber::fmt()
		.with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
		.init();

	let dir = tempfile::tempdir()?;
	fs::write(dir.path().join("scene_vs.hlsl"), VERTEX)?;
	fs::write(dir.path().join("scene_ps.hlsl"), "float4 PSMain() { return RED; }\n")?;

	let resources =
		GpuResources::new(Arc::new(HeadlessDevice::new()), &ResourceConfig::new(dir.path()));
	let watcher = ShaderWatcher::new(dir.path())?;

	let pipeline = resources.pipeline(&PipelineDesc::new(
		ShaderKey::vertex("scene_vs.hlsl"),
		ShaderKey::pixel("scene_ps.hlsl"),
		position_color_uv_layout(),
	))?;

	let edits = [
		(2, "float4 PSMain() { return GREEN; }\n"),
		(4, "#error forgot the return value\nfloat4 PSMain() {}\n"),
		(6, "float4 PSMain() { return BLUE; }\n"),
	];

	for frame in 0..8 {
		if let Some((_, code)) = edits.iter().find(|(at, _)| *at == frame) {
			fs::write(dir.path().join("scene_ps.hlsl"), code)?;
			std::thread::sleep(Duration::from_millis(100));
		}

		let summary = resources.reload_changed(&watcher);
		for failure in &summary.failures {
			println!("frame {frame}: kept previous shader, {failure}");
		}

		let state = pipeline.get();
		let pixel = state.pixel_shader.get();
		println!("frame {frame}: pixel shader #{} `{}`", pixel.id(), pixel.code().trim());
	}

	let metrics = resources.shaders().metrics();
	println!(
		"shaders: {} built, {} reloads, {} failed reloads",
		metrics.creations, metrics.recreations, metrics.recreate_failures
	);

	drop(pipeline);
	Ok(())
}
