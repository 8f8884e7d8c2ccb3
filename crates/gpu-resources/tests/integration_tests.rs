mod common;

use std::collections::BTreeSet;
use std::sync::Arc;
use std::time::{Duration, Instant};

use common::{Fixture, SCENE_PS, SCENE_VS, scene_pipeline};
use gpu_resources::{
	BlendDesc, Device, DeviceError, PipelineDesc, PipelineError, SamplerDesc, ShaderError, ShaderKey,
	ShaderWatcher, TextureKey,
};

#[test]
fn test_pipeline_shares_shaders_and_states() {
	let fixture = Fixture::new();
	let opaque = fixture.resources.pipeline(&scene_pipeline()).expect("valid pipeline");
	let blended = fixture
		.resources
		.pipeline(&PipelineDesc {
			blend: BlendDesc::ALPHA,
			..scene_pipeline()
		})
		.expect("valid pipeline");

	let (a, b) = (opaque.get(), blended.get());
	assert!(Arc::ptr_eq(&a.vertex_shader, &b.vertex_shader));
	assert_eq!(a.vertex_shader_key(), &ShaderKey::vertex("scene_vs.hlsl"));
	assert!(a.pixel_shader.same_entry(&b.pixel_shader));
	assert!(a.depth_stencil.same_entry(&b.depth_stencil));
	assert!(!a.blend.same_entry(&b.blend));

	assert_eq!(fixture.resources.shaders().len(), 2);
	assert_eq!(fixture.resources.pipelines().len(), 2);
	assert_eq!(fixture.resources.blend_states().len(), 2);
	assert_eq!(fixture.device.compile_count(), 2);
}

#[test]
fn test_same_pipeline_desc_is_built_once() {
	let fixture = Fixture::new();
	let first = fixture.resources.pipeline(&scene_pipeline()).expect("valid pipeline");
	let second = fixture.resources.pipeline(&scene_pipeline()).expect("valid pipeline");

	assert!(first.same_entry(&second));
	assert_eq!(fixture.resources.pipelines().live_handles(&scene_pipeline()), 2);
	assert_eq!(fixture.resources.pipelines().metrics().hits, 1);
}

#[test]
fn test_pixel_shader_reload_reaches_pipeline_without_rebuild() {
	let fixture = Fixture::new();
	let pipeline = fixture.resources.pipeline(&scene_pipeline()).expect("valid pipeline");
	let before = pipeline.get().pixel_shader.get().id();

	fixture.write("scene_ps.hlsl", "float4 PSMain() { return 0.5; }\n");
	let summary = fixture.resources.reload_paths(&BTreeSet::from([fixture.path("scene_ps.hlsl")]));

	assert!(summary.is_ok(), "{summary:?}");
	assert_eq!(summary.recreated, 1);
	assert_eq!(pipeline.generation(), 0);

	let state = pipeline.get();
	assert_ne!(state.pixel_shader.get().id(), before);
	assert!(state.pixel_shader.get().code().contains("0.5"));
}

#[test]
fn test_vertex_shader_reload_rebuilds_pipeline() {
	let fixture = Fixture::new();
	let pipeline = fixture.resources.pipeline(&scene_pipeline()).expect("valid pipeline");
	let layout = pipeline.get().input_layout.id();

	fixture.write("scene_vs.hlsl", &format!("// tweaked\n{SCENE_VS}"));
	let summary = fixture.resources.reload_paths(&BTreeSet::from([fixture.path("scene_vs.hlsl")]));

	assert!(summary.is_ok(), "{summary:?}");
	assert_eq!(summary.recreated, 2);
	assert_eq!(pipeline.generation(), 1);
	assert_ne!(pipeline.get().input_layout.id(), layout);
	assert!(pipeline.get().vertex_shader.code().starts_with("// tweaked"));
}

#[test]
fn test_failed_compile_keeps_working_shader() {
	let fixture = Fixture::new();
	let pipeline = fixture.resources.pipeline(&scene_pipeline()).expect("valid pipeline");
	let before = pipeline.get().pixel_shader.get().id();

	fixture.write("scene_ps.hlsl", "#error missing semicolon\nfloat4 PSMain() {}\n");
	let summary = fixture.resources.reload_shaders();

	assert_eq!(summary.failures.len(), 1);
	assert_eq!(summary.failures[0].cache, "shaders");
	assert!(summary.failures[0].error.contains("missing semicolon"));
	assert_eq!(pipeline.get().pixel_shader.get().id(), before);

	fixture.write("scene_ps.hlsl", SCENE_PS);
	assert!(fixture.resources.reload_shaders().is_ok());
	assert_ne!(pipeline.get().pixel_shader.get().id(), before);
}

#[test]
fn test_layout_mismatch_keeps_previous_pipeline() {
	let fixture = Fixture::new();
	let pipeline = fixture.resources.pipeline(&scene_pipeline()).expect("valid pipeline");
	let layout = pipeline.get().input_layout.id();
	let vertex = pipeline.get().vertex_shader.id();

	// Compiles, but no longer consumes TEXCOORD.
	fixture.write("scene_vs.hlsl", "float4 VSMain(float3 POSITION, float4 COLOR) {}\n");
	let summary = fixture.resources.reload_shaders();

	assert_eq!(summary.recreated, 2);
	assert_eq!(summary.failures.len(), 1);
	assert_eq!(summary.failures[0].cache, "pipelines");
	assert!(summary.failures[0].error.contains("TEXCOORD"));
	assert_eq!(pipeline.generation(), 0);

	// The pipeline keeps the layout and the vertex shader it was checked against.
	let state = pipeline.get();
	assert_eq!(state.input_layout.id(), layout);
	assert_eq!(state.vertex_shader.id(), vertex);
	assert!(state.vertex_shader.code().contains("TEXCOORD"));
	fixture
		.device
		.create_input_layout(state.input_layout.elements(), &state.vertex_shader)
		.expect("layout still matches the bound vertex shader");

	// The shader cache itself moved on to the new source.
	let cached = fixture.resources.shaders().get(&ShaderKey::vertex("scene_vs.hlsl")).expect("compiles");
	assert!(!cached.get().code().contains("TEXCOORD"));
}

#[test]
fn test_missing_shader_file_is_not_cached() {
	let fixture = Fixture::new();
	let desc = PipelineDesc::new(
		ShaderKey::vertex("scene_vs.hlsl"),
		ShaderKey::pixel("missing.hlsl"),
		gpu_resources::position_color_uv_layout(),
	);

	let err = fixture.resources.pipeline(&desc).err().expect("pixel shader is missing");
	assert!(matches!(err, PipelineError::PixelShader(ShaderError::Read { .. })));
	assert!(!fixture.resources.pipelines().contains(&desc));
	assert!(fixture.resources.shaders().contains(&ShaderKey::vertex("scene_vs.hlsl")));
}

#[test]
fn test_defines_select_distinct_shaders() {
	let fixture = Fixture::new();
	let shaders = fixture.resources.shaders();
	let plain = shaders.get(&ShaderKey::pixel("scene_ps.hlsl")).expect("compiles");
	let fogged =
		shaders.get(&ShaderKey::pixel("scene_ps.hlsl").with_define("FOG", "1")).expect("compiles");

	assert!(!plain.same_entry(&fogged));
	assert_eq!(fogged.get().defines(), &[("FOG".to_string(), "1".to_string())]);
}

#[test]
fn test_reload_all_covers_every_cache() {
	let fixture = Fixture::new();
	let pipeline = fixture.resources.pipeline(&scene_pipeline()).expect("valid pipeline");
	let sampler = fixture.resources.sampler(&SamplerDesc::ANISOTROPIC_WRAP).expect("valid sampler");
	let texture = fixture
		.resources
		.texture(&TextureKey::Checkerboard {
			size: 8,
			cell: 2,
			dark: [0, 0, 0, 255],
			light: [255, 255, 255, 255],
		})
		.expect("valid texture");
	let texture_id = texture.get().id();

	let summary = fixture.resources.reload_all();

	// 2 shaders, blend, depth-stencil, rasterizer, sampler, pipeline, texture
	assert!(summary.is_ok(), "{summary:?}");
	assert_eq!(summary.recreated, 8);
	assert_eq!(pipeline.generation(), 1);
	assert_eq!(sampler.generation(), 1);
	assert_ne!(texture.get().id(), texture_id);
	assert_eq!(texture.get().pixel(0, 0), [255, 255, 255, 255]);
}

#[test]
fn test_lost_device_reload_keeps_everything() {
	let fixture = Fixture::new();
	let pipeline = fixture.resources.pipeline(&scene_pipeline()).expect("valid pipeline");
	let vertex = pipeline.get().vertex_shader.id();

	fixture.device.set_lost(true);
	let summary = fixture.resources.reload_all();
	fixture.device.set_lost(false);

	assert_eq!(summary.recreated, 0);
	assert_eq!(summary.failures.len(), 6);
	assert_eq!(pipeline.get().vertex_shader.id(), vertex);

	assert!(matches!(
		fixture.resources.sampler(&SamplerDesc {
			max_anisotropy: 0,
			..SamplerDesc::ANISOTROPIC_WRAP
		}),
		Err(DeviceError::InvalidDescriptor { kind: "sampler", .. })
	));
}

#[test]
fn test_reload_changed_follows_file_watcher() {
	let fixture = Fixture::new();
	let watcher = ShaderWatcher::new(fixture.dir.path()).expect("watch shader dir");
	let pipeline = fixture.resources.pipeline(&scene_pipeline()).expect("valid pipeline");
	let before = pipeline.get().pixel_shader.get().id();

	assert_eq!(fixture.resources.reload_changed(&watcher).recreated, 0);

	fixture.write("scene_ps.hlsl", "float4 PSMain() { return 0.25; }\n");
	let deadline = Instant::now() + Duration::from_secs(5);
	let mut recreated = 0;
	while recreated == 0 && Instant::now() < deadline {
		recreated = fixture.resources.reload_changed(&watcher).recreated;
		std::thread::sleep(Duration::from_millis(20));
	}

	assert_eq!(recreated, 1);
	assert_ne!(pipeline.get().pixel_shader.get().id(), before);
}
