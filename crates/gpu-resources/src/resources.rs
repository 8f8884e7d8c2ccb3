use std::collections::BTreeSet;
use std::fmt;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use resource_cache::{ReloadReport, ResourceCache};
use tracing::{info, warn};

use crate::desc::SamplerDesc;
use crate::device::{Device, DeviceError};
use crate::pipeline::{PipelineCache, PipelineDesc, PipelineError, PipelineFactory, PipelineHandle};
use crate::shader::{ShaderCache, ShaderFactory, ShaderKey};
use crate::state::{
	BlendStateCache, DepthStencilStateCache, RasterizerStateCache, SamplerStateCache, StateFactory,
	StateHandle,
};
use crate::texture::{TextureCache, TextureError, TextureFactory, TextureHandle, TextureKey};
use crate::watcher::{ShaderWatcher, canonical};

/// Where the resource caches find their files.
///
/// # Example
///
/// ```
/// use gpu_resources::ResourceConfig;
///
/// let config = ResourceConfig::new("assets")
///     .with_shader_root("assets/shaders");
/// assert_eq!(config.texture_root(), std::path::Path::new("assets"));
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResourceConfig {
	shader_root: PathBuf,
	texture_root: PathBuf,
}

impl ResourceConfig {
	/// Look for shaders and textures under `root`.
	pub fn new(root: impl Into<PathBuf>) -> Self {
		let root = root.into();
		Self {
			shader_root: root.clone(),
			texture_root: root,
		}
	}

	pub fn with_shader_root(mut self, root: impl Into<PathBuf>) -> Self {
		self.shader_root = root.into();
		self
	}

	pub fn with_texture_root(mut self, root: impl Into<PathBuf>) -> Self {
		self.texture_root = root.into();
		self
	}

	pub fn shader_root(&self) -> &Path {
		&self.shader_root
	}

	pub fn texture_root(&self) -> &Path {
		&self.texture_root
	}
}

impl Default for ResourceConfig {
	/// Shaders and textures in the working directory.
	fn default() -> Self {
		Self::new(".")
	}
}

/// One key that kept its previous resource during a reload.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReloadFailure {
	pub cache: String,
	pub key: String,
	pub error: String,
}

impl fmt::Display for ReloadFailure {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		write!(f, "[{}] {}: {}", self.cache, self.key, self.error)
	}
}

/// Combined outcome of reloading several caches.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ReloadSummary {
	pub recreated: usize,
	pub failures: Vec<ReloadFailure>,
}

impl ReloadSummary {
	pub fn is_ok(&self) -> bool {
		self.failures.is_empty()
	}

	fn absorb<K: fmt::Debug, E: fmt::Display>(&mut self, cache: &str, report: ReloadReport<K, E>) {
		self.recreated += report.recreated().len();
		for (key, error) in report.into_failures() {
			self.failures.push(ReloadFailure {
				cache: cache.to_string(),
				key: format!("{key:?}"),
				error: error.to_string(),
			});
		}
	}

	fn log(&self, what: &str) {
		for failure in &self.failures {
			warn!(%failure, "reload kept previous resource");
		}
		info!(recreated = self.recreated, failed = self.failures.len(), "{what} reloaded");
	}
}

/// Every resource cache a renderer needs, wired together.
///
/// The pipeline cache holds handles from the shader and state caches, so it is
/// declared (and dropped) first.
pub struct GpuResources<D: Device> {
	pipelines: PipelineCache<D>,
	textures: TextureCache<D>,
	samplers: SamplerStateCache<D>,
	shaders: Arc<ShaderCache<D>>,
	blend: Arc<BlendStateCache<D>>,
	depth_stencil: Arc<DepthStencilStateCache<D>>,
	rasterizer: Arc<RasterizerStateCache<D>>,
	device: Arc<D>,
}

impl<D: Device> GpuResources<D> {
	pub fn new(device: Arc<D>, config: &ResourceConfig) -> Self {
		let shaders = Arc::new(
			ResourceCache::builder(ShaderFactory::new(Arc::clone(&device), &config.shader_root))
				.name("shaders")
				.build(),
		);
		let blend = Arc::new(
			ResourceCache::builder(StateFactory::new(Arc::clone(&device))).name("blend-states").build(),
		);
		let depth_stencil = Arc::new(
			ResourceCache::builder(StateFactory::new(Arc::clone(&device)))
				.name("depth-stencil-states")
				.build(),
		);
		let rasterizer = Arc::new(
			ResourceCache::builder(StateFactory::new(Arc::clone(&device)))
				.name("rasterizer-states")
				.build(),
		);
		let samplers =
			ResourceCache::builder(StateFactory::new(Arc::clone(&device))).name("samplers").build();
		let textures =
			ResourceCache::builder(TextureFactory::new(Arc::clone(&device), &config.texture_root))
				.name("textures")
				.build();
		let pipelines = ResourceCache::builder(PipelineFactory::new(
			Arc::clone(&device),
			Arc::clone(&shaders),
			Arc::clone(&blend),
			Arc::clone(&depth_stencil),
			Arc::clone(&rasterizer),
		))
		.name("pipelines")
		.build();

		Self {
			pipelines,
			textures,
			samplers,
			shaders,
			blend,
			depth_stencil,
			rasterizer,
			device,
		}
	}

	pub fn device(&self) -> &Arc<D> {
		&self.device
	}

	pub fn shaders(&self) -> &ShaderCache<D> {
		&self.shaders
	}

	pub fn pipelines(&self) -> &PipelineCache<D> {
		&self.pipelines
	}

	pub fn textures(&self) -> &TextureCache<D> {
		&self.textures
	}

	pub fn samplers(&self) -> &SamplerStateCache<D> {
		&self.samplers
	}

	pub fn blend_states(&self) -> &BlendStateCache<D> {
		&self.blend
	}

	pub fn depth_stencil_states(&self) -> &DepthStencilStateCache<D> {
		&self.depth_stencil
	}

	pub fn rasterizer_states(&self) -> &RasterizerStateCache<D> {
		&self.rasterizer
	}

	pub fn pipeline(&self, desc: &PipelineDesc) -> Result<PipelineHandle<D>, PipelineError> {
		self.pipelines.get(desc)
	}

	pub fn texture(&self, key: &TextureKey) -> Result<TextureHandle<D>, TextureError> {
		self.textures.get(key)
	}

	pub fn sampler(&self, desc: &SamplerDesc) -> Result<StateHandle<D, SamplerDesc>, DeviceError> {
		self.samplers.get(desc)
	}

	/// Recompile every cached shader, then rebuild pipelines so their input
	/// layouts match the new vertex shaders.
	pub fn reload_shaders(&self) -> ReloadSummary {
		let mut summary = ReloadSummary::default();
		let shaders = self.shaders.recreate_all();
		let reloaded: Vec<ShaderKey> = shaders.recreated().to_vec();
		summary.absorb("shaders", shaders);
		summary.absorb("pipelines", self.rebuild_pipelines_for(&reloaded));
		summary.log("shaders");
		summary
	}

	/// Reload only shaders compiled from one of `paths`.
	///
	/// Paths are compared after canonicalization, so the absolute paths
	/// reported by a [`ShaderWatcher`] match keys stored relative to the
	/// shader root.
	pub fn reload_paths(&self, paths: &BTreeSet<PathBuf>) -> ReloadSummary {
		let mut summary = ReloadSummary::default();
		if paths.is_empty() {
			return summary;
		}

		let factory = self.shaders.factory();
		let shaders =
			self.shaders.recreate_where(|key| paths.contains(&canonical(&factory.resolve(&key.path))));
		let reloaded: Vec<ShaderKey> = shaders.recreated().to_vec();
		summary.absorb("shaders", shaders);
		summary.absorb("pipelines", self.rebuild_pipelines_for(&reloaded));
		summary.log("changed shaders");
		summary
	}

	/// Drain `watcher` and reload whatever changed. Cheap when nothing did;
	/// meant to be called once per frame.
	pub fn reload_changed(&self, watcher: &ShaderWatcher) -> ReloadSummary {
		self.reload_paths(&watcher.changed_paths())
	}

	/// Rebuild everything: shaders, fixed-function states, pipelines, then
	/// textures. Failures are reported per key; working resources are kept.
	pub fn reload_all(&self) -> ReloadSummary {
		let mut summary = ReloadSummary::default();
		summary.absorb("shaders", self.shaders.recreate_all());
		summary.absorb("blend-states", self.blend.recreate_all());
		summary.absorb("depth-stencil-states", self.depth_stencil.recreate_all());
		summary.absorb("rasterizer-states", self.rasterizer.recreate_all());
		summary.absorb("samplers", self.samplers.recreate_all());
		summary.absorb("pipelines", self.pipelines.recreate_all());
		summary.absorb("textures", self.textures.recreate_all());
		summary.log("all resources");
		summary
	}

	/// Pipelines only need rebuilding when their vertex shader changed; pixel
	/// shader handles already follow the reload.
	fn rebuild_pipelines_for(
		&self,
		shaders: &[ShaderKey],
	) -> ReloadReport<PipelineDesc, PipelineError> {
		self.pipelines.recreate_where(|desc| shaders.contains(&desc.vertex_shader))
	}
}
