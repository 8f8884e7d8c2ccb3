use std::marker::PhantomData;
use std::sync::Arc;

use resource_cache::{Handle, ResourceCache, ResourceFactory, ResourceKey};

use crate::desc::{BlendDesc, DepthStencilDesc, RasterizerDesc, SamplerDesc};
use crate::device::{Device, DeviceError};

/// A descriptor that a device can turn into a fixed-function state object.
pub trait StateDescriptor<D: Device>: ResourceKey {
	type Object: Send + Sync + 'static;

	fn build(&self, device: &D) -> Result<Self::Object, DeviceError>;
}

impl<D: Device> StateDescriptor<D> for BlendDesc {
	type Object = D::BlendState;

	fn build(&self, device: &D) -> Result<Self::Object, DeviceError> {
		device.create_blend_state(self)
	}
}

impl<D: Device> StateDescriptor<D> for DepthStencilDesc {
	type Object = D::DepthStencilState;

	fn build(&self, device: &D) -> Result<Self::Object, DeviceError> {
		device.create_depth_stencil_state(self)
	}
}

impl<D: Device> StateDescriptor<D> for RasterizerDesc {
	type Object = D::RasterizerState;

	fn build(&self, device: &D) -> Result<Self::Object, DeviceError> {
		device.create_rasterizer_state(self)
	}
}

impl<D: Device> StateDescriptor<D> for SamplerDesc {
	type Object = D::SamplerState;

	fn build(&self, device: &D) -> Result<Self::Object, DeviceError> {
		device.create_sampler_state(self)
	}
}

/// Builds state objects of kind `S` on the device.
pub struct StateFactory<D, S> {
	device: Arc<D>,
	marker: PhantomData<fn() -> S>,
}

impl<D: Device, S: StateDescriptor<D>> StateFactory<D, S> {
	pub fn new(device: Arc<D>) -> Self {
		Self {
			device,
			marker: PhantomData,
		}
	}
}

impl<D: Device, S: StateDescriptor<D>> ResourceFactory for StateFactory<D, S> {
	type Key = S;
	type Resource = S::Object;
	type Error = DeviceError;

	fn create(&self, key: &S) -> Result<S::Object, DeviceError> {
		key.build(&self.device)
	}
}

pub type StateCache<D, S> = ResourceCache<StateFactory<D, S>>;
pub type StateHandle<D, S> = Handle<StateFactory<D, S>>;

pub type BlendStateCache<D> = StateCache<D, BlendDesc>;
pub type DepthStencilStateCache<D> = StateCache<D, DepthStencilDesc>;
pub type RasterizerStateCache<D> = StateCache<D, RasterizerDesc>;
pub type SamplerStateCache<D> = StateCache<D, SamplerDesc>;
