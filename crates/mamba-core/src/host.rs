use std::any::Any;

use anyhow::Result;

use crate::module::{ContainerId, ContentRef, InstanceId};

/// Instantiation collaborator used by the [`ModuleRegistry`](crate::registry::ModuleRegistry).
///
/// The registry calls [`instantiate`](ContentHost::instantiate) exactly once
/// per activation and [`destroy`](ContentHost::destroy) exactly once per
/// deactivation, and never holds more than one live instance.
pub trait ContentHost {
    /// Create a live instance of `content` under `container`.
    fn instantiate(&mut self, content: &ContentRef, container: &ContainerId) -> Result<InstanceId>;

    /// Tear down an instance previously returned by `instantiate`.
    fn destroy(&mut self, instance: InstanceId);

    /// Return `self` as `&dyn Any` so the app can reach the concrete host
    /// (e.g. to render the scene it manages).
    fn as_any(&self) -> &dyn Any;

    fn as_any_mut(&mut self) -> &mut dyn Any;
}
