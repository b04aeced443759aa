//! Externally supplied scene state
//!
//! The host writes through an [`InputChannel`] whenever its data changes
//! (new satellite positions, a selection, a moved observer). The engine
//! reads the latest snapshot at the top of every frame, so writes take
//! effect on the next frame without restarting the loop.

use std::sync::Arc;

use parking_lot::{RwLock, RwLockReadGuard};
use tracing::info;

use crate::projection::ViewMode;
use crate::sgp4lib::{OrbitPath, VisualObject};
use crate::starlib::StarCatalog;
use crate::toposlib::ObserverLocation;

/// Everything the engine draws that it does not own.
#[derive(Debug, Clone, Default)]
pub struct SceneInputs {
    /// Current above-horizon objects, replaced wholesale
    pub objects: Vec<VisualObject>,
    pub selected_id: Option<String>,
    /// Future path of the selected object
    pub selected_path: Option<OrbitPath>,
    pub observer: Option<ObserverLocation>,
    pub view_mode: ViewMode,
    pub catalog: Option<Arc<StarCatalog>>,
}

/// Shared handle to [`SceneInputs`].
///
/// Cloning the channel shares the same state.
#[derive(Debug, Clone, Default)]
pub struct InputChannel {
    inner: Arc<RwLock<SceneInputs>>,
}

impl InputChannel {
    pub fn new() -> Self {
        Self::default()
    }

    /// Replace the visible object list.
    pub fn set_objects(&self, objects: Vec<VisualObject>) {
        self.inner.write().objects = objects;
    }

    /// Change the selection. The previous selection's path is dropped.
    pub fn set_selected(&self, id: Option<String>) {
        let mut inputs = self.inner.write();
        if inputs.selected_id != id {
            inputs.selected_path = None;
        }
        inputs.selected_id = id;
    }

    pub fn set_selected_path(&self, path: Option<OrbitPath>) {
        self.inner.write().selected_path = path;
    }

    /// Replace the observer wholesale.
    ///
    /// Objects computed for the previous observer are stale and cleared;
    /// the host is expected to publish a fresh list.
    pub fn set_observer(&self, observer: Option<ObserverLocation>) {
        let mut inputs = self.inner.write();
        if inputs.observer == observer {
            return;
        }
        match &observer {
            Some(o) => info!(observer = %o, "observer replaced"),
            None => info!("observer cleared"),
        }
        inputs.observer = observer;
        inputs.objects.clear();
        inputs.selected_path = None;
    }

    pub fn set_view_mode(&self, mode: ViewMode) {
        self.inner.write().view_mode = mode;
    }

    pub fn set_catalog(&self, catalog: Option<StarCatalog>) {
        self.inner.write().catalog = catalog.map(Arc::new);
    }

    /// Borrow the current inputs.
    ///
    /// The guard must be dropped before writing to the channel again.
    pub fn read(&self) -> RwLockReadGuard<'_, SceneInputs> {
        self.inner.read()
    }

    /// Owned copy of the current inputs.
    pub fn snapshot(&self) -> SceneInputs {
        self.inner.read().clone()
    }
}
