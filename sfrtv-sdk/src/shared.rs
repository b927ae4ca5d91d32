//! Thread-safe handle around a device

use std::sync::Arc;

use parking_lot::Mutex;
use sfrtv_api::{Connector, TcpConnector};

use crate::device::{Operation, SfrTvDevice};
use crate::state::DeviceState;

/// Cloneable handle that serializes access to one [`SfrTvDevice`]
///
/// A host may poll and issue commands from different threads; the mutex
/// guarantees only one command round trip runs at a time. State reads wait
/// for any round trip in flight.
pub struct SharedDevice<C: Connector + Clone = TcpConnector> {
    inner: Arc<Mutex<SfrTvDevice<C>>>,
}

impl<C: Connector + Clone> Clone for SharedDevice<C> {
    fn clone(&self) -> Self {
        Self {
            inner: Arc::clone(&self.inner),
        }
    }
}

impl<C: Connector + Clone> SharedDevice<C> {
    pub fn new(device: SfrTvDevice<C>) -> Self {
        Self {
            inner: Arc::new(Mutex::new(device)),
        }
    }

    pub fn name(&self) -> String {
        self.inner.lock().name().to_string()
    }

    pub fn state(&self) -> DeviceState {
        self.inner.lock().state()
    }

    pub fn issue(&self, operation: Operation) {
        self.inner.lock().issue(operation);
    }

    pub fn refresh(&self) {
        self.inner.lock().refresh();
    }

    /// Run `f` with exclusive access to the device
    pub fn with_device<R>(&self, f: impl FnOnce(&mut SfrTvDevice<C>) -> R) -> R {
        f(&mut self.inner.lock())
    }
}
