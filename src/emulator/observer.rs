use std::fmt;
use std::sync::Arc;

use super::io::InputRequest;
use super::memory::Memory;
use super::parse::AssemblyError;
use super::registers::Register;

/// Listener for everything a front end would want to redraw.
///
/// All methods are called synchronously from inside the emulator and must not
/// call back into it. Every method has an empty default so an observer only
/// implements what it shows.
pub trait Observer: Send + Sync {
    fn memory_updated(&self, _memory: &Memory) {}

    fn register_updated(&self, _register: Register, _value: u8) {}

    /// The output latch changed, `value` is already sign-decoded
    fn output_updated(&self, _value: i8) {}

    fn syntax_error(&self, _error: &AssemblyError) {}

    /// `IN 00` wants a value. Answer with [`crate::emulator::Emulator::deliver_input`].
    fn input_requested(&self, _request: InputRequest) {}
}

/// Optional shared observer held by each component.
#[derive(Clone, Default)]
pub struct ObserverHandle(Option<Arc<dyn Observer>>);

impl ObserverHandle {
    pub fn new(observer: Arc<dyn Observer>) -> Self {
        Self(Some(observer))
    }

    pub fn notify(&self, f: impl FnOnce(&dyn Observer)) {
        if let Some(observer) = &self.0 {
            f(observer.as_ref());
        }
    }
}

impl fmt::Debug for ObserverHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.0 {
            Some(_) => write!(f, "ObserverHandle(set)"),
            None => write!(f, "ObserverHandle(none)"),
        }
    }
}
