use std::time::Instant;

/// Scope guard that traces how long a block took.
pub struct FunctionTimer {
    name: &'static str,
    start: Instant,
}

impl FunctionTimer {
    pub fn new(name: &'static str) -> Self {
        FunctionTimer {
            name,
            start: Instant::now(),
        }
    }
}

// Called automatically when the guard goes out of scope.
impl Drop for FunctionTimer {
    fn drop(&mut self) {
        log::trace!("'{}' took: {:?}", self.name, self.start.elapsed());
    }
}
