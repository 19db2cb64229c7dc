/// Default limit on nested user function calls.
pub const DEFAULT_MAX_CALL_DEPTH: usize = 1000;

/// Interpreter settings.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Config {
    /// Calls nested deeper than this fail with a recursion limit error
    /// instead of exhausting host memory.
    pub max_call_depth: usize,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            max_call_depth: DEFAULT_MAX_CALL_DEPTH,
        }
    }
}

impl Config {
    pub fn with_max_call_depth(mut self, max_call_depth: usize) -> Self {
        self.max_call_depth = max_call_depth;
        self
    }
}
