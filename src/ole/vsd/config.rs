/// Configuration for decoding Visio drawings.
///
/// Both limits guard against malformed files whose references loop back on
/// themselves.
///
/// # Examples
///
/// ```rust
/// use longan::ole::vsd::ParserOptions;
///
/// // Create with defaults
/// let options = ParserOptions::default();
/// assert_eq!(options.max_style_depth, 64);
///
/// // Or customize
/// let options = ParserOptions::new()
///     .with_max_style_depth(16)
///     .with_max_stream_depth(8);
/// assert_eq!(options.max_stream_depth, 8);
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ParserOptions {
    /// Maximum number of style sheets walked when resolving a master chain
    pub max_style_depth: usize,
    /// Maximum nesting of pointer lists (pages inside page lists, and so on)
    pub max_stream_depth: usize,
}

impl Default for ParserOptions {
    fn default() -> Self {
        Self {
            max_style_depth: 64,
            max_stream_depth: 32,
        }
    }
}

impl ParserOptions {
    /// Create a new `ParserOptions` with default values.
    #[inline]
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the bound for style master-chain walks.
    #[inline]
    pub fn with_max_style_depth(mut self, depth: usize) -> Self {
        self.max_style_depth = depth;
        self
    }

    /// Set the bound for nested pointer lists.
    #[inline]
    pub fn with_max_stream_depth(mut self, depth: usize) -> Self {
        self.max_stream_depth = depth;
        self
    }
}
