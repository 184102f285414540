/// Default polling interval in seconds between hierarchy refreshes.
pub const DEFAULT_POLLING_INTERVAL_SECS: u64 = 3;

/// Default canvas size used to scale the radial layout.
/// Node radii are fractions of this value.
pub const DEFAULT_CANVAS_SIZE: f64 = 700.0;
