//! Constants used throughout the application

/// Number of facial landmarks for full face
pub const NUM_FACIAL_LANDMARKS: usize = 68;

/// Number of landmark points describing one eye ring
pub const EYE_POINTS: usize = 6;

/// Left eye ring within the 68-point scheme (indices 36..42)
pub const LEFT_EYE_START: usize = 36;

/// Right eye ring within the 68-point scheme (indices 42..48)
pub const RIGHT_EYE_START: usize = 42;

/// EAR values below this count as "eyes closed"
pub const DEFAULT_EAR_THRESHOLD: f64 = 0.25;

/// Consecutive closed-eye frames required to declare very drowsy
pub const DEFAULT_CONSEC_FRAMES: u32 = 48;

/// Default landmark detector input size
pub const DEFAULT_LANDMARK_INPUT_SIZE: i32 = 128;

/// Progress bar geometry for the on-screen overlay
pub const PROGRESS_BAR_WIDTH: i32 = 200;
pub const PROGRESS_BAR_HEIGHT: i32 = 20;

/// Numeric precision epsilon
pub const EPSILON: f64 = 1e-10;
