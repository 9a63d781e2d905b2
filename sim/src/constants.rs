/// Fixed simulation rate. Every system runs once per tick in FixedUpdate.
pub const TICKS_PER_SECOND: u64 = 60;
pub const DEFAULT_SCREEN_WIDTH: f32 = 800.0;
pub const DEFAULT_SCREEN_HEIGHT: f32 = 600.0;
/// Screen y grows downward, so gravity is positive.
pub const DEFAULT_GRAVITY: f32 = 980.0;
/// Seconds a new vehicle is held still before the physics engine takes over.
pub const DEFAULT_INITIALIZATION_GRACE: f32 = 0.5;
pub const SHIP_LABEL: &str = "ship";
