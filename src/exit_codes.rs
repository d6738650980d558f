//! Exit code constants for the doubtreel CLI.
//!
//! - 0: Success
//! - 1: User error (bad args, invalid config)
//! - 2: Validation failure (script lacks the scene entry class)
//! - 3: Render failure (renderer exited non-zero, timed out, or produced no video)
//! - 4: Filesystem failure (directory creation, script write or delete)
//! - 5: Generation failure (only when fallback is disabled)

/// Successful execution.
pub const SUCCESS: i32 = 0;

/// User error: bad arguments or invalid configuration.
pub const USER_ERROR: i32 = 1;

/// Validation failure: the script cannot be patched into a renderable scene.
pub const VALIDATION_FAILURE: i32 = 2;

/// Render failure: the external renderer did not produce the expected video.
pub const RENDER_FAILURE: i32 = 3;

/// Filesystem failure: directories or ephemeral scripts could not be managed.
pub const FILESYSTEM_FAILURE: i32 = 4;

/// Generation failure: the text-generation provider could not produce a script.
pub const GENERATION_FAILURE: i32 = 5;
