//! Fixed contract between generated scripts and the Manim renderer.

/// Class the renderer is told to render; every script must define it.
pub const ENTRY_SYMBOL: &str = "DoubtAnimationScene";

/// Import line prepended when a script has no Manim import.
pub const IMPORT_LINE: &str = "from manim import *";

/// Program-entry block appended when a script lacks one.
pub const PROGRAM_ENTRY: &str = "if __name__ == \"__main__\":\n    scene = DoubtAnimationScene()\n    scene.render()\n";

/// Prefix of the renderer flag that overrides the output file.
pub const OUTPUT_FILE_FLAG: &str = "--output_file=";

/// Ephemeral script file name for a job.
pub fn script_file_name(job_id: &str) -> String {
    format!("manim_{job_id}.py")
}

/// Final video file name for a job.
pub fn artifact_file_name(job_id: &str) -> String {
    format!("doubt_animation_{job_id}.mp4")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn program_entry_invokes_entry_symbol() {
        assert!(PROGRAM_ENTRY.contains(&format!("{ENTRY_SYMBOL}()")));
    }

    #[test]
    fn file_names_embed_job_id() {
        assert_eq!(script_file_name("ab12"), "manim_ab12.py");
        assert_eq!(artifact_file_name("ab12"), "doubt_animation_ab12.mp4");
    }
}
