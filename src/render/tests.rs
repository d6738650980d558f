//! Renderer tests drive real subprocesses through `sh -c` stand-ins.
//!
//! The stand-in sees the same positional arguments as the real renderer:
//! `$1` script path, `$2` entry class, `$3` quality flag, `$4` output flag.

use super::*;
use crate::config::Config;
use crate::error::DoubtreelError;
use crate::patch::{CandidateScript, ScriptOrigin, patch_script};
use std::fs;
use tempfile::TempDir;

const WRITE_ARTIFACT: &str = r#"sh -c 'touch "${4#--output_file=}"' renderer"#;

struct Harness {
    _temp: TempDir,
    scratch: PathBuf,
    output: PathBuf,
}

impl Harness {
    fn new() -> Self {
        let temp = TempDir::new().unwrap();
        let scratch = temp.path().join("scratch");
        let output = temp.path().join("videos");
        Self {
            _temp: temp,
            scratch,
            output,
        }
    }

    fn executor(&self, command: &str, timeout_seconds: u64) -> RenderExecutor {
        let mut config = Config::default();
        config.renderer.command = command.to_string();
        config.renderer.timeout_seconds = timeout_seconds;
        config.renderer.scratch_dir = Some(self.scratch.clone());
        RenderExecutor::from_config(&config).unwrap()
    }

    /// Files left in the scratch directory.
    fn scratch_entries(&self) -> Vec<String> {
        match fs::read_dir(&self.scratch) {
            Ok(entries) => entries
                .map(|e| e.unwrap().file_name().to_string_lossy().into_owned())
                .collect(),
            Err(_) => Vec::new(),
        }
    }
}

fn script() -> CandidateScript {
    patch_script("class DoubtAnimationScene(Scene):\n    def construct(self):\n        pass").unwrap()
}

#[tokio::test]
async fn successful_render_returns_artifact_and_removes_script() {
    let harness = Harness::new();
    let executor = harness.executor(WRITE_ARTIFACT, 30);

    let mut job = executor.prepare(&harness.output).unwrap();
    let artifact = executor.execute(&mut job, &script()).await.unwrap();

    assert!(artifact.is_file());
    assert_eq!(artifact, job.output_path);
    assert_eq!(
        artifact.file_name().unwrap().to_string_lossy(),
        format!("doubt_animation_{}.mp4", job.job_id)
    );
    assert!(!job.script_path.exists());
    assert!(harness.scratch_entries().is_empty());
    assert_eq!(job.state(), JobState::Succeeded);
}

#[tokio::test]
async fn renderer_receives_fixed_argument_shape() {
    let harness = Harness::new();
    let command = r#"sh -c 'printf "%s\n" "$@" > "${4#--output_file=}"' renderer"#;
    let executor = harness.executor(command, 30);

    let mut job = executor.prepare(&harness.output).unwrap();
    let artifact = executor.execute(&mut job, &script()).await.unwrap();

    let args = fs::read_to_string(&artifact).unwrap();
    let args: Vec<&str> = args.lines().collect();
    assert_eq!(args.len(), 4);
    assert_eq!(args[0], job.script_path.to_string_lossy());
    assert_eq!(args[1], "DoubtAnimationScene");
    assert_eq!(args[2], "-qm");
    assert_eq!(
        args[3],
        format!("--output_file={}", job.output_path.display())
    );
}

#[tokio::test]
async fn renderer_sees_script_contents_in_scratch_dir() {
    let harness = Harness::new();
    let command = r#"sh -c 'cp "$1" "${4#--output_file=}.py" && pwd > "${4#--output_file=}"' renderer"#;
    let executor = harness.executor(command, 30);
    let script = script();

    let mut job = executor.prepare(&harness.output).unwrap();
    let artifact = executor.execute(&mut job, &script).await.unwrap();

    let copied = fs::read_to_string(format!("{}.py", artifact.display())).unwrap();
    assert_eq!(copied, script.source);

    let cwd = fs::read_to_string(&artifact).unwrap();
    assert_eq!(
        Path::new(cwd.trim()),
        fs::canonicalize(&harness.scratch).unwrap()
    );
}

#[tokio::test]
async fn nonzero_exit_reports_stderr_and_removes_script() {
    let harness = Harness::new();
    let executor = harness.executor(r#"sh -c 'echo "LaTeX not found" >&2; exit 3' renderer"#, 30);

    let mut job = executor.prepare(&harness.output).unwrap();
    let err = executor.execute(&mut job, &script()).await.unwrap_err();

    match err {
        DoubtreelError::Render(RenderError::NonZeroExit { code, stderr }) => {
            assert_eq!(code, Some(3));
            assert!(stderr.contains("LaTeX not found"));
        }
        other => panic!("unexpected error: {other:?}"),
    }
    assert!(!job.script_path.exists());
    assert_eq!(job.state(), JobState::Failed);
}

#[tokio::test]
async fn zero_exit_without_artifact_is_not_success() {
    let harness = Harness::new();
    let executor = harness.executor("sh -c 'exit 0' renderer", 30);

    let mut job = executor.prepare(&harness.output).unwrap();
    let err = executor.execute(&mut job, &script()).await.unwrap_err();

    assert!(matches!(
        err,
        DoubtreelError::Render(RenderError::MissingArtifact { ref path }) if *path == job.output_path
    ));
    assert!(!job.script_path.exists());
}

#[tokio::test]
async fn hung_renderer_is_killed_at_deadline() {
    let harness = Harness::new();
    let executor = harness.executor("sh -c 'exec sleep 30' renderer", 1);

    let started = std::time::Instant::now();
    let mut job = executor.prepare(&harness.output).unwrap();
    let err = executor.execute(&mut job, &script()).await.unwrap_err();

    assert!(matches!(
        err,
        DoubtreelError::Render(RenderError::Timeout { seconds: 1 })
    ));
    assert!(started.elapsed() < std::time::Duration::from_secs(20));
    assert!(!job.script_path.exists());
}

#[tokio::test]
async fn chatty_renderer_past_output_cap_still_succeeds() {
    let harness = Harness::new();
    // `head` dies of SIGPIPE if stderr is closed early, and the artifact is never written.
    let command = r#"sh -c 'head -c 12582912 /dev/zero >&2 && touch "${4#--output_file=}"' renderer"#;
    let executor = harness.executor(command, 60);

    let mut job = executor.prepare(&harness.output).unwrap();
    let artifact = executor.execute(&mut job, &script()).await.unwrap();

    assert!(artifact.is_file());
    assert_eq!(job.state(), JobState::Succeeded);
}

#[tokio::test]
async fn lingering_pipe_holder_does_not_outlast_deadline() {
    let harness = Harness::new();
    let command = r#"sh -c 'sleep 30 & touch "${4#--output_file=}"' renderer"#;
    let executor = harness.executor(command, 2);

    let started = std::time::Instant::now();
    let mut job = executor.prepare(&harness.output).unwrap();
    let artifact = executor.execute(&mut job, &script()).await.unwrap();

    assert!(artifact.is_file());
    assert!(started.elapsed() < std::time::Duration::from_secs(20));
}

#[tokio::test]
async fn finished_job_cannot_be_executed_again() {
    let harness = Harness::new();
    let executor = harness.executor(WRITE_ARTIFACT, 30);

    let mut job = executor.prepare(&harness.output).unwrap();
    executor.execute(&mut job, &script()).await.unwrap();
    fs::remove_file(&job.output_path).unwrap();

    let err = executor.execute(&mut job, &script()).await.unwrap_err();
    assert!(matches!(
        err,
        DoubtreelError::Render(RenderError::JobAlreadyStarted {
            state: JobState::Succeeded,
            ..
        })
    ));
    assert_eq!(job.state(), JobState::Succeeded);
    assert!(!job.output_path.exists());
    assert!(harness.scratch_entries().is_empty());
}

#[tokio::test]
async fn missing_renderer_binary_is_spawn_error() {
    let harness = Harness::new();
    let executor = harness.executor("/nonexistent/doubtreel-renderer", 30);

    let mut job = executor.prepare(&harness.output).unwrap();
    let err = executor.execute(&mut job, &script()).await.unwrap_err();

    assert!(matches!(
        err,
        DoubtreelError::Render(RenderError::Spawn { .. })
    ));
    assert!(!job.script_path.exists());
    assert!(harness.scratch_entries().is_empty());
}

#[tokio::test]
async fn script_without_entry_symbol_never_reaches_renderer() {
    let harness = Harness::new();
    let executor = harness.executor(WRITE_ARTIFACT, 30);
    let bad = CandidateScript::inspect("print('hi')".to_string(), ScriptOrigin::Generated);

    let mut job = executor.prepare(&harness.output).unwrap();
    let err = executor.execute(&mut job, &bad).await.unwrap_err();

    assert!(matches!(err, DoubtreelError::Validation(_)));
    assert!(!job.output_path.exists());
    assert!(harness.scratch_entries().is_empty());
}

#[tokio::test]
async fn unwritable_output_dir_is_filesystem_error() {
    let harness = Harness::new();
    let executor = harness.executor(WRITE_ARTIFACT, 30);
    fs::create_dir_all(harness.output.parent().unwrap()).unwrap();
    fs::write(&harness.output, "a file, not a directory").unwrap();

    let err = executor.prepare(&harness.output).unwrap_err();
    assert!(matches!(err, DoubtreelError::Filesystem { .. }));
}

#[tokio::test]
async fn concurrent_jobs_get_distinct_ids_and_artifacts() {
    let harness = Harness::new();
    let executor = harness.executor(WRITE_ARTIFACT, 30);
    let script = script();

    let (a, b) = tokio::join!(
        executor.render(&script, &harness.output),
        executor.render(&script, &harness.output)
    );
    let (a, b) = (a.unwrap(), b.unwrap());

    assert_ne!(a, b);
    assert!(a.is_file());
    assert!(b.is_file());
    assert!(harness.scratch_entries().is_empty());
}

#[test]
fn job_ids_are_32_hex_chars() {
    let job = RenderJob::new(Path::new("/scratch"), Path::new("/videos"));
    assert_eq!(job.job_id.len(), 32);
    assert!(job.job_id.chars().all(|c| c.is_ascii_hexdigit()));
    assert_eq!(
        job.script_path,
        Path::new("/scratch").join(format!("manim_{}.py", job.job_id))
    );
    assert_eq!(job.state(), JobState::Created);
}

#[test]
fn job_states_only_move_forward() {
    use JobState::*;
    assert!(Created.can_advance_to(ScriptWritten));
    assert!(ScriptWritten.can_advance_to(Rendering));
    assert!(Rendering.can_advance_to(Succeeded));
    assert!(Created.can_advance_to(Failed));
    assert!(Rendering.can_advance_to(Failed));
    assert!(!Created.can_advance_to(Rendering));
    assert!(!Succeeded.can_advance_to(Failed));
    assert!(!Failed.can_advance_to(Created));
    assert!(!Rendering.can_advance_to(ScriptWritten));
    assert!(Succeeded.is_terminal() && Failed.is_terminal());
}

#[test]
fn nonzero_exit_message_shows_stderr_tail() {
    let stderr: String = (1..=30).map(|i| format!("line {i}\n")).collect();
    let err = RenderError::NonZeroExit {
        code: Some(1),
        stderr,
    };
    let message = err.to_string();
    assert!(message.starts_with("renderer exited with status 1:"));
    assert!(message.contains("line 30"));
    assert!(!message.contains("line 10\n"));
}
