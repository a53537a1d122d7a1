//! Body execution
//!
//! Runs one task body under its interpreter with the value store exposed
//! as environment, captures the output, and collects the value mutations
//! the body wrote to its handoff file.

use std::io::Write;
use std::process::{Command, Stdio};
use tempfile::NamedTempFile;

use crate::error::{ExecutionError, ExecutionResult};
use crate::runner::context::{Context, Verbosity};
use crate::runner::interpolate::interpolate;
use crate::runner::task::Task;
use crate::runner::values::VALUES_FILE_ENV;

/// What one body execution produced
#[derive(Debug)]
pub struct BodyOutput {
    /// Combined stdout + stderr, as captured
    pub output: String,

    /// Number of value-store keys the body set
    pub mutations: usize,
}

/// Execute a task body against the context.
///
/// On zero exit the body's value mutations are merged into the store and
/// the captured output is returned. On non-zero exit the plan must halt;
/// the error carries the exit code and the raw output, and no mutations
/// are merged.
pub fn execute_body(task: &Task, ctx: &mut Context) -> ExecutionResult<BodyOutput> {
    let spawn_err = |e: &dyn std::fmt::Display| ExecutionError::Spawn {
        name: task.name.clone(),
        error: e.to_string(),
    };

    // Handoff file the body appends KEY=VALUE lines to. The handle keeps
    // the file alive until the mutations are merged.
    let values_file = NamedTempFile::new().map_err(|e| spawn_err(&e))?;

    let working_dir = match &task.workdir {
        Some(dir) => {
            let interpolated =
                interpolate(dir, &ctx.values).unwrap_or_else(|_| dir.clone());
            ctx.working_dir.join(interpolated)
        }
        None => ctx.working_dir.clone(),
    };

    let mut command = Command::new(&task.interpreter[0]);
    if task.interpreter.len() > 1 {
        command.args(&task.interpreter[1..]);
    }
    command.arg(&task.script);
    command.current_dir(&working_dir);

    command.stdin(Stdio::inherit());
    command.stdout(Stdio::piped());
    command.stderr(Stdio::piped());

    for (key, value) in ctx.values.iter() {
        command.env(key, value);
    }
    command.env(VALUES_FILE_ENV, values_file.path());

    let output = command.output().map_err(|e| spawn_err(&e))?;

    // Echo what the body printed; capture is for failure reporting, not
    // for hiding output.
    if ctx.verbosity >= Verbosity::Normal && !output.stdout.is_empty() {
        let mut stdout = std::io::stdout();
        let _ = stdout.write_all(&output.stdout);
        let _ = stdout.flush();
    }
    if ctx.verbosity >= Verbosity::Quiet && !output.stderr.is_empty() {
        let mut stderr = std::io::stderr();
        let _ = stderr.write_all(&output.stderr);
        let _ = stderr.flush();
    }

    let mut combined = String::from_utf8_lossy(&output.stdout).into_owned();
    combined.push_str(&String::from_utf8_lossy(&output.stderr));

    if !output.status.success() {
        return Err(ExecutionError::TaskFailed {
            name: task.name.clone(),
            code: output.status.code(),
            output: combined,
        });
    }

    let mutations = ctx
        .values
        .merge_file(values_file.path())
        .map_err(|e| ExecutionError::Values {
            name: task.name.clone(),
            error: e.to_string(),
        })?;

    Ok(BodyOutput {
        output: combined,
        mutations,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config;
    use tempfile::TempDir;

    fn task(name: &str, script: &str) -> Task {
        let config = config::Task {
            run: script.to_string(),
            ..Default::default()
        };
        Task::from_config(name.to_string(), config, None).unwrap()
    }

    fn quiet_ctx() -> Context {
        Context::new().with_verbosity(Verbosity::Silent)
    }

    #[test]
    fn test_successful_body() {
        let mut ctx = quiet_ctx();
        let result = execute_body(&task("ok", "echo captured"), &mut ctx).unwrap();
        assert_eq!(result.output, "captured\n");
        assert_eq!(result.mutations, 0);
    }

    #[test]
    fn test_failing_body_reports_code_and_output() {
        let mut ctx = quiet_ctx();
        let result = execute_body(&task("boom", "echo before; exit 7"), &mut ctx);

        match result {
            Err(ExecutionError::TaskFailed { name, code, output }) => {
                assert_eq!(name, "boom");
                assert_eq!(code, Some(7));
                assert!(output.contains("before"));
            }
            other => panic!("expected TaskFailed, got {:?}", other),
        }
    }

    #[test]
    fn test_values_injected_as_environment() {
        let mut ctx = quiet_ctx();
        ctx.values
            .set("RUNFILE_PROBE".to_string(), "expected".to_string());

        let result = execute_body(
            &task("check", r#"test "$RUNFILE_PROBE" = expected"#),
            &mut ctx,
        );
        assert!(result.is_ok());
    }

    #[test]
    fn test_body_mutations_are_merged() {
        let mut ctx = quiet_ctx();
        let result = execute_body(
            &task("setter", r#"echo "GREETING=hello" >> "$RUNFILE_VALUES""#),
            &mut ctx,
        )
        .unwrap();

        assert_eq!(result.mutations, 1);
        assert_eq!(ctx.values.get("GREETING"), Some("hello"));
    }

    #[test]
    fn test_failed_body_merges_nothing() {
        let mut ctx = quiet_ctx();
        let result = execute_body(
            &task(
                "half",
                r#"echo "LEAK=yes" >> "$RUNFILE_VALUES"; exit 1"#,
            ),
            &mut ctx,
        );

        assert!(result.is_err());
        assert_eq!(ctx.values.get("LEAK"), None);
    }

    #[test]
    fn test_workdir_is_honored() {
        let dir = TempDir::new().unwrap();
        std::fs::create_dir(dir.path().join("sub")).unwrap();
        std::fs::write(dir.path().join("sub/marker"), "").unwrap();

        let config = config::Task {
            workdir: Some("sub".to_string()),
            run: "test -f marker".to_string(),
            ..Default::default()
        };
        let t = Task::from_config("wd".to_string(), config, None).unwrap();

        let mut ctx = quiet_ctx().with_working_dir(dir.path().to_path_buf());
        assert!(execute_body(&t, &mut ctx).is_ok());
    }

    #[test]
    fn test_workdir_interpolates_values() {
        let dir = TempDir::new().unwrap();
        std::fs::create_dir(dir.path().join("deep")).unwrap();
        std::fs::write(dir.path().join("deep/marker"), "").unwrap();

        let config = config::Task {
            workdir: Some("${TARGET_DIR}".to_string()),
            run: "test -f marker".to_string(),
            ..Default::default()
        };
        let t = Task::from_config("wd".to_string(), config, None).unwrap();

        let mut ctx = quiet_ctx().with_working_dir(dir.path().to_path_buf());
        ctx.values
            .set("TARGET_DIR".to_string(), "deep".to_string());
        assert!(execute_body(&t, &mut ctx).is_ok());
    }

    #[test]
    fn test_missing_interpreter_is_spawn_error() {
        let config = config::Task {
            interpreter: Some(config::Interpreter::Tag(
                "definitely_not_an_interpreter_xyz".to_string(),
            )),
            run: "true".to_string(),
            ..Default::default()
        };
        let t = Task::from_config("ghostint".to_string(), config, None).unwrap();

        let mut ctx = quiet_ctx();
        let result = execute_body(&t, &mut ctx);
        assert!(matches!(result, Err(ExecutionError::Spawn { .. })));
    }
}
