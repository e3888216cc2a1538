//! Command execution
//!
//! This module runs the shell templates of a tree-defined command.

use crate::error::{RunError, RunResult};
use crate::resolver::ParsedArgs;
use crate::runner::{interpolate, template_vars, RunContext};
use std::process::{Command as StdCommand, Stdio};
use tracing::debug;

/// Quote a token for a POSIX shell when it needs it
pub fn shell_quote(token: &str) -> String {
    let plain = !token.is_empty()
        && token
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || "-_./=:,@%+".contains(c));

    if plain {
        token.to_string()
    } else {
        format!("'{}'", token.replace('\'', r"'\''"))
    }
}

/// Build the command line for one template
///
/// Option values enter the line as quoted shell words, so a reference must
/// not itself sit inside quotes in the template.
pub fn render_command(template: &str, args: &ParsedArgs) -> String {
    let mut line = interpolate(template, &template_vars(args));

    for token in &args.passthrough {
        line.push(' ');
        line.push_str(&shell_quote(token));
    }

    line
}

/// Execute one command line in the given context
pub fn execute_command(line: &str, ctx: &RunContext) -> RunResult<()> {
    let (program, interpreter_args) = ctx
        .interpreter
        .split_first()
        .ok_or_else(|| RunError::Spawn {
            program: String::new(),
            error: "no interpreter configured".to_string(),
        })?;

    debug!(%line, "running");

    let mut command = StdCommand::new(program);
    command
        .args(interpreter_args)
        .arg(line)
        .current_dir(&ctx.working_dir)
        .stdin(Stdio::inherit())
        .stdout(Stdio::inherit())
        .stderr(Stdio::inherit());

    let status = command.status().map_err(|e| RunError::Spawn {
        program: program.clone(),
        error: e.to_string(),
    })?;

    if !status.success() {
        return Err(RunError::CommandFailed(status.code()));
    }

    Ok(())
}

/// Run every template in order, stopping at the first failure
pub fn run_templates(templates: &[String], args: &ParsedArgs, ctx: &RunContext) -> RunResult<()> {
    for template in templates {
        let line = render_command(template, args);
        execute_command(&line, ctx)?;
    }
    Ok(())
}
