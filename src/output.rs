/// Abstraction over user-facing output.
///
/// Command modules write through this trait instead of `println!`/`eprintln!`
/// so tests can capture what a command printed.
pub trait UserOutput {
    /// Plain informational line (table rows, details).
    fn status(&self, message: &str);

    /// Confirmation that a change was saved.
    fn success(&self, message: &str);

    /// Something the user should notice but that did not fail the command.
    fn warning(&self, message: &str);

    /// A blank line separator.
    fn blank(&self);
}

/// Standard CLI output: stdout for results, stderr for warnings.
pub struct CliOutput;

impl UserOutput for CliOutput {
    fn status(&self, message: &str) {
        println!("{}", message);
    }

    fn success(&self, message: &str) {
        println!("\x1b[32m{}\x1b[0m", message);
    }

    fn warning(&self, message: &str) {
        eprintln!("\x1b[33m{}\x1b[0m", message);
    }

    fn blank(&self) {
        println!();
    }
}
