/// Abstraction over console output so the VM stays independent of the process.
///
/// Program output (`print`, debug dumps) goes through `write_line`/`write`,
/// diagnostics through `write_error_line`.
pub trait RuntimeIo {
    fn write_line(&mut self, s: &str);
    fn write(&mut self, s: &str);
    fn write_error_line(&mut self, s: &str);
}

/// Default I/O that talks to process stdout/stderr (CLI use).
pub struct StdIo;

impl RuntimeIo for StdIo {
    fn write_line(&mut self, s: &str) {
        println!("{}", s);
    }
    fn write(&mut self, s: &str) {
        use std::io::Write;
        print!("{}", s);
        let _ = std::io::stdout().flush();
    }
    fn write_error_line(&mut self, s: &str) {
        eprintln!("{}", s);
    }
}

/// Buffer-based I/O for tests and embedding: output and errors are collected
/// separately.
#[derive(Debug, Default)]
pub struct BufferIo {
    output: String,
    errors: String,
}

impl BufferIo {
    pub fn new() -> Self {
        Self::default()
    }
    pub fn take_output(self) -> String {
        self.output
    }
    pub fn get_output(&self) -> &str {
        &self.output
    }
    pub fn get_errors(&self) -> &str {
        &self.errors
    }
    pub fn drain_output(&mut self) -> String {
        std::mem::take(&mut self.output)
    }
    pub fn drain_errors(&mut self) -> String {
        std::mem::take(&mut self.errors)
    }
    pub fn clear(&mut self) {
        self.output.clear();
        self.errors.clear();
    }
}

impl RuntimeIo for BufferIo {
    fn write_line(&mut self, s: &str) {
        self.output.push_str(s);
        self.output.push('\n');
    }
    fn write(&mut self, s: &str) {
        self.output.push_str(s);
    }
    fn write_error_line(&mut self, s: &str) {
        self.errors.push_str(s);
        self.errors.push('\n');
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_buffer_io_separates_streams() {
        let mut io = BufferIo::new();
        io.write("a");
        io.write_line("b");
        io.write_error_line("oops");
        assert_eq!(io.get_output(), "ab\n");
        assert_eq!(io.get_errors(), "oops\n");
        assert_eq!(io.drain_errors(), "oops\n");
        assert_eq!(io.get_errors(), "");
        assert_eq!(io.take_output(), "ab\n");
    }
}
