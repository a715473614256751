//! Destination for text written by the `print` and `println` built-ins.
//!
//! The binary writes straight to stdout; tests and embedders use the buffer
//! variant and read the captured text back with [`Output::contents`].

use std::{
    cell::RefCell,
    io::{self, Write},
};

#[derive(Default)]
pub enum Output {
    #[default]
    Stdout,
    Buffer(RefCell<String>),
}

impl Output {
    pub fn stdout() -> Self {
        Output::Stdout
    }

    pub fn buffer() -> Self {
        Output::Buffer(RefCell::new(String::new()))
    }

    /// Write without a trailing newline.
    pub fn print(&self, msg: &str) -> io::Result<()> {
        match self {
            Output::Stdout => {
                let mut stdout = io::stdout().lock();
                stdout.write_all(msg.as_bytes())?;
                stdout.flush()
            }
            Output::Buffer(buf) => {
                buf.borrow_mut().push_str(msg);
                Ok(())
            }
        }
    }

    pub fn println(&self, msg: &str) -> io::Result<()> {
        match self {
            Output::Stdout => writeln!(io::stdout().lock(), "{}", msg),
            Output::Buffer(buf) => {
                let mut buf = buf.borrow_mut();
                buf.push_str(msg);
                buf.push('\n');
                Ok(())
            }
        }
    }

    /// Captured text; always empty for stdout.
    pub fn contents(&self) -> String {
        match self {
            Output::Stdout => String::new(),
            Output::Buffer(buf) => buf.borrow().clone(),
        }
    }

    pub fn clear(&self) {
        if let Output::Buffer(buf) = self {
            buf.borrow_mut().clear();
        }
    }
}
