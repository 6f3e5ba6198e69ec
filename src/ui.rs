use std::io::{self, BufRead, Cursor, IsTerminal, Write};

use rpassword::prompt_password;
use tracing::debug;

use crate::i18n;

enum Source {
    Stdin,
    Buffer(Cursor<Vec<u8>>),
}

enum Sink {
    Stdout,
    Stderr,
    Buffer(Vec<u8>),
}

impl Sink {
    fn write_str(&mut self, text: &str) {
        let written = match self {
            Sink::Stdout => {
                let mut stdout = io::stdout().lock();
                stdout.write_all(text.as_bytes()).and_then(|_| stdout.flush())
            }
            Sink::Stderr => io::stderr().lock().write_all(text.as_bytes()),
            Sink::Buffer(buffer) => buffer.write_all(text.as_bytes()),
        };
        if let Err(err) = written {
            debug!(%err, "terminal write failed");
        }
    }

    fn text(&self) -> String {
        match self {
            Sink::Buffer(buffer) => String::from_utf8_lossy(buffer).into_owned(),
            Sink::Stdout | Sink::Stderr => String::new(),
        }
    }
}

/// Terminal surface of a command: one input stream, an output stream for
/// regular text and prompts, and an error stream for warnings and failures.
///
/// `Ui::buffered` replaces all three with in-memory buffers. In that mode text
/// answers are echoed to the output stream the way a terminal would show them,
/// secret answers are not.
pub struct Ui {
    source: Source,
    out: Sink,
    err: Sink,
}

impl Ui {
    pub fn terminal() -> Self {
        Self {
            source: Source::Stdin,
            out: Sink::Stdout,
            err: Sink::Stderr,
        }
    }

    pub fn buffered(input: impl Into<String>) -> Self {
        Self {
            source: Source::Buffer(Cursor::new(input.into().into_bytes())),
            out: Sink::Buffer(Vec::new()),
            err: Sink::Buffer(Vec::new()),
        }
    }

    /// Everything written to the output stream so far. Empty for a terminal.
    pub fn out_text(&self) -> String {
        self.out.text()
    }

    /// Everything written to the error stream so far. Empty for a terminal.
    pub fn err_text(&self) -> String {
        self.err.text()
    }

    pub fn display_text(&mut self, text: &str) {
        self.out.write_str(text);
        self.out.write_str("\n");
    }

    pub fn display_newline(&mut self) {
        self.out.write_str("\n");
    }

    pub fn display_ok(&mut self) {
        self.display_text(&i18n::tr("cli.common.ok", "OK"));
    }

    /// Pairs of label and value rendered with the values aligned in one column.
    pub fn display_key_value_table(&mut self, rows: &[(String, String)]) {
        let width = rows
            .iter()
            .map(|(label, _)| label.chars().count())
            .max()
            .unwrap_or(0);
        for (label, value) in rows {
            let padding = " ".repeat(width - label.chars().count() + 3);
            self.display_text(&format!("{label}{padding}{value}"));
        }
    }

    pub fn display_warning(&mut self, text: &str) {
        self.err.write_str(text);
        self.err.write_str("\n");
    }

    pub fn display_warnings<S: AsRef<str>>(&mut self, warnings: &[S]) {
        for warning in warnings {
            self.display_warning(warning.as_ref());
        }
    }

    pub fn display_error(&mut self, text: &str) {
        self.display_warning(text);
    }

    /// Writes `label` and reads one echoed line. End of input is an
    /// [`io::ErrorKind::UnexpectedEof`] error.
    pub fn display_text_prompt(&mut self, label: &str) -> io::Result<String> {
        self.out.write_str(label);
        let line = self.read_line()?;
        if matches!(self.source, Source::Buffer(_)) {
            self.out.write_str(&line);
            self.out.write_str("\n");
        }
        Ok(line)
    }

    /// Writes `label` and reads one line without echoing it.
    pub fn display_password_prompt(&mut self, label: &str) -> io::Result<String> {
        if matches!(self.source, Source::Stdin) && io::stdin().is_terminal() {
            return prompt_password(label);
        }
        self.out.write_str(label);
        let line = self.read_line()?;
        self.out.write_str("\n");
        Ok(line)
    }

    fn read_line(&mut self) -> io::Result<String> {
        let mut line = String::new();
        let read = match &mut self.source {
            Source::Stdin => io::stdin().lock().read_line(&mut line)?,
            Source::Buffer(cursor) => cursor.read_line(&mut line)?,
        };
        if read == 0 {
            return Err(io::Error::new(io::ErrorKind::UnexpectedEof, "stdin closed"));
        }
        let trimmed = line.trim_end_matches(['\n', '\r']).len();
        line.truncate(trimmed);
        Ok(line)
    }
}
