use std::borrow::Cow;

/// Minimal RFC 4180 writer: comma separated, CRLF terminated, quoted when needed.
#[derive(Default)]
pub struct CsvWriter {
    buffer: String,
}

impl CsvWriter {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn record<I, S>(&mut self, fields: I) -> &mut Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        for (idx, field) in fields.into_iter().enumerate() {
            if idx > 0 {
                self.buffer.push(',');
            }
            self.buffer.push_str(&escape_field(field.as_ref()));
        }
        self.buffer.push_str("\r\n");
        self
    }

    pub fn finish(self) -> String {
        self.buffer
    }
}

fn escape_field(field: &str) -> Cow<'_, str> {
    if !field.contains([',', '"', '\r', '\n']) {
        return Cow::Borrowed(field);
    }
    Cow::Owned(format!("\"{}\"", field.replace('"', "\"\"")))
}
