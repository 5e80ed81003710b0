use std::io::{self, Stdout, Write};

/// Sink for rendered report blocks.
pub trait ReportWriter {
    fn write(&mut self, block: &str) -> io::Result<()>;
}

/// Writes blocks to any byte stream, stdout by default.
pub struct StreamWriter<W: Write> {
    inner: W,
}

pub type ConsoleWriter = StreamWriter<Stdout>;

impl StreamWriter<Stdout> {
    pub fn stdout() -> Self {
        Self { inner: io::stdout() }
    }
}

impl<W: Write> StreamWriter<W> {
    pub fn new(inner: W) -> Self {
        Self { inner }
    }

    pub fn into_inner(self) -> W {
        self.inner
    }
}

impl<W: Write> ReportWriter for StreamWriter<W> {
    fn write(&mut self, block: &str) -> io::Result<()> {
        self.inner.write_all(block.as_bytes())?;
        self.inner.flush()
    }
}

/// Keeps every block in memory.
#[derive(Debug, Default)]
pub struct MemoryWriter {
    blocks: Vec<String>,
}

impl MemoryWriter {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn blocks(&self) -> &[String] {
        &self.blocks
    }

    pub fn contents(&self) -> String {
        self.blocks.concat()
    }
}

impl ReportWriter for MemoryWriter {
    fn write(&mut self, block: &str) -> io::Result<()> {
        self.blocks.push(block.to_string());
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_stream_writer_writes_bytes() {
        let mut writer = StreamWriter::new(Vec::new());
        writer.write("a").unwrap();
        writer.write("b").unwrap();
        assert_eq!(writer.into_inner(), b"ab");
    }

    #[test]
    fn test_memory_writer_keeps_blocks() {
        let mut writer = MemoryWriter::new();
        writer.write("first\n").unwrap();
        writer.write("second\n").unwrap();
        assert_eq!(writer.blocks().len(), 2);
        assert_eq!(writer.contents(), "first\nsecond\n");
    }
}
