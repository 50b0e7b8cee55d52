use std::io::{self, Write};

use encoding_rs::{CoderResult, Encoder, Encoding, WINDOWS_1252};

/// Transcodes UTF-8 written to it into ISO-8859-1.
///
/// Characters outside ISO-8859-1, and the C1 controls windows-1252 would
/// reassign, are written as numeric character references. A multi-byte
/// character split across two writes is held back until it is complete.
pub struct Latin1Writer<W: Write> {
    inner: W,
    encoder: Encoder,
    pending: Vec<u8>,
    buffer: Vec<u8>,
}

impl<W: Write> Latin1Writer<W> {
    pub fn new(inner: W) -> Self {
        let encoding: &'static Encoding =
            Encoding::for_label(b"ISO-8859-1").unwrap_or(WINDOWS_1252);
        Self {
            inner,
            encoder: encoding.new_encoder(),
            pending: Vec::new(),
            buffer: Vec::new(),
        }
    }

    /// Encode a run of characters that are all at or below U+00FF. windows-1252
    /// agrees with ISO-8859-1 on these except for the C1 controls it reassigns,
    /// which it cannot encode and writes as numeric character references.
    fn encode_latin1_run(&mut self, text: &str) {
        let mut read_total = 0;
        loop {
            let (result, read, _) =
                self.encoder
                    .encode_from_utf8_to_vec(&text[read_total..], &mut self.buffer, false);
            read_total += read;
            match result {
                CoderResult::InputEmpty => break,
                CoderResult::OutputFull => {
                    self.buffer.reserve(text.len() - read_total + 16);
                }
            }
        }
    }

    fn encode(&mut self, text: &str) -> io::Result<()> {
        self.buffer.clear();
        let mut rest = text;
        while let Some((i, c)) = rest.char_indices().find(|(_, c)| u32::from(*c) > 0xFF) {
            self.encode_latin1_run(&rest[..i]);
            write!(self.buffer, "&#{};", u32::from(c))?;
            rest = &rest[i + c.len_utf8()..];
        }
        self.encode_latin1_run(rest);
        self.inner.write_all(&self.buffer)
    }

    /// Recover the wrapped stream. Fails if a partial character is still pending.
    pub fn finish(mut self) -> io::Result<W> {
        if !self.pending.is_empty() {
            return Err(io::Error::new(
                io::ErrorKind::InvalidData,
                "stream ended inside a multi-byte character",
            ));
        }
        self.inner.flush()?;
        Ok(self.inner)
    }
}

impl<W: Write> Write for Latin1Writer<W> {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        self.pending.extend_from_slice(buf);
        let complete = match std::str::from_utf8(&self.pending) {
            Ok(text) => text.len(),
            Err(e) if e.error_len().is_none() => e.valid_up_to(),
            Err(e) => return Err(io::Error::new(io::ErrorKind::InvalidData, e)),
        };
        let pending = std::mem::take(&mut self.pending);
        let text = std::str::from_utf8(&pending[..complete])
            .map_err(|e| io::Error::new(io::ErrorKind::InvalidData, e))?;
        self.encode(text)?;
        self.pending.extend_from_slice(&pending[complete..]);
        Ok(buf.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        self.inner.flush()
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn test_latin1_transcoding() -> io::Result<()> {
        let mut writer = Latin1Writer::new(Vec::new());
        writer.write_all("caf\u{e9} ".as_bytes())?;
        writer.write_all("\u{3b1}".as_bytes())?;
        let bytes = writer.finish()?;
        assert_eq!(bytes, b"caf\xe9 &#945;");
        Ok(())
    }

    #[test]
    fn test_split_character() -> io::Result<()> {
        let encoded = "\u{e9}".as_bytes();
        let mut writer = Latin1Writer::new(Vec::new());
        writer.write_all(&encoded[..1])?;
        writer.write_all(&encoded[1..])?;
        assert_eq!(writer.finish()?, vec![0xe9]);

        let mut writer = Latin1Writer::new(Vec::new());
        writer.write_all(&encoded[..1])?;
        assert!(writer.finish().is_err());
        Ok(())
    }

    #[test]
    fn test_windows_1252_only_characters() -> io::Result<()> {
        let mut writer = Latin1Writer::new(Vec::new());
        writer.write_all("O\u{2019}Brien 5\u{20ac} a\u{2014}b \u{80}".as_bytes())?;
        let bytes = writer.finish()?;
        assert!(bytes.iter().all(|b| !(0x80..=0x9f).contains(b)));
        let text: String = bytes.iter().map(|&b| b as char).collect();
        assert_eq!(text, "O&#8217;Brien 5&#8364; a&#8212;b &#128;");
        Ok(())
    }
}
