use super::{Chunks, ChunksError};

#[derive(Debug, PartialEq, Eq)]
pub enum Error {
    Chunks(ChunksError),
}

/// Reads the `data` of server-sent events from a chunk stream.
///
/// Bytes are buffered until a whole event has arrived, so a multi-byte
/// character split across two chunks is decoded correctly.
pub struct Sse {
    buf: Vec<u8>,
    chunks: Chunks,
}

impl Sse {
    #[inline]
    pub fn new(chunks: Chunks) -> Self {
        Self {
            buf: Vec::new(),
            chunks,
        }
    }

    pub async fn next_event(&mut self) -> Result<Option<String>, Error> {
        loop {
            while let Some((block, rest_at)) = self.split_event() {
                let data = parse_event(&block);
                self.buf.drain(..rest_at);
                if let Some(data) = data {
                    return Ok(Some(data));
                }
            }

            match self.chunks.next_chunk().await.map_err(Error::Chunks)? {
                Some(bytes) => self.buf.extend_from_slice(&bytes),
                // An unterminated trailing event is dropped.
                None => return Ok(None),
            }
        }
    }

    /// Finds the first complete event in the buffer. Returns the event
    /// text and the offset where the next event starts.
    fn split_event(&self) -> Option<(String, usize)> {
        let (end, sep_len) = find_blank_line(&self.buf)?;
        let block = String::from_utf8_lossy(&self.buf[..end]).into_owned();
        Some((block, end + sep_len))
    }
}

/// Locates the earliest blank line, accepting both `\n\n` and `\r\n\r\n`.
fn find_blank_line(buf: &[u8]) -> Option<(usize, usize)> {
    let lf = find(buf, b"\n\n").map(|idx| (idx, 2));
    let crlf = find(buf, b"\r\n\r\n").map(|idx| (idx, 4));
    match (lf, crlf) {
        (Some(a), Some(b)) => Some(if a.0 <= b.0 { a } else { b }),
        (a, b) => a.or(b),
    }
}

#[inline]
fn find(haystack: &[u8], needle: &[u8]) -> Option<usize> {
    haystack
        .windows(needle.len())
        .position(|window| window == needle)
}

/// Extracts the data of one event block. Comments and fields other than
/// `data` are skipped; multiple `data` lines are joined with `\n`. A line
/// without a colon is a field name with an empty value.
fn parse_event(block: &str) -> Option<String> {
    let mut data: Option<String> = None;
    for line in block.split('\n') {
        let line = line.strip_suffix('\r').unwrap_or(line);
        if line.is_empty() || line.starts_with(':') {
            continue;
        }
        let (field, value) = line.split_once(':').unwrap_or((line, ""));
        if field != "data" {
            continue;
        }
        let value = value.strip_prefix(' ').unwrap_or(value);
        match &mut data {
            Some(data) => {
                data.push('\n');
                data.push_str(value);
            }
            None => data = Some(value.to_owned()),
        }
    }
    data
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_lf_and_crlf_events() {
        let chunks = Chunks::from_static([
            b"data: {\"a\":1}\r\n\r\n",
            b"data: {\"b\":2}\n\n",
        ]);
        let mut sse = Sse::new(chunks);
        assert_eq!(sse.next_event().await.unwrap().unwrap(), "{\"a\":1}");
        assert_eq!(sse.next_event().await.unwrap().unwrap(), "{\"b\":2}");
        assert_eq!(sse.next_event().await.unwrap(), None);
    }

    #[tokio::test]
    async fn test_split_multibyte_character() {
        // "°" is 0xC2 0xB0, split across two chunks.
        let chunks = Chunks::from_static([b"data: 22\xC2", b"\xB0C\r\n\r\n"]);
        let mut sse = Sse::new(chunks);
        assert_eq!(sse.next_event().await.unwrap().unwrap(), "22°C");
    }

    #[tokio::test]
    async fn test_comments_and_other_fields() {
        let chunks = Chunks::from_static([
            b": keep-alive\n\nevent: message\nid: 7\ndata: first\ndata: second\n\n",
        ]);
        let mut sse = Sse::new(chunks);
        assert_eq!(sse.next_event().await.unwrap().unwrap(), "first\nsecond");
        assert_eq!(sse.next_event().await.unwrap(), None);
    }

    #[tokio::test]
    async fn test_fields_without_colon() {
        // `retry` alone is skipped, a bare `data` adds an empty line.
        let chunks =
            Chunks::from_static([b"retry\n\ndata: first\ndata\n\n"]);
        let mut sse = Sse::new(chunks);
        assert_eq!(sse.next_event().await.unwrap().unwrap(), "first\n");
        assert_eq!(sse.next_event().await.unwrap(), None);
    }

    #[tokio::test]
    async fn test_unterminated_event() {
        let mut sse = Sse::new(Chunks::from_static([b"data: unterminated\n"]));
        assert_eq!(sse.next_event().await.unwrap(), None);
    }
}
