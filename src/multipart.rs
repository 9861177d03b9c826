use std::time::{Duration, Instant};

use crate::error::ParseError;
use crate::state::{ReceivedFile, UploadProgress};

const HEADER_TERMINATOR: &[u8] = b"\r\n\r\n";

/// Accumulator for one multipart upload delivered across arbitrarily
/// fragmented reads. Bytes are only ever appended; everything derived from
/// them (header split, declared length, boundary token, filename) is
/// discovered incrementally and memoized.
///
/// This is deliberately a heuristic substring scanner, not a conforming HTTP
/// parser: the only clients are the bundled form page and generic browsers
/// hitting two known routes.
pub struct UploadSession {
    buffer: Vec<u8>,
    header_end: Option<usize>,
    content_length: Option<usize>,
    boundary: Option<String>,
    file_name: Option<String>,
    started_at: Instant,
}

impl UploadSession {
    pub fn new() -> Self {
        Self {
            buffer: Vec::new(),
            header_end: None,
            content_length: None,
            boundary: None,
            file_name: None,
            started_at: Instant::now(),
        }
    }

    /// Append a received chunk and update whatever can now be derived.
    pub fn push(&mut self, chunk: &[u8]) {
        self.buffer.extend_from_slice(chunk);

        // the first \r\n\r\n marks the end of the top-level headers; found once
        if self.header_end.is_none() {
            if let Some(pos) = find(&self.buffer, HEADER_TERMINATOR) {
                self.header_end = Some(pos + HEADER_TERMINATOR.len());
                let head = String::from_utf8_lossy(&self.buffer[..pos]);
                self.content_length = header_number(&head, "content-length:");
                self.boundary = boundary_token(&head);
            }
        }

        // the filename lives in the part headers, so it may only show up
        // well after the first chunk
        if self.file_name.is_none() {
            let text = String::from_utf8_lossy(&self.buffer);
            self.file_name = quoted_after(&text, "filename=\"");
        }
    }

    pub fn file_name(&self) -> Option<&str> {
        self.file_name.as_deref()
    }

    pub fn elapsed(&self) -> Duration {
        self.started_at.elapsed()
    }

    // body bytes received so far; zero until the header split is known
    pub fn received_body(&self) -> usize {
        match self.header_end {
            Some(end) => self.buffer.len().saturating_sub(end),
            None => 0,
        }
    }

    /// True once the declared `Content-Length` has been satisfied. Requests
    /// without one never complete here; the transport's EOF drives them.
    pub fn is_complete(&self) -> bool {
        match (self.header_end, self.content_length) {
            (Some(_), Some(declared)) => self.received_body() >= declared,
            _ => false,
        }
    }

    /// Progress frame for the current state. Only meaningful once both the
    /// header split and the declared length are known; until then it reports
    /// zero received bytes.
    pub fn progress(&self) -> UploadProgress {
        let (received, total) = match (self.header_end, self.content_length) {
            (Some(_), Some(declared)) => {
                // clamp so a trailing read past the declared length never
                // reports more than the total
                (self.received_body().min(declared) as u64, Some(declared as u64))
            }
            _ => (0, None),
        };
        UploadProgress {
            file_name: self.file_name.clone(),
            received_bytes: received,
            total_bytes: total,
            is_completed: false,
            error_message: None,
        }
    }

    /// Final extraction: the file content is the byte range strictly between
    /// the blank line that ends the first part's headers and the terminating
    /// `--boundary--` marker.
    pub fn finish(&self) -> Result<ReceivedFile, ParseError> {
        let token = self.boundary.as_ref().ok_or(ParseError::MissingBoundary)?;
        let file_name = self
            .file_name
            .clone()
            .ok_or(ParseError::MissingFilename)?;

        let body = &self.buffer[self.header_end.unwrap_or(0)..];

        let delimiter = format!("--{}", token);
        let opening = find(body, delimiter.as_bytes()).ok_or(ParseError::MissingBoundary)?;
        let part_head = opening + delimiter.len();

        let blank = find(&body[part_head..], HEADER_TERMINATOR)
            .ok_or(ParseError::MissingTerminator)?;
        let content_start = part_head + blank + HEADER_TERMINATOR.len();

        let terminator = format!("--{}--", token);
        let end = find(&body[content_start..], terminator.as_bytes())
            .ok_or(ParseError::MissingTerminator)?;
        let mut content_end = content_start + end;

        // the CRLF introducing the closing marker belongs to the framing
        if body[content_start..content_end].ends_with(b"\r\n") {
            content_end -= 2;
        }

        let content = std::str::from_utf8(&body[content_start..content_end])
            .map_err(|_| ParseError::UnsupportedEncoding)?
            .to_string();

        Ok(ReceivedFile { file_name, content })
    }
}

impl Default for UploadSession {
    fn default() -> Self {
        Self::new()
    }
}

// first occurrence of needle in haystack
fn find(haystack: &[u8], needle: &[u8]) -> Option<usize> {
    if needle.is_empty() || haystack.len() < needle.len() {
        return None;
    }
    haystack.windows(needle.len()).position(|w| w == needle)
}

// numeric header value, matched case-insensitively on the line prefix
fn header_number(head: &str, name: &str) -> Option<usize> {
    head.lines()
        .find(|line| line.to_ascii_lowercase().starts_with(name))
        .and_then(|line| line.split(':').nth(1))
        .and_then(|value| value.trim().parse().ok())
}

// the boundary token declared in the Content-Type header
fn boundary_token(head: &str) -> Option<String> {
    let start = head.find("boundary=")? + "boundary=".len();
    let rest = &head[start..];
    let token: String = rest
        .chars()
        .take_while(|c| !c.is_whitespace() && *c != ';' && *c != '"')
        .collect();
    if token.is_empty() {
        None
    } else {
        Some(token)
    }
}

// value between `key` and the next double quote; None until both have arrived
fn quoted_after(text: &str, key: &str) -> Option<String> {
    let start = text.find(key)? + key.len();
    let rest = &text[start..];
    let end = rest.find('"')?;
    Some(rest[..end].to_string())
}
