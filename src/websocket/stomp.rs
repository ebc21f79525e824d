//! Minimal STOMP 1.2 frame codec.
//!
//! Covers the subset the price stream uses: text frames carried one or more
//! per WebSocket message, header escaping, `content-length` bodies and
//! end-of-line heart-beats.

use std::fmt;
use std::time::Duration;

use crate::Result;
use crate::error::CoinsimError;

/// STOMP frame commands, client and server side.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Command {
    Connect,
    Connected,
    Subscribe,
    Unsubscribe,
    Send,
    Disconnect,
    Message,
    Receipt,
    Error,
}

impl Command {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Connect => "CONNECT",
            Self::Connected => "CONNECTED",
            Self::Subscribe => "SUBSCRIBE",
            Self::Unsubscribe => "UNSUBSCRIBE",
            Self::Send => "SEND",
            Self::Disconnect => "DISCONNECT",
            Self::Message => "MESSAGE",
            Self::Receipt => "RECEIPT",
            Self::Error => "ERROR",
        }
    }

    fn parse(text: &str) -> Result<Self> {
        Ok(match text {
            "CONNECT" | "STOMP" => Self::Connect,
            "CONNECTED" => Self::Connected,
            "SUBSCRIBE" => Self::Subscribe,
            "UNSUBSCRIBE" => Self::Unsubscribe,
            "SEND" => Self::Send,
            "DISCONNECT" => Self::Disconnect,
            "MESSAGE" => Self::Message,
            "RECEIPT" => Self::Receipt,
            "ERROR" => Self::Error,
            other => {
                return Err(CoinsimError::Stomp(format!("unknown command {other:?}")));
            }
        })
    }

    /// CONNECT and CONNECTED headers are never escaped.
    fn escapes_headers(&self) -> bool {
        !matches!(self, Self::Connect | Self::Connected)
    }
}

impl fmt::Display for Command {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One STOMP frame.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Frame {
    pub command: Command,
    pub headers: Vec<(String, String)>,
    pub body: String,
}

impl Frame {
    pub fn new(command: Command) -> Self {
        Self {
            command,
            headers: Vec::new(),
            body: String::new(),
        }
    }

    /// Appends a header.
    #[must_use]
    pub fn with_header(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.headers.push((name.into(), value.into()));
        self
    }

    /// Sets the body.
    #[must_use]
    pub fn with_body(mut self, body: impl Into<String>) -> Self {
        self.body = body.into();
        self
    }

    /// Returns the first value of header `name`. Repeated headers keep the
    /// first occurrence, as STOMP 1.2 requires.
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers
            .iter()
            .find(|(k, _)| k == name)
            .map(|(_, v)| v.as_str())
    }

    /// Serializes the frame, NUL terminator included.
    ///
    /// A `content-length` header is added for non-empty bodies unless one
    /// is already present.
    pub fn encode(&self) -> String {
        let escape = self.command.escapes_headers();
        let mut out = String::with_capacity(64 + self.body.len());
        out.push_str(self.command.as_str());
        out.push('\n');

        for (name, value) in &self.headers {
            if escape {
                out.push_str(&escape_header(name));
                out.push(':');
                out.push_str(&escape_header(value));
            } else {
                out.push_str(name);
                out.push(':');
                out.push_str(value);
            }
            out.push('\n');
        }

        if !self.body.is_empty() && self.header("content-length").is_none() {
            out.push_str(&format!("content-length:{}\n", self.body.len()));
        }

        out.push('\n');
        out.push_str(&self.body);
        out.push('\0');
        out
    }
}

/// Wire form of an outgoing heart-beat.
pub const HEARTBEAT: &str = "\n";

/// Decodes every frame in one WebSocket text message.
///
/// A message holding only end-of-line characters is a heart-beat and yields
/// an empty list.
///
/// # Errors
///
/// Returns [`CoinsimError::Stomp`] for unknown commands, bad header lines,
/// invalid escapes, or a frame missing its NUL terminator.
pub fn decode(text: &str) -> Result<Vec<Frame>> {
    let mut frames = Vec::new();
    let mut rest = text;

    loop {
        rest = rest.trim_start_matches(['\r', '\n']);
        if rest.is_empty() {
            break;
        }
        let (frame, consumed) = decode_frame(rest)?;
        frames.push(frame);
        rest = &rest[consumed..];
    }

    Ok(frames)
}

fn decode_frame(input: &str) -> Result<(Frame, usize)> {
    let (command_line, mut pos) = read_line(input, 0)?;
    let command = Command::parse(command_line)?;
    let unescape = command.escapes_headers();

    let mut headers = Vec::new();
    loop {
        let (line, next) = read_line(input, pos)?;
        pos = next;
        if line.is_empty() {
            break;
        }
        let (name, value) = line
            .split_once(':')
            .ok_or_else(|| CoinsimError::Stomp(format!("bad header line {line:?}")))?;
        if unescape {
            headers.push((unescape_header(name)?, unescape_header(value)?));
        } else {
            headers.push((name.to_string(), value.to_string()));
        }
    }

    let frame = Frame {
        command,
        headers,
        body: String::new(),
    };

    let body_end = match frame.header("content-length") {
        Some(len) => {
            let len: usize = len
                .trim()
                .parse()
                .map_err(|_| CoinsimError::Stomp(format!("bad content-length {len:?}")))?;
            let end = pos.checked_add(len).ok_or_else(|| {
                CoinsimError::Stomp(format!("content-length {len} out of range"))
            })?;
            if input.as_bytes().get(end) != Some(&0) || !input.is_char_boundary(end) {
                return Err(CoinsimError::Stomp(
                    "body does not match content-length".to_string(),
                ));
            }
            end
        }
        None => {
            pos + input[pos..]
                .find('\0')
                .ok_or_else(|| CoinsimError::Stomp("frame is not NUL-terminated".to_string()))?
        }
    };

    let body = input[pos..body_end].to_string();
    Ok((Frame { body, ..frame }, body_end + 1))
}

/// Returns the line starting at `pos` without its EOL, and the offset after it.
fn read_line(input: &str, pos: usize) -> Result<(&str, usize)> {
    let len = input[pos..]
        .find('\n')
        .ok_or_else(|| CoinsimError::Stomp("truncated frame header".to_string()))?;
    let line = &input[pos..pos + len];
    Ok((line.strip_suffix('\r').unwrap_or(line), pos + len + 1))
}

fn escape_header(raw: &str) -> String {
    let mut out = String::with_capacity(raw.len());
    for ch in raw.chars() {
        match ch {
            '\\' => out.push_str("\\\\"),
            '\n' => out.push_str("\\n"),
            '\r' => out.push_str("\\r"),
            ':' => out.push_str("\\c"),
            other => out.push(other),
        }
    }
    out
}

fn unescape_header(raw: &str) -> Result<String> {
    let mut out = String::with_capacity(raw.len());
    let mut chars = raw.chars();
    while let Some(ch) = chars.next() {
        if ch != '\\' {
            out.push(ch);
            continue;
        }
        match chars.next() {
            Some('\\') => out.push('\\'),
            Some('n') => out.push('\n'),
            Some('r') => out.push('\r'),
            Some('c') => out.push(':'),
            other => {
                return Err(CoinsimError::Stomp(format!(
                    "invalid header escape \\{}",
                    other.map(String::from).unwrap_or_default()
                )));
            }
        }
    }
    Ok(out)
}

/// Negotiated heart-beat periods for one connection.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct Heartbeat {
    /// How often this side must send something.
    pub outgoing: Option<Duration>,
    /// How often the server promises to send something.
    pub incoming: Option<Duration>,
}

impl Heartbeat {
    /// Combines the client's `heart-beat` offer with the server's reply.
    ///
    /// Each direction is disabled when either side offers 0, otherwise it
    /// runs at the larger of the two values. A missing or malformed server
    /// header disables both directions.
    pub fn negotiate(client: (u64, u64), server: Option<&str>) -> Self {
        let Some((sx, sy)) = server.and_then(parse_heartbeat) else {
            return Self::default();
        };
        let (cx, cy) = client;

        let period = |ours: u64, theirs: u64| {
            (ours != 0 && theirs != 0).then(|| Duration::from_millis(ours.max(theirs)))
        };

        Self {
            outgoing: period(cx, sy),
            incoming: period(cy, sx),
        }
    }
}

fn parse_heartbeat(value: &str) -> Option<(u64, u64)> {
    let (x, y) = value.split_once(',')?;
    Some((x.trim().parse().ok()?, y.trim().parse().ok()?))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn encode_subscribe() {
        let frame = Frame::new(Command::Subscribe)
            .with_header("id", "sub-0")
            .with_header("destination", "/topic/prices");
        assert_eq!(
            frame.encode(),
            "SUBSCRIBE\nid:sub-0\ndestination:/topic/prices\n\n\0"
        );
    }

    #[test]
    fn encode_send_adds_content_length() {
        let frame = Frame::new(Command::Send)
            .with_header("destination", "/app/subscribe-all")
            .with_body("{}");
        assert_eq!(
            frame.encode(),
            "SEND\ndestination:/app/subscribe-all\ncontent-length:2\n\n{}\0"
        );
    }

    #[test]
    fn connect_headers_are_not_escaped() {
        let frame = Frame::new(Command::Connect).with_header("host", "localhost:8080");
        assert!(frame.encode().contains("host:localhost:8080\n"));
    }

    #[test]
    fn header_escaping_is_reversible() {
        let frame = Frame::new(Command::Message)
            .with_header("note", "a:b\\c\nd")
            .with_body("x");
        let encoded = frame.encode();
        assert!(encoded.contains("note:a\\cb\\\\c\\nd\n"));

        let decoded = decode(&encoded).unwrap();
        assert_eq!(decoded[0].header("note"), Some("a:b\\c\nd"));
    }

    #[test]
    fn decode_message_without_content_length() {
        let text = "MESSAGE\r\ndestination:/topic/prices\r\nsubscription:sub-0\r\n\r\n[{\"symbol\":\"XBT/USD\"}]\0\n";
        let frames = decode(text).unwrap();
        assert_eq!(frames.len(), 1);
        assert_eq!(frames[0].command, Command::Message);
        assert_eq!(frames[0].header("destination"), Some("/topic/prices"));
        assert_eq!(frames[0].body, "[{\"symbol\":\"XBT/USD\"}]");
    }

    #[test]
    fn decode_respects_content_length_with_embedded_nul() {
        let text = "MESSAGE\ncontent-length:3\n\na\0b\0";
        let frames = decode(text).unwrap();
        assert_eq!(frames[0].body, "a\0b");
    }

    #[test]
    fn decode_multiple_frames_and_heartbeats() {
        let text = "\nRECEIPT\nreceipt-id:1\n\n\0\nMESSAGE\n\nhi\0";
        let frames = decode(text).unwrap();
        assert_eq!(frames.len(), 2);
        assert_eq!(frames[0].command, Command::Receipt);
        assert_eq!(frames[1].body, "hi");
    }

    #[test]
    fn heartbeat_only_message() {
        assert!(decode("\n").unwrap().is_empty());
        assert!(decode("\r\n").unwrap().is_empty());
    }

    #[test]
    fn repeated_header_keeps_first() {
        let frames = decode("MESSAGE\nfoo:1\nfoo:2\n\n\0").unwrap();
        assert_eq!(frames[0].header("foo"), Some("1"));
    }

    #[test]
    fn decode_rejects_garbage() {
        assert!(decode("HELLO\n\n\0").is_err());
        assert!(decode("MESSAGE\nno-colon\n\n\0").is_err());
        assert!(decode("MESSAGE\n\nunterminated").is_err());
        assert!(decode("MESSAGE\nbad:\\x\n\n\0").is_err());
        assert!(decode("MESSAGE\ncontent-length:10\n\nshort\0").is_err());
        assert!(matches!(
            decode("MESSAGE\ncontent-length:18446744073709551615\n\n{}\0"),
            Err(CoinsimError::Stomp(_))
        ));
    }

    #[test]
    fn heartbeat_negotiation() {
        let hb = Heartbeat::negotiate((4000, 4000), Some("10000,10000"));
        assert_eq!(hb.outgoing, Some(Duration::from_millis(10000)));
        assert_eq!(hb.incoming, Some(Duration::from_millis(10000)));

        let hb = Heartbeat::negotiate((4000, 4000), Some("0,1000"));
        assert_eq!(hb.outgoing, Some(Duration::from_millis(4000)));
        assert_eq!(hb.incoming, None);

        let hb = Heartbeat::negotiate((0, 0), Some("5000,5000"));
        assert_eq!(hb, Heartbeat::default());

        assert_eq!(Heartbeat::negotiate((4000, 4000), None), Heartbeat::default());
        assert_eq!(
            Heartbeat::negotiate((4000, 4000), Some("junk")),
            Heartbeat::default()
        );
    }
}
