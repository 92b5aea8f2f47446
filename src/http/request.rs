use crate::error::ParseError;
use crate::http::headers::Headers;
use crate::http::{CRLF, HTTP_VERSION, HttpMethod, find_crlf};

const CONTENT_LENGTH: &str = "content-length";

/// Parser progress, strictly forward.
///
/// `ParsingBody` is skipped when no body is declared.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum ParseState {
    Initialized,
    ParsingHeaders,
    ParsingBody,
    Done,
}

/// An HTTP/1.1 request, filled in step by step as bytes arrive.
///
/// Once `state` is [`ParseState::Done`] the request is complete and is
/// handed to the handler as-is.
#[derive(Debug)]
pub struct Request {
    pub method: HttpMethod,
    pub target: String,
    pub http_version: String,
    pub headers: Headers,
    pub body: Vec<u8>,
    pub state: ParseState,
}

impl Default for Request {
    fn default() -> Self {
        Self::new()
    }
}

impl Request {
    pub fn new() -> Self {
        Self {
            method: HttpMethod::Get,
            target: String::new(),
            http_version: String::new(),
            headers: Headers::new(),
            body: Vec::new(),
            state: ParseState::Initialized,
        }
    }

    pub fn is_done(&self) -> bool {
        self.state == ParseState::Done
    }

    /// Declared body length. An absent header means no body.
    pub fn content_length(&self) -> Result<usize, ParseError> {
        let value = self.headers.get(CONTENT_LENGTH);
        if value.is_empty() {
            return Ok(0);
        }
        // `usize` parsing rejects a leading minus sign as well as garbage.
        value
            .parse::<usize>()
            .map_err(|_| ParseError::InvalidContentLength)
    }

    /// Runs parse steps over `data` until one makes no progress or the
    /// request is done. Returns the number of bytes consumed.
    ///
    /// Calling this on a finished request is an error.
    pub fn parse(&mut self, data: &[u8]) -> Result<usize, ParseError> {
        if self.state == ParseState::Done {
            return Err(ParseError::AlreadyDone);
        }

        let mut parsed = 0;

        while self.state != ParseState::Done {
            let n = self.parse_single(&data[parsed..])?;
            if n == 0 {
                break;
            }
            parsed += n;
        }

        Ok(parsed)
    }

    /// Runs exactly one step of the state machine.
    pub fn parse_single(&mut self, data: &[u8]) -> Result<usize, ParseError> {
        match self.state {
            ParseState::Initialized => {
                let n = self.parse_request_line(data)?;
                if n > 0 {
                    self.state = ParseState::ParsingHeaders;
                }
                Ok(n)
            }
            ParseState::ParsingHeaders => {
                let (n, done) = self.headers.parse_line(data)?;
                if done {
                    self.state = match self.content_length()? {
                        0 => ParseState::Done,
                        _ => ParseState::ParsingBody,
                    };
                }
                Ok(n)
            }
            ParseState::ParsingBody => self.parse_body(data),
            ParseState::Done => Err(ParseError::AlreadyDone),
        }
    }

    /// `METHOD SP TARGET SP HTTP/VERSION CRLF`
    fn parse_request_line(&mut self, data: &[u8]) -> Result<usize, ParseError> {
        let line_end = match find_crlf(data) {
            Some(idx) => idx,
            None => return Ok(0),
        };

        let line = std::str::from_utf8(&data[..line_end])
            .map_err(|_| ParseError::MalformedRequestLine)?;

        let parts: Vec<&str> = line.split(' ').collect();
        let [method, target, version] = parts[..] else {
            return Err(ParseError::MalformedRequestLine);
        };

        let version = version
            .strip_prefix("HTTP/")
            .ok_or(ParseError::UnsupportedHttpVersion)?;
        if version != HTTP_VERSION {
            return Err(ParseError::UnsupportedHttpVersion);
        }

        let method = method
            .parse::<HttpMethod>()
            .map_err(|_| ParseError::UnsupportedHttpMethod)?;

        self.method = method;
        self.target = target.to_string();
        self.http_version = version.to_string();

        Ok(line_end + CRLF.len())
    }

    fn parse_body(&mut self, data: &[u8]) -> Result<usize, ParseError> {
        let content_length = self.content_length()?;
        let remaining = content_length.saturating_sub(self.body.len());
        let to_consume = data.len().min(remaining);

        self.body.extend_from_slice(&data[..to_consume]);

        if self.body.len() > content_length {
            return Err(ParseError::BodyTooLong);
        }
        if self.body.len() == content_length {
            self.state = ParseState::Done;
        }

        Ok(to_consume)
    }
}
