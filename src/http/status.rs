use std::fmt;

/// Numeric HTTP status code.
///
/// Any code can be written on a status line, but only the codes with an
/// associated constant carry a reason phrase. Others are emitted with an
/// empty reason (`HTTP/1.1 418 \r\n`) until they are added to the table.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct StatusCode(pub u16);

impl StatusCode {
    pub const OK: StatusCode = StatusCode(200);

    pub const BAD_REQUEST: StatusCode = StatusCode(400);

    pub const INTERNAL_SERVER_ERROR: StatusCode = StatusCode(500);

    pub fn reason(&self) -> &'static str {
        match *self {
            StatusCode::OK => "OK",                                       // 200
            StatusCode::BAD_REQUEST => "Bad Request",                     // 400
            StatusCode::INTERNAL_SERVER_ERROR => "Internal Server Error", // 500
            _ => "",
        }
    }
}

impl fmt::Display for StatusCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<u16> for StatusCode {
    fn from(code: u16) -> Self {
        StatusCode(code)
    }
}
