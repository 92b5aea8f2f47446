//! Chunked streaming demo: `n` JSON lines, one chunk each, followed by
//! `X-Content-SHA256` and `X-Content-Length` trailers.

use async_std::io::Write;
use log::debug;
use sha2::{Digest, Sha256};
use wirehttp::{HandlerError, Headers, ResponseWriter, StatusCode, WriteError};

const MAX_LINES: usize = 100;

pub async fn serve<W: Write + Unpin>(w: &mut ResponseWriter<W>, count: &str) -> Result<(), HandlerError> {
    let count = match count.parse::<usize>() {
        Ok(n) if n <= MAX_LINES => n,
        _ => {
            return Err(HandlerError::new(
                StatusCode::BAD_REQUEST,
                format!("line count must be a number up to {}", MAX_LINES),
            ));
        }
    };

    // Once the status line is out the response can no longer be replaced,
    // so write errors past this point only end the connection.
    if let Err(err) = stream_lines(w, count).await {
        debug!("Stream aborted: {}", err);
    }
    Ok(())
}

async fn stream_lines<W: Write + Unpin>(w: &mut ResponseWriter<W>, count: usize) -> Result<(), WriteError> {
    w.write_status_line(StatusCode::OK).await?;
    w.set("Transfer-Encoding", "chunked");
    w.set("Content-Type", "application/json");
    w.set("Trailer", "X-Content-SHA256");
    w.set("Trailer", "X-Content-Length");
    w.apply_default_headers();
    w.write_headers().await?;

    let mut hasher = Sha256::new();
    let mut total = 0;
    for id in 0..count {
        let line = format!("{{\"id\": {}}}\n", id);
        w.write_chunked_body(line.as_bytes()).await?;
        hasher.update(line.as_bytes());
        total += line.len();
    }
    w.write_chunked_body_done().await?;

    let mut trailers = Headers::new();
    trailers.set("X-Content-SHA256", &format!("{:x}", hasher.finalize()));
    trailers.set("X-Content-Length", &total.to_string());
    w.write_trailers(&trailers).await
}
