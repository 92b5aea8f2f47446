use async_std::net::TcpStream;
use wirehttp::{HandlerError, ResponseWriter, StatusCode};

async fn html_page(
    w: &mut ResponseWriter<TcpStream>,
    status: StatusCode,
    heading: &str,
    text: &str,
) -> Result<(), HandlerError> {
    w.write_status_line(status)
        .await
        .map_err(|e| HandlerError::new(StatusCode::INTERNAL_SERVER_ERROR, e.to_string()))?;
    w.set("Content-Type", "text/html");

    let body = format!(
        "<html><head><title>{} {}</title></head><body><h1>{}</h1><p>{}</p></body></html>",
        status,
        status.reason(),
        heading,
        text
    );
    w.write(body.as_bytes());
    Ok(())
}

pub async fn success(w: &mut ResponseWriter<TcpStream>) -> Result<(), HandlerError> {
    html_page(w, StatusCode::OK, "Success!", "Your request was an absolute banger.").await
}

pub async fn bad_request(w: &mut ResponseWriter<TcpStream>) -> Result<(), HandlerError> {
    html_page(
        w,
        StatusCode::BAD_REQUEST,
        "Bad Request",
        "Your request honestly kinda sucked.",
    )
    .await
}

pub async fn internal_server_error(w: &mut ResponseWriter<TcpStream>) -> Result<(), HandlerError> {
    html_page(
        w,
        StatusCode::INTERNAL_SERVER_ERROR,
        "Internal Server Error",
        "Okay, you know what? This one is on me.",
    )
    .await
}
