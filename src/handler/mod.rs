mod responses;
mod stream;

use async_std::net::TcpStream;
use wirehttp::{HandlerError, Request, ResponseWriter};

pub async fn handle_request(
    mut w: ResponseWriter<TcpStream>,
    req: Request,
) -> Result<ResponseWriter<TcpStream>, HandlerError> {
    match req.target.as_str() {
        "/yourproblem" => responses::bad_request(&mut w).await?,
        "/myproblem" => responses::internal_server_error(&mut w).await?,
        target => match target.strip_prefix("/stream/") {
            Some(count) => stream::serve(&mut w, count).await?,
            None => responses::success(&mut w).await?,
        },
    }
    Ok(w)
}
