use async_std::net::TcpStream;
use async_std::io::WriteExt;
use std::time::{Duration, Instant};
use wirehttp::{HandlerError, Headers, Request, ResponseWriter, Server, ServerConfig, StatusCode};

mod common;

async fn hello(
    mut w: ResponseWriter<TcpStream>,
    req: Request,
) -> Result<ResponseWriter<TcpStream>, HandlerError> {
    w.set("X-Target", &req.target);
    w.write(b"hello ");
    w.write(&req.body);
    Ok(w)
}

#[async_std::test]
async fn server_request_200_ok() {
    let server = Server::serve(common::test_config(), hello).await.unwrap();

    let res = common::roundtrip(
        server.local_addr(),
        b"GET /path HTTP/1.1\r\nHost: localhost:42069\r\n\r\n",
        1024,
    )
    .await;

    assert_eq!(
        res,
        "HTTP/1.1 200 OK\r\n\
         x-target: /path\r\n\
         content-length: 6\r\n\
         connection: close\r\n\
         content-type: text/plain\r\n\
         \r\n\
         hello "
    );
    server.close().await;
}

#[async_std::test]
async fn server_request_body_in_small_writes() {
    let server = Server::serve(common::test_config(), hello).await.unwrap();

    let res = common::roundtrip(
        server.local_addr(),
        b"POST /submit HTTP/1.1\r\nContent-Length: 5\r\n\r\nworld",
        3,
    )
    .await;

    assert!(res.starts_with("HTTP/1.1 200 OK\r\n"), "{}", res);
    assert!(res.contains("content-length: 11\r\n"), "{}", res);
    assert!(res.ends_with("\r\n\r\nhello world"), "{}", res);
    server.close().await;
}

#[async_std::test]
async fn server_malformed_request_is_400() {
    let server = Server::serve(common::test_config(), hello).await.unwrap();

    let res = common::roundtrip(server.local_addr(), b"GARBAGE\r\n\r\n", 1024).await;

    assert_eq!(
        res,
        "HTTP/1.1 400 Bad Request\r\n\
         content-type: text/plain\r\n\
         content-length: 22\r\n\
         connection: close\r\n\
         \r\n\
         malformed request line"
    );
    server.close().await;
}

#[async_std::test]
async fn server_early_close_gets_400() {
    let server = Server::serve(common::test_config(), hello).await.unwrap();

    let mut tcp = TcpStream::connect(server.local_addr()).await.unwrap();
    tcp.write_all(b"GET / HTTP/1.1\r\nHost: localhost:42069\r\nUser-Agent: curl/7.81.0")
        .await
        .unwrap();
    tcp.shutdown(std::net::Shutdown::Write).unwrap();

    let mut res = String::new();
    async_std::io::ReadExt::read_to_string(&mut tcp, &mut res)
        .await
        .unwrap();
    assert!(res.starts_with("HTTP/1.1 400 Bad Request\r\n"), "{}", res);
    assert!(res.ends_with("incomplete data"), "{}", res);
    server.close().await;
}

#[async_std::test]
async fn server_handler_error() {
    let server = Server::serve(common::test_config(), |_w: ResponseWriter<TcpStream>, _req: Request| async {
        Err::<ResponseWriter<TcpStream>, _>(HandlerError::new(
            StatusCode::INTERNAL_SERVER_ERROR,
            "boom",
        ))
    })
    .await
    .unwrap();

    let res = common::roundtrip(server.local_addr(), b"GET / HTTP/1.1\r\n\r\n", 1024).await;

    assert!(res.starts_with("HTTP/1.1 500 Internal Server Error\r\n"), "{}", res);
    assert!(res.ends_with("\r\n\r\nboom"), "{}", res);
    server.close().await;
}

async fn chunked(
    mut w: ResponseWriter<TcpStream>,
    _req: Request,
) -> Result<ResponseWriter<TcpStream>, HandlerError> {
    let fail = |e: wirehttp::WriteError| HandlerError::new(StatusCode::INTERNAL_SERVER_ERROR, e.to_string());

    w.write_status_line(StatusCode::OK).await.map_err(fail)?;
    w.set("Transfer-Encoding", "chunked");
    w.set("Trailer", "X-Content-Length");
    w.apply_default_headers();
    w.write_headers().await.map_err(fail)?;
    w.write_chunked_body(b"abc").await.map_err(fail)?;
    w.write_chunked_body(b"defg").await.map_err(fail)?;
    w.write_chunked_body_done().await.map_err(fail)?;

    let mut trailers = Headers::new();
    trailers.set("X-Content-Length", "7");
    w.write_trailers(&trailers).await.map_err(fail)?;
    Ok(w)
}

#[async_std::test]
async fn server_chunked_with_trailers() {
    let server = Server::serve(common::test_config(), chunked).await.unwrap();

    let res = common::roundtrip(server.local_addr(), b"GET / HTTP/1.1\r\n\r\n", 1).await;

    assert_eq!(
        res,
        "HTTP/1.1 200 OK\r\n\
         transfer-encoding: chunked\r\n\
         trailer: X-Content-Length\r\n\
         content-type: text/plain\r\n\
         \r\n\
         3\r\nabc\r\n\
         4\r\ndefg\r\n\
         0\r\n\
         x-content-length: 7\r\n\
         \r\n"
    );
    server.close().await;
}

async fn chunked_without_trailers(
    mut w: ResponseWriter<TcpStream>,
    _req: Request,
) -> Result<ResponseWriter<TcpStream>, HandlerError> {
    let fail = |e: wirehttp::WriteError| HandlerError::new(StatusCode::INTERNAL_SERVER_ERROR, e.to_string());

    w.write_status_line(StatusCode::OK).await.map_err(fail)?;
    w.set("Transfer-Encoding", "chunked");
    w.set("Trailer", "X-Sum");
    w.apply_default_headers();
    w.write_headers().await.map_err(fail)?;
    w.write_chunked_body(b"abc").await.map_err(fail)?;
    w.write_chunked_body_done().await.map_err(fail)?;
    Ok(w)
}

#[async_std::test]
async fn server_closes_announced_trailer_section() {
    let server = Server::serve(common::test_config(), chunked_without_trailers)
        .await
        .unwrap();

    let res = common::roundtrip(server.local_addr(), b"GET / HTTP/1.1\r\n\r\n", 1024).await;

    assert_eq!(
        res,
        "HTTP/1.1 200 OK\r\n\
         transfer-encoding: chunked\r\n\
         trailer: X-Sum\r\n\
         content-type: text/plain\r\n\
         \r\n\
         3\r\nabc\r\n\
         0\r\n\
         \r\n"
    );
    server.close().await;
}

#[async_std::test]
async fn server_read_timeout_closes_without_response() {
    let config = ServerConfig {
        read_timeout: Duration::from_millis(200),
        ..common::test_config()
    };
    let server = Server::serve(config, hello).await.unwrap();

    let mut tcp = TcpStream::connect(server.local_addr()).await.unwrap();
    tcp.write_all(b"GET / HTTP/1.1\r\n").await.unwrap();

    let started = Instant::now();
    let mut res = String::new();
    async_std::io::ReadExt::read_to_string(&mut tcp, &mut res)
        .await
        .unwrap();

    assert_eq!(res, "");
    assert!(started.elapsed() >= Duration::from_millis(150));
    server.close().await;
}

#[async_std::test]
async fn server_close_stops_accepting() {
    let server = Server::serve(common::test_config(), hello).await.unwrap();
    let addr = server.local_addr();

    server.close().await;

    assert!(TcpStream::connect(addr).await.is_err());
}
