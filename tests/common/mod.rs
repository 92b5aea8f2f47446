use async_std::io::{ReadExt, WriteExt};
use async_std::net::{SocketAddr, TcpStream};
use std::net::{IpAddr, Ipv4Addr};
use wirehttp::ServerConfig;

/// Config bound to an ephemeral localhost port.
pub fn test_config() -> ServerConfig {
    ServerConfig {
        address: IpAddr::V4(Ipv4Addr::LOCALHOST),
        port: 0,
        ..ServerConfig::default()
    }
}

/// Sends `request` in pieces of `per_write` bytes and reads the response
/// until the server closes the connection.
pub async fn roundtrip(addr: SocketAddr, request: &[u8], per_write: usize) -> String {
    let mut tcp = TcpStream::connect(addr).await.expect("connect");
    for chunk in request.chunks(per_write) {
        tcp.write_all(chunk).await.expect("write request");
        tcp.flush().await.expect("flush request");
    }

    let mut response = String::new();
    tcp.read_to_string(&mut response).await.expect("read response");
    response
}
