mod handler;

use async_std::task;
use log::info;
use wirehttp::{Server, ServerConfig};

fn main() -> std::io::Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let config = match std::env::args().nth(1) {
        Some(path) => ServerConfig::from_file(path),
        None => ServerConfig::default(),
    };

    task::block_on(async {
        let server = Server::serve(config, handler::handle_request).await?;
        info!("Server started on {}", server.local_addr());
        server.wait().await;
        Ok(())
    })
}
