use crate::{config::Config, server};

pub async fn serve(mut config: Config, addr: Option<String>) -> crate::Res<()> {
    if let Some(addr) = addr {
        config.server_address = addr;
    }
    server::start_api_server(config).await
}
