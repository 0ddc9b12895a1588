use std::net::{Ipv4Addr, SocketAddr};

use poem::listener::{Acceptor, Listener, TcpListener};
use poem::test::TestClient;
use poem::{Endpoint, IntoEndpoint, Server};

use crate::opts::UpstreamOpts;
use crate::prelude::*;
use crate::web::create_app;
use crate::web::state::State;

pub fn upstream_opts(base_url: &str) -> UpstreamOpts {
    UpstreamOpts {
        base_url: base_url.to_string(),
        timeout: StdDuration::from_secs(5),
        propagate_upstream_status: false,
    }
}

pub fn create_test_client(opts: UpstreamOpts) -> Result<TestClient<impl Endpoint>> {
    Ok(TestClient::new(create_app(State::new(&opts)?)))
}

/// Serves the stub prediction service on an ephemeral port and returns its base URL.
pub async fn spawn_stub_upstream<E>(ep: E) -> Result<String>
where
    E: IntoEndpoint + Send + 'static,
    E::Endpoint: 'static,
{
    let acceptor = TcpListener::bind((Ipv4Addr::LOCALHOST, 0))
        .into_acceptor()
        .await?;
    let address = acceptor
        .local_addr()
        .into_iter()
        .find_map(|address| address.as_socket_addr().copied())
        .ok_or_else(|| anyhow!("the stub is not bound to a socket address"))?;
    tokio::spawn(Server::new_with_acceptor(acceptor).run(ep));
    Ok(format!("http://{}", address))
}

/// Base URL at which nothing listens, so that connections get refused.
pub fn unreachable_base_url() -> Result<String> {
    let listener = std::net::TcpListener::bind(SocketAddr::from((Ipv4Addr::LOCALHOST, 0)))?;
    let address = listener.local_addr()?;
    drop(listener);
    Ok(format!("http://{}", address))
}
