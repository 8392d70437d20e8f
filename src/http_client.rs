use std::time::Duration;

use anyhow::{Context, Result};
use once_cell::sync::OnceCell;
use reqwest::blocking::Client;

const USER_AGENT: &str = concat!("fpl_epaper/", env!("CARGO_PKG_VERSION"));

static CLIENT: OnceCell<Client> = OnceCell::new();

/// Shared blocking client. The timeout only applies on first use.
pub fn http_client(timeout: Option<Duration>) -> Result<&'static Client> {
    CLIENT.get_or_try_init(|| {
        let mut builder = Client::builder().user_agent(USER_AGENT);
        // reqwest's blocking client defaults to 30s; `None` means wait indefinitely.
        builder = builder.timeout(timeout);
        builder.build().context("failed to build http client")
    })
}
