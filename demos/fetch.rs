use std::time::Duration;

use retrying_request::{RequestOptions, RetryingRequest};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let url = std::env::args()
        .nth(1)
        .unwrap_or_else(|| "https://example.com/".to_owned());
    let opts = RequestOptions::from_env().map_err(anyhow::Error::msg)?;

    let mut request = RetryingRequest::get(&url)?
        .with_options(opts)
        .with_timeout(Duration::from_secs(5));

    let response = request.send_response().await?;

    println!(
        "{} {} ({} bytes, {} retries left)",
        response.status,
        url,
        response.bytes().len(),
        request.retries_remaining()
    );
    println!("{}", response.text());

    Ok(())
}
