#[cfg(feature = "http_api")]
#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    use vacation_quote::{AppConfig, Quote, http_api, telemetry};

    let config = AppConfig::from_env()?;
    telemetry::init(&config.log_filter)?;

    let settings = config.quote_settings()?;
    let quote = Quote::new_with_settings(settings)?;

    println!(
        "vacation-quote HTTP API listening on http://{}",
        config.http_addr
    );
    http_api::serve(config.http_addr, quote).await?;
    Ok(())
}

#[cfg(not(feature = "http_api"))]
fn main() {
    eprintln!("Rebuild with the `http_api` feature to enable the HTTP server.");
}
