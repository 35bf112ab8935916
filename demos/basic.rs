use serde_json::json;

use kai_platform::Platform;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .init();

    let platform = Platform::open("./data")?;

    let subscription = platform
        .create_webhook(json!({
            "url": "https://example.com/hooks/kai",
            "events": ["host.deleted"],
        }))
        .await?;
    println!("subscription {} secret: {}", subscription.id, subscription.secret);

    let host = platform
        .create_host(json!({
            "name": "Kai",
            "creatorId": "user_001",
            "description": "Coffee salon host",
        }))
        .await?;
    let id = host["id"].as_str().unwrap().to_string();
    println!("created host {id}");

    platform
        .update_datm(
            &id,
            json!({"truth": 80, "goodness": 70, "beauty": 60, "intelligence": 90}),
        )
        .await?;

    platform.delete_host(&id).await?;

    // Give the detached delivery task a moment before the runtime exits.
    tokio::time::sleep(std::time::Duration::from_secs(1)).await;
    Ok(())
}
