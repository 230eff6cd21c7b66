use std::env;

use anyhow::Error;
use reqwest::Client;
use serde_json::{Value, json};

#[tokio::main]
async fn main() -> Result<(), Error> {
    let base = env::args()
        .nth(1)
        .unwrap_or_else(|| "http://localhost:1111".to_string());
    let client = Client::new();

    let stats: Value = client
        .get(format!("{base}/stats"))
        .send()
        .await?
        .json()
        .await?;
    println!("Stats before: {stats}");

    let first = signup(&client, &base, "Astrid", "astrid@example.dk", None).await?;
    println!("First signup: {first}");

    let referral = first["referral_code"]
        .as_str()
        .unwrap_or_default()
        .to_string();

    let second = signup(&client, &base, "Bo", "bo@example.dk", Some(&referral)).await?;
    println!("Second signup (referred): {second}");

    let duplicate = signup(&client, &base, "Astrid", "astrid@example.dk", None).await?;
    println!("Duplicate signup: {duplicate}");

    let stats: Value = client
        .get(format!("{base}/stats"))
        .send()
        .await?
        .json()
        .await?;
    println!("Stats after: {stats}");

    Ok(())
}

async fn signup(
    client: &Client,
    base: &str,
    first_name: &str,
    email: &str,
    referred_by: Option<&str>,
) -> Result<Value, Error> {
    let response = client
        .post(format!("{base}/waitlist"))
        .json(&json!({
            "first_name": first_name,
            "email": email,
            "interests": ["Kaffe", "Brætspil"],
            "referred_by": referred_by,
        }))
        .send()
        .await?;

    Ok(response.json().await?)
}
