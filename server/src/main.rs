#[tokio::main]
async fn main() {
    waitlist::start_server().await;
}
