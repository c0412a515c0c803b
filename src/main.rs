#[tokio::main]
async fn main() {
    if let Err(e) = medcheck::run().await {
        eprintln!("medcheck: {e}");
        std::process::exit(1);
    }
}
