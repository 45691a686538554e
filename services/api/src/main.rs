use hire_bridge_api::run;

#[tokio::main]
async fn main() {
    if let Err(err) = run().await {
        eprintln!("hire-bridge: {err}");
        std::process::exit(1);
    }
}
