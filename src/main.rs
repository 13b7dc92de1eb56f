#[tokio::main]
async fn main() {
    if let Err(e) = quorum::cli::run_main().await {
        quorum::core::terminal::print_error(&format!("{}", e));
        std::process::exit(1);
    }
}
