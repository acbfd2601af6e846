use tracing::Level;

#[rocket::main]
async fn main() {
    #[cfg(debug_assertions)]
    let level = Some(Level::DEBUG);
    #[cfg(not(debug_assertions))]
    let level = Some(Level::INFO);

    let r = match studyhive_backend::create(level).await {
        Ok(r) => r,
        Err(e) => {
            tracing::error!("Unable to start server: {}", e);
            return;
        }
    };

    if let Err(e) = r.launch().await {
        tracing::error!("Error launching server: {}", e);
    }
}
