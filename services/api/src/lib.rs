mod cli;
mod error;
mod infra;
mod routes;
mod score;
mod server;

pub use error::AppError;

pub async fn run() -> Result<(), AppError> {
    cli::run().await
}
