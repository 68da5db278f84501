mod cli;
mod infra;
mod routes;
mod server;
mod suggest;

use goods_review::error::AppError;

pub async fn run() -> Result<(), AppError> {
    cli::run().await
}
