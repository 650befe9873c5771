mod cli;
mod commands;

use application_forms::error::AppError;

pub async fn run() -> Result<(), AppError> {
    cli::run().await
}
