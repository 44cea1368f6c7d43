use anyhow::Context;
use gym_store_api::db::{create_pool, run_migrations};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();
    let database_url = std::env::var("DATABASE_URL").context("DATABASE_URL is not set")?;
    let pool = create_pool(&database_url).await?;
    run_migrations(&pool).await?;
    println!("Migrations applied");
    Ok(())
}
