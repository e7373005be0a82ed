use dinely_api::{
    config::AppConfig,
    db::{create_orm_conn, run_migrations},
    seed::seed_demo,
};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();
    let config = AppConfig::from_env()?;

    let orm = create_orm_conn(&config.database_url).await?;
    run_migrations(&orm).await?;

    let summary = seed_demo(&orm).await?;
    println!(
        "Seed completed. Admin ID: {}, waiter ID: {}, kitchen ID: {}",
        summary.admin_id, summary.waiter_id, summary.kitchen_id
    );
    Ok(())
}
