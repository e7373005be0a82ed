use dinely_api::{
    config::AppConfig,
    db::{create_orm_conn, run_migrations},
};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();
    let config = AppConfig::from_env()?;
    let orm = create_orm_conn(&config.database_url).await?;
    run_migrations(&orm).await?;
    println!("Migrations applied to {}", redact(&config.database_url));
    Ok(())
}

fn redact(url: &str) -> &str {
    url.split_once('@').map(|(_, host)| host).unwrap_or(url)
}
