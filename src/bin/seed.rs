use anyhow::Context;
use gym_store_api::{
    db::{create_pool, run_migrations},
    models::Role,
    services::auth_service::hash_password,
};
use uuid::Uuid;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();
    let database_url = std::env::var("DATABASE_URL").context("DATABASE_URL is not set")?;

    let pool = create_pool(&database_url).await?;
    run_migrations(&pool).await?;

    let admin_id = ensure_user(&pool, "admin@gymstore.test", "admin123", "Store Admin", Role::Admin).await?;
    let driver_id = ensure_user(&pool, "driver@gymstore.test", "driver123", "Dana Driver", Role::Delivery).await?;
    let user_id = ensure_user(&pool, "lifter@gymstore.test", "lifter123", "Sam Lifter", Role::User).await?;
    seed_products(&pool).await?;
    seed_coupon(&pool).await?;

    println!("Seed completed. Admin: {admin_id}, delivery: {driver_id}, customer: {user_id}");
    Ok(())
}

async fn ensure_user(
    pool: &sqlx::PgPool,
    email: &str,
    password: &str,
    name: &str,
    role: Role,
) -> anyhow::Result<Uuid> {
    let password_hash = hash_password(password).map_err(|e| anyhow::anyhow!(e.to_string()))?;

    let (user_id,): (Uuid,) = sqlx::query_as(
        r#"
        INSERT INTO users (id, email, password_hash, name, role)
        VALUES ($1, $2, $3, $4, $5)
        ON CONFLICT (email) DO UPDATE SET role = EXCLUDED.role
        RETURNING id
        "#,
    )
    .bind(Uuid::new_v4())
    .bind(email)
    .bind(password_hash)
    .bind(name)
    .bind(role.as_str())
    .fetch_one(pool)
    .await?;

    println!("Ensured user {email} (role={role})");
    Ok(user_id)
}

async fn seed_products(pool: &sqlx::PgPool) -> anyhow::Result<()> {
    let products = [
        ("Whey Isolate 2kg", "Unflavoured whey protein isolate", "protein", 5999_i64, 40_i32),
        ("Creatine Monohydrate 500g", "Micronized, no additives", "creatine", 2499, 120),
        ("Pre-Workout Citrus", "Caffeine and beta-alanine blend", "pre-workout", 3499, 25),
        ("BCAA 2:1:1 300g", "Branched-chain amino acids", "amino-acids", 1999, 4),
        ("Shaker Bottle 700ml", "Leak-proof shaker", "accessories", 899, 200),
    ];

    for (name, desc, category, price, stock) in products {
        sqlx::query(
            r#"
            INSERT INTO products (id, name, description, category, price, stock)
            VALUES ($1, $2, $3, $4, $5, $6)
            ON CONFLICT (name) DO NOTHING
            "#,
        )
        .bind(Uuid::new_v4())
        .bind(name)
        .bind(desc)
        .bind(category)
        .bind(price)
        .bind(stock)
        .execute(pool)
        .await?;
    }

    println!("Seeded products");
    Ok(())
}

async fn seed_coupon(pool: &sqlx::PgPool) -> anyhow::Result<()> {
    sqlx::query(
        r#"
        INSERT INTO coupons (id, code, discount, influencer_name)
        VALUES ($1, 'SAVE20', 20, 'Coach Lena')
        ON CONFLICT (code) DO NOTHING
        "#,
    )
    .bind(Uuid::new_v4())
    .execute(pool)
    .await?;

    println!("Seeded coupon SAVE20");
    Ok(())
}
