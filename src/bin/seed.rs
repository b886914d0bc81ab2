use argon2::{
    Argon2, PasswordHasher,
    password_hash::{SaltString, rand_core::OsRng},
};
use axum_storefront_api::{config::AppConfig, db::create_pool};
use rust_decimal::Decimal;
use uuid::Uuid;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();
    let config = AppConfig::from_env()?;

    let pool = create_pool(&config.database_url).await?;
    // Ensure migrations are applied.
    sqlx::migrate!("./migrations").run(&pool).await?;

    let admin_id = ensure_admin(&pool, "admin@example.com", "Store Admin", "admin123").await?;
    seed_products(&pool).await?;
    seed_testimonials(&pool).await?;

    println!("Seed completed. Admin ID: {admin_id}");
    Ok(())
}

async fn ensure_admin(
    pool: &sqlx::PgPool,
    email: &str,
    name: &str,
    password: &str,
) -> anyhow::Result<Uuid> {
    let salt = SaltString::generate(&mut OsRng);
    let password_hash = Argon2::default()
        .hash_password(password.as_bytes(), &salt)
        .map_err(|e| anyhow::anyhow!(e.to_string()))?
        .to_string();

    let row: Option<(Uuid,)> = sqlx::query_as(
        r#"
        INSERT INTO admins (id, email, name, password_hash)
        VALUES ($1, $2, $3, $4)
        ON CONFLICT (email) DO NOTHING
        RETURNING id
        "#,
    )
    .bind(Uuid::new_v4())
    .bind(email)
    .bind(name)
    .bind(password_hash)
    .fetch_optional(pool)
    .await?;

    let admin_id = match row {
        Some((id,)) => id,
        None => {
            let existing: (Uuid,) = sqlx::query_as("SELECT id FROM admins WHERE email = $1")
                .bind(email)
                .fetch_one(pool)
                .await?;
            existing.0
        }
    };

    println!("Ensured admin {email}");
    Ok(admin_id)
}

struct SeedProduct {
    name: &'static str,
    description: &'static str,
    price: &'static str,
    category: &'static str,
    image: &'static str,
    stock: i32,
    featured: bool,
}

async fn seed_products(pool: &sqlx::PgPool) -> anyhow::Result<()> {
    let products = vec![
        SeedProduct {
            name: "Handwoven Cotton Throw",
            description: "Soft double-weave throw blanket in natural dyes",
            price: "1499.00",
            category: "Home",
            image: "/images/products/cotton-throw.jpg",
            stock: 40,
            featured: true,
        },
        SeedProduct {
            name: "Brass Table Lamp",
            description: "Hand-spun brass lamp with a linen shade",
            price: "2650.00",
            category: "Lighting",
            image: "/images/products/brass-lamp.jpg",
            stock: 15,
            featured: true,
        },
        SeedProduct {
            name: "Ceramic Serving Bowl",
            description: "Stoneware bowl glazed in indigo",
            price: "899.00",
            category: "Kitchen",
            image: "/images/products/serving-bowl.jpg",
            stock: 60,
            featured: false,
        },
        SeedProduct {
            name: "Jute Floor Runner",
            description: "Braided jute runner, 180cm",
            price: "1175.00",
            category: "Home",
            image: "/images/products/jute-runner.jpg",
            stock: 25,
            featured: false,
        },
    ];

    for product in products {
        let exists: Option<(Uuid,)> = sqlx::query_as("SELECT id FROM products WHERE name = $1")
            .bind(product.name)
            .fetch_optional(pool)
            .await?;
        if exists.is_some() {
            continue;
        }

        let price: Decimal = product.price.parse()?;
        sqlx::query(
            r#"
            INSERT INTO products (id, name, description, price, category, image, stock, is_featured)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8)
            "#,
        )
        .bind(Uuid::new_v4())
        .bind(product.name)
        .bind(product.description)
        .bind(price)
        .bind(product.category)
        .bind(product.image)
        .bind(product.stock)
        .bind(product.featured)
        .execute(pool)
        .await?;
    }

    println!("Seeded products");
    Ok(())
}

async fn seed_testimonials(pool: &sqlx::PgPool) -> anyhow::Result<()> {
    let testimonials = vec![
        ("Asha R.", "The throw arrived beautifully packed and the colours are even better in person.", 5),
        ("Vikram S.", "Quick delivery and the lamp looks stunning on my desk.", 4),
    ];

    for (name, text, rating) in testimonials {
        let exists: Option<(Uuid,)> =
            sqlx::query_as("SELECT id FROM testimonials WHERE name = $1 AND text = $2")
                .bind(name)
                .bind(text)
                .fetch_optional(pool)
                .await?;
        if exists.is_some() {
            continue;
        }

        sqlx::query(
            "INSERT INTO testimonials (id, name, text, rating) VALUES ($1, $2, $3, $4)",
        )
        .bind(Uuid::new_v4())
        .bind(name)
        .bind(text)
        .bind(rating)
        .execute(pool)
        .await?;
    }

    println!("Seeded testimonials");
    Ok(())
}
