//! Development seed: an active admin and employee, one supplier, a few stock
//! rows and services to sell.

use destilo_api::{
    config::AppConfig,
    db::{create_orm_conn, create_pool, run_migrations},
    services::user_service::hash_password,
};
use uuid::Uuid;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();
    let config = AppConfig::from_env()?;

    let pool = create_pool(&config.database_url).await?;
    let orm = create_orm_conn(&config.database_url).await?;
    run_migrations(&orm).await?;

    let admin_id = ensure_user(&pool, "admin", "admin@destilo-plus.com", "admin123", "admin").await?;
    let user_id = ensure_user(&pool, "empleado", "empleado@destilo-plus.com", "empleado123", "employee")
        .await?;
    let supplier_id = ensure_supplier(&pool).await?;
    seed_stocks(&pool, supplier_id).await?;
    seed_services(&pool).await?;

    println!("Seed completed. Admin ID: {admin_id}, Employee ID: {user_id}");
    Ok(())
}

async fn ensure_user(
    pool: &sqlx::PgPool,
    username: &str,
    email: &str,
    password: &str,
    role: &str,
) -> anyhow::Result<Uuid> {
    let password_hash = hash_password(password).map_err(|e| anyhow::anyhow!(e.to_string()))?;

    let row: (Uuid,) = sqlx::query_as(
        r#"
        INSERT INTO users (id, username, email, password_hash, role, status)
        VALUES ($1, $2, $3, $4, $5, 'validated')
        ON CONFLICT (email) DO UPDATE SET role = EXCLUDED.role, status = 'validated'
        RETURNING id
        "#,
    )
    .bind(Uuid::new_v4())
    .bind(username)
    .bind(email)
    .bind(password_hash)
    .bind(role)
    .fetch_one(pool)
    .await?;

    Ok(row.0)
}

async fn ensure_supplier(pool: &sqlx::PgPool) -> anyhow::Result<Uuid> {
    let existing: Option<(Uuid,)> =
        sqlx::query_as("SELECT id FROM suppliers WHERE nombre = 'Distribuidora Caribe'")
            .fetch_optional(pool)
            .await?;
    if let Some((id,)) = existing {
        return Ok(id);
    }

    let row: (Uuid,) = sqlx::query_as(
        r#"
        INSERT INTO suppliers (id, nombre, razon_social, rif, telefono, email)
        VALUES ($1, 'Distribuidora Caribe', 'Distribuidora Caribe C.A.', 'J-12345678-9',
                '+58-212-5551234', 'ventas@caribe.example')
        RETURNING id
        "#,
    )
    .bind(Uuid::new_v4())
    .fetch_one(pool)
    .await?;

    Ok(row.0)
}

async fn seed_stocks(pool: &sqlx::PgPool, supplier_id: Uuid) -> anyhow::Result<()> {
    let items = [
        ("SH-001", "Shampoo hidratante 500ml", 40, 850_i64),
        ("AC-014", "Acondicionador 500ml", 35, 790_i64),
        ("TN-090", "Tinte castaño oscuro", 20, 1250_i64),
    ];

    for (codigo, producto, cantidad, precio) in items {
        sqlx::query(
            r#"
            INSERT INTO stocks (id, codigo, producto, cantidad, precio_unitario, proveedor_id)
            VALUES ($1, $2, $3, $4, $5, $6)
            ON CONFLICT (codigo) DO NOTHING
            "#,
        )
        .bind(Uuid::new_v4())
        .bind(codigo)
        .bind(producto)
        .bind(cantidad)
        .bind(precio)
        .bind(supplier_id)
        .execute(pool)
        .await?;
    }

    Ok(())
}

async fn seed_services(pool: &sqlx::PgPool) -> anyhow::Result<()> {
    let items = [
        ("Corte de cabello", 1500_i64),
        ("Tinte completo", 4500_i64),
        ("Manicure", 1200_i64),
    ];

    for (servicio, precio) in items {
        let exists: Option<(Uuid,)> = sqlx::query_as("SELECT id FROM services WHERE servicio = $1")
            .bind(servicio)
            .fetch_optional(pool)
            .await?;
        if exists.is_none() {
            sqlx::query("INSERT INTO services (id, servicio, precio) VALUES ($1, $2, $3)")
                .bind(Uuid::new_v4())
                .bind(servicio)
                .bind(precio)
                .execute(pool)
                .await?;
        }
    }

    Ok(())
}
