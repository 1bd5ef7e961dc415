use actix_files::Files;
use actix_web::{middleware, web, App, HttpResponse, HttpServer};
use sqlx::sqlite::{SqliteConnectOptions, SqlitePoolOptions};
use std::env;
use std::str::FromStr;
use std::time::Duration;

use fadeworks::{db, routes, state::AppState};

#[actix_web::main]
async fn main() -> std::io::Result<()> {
    if let Err(err) = run().await {
        eprintln!("Startup error: {err}");
        std::process::exit(1);
    }
    Ok(())
}

async fn run() -> Result<(), Box<dyn std::error::Error>> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let db_url =
        env::var("DATABASE_URL").unwrap_or_else(|_| "sqlite://./data/fadeworks.db".to_string());
    db::ensure_sqlite_dir(&db_url)?;

    let connect_options = SqliteConnectOptions::from_str(&db_url)?.create_if_missing(true);

    let pool = SqlitePoolOptions::new()
        .max_connections(10)
        .connect_with(connect_options)
        .await?;

    db::run_migrations(&pool).await?;

    let state = AppState::new(pool.clone());

    let sweep_secs: u64 = env::var("ARCHIVE_SWEEP_SECS")
        .ok()
        .and_then(|value| value.parse().ok())
        .unwrap_or(3600);
    let sweep_pool = pool.clone();
    actix_web::rt::spawn(async move {
        let mut ticker = tokio::time::interval(Duration::from_secs(sweep_secs));
        loop {
            ticker.tick().await;
            match db::appointments::auto_archive_past(&sweep_pool).await {
                Ok(sweep) if sweep.completed > 0 || sweep.archived > 0 => {
                    log::info!(
                        "Archive sweep: {} completed, {} archived",
                        sweep.completed,
                        sweep.archived
                    );
                }
                Ok(_) => {}
                Err(err) => log::error!("Archive sweep failed: {err}"),
            }
        }
    });

    let upload_dir = env::var("UPLOAD_DIR").unwrap_or_else(|_| "./uploads".to_string());
    std::fs::create_dir_all(&upload_dir)?;

    let port: u16 = env::var("PORT")
        .ok()
        .and_then(|value| value.parse().ok())
        .unwrap_or(8080);

    let address = format!("0.0.0.0:{port}");
    log::info!("Starting Fadeworks on http://{address}");

    HttpServer::new(move || {
        App::new()
            .app_data(web::Data::new(state.clone()))
            .wrap(middleware::Logger::default())
            .service(Files::new("/uploads", upload_dir.clone()).prefer_utf8(true))
            .configure(routes::appointments::configure)
            .configure(routes::barbers::configure)
            .configure(routes::services::configure)
            .configure(routes::products::configure)
            .configure(routes::orders::configure)
            .configure(routes::dashboard::configure)
            .configure(routes::time_blocks::configure)
            .route("/health", web::get().to(health))
    })
    .bind(address)?
    .run()
    .await?;

    Ok(())
}

async fn health() -> HttpResponse {
    HttpResponse::Ok().body("ok")
}
