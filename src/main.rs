use dotenv::dotenv;
use inscovia_quiz::{
    config::Config,
    error::AppError,
    handlers::connection_handler::run_server,
    loggers::file_logger::init_file_logger,
    progress::{SqliteProgressStore, UtcClock},
    repository::{load_pack, SqliteQuestionRepository},
    state::AppState,
};
use log::info;
use std::{env, path::Path, sync::Arc};
use tokio::net::TcpListener;

fn import(repository: &SqliteQuestionRepository, path: &Path) -> Result<usize, AppError> {
    let pack = load_pack(path)?;
    let imported = repository.import_pack(pack)?;
    info!("Imported {} questions from {}", imported, path.display());
    Ok(imported)
}

#[tokio::main]
async fn main() -> Result<(), AppError> {
    dotenv().ok();
    let mut config = Config::load()?;
    init_file_logger(&config.log_dir, config.log_level)?;
    info!("App started!");

    let repository = Arc::new(SqliteQuestionRepository::open(&config.database_path)?);

    let args: Vec<String> = env::args().collect();
    if args.get(1).map(String::as_str) == Some("import") {
        let path = args
            .get(2)
            .ok_or_else(|| AppError::Usage("inscovia-quiz import <pack.json>".to_string()))?;
        import(&repository, Path::new(path))?;
        return Ok(());
    }
    if let Some(addr) = args.get(1) {
        config.addr = addr.clone();
    }

    if let Some(seed_pack) = &config.seed_pack {
        if repository.question_count()? == 0 {
            import(&repository, seed_pack)?;
        } else {
            info!("Question bank already populated, skipping seed pack");
        }
    }

    let progress = Arc::new(SqliteProgressStore::open(&config.database_path)?);
    let state = AppState {
        repository,
        progress,
        clock: Arc::new(UtcClock),
        settings: config.engine_settings(),
        tick_interval: config.tick_interval(),
        default_count: config.default_count,
    };

    let listener = TcpListener::bind(&config.addr).await?;
    info!("Listening on: {}", config.addr);

    run_server(listener, state).await;

    Ok(())
}
