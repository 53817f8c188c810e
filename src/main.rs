use clap::Parser;
use formgate::SessionSource;
use formgate::core::{config, routes};
use formgate::navigation::{LogObserver, NavigationController, NavigationObserver};
use formgate::routing::RouteResolver;
use formgate::screen::TextScreens;
use formgate::shell::{self, SessionHandle};
use simplelog::{ConfigBuilder, LevelFilter, WriteLogger};
use std::fs::File;
use std::path::PathBuf;
use std::sync::Arc;

#[derive(Parser)]
#[command(name = "formgate", about = "Authenticated navigation shell for the form builder")]
struct Args {
    /// Where the session state comes from
    #[arg(short, long, default_value_t, value_enum)]
    session: SessionSource,

    /// Session token file (overrides config and FORMGATE_SESSION_FILE)
    #[arg(long)]
    session_file: Option<PathBuf>,
}

#[tokio::main]
async fn main() -> std::io::Result<()> {
    let args = Args::parse();
    dotenv::dotenv().ok();

    // Initialize file logger - writes to formgate.log in current directory
    let log_config = ConfigBuilder::new()
        .set_time_format_rfc3339()
        .build();

    if let Ok(log_file) = File::create("formgate.log") {
        let _ = WriteLogger::init(LevelFilter::Debug, log_config, log_file);
    }

    log::info!("Formgate starting up with session source: {:?}", args.session);

    let file_config = config::load_config().map_err(|e| {
        log::error!("Config rejected: {e}");
        std::io::Error::other(e)
    })?;
    let resolved = config::resolve(&file_config, args.session_file.as_deref());

    // A broken route table is a programming error: refuse to start.
    let table = routes::build_table(resolved.extra_routes.clone()).map_err(|e| {
        log::error!("Route table rejected: {e}");
        std::io::Error::other(e)
    })?;
    let resolver = RouteResolver::new(Arc::new(table), resolved.well_known.clone()).map_err(|e| {
        log::error!("Well-known routes rejected: {e}");
        std::io::Error::other(e)
    })?;

    // The resolver has already checked that the not-found route is registered
    let not_found_screen = resolver
        .table()
        .lookup(&resolver.well_known().not_found)
        .map_err(std::io::Error::other)?
        .screen
        .clone();

    let session = SessionHandle::from_config(&args.session, &resolved);
    let controller = NavigationController::start(
        resolver,
        session.probe(),
        Arc::new(TextScreens::new(&not_found_screen)),
        vec![Arc::new(LogObserver) as Arc<dyn NavigationObserver>],
    )
    .await
    .map_err(std::io::Error::other)?;

    shell::run(controller, session).await
}
