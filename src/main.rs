use std::error::Error;
use std::sync::Arc;

use futures::future::FutureExt;
use log::{info, initialize_logger};
use tokio::sync::mpsc;
use warp::Filter;

use rarity::certificates::Certificates;
use rarity::config::get_variable;
use rarity::db::MemDb;
use rarity::environment::{Config, Environment};
use rarity::render::ScriptRenderer;
use rarity::routes;
use rarity::store::{FileStore, Store};
use rarity::urls::Urls;
use rarity::worker;

#[tokio::main]
async fn main() -> Result<(), Box<dyn Error>> {
    dotenv::dotenv().ok();

    let logger = initialize_logger();

    let main_port: u16 = get_variable("RARITY_PORT")
        .parse()
        .expect("parse RARITY_PORT as u16");
    let admin_port: u16 = get_variable("RARITY_ADMIN_PORT")
        .parse()
        .expect("parse RARITY_ADMIN_PORT as u16");

    info!(logger, "Starting..."; "main_port" => main_port, "admin_port" => admin_port);
    let logger = Arc::new(logger);

    let config = Config::from_env();

    let store: Arc<dyn Store> =
        Arc::new(FileStore::new(&config.output_dir).expect("create RARITY_OUTPUT_DIR"));

    let interpreter = config
        .renderer_interpreter
        .clone()
        .expect("locate renderer interpreter (set RARITY_RENDERER_INTERPRETER)");
    info!(logger, "Using renderer"; "interpreter" => %interpreter.display(), "script" => %config.renderer_script.display());
    let renderer = Arc::new(ScriptRenderer::new(interpreter, config.renderer_script.clone()));

    let certificates = Certificates::new(Arc::new(MemDb::new()));

    let (queue, render_worker) = worker::spawn(
        logger.clone(),
        certificates.clone(),
        renderer,
        store.directory().to_owned(),
        config.render_policy,
        config.queue_capacity,
    );

    let urls = Arc::new(Urls::new(get_variable("RARITY_BASE_URL")));

    let environment = Environment::new(logger.clone(), certificates, urls, store, queue);

    let (termination_sender, mut termination_receiver) = mpsc::channel::<()>(1);

    let terminate = Arc::new(move || {
        let termination_sender = termination_sender.clone();

        async move {
            // a closed channel means shutdown is already under way
            let _ = termination_sender.send(()).await;
        }
        .boxed()
    });

    let should_terminate = async move {
        termination_receiver.recv().await;
    }
    .shared();

    let ctrlc = {
        let should_terminate = should_terminate.clone();
        let terminate = terminate.clone();

        let signal = tokio::signal::ctrl_c();

        async move {
            tokio::select! {
                _ = should_terminate => {},
                _ = signal => {
                    terminate().await;
                }
            }
        }
    };

    let main_server = {
        let should_terminate = should_terminate.clone();

        let routes = routes::make_api(environment.clone());

        let (_, main_server) =
            warp::serve(routes).bind_with_graceful_shutdown(([0, 0, 0, 0], main_port), async {
                should_terminate.await;
            });

        main_server
    };

    let admin_server = {
        let should_terminate = should_terminate.clone();

        let routes = routes::admin::make_healthz_route(environment.clone())
            .or(routes::admin::make_termination_route(terminate));

        let (_, admin_server) =
            warp::serve(routes).bind_with_graceful_shutdown(([0, 0, 0, 0], admin_port), async {
                should_terminate.await;
            });

        admin_server
    };

    tokio::join!(ctrlc, main_server, admin_server);

    info!(logger, "Waiting for queued renders...");
    drop(environment);
    render_worker.await?;

    info!(logger, "Exiting gracefully...");

    Ok(())
}
