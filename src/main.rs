use artcar_lights::config::{self, Config};
use artcar_lights::context::Context;

#[tokio::main]
async fn main() {
    let mut args = std::env::args().skip(1).peekable();
    if args.peek().map(String::as_str) == Some("-v") {
        std::env::set_var("RUST_LOG", "trace");
        args.next();
    } else {
        std::env::set_var("RUST_LOG", "debug");
    }
    pretty_env_logger::init();

    let path = args.next().unwrap_or_else(|| config::DEFAULT_PATH.to_owned());
    let config = match Config::load(&path) {
        Ok(config) => config,
        Err(e) => {
            log::error!("Invalid configuration {}: {}", path, e);
            std::process::exit(1);
        }
    };

    let ctx = Context::new(config);

    // Cache recording is blocking file I/O.
    let scheduler = match tokio::task::block_in_place(|| ctx.scheduler()) {
        Ok(scheduler) => scheduler,
        Err(e) => {
            log::error!("Startup failed: {:#}", e);
            std::process::exit(1);
        }
    };

    ctx.spawn_inputs();
    ctx.spawn_outputs(&scheduler);

    scheduler.run().await;
}
