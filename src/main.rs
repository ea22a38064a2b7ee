use anyhow::Context;
use tracing::info;

use streamix::config::Config;
use streamix::server::Server;
use streamix::transfer::ServedFile;

fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_target(false)
        .with_level(true)
        .init();

    // A peer vanishing mid-transfer must surface as EPIPE on that worker's
    // syscall, not as a fatal signal to the whole process.
    unsafe {
        libc::signal(libc::SIGPIPE, libc::SIG_IGN);
    }

    let cfg = Config::load().context("loading configuration")?;

    // Open the served file once up front so a bad path fails the start, not
    // the first request. Connections still reopen it per request; the file
    // may legitimately be replaced while the server runs.
    let served = ServedFile::open(&cfg.file).context("checking served file")?;
    info!(file = %cfg.file.display(), bytes = served.len(), "serving file");
    drop(served);

    let server = Server::new(cfg).context("starting server")?;
    server.run()
}
