//! Command-line entry point for ring-dl

use ring_dl::{
    Config, Downloader, Reporter, RingSession, RunSummary, filter_by_kind,
};
use tracing::error;
use tracing_subscriber::EnvFilter;

/// Diagnostics go to stderr so stdout stays clean for progress output
fn init_tracing() {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("ring_dl=warn"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

fn usage() {
    println!("Usage:");
    println!(
        "   ring-dl -username <username> -password <password> [-out <folder> -type <motion/ring/...> -lastdays N -startdate <date> -enddate <date> -retries N]"
    );
    println!();
    println!("username: Ring account username (or RING_USERNAME in the environment)");
    println!("password: Ring account password (or RING_PASSWORD in the environment)");
    println!("out: folder to store the recordings in (default: current directory)");
    println!("type: only download events of this kind, e.g. motion or ring (default: all)");
    println!("lastdays: download recordings from the past N days");
    println!("startdate: date and time to start downloading events from");
    println!("enddate: date and time to download events until (default: now)");
    println!("retries: download attempts per recording (default: 3)");
    println!();
    println!("Example:");
    println!("   ring-dl -username my@email.com -password mypassword -lastdays 7");
    println!("   ring-dl -username my@email.com -password mypassword -lastdays 7 -type ring");
    println!("   ring-dl -username my@email.com -password mypassword -startdate 2019-02-12T08:12:45");
}

#[tokio::main]
async fn main() {
    init_tracing();

    let mut reporter = Reporter::stdout();
    reporter.banner(env!("CARGO_PKG_VERSION"));

    let args: Vec<String> = std::env::args().skip(1).collect();
    if args.is_empty() {
        usage();
        std::process::exit(1);
    }

    let config = Config::from_args(args);
    if let Err(e) = config.validate() {
        reporter.line(&e.to_string());
        std::process::exit(1);
    }
    // validate() guarantees these are present
    let (Some(username), Some(password), Some(start)) = (
        config.username.clone(),
        config.password.clone(),
        config.start_date,
    ) else {
        std::process::exit(1);
    };

    if let Err(e) = std::fs::create_dir_all(&config.output_path) {
        reporter.line(&format!(
            "Cannot create output directory {}: {e}",
            config.output_path.display()
        ));
        std::process::exit(1);
    }

    reporter.connecting();
    let mut session = match RingSession::new(username, password) {
        Ok(session) => session,
        Err(e) => {
            error!(error = %e, "could not construct session");
            reporter.line("Connection failed.");
            std::process::exit(1);
        }
    };

    reporter.authenticating();
    if let Err(e) = session.authenticate().await {
        error!(error = %e, "authentication failed");
        reporter.line("Connection failed. Validate your credentials.");
        std::process::exit(1);
    }

    reporter.window(start, config.end_date, config.type_filter.as_deref());
    let history = match session.history(start, config.end_date).await {
        Ok(history) => history,
        Err(e) => {
            error!(error = %e, "history retrieval failed");
            reporter.line("Failed to retrieve the event history.");
            std::process::exit(1);
        }
    };

    let items = filter_by_kind(history, config.type_filter.as_deref());
    reporter.item_count(items.len(), &config.output_path);

    let downloader = Downloader::new(&session, &config.output_path, config.max_retries);
    let outcomes = downloader.run(&items, &mut reporter).await;
    reporter.summary(&RunSummary::tally(&outcomes));
}
