use weblaunch::launching;

fn main() {
    env_logger::init();

    let args: Vec<String> = std::env::args().collect();
    if args.len() < 2 {
        eprintln!("Usage: weblaunch <url>");
        return;
    }

    // One-shot, so open at the strategy layer; a fire-and-forget task
    // could be dropped at process exit before the browser starts.
    let result = launching::host_strategy()
        .and_then(|strategy| strategy.open_url(&args[1]));
    if let Err(e) = result {
        eprintln!("Unable to open {}", args[1]);
        eprintln!("{}", e);
        std::process::exit(1);
    }
}
