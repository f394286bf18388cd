//! Line-oriented test harness for poking at the launcher by hand.

use anyhow::Result;
use indoc::indoc;
use std::sync::Arc;
use weblaunch::BrowserLauncher;

#[tokio::main]
async fn main() -> Result<()> {
    env_logger::init();

    let (events, mut launched) = tokio::sync::mpsc::unbounded_channel();
    let launcher = BrowserLauncher::builder()
        .error_handler(Arc::new(|e| eprintln!("! {}", e)))
        .events(events)
        .build()?;

    tokio::spawn(async move {
        while let Some(event) = launched.recv().await {
            println!(
                "* attempt {}: {} -> {} (pid {})",
                event.attempt, event.browser, event.url, event.pid
            );
        }
    });

    println!("Available browsers:");
    for name in launcher.browser_list() {
        println!("  {}", name);
    }
    print!(indoc! {"
        Enter a url to open it in the default browser, or
        `<browser> <url>` to target one of the browsers above.
        An empty line quits.
        > "});
    use std::io::Write;
    std::io::stdout().flush()?;

    let stdin = std::io::stdin();
    let mut line = String::new();
    loop {
        line.clear();
        if stdin.read_line(&mut line)? == 0 {
            break;
        }
        let line = line.trim();
        if line.is_empty() {
            break;
        }
        match line.split_once(' ') {
            Some((browser, url)) => launcher.open_url_in(browser, url.trim()),
            None => launcher.open_url(line),
        }
        print!("> ");
        std::io::stdout().flush()?;
    }
    Ok(())
}
