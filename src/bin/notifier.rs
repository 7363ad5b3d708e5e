use anyhow::Result;
use callpop::event::CallEvent;
use callpop::notify::surface::{
    AlertSurface, AudibleAlert, Indicator, Navigator, NoticeSink, Presentation,
    PresentationContent, PresentationSurface,
};
use callpop::notify::{serve, CallNotificationSession, SessionCommand};
use clap::Parser;
use futures::StreamExt;
use tokio::io::{AsyncBufReadExt, BufReader};
use tokio::select;
use tokio_tungstenite::tungstenite;
use tokio_util::sync::CancellationToken;
use tracing::{error, info, level_filters::LevelFilter, warn};
use url::Url;

/// Console notification client: connects to the bridge's realtime feed and
/// renders incoming-call popups in the terminal.
#[derive(Parser, Debug)]
#[command(version)]
struct Cli {
    /// WebSocket URL of the callpop service
    #[clap(long, default_value = "ws://127.0.0.1:8080/ws")]
    server: String,
    /// CRM base URL for lead record links
    #[clap(long, default_value = "http://localhost:8000")]
    crm_base_url: String,
    /// Ringtone resource locator
    #[clap(long, default_value = "/assets/sounds/notification.mp3")]
    sound_url: String,
}

struct TerminalPresentation {
    content: PresentationContent,
}

impl Presentation for TerminalPresentation {
    fn show(&mut self) {
        println!("+----------------------------------------+");
        println!("| {:<38} |", self.content.title);
        println!("|----------------------------------------|");
        println!("| Caller Number: {:<23} |", self.content.caller_number);
        println!("| Lead Name:     {:<23} |", self.content.lead_name);
        if self.content.has_details {
            println!("| [v] View Lead Details   [d] Dismiss    |");
        } else {
            println!("| [d] Dismiss                            |");
        }
        println!("+----------------------------------------+");
    }

    fn hide(&mut self) {
        println!("(call popup closed)");
    }
}

struct TerminalPresenter;

impl PresentationSurface for TerminalPresenter {
    fn create(&self, content: PresentationContent) -> Box<dyn Presentation> {
        Box::new(TerminalPresentation { content })
    }
}

/// Terminal-bell ringtone: rings once a second until paused.
struct BellAlert {
    ring_token: Option<CancellationToken>,
}

impl AudibleAlert for BellAlert {
    fn play(&mut self) -> Result<()> {
        let token = CancellationToken::new();
        self.ring_token = Some(token.clone());
        tokio::spawn(async move {
            let mut ticker = tokio::time::interval(std::time::Duration::from_secs(1));
            loop {
                select! {
                    _ = ticker.tick() => {
                        use std::io::Write;
                        print!("\x07");
                        std::io::stdout().flush().ok();
                    }
                    _ = token.cancelled() => break,
                }
            }
        });
        Ok(())
    }

    fn pause(&mut self) {
        if let Some(token) = self.ring_token.take() {
            token.cancel();
        }
    }

    fn reset(&mut self) {
        // A bell has no playback position.
    }
}

struct BellAlerts;

impl AlertSurface for BellAlerts {
    fn create(&self, _locator: &str) -> Box<dyn AudibleAlert> {
        Box::new(BellAlert { ring_token: None })
    }
}

struct TerminalNavigator {
    crm_base_url: String,
}

impl Navigator for TerminalNavigator {
    fn open_record(&self, doctype: &str, name: &str) {
        println!(
            "Open {}/app/{}/{}",
            self.crm_base_url,
            doctype.to_lowercase(),
            name
        );
    }
}

struct TerminalNotices;

impl NoticeSink for TerminalNotices {
    fn notice(&self, message: &str, _indicator: Indicator) {
        eprintln!("! {}", message);
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    tracing_subscriber::fmt()
        .with_max_level(LevelFilter::INFO)
        .try_init()
        .ok();

    // Validate the endpoint before dialing
    let url = Url::parse(&cli.server)?;
    info!("connecting to {}", url);
    let (ws_stream, _) = tokio_tungstenite::connect_async(url.as_str()).await?;
    let (_, mut ws_receiver) = ws_stream.split();

    let session = CallNotificationSession::new(
        Box::new(TerminalPresenter),
        Box::new(BellAlerts),
        Box::new(TerminalNavigator {
            crm_base_url: cli.crm_base_url,
        }),
        Box::new(TerminalNotices),
        cli.sound_url,
    );

    let (event_tx, event_rx) = tokio::sync::broadcast::channel(16);
    let (command_tx, command_rx) = tokio::sync::mpsc::channel(16);
    let token = CancellationToken::new();
    let driver = tokio::spawn(serve(session, event_rx, command_rx, token.child_token()));

    let mut stdin = BufReader::new(tokio::io::stdin()).lines();

    loop {
        select! {
            message = ws_receiver.next() => {
                let text = match message {
                    Some(Ok(tungstenite::Message::Text(text))) => text.to_string(),
                    Some(Ok(tungstenite::Message::Close(_))) | None => {
                        info!("server closed the connection");
                        break;
                    }
                    Some(Ok(_)) => continue,
                    Some(Err(e)) => {
                        error!("websocket error: {}", e);
                        break;
                    }
                };
                handle_feed_message(&text, &event_tx);
            }
            line = stdin.next_line() => {
                let line = match line {
                    Ok(Some(line)) => line,
                    _ => break,
                };
                match line.trim() {
                    "v" => {
                        let _ = command_tx.send(SessionCommand::ViewDetails).await;
                    }
                    "d" => {
                        let _ = command_tx.send(SessionCommand::Dismiss).await;
                    }
                    "q" => break,
                    "" => {}
                    other => warn!("unknown command: {}", other),
                }
            }
            _ = tokio::signal::ctrl_c() => {
                info!("Received CTRL+C, shutting down");
                break;
            }
        }
    }

    token.cancel();
    driver.await.ok();
    Ok(())
}

fn handle_feed_message(text: &str, event_tx: &callpop::event::EventSender) {
    let value: serde_json::Value = match serde_json::from_str(text) {
        Ok(value) => value,
        Err(e) => {
            warn!("unparseable feed message: {}", e);
            return;
        }
    };
    match value["type"].as_str() {
        Some("connected") => {
            info!("connected to notification feed");
        }
        Some("inbound_call_notification") => {
            match serde_json::from_value::<CallEvent>(value["data"].clone()) {
                Ok(event) => {
                    let _ = event_tx.send(event);
                }
                Err(e) => warn!("bad notification payload: {}", e),
            }
        }
        _ => {}
    }
}
