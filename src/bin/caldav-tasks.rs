//! A terminal front-end that lists the incomplete tasks of a CalDAV calendar, and completes them
//!
//! Credentials are read from `config.ini` in the current directory. Set `RUST_LOG` to display more info.

use tokio::io::{AsyncBufReadExt, BufReader};

use caldav_tasks::app::{AppState, RenderModel};
use caldav_tasks::client::ClientConnector;
use caldav_tasks::config::CONFIG_FILE;
use caldav_tasks::progress::{feedback_channel, WorkflowEvent};

const HELP: &str = "Commands: r (refresh), c N (complete task N), q (quit)";


#[tokio::main]
async fn main() {
    env_logger::init();

    let (sender, mut receiver) = feedback_channel();
    tokio::spawn(async move {
        while receiver.changed().await.is_ok() {
            let event = receiver.borrow().clone();
            if let WorkflowEvent::Finished{..} = event {
                continue;
            }
            println!("  {}", event);
        }
    });

    let mut app = AppState::new(ClientConnector, CONFIG_FILE)
        .with_feedback(sender);
    app.refresh().await;
    print_model(app.model());
    println!("{}", HELP);

    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    loop {
        let line = match lines.next_line().await {
            Ok(Some(line)) => line,
            Ok(None) => break,
            Err(err) => {
                log::error!("Unable to read the standard input: {}", err);
                break;
            },
        };

        let mut words = line.split_whitespace();
        match (words.next(), words.next()) {
            (Some("q"), _) => break,
            (Some("r"), _) => {
                app.refresh().await;
            },
            (Some("c"), Some(index)) => match index.parse::<usize>() {
                Ok(index) if app.select(index) => app.complete_selected().await,
                _ => {
                    println!("No task #{}", index);
                    continue;
                },
            },
            (Some("c"), None) => app.complete_selected().await,
            (None, _) => continue,
            _ => {
                println!("{}", HELP);
                continue;
            },
        }
        print_model(app.model());
    }
}

fn print_model(model: &RenderModel) {
    println!();
    if model.lines.len() == 1 && model.lines[0] == model.status {
        println!("{}", model.status);
        return;
    }

    for (index, line) in model.lines.iter().enumerate() {
        let marker = if model.selection == Some(index) { '>' } else { ' ' };
        println!("{} {:>3}  {}", marker, index, line);
    }
    println!("-- {}", model.status);
}
