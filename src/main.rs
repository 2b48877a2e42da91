// Copyright 2026 Daniel Pelikan
//
// Licensed under the Apache License, Version 2.0 (the "License");
// you may not use this file except in compliance with the License.
// You may obtain a copy of the License at
//
//     http://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing, software
// distributed under the License is distributed on an "AS IS" BASIS,
// WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
// See the License for the specific language governing permissions and
// limitations under the License.

//! Console front end for bt-token-link.

use anyhow::Result;
use tokio::io::{AsyncBufReadExt, BufReader};
use tracing::{error, info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use bt_token_link::bluetooth::{BluezTransport, Device, Transport};
use bt_token_link::config::Config;
use bt_token_link::console::{until_interrupted, ConsoleCommand, ParseError, HELP};
use bt_token_link::identity::IdentityStore;
use bt_token_link::notice::{self, NoticeKind};
use bt_token_link::storage::JsonFileStore;
use bt_token_link::Coordinator;

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize logging
    tracing_subscriber::registry()
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .with(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive("bt_token_link=info".parse()?),
        )
        .init();

    info!("Starting bt-token-link v{}...", env!("CARGO_PKG_VERSION"));

    // Load configuration
    let config = Config::load()?;
    info!("Configuration loaded");

    // Load the install identifier. Without it sending stays disabled.
    let store = JsonFileStore::open(&config.data_dir)?;
    info!("Key-value store: {:?}", store.path());
    let identity = IdentityStore::new(store);
    let device_id = match identity.get_or_create_id() {
        Ok(id) => Some(id),
        Err(e) => {
            error!("Failed to load device ID: {:#}", e);
            None
        }
    };

    // Initialize Bluetooth
    let transport = BluezTransport::new(&config.bluetooth).await?;
    transport.prepare().await;

    let (notice_tx, mut notice_rx) = notice::channel();
    let coordinator = Coordinator::new(transport, notice_tx);

    tokio::spawn(async move {
        while let Some(notice) = notice_rx.recv().await {
            match notice.kind {
                NoticeKind::Success => println!("[ok] {}", notice),
                NoticeKind::Error => println!("[!!] {}", notice),
            }
        }
    });

    println!("{}", HELP);

    // One signal future for the whole session, raced against every command
    let ctrl_c = tokio::signal::ctrl_c();
    tokio::pin!(ctrl_c);
    let mut interrupted = false;

    if config.console.scan_on_start
        && until_interrupted(scan(&coordinator), &mut ctrl_c)
            .await
            .is_none()
    {
        interrupted = true;
    }

    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    info!("Ready.");

    while !interrupted {
        tokio::select! {
            line = lines.next_line() => {
                let line = match line {
                    Ok(Some(line)) => line,
                    Ok(None) => break,
                    Err(e) => {
                        error!("Failed to read input: {}", e);
                        break;
                    }
                };

                let command = match ConsoleCommand::parse(&line) {
                    Ok(command) => command,
                    Err(ParseError::Empty) => continue,
                    Err(e) => {
                        println!("{}", e);
                        continue;
                    }
                };

                let run = run_command(&coordinator, device_id.as_deref(), command);
                match until_interrupted(run, &mut ctrl_c).await {
                    Some(Flow::Continue) => {}
                    Some(Flow::Quit) => {
                        info!("Quit requested");
                        break;
                    }
                    None => interrupted = true,
                }
            }
            _ = &mut ctrl_c => interrupted = true,
        }
    }

    if interrupted {
        info!("Shutdown signal received");
    }

    // The session signal may already be spent, so listen afresh
    tokio::select! {
        _ = coordinator.disconnect() => {}
        _ = tokio::signal::ctrl_c() => warn!("Skipped disconnect on shutdown"),
    }
    info!("bt-token-link stopped");
    Ok(())
}

/// Whether the console keeps reading after a command.
enum Flow {
    Continue,
    Quit,
}

async fn run_command<T: Transport>(
    coordinator: &Coordinator<T>,
    device_id: Option<&str>,
    command: ConsoleCommand,
) -> Flow {
    match command {
        ConsoleCommand::Scan => scan(coordinator).await,
        ConsoleCommand::List => print_devices(&coordinator.snapshot().devices),
        ConsoleCommand::Connect(selector) => {
            let devices = coordinator.snapshot().devices;
            match selector.resolve(&devices) {
                Some(device) => {
                    // Outcome is reported through notices and status
                    let _ = coordinator.connect_to_device(device).await;
                    print_status(coordinator);
                }
                None => println!("No such device, run 'scan' first"),
            }
        }
        ConsoleCommand::Send(token) => match device_id {
            Some(id) => {
                let _ = coordinator.send_message(&token, id).await;
            }
            None => warn!("Device ID not loaded, not sending"),
        },
        ConsoleCommand::Disconnect => {
            let _ = coordinator.disconnect().await;
            print_status(coordinator);
        }
        ConsoleCommand::Status => print_status(coordinator),
        ConsoleCommand::ShowId => match device_id {
            Some(id) => println!("{}", id),
            None => println!("Device ID not available"),
        },
        ConsoleCommand::Help => println!("{}", HELP),
        ConsoleCommand::Quit => return Flow::Quit,
    }
    Flow::Continue
}

async fn scan<T: Transport>(coordinator: &Coordinator<T>) {
    if coordinator.scan().await.is_ok() {
        print_devices(&coordinator.snapshot().devices);
    }
}

fn print_devices(devices: &[Device]) {
    if devices.is_empty() {
        println!("No paired devices found");
        return;
    }
    for (i, device) in devices.iter().enumerate() {
        match &device.address {
            Some(address) => println!("  {}. {} ({})", i + 1, device.name, address),
            None => println!("  {}. {}", i + 1, device.name),
        }
    }
}

fn print_status<T: Transport>(coordinator: &Coordinator<T>) {
    let snapshot = coordinator.snapshot();
    match &snapshot.connected_device {
        Some(device) => println!("Status: {} to {}", snapshot.status, device.name),
        None => println!("Status: {}", snapshot.status),
    }
}
