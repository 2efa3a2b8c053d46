//! Session command - the interactive coordinate widget.
//!
//! The widget runs on a current-thread runtime inside a `LocalSet`, reading
//! commands from stdin. The debounce timer and conversion requests run as
//! local tasks while the loop waits for input, so results print as they
//! arrive.

mod command;
mod fields;

use std::io::Write;
use std::rc::Rc;
use std::time::Duration;

use clap::Args;
use console::style;
use coordsync::coord::{to_web_mercator, WebMercator, WEB_MERCATOR_SRS};
use coordsync::sync::{
    Collaborators, CoordinateFields, CoordinateSyncController, Field, MapView, MemoryMapView,
    SubmitOutcome, TokioScheduler,
};
use coordsync::transform::SpawnedConversionClient;
use tokio::io::{AsyncBufReadExt, BufReader};
use tokio::task::LocalSet;
use tracing::{debug, info};

use crate::commands::common::{resolve_service, resolve_srs, ServiceArgs};
use crate::error::CliError;
use crate::runner::CliRunner;

use command::{SessionCommand, HELP};
use fields::TerminalFields;

/// Arguments for the session command.
#[derive(Debug, Args)]
pub struct SessionArgs {
    /// Projected SRS of the session (overrides sync.srs)
    #[arg(long, value_name = "SRS")]
    pub srs: Option<String>,

    /// Debounce window in milliseconds (overrides sync.debounce_ms)
    #[arg(long, value_name = "MS")]
    pub debounce_ms: Option<u64>,

    #[command(flatten)]
    pub service: ServiceArgs,
}

/// Run the session command.
pub fn run(args: SessionArgs) -> Result<(), CliError> {
    let runner = CliRunner::new()?;
    runner.log_startup("session");
    let config = runner.config();

    let srs = resolve_srs(args.srs.as_deref(), config)?;
    let debounce = args
        .debounce_ms
        .map(Duration::from_millis)
        .unwrap_or_else(|| Duration::from_millis(config.sync.debounce_ms));
    let sync_config = config
        .sync_config()
        .with_srs(srs)
        .with_debounce(debounce);
    let service = resolve_service(&args.service, config)?;
    let center = to_web_mercator(config.map.center);

    println!("coordsync v{}", coordsync::VERSION);
    println!("SRS:     {}", sync_config.srs);
    println!("Service: {}", service.base_url());
    println!("Type 'help' for commands.");
    println!();

    let runtime = tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()
        .map_err(|e| CliError::Runtime(e.to_string()))?;
    let local = LocalSet::new();

    local.block_on(&runtime, async move {
        let map = Rc::new(MemoryMapView::new(center));
        let fields = Rc::new(TerminalFields::new());
        let controller = CoordinateSyncController::new(
            sync_config,
            Collaborators {
                map: map.clone(),
                fields: fields.clone(),
                client: Rc::new(SpawnedConversionClient::new(service)),
                scheduler: Rc::new(TokioScheduler::new()),
            },
        );
        map.set_listener(controller.map_listener());

        info!(srs = %controller.srs(), "Session started");
        controller.start();

        let session = Session {
            controller,
            map,
            fields,
        };
        session.run().await
    })
}

struct Session {
    controller: Rc<CoordinateSyncController>,
    map: Rc<MemoryMapView>,
    fields: Rc<TerminalFields>,
}

impl Session {
    async fn run(&self) -> Result<(), CliError> {
        let mut lines = BufReader::new(tokio::io::stdin()).lines();

        loop {
            prompt()?;
            let Some(line) = lines.next_line().await? else {
                break;
            };

            match command::parse(&line) {
                Ok(Some(SessionCommand::Quit)) => break,
                Ok(Some(command)) => self.execute(command),
                Ok(None) => {}
                Err(e) => eprintln!("{}", style(e).red()),
            }
        }

        info!("Session ended");
        Ok(())
    }

    fn execute(&self, command: SessionCommand) {
        debug!(?command, "Session command");
        match command {
            SessionCommand::Pan { dx, dy } => self.map.pan(dx, dy),
            SessionCommand::Goto(point) => self.map.set_center(to_web_mercator(point)),
            SessionCommand::Fit(bounds) => self.map.set_center(to_web_mercator(bounds.center())),
            SessionCommand::LonLat { lon, lat } => {
                self.fields.set_echo(false);
                self.fields.set_text(Field::Lon, &lon);
                self.fields.set_text(Field::Lat, &lat);
                self.fields.set_echo(true);
                let outcome = self.controller.on_lon_lat_submitted(&lon, &lat);
                report(outcome);
            }
            SessionCommand::EastNorth { east, north } => {
                self.fields.set_echo(false);
                self.fields.set_text(Field::East, &east);
                self.fields.set_text(Field::North, &north);
                self.fields.set_echo(true);
                let outcome = self.controller.on_east_north_submitted(&east, &north);
                report(outcome);
            }
            SessionCommand::Show => self.show(),
            SessionCommand::Copy => match self.controller.projected_text() {
                Some(text) => println!("{} {}", style("copied").green(), text),
                None => println!("{}", style("nothing to copy yet").dim()),
            },
            SessionCommand::Help => println!("{}", HELP),
            SessionCommand::Quit => {}
        }
    }

    fn show(&self) {
        let WebMercator { x, y } = self.map.center();
        println!("{}", self.fields.render());
        println!("  {:<6} {:.2}, {:.2} ({})", "map", x, y, WEB_MERCATOR_SRS);
        println!("  {:<6} {}", "srs", self.controller.srs());
    }
}

fn report(outcome: SubmitOutcome) {
    if outcome == SubmitOutcome::Ignored {
        println!("{}", style("ignored: both values must be numbers").dim());
    }
}

fn prompt() -> Result<(), CliError> {
    let mut stdout = std::io::stdout();
    write!(stdout, "{} ", style(">").bold())?;
    stdout.flush()?;
    Ok(())
}
