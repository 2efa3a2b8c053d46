//! Convert command - one-shot conversion through the transformation service.

use clap::Args;
use coordsync::coord::{EastNorth, LonLat, Srs};
use coordsync::transform::{Direction, Point, TransformRequest, TransformService};
use console::style;
use tracing::info;

use super::common::{parse_number, resolve_service, resolve_srs, ServiceArgs};
use crate::error::CliError;
use crate::runner::CliRunner;

/// Arguments for the convert command.
#[derive(Debug, Args)]
pub struct ConvertArgs {
    /// Convert lon/lat to this projected SRS
    #[arg(long, value_name = "SRS", conflicts_with = "from")]
    pub to: Option<String>,

    /// Convert east/north from this projected SRS to lon/lat
    #[arg(long, value_name = "SRS")]
    pub from: Option<String>,

    /// Longitude, or easting with --from
    #[arg(allow_negative_numbers = true)]
    pub x: String,

    /// Latitude, or northing with --from
    #[arg(allow_negative_numbers = true)]
    pub y: String,

    #[command(flatten)]
    pub service: ServiceArgs,
}

impl ConvertArgs {
    fn direction(&self) -> Direction {
        if self.from.is_some() {
            Direction::Inverse
        } else {
            Direction::Forward
        }
    }
}

/// Run the convert command.
pub fn run(args: ConvertArgs) -> Result<(), CliError> {
    let runner = CliRunner::new()?;
    runner.log_startup("convert");
    let config = runner.config();

    let direction = args.direction();
    let srs = resolve_srs(args.to.as_deref().or(args.from.as_deref()), config)?;
    let x = parse_number("x", &args.x)?;
    let y = parse_number("y", &args.y)?;
    let request = match direction {
        Direction::Forward => TransformRequest::forward(LonLat::new(x, y), srs.clone()),
        Direction::Inverse => TransformRequest::inverse(EastNorth::new(x, y), srs.clone()),
    };

    let point = if srs.is_geographic() {
        Point::new(x, y)
    } else {
        let service = resolve_service(&args.service, config)?;
        let runtime = tokio::runtime::Builder::new_current_thread()
            .enable_all()
            .build()
            .map_err(|e| CliError::Runtime(e.to_string()))?;
        runtime.block_on(service.transform(&request))?
    };

    info!(direction = %direction, x, y, srs = %srs, "Converted coordinate");
    println!("{}", format_result(direction, &srs, point));
    Ok(())
}

fn format_result(direction: Direction, srs: &Srs, point: Point) -> String {
    match direction {
        Direction::Forward => {
            let decimals = srs.display_decimals();
            format!(
                "{} {:.*}, {:.*}",
                style(srs.as_str()).cyan(),
                decimals,
                point.x,
                decimals,
                point.y
            )
        }
        Direction::Inverse => format!(
            "{} {}",
            style(Srs::geographic().as_str()).cyan(),
            LonLat::new(point.x, point.y)
        ),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_format_forward_uses_projected_decimals() {
        console::set_colors_enabled(false);
        let srs: Srs = "EPSG:2056".parse().unwrap();
        let text = format_result(Direction::Forward, &srs, Point::new(2_600_000.5, 1_200_000.0));
        assert_eq!(text, "EPSG:2056 2600000.50, 1200000.00");
    }

    #[test]
    fn test_format_inverse_uses_degrees() {
        console::set_colors_enabled(false);
        let srs: Srs = "EPSG:2056".parse().unwrap();
        let text = format_result(Direction::Inverse, &srs, Point::new(7.4386, 46.9511));
        assert_eq!(text, "EPSG:4326 7.438600, 46.951100");
    }
}
