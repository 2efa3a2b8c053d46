//! Session line commands.

use std::fmt;

use coordsync::coord::{parse_coordinate, GeoBounds, LonLat};

/// One parsed session command.
#[derive(Debug, Clone, PartialEq)]
pub enum SessionCommand {
    /// Drag the map by an offset in meters.
    Pan { dx: f64, dy: f64 },
    /// Recenter the map programmatically.
    Goto(LonLat),
    /// Type into the lon/lat form and submit it.
    LonLat { lon: String, lat: String },
    /// Type into the east/north form and submit it.
    EastNorth { east: String, north: String },
    /// Zoom to a geocoder result.
    Fit(GeoBounds),
    Show,
    Copy,
    Help,
    Quit,
}

/// A line that is not a valid command.
#[derive(Debug, Clone, PartialEq)]
pub struct CommandError(String);

impl fmt::Display for CommandError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

pub const HELP: &str = "\
Commands:
  pan <dx> <dy>                 drag the map by meters (Web Mercator)
  goto <lon> <lat>              recenter the map
  lonlat <lon> <lat>            submit the lon/lat form
  en <east> <north>             submit the east/north form
  fit <minlon> <minlat> <maxlon> <maxlat>
                                zoom to a search result
  show                          print fields and status
  copy                          copy east/north
  help                          this text
  quit                          leave the session";

/// Parses a line. Blank lines parse to `None`.
///
/// Form submissions keep their raw text; the controller decides whether it
/// is numeric.
pub fn parse(line: &str) -> Result<Option<SessionCommand>, CommandError> {
    let mut words = line.split_whitespace();
    let Some(name) = words.next() else {
        return Ok(None);
    };
    let args: Vec<&str> = words.collect();

    let command = match name.to_ascii_lowercase().as_str() {
        "pan" => {
            let [dx, dy] = numbers(name, &args)?;
            SessionCommand::Pan { dx, dy }
        }
        "goto" => {
            let [lon, lat] = numbers(name, &args)?;
            SessionCommand::Goto(LonLat::new(lon, lat))
        }
        "lonlat" | "ll" => {
            let [lon, lat] = texts(name, &args)?;
            SessionCommand::LonLat { lon, lat }
        }
        "en" | "eastnorth" => {
            let [east, north] = texts(name, &args)?;
            SessionCommand::EastNorth { east, north }
        }
        "fit" => {
            let [min_lon, min_lat, max_lon, max_lat] = numbers(name, &args)?;
            let bounds = GeoBounds::new(min_lon, min_lat, max_lon, max_lat)
                .map_err(|e| CommandError(e.to_string()))?;
            SessionCommand::Fit(bounds)
        }
        "show" => no_args(name, &args, SessionCommand::Show)?,
        "copy" => no_args(name, &args, SessionCommand::Copy)?,
        "help" | "?" => SessionCommand::Help,
        "quit" | "exit" | "q" => SessionCommand::Quit,
        other => return Err(CommandError(format!("unknown command '{}', try 'help'", other))),
    };

    Ok(Some(command))
}

fn texts<const N: usize>(name: &str, args: &[&str]) -> Result<[String; N], CommandError> {
    if args.len() != N {
        return Err(CommandError(format!(
            "'{}' takes {} arguments, got {}",
            name,
            N,
            args.len()
        )));
    }
    Ok(std::array::from_fn(|i| args[i].to_string()))
}

fn numbers<const N: usize>(name: &str, args: &[&str]) -> Result<[f64; N], CommandError> {
    let raw: [String; N] = texts(name, args)?;
    let mut values = [0.0; N];
    for (value, text) in values.iter_mut().zip(raw.iter()) {
        *value = parse_coordinate(text)
            .ok_or_else(|| CommandError(format!("'{}' is not a number", text)))?;
    }
    Ok(values)
}

fn no_args(
    name: &str,
    args: &[&str],
    command: SessionCommand,
) -> Result<SessionCommand, CommandError> {
    texts::<0>(name, args)?;
    Ok(command)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_blank_line() {
        assert_eq!(parse("   "), Ok(None));
    }

    #[test]
    fn test_pan_and_goto() {
        assert_eq!(
            parse("pan 500 -250"),
            Ok(Some(SessionCommand::Pan { dx: 500.0, dy: -250.0 }))
        );
        assert_eq!(
            parse("GOTO 8.5 47.37"),
            Ok(Some(SessionCommand::Goto(LonLat::new(8.5, 47.37))))
        );
        assert!(parse("pan 500").is_err());
        assert!(parse("goto east 47").is_err());
    }

    #[test]
    fn test_form_submissions_keep_raw_text() {
        assert_eq!(
            parse("lonlat 7.5 abc"),
            Ok(Some(SessionCommand::LonLat {
                lon: "7.5".to_string(),
                lat: "abc".to_string(),
            }))
        );
        assert_eq!(
            parse("en 2600000 1200000"),
            Ok(Some(SessionCommand::EastNorth {
                east: "2600000".to_string(),
                north: "1200000".to_string(),
            }))
        );
    }

    #[test]
    fn test_fit_validates_bounds() {
        let Ok(Some(SessionCommand::Fit(bounds))) = parse("fit 8.4 47.3 8.6 47.4") else {
            panic!("expected fit command");
        };
        let center = bounds.center();
        assert!((center.lon - 8.5).abs() < 1e-9);
        assert!((center.lat - 47.35).abs() < 1e-9);

        assert!(parse("fit 8.6 47.3 8.4 47.4").is_err());
    }

    #[test]
    fn test_keywords() {
        assert_eq!(parse("show"), Ok(Some(SessionCommand::Show)));
        assert_eq!(parse("q"), Ok(Some(SessionCommand::Quit)));
        assert!(parse("show now").is_err());
        assert!(parse("zoom 3").is_err());
    }
}
