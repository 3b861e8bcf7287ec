//! Text commands read from stdin, one per line.

use cheapo_core::{Msg, Viewport, RECENTER_ZOOM};
use thiserror::Error;

pub const HELP: &str = "\
commands:
  keyword [text]          set or clear the search keyword
  category [id]           pick or clear a category (see `categories`)
  categories              list category ids
  store [id]              pick or clear a store
  marker <label>          click a map marker
  pan <lat> <lon> [zoom]  move the map (settles after a pause)
  goto <lat> <lon> [zoom] move the map and settle at once
  submit | next | back    search controls
  help | quit";

#[derive(Debug, Clone, PartialEq)]
pub enum Command {
    Send(Msg),
    ListCategories,
    Help,
    Quit,
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum InputError {
    #[error("unknown command `{0}`, try `help`")]
    Unknown(String),
    #[error("`{command}` needs {expected}")]
    MissingArgument {
        command: &'static str,
        expected: &'static str,
    },
    #[error("`{0}` is not a number")]
    NotANumber(String),
}

/// `None` for blank lines.
pub fn parse_command(line: &str, now_ms: u64) -> Result<Option<Command>, InputError> {
    let line = line.trim();
    let (verb, rest) = match line.split_once(char::is_whitespace) {
        Some((verb, rest)) => (verb, rest.trim()),
        None => (line, ""),
    };
    let argument = || (!rest.is_empty()).then(|| rest.to_string());

    let command = match verb {
        "" => return Ok(None),
        "keyword" => Command::Send(Msg::KeywordChanged(rest.to_string())),
        "category" => Command::Send(Msg::CategorySelected(argument())),
        "categories" => Command::ListCategories,
        "store" => Command::Send(Msg::StoreSelected(argument())),
        "marker" => match argument() {
            Some(label) => Command::Send(Msg::MarkerClicked(label)),
            None => {
                return Err(InputError::MissingArgument {
                    command: "marker",
                    expected: "a label",
                })
            }
        },
        "pan" => Command::Send(Msg::ViewportMoved {
            viewport: parse_viewport("pan", rest)?,
            at_ms: now_ms,
        }),
        "goto" => Command::Send(Msg::ViewportSettled(parse_viewport("goto", rest)?)),
        "submit" => Command::Send(Msg::SubmitClicked { at_ms: now_ms }),
        "next" => Command::Send(Msg::NextClicked { at_ms: now_ms }),
        "back" => Command::Send(Msg::BackClicked { at_ms: now_ms }),
        "help" | "?" => Command::Help,
        "quit" | "exit" => Command::Quit,
        other => return Err(InputError::Unknown(other.to_string())),
    };
    Ok(Some(command))
}

fn parse_viewport(command: &'static str, rest: &str) -> Result<Viewport, InputError> {
    let numbers = rest
        .split_whitespace()
        .map(|raw| {
            raw.parse::<f64>()
                .map_err(|_| InputError::NotANumber(raw.to_string()))
        })
        .collect::<Result<Vec<_>, _>>()?;

    match numbers.as_slice() {
        [lat, lon] => Ok(Viewport {
            lat: *lat,
            lon: *lon,
            zoom: RECENTER_ZOOM,
        }),
        [lat, lon, zoom] => Ok(Viewport {
            lat: *lat,
            lon: *lon,
            zoom: *zoom,
        }),
        _ => Err(InputError::MissingArgument {
            command,
            expected: "<lat> <lon> [zoom]",
        }),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn send(line: &str) -> Msg {
        match parse_command(line, 42) {
            Ok(Some(Command::Send(msg))) => msg,
            other => panic!("expected a message for {line:?}, got {other:?}"),
        }
    }

    #[test]
    fn keyword_keeps_inner_spaces_and_can_be_cleared() {
        assert_eq!(
            send("keyword  cordless drill "),
            Msg::KeywordChanged("cordless drill".to_string())
        );
        assert_eq!(send("keyword"), Msg::KeywordChanged(String::new()));
    }

    #[test]
    fn selections_without_an_argument_clear() {
        assert_eq!(send("category"), Msg::CategorySelected(None));
        assert_eq!(send("store 1039"), Msg::StoreSelected(Some("1039".to_string())));
    }

    #[test]
    fn clicks_are_stamped_with_the_clock() {
        assert_eq!(send("next"), Msg::NextClicked { at_ms: 42 });
        assert_eq!(send(" submit "), Msg::SubmitClicked { at_ms: 42 });
    }

    #[test]
    fn pan_defaults_zoom() {
        assert_eq!(
            send("pan 40.7 -73.9"),
            Msg::ViewportMoved {
                viewport: Viewport {
                    lat: 40.7,
                    lon: -73.9,
                    zoom: RECENTER_ZOOM
                },
                at_ms: 42
            }
        );
        assert_eq!(
            send("goto 1 2 5"),
            Msg::ViewportSettled(Viewport {
                lat: 1.0,
                lon: 2.0,
                zoom: 5.0
            })
        );
    }

    #[test]
    fn bad_input_is_reported() {
        assert_eq!(parse_command("   ", 0), Ok(None));
        assert_eq!(
            parse_command("dance", 0),
            Err(InputError::Unknown("dance".to_string()))
        );
        assert_eq!(
            parse_command("pan north 3", 0),
            Err(InputError::NotANumber("north".to_string()))
        );
        assert!(matches!(
            parse_command("marker", 0),
            Err(InputError::MissingArgument { command: "marker", .. })
        ));
        assert_eq!(parse_command("quit", 0), Ok(Some(Command::Quit)));
    }
}
