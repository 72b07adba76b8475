// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

//! The vocabulary a front-end speaks to the viewer.  Gestures, keys
//! and scroll bars all come down to one of these.  They also have a
//! small textual form, `move:10,-4` or `zoom-in`, so scripts and the
//! command line can drive the viewer.

use std::fmt;
use std::str::FromStr;

use crate::backend::BackendKind;
use crate::errors::CommandError;
use crate::planes::Size;

/// One instruction from a front-end.
#[derive(Copy, Clone, Debug, PartialEq)]
pub enum Command {
    /// Pan by a pixel delta.
    Move(i32, i32),
    /// Put the view at a position on the full-size canvas.
    Locate(i32, i32),
    /// Keyboard pans.
    Left,
    /// See `Left`.
    Right,
    /// See `Left`.
    Up,
    /// See `Left`.
    Down,
    /// One zoom step in.
    ZoomIn,
    /// One zoom step out.
    ZoomOut,
    /// Back to the whole window.
    Reset,
    /// Redraw everything.
    Refresh,
    /// New view size.
    Resize(Size),
    /// Switch compute backends.
    Backend(BackendKind),
    /// Turn incremental moves on or off.
    Incremental(bool),
}

/// Given a string and a separator, returns the two values
/// separated by the separator.
pub fn parse_pair<T: FromStr>(s: &str, separator: char) -> Option<(T, T)> {
    match s.find(separator) {
        None => None,
        Some(index) => match (
            T::from_str(s[..index].trim()),
            T::from_str(s[index + 1..].trim()),
        ) {
            (Ok(l), Ok(r)) => Some((l, r)),
            _ => None,
        },
    }
}

/// Parse a `;`-separated script.  Blank entries are skipped.
pub fn parse_script(script: &str) -> Result<Vec<Command>, CommandError> {
    script
        .split(';')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(Command::from_str)
        .collect()
}

impl FromStr for Command {
    type Err = CommandError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();
        let (keyword, argument) = match s.find(':') {
            Some(index) => (&s[..index], Some(&s[index + 1..])),
            None => (s, None),
        };
        let malformed = || CommandError::Malformed(s.to_string());

        match (keyword.to_lowercase().as_str(), argument) {
            ("move", Some(arg)) => parse_pair(arg, ',')
                .map(|(dx, dy)| Command::Move(dx, dy))
                .ok_or_else(malformed),
            ("locate", Some(arg)) => parse_pair(arg, ',')
                .map(|(x, y)| Command::Locate(x, y))
                .ok_or_else(malformed),
            ("resize", Some(arg)) => match parse_pair::<i32>(arg, 'x') {
                Some((w, h)) if w > 0 && h > 0 => Ok(Command::Resize(Size::new(w, h))),
                _ => Err(malformed()),
            },
            ("backend", Some(arg)) => BackendKind::from_str(arg).map(Command::Backend),
            ("incremental", Some(arg)) => match arg.trim().to_lowercase().as_str() {
                "on" | "true" | "yes" => Ok(Command::Incremental(true)),
                "off" | "false" | "no" => Ok(Command::Incremental(false)),
                _ => Err(malformed()),
            },
            ("left", None) => Ok(Command::Left),
            ("right", None) => Ok(Command::Right),
            ("up", None) => Ok(Command::Up),
            ("down", None) => Ok(Command::Down),
            ("zoom-in", None) => Ok(Command::ZoomIn),
            ("zoom-out", None) => Ok(Command::ZoomOut),
            ("reset", None) => Ok(Command::Reset),
            ("refresh", None) => Ok(Command::Refresh),
            ("move", None) | ("locate", None) | ("resize", None) | ("backend", None)
            | ("incremental", None) => Err(malformed()),
            _ => Err(CommandError::Unknown(s.to_string())),
        }
    }
}

impl fmt::Display for Command {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            Command::Move(dx, dy) => write!(f, "move:{},{}", dx, dy),
            Command::Locate(x, y) => write!(f, "locate:{},{}", x, y),
            Command::Left => write!(f, "left"),
            Command::Right => write!(f, "right"),
            Command::Up => write!(f, "up"),
            Command::Down => write!(f, "down"),
            Command::ZoomIn => write!(f, "zoom-in"),
            Command::ZoomOut => write!(f, "zoom-out"),
            Command::Reset => write!(f, "reset"),
            Command::Refresh => write!(f, "refresh"),
            Command::Resize(size) => write!(f, "resize:{}x{}", size.width, size.height),
            Command::Backend(kind) => write!(f, "backend:{}", kind),
            Command::Incremental(on) => {
                write!(f, "incremental:{}", if *on { "on" } else { "off" })
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_pair_splits_on_the_separator() {
        assert_eq!(parse_pair::<i32>("10,-4", ','), Some((10, -4)));
        assert_eq!(parse_pair::<u16>("800x600", 'x'), Some((800, 600)));
        assert_eq!(parse_pair::<f64>("-2.1, 0.5", ','), Some((-2.1, 0.5)));
        assert_eq!(parse_pair::<i32>("10", ','), None);
        assert_eq!(parse_pair::<i32>("10,x", ','), None);
    }

    #[test]
    fn parses_every_keyword() {
        assert_eq!("move:10,-4".parse::<Command>(), Ok(Command::Move(10, -4)));
        assert_eq!("locate:3,4".parse::<Command>(), Ok(Command::Locate(3, 4)));
        assert_eq!(
            "resize:640x480".parse::<Command>(),
            Ok(Command::Resize(Size::new(640, 480)))
        );
        assert_eq!(
            "backend:tiled:2".parse::<Command>(),
            Ok(Command::Backend(BackendKind::Tiled(2)))
        );
        assert_eq!("incremental:off".parse::<Command>(), Ok(Command::Incremental(false)));
        assert_eq!("Zoom-In".parse::<Command>(), Ok(Command::ZoomIn));
        assert_eq!(" left ".parse::<Command>(), Ok(Command::Left));
    }

    #[test]
    fn rejects_bad_input() {
        assert_eq!(
            "spin".parse::<Command>(),
            Err(CommandError::Unknown("spin".to_string()))
        );
        assert_eq!(
            "move:1".parse::<Command>(),
            Err(CommandError::Malformed("move:1".to_string()))
        );
        assert!("move".parse::<Command>().is_err());
        assert!("resize:0x10".parse::<Command>().is_err());
        assert!("incremental:maybe".parse::<Command>().is_err());
        assert!("backend:gpu".parse::<Command>().is_err());
    }

    #[test]
    fn scripts_split_on_semicolons() {
        assert_eq!(
            parse_script("zoom-in; move:5,0;;reset;"),
            Ok(vec![Command::ZoomIn, Command::Move(5, 0), Command::Reset])
        );
        assert_eq!(parse_script(""), Ok(vec![]));
        assert!(parse_script("zoom-in;bogus").is_err());
    }

    #[test]
    fn display_round_trips_through_parse() {
        let script = "move:-3,7;locate:0,12;resize:10x20;backend:sequential;incremental:on";
        for command in parse_script(script).unwrap() {
            assert_eq!(command.to_string().parse::<Command>(), Ok(command));
        }
    }
}
