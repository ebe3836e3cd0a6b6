//! Wizard input lines.
//!
//! `field = value` sets a field; `:command [arg]` runs a command.

use rainwise::{Coordinate, FormField};

#[derive(Debug, Clone, PartialEq)]
pub enum Input {
    Set(FormField, String),
    Next,
    Prev,
    Locate,
    Click(Coordinate),
    Drag(Coordinate),
    Earth,
    Review,
    Submit,
    Help,
    Quit,
    Empty,
}

pub const HELP: &str = "\
  <field> = <value>    set a field (name, location, dwellers, roof_area,
                       open_space, roof_type, roof_age, soil_type)
  :next / :prev        move between steps
  :locate              use this device's position
  :click <lat>,<lng>   pick a point on the map
  :drag <lat>,<lng>    move the marker
  :earth               Google Earth link for measuring the roof
  :review              show every answer
  :submit              submit the assessment (last step)
  :quit                leave without submitting";

pub fn parse_input(line: &str) -> Result<Input, String> {
    let line = line.trim();
    if line.is_empty() {
        return Ok(Input::Empty);
    }

    if let Some(command) = line.strip_prefix(':') {
        let (name, arg) = match command.split_once(char::is_whitespace) {
            Some((name, arg)) => (name, arg.trim()),
            None => (command, ""),
        };
        let point = || Coordinate::parse_pair(arg).map_err(|e| e.to_string());
        return match name.to_ascii_lowercase().as_str() {
            "next" | "n" => Ok(Input::Next),
            "prev" | "p" | "back" => Ok(Input::Prev),
            "locate" => Ok(Input::Locate),
            "click" => point().map(Input::Click),
            "drag" => point().map(Input::Drag),
            "earth" => Ok(Input::Earth),
            "review" => Ok(Input::Review),
            "submit" => Ok(Input::Submit),
            "help" | "h" | "?" => Ok(Input::Help),
            "quit" | "q" | "exit" => Ok(Input::Quit),
            other => Err(format!("unknown command :{} (try :help)", other)),
        };
    }

    match line.split_once('=') {
        Some((field, value)) => {
            let field = FormField::from_str(field.trim())
                .ok_or_else(|| format!("unknown field {:?}", field.trim()))?;
            Ok(Input::Set(field, value.trim().to_string()))
        }
        None => Err("expected `field = value` or a :command (try :help)".to_string()),
    }
}
