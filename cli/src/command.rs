use anyhow::{Context, bail};
use squishy_core::Direction;
use std::str::FromStr;

pub const HELP: &str = "\
h/a left  l/d right  k/w up  j/s down
b         step back towards the start
r         rewind to the start
n         new level
drag X Y  pointer offset from the player center, in cells
export    print the level as JSON
q         quit";

#[derive(Copy, Clone, Debug, PartialEq)]
pub enum Command {
    Move(Direction),
    Back,
    Reset,
    NewGame,
    Drag(f32, f32),
    Export,
    Help,
    Quit,
}

impl FromStr for Command {
    type Err = anyhow::Error;

    fn from_str(line: &str) -> anyhow::Result<Self> {
        let mut words = line.split_whitespace();
        let Some(head) = words.next() else {
            bail!("empty command");
        };

        let command = match head {
            "h" | "a" | "left" => Self::Move(Direction::Left),
            "l" | "d" | "right" => Self::Move(Direction::Right),
            "k" | "w" | "up" => Self::Move(Direction::Up),
            "j" | "s" | "down" => Self::Move(Direction::Down),
            "b" | "back" => Self::Back,
            "r" | "reset" => Self::Reset,
            "n" | "new" => Self::NewGame,
            "export" => Self::Export,
            "?" | "help" => Self::Help,
            "q" | "quit" => Self::Quit,
            "drag" => {
                let mut next = |axis: &str| -> anyhow::Result<f32> {
                    words
                        .next()
                        .with_context(|| format!("drag needs a {axis} offset"))?
                        .parse::<f32>()
                        .with_context(|| format!("invalid {axis} offset"))
                };
                let dx = next("x")?;
                let dy = next("y")?;
                Self::Drag(dx, dy)
            }
            other => bail!("unknown command {other:?}, try help"),
        };
        Ok(command)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_moves_and_aliases() {
        assert_eq!("h".parse::<Command>().unwrap(), Command::Move(Direction::Left));
        assert_eq!(" s ".parse::<Command>().unwrap(), Command::Move(Direction::Down));
        assert_eq!("reset".parse::<Command>().unwrap(), Command::Reset);
    }

    #[test]
    fn parses_drag_offsets() {
        assert_eq!(
            "drag 0.8 -0.1".parse::<Command>().unwrap(),
            Command::Drag(0.8, -0.1)
        );
        assert!("drag 0.8".parse::<Command>().is_err());
        assert!("drag x 1".parse::<Command>().is_err());
    }

    #[test]
    fn rejects_unknown_input() {
        assert!("".parse::<Command>().is_err());
        assert!("jump".parse::<Command>().is_err());
    }
}
