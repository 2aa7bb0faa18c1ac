// Copyright (c) Zefchain Labs, Inc.
// SPDX-License-Identifier: Apache-2.0

use std::str::FromStr;

use whitelist_client::message::Command;

/// A line typed by the user.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Input {
    Command(Command),
    Help,
    Quit,
}

#[derive(Debug, thiserror::Error)]
#[error("unknown command `{0}`, type `help` for the list of commands")]
pub struct UnknownInput(String);

pub const HELP: &str = "\
commands:
  connect   connect the wallet
  join      join the whitelist
  refresh   read the number of whitelisted addresses again
  help      show this message
  quit      exit";

impl FromStr for Input {
    type Err = UnknownInput;

    fn from_str(line: &str) -> Result<Self, Self::Err> {
        match line.trim().to_ascii_lowercase().as_str() {
            "connect" | "c" => Ok(Input::Command(Command::Connect)),
            "join" | "j" => Ok(Input::Command(Command::Join)),
            "refresh" | "r" => Ok(Input::Command(Command::Refresh)),
            "help" | "h" | "?" => Ok(Input::Help),
            "quit" | "q" | "exit" => Ok(Input::Quit),
            _ => Err(UnknownInput(line.trim().to_string())),
        }
    }
}

#[cfg(test)]
mod tests {
    use assert_matches::assert_matches;
    use test_case::test_case;

    use super::*;

    #[test_case("connect", Input::Command(Command::Connect); "connect")]
    #[test_case("  Join\n", Input::Command(Command::Join); "join with spaces")]
    #[test_case("r", Input::Command(Command::Refresh); "refresh shorthand")]
    #[test_case("?", Input::Help; "help")]
    #[test_case("exit", Input::Quit; "exit")]
    fn test_parse(line: &str, expected: Input) {
        assert_eq!(line.parse::<Input>().unwrap(), expected);
    }

    #[test]
    fn test_unknown() {
        assert_matches!("mint".parse::<Input>(), Err(UnknownInput(line)) if line == "mint");
    }
}
