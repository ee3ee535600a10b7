// ABOUTME: Source texts for the two columns.
// ABOUTME: Read from files when given, otherwise built-in ASCII art is shown.

use anyhow::{Context, Result};
use std::path::Path;

pub const DEFAULT_LEFT: &str = r"
   ____    ____    ____   ___   ___
  /    \  / ___|  / ___| |_ _| |_ _|
 |  /\  | \___ \ | |      | |   | |
 |  __  |  ___) || |___   | |   | |
 |_|  |_| |____/  \____| |___| |___|

  ..::##########::..   ..::########::..
 :##################: :################:
 ####   ######   #### ####  ########  ####
 ##################### ####################
  :################:   :################:
   '::##########::'     '::##########::'
";

pub const DEFAULT_RIGHT: &str = r"
   ____  _      ___  _____   ____  _   _
  / ___|| |    |_ _||_   _| / ___|| | | |
 | |  _ | |     | |   | |  | |    | |_| |
 | |_| || |___  | |   | |  | |___ |  _  |
  \____||_____||___|  |_|   \____||_| |_|

 [01] signal ........ lost     %%%%%%%%
 [02] carrier ....... lost     %%    %%
 [03] sync .......... drift    %%%%%%%%
 [04] frame ......... held     %%    %%
 [05] phosphor ...... warm     %%%%%%%%
";

fn read(path: Option<&Path>, default: &str) -> Result<String> {
    match path {
        Some(path) => std::fs::read_to_string(path)
            .with_context(|| format!("failed to read text file {}", path.display())),
        None => Ok(default.to_string()),
    }
}

/// Left and right column texts.
pub fn load_texts(left: Option<&Path>, right: Option<&Path>) -> Result<(String, String)> {
    Ok((read(left, DEFAULT_LEFT)?, read(right, DEFAULT_RIGHT)?))
}
