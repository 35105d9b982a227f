use std::{
    fmt::Display,
    io::{BufRead, Write},
};

use anyhow::{Context, Result};
use inquire::{validator::Validation, Text};

use crate::{
    error::{self, Error},
    model::{Choice, RankedArtist},
    rank::Chooser,
};

const BANNER_WIDTH: usize = 30;

/// Asks the user about each head-to-head on a line based terminal
///
/// Reads one line per question. Only "2" picks the right side, anything else the left.
pub struct PromptChooser<R, W> {
    input: R,
    output: W,
    round: usize,
}

impl<R: BufRead, W: Write> PromptChooser<R, W> {
    pub fn new(input: R, output: W) -> Self {
        Self {
            input,
            output,
            round: 0,
        }
    }
}

impl<T: Display, R: BufRead, W: Write> Chooser<T> for PromptChooser<R, W> {
    fn choose(&mut self, left: &T, right: &T) -> error::Result<Choice> {
        self.round += 1;

        writeln!(self.output, "\n[ Head to head #{} ]", self.round)?;
        writeln!(self.output, "  1. {}", left)?;
        writeln!(self.output, "  2. {}", right)?;
        write!(self.output, "Which one do you prefer? Enter 1 or 2: ")?;
        self.output.flush()?;

        let mut line = String::new();
        if self.input.read_line(&mut line)? == 0 {
            return Err(Error::InputClosed);
        }

        Ok(Choice::from_response(&line))
    }
}

/// Render the final ranking as a numbered list
pub fn format_ranking(ranking: &[RankedArtist]) -> String {
    let banner = "★".repeat(BANNER_WIDTH);
    let mut out = format!("\n{banner}\nYour final artist ranking\n");

    for artist in ranking {
        out.push_str(&format!("{:>3}. {}\n", artist.rank, artist.name));
    }

    out.push_str(&banner);
    out
}

/// Render the final ranking as JSON
pub fn format_ranking_json(ranking: &[RankedArtist]) -> Result<String> {
    serde_json::to_string_pretty(ranking).context("Failed serializing the ranking")
}

/// Collect the client id of the user's Spotify app
pub fn collect_client_id(callback_uri: &'static str) -> Result<String> {
    println!(
"To read the artists you follow this tool needs the client id of a Spotify app.

Don't worry, this is easy to do and only has to be done once.

To get one go to the Spotify Developer Dashboard: https://developer.spotify.com/dashboard

1. Create a new app and give it any name and description.
2. Make sure to add the \"{}\" Redirect URI.
3. Then select the \"Web API\" option.
4. Accept the Terms of Service and finally click \"Save\".
5. Now click on the newly created app and go to the settings.
6. Here you will find the client id.

You can also set the SPOTIFY_CLIENT_ID environment variable instead.
", callback_uri
    );

    let client_id = Text::new("Enter the client id")
        .with_validator(|input: &str| {
            if input.trim().is_empty() {
                Ok(Validation::Invalid("The client id can't be empty".into()))
            } else {
                Ok(Validation::Valid)
            }
        })
        .prompt()
        .context("Failed reading client id input")?;

    Ok(client_id.trim().to_string())
}

/// Collect the redirect url, used when the callback server couldn't run
pub fn collect_callback_url() -> Result<String> {
    let url_input = Text::new("Please paste the url that was opened in your browser")
        .prompt()
        .context("Failed reading callback URL input")?;

    Ok(url_input.trim().to_string())
}
