use std::io;

use anyhow::{Context, Result};
use clap::{Arg, ArgAction, ArgMatches, Command};
use tracing::info;

use crate::{
    auth,
    client::{ArtistSource, MAX_PAGE_SIZE},
    config,
    error::{self, Error},
    model::RankedArtist,
    rank::{Chooser, RankingSession},
    ui::{self, PromptChooser},
};

/// What came out of a ranking run
#[derive(Debug, PartialEq, Eq)]
pub enum Outcome {
    /// The account follows nobody, nothing was asked
    Empty,
    Ranked(Vec<String>),
}

pub async fn run(matches: ArgMatches) -> Result<()> {
    if matches.get_flag("logout") {
        if config::clear()? {
            println!("Removed saved credentials and tokens");
        } else {
            println!("Nothing to remove");
        }
        return Ok(());
    }

    // Get an authorized library, running the auth flow in case the user is not authorized yet
    let library = if matches.get_flag("authorize") {
        auth::run_flow().await
    } else {
        auth::authorize().await
    }
    .map_err(Error::Auth)?;

    let limit = matches
        .get_one::<u32>("limit")
        .copied()
        .unwrap_or(MAX_PAGE_SIZE);

    let names = fetch_names(&library, limit).await?;

    // Every prompt blocks on stdin, keep that off the runtime
    let outcome = tokio::task::spawn_blocking(move || {
        let stdin = io::stdin();
        let mut chooser = PromptChooser::new(stdin.lock(), io::stdout());
        rank_names(names, &mut chooser)
    })
    .await
    .context("The ranking stopped unexpectedly")??;

    match outcome {
        Outcome::Empty => {
            println!("You don't follow any artists yet, so there is nothing to rank. Go follow a few on Spotify!");
        }
        Outcome::Ranked(names) => {
            let ranking = RankedArtist::enumerate(names);

            if matches.get_flag("json") {
                println!("{}", ui::format_ranking_json(&ranking)?);
            } else {
                println!("{}", ui::format_ranking(&ranking));
            }
        }
    }

    Ok(())
}

/// Display names of the followed artists, in the order the source returns them
pub async fn fetch_names<S>(source: &S, limit: u32) -> error::Result<Vec<String>>
where
    S: ArtistSource + ?Sized,
{
    println!("Fetching your followed artists...");

    Ok(source
        .followed_artists(limit)
        .await?
        .into_iter()
        .map(|artist| artist.name)
        .collect())
}

/// Let the chooser put the names in order
pub fn rank_names<C>(names: Vec<String>, chooser: &mut C) -> error::Result<Outcome>
where
    C: Chooser<String> + ?Sized,
{
    if names.is_empty() {
        return Ok(Outcome::Empty);
    }

    println!(
        "Found {} artists, let the head to heads begin!",
        names.len()
    );

    let mut session = RankingSession::new(chooser);
    let ranked = session.rank(names)?;

    info!(
        artists = ranked.len(),
        comparisons = session.comparisons(),
        "Ranking finished"
    );

    Ok(Outcome::Ranked(ranked))
}

pub fn command() -> Command {
    Command::new("sr")
        .version(env!("CARGO_PKG_VERSION"))
        .about("Rank your followed Spotify artists, one head to head at a time")
        .after_help(
            "For every question type 1 or 2 and press enter. Anything other than 2 counts as 1.",
        )
        .args([
            Arg::new("limit")
                .long("limit")
                .short('l')
                .help("How many followed artists to rank [1-50]")
                .default_value("50")
                .action(ArgAction::Set)
                .value_parser(limit_parser),
            Arg::new("json")
                .long("json")
                .help("Print the final ranking as JSON")
                .action(ArgAction::SetTrue),
            Arg::new("verbose")
                .long("verbose")
                .short('v')
                .help("Log more details to stderr, repeat for even more")
                .action(ArgAction::Count),
        ])
        .next_help_heading("Settings")
        .args([
            Arg::new("authorize")
                .long("authorize")
                .help("Run the authorization process before ranking")
                .action(ArgAction::SetTrue),
            Arg::new("logout")
                .long("logout")
                .help("Remove saved credentials and tokens")
                .exclusive(true)
                .action(ArgAction::SetTrue),
        ])
}

fn limit_parser(arg: &str) -> Result<u32, String> {
    let num = arg
        .parse::<u32>()
        .map_err(|_| format!("\"{}\" is not a valid number value", arg))?;

    match num {
        1..=MAX_PAGE_SIZE => Ok(num),
        _ => Err(format!(
            "Please provide a limit between 1 and {}",
            MAX_PAGE_SIZE
        )),
    }
}

/// Verbosity requested on the command line, 0 if none
pub fn verbosity(matches: &ArgMatches) -> u8 {
    matches.get_count("verbose")
}

/// Parse the process arguments
pub fn parse() -> ArgMatches {
    command().get_matches()
}
