use std::{io::Write, path::PathBuf, sync::Arc};

use tokio::io::{AsyncBufRead, AsyncBufReadExt, BufReader, Lines};

pub mod clients;
use clients::movie_client::{MovieClient, MovieSource};

pub mod config;
use config::AppConfig;

pub mod error;
pub mod extractors;

pub mod fetchers;
use fetchers::movie_list_fetcher::{LoadState, MovieListFetcher};

pub mod forms;
use forms::movie_form::{MovieForm, SubmitError};

pub mod model;
use model::form_data::FIELD_NAMES;

pub mod persisters;
use persisters::csv_writer::CsvWriter;

pub mod views;

#[derive(Debug, PartialEq, Eq)]
enum Command {
    Reload,
    CancelRetry,
    Add,
    Export(PathBuf),
    Quit,
    Unknown(String),
}

impl Command {
    fn parse(line: &str) -> Option<Command> {
        let line = line.trim();
        let (verb, arg) = match line.split_once(char::is_whitespace) {
            Some((verb, arg)) => (verb, arg.trim()),
            None => (line, ""),
        };

        let command = match verb {
            "" => return None,
            "r" | "retry" | "refresh" => Command::Reload,
            "c" | "cancel" => Command::CancelRetry,
            "a" | "add" => Command::Add,
            "e" | "export" => {
                let file = if arg.is_empty() { "movies.csv" } else { arg };
                Command::Export(PathBuf::from(file))
            }
            "q" | "quit" => Command::Quit,
            other => Command::Unknown(other.to_string()),
        };
        Some(command)
    }
}

/// Runs an interactive session against the collection at `config.endpoint`
/// until stdin closes or the user quits.
pub async fn run(config: AppConfig) -> reqwest::Result<()> {
    let client = Arc::new(MovieClient::new(&config)?);
    log::info!("Using movie collection at {}", client.endpoint());

    let fetcher = MovieListFetcher::new(Arc::clone(&client), config.retry_delay);
    let form = MovieForm::new();

    let mut updates = fetcher.subscribe();
    let renderer = tokio::spawn(async move {
        loop {
            let view = views::movie_grid::render(&updates.borrow_and_update());
            print!("\n{view}");
            flush_prompt(&mut std::io::stdout());
            if updates.changed().await.is_err() {
                break;
            }
        }
    });
    fetcher.reload();

    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    while let Ok(Some(line)) = lines.next_line().await {
        let Some(command) = Command::parse(&line) else {
            continue;
        };

        match command {
            Command::Reload => {
                if matches!(fetcher.state(), LoadState::Loading) {
                    println!("Already loading.");
                } else {
                    fetcher.reload();
                }
            }
            Command::CancelRetry => fetcher.cancel_retry(),
            Command::Add => add_movie(&form, client.as_ref(), &fetcher, &mut lines).await,
            Command::Export(file) => export_movies(&fetcher, file),
            Command::Quit => break,
            Command::Unknown(verb) => println!("Unknown command {verb:?}"),
        }
    }

    drop(fetcher);
    renderer.abort();
    log::info!("Session finished");
    Ok(())
}

async fn add_movie<S, R>(
    form: &MovieForm,
    source: &S,
    fetcher: &MovieListFetcher<S>,
    lines: &mut Lines<R>,
) where
    S: MovieSource,
    R: AsyncBufRead + Unpin,
{
    println!("Add New Movie (leave blank to keep the current value)");
    for name in FIELD_NAMES {
        let current = form.field(name).unwrap_or_default();
        if current.is_empty() {
            print!("{name}: ");
        } else {
            print!("{name} [{current}]: ");
        }
        flush_prompt(&mut std::io::stdout());

        match lines.next_line().await {
            Ok(Some(value)) if !value.trim().is_empty() => {
                form.set_field(name, value.trim());
            }
            Ok(Some(_)) => {}
            _ => return,
        }
    }

    match form
        .submit(source, || {
            fetcher.reload();
        })
        .await
    {
        Ok(()) => println!("Movie added."),
        Err(e @ SubmitError::Request(_)) => {
            println!("{e}");
            print!("Press Enter to continue");
            flush_prompt(&mut std::io::stdout());
            let _ = lines.next_line().await;
        }
        Err(e) => println!("{e}"),
    }
}

/// Prompts are printed without a newline and need an explicit flush.
fn flush_prompt(out: &mut impl Write) -> bool {
    match out.flush() {
        Ok(()) => true,
        Err(e) => {
            log::warn!("Could not flush stdout: {}", e);
            false
        }
    }
}

fn export_movies<S: MovieSource>(fetcher: &MovieListFetcher<S>, file: PathBuf) {
    let state = fetcher.state();
    let Some(movies) = state.movies() else {
        println!("Nothing to export until the films are loaded.");
        return;
    };

    match CsvWriter::save_movies_to_csv(movies, &file) {
        Ok(()) => println!("Exported {} movies to {}", movies.len(), file.display()),
        Err(e) => log::error!("Error when exporting movies: {}", e),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_short_and_long_commands() {
        assert_eq!(Command::parse(" r "), Some(Command::Reload));
        assert_eq!(Command::parse("cancel"), Some(Command::CancelRetry));
        assert_eq!(Command::parse("add"), Some(Command::Add));
        assert_eq!(Command::parse("q"), Some(Command::Quit));
        assert_eq!(Command::parse(""), None);
        assert_eq!(
            Command::parse("x"),
            Some(Command::Unknown("x".to_string()))
        );
    }

    struct ClosedPipe;

    impl Write for ClosedPipe {
        fn write(&mut self, buf: &[u8]) -> std::io::Result<usize> {
            Ok(buf.len())
        }

        fn flush(&mut self) -> std::io::Result<()> {
            Err(std::io::ErrorKind::BrokenPipe.into())
        }
    }

    #[test]
    fn flush_failure_is_reported_not_swallowed() {
        assert!(!flush_prompt(&mut ClosedPipe));
        assert!(flush_prompt(&mut Vec::<u8>::new()));
    }

    #[test]
    fn export_defaults_file_name() {
        assert_eq!(
            Command::parse("e"),
            Some(Command::Export(PathBuf::from("movies.csv")))
        );
        assert_eq!(
            Command::parse("export  out/films.csv"),
            Some(Command::Export(PathBuf::from("out/films.csv")))
        );
    }
}
