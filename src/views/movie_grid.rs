use std::fmt::Write;

use chrono::NaiveDate;

use crate::{fetchers::movie_list_fetcher::LoadState, model::movie::Movie};

const RULE: &str = "------------------------------------------------------------";

pub fn render(state: &LoadState) -> String {
    match state {
        LoadState::Loading => "Loading Star Wars Films...\n".to_string(),
        LoadState::RetryingError(message) => {
            format!("Error: {message}\n[c] Cancel Retry\n")
        }
        LoadState::TerminalError(message) => format!("Error: {message}\n[r] Retry\n"),
        LoadState::Loaded(movies) => render_grid(movies),
    }
}

fn render_grid(movies: &[Movie]) -> String {
    let mut out = String::from("Star Wars Films\n");
    out.push_str(RULE);
    out.push('\n');
    if movies.is_empty() {
        out.push_str("No films yet.\n");
    }
    for movie in movies {
        out.push_str(&render_card(movie));
        out.push_str(RULE);
        out.push('\n');
    }
    out.push_str("[r] Refresh  [a] Add movie  [e <file>] Export csv  [q] Quit\n");
    out
}

pub fn render_card(movie: &Movie) -> String {
    let mut card = String::new();
    let _ = writeln!(card, "Episode {}  {}", movie.episode_id, movie.title);
    let _ = writeln!(card, "  Director      {}", movie.director);
    let _ = writeln!(card, "  Producer      {}", movie.producer);
    let _ = writeln!(card, "  Release Date  {}", format_date(&movie.release_date));
    let _ = writeln!(card, "  {}", movie.opening_crawl.replace("\r\n", " ").replace('\n', " "));
    if let Some(stats) = &movie.stats {
        let _ = writeln!(
            card,
            "  Characters {} | Planets {} | Starships {} | Species {}",
            stats.characters, stats.planets, stats.starships, stats.species
        );
    }
    card
}

/// "1977-05-25" becomes "May 25, 1977". Other text is shown as is.
pub fn format_date(date: &str) -> String {
    let day = date.get(..10).unwrap_or(date);
    match NaiveDate::parse_from_str(day, "%Y-%m-%d") {
        Ok(parsed) => parsed.format("%B %-d, %Y").to_string(),
        Err(_) => date.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        fetchers::movie_list_fetcher::{FAILED_MESSAGE, RETRYING_MESSAGE},
        model::movie::MovieStats,
    };

    fn empire() -> Movie {
        Movie {
            id: "https://swapi.info/api/films/2".to_string(),
            title: "The Empire Strikes Back".to_string(),
            episode_id: 5,
            director: "Irvin Kershner".to_string(),
            producer: "Gary Kurtz, Rick McCallum".to_string(),
            release_date: "1980-05-17".to_string(),
            opening_crawl: "It is a dark time\r\nfor the Rebellion.".to_string(),
            stats: Some(MovieStats {
                characters: 16,
                planets: 4,
                starships: 9,
                species: 5,
            }),
        }
    }

    #[test]
    fn formats_iso_dates() {
        assert_eq!(format_date("1977-05-25"), "May 25, 1977");
        assert_eq!(format_date("2015-12-18T00:00:00Z"), "December 18, 2015");
        assert_eq!(format_date("someday"), "someday");
        assert_eq!(format_date(""), "");
    }

    #[test]
    fn retrying_error_offers_cancel() {
        let out = render(&LoadState::RetryingError(RETRYING_MESSAGE.to_string()));

        assert!(out.contains(RETRYING_MESSAGE));
        assert!(out.contains("Cancel Retry"));
    }

    #[test]
    fn terminal_error_offers_retry() {
        let out = render(&LoadState::TerminalError(FAILED_MESSAGE.to_string()));

        assert!(out.contains("[r] Retry"));
        assert!(!out.contains("Cancel"));
    }

    #[test]
    fn card_shows_details_and_counts() {
        let card = render_card(&empire());

        assert!(card.starts_with("Episode 5  The Empire Strikes Back\n"));
        assert!(card.contains("Release Date  May 17, 1980"));
        assert!(card.contains("It is a dark time for the Rebellion."));
        assert!(card.contains("Characters 16 | Planets 4 | Starships 9 | Species 5"));
    }

    #[test]
    fn grid_keeps_list_order() {
        let mut hope = empire();
        hope.title = "A New Hope".to_string();
        hope.episode_id = 4;
        hope.stats = None;

        let out = render(&LoadState::Loaded(vec![hope, empire()]));

        let hope_at = out.find("A New Hope").unwrap();
        let empire_at = out.find("The Empire Strikes Back").unwrap();
        assert!(hope_at < empire_at);
        assert_eq!(out.matches("Characters").count(), 1);
    }
}
