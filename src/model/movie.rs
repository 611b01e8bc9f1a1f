pub const UNKNOWN_TITLE: &str = "Unknown Title";
pub const UNKNOWN: &str = "Unknown";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Movie {
    pub id: String,
    pub title: String,
    pub episode_id: i64,
    pub director: String,
    pub producer: String,
    pub release_date: String,
    pub opening_crawl: String,
    pub stats: Option<MovieStats>,
}

/// Entity counts, only reported by APIs that link films to characters etc.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct MovieStats {
    pub characters: usize,
    pub planets: usize,
    pub starships: usize,
    pub species: usize,
}

impl Movie {
    pub fn to_csvable_array(&self) -> Vec<String> {
        let count = |f: fn(&MovieStats) -> usize| {
            self.stats
                .as_ref()
                .map(|s| f(s).to_string())
                .unwrap_or_default()
        };

        vec![
            self.episode_id.to_string(),
            self.title.clone(),
            self.director.clone(),
            self.producer.clone(),
            self.release_date.clone(),
            count(|s| s.characters),
            count(|s| s.planets),
            count(|s| s.starships),
            count(|s| s.species),
        ]
    }

    pub fn csv_titles() -> Vec<&'static str> {
        vec![
            "Episode",
            "Title",
            "Director",
            "Producer",
            "Release Date",
            "Characters",
            "Planets",
            "Starships",
            "Species",
        ]
    }
}

/// Sorts ascending by episode, keeping API order for equal episodes.
pub fn sort_by_episode(movies: &mut [Movie]) {
    movies.sort_by_key(|movie| movie.episode_id);
}
