use std::collections::HashMap;

use serde::Deserialize;
use serde_json::Value;

use crate::{
    error::MovieClientError,
    model::movie::{sort_by_episode, Movie, MovieStats, UNKNOWN, UNKNOWN_TITLE},
};

/// The two shapes the collection endpoint is known to answer with.
#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum CollectionResponse {
    RawArray(Vec<RawFilm>),
    DocumentWrapper(DocumentCollection),
}

#[derive(Debug, Deserialize)]
struct RawFilm {
    url: Option<String>,
    title: Option<String>,
    episode_id: Option<Value>,
    director: Option<String>,
    producer: Option<String>,
    release_date: Option<String>,
    opening_crawl: Option<String>,
    characters: Option<Vec<Value>>,
    planets: Option<Vec<Value>>,
    starships: Option<Vec<Value>>,
    species: Option<Vec<Value>>,
}

#[derive(Debug, Deserialize)]
struct DocumentCollection {
    // An empty collection comes back as `{}`.
    #[serde(default)]
    documents: Vec<Document>,
}

#[derive(Debug, Deserialize)]
struct Document {
    #[serde(default)]
    name: String,
    #[serde(default)]
    fields: HashMap<String, TypedValue>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
struct TypedValue {
    string_value: Option<String>,
    // Integers are sent as strings by some document stores.
    integer_value: Option<Value>,
}

#[derive(Debug)]
pub struct MovieExtractor {}

impl MovieExtractor {
    /// Parses a collection body into movies sorted by episode.
    pub fn extract_movies_from_json(body: &str) -> Result<Vec<Movie>, MovieClientError> {
        let response: CollectionResponse = serde_json::from_str(body)?;

        let mut movies: Vec<Movie> = match response {
            CollectionResponse::RawArray(films) => {
                films.into_iter().map(MovieExtractor::from_raw_film).collect()
            }
            CollectionResponse::DocumentWrapper(collection) => collection
                .documents
                .into_iter()
                .map(MovieExtractor::from_document)
                .collect(),
        };

        sort_by_episode(&mut movies);
        Ok(movies)
    }

    fn from_raw_film(film: RawFilm) -> Movie {
        let stats = match (&film.characters, &film.planets, &film.starships, &film.species) {
            (None, None, None, None) => None,
            (characters, planets, starships, species) => Some(MovieStats {
                characters: characters.as_ref().map_or(0, Vec::len),
                planets: planets.as_ref().map_or(0, Vec::len),
                starships: starships.as_ref().map_or(0, Vec::len),
                species: species.as_ref().map_or(0, Vec::len),
            }),
        };

        Movie {
            id: film.url.unwrap_or_default(),
            title: film.title.unwrap_or_else(|| UNKNOWN_TITLE.to_string()),
            episode_id: film.episode_id.as_ref().map_or(0, parse_episode_id),
            director: film.director.unwrap_or_else(|| UNKNOWN.to_string()),
            producer: film.producer.unwrap_or_else(|| UNKNOWN.to_string()),
            release_date: film.release_date.unwrap_or_default(),
            opening_crawl: film.opening_crawl.unwrap_or_else(|| UNKNOWN.to_string()),
            stats,
        }
    }

    fn from_document(document: Document) -> Movie {
        let fields = &document.fields;
        let text = |name: &str, fallback: &str| {
            fields
                .get(name)
                .and_then(|v| v.string_value.clone())
                .unwrap_or_else(|| fallback.to_string())
        };

        let episode_id = fields.get("episode_id").map_or(0, |v| {
            match (&v.integer_value, &v.string_value) {
                (Some(int), _) => parse_episode_id(int),
                (None, Some(text)) => text.trim().parse().unwrap_or(0),
                (None, None) => 0,
            }
        });

        Movie {
            id: document_id(&document.name),
            title: text("title", UNKNOWN_TITLE),
            episode_id,
            director: text("director", UNKNOWN),
            producer: text("producer", UNKNOWN),
            release_date: text("release_date", ""),
            opening_crawl: text("opening_crawl", UNKNOWN),
            stats: None,
        }
    }
}

/// Accepts integers and numeric strings; anything else counts as episode 0.
fn parse_episode_id(value: &Value) -> i64 {
    match value {
        Value::Number(n) => n
            .as_i64()
            .or_else(|| n.as_f64().map(|f| f as i64))
            .unwrap_or(0),
        Value::String(s) => s.trim().parse().unwrap_or(0),
        _ => 0,
    }
}

/// Last segment of a resource path such as `projects/p/.../films/abc`.
fn document_id(name: &str) -> String {
    name.rsplit('/').next().unwrap_or_default().to_string()
}
