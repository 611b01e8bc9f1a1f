use serde_json::{json, Value};

/// Names accepted by [`FormData::set`], in display order.
pub const FIELD_NAMES: [&str; 6] = [
    "title",
    "episode_id",
    "director",
    "producer",
    "release_date",
    "opening_crawl",
];

/// Raw text of the add-movie form. Every field is kept as entered.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FormData {
    pub title: String,
    pub episode_id: String,
    pub director: String,
    pub producer: String,
    pub release_date: String,
    pub opening_crawl: String,
}

impl FormData {
    pub fn get(&self, name: &str) -> Option<&str> {
        let value = match name {
            "title" => &self.title,
            "episode_id" => &self.episode_id,
            "director" => &self.director,
            "producer" => &self.producer,
            "release_date" => &self.release_date,
            "opening_crawl" => &self.opening_crawl,
            _ => return None,
        };
        Some(value.as_str())
    }

    /// Returns false when `name` is not a form field.
    pub fn set(&mut self, name: &str, value: impl Into<String>) -> bool {
        let slot = match name {
            "title" => &mut self.title,
            "episode_id" => &mut self.episode_id,
            "director" => &mut self.director,
            "producer" => &mut self.producer,
            "release_date" => &mut self.release_date,
            "opening_crawl" => &mut self.opening_crawl,
            _ => return false,
        };
        *slot = value.into();
        true
    }

    pub fn first_missing_field(&self) -> Option<&'static str> {
        FIELD_NAMES
            .into_iter()
            .find(|name| self.get(name).map_or(true, |v| v.trim().is_empty()))
    }

    pub fn clear(&mut self) {
        *self = FormData::default();
    }
}

/// A movie ready to be created on the remote collection.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewMovie {
    pub title: String,
    pub episode_id: i64,
    pub director: String,
    pub producer: String,
    pub release_date: String,
    pub opening_crawl: String,
}

impl NewMovie {
    /// Converts the form text, failing only when the episode is not an integer.
    pub fn from_form(data: &FormData) -> Result<Self, std::num::ParseIntError> {
        Ok(NewMovie {
            title: data.title.clone(),
            episode_id: data.episode_id.trim().parse()?,
            director: data.director.clone(),
            producer: data.producer.clone(),
            release_date: data.release_date.clone(),
            opening_crawl: data.opening_crawl.clone(),
        })
    }

    /// Document body using typed-value wrappers for each field.
    pub fn to_document_body(&self) -> Value {
        json!({
            "fields": {
                "title": { "stringValue": self.title },
                "episode_id": { "integerValue": self.episode_id },
                "director": { "stringValue": self.director },
                "producer": { "stringValue": self.producer },
                "release_date": { "stringValue": self.release_date },
                "opening_crawl": { "stringValue": self.opening_crawl },
            }
        })
    }
}
