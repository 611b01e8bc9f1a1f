use async_trait::async_trait;
use reqwest::{header, Client, Response};

use crate::{
    config::AppConfig,
    error::MovieClientError,
    extractors::movie_extractor::MovieExtractor,
    model::{form_data::NewMovie, movie::Movie},
};

/// Where movies are listed from and created on.
#[async_trait]
pub trait MovieSource: Send + Sync + 'static {
    async fn fetch_movies(&self) -> Result<Vec<Movie>, MovieClientError>;

    async fn create_movie(&self, movie: &NewMovie) -> Result<(), MovieClientError>;
}

#[derive(Debug, Clone)]
pub struct MovieClient {
    client: Client,
    endpoint: String,
}

impl MovieClient {
    pub fn new(config: &AppConfig) -> reqwest::Result<Self> {
        let user_agent = header::HeaderValue::from_str(&config.user_agent)
            .unwrap_or_else(|_| header::HeaderValue::from_static("filmgrid"));
        Ok(Self {
            client: Client::builder().user_agent(user_agent).build()?,
            endpoint: config.endpoint.clone(),
        })
    }

    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }

    async fn get_json_from_endpoint(&self) -> Result<String, MovieClientError> {
        log::debug!("Getting movie collection from {}", self.endpoint);
        let resp = self
            .client
            .get(&self.endpoint)
            .send()
            .await
            .map_err(|e| self.transport_error(e))?;

        self.ensure_success(resp)?
            .text()
            .await
            .map_err(|e| self.transport_error(e))
    }

    fn ensure_success(&self, resp: Response) -> Result<Response, MovieClientError> {
        let status = resp.status();
        if !status.is_success() {
            return Err(MovieClientError::Status {
                url: self.endpoint.clone(),
                status,
            });
        }
        Ok(resp)
    }

    fn transport_error(&self, source: reqwest::Error) -> MovieClientError {
        MovieClientError::Transport {
            url: self.endpoint.clone(),
            source,
        }
    }
}

#[async_trait]
impl MovieSource for MovieClient {
    async fn fetch_movies(&self) -> Result<Vec<Movie>, MovieClientError> {
        let body = self.get_json_from_endpoint().await?;
        let movies = MovieExtractor::extract_movies_from_json(&body)?;
        log::debug!("Fetched {} movies from {}", movies.len(), self.endpoint);
        Ok(movies)
    }

    async fn create_movie(&self, movie: &NewMovie) -> Result<(), MovieClientError> {
        log::debug!("Posting movie {} to {}", movie.title, self.endpoint);
        let resp = self
            .client
            .post(&self.endpoint)
            .json(&movie.to_document_body())
            .send()
            .await
            .map_err(|e| self.transport_error(e))?;

        self.ensure_success(resp)?;
        Ok(())
    }
}
