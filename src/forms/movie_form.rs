use std::sync::{
    atomic::{AtomicBool, Ordering},
    Mutex, MutexGuard, PoisonError,
};

use thiserror::Error;

use crate::{
    clients::movie_client::MovieSource,
    error::MovieClientError,
    model::form_data::{FormData, NewMovie},
};

#[derive(Debug, Error)]
pub enum SubmitError {
    #[error("a movie is already being submitted")]
    InFlight,
    #[error("{0} is required")]
    MissingField(&'static str),
    #[error("episode_id must be a whole number, got {0:?}")]
    InvalidEpisodeId(String),
    #[error("failed to add movie: {0}")]
    Request(#[from] MovieClientError),
}

/// Add-movie form. Only one submission may be in flight at a time.
#[derive(Debug, Default)]
pub struct MovieForm {
    data: Mutex<FormData>,
    submitting: AtomicBool,
}

impl MovieForm {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set_field(&self, name: &str, value: impl Into<String>) -> bool {
        self.lock_data().set(name, value)
    }

    pub fn field(&self, name: &str) -> Option<String> {
        self.lock_data().get(name).map(str::to_string)
    }

    pub fn data(&self) -> FormData {
        self.lock_data().clone()
    }

    pub fn is_submitting(&self) -> bool {
        self.submitting.load(Ordering::SeqCst)
    }

    /// Creates the movie on `source`. On success the fields are cleared and
    /// `on_added` runs once; on failure the entered values are kept.
    pub async fn submit<S>(&self, source: &S, on_added: impl FnOnce()) -> Result<(), SubmitError>
    where
        S: MovieSource + ?Sized,
    {
        if self.submitting.swap(true, Ordering::SeqCst) {
            return Err(SubmitError::InFlight);
        }
        let _submitting = SubmittingGuard(&self.submitting);

        let data = self.data();
        if let Some(field) = data.first_missing_field() {
            return Err(SubmitError::MissingField(field));
        }
        let movie = NewMovie::from_form(&data)
            .map_err(|_| SubmitError::InvalidEpisodeId(data.episode_id.clone()))?;

        if let Err(e) = source.create_movie(&movie).await {
            log::warn!("Could not add movie {}: {}", movie.title, e);
            return Err(e.into());
        }

        log::info!("Added movie {} (episode {})", movie.title, movie.episode_id);
        self.lock_data().clear();
        on_added();
        Ok(())
    }

    fn lock_data(&self) -> MutexGuard<'_, FormData> {
        self.data.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

struct SubmittingGuard<'a>(&'a AtomicBool);

impl Drop for SubmittingGuard<'_> {
    fn drop(&mut self) {
        self.0.store(false, Ordering::SeqCst);
    }
}

#[cfg(test)]
mod tests {
    use std::sync::{atomic::AtomicUsize, Arc};

    use async_trait::async_trait;
    use reqwest::StatusCode;
    use tokio::sync::Notify;

    use super::*;
    use crate::model::{form_data::FIELD_NAMES, movie::Movie};

    #[derive(Default)]
    struct RecordingSource {
        created: Mutex<Vec<NewMovie>>,
        fail: bool,
        gate: Option<Notify>,
    }

    #[async_trait]
    impl MovieSource for RecordingSource {
        async fn fetch_movies(&self) -> Result<Vec<Movie>, MovieClientError> {
            Ok(vec![])
        }

        async fn create_movie(&self, movie: &NewMovie) -> Result<(), MovieClientError> {
            if let Some(gate) = &self.gate {
                gate.notified().await;
            }
            self.created.lock().unwrap().push(movie.clone());
            if self.fail {
                return Err(MovieClientError::Status {
                    url: "http://films.test".to_string(),
                    status: StatusCode::BAD_REQUEST,
                });
            }
            Ok(())
        }
    }

    fn filled_form() -> MovieForm {
        let form = MovieForm::new();
        form.set_field("title", "The Force Awakens");
        form.set_field("episode_id", "7");
        form.set_field("director", "J. J. Abrams");
        form.set_field("producer", "Kathleen Kennedy");
        form.set_field("release_date", "2015-12-18");
        form.set_field("opening_crawl", "Luke Skywalker has vanished.");
        form
    }

    #[tokio::test]
    async fn success_clears_fields_and_notifies_once() {
        let source = RecordingSource::default();
        let form = filled_form();
        let notified = AtomicUsize::new(0);

        form.submit(&source, || {
            notified.fetch_add(1, Ordering::SeqCst);
        })
        .await
        .unwrap();

        assert_eq!(notified.load(Ordering::SeqCst), 1);
        assert_eq!(form.data(), FormData::default());
        for name in FIELD_NAMES {
            assert_eq!(form.field(name).as_deref(), Some(""));
        }
        let created = source.created.lock().unwrap();
        assert_eq!(created.len(), 1);
        assert_eq!(created[0].episode_id, 7);
        assert!(!form.is_submitting());
    }

    #[tokio::test]
    async fn failure_keeps_entered_values() {
        let source = RecordingSource {
            fail: true,
            ..Default::default()
        };
        let form = filled_form();
        let before = form.data();
        let mut notified = false;

        let result = form.submit(&source, || notified = true).await;

        assert!(matches!(result, Err(SubmitError::Request(_))));
        assert!(!notified);
        assert_eq!(form.data(), before);
        assert!(!form.is_submitting());
    }

    #[tokio::test]
    async fn missing_field_is_rejected_before_sending() {
        let source = RecordingSource::default();
        let form = filled_form();
        form.set_field("director", "");

        let result = form.submit(&source, || {}).await;

        assert!(matches!(result, Err(SubmitError::MissingField("director"))));
        assert!(source.created.lock().unwrap().is_empty());
        assert_eq!(form.field("title").as_deref(), Some("The Force Awakens"));
    }

    #[tokio::test]
    async fn non_numeric_episode_is_rejected() {
        let source = RecordingSource::default();
        let form = filled_form();
        form.set_field("episode_id", "VII");

        let result = form.submit(&source, || {}).await;

        assert!(matches!(result, Err(SubmitError::InvalidEpisodeId(ref v)) if v == "VII"));
        assert!(source.created.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn second_submit_while_pending_is_rejected() {
        let source = Arc::new(RecordingSource {
            gate: Some(Notify::new()),
            ..Default::default()
        });
        let form = Arc::new(filled_form());

        let first = {
            let (source, form) = (Arc::clone(&source), Arc::clone(&form));
            tokio::spawn(async move { form.submit(source.as_ref(), || {}).await })
        };
        while !form.is_submitting() {
            tokio::task::yield_now().await;
        }

        let second = form.submit(source.as_ref(), || {}).await;
        assert!(matches!(second, Err(SubmitError::InFlight)));

        if let Some(gate) = &source.gate {
            gate.notify_one();
        }
        first.await.unwrap().unwrap();
        assert_eq!(source.created.lock().unwrap().len(), 1);
        assert!(!form.is_submitting());
    }
}
