use std::path::Path;

use csv::Writer;
use thiserror::Error;

use crate::model::movie::Movie;

#[derive(Debug, Error)]
pub enum ExportError {
    #[error("could not write csv file {file}: {source}")]
    Csv {
        file: String,
        #[source]
        source: csv::Error,
    },
    #[error("could not flush csv file {file}: {source}")]
    Flush {
        file: String,
        #[source]
        source: std::io::Error,
    },
}

pub struct CsvWriter {}

impl CsvWriter {
    pub fn save_movies_to_csv(movies: &[Movie], file_name: &Path) -> Result<(), ExportError> {
        let file = file_name.display().to_string();
        let csv_error = |source| ExportError::Csv {
            file: file.clone(),
            source,
        };

        let mut wrt = Writer::from_path(file_name).map_err(csv_error)?;
        wrt.write_record(Movie::csv_titles()).map_err(csv_error)?;
        for movie in movies {
            wrt.write_record(movie.to_csvable_array())
                .map_err(csv_error)?;
        }

        wrt.flush().map_err(|source| ExportError::Flush {
            file: file.clone(),
            source,
        })?;
        log::info!("Saved {} movies to {}", movies.len(), file);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::movie::MovieStats;

    #[test]
    fn writes_header_and_one_row_per_movie() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("films.csv");
        let movies = vec![Movie {
            id: "https://swapi.info/api/films/1".to_string(),
            title: "A New Hope".to_string(),
            episode_id: 4,
            director: "George Lucas".to_string(),
            producer: "Gary Kurtz, Rick McCallum".to_string(),
            release_date: "1977-05-25".to_string(),
            opening_crawl: "It is a period of civil war.".to_string(),
            stats: Some(MovieStats {
                characters: 18,
                planets: 3,
                starships: 8,
                species: 5,
            }),
        }];

        CsvWriter::save_movies_to_csv(&movies, &path).unwrap();

        let content = std::fs::read_to_string(&path).unwrap();
        assert_eq!(
            content,
            "Episode,Title,Director,Producer,Release Date,Characters,Planets,Starships,Species\n\
             4,A New Hope,George Lucas,\"Gary Kurtz, Rick McCallum\",1977-05-25,18,3,8,5\n"
        );
    }

    #[test]
    fn missing_directory_is_reported() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("missing").join("films.csv");

        let result = CsvWriter::save_movies_to_csv(&[], &path);

        assert!(matches!(result, Err(ExportError::Csv { .. })));
    }
}
