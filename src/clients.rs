pub mod movie_client;
