pub mod movie_grid;
