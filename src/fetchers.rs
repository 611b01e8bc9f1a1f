pub mod movie_list_fetcher;
