pub mod movie_form;
