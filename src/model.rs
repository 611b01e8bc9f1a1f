pub mod form_data;
pub mod movie;
