pub mod links;
pub mod text;

pub use links::first_url;
pub use text::{collapse_whitespace, leading_decimal, leading_number, truncate_with_ellipsis};
