pub mod colors;
pub mod output;
pub mod path;
pub mod table;
