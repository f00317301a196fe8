pub mod front_matter;
pub mod issue;
pub mod markup;
pub mod ticket;
