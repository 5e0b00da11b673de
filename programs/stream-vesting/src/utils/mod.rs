pub mod custody;
pub mod flow;
pub mod rights;
