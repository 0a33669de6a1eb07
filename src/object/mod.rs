pub mod catalog;
pub mod error;
pub(crate) mod indirect;
pub mod reference;
pub(crate) mod resolver;
pub(crate) mod string;
pub(crate) mod value;
