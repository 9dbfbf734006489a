// Core modules implementing the join utility and error modeling.
pub mod error;
pub mod join;
