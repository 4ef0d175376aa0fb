//! Tool domain: declarations, calls and responses exchanged with the model.

pub mod entities;
