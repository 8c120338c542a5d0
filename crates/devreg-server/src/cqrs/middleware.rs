//! Marker traits separating writes from reads
//!
//! Commands change state, queries only read it. Every request type in
//! `features` implements exactly one of them.

pub trait Command {}

pub trait Query {}
