//! Structural indices over a [`crate::Graph`].

pub mod graph_index;
