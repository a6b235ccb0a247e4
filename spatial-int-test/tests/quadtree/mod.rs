//! Quadtree integration test module.
//!
//! These tests write quadtree indexes to real files and search them
//! through freshly opened readers.

mod quadtree_file_test;
mod quadtree_overflow_test;
