//! R-tree integration test module.
//!
//! These tests write R-tree indexes to real files and search them
//! through freshly opened readers.

mod rtree_file_test;
