//! Test utilities for kvgraph integration tests
//!
//! - GraphFixture: a graph store in an isolated temporary directory

pub mod test_fixture;
