//! End-to-end pipeline tests over real temp directories.
