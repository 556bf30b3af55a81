//! End-to-end retrieval tests.
