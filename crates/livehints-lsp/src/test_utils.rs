//! Test utilities for creating server state with a recording publisher.
