//! End-to-end tests over the assembled ticket stack.

mod helpers;

mod cleanup_test;
mod encryption_test;
mod lifecycle_test;
